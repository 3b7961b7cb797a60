// crates/server/src/config.rs
//! Command-line and environment configuration for the server binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "parcelwise", version, about = "Parcelwise shipment-status API server")]
pub struct ServerArgs {
    /// Interface to bind (address or hostname).
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// SQLite URL of the user store.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://parcelwise.db")]
    pub database_url: String,

    /// Directory served under /static.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// JSON file replacing the built-in status catalog.
    #[arg(long = "catalog", env = "CATALOG_PATH")]
    pub catalog_path: Option<PathBuf>,

    /// How long finished job records stay queryable.
    #[arg(long, env = "JOB_RESULT_TTL_SECS", default_value_t = 3600)]
    pub job_result_ttl_secs: u64,

    /// Do not start the periodic demo tasks.
    #[arg(long)]
    pub no_scheduler: bool,
}

impl ServerArgs {
    /// `host:port`, as accepted by `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn job_result_ttl(&self) -> Duration {
        Duration::from_secs(self.job_result_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["parcelwise"]).unwrap();
        assert!(args.bind_addr().ends_with(&format!(":{}", args.port)));
        assert!(!args.no_scheduler);
        assert!(args.job_result_ttl_secs > 0);
    }

    #[test]
    fn test_flags_override() {
        let args = ServerArgs::try_parse_from([
            "parcelwise",
            "--host",
            "0.0.0.0",
            "--port",
            "9001",
            "--database-url",
            "sqlite::memory:",
            "--catalog",
            "/etc/parcelwise/catalog.json",
            "--job-result-ttl-secs",
            "60",
            "--no-scheduler",
        ])
        .unwrap();
        assert_eq!(args.bind_addr(), "0.0.0.0:9001");
        assert_eq!(args.database_url, "sqlite::memory:");
        assert_eq!(args.catalog_path, Some(PathBuf::from("/etc/parcelwise/catalog.json")));
        assert_eq!(args.job_result_ttl(), Duration::from_secs(60));
        assert!(args.no_scheduler);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerArgs::try_parse_from(["parcelwise", "--port", "eighty"]).is_err());
    }
}

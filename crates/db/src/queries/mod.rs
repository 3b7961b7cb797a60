// crates/db/src/queries/mod.rs
// Typed query methods on `Database`, one module per table.

pub mod users;

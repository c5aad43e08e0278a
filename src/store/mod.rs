//! Persistence — async `Store` trait and the libSQL backend.

mod libsql_store;
mod traits;

pub use libsql_store::LibSqlStore;
pub use traits::*;

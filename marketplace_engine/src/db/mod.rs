pub mod common;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

//! SQLite backend for the marketplace engine.
//!
//! The per-table query modules in this directory all operate on a borrowed [`sqlx::SqliteConnection`], so they can be
//! embedded in a transaction by passing `&mut tx`. [`SqliteDatabase`] composes them into implementations of the
//! engine traits.
mod carts;
mod db;
mod errors;
mod order_statuses;
mod orders;
mod recently_viewed;
mod shipping;
mod sqlite_impl;
mod users;
mod variations;
mod wishlists;

pub use db::{create_database, db_url, new_pool};
pub use errors::SqliteDatabaseError;
pub use sqlite_impl::SqliteDatabase;

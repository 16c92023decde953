//! # Marketplace engine public API
//!
//! The `mpe_api` module exposes the programmatic API of the engine. It is modular, so clients can pick the
//! functionality they need, or run different parts on different machines against the same backend.
//!
//! * [`order_flow_api`] is the primary API for converting carts into orders and walking orders through the status
//!   state machine.
//! * [`cart_api`], [`wishlist_api`] and [`shopper_api`] present a uniform contract over authenticated and guest
//!   callers, backed by the durable ledgers on one side and the TTL guest store on the other.
//!
//! The other submodules hold the support objects these APIs accept and return.
//!
//! # API usage
//!
//! The pattern for all the APIs is the same: an instance is created by supplying a backend that implements the
//! traits the API requires.
//!
//! ```rust,ignore
//! use marketplace_engine::{CartApi, SqliteDatabase};
//! use marketplace_engine::guest::GuestStore;
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CartManagement
//! let api = CartApi::new(db, GuestStore::new());
//! let cart = api.cart(&identity).await?;
//! ```

pub mod cart_api;
pub mod cart_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod shopper_api;
pub mod wishlist_api;

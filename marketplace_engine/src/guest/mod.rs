//! The guest subsystem: a TTL-backed store scoping cart, wishlist, recently-viewed and push-token data to an
//! anonymous shopper, and the merge service that drains it into durable records exactly once when the shopper
//! authenticates.
mod merge;
mod objects;
mod store;

pub use merge::{GuestMergeReport, GuestMergeService, MergeOutcome, MergeSession};
pub use objects::{GuestCartEntry, GuestKey, GuestWishlistEntry};
pub use store::GuestStore;

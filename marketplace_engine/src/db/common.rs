use crate::db_types::{CartLine, WishlistEntry};

/// Outcome of an add-to-cart upsert: the dedup invariant means an existing (user, product, variation) line is
/// incremented rather than duplicated.
#[derive(Debug, Clone)]
pub enum CartUpsertOutcome {
    Created(CartLine),
    Incremented(CartLine),
}

impl CartUpsertOutcome {
    pub fn into_line(self) -> CartLine {
        match self {
            CartUpsertOutcome::Created(line) | CartUpsertOutcome::Incremented(line) => line,
        }
    }
}

/// Outcome of an add-to-wishlist request. Adding a pair that is already saved is a no-op, not an error.
#[derive(Debug, Clone)]
pub enum WishlistAddOutcome {
    Added(WishlistEntry),
    AlreadyPresent(WishlistEntry),
}

impl WishlistAddOutcome {
    pub fn into_entry(self) -> WishlistEntry {
        match self {
            WishlistAddOutcome::Added(entry) | WishlistAddOutcome::AlreadyPresent(entry) => entry,
        }
    }
}

use thiserror::Error;

use crate::traits::{CartError, OrderFlowError, ShippingResolverError, ShopperError, WishlistError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database query error: {0}")]
    QueryError(String),
}

impl From<SqliteDatabaseError> for OrderFlowError {
    fn from(value: SqliteDatabaseError) -> Self {
        OrderFlowError::DatabaseError(value.to_string())
    }
}

impl From<SqliteDatabaseError> for CartError {
    fn from(value: SqliteDatabaseError) -> Self {
        CartError::DatabaseError(value.to_string())
    }
}

impl From<SqliteDatabaseError> for WishlistError {
    fn from(value: SqliteDatabaseError) -> Self {
        WishlistError::DatabaseError(value.to_string())
    }
}

impl From<SqliteDatabaseError> for ShopperError {
    fn from(value: SqliteDatabaseError) -> Self {
        ShopperError::DatabaseError(value.to_string())
    }
}

impl From<SqliteDatabaseError> for ShippingResolverError {
    fn from(value: SqliteDatabaseError) -> Self {
        ShippingResolverError::DatabaseError(value.to_string())
    }
}

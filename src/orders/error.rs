use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::ApiError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Order not found")]
    NotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product is not available: {0}")]
    ProductUnavailable(String),

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i32 },

    #[error("Restaurant is closed")]
    RestaurantClosed,

    #[error("Order subtotal must be at least {0}")]
    BelowMinimumOrder(Decimal),

    #[error("Delivery orders need a delivery address")]
    DeliveryAddressRequired,

    #[error("Coupon {0} has no uses left")]
    CouponExhausted(String),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Database(e) => ApiError::DatabaseError(e),
            OrderError::NotFound(id) => ApiError::not_found("Order", id),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

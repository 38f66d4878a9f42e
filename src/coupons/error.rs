use rust_decimal::Decimal;

use crate::error::ApiError;

/// Reasons a coupon cannot be applied to an order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon {0} not found")]
    NotFound(String),

    #[error("Coupon is inactive")]
    Inactive,

    #[error("Coupon is not valid yet")]
    NotYetValid,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    #[error("Order value must be at least {0}")]
    BelowMinimumOrder(Decimal),
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::NotFound(code) => ApiError::not_found("Coupon", code),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::coupons::{
    normalize_code, Coupon, CouponError, CouponRepository, CouponValidation, CreateCoupon,
    DiscountType, UpdateCoupon, ValidateCoupon,
};
use crate::error::ApiError;
use crate::validation::{AmountChecks, AmountRule};

const FOLLOW_UP_PREFIX: &str = "VOLTE";
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Random code for automatically issued coupons, e.g. `VOLTE7KQ2M`
pub fn generate_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", prefix, suffix)
}

fn check_discount(discount_type: DiscountType, value: Decimal) -> Result<(), ValidationErrors> {
    if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        let mut errors = ValidationErrors::new();
        errors.add("discount_value", ValidationError::new("percentage_above_100"));
        return Err(errors);
    }
    Ok(())
}

/// Service for coupon business logic
#[derive(Clone)]
pub struct CouponService {
    repo: CouponRepository,
}

impl CouponService {
    pub fn new(repo: CouponRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateCoupon) -> Result<Coupon, ApiError> {
        AmountChecks::new()
            .check("discount_value", Some(request.discount_value), AmountRule::Positive)
            .check("min_order_value", request.min_order_value, AmountRule::NonNegative)
            .finish()?;
        check_discount(request.discount_type, request.discount_value)?;
        if let (Some(from), Some(until)) = (request.valid_from, request.valid_until) {
            if from > until {
                return Err(ApiError::BadRequest(
                    "valid_from must be before valid_until".to_string(),
                ));
            }
        }

        let code = normalize_code(&request.code);
        let coupon = self.repo.create(&code, &request).await.map_err(|e| {
            if crate::db::is_unique_violation(&e) {
                ApiError::Conflict {
                    message: format!("Coupon code {} already exists for this restaurant", code),
                }
            } else if crate::db::is_foreign_key_violation(&e) {
                ApiError::BadRequest("Referenced restaurant does not exist".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        tracing::info!("Created coupon {} for restaurant {}", coupon.code, coupon.restaurant_id);
        Ok(coupon)
    }

    pub async fn find_all(&self, restaurant_id: Uuid) -> Result<Vec<Coupon>, ApiError> {
        Ok(self.repo.find_by_restaurant(restaurant_id).await?)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Coupon, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Coupon", id))
    }

    pub async fn update(&self, id: Uuid, request: UpdateCoupon) -> Result<Coupon, ApiError> {
        AmountChecks::new()
            .check("discount_value", request.discount_value, AmountRule::Positive)
            .check("min_order_value", request.min_order_value, AmountRule::NonNegative)
            .finish()?;

        let mut coupon = self.find_one(id).await?;
        request.apply_to(&mut coupon);
        check_discount(coupon.discount_type, coupon.discount_value)?;

        let updated = self.repo.update(&coupon).await?;
        tracing::info!("Updated coupon {}", updated.code);
        Ok(updated)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(ApiError::not_found("Coupon", id));
        }
        tracing::info!("Deleted coupon {}", id);
        Ok(())
    }

    /// Resolves a code for a restaurant and computes its discount on the order value
    pub async fn evaluate(
        &self,
        restaurant_id: Uuid,
        code: &str,
        order_value: Decimal,
    ) -> Result<(Coupon, Decimal), ApiError> {
        let code = normalize_code(code);
        let coupon = self
            .repo
            .find_by_code(restaurant_id, &code)
            .await?
            .ok_or(CouponError::NotFound(code))?;
        let discount = coupon.evaluate(order_value, Utc::now())?;
        Ok((coupon, discount))
    }

    /// Outcome of applying a code, reported as data rather than as an error
    pub async fn validate(&self, request: ValidateCoupon) -> Result<CouponValidation, ApiError> {
        AmountChecks::new()
            .check("order_value", Some(request.order_value), AmountRule::NonNegative)
            .finish()?;

        let code = normalize_code(&request.code);
        let Some(coupon) = self.repo.find_by_code(request.restaurant_id, &code).await? else {
            return Ok(CouponValidation::rejected(
                request.order_value,
                &CouponError::NotFound(code),
            ));
        };

        Ok(match coupon.evaluate(request.order_value, Utc::now()) {
            Ok(discount) => CouponValidation::accepted(request.order_value, discount),
            Err(reason) => {
                tracing::debug!("Coupon {} rejected: {}", coupon.code, reason);
                CouponValidation::rejected(request.order_value, &reason)
            }
        })
    }

    /// Marks one use of the coupon
    pub async fn redeem(&self, id: Uuid) -> Result<Coupon, ApiError> {
        if !self.repo.redeem(id).await? {
            let coupon = self.find_one(id).await?;
            tracing::debug!("Coupon {} has no uses left", coupon.code);
            return Err(CouponError::UsageLimitReached.into());
        }
        self.find_one(id).await
    }

    /// Single-use percentage coupon offered to customers who abandoned a conversation
    pub async fn issue_follow_up_coupon(
        &self,
        restaurant_id: Uuid,
        percent: u32,
        valid_for: Duration,
    ) -> Result<Coupon, ApiError> {
        let now = Utc::now();
        let mut last_error = None;

        // Codes are random, so a collision just means drawing again
        for _ in 0..3 {
            let request = CreateCoupon {
                restaurant_id,
                code: generate_code(FOLLOW_UP_PREFIX),
                description: Some("Cupom de retorno".to_string()),
                discount_type: DiscountType::Percentage,
                discount_value: Decimal::from(percent),
                min_order_value: None,
                max_uses: Some(1),
                is_active: Some(true),
                valid_from: Some(now),
                valid_until: Some(now + valid_for),
            };
            match self.create(request).await {
                Ok(coupon) => return Ok(coupon),
                Err(ApiError::Conflict { message }) => {
                    tracing::debug!("Follow-up code collision: {}", message);
                    last_error = Some(ApiError::Conflict { message });
                }
                Err(other) => return Err(other),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ApiError::InternalError("Could not generate a unique coupon code".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code(FOLLOW_UP_PREFIX);
        assert!(code.starts_with("VOLTE"));
        assert_eq!(code.len(), 10);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(normalize_code(&code), code);
    }

    #[test]
    fn test_percentage_above_100_rejected() {
        assert!(check_discount(DiscountType::Percentage, dec!(101)).is_err());
        assert!(check_discount(DiscountType::Percentage, dec!(100)).is_ok());
        assert!(check_discount(DiscountType::Fixed, dec!(150)).is_ok());
    }
}

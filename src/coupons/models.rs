use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::coupons::CouponError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Discount code scoped to one restaurant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Codes are compared trimmed and upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    /// Checks the coupon against an order value and returns the discount it grants
    ///
    /// Rules are checked in order and the first failure is returned. The discount never
    /// exceeds the order value.
    pub fn evaluate(&self, order_value: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if self.valid_from.is_some_and(|from| now < from) {
            return Err(CouponError::NotYetValid);
        }
        if self.valid_until.is_some_and(|until| now > until) {
            return Err(CouponError::Expired);
        }
        if self.max_uses.is_some_and(|max| self.used_count >= max) {
            return Err(CouponError::UsageLimitReached);
        }
        if let Some(min) = self.min_order_value {
            if order_value < min {
                return Err(CouponError::BelowMinimumOrder(min));
            }
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => (order_value * self.discount_value / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            DiscountType::Fixed => self.discount_value,
        };

        Ok(discount.min(order_value).max(Decimal::ZERO))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCoupon {
    pub restaurant_id: Uuid,
    #[validate(length(min = 3, max = 40), custom = "crate::validation::validate_not_blank")]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Option<Decimal>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Partial update; the code itself cannot be changed
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCoupon {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl UpdateCoupon {
    pub fn apply_to(self, coupon: &mut Coupon) {
        if self.description.is_some() {
            coupon.description = self.description;
        }
        if let Some(discount_type) = self.discount_type {
            coupon.discount_type = discount_type;
        }
        if let Some(value) = self.discount_value {
            coupon.discount_value = value;
        }
        if self.min_order_value.is_some() {
            coupon.min_order_value = self.min_order_value;
        }
        if self.max_uses.is_some() {
            coupon.max_uses = self.max_uses;
        }
        if let Some(active) = self.is_active {
            coupon.is_active = active;
        }
        if self.valid_from.is_some() {
            coupon.valid_from = self.valid_from;
        }
        if self.valid_until.is_some() {
            coupon.valid_until = self.valid_until;
        }
    }
}

/// Body of POST /api/coupons/validate
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateCoupon {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 40))]
    pub code: String,
    pub order_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponValidation {
    pub valid: bool,
    pub discount: Decimal,
    pub final_value: Decimal,
    pub message: String,
}

impl CouponValidation {
    pub fn accepted(order_value: Decimal, discount: Decimal) -> Self {
        Self {
            valid: true,
            discount,
            final_value: order_value - discount,
            message: "Coupon applied".to_string(),
        }
    }

    pub fn rejected(order_value: Decimal, reason: &CouponError) -> Self {
        Self {
            valid: false,
            discount: Decimal::ZERO,
            final_value: order_value,
            message: reason.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CouponQuery {
    pub restaurant_id: Uuid,
}


#[cfg(test)]
mod tests {
    use super::fixtures::coupon;
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  bemvindo10 "), "BEMVINDO10");
    }

    #[test]
    fn test_percentage_discount_is_rounded() {
        let c = coupon(DiscountType::Percentage, dec!(15));
        assert_eq!(c.evaluate(dec!(33.33), Utc::now()), Ok(dec!(5.00)));
    }

    #[test]
    fn test_fixed_discount_capped_at_order_value() {
        let c = coupon(DiscountType::Fixed, dec!(50));
        assert_eq!(c.evaluate(dec!(30.00), Utc::now()), Ok(dec!(30.00)));
    }

    #[test]
    fn test_inactive_coupon_fails() {
        let mut c = coupon(DiscountType::Fixed, dec!(5));
        c.is_active = false;
        assert_eq!(c.evaluate(dec!(100), Utc::now()), Err(CouponError::Inactive));
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, dec!(5));
        c.valid_from = Some(now + Duration::hours(1));
        assert_eq!(c.evaluate(dec!(100), now), Err(CouponError::NotYetValid));

        c.valid_from = Some(now - Duration::hours(2));
        c.valid_until = Some(now - Duration::hours(1));
        assert_eq!(c.evaluate(dec!(100), now), Err(CouponError::Expired));
    }

    #[test]
    fn test_usage_limit() {
        let mut c = coupon(DiscountType::Fixed, dec!(5));
        c.max_uses = Some(1);
        c.used_count = 1;
        assert_eq!(c.evaluate(dec!(100), Utc::now()), Err(CouponError::UsageLimitReached));
    }

    #[test]
    fn test_minimum_order_value() {
        let mut c = coupon(DiscountType::Fixed, dec!(5));
        c.min_order_value = Some(dec!(40));
        assert_eq!(
            c.evaluate(dec!(39.99), Utc::now()),
            Err(CouponError::BelowMinimumOrder(dec!(40)))
        );
        assert_eq!(c.evaluate(dec!(40), Utc::now()), Ok(dec!(5)));
    }

    #[test]
    fn test_first_failure_wins() {
        let mut c = coupon(DiscountType::Fixed, dec!(5));
        c.is_active = false;
        c.max_uses = Some(0);
        assert_eq!(c.evaluate(dec!(1), Utc::now()), Err(CouponError::Inactive));
    }

    #[test]
    fn test_validation_response() {
        let accepted = CouponValidation::accepted(dec!(80), dec!(8));
        assert!(accepted.valid);
        assert_eq!(accepted.final_value, dec!(72));

        let rejected = CouponValidation::rejected(dec!(80), &CouponError::Expired);
        assert!(!rejected.valid);
        assert_eq!(rejected.discount, Decimal::ZERO);
        assert_eq!(rejected.final_value, dec!(80));
        assert_eq!(rejected.message, "Coupon has expired");
    }
}

#[cfg(test)]
mod property_tests {
    use super::fixtures::coupon;
    use super::*;
    use proptest::prelude::*;

    /// A discount is never negative and never larger than the order
    #[test]
    fn prop_discount_within_order_value() {
        proptest!(|(
            cents in 0i64..1_000_000,
            pct in 1i64..=100,
            fixed_cents in 1i64..100_000
        )| {
            let order_value = Decimal::new(cents, 2);
            let now = Utc::now();

            let pct_coupon = coupon(DiscountType::Percentage, Decimal::from(pct));
            let d = pct_coupon.evaluate(order_value, now).unwrap();
            prop_assert!(d >= Decimal::ZERO && d <= order_value);

            let fixed_coupon = coupon(DiscountType::Fixed, Decimal::new(fixed_cents, 2));
            let d = fixed_coupon.evaluate(order_value, now).unwrap();
            prop_assert!(d >= Decimal::ZERO && d <= order_value);
        });
    }

    /// Percentage discounts never carry more than two decimal places
    #[test]
    fn prop_percentage_discount_two_decimals() {
        proptest!(|(cents in 0i64..1_000_000, pct in 1i64..=100)| {
            let c = coupon(DiscountType::Percentage, Decimal::from(pct));
            let d = c.evaluate(Decimal::new(cents, 2), Utc::now()).unwrap();
            prop_assert!(d.scale() <= 2);
        });
    }
}

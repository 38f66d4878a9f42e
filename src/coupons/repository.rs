use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::coupons::{Coupon, CreateCoupon};

/// Repository for coupon operations
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a coupon; `code` must already be normalised
    pub async fn create(&self, code: &str, request: &CreateCoupon) -> Result<Coupon, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (
                id, restaurant_id, code, description, discount_type, discount_value,
                min_order_value, max_uses, is_active, valid_from, valid_until
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.restaurant_id)
        .bind(code)
        .bind(&request.description)
        .bind(request.discount_type)
        .bind(request.discount_value)
        .bind(request.min_order_value)
        .bind(request.max_uses)
        .bind(request.is_active.unwrap_or(true))
        .bind(request.valid_from)
        .bind(request.valid_until)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE restaurant_id = $1 ORDER BY created_at DESC",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_code(&self, restaurant_id: Uuid, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE restaurant_id = $1 AND code = $2",
        )
        .bind(restaurant_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, coupon: &Coupon) -> Result<Coupon, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            UPDATE coupons
            SET description = $1, discount_type = $2, discount_value = $3, min_order_value = $4,
                max_uses = $5, is_active = $6, valid_from = $7, valid_until = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_value)
        .bind(coupon.max_uses)
        .bind(coupon.is_active)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn redeem(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        redeem_with(&self.pool, id).await
    }
}

/// Increments `used_count` unless the usage limit is already reached
///
/// Takes any executor so order creation can redeem inside its transaction.
/// Returns false when no use was left.
pub async fn redeem_with<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE coupons
        SET used_count = used_count + 1, updated_at = NOW()
        WHERE id = $1 AND (max_uses IS NULL OR used_count < max_uses)
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::coupons::repository::redeem_with;
use crate::orders::{
    format_order_number, NewOrder, NewOrderItem, Order, OrderError, OrderItem, OrderQuery,
    OrderResponse,
};

/// Repository for order operations
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its items in a transaction
    ///
    /// The order number sequence is serialised per restaurant with an advisory lock.
    /// When `coupon_id` is given the coupon is redeemed in the same transaction.
    pub async fn create(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
        coupon_id: Option<Uuid>,
    ) -> Result<OrderResponse, OrderError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(order.restaurant_id.to_string())
            .execute(&mut *tx)
            .await?;

        let today: NaiveDate = Utc::now().date_naive();
        let (placed_today,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE restaurant_id = $1 AND (created_at AT TIME ZONE 'UTC')::date = $2
            "#,
        )
        .bind(order.restaurant_id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, order_number, restaurant_id, customer_id, status, payment_method, order_type,
                subtotal, delivery_fee, discount, total, coupon_code, notes, is_paid,
                delivery_address, customer_name, customer_phone
            )
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11, $12, FALSE, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(format_order_number(today, placed_today + 1))
        .bind(order.restaurant_id)
        .bind(order.customer_id)
        .bind(order.payment_method)
        .bind(order.order_type)
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.discount)
        .bind(order.total)
        .bind(&order.coupon_code)
        .bind(&order.notes)
        .bind(&order.delivery_address)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .fetch_one(&mut *tx)
        .await?;

        let mut saved_items = Vec::with_capacity(items.len());
        for item in items {
            let saved = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity, unit_price, total_price,
                    additional_options, notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(&item.additional_options)
            .bind(&item.notes)
            .fetch_one(&mut *tx)
            .await?;
            saved_items.push(saved);
        }

        if let Some(coupon_id) = coupon_id {
            if !redeem_with(&mut *tx, coupon_id).await? {
                // Dropping the transaction rolls the order back
                return Err(OrderError::CouponExhausted(
                    order.coupon_code.clone().unwrap_or_default(),
                ));
            }
        }

        tx.commit().await?;

        Ok(OrderResponse {
            order: created,
            items: saved_items,
        })
    }

    pub async fn find_all(&self, query: &OrderQuery) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::uuid IS NULL OR restaurant_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.restaurant_id)
        .bind(query.status)
        .bind(query.customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Items of all given orders
    pub async fn find_items(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, OrderError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Orders whose customer phone equals any of the given spellings
    pub async fn find_by_phone_variants(
        &self,
        variants: &[String],
        restaurant_id: Option<Uuid>,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE customer_phone = ANY($1)
              AND ($2::uuid IS NULL OR restaurant_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(variants)
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn update(&self, order: &Order) -> Result<Order, OrderError> {
        let updated = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $1, payment_method = $2, is_paid = $3, notes = $4,
                delivery_address = $5, customer_name = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(order.status)
        .bind(order.payment_method)
        .bind(order.is_paid)
        .bind(&order.notes)
        .bind(&order.delivery_address)
        .bind(&order.customer_name)
        .bind(order.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound(order.id))?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, OrderError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::restaurants::{CreateRestaurant, Restaurant};

/// Repository for restaurant operations
#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateRestaurant) -> Result<Restaurant, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurants
                (id, name, description, phone, email, address, logo_url, subscription_plan,
                 delivery_fee, min_order_value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&request.description)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.address)
        .bind(&request.logo_url)
        .bind(request.subscription_plan.unwrap_or_default())
        .bind(request.delivery_fee.unwrap_or_default())
        .bind(request.min_order_value.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_instance_name(
        &self,
        instance_name: &str,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            "SELECT * FROM restaurants WHERE evolution_api_instance_name = $1",
        )
        .bind(instance_name)
        .fetch_optional(&self.pool)
        .await
    }

    /// Writes every editable column of the given restaurant
    pub async fn update(&self, restaurant: &Restaurant) -> Result<Restaurant, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            UPDATE restaurants
            SET name = $1,
                description = $2,
                phone = $3,
                email = $4,
                address = $5,
                logo_url = $6,
                status = $7,
                subscription_plan = $8,
                is_open = $9,
                delivery_fee = $10,
                min_order_value = $11,
                updated_at = NOW()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&restaurant.name)
        .bind(&restaurant.description)
        .bind(&restaurant.phone)
        .bind(&restaurant.email)
        .bind(&restaurant.address)
        .bind(&restaurant.logo_url)
        .bind(restaurant.status)
        .bind(restaurant.subscription_plan)
        .bind(restaurant.is_open)
        .bind(restaurant.delivery_fee)
        .bind(restaurant.min_order_value)
        .bind(restaurant.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stores (or clears) the WhatsApp instance bound to a restaurant
    pub async fn set_whatsapp_binding(
        &self,
        id: Uuid,
        instance_name: Option<&str>,
        instance_token: Option<&str>,
        connected: bool,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"
            UPDATE restaurants
            SET evolution_api_instance_name = $1,
                evolution_api_instance_token = $2,
                evolution_api_connected = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(instance_name)
        .bind(instance_token)
        .bind(connected)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Updates the connected flag of whichever restaurant owns the instance
    pub async fn set_connected_by_instance(
        &self,
        instance_name: &str,
        connected: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET evolution_api_connected = $1, updated_at = NOW()
            WHERE evolution_api_instance_name = $2
            "#,
        )
        .bind(connected)
        .bind(instance_name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

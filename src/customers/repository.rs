use sqlx::PgPool;
use uuid::Uuid;

use crate::customers::Customer;

/// Repository for customer operations
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        restaurant_id: Uuid,
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, restaurant_id, name, phone, email, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(address)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE restaurant_id = $1 ORDER BY name",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Oldest customer of the restaurant whose phone equals any of the given spellings
    pub async fn find_by_phone_variants(
        &self,
        restaurant_id: Uuid,
        variants: &[String],
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE restaurant_id = $1 AND phone = ANY($2)
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(restaurant_id)
        .bind(variants)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, customer: &Customer) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, phone = $2, email = $3, address = $4, notes = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.notes)
        .bind(customer.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

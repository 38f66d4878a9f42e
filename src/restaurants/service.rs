use uuid::Uuid;

use crate::error::ApiError;
use crate::restaurants::{CreateRestaurant, Restaurant, RestaurantRepository, UpdateRestaurant};
use crate::validation::{AmountChecks, AmountRule};

/// Service for restaurant business logic
#[derive(Clone)]
pub struct RestaurantService {
    repo: RestaurantRepository,
}

impl RestaurantService {
    pub fn new(repo: RestaurantRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateRestaurant) -> Result<Restaurant, ApiError> {
        AmountChecks::new()
            .check("delivery_fee", request.delivery_fee, AmountRule::NonNegative)
            .check("min_order_value", request.min_order_value, AmountRule::NonNegative)
            .finish()?;

        let restaurant = self.repo.create(&request).await?;
        tracing::info!("Created restaurant {} ({})", restaurant.name, restaurant.id);
        Ok(restaurant)
    }

    pub async fn find_all(&self) -> Result<Vec<Restaurant>, ApiError> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Restaurant, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Restaurant", id))
    }

    /// Lookup used by the webhook path, where a missing restaurant is not an error
    pub async fn find_optional(&self, id: Uuid) -> Result<Option<Restaurant>, ApiError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn find_by_instance_name(
        &self,
        instance_name: &str,
    ) -> Result<Option<Restaurant>, ApiError> {
        Ok(self.repo.find_by_instance_name(instance_name).await?)
    }

    pub async fn update(&self, id: Uuid, request: UpdateRestaurant) -> Result<Restaurant, ApiError> {
        AmountChecks::new()
            .check("delivery_fee", request.delivery_fee, AmountRule::NonNegative)
            .check("min_order_value", request.min_order_value, AmountRule::NonNegative)
            .finish()?;

        let mut restaurant = self.find_one(id).await?;
        request.apply_to(&mut restaurant);
        let updated = self.repo.update(&restaurant).await?;
        tracing::info!("Updated restaurant {}", id);
        Ok(updated)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(ApiError::not_found("Restaurant", id));
        }
        tracing::info!("Deleted restaurant {}", id);
        Ok(())
    }

    pub async fn bind_whatsapp(
        &self,
        id: Uuid,
        instance_name: &str,
        instance_token: Option<&str>,
    ) -> Result<Restaurant, ApiError> {
        self.repo
            .set_whatsapp_binding(id, Some(instance_name), instance_token, false)
            .await
            .map_err(|e| {
                if crate::db::is_unique_violation(&e) {
                    ApiError::Conflict {
                        message: format!("WhatsApp instance '{}' is already bound", instance_name),
                    }
                } else {
                    ApiError::DatabaseError(e)
                }
            })?
            .ok_or_else(|| ApiError::not_found("Restaurant", id))
    }

    pub async fn clear_whatsapp(&self, id: Uuid) -> Result<Restaurant, ApiError> {
        self.repo
            .set_whatsapp_binding(id, None, None, false)
            .await?
            .ok_or_else(|| ApiError::not_found("Restaurant", id))
    }

    /// Records the connection state reported by the gateway for an instance
    pub async fn set_connected(&self, instance_name: &str, connected: bool) -> Result<u64, ApiError> {
        let updated = self.repo.set_connected_by_instance(instance_name, connected).await?;
        if updated == 0 {
            tracing::debug!("No restaurant bound to instance {}", instance_name);
        }
        Ok(updated)
    }
}

use uuid::Uuid;

use crate::customers::{CreateCustomer, Customer, CustomerRepository, UpdateCustomer};
use crate::error::ApiError;
use crate::phone;

/// Service for customer business logic
#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    /// Registers a customer; the phone may not already exist for the restaurant under any spelling
    pub async fn create(&self, request: CreateCustomer) -> Result<Customer, ApiError> {
        if let Some(existing) = self.find_by_phone(request.restaurant_id, &request.phone).await? {
            return Err(ApiError::Conflict {
                message: format!(
                    "Phone {} is already registered to customer {}",
                    request.phone, existing.id
                ),
            });
        }

        let customer = self
            .repo
            .create(
                request.restaurant_id,
                request.name.trim(),
                &phone::normalize(&request.phone),
                request.email.as_deref(),
                request.address.as_deref(),
                request.notes.as_deref(),
            )
            .await
            .map_err(|e| {
                if crate::db::is_foreign_key_violation(&e) {
                    ApiError::BadRequest("Referenced restaurant does not exist".to_string())
                } else {
                    ApiError::DatabaseError(e)
                }
            })?;

        tracing::info!("Created customer {} for restaurant {}", customer.id, customer.restaurant_id);
        Ok(customer)
    }

    pub async fn list(&self, restaurant_id: Uuid, phone: Option<&str>) -> Result<Vec<Customer>, ApiError> {
        match phone {
            Some(phone) => Ok(self
                .find_by_phone(restaurant_id, phone)
                .await?
                .into_iter()
                .collect()),
            None => Ok(self.repo.find_by_restaurant(restaurant_id).await?),
        }
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Customer, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer", id))
    }

    /// Finds a customer by any spelling of the phone number
    pub async fn find_by_phone(&self, restaurant_id: Uuid, raw_phone: &str) -> Result<Option<Customer>, ApiError> {
        let variants = phone::variants(raw_phone);
        if variants.is_empty() {
            return Ok(None);
        }
        tracing::debug!("Looking up customer by phone variants {:?}", variants);
        Ok(self.repo.find_by_phone_variants(restaurant_id, &variants).await?)
    }

    /// Returns the customer for the phone, registering a new one when none matches
    pub async fn find_or_create_by_phone(
        &self,
        restaurant_id: Uuid,
        name: Option<&str>,
        raw_phone: &str,
    ) -> Result<Customer, ApiError> {
        if let Some(customer) = self.find_by_phone(restaurant_id, raw_phone).await? {
            return Ok(customer);
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Cliente");
        let customer = self
            .repo
            .create(restaurant_id, name, &phone::normalize(raw_phone), None, None, None)
            .await?;
        tracing::info!("Registered customer {} from phone {}", customer.id, customer.phone);
        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, mut request: UpdateCustomer) -> Result<Customer, ApiError> {
        let mut customer = self.find_one(id).await?;

        if let Some(new_phone) = request.phone.take() {
            if let Some(other) = self.find_by_phone(customer.restaurant_id, &new_phone).await? {
                if other.id != customer.id {
                    return Err(ApiError::Conflict {
                        message: format!("Phone {} is already registered to customer {}", new_phone, other.id),
                    });
                }
            }
            request.phone = Some(phone::normalize(&new_phone));
        }

        request.apply_to(&mut customer);
        Ok(self.repo.update(&customer).await?)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(ApiError::not_found("Customer", id));
        }
        tracing::info!("Deleted customer {}", id);
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Customer of a restaurant, identified by phone number
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    /// Stored in canonical form (see `phone::normalize`)
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl UpdateCustomer {
    /// Applies the provided fields; the phone is expected to be normalised already
    pub fn apply_to(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if self.email.is_some() {
            customer.email = self.email;
        }
        if self.address.is_some() {
            customer.address = self.address;
        }
        if self.notes.is_some() {
            customer.notes = self.notes;
        }
    }
}

/// Query parameters for GET /api/customers
#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub restaurant_id: Uuid,
    /// Any spelling of the phone number
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_customer_validation() {
        let valid = CreateCustomer {
            restaurant_id: Uuid::new_v4(),
            name: "Maria".to_string(),
            phone: "(11) 98888-7777".to_string(),
            email: Some("maria@example.com".to_string()),
            address: None,
            notes: None,
        };
        assert!(valid.validate().is_ok());

        let bad_phone = CreateCustomer {
            phone: "123".to_string(),
            ..valid.clone()
        };
        assert!(bad_phone.validate().is_err());

        let bad_email = CreateCustomer {
            email: Some("not-an-email".to_string()),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }
}

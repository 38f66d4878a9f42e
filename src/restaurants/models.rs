use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a restaurant account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Subscription tier of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Basic,
    Premium,
}

/// Restaurant settings aggregate, including its WhatsApp instance binding
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub status: RestaurantStatus,
    pub subscription_plan: SubscriptionPlan,
    pub is_open: bool,
    pub delivery_fee: Decimal,
    pub min_order_value: Decimal,
    pub evolution_api_instance_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub evolution_api_instance_token: Option<String>,
    pub evolution_api_connected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Instance name usable for outbound WhatsApp messages, if one is bound
    pub fn whatsapp_instance(&self) -> Option<&str> {
        self.evolution_api_instance_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRestaurant {
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    pub subscription_plan: Option<SubscriptionPlan>,
    pub delivery_fee: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
}

/// Partial update, omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRestaurant {
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    pub status: Option<RestaurantStatus>,
    pub subscription_plan: Option<SubscriptionPlan>,
    pub is_open: Option<bool>,
    pub delivery_fee: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
}

impl UpdateRestaurant {
    /// Applies the provided fields onto an existing restaurant
    pub fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if self.description.is_some() {
            restaurant.description = self.description;
        }
        if self.phone.is_some() {
            restaurant.phone = self.phone;
        }
        if self.email.is_some() {
            restaurant.email = self.email;
        }
        if self.address.is_some() {
            restaurant.address = self.address;
        }
        if self.logo_url.is_some() {
            restaurant.logo_url = self.logo_url;
        }
        if let Some(status) = self.status {
            restaurant.status = status;
        }
        if let Some(plan) = self.subscription_plan {
            restaurant.subscription_plan = plan;
        }
        if let Some(is_open) = self.is_open {
            restaurant.is_open = is_open;
        }
        if let Some(fee) = self.delivery_fee {
            restaurant.delivery_fee = fee;
        }
        if let Some(min) = self.min_order_value {
            restaurant.min_order_value = min;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_token_is_never_serialized() {
        let mut restaurant = fixtures::restaurant(Some("restaurant-1"));
        restaurant.evolution_api_instance_token = Some("secret-token".to_string());
        let json = serde_json::to_string(&restaurant).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"evolution_api_instance_name\":\"restaurant-1\""));
    }

    #[test]
    fn test_whatsapp_instance_ignores_blank_names() {
        assert_eq!(fixtures::restaurant(Some("  ")).whatsapp_instance(), None);
        assert_eq!(
            fixtures::restaurant(Some("restaurant-1")).whatsapp_instance(),
            Some("restaurant-1")
        );
    }

    #[test]
    fn test_partial_update_keeps_omitted_fields() {
        let mut restaurant = fixtures::restaurant(None);
        let update: UpdateRestaurant =
            serde_json::from_str(r#"{"is_open": false, "delivery_fee": "8.00"}"#).unwrap();
        update.apply_to(&mut restaurant);
        assert!(!restaurant.is_open);
        assert_eq!(restaurant.delivery_fee, dec!(8.00));
        assert_eq!(restaurant.name, "Cantina da Praça");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RestaurantStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }

    #[test]
    fn test_create_requires_name() {
        let request = CreateRestaurant {
            name: "   ".to_string(),
            description: None,
            phone: None,
            email: None,
            address: None,
            logo_url: None,
            subscription_plan: None,
            delivery_fee: None,
            min_order_value: None,
        };
        assert!(request.validate().is_err());
    }
}

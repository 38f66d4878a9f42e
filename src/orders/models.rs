use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Order status; any status may follow any other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Delivery,
    Pickup,
    DineIn,
}

/// Persisted order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    /// `YYYYMMDD-NNNN`, sequential per restaurant and day
    pub order_number: String,
    pub restaurant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub delivery_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line of an order with the product price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    /// None once the product has been deleted; prices stay on the line
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub additional_options: Option<serde_json::Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub additional_options: Option<serde_json::Value>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrder {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 120), custom = "crate::validation::validate_not_blank")]
    pub customer_name: String,
    #[validate(custom = "crate::validation::validate_phone")]
    pub customer_phone: String,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(max = 40))]
    pub coupon_code: Option<String>,
}

/// Partial update of an order
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub is_paid: Option<bool>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(max = 500))]
    pub delivery_address: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub customer_name: Option<String>,
}

impl UpdateOrder {
    pub fn apply_to(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(method) = self.payment_method {
            order.payment_method = method;
        }
        if let Some(paid) = self.is_paid {
            order.is_paid = paid;
        }
        if self.notes.is_some() {
            order.notes = self.notes;
        }
        if self.delivery_address.is_some() {
            order.delivery_address = self.delivery_address;
        }
        if self.customer_name.is_some() {
            order.customer_name = self.customer_name;
        }
    }
}

/// Body of PATCH /api/orders/:id/status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Order columns computed by the service before insertion
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub additional_options: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Order together with its items, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderResponse {
    /// Pairs each order with its items, keeping the order of `orders`
    pub fn group(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<OrderResponse> {
        let mut by_order: std::collections::HashMap<Uuid, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }
        orders
            .into_iter()
            .map(|order| OrderResponse {
                items: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect()
    }
}

/// Query parameters for GET /api/orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub restaurant_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}

/// Query parameters for GET /api/orders/by-phone
#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
    pub restaurant_id: Option<Uuid>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    pub fn order(restaurant_id: Option<Uuid>, order_type: OrderType, status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "20240601-0007".to_string(),
            restaurant_id,
            customer_id: None,
            status,
            payment_method: PaymentMethod::Pix,
            order_type,
            subtotal: dec!(42.00),
            delivery_fee: dec!(6.50),
            discount: dec!(0),
            total: dec!(48.50),
            coupon_code: None,
            notes: None,
            is_paid: false,
            delivery_address: Some("Rua das Flores, 10".to_string()),
            customer_name: Some("Maria".to_string()),
            customer_phone: Some("5511988887777".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
        let parsed: OrderStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Canceled);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::OutForDelivery.to_string(), "out_for_delivery");
    }

    #[test]
    fn test_create_order_requires_items() {
        let request: CreateOrder = serde_json::from_value(serde_json::json!({
            "restaurant_id": Uuid::new_v4(),
            "customer_name": "Maria",
            "customer_phone": "11988887777",
            "payment_method": "pix",
            "order_type": "pickup",
            "items": []
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_applies_only_given_fields() {
        let mut order = fixtures::order(None, OrderType::Delivery, OrderStatus::Pending);
        UpdateOrder {
            status: Some(OrderStatus::Confirmed),
            is_paid: Some(true),
            ..Default::default()
        }
        .apply_to(&mut order);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.is_paid);
        assert_eq!(order.customer_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_group_keeps_order_and_attaches_items() {
        let a = fixtures::order(None, OrderType::Pickup, OrderStatus::Pending);
        let b = fixtures::order(None, OrderType::Pickup, OrderStatus::Pending);
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: b.id,
            product_id: Some(Uuid::new_v4()),
            quantity: 2,
            unit_price: rust_decimal_macros::dec!(10),
            total_price: rust_decimal_macros::dec!(20),
            additional_options: None,
            notes: None,
        };
        let grouped = OrderResponse::group(vec![a.clone(), b.clone()], vec![item]);
        assert_eq!(grouped[0].order.id, a.id);
        assert!(grouped[0].items.is_empty());
        assert_eq!(grouped[1].items.len(), 1);
    }
}

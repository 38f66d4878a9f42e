use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::coupons::CouponService;
use crate::customers::CustomerService;
use crate::error::ApiError;
use crate::menu::{MenuService, Product};
use crate::orders::{
    CreateOrder, NewOrder, NewOrderItem, NotificationOutcome, Order, OrderError, OrderNotifier,
    OrderQuery, OrderRepository, OrderResponse, OrderStatus, OrderType, PriceCalculator,
    UpdateOrder,
};
use crate::phone;
use crate::restaurants::RestaurantService;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    restaurants: RestaurantService,
    menu: MenuService,
    customers: CustomerService,
    coupons: CouponService,
    notifier: OrderNotifier,
}

/// Checks the requested items against the loaded products and prices each line
///
/// Products must exist, belong to the restaurant and be available.
pub fn price_items(
    restaurant_id: Uuid,
    request: &CreateOrder,
    products: &HashMap<Uuid, Product>,
) -> Result<Vec<NewOrderItem>, OrderError> {
    request
        .items
        .iter()
        .map(|item| {
            if item.quantity < 1 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
            }
            let product = products
                .get(&item.product_id)
                .filter(|p| p.restaurant_id == restaurant_id)
                .ok_or(OrderError::ProductNotFound(item.product_id))?;
            if !product.is_available {
                return Err(OrderError::ProductUnavailable(product.name.clone()));
            }

            Ok(NewOrderItem {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.price,
                total_price: PriceCalculator::calculate_line_total(item.quantity, product.price),
                additional_options: item.additional_options.clone(),
                notes: item.notes.clone(),
            })
        })
        .collect()
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        restaurants: RestaurantService,
        menu: MenuService,
        customers: CustomerService,
        coupons: CouponService,
        notifier: OrderNotifier,
    ) -> Self {
        Self {
            repo,
            restaurants,
            menu,
            customers,
            coupons,
            notifier,
        }
    }

    /// Create a new order
    ///
    /// # Validation
    /// - The restaurant must exist and be open
    /// - Every product must exist, belong to the restaurant and be available
    /// - Prices are snapshotted from the current product prices
    /// - The subtotal must reach the restaurant minimum order value
    /// - Delivery orders need an address and pay the restaurant delivery fee
    /// - A coupon, when given, must apply to the subtotal and is redeemed atomically
    pub async fn create(&self, request: CreateOrder) -> Result<OrderResponse, ApiError> {
        let restaurant = self.restaurants.find_one(request.restaurant_id).await?;
        if !restaurant.is_open {
            return Err(OrderError::RestaurantClosed.into());
        }

        let product_ids: Vec<Uuid> = request.items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .menu
            .find_products(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let items = price_items(restaurant.id, &request, &products)?;

        let line_totals: Vec<Decimal> = items.iter().map(|i| i.total_price).collect();
        let subtotal = PriceCalculator::calculate_subtotal(&line_totals);
        if subtotal < restaurant.min_order_value {
            return Err(OrderError::BelowMinimumOrder(restaurant.min_order_value).into());
        }

        let delivery_fee = match request.order_type {
            OrderType::Delivery => {
                if request
                    .delivery_address
                    .as_deref()
                    .map_or(true, |a| a.trim().is_empty())
                {
                    return Err(OrderError::DeliveryAddressRequired.into());
                }
                restaurant.delivery_fee
            }
            OrderType::Pickup | OrderType::DineIn => Decimal::ZERO,
        };

        let (coupon, discount) = match request.coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => {
                let (coupon, discount) = self.coupons.evaluate(restaurant.id, code, subtotal).await?;
                (Some(coupon), discount)
            }
            None => (None, Decimal::ZERO),
        };

        let customer = self
            .customers
            .find_or_create_by_phone(restaurant.id, Some(&request.customer_name), &request.customer_phone)
            .await?;

        let new_order = NewOrder {
            restaurant_id: restaurant.id,
            customer_id: Some(customer.id),
            payment_method: request.payment_method,
            order_type: request.order_type,
            subtotal,
            delivery_fee,
            discount,
            total: PriceCalculator::calculate_total(subtotal, delivery_fee, discount),
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            notes: request.notes,
            delivery_address: request.delivery_address,
            customer_name: request.customer_name.trim().to_string(),
            customer_phone: phone::normalize(&request.customer_phone),
        };

        let created = self
            .repo
            .create(&new_order, &items, coupon.as_ref().map(|c| c.id))
            .await?;

        tracing::info!(
            "Created order {} for restaurant {} (total {})",
            created.order.order_number,
            restaurant.id,
            created.order.total
        );
        Ok(created)
    }

    pub async fn find_all(&self, query: &OrderQuery) -> Result<Vec<OrderResponse>, ApiError> {
        let orders = self.repo.find_all(query).await?;
        self.with_items(orders).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<OrderResponse, ApiError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        let items = self.repo.find_items(&[order.id]).await?;
        Ok(OrderResponse { order, items })
    }

    /// Applies a partial update and notifies the customer when the status changed
    ///
    /// The update is persisted first; a failed notification is logged and does not
    /// fail the request.
    pub async fn update(&self, id: Uuid, request: UpdateOrder) -> Result<OrderResponse, ApiError> {
        let mut order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        let previous_status = order.status;

        request.apply_to(&mut order);
        let updated = self.repo.update(&order).await?;

        if updated.status != previous_status {
            tracing::info!(
                "Order {} status changed {} -> {}",
                updated.order_number,
                previous_status,
                updated.status
            );
            self.notify_status_change(&updated, previous_status).await;
        }

        let items = self.repo.find_items(&[updated.id]).await?;
        Ok(OrderResponse {
            order: updated,
            items,
        })
    }

    async fn notify_status_change(&self, order: &Order, previous: OrderStatus) {
        let restaurant = match order.restaurant_id {
            Some(rid) => match self.restaurants.find_optional(rid).await {
                Ok(restaurant) => restaurant,
                Err(e) => {
                    tracing::warn!("Could not load restaurant {} for notification: {:?}", rid, e);
                    None
                }
            },
            None => None,
        };

        match self
            .notifier
            .handle_status_change(order, previous, restaurant.as_ref())
            .await
        {
            Ok(NotificationOutcome::Sent) => {}
            Ok(NotificationOutcome::Skipped(reason)) => {
                tracing::debug!("No notification for order {}: {:?}", order.order_number, reason);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to notify customer about order {}: {}",
                    order.order_number,
                    e
                );
            }
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.repo.delete(id).await? {
            return Err(OrderError::NotFound(id).into());
        }
        tracing::info!("Deleted order {}", id);
        Ok(())
    }

    /// Orders placed with any spelling of the phone number
    pub async fn find_by_customer_phone(
        &self,
        raw_phone: &str,
        restaurant_id: Option<Uuid>,
    ) -> Result<Vec<OrderResponse>, ApiError> {
        let variants = phone::variants(raw_phone);
        if variants.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!("Looking up orders by phone variants {:?}", variants);
        let orders = self.repo.find_by_phone_variants(&variants, restaurant_id).await?;
        self.with_items(orders).await
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderResponse>, ApiError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = self.repo.find_items(&ids).await?;
        Ok(OrderResponse::group(orders, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::models::fixtures::product;
    use crate::orders::{OrderItemRequest, PaymentMethod};
    use rust_decimal_macros::dec;

    fn request(restaurant_id: Uuid, items: Vec<(Uuid, i32)>) -> CreateOrder {
        CreateOrder {
            restaurant_id,
            customer_name: "Maria".to_string(),
            customer_phone: "11988887777".to_string(),
            payment_method: PaymentMethod::Pix,
            order_type: OrderType::Pickup,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| OrderItemRequest {
                    product_id,
                    quantity,
                    additional_options: None,
                    notes: None,
                })
                .collect(),
            delivery_address: None,
            notes: None,
            coupon_code: None,
        }
    }

    #[test]
    fn test_price_items_snapshots_prices() {
        let rid = Uuid::new_v4();
        let pizza = product(rid, None, "Pizza", dec!(39.90));
        let soda = product(rid, None, "Refrigerante", dec!(6.00));
        let products: HashMap<Uuid, Product> =
            [(pizza.id, pizza.clone()), (soda.id, soda.clone())].into_iter().collect();

        let items = price_items(rid, &request(rid, vec![(pizza.id, 2), (soda.id, 3)]), &products).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, dec!(39.90));
        assert_eq!(items[0].total_price, dec!(79.80));
        assert_eq!(items[1].total_price, dec!(18.00));
    }

    #[test]
    fn test_price_items_rejects_unknown_and_foreign_products() {
        let rid = Uuid::new_v4();
        let foreign = product(Uuid::new_v4(), None, "Sushi", dec!(50));
        let products: HashMap<Uuid, Product> = [(foreign.id, foreign.clone())].into_iter().collect();

        let err = price_items(rid, &request(rid, vec![(foreign.id, 1)]), &products).unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(id) if id == foreign.id));

        let missing = Uuid::new_v4();
        let err = price_items(rid, &request(rid, vec![(missing, 1)]), &products).unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(id) if id == missing));
    }

    #[test]
    fn test_price_items_rejects_unavailable_and_bad_quantity() {
        let rid = Uuid::new_v4();
        let mut pizza = product(rid, None, "Pizza", dec!(39.90));
        let products: HashMap<Uuid, Product> = [(pizza.id, pizza.clone())].into_iter().collect();

        let err = price_items(rid, &request(rid, vec![(pizza.id, 0)]), &products).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { quantity: 0, .. }));

        pizza.is_available = false;
        let products: HashMap<Uuid, Product> = [(pizza.id, pizza.clone())].into_iter().collect();
        let err = price_items(rid, &request(rid, vec![(pizza.id, 1)]), &products).unwrap_err();
        assert!(matches!(err, OrderError::ProductUnavailable(name) if name == "Pizza"));
    }
}

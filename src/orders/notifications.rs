// WhatsApp messages sent to customers when an order changes status

use std::sync::Arc;

use crate::orders::{Order, OrderStatus, OrderType, PriceCalculator};
use crate::phone;
use crate::restaurants::Restaurant;
use crate::whatsapp::{EvolutionError, WhatsAppGateway};

/// Why no message went out for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    StatusUnchanged,
    NoRestaurant,
    NoCustomerPhone,
    NoWhatsAppInstance,
    StatusNotNotified(OrderStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    Skipped(SkipReason),
}

/// Message for the customer when an order enters `order.status`
///
/// Returns None for statuses outside the notify set (pending).
pub fn status_message(order: &Order, restaurant_name: &str) -> Option<String> {
    let number = &order.order_number;
    let greeting = order
        .customer_name
        .as_deref()
        .map(|name| format!("Olá, {}! ", name))
        .unwrap_or_default();

    let text = match order.status {
        OrderStatus::Pending => return None,
        OrderStatus::Confirmed => format!(
            "✅ {}Seu pedido #{} foi confirmado pelo {}. Total: {}.",
            greeting,
            number,
            restaurant_name,
            PriceCalculator::format_brl(order.total)
        ),
        OrderStatus::Preparing => format!(
            "👨‍🍳 {}Seu pedido #{} já está sendo preparado!",
            greeting, number
        ),
        OrderStatus::Ready => match order.order_type {
            OrderType::Delivery => format!(
                "📦 {}Seu pedido #{} está pronto e logo sairá para entrega.",
                greeting, number
            ),
            OrderType::Pickup | OrderType::DineIn => format!(
                "🎉 {}Seu pedido #{} está pronto para retirada no {}!",
                greeting, number, restaurant_name
            ),
        },
        OrderStatus::OutForDelivery => format!(
            "🛵 {}Seu pedido #{} saiu para entrega e chega em breve!",
            greeting, number
        ),
        OrderStatus::Delivered => format!(
            "😋 Pedido #{} entregue. Obrigado por pedir no {}! Bom apetite!",
            number, restaurant_name
        ),
        OrderStatus::Canceled => format!(
            "❌ {}Seu pedido #{} foi cancelado. Qualquer dúvida, fale com o {}.",
            greeting, number, restaurant_name
        ),
    };

    Some(text)
}

/// Sends status-change messages through the WhatsApp gateway
#[derive(Clone)]
pub struct OrderNotifier {
    gateway: Arc<dyn WhatsAppGateway>,
}

impl OrderNotifier {
    pub fn new(gateway: Arc<dyn WhatsAppGateway>) -> Self {
        Self { gateway }
    }

    /// Notifies the customer that `order` moved from `previous` to its current status
    ///
    /// Missing restaurant, phone or WhatsApp instance skip silently. Gateway failures
    /// are returned; the caller decides whether they matter.
    pub async fn handle_status_change(
        &self,
        order: &Order,
        previous: OrderStatus,
        restaurant: Option<&Restaurant>,
    ) -> Result<NotificationOutcome, EvolutionError> {
        if order.status == previous {
            return Ok(NotificationOutcome::Skipped(SkipReason::StatusUnchanged));
        }
        let Some(restaurant) = restaurant else {
            return Ok(NotificationOutcome::Skipped(SkipReason::NoRestaurant));
        };
        let Some(customer_phone) = order.customer_phone.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(NotificationOutcome::Skipped(SkipReason::NoCustomerPhone));
        };
        let Some(instance) = restaurant.whatsapp_instance() else {
            return Ok(NotificationOutcome::Skipped(SkipReason::NoWhatsAppInstance));
        };
        let Some(text) = status_message(order, &restaurant.name) else {
            return Ok(NotificationOutcome::Skipped(SkipReason::StatusNotNotified(order.status)));
        };

        self.gateway
            .send_text(instance, &phone::normalize(customer_phone), &text)
            .await?;

        tracing::info!(
            "Notified customer of order {} about status {} -> {}",
            order.order_number,
            previous,
            order.status
        );
        Ok(NotificationOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::fixtures;
    use crate::restaurants::models::fixtures::restaurant;
    use crate::whatsapp::client::fake::RecordingGateway;

    const NOTIFY_SET: [OrderStatus; 6] = [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    #[tokio::test]
    async fn test_status_in_notify_set_sends_exactly_one_message() {
        let r = restaurant(Some("restaurant-1"));
        for status in NOTIFY_SET {
            let gateway = Arc::new(RecordingGateway::default());
            let notifier = OrderNotifier::new(gateway.clone());
            let order = fixtures::order(Some(r.id), OrderType::Delivery, status);

            let outcome = notifier
                .handle_status_change(&order, OrderStatus::Pending, Some(&r))
                .await
                .unwrap();

            assert_eq!(outcome, NotificationOutcome::Sent, "status {}", status);
            let sent = gateway.messages();
            assert_eq!(sent.len(), 1, "status {}", status);
            assert_eq!(sent[0].instance, "restaurant-1");
            assert_eq!(sent[0].number, "5511988887777");
            assert!(sent[0].text.contains("20240601-0007"));
        }
    }

    #[tokio::test]
    async fn test_pending_is_never_notified() {
        let r = restaurant(Some("restaurant-1"));
        let gateway = Arc::new(RecordingGateway::default());
        let notifier = OrderNotifier::new(gateway.clone());
        let order = fixtures::order(Some(r.id), OrderType::Pickup, OrderStatus::Pending);

        let outcome = notifier
            .handle_status_change(&order, OrderStatus::Confirmed, Some(&r))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            NotificationOutcome::Skipped(SkipReason::StatusNotNotified(OrderStatus::Pending))
        );
        assert!(gateway.messages().is_empty());
    }

    #[tokio::test]
    async fn test_missing_prerequisites_skip_silently() {
        let gateway = Arc::new(RecordingGateway::default());
        let notifier = OrderNotifier::new(gateway.clone());
        let bound = restaurant(Some("restaurant-1"));
        let unbound = restaurant(None);
        let order = fixtures::order(Some(bound.id), OrderType::Pickup, OrderStatus::Ready);

        let outcome = notifier
            .handle_status_change(&order, OrderStatus::Preparing, None)
            .await
            .unwrap();
        assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::NoRestaurant));

        let outcome = notifier
            .handle_status_change(&order, OrderStatus::Preparing, Some(&unbound))
            .await
            .unwrap();
        assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::NoWhatsAppInstance));

        let mut no_phone = order.clone();
        no_phone.customer_phone = None;
        let outcome = notifier
            .handle_status_change(&no_phone, OrderStatus::Preparing, Some(&bound))
            .await
            .unwrap();
        assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::NoCustomerPhone));

        let outcome = notifier
            .handle_status_change(&order, OrderStatus::Ready, Some(&bound))
            .await
            .unwrap();
        assert_eq!(outcome, NotificationOutcome::Skipped(SkipReason::StatusUnchanged));

        assert!(gateway.messages().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_returned() {
        let r = restaurant(Some("restaurant-1"));
        let notifier = OrderNotifier::new(Arc::new(RecordingGateway::failing()));
        let order = fixtures::order(Some(r.id), OrderType::Pickup, OrderStatus::Confirmed);

        let result = notifier
            .handle_status_change(&order, OrderStatus::Pending, Some(&r))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_ready_message_depends_on_order_type() {
        let pickup = fixtures::order(None, OrderType::Pickup, OrderStatus::Ready);
        let delivery = fixtures::order(None, OrderType::Delivery, OrderStatus::Ready);

        let pickup_text = status_message(&pickup, "Cantina").unwrap();
        let delivery_text = status_message(&delivery, "Cantina").unwrap();

        assert!(pickup_text.contains("retirada"));
        assert!(delivery_text.contains("entrega"));
        assert_ne!(pickup_text, delivery_text);
    }

    #[test]
    fn test_confirmed_message_shows_total() {
        let order = fixtures::order(None, OrderType::Delivery, OrderStatus::Confirmed);
        let text = status_message(&order, "Cantina").unwrap();
        assert!(text.contains("R$ 48,50"));
        assert!(text.starts_with("✅ Olá, Maria!"));
    }
}

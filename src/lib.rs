// Multi-tenant restaurant ordering backend with a WhatsApp assistant

pub mod ai;
pub mod config;
pub mod conversations;
pub mod coupons;
pub mod customers;
pub mod db;
pub mod error;
pub mod menu;
pub mod orders;
pub mod phone;
pub mod restaurants;
pub mod validation;
pub mod whatsapp;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ai::ChatCompletion;
use crate::config::AppConfig;
use crate::conversations::{ConversationRepository, ConversationService};
use crate::coupons::{CouponRepository, CouponService};
use crate::customers::{CustomerRepository, CustomerService};
use crate::menu::{CategoryRepository, MenuService, ProductRepository};
use crate::orders::{OrderNotifier, OrderRepository, OrderService};
use crate::restaurants::{RestaurantRepository, RestaurantService};
use crate::whatsapp::{EvolutionApiClient, WhatsAppGateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub restaurants: RestaurantService,
    pub menu: MenuService,
    pub customers: CustomerService,
    pub coupons: CouponService,
    pub orders: OrderService,
    pub conversations: ConversationService,
    pub evolution: Arc<EvolutionApiClient>,
}

impl AppState {
    /// Wires repositories and services around one pool and the outbound clients
    pub fn new(
        db: PgPool,
        config: AppConfig,
        evolution: Arc<EvolutionApiClient>,
        ai: Arc<dyn ChatCompletion>,
    ) -> Self {
        let gateway: Arc<dyn WhatsAppGateway> = evolution.clone();

        let restaurants = RestaurantService::new(RestaurantRepository::new(db.clone()));
        let menu = MenuService::new(
            CategoryRepository::new(db.clone()),
            ProductRepository::new(db.clone()),
        );
        let customers = CustomerService::new(CustomerRepository::new(db.clone()));
        let coupons = CouponService::new(CouponRepository::new(db.clone()));

        let orders = OrderService::new(
            OrderRepository::new(db.clone()),
            restaurants.clone(),
            menu.clone(),
            customers.clone(),
            coupons.clone(),
            OrderNotifier::new(gateway.clone()),
        );
        let conversations = ConversationService::new(
            ConversationRepository::new(db.clone()),
            restaurants.clone(),
            menu.clone(),
            customers.clone(),
            coupons.clone(),
            ai,
            gateway,
            config.follow_up.clone(),
        );

        Self {
            db,
            config: Arc::new(config),
            restaurants,
            menu,
            customers,
            coupons,
            orders,
            conversations,
            evolution,
        }
    }
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Restaurants and their WhatsApp binding
        .route(
            "/api/restaurants",
            post(restaurants::create_restaurant).get(restaurants::list_restaurants),
        )
        .route(
            "/api/restaurants/:id",
            get(restaurants::get_restaurant)
                .patch(restaurants::update_restaurant)
                .delete(restaurants::delete_restaurant),
        )
        .route("/api/restaurants/:id/menu", get(restaurants::get_restaurant_menu))
        .route(
            "/api/restaurants/:id/whatsapp",
            post(whatsapp::handlers::create_instance).delete(whatsapp::handlers::delete_instance),
        )
        .route(
            "/api/restaurants/:id/whatsapp/qrcode",
            get(whatsapp::handlers::get_qr_code),
        )
        .route(
            "/api/restaurants/:id/whatsapp/status",
            get(whatsapp::handlers::get_status),
        )
        // Menu
        .route(
            "/api/categories",
            post(menu::create_category).get(menu::list_categories),
        )
        .route(
            "/api/categories/:id",
            get(menu::get_category)
                .patch(menu::update_category)
                .delete(menu::delete_category),
        )
        .route("/api/products", post(menu::create_product).get(menu::list_products))
        .route(
            "/api/products/:id",
            get(menu::get_product)
                .patch(menu::update_product)
                .delete(menu::delete_product),
        )
        // Customers
        .route(
            "/api/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route(
            "/api/customers/:id",
            get(customers::get_customer)
                .patch(customers::update_customer)
                .delete(customers::delete_customer),
        )
        // Orders
        .route("/api/orders", post(orders::create_order).get(orders::list_orders))
        .route("/api/orders/by-phone", get(orders::find_orders_by_phone))
        .route(
            "/api/orders/:id",
            get(orders::get_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/api/orders/:id/status", patch(orders::update_order_status))
        // Coupons
        .route("/api/coupons", post(coupons::create_coupon).get(coupons::list_coupons))
        .route("/api/coupons/validate", post(coupons::validate_coupon))
        .route(
            "/api/coupons/:id",
            get(coupons::get_coupon)
                .patch(coupons::update_coupon)
                .delete(coupons::delete_coupon),
        )
        .route("/api/coupons/:id/redeem", post(coupons::redeem_coupon))
        // Assistant
        .route("/api/ai/webhook", post(conversations::receive_webhook))
        .route("/api/ai/follow-ups", post(conversations::run_follow_ups))
        .route("/api/conversations", get(conversations::list_conversations))
        .route(
            "/api/conversations/:id/messages",
            get(conversations::list_messages),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

pub mod client;
pub mod error;
pub mod handlers;
pub mod models;

pub use client::{EvolutionApiClient, WhatsAppGateway};
pub use error::*;
pub use models::*;

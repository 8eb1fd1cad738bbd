//! HTTP API handlers for xfer-server

pub mod health;
pub mod products;
pub mod transfer;

pub use health::health_routes;
pub use products::{debug_products, list_products, search_products};
pub use transfer::submit_transfer;

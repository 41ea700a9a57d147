pub mod config;
pub mod handlers;
pub mod models;
pub mod server;
pub mod utils;

pub use crate::config::{Pricing, Settings};
pub use crate::models::{delivery_fee::DeliveryFee, delivery_request::DeliveryRequest};
pub use crate::utils::price::calculate;

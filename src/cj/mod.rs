//! Client for the CJDropShipping REST API.

mod client;
mod error;
mod types;

pub use client::{CjClient, DEFAULT_BASE_URL};
pub use error::CjError;
pub use types::{
    AccessToken, CjEnvelope, CjOrder, CjOrderPage, CreateOrderRequest, CreatedOrder,
    OrderLine, ShippingAddress,
};

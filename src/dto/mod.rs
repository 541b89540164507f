pub mod auth;
pub mod cj;
pub mod orders;
pub mod products;
pub mod stats;
pub mod trends;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod render;
pub mod store;
pub mod transform;

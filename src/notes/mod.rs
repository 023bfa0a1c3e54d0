pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod error;
pub mod gateway;
#[cfg(test)]
pub mod mock;
pub mod sync;
pub mod transport;
pub mod types;
pub mod view_model;

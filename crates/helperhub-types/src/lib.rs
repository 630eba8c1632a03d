pub mod api;
pub mod codec;
pub mod error;
pub mod models;

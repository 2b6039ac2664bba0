pub mod error;
pub mod rest;
pub mod websocket;

pub use rest::{create_rest_router, AppState};

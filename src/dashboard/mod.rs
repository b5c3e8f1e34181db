mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub use handlers::{api_routes, page_routes};

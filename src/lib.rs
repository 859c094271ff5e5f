pub mod dragon;
pub mod encounter;
pub mod engine;
pub mod error;
pub mod identity;
pub mod service;
pub mod store;
pub mod utils;

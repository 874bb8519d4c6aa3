// Library exports for integration tests and external use

pub mod api;
pub mod app_data;
pub mod capture;
pub mod config;
pub mod diff;
pub mod errors;
pub mod render;
pub mod services;
pub mod stores;
pub mod types;

pub use app_data::AppData;

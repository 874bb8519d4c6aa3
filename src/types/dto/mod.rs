// API DTOs - poem-openapi payload objects
pub mod audit;
pub mod common;
pub mod report;
pub mod sample;

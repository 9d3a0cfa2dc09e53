pub mod audit;
pub mod auth_service;
pub mod file_service;

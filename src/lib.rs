pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pdf;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, InvoiceStore, PgInvoiceStore};
pub use error::AppError;
pub use service::DashboardService;

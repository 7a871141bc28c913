mod routes;
mod telemetry;

pub mod app;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

pub use app::start_app;

pub mod app;
pub mod calc;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod server;
pub mod state;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use state::AppState;

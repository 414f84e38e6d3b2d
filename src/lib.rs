pub mod app;
pub mod auth;
pub mod bookings;
pub mod cms;
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod flights;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;

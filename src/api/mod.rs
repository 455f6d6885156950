//! HTTP surface: JSON endpoints per stage plus the global chat.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, AppError, ErrorCode};
pub use routes::create_router;
pub use state::AppState;

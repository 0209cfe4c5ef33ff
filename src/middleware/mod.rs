/// Middleware module
///
/// Authentication and request logging.

mod jwt_middleware;
mod logger;

pub use jwt_middleware::JwtMiddleware;
pub use logger::{current_request_id, LoggerMiddleware, REQUEST_ID_HEADER};

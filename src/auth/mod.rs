/// Authentication module
///
/// Credential checks, password hashing, JWT handling and the refresh-token
/// session lifecycle.

mod claims;
mod cookies;
mod credentials;
mod jwt;
mod password;
mod session;

pub use claims::{Claims, RefreshClaims};
pub use cookies::{removal_cookie, token_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use credentials::verify_credentials;
pub use jwt::{generate_access_token, generate_refresh_token, validate_access_token, validate_refresh_token};
pub use password::{hash_password, verify_password};
pub use session::{hash_token, issue_tokens, revoke_session, rotate_refresh_token, TokenPair};

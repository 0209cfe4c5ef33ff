/// Token cookies
///
/// Both tokens travel as `HttpOnly; Secure` cookies alongside the JSON
/// body. Names are shared with the middleware and the refresh handler.

use actix_web::cookie::{time::Duration, Cookie};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Build a session cookie living as long as the token it carries
pub fn token_cookie(name: &'static str, token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Build a cookie that tells the browser to drop `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .finish();
    cookie.make_removal();
    cookie
}

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const TOKEN_COOKIE: &str = "token";

/// Value written on logout; treated as "no token" by the auth extractor.
pub const LOGGED_OUT: &str = "none";

const MAX_COOKIE_DAYS: i64 = 3_650;

/// `days` is clamped to `0..=3650`; `time::Duration::days` panics on overflow.
pub fn token_cookie(token: String, days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(days.clamp(0, MAX_COOKIE_DAYS)))
        .build()
}

/// Overwrites the token cookie with a value that expires after one second.
pub fn logout_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, LOGGED_OUT))
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(1))
        .build()
}

//! Cookie parsing and `Set-Cookie` construction for session tokens.

use axum::http::{HeaderMap, header};

use super::types::CredentialPair;

/// Cookie name for the access token (50 minutes).
pub const AUTH_COOKIE_NAME: &str = "authToken";

/// Cookie name for the refresh token (120 minutes).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Value of the first cookie called `name`.
///
/// HTTP/2 clients may split cookies over several `Cookie` headers, so every
/// header is searched in order. Headers that are not valid visible ASCII are
/// skipped.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

/// Build an HttpOnly `Set-Cookie` value.
pub fn session_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// `Set-Cookie` values storing both tokens of a pair.
pub fn pair_cookies(pair: &CredentialPair, secure: bool) -> [String; 2] {
    [
        session_cookie(
            AUTH_COOKIE_NAME,
            &pair.access.token,
            pair.access.duration,
            secure,
        ),
        session_cookie(
            REFRESH_COOKIE_NAME,
            &pair.refresh.token,
            pair.refresh.duration,
            secure,
        ),
    ]
}

/// `Set-Cookie` values clearing both session cookies.
pub fn cleared_cookies(secure: bool) -> [String; 2] {
    [
        session_cookie(AUTH_COOKIE_NAME, "", 0, secure),
        session_cookie(REFRESH_COOKIE_NAME, "", 0, secure),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cookie_headers(lines: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for line in lines {
            headers.append(header::COOKIE, HeaderValue::from_static(line));
        }
        headers
    }

    #[test]
    fn test_get_cookie_among_others() {
        let headers = cookie_headers(&["foo=bar; authToken=abc123 ; refreshToken=xyz789"]);

        assert_eq!(get_cookie(&headers, AUTH_COOKIE_NAME), Some("abc123"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), Some("xyz789"));
        assert_eq!(get_cookie(&cookie_headers(&[]), AUTH_COOKIE_NAME), None);
    }

    #[test]
    fn test_get_cookie_split_across_headers() {
        let headers = cookie_headers(&["authToken=abc123", "theme=dark; refreshToken=xyz789"]);

        assert_eq!(get_cookie(&headers, AUTH_COOKIE_NAME), Some("abc123"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE_NAME), Some("xyz789"));
    }

    #[test]
    fn test_get_cookie_first_occurrence_wins() {
        let headers = cookie_headers(&["authToken=first", "authToken=second"]);
        assert_eq!(get_cookie(&headers, AUTH_COOKIE_NAME), Some("first"));
    }

    #[test]
    fn test_get_cookie_empty_value() {
        // The gate treats this as a missing credential
        let headers = cookie_headers(&["authToken=; refreshToken=xyz789"]);
        assert_eq!(get_cookie(&headers, AUTH_COOKIE_NAME), Some(""));
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie(AUTH_COOKIE_NAME, "tok", 3000, false);
        assert_eq!(
            cookie,
            "authToken=tok; HttpOnly; SameSite=Strict; Path=/; Max-Age=3000"
        );

        let secure = session_cookie(REFRESH_COOKIE_NAME, "tok", 7200, true);
        assert!(secure.ends_with("; Secure"));
        assert!(secure.contains("HttpOnly"));
    }

    #[test]
    fn test_cleared_cookies() {
        let [access, refresh] = cleared_cookies(false);
        assert!(access.starts_with("authToken=;"));
        assert!(access.contains("Max-Age=0"));
        assert!(refresh.starts_with("refreshToken=;"));
        assert!(refresh.contains("Max-Age=0"));
    }
}

//! Session cookie attributes
//!
//! Every write of a session cookie, setting or clearing, goes through
//! a [`CookieProfile`] so the security flags cannot drift between the two.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Duration;

/// Transport attributes for one session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub name: String,
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
    pub path: &'static str,
    /// Seconds; zero deletes the cookie on the client
    pub max_age: i64,
}

impl CookieAttributes {
    /// Build the `Set-Cookie` cookie carrying `value`
    pub fn into_cookie(self, value: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.name, value.into()))
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .path(self.path)
            .max_age(cookie::time::Duration::seconds(self.max_age))
            .build()
    }
}

/// Cookie name, transport security and lifetime for a session scheme
#[derive(Debug, Clone)]
pub struct CookieProfile {
    name: String,
    secure: bool,
    lifetime: Duration,
}

impl CookieProfile {
    /// # Arguments
    /// * `name` - Cookie name
    /// * `lifetime` - Matches the token lifetime
    /// * `secure` - Production transport (https)
    pub fn new(name: impl Into<String>, lifetime: Duration, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
            lifetime,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes for issuing a session
    pub fn set_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            name: self.name.clone(),
            http_only: true,
            same_site: SameSite::Lax,
            secure: self.secure,
            path: "/",
            max_age: self.lifetime.num_seconds(),
        }
    }

    /// Attributes for clearing a session, regardless of the lifetime it was issued with
    pub fn clear_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            max_age: 0,
            ..self.set_attributes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attributes_for_production() {
        let profile = CookieProfile::new("admin_session", Duration::hours(24), true);

        assert_eq!(
            profile.set_attributes(),
            CookieAttributes {
                name: "admin_session".to_string(),
                http_only: true,
                same_site: SameSite::Lax,
                secure: true,
                path: "/",
                max_age: 86_400,
            }
        );
    }

    #[test]
    fn set_attributes_for_local_development() {
        let attributes = CookieProfile::new("admin_session", Duration::hours(24), false).set_attributes();

        assert!(!attributes.secure);
        assert!(attributes.http_only);
        assert_eq!(attributes.same_site, SameSite::Lax);
        assert_eq!(attributes.path, "/");
        assert_eq!(attributes.max_age, 86_400);
    }

    #[test]
    fn clear_attributes_only_differ_in_max_age() {
        let profile = CookieProfile::new("tourney_user", Duration::days(30), true);
        let set = profile.set_attributes();
        let clear = profile.clear_attributes();

        assert_eq!(clear.max_age, 0);
        assert_eq!(clear, CookieAttributes { max_age: 0, ..set });
    }

    #[test]
    fn rendered_cookie_carries_every_attribute() {
        let cookie = CookieProfile::new("admin_session", Duration::hours(24), true)
            .set_attributes()
            .into_cookie("token-value");

        assert_eq!(cookie.name(), "admin_session");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(86_400)));

        let header = cookie.to_string();
        assert!(header.starts_with("admin_session=token-value"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Secure"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=86400"));
    }

    #[test]
    fn rendered_clear_cookie_expires_immediately() {
        let header = CookieProfile::new("admin_session", Duration::hours(24), false)
            .clear_attributes()
            .into_cookie("")
            .to_string();

        assert!(header.starts_with("admin_session="));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("HttpOnly"));
        assert!(!header.contains("Secure"));
    }
}

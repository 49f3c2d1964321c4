use crate::config::BasicConfig;
use crate::error::BackendError;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use chrono::{DateTime, Utc};
use tracing::warn;

/// How the authentication cookie is issued.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub lifetime: chrono::Duration,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        CookieSettings::from(&BasicConfig::default())
    }
}

impl From<&BasicConfig> for CookieSettings {
    fn from(basic: &BasicConfig) -> Self {
        Self {
            name: basic.cookie_name.clone(),
            lifetime: chrono::Duration::days(basic.cookie_lifetime_days.max(1)),
            secure: !basic.insecure_cookie,
        }
    }
}

impl CookieSettings {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lifetime
    }

    /// Cookie carrying `session_id`. Browser-session cookies get no `Max-Age`.
    pub fn session_cookie(&self, session_id: String, persistent: bool) -> Cookie<'static> {
        let mut builder = Cookie::build(Cookie::new(self.name.clone(), session_id))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site());
        if persistent {
            builder = builder.max_age(time::Duration::seconds(self.lifetime.num_seconds()));
        }
        builder.build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(Cookie::new(self.name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site())
            .build()
    }

    // Cross-site WASM clients need SameSite=None, which browsers only accept with Secure.
    fn same_site(&self) -> SameSite {
        if self.secure {
            SameSite::None
        } else {
            SameSite::Lax
        }
    }
}

/// Cookie encryption key from configuration, or a random one when unset.
pub fn cookie_key(basic: &BasicConfig) -> Result<Key, BackendError> {
    match basic.cookie_key.as_deref() {
        Some(secret) => Key::try_from(secret.as_bytes()).map_err(|e| {
            BackendError::Config(format!("basic.cookie_key must be at least 64 bytes: {e}"))
        }),
        None => {
            warn!("no cookie key configured; generated a random one, sessions end on restart");
            Ok(Key::generate())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistent_cookie_has_max_age_session_cookie_does_not() {
        let settings = CookieSettings::default();

        let persistent = settings.session_cookie("abc".to_string(), true);
        assert_eq!(persistent.name(), "Identity.Application");
        assert_eq!(persistent.max_age(), Some(time::Duration::days(14)));
        assert_eq!(persistent.same_site(), Some(SameSite::None));
        assert_eq!(persistent.secure(), Some(true));

        let session = settings.session_cookie("abc".to_string(), false);
        assert_eq!(session.max_age(), None);
    }

    #[test]
    fn short_cookie_key_is_rejected() {
        let mut basic = BasicConfig::default();
        basic.cookie_key = Some("too-short".to_string());
        assert!(matches!(cookie_key(&basic), Err(BackendError::Config(_))));

        basic.cookie_key = Some("k".repeat(64));
        assert!(cookie_key(&basic).is_ok());
    }
}

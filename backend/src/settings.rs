//! Application settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `MICROBLOG_*` environment variables and
//! configuration files. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_MAX_AVATAR_BYTES;
use crate::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POSTS_PER_PAGE: u32 = 3;
const DEFAULT_UPLOAD_DIR: &str = "static/upload";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_SESSION_TTL_HOURS: i64 = 14 * 24;

/// Errors raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind_addr '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Microblog server settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MICROBLOG")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; unset runs on in-memory storage.
    pub database_url: Option<String>,
    /// Apply pending migrations at start-up.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Posts per feed page.
    pub posts_per_page: Option<u32>,
    /// Directory avatars are written to.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted avatar upload, in bytes.
    pub max_upload_bytes: Option<usize>,
    /// Directory for rolling log files.
    pub log_dir: Option<PathBuf>,
    /// Session signing key file.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`; parsed during session validation.
    pub session_cookie_secure: Option<String>,
    /// Session cookie `SameSite` policy.
    pub session_same_site: Option<String>,
    /// Allow a generated session key when the key file is missing.
    pub session_allow_ephemeral: Option<String>,
    /// Session lifetime in hours.
    pub session_ttl_hours: Option<i64>,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Database URL when one is configured and non-empty.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations
    }

    /// Posts per feed page; never zero.
    pub fn posts_per_page(&self) -> u32 {
        self.posts_per_page.unwrap_or(DEFAULT_POSTS_PER_PAGE).max(1)
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_AVATAR_BYTES)
    }

    pub fn log_dir(&self) -> &Path {
        self.log_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR))
    }

    /// Session lifetime; non-positive values fall back to two weeks.
    pub fn session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours
            .filter(|hours| *hours > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS)
    }

    /// Session toggles for validation against the build mode.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure.clone(),
            same_site: self.session_same_site.clone(),
            allow_ephemeral: self.session_allow_ephemeral.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::inbound::http::session_config::{BuildMode, SessionConfigError, session_settings};

    const VARS: [&str; 12] = [
        "MICROBLOG_BIND_ADDR",
        "MICROBLOG_DATABASE_URL",
        "MICROBLOG_RUN_MIGRATIONS",
        "MICROBLOG_POSTS_PER_PAGE",
        "MICROBLOG_UPLOAD_DIR",
        "MICROBLOG_MAX_UPLOAD_BYTES",
        "MICROBLOG_LOG_DIR",
        "MICROBLOG_SESSION_KEY_FILE",
        "MICROBLOG_SESSION_COOKIE_SECURE",
        "MICROBLOG_SESSION_SAME_SITE",
        "MICROBLOG_SESSION_ALLOW_EPHEMERAL",
        "MICROBLOG_SESSION_TTL_HOURS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("microblog")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(settings.database_url(), None);
        assert!(settings.run_migrations());
        assert_eq!(settings.posts_per_page(), 3);
        assert_eq!(settings.upload_dir(), Path::new("static/upload"));
        assert_eq!(settings.max_upload_bytes(), 2 * 1024 * 1024);
        assert_eq!(settings.log_dir(), Path::new("logs"));
        assert_eq!(settings.session_ttl_hours(), 336);
    }

    #[rstest]
    fn unset_session_flags_stay_unset() {
        let _guard = lock_env(env_with(&[]));

        let toggles = load_from_empty_args().session_toggles();

        assert_eq!(toggles.cookie_secure, None);
        assert_eq!(toggles.allow_ephemeral, None);
        assert_eq!(toggles.same_site, None);
        assert_eq!(toggles.key_file, None);
    }

    #[rstest]
    fn explicit_session_flags_are_kept_verbatim() {
        let _guard = lock_env(env_with(&[
            ("MICROBLOG_SESSION_COOKIE_SECURE", "false"),
            ("MICROBLOG_SESSION_ALLOW_EPHEMERAL", "0"),
        ]));

        let toggles = load_from_empty_args().session_toggles();

        assert_eq!(toggles.cookie_secure.as_deref(), Some("false"));
        assert_eq!(toggles.allow_ephemeral.as_deref(), Some("0"));
    }

    #[rstest]
    fn release_validation_rejects_unconfigured_cookie_flag() {
        let _guard = lock_env(env_with(&[]));

        let result = session_settings(
            &load_from_empty_args().session_toggles(),
            BuildMode::Release,
        );

        assert!(matches!(
            result,
            Err(SessionConfigError::MissingSetting {
                name: "session_cookie_secure"
            })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("MICROBLOG_BIND_ADDR", "127.0.0.1:9000"),
            ("MICROBLOG_DATABASE_URL", "postgres://localhost/microblog"),
            ("MICROBLOG_RUN_MIGRATIONS", "false"),
            ("MICROBLOG_POSTS_PER_PAGE", "10"),
            ("MICROBLOG_UPLOAD_DIR", "/srv/avatars"),
            ("MICROBLOG_SESSION_SAME_SITE", "Strict"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("configured address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/microblog")
        );
        assert!(!settings.run_migrations());
        assert_eq!(settings.posts_per_page(), 10);
        assert_eq!(settings.upload_dir(), Path::new("/srv/avatars"));
        assert_eq!(
            settings.session_toggles().same_site.as_deref(),
            Some("Strict")
        );
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let settings = AppSettings {
            database_url: Some("  ".to_owned()),
            ..AppSettings::default()
        };

        assert_eq!(settings.database_url(), None);
    }

    #[rstest]
    #[case(Some(0), 1)]
    #[case(Some(7), 7)]
    fn posts_per_page_is_never_zero(#[case] configured: Option<u32>, #[case] expected: u32) {
        let settings = AppSettings {
            posts_per_page: configured,
            ..AppSettings::default()
        };

        assert_eq!(settings.posts_per_page(), expected);
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not an address".to_owned()),
            ..AppSettings::default()
        };

        let err = settings.bind_addr().expect_err("invalid address");

        assert!(err.to_string().contains("not an address"));
    }
}

//! Session cookie policy.
//!
//! The sign-in session lives entirely in an encrypted cookie. This module
//! reads the key file and cookie toggles from the environment, applies the
//! stricter release-build rules, and builds the [`SessionMiddleware`] the
//! server wraps around pages and actions.
//!
//! | Variable                  | Debug default     | Release      |
//! |---------------------------|-------------------|--------------|
//! | `SESSION_KEY_FILE`        | temporary key     | required, >= 64 bytes |
//! | `SESSION_COOKIE_SECURE`   | `true`            | required     |
//! | `SESSION_SAMESITE`        | `Lax`             | required     |
//! | `SESSION_ALLOW_EPHEMERAL` | `false`           | must be `0`  |

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::{info, warn};
use zeroize::Zeroize;

pub mod fingerprint;
mod parsing;

use fingerprint::key_fingerprint;
use parsing::{BoolEnvConfig, debug_warn_or_error, parse_bool_env, parse_same_site_value};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";

/// Name of the sign-in session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Idle lifetime of a sign-in session.
pub const SESSION_TTL_HOURS: i64 = 2;

/// How strictly configuration problems are treated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or malformed toggles fall back to defaults with a warning.
    Debug,
    /// Every toggle must be present and valid.
    Release,
}

impl BuildMode {
    /// Pick the mode matching `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use facility_ops::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated cookie policy for sign-in sessions.
#[derive(Clone)]
pub struct SessionPolicy {
    /// Key encrypting the session cookie.
    pub key: Key,
    /// Whether session and preference cookies carry `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` attribute of the session cookie.
    pub same_site: SameSite,
}

/// Reasons the session policy could not be built.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

impl SessionPolicy {
    /// Read the policy from `env`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use actix_web::cookie::SameSite;
    /// use facility_ops::inbound::http::session_config::{BuildMode, SessionPolicy};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "SESSION_COOKIE_SECURE" => Some("0".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let policy = SessionPolicy::from_env(&env, BuildMode::Debug).expect("debug policy");
    /// assert!(!policy.cookie_secure);
    /// assert_eq!(policy.same_site, SameSite::Lax);
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, SessionConfigError> {
        let cookie_secure = parse_bool_env(
            env,
            mode,
            BoolEnvConfig::new(COOKIE_SECURE_ENV, true),
            |flag, _| Ok(flag),
        )?;
        let same_site = same_site_from_env(env, mode, cookie_secure)?;
        let allow_ephemeral = parse_bool_env(
            env,
            mode,
            BoolEnvConfig::new(ALLOW_EPHEMERAL_ENV, false),
            |flag, build| {
                if flag && !build.is_debug() {
                    Err(SessionConfigError::EphemeralNotAllowed)
                } else {
                    Ok(flag)
                }
            },
        )?;
        let key = session_key_from_env(env, mode, allow_ephemeral)?;
        info!(
            fingerprint = %key_fingerprint(&key),
            cookie_secure,
            same_site = ?same_site,
            "session key loaded"
        );

        Ok(Self {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// Cookie-session middleware applying this policy.
    ///
    /// Sessions are encrypted (not merely signed), http-only, and expire
    /// after [`SESSION_TTL_HOURS`] of inactivity.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    match env.string(SAMESITE_ENV) {
        Some(value) => parse_same_site_value(value, mode, cookie_secure, fallback),
        None => debug_warn_or_error(
            mode,
            fallback,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            || warn!("SESSION_SAMESITE not set; using default"),
        ),
    }
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if !mode.is_debug() && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

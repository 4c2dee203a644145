// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and environment configuration.

use clap::Parser;
use complaint_desk_api::{AuthConfig, ThrottlePolicy};
use complaint_desk_domain::{DEFAULT_TIME_ZONE, Tz, parse_time_zone};
use time::Duration;

/// Complaint Desk HTTP server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. Uses an in-memory database if omitted.
    #[arg(short, long, env = "COMPLAINT_DESK_DATABASE")]
    pub database: Option<String>,

    /// Address to bind to.
    #[arg(long, env = "COMPLAINT_DESK_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on.
    #[arg(short, long, env = "COMPLAINT_DESK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Hours a session stays valid after login.
    #[arg(long, env = "COMPLAINT_DESK_SESSION_TTL_HOURS", default_value_t = 24)]
    pub session_ttl_hours: i64,

    /// Failed logins within the window before an identifier is locked.
    #[arg(long, env = "COMPLAINT_DESK_MAX_LOGIN_ATTEMPTS", default_value_t = 5)]
    pub max_login_attempts: u32,

    /// Minutes over which failed logins are counted.
    #[arg(long, env = "COMPLAINT_DESK_LOGIN_WINDOW_MINUTES", default_value_t = 15)]
    pub login_window_minutes: i64,

    /// Minutes a locked identifier must wait.
    #[arg(long, env = "COMPLAINT_DESK_LOCKOUT_MINUTES", default_value_t = 5)]
    pub lockout_minutes: i64,

    /// IANA time zone that decides which year a ticket belongs to.
    #[arg(long, env = "COMPLAINT_DESK_TIMEZONE", default_value = DEFAULT_TIME_ZONE)]
    pub timezone: String,

    /// Keep failed-login records in the database instead of memory.
    #[arg(long, env = "COMPLAINT_DESK_PERSISTENT_THROTTLE", requires = "database")]
    pub persistent_throttle: bool,
}

/// Settings the request handlers need.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub auth: AuthConfig,
    pub time_zone: Tz,
}

#[cfg(test)]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            time_zone: Tz::Europe__Istanbul,
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration or count must be greater than zero.
    NotPositive(&'static str),
    /// A duration exceeds its upper bound.
    TooLarge { name: &'static str, max: i64 },
    /// The time zone name is not a known IANA zone.
    UnknownTimeZone(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive(name) => write!(f, "{name} must be greater than zero"),
            Self::TooLarge { name, max } => write!(f, "{name} must be at most {max}"),
            Self::UnknownTimeZone(name) => write!(f, "Unknown time zone: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Longest session lifetime: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// Longest login window or lockout: one week.
pub const MAX_THROTTLE_MINUTES: i64 = 7 * 24 * 60;

fn bounded(value: i64, max: i64, name: &'static str) -> Result<i64, ConfigError> {
    if value <= 0 {
        Err(ConfigError::NotPositive(name))
    } else if value > max {
        Err(ConfigError::TooLarge { name, max })
    } else {
        Ok(value)
    }
}

impl Args {
    /// Validates the arguments and builds the handler settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration or count is not positive, a duration
    /// is above its cap, or the time zone is unknown.
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        if self.max_login_attempts == 0 {
            return Err(ConfigError::NotPositive("max-login-attempts"));
        }
        let time_zone: Tz = parse_time_zone(&self.timezone)
            .map_err(|_| ConfigError::UnknownTimeZone(self.timezone.clone()))?;

        Ok(ServerConfig {
            auth: AuthConfig {
                session_ttl: Duration::hours(bounded(
                    self.session_ttl_hours,
                    MAX_SESSION_TTL_HOURS,
                    "session-ttl-hours",
                )?),
                throttle: ThrottlePolicy {
                    max_attempts: self.max_login_attempts,
                    window: Duration::minutes(bounded(
                        self.login_window_minutes,
                        MAX_THROTTLE_MINUTES,
                        "login-window-minutes",
                    )?),
                    lockout: Duration::minutes(bounded(
                        self.lockout_minutes,
                        MAX_THROTTLE_MINUTES,
                        "lockout-minutes",
                    )?),
                },
            },
            time_zone,
        })
    }
}

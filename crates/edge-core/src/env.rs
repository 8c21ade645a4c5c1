//! Environment variable helpers used by `ServerConfig::from_env`.
//!
//! ```ignore
//! use edge_core::env::{env_get, env_get_bool};
//!
//! let backlog: i32 = env_get("EDGE_BACKLOG", libc::SOMAXCONN);
//! let reuse = env_get_bool("EDGE_REUSE_ADDR", true);
//! ```

use std::str::FromStr;

/// Parse `key` as `T`, or return `default` when unset or unparsable.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// `Some(T)` if `key` is set and parses.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Boolean flag: "1", "true", "yes", "on" are true and "0", "false",
/// "no", "off" are false (case-insensitive). Anything else, including
/// unset, yields `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

pub mod database;
pub mod jwt;
pub mod rate_limit;

use std::env;

/// Reads a boolean flag such as `1`, `true`, `yes` or `off`.
/// Unset or unrecognized values fall back to `default`.
pub fn parse_bool_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Reads a numeric variable, falling back to `default` when unset or invalid.
pub fn parse_env_or<T: std::str::FromStr>(var_name: &str, default: T) -> T {
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

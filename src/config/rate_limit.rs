use std::env;

use super::parse_bool_env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Per-route-group limits.
///
/// - `submit`: login and the public forms (contact, newsletter, RSVP)
/// - `public_read`: anonymous GETs
/// - `protected`: dashboard traffic behind auth
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub submit: RateLimitRule,
    pub public_read: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            submit: RateLimitRule::new(2, 10),
            public_read: RateLimitRule::new(30, 60),
            protected: RateLimitRule::new(10, 40),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match parse_rate_limit_config(&raw) {
                Ok(parsed) => cfg = cfg.apply_partial(parsed),
                Err(err) => {
                    tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
                }
            }
        }

        cfg
    }

    fn apply_partial(mut self, parsed: PartialRateLimitConfig) -> Self {
        if let Some(rule) = parsed.global {
            self.submit = rule;
            self.public_read = rule;
            self.protected = rule;
        }
        if let Some(rule) = parsed.submit {
            self.submit = rule;
        }
        if let Some(rule) = parsed.public_read {
            self.public_read = rule;
        }
        if let Some(rule) = parsed.protected {
            self.protected = rule;
        }
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PartialRateLimitConfig {
    global: Option<RateLimitRule>,
    submit: Option<RateLimitRule>,
    public_read: Option<RateLimitRule>,
    protected: Option<RateLimitRule>,
}

fn parse_rate_limit_config(raw: &str) -> Result<PartialRateLimitConfig, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    // "10:20" applies to every group.
    if !trimmed.contains('=') {
        let rule = parse_rule(trimmed)?;
        return Ok(PartialRateLimitConfig {
            global: Some(rule),
            ..Default::default()
        });
    }

    // "submit=2:10,public=30:60,protected=10:40"
    let mut parsed = PartialRateLimitConfig::default();
    for item in trimmed.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (name, raw_rule) = item
            .split_once('=')
            .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
        let rule = parse_rule(raw_rule.trim())?;
        match normalize_group_name(name.trim()) {
            Some("submit") => parsed.submit = Some(rule),
            Some("public_read") => parsed.public_read = Some(rule),
            Some("protected") => parsed.protected = Some(rule),
            _ => {
                return Err(format!(
                    "unknown group '{}', expected submit/public/protected",
                    name.trim()
                ));
            }
        }
    }

    Ok(parsed)
}

fn normalize_group_name(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "submit" | "forms" => Some("submit"),
        "public" | "public_read" | "public-read" => Some("public_read"),
        "protected" | "admin" => Some("protected"),
        _ => None,
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 {
        return Err("per_second must be > 0".to_string());
    }
    if burst_size == 0 {
        return Err("burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_global_rule() {
        let parsed = parse_rate_limit_config("12:24").unwrap();
        assert_eq!(parsed.global, Some(RateLimitRule::new(12, 24)));
        assert_eq!(parsed.submit, None);
    }

    #[test]
    fn parse_grouped_rules() {
        let parsed = parse_rate_limit_config("submit=1:2,public=3:4,protected=5:6").unwrap();
        assert_eq!(parsed.submit, Some(RateLimitRule::new(1, 2)));
        assert_eq!(parsed.public_read, Some(RateLimitRule::new(3, 4)));
        assert_eq!(parsed.protected, Some(RateLimitRule::new(5, 6)));
    }

    #[test]
    fn global_rule_is_overridden_by_group() {
        let mut parsed = parse_rate_limit_config("9:9").unwrap();
        parsed.protected = Some(RateLimitRule::new(1, 1));
        let cfg = RateLimitConfig::default().apply_partial(parsed);
        assert_eq!(cfg.submit, RateLimitRule::new(9, 9));
        assert_eq!(cfg.protected, RateLimitRule::new(1, 1));
    }

    #[test]
    fn parse_zero_rate_rejected() {
        let err = parse_rate_limit_config("0:5").unwrap_err();
        assert!(err.contains("per_second"));
    }

    #[test]
    fn parse_unknown_group_rejected() {
        let err = parse_rate_limit_config("auth=1:2").unwrap_err();
        assert!(err.contains("unknown group"));
    }
}

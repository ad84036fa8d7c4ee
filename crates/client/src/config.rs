use std::time::Duration;

use chrono::{DateTime, Utc};
use wildcam_core::selection::{Phase, SelectionPatch};
use wildcam_core::types::Timestamp;

use crate::assets::FALLBACK_ASSET_PATH;

/// A malformed environment variable.
#[derive(Debug, thiserror::Error)]
#[error("{var}={value:?} is invalid: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the image backend (default: `http://localhost:8000`).
    pub api_url: String,
    /// Fallback stack location; an `http(s)://` URL or a file path
    /// (default: `assets/imgstack.json`).
    pub asset_path: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Publish the fallback stack at startup (default: `false`).
    pub use_fallback: bool,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                   |
    /// |------------------------|---------------------------|
    /// | `STACK_API_URL`        | `http://localhost:8000`   |
    /// | `STACK_ASSET_PATH`     | `assets/imgstack.json`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                      |
    /// | `USE_FALLBACK`         | `false`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = get("STACK_API_URL").unwrap_or_else(|| "http://localhost:8000".into());
        let asset_path = get("STACK_ASSET_PATH").unwrap_or_else(|| FALLBACK_ASSET_PATH.into());

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_var("REQUEST_TIMEOUT_SECS", &raw)?,
            None => 30,
        };

        let use_fallback = match get("USE_FALLBACK") {
            Some(raw) => parse_flag("USE_FALLBACK", &raw)?,
            None => false,
        };

        Ok(Self {
            api_url,
            asset_path,
            request_timeout_secs,
            use_fallback,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Initial selection read from the environment.
///
/// | Env Var         | Format                       |
/// |-----------------|------------------------------|
/// | `DEPLOYMENT_ID` | integer                      |
/// | `PERIOD_START`  | RFC 3339 timestamp           |
/// | `PERIOD_END`    | RFC 3339 timestamp           |
/// | `INTERVAL_SECS` | positive integer             |
/// | `PHASE`         | `day` or `night`             |
/// | `FRAME_RATE`    | positive number              |
///
/// Unset variables leave the corresponding field untouched.
pub fn initial_selection(
    get: impl Fn(&str) -> Option<String>,
) -> Result<SelectionPatch, ConfigError> {
    let mut patch = SelectionPatch::new();

    if let Some(raw) = get("DEPLOYMENT_ID") {
        patch = patch.with_deployment(parse_var("DEPLOYMENT_ID", &raw)?);
    }
    if let Some(raw) = get("PERIOD_START") {
        patch = patch.with_period_start(parse_timestamp("PERIOD_START", &raw)?);
    }
    if let Some(raw) = get("PERIOD_END") {
        patch = patch.with_period_end(parse_timestamp("PERIOD_END", &raw)?);
    }
    if let Some(raw) = get("INTERVAL_SECS") {
        patch = patch.with_interval(parse_var("INTERVAL_SECS", &raw)?);
    }
    if let Some(raw) = get("PHASE") {
        let phase: Phase = raw.parse().map_err(|e: wildcam_core::error::CoreError| ConfigError {
            var: "PHASE",
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        patch = patch.with_phase(phase);
    }
    if let Some(raw) = get("FRAME_RATE") {
        let fps: f64 = parse_var("FRAME_RATE", &raw)?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError {
                var: "FRAME_RATE",
                value: raw,
                reason: "must be a positive number".into(),
            });
        }
        patch = patch.with_frame_rate(fps);
    }

    Ok(patch)
}

// ---- private helpers ----

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_timestamp(var: &'static str, raw: &str) -> Result<Timestamp, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ConfigError {
            var,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError {
            var,
            value: raw.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.asset_path, "assets/imgstack.json");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.use_fallback);
    }

    #[test]
    fn overrides_are_read() {
        let config = ClientConfig::from_lookup(vars(&[
            ("STACK_API_URL", "https://data.example.org/api"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("USE_FALLBACK", "true"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://data.example.org/api");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.use_fallback);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(vars(&[("REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.var, "REQUEST_TIMEOUT_SECS");
    }

    #[test]
    fn initial_selection_reads_every_field() {
        let patch = initial_selection(vars(&[
            ("DEPLOYMENT_ID", "7"),
            ("PERIOD_START", "2024-01-01T00:00:00Z"),
            ("PERIOD_END", "2024-01-02T01:00:00+01:00"),
            ("INTERVAL_SECS", "5"),
            ("PHASE", "day"),
            ("FRAME_RATE", "4"),
        ]))
        .unwrap();

        assert_eq!(patch.deployment, Some(Some(7)));
        assert_eq!(
            patch.period_end,
            Some(Some("2024-01-02T00:00:00Z".parse::<Timestamp>().unwrap()))
        );
        assert_eq!(patch.interval, Some(5));
        assert_eq!(patch.phase, Some(Some(Phase::Day)));
        assert_eq!(patch.frame_rate, Some(4.0));
    }

    #[test]
    fn empty_environment_gives_an_empty_patch() {
        assert_eq!(initial_selection(vars(&[])).unwrap(), SelectionPatch::new());
    }

    #[test]
    fn bad_phase_and_frame_rate_are_rejected() {
        assert_eq!(initial_selection(vars(&[("PHASE", "dusk")])).unwrap_err().var, "PHASE");
        assert_eq!(
            initial_selection(vars(&[("FRAME_RATE", "0")])).unwrap_err().var,
            "FRAME_RATE"
        );
        assert_eq!(
            initial_selection(vars(&[("PERIOD_START", "yesterday")])).unwrap_err().var,
            "PERIOD_START"
        );
    }
}

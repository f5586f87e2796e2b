//! Acquisition through an external helper process.
//!
//! The helper does the actual challenge solving (typically a headless browser)
//! and prints a JSON object on stdout:
//!
//! ```json
//! { "values": { "cf_clearance": "..." }, "identity": "Mozilla/5.0 ..." }
//! ```
//!
//! `cookies` and `user_agent` are accepted as aliases. The proxy to use is
//! passed in the `CLEARANCE_PROXY` environment variable (unset for direct).

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use clearance_core::constants::{DEFAULT_IDENTITY, DEFAULT_REQUIRED_VALUE, PROXY_ENV_VAR};
use clearance_core::error::{ClearanceError, Result};
use clearance_core::traits::Acquirer;
use clearance_core::types::{Clearance, RouteKey};

/// Helper process configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandAcquirerConfig {
    /// Program to run
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Identity used when the helper reports none
    pub identity: String,
    /// Value a solved challenge is expected to yield; its absence is logged
    pub required_value: Option<String>,
}

impl CommandAcquirerConfig {
    /// Creates a config for `program` with default identity and required value.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            identity: DEFAULT_IDENTITY.to_string(),
            required_value: Some(DEFAULT_REQUIRED_VALUE.to_string()),
        }
    }

    /// Sets the program arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fallback identity.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Sets (or clears) the expected value name.
    pub fn with_required_value(mut self, name: Option<String>) -> Self {
        self.required_value = name;
        self
    }
}

#[derive(Deserialize)]
struct HelperOutput {
    #[serde(alias = "cookies")]
    values: BTreeMap<String, String>,
    #[serde(default, alias = "user_agent")]
    identity: Option<String>,
}

/// [`Acquirer`] that runs a helper program per attempt.
///
/// A missing program is reported as
/// [`ClearanceError::AcquisitionUnavailable`]; a non-zero exit, unparsable
/// output, or an empty value set as [`ClearanceError::AcquisitionFailed`].
/// The child is killed if the attempt is dropped (e.g. by a timeout).
pub struct CommandAcquirer {
    config: CommandAcquirerConfig,
}

impl CommandAcquirer {
    /// Creates an acquirer with the given config.
    pub fn with_config(config: CommandAcquirerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CommandAcquirerConfig {
        &self.config
    }

    fn parse_output(&self, route: &RouteKey, stdout: &[u8]) -> Result<Clearance> {
        let output: HelperOutput = serde_json::from_slice(stdout).map_err(|e| {
            let reason = format!("invalid helper output: {}", e);
            ClearanceError::acquisition_failed(route.as_str(), reason)
        })?;

        if output.values.is_empty() {
            return Err(ClearanceError::acquisition_failed(
                route.as_str(),
                "helper returned no values",
            ));
        }

        let names: Vec<&String> = output.values.keys().collect();
        if let Some(required) = &self.config.required_value {
            if !output.values.contains_key(required) {
                // The remaining values may still be accepted upstream.
                warn!(required = %required, ?names, "Expected value missing from helper output");
            }
        }
        info!(?names, "Obtained clearance values");

        let identity = output
            .identity
            .filter(|identity| !identity.trim().is_empty())
            .unwrap_or_else(|| self.config.identity.clone());

        Ok(Clearance {
            values: output.values,
            identity,
        })
    }
}

#[async_trait]
impl Acquirer for CommandAcquirer {
    #[instrument(skip(self, route), fields(route = %route, program = %self.config.program))]
    async fn acquire(&self, route: &RouteKey) -> Result<Clearance> {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match route.proxy_url() {
            Some(proxy) => command.env(PROXY_ENV_VAR, proxy),
            None => command.env_remove(PROXY_ENV_VAR),
        };

        debug!("Starting acquisition helper");
        let output = match command.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClearanceError::AcquisitionUnavailable(format!(
                    "acquisition helper '{}' not found",
                    self.config.program
                )));
            }
            Err(e) => {
                return Err(ClearanceError::acquisition_failed(
                    route.as_str(),
                    format!("failed to run helper: {}", e),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
            return Err(ClearanceError::acquisition_failed(
                route.as_str(),
                format!("helper exited with {}: {}", output.status, detail),
            ));
        }

        self.parse_output(route, &output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandAcquirer {
        CommandAcquirer::with_config(CommandAcquirerConfig::new("sh").with_args(["-c", script]))
    }

    fn acquirer() -> CommandAcquirer {
        CommandAcquirer::with_config(CommandAcquirerConfig::new("unused"))
    }

    #[test]
    fn test_parse_values_and_identity() {
        let out = br#"{"values": {"cf_clearance": "abc", "__cf_bm": "x"}, "identity": "UA-9"}"#;
        let clearance = acquirer().parse_output(&RouteKey::direct(), out).unwrap();

        assert_eq!(clearance.get("cf_clearance"), Some("abc"));
        assert_eq!(clearance.len(), 2);
        assert_eq!(clearance.identity, "UA-9");
    }

    #[test]
    fn test_parse_aliases_and_default_identity() {
        let out = br#"{"cookies": {"cf_clearance": "abc"}}"#;
        let clearance = acquirer().parse_output(&RouteKey::direct(), out).unwrap();

        assert_eq!(clearance.get("cf_clearance"), Some("abc"));
        assert_eq!(clearance.identity, DEFAULT_IDENTITY);
    }

    #[test]
    fn test_parse_blank_identity_uses_fallback() {
        let custom = CommandAcquirer::with_config(
            CommandAcquirerConfig::new("unused").with_identity("UA-fallback"),
        );
        let out = br#"{"values": {"a": "1"}, "user_agent": "  "}"#;

        assert_eq!(custom.parse_output(&RouteKey::direct(), out).unwrap().identity, "UA-fallback");
    }

    #[test]
    fn test_missing_required_value_still_accepted() {
        let out = br#"{"values": {"__cf_bm": "x"}}"#;
        let clearance = acquirer().parse_output(&RouteKey::direct(), out).unwrap();

        assert!(!clearance.contains(DEFAULT_REQUIRED_VALUE));
        assert_eq!(clearance.len(), 1);
    }

    #[test]
    fn test_empty_values_fail() {
        let err = acquirer()
            .parse_output(&RouteKey::direct(), br#"{"values": {}}"#)
            .unwrap_err();
        assert!(matches!(err, ClearanceError::AcquisitionFailed { .. }));
    }

    #[test]
    fn test_garbage_output_fails() {
        let err = acquirer()
            .parse_output(&RouteKey::from("http://proxy-a:8080"), b"Just a moment...")
            .unwrap_err();
        assert!(err.to_string().contains("proxy-a"));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let acquirer = CommandAcquirer::with_config(CommandAcquirerConfig::new(
            "clearance-helper-that-does-not-exist",
        ));

        let err = acquirer.acquire(&RouteKey::direct()).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_non_zero_exit_fails() {
        let err = sh("echo 'navigation timeout' >&2; exit 3")
            .acquire(&RouteKey::direct())
            .await
            .unwrap_err();

        assert!(matches!(err, ClearanceError::AcquisitionFailed { .. }));
        assert!(err.to_string().contains("navigation timeout"));
    }

    #[tokio::test]
    async fn test_helper_output_is_parsed() {
        let clearance = sh(r#"echo '{"cookies": {"cf_clearance": "abc"}, "user_agent": "UA-1"}'"#)
            .acquire(&RouteKey::direct())
            .await
            .unwrap();

        assert_eq!(clearance, Clearance::new([("cf_clearance", "abc")], "UA-1"));
    }

    #[tokio::test]
    async fn test_proxy_passed_in_environment() {
        let script = r#"printf '{"values": {"proxy": "%s"}}' "${CLEARANCE_PROXY:-none}""#;

        let proxied = sh(script)
            .acquire(&RouteKey::from("http://proxy-a:8080"))
            .await
            .unwrap();
        assert_eq!(proxied.get("proxy"), Some("http://proxy-a:8080"));

        let direct = sh(script).acquire(&RouteKey::direct()).await.unwrap();
        assert_eq!(direct.get("proxy"), Some("none"));
    }
}

//! Dispatch and redaction policies

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the dispatcher walks a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One entry at a time, in input order
    #[default]
    Sequential,
    /// One task per entry, joined and reassembled by index
    FanOut,
}

impl std::str::FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "fan_out" | "fan-out" | "fanout" => Ok(Self::FanOut),
            other => Err(format!(
                "unknown strategy '{}' (expected 'sequential' or 'fan_out')",
                other
            )),
        }
    }
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::FanOut => f.write_str("fan_out"),
        }
    }
}

/// Policy for dispatching a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPolicy {
    #[serde(default)]
    pub strategy: ExecutionStrategy,

    /// Upper bound on redactions running at once (fan-out only)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Per-batch deadline in milliseconds; 0 disables it
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            max_in_flight: default_max_in_flight(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DispatchPolicy {
    pub fn sequential() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            ..Default::default()
        }
    }

    pub fn fan_out(max_in_flight: usize) -> Self {
        Self {
            strategy: ExecutionStrategy::FanOut,
            max_in_flight,
            ..Default::default()
        }
    }

    /// Sub-millisecond deadlines round up to 1ms; `None` disables the deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX).max(1));
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Clamped to at least one permit
    pub fn effective_max_in_flight(&self) -> usize {
        self.max_in_flight.max(1)
    }
}

fn default_max_in_flight() -> usize {
    64
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// Settings for the built-in SIP redactor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Messages above this size fail redaction
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Redact quoted display names in identity headers
    #[serde(default = "default_true")]
    pub display_names: bool,

    /// Redact numbers in tel: URIs
    #[serde(default = "default_true")]
    pub tel_uris: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            max_message_bytes: default_max_message_bytes(),
            display_names: true,
            tel_uris: true,
        }
    }
}

fn default_placeholder() -> String {
    "REDACTED".to_string()
}

fn default_max_message_bytes() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

use std::{fmt, ops::Deref, sync::Arc};

use crate::BackstopError;

/// Threshold of failures inside the window at which callers should back off.
///
/// Reaching the threshold is enough: a count equal to it throttles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaxErrorCount(u64);

impl Deref for MaxErrorCount {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for MaxErrorCount {
    type Error = &'static str;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err("Max error count must be greater than 0")
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<i64> for MaxErrorCount {
    type Error = &'static str;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u64::try_from(value) {
            Ok(value) => Self::try_from(value),
            Err(_) => Err("Max error count must be greater than 0"),
        }
    }
}

/// Length of the trailing window, held with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowSizeSeconds {
    millis: u64,
}

impl WindowSizeSeconds {
    /// Window length in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Window length in (possibly fractional) seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.millis as f64 / 1000.0
    }
}

impl TryFrom<u64> for WindowSizeSeconds {
    type Error = &'static str;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err("Window size must be greater than 0");
        }

        match value.checked_mul(1000) {
            Some(millis) => Ok(Self { millis }),
            None => Err("Window size is too large"),
        }
    }
}

impl TryFrom<f64> for WindowSizeSeconds {
    type Error = &'static str;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err("Window size must be a finite number");
        }
        if value <= 0.0 {
            return Err("Window size must be greater than 0");
        }

        let millis = (value * 1000.0).round();
        if millis < 1.0 {
            Err("Window size must be at least 1 millisecond")
        } else if millis >= u64::MAX as f64 {
            Err("Window size is too large")
        } else {
            Ok(Self {
                millis: millis as u64,
            })
        }
    }
}

/// Throttling configuration as handed over by the bootstrap layer.
///
/// Fields are deliberately loose so that any value a configuration source can
/// produce is representable. [`ThrottlingConfiguration::validate`] turns it into a
/// [`WindowPolicy`] or fails with [`BackstopError::Configuration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottlingConfiguration {
    /// Number of failures inside the window that triggers a throttle decision.
    pub max_error_count: i64,
    /// How far back, in seconds, failures are considered live.
    ///
    /// Held at whole-millisecond resolution: the value is rounded to the nearest
    /// millisecond, so a positive window under 0.0005 s rounds to zero and
    /// [`validate`](Self::validate) rejects it with [`BackstopError::Configuration`].
    pub window_size_seconds: f64,
}

impl ThrottlingConfiguration {
    /// Check both fields are strictly positive and build the validated policy.
    pub fn validate(&self) -> Result<WindowPolicy, BackstopError> {
        let max_error_count = MaxErrorCount::try_from(self.max_error_count)
            .map_err(|err| BackstopError::Configuration(err.to_string()))?;
        let window_size = WindowSizeSeconds::try_from(self.window_size_seconds)
            .map_err(|err| BackstopError::Configuration(err.to_string()))?;

        Ok(WindowPolicy {
            max_error_count,
            window_size,
        })
    }
}

/// A validated [`ThrottlingConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Inclusive failure threshold.
    pub max_error_count: MaxErrorCount,
    /// Trailing window length.
    pub window_size: WindowSizeSeconds,
}

impl WindowPolicy {
    /// Build a policy from already validated parts.
    pub fn new(max_error_count: MaxErrorCount, window_size: WindowSizeSeconds) -> Self {
        Self {
            max_error_count,
            window_size,
        }
    }
}

/// A validated name of a failure log collection.
///
/// This is a string with the following constraints:
/// - Must not be empty
/// - Must not be longer than 255 bytes
/// - Must not contain colons
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash, Eq)]
pub struct CollectionName(Arc<str>);

impl CollectionName {
    /// The well-known name of the shared failure log.
    pub fn default_collection() -> Self {
        Self(Arc::from("rate_limit_error_log"))
    }

    /// Default namespace prefix used by store adapters that share a keyspace.
    pub fn default_prefix() -> Self {
        Self(Arc::from("backstop"))
    }
}

impl Default for CollectionName {
    fn default() -> Self {
        Self::default_collection()
    }
}

impl Deref for CollectionName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = BackstopError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(BackstopError::Configuration(
                "Collection name must not be empty".to_string(),
            ))
        } else if value.len() > 255 {
            Err(BackstopError::Configuration(
                "Collection name must not be longer than 255 characters".to_string(),
            ))
        } else if value.contains(':') {
            Err(BackstopError::Configuration(
                "Collection name must not contain colons".to_string(),
            ))
        } else {
            Ok(Self(Arc::from(value)))
        }
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = BackstopError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

/// Opaque identifier of a failed operation.
///
/// Two events recorded at the same millisecond only both survive when their
/// identifiers differ, so prefer [`EventId::random`] when no natural key exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Arc<str>);

impl EventId {
    /// A random 128-bit identifier rendered as 32 hex characters.
    pub fn random() -> Self {
        let n: u128 = rand::random();
        Self(Arc::from(format!("{n:032x}")))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for EventId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

/// Outcome of a window evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleDecision {
    /// The failure count is below the threshold; new work may be issued.
    Proceed,
    /// The failure count reached the threshold; the caller should back off.
    Throttle,
}

/// A decision together with the numbers it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvaluation {
    /// Throttle or proceed.
    pub decision: ThrottleDecision,
    /// Failures observed inside the window.
    pub count: u64,
    /// Threshold the count was compared against.
    pub max_error_count: u64,
    /// Inclusive lower bound of the window, in milliseconds since the Unix epoch.
    pub lookback_ms: u64,
    /// Timestamp the evaluation was computed at.
    pub evaluated_at_ms: u64,
}

impl WindowEvaluation {
    /// Whether the caller should back off.
    pub fn is_throttled(&self) -> bool {
        self.decision == ThrottleDecision::Throttle
    }

    /// Failures still tolerated before the threshold is reached.
    pub fn remaining(&self) -> u64 {
        self.max_error_count.saturating_sub(self.count)
    }
}

//! Coarse connection-quality estimation used to pick preview bitrates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// A probe that has not answered by then is taken as a slow link.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ConnectionQuality {
    /// Maps a Network Information API `effectiveType` value.
    #[must_use]
    pub fn from_effective_type(effective_type: &str) -> Self {
        match effective_type.trim().to_ascii_lowercase().as_str() {
            "slow-2g" | "2g" => Self::Low,
            "4g" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Buckets the round-trip time of a tiny probe request.
    #[must_use]
    pub const fn from_latency(latency: Duration) -> Self {
        match latency.as_millis() {
            0..200 => Self::High,
            200..500 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Times `probe` and buckets the result.
    ///
    /// Timing out yields [`ConnectionQuality::Low`]; a failing probe yields the
    /// default, [`ConnectionQuality::Medium`].
    pub async fn estimate<F, E>(probe: F) -> Self
    where
        F: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let start = tokio::time::Instant::now();
        match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
            Ok(Ok(())) => Self::from_latency(start.elapsed()),
            Ok(Err(e)) => {
                warn!("Connection quality probe failed: {e}");
                Self::Medium
            }
            Err(_) => Self::Low,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown connection quality: {other}")),
        }
    }
}

//! Lease parameters granted by a matching rule
//!
//! A lease is either TTL-based (`ttl` and `max_ttl`) or periodic (`period`),
//! never both. The invariant is enforced when a rule is written; rules read
//! back from storage are trusted as already normalized.

use crate::error::{ChefAuthError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL, max TTL and period of a lease
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseParams {
    /// Time to live of issued tokens
    #[serde(default, with = "duration_secs")]
    pub ttl: Duration,

    /// Upper bound for renewals of TTL-based tokens
    #[serde(default, with = "duration_secs")]
    pub max_ttl: Duration,

    /// Renewal period of periodic tokens
    #[serde(default, with = "duration_secs")]
    pub period: Duration,
}

impl LeaseParams {
    /// Create lease parameters without normalizing them
    pub fn new(ttl: Duration, max_ttl: Duration, period: Duration) -> Self {
        Self {
            ttl,
            max_ttl,
            period,
        }
    }

    /// TTL-based lease
    pub fn with_ttl(ttl: Duration, max_ttl: Duration) -> Self {
        Self::new(ttl, max_ttl, Duration::ZERO)
    }

    /// Periodic lease
    pub fn periodic(period: Duration) -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, period)
    }

    /// Whether this lease renews on a fixed period
    pub fn is_periodic(&self) -> bool {
        !self.period.is_zero()
    }

    /// Enforce the write-time invariant.
    ///
    /// - `ttl` and `period` may not both be zero
    /// - a non-zero `period` clears `ttl` and `max_ttl`
    /// - otherwise a zero `max_ttl` defaults to `ttl`, and a non-zero
    ///   `max_ttl` below `ttl` is rejected
    pub fn normalize(self) -> Result<Self> {
        if self.ttl.is_zero() && self.period.is_zero() {
            return Err(ChefAuthError::Validation(
                "either ttl or period must be provided".into(),
            ));
        }

        if self.is_periodic() {
            return Ok(Self::periodic(self.period));
        }

        if self.max_ttl < self.ttl {
            if !self.max_ttl.is_zero() {
                return Err(ChefAuthError::Validation(format!(
                    "max_ttl ({}s) must be zero or at least ttl ({}s)",
                    self.max_ttl.as_secs(),
                    self.ttl.as_secs()
                )));
            }
            return Ok(Self::with_ttl(self.ttl, self.ttl));
        }

        Ok(self)
    }

    /// Combine two leases from rules that matched the same node.
    ///
    /// Each field takes the larger value. If either side is periodic the
    /// result is periodic, so the combined lease keeps the invariant.
    pub fn merge(&self, other: &LeaseParams) -> LeaseParams {
        let period = self.period.max(other.period);
        if !period.is_zero() {
            return Self::periodic(period);
        }
        Self::with_ttl(self.ttl.max(other.ttl), self.max_ttl.max(other.max_ttl))
    }
}

/// Serialize a `Duration` as whole seconds
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_rejects_zero_ttl_and_period() {
        let result = LeaseParams::default().normalize();
        assert!(matches!(result, Err(ChefAuthError::Validation(_))));
    }

    #[test]
    fn test_period_clears_ttl() {
        let lease = LeaseParams::new(secs(60), secs(120), secs(300))
            .normalize()
            .unwrap();

        assert_eq!(lease, LeaseParams::periodic(secs(300)));
        assert!(lease.is_periodic());
    }

    #[test]
    fn test_max_ttl_defaults_to_ttl() {
        let lease = LeaseParams::with_ttl(secs(600), Duration::ZERO)
            .normalize()
            .unwrap();

        assert_eq!(lease.ttl, secs(600));
        assert_eq!(lease.max_ttl, secs(600));
    }

    #[test]
    fn test_max_ttl_below_ttl_rejected() {
        let result = LeaseParams::with_ttl(secs(600), secs(60)).normalize();
        assert!(matches!(result, Err(ChefAuthError::Validation(_))));
    }

    #[test]
    fn test_merge_takes_maximum() {
        let a = LeaseParams::with_ttl(secs(60), secs(600));
        let b = LeaseParams::with_ttl(secs(120), secs(300));

        assert_eq!(a.merge(&b), LeaseParams::with_ttl(secs(120), secs(600)));
    }

    #[test]
    fn test_merge_with_periodic_is_periodic() {
        let a = LeaseParams::with_ttl(secs(60), secs(600));
        let b = LeaseParams::periodic(secs(30));

        assert_eq!(a.merge(&b), LeaseParams::periodic(secs(30)));
        assert_eq!(b.merge(&a), LeaseParams::periodic(secs(30)));
    }

    #[test]
    fn test_serializes_as_seconds() {
        let lease = LeaseParams::with_ttl(secs(60), secs(120));
        let json = serde_json::to_value(lease).unwrap();

        assert_eq!(json, serde_json::json!({ "ttl": 60, "max_ttl": 120, "period": 0 }));
    }
}

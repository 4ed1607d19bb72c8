//! Per-stage result tagging for the degraded-mode pipeline.
//!
//! Every pipeline stage must hand its caller a structurally valid value even
//! when the upstream provider fails. [`Outcome`] keeps that guarantee while
//! making substitution observable: a stage returns [`Outcome::Live`] when the
//! value came from the real provider, and [`Outcome::Degraded`] when a
//! fallback was substituted, carrying the cause as a reason string.

/// A stage result that always holds a usable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The value came from the real upstream provider.
    Live(T),
    /// A substitute value. `reason` records why the real one was unavailable.
    Degraded {
        value: T,
        reason: String,
    },
}

impl<T> Outcome<T> {
    /// Construct a degraded outcome from a value and its cause.
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// Borrow the carried value, live or substituted.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Live(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    /// Split into the carried value and the degradation reason, if any.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Outcome::Live(value) => (value, None),
            Outcome::Degraded { value, reason } => (value, Some(reason)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Live(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_carries_value() {
        let outcome = Outcome::Live(vec![1, 2, 3]);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value(), &vec![1, 2, 3]);
        assert_eq!(outcome.reason(), None);
        assert_eq!(outcome.into_parts(), (vec![1, 2, 3], None));
    }

    #[test]
    fn test_degraded_carries_value_and_reason() {
        let outcome = Outcome::degraded("fallback", "provider unreachable");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &"fallback");
        assert_eq!(outcome.reason(), Some("provider unreachable"));
        let (value, reason) = outcome.into_parts();
        assert_eq!(value, "fallback");
        assert_eq!(reason.as_deref(), Some("provider unreachable"));
    }
}

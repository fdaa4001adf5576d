//! Error and warning types for advancement loading and lookup

use std::fmt;

use serde::Serialize;

/// Errors surfaced by the advancement core
#[derive(Debug, thiserror::Error)]
pub enum AdvancementError {
    /// Unknown tree, unknown advancement, or malformed path
    #[error("Invalid advancement reference: {0}")]
    InvalidReference(String),

    /// Tree or advancement label violating the namespaced-key rule
    #[error("Invalid label '{0}': only letters, numbers and underscores are allowed")]
    InvalidLabel(String),

    /// A configuration unit could not be read or materialized
    #[error("Failed to load advancement tree '{unit}': {reason}")]
    LoadFailure { unit: String, reason: String },
}

impl AdvancementError {
    pub fn invalid_reference(reference: impl Into<String>) -> Self {
        Self::InvalidReference(reference.into())
    }
}

/// A recoverable configuration problem found while loading a tree.
///
/// Warnings never abort a load; the offending value is defaulted and the
/// warning is logged by the manager and kept in the load report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    /// Where the problem is, e.g. `mining.stone` or `mining.stone.rewards.1`
    pub location: String,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// Field absent; `default` is what was used instead
    MissingField { field: String, default: Option<String> },
    /// Field present but unusable; `default` is what was used instead
    InvalidValue {
        field: String,
        value: String,
        default: String,
    },
    /// Strategy label with no registration; resolves to the no-op strategy
    UnknownStrategy { registry: &'static str, label: String },
    /// Entry skipped entirely (e.g. an invalid advancement label)
    Skipped { reason: String },
}

impl ConfigWarning {
    pub fn missing(location: &str, field: &str, default: Option<&str>) -> Self {
        Self {
            location: location.to_string(),
            kind: WarningKind::MissingField {
                field: field.to_string(),
                default: default.map(|d| d.to_string()),
            },
        }
    }

    pub fn invalid(location: &str, field: &str, value: &str, default: &str) -> Self {
        Self {
            location: location.to_string(),
            kind: WarningKind::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                default: default.to_string(),
            },
        }
    }

    pub fn unknown_strategy(location: &str, registry: &'static str, label: &str) -> Self {
        Self {
            location: location.to_string(),
            kind: WarningKind::UnknownStrategy {
                registry,
                label: label.to_string(),
            },
        }
    }

    pub fn skipped(location: &str, reason: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            kind: WarningKind::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// True when this warning reports the given missing field
    pub fn is_missing(&self, field: &str) -> bool {
        matches!(&self.kind, WarningKind::MissingField { field: f, .. } if f == field)
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::MissingField {
                field,
                default: Some(default),
            } => write!(
                f,
                "'{}' did not have a {}, using '{}'",
                self.location, field, default
            ),
            WarningKind::MissingField { field, default: None } => {
                write!(f, "'{}' did not have a {}", self.location, field)
            }
            WarningKind::InvalidValue {
                field,
                value,
                default,
            } => write!(
                f,
                "'{}' has an invalid {} '{}', using '{}'",
                self.location, field, value, default
            ),
            WarningKind::UnknownStrategy { registry, label } => write!(
                f,
                "'{}' uses unknown {} '{}', it will do nothing",
                self.location, registry, label
            ),
            WarningKind::Skipped { reason } => {
                write!(f, "'{}' was skipped: {}", self.location, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        let w = ConfigWarning::missing("mining.stone", "type", Some("empty"));
        assert_eq!(w.to_string(), "'mining.stone' did not have a type, using 'empty'");
        assert!(w.is_missing("type"));
        assert!(!w.is_missing("value"));

        let w = ConfigWarning::missing("mining.stone", "value", None);
        assert_eq!(w.to_string(), "'mining.stone' did not have a value");

        let w = ConfigWarning::invalid("mining.stone", "amount", "-3", "10");
        assert_eq!(
            w.to_string(),
            "'mining.stone' has an invalid amount '-3', using '10'"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AdvancementError::invalid_reference("mining.gold");
        assert_eq!(err.to_string(), "Invalid advancement reference: mining.gold");

        let err = AdvancementError::InvalidLabel("my tree".into());
        assert!(err.to_string().contains("'my tree'"));
    }
}

use thiserror::Error;

/// Errors raised by graph construction and by the solvers
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GroupingError {
    #[error("Invalid edge {src} -> {dst}: {reason}")]
    InvalidEdge {
        src: String,
        dst: String,
        reason: String,
    },

    #[error("Duplicate participant: {id}")]
    DuplicateParticipant { id: String },

    #[error("Participant {id} has unknown gender '{gender}'")]
    UnknownGender { id: String, gender: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Infeasible grouping: {reason}")]
    Infeasible {
        reason: String,
        group: Option<usize>,
        gender: Option<String>,
    },

    #[error("No integer-programming backend available: {0}")]
    SolverUnavailable(String),

    #[error("Exact solver exceeded its {budget_secs:.1}s budget without a proven optimum")]
    SolverTimeout { budget_secs: f64 },

    #[error("Backend error: {0}")]
    Backend(String),
}

impl GroupingError {
    pub(crate) fn invalid_edge(src: &str, dst: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEdge {
            src: src.to_string(),
            dst: dst.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn infeasible(reason: impl Into<String>) -> Self {
        Self::Infeasible {
            reason: reason.into(),
            group: None,
            gender: None,
        }
    }

    /// Errors the auto policy recovers from by switching to the heuristic
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SolverUnavailable(_) | Self::SolverTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_offenders() {
        let err = GroupingError::invalid_edge("M1", "M1", "self-loop");
        assert_eq!(err.to_string(), "Invalid edge M1 -> M1: self-loop");

        let err = GroupingError::Infeasible {
            reason: "group 2 needs 1 female, 0 left".to_string(),
            group: Some(2),
            gender: Some("female".to_string()),
        };
        assert!(err.to_string().contains("group 2"));
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(GroupingError::SolverUnavailable("none".into()).is_recoverable());
        assert!(GroupingError::SolverTimeout { budget_secs: 1.0 }.is_recoverable());
        assert!(!GroupingError::infeasible("odd").is_recoverable());
    }
}

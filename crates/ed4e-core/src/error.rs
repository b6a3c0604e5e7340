//! Domain error types.
//!
//! Every variant is a caller-side contract violation or a collaborator
//! failure. Numeric edge cases of the dice rules (step 0, Rule of One, a
//! total below the target) are outcomes, never errors.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A cross-reference required by the test kind was absent or did not
    /// resolve to a document.
    #[error("missing required reference `{field}`{}", id_suffix(.id))]
    MissingReference {
        /// Name of the data field that holds (or should hold) the reference.
        field: &'static str,
        /// The identifier that failed to resolve, if one was supplied.
        id: Option<Uuid>,
    },

    /// Success computation was attempted on a test that has no target
    /// difficulty even though its test type requires one.
    #[error("{0} test has no target difficulty")]
    MissingTarget(String),

    /// The actor-seeded factory was used on a test kind that is rolled
    /// without a participating actor.
    #[error("{0} tests do not accept a rolling actor")]
    ActorNotAccepted(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A document lookup or other collaborator failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[allow(clippy::ref_option)]
fn id_suffix(id: &Option<Uuid>) -> String {
    id.map(|id| format!(" ({id})")).unwrap_or_default()
}

impl DomainError {
    /// Shorthand for a reference that was never supplied.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::MissingReference { field, id: None }
    }

    /// Shorthand for a supplied reference that did not resolve.
    #[must_use]
    pub fn unresolved(field: &'static str, id: Uuid) -> Self {
        Self::MissingReference {
            field,
            id: Some(id),
        }
    }
}

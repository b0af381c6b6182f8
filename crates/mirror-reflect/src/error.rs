use thiserror::Error;

pub type Result<T, E = ResolutionError> = std::result::Result<T, E>;

/// The single failure kind raised by member resolution, access and invocation.
///
/// Lookups try every path (public, then declared up the hierarchy) before one of these is
/// returned. Signatures are pre-rendered with [`mirror_types::format_signature`].
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("no such method: {signature}")]
    NoSuchMethod { signature: String },

    #[error("no such constructor: {signature}")]
    NoSuchConstructor { signature: String },

    #[error("no such field: {class}.{name}")]
    NoSuchField { class: String, name: String },

    #[error("ambiguous call to {signature}; candidates: {}", candidates.join(", "))]
    Ambiguous {
        signature: String,
        candidates: Vec<String>,
    },

    #[error("illegal access to {member}: {reason}")]
    IllegalAccess { member: String, reason: String },

    #[error("illegal argument for {member}: expected {expected}, found {found}")]
    IllegalArgument {
        member: String,
        expected: String,
        found: String,
    },

    #[error("{member} requires an instance but only the type {class} is available")]
    MissingReceiver { member: String, class: String },

    #[error("cannot instantiate {class}: {reason}")]
    Instantiation { class: String, reason: &'static str },

    #[error("{member} failed: {source}")]
    Invocation {
        member: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolutionError {
    /// Whether this error came from failing to find a member, as opposed to a member that was
    /// found but could not be accessed or failed while running.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            ResolutionError::ClassNotFound(_)
                | ResolutionError::NoSuchMethod { .. }
                | ResolutionError::NoSuchConstructor { .. }
                | ResolutionError::NoSuchField { .. }
                | ResolutionError::Ambiguous { .. }
        )
    }
}

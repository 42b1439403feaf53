use thiserror::Error;

/// Why an admission request was denied.
///
/// Every variant denies; the message is returned verbatim to the API server
/// so it must carry enough context to be actionable.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A forbidden annotation or field transition.
    #[error("{0}")]
    PolicyViolation(String),

    /// A referenced IngressClass could not be resolved.
    #[error("ingress class resolution failed: {0}")]
    ResolutionFailure(anyhow::Error),

    /// The desired load balancer model could not be built from the group.
    #[error("failed to model desired load balancer state: {0}")]
    ModelingFailure(anyhow::Error),

    /// The live load balancer lookup failed. Absence of information is never
    /// treated as "no replacement needed".
    #[error("failed to discover live load balancer state: {0}")]
    DiscoveryFailure(anyhow::Error),

    /// Any unexpected fault, surfaced for operator diagnosis.
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

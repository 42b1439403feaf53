use crate::{IngressResource, ValidationError};
use anyhow::Result;

/// A resolved IngressClass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressClassInfo {
    pub name: String,
    pub controller: String,
}

/// Resolves IngressClass references against the cluster.
#[async_trait::async_trait]
pub trait ResolveIngressClass: Send + Sync {
    /// Resolves a named IngressClass; an unknown name is an error.
    async fn resolve(&self, name: &str) -> Result<IngressClassInfo>;

    /// The cluster's default IngressClass, if one is marked.
    async fn default_class(&self) -> Result<Option<IngressClassInfo>>;
}

/// Checks mutations of `spec.ingressClassName`: a reference that is newly set
/// or changed must resolve to an existing IngressClass. An unchanged or
/// absent reference is valid state and requires no lookup.
pub async fn check_class_usage(
    resolver: &dyn ResolveIngressClass,
    old: Option<&IngressResource>,
    new: &IngressResource,
) -> Result<(), ValidationError> {
    let Some(new_class) = new.class_name.as_deref() else {
        return Ok(());
    };
    if old.and_then(|o| o.class_name.as_deref()) == Some(new_class) {
        return Ok(());
    }
    resolver
        .resolve(new_class)
        .await
        .map(|_| ())
        .map_err(ValidationError::ResolutionFailure)
}

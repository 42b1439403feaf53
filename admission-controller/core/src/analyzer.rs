use crate::{
    annotations,
    class::ResolveIngressClass,
    model::{BuildModel, DiscoverLoadBalancer, ReplacementDecision, Scheme},
    IngressGroup, IngressResource, ValidationError,
};
use std::sync::Arc;
use tracing::debug;

/// Decides whether an update would force the cloud provider to destroy and
/// recreate the group's load balancer.
pub struct ReplacementImpactAnalyzer {
    model_builder: Arc<dyn BuildModel + Send + Sync>,
    discovery: Arc<dyn DiscoverLoadBalancer + Send + Sync>,
    class_resolver: Arc<dyn ResolveIngressClass + Send + Sync>,
    default_scheme: Scheme,
}

impl ReplacementImpactAnalyzer {
    pub fn new(
        model_builder: Arc<dyn BuildModel + Send + Sync>,
        discovery: Arc<dyn DiscoverLoadBalancer + Send + Sync>,
        class_resolver: Arc<dyn ResolveIngressClass + Send + Sync>,
        default_scheme: Scheme,
    ) -> Self {
        Self {
            model_builder,
            discovery,
            class_resolver,
            default_scheme,
        }
    }

    pub async fn analyze(
        &self,
        old: &IngressResource,
        new: &IngressResource,
        group: &IngressGroup,
    ) -> Result<ReplacementDecision, ValidationError> {
        let old_scheme = self.effective_scheme(old);
        let new_scheme = self.effective_scheme(new);
        let old_class = self.effective_class(old).await?;
        let new_class = self.effective_class(new).await?;

        // Replacement only matters when an identity-defining input plausibly
        // changed; the common no-op update makes no external calls.
        if old_scheme == new_scheme && old_class == new_class {
            return Ok(ReplacementDecision::no_replacement());
        }
        debug!(
            %old_scheme, %new_scheme, %old_class, %new_class,
            "Identity-defining input changed; modeling replacement impact"
        );

        // Model the group as it would look with the update applied. The
        // shared group snapshot is never touched.
        let projected = group.with_member(new);
        let desired = self
            .model_builder
            .build(&projected)
            .await
            .map_err(ValidationError::ModelingFailure)?;

        let live = self
            .discovery
            .find_by_identity(&desired.identity)
            .await
            .map_err(ValidationError::DiscoveryFailure)?;
        let Some(live) = live else {
            // No live load balancer: this is a creation path, not a
            // replacement.
            return Ok(ReplacementDecision::no_replacement());
        };

        let decision = ReplacementDecision::diff(&desired, &live);
        debug!(
            requires_replacement = decision.requires_replacement,
            mismatches = decision.mismatches.len(),
            "Analyzed replacement impact"
        );
        Ok(decision)
    }

    /// The scheme an Ingress asks for, falling back to the configured default
    /// when the annotation is absent. Raw values are compared as written; the
    /// model builder validates them.
    fn effective_scheme<'a>(&self, ing: &'a IngressResource) -> &'a str {
        annotations::parse_string(annotations::SUFFIX_SCHEME, &ing.annotations)
            .unwrap_or(self.default_scheme.as_str())
    }

    /// The class an Ingress is processed under: the legacy class annotation,
    /// else `spec.ingressClassName`, else the cluster default IngressClass.
    async fn effective_class(&self, ing: &IngressResource) -> Result<String, ValidationError> {
        if let Some(value) = ing.annotations.get(annotations::INGRESS_CLASS) {
            return Ok(value.clone());
        }
        if let Some(name) = &ing.class_name {
            return Ok(name.clone());
        }
        let default = self
            .class_resolver
            .default_class()
            .await
            .map_err(ValidationError::ResolutionFailure)?;
        Ok(default.map(|class| class.name).unwrap_or_default())
    }
}

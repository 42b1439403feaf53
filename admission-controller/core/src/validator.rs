use crate::{
    analyzer::ReplacementImpactAnalyzer,
    class::{check_class_usage, ResolveIngressClass},
    group::{GroupId, LoadGroup},
    model::{BuildModel, DiscoverLoadBalancer, Scheme, DEFAULT_SCHEME},
    policy::{check_class_annotation, check_group_annotation, ClassAnnotationMatcher},
    protection, IngressResource, ValidationError,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Terminal admission outcome for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied(message) => Some(message),
        }
    }
}

impl From<Result<(), ValidationError>> for Verdict {
    fn from(res: Result<(), ValidationError>) -> Self {
        match res {
            Ok(()) => Self::Allowed,
            Err(error) => Self::Denied(error.to_string()),
        }
    }
}

/// One admission request, typed by operation.
#[derive(Clone, Debug)]
pub enum IngressAdmission {
    Create {
        new: IngressResource,
    },
    Update {
        old: IngressResource,
        new: IngressResource,
    },
    Delete,
}

/// Policy toggles for the validator.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// The IngressClass value this controller serves.
    pub ingress_class: String,
    /// Forbids new usage of the legacy `kubernetes.io/ingress.class`
    /// annotation.
    pub disable_ingress_class_annotation: bool,
    /// Forbids new usage of the `group.name` annotation.
    pub disable_ingress_group_name_annotation: bool,
    /// Scheme assumed when the scheme annotation is absent.
    pub default_scheme: Scheme,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            ingress_class: "alb".to_string(),
            disable_ingress_class_annotation: false,
            disable_ingress_group_name_annotation: false,
            default_scheme: DEFAULT_SCHEME,
        }
    }
}

/// Sequences the admission guards for Ingress resources.
///
/// Guards run in a fixed order and short-circuit on the first failure; a
/// request is allowed only when every stage passes. Nothing is retried within
/// a request, and no state survives it.
pub struct IngressValidator {
    matcher: ClassAnnotationMatcher,
    class_resolver: Arc<dyn ResolveIngressClass + Send + Sync>,
    group_loader: Arc<dyn LoadGroup + Send + Sync>,
    analyzer: ReplacementImpactAnalyzer,
    config: ValidatorConfig,
}

impl IngressValidator {
    pub fn new(
        config: ValidatorConfig,
        class_resolver: Arc<dyn ResolveIngressClass + Send + Sync>,
        group_loader: Arc<dyn LoadGroup + Send + Sync>,
        model_builder: Arc<dyn BuildModel + Send + Sync>,
        discovery: Arc<dyn DiscoverLoadBalancer + Send + Sync>,
    ) -> Self {
        Self {
            matcher: ClassAnnotationMatcher::new(&config.ingress_class),
            analyzer: ReplacementImpactAnalyzer::new(
                model_builder,
                discovery,
                class_resolver.clone(),
                config.default_scheme,
            ),
            class_resolver,
            group_loader,
            config,
        }
    }

    /// Evaluates one admission request to a terminal verdict.
    pub async fn evaluate(&self, admission: &IngressAdmission) -> Verdict {
        let res = match admission {
            IngressAdmission::Create { new } => self.validate_create(new).await,
            IngressAdmission::Update { old, new } => self.validate_update(old, new).await,
            // No policy applies on delete.
            IngressAdmission::Delete => Ok(()),
        };
        if let Err(error) = &res {
            info!(%error, "Denying ingress admission");
        }
        res.into()
    }

    async fn validate_create(&self, new: &IngressResource) -> Result<(), ValidationError> {
        check_class_annotation(
            &self.matcher,
            None,
            &new.annotations,
            self.config.disable_ingress_class_annotation,
        )?;
        check_group_annotation(
            None,
            &new.annotations,
            self.config.disable_ingress_group_name_annotation,
        )?;
        check_class_usage(&*self.class_resolver, None, new).await?;
        Ok(())
    }

    async fn validate_update(
        &self,
        old: &IngressResource,
        new: &IngressResource,
    ) -> Result<(), ValidationError> {
        check_class_annotation(
            &self.matcher,
            Some(&old.annotations),
            &new.annotations,
            self.config.disable_ingress_class_annotation,
        )?;
        check_group_annotation(
            Some(&old.annotations),
            &new.annotations,
            self.config.disable_ingress_group_name_annotation,
        )?;
        check_class_usage(&*self.class_resolver, Some(old), new).await?;

        let group_id = GroupId::for_ingress(new);
        let group = self
            .group_loader
            .load(&group_id)
            .await
            .map_err(ValidationError::Internal)?;
        debug!(group = %group_id, members = group.members.len(), "Loaded ingress group");

        let decision = self.analyzer.analyze(old, new, &group).await?;
        protection::guard(old, &decision)?;
        Ok(())
    }
}

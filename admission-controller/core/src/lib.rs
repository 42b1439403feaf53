#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
mod analyzer;
mod class;
mod error;
mod group;
mod ingress;
mod model;
mod policy;
mod protection;
mod validator;

pub use self::{
    analyzer::ReplacementImpactAnalyzer,
    class::{check_class_usage, IngressClassInfo, ResolveIngressClass},
    error::ValidationError,
    group::{GroupId, IngressGroup, LoadGroup},
    ingress::{IngressRef, IngressResource},
    model::{
        AttributeMismatch, BuildModel, DesiredLoadBalancerModel, DiscoverLoadBalancer,
        ListenerSpec, LiveLoadBalancerState, LoadBalancerIdentity, LoadBalancerType,
        ReplacementDecision, Scheme, ATTR_DELETION_PROTECTION, DEFAULT_SCHEME,
    },
    policy::{check_class_annotation, check_group_annotation, ClassAnnotationMatcher},
    protection::deletion_protection_enabled,
    validator::{IngressAdmission, IngressValidator, ValidatorConfig, Verdict},
};

/// Controller name advertised by IngressClasses this guard serves.
pub const CONTROLLER_NAME: &str = "ingress.k8s.aws/alb";

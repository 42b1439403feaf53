#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod discovery;
mod model;

pub use self::{discovery::ElbDiscovery, model::AnnotationModelBuilder};

/// Tag stamped on every load balancer owned by this controller, keyed by the
/// group's stack id.
pub const STACK_TAG: &str = "ingress.k8s.aws/stack";

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod ingress;

pub use self::ingress::{ingress_resource, DEFAULT_CLASS_ANNOTATION};
pub use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
pub use kube::api::{ObjectMeta, ResourceExt};

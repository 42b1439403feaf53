use alb_admission_core::{IngressRef, IngressResource};
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;

/// Marks the cluster's default IngressClass.
pub const DEFAULT_CLASS_ANNOTATION: &str = "ingressclass.kubernetes.io/is-default-class";

/// Converts a typed Ingress into the request-scoped snapshot the decision
/// engine consumes.
pub fn ingress_resource(ing: &Ingress) -> IngressResource {
    IngressResource {
        id: IngressRef::new(ing.namespace().unwrap_or_default(), ing.name_any()),
        annotations: ing.annotations().clone(),
        class_name: ing
            .spec
            .as_ref()
            .and_then(|spec| spec.ingress_class_name.clone()),
    }
}

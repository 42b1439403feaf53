//! Immutability rules for the legacy class and group-name annotations.
//!
//! Once either annotation is disabled by configuration, existing usage may
//! persist or be removed, but new usage is forbidden so that users migrate to
//! `spec.ingressClassName` and IngressClass parameters.

use crate::{annotations, ValidationError};
use std::collections::BTreeMap;

type Annotations = BTreeMap<String, String>;

/// Matches values of the legacy `kubernetes.io/ingress.class` annotation
/// against the class this controller serves. Values selecting some other
/// controller are not this guard's concern.
#[derive(Clone, Debug)]
pub struct ClassAnnotationMatcher {
    ingress_class: String,
}

impl ClassAnnotationMatcher {
    pub fn new(ingress_class: impl Into<String>) -> Self {
        Self {
            ingress_class: ingress_class.into(),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        value == self.ingress_class
    }
}

/// Forbids new usage of `kubernetes.io/ingress.class` when the policy is
/// enforced. `old` is `None` on create.
pub fn check_class_annotation(
    matcher: &ClassAnnotationMatcher,
    old: Option<&Annotations>,
    new: &Annotations,
    enforce: bool,
) -> Result<(), ValidationError> {
    if !enforce {
        return Ok(());
    }

    let used_in_new = new
        .get(annotations::INGRESS_CLASS)
        .is_some_and(|v| matcher.matches(v));
    let used_in_old = old
        .and_then(|a| a.get(annotations::INGRESS_CLASS))
        .is_some_and(|v| matcher.matches(v));

    if used_in_new && !used_in_old {
        return Err(ValidationError::PolicyViolation(format!(
            "new usage of `{}` annotation is forbidden",
            annotations::INGRESS_CLASS
        )));
    }
    Ok(())
}

/// Forbids new usage of the `group.name` annotation when the policy is
/// enforced. Unlike the class annotation, any value change counts as new
/// usage; only identical or removed values pass.
pub fn check_group_annotation(
    old: Option<&Annotations>,
    new: &Annotations,
    enforce: bool,
) -> Result<(), ValidationError> {
    if !enforce {
        return Ok(());
    }

    let new_name = annotations::parse_string(annotations::SUFFIX_GROUP_NAME, new);
    let old_name = old.and_then(|a| annotations::parse_string(annotations::SUFFIX_GROUP_NAME, a));

    if let Some(new_name) = new_name {
        if old_name != Some(new_name) {
            return Err(ValidationError::PolicyViolation(format!(
                "new usage of `{}/{}` annotation is forbidden",
                annotations::ANNOTATION_PREFIX,
                annotations::SUFFIX_GROUP_NAME
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anns(entries: &[(&str, &str)]) -> Annotations {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn matcher() -> ClassAnnotationMatcher {
        ClassAnnotationMatcher::new("alb")
    }

    #[test]
    fn class_annotation_allowed_when_not_enforced() {
        let new = anns(&[("kubernetes.io/ingress.class", "alb")]);
        assert!(check_class_annotation(&matcher(), None, &new, false).is_ok());
    }

    #[test]
    fn new_class_annotation_usage_is_forbidden() {
        let new = anns(&[("kubernetes.io/ingress.class", "alb")]);
        let err = check_class_annotation(&matcher(), None, &new, true).unwrap_err();
        assert!(err.to_string().contains("kubernetes.io/ingress.class"));

        let old = anns(&[]);
        assert!(check_class_annotation(&matcher(), Some(&old), &new, true).is_err());
    }

    #[test]
    fn existing_class_annotation_usage_may_persist_or_go_away() {
        let old = anns(&[("kubernetes.io/ingress.class", "alb")]);
        let unchanged = old.clone();
        assert!(check_class_annotation(&matcher(), Some(&old), &unchanged, true).is_ok());

        let removed = anns(&[]);
        assert!(check_class_annotation(&matcher(), Some(&old), &removed, true).is_ok());
    }

    #[test]
    fn other_controllers_class_values_are_ignored() {
        let new = anns(&[("kubernetes.io/ingress.class", "nginx")]);
        assert!(check_class_annotation(&matcher(), None, &new, true).is_ok());
    }

    #[test]
    fn new_group_annotation_usage_is_forbidden() {
        let new = anns(&[("alb.ingress.kubernetes.io/group.name", "shared")]);
        assert!(check_group_annotation(None, &new, true).is_err());

        let old = anns(&[]);
        assert!(check_group_annotation(Some(&old), &new, true).is_err());
    }

    #[test]
    fn changed_group_name_is_forbidden() {
        let old = anns(&[("alb.ingress.kubernetes.io/group.name", "shared")]);
        let new = anns(&[("alb.ingress.kubernetes.io/group.name", "other")]);
        assert!(check_group_annotation(Some(&old), &new, true).is_err());
    }

    #[test]
    fn identical_or_removed_group_name_is_allowed() {
        let old = anns(&[("alb.ingress.kubernetes.io/group.name", "shared")]);
        assert!(check_group_annotation(Some(&old), &old.clone(), true).is_ok());
        assert!(check_group_annotation(Some(&old), &anns(&[]), true).is_ok());
    }

    #[test]
    fn group_annotation_allowed_when_not_enforced() {
        let new = anns(&[("alb.ingress.kubernetes.io/group.name", "shared")]);
        assert!(check_group_annotation(None, &new, false).is_ok());
    }
}

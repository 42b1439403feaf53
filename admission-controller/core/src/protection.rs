use crate::{
    annotations, IngressResource, ReplacementDecision, ValidationError, ATTR_DELETION_PROTECTION,
};
use anyhow::Result;

/// Denies a replacement-forcing update when the prior state of the Ingress
/// enabled deletion protection on its load balancer. Absence of the
/// annotation or the attribute means protection is disabled.
pub fn guard(old: &IngressResource, decision: &ReplacementDecision) -> Result<(), ValidationError> {
    if !decision.requires_replacement {
        return Ok(());
    }

    let enabled = deletion_protection_enabled(old).map_err(ValidationError::Internal)?;
    if enabled.as_deref() == Some("true") {
        return Err(ValidationError::PolicyViolation(format!(
            "cannot change the scheme or type of ingress {} with deletion protection enabled",
            old.id
        )));
    }
    Ok(())
}

/// Value of `deletion_protection.enabled` within the
/// `load-balancer-attributes` annotation, if present.
pub fn deletion_protection_enabled(ing: &IngressResource) -> Result<Option<String>> {
    let attrs = annotations::parse_string_map(
        annotations::SUFFIX_LOAD_BALANCER_ATTRIBUTES,
        &ing.annotations,
    )?;
    Ok(attrs.and_then(|m| m.get(ATTR_DELETION_PROTECTION).cloned()))
}

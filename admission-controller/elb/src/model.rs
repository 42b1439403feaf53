use alb_admission_core::{
    annotations, BuildModel, DesiredLoadBalancerModel, IngressGroup, ListenerSpec,
    LoadBalancerIdentity, LoadBalancerType, Scheme,
};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;

/// Builds the desired load balancer model for a group from its members'
/// combined annotations.
///
/// The model depends on the full membership: any member may contribute
/// attributes, listeners, or tags, and members must agree on values they
/// share.
#[derive(Clone, Debug)]
pub struct AnnotationModelBuilder {
    default_scheme: Scheme,
}

impl AnnotationModelBuilder {
    pub fn new(default_scheme: Scheme) -> Self {
        Self { default_scheme }
    }
}

#[async_trait::async_trait]
impl BuildModel for AnnotationModelBuilder {
    async fn build(&self, group: &IngressGroup) -> Result<DesiredLoadBalancerModel> {
        Ok(DesiredLoadBalancerModel {
            identity: LoadBalancerIdentity(group.id.stack_id()),
            scheme: merged_scheme(group, self.default_scheme)?,
            lb_type: LoadBalancerType::Application,
            attributes: merged_map(group, annotations::SUFFIX_LOAD_BALANCER_ATTRIBUTES)?,
            listeners: merged_listeners(group)?,
            tags: merged_map(group, annotations::SUFFIX_TAGS)?,
        })
    }
}

fn merged_scheme(group: &IngressGroup, default: Scheme) -> Result<Scheme> {
    let mut scheme = None;
    for member in &group.members {
        let Some(raw) = annotations::parse_string(annotations::SUFFIX_SCHEME, &member.annotations)
        else {
            continue;
        };
        let parsed: Scheme = raw
            .parse()
            .with_context(|| format!("ingress {}", member.id))?;
        match scheme {
            None => scheme = Some(parsed),
            Some(prev) if prev == parsed => {}
            Some(prev) => bail!(
                "conflicting load balancer schemes within group {}: {prev} and {parsed}",
                group.id
            ),
        }
    }
    Ok(scheme.unwrap_or(default))
}

/// Merges one flattened map annotation across members. Members may repeat a
/// key only with an identical value.
fn merged_map(group: &IngressGroup, suffix: &str) -> Result<BTreeMap<String, String>> {
    let mut merged = BTreeMap::new();
    for member in &group.members {
        let Some(map) = annotations::parse_string_map(suffix, &member.annotations)
            .with_context(|| format!("ingress {}", member.id))?
        else {
            continue;
        };
        for (k, v) in map {
            match merged.get(&k) {
                Some(prev) if *prev != v => bail!(
                    "conflicting values for {}/{suffix} key {k} within group {}",
                    annotations::ANNOTATION_PREFIX,
                    group.id
                ),
                _ => {
                    merged.insert(k, v);
                }
            }
        }
    }
    Ok(merged)
}

/// Collects listeners from the JSON `listen-ports` annotation, e.g.
/// `[{"HTTP": 80}, {"HTTPS": 443}]`, de-duplicated across members.
fn merged_listeners(group: &IngressGroup) -> Result<Vec<ListenerSpec>> {
    let mut listeners: Vec<ListenerSpec> = Vec::new();
    for member in &group.members {
        let Some(raw) =
            annotations::parse_string(annotations::SUFFIX_LISTEN_PORTS, &member.annotations)
        else {
            continue;
        };
        let entries: Vec<BTreeMap<String, u16>> = serde_json::from_str(raw)
            .with_context(|| format!("malformed listen-ports annotation on ingress {}", member.id))?;
        for entry in entries {
            for (protocol, port) in entry {
                let listener = ListenerSpec { protocol, port };
                if !listeners.contains(&listener) {
                    listeners.push(listener);
                }
            }
        }
    }
    Ok(listeners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alb_admission_core::{GroupId, IngressRef, IngressResource, DEFAULT_SCHEME};

    fn member(name: &str, entries: &[(&str, &str)]) -> IngressResource {
        let mut ing = IngressResource::new(IngressRef::new("default", name));
        ing.annotations = entries
            .iter()
            .map(|(k, v)| (annotations::key(k), v.to_string()))
            .collect();
        ing
    }

    fn group(members: Vec<IngressResource>) -> IngressGroup {
        IngressGroup::new(GroupId::Explicit("shared".into()), members)
    }

    #[tokio::test]
    async fn builds_from_combined_member_annotations() {
        let model = AnnotationModelBuilder::new(DEFAULT_SCHEME)
            .build(&group(vec![
                member(
                    "a",
                    &[
                        ("scheme", "internet-facing"),
                        ("listen-ports", r#"[{"HTTP": 80}]"#),
                        ("load-balancer-attributes", "idle_timeout.timeout_seconds=60"),
                    ],
                ),
                member(
                    "b",
                    &[
                        ("listen-ports", r#"[{"HTTP": 80}, {"HTTPS": 443}]"#),
                        ("tags", "team=edge"),
                    ],
                ),
            ]))
            .await
            .unwrap();

        assert_eq!(model.identity, LoadBalancerIdentity("shared".into()));
        assert_eq!(model.scheme, Scheme::InternetFacing);
        assert_eq!(model.lb_type, LoadBalancerType::Application);
        assert_eq!(
            model.attributes.get("idle_timeout.timeout_seconds"),
            Some(&"60".to_string())
        );
        assert_eq!(
            model.listeners,
            vec![
                ListenerSpec {
                    protocol: "HTTP".into(),
                    port: 80
                },
                ListenerSpec {
                    protocol: "HTTPS".into(),
                    port: 443
                },
            ]
        );
        assert_eq!(model.tags.get("team"), Some(&"edge".to_string()));
    }

    #[tokio::test]
    async fn scheme_defaults_when_no_member_sets_it() {
        let model = AnnotationModelBuilder::new(DEFAULT_SCHEME)
            .build(&group(vec![member("a", &[])]))
            .await
            .unwrap();
        assert_eq!(model.scheme, Scheme::Internal);
    }

    #[tokio::test]
    async fn conflicting_member_schemes_fail() {
        let err = AnnotationModelBuilder::new(DEFAULT_SCHEME)
            .build(&group(vec![
                member("a", &[("scheme", "internal")]),
                member("b", &[("scheme", "internet-facing")]),
            ]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("conflicting load balancer schemes"));
    }

    #[tokio::test]
    async fn conflicting_attribute_values_fail() {
        let err = AnnotationModelBuilder::new(DEFAULT_SCHEME)
            .build(&group(vec![
                member(
                    "a",
                    &[("load-balancer-attributes", "deletion_protection.enabled=true")],
                ),
                member(
                    "b",
                    &[("load-balancer-attributes", "deletion_protection.enabled=false")],
                ),
            ]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deletion_protection.enabled"));
    }

    #[tokio::test]
    async fn malformed_listen_ports_fail_with_member_identity() {
        let err = AnnotationModelBuilder::new(DEFAULT_SCHEME)
            .build(&group(vec![member("a", &[("listen-ports", "HTTP:80")])]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("default/a"));
    }
}

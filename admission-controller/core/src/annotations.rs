//! Annotation keys and parsing for the `alb.ingress.kubernetes.io` prefix.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

pub const ANNOTATION_PREFIX: &str = "alb.ingress.kubernetes.io";

/// Legacy class-selection annotation, predating `spec.ingressClassName`.
pub const INGRESS_CLASS: &str = "kubernetes.io/ingress.class";

pub const SUFFIX_SCHEME: &str = "scheme";
pub const SUFFIX_GROUP_NAME: &str = "group.name";
pub const SUFFIX_LOAD_BALANCER_ATTRIBUTES: &str = "load-balancer-attributes";
pub const SUFFIX_LISTEN_PORTS: &str = "listen-ports";
pub const SUFFIX_TAGS: &str = "tags";

pub fn key(suffix: &str) -> String {
    format!("{ANNOTATION_PREFIX}/{suffix}")
}

/// Reads a prefixed string annotation, if present.
pub fn parse_string<'a>(
    suffix: &str,
    annotations: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    annotations.get(&key(suffix)).map(String::as_str)
}

/// Reads a prefixed annotation holding a flattened `k1=v1,k2=v2` map.
///
/// Returns `None` when the annotation is absent; a present but malformed
/// value is an error.
pub fn parse_string_map(
    suffix: &str,
    annotations: &BTreeMap<String, String>,
) -> Result<Option<BTreeMap<String, String>>> {
    let Some(raw) = parse_string(suffix, annotations) else {
        return Ok(None);
    };

    let mut map = BTreeMap::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((k, v)) = pair.split_once('=') else {
            bail!("malformed {}/{suffix} entry: {pair}", ANNOTATION_PREFIX);
        };
        map.insert(k.trim().to_string(), v.trim().to_string());
    }
    Ok(Some(map))
}

use std::collections::BTreeMap;
use std::fmt;

/// Identifies an Ingress by namespace and name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IngressRef {
    pub namespace: String,
    pub name: String,
}

impl IngressRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for IngressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// An immutable snapshot of an Ingress as seen on the admission path.
///
/// Two snapshots exist per update (`old`, `new`); neither is ever modified
/// once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressResource {
    pub id: IngressRef,
    pub annotations: BTreeMap<String, String>,
    pub class_name: Option<String>,
}

impl IngressResource {
    pub fn new(id: IngressRef) -> Self {
        Self {
            id,
            annotations: BTreeMap::new(),
            class_name: None,
        }
    }
}

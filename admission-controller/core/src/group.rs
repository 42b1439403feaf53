use crate::{annotations, IngressRef, IngressResource};
use anyhow::Result;
use std::fmt;

/// Identifies the logical group of Ingresses sharing one load balancer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// Named via the `group.name` annotation and shared across Ingresses.
    Explicit(String),
    /// An Ingress without a group annotation forms a singleton group.
    Implicit(IngressRef),
}

impl GroupId {
    pub fn for_ingress(ing: &IngressResource) -> Self {
        match annotations::parse_string(annotations::SUFFIX_GROUP_NAME, &ing.annotations) {
            Some(name) => Self::Explicit(name.to_string()),
            None => Self::Implicit(ing.id.clone()),
        }
    }

    /// The stable identity token stamped on the group's load balancer.
    pub fn stack_id(&self) -> String {
        match self {
            Self::Explicit(name) => name.clone(),
            Self::Implicit(id) => id.to_string(),
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stack_id())
    }
}

/// A group identifier plus the ordered membership sharing one load balancer.
///
/// Membership is read-only within a validation pass: the snapshot may be
/// shared across concurrent evaluations, so hypothetical substitutions go
/// through [`IngressGroup::with_member`] rather than in-place mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressGroup {
    pub id: GroupId,
    pub members: Vec<IngressResource>,
}

impl IngressGroup {
    pub fn new(id: GroupId, members: Vec<IngressResource>) -> Self {
        Self { id, members }
    }

    /// Projects the group as it would look with `updated` in place of the
    /// member sharing its identity, appending it if no such member exists.
    /// The receiver is left untouched.
    pub fn with_member(&self, updated: &IngressResource) -> Self {
        let mut replaced = false;
        let mut members = Vec::with_capacity(self.members.len() + 1);
        for member in &self.members {
            if member.id == updated.id {
                members.push(updated.clone());
                replaced = true;
            } else {
                members.push(member.clone());
            }
        }
        if !replaced {
            members.push(updated.clone());
        }
        Self {
            id: self.id.clone(),
            members,
        }
    }
}

/// Loads the full current membership of a group, including the resource
/// under validation when it already exists.
#[async_trait::async_trait]
pub trait LoadGroup {
    async fn load(&self, id: &GroupId) -> Result<IngressGroup>;
}

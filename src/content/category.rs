use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "project", rename_all = "lowercase")]
pub enum Category {
    /// Blog posts and essays.
    Writing,
    /// Work-update logs, partitioned by project.
    Update(ProjectTag),
}

impl Category {
    pub fn project(&self) -> Option<&ProjectTag> {
        if let Self::Update(project) = self {
            Some(project)
        } else {
            None
        }
    }
}

/// Identifier of one of the configured update sources, e.g. `markus`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectTag(String);

impl ProjectTag {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProjectTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TemplateId;

/// A reusable multi-phase stage sequence.
///
/// Owns its stages; deleting a template deletes them, deactivating it
/// does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "event_category")]
    pub scope: CategoryScope,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which event category a template applies to.
///
/// Serialized as an optional category name; `null` means every category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum CategoryScope {
    #[default]
    All,
    Category(String),
}

impl CategoryScope {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryScope::All => true,
            CategoryScope::Category(name) => name.eq_ignore_ascii_case(category),
        }
    }
}

impl From<Option<String>> for CategoryScope {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(name) if !name.trim().is_empty() => CategoryScope::Category(name),
            _ => CategoryScope::All,
        }
    }
}

impl From<CategoryScope> for Option<String> {
    fn from(value: CategoryScope) -> Self {
        match value {
            CategoryScope::All => None,
            CategoryScope::Category(name) => Some(name),
        }
    }
}

impl std::fmt::Display for CategoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryScope::All => write!(f, "all categories"),
            CategoryScope::Category(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub description: String,
    pub scope: CategoryScope,
}

impl TemplateDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scope: CategoryScope::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scope: Option<CategoryScope>,
    pub is_active: Option<bool>,
}

impl TemplatePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.scope.is_none()
            && self.is_active.is_none()
    }

    pub fn is_only_activation(&self) -> bool {
        self.is_active.is_some()
            && self.name.is_none()
            && self.description.is_none()
            && self.scope.is_none()
    }
}

impl WorkflowTemplate {
    /// New templates start active.
    pub fn from_draft(draft: &TemplateDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            scope: draft.scope.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: &TemplatePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(scope) = &patch.scope {
            self.scope = scope.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// Active templates usable for an event of the given category.
pub fn templates_for_category<'a>(
    templates: impl IntoIterator<Item = &'a WorkflowTemplate>,
    category: &str,
) -> Vec<&'a WorkflowTemplate> {
    templates
        .into_iter()
        .filter(|t| t.is_active && t.scope.matches(category))
        .collect()
}

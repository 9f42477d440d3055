use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::models::phase::Phase;
use crate::models::{StageId, TemplateId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStage {
    pub id: StageId,
    pub template_id: TemplateId,
    pub name: String,
    #[serde(alias = "stage_type")]
    pub phase: Phase,
    /// 1-based position within the (template, phase) group
    pub order: u32,
    #[serde(default)]
    pub is_automated: bool,
    /// Present only when `is_automated` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_kind: Option<AutomationKind>,
    #[serde(default)]
    pub trigger_timing: TriggerTiming,
    /// Email template reference, only meaningful for `AutomationKind::Email`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<String>,
    #[serde(default)]
    pub task_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationKind {
    Email,
    Task,
}

impl std::fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomationKind::Email => write!(f, "EMAIL"),
            AutomationKind::Task => write!(f, "TASK"),
        }
    }
}

impl std::str::FromStr for AutomationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(AutomationKind::Email),
            "task" => Ok(AutomationKind::Task),
            _ => anyhow::bail!("Invalid automation kind: {s}. Use: email, task"),
        }
    }
}

static RELATIVE_TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(AFTER|BEFORE)_(\d+)_DAYS?$").expect("Invalid regex pattern")
});

/// When an automated stage fires.
///
/// Stored as a free-form token. Known shapes are parsed so callers can
/// reason about them; anything else is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TriggerTiming {
    #[default]
    OnCreation,
    AfterDays(u32),
    BeforeDays(u32),
    Custom(String),
}

impl std::fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerTiming::OnCreation => write!(f, "ON_CREATION"),
            TriggerTiming::AfterDays(1) => write!(f, "AFTER_1_DAY"),
            TriggerTiming::AfterDays(n) => write!(f, "AFTER_{n}_DAYS"),
            TriggerTiming::BeforeDays(1) => write!(f, "BEFORE_1_DAY"),
            TriggerTiming::BeforeDays(n) => write!(f, "BEFORE_{n}_DAYS"),
            TriggerTiming::Custom(token) => write!(f, "{token}"),
        }
    }
}

impl std::str::FromStr for TriggerTiming {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            anyhow::bail!("Trigger timing cannot be empty");
        }

        let upper = token.to_uppercase();
        if upper == "ON_CREATION" {
            return Ok(TriggerTiming::OnCreation);
        }

        if let Some(caps) = RELATIVE_TIMING.captures(&upper) {
            if let Ok(days) = caps[2].parse::<u32>() {
                return Ok(match &caps[1] {
                    "AFTER" => TriggerTiming::AfterDays(days),
                    _ => TriggerTiming::BeforeDays(days),
                });
            }
        }

        Ok(TriggerTiming::Custom(token.to_string()))
    }
}

impl TryFrom<String> for TriggerTiming {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TriggerTiming> for String {
    fn from(value: TriggerTiming) -> Self {
        value.to_string()
    }
}

/// Fields for a stage that does not exist yet.
///
/// `order` of `None` means "append to the end of the phase group".
#[derive(Debug, Clone, PartialEq)]
pub struct StageDraft {
    pub name: String,
    pub phase: Phase,
    pub order: Option<u32>,
    pub is_automated: bool,
    pub automation_kind: Option<AutomationKind>,
    pub trigger_timing: TriggerTiming,
    pub email_template: Option<String>,
    pub task_description: String,
}

impl StageDraft {
    pub fn new(name: impl Into<String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            phase,
            order: None,
            is_automated: false,
            automation_kind: None,
            trigger_timing: TriggerTiming::default(),
            email_template: None,
            task_description: String::new(),
        }
    }
}

/// Partial update of a stage. `None` leaves a field untouched.
///
/// The nested options clear a value when set to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePatch {
    pub name: Option<String>,
    pub phase: Option<Phase>,
    pub order: Option<u32>,
    pub is_automated: Option<bool>,
    pub automation_kind: Option<Option<AutomationKind>>,
    pub trigger_timing: Option<TriggerTiming>,
    pub email_template: Option<Option<String>>,
    pub task_description: Option<String>,
}

impl StagePatch {
    pub fn is_empty(&self) -> bool {
        *self == StagePatch::default()
    }

    /// True when applying the patch may move the stage or its neighbours.
    pub fn touches_order(&self) -> bool {
        self.phase.is_some() || self.order.is_some()
    }
}

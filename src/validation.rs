//! Input validation for templates and stages.
//!
//! Everything here runs before a request is submitted, so a validation
//! failure never reaches the service and never touches local state. The
//! catalog runs the same checks on its side.

use crate::models::constants::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use crate::models::{
    AutomationKind, Phase, StageDraft, StagePatch, TemplateDraft, TemplatePatch, TriggerTiming,
    WorkflowStage,
};
use crate::service::ServiceError;

/// Validates a stage or template name.
///
/// A name is valid if it is not blank and no longer than `MAX_NAME_LENGTH`
/// characters.
pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("name", "cannot be empty"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::validation(
            "name",
            format!(
                "too long: {} characters (max {MAX_NAME_LENGTH})",
                name.chars().count()
            ),
        ));
    }

    Ok(())
}

pub fn validate_description(field: &str, description: &str) -> Result<(), ServiceError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ServiceError::validation(
            field,
            format!(
                "too long: {} characters (max {MAX_DESCRIPTION_LENGTH})",
                description.chars().count()
            ),
        ));
    }

    Ok(())
}

/// Orders are 1-based.
pub fn validate_order(order: u32) -> Result<(), ServiceError> {
    if order == 0 {
        return Err(ServiceError::validation("order", "must be a positive integer"));
    }

    Ok(())
}

/// Automation settings must agree with each other.
///
/// - a kind is present iff the stage is automated
/// - an email template is only allowed for `AutomationKind::Email`
pub fn validate_automation(
    is_automated: bool,
    kind: Option<AutomationKind>,
    email_template: Option<&str>,
) -> Result<(), ServiceError> {
    match (is_automated, kind) {
        (true, None) => {
            return Err(ServiceError::validation(
                "automation_kind",
                "required when the stage is automated",
            ))
        }
        (false, Some(_)) => {
            return Err(ServiceError::validation(
                "automation_kind",
                "only allowed on automated stages",
            ))
        }
        _ => {}
    }

    if email_template.is_some() && kind != Some(AutomationKind::Email) {
        return Err(ServiceError::validation(
            "email_template",
            "only allowed with EMAIL automation",
        ));
    }

    Ok(())
}

pub fn validate_stage_draft(draft: &StageDraft) -> Result<(), ServiceError> {
    validate_name(&draft.name)?;
    if let Some(order) = draft.order {
        validate_order(order)?;
    }
    validate_description("task_description", &draft.task_description)?;
    validate_automation(
        draft.is_automated,
        draft.automation_kind,
        draft.email_template.as_deref(),
    )
}

/// Validates a patch against the stage it will be applied to.
///
/// Automation rules are checked on the merged result, so a patch that only
/// flips `is_automated` is judged together with the stage's current kind.
pub fn validate_stage_patch(current: &WorkflowStage, patch: &StagePatch) -> Result<(), ServiceError> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(order) = patch.order {
        validate_order(order)?;
    }
    if let Some(task) = &patch.task_description {
        validate_description("task_description", task)?;
    }

    let mut merged = current.clone();
    merged.apply_fields(patch);
    validate_automation(
        merged.is_automated,
        merged.automation_kind,
        merged.email_template.as_deref(),
    )
}

pub fn validate_template_draft(draft: &TemplateDraft) -> Result<(), ServiceError> {
    validate_name(&draft.name)?;
    validate_description("description", &draft.description)
}

pub fn validate_template_patch(patch: &TemplatePatch) -> Result<(), ServiceError> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(description) = &patch.description {
        validate_description("description", description)?;
    }
    Ok(())
}

/// Clap value parser for name arguments.
pub fn clap_name_validator(s: &str) -> Result<String, String> {
    validate_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for 1-based order arguments.
pub fn clap_order_validator(s: &str) -> Result<u32, String> {
    let order: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a positive integer"))?;
    validate_order(order).map_err(|e| e.to_string())?;
    Ok(order)
}

/// Clap value parser for 1-based positions inside a phase group.
pub fn clap_position_validator(s: &str) -> Result<usize, String> {
    clap_order_validator(s).map(|order| order as usize)
}

pub fn clap_phase_validator(s: &str) -> Result<Phase, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub fn clap_automation_validator(s: &str) -> Result<AutomationKind, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

pub fn clap_trigger_validator(s: &str) -> Result<TriggerTiming, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

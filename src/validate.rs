//! Lint checks over a resolved universe. These never block resolution; they
//! flag definitions that will instantiate in a surprising way.

use std::fmt;

use serde::Serialize;

use crate::classdef::{ResolvedClass, ResolvedUniverse, CODE_FIELD, DISPLAY_NAME_FIELD};
use crate::loadout::{ContainerKind, Slot, SlotPolicy};
use crate::settings::LoadoutSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    /// Class the diagnostic is about.
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_universe(universe: &ResolvedUniverse, settings: &LoadoutSettings) -> ValidationReport {
    let mut report = ValidationReport::default();
    for class in universe.iter() {
        validate_class(class, settings, &mut report);
    }
    report
}

fn validate_class(class: &ResolvedClass, settings: &LoadoutSettings, report: &mut ValidationReport) {
    let context = class.name.as_str();

    if class.display_name().trim().is_empty() {
        report.push(ValidationSeverity::Warning, context, "displayName is empty");
    }

    let primary = class.slot(Slot::PrimaryWeapon);
    if primary.is_empty() {
        for slot in Slot::ALL.into_iter().filter(Slot::is_primary_attachment) {
            if !class.slot(slot).is_empty() {
                report.push(
                    ValidationSeverity::Warning,
                    context,
                    format!("{slot} lists attachments but primaryWeapon is empty"),
                );
            }
        }
    }

    let stows = !class.slot(Slot::Magazines).is_empty() || !class.slot(Slot::Items).is_empty();
    // an empty container slot listed in keep_when_empty keeps the unit's own
    let carries = ContainerKind::FILL_ORDER
        .into_iter()
        .map(|kind| kind.slot())
        .any(|slot| !class.slot(slot).is_empty() || settings.keeps_when_empty(slot));
    if stows && !carries {
        report.push(
            ValidationSeverity::Warning,
            context,
            "magazines/items are listed but uniform, vest and backpack are all empty; they will be dropped",
        );
    }

    if !class.slot(Slot::BackpackItems).is_empty()
        && class.slot(Slot::Backpack).is_empty()
        && !settings.keeps_when_empty(Slot::Backpack)
    {
        report.push(
            ValidationSeverity::Warning,
            context,
            "backpackItems are listed but backpack is empty",
        );
    }

    for slot in Slot::ALL {
        let entries = class.slot(slot);
        if entries.iter().any(|e| e.trim().is_empty()) {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("{slot} contains an empty item name"),
            );
        }
        let has_marker = entries
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&settings.keep_marker));
        if has_marker && slot.policy() != SlotPolicy::RandomPool {
            report.push(
                ValidationSeverity::Warning,
                context,
                format!(
                    "{slot} contains '{}', which only has meaning in randomized slots",
                    settings.keep_marker
                ),
            );
        }
    }

    for field in class.fields.keys() {
        let known = field == DISPLAY_NAME_FIELD
            || field == CODE_FIELD
            || Slot::from_field_name(field).is_some();
        if !known {
            report.push(
                ValidationSeverity::Info,
                context,
                format!("field '{field}' is not a loadout slot and is passed through unchanged"),
            );
        }
    }
}

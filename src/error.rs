//! Error taxonomy for parsing, resolving and loading class universes.
//!
//! [ConfigError] is fatal to the universe it came from. [LoadoutWarning] is
//! collected on an instantiated loadout and never aborts it.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::loadout::Slot;

/// 1-based position in the universe text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Shape of a field value, used when reporting type mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Sequence,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("malformed macro `{token}` at {location}: {reason}")]
    MacroSyntax {
        token: String,
        reason: String,
        location: Location,
    },

    #[error("syntax error at {location}: {message}")]
    Syntax { message: String, location: Location },

    #[error("class `{name}` declared twice (first at {first}, again at {second})")]
    DuplicateClass {
        name: String,
        first: Location,
        second: Location,
    },

    #[error("field `{field}` of class `{class}` must be a {expected}, found a {found}")]
    FieldType {
        class: String,
        field: String,
        expected: FieldKind,
        found: FieldKind,
        location: Option<Location>,
    },

    #[error("class `{class}` inherits from unknown class `{parent}`")]
    UnknownParent { class: String, parent: String },

    #[error("inheritance cycle: {}", path.join(" -> "))]
    InheritanceCycle { path: Vec<String> },
}

impl ConfigError {
    pub(crate) fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn macro_syntax(
        token: impl Into<String>,
        reason: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::MacroSyntax {
            token: token.into(),
            reason: reason.into(),
            location,
        }
    }

    /// Position of the offending token, when the error has one.
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::MacroSyntax { location, .. } | Self::Syntax { location, .. } => Some(*location),
            Self::DuplicateClass { second, .. } => Some(*second),
            Self::FieldType { location, .. } => *location,
            Self::UnknownParent { .. } | Self::InheritanceCycle { .. } => None,
        }
    }
}

/// Errors from the file-facing wrappers (source loader, settings).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("include '{include}' in '{}' could not be found", from.display())]
    MissingInclude { include: String, from: PathBuf },

    #[error("malformed directive `{directive}` in '{}'", from.display())]
    IncludeSyntax { directive: String, from: PathBuf },

    #[error("invalid settings in '{}': {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Non-fatal issue raised while instantiating one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadoutWarning {
    /// `dropped` copies of `item` did not fit in any available container.
    CapacityExceeded {
        slot: Slot,
        item: String,
        dropped: usize,
    },
    /// Items destined for a container the unit will not carry.
    MissingContainer { slot: Slot, items: Vec<String> },
}

impl fmt::Display for LoadoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                slot,
                item,
                dropped,
            } => write!(
                f,
                "capacity exceeded: dropped {dropped} x '{item}' from {}",
                slot.field_name()
            ),
            Self::MissingContainer { slot, items } => write!(
                f,
                "no container for {}: {} item(s) granted without a container",
                slot.field_name(),
                items.len()
            ),
        }
    }
}

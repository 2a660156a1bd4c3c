//! Parsed class records, before inheritance is applied.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FieldKind, Location};

pub const DISPLAY_NAME_FIELD: &str = "displayName";
pub const CODE_FIELD: &str = "code";

/// Value of a single field: a scalar or an ordered sequence of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Scalar(_) => FieldKind::Scalar,
            Self::Sequence(_) => FieldKind::Sequence,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[String]> {
        match self {
            Self::Sequence(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }
}

/// One `class` declaration with only the fields written in its own body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRecord {
    pub name: String,
    pub parent: Option<String>,
    pub fields: IndexMap<String, FieldValue>,
    pub location: Location,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: IndexMap::new(),
            location,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The opaque post-equip hook, if this body declares one.
    pub fn code(&self) -> Option<&str> {
        self.fields.get(CODE_FIELD).and_then(FieldValue::as_scalar)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.fields
            .get(DISPLAY_NAME_FIELD)
            .and_then(FieldValue::as_scalar)
    }
}

/// Records compiled together, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    records: Vec<ClassRecord>,
    index: HashMap<String, usize>,
    case_sensitive: bool,
}

impl Universe {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..Self::default()
        }
    }

    /// Lookup key for a class name under this universe's case rule.
    pub fn key(&self, name: &str) -> String {
        lookup_key(name, self.case_sensitive)
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Add a record; on a name clash returns the existing record back as `Err`.
    pub fn insert(&mut self, record: ClassRecord) -> Result<(), &ClassRecord> {
        let key = self.key(&record.name);
        if let Some(&existing) = self.index.get(&key) {
            return Err(&self.records[existing]);
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassRecord> {
        self.position(name).map(|i| &self.records[i])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&self.key(name)).copied()
    }

    pub fn records(&self) -> &[ClassRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub(crate) fn lookup_key(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_case_insensitive_clash() {
        let mut universe = Universe::new(false);
        universe
            .insert(ClassRecord::new("Rifleman", Location::new(1, 1)))
            .unwrap();
        let clash = universe
            .insert(ClassRecord::new("RIFLEMAN", Location::new(5, 1)))
            .unwrap_err();
        assert_eq!(clash.location, Location::new(1, 1));
        assert!(universe.get("rifleman").is_some());
    }

    #[test]
    fn case_sensitive_universe_keeps_distinct_names() {
        let mut universe = Universe::new(true);
        universe.insert(ClassRecord::new("a", Location::new(1, 1))).unwrap();
        universe.insert(ClassRecord::new("A", Location::new(2, 1))).unwrap();
        assert_eq!(universe.len(), 2);
        assert!(universe.get("a").is_some());
        assert!(universe.get("B").is_none());
    }

    #[test]
    fn accessors_read_scalar_fields() {
        let record = ClassRecord::new("rm", Location::new(1, 1))
            .with_field(DISPLAY_NAME_FIELD, FieldValue::Scalar("Rifleman".into()))
            .with_field(CODE_FIELD, FieldValue::Scalar("hint 'x'".into()));
        assert_eq!(record.display_name(), Some("Rifleman"));
        assert_eq!(record.code(), Some("hint 'x'"));
    }
}

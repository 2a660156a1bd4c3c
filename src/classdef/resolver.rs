//! Flattens single inheritance into a fully merged field table per class.
//!
//! Parents are resolved before children. A child's declared field replaces the
//! inherited value wholesale; sequences are never concatenated.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::classdef::model::{
    lookup_key, ClassRecord, FieldValue, Universe, CODE_FIELD, DISPLAY_NAME_FIELD,
};
use crate::classdef::parser::parse_universe;
use crate::error::ConfigError;
use crate::loadout::Slot;
use crate::settings::ParseSettings;

/// Table every root class starts from: all slots empty, blank name and code.
pub fn default_fields() -> IndexMap<String, FieldValue> {
    let mut fields = IndexMap::new();
    fields.insert(
        DISPLAY_NAME_FIELD.to_string(),
        FieldValue::Scalar(String::new()),
    );
    for slot in Slot::ALL {
        fields.insert(
            slot.field_name().to_string(),
            FieldValue::Sequence(Vec::new()),
        );
    }
    fields.insert(CODE_FIELD.to_string(), FieldValue::Scalar(String::new()));
    fields
}

/// A class with its inheritance chain applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClass {
    pub name: String,
    /// This class followed by its ancestors up to the root.
    pub lineage: Vec<String>,
    pub fields: IndexMap<String, FieldValue>,
}

impl ResolvedClass {
    /// Resolved entries of a slot. Always present after resolution.
    pub fn slot(&self, slot: Slot) -> &[String] {
        self.fields
            .get(slot.field_name())
            .and_then(FieldValue::as_sequence)
            .unwrap_or(&[])
    }

    pub fn display_name(&self) -> &str {
        self.scalar(DISPLAY_NAME_FIELD).unwrap_or("")
    }

    pub fn code(&self) -> &str {
        self.scalar(CODE_FIELD).unwrap_or("")
    }

    pub fn scalar(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_scalar)
    }

    pub fn sequence(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).and_then(FieldValue::as_sequence)
    }

    pub fn parent(&self) -> Option<&str> {
        self.lineage.get(1).map(String::as_str)
    }
}

/// Every class of a universe, resolved, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUniverse {
    classes: IndexMap<String, ResolvedClass>,
    case_sensitive: bool,
}

impl ResolvedUniverse {
    pub fn get(&self, name: &str) -> Option<&ResolvedClass> {
        self.classes.get(&lookup_key(name, self.case_sensitive))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `className -> {field -> value}` view handed to the engine layer.
    pub fn table(&self) -> IndexMap<&str, &IndexMap<String, FieldValue>> {
        self.classes
            .values()
            .map(|class| (class.name.as_str(), &class.fields))
            .collect()
    }
}

/// Parse and resolve in one step.
pub fn resolve_text(text: &str, settings: &ParseSettings) -> Result<ResolvedUniverse, ConfigError> {
    let universe = parse_universe(text, settings)?;
    resolve(&universe)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Resolve every class of `universe`. Fails on the first unknown parent,
/// inheritance cycle or conflicting field kind; nothing partial is returned.
pub fn resolve(universe: &Universe) -> Result<ResolvedUniverse, ConfigError> {
    let records = universe.records();

    let mut parents: Vec<Option<usize>> = Vec::with_capacity(records.len());
    for record in records {
        let parent = match &record.parent {
            None => None,
            Some(name) => Some(universe.position(name).ok_or_else(|| {
                ConfigError::UnknownParent {
                    class: record.name.clone(),
                    parent: name.clone(),
                }
            })?),
        };
        parents.push(parent);
    }

    let order = parents_first_order(records, &parents)?;

    let mut resolved: Vec<Option<ResolvedClass>> = vec![None; records.len()];
    for index in order {
        let record = &records[index];
        let (mut fields, mut lineage) = match parents[index].and_then(|p| resolved[p].as_ref()) {
            Some(parent) => (parent.fields.clone(), parent.lineage.clone()),
            None => (default_fields(), Vec::new()),
        };
        merge_declared(record, &mut fields)?;
        lineage.insert(0, record.name.clone());
        resolved[index] = Some(ResolvedClass {
            name: record.name.clone(),
            lineage,
            fields,
        });
    }

    let classes = resolved
        .into_iter()
        .flatten()
        .map(|class| (universe.key(&class.name), class))
        .collect::<IndexMap<_, _>>();
    debug!("resolved {} class(es)", classes.len());

    Ok(ResolvedUniverse {
        classes,
        case_sensitive: universe.case_sensitive(),
    })
}

/// Replace inherited values with the class's own declarations.
fn merge_declared(
    record: &ClassRecord,
    fields: &mut IndexMap<String, FieldValue>,
) -> Result<(), ConfigError> {
    for (name, value) in &record.fields {
        if let Some(inherited) = fields.get(name) {
            if inherited.kind() != value.kind() {
                return Err(ConfigError::FieldType {
                    class: record.name.clone(),
                    field: name.clone(),
                    expected: inherited.kind(),
                    found: value.kind(),
                    location: None,
                });
            }
        }
        fields.insert(name.clone(), value.clone());
    }
    Ok(())
}

/// Order record indices so every parent precedes its children. Detects cycles
/// by marking chains in progress while walking up to a resolved ancestor.
fn parents_first_order(
    records: &[ClassRecord],
    parents: &[Option<usize>],
) -> Result<Vec<usize>, ConfigError> {
    let mut marks = vec![Mark::Unvisited; records.len()];
    let mut order = Vec::with_capacity(records.len());

    for start in 0..records.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            match marks[index] {
                Mark::Done => break,
                Mark::InProgress => {
                    let cycle_start = chain.iter().position(|&i| i == index).unwrap_or(0);
                    let mut path: Vec<String> = chain[cycle_start..]
                        .iter()
                        .map(|&i: &usize| records[i].name.clone())
                        .collect();
                    path.push(records[index].name.clone());
                    return Err(ConfigError::InheritanceCycle { path });
                }
                Mark::Unvisited => {
                    marks[index] = Mark::InProgress;
                    chain.push(index);
                    current = parents[index];
                }
            }
        }
        for &index in chain.iter().rev() {
            marks[index] = Mark::Done;
            order.push(index);
        }
    }
    Ok(order)
}

//! Turns one resolved class into a concrete per-unit [Loadout].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::classdef::ResolvedClass;
use crate::error::LoadoutWarning;
use crate::loadout::slot::{ContainerKind, Slot, SlotPolicy};
use crate::rng::RandomSource;
use crate::settings::LoadoutSettings;

/// What happens to a slot on the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "items", rename_all = "snake_case")]
pub enum SlotAssignment {
    /// Leave whatever the unit already has.
    Keep,
    /// Remove whatever the unit has.
    Clear,
    Equip(String),
    Grant(Vec<String>),
    Stowed(Vec<StowedItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StowedItem {
    pub item: String,
    pub container: ContainerKind,
}

/// Post-equip hook for the engine to run with the unit as argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Callback {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loadout {
    pub class_name: String,
    pub display_name: String,
    pub slots: BTreeMap<Slot, SlotAssignment>,
    pub callback: Option<Callback>,
    pub warnings: Vec<LoadoutWarning>,
}

impl Loadout {
    pub fn assignment(&self, slot: Slot) -> Option<&SlotAssignment> {
        self.slots.get(&slot)
    }

    /// Item picked for a random-pool slot, if one was equipped.
    pub fn equipped(&self, slot: Slot) -> Option<&str> {
        match self.slots.get(&slot) {
            Some(SlotAssignment::Equip(item)) => Some(item),
            _ => None,
        }
    }

    /// Everything that ends up inside `kind`, in insertion order.
    pub fn container_contents(&self, kind: ContainerKind) -> Vec<&str> {
        let mut contents = Vec::new();
        if kind == ContainerKind::Backpack {
            if let Some(SlotAssignment::Grant(items)) = self.slots.get(&Slot::BackpackItems) {
                contents.extend(items.iter().map(String::as_str));
            }
        }
        for slot in [Slot::Magazines, Slot::Items] {
            if let Some(SlotAssignment::Stowed(stowed)) = self.slots.get(&slot) {
                contents.extend(
                    stowed
                        .iter()
                        .filter(|s| s.container == kind)
                        .map(|s| s.item.as_str()),
                );
            }
        }
        contents
    }
}

/// Remaining load units per container the unit will carry.
#[derive(Debug, Clone, Default)]
struct ContainerSpace {
    remaining: BTreeMap<ContainerKind, u32>,
}

impl ContainerSpace {
    fn has(&self, kind: ContainerKind) -> bool {
        self.remaining.contains_key(&kind)
    }

    /// First container in fill order with room for `load`.
    fn stow(&mut self, load: u32) -> Option<ContainerKind> {
        ContainerKind::FILL_ORDER.into_iter().find(|kind| {
            match self.remaining.get_mut(kind) {
                Some(room) if *room >= load => {
                    *room -= load;
                    true
                }
                _ => false,
            }
        })
    }

    fn consume(&mut self, kind: ContainerKind, load: u32) {
        if let Some(room) = self.remaining.get_mut(&kind) {
            *room = room.saturating_sub(load);
        }
    }
}

pub struct Instantiator<'a> {
    settings: &'a LoadoutSettings,
}

impl<'a> Instantiator<'a> {
    pub fn new(settings: &'a LoadoutSettings) -> Self {
        Self { settings }
    }

    /// Build one unit's loadout. Random draws happen in slot catalogue order,
    /// so the same class and seed always give the same result.
    pub fn instantiate<R: RandomSource + ?Sized>(
        &self,
        class: &ResolvedClass,
        rng: &mut R,
    ) -> Loadout {
        let mut slots = BTreeMap::new();
        let mut warnings = Vec::new();

        for slot in Slot::ALL {
            let entries = class.slot(slot);
            match slot.policy() {
                SlotPolicy::RandomPool => {
                    slots.insert(slot, self.pick(slot, entries, rng));
                }
                SlotPolicy::Fixed => {
                    slots.insert(slot, SlotAssignment::Grant(entries.to_vec()));
                }
                SlotPolicy::ContainerFill => {}
            }
        }

        let mut space = self.container_space(&slots);

        let backpack_items = class.slot(Slot::BackpackItems);
        if !backpack_items.is_empty() {
            if space.has(ContainerKind::Backpack) {
                for item in backpack_items {
                    space.consume(ContainerKind::Backpack, self.settings.item_load(item));
                }
            } else {
                warnings.push(LoadoutWarning::MissingContainer {
                    slot: Slot::BackpackItems,
                    items: backpack_items.to_vec(),
                });
            }
        }

        for slot in [Slot::Magazines, Slot::Items] {
            let mut stowed = Vec::new();
            let mut dropped: IndexMap<&str, usize> = IndexMap::new();
            for item in class.slot(slot) {
                match space.stow(self.settings.item_load(item)) {
                    Some(container) => stowed.push(StowedItem {
                        item: item.clone(),
                        container,
                    }),
                    None => *dropped.entry(item.as_str()).or_default() += 1,
                }
            }
            for (item, count) in dropped {
                warnings.push(LoadoutWarning::CapacityExceeded {
                    slot,
                    item: item.to_string(),
                    dropped: count,
                });
            }
            slots.insert(slot, SlotAssignment::Stowed(stowed));
        }

        for warning in &warnings {
            warn!("class '{}': {warning}", class.name);
        }

        let code = class.code();
        let callback = if code.trim().is_empty() {
            None
        } else {
            Some(Callback {
                code: code.to_string(),
            })
        };

        Loadout {
            class_name: class.name.clone(),
            display_name: class.display_name().to_string(),
            slots,
            callback,
            warnings,
        }
    }

    fn pick<R: RandomSource + ?Sized>(
        &self,
        slot: Slot,
        entries: &[String],
        rng: &mut R,
    ) -> SlotAssignment {
        if entries.is_empty() {
            return if self.settings.keeps_when_empty(slot) {
                SlotAssignment::Keep
            } else {
                SlotAssignment::Clear
            };
        }
        let choice = &entries[rng.pick(entries.len())];
        if choice.eq_ignore_ascii_case(&self.settings.keep_marker) {
            SlotAssignment::Keep
        } else {
            SlotAssignment::Equip(choice.clone())
        }
    }

    /// Containers the unit will carry after random-pool slots are decided.
    /// A kept container's class is unknown, so it gets the kind default.
    fn container_space(&self, slots: &BTreeMap<Slot, SlotAssignment>) -> ContainerSpace {
        let capacity = &self.settings.capacity;
        let mut space = ContainerSpace::default();
        for kind in ContainerKind::FILL_ORDER {
            let room = match slots.get(&kind.slot()) {
                Some(SlotAssignment::Equip(item)) => capacity.of_item(kind, item),
                Some(SlotAssignment::Keep) => capacity.default_for(kind),
                _ => continue,
            };
            space.remaining.insert(kind, room);
        }
        space
    }
}

//! Closed catalogue of equipment slots and how each one is instantiated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the instantiator treats a slot's resolved sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Pick one entry at random.
    RandomPool,
    /// Grant every entry as listed.
    Fixed,
    /// Stow every entry into uniform / vest, spilling into the backpack.
    ContainerFill,
}

/// Container a unit carries items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Uniform,
    Vest,
    Backpack,
}

impl ContainerKind {
    /// Order containers are tried in when stowing.
    pub const FILL_ORDER: [ContainerKind; 3] = [Self::Uniform, Self::Vest, Self::Backpack];

    /// Slot whose pick provides this container.
    pub fn slot(&self) -> Slot {
        match self {
            Self::Uniform => Slot::Uniform,
            Self::Vest => Slot::Vest,
            Self::Backpack => Slot::Backpack,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Uniform,
    Vest,
    Backpack,
    Headgear,
    Goggles,
    Hmd,
    Faces,
    Insignias,
    PrimaryWeapon,
    Scope,
    Bipod,
    Attachment,
    Silencer,
    SecondaryWeapon,
    SecondaryAttachments,
    SidearmWeapon,
    SidearmAttachments,
    Magazines,
    Items,
    LinkedItems,
    BackpackItems,
}

impl Slot {
    /// Every slot, in the order the instantiator processes them.
    pub const ALL: [Slot; 21] = [
        Slot::Uniform,
        Slot::Vest,
        Slot::Backpack,
        Slot::Headgear,
        Slot::Goggles,
        Slot::Hmd,
        Slot::Faces,
        Slot::Insignias,
        Slot::PrimaryWeapon,
        Slot::Scope,
        Slot::Bipod,
        Slot::Attachment,
        Slot::Silencer,
        Slot::SecondaryWeapon,
        Slot::SecondaryAttachments,
        Slot::SidearmWeapon,
        Slot::SidearmAttachments,
        Slot::Magazines,
        Slot::Items,
        Slot::LinkedItems,
        Slot::BackpackItems,
    ];

    /// Field name as written in class bodies.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Vest => "vest",
            Self::Backpack => "backpack",
            Self::Headgear => "headgear",
            Self::Goggles => "goggles",
            Self::Hmd => "hmd",
            Self::Faces => "faces",
            Self::Insignias => "insignias",
            Self::PrimaryWeapon => "primaryWeapon",
            Self::Scope => "scope",
            Self::Bipod => "bipod",
            Self::Attachment => "attachment",
            Self::Silencer => "silencer",
            Self::SecondaryWeapon => "secondaryWeapon",
            Self::SecondaryAttachments => "secondaryAttachments",
            Self::SidearmWeapon => "sidearmWeapon",
            Self::SidearmAttachments => "sidearmAttachments",
            Self::Magazines => "magazines",
            Self::Items => "items",
            Self::LinkedItems => "linkedItems",
            Self::BackpackItems => "backpackItems",
        }
    }

    /// Match a field name to a slot. Field names are case-insensitive.
    pub fn from_field_name(name: &str) -> Option<Slot> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.field_name().eq_ignore_ascii_case(name))
    }

    pub fn policy(&self) -> SlotPolicy {
        match self {
            Self::Uniform
            | Self::Vest
            | Self::Backpack
            | Self::Headgear
            | Self::Goggles
            | Self::Hmd
            | Self::Faces
            | Self::Insignias
            | Self::PrimaryWeapon
            | Self::Scope
            | Self::Bipod
            | Self::Attachment
            | Self::Silencer => SlotPolicy::RandomPool,
            Self::SecondaryWeapon
            | Self::SecondaryAttachments
            | Self::SidearmWeapon
            | Self::SidearmAttachments
            | Self::LinkedItems
            | Self::BackpackItems => SlotPolicy::Fixed,
            Self::Magazines | Self::Items => SlotPolicy::ContainerFill,
        }
    }

    /// Primary weapon attachments, only meaningful when a primary is equipped.
    pub fn is_primary_attachment(&self) -> bool {
        matches!(
            self,
            Self::Scope | Self::Bipod | Self::Attachment | Self::Silencer
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

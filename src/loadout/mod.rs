//! Loadout instantiation: one resolved class plus a random source in, one
//! concrete unit assignment out.

mod instantiate;
mod slot;

pub use instantiate::{Callback, Instantiator, Loadout, SlotAssignment, StowedItem};
pub use slot::{ContainerKind, Slot, SlotPolicy};

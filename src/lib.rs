//! Resolution engine for inheriting, macro-expanded loadout class definitions.
//!
//! Text is parsed into class records ([classdef::parse_universe]), flattened
//! through single inheritance ([classdef::resolve]) and instantiated into
//! per-unit equipment ([loadout::Instantiator]).

pub mod classdef;
pub mod cli;
pub mod error;
pub mod loadout;
pub mod parallel;
pub mod rng;
pub mod settings;
pub mod source;
pub mod validate;

pub use classdef::{parse_universe, resolve, resolve_text, ClassRecord, FieldValue, ResolvedClass, ResolvedUniverse};
pub use error::{ConfigError, LoadError, LoadoutWarning, Location};
pub use loadout::{Instantiator, Loadout, Slot, SlotAssignment};
pub use rng::{RandomSource, Rng};
pub use settings::EngineSettings;

//! Class definition language: tokenizing, `LIST_n` expansion, parsing class
//! records and flattening their inheritance into resolved field tables.

pub mod lexer;
pub mod macros;
mod model;
mod parser;
mod resolver;

pub use model::{ClassRecord, FieldValue, Universe, CODE_FIELD, DISPLAY_NAME_FIELD};
pub use parser::parse_universe;
pub use resolver::{default_fields, resolve, resolve_text, ResolvedClass, ResolvedUniverse};

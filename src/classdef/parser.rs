//! Recursive-descent parser turning universe text into [ClassRecord]s.
//!
//! ```text
//! universe   := class_decl*
//! class_decl := "class" NAME (":" NAME)? "{" stmt* "}" ";"
//! stmt       := NAME "[" "]" "=" "{" sequence "}" ";"
//!             | NAME "=" scalar ";"
//! ```

use log::{trace, warn};

use crate::classdef::lexer::{tokenize, Token, TokenKind};
use crate::classdef::macros::expand_sequence;
use crate::classdef::model::{ClassRecord, FieldValue, Universe, CODE_FIELD, DISPLAY_NAME_FIELD};
use crate::error::{ConfigError, FieldKind, Location};
use crate::loadout::Slot;
use crate::settings::ParseSettings;

const CLASS_KEYWORD: &str = "class";

/// Parse a whole configuration universe. Fields hold only what each class body
/// declares itself; no inheritance is applied.
pub fn parse_universe(text: &str, settings: &ParseSettings) -> Result<Universe, ConfigError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let mut universe = Universe::new(settings.case_sensitive);

    while !parser.at_eof() {
        let record = parser.class_decl()?;
        trace!(
            "parsed class '{}' with {} own field(s)",
            record.name,
            record.fields.len()
        );
        let second = record.location;
        let name = record.name.clone();
        if let Err(existing) = universe.insert(record) {
            return Err(ConfigError::DuplicateClass {
                name,
                first: existing.location,
                second,
            });
        }
    }
    Ok(universe)
}

/// Expected value shape for a field name, when the name is a known one.
fn declared_kind(field: &str) -> Option<FieldKind> {
    if Slot::from_field_name(field).is_some() {
        Some(FieldKind::Sequence)
    } else if field.eq_ignore_ascii_case(DISPLAY_NAME_FIELD) || field.eq_ignore_ascii_case(CODE_FIELD)
    {
        Some(FieldKind::Scalar)
    } else {
        None
    }
}

/// Canonical spelling for known field names so lookups after parsing are exact.
fn canonical_field_name(field: &str) -> String {
    if let Some(slot) = Slot::from_field_name(field) {
        slot.field_name().to_string()
    } else if field.eq_ignore_ascii_case(DISPLAY_NAME_FIELD) {
        DISPLAY_NAME_FIELD.to_string()
    } else if field.eq_ignore_ascii_case(CODE_FIELD) {
        CODE_FIELD.to_string()
    } else {
        field.to_string()
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &'a Token {
        // tokens always end with Eof, and pos never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<&'a Token, ConfigError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(ConfigError::syntax(
                format!("expected {kind} {context}, found {}", token.kind),
                token.location,
            ))
        }
    }

    fn name(&mut self, context: &str) -> Result<(String, Location), ConfigError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Word(w) => Ok((w.clone(), token.location)),
            other => Err(ConfigError::syntax(
                format!("expected a name {context}, found {other}"),
                token.location,
            )),
        }
    }

    fn class_decl(&mut self) -> Result<ClassRecord, ConfigError> {
        let keyword = self.advance();
        match &keyword.kind {
            TokenKind::Word(w) if w.eq_ignore_ascii_case(CLASS_KEYWORD) => {}
            other => {
                return Err(ConfigError::syntax(
                    format!("expected `class` declaration, found {other}"),
                    keyword.location,
                ))
            }
        }

        let (name, _) = self.name("after `class`")?;
        let mut record = ClassRecord::new(name, keyword.location);

        if self.peek().kind == TokenKind::Colon {
            self.advance();
            let (parent, _) = self.name("after `:`")?;
            record.parent = Some(parent);
        }

        let open = self.expect(TokenKind::LBrace, "to open the class body")?;
        loop {
            match &self.peek().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ConfigError::syntax(
                        format!("unterminated body of class `{}`", record.name),
                        open.location,
                    ))
                }
                _ => self.statement(&mut record)?,
            }
        }
        self.expect(
            TokenKind::Semicolon,
            &format!("after the body of class `{}`", record.name),
        )?;
        Ok(record)
    }

    fn statement(&mut self, record: &mut ClassRecord) -> Result<(), ConfigError> {
        let (field, location) = self.name("at start of statement")?;
        if field.eq_ignore_ascii_case(CLASS_KEYWORD) {
            return Err(ConfigError::syntax(
                format!("nested class inside `{}` is not supported", record.name),
                location,
            ));
        }

        let is_array = self.peek().kind == TokenKind::LBracket;
        if is_array {
            self.advance();
            self.expect(TokenKind::RBracket, &format!("after `{field}[`"))?;
        }
        self.expect(TokenKind::Equals, &format!("after `{field}`"))?;

        let value_is_sequence = self.peek().kind == TokenKind::LBrace;
        let found = if value_is_sequence {
            FieldKind::Sequence
        } else {
            FieldKind::Scalar
        };
        let written = if is_array {
            FieldKind::Sequence
        } else {
            FieldKind::Scalar
        };
        let expected = declared_kind(&field).unwrap_or(written);
        if found != expected || written != expected {
            let found = if found != expected { found } else { written };
            return Err(ConfigError::FieldType {
                class: record.name.clone(),
                field,
                expected,
                found,
                location: Some(location),
            });
        }

        let value = if value_is_sequence {
            FieldValue::Sequence(self.sequence_body()?)
        } else {
            FieldValue::Scalar(self.scalar(&field)?)
        };
        self.expect(TokenKind::Semicolon, &format!("after the value of `{field}`"))?;

        let field = canonical_field_name(&field);
        if record.fields.insert(field.clone(), value).is_some() {
            warn!(
                "class '{}' assigns '{}' more than once at {}; keeping the last value",
                record.name, field, location
            );
        }
        Ok(())
    }

    fn scalar(&mut self, field: &str) -> Result<String, ConfigError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Str(s) | TokenKind::Word(s) => Ok(s.clone()),
            other => Err(ConfigError::syntax(
                format!("expected a value for `{field}`, found {other}"),
                token.location,
            )),
        }
    }

    /// Consume `{ ... }` and macro-expand the tokens in between.
    fn sequence_body(&mut self) -> Result<Vec<String>, ConfigError> {
        let open = self.expect(TokenKind::LBrace, "to open the sequence")?;
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Semicolon if depth == 0 => {
                    return Err(ConfigError::syntax("unterminated sequence", open.location))
                }
                TokenKind::Eof => {
                    return Err(ConfigError::syntax("unterminated sequence", open.location))
                }
                _ => {}
            }
            self.advance();
        }
        let body = &self.tokens[start..self.pos];
        // closing brace
        self.advance();
        expand_sequence(body)
    }
}

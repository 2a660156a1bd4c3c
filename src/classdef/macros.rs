//! `LIST_n(x)` expansion over the tokens of a sequence body.
//!
//! The only macro family understood is repetition: `LIST_n(entry)` stands for
//! `entry` written `n` times at the same position. Arguments may nest.

use crate::classdef::lexer::{Token, TokenKind};
use crate::error::{ConfigError, Location};

pub const LIST_PREFIX: &str = "LIST_";

/// Upper bound on a single repeat count.
pub const MAX_REPEAT: u32 = 65_535;

/// Upper bound on the entries one sequence may expand to.
pub const MAX_EXPANSION: usize = 65_535;

/// Deepest allowed `LIST_n(LIST_n(...))` nesting.
pub const MAX_NESTING: usize = 32;

/// Parse the repeat count out of a `LIST_n` macro name.
pub fn repeat_count(name: &str, location: Location) -> Result<usize, ConfigError> {
    let Some(digits) = name.strip_prefix(LIST_PREFIX) else {
        return Err(ConfigError::macro_syntax(name, "unknown macro", location));
    };
    if digits.is_empty() {
        return Err(ConfigError::macro_syntax(
            name,
            "missing repeat count",
            location,
        ));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::macro_syntax(
            name,
            "repeat count must be a positive integer literal",
            location,
        ));
    }
    let count: u32 = digits.parse().map_err(|_| {
        ConfigError::macro_syntax(name, "repeat count is too large", location)
    })?;
    if count == 0 {
        return Err(ConfigError::macro_syntax(
            name,
            "repeat count must be positive",
            location,
        ));
    }
    if count > MAX_REPEAT {
        return Err(ConfigError::macro_syntax(
            name,
            format!("repeat count exceeds {MAX_REPEAT}"),
            location,
        ));
    }
    Ok(count as usize)
}

/// Expand the tokens between a sequence's braces into literal entries.
///
/// `tokens` must not include the enclosing `{` / `}`. Commas separate entries
/// and a trailing comma is allowed.
pub fn expand_sequence(tokens: &[Token]) -> Result<Vec<String>, ConfigError> {
    let mut expander = Expander {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut out = Vec::new();

    while !expander.at_end() {
        expander.entry(&mut out)?;
        if expander.at_end() {
            break;
        }
        let sep = expander.next();
        match &sep.kind {
            TokenKind::Comma => {}
            TokenKind::RParen => {
                return Err(ConfigError::macro_syntax(
                    ")",
                    "unmatched `)`",
                    sep.location,
                ))
            }
            other => {
                return Err(ConfigError::syntax(
                    format!("expected `,` between entries, found {other}"),
                    sep.location,
                ))
            }
        }
    }
    Ok(out)
}

struct Expander<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Macro calls currently open.
    depth: usize,
}

impl<'a> Expander<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Caller must check [Self::at_end] first.
    fn next(&mut self) -> &'a Token {
        let token = &self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn entry(&mut self, out: &mut Vec<String>) -> Result<(), ConfigError> {
        let token = self.next();
        match &token.kind {
            TokenKind::Str(s) => {
                out.push(s.clone());
                Ok(())
            }
            TokenKind::Word(w) => {
                let is_call = matches!(self.peek(), Some(t) if t.kind == TokenKind::LParen);
                if is_call {
                    self.call(w, token.location, out)
                } else if w.starts_with(LIST_PREFIX) {
                    Err(ConfigError::macro_syntax(
                        w.as_str(),
                        "missing argument list",
                        token.location,
                    ))
                } else {
                    out.push(w.clone());
                    Ok(())
                }
            }
            TokenKind::RParen => Err(ConfigError::macro_syntax(
                ")",
                "unmatched `)`",
                token.location,
            )),
            TokenKind::LParen => Err(ConfigError::macro_syntax(
                "(",
                "argument list without a macro name",
                token.location,
            )),
            TokenKind::Comma => Err(ConfigError::syntax(
                "empty entry in sequence",
                token.location,
            )),
            TokenKind::LBrace | TokenKind::RBrace => Err(ConfigError::syntax(
                "nested sequences are not supported",
                token.location,
            )),
            other => Err(ConfigError::syntax(
                format!("unexpected {other} in sequence"),
                token.location,
            )),
        }
    }

    fn call(
        &mut self,
        name: &str,
        location: Location,
        out: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        let count = repeat_count(name, location)?;
        if self.depth >= MAX_NESTING {
            return Err(ConfigError::macro_syntax(
                name,
                format!("macro nesting too deep (more than {MAX_NESTING} levels)"),
                location,
            ));
        }
        // consume `(`
        self.next();

        if matches!(self.peek(), Some(t) if t.kind == TokenKind::RParen) {
            return Err(ConfigError::macro_syntax(name, "missing argument", location));
        }
        if self.at_end() {
            return Err(ConfigError::macro_syntax(
                name,
                "unclosed argument list",
                location,
            ));
        }

        let mut argument = Vec::new();
        self.depth += 1;
        self.entry(&mut argument)?;
        self.depth -= 1;

        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::RParen) => {
                self.next();
            }
            Some(TokenKind::Comma) => {
                return Err(ConfigError::macro_syntax(
                    name,
                    "expects exactly one argument",
                    location,
                ))
            }
            _ => {
                return Err(ConfigError::macro_syntax(
                    name,
                    "unclosed argument list",
                    location,
                ))
            }
        }

        let total = argument
            .len()
            .checked_mul(count)
            .and_then(|added| added.checked_add(out.len()))
            .filter(|&total| total <= MAX_EXPANSION);
        if total.is_none() {
            return Err(ConfigError::macro_syntax(
                name,
                format!("expansion exceeds {MAX_EXPANSION} entries"),
                location,
            ));
        }

        out.reserve(argument.len() * count);
        for _ in 0..count {
            out.extend(argument.iter().cloned());
        }
        Ok(())
    }
}

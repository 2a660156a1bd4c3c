//! Tokenizer for class definition text. Skips whitespace and comments and
//! tags every token with its 1-based line/column.

use std::fmt;

use log::trace;

use crate::error::{ConfigError, Location};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, number or any other bare run of word characters.
    Word(String),
    /// Double-quoted string with `""` escapes already collapsed.
    Str(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Comma,
    Equals,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(w) => write!(f, "`{w}`"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::LBrace => f.write_str("`{`"),
            Self::RBrace => f.write_str("`}`"),
            Self::LBracket => f.write_str("`[`"),
            Self::RBracket => f.write_str("`]`"),
            Self::LParen => f.write_str("`(`"),
            Self::RParen => f.write_str("`)`"),
            Self::Colon => f.write_str("`:`"),
            Self::Semicolon => f.write_str("`;`"),
            Self::Comma => f.write_str("`,`"),
            Self::Equals => f.write_str("`=`"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    /// Source spelling, used in macro error messages.
    pub fn text(&self) -> String {
        match &self.kind {
            TokenKind::Word(w) => w.clone(),
            TokenKind::Str(s) => format!("\"{s}\""),
            other => other.to_string().trim_matches('`').to_string(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '+')
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }
}

/// Split `text` into tokens. The returned vector always ends with
/// [TokenKind::Eof].
pub fn tokenize(text: &str) -> Result<Vec<Token>, ConfigError> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let start = cursor.location();
        if c.is_whitespace() {
            cursor.bump();
            continue;
        }
        if c == '/' && cursor.peek_second() == Some('/') {
            while let Some(c) = cursor.peek() {
                if c == '\n' {
                    break;
                }
                cursor.bump();
            }
            continue;
        }
        if c == '/' && cursor.peek_second() == Some('*') {
            cursor.bump();
            cursor.bump();
            let mut closed = false;
            while let Some(c) = cursor.bump() {
                if c == '*' && cursor.peek() == Some('/') {
                    cursor.bump();
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(ConfigError::syntax("unterminated block comment", start));
            }
            continue;
        }

        let kind = match c {
            '"' => {
                cursor.bump();
                TokenKind::Str(read_string(&mut cursor, start)?)
            }
            '{' => single(&mut cursor, TokenKind::LBrace),
            '}' => single(&mut cursor, TokenKind::RBrace),
            '[' => single(&mut cursor, TokenKind::LBracket),
            ']' => single(&mut cursor, TokenKind::RBracket),
            '(' => single(&mut cursor, TokenKind::LParen),
            ')' => single(&mut cursor, TokenKind::RParen),
            ':' => single(&mut cursor, TokenKind::Colon),
            ';' => single(&mut cursor, TokenKind::Semicolon),
            ',' => single(&mut cursor, TokenKind::Comma),
            '=' => single(&mut cursor, TokenKind::Equals),
            '#' => {
                return Err(ConfigError::syntax(
                    "preprocessor directive must be resolved before parsing",
                    start,
                ))
            }
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(c) = cursor.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    word.push(c);
                    cursor.bump();
                }
                TokenKind::Word(word)
            }
            other => {
                return Err(ConfigError::syntax(
                    format!("unexpected character '{other}'"),
                    start,
                ))
            }
        };
        trace!("token {kind} at {start}");
        tokens.push(Token {
            kind,
            location: start,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        location: cursor.location(),
    });
    Ok(tokens)
}

fn single(cursor: &mut Cursor<'_>, kind: TokenKind) -> TokenKind {
    cursor.bump();
    kind
}

fn read_string(cursor: &mut Cursor<'_>, start: Location) -> Result<String, ConfigError> {
    let mut value = String::new();
    loop {
        match cursor.bump() {
            Some('"') => {
                if cursor.peek() == Some('"') {
                    cursor.bump();
                    value.push('"');
                } else {
                    return Ok(value);
                }
            }
            Some(c) => value.push(c),
            None => return Err(ConfigError::syntax("unterminated string", start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_array_statement() {
        assert_eq!(
            kinds(r#"vest[] = {"a", LIST_2("b")};"#),
            vec![
                TokenKind::Word("vest".into()),
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Equals,
                TokenKind::LBrace,
                TokenKind::Str("a".into()),
                TokenKind::Comma,
                TokenKind::Word("LIST_2".into()),
                TokenKind::LParen,
                TokenKind::Str("b".into()),
                TokenKind::RParen,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let text = "// header\nclass /* inline */ a {};";
        assert_eq!(
            kinds(text),
            vec![
                TokenKind::Word("class".into()),
                TokenKind::Word("a".into()),
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn doubled_quotes_escape_inside_strings() {
        assert_eq!(
            kinds(r#"code = "hint ""hi"" // not a comment";"#)[2],
            TokenKind::Str(r#"hint "hi" // not a comment"#.into())
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("class a\n{\n  x = 1;\n};").expect("tokenize");
        let x = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Word("x".into()))
            .expect("x token");
        assert_eq!(x.location, Location::new(3, 3));
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = tokenize("name = \"oops;\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::syntax("unterminated string", Location::new(1, 8))
        );
    }

    #[test]
    fn unterminated_block_comment_is_rejected() {
        assert!(matches!(
            tokenize("/* never closed"),
            Err(ConfigError::Syntax { .. })
        ));
    }

    #[test]
    fn leftover_directive_is_rejected() {
        let err = tokenize("#include \"x.hpp\"").unwrap_err();
        assert_eq!(err.location(), Some(Location::new(1, 1)));
    }
}

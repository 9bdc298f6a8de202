#![forbid(unsafe_code)]

//! Lexical analysis of the message grammar.
//!
//! One token per [`Tokenizer::next_token`] call, driven by the scanner's
//! peek/commit cursor for lookahead. The grammar outside braces is literal
//! text until `{` (interpolation), `@` followed by `.` or `:` (link), or a
//! top-level `|` (plural-case separator). Whitespace around a `|` belongs to
//! the separator, decided by lookahead rather than post-hoc trimming.
//!
//! Malformed input never aborts the tokenizer: it is surfaced as
//! [`TokenKind::Broken`] tokens carrying a diagnostic, and the parser
//! decides whether to recover or fail.

use crate::location::{Position, Span};
use crate::scanner::Scanner;

/// A lexical token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token kinds of the message grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text.
    Text(String),
    /// `{` opening an interpolation.
    BraceOpen,
    /// `}` closing an interpolation.
    BraceClose,
    /// `.` introducing a link modifier.
    Dot,
    /// Plural-case separator `|` (with surrounding whitespace).
    Pipe,
    /// `{0}`-style positional interpolation key.
    ListIndex(usize),
    /// `{name}`-style named interpolation key (may be a dotted path).
    NamedKey(String),
    /// Keypath of an `@:key` / `@.modifier:key` link.
    LinkedKey(String),
    /// Modifier name of an `@.modifier:key` link.
    Modifier(String),
    /// Malformed token; the payload is a diagnostic message.
    Broken(String),
    /// End of input.
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Top-level text.
    Text,
    /// Inside `{ ... }`; `has_key` is set once the key has been read.
    Brace { has_key: bool },
    /// After `@` or after a modifier; expecting `.` or `:`.
    LinkSigil,
    /// After `@.`; expecting a modifier name.
    LinkModifier,
    /// After `@...:`; expecting a keypath or `{keypath}`.
    LinkKey,
}

/// Tokenizer over a message source string.
#[derive(Debug)]
pub struct Tokenizer {
    scanner: Scanner,
    state: LexState,
}

fn is_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Characters allowed in a `{name}` key: identifiers and dotted paths.
fn is_brace_key_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.')
}

/// Characters allowed in a raw linked keypath.
fn is_linked_key_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

fn is_modifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl Tokenizer {
    /// Create a tokenizer over `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            scanner: Scanner::new(source),
            state: LexState::Text,
        }
    }

    /// Produce the next token, advancing the scanner.
    pub fn next_token(&mut self) -> Token {
        match self.state {
            LexState::Text => self.lex_text(),
            LexState::Brace { has_key } => self.lex_brace(has_key),
            LexState::LinkSigil => self.lex_link_sigil(),
            LexState::LinkModifier => self.lex_link_modifier(),
            LexState::LinkKey => self.lex_link_key(),
        }
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token {
            kind,
            span: Span::new(start, self.scanner.position()),
        }
    }

    /// True when the character after the current `@` makes it a link.
    fn link_follows(&mut self) -> bool {
        self.scanner.reset_peek(0);
        let next = self.scanner.peek();
        self.scanner.reset_peek(0);
        matches!(next, Some(':') | Some('.'))
    }

    /// True when the current character starts a whitespace run that ends at
    /// a case separator.
    fn pipe_after_whitespace(&mut self) -> bool {
        match self.scanner.current_char() {
            Some(ch) if is_ws(ch) => {}
            _ => return false,
        }
        self.scanner.reset_peek(0);
        let mut ch = self.scanner.current_peek();
        while let Some(c) = ch {
            if !is_ws(c) {
                break;
            }
            ch = self.scanner.peek();
        }
        let found = ch == Some('|');
        self.scanner.reset_peek(0);
        found
    }

    fn skip_spaces(&mut self) {
        while matches!(self.scanner.current_char(), Some(c) if is_ws(c)) {
            self.scanner.next();
        }
    }

    fn lex_text(&mut self) -> Token {
        let start = self.scanner.position();
        match self.scanner.current_char() {
            None => return self.token(TokenKind::Eof, start),
            Some('{') => {
                self.scanner.next();
                self.state = LexState::Brace { has_key: false };
                return self.token(TokenKind::BraceOpen, start);
            }
            Some('|') => return self.lex_pipe(start),
            Some('@') if self.link_follows() => {
                self.scanner.next();
                self.state = LexState::LinkSigil;
                return self.lex_link_sigil();
            }
            Some(ch) if is_ws(ch) && self.pipe_after_whitespace() => {
                return self.lex_pipe(start);
            }
            _ => {}
        }

        let mut text = String::new();
        loop {
            match self.scanner.current_char() {
                None | Some('{') | Some('|') => break,
                Some('@') if self.link_follows() => break,
                Some(ch) if is_ws(ch) => {
                    if self.pipe_after_whitespace() {
                        break;
                    }
                    text.push(ch);
                    self.scanner.next();
                }
                Some(ch) => {
                    text.push(ch);
                    self.scanner.next();
                }
            }
        }
        self.token(TokenKind::Text(text), start)
    }

    /// Consume `[ws] '|' [ws]` as one separator token.
    fn lex_pipe(&mut self, start: Position) -> Token {
        self.skip_spaces();
        if self.scanner.current_char() == Some('|') {
            self.scanner.next();
        }
        self.skip_spaces();
        self.token(TokenKind::Pipe, start)
    }

    fn lex_brace(&mut self, has_key: bool) -> Token {
        // Spaces inside braces are insignificant.
        while matches!(self.scanner.current_char(), Some(' ') | Some('\t')) {
            self.scanner.next();
        }
        let start = self.scanner.position();
        match self.scanner.current_char() {
            None => {
                self.state = LexState::Text;
                self.token(
                    TokenKind::Broken("unterminated interpolation".into()),
                    start,
                )
            }
            Some('}') => {
                self.scanner.next();
                self.state = LexState::Text;
                self.token(TokenKind::BraceClose, start)
            }
            Some(ch) if !has_key && is_brace_key_char(ch) => {
                let word = self.read_while(is_brace_key_char);
                self.state = LexState::Brace { has_key: true };
                if word.chars().all(|c| c.is_ascii_digit()) {
                    match word.parse::<usize>() {
                        Ok(index) => self.token(TokenKind::ListIndex(index), start),
                        Err(_) => {
                            self.recover_brace();
                            self.state = LexState::Text;
                            self.token(
                                TokenKind::Broken(format!("list index '{word}' out of range")),
                                start,
                            )
                        }
                    }
                } else if word.starts_with(|c: char| c.is_alphabetic() || c == '_') {
                    self.token(TokenKind::NamedKey(word), start)
                } else {
                    self.recover_brace();
                    self.state = LexState::Text;
                    self.token(
                        TokenKind::Broken(format!("invalid interpolation key '{word}'")),
                        start,
                    )
                }
            }
            Some(ch) => {
                let message = if has_key {
                    format!("expected '}}' in interpolation, found '{ch}'")
                } else {
                    format!("invalid character '{ch}' in interpolation")
                };
                self.recover_brace();
                self.state = LexState::Text;
                self.token(TokenKind::Broken(message), start)
            }
        }
    }

    /// Skip past a malformed interpolation: consume up to and including the
    /// next `}`, stopping early at a case separator or end of input.
    fn recover_brace(&mut self) {
        loop {
            match self.scanner.current_char() {
                None | Some('|') => break,
                Some('}') => {
                    self.scanner.next();
                    break;
                }
                Some(_) => {
                    self.scanner.next();
                }
            }
        }
    }

    fn lex_link_sigil(&mut self) -> Token {
        let start = self.scanner.position();
        match self.scanner.current_char() {
            Some('.') => {
                self.scanner.next();
                self.state = LexState::LinkModifier;
                self.token(TokenKind::Dot, start)
            }
            Some(':') => {
                self.scanner.next();
                self.state = LexState::LinkKey;
                self.lex_link_key()
            }
            _ => {
                self.state = LexState::Text;
                self.token(TokenKind::Broken("expected ':' in linked message".into()), start)
            }
        }
    }

    fn lex_link_modifier(&mut self) -> Token {
        let start = self.scanner.position();
        let name = self.read_while(is_modifier_char);
        if name.is_empty() {
            self.state = LexState::Text;
            return self.token(
                TokenKind::Broken("missing modifier name in linked message".into()),
                start,
            );
        }
        self.state = LexState::LinkSigil;
        self.token(TokenKind::Modifier(name), start)
    }

    fn lex_link_key(&mut self) -> Token {
        let start = self.scanner.position();
        self.state = LexState::Text;
        match self.scanner.current_char() {
            // Brace-wrapped keypath: `@:{message.hello}`.
            Some('{') => {
                self.scanner.next();
                while matches!(self.scanner.current_char(), Some(' ') | Some('\t')) {
                    self.scanner.next();
                }
                let key = self.read_while(is_brace_key_char);
                while matches!(self.scanner.current_char(), Some(' ') | Some('\t')) {
                    self.scanner.next();
                }
                if key.is_empty() {
                    self.recover_brace();
                    return self.token(
                        TokenKind::Broken("missing key in linked message".into()),
                        start,
                    );
                }
                if self.scanner.current_char() == Some('}') {
                    self.scanner.next();
                    self.token(TokenKind::LinkedKey(key), start)
                } else {
                    self.recover_brace();
                    self.token(
                        TokenKind::Broken("unterminated linked message key".into()),
                        start,
                    )
                }
            }
            _ => {
                let key = self.read_while(is_linked_key_char);
                if key.is_empty() {
                    return self.token(
                        TokenKind::Broken("missing key in linked message".into()),
                        start,
                    );
                }
                self.token(TokenKind::LinkedKey(key), start)
            }
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.scanner.current_char() {
            if !accept(ch) {
                break;
            }
            out.push(ch);
            self.scanner.next();
        }
        out
    }
}

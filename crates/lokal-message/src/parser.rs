#![forbid(unsafe_code)]

//! Parser from token stream to message [`Resource`].
//!
//! Reads tokens until a case separator or end of input, accumulating nodes
//! into the current case; a separator closes the case (possibly empty; an
//! empty case formats to the empty string) and opens the next. Adjacent
//! literal-text tokens are merged into a single text node; how many text
//! tokens the tokenizer emitted carries no meaning.

use crate::ast::{Case, Node, Resource};
use crate::location::Span;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// Why parsing a message failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `{}` or `{   }`: an interpolation with no key.
    EmptyPlaceholder,
    /// Input ended inside an interpolation.
    UnterminatedInterpolation,
    /// `@.modifier` without a keypath, or a garbled link.
    InvalidLinkedFormat,
    /// The tokenizer flagged a malformed token; payload is its diagnostic.
    BrokenToken(String),
    /// A structurally valid token in a position the grammar forbids.
    UnexpectedToken(String),
}

/// A fatal message-syntax error with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::EmptyPlaceholder => {
                write!(f, "empty interpolation placeholder at {}", self.span)
            }
            ParseErrorKind::UnterminatedInterpolation => {
                write!(f, "unterminated interpolation at {}", self.span)
            }
            ParseErrorKind::InvalidLinkedFormat => {
                write!(f, "invalid linked message format at {}", self.span)
            }
            ParseErrorKind::BrokenToken(message) => write!(f, "{message} at {}", self.span),
            ParseErrorKind::UnexpectedToken(found) => {
                write!(f, "unexpected {found} at {}", self.span)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a message source string into a [`Resource`].
///
/// Never panics; structurally invalid source yields `Err`. The resulting
/// resource always has at least one case.
pub fn parse(source: &str) -> Result<Resource, ParseError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut cases = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();

    loop {
        let token = tokenizer.next_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Pipe => {
                cases.push(Case {
                    nodes: std::mem::take(&mut nodes),
                });
            }
            TokenKind::Text(text) => push_text(&mut nodes, text),
            TokenKind::BraceOpen => {
                let node = parse_interpolation(&mut tokenizer, token.span)?;
                nodes.push(node);
            }
            TokenKind::LinkedKey(key) => {
                nodes.push(Node::Linked {
                    key,
                    modifier: None,
                });
            }
            TokenKind::Dot => {
                let node = parse_modified_link(&mut tokenizer)?;
                nodes.push(node);
            }
            TokenKind::Broken(message) => {
                return Err(ParseError::new(
                    ParseErrorKind::BrokenToken(message),
                    token.span,
                ));
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken(describe(&other)),
                    token.span,
                ));
            }
        }
    }

    cases.push(Case { nodes });
    Ok(Resource { cases })
}

/// Merge adjacent literal text into one node.
fn push_text(nodes: &mut Vec<Node>, text: String) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(&text);
    } else {
        nodes.push(Node::Text(text));
    }
}

/// After `BraceOpen`: expect a key token and a closing brace.
fn parse_interpolation(tokenizer: &mut Tokenizer, open_span: Span) -> Result<Node, ParseError> {
    let key = tokenizer.next_token();
    let node = match key.kind {
        TokenKind::ListIndex(index) => Node::List(index),
        TokenKind::NamedKey(name) => Node::Named(name),
        TokenKind::BraceClose => {
            return Err(ParseError::new(ParseErrorKind::EmptyPlaceholder, open_span));
        }
        TokenKind::Eof => {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedInterpolation,
                open_span,
            ));
        }
        TokenKind::Broken(message) => {
            return Err(ParseError::new(
                ParseErrorKind::BrokenToken(message),
                key.span,
            ));
        }
        other => {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken(describe(&other)),
                key.span,
            ));
        }
    };

    let close = tokenizer.next_token();
    match close.kind {
        TokenKind::BraceClose => Ok(node),
        TokenKind::Eof => Err(ParseError::new(
            ParseErrorKind::UnterminatedInterpolation,
            open_span,
        )),
        TokenKind::Broken(message) => Err(ParseError::new(
            ParseErrorKind::BrokenToken(message),
            close.span,
        )),
        other => Err(ParseError::new(
            ParseErrorKind::UnexpectedToken(describe(&other)),
            close.span,
        )),
    }
}

/// After `Dot`: expect `Modifier` then `LinkedKey`.
fn parse_modified_link(tokenizer: &mut Tokenizer) -> Result<Node, ParseError> {
    let modifier = tokenizer.next_token();
    let TokenKind::Modifier(name) = modifier.kind else {
        return Err(link_error(modifier));
    };
    let key = tokenizer.next_token();
    let TokenKind::LinkedKey(path) = key.kind else {
        return Err(link_error(key));
    };
    Ok(Node::Linked {
        key: path,
        modifier: Some(name),
    })
}

fn link_error(token: Token) -> ParseError {
    match token.kind {
        TokenKind::Broken(message) => {
            ParseError::new(ParseErrorKind::BrokenToken(message), token.span)
        }
        _ => ParseError::new(ParseErrorKind::InvalidLinkedFormat, token.span),
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Text(_) => "text".into(),
        TokenKind::BraceOpen => "'{'".into(),
        TokenKind::BraceClose => "'}'".into(),
        TokenKind::Dot => "'.'".into(),
        TokenKind::Pipe => "'|'".into(),
        TokenKind::ListIndex(index) => format!("list index {index}"),
        TokenKind::NamedKey(name) => format!("named key '{name}'"),
        TokenKind::LinkedKey(key) => format!("linked key '{key}'"),
        TokenKind::Modifier(name) => format!("modifier '{name}'"),
        TokenKind::Broken(message) => message.clone(),
        TokenKind::Eof => "end of input".into(),
    }
}

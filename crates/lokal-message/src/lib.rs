#![forbid(unsafe_code)]

//! Message-format engine for Lokal.
//!
//! Turns localization message source strings (positional/named
//! interpolation, pipe-separated plural cases, and `@:key` links with
//! formatting modifiers) into compiled, cacheable formatting routines.
//!
//! # Pipeline
//!
//! ```text
//! source &str
//!     │
//!     ▼
//! ┌─────────┐    ┌───────────┐    ┌────────┐    ┌──────────────────┐
//! │ Scanner  │──▶│ Tokenizer  │──▶│ Parser │──▶│ CompiledMessage   │
//! │ (cursor) │    │ (tokens)   │    │ (AST)  │    │ (+ MessageCache)  │
//! └─────────┘    └───────────┘    └────────┘    └──────────────────┘
//! ```
//!
//! The crate has no notion of locales beyond cache keys; locale fallback,
//! plural-rule selection, and missing-key handling live in `lokal-runtime`.

pub mod ast;
pub mod compiler;
pub mod context;
pub mod location;
pub mod parser;
pub mod scanner;
pub mod tokenizer;

pub use ast::{Case, Node, Resource};
pub use compiler::{CompiledMessage, MessageCache};
pub use context::{
    InterpolationContext, MessageOutput, MessagePart, ModifierFn, ModifierMap, OutputMode,
    PartKind, Value,
};
pub use location::{Position, Span};
pub use parser::{parse, ParseError, ParseErrorKind};
pub use scanner::Scanner;
pub use tokenizer::{Token, TokenKind, Tokenizer};

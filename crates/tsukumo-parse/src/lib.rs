//! Anime filename parser.
//!
//! A filename is split into tokens, then a fixed sequence of heuristic
//! passes claims tokens and records typed elements (title, episode number,
//! release group, ...).

pub mod elements;
pub mod keyword;
pub mod options;
pub mod parser;
mod text;
pub mod token;
pub mod tokenizer;

pub use elements::{Element, ElementKind, Elements};
pub use keyword::{Keyword, KeywordDictionary, KeywordOptions};
pub use options::Options;
pub use parser::{parse, parse_bytes, parse_with, ParseResult, Parser};
pub use token::{Token, TokenKind};

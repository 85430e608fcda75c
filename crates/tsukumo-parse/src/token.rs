use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::elements::ElementKind;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    /// A single delimiter character (space, underscore, dot, ...).
    Delimiter,
    /// Free text not yet claimed by any pass.
    Unknown,
    /// Text claimed by an element.
    Identifier,
    /// Tombstone left behind by tokenizer repair; never reaches the parser.
    Invalid,
}

/// A single token from a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Whether this token was inside a bracket pair.
    /// Always true for bracket tokens.
    pub enclosed: bool,
    /// Dictionary kind this token's text matched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<ElementKind>,
    /// Element kind that claimed this token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementKind>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, enclosed: bool) -> Self {
        Self {
            kind,
            text: text.into(),
            enclosed,
            keyword: None,
            element: None,
        }
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self.kind, TokenKind::OpenBracket | TokenKind::CloseBracket)
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == TokenKind::Unknown
    }

    pub fn is_delimiter(&self) -> bool {
        self.kind == TokenKind::Delimiter
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Mark the token as consumed by an element of `kind`.
    ///
    /// A claimed token keeps its first owner.
    pub fn claim(&mut self, kind: ElementKind) {
        if self.is_bracket() {
            return;
        }
        self.kind = TokenKind::Identifier;
        self.element.get_or_insert(kind);
    }

    /// Check the token against a combination of [`TokenFlags`].
    ///
    /// The enclosure flags must hold; among the category flags, any one
    /// holding is enough.
    pub fn matches(&self, flags: TokenFlags) -> bool {
        if flags.intersects(TokenFlags::ENCLOSURE) {
            let wanted = flags.contains(TokenFlags::ENCLOSED);
            if wanted != self.enclosed {
                return false;
            }
        }
        if flags.intersects(TokenFlags::CATEGORIES) {
            let checks = [
                (TokenFlags::BRACKET, TokenFlags::NOT_BRACKET, self.is_bracket()),
                (TokenFlags::DELIMITER, TokenFlags::NOT_DELIMITER, self.is_delimiter()),
                (
                    TokenFlags::IDENTIFIER,
                    TokenFlags::NOT_IDENTIFIER,
                    self.kind == TokenKind::Identifier,
                ),
                (TokenFlags::UNKNOWN, TokenFlags::NOT_UNKNOWN, self.is_unknown()),
                (
                    TokenFlags::NOT_VALID,
                    TokenFlags::VALID,
                    self.kind == TokenKind::Invalid,
                ),
            ];
            let any = checks.iter().any(|&(is, is_not, value)| {
                (flags.contains(is) && value) || (flags.contains(is_not) && !value)
            });
            if !any {
                return false;
            }
        }
        true
    }
}

bitflags! {
    /// Search criteria for [`find_token`] and friends.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        const BRACKET = 1 << 0;
        const NOT_BRACKET = 1 << 1;
        const DELIMITER = 1 << 2;
        const NOT_DELIMITER = 1 << 3;
        const IDENTIFIER = 1 << 4;
        const NOT_IDENTIFIER = 1 << 5;
        const UNKNOWN = 1 << 6;
        const NOT_UNKNOWN = 1 << 7;
        const VALID = 1 << 8;
        const NOT_VALID = 1 << 9;
        const ENCLOSED = 1 << 10;
        const NOT_ENCLOSED = 1 << 11;

        const CATEGORIES = Self::BRACKET.bits()
            | Self::NOT_BRACKET.bits()
            | Self::DELIMITER.bits()
            | Self::NOT_DELIMITER.bits()
            | Self::IDENTIFIER.bits()
            | Self::NOT_IDENTIFIER.bits()
            | Self::UNKNOWN.bits()
            | Self::NOT_UNKNOWN.bits()
            | Self::VALID.bits()
            | Self::NOT_VALID.bits();
        const ENCLOSURE = Self::ENCLOSED.bits() | Self::NOT_ENCLOSED.bits();
    }
}

/// First token at or after `from` matching `flags`.
pub fn find_token(tokens: &[Token], from: usize, flags: TokenFlags) -> Option<usize> {
    (from..tokens.len()).find(|&i| tokens[i].matches(flags))
}

/// Nearest token before `index` matching `flags`. `index` may equal `tokens.len()`.
pub fn find_prev_token(tokens: &[Token], index: usize, flags: TokenFlags) -> Option<usize> {
    (0..index.min(tokens.len()))
        .rev()
        .find(|&i| tokens[i].matches(flags))
}

/// Nearest token after `index` matching `flags`.
pub fn find_next_token(tokens: &[Token], index: usize, flags: TokenFlags) -> Option<usize> {
    find_token(tokens, index + 1, flags)
}

/// A token whose nearest non-delimiter neighbours on both sides are brackets.
pub fn is_token_isolated(tokens: &[Token], index: usize) -> bool {
    let bracket_at = |i: Option<usize>| i.is_some_and(|i| tokens[i].is_bracket());
    bracket_at(find_prev_token(tokens, index, TokenFlags::NOT_DELIMITER))
        && bracket_at(find_next_token(tokens, index, TokenFlags::NOT_DELIMITER))
}

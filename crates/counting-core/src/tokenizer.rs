//! Splits text into alternating runs of numeric and literal characters.

use crate::numeral::{fraction, script};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Numeric,
    Literal,
}

/// A maximal run of characters sharing one classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Any classified numeral glyph, plus vulgar fractions.
pub fn is_numeric_char(c: char) -> bool {
    script::classify(c).is_some() || fraction::is_fraction(c)
}

fn kind_of(c: char) -> TokenKind {
    if is_numeric_char(c) {
        TokenKind::Numeric
    } else {
        TokenKind::Literal
    }
}

/// Lazy token iterator over borrowed text. Cloning restarts from the same
/// position.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
}

pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let mut chars = self.rest.char_indices();
        let (_, first) = chars.next()?;
        let kind = kind_of(first);

        let end = chars
            .find(|&(_, c)| kind_of(c) != kind)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Token { kind, text })
    }
}

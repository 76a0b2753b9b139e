//! Text normalization pipeline: raw message text to an ASCII-oriented string
//! the evaluator can read.

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::numeral::{
    fraction, is_plain_decimal, normalize_token, script, MalformedNumeral,
};
use crate::tokenizer::{tokenize, TokenKind};

/// Compatibility decomposition (NFKD) that leaves vulgar fractions and Roman
/// numeral glyphs intact, since their decompositions (`1⁄2`, `XII`) no longer
/// read as numerals.
pub fn decompose(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_start = 0;

    for (i, c) in text.char_indices() {
        if keeps_glyph(c) {
            out.extend(text[run_start..i].nfkd());
            out.push(c);
            run_start = i + c.len_utf8();
        }
    }
    out.extend(text[run_start..].nfkd());
    out
}

fn keeps_glyph(c: char) -> bool {
    fraction::is_fraction(c) || script::is_roman(c)
}

/// Normalize every numeral in `raw` to ASCII decimal, leaving everything else
/// in place. Fails on the first malformed numeral.
pub fn normalize(raw: &str) -> Result<String, MalformedNumeral> {
    let text = decompose(raw);
    if is_plain_decimal(&text) {
        return Ok(text);
    }

    let mut out = String::with_capacity(text.len());
    for token in tokenize(&text) {
        match token.kind {
            TokenKind::Literal => out.push_str(token.text),
            TokenKind::Numeric => {
                let value = normalize_token(&token).map_err(|e| {
                    debug!(token = token.text, reason = %e.reason, "numeral rejected");
                    e
                })?;
                out.push_str(&value);
            }
        }
    }
    Ok(out)
}

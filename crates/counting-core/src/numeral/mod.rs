//! Numeral normalization: one numeric token in, one ASCII decimal string out.
//!
//! Strategies run in a fixed order and stop at the first success:
//! 1. plain ASCII decimal (returned unchanged)
//! 2. mixed-script guard (fails fast)
//! 3. vulgar fraction, optionally preceded by a whole part
//! 4. the converter for the token's script: positional digits, Roman
//!    numerals or CJK numerals

pub mod fraction;
pub mod script;

use std::fmt;

use tracing::trace;

use crate::tokenizer::{Token, TokenKind};

use self::script::{cjk_glyph, positional_digit, CjkGlyph, NumeralKind, NumeralScript};

/// Why a numeric token could not be converted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// Digits drawn from two different non-Latin scripts.
    MixedScripts {
        first: NumeralScript,
        second: NumeralScript,
    },
    /// The token is not a numeric token at all.
    NotNumeric,
    /// No converter accepted the token.
    Unconvertible,
    /// The value does not fit in 64 bits.
    Overflow,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MixedScripts { first, second } => {
                write!(f, "mixes {first:?} and {second:?} digits")
            }
            MalformedReason::NotNumeric => f.write_str("not a numeric token"),
            MalformedReason::Unconvertible => f.write_str("no numeral system matches"),
            MalformedReason::Overflow => f.write_str("value out of range"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed numeral {token:?}: {reason}")]
pub struct MalformedNumeral {
    pub token: String,
    pub reason: MalformedReason,
}

impl MalformedNumeral {
    fn new(token: &str, reason: MalformedReason) -> Self {
        Self {
            token: token.to_string(),
            reason,
        }
    }
}

/// `[+-]? digits? ('.' digits?)?` over ASCII, with at least one digit.
///
/// Accepts `42`, `-7`, `0.5`, `.5` and `42.`; rejects exponents, `inf`, `nan`
/// and any whitespace.
pub fn is_plain_decimal(s: &str) -> bool {
    let body = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    digits(int) && digits(frac) && (int.len() + frac.len()) > 0
}

/// Normalize a `Numeric` token into a decimal string.
pub fn normalize_token(token: &Token<'_>) -> Result<String, MalformedNumeral> {
    match token.kind {
        TokenKind::Numeric => normalize_numeral(token.text),
        TokenKind::Literal => Err(MalformedNumeral::new(
            token.text,
            MalformedReason::NotNumeric,
        )),
    }
}

/// Normalize the text of a numeric token.
///
/// Success implies the returned string satisfies [`is_plain_decimal`].
pub fn normalize_numeral(text: &str) -> Result<String, MalformedNumeral> {
    if is_plain_decimal(text) {
        return Ok(text.to_string());
    }

    check_mixed_scripts(text).map_err(|r| MalformedNumeral::new(text, r))?;

    if let Some(out) = convert_fraction(text).map_err(|r| MalformedNumeral::new(text, r))? {
        trace!(token = text, value = %out, "fraction");
        return Ok(out);
    }

    let out = convert_scripts(text).map_err(|r| MalformedNumeral::new(text, r))?;
    trace!(token = text, value = %out, "script numeral");
    Ok(out)
}

/// Reject a token whose digits come from more than one non-Latin script.
pub fn check_mixed_scripts(text: &str) -> Result<(), MalformedReason> {
    let mut seen: Option<NumeralScript> = None;
    for script in text.chars().filter_map(script::classify) {
        if script.is_latin_like() {
            continue;
        }
        match seen {
            None => seen = Some(script),
            Some(first) if first != script => {
                return Err(MalformedReason::MixedScripts {
                    first,
                    second: script,
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// `Ok(None)` when the token holds no fraction glyph.
fn convert_fraction(text: &str) -> Result<Option<String>, MalformedReason> {
    let Some(last) = text.chars().last() else {
        return Ok(None);
    };
    let Some(decimal) = fraction::decimal(last) else {
        if text.chars().any(fraction::is_fraction) {
            return Err(MalformedReason::Unconvertible);
        }
        return Ok(None);
    };

    let whole = &text[..text.len() - last.len_utf8()];
    if whole.chars().any(fraction::is_fraction) {
        return Err(MalformedReason::Unconvertible);
    }
    if whole.is_empty() {
        return Ok(Some(decimal.to_string()));
    }
    let whole = if is_plain_decimal(whole) && !whole.contains(&['.', '+', '-'][..]) {
        whole.to_string()
    } else {
        convert_scripts(whole)?
    };
    Ok(Some(fraction::join_whole(&whole, decimal)))
}

/// Dispatch on the token's one non-Latin script (Latin digits ride along).
fn convert_scripts(text: &str) -> Result<String, MalformedReason> {
    let kind = text
        .chars()
        .filter_map(script::classify)
        .find(|s| !s.is_latin_like())
        .map_or(NumeralKind::Positional, NumeralScript::kind);

    let out = match kind {
        NumeralKind::Positional => convert_positional(text),
        NumeralKind::Roman => convert_roman(text),
        NumeralKind::Cjk => convert_cjk(text),
    };
    if let Err(reason) = &out {
        trace!(token = text, ?kind, %reason, "numeral not converted");
    }
    out
}

/// Digits from any positional block, mapped one-for-one to ASCII.
fn convert_positional(text: &str) -> Result<String, MalformedReason> {
    if text.is_empty() {
        return Err(MalformedReason::Unconvertible);
    }
    text.chars()
        .map(|c| {
            positional_digit(c)
                .and_then(|(_, d)| char::from_digit(d, 10))
                .ok_or(MalformedReason::Unconvertible)
        })
        .collect()
}

/// Canonical Roman spelling, largest value first. `P Q R S` extend `M`.
const ROMAN_PLACES: &[(u64, &str)] = &[
    (100_000, "S"),
    (90_000, "QS"),
    (50_000, "R"),
    (40_000, "QR"),
    (10_000, "Q"),
    (9_000, "MQ"),
    (5_000, "P"),
    (4_000, "MP"),
    (1_000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Largest value with a canonical spelling (`SSS` + 99 999).
const ROMAN_MAX: u64 = 399_999;

fn roman_letter_value(letter: char) -> i64 {
    match letter {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1_000,
        'P' => 5_000,
        'Q' => 10_000,
        'R' => 50_000,
        'S' => 100_000,
        _ => 0,
    }
}

fn canonical_roman(mut n: u64) -> String {
    let mut out = String::new();
    for &(value, letters) in ROMAN_PLACES {
        while n >= value {
            out.push_str(letters);
            n -= value;
        }
    }
    out
}

/// Only the canonical spelling of a value is accepted: `ⅩⅣ` and `ⅩⅠⅤ`, but
/// not `ⅤⅩ`, `ⅠⅠⅠⅠ` or `ⅫⅠ`.
fn convert_roman(text: &str) -> Result<String, MalformedReason> {
    let glyph_count = text.chars().count();
    let mut letters = String::new();
    for (i, c) in text.chars().enumerate() {
        let expanded = script::roman_letters(c).ok_or(MalformedReason::Unconvertible)?;
        // Ⅻ, ↅ and friends only stand alone or close the numeral.
        if expanded.len() > 1 && i + 1 != glyph_count {
            return Err(MalformedReason::Unconvertible);
        }
        letters.push_str(expanded);
    }
    if letters.is_empty() {
        return Err(MalformedReason::Unconvertible);
    }

    let values: Vec<i64> = letters.chars().map(roman_letter_value).collect();
    let mut total: i64 = 0;
    for (i, &v) in values.iter().enumerate() {
        let next = values.get(i + 1).copied().unwrap_or(0);
        total = if v < next {
            total.saturating_sub(v)
        } else {
            total.saturating_add(v)
        };
    }
    let total = u64::try_from(total).map_err(|_| MalformedReason::Unconvertible)?;
    if total == 0 || total > ROMAN_MAX || canonical_roman(total) != letters {
        return Err(MalformedReason::Unconvertible);
    }
    Ok(total.to_string())
}

/// CJK numerals with unit (十 百 千) and section (万 億 兆) magnitudes.
///
/// Units strictly decrease within a section and take a single-digit
/// multiplier; sections strictly decrease. A digit run with no magnitude
/// (`1万2345`, `30万`) is allowed where no unit was used in that section.
/// 〇/零 after a magnitude is a placeholder (`一千零一`).
fn convert_cjk(text: &str) -> Result<String, MalformedReason> {
    let glyphs = text
        .chars()
        .map(|c| {
            if let Some((script, d)) = positional_digit(c) {
                if script.is_latin_like() {
                    return Ok(CjkGlyph::Digit(u64::from(d)));
                }
            }
            cjk_glyph(c).ok_or(MalformedReason::Unconvertible)
        })
        .collect::<Result<Vec<_>, _>>()?;
    if glyphs.is_empty() {
        return Err(MalformedReason::Unconvertible);
    }

    // Without magnitude characters CJK digits read positionally: 二〇二四.
    if glyphs.iter().all(|g| matches!(g, CjkGlyph::Digit(_))) {
        return Ok(glyphs
            .iter()
            .map(|g| match g {
                CjkGlyph::Digit(d) => char::from_digit(*d as u32, 10).unwrap_or('0'),
                _ => '0',
            })
            .collect());
    }

    let overflow = || MalformedReason::Overflow;
    let malformed = || MalformedReason::Unconvertible;

    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut last_unit: Option<u64> = None;
    let mut last_section: Option<u64> = None;
    // Digits since the last magnitude: (value, digit count).
    let mut run: Option<(u64, usize)> = None;
    let mut after_placeholder = false;

    for g in glyphs {
        match g {
            CjkGlyph::Digit(0)
                if run.is_none() && (last_unit.is_some() || last_section.is_some()) =>
            {
                after_placeholder = true;
            }
            CjkGlyph::Digit(d) => {
                let (v, n) = run.unwrap_or((0, 0));
                let v = v
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(d))
                    .ok_or_else(overflow)?;
                run = Some((v, n + 1));
                after_placeholder = false;
            }
            CjkGlyph::Unit(u) => {
                if after_placeholder || matches!(last_unit, Some(prev) if u >= prev) {
                    return Err(malformed());
                }
                let multiplier = match run {
                    None => 1,
                    Some((v, 1)) => v,
                    Some(_) => return Err(malformed()),
                };
                let term = multiplier.checked_mul(u).ok_or_else(overflow)?;
                section = section.checked_add(term).ok_or_else(overflow)?;
                last_unit = Some(u);
                run = None;
            }
            CjkGlyph::Section(s) => {
                if after_placeholder || matches!(last_section, Some(prev) if s >= prev) {
                    return Err(malformed());
                }
                let digits = match run {
                    Some((_, n)) if n > 1 && last_unit.is_some() => return Err(malformed()),
                    Some((v, _)) => v,
                    None => 0,
                };
                let mut part = section.checked_add(digits).ok_or_else(overflow)?;
                if part == 0 && run.is_none() {
                    part = 1;
                }
                if matches!(last_section, Some(prev) if part >= prev / s) {
                    return Err(malformed());
                }
                let term = part.checked_mul(s).ok_or_else(overflow)?;
                total = total.checked_add(term).ok_or_else(overflow)?;
                section = 0;
                last_unit = None;
                last_section = Some(s);
                run = None;
            }
        }
    }

    let tail = match run {
        Some((_, n)) if n > 1 && last_unit.is_some() => return Err(malformed()),
        Some((v, _)) => v,
        None => 0,
    };
    let rest = section.checked_add(tail).ok_or_else(overflow)?;
    // Below the smallest section (万).
    if last_section.is_some() && rest >= 10_000 {
        return Err(malformed());
    }
    total
        .checked_add(rest)
        .map(|n| n.to_string())
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Result<String, MalformedReason> {
        normalize_numeral(s).map_err(|e| e.reason)
    }

    #[test]
    fn plain_decimal_grammar() {
        for ok in ["0", "42", "-7", "+3", "0.5", ".5", "42.", "007"] {
            assert!(is_plain_decimal(ok), "{ok}");
        }
        for bad in ["", ".", "-", "1e5", "inf", "NaN", " 1", "1 ", "1.2.3", "--1", "١"] {
            assert!(!is_plain_decimal(bad), "{bad}");
        }
    }

    #[test]
    fn ascii_passes_through_unchanged() {
        assert_eq!(norm("123").unwrap(), "123");
        assert_eq!(norm("007").unwrap(), "007");
    }

    #[test]
    fn positional_scripts() {
        assert_eq!(norm("١٢٣").unwrap(), "123");
        assert_eq!(norm("۴۲").unwrap(), "42");
        assert_eq!(norm("४२").unwrap(), "42");
        assert_eq!(norm("๙๙").unwrap(), "99");
        assert_eq!(norm("１２").unwrap(), "12");
        assert_eq!(norm("𝟏𝟐").unwrap(), "12");
    }

    #[test]
    fn latin_may_mix_with_one_other_script() {
        assert_eq!(norm("1٢3").unwrap(), "123");
    }

    #[test]
    fn mixed_non_latin_scripts_are_rejected() {
        let err = norm("४٢").unwrap_err();
        assert_eq!(
            err,
            MalformedReason::MixedScripts {
                first: NumeralScript::Devanagari,
                second: NumeralScript::ArabicIndic,
            }
        );
        assert!(matches!(
            norm("١ⅡⅢ").unwrap_err(),
            MalformedReason::MixedScripts { .. }
        ));
    }

    #[test]
    fn fractions() {
        assert_eq!(norm("½").unwrap(), "0.5");
        assert_eq!(norm("⅔").unwrap(), "0.666");
        assert_eq!(norm("1½").unwrap(), "1.5");
        assert_eq!(norm("٣¾").unwrap(), "3.75");
        assert_eq!(norm("½½").unwrap_err(), MalformedReason::Unconvertible);
        assert_eq!(norm("½1").unwrap_err(), MalformedReason::Unconvertible);
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(norm("Ⅻ").unwrap(), "12");
        assert_eq!(norm("ⅯⅭⅯⅩⅭⅣ").unwrap(), "1994");
        assert_eq!(norm("ⅹⅼ").unwrap(), "40");
        assert_eq!(norm("ⅩⅪ").unwrap(), "21");
        assert_eq!(norm("ⅩⅠⅤ").unwrap(), "14");
        assert_eq!(norm("ⅩⅠⅩ").unwrap(), "19");
        assert_eq!(norm("ↂↁⅯ").unwrap(), "16000");
    }

    #[test]
    fn non_canonical_roman_is_rejected() {
        for s in [
            "ⅠⅯ", "ⅤⅩ", "ⅠⅠⅤ", "ⅤⅤ", "ⅩⅩⅩⅩⅩ", "ⅠⅠⅠⅠ", "ⅬⅭ", "ⅮⅯ", "ⅠⅩⅩ", "ⅫⅠ",
            "ⅣⅤ", "ↅⅠ",
        ] {
            assert_eq!(norm(s).unwrap_err(), MalformedReason::Unconvertible, "{s}");
        }
    }

    #[test]
    fn cjk_numerals() {
        assert_eq!(norm("十").unwrap(), "10");
        assert_eq!(norm("二十三").unwrap(), "23");
        assert_eq!(norm("一千零一").unwrap(), "1001");
        assert_eq!(norm("一億二千万").unwrap(), "120000000");
        assert_eq!(norm("二〇二四").unwrap(), "2024");
        assert_eq!(norm("3万").unwrap(), "30000");
        assert_eq!(norm("万").unwrap(), "10000");
    }

    #[test]
    fn cjk_magnitudes_with_digit_runs() {
        assert_eq!(norm("一万零五百").unwrap(), "10500");
        assert_eq!(norm("1億2000万").unwrap(), "120000000");
        assert_eq!(norm("1万2345").unwrap(), "12345");
        assert_eq!(norm("30万").unwrap(), "300000");
        assert_eq!(norm("二十三万四千").unwrap(), "234000");
    }

    #[test]
    fn misordered_cjk_magnitudes_are_rejected() {
        for s in [
            "十十", "百百", "万万", "一二三十", "一万一億", "十百", "二十三四", "一千零百",
            "1億20000万", "1万23456",
        ] {
            assert_eq!(norm(s).unwrap_err(), MalformedReason::Unconvertible, "{s}");
        }
    }

    #[test]
    fn cjk_overflow_is_reported() {
        assert_eq!(norm("20000000兆").unwrap_err(), MalformedReason::Overflow);
    }

    #[test]
    fn literal_tokens_are_not_normalized() {
        let tok = Token {
            kind: TokenKind::Literal,
            text: "+",
        };
        assert_eq!(
            normalize_token(&tok).unwrap_err().reason,
            MalformedReason::NotNumeric
        );
    }
}

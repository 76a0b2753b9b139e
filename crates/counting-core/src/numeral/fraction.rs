//! Precomposed vulgar fractions.
//!
//! Repeating decimals are truncated to three fractional digits (⅓ → 0.333).
//! This is lossy: `3 * ⅓` evaluates to 0.999, not 1.

const FRACTIONS: &[(char, &str)] = &[
    ('½', "0.5"),
    ('⅓', "0.333"),
    ('⅔', "0.666"),
    ('¼', "0.25"),
    ('¾', "0.75"),
    ('⅕', "0.2"),
    ('⅖', "0.4"),
    ('⅗', "0.6"),
    ('⅘', "0.8"),
    ('⅙', "0.166"),
    ('⅚', "0.833"),
    ('⅐', "0.142"),
    ('⅛', "0.125"),
    ('⅜', "0.375"),
    ('⅝', "0.625"),
    ('⅞', "0.875"),
    ('⅑', "0.111"),
    ('⅒', "0.1"),
    ('↉', "0"),
];

/// Decimal string for a single fraction glyph.
pub fn decimal(c: char) -> Option<&'static str> {
    FRACTIONS.iter().find(|(g, _)| *g == c).map(|(_, d)| *d)
}

pub fn is_fraction(c: char) -> bool {
    decimal(c).is_some()
}

/// Append a fraction's decimal to an already-normalized whole part.
///
/// `("1", "0.5")` → `"1.5"`; an empty whole part yields the fraction alone.
pub fn join_whole(whole: &str, fraction: &str) -> String {
    if whole.is_empty() {
        return fraction.to_string();
    }
    match fraction.split_once('.') {
        Some((_, frac_digits)) => format!("{whole}.{frac_digits}"),
        None => whole.to_string(),
    }
}

//! Script classification for numeral characters.
//!
//! Every character that carries a digit or numeral meaning maps to exactly one
//! [`NumeralScript`]; everything else (letters, punctuation, operators,
//! whitespace) classifies as `None`. Vulgar fractions are deliberately not
//! classified here; see [`super::fraction`].

/// A family of digit glyphs or a numbering convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumeralScript {
    Latin,
    Fullwidth,
    Mathematical,
    ArabicIndic,
    ExtendedArabicIndic,
    Nko,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    SinhalaLith,
    Thai,
    Lao,
    Tibetan,
    Myanmar,
    MyanmarShan,
    Khmer,
    Mongolian,
    Limbu,
    NewTaiLue,
    TaiThamHora,
    TaiThamTham,
    Balinese,
    Sundanese,
    Lepcha,
    OlChiki,
    Vai,
    Saurashtra,
    KayahLi,
    Javanese,
    MyanmarTaiLaing,
    Cham,
    MeeteiMayek,
    Osmanya,
    HanifiRohingya,
    Brahmi,
    Adlam,
    Roman,
    Cjk,
}

/// How a script turns a run of its glyphs into a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumeralKind {
    /// Ten consecutive code points per digit set; value = offset from a zero.
    Positional,
    /// Additive/subtractive Roman numerals (Number Forms block).
    Roman,
    /// CJK digits with magnitude characters (十, 百, 千, 万, 億...).
    Cjk,
}

impl NumeralScript {
    pub fn kind(self) -> NumeralKind {
        match self {
            NumeralScript::Roman => NumeralKind::Roman,
            NumeralScript::Cjk => NumeralKind::Cjk,
            _ => NumeralKind::Positional,
        }
    }

    /// Width and style variants of the ASCII digits count as Latin for the
    /// mixed-script guard.
    pub fn is_latin_like(self) -> bool {
        matches!(
            self,
            NumeralScript::Latin | NumeralScript::Fullwidth | NumeralScript::Mathematical
        )
    }
}

/// A block of ten decimal digits starting at `zero`.
struct DigitBlock {
    zero: u32,
    script: NumeralScript,
}

const fn block(zero: u32, script: NumeralScript) -> DigitBlock {
    DigitBlock { zero, script }
}

/// Decimal digit blocks (Unicode general category Nd), sorted by code point.
const DIGIT_BLOCKS: &[DigitBlock] = &[
    block(0x0030, NumeralScript::Latin),
    block(0x0660, NumeralScript::ArabicIndic),
    block(0x06F0, NumeralScript::ExtendedArabicIndic),
    block(0x07C0, NumeralScript::Nko),
    block(0x0966, NumeralScript::Devanagari),
    block(0x09E6, NumeralScript::Bengali),
    block(0x0A66, NumeralScript::Gurmukhi),
    block(0x0AE6, NumeralScript::Gujarati),
    block(0x0B66, NumeralScript::Oriya),
    block(0x0BE6, NumeralScript::Tamil),
    block(0x0C66, NumeralScript::Telugu),
    block(0x0CE6, NumeralScript::Kannada),
    block(0x0D66, NumeralScript::Malayalam),
    block(0x0DE6, NumeralScript::SinhalaLith),
    block(0x0E50, NumeralScript::Thai),
    block(0x0ED0, NumeralScript::Lao),
    block(0x0F20, NumeralScript::Tibetan),
    block(0x1040, NumeralScript::Myanmar),
    block(0x1090, NumeralScript::MyanmarShan),
    block(0x17E0, NumeralScript::Khmer),
    block(0x1810, NumeralScript::Mongolian),
    block(0x1946, NumeralScript::Limbu),
    block(0x19D0, NumeralScript::NewTaiLue),
    block(0x1A80, NumeralScript::TaiThamHora),
    block(0x1A90, NumeralScript::TaiThamTham),
    block(0x1B50, NumeralScript::Balinese),
    block(0x1BB0, NumeralScript::Sundanese),
    block(0x1C40, NumeralScript::Lepcha),
    block(0x1C50, NumeralScript::OlChiki),
    block(0xA620, NumeralScript::Vai),
    block(0xA8D0, NumeralScript::Saurashtra),
    block(0xA900, NumeralScript::KayahLi),
    block(0xA9D0, NumeralScript::Javanese),
    block(0xA9F0, NumeralScript::MyanmarTaiLaing),
    block(0xAA50, NumeralScript::Cham),
    block(0xABF0, NumeralScript::MeeteiMayek),
    block(0xFF10, NumeralScript::Fullwidth),
    block(0x104A0, NumeralScript::Osmanya),
    block(0x10D30, NumeralScript::HanifiRohingya),
    block(0x11066, NumeralScript::Brahmi),
    // Mathematical bold, double-struck, sans-serif, sans-serif bold, monospace.
    block(0x1D7CE, NumeralScript::Mathematical),
    block(0x1D7D8, NumeralScript::Mathematical),
    block(0x1D7E2, NumeralScript::Mathematical),
    block(0x1D7EC, NumeralScript::Mathematical),
    block(0x1D7F6, NumeralScript::Mathematical),
    block(0x1E950, NumeralScript::Adlam),
];

/// Script and digit value of a positional digit.
pub fn positional_digit(c: char) -> Option<(NumeralScript, u32)> {
    let cp = c as u32;
    let idx = DIGIT_BLOCKS.partition_point(|b| b.zero <= cp);
    let b = DIGIT_BLOCKS.get(idx.checked_sub(1)?)?;
    let value = cp - b.zero;
    (value < 10).then_some((b.script, value))
}

/// Letters a Roman numeral glyph stands for.
///
/// Beyond `IVXLCDM`, the apostrophus forms use `P` (5 000), `Q` (10 000),
/// `R` (50 000) and `S` (100 000). Glyphs such as Ⅻ expand to several letters.
pub fn roman_letters(c: char) -> Option<&'static str> {
    let letters = match c {
        'Ⅰ' | 'ⅰ' => "I",
        'Ⅱ' | 'ⅱ' => "II",
        'Ⅲ' | 'ⅲ' => "III",
        'Ⅳ' | 'ⅳ' => "IV",
        'Ⅴ' | 'ⅴ' => "V",
        'Ⅵ' | 'ⅵ' | 'ↅ' => "VI",
        'Ⅶ' | 'ⅶ' => "VII",
        'Ⅷ' | 'ⅷ' => "VIII",
        'Ⅸ' | 'ⅸ' => "IX",
        'Ⅹ' | 'ⅹ' => "X",
        'Ⅺ' | 'ⅺ' => "XI",
        'Ⅻ' | 'ⅻ' => "XII",
        'Ⅼ' | 'ⅼ' | 'ↆ' => "L",
        'Ⅽ' | 'ⅽ' => "C",
        'Ⅾ' | 'ⅾ' => "D",
        'Ⅿ' | 'ⅿ' | 'ↀ' => "M",
        'ↁ' => "P",
        'ↂ' => "Q",
        'ↇ' => "R",
        'ↈ' => "S",
        _ => return None,
    };
    Some(letters)
}

pub fn is_roman(c: char) -> bool {
    roman_letters(c).is_some()
}

/// A CJK numeral character: either a digit or a magnitude multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CjkGlyph {
    Digit(u64),
    /// 十 百 千: multiply the pending digit inside the current section.
    Unit(u64),
    /// 万 億 兆: close the current section.
    Section(u64),
}

pub fn cjk_glyph(c: char) -> Option<CjkGlyph> {
    let g = match c {
        '〇' | '零' => CjkGlyph::Digit(0),
        '一' | '壹' | '弌' => CjkGlyph::Digit(1),
        '二' | '貳' | '贰' | '弐' | '兩' | '两' => CjkGlyph::Digit(2),
        '三' | '參' | '叁' | '参' | '弎' => CjkGlyph::Digit(3),
        '四' | '肆' => CjkGlyph::Digit(4),
        '五' | '伍' => CjkGlyph::Digit(5),
        '六' | '陸' | '陆' => CjkGlyph::Digit(6),
        '七' | '柒' => CjkGlyph::Digit(7),
        '八' | '捌' => CjkGlyph::Digit(8),
        '九' | '玖' => CjkGlyph::Digit(9),
        '十' | '拾' => CjkGlyph::Unit(10),
        '百' | '佰' => CjkGlyph::Unit(100),
        '千' | '仟' => CjkGlyph::Unit(1_000),
        '万' | '萬' => CjkGlyph::Section(10_000),
        '億' | '亿' => CjkGlyph::Section(100_000_000),
        '兆' => CjkGlyph::Section(1_000_000_000_000),
        _ => return None,
    };
    Some(g)
}

/// Classify a character into the numeral script it belongs to.
///
/// Total over all Unicode scalar values and free of side effects.
pub fn classify(c: char) -> Option<NumeralScript> {
    if let Some((script, _)) = positional_digit(c) {
        return Some(script);
    }
    if is_roman(c) {
        return Some(NumeralScript::Roman);
    }
    if cjk_glyph(c).is_some() {
        return Some(NumeralScript::Cjk);
    }
    None
}

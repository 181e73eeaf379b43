//! Arabic text normalization applied before any pattern matching
//!
//! The same word has several valid spellings in Arabic script. Folding them
//! to one canonical form lets every vocabulary table be written once.

/// First and last code points of the harakat/combining mark block that is stripped
const DIACRITIC_FIRST: char = '\u{064B}';
const DIACRITIC_LAST: char = '\u{065F}';
const TATWEEL: char = '\u{0640}';

const ALEF: char = '\u{0627}';
const ALEF_MADDA: char = '\u{0622}';
const ALEF_HAMZA_ABOVE: char = '\u{0623}';
const ALEF_HAMZA_BELOW: char = '\u{0625}';
const TEH_MARBUTA: char = '\u{0629}';
const HEH: char = '\u{0647}';
const ALEF_MAKSURA: char = '\u{0649}';
const YEH: char = '\u{064A}';

/// Canonicalize a query for matching
///
/// Strips diacritics (U+064B..=U+065F) and tatweel (U+0640), folds alef
/// variants to bare alef, teh marbuta to heh and alef maksura to yeh, then
/// collapses whitespace runs to one space and trims both ends. Total over all
/// strings and idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| *c != TATWEEL && !(DIACRITIC_FIRST..=DIACRITIC_LAST).contains(c))
        .map(fold_letter)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_letter(c: char) -> char {
    match c {
        ALEF_MADDA | ALEF_HAMZA_ABOVE | ALEF_HAMZA_BELOW => ALEF,
        TEH_MARBUTA => HEH,
        ALEF_MAKSURA => YEH,
        other => other,
    }
}

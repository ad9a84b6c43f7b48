//! Right-to-left text shaping.
//!
//! Recognized Arabic-script text comes back in logical order with base
//! letters. Word processors that do not run their own shaping need the
//! contextual presentation forms and visual order, so RTL output is
//! reshaped letter by letter and then reordered line by line.

use std::borrow::Cow;

use unicode_bidi::BidiInfo;

use crate::language::Language;

const LAM: char = '\u{0644}';

/// Presentation forms: isolated, final, initial, medial. Zero means the
/// letter has no such form. Sorted by base letter.
const FORMS: &[(char, [u32; 4])] = &[
    ('\u{0621}', [0xFE80, 0, 0, 0]),
    ('\u{0622}', [0xFE81, 0xFE82, 0, 0]),
    ('\u{0623}', [0xFE83, 0xFE84, 0, 0]),
    ('\u{0624}', [0xFE85, 0xFE86, 0, 0]),
    ('\u{0625}', [0xFE87, 0xFE88, 0, 0]),
    ('\u{0626}', [0xFE89, 0xFE8A, 0xFE8B, 0xFE8C]),
    ('\u{0627}', [0xFE8D, 0xFE8E, 0, 0]),
    ('\u{0628}', [0xFE8F, 0xFE90, 0xFE91, 0xFE92]),
    ('\u{0629}', [0xFE93, 0xFE94, 0, 0]),
    ('\u{062A}', [0xFE95, 0xFE96, 0xFE97, 0xFE98]),
    ('\u{062B}', [0xFE99, 0xFE9A, 0xFE9B, 0xFE9C]),
    ('\u{062C}', [0xFE9D, 0xFE9E, 0xFE9F, 0xFEA0]),
    ('\u{062D}', [0xFEA1, 0xFEA2, 0xFEA3, 0xFEA4]),
    ('\u{062E}', [0xFEA5, 0xFEA6, 0xFEA7, 0xFEA8]),
    ('\u{062F}', [0xFEA9, 0xFEAA, 0, 0]),
    ('\u{0630}', [0xFEAB, 0xFEAC, 0, 0]),
    ('\u{0631}', [0xFEAD, 0xFEAE, 0, 0]),
    ('\u{0632}', [0xFEAF, 0xFEB0, 0, 0]),
    ('\u{0633}', [0xFEB1, 0xFEB2, 0xFEB3, 0xFEB4]),
    ('\u{0634}', [0xFEB5, 0xFEB6, 0xFEB7, 0xFEB8]),
    ('\u{0635}', [0xFEB9, 0xFEBA, 0xFEBB, 0xFEBC]),
    ('\u{0636}', [0xFEBD, 0xFEBE, 0xFEBF, 0xFEC0]),
    ('\u{0637}', [0xFEC1, 0xFEC2, 0xFEC3, 0xFEC4]),
    ('\u{0638}', [0xFEC5, 0xFEC6, 0xFEC7, 0xFEC8]),
    ('\u{0639}', [0xFEC9, 0xFECA, 0xFECB, 0xFECC]),
    ('\u{063A}', [0xFECD, 0xFECE, 0xFECF, 0xFED0]),
    ('\u{0640}', [0x0640, 0x0640, 0x0640, 0x0640]),
    ('\u{0641}', [0xFED1, 0xFED2, 0xFED3, 0xFED4]),
    ('\u{0642}', [0xFED5, 0xFED6, 0xFED7, 0xFED8]),
    ('\u{0643}', [0xFED9, 0xFEDA, 0xFEDB, 0xFEDC]),
    ('\u{0644}', [0xFEDD, 0xFEDE, 0xFEDF, 0xFEE0]),
    ('\u{0645}', [0xFEE1, 0xFEE2, 0xFEE3, 0xFEE4]),
    ('\u{0646}', [0xFEE5, 0xFEE6, 0xFEE7, 0xFEE8]),
    ('\u{0647}', [0xFEE9, 0xFEEA, 0xFEEB, 0xFEEC]),
    ('\u{0648}', [0xFEED, 0xFEEE, 0, 0]),
    ('\u{0649}', [0xFEEF, 0xFEF0, 0, 0]),
    ('\u{064A}', [0xFEF1, 0xFEF2, 0xFEF3, 0xFEF4]),
    ('\u{067E}', [0xFB56, 0xFB57, 0xFB58, 0xFB59]),
    ('\u{0686}', [0xFB7A, 0xFB7B, 0xFB7C, 0xFB7D]),
    ('\u{0698}', [0xFB8A, 0xFB8B, 0, 0]),
    ('\u{06A9}', [0xFB8E, 0xFB8F, 0xFB90, 0xFB91]),
    ('\u{06AF}', [0xFB92, 0xFB93, 0xFB94, 0xFB95]),
    ('\u{06CC}', [0xFBFC, 0xFBFD, 0xFBFE, 0xFBFF]),
];

const ISOLATED: usize = 0;
const FINAL: usize = 1;
const INITIAL: usize = 2;
const MEDIAL: usize = 3;

/// Lam-alef ligatures: alef variant, isolated, final.
const LAM_ALEF: &[(char, u32, u32)] = &[
    ('\u{0622}', 0xFEF5, 0xFEF6),
    ('\u{0623}', 0xFEF7, 0xFEF8),
    ('\u{0625}', 0xFEF9, 0xFEFA),
    ('\u{0627}', 0xFEFB, 0xFEFC),
];

fn forms(c: char) -> Option<&'static [u32; 4]> {
    FORMS
        .binary_search_by_key(&c, |(base, _)| *base)
        .ok()
        .map(|i| &FORMS[i].1)
}

/// Combining marks that do not break a joining run.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0610}'..='\u{061A}')
}

/// Joins to the following letter.
fn joins_left(c: char) -> bool {
    forms(c).is_some_and(|f| f[INITIAL] != 0)
}

/// Joins to the preceding letter.
fn joins_right(c: char) -> bool {
    forms(c).is_some_and(|f| f[FINAL] != 0)
}

fn lam_alef(c: char) -> Option<(u32, u32)> {
    LAM_ALEF
        .iter()
        .find(|(alef, _, _)| *alef == c)
        .map(|(_, iso, fin)| (*iso, *fin))
}

fn neighbor(chars: &[char], from: usize, forward: bool) -> Option<char> {
    if forward {
        chars[from + 1..].iter().copied().find(|c| !is_transparent(*c))
    } else {
        chars[..from].iter().rev().copied().find(|c| !is_transparent(*c))
    }
}

fn push(out: &mut String, code: u32, fallback: char) {
    out.push(char::from_u32(code).unwrap_or(fallback));
}

/// Replace Arabic-script letters with their contextual presentation forms.
///
/// Logical order is kept. Characters outside the table pass through.
pub fn reshape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let Some(f) = forms(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let after_joiner = neighbor(&chars, i, false).is_some_and(joins_left);
        let joins_prev = after_joiner && f[FINAL] != 0;

        if c == LAM {
            if let Some((iso, fin)) = chars.get(i + 1).copied().and_then(lam_alef) {
                push(&mut out, if joins_prev { fin } else { iso }, chars[i + 1]);
                i += 2;
                continue;
            }
        }

        let joins_next = f[INITIAL] != 0 && neighbor(&chars, i, true).is_some_and(joins_right);
        let form = match (joins_prev, joins_next) {
            (true, true) => MEDIAL,
            (true, false) => FINAL,
            (false, true) => INITIAL,
            (false, false) => ISOLATED,
        };
        push(&mut out, f[form], c);
        i += 1;
    }

    out
}

/// Reorder each line from logical to visual order.
pub fn visual_order(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let info = BidiInfo::new(line, None);
            info.paragraphs
                .iter()
                .map(|para| info.reorder_line(para, para.range.clone()))
                .collect::<Vec<Cow<'_, str>>>()
                .concat()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reshape then reorder.
pub fn to_display(text: &str) -> String {
    visual_order(&reshape(text))
}

/// Apply RTL shaping when `language` needs it; otherwise return the text unchanged.
pub fn shape_for(language: Language, text: &str) -> String {
    if language.is_rtl() {
        to_display(text)
    } else {
        text.to_string()
    }
}

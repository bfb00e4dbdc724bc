//! String encodings: WinAnsi for standard-font text, PDF text strings for
//! document metadata.

use std::fmt::Write;

/// Unicode characters that WinAnsi (Windows-1252) places in 0x80..=0x9F.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

pub(crate) fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        cp @ (0x20..=0x7E | 0xA0..=0xFF) => Some(cp as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, byte)| *byte),
    }
}

/// Body of a literal string for a standard font. Characters outside WinAnsi
/// become '?'.
pub(crate) fn win_ansi_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi_byte(ch).unwrap_or(b'?') {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            byte @ 0x20..=0x7E => out.push(byte as char),
            byte => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

/// A complete text string token: a literal for plain ASCII, UTF-16BE hex
/// with a byte order mark otherwise.
pub(crate) fn text_string(text: &str) -> String {
    if text.chars().all(|c| (' '..='~').contains(&c)) {
        let escaped = text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
        return format!("({})", escaped);
    }
    let mut hex = String::from("<FEFF");
    for unit in text.encode_utf16() {
        let _ = write!(hex, "{:04X}", unit);
    }
    hex.push('>');
    hex
}

/// Letters, digits, '-' and '_' only, as PDF names for embedded fonts.
pub(crate) fn font_name(family: &str, bold: bool) -> String {
    let mut name: String = family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if name.is_empty() {
        name.push_str("Embedded");
    }
    if bold {
        name.push_str("-Bold");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_bytes() {
        assert_eq!(win_ansi_byte('A'), Some(b'A'));
        assert_eq!(win_ansi_byte('é'), Some(0xE9));
        assert_eq!(win_ansi_byte('\u{2014}'), Some(0x97));
        assert_eq!(win_ansi_byte('\u{00AE}'), Some(0xAE));
        assert_eq!(win_ansi_byte('Ж'), None);
        assert_eq!(win_ansi_byte('\n'), None);
    }

    #[test]
    fn literals_escape_and_octal_encode() {
        assert_eq!(win_ansi_literal("Hi (there)"), "Hi \\(there\\)");
        assert_eq!(win_ansi_literal("a\\b"), "a\\\\b");
        assert_eq!(win_ansi_literal("\u{2022} a"), "\\225 a");
        assert_eq!(win_ansi_literal("SAVVA\u{00AE}"), "SAVVA\\256");
        assert_eq!(win_ansi_literal("Жизнь"), "?????");
    }

    #[test]
    fn text_strings() {
        assert_eq!(text_string("Report (May)"), "(Report \\(May\\))");
        assert_eq!(text_string("Отчёт"), "<FEFF041E0442044704510442>");
    }

    #[test]
    fn font_names() {
        assert_eq!(font_name("DejaVu Sans", false), "DejaVuSans");
        assert_eq!(font_name("Noto_Serif-X", true), "Noto_Serif-X-Bold");
        assert_eq!(font_name("Шрифт", false), "Embedded");
    }
}

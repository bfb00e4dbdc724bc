//! Advance widths of the standard PDF fonts, from the Adobe AFM files.
//!
//! Widths are in 1/1000 em for the printable ASCII range (0x20..=0x7E).
//! A handful of WinAnsi punctuation marks that show up in reports (bullet,
//! dashes, ellipsis, curly quotes) are handled separately; anything else
//! falls back to a per-font average width.

/// Width table for one standard font.
pub struct StandardFontMetrics {
    ascii: &'static [u16; 95],
    default_width: u16,
    /// Width of en dash, curly quotes and similar punctuation.
    punct: PunctWidths,
}

#[derive(Clone, Copy)]
struct PunctWidths {
    bullet: u16,
    endash: u16,
    emdash: u16,
    ellipsis: u16,
    quote_single: u16,
    quote_double: u16,
}

impl StandardFontMetrics {
    /// Width in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return self.ascii[(cp - 0x20) as usize];
        }
        match ch {
            '\u{00A0}' => self.ascii[0],
            '\u{2022}' => self.punct.bullet,
            '\u{2013}' => self.punct.endash,
            '\u{2014}' => self.punct.emdash,
            '\u{2026}' => self.punct.ellipsis,
            '\u{2018}' | '\u{2019}' => self.punct.quote_single,
            '\u{201C}' | '\u{201D}' => self.punct.quote_double,
            _ => self.default_width,
        }
    }

    /// Width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| self.advance(c) as u32).sum();
        units as f64 / 1000.0 * font_size
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: &[
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
        334, 260, 334, 584, // '{'..'~'
    ],
    default_width: 556,
    punct: PunctWidths {
        bullet: 350,
        endash: 556,
        emdash: 1000,
        ellipsis: 1000,
        quote_single: 222,
        quote_double: 333,
    },
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: &[
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    default_width: 611,
    punct: PunctWidths {
        bullet: 350,
        endash: 556,
        emdash: 1000,
        ellipsis: 1000,
        quote_single: 278,
        quote_double: 500,
    },
};

pub static TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    ascii: &[
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        278, 278, 564, 564, 564, 444, 921,
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        333, 278, 333, 469, 500, 333,
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        480, 200, 480, 541,
    ],
    default_width: 500,
    punct: PunctWidths {
        bullet: 350,
        endash: 500,
        emdash: 1000,
        ellipsis: 1000,
        quote_single: 333,
        quote_double: 444,
    },
};

pub static TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: &[
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        333, 333, 570, 570, 570, 500, 930,
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
        333, 278, 333, 581, 500, 333,
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
        394, 220, 394, 520,
    ],
    default_width: 556,
    punct: PunctWidths {
        bullet: 350,
        endash: 500,
        emdash: 1000,
        ellipsis: 1000,
        quote_single: 333,
        quote_double: 500,
    },
};

/// Courier and Courier-Bold are monospaced: every glyph is 600 units.
pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: &[600; 95],
    default_width: 600,
    punct: PunctWidths {
        bullet: 600,
        endash: 600,
        emdash: 600,
        ellipsis: 600,
        quote_single: 600,
        quote_double: 600,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_known_widths() {
        assert_eq!(HELVETICA.advance(' '), 278);
        assert_eq!(HELVETICA.advance('A'), 667);
        assert_eq!(HELVETICA.advance('i'), 222);
        assert_eq!(HELVETICA.advance('~'), 584);
        assert_eq!(HELVETICA.advance('\u{2022}'), 350);
    }

    #[test]
    fn times_bold_known_widths() {
        assert_eq!(TIMES_BOLD.advance('W'), 1000);
        assert_eq!(TIMES_BOLD.advance('m'), 833);
        assert_eq!(TIMES_ROMAN.advance('a'), 444);
    }

    #[test]
    fn courier_is_monospaced() {
        let w = COURIER.measure_string("iiii", 10.0);
        let w2 = COURIER.measure_string("MMMM", 10.0);
        assert!((w - w2).abs() < 1e-9);
        assert!((w - 24.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_chars_use_default_width() {
        assert_eq!(HELVETICA.advance('Ж'), 556);
    }
}

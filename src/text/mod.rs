//! # Text Layout
//!
//! Measurement, greedy word wrapping and height estimation.
//!
//! Every wrapping decision the layout engine makes goes through
//! [`wrap_greedy`]. The table engine sizes rows with [`estimate_height`] and
//! then draws the lines [`wrap_text`] produces, so a row is always exactly as
//! tall as what ends up inside it.
//!
//! Words wider than the available width are split by character: the longest
//! prefix that fits stays on the line and the remainder is carried over as
//! the first word of the rest.

use crate::font::FontContext;
use crate::style::Style;

/// One line taken from the front of a word stream.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub line: String,
    /// Measured width of `line`.
    pub width: f64,
    /// Words that did not fit, in order.
    pub rest: Vec<String>,
}

/// Width of `text` on a single line in the given style.
pub fn measure_width(ctx: &FontContext, text: &str, style: &Style) -> f64 {
    ctx.measure_string(text, &style.font_family, style.bold, style.font_size)
}

fn is_space_token(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_whitespace)
}

/// Whitespace tokenization for inline text runs.
///
/// A run that begins or ends with whitespace keeps one `" "` token at that
/// end, so "bold" followed by " text" does not glue the words together.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        if !text.is_empty() {
            words.push(" ".to_string());
        }
        return words;
    }
    if text.starts_with(char::is_whitespace) {
        words.insert(0, " ".to_string());
    }
    if text.ends_with(char::is_whitespace) {
        words.push(" ".to_string());
    }
    words
}

/// Take as many words as fit into `max_width`.
///
/// Words are joined with one space. Space tokens produced by
/// [`split_words`] stand in for that separator rather than adding to it.
pub fn wrap_greedy(ctx: &FontContext, words: &[String], max_width: f64, style: &Style) -> WrappedLine {
    let space_width = measure_width(ctx, " ", style);
    let mut line = String::new();
    let mut line_width = 0.0;
    let mut prev_is_space = true;

    for (i, word) in words.iter().enumerate() {
        let word_width = measure_width(ctx, word, style);

        if i == 0 && word_width > max_width {
            let (head, head_width, tail) = split_oversized(ctx, word, max_width, style);
            let mut rest = Vec::with_capacity(words.len());
            if !tail.is_empty() {
                rest.push(tail);
            }
            rest.extend(words[1..].iter().cloned());
            return WrappedLine {
                line: head,
                width: head_width,
                rest,
            };
        }

        let is_space = is_space_token(word);
        let needs_separator = i > 0 && !prev_is_space && !is_space;
        let additional = if needs_separator {
            word_width + space_width
        } else {
            word_width
        };

        if line_width + additional > max_width {
            return WrappedLine {
                line,
                width: line_width,
                rest: words[i..].to_vec(),
            };
        }

        if needs_separator {
            line.push(' ');
        }
        line.push_str(word);
        line_width += additional;
        prev_is_space = is_space;
    }

    WrappedLine {
        line,
        width: line_width,
        rest: Vec::new(),
    }
}

/// Longest prefix of `word` that fits, never less than one character.
fn split_oversized(ctx: &FontContext, word: &str, max_width: f64, style: &Style) -> (String, f64, String) {
    let mut head = String::new();
    let mut head_width = 0.0;
    for (byte_idx, ch) in word.char_indices() {
        let w = ctx.char_width(ch, &style.font_family, style.bold, style.font_size);
        if !head.is_empty() && head_width + w > max_width {
            return (head, head_width, word[byte_idx..].to_string());
        }
        head.push(ch);
        head_width += w;
    }
    (head, head_width, String::new())
}

/// Wrap a block of text into lines.
///
/// Explicit newlines always break; an empty paragraph yields an empty line.
pub fn wrap_text(ctx: &FontContext, text: &str, max_width: f64, style: &Style) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut words: Vec<String> = paragraph.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }
        while !words.is_empty() {
            let wrapped = wrap_greedy(ctx, &words, max_width, style);
            lines.push(wrapped.line);
            words = wrapped.rest;
        }
    }
    lines
}

/// Height of `text` wrapped into a box `width` wide, padding included.
pub fn estimate_height(ctx: &FontContext, text: &str, width: f64, style: &Style) -> f64 {
    let inner = width - style.padding.horizontal();
    let lines = wrap_text(ctx, text, inner, style).len();
    lines as f64 * style.line_height() + style.padding.vertical()
}

/// Shorten `text` with a trailing "..." until it fits `max_width`.
///
/// Returns the text to draw and its width. If not even the ellipsis fits,
/// the result is empty.
pub fn ellipsize(ctx: &FontContext, text: &str, max_width: f64, style: &Style) -> (String, f64) {
    let full = measure_width(ctx, text, style);
    if full <= max_width {
        return (text.to_string(), full);
    }
    let ellipsis_width = measure_width(ctx, "...", style);
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let prefix: String = chars.iter().collect();
        let prefix = prefix.trim_end();
        let w = measure_width(ctx, prefix, style) + ellipsis_width;
        if w <= max_width {
            return (format!("{}...", prefix), w);
        }
    }
    if ellipsis_width <= max_width {
        ("...".to_string(), ellipsis_width)
    } else {
        (String::new(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edges;

    fn ctx() -> FontContext {
        FontContext::new()
    }

    fn words(s: &[&str]) -> Vec<String> {
        s.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_single_line() {
        let fc = ctx();
        let style = Style::default();
        let wrapped = wrap_greedy(&fc, &words(&["Hello"]), 200.0, &style);
        assert_eq!(wrapped.line, "Hello");
        assert!(wrapped.rest.is_empty());
        assert!((wrapped.width - measure_width(&fc, "Hello", &style)).abs() < 1e-9);
    }

    #[test]
    fn test_line_break_at_space() {
        let fc = ctx();
        let style = Style::default();
        let hello = measure_width(&fc, "Hello", &style);
        let wrapped = wrap_greedy(&fc, &words(&["Hello", "World"]), hello + 5.0, &style);
        assert_eq!(wrapped.line, "Hello");
        assert_eq!(wrapped.rest, words(&["World"]));
    }

    #[test]
    fn test_lines_never_exceed_width() {
        let fc = ctx();
        let style = Style::new("Times", 11.0);
        let text = "The quick brown fox jumps over the lazy dog while the \
                    committee deliberates about extraordinarily long words";
        for max in [30.0, 55.5, 80.0, 123.4, 300.0] {
            for line in wrap_text(&fc, text, max, &style) {
                let w = measure_width(&fc, &line, &style);
                assert!(w <= max + 1e-9, "{:?} is {} wide, max {}", line, w, max);
            }
        }
    }

    #[test]
    fn test_oversized_word_is_character_split() {
        let fc = ctx();
        let style = Style::new("Courier", 12.0);
        let max = measure_width(&fc, "abcd", &style) + 0.01;
        let wrapped = wrap_greedy(&fc, &words(&["abcdefghij", "next"]), max, &style);
        assert_eq!(wrapped.line, "abcd");
        assert_eq!(wrapped.rest, words(&["efghij", "next"]));

        let lines = wrap_text(&fc, "abcdefghij", max, &style);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_always_makes_progress() {
        let fc = ctx();
        let style = Style::default();
        let wrapped = wrap_greedy(&fc, &words(&["WW"]), 1.0, &style);
        assert_eq!(wrapped.line, "W");
        assert_eq!(wrapped.rest, words(&["W"]));
    }

    #[test]
    fn test_explicit_newline() {
        let fc = ctx();
        let lines = wrap_text(&fc, "Hello\nWorld", 200.0, &Style::default());
        assert_eq!(lines, vec!["Hello", "World"]);
    }

    #[test]
    fn test_empty_string() {
        let fc = ctx();
        let lines = wrap_text(&fc, "", 200.0, &Style::default());
        assert_eq!(lines, vec![""]);
    }

    #[test]
    fn test_split_words_keeps_edge_spaces() {
        assert_eq!(split_words(" bold text "), words(&[" ", "bold", "text", " "]));
        assert_eq!(split_words("plain"), words(&["plain"]));
        assert_eq!(split_words("   "), words(&[" "]));
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_space_tokens_do_not_double_up() {
        let fc = ctx();
        let style = Style::default();
        let wrapped = wrap_greedy(&fc, &split_words(" and more "), 500.0, &style);
        assert_eq!(wrapped.line, " and more ");
        assert!((wrapped.width - measure_width(&fc, " and more ", &style)).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_height_matches_wrapped_lines() {
        let fc = ctx();
        let style = Style::new("Helvetica", 10.0).with_padding(Edges {
            top: 3.0,
            right: 5.0,
            bottom: 4.0,
            left: 6.0,
        });
        let text = "Row heights come from the same greedy wrap\nthat draws the cell";
        for width in [60.0, 100.0, 250.0] {
            let lines = wrap_text(&fc, text, width - 11.0, &style).len();
            let expected = lines as f64 * 10.0 * 1.2 + 7.0;
            assert!((estimate_height(&fc, text, width, &style) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ellipsize() {
        let fc = ctx();
        let style = Style::default();
        let (short, w) = ellipsize(&fc, "Short", 200.0, &style);
        assert_eq!(short, "Short");
        assert!((w - measure_width(&fc, "Short", &style)).abs() < 1e-9);

        let (cut, w) = ellipsize(&fc, "A rather long section title", 80.0, &style);
        assert!(cut.ends_with("..."));
        assert!(w <= 80.0);
        assert!(cut.len() < "A rather long section title".len() + 3);
    }
}

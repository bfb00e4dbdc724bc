//! # Localized Strings
//!
//! Static dictionaries keyed by dotted names (`summary.title`). Lookup falls
//! back from the requested locale to English and then to any language that
//! has the key. A key nobody knows renders as `[key]` so gaps show up in the
//! output instead of failing the report.

mod en;
mod ru;

use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One language: month names plus its dictionary.
pub struct Language {
    pub months: [&'static str; 12],
    pub entries: &'static [(&'static str, &'static str)],
}

impl Language {
    fn get(&self, key: &str) -> Option<&'static str> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

const FALLBACK_LOCALE: &str = "en";

fn languages() -> &'static BTreeMap<&'static str, &'static Language> {
    static LANGUAGES: OnceLock<BTreeMap<&'static str, &'static Language>> = OnceLock::new();
    LANGUAGES.get_or_init(|| {
        let mut map = BTreeMap::new();
        map.insert("en", &en::EN);
        map.insert("ru", &ru::RU);
        map
    })
}

/// Locales with a dictionary, in lookup order of the last fallback step.
pub fn available_locales() -> Vec<&'static str> {
    languages().keys().copied().collect()
}

/// Month names and dictionary values of one locale, without fallback.
/// Empty for a locale with no dictionary.
pub fn locale_strings(locale: &str) -> Vec<&'static str> {
    languages()
        .get(locale)
        .map(|lang| {
            lang.months
                .iter()
                .copied()
                .chain(lang.entries.iter().map(|(_, v)| *v))
                .collect()
        })
        .unwrap_or_default()
}

/// Translate `key` for `locale`.
pub fn translate(key: &str, locale: &str) -> String {
    let langs = languages();
    let found = langs
        .get(locale)
        .and_then(|l| l.get(key))
        .or_else(|| langs.get(FALLBACK_LOCALE).and_then(|l| l.get(key)))
        .or_else(|| langs.values().find_map(|l| l.get(key)));
    match found {
        Some(text) => text.to_string(),
        None => {
            log::warn!("Missing translation for '{}' ({})", key, locale);
            format!("[{}]", key)
        }
    }
}

/// Translate and substitute each `{}` placeholder in order.
pub fn translate_with(key: &str, locale: &str, args: &[&str]) -> String {
    fill(&translate(key, locale), args)
}

/// Replace `{}` placeholders left to right. Extra placeholders stay as they
/// are, extra arguments are ignored.
pub fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Month name (1-12) for a locale, English when the locale is unknown.
/// Empty for an out-of-range month.
pub fn month_name(month: u32, locale: &str) -> &'static str {
    if !(1..=12).contains(&month) {
        return "";
    }
    let langs = languages();
    let lang = langs
        .get(locale)
        .or_else(|| langs.get(FALLBACK_LOCALE))
        .copied()
        .unwrap_or(&en::EN);
    lang.months[month as usize - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(translate("summary.title", "fr"), "Summary");
        assert_eq!(translate("table_of_contents", "de"), "Table of Contents");
    }

    #[test]
    fn missing_key_is_bracketed() {
        assert_eq!(translate("missing_key", "en"), "[missing_key]");
        assert_eq!(translate("missing_key", "ru"), "[missing_key]");
    }

    #[test]
    fn russian_dictionary_wins_for_ru() {
        assert_eq!(translate("legal_notice_title", "ru"), "Юридическое уведомление");
        assert_ne!(translate("summary.title", "ru"), translate("summary.title", "en"));
    }

    #[test]
    fn every_russian_key_exists_in_english() {
        for (key, _) in ru::RU.entries {
            assert!(en::EN.get(key).is_some(), "{}", key);
        }
    }

    #[test]
    fn placeholders_fill_in_order() {
        assert_eq!(fill("from *{}* to *{}*", &["a", "b"]), "from *a* to *b*");
        assert_eq!(fill("total {}", &[]), "total {}");
        assert_eq!(fill("none", &["x"]), "none");
        let intro = translate_with("summary.introduction", "en", &["1 Feb", "1 Mar"]);
        assert!(intro.contains("*1 Feb*") && intro.contains("*1 Mar*"));
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1, "en"), "January");
        assert_eq!(month_name(12, "ru"), "Декабрь");
        assert_eq!(month_name(3, "xx"), "March");
        assert_eq!(month_name(0, "en"), "");
        assert_eq!(month_name(13, "en"), "");
    }

    #[test]
    fn locales_are_listed() {
        assert_eq!(available_locales(), vec!["en", "ru"]);
    }
}

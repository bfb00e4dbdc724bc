//! # Report Configuration
//!
//! Everything about a report run that is not user data: token price and
//! currency, locale, where content lives, which fonts to embed. Read from a
//! camelCase JSON file; every field has a default so a partial file works.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::font::FontContext;
use crate::style::FontRoles;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Fiat price of one token, used for every fiat column.
    pub token_price: f64,
    pub currency_symbol: String,
    pub token_symbol: String,
    /// Decimals of the on-chain token amounts.
    pub decimals: u32,
    pub locale: String,
    /// Root directory of the content store (`<root>/<cid>/<path>`).
    pub content_root: Option<PathBuf>,
    /// TrueType fonts to register before layout.
    pub fonts: Vec<FontSpec>,
    /// Families used for body, headings and code.
    pub font_roles: FontRoles,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Replaces the generation timestamp in the page footer.
    pub footer_text: Option<String>,
}

/// A TrueType file registered under a family name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub path: PathBuf,
    #[serde(default)]
    pub bold: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            token_price: 0.002447,
            currency_symbol: "$".to_string(),
            token_symbol: "SAVVA".to_string(),
            decimals: 18,
            locale: "en".to_string(),
            content_root: None,
            fonts: Vec::new(),
            font_roles: FontRoles::default(),
            title: None,
            author: None,
            footer_text: None,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FolioError::parse("config", e))
    }

    /// Pretty JSON of the defaults plus a sample font, for `--example-config`.
    pub fn example_json() -> String {
        let mut sample = Self {
            content_root: Some(PathBuf::from("content")),
            ..Self::default()
        };
        sample.fonts = vec![
            FontSpec {
                family: "DejaVu".to_string(),
                path: PathBuf::from("fonts/DejaVuSans.ttf"),
                bold: false,
            },
            FontSpec {
                family: "DejaVu".to_string(),
                path: PathBuf::from("fonts/DejaVuSans-Bold.ttf"),
                bold: true,
            },
            FontSpec {
                family: "DejaVu Mono".to_string(),
                path: PathBuf::from("fonts/DejaVuSansMono.ttf"),
                bold: false,
            },
        ];
        // standard faces are WinAnsi only; Cyrillic locales need these
        sample.font_roles = FontRoles {
            body: "DejaVu".to_string(),
            sans: "DejaVu".to_string(),
            mono: "DejaVu Mono".to_string(),
        };
        serde_json::to_string_pretty(&sample).unwrap_or_default()
    }

    /// Register every configured font. A font that cannot be read is fatal.
    pub fn load_fonts(&self, fonts: &mut FontContext) -> Result<()> {
        for spec in &self.fonts {
            let data = fs::read(&spec.path).map_err(|e| {
                FolioError::Font(format!(
                    "Cannot read font '{}' from {}: {}",
                    spec.family,
                    spec.path.display(),
                    e
                ))
            })?;
            fonts.registry_mut().register(&spec.family, spec.bold, data)?;
            log::info!("Loaded font '{}' from {}", spec.family, spec.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ReportConfig::from_json(r#"{ "locale": "ru", "tokenPrice": 0.5 }"#).unwrap();
        assert_eq!(config.locale, "ru");
        assert_eq!(config.token_price, 0.5);
        assert_eq!(config.decimals, 18);
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.font_roles.body, "Times");
    }

    #[test]
    fn example_round_trips() {
        let json = ReportConfig::example_json();
        assert!(json.contains("\"tokenPrice\""));
        assert!(json.contains("\"fontRoles\""));
        let config = ReportConfig::from_json(&json).unwrap();
        assert_eq!(config.fonts.len(), 3);
        assert!(config.fonts[1].bold);
    }

    #[test]
    fn example_roles_use_registered_families() {
        let config = ReportConfig::from_json(&ReportConfig::example_json()).unwrap();
        let roles = &config.font_roles;
        for family in [&roles.body, &roles.sans, &roles.mono] {
            assert!(config.fonts.iter().any(|f| &f.family == family), "{}", family);
        }
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = ReportConfig::from_json("{ \"locale\": }").unwrap_err();
        assert!(matches!(err, FolioError::Parse { what: "config", .. }));
    }

    #[test]
    fn missing_font_file_is_fatal() {
        let config = ReportConfig {
            fonts: vec![FontSpec {
                family: "Nope".to_string(),
                path: PathBuf::from("/definitely/not/here.ttf"),
                bold: false,
            }],
            ..ReportConfig::default()
        };
        let err = config.load_fonts(&mut FontContext::new()).unwrap_err();
        assert!(matches!(err, FolioError::Font(_)));
    }
}

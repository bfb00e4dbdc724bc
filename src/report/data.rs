//! # Report Data
//!
//! The records a report is built from and the [`DataSource`] trait that
//! supplies them. [`JsonDataSource`] answers the queries from a JSON fixture
//! (users, history, club memberships, posts) the same way the platform's
//! database would.
//!
//! Token amounts are decimal strings in JSON because they do not fit an
//! `f64` or `u64`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::sum_amounts;
use super::store::ContentStore;
use crate::error::{FolioError, Result};

/// Profile domain preferred for display names.
pub const HOME_DOMAIN: &str = "savva.app";

/// One on-chain event touching the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub contract: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(with = "amount")]
    pub amount: i128,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub display_name: String,
    pub about: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub address: String,
    pub name: String,
    /// Content path of the avatar image.
    pub avatar: Option<String>,
    #[serde(with = "amount")]
    pub staked: i128,
    /// Profile per domain.
    pub profiles: BTreeMap<String, UserProfile>,
}

impl User {
    /// A placeholder for an address the data source does not know.
    pub fn unknown(address: &str) -> Self {
        Self {
            address: address.to_string(),
            ..Self::default()
        }
    }

    /// Display name from the home domain profile, else from any profile.
    pub fn display_name(&self) -> Option<&str> {
        let home = self
            .profiles
            .get(HOME_DOMAIN)
            .map(|p| p.display_name.as_str())
            .filter(|n| !n.is_empty());
        home.or_else(|| {
            self.profiles
                .values()
                .map(|p| p.display_name.as_str())
                .find(|n| !n.is_empty())
        })
    }

    /// Display name, else handle, else the shortened address.
    pub fn best_name(&self) -> String {
        if let Some(name) = self.display_name() {
            return name.to_string();
        }
        if !self.name.is_empty() {
            return self.name.clone();
        }
        short_address(&self.address)
    }
}

/// `0x1234...abcd`. Short inputs are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub domain: String,
    #[serde(with = "amount")]
    pub amount: i128,
    pub current_frame: i64,
    pub til_frame: i64,
}

/// What the user pays one author, over all domains.
#[derive(Debug, Clone, PartialEq)]
pub struct Sponsorship {
    pub author: String,
    pub domains: Vec<DomainRecord>,
    /// The user's weekly amount.
    pub total_amount: i128,
    /// Weekly amount the author gets from all sponsors.
    pub total_from_all: i128,
}

/// One row of the club membership table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMembership {
    pub domain: String,
    pub author: String,
    pub member: String,
    #[serde(with = "amount")]
    pub amount: i128,
    #[serde(default)]
    pub current_frame: i64,
    #[serde(default)]
    pub til_frame: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostLocale {
    pub title: String,
    /// Inline body.
    pub data: Option<String>,
    /// Body file inside the post's content directory.
    pub data_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub savva_cid: String,
    pub author: String,
    pub domain: String,
    /// Content directory identifier.
    pub ipfs: String,
    pub effective_time: DateTime<Utc>,
    /// Path of the thumbnail inside the content directory.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub locales: BTreeMap<String, PostLocale>,
}

impl Post {
    /// Requested locale, then English, then whatever exists.
    pub fn locale(&self, locale: &str) -> Option<&PostLocale> {
        self.locales
            .get(locale)
            .or_else(|| self.locales.get("en"))
            .or_else(|| self.locales.values().next())
    }

    pub fn title(&self, locale: &str) -> &str {
        self.locale(locale).map(|l| l.title.as_str()).unwrap_or("")
    }

    /// Body markdown, inline or fetched from the content directory.
    pub fn content(&self, locale: &str, store: &dyn ContentStore) -> Result<String> {
        let l = self
            .locale(locale)
            .ok_or_else(|| FolioError::Data(format!("post {} has no locales", self.savva_cid)))?;
        if let Some(data) = l.data.as_deref().filter(|d| !d.is_empty()) {
            return Ok(data.to_string());
        }
        let path = l
            .data_path
            .as_deref()
            .ok_or_else(|| FolioError::Data(format!("post {} has no content", self.savva_cid)))?;
        let bytes = store
            .fetch(&self.content_path(path))
            .ok_or_else(|| FolioError::Content(self.content_path(path)))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// `<ipfs>/<path>` with exactly one separator.
    pub fn content_path(&self, path: &str) -> String {
        format!("{}/{}", self.ipfs, path.trim().trim_start_matches('/'))
    }
}

/// Where report data comes from.
pub trait DataSource {
    /// Events sent or received by `address` in `[from, to)`, newest first.
    fn history(&self, address: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<HistoryRecord>>;
    fn user(&self, address: &str) -> Result<User>;
    /// Authors `address` sponsors, largest total first.
    fn sponsored_by(&self, address: &str) -> Result<Vec<Sponsorship>>;
    /// Posts by `author` in `[from, to)` on domains where `sponsor` is a
    /// club member.
    fn posts_by_author(
        &self,
        author: &str,
        sponsor: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Post>>;
}

/// Data source backed by one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonDataSource {
    pub users: Vec<User>,
    pub history: Vec<HistoryRecord>,
    pub clubs: Vec<ClubMembership>,
    pub posts: Vec<Post>,
}

impl JsonDataSource {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FolioError::parse("data", e))
    }

    fn is_member(&self, sponsor: &str, author: &str, domain: &str) -> bool {
        self.clubs.iter().any(|m| {
            m.domain == domain && same_address(&m.author, author) && same_address(&m.member, sponsor)
        })
    }
}

fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl DataSource for JsonDataSource {
    fn history(&self, address: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<HistoryRecord>> {
        let mut records: Vec<HistoryRecord> = self
            .history
            .iter()
            .filter(|h| same_address(&h.from, address) || same_address(&h.to, address))
            .filter(|h| h.timestamp >= from && h.timestamp < to)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        log::debug!("{} history records for {}", records.len(), address);
        Ok(records)
    }

    fn user(&self, address: &str) -> Result<User> {
        self.users
            .iter()
            .find(|u| same_address(&u.address, address))
            .cloned()
            .ok_or_else(|| FolioError::Data(format!("unknown user {}", address)))
    }

    fn sponsored_by(&self, address: &str) -> Result<Vec<Sponsorship>> {
        let mut by_author: BTreeMap<String, Sponsorship> = BTreeMap::new();
        for m in self.clubs.iter().filter(|m| same_address(&m.member, address)) {
            let entry = by_author
                .entry(m.author.to_ascii_lowercase())
                .or_insert_with(|| Sponsorship {
                    author: m.author.clone(),
                    domains: Vec::new(),
                    total_amount: 0,
                    total_from_all: 0,
                });
            entry.total_amount = entry
                .total_amount
                .checked_add(m.amount)
                .ok_or_else(|| FolioError::Data(format!("club total overflows for {}", m.author)))?;
            entry.domains.push(DomainRecord {
                domain: m.domain.clone(),
                amount: m.amount,
                current_frame: m.current_frame,
                til_frame: m.til_frame,
            });
        }

        for sponsorship in by_author.values_mut() {
            sponsorship.total_from_all = sum_amounts(
                self.clubs
                    .iter()
                    .filter(|m| same_address(&m.author, &sponsorship.author))
                    .map(|m| m.amount),
            )?;
        }

        let mut list: Vec<Sponsorship> = by_author.into_values().collect();
        list.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
        Ok(list)
    }

    fn posts_by_author(
        &self,
        author: &str,
        sponsor: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| same_address(&p.author, author))
            .filter(|p| p.effective_time >= from && p.effective_time < to)
            .filter(|p| self.is_member(sponsor, author, &p.domain))
            .cloned()
            .collect())
    }
}

/// Serde adaptor for big integer amounts: decimal strings or plain JSON
/// integers in, decimal strings out.
mod amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s
                .trim()
                .parse::<i128>()
                .map_err(|_| de::Error::custom(format!("invalid amount '{}'", s))),
            Raw::Int(n) => Ok(n as i128),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::store::MemoryStore;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "users": [
            { "address": "0xAAAA000000000000000000000000000000000001", "name": "alice",
              "profiles": { "other.net": { "displayName": "Alice Elsewhere" },
                            "savva.app": { "displayName": "Alice" } } },
            { "address": "0xBBBB000000000000000000000000000000000002", "name": "bob" }
        ],
        "history": [
            { "contract": "token", "type": "transfer", "from": "0xme", "to": "0xAAAA",
              "amount": "1000000000000000000000", "timestamp": "2025-02-03T10:00:00Z" },
            { "contract": "token", "type": "transfer", "from": "0xAAAA", "to": "0xME",
              "amount": 5, "timestamp": "2025-02-05T10:00:00Z" },
            { "contract": "token", "type": "transfer", "from": "0xme", "to": "0xAAAA",
              "amount": "1", "timestamp": "2025-03-01T00:00:00Z" }
        ],
        "clubs": [
            { "domain": "savva.app", "author": "0xA", "member": "0xme", "amount": "1000" },
            { "domain": "other.net", "author": "0xA", "member": "0xme", "amount": "500" },
            { "domain": "savva.app", "author": "0xA", "member": "0xsomeone", "amount": "8500" },
            { "domain": "savva.app", "author": "0xB", "member": "0xme", "amount": "3000" }
        ],
        "posts": [
            { "savvaCid": "p1", "author": "0xA", "domain": "savva.app", "ipfs": "cid1",
              "effectiveTime": "2025-02-10T08:00:00Z",
              "locales": { "en": { "title": "Hello", "dataPath": "/en/body.md" },
                           "ru": { "title": "Привет", "data": "Тело" } } },
            { "savvaCid": "p2", "author": "0xA", "domain": "private.net", "ipfs": "cid2",
              "effectiveTime": "2025-02-11T08:00:00Z", "locales": {} }
        ]
    }"#;

    fn feb() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn history_is_filtered_to_the_period_newest_first() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        let (from, to) = feb();
        let history = source.history("0xME", from, to).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount, 5);
        assert_eq!(history[1].amount, 1_000_000_000_000_000_000_000);
    }

    #[test]
    fn sponsorships_are_grouped_and_sorted() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        let list = source.sponsored_by("0xme").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].author, "0xB");
        assert_eq!(list[0].total_amount, 3000);
        assert_eq!(list[1].total_amount, 1500);
        assert_eq!(list[1].domains.len(), 2);
        assert_eq!(list[1].total_from_all, 10_000);
    }

    #[test]
    fn overflowing_club_totals_are_a_data_error() {
        let club = |member: &str, amount: i128| ClubMembership {
            domain: "savva.app".to_string(),
            author: "0xA".to_string(),
            member: member.to_string(),
            amount,
            current_frame: 0,
            til_frame: 0,
        };
        let mine = JsonDataSource {
            clubs: vec![club("0xme", i128::MAX), club("0xme", 1)],
            ..JsonDataSource::default()
        };
        assert!(matches!(mine.sponsored_by("0xme"), Err(FolioError::Data(_))));

        let everyone = JsonDataSource {
            clubs: vec![club("0xme", 1), club("0xother", i128::MAX)],
            ..JsonDataSource::default()
        };
        assert!(matches!(everyone.sponsored_by("0xme"), Err(FolioError::Data(_))));
    }

    #[test]
    fn posts_need_a_membership_on_their_domain() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        let (from, to) = feb();
        let posts = source.posts_by_author("0xA", "0xme", from, to).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].savva_cid, "p1");
    }

    #[test]
    fn unknown_user_is_a_data_error() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        assert!(matches!(source.user("0xnobody"), Err(FolioError::Data(_))));
    }

    #[test]
    fn display_name_prefers_home_domain() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        let alice = source.user("0xaaaa000000000000000000000000000000000001").unwrap();
        assert_eq!(alice.display_name(), Some("Alice"));
        assert_eq!(alice.best_name(), "Alice");
        let bob = source.user("0xBBBB000000000000000000000000000000000002").unwrap();
        assert_eq!(bob.display_name(), None);
        assert_eq!(bob.best_name(), "bob");
        assert_eq!(User::unknown("0x1234567890abcdef").best_name(), "0x1234...cdef");
    }

    #[test]
    fn post_locale_fallback_and_content() {
        let source = JsonDataSource::from_json(FIXTURE).unwrap();
        let post = &source.posts[0];
        assert_eq!(post.title("ru"), "Привет");
        assert_eq!(post.title("fr"), "Hello");

        let mut store = MemoryStore::new();
        assert!(matches!(post.content("en", &store), Err(FolioError::Content(_))));
        store.insert("cid1/en/body.md", b"# Body".to_vec());
        assert_eq!(post.content("en", &store).unwrap(), "# Body");
        assert_eq!(post.content("ru", &store).unwrap(), "Тело");
        assert!(source.posts[1].content("en", &store).is_err());
    }

    #[test]
    fn bad_amount_is_rejected() {
        let json = r#"{ "history": [ { "contract": "token", "type": "transfer", "from": "a",
            "to": "b", "amount": "12x", "timestamp": "2025-02-03T10:00:00Z" } ] }"#;
        assert!(matches!(JsonDataSource::from_json(json), Err(FolioError::Parse { .. })));
    }

    #[test]
    fn short_addresses() {
        assert_eq!(
            short_address("0xDf691828859e3Cb1e31E6D2F8A9b04F3B91A717f"),
            "0xDf69...717f"
        );
        assert_eq!(short_address("0x12"), "0x12");
    }
}

//! # Monthly Report
//!
//! Composes the user-facing report out of the layout primitives:
//!
//! ```text
//! cover + blank back page
//! Legal Notice
//! Summary            per-category totals for the month
//! My Authors         who the user sponsors and how much
//! My Sponsored Users the same authors, with their share of all support
//! Posts of My Authors up to 5 authors, 3 posts each
//! Table of Contents
//! ```
//!
//! A failure inside one section (missing history, unknown author, a post
//! whose body cannot be fetched) skips the smallest unit that failed and is
//! logged. Only setup problems (bad month, unreadable font) abort the report.

pub mod counters;
pub mod data;
pub mod format;
pub mod store;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::ReportConfig;
use crate::error::{FolioError, Result};
use crate::font::FontContext;
use crate::i18n;
use crate::image_loader::{LoadedImage, NoImages};
use crate::layout::table::MD_MARKER;
use crate::layout::{Document, Table};
use crate::model::{Metadata, Rect};
use crate::style::*;

use counters::Counters;
use data::{short_address, DataSource, HistoryRecord, Post, Sponsorship, User};
use format::{format_fiat, format_value, handle, sum_amounts, value_to_float};
use store::{fetch_image, ContentStore, StoreImages};

pub const AVATAR_SIZE: f64 = 100.0;
pub const MAX_AUTHORS: usize = 5;
pub const MAX_POSTS_PER_AUTHOR: usize = 3;
const THUMBNAIL_WIDTH: f64 = 160.0;
const THUMBNAIL_HEIGHT: f64 = 100.0;

const DATE_FORMAT: &str = "%d %b %y %H:%M UTC";

/// Who and which month.
#[derive(Debug, Clone)]
pub struct MonthlyRequest {
    pub address: String,
    pub year: i32,
    pub month: u32,
    /// Defaults to now. Fixed in tests.
    pub generated_at: Option<DateTime<Utc>>,
}

/// `[first of month, first of next month)` in UTC.
pub fn report_period(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(FolioError::InvalidMonth(month));
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = |y: i32, m: u32| {
        Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| FolioError::Data(format!("year {} out of range", y)))
    };
    Ok((start(year, month)?, start(next_year, next_month)?))
}

/// Build the monthly report and serialize it to PDF.
pub fn build_monthly(
    request: &MonthlyRequest,
    data: &dyn DataSource,
    store: &dyn ContentStore,
    config: &ReportConfig,
) -> Result<Vec<u8>> {
    build_monthly_document(request, data, store, config)?.finish()
}

/// Refuse a locale whose strings the body or sans face cannot show, so a
/// report never goes out with `?` in place of letters.
fn check_locale_fonts(fonts: &FontContext, roles: &FontRoles, locale: &str) -> Result<()> {
    let strings = i18n::locale_strings(locale);
    for family in [&roles.body, &roles.sans] {
        for bold in [false, true] {
            let face = fonts.resolve(family, bold);
            let missing = strings
                .iter()
                .flat_map(|s| s.chars())
                .find(|ch| !ch.is_control() && !face.encodes(*ch));
            if let Some(ch) = missing {
                log::error!("Font '{}' has no '{}' needed by locale '{}'", family, ch, locale);
                return Err(FolioError::Font(format!(
                    "'{}' cannot show '{}' used by locale '{}'; register a TrueType face in \"fonts\" and name it in \"fontRoles\"",
                    family, ch, locale
                )));
            }
        }
    }
    Ok(())
}

/// Build the monthly report and return the laid-out document.
pub fn build_monthly_document(
    request: &MonthlyRequest,
    data: &dyn DataSource,
    store: &dyn ContentStore,
    config: &ReportConfig,
) -> Result<Document> {
    let (from, to) = report_period(request.year, request.month)?;

    let mut fonts = FontContext::new();
    config.load_fonts(&mut fonts)?;
    check_locale_fonts(&fonts, &config.font_roles, &config.locale)?;
    let mut doc = Document::new(fonts);
    doc.set_font_roles(config.font_roles.clone());
    doc.set_generated_at(request.generated_at.unwrap_or_else(Utc::now));
    if let Some(footer) = &config.footer_text {
        doc.set_footer_text(footer.clone());
    }
    doc.set_metadata(Metadata {
        title: Some(format!(
            "{} {} {}",
            i18n::translate("monthly_report", &config.locale),
            i18n::month_name(request.month, &config.locale),
            request.year
        )),
        author: config.author.clone(),
        subject: Some(request.address.clone()),
        creator: None,
    });

    log::info!(
        "Building {}-{:02} report for {} ({})",
        request.year,
        request.month,
        request.address,
        config.locale
    );

    let mut report = MonthlyReport {
        doc,
        data,
        store,
        config,
        address: request.address.clone(),
        from,
        to,
        history: None,
        sponsored: None,
    };

    report.cover_page(request.year, request.month);
    report.section("legal notice", MonthlyReport::legal_section);
    report.section("summary", MonthlyReport::summary_section);
    report.section("my authors", MonthlyReport::my_authors_section);
    report.section("sponsored", MonthlyReport::sponsored_section);
    report.section("authors", MonthlyReport::authors_section);

    let toc_title = report.t("table_of_contents");
    report.doc.write_table_of_contents(&toc_title);
    log::info!("Report has {} pages", report.doc.page_number());
    Ok(report.doc)
}

struct MonthlyReport<'a> {
    doc: Document,
    data: &'a dyn DataSource,
    store: &'a dyn ContentStore,
    config: &'a ReportConfig,
    address: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    history: Option<Vec<HistoryRecord>>,
    sponsored: Option<Vec<Sponsorship>>,
}

impl MonthlyReport<'_> {
    fn t(&self, key: &str) -> String {
        i18n::translate(key, &self.config.locale)
    }

    fn section(&mut self, name: &str, build: fn(&mut Self) -> Result<()>) {
        if let Err(e) = build(self) {
            log::error!("Section '{}' incomplete: {}", name, e);
        }
    }

    fn history(&mut self) -> Result<Vec<HistoryRecord>> {
        if self.history.is_none() {
            self.history = Some(self.data.history(&self.address, self.from, self.to)?);
        }
        Ok(self.history.clone().unwrap_or_default())
    }

    fn sponsored(&mut self) -> Result<Vec<Sponsorship>> {
        if self.sponsored.is_none() {
            self.sponsored = Some(self.data.sponsored_by(&self.address)?);
        }
        Ok(self.sponsored.clone().unwrap_or_default())
    }

    fn token(&self, amount: i128) -> String {
        format_value(amount, self.config.decimals)
    }

    fn fiat(&self, amount: i128) -> String {
        let value = value_to_float(amount, self.config.decimals) * self.config.token_price;
        format_fiat(value, &self.config.currency_symbol)
    }

    /// `4,000.00 SAVVA ($9.79)`
    fn token_and_fiat(&self, amount: i128) -> String {
        format!(
            "{} {} ({})",
            self.token(amount),
            self.config.token_symbol,
            self.fiat(amount)
        )
    }

    fn avatar(&self, user: &User) -> Option<LoadedImage> {
        let path = user.avatar.as_deref()?;
        match fetch_image(self.store, path) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("No avatar for {}: {}", user.address, e);
                None
            }
        }
    }

    fn centered(&mut self, text: &str, center_x: f64, y: f64, style: Style) {
        self.doc.save_style();
        self.doc.set_style(style);
        self.doc.text_centered(text, center_x, y);
        self.doc.restore_style();
    }

    // ── Cover ───────────────────────────────────────────────────────

    fn cover_page(&mut self, year: i32, month: u32) {
        self.doc.add_plain_page();
        let user = match self.data.user(&self.address) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("Cover without profile: {}", e);
                User::unknown(&self.address)
            }
        };
        let (width, height) = (self.doc.geometry().width, self.doc.geometry().height);
        let sans = self.doc.font_roles().sans.clone();
        let mono = self.doc.font_roles().mono.clone();

        if let Some(avatar) = self.avatar(&user) {
            self.doc.image_cover(&avatar, Rect::new(60.0, 155.0, 475.0, 475.0));
        }

        let heading = Style::new(&sans, 60.0).with_bold(true).with_color(ACCENT);
        self.centered(&year.to_string(), width - 120.0, 40.0, heading.clone());
        let month_name = i18n::month_name(month, &self.config.locale).to_lowercase();
        self.centered(&month_name, width - 120.0, 110.0, heading.with_font(&sans, 30.0));

        let center = width / 2.0;
        if !user.name.is_empty() {
            let name_style = Style::new(&sans, 40.0).with_bold(true);
            self.centered(&user.name.to_uppercase(), center, height - 190.0, name_style);
        }
        let address_style = Style::new(&sans, 20.0).with_bold(true);
        self.centered(&short_address(&user.address), center, height - 130.0, address_style);

        let generated = self.doc.generated_at().format(DATE_FORMAT).to_string();
        let line = i18n::translate_with("generated_on", &self.config.locale, &[&generated]);
        self.centered(&line, center, height - 90.0, Style::new(&mono, 10.0));

        // back of the cover
        self.doc.add_plain_page();
    }

    // ── Sections ────────────────────────────────────────────────────

    fn legal_section(&mut self) -> Result<()> {
        let title = self.t("legal_notice_title");
        self.doc.open_section(&title);
        let notice = self.t("legal_notice");
        self.doc.markdown(&notice, &NoImages)?;
        Ok(())
    }

    fn summary_section(&mut self) -> Result<()> {
        let history = self.history()?;
        let title = self.t("summary.title");
        self.doc.open_section(&title);

        let from = self.from.format(DATE_FORMAT).to_string();
        let to = self.to.format(DATE_FORMAT).to_string();
        let intro = i18n::translate_with("summary.introduction", &self.config.locale, &[&from, &to]);
        self.doc.markdown(&intro, &NoImages)?;
        self.doc.new_line();

        let counters = Counters::from_history(&history, &self.address)?;
        let mut table = self.money_table(&self.t("description"));
        for (key, value) in counters.rows() {
            table.add_row([self.t(key), self.token(value), self.fiat(value)]);
        }
        self.doc.write_table(&table, &NoImages);
        Ok(())
    }

    fn my_authors_section(&mut self) -> Result<()> {
        let sponsored = self.sponsored()?;
        if sponsored.is_empty() {
            log::info!("No sponsorships, skipping My Authors");
            return Ok(());
        }
        let total = sum_amounts(sponsored.iter().map(|s| s.total_amount))?;

        let title = self.t("my_authors.title");
        self.doc.open_section(&title);
        let intro = i18n::translate_with(
            "my_authors.introduction",
            &self.config.locale,
            &[&self.token_and_fiat(total)],
        );
        self.doc.markdown(&intro, &NoImages)?;
        self.doc.new_line();

        let mut rows = Vec::new();
        for s in &sponsored {
            let user = match self.data.user(&s.author) {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("Skipping author {}: {}", s.author, e);
                    continue;
                }
            };
            let mut info = String::from(MD_MARKER);
            if !user.name.is_empty() {
                info.push_str(&format!("*{}*\n", handle(&user.name)));
            }
            if let Some(name) = user.display_name() {
                info.push_str(name);
                info.push('\n');
            }
            info.push_str(&format!(
                "{}:\n{} {}\n{}\n",
                self.t("total"),
                self.token(s.total_amount),
                self.config.token_symbol,
                self.fiat(s.total_amount)
            ));
            if total > 0 {
                info.push_str(&format!("{}: {}\n", self.t("my_share"), percent(s.total_amount, total)));
            }
            info.push_str(&short_address(&user.address));
            rows.push((info, s.total_amount, self.avatar(&user)));
        }

        let table = self.sponsorship_table(rows, None);
        self.doc.write_table(&table, &NoImages);
        Ok(())
    }

    fn sponsored_section(&mut self) -> Result<()> {
        let sponsored = self.sponsored()?;
        if sponsored.is_empty() {
            log::info!("No sponsorships, skipping Sponsored");
            return Ok(());
        }
        let total = sum_amounts(sponsored.iter().map(|s| s.total_amount))?;

        let title = self.t("sponsored.title");
        self.doc.open_section(&title);
        let intro = i18n::translate_with(
            "sponsored.introduction",
            &self.config.locale,
            &[&self.token_and_fiat(total)],
        );
        self.doc.markdown(&intro, &NoImages)?;
        self.doc.new_line();

        let mut rows = Vec::new();
        for s in &sponsored {
            let user = match self.data.user(&s.author) {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("Skipping author {}: {}", s.author, e);
                    continue;
                }
            };
            let mut info = String::from(MD_MARKER);
            if !user.name.is_empty() {
                info.push_str(&format!("## {}\n", handle(&user.name)));
            }
            if let Some(name) = user.display_name() {
                info.push_str(name);
                info.push('\n');
            }
            info.push_str(&short_address(&user.address));
            info.push('\n');
            info.push_str(&format!(
                "{}: {} {}\n",
                self.t("total"),
                self.token(s.total_from_all),
                self.fiat(s.total_from_all)
            ));
            if s.total_from_all != 0 {
                info.push_str(&format!(
                    "{}: {}\n",
                    self.t("my_share"),
                    percent(s.total_amount, s.total_from_all)
                ));
            }
            rows.push((info, s.total_amount, self.avatar(&user)));
        }

        let table = self.sponsorship_table(rows, Some(12.0));
        self.doc.write_table(&table, &NoImages);
        Ok(())
    }

    fn authors_section(&mut self) -> Result<()> {
        let sponsored = self.sponsored()?;
        let mut authors: Vec<(User, Vec<Post>)> = Vec::new();
        for s in &sponsored {
            if authors.len() == MAX_AUTHORS {
                break;
            }
            let user = match self.data.user(&s.author) {
                Ok(user) => user,
                Err(e) => {
                    log::error!("Skipping author {}: {}", s.author, e);
                    continue;
                }
            };
            let mut posts = match self.data.posts_by_author(&s.author, &self.address, self.from, self.to) {
                Ok(posts) => posts,
                Err(e) => {
                    log::error!("No posts for {}: {}", s.author, e);
                    continue;
                }
            };
            if posts.is_empty() {
                continue;
            }
            posts.truncate(MAX_POSTS_PER_AUTHOR);
            authors.push((user, posts));
        }
        if authors.is_empty() {
            log::info!("No posts in the period, skipping Authors");
            return Ok(());
        }

        let title = self.t("authors.title");
        self.doc.open_section(&title);
        let intro = self.t("authors.introduction");
        self.doc.markdown(&intro, &NoImages)?;
        self.doc.new_line();

        for (user, posts) in &authors {
            self.doc.ensure_vertical_space(230.0);
            self.doc.open_sub_section(&user.best_name());
            for post in posts {
                if let Err(e) = self.write_post(user, post) {
                    log::error!("Skipping post {}: {}", post.savva_cid, e);
                }
            }
        }
        Ok(())
    }

    /// Title, thumbnail with posting info beside it, then the body.
    fn write_post(&mut self, author: &User, post: &Post) -> Result<()> {
        let locale = self.config.locale.clone();
        self.doc.ensure_vertical_space(200.0);
        self.doc.open_sub_sub_section(post.title(&locale));

        let (x, y) = (self.doc.content_left(), self.doc.y());
        let thumbnail = match &post.thumbnail {
            Some(path) => fetch_image(self.store, &post.content_path(path))
                .map_err(|e| log::warn!("No thumbnail for {}: {}", post.savva_cid, e))
                .ok(),
            None => self.avatar(author),
        };
        if let Some(image) = thumbnail {
            self.doc
                .image_cover(&image, Rect::new(x, y, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT));
        }

        let info = format!(
            "*{}*: {}\n*{}*: {}\n",
            self.t("posted"),
            post.effective_time.format(DATE_FORMAT),
            self.t("domain"),
            post.domain
        );
        let info_x = x + THUMBNAIL_WIDTH + 10.0;
        let info_box = Rect::new(info_x, y, self.doc.content_right() - info_x, THUMBNAIL_HEIGHT);
        self.doc.markdown_in(&info, info_box, false, &NoImages)?;

        self.doc.set_xy(x, y + THUMBNAIL_HEIGHT + 40.0);
        let content = post.content(&locale, self.store)?;
        self.doc.new_line();
        let images = StoreImages::new(self.store, &post.ipfs);
        self.doc.markdown(&content, &images)?;
        Ok(())
    }

    // ── Tables ──────────────────────────────────────────────────────

    /// Description column plus right-aligned token and fiat columns.
    fn money_table(&self, first_header: &str) -> Table {
        let mut table = Table::new().with_font_family(&self.doc.font_roles().sans);
        table.set_header([
            first_header.to_string(),
            self.config.token_symbol.clone(),
            self.config.currency_symbol.clone(),
        ]);
        table.set_column_width(1, 100.0);
        table.set_column_width(2, 100.0);
        for column in [1, 2] {
            if let Some(style) = table.column_style_mut(column) {
                style.align = TextAlign::Right;
            }
        }
        table
    }

    /// One row per author: avatar and markdown info, then the amount.
    fn sponsorship_table(&self, rows: Vec<(String, i128, Option<LoadedImage>)>, info_size: Option<f64>) -> Table {
        let mut table = self.money_table(&self.t("account"));
        if let Some(style) = table.column_style_mut(0) {
            style.min_height = AVATAR_SIZE;
            style.padding.left = AVATAR_SIZE + 10.0;
            if let Some(size) = info_size {
                style.font_size = size;
            }
        }

        let mut avatars = Vec::new();
        for (info, amount, avatar) in rows {
            if table.add_row([info, self.token(amount), self.fiat(amount)]) {
                avatars.push(avatar);
            }
        }

        table.on_before_draw_cell(move |doc, cell| {
            if cell.column != 0 {
                return;
            }
            if let Some(Some(avatar)) = avatars.get(cell.row) {
                let rect = Rect::new(
                    cell.rect.x + 5.0,
                    cell.rect.y + cell.style.padding.top,
                    AVATAR_SIZE,
                    AVATAR_SIZE,
                );
                doc.image_cover(avatar, rect);
            }
        });
        table
    }
}

/// `part / whole` as a percentage with two decimals, truncated.
fn percent(part: i128, whole: i128) -> String {
    if whole == 0 {
        return "0.00%".to_string();
    }
    let basis_points = part.saturating_mul(10_000) / whole;
    format!("{}.{:02}%", basis_points / 100, (basis_points % 100).abs())
}

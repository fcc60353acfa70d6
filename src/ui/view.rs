//! `render(app) -> View`: what the current screen shows, independent of
//! how the terminal draws it.

use std::time::Instant;

use crate::app::App;
use crate::data::query;
use crate::nav::{ContentKind, Screen};
use crate::video::VideoEmbed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Emergency,
    Library,
    /// Sub-category rows.
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetronomePanel {
    pub label: String,
    pub button: String,
    pub running: bool,
    pub flashing: bool,
    pub bpm: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcedureView {
    pub protocol_label: String,
    pub title: String,
    pub instruction_html: String,
    pub metronome: Option<MetronomePanel>,
    pub video: Option<VideoEmbed>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryEntry {
    pub title: String,
    pub description_html: String,
    pub video: Option<VideoEmbed>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Loading { message: String },
    Categories { title: String, items: Vec<MenuEntry> },
    SubCategories { title: String, items: Vec<MenuEntry> },
    Procedure(ProcedureView),
    Library { title: String, items: Vec<LibraryEntry> },
}

/// Button text for a category: underscores become spaces, upper-cased,
/// library categories prefixed with the localized library label.
pub fn category_label(category: &str, library_label: &str) -> String {
    let label = category.replace('_', " ").to_uppercase();
    if query::is_library(category) {
        format!("📚 {library_label}: {label}")
    } else {
        format!("⚠ {label}")
    }
}

/// Heading of the sub-category list. Only the first underscore is
/// replaced.
pub fn sub_category_title(category: &str, choose_label: &str) -> String {
    format!("{}: {choose_label}", category.replacen('_', " ", 1))
}

pub fn render(app: &App, now: Instant) -> View {
    let labels = &app.session.labels;
    let lang = app.session.language.as_str();

    if app.loading {
        return View::Loading {
            message: labels.loading.clone(),
        };
    }

    match app.nav.screen() {
        Screen::Categories => View::Categories {
            title: labels.title_cat.clone(),
            items: app
                .categories()
                .into_iter()
                .map(|category| MenuEntry {
                    label: category_label(category, &labels.library),
                    kind: if query::is_library(category) {
                        EntryKind::Library
                    } else {
                        EntryKind::Emergency
                    },
                })
                .collect(),
        },
        Screen::SubCategories => View::SubCategories {
            title: sub_category_title(app.nav.current_category().unwrap_or_default(), &labels.choose),
            items: app
                .sub_categories()
                .into_iter()
                .map(|sub| MenuEntry {
                    label: sub.to_string(),
                    kind: EntryKind::Plain,
                })
                .collect(),
        },
        Screen::Content(ContentKind::Procedure) => {
            let category = app.nav.current_category().unwrap_or_default();
            let sub = app.nav.current_sub_category().unwrap_or_default();
            let record = query::find_record(&app.dataset, lang, category, sub);
            let metronome = app.metronome_available().then(|| MetronomePanel {
                label: labels.metronome.clone(),
                button: if app.metronome.is_running() {
                    labels.metronome_stop.clone()
                } else {
                    labels.btn_metronome.clone()
                },
                running: app.metronome.is_running(),
                flashing: app.metronome.is_flashing(now),
                bpm: app.metronome.bpm(),
            });
            View::Procedure(ProcedureView {
                protocol_label: labels.protocol.clone(),
                title: sub.to_string(),
                instruction_html: record.map(|r| r.instruction_html.clone()).unwrap_or_default(),
                metronome,
                video: record.and_then(|r| VideoEmbed::from_url(r.video_url.as_deref())),
            })
        }
        Screen::Content(ContentKind::Library) => {
            let category = app.nav.current_category().unwrap_or_default();
            View::Library {
                title: labels.library.clone(),
                items: query::list_library_items(&app.dataset, lang, category)
                    .into_iter()
                    .map(|record| LibraryEntry {
                        title: record.sub_category.clone(),
                        description_html: record.instruction_html.clone(),
                        video: VideoEmbed::from_url(record.video_url.as_deref()),
                    })
                    .collect(),
            }
        }
    }
}

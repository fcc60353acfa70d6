//! Terminal first-aid guide: procedures by language and category, with
//! spoken instructions, a CPR metronome and location lookup.

rust_i18n::i18n!("locales", fallback = "pt");

pub mod access_log;
pub mod app;
pub mod config;
pub mod data;
pub mod device;
pub mod event;
pub mod labels;
pub mod location;
pub mod logging;
pub mod markup;
pub mod metronome;
pub mod narration;
pub mod nav;
pub mod net;
pub mod session;
pub mod ui;
pub mod video;

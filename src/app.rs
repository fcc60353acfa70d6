use std::sync::mpsc::Sender;
use std::time::Instant;

use crate::access_log::{AccessEntry, AccessLogger};
use crate::config::Config;
use crate::data::DatasetError;
use crate::data::fetch::{self, DatasetSource};
use crate::data::query;
use crate::data::store::Dataset;
use crate::device::DeviceClass;
use crate::event::AppEvent;
use crate::labels::BUILTIN_LANGUAGES;
use crate::location::{LocationReport, LocationService};
use crate::metronome::{Metronome, PulseSink};
use crate::narration::Narrator;
use crate::narration::engine::SpeechEngine;
use crate::nav::{ContentKind, Navigator, Screen};
use crate::session::Session;
use crate::ui::theme::Theme;

/// Module id logged when an address is resolved.
const LOCATION_LOG_MODULE: (&str, &str) = ("BOTAO", "LOCALIZACAO_DETALHADA");

/// Platform facilities the app drives, chosen by the caller.
pub struct Services {
    pub engine: Box<dyn SpeechEngine>,
    pub sink: Box<dyn PulseSink>,
    pub device: DeviceClass,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub dataset: Dataset,
    pub session: Session,
    pub nav: Navigator,
    pub narrator: Narrator<Box<dyn SpeechEngine>>,
    pub metronome: Metronome<Box<dyn PulseSink>>,
    pub location: LocationService,
    access_log: AccessLogger,
    pub loading: bool,
    pub load_error: Option<String>,
    /// Cursor on the category or sub-category list.
    pub selected: usize,
    cursor_stack: Vec<usize>,
    /// First visible line of the content screen.
    pub scroll: u16,
    /// Largest useful `scroll` for the last rendered content area.
    scroll_limit: u16,
    /// Open language picker and its cursor.
    pub language_picker: Option<usize>,
    pub should_quit: bool,
    source: Option<DatasetSource>,
    tx: Sender<AppEvent>,
}

impl App {
    pub fn new(config: Config, theme: Theme, services: Services, tx: Sender<AppEvent>) -> Self {
        let session = Session::new(&config.language, services.device);
        let location = LocationService::new(
            config.position_source(),
            config.geocode_url.clone(),
            config.location_timeout(),
        );
        let access_log = AccessLogger::new(config.endpoint_url.clone(), config.access_log_enabled);
        let narrator = Narrator::new(services.engine, config.speech_rate);
        let metronome = Metronome::new(services.sink, config.metronome_bpm);

        Self {
            config,
            theme,
            dataset: Dataset::empty(),
            session,
            nav: Navigator::new(),
            narrator,
            metronome,
            location,
            access_log,
            loading: false,
            load_error: None,
            selected: 0,
            cursor_stack: Vec::new(),
            scroll: 0,
            scroll_limit: 0,
            language_picker: None,
            should_quit: false,
            source: None,
            tx,
        }
    }

    /// Kick off the dataset fetch and the quiet startup position fix.
    pub fn start(&mut self, source: DatasetSource) {
        self.location.startup_fix(&self.tx);
        self.source = Some(source);
        self.reload();
    }

    pub fn reload(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.loading = true;
        self.load_error = None;
        fetch::spawn_load(source, self.tx.clone());
    }

    pub fn on_dataset(&mut self, result: Result<Dataset, DatasetError>, now: Instant) {
        self.loading = false;
        match result {
            Ok(dataset) => {
                tracing::info!(
                    records = dataset.len(),
                    loaded_at = %dataset.loaded_at.format("%Y-%m-%d %H:%M:%S"),
                    "dataset ready"
                );
                self.dataset = dataset;
                self.load_error = None;
                let lang = self.session.language.clone();
                self.change_language(&lang, true, now);
            }
            Err(err) => {
                tracing::error!(error = %err, "dataset unavailable");
                self.load_error = Some(err.to_string());
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.load_error = None;
    }

    pub fn categories(&self) -> Vec<&str> {
        query::list_categories(&self.dataset, &self.session.language)
    }

    pub fn sub_categories(&self) -> Vec<&str> {
        match self.nav.current_category() {
            Some(category) => {
                query::list_sub_categories(&self.dataset, &self.session.language, category)
            }
            None => Vec::new(),
        }
    }

    /// Languages offered by the picker: the built-in set plus any other
    /// code the dataset carries.
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = BUILTIN_LANGUAGES.iter().map(|l| l.to_string()).collect();
        for lang in query::list_languages(&self.dataset) {
            if !langs.iter().any(|l| l == lang) {
                langs.push(lang.to_string());
            }
        }
        langs
    }

    fn menu_len(&self) -> usize {
        match self.nav.screen() {
            Screen::Categories => self.categories().len(),
            Screen::SubCategories => self.sub_categories().len(),
            Screen::Content(_) => 0,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.menu_len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.menu_len();
        if len > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll < self.scroll_limit {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Record how far the visible content can scroll; called after each
    /// draw since the limit depends on the terminal size.
    pub fn set_scroll_limit(&mut self, limit: u16) {
        self.scroll_limit = limit;
        self.scroll = self.scroll.min(limit);
    }

    fn reset_scroll(&mut self) {
        self.scroll = 0;
        self.scroll_limit = 0;
    }

    /// Open whatever the cursor points at.
    pub fn activate(&mut self, now: Instant) {
        match self.nav.screen() {
            Screen::Categories => {
                if let Some(category) = self.categories().get(self.selected).map(|c| c.to_string()) {
                    self.select_category(&category);
                }
            }
            Screen::SubCategories => {
                if let Some(sub) = self.sub_categories().get(self.selected).map(|s| s.to_string()) {
                    self.select_sub_category(&sub, now);
                }
            }
            Screen::Content(_) => {}
        }
    }

    pub fn select_category(&mut self, category: &str) {
        let library = query::is_library(category);
        tracing::debug!(category, library, "category selected");
        self.nav.select_category(category, library);
        self.enter();
    }

    /// Open a procedure: log the access and read it aloud. Returns false
    /// when no record matches, leaving the screen unchanged.
    pub fn select_sub_category(&mut self, sub_category: &str, now: Instant) -> bool {
        let Some(category) = self.nav.current_category().map(|c| c.to_string()) else {
            return false;
        };
        let Some(record) =
            query::find_record(&self.dataset, &self.session.language, &category, sub_category)
        else {
            tracing::warn!(category, sub_category, "no record for procedure");
            return false;
        };
        let instruction = record.instruction_html.clone();
        if !self.nav.select_sub_category(sub_category) {
            return false;
        }
        self.enter();
        self.access_log
            .log(AccessEntry::new(&self.session, &category, sub_category));
        self.narrator.speak(&instruction, &self.session.language, now);
        true
    }

    fn enter(&mut self) {
        self.cursor_stack.push(self.selected);
        self.selected = 0;
        self.reset_scroll();
    }

    /// One screen back. Stops the metronome and any narration.
    pub fn back(&mut self) -> bool {
        if !self.nav.back() {
            return false;
        }
        self.metronome.stop();
        self.narrator.cancel();
        self.selected = self.cursor_stack.pop().unwrap_or(0);
        self.reset_scroll();
        true
    }

    /// Switch language and return to the category list. The change is
    /// announced unless `quiet`.
    pub fn change_language(&mut self, lang: &str, quiet: bool, now: Instant) {
        tracing::info!(lang, quiet, "language selected");
        self.session.set_language(lang);
        self.nav.reset();
        self.metronome.stop();
        self.narrator.cancel();
        self.selected = 0;
        self.cursor_stack.clear();
        self.reset_scroll();
        self.language_picker = None;
        if !quiet {
            let announcement = self.session.labels.language_changed.clone();
            self.narrator.speak(&announcement, lang, now);
        }
    }

    pub fn open_language_picker(&mut self) {
        let current = self
            .languages()
            .iter()
            .position(|l| *l == self.session.language)
            .unwrap_or(0);
        self.language_picker = Some(current);
    }

    pub fn close_language_picker(&mut self) {
        self.language_picker = None;
    }

    pub fn picker_next(&mut self) {
        let len = self.languages().len();
        if let Some(cursor) = self.language_picker.as_mut() {
            *cursor = (*cursor + 1) % len.max(1);
        }
    }

    pub fn picker_prev(&mut self) {
        let len = self.languages().len();
        if let Some(cursor) = self.language_picker.as_mut() {
            *cursor = cursor.checked_sub(1).unwrap_or(len.saturating_sub(1));
        }
    }

    pub fn confirm_language(&mut self, now: Instant) {
        let Some(cursor) = self.language_picker else {
            return;
        };
        if let Some(lang) = self.languages().get(cursor).cloned() {
            self.change_language(&lang, false, now);
        }
    }

    /// Whether the open procedure offers the metronome.
    pub fn metronome_available(&self) -> bool {
        self.nav.screen() == Screen::Content(ContentKind::Procedure)
            && self.nav.current_category().is_some_and(query::is_cpr)
    }

    pub fn toggle_metronome(&mut self, now: Instant) {
        if self.metronome_available() {
            self.metronome.toggle(now);
        }
    }

    pub fn toggle_voice(&mut self) {
        self.narrator.toggle_pause();
    }

    pub fn locate(&mut self) {
        self.location.locate(&self.tx);
    }

    pub fn on_location(&mut self, report: LocationReport) {
        let Some(applied) = self.location.apply(report) else {
            return;
        };
        if let Some(user_location) = applied.user_location {
            self.session.user_location = user_location;
        }
        if applied.resolved {
            let (category, sub) = LOCATION_LOG_MODULE;
            self.access_log
                .log(AccessEntry::new(&self.session, category, sub));
        }
    }

    /// Advance narration and metronome deadlines.
    pub fn on_tick(&mut self, now: Instant) {
        self.narrator.on_tick(now);
        self.metronome.on_tick(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crate::location::{Coordinates, LocationOutcome, LookupKind, PositionError};
    use crate::metronome::sink::MuteSink;
    use crate::narration::tests::FakeEngine;
    use crate::narration::{NarrationState, START_DELAY};
    use crate::session::LOCATION_UNAUTHORIZED;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;
    use std::time::Duration;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Record::new("PT", "ENGASGO", "Adulto", "<b>Heimlich</b> adulto"),
            Record::new("PT", "ENGASGO", "Bebê", "Tapas nas costas"),
            Record::new("PT", "RCP_ADULTO", "Passo a passo", "Comprima 5 cm"),
            Record::new("PT", "AULA_PRIMEIROS", "Vídeo 1", "Introdução").with_video("https://youtu.be/dQw4w9WgXcQ"),
            Record::new("PT", "AULA_PRIMEIROS", "Vídeo 2", "Avançado"),
            Record::new("ES", "ATRAGANTAMIENTO", "Adulto", "Maniobra"),
            Record::new("LIBRAS", "ENGASGO", "Adulto", "Sinais"),
        ])
    }

    fn app_with_spoken() -> (App, Rc<RefCell<Vec<crate::narration::engine::Utterance>>>) {
        let engine = FakeEngine::default();
        let spoken = engine.spoken.clone();
        let services = Services {
            engine: Box::new(engine),
            sink: Box::new(MuteSink),
            device: DeviceClass::Desktop,
        };
        let config = Config {
            access_log_enabled: false,
            ..Config::default()
        };
        let (tx, _rx) = mpsc::channel();
        let mut app = App::new(config, Theme::default(), services, tx);
        app.on_dataset(Ok(dataset()), Instant::now());
        (app, spoken)
    }

    #[test]
    fn test_dataset_arrival_shows_categories_quietly() {
        let (mut app, spoken) = app_with_spoken();
        app.on_tick(Instant::now() + START_DELAY * 2);
        assert!(spoken.borrow().is_empty());
        assert_eq!(app.nav.screen(), Screen::Categories);
        assert_eq!(app.categories(), vec!["ENGASGO", "RCP_ADULTO", "AULA_PRIMEIROS"]);
        assert!(!app.loading);
    }

    #[test]
    fn test_dataset_error_is_reported() {
        let (mut app, _) = app_with_spoken();
        app.loading = true;
        app.on_dataset(Err(DatasetError::Remote("quota".into())), Instant::now());
        assert!(!app.loading);
        assert!(app.load_error.as_deref().is_some_and(|e| e.contains("quota")));
        app.dismiss_error();
        assert!(app.load_error.is_none());
    }

    #[test]
    fn test_procedure_is_spoken_without_markup() {
        let (mut app, spoken) = app_with_spoken();
        let t0 = Instant::now();
        app.select_category("ENGASGO");
        assert!(app.select_sub_category("Adulto", t0));
        app.on_tick(t0 + START_DELAY);
        assert_eq!(spoken.borrow()[0].text, "Heimlich adulto");
        assert_eq!(app.narrator.state(), NarrationState::Speaking);
    }

    #[test]
    fn test_missing_procedure_keeps_screen() {
        let (mut app, _) = app_with_spoken();
        app.select_category("ENGASGO");
        assert!(!app.select_sub_category("Criança", Instant::now()));
        assert_eq!(app.nav.screen(), Screen::SubCategories);
    }

    #[test]
    fn test_back_restores_cursor_and_stops_side_effects() {
        let (mut app, _) = app_with_spoken();
        let t0 = Instant::now();
        app.select_next();
        assert_eq!(app.selected, 1);
        app.activate(t0);
        assert_eq!(app.nav.current_category(), Some("RCP_ADULTO"));
        app.activate(t0);
        app.on_tick(t0 + START_DELAY);
        assert!(app.metronome_available());
        app.toggle_metronome(t0 + START_DELAY);
        assert!(app.metronome.is_running());

        assert!(app.back());
        assert!(!app.metronome.is_running());
        assert_eq!(app.narrator.state(), NarrationState::Idle);
        assert_eq!(app.nav.screen(), Screen::SubCategories);
        assert!(app.back());
        assert_eq!(app.selected, 1);
        assert!(!app.back());
    }

    #[test]
    fn test_metronome_only_on_cpr_procedures() {
        let (mut app, _) = app_with_spoken();
        let t0 = Instant::now();
        app.select_category("ENGASGO");
        app.select_sub_category("Adulto", t0);
        app.toggle_metronome(t0);
        assert!(!app.metronome.is_running());
    }

    #[test]
    fn test_library_shortcut() {
        let (mut app, spoken) = app_with_spoken();
        let t0 = Instant::now();
        app.select_category("AULA_PRIMEIROS");
        assert_eq!(app.nav.screen(), Screen::Content(ContentKind::Library));
        app.on_tick(t0 + START_DELAY);
        assert!(spoken.borrow().is_empty());
        assert!(app.back());
        assert_eq!(app.nav.screen(), Screen::Categories);
    }

    #[test]
    fn test_change_language_announces_and_resets() {
        let (mut app, spoken) = app_with_spoken();
        let t0 = Instant::now();
        app.select_category("ENGASGO");
        app.change_language("ES", false, t0);
        assert_eq!(app.nav.screen(), Screen::Categories);
        assert_eq!(app.categories(), vec!["ATRAGANTAMIENTO"]);
        app.on_tick(t0 + START_DELAY);
        let spoken = spoken.borrow();
        assert_eq!(spoken[0].text, "Idioma cambiado");
        assert_eq!(spoken[0].voice, "es-ES");
    }

    #[test]
    fn test_language_picker_lists_dataset_languages() {
        let (mut app, _) = app_with_spoken();
        assert_eq!(app.languages(), vec!["PT", "ES", "EN", "LIBRAS"]);
        app.open_language_picker();
        assert_eq!(app.language_picker, Some(0));
        app.picker_prev();
        assert_eq!(app.language_picker, Some(3));
        app.confirm_language(Instant::now());
        assert_eq!(app.session.language, "LIBRAS");
        assert_eq!(app.session.labels.back, "Voltar");
        assert!(app.language_picker.is_none());
    }

    #[test]
    fn test_location_reports_update_session() {
        let (mut app, _) = app_with_spoken();
        assert_eq!(app.session.user_location, LOCATION_UNAUTHORIZED);
        let generation = app.location.generation();
        app.on_location(LocationReport {
            generation,
            kind: LookupKind::Startup,
            outcome: LocationOutcome::Coordinates(Coordinates { lat: -8.05, lon: -34.9 }),
        });
        assert_eq!(app.session.user_location, "-8.05, -34.9");

        app.on_location(LocationReport {
            generation,
            kind: LookupKind::OnDemand,
            outcome: LocationOutcome::Failed(PositionError::PermissionDenied),
        });
        assert_eq!(app.session.user_location, "-8.05, -34.9");
    }

    #[test]
    fn test_tick_drives_metronome() {
        let (mut app, _) = app_with_spoken();
        let t0 = Instant::now();
        app.select_category("RCP_ADULTO");
        app.select_sub_category("Passo a passo", t0);
        app.toggle_metronome(t0);
        app.on_tick(t0 + app.metronome.interval());
        app.on_tick(t0 + app.metronome.interval() * 2 + Duration::from_millis(1));
        assert_eq!(app.metronome.beats(), 3);
        app.toggle_metronome(t0 + Duration::from_secs(2));
        assert!(!app.metronome.is_running());
    }

    #[test]
    fn test_scroll_stays_within_rendered_content() {
        let (mut app, _) = app_with_spoken();
        app.select_category("ENGASGO");
        app.select_sub_category("Adulto", Instant::now());

        // fits on screen: j does nothing
        app.set_scroll_limit(0);
        app.scroll_down();
        assert_eq!(app.scroll, 0);

        app.set_scroll_limit(2);
        for _ in 0..10 {
            app.scroll_down();
        }
        assert_eq!(app.scroll, 2);
        app.scroll_up();
        assert_eq!(app.scroll, 1);

        // terminal grew
        app.set_scroll_limit(2);
        app.scroll_down();
        app.set_scroll_limit(1);
        assert_eq!(app.scroll, 1);

        app.back();
        app.scroll_down();
        assert_eq!(app.scroll, 0);
    }
}

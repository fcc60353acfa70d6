use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use socorro::app::{App, Services};
use socorro::config::Config;
use socorro::data::fetch::DatasetSource;
use socorro::device::DeviceClass;
use socorro::event::{AppEvent, EventHandler};
use socorro::logging::{self, LogConfig};
use socorro::metronome::default_sink;
use socorro::narration::engine::{CommandEngine, SilentEngine, SpeechEngine};
use socorro::nav::Screen;
use socorro::ui::components::content::{LibraryPanel, ProcedurePanel};
use socorro::ui::components::menu::Menu;
use socorro::ui::components::overlay::{ErrorModal, LanguagePicker};
use socorro::ui::components::status::{self, Header, LocationCard};
use socorro::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use socorro::ui::theme::Theme;
use socorro::ui::view::{self, View};

const TICK_RATE: Duration = Duration::from_millis(25);

const AFTER_HELP: &str = "\
The procedures come from a data endpoint. On first run a config.toml with
defaults is written to the socorro config directory (for example
~/.config/socorro/config.toml); set endpoint_url there, or pass --dataset
with a local JSON export.";

#[derive(Parser)]
#[command(
    name = "socorro",
    version,
    about = "Terminal first-aid guide with narration and CPR metronome",
    after_help = AFTER_HELP
)]
struct Cli {
    #[arg(short, long, help = "Language code (PT, ES, EN, ...)")]
    lang: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Load the dataset from a JSON file instead of the endpoint")]
    dataset: Option<PathBuf>,

    #[arg(long, help = "Disable spoken narration")]
    no_voice: bool,

    #[arg(long, help = "Print the bundled theme names and exit")]
    list_themes: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Using default config: {err:#}");
        Config::default()
    });
    if let Some(lang) = cli.lang {
        config.language = lang;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if cli.no_voice {
        config.narration_enabled = false;
    }
    config.normalize();

    let log_file = Some(PathBuf::from(&config.log_file)).filter(|p| !p.as_os_str().is_empty());
    if let Err(err) = logging::init(&LogConfig::from_verbosity(cli.verbose, log_file)) {
        eprintln!("Logging disabled: {err}");
    }

    let theme = Theme::load(&config.theme).unwrap_or_default();
    let engine: Box<dyn SpeechEngine> = if config.narration_enabled {
        Box::new(CommandEngine::new(&config.speech_command))
    } else {
        Box::new(SilentEngine::default())
    };
    let services = Services {
        engine,
        sink: default_sink(true),
        device: DeviceClass::detect(),
    };
    let source = match cli.dataset {
        Some(path) => DatasetSource::File(path),
        None => DatasetSource::Remote(config.endpoint_url.clone()),
    };
    tracing::info!(language = %config.language, source = %source.describe(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);
    let mut app = App::new(config, theme, services, events.sender());
    app.start(source);

    let result = run_app(&mut terminal, &mut app, &events);

    app.narrator.cancel();
    app.metronome.stop();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let mut scroll_limit = 0;
        terminal.draw(|frame| scroll_limit = render(frame, app, Instant::now()))?;
        app.set_scroll_limit(scroll_limit);

        let event = events.next()?;
        let now = Instant::now();
        match event {
            AppEvent::Key(key) => handle_key(app, key, now),
            AppEvent::Dataset(result) => app.on_dataset(result, now),
            AppEvent::Location(report) => app.on_location(report),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.on_tick(now);

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.load_error.is_some() {
        handle_error_key(app, key);
        return;
    }
    if app.language_picker.is_some() {
        handle_picker_key(app, key, now);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') => app.open_language_picker(),
        KeyCode::Char('g') => app.locate(),
        KeyCode::Char('p') => app.toggle_voice(),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            app.back();
        }
        _ => match app.nav.screen() {
            Screen::Categories | Screen::SubCategories => handle_menu_key(app, key, now),
            Screen::Content(_) => handle_content_key(app, key, now),
        },
    }
}

fn handle_error_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.dismiss_error(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.picker_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.picker_next(),
        KeyCode::Enter => app.confirm_language(now),
        KeyCode::Esc | KeyCode::Char('i') => app.close_language_picker(),
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.activate(now),
        _ => {}
    }
}

fn handle_content_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Char('m') => app.toggle_metronome(now),
        _ => {}
    }
}

fn footer_hints(app: &App) -> Vec<&str> {
    let labels = &app.session.labels;
    let mut hints = Vec::new();
    match app.nav.screen() {
        Screen::Categories => hints.push(labels.hint_select.as_str()),
        Screen::SubCategories => {
            hints.push(labels.hint_select.as_str());
            hints.push(labels.hint_back.as_str());
        }
        Screen::Content(_) => {
            hints.push(labels.hint_back.as_str());
            if app.metronome_available() {
                hints.push(labels.hint_metronome.as_str());
            }
            if app.narrator.is_speaking() {
                hints.push(labels.hint_voice.as_str());
            }
        }
    }
    hints.push(labels.hint_language.as_str());
    hints.push(labels.hint_location.as_str());
    hints.push(labels.hint_quit.as_str());
    hints
}

/// Draw one frame and return how far the content on screen can scroll.
fn render(frame: &mut ratatui::Frame, app: &App, now: Instant) -> u16 {
    let area = frame.area();
    let colors = &app.theme.colors;
    let labels = &app.session.labels;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = footer_hints(app);
    let footer_lines = pack_hint_lines(&hints, area.width as usize);
    let location_text = app.location.status().message(labels);
    let layout = AppLayout::new(area, location_text.is_some(), footer_lines.len() as u16);

    frame.render_widget(
        Header {
            samu: &labels.samu,
            language: &app.session.language,
            voice: status::voice_label(app.narrator.state(), &labels.pause, &labels.resume),
            theme: &app.theme,
        },
        layout.header,
    );

    let mut scroll_limit = 0;
    match view::render(app, now) {
        View::Loading { message } => {
            let loading = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(loading, centered_rect(40, 10, layout.main));
        }
        View::Categories { title, items } | View::SubCategories { title, items } => {
            frame.render_widget(
                Menu::new(&title, &items, app.selected, &labels.no_items, &app.theme),
                layout.main,
            );
        }
        View::Procedure(procedure) => {
            let panel = ProcedurePanel {
                view: &procedure,
                video_label: &labels.video,
                scroll: app.scroll,
                theme: &app.theme,
            };
            scroll_limit = panel.scroll_limit(layout.main);
            frame.render_widget(panel, layout.main);
        }
        View::Library { title, items } => {
            let panel = LibraryPanel {
                title: &title,
                items: &items,
                video_label: &labels.video,
                empty_label: &labels.no_items,
                scroll: app.scroll,
                theme: &app.theme,
            };
            scroll_limit = panel.scroll_limit(layout.main);
            frame.render_widget(panel, layout.main);
        }
    }

    if let (Some(card), Some(text)) = (layout.location, location_text.as_deref()) {
        frame.render_widget(
            LocationCard {
                title: &labels.btn_location,
                text,
                theme: &app.theme,
            },
            card,
        );
    }

    let footer = Paragraph::new(
        footer_lines
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.text_muted()))))
            .collect::<Vec<_>>(),
    );
    frame.render_widget(footer, layout.footer);

    if let Some(detail) = app.load_error.as_deref() {
        let hints = format!("{}  [Enter] OK", labels.hint_retry);
        frame.render_widget(
            ErrorModal {
                message: &labels.load_error,
                detail: Some(detail),
                hints: &hints,
                theme: &app.theme,
            },
            centered_rect(60, 40, area),
        );
    } else if let Some(selected) = app.language_picker {
        let languages = app.languages();
        frame.render_widget(
            LanguagePicker {
                title: &labels.select_lang,
                languages: &languages,
                selected,
                current: &app.session.language,
                theme: &app.theme,
            },
            centered_rect(25, 40, area),
        );
    }

    scroll_limit
}

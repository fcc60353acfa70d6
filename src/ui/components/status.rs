use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::narration::NarrationState;
use crate::ui::theme::Theme;

/// Top bar: emergency number, language and narration state.
pub struct Header<'a> {
    pub samu: &'a str,
    pub language: &'a str,
    pub voice: Option<&'a str>,
    pub theme: &'a Theme,
}

/// Label for the voice affordance, if narration is active.
pub fn voice_label<'a>(state: NarrationState, pause: &'a str, resume: &'a str) -> Option<&'a str> {
    match state {
        NarrationState::Speaking | NarrationState::Pending => Some(pause),
        NarrationState::Paused => Some(resume),
        NarrationState::Idle => None,
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.header_fg()).bg(colors.header_bg());

        let mut spans = vec![
            Span::styled(" socorro ", base.add_modifier(Modifier::BOLD)),
            Span::styled(format!("│ 📞 {} ", self.samu), base),
            Span::styled(format!("│ {} ", self.language), base),
        ];
        if let Some(voice) = self.voice {
            spans.push(Span::styled(format!("│ 🔊 [p] {voice} "), base));
        }
        Paragraph::new(Line::from(spans)).style(base).render(area, buf);
    }
}

/// The location card under the main panel.
pub struct LocationCard<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub theme: &'a Theme,
}

impl Widget for LocationCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" 📍 {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(Span::styled(self.text, Style::default().fg(colors.fg())))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Language list drawn over the current screen.
pub struct LanguagePicker<'a> {
    pub title: &'a str,
    pub languages: &'a [String],
    pub selected: usize,
    pub current: &'a str,
    pub theme: &'a Theme,
}

impl Widget for LanguagePicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .languages
            .iter()
            .enumerate()
            .map(|(i, lang)| {
                let indicator = if i == self.selected { ">" } else { " " };
                let marker = if lang == self.current { " ●" } else { "" };
                let style = if i == self.selected {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(format!(" {indicator} {lang}{marker}"), style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Blocking notice for a failed dataset load.
pub struct ErrorModal<'a> {
    pub message: &'a str,
    pub detail: Option<&'a str>,
    pub hints: &'a str,
    pub theme: &'a Theme,
}

impl Widget for ErrorModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .title(" ! ")
            .border_style(Style::default().fg(colors.error()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message,
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(detail) = self.detail {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                detail,
                Style::default().fg(colors.text_muted()),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.hints,
            Style::default().fg(colors.accent()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer, area: Rect) -> String {
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_picker_marks_current_language() {
        let theme = Theme::default();
        let languages = vec!["PT".to_string(), "ES".to_string(), "EN".to_string()];
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        LanguagePicker {
            title: "Idioma",
            languages: &languages,
            selected: 2,
            current: "PT",
            theme: &theme,
        }
        .render(area, &mut buf);
        let text = text(&buf, area);
        assert!(text.contains("PT ●"));
        assert!(text.contains("> EN"));
    }

    #[test]
    fn test_error_modal_shows_message() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 9);
        let mut buf = Buffer::empty(area);
        ErrorModal {
            message: "Erro ao carregar dados.",
            detail: Some("timeout"),
            hints: "[r] Tentar novamente",
            theme: &theme,
        }
        .render(area, &mut buf);
        let text = text(&buf, area);
        assert!(text.contains("Erro ao carregar dados."));
        assert!(text.contains("timeout"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;
use crate::ui::view::{EntryKind, MenuEntry};

/// Category or sub-category list with a cursor.
pub struct Menu<'a> {
    pub title: &'a str,
    pub items: &'a [MenuEntry],
    pub selected: usize,
    pub empty_label: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(
        title: &'a str,
        items: &'a [MenuEntry],
        selected: usize,
        empty_label: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            items,
            selected,
            empty_label,
            theme,
        }
    }
}

/// First row to draw so that `selected` stays inside `height` rows.
pub fn scroll_offset(selected: usize, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    selected.saturating_sub(height - 1).min(len - height)
}

impl Widget for Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                self.empty_label,
                Style::default().fg(colors.text_muted()),
            )))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(self.selected, self.items.len(), height);

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let color = match item.kind {
                    EntryKind::Emergency => colors.emergency(),
                    EntryKind::Library => colors.library(),
                    EntryKind::Plain => colors.fg(),
                };
                let style = if is_selected {
                    Style::default()
                        .fg(colors.bg())
                        .bg(color)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color)
                };
                Line::from(vec![
                    Span::styled(format!(" {indicator} "), Style::default().fg(colors.accent())),
                    Span::styled(format!("{} ➜", item.label), style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 3, 10), 0);
        assert_eq!(scroll_offset(4, 20, 5), 0);
        assert_eq!(scroll_offset(5, 20, 5), 1);
        assert_eq!(scroll_offset(19, 20, 5), 15);
        assert_eq!(scroll_offset(3, 20, 0), 0);
    }

    #[test]
    fn test_render_marks_selection() {
        let theme = Theme::default();
        let items = vec![
            MenuEntry {
                label: "⚠ ENGASGO".into(),
                kind: EntryKind::Emergency,
            },
            MenuEntry {
                label: "📚 Biblioteca: AULA".into(),
                kind: EntryKind::Library,
            },
        ];
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        Menu::new("Título", &items, 1, "vazio", &theme).render(area, &mut buf);

        let row = |y: u16| -> String { (0..area.width).map(|x| buf[(x, y)].symbol()).collect() };
        assert!(row(1).contains("ENGASGO"));
        assert!(row(2).contains(">"));
        assert!(!row(1).contains(">"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use crate::ui::view::MetronomePanel;

const PULSE_WIDTH: u16 = 6;

/// Metronome controls with the flashing compression indicator on the right.
pub struct MetronomeBox<'a> {
    pub panel: &'a MetronomePanel,
    pub theme: &'a Theme,
}

impl<'a> MetronomeBox<'a> {
    pub fn new(panel: &'a MetronomePanel, theme: &'a Theme) -> Self {
        Self { panel, theme }
    }
}

impl Widget for MetronomeBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.panel.label))
            .border_style(Style::default().fg(if self.panel.running {
                colors.pulse()
            } else {
                colors.border()
            }));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let button_style = if self.panel.running {
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.pulse())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" [m] {} ", self.panel.button), button_style),
            Span::styled(
                format!("  {} bpm", self.panel.bpm),
                Style::default().fg(colors.text_muted()),
            ),
        ]))
        .render(inner, buf);

        if !self.panel.running || inner.width <= PULSE_WIDTH {
            return;
        }
        let x0 = inner.x + inner.width - PULSE_WIDTH;
        let style = if self.panel.flashing {
            Style::default().bg(colors.pulse())
        } else {
            Style::default().bg(colors.accent_dim())
        };
        for x in x0..inner.x + inner.width {
            buf[(x, inner.y)].set_symbol(" ").set_style(style);
        }
    }
}

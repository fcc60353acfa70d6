use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::markup::{self, TextLine};
use crate::ui::components::pulse::MetronomeBox;
use crate::ui::theme::{Theme, ThemeColors};
use crate::ui::view::{LibraryEntry, ProcedureView};
use crate::video::VideoEmbed;

fn styled_lines(html: &str, colors: &ThemeColors) -> Vec<Line<'static>> {
    markup::to_lines(html)
        .into_iter()
        .map(|line: TextLine| {
            Line::from(
                line.runs
                    .into_iter()
                    .map(|run| {
                        let style = if run.bold {
                            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(colors.fg())
                        };
                        Span::styled(run.text, style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn video_line(video: &VideoEmbed, label: &str, colors: &ThemeColors) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("▶ {label}: "), Style::default().fg(colors.accent())),
        Span::styled(
            video.embed_url(),
            Style::default()
                .fg(colors.library())
                .add_modifier(Modifier::UNDERLINED),
        ),
    ])
}

/// Rows the body can scroll before its last line reaches the bottom.
fn overflow(body: &Paragraph, area: Rect) -> u16 {
    let total = body.line_count(area.width);
    u16::try_from(total.saturating_sub(area.height as usize)).unwrap_or(u16::MAX)
}

/// A single procedure: heading, optional metronome, instructions, video.
pub struct ProcedurePanel<'a> {
    pub view: &'a ProcedureView,
    pub video_label: &'a str,
    pub scroll: u16,
    pub theme: &'a Theme,
}

impl ProcedurePanel<'_> {
    fn block(&self) -> Block<'static> {
        let colors = &self.theme.colors;
        Block::bordered()
            .title(Span::styled(
                format!(" {} ", self.view.protocol_label),
                Style::default().fg(colors.text_muted()),
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()))
    }

    /// Title, metronome and body areas inside the border.
    fn sections(&self, inner: Rect) -> [Rect; 3] {
        let metronome_height = if self.view.metronome.is_some() { 4 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(metronome_height),
                Constraint::Min(0),
            ])
            .split(inner);
        [layout[0], layout[1], layout[2]]
    }

    fn body(&self) -> Paragraph<'static> {
        let colors = &self.theme.colors;
        let mut lines = styled_lines(&self.view.instruction_html, colors);
        if let Some(video) = &self.view.video {
            lines.push(Line::from(""));
            lines.push(video_line(video, self.video_label, colors));
        }
        Paragraph::new(lines).wrap(Wrap { trim: false })
    }

    pub fn scroll_limit(&self, area: Rect) -> u16 {
        let [_, _, body_area] = self.sections(self.block().inner(area));
        overflow(&self.body(), body_area)
    }
}

impl Widget for ProcedurePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        let [title_area, metronome_area, body_area] = self.sections(inner);

        Paragraph::new(Line::from(Span::styled(
            self.view.title.clone(),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        )))
        .render(title_area, buf);

        if let Some(panel) = &self.view.metronome {
            MetronomeBox::new(panel, self.theme).render(metronome_area, buf);
        }

        let body = self.body();
        let scroll = self.scroll.min(overflow(&body, body_area));
        body.scroll((scroll, 0)).render(body_area, buf);
    }
}

/// A library category: every item with its description and video link.
pub struct LibraryPanel<'a> {
    pub title: &'a str,
    pub items: &'a [LibraryEntry],
    pub video_label: &'a str,
    pub empty_label: &'a str,
    pub scroll: u16,
    pub theme: &'a Theme,
}

impl LibraryPanel<'_> {
    fn block(&self) -> Block<'static> {
        let colors = &self.theme.colors;
        Block::bordered()
            .title(Span::styled(
                format!(" 📚 {} ", self.title),
                Style::default().fg(colors.library()).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(colors.library()))
            .style(Style::default().bg(colors.bg()))
    }

    fn body(&self, width: u16) -> Paragraph<'static> {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line<'static>> = Vec::new();
        if self.items.is_empty() {
            lines.push(Line::from(Span::styled(
                self.empty_label.to_string(),
                Style::default().fg(colors.text_muted()),
            )));
        }
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(Span::styled(
                    "─".repeat(width as usize),
                    Style::default().fg(colors.border()),
                )));
            }
            lines.push(Line::from(Span::styled(
                item.title.clone(),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )));
            lines.extend(styled_lines(&item.description_html, colors));
            if let Some(video) = &item.video {
                lines.push(video_line(video, self.video_label, colors));
            }
        }
        Paragraph::new(lines).wrap(Wrap { trim: false })
    }

    pub fn scroll_limit(&self, area: Rect) -> u16 {
        let inner = self.block().inner(area);
        overflow(&self.body(inner.width), inner)
    }
}

impl Widget for LibraryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        let body = self.body(inner.width);
        let scroll = self.scroll.min(overflow(&body, inner));
        body.scroll((scroll, 0)).render(inner, buf);
    }
}

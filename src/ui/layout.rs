use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Header bar, main panel, optional location card, footer hints.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub location: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, show_location: bool, footer_lines: u16) -> Self {
        let location_height = if show_location { 3 } else { 0 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(location_height),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            location: show_location.then_some(vertical[2]),
            footer: vertical[3],
        }
    }
}

/// Greedily pack footer hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

/// A popup of `percent_x` × `percent_y`, never smaller than the minimum
/// unless the screen itself is.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area.x.saturating_add(area.width.saturating_sub(target_w) / 2);
    let top = area.y.saturating_add(area.height.saturating_sub(target_h) / 2);

    Rect::new(left, top, target_w, target_h)
}

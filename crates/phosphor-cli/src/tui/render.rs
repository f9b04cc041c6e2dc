use phosphor_core::Shell;
use ratatui::{
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Hard-wrap lines at `width` columns. Empty lines keep their row.
pub(super) fn wrap(lines: &[String], width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in lines {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        rows.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    rows
}

pub(super) fn render(shell: &Shell, frame: &mut Frame) {
    let area = frame.area();
    let theme = shell.theme();
    let style = Style::default()
        .fg(rgb(theme.foreground))
        .bg(rgb(theme.background));

    // ── captured app: the grid is the whole screen ──
    if shell.screen().is_fullscreen() {
        let grid = shell.screen().grid();
        let lines: Vec<Line> = grid.lines().into_iter().map(Line::from).collect();
        frame.render_widget(Paragraph::new(lines).style(style), area);
        if shell.cursor_visible() {
            if let Some((x, y)) = shell.focus().app_cursor(grid) {
                frame.set_cursor_position((area.x + x, area.y + y));
            }
        }
        return;
    }

    // ── scrollback ──
    let screen = shell.screen();
    let logical = screen.lines();
    let shown = logical.len().saturating_sub(screen.scroll_offset());
    let rows = wrap(&logical[..shown], area.width as usize);
    let height = area.height as usize;
    let visible = &rows[rows.len().saturating_sub(height)..];

    let lines: Vec<Line> = visible.iter().map(|r| Line::from(r.as_str())).collect();
    frame.render_widget(Paragraph::new(lines).style(style), area);

    if shell.cursor_visible() && !shell.is_busy() {
        if let Some(last) = visible.last() {
            let x = (last.chars().count() as u16).min(area.width.saturating_sub(1));
            let y = visible.len().saturating_sub(1) as u16;
            frame.set_cursor_position((area.x + x, area.y + y));
        }
    }
}

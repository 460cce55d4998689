use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, View};
use crate::schedule::GameView;

pub const NO_GAMES: &str = "No Scheduled Games";

fn try_parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub fn parse_color(hex: &str) -> Color {
    try_parse_color(hex).unwrap_or(Color::White)
}

/// Command-line check for `--color`.
pub fn hex_color_arg(value: &str) -> Result<String, String> {
    match try_parse_color(value) {
        Some(_) => Ok(value.to_string()),
        None => Err(format!("'{}' is not a hex color like #0e3386", value)),
    }
}

fn status_style(game: &GameView) -> Style {
    match game.status_color {
        Some(hex) if game.is_over() => Style::default().fg(parse_color(hex)),
        _ => Style::default().fg(Color::White),
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(size);

    match app.view {
        View::Widget => draw_widget(f, app, chunks[0]),
        View::Table => draw_table(f, app, chunks[0]),
    }
    draw_footer(f, app, chunks[1]);
}

fn draw_widget(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().bg(app.color);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let header = app.header();
    let big_header = inner_area.width as usize >= header.len() * 4 && inner_area.height >= 12;
    let header_height = if big_header { 4 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Spacer
            Constraint::Length(header_height), // Header
            Constraint::Length(1),             // Spacer
            Constraint::Min(0),                // Games
        ].as_ref())
        .split(inner_area);

    if big_header {
        let title = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(Style::default().fg(Color::White))
            .lines(vec![header.into()])
            .alignment(Alignment::Center)
            .build();
        f.render_widget(title, chunks[1]);
    } else {
        let title = Paragraph::new(header)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[1]);
    }

    let lines: Vec<Line> = if !app.loaded {
        vec![Line::from("Loading...")]
    } else if app.games.is_empty() {
        vec![Line::from(NO_GAMES)]
    } else {
        app.games
            .iter()
            .flat_map(|game| {
                let text = format!("{} [{}]", game.title, game.status);
                [Line::from(Span::styled(text, status_style(game))), Line::from("")]
            })
            .collect()
    };

    let games = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    f.render_widget(games, chunks[3]);
}

fn draw_table(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", app.header().to_uppercase()))
        .borders(Borders::ALL);

    let rows: Vec<Row> = if app.games.is_empty() {
        let text = if app.loaded { NO_GAMES } else { "Loading..." };
        vec![Row::new(vec![Cell::from(text)])]
    } else {
        app.games
            .iter()
            .map(|game| {
                Row::new(vec![
                    Cell::from(game.title.clone()),
                    Cell::from(format!("[{}]", game.status)).style(status_style(game)),
                ])
            })
            .collect()
    };

    let table = Table::new(rows, [Constraint::Percentage(70), Constraint::Percentage(30)])
        .header(
            Row::new(vec!["Game", "Status"])
                .style(Style::default().add_modifier(Modifier::UNDERLINED)),
        )
        .column_spacing(2)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(err) = &app.last_error {
        Line::from(vec![
            Span::styled(" Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(err.clone()),
        ])
    } else {
        let updated = app
            .last_refresh
            .map(|t| format!("  updated {}", t.format("%I:%M %p")))
            .unwrap_or_default();
        Line::from(vec![
            Span::raw(format!(" {}", app.range_label)),
            Span::styled(updated, Style::default().fg(Color::Gray)),
            Span::styled("  [t] view  [r] refresh  [q] quit", Style::default().fg(Color::DarkGray)),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Text rendition of the table view for non-interactive output.
pub fn plain_lines(games: &[GameView]) -> Vec<String> {
    if games.is_empty() {
        return vec![NO_GAMES.to_string()];
    }
    games
        .iter()
        .map(|game| format!("{}  [{}]", game.title, game.status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{game_views, home_games, DisplayZone, LOST_COLOR, WON_COLOR};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn views() -> Vec<GameView> {
        let data = serde_json::from_str(include_str!("../fixtures/schedule.json")).unwrap();
        let zone = DisplayZone::from_name(Some("America/Chicago")).unwrap();
        game_views(&home_games(data, 112), &zone)
    }

    fn render(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn find(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        (0..buf.area.height).find_map(|y| {
            row_text(buf, y).find(needle).map(|x| (x as u16, y))
        })
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#0e3386"), Color::Rgb(14, 51, 134));
        assert_eq!(parse_color("dc3545"), Color::Rgb(220, 53, 69));
        assert_eq!(parse_color("#fff"), Color::White);
        assert_eq!(parse_color("zzzzzz"), Color::White);
        assert_eq!(parse_color("#0e338é"), Color::White);
    }

    #[test]
    fn test_hex_color_arg() {
        assert_eq!(hex_color_arg("#0e3386"), Ok("#0e3386".to_string()));
        assert_eq!(hex_color_arg("CC3433"), Ok("CC3433".to_string()));
        assert!(hex_color_arg("zzzzzz").is_err());
        assert!(hex_color_arg("blue").is_err());
    }

    #[test]
    fn test_widget_lists_games() {
        let mut app = App::new("Cubs", "#0e3386", View::Widget);
        app.set_games(views(), "2024-04-05 to 2024-04-10".to_string());
        let buf = render(&mut app, 50, 16);

        assert!(find(&buf, "Cubs Home Games").is_some());
        assert!(find(&buf, "02:20 PM: vs. Dodgers [Ended]").is_some());
        assert!(find(&buf, "06:05 PM: vs. Padres [Top 7th]").is_some());
        assert!(find(&buf, "01:20 PM: vs. D'backs [Scheduled]").is_some());
    }

    #[test]
    fn test_widget_colors_final_games() {
        let mut app = App::new("Cubs", "#0e3386", View::Widget);
        app.set_games(views(), String::new());
        let buf = render(&mut app, 50, 16);

        let (x, y) = find(&buf, "02:20 PM").unwrap();
        assert_eq!(buf[(x, y)].fg, parse_color(WON_COLOR));
        let (x, y) = find(&buf, "01:20 PM: vs. Dodgers").unwrap();
        assert_eq!(buf[(x, y)].fg, parse_color(LOST_COLOR));
        let (x, y) = find(&buf, "06:05 PM").unwrap();
        assert_eq!(buf[(x, y)].fg, Color::White);
        assert_eq!(buf[(x, y)].bg, Color::Rgb(14, 51, 134));
    }

    #[test]
    fn test_widget_without_games() {
        let mut app = App::new("Cubs", "#0e3386", View::Widget);
        let buf = render(&mut app, 50, 16);
        assert!(find(&buf, "Loading...").is_some());

        app.set_games(Vec::new(), String::new());
        let buf = render(&mut app, 50, 16);
        assert!(find(&buf, NO_GAMES).is_some());
    }

    #[test]
    fn test_table_view() {
        let mut app = App::new("Cubs", "#0e3386", View::Table);
        app.set_games(views(), String::new());
        let buf = render(&mut app, 80, 12);

        assert!(find(&buf, "CUBS HOME GAMES").is_some());
        assert!(find(&buf, "01:20 PM: vs. Dodgers").is_some());
        let (x, y) = find(&buf, "[Ended]").unwrap();
        assert_eq!(buf[(x, y)].fg, parse_color(WON_COLOR));
        assert!(find(&buf, "[Top 7th]").is_some());
    }

    #[test]
    fn test_table_without_games() {
        let mut app = App::new("Cubs", "#0e3386", View::Table);
        app.set_games(Vec::new(), String::new());
        let buf = render(&mut app, 80, 8);
        assert!(find(&buf, NO_GAMES).is_some());
    }

    #[test]
    fn test_footer_shows_error() {
        let mut app = App::new("Cubs", "#0e3386", View::Widget);
        app.set_error("Schedule API returned HTTP 503".to_string());
        let buf = render(&mut app, 60, 10);
        assert!(find(&buf, "Error: Schedule API returned HTTP 503").is_some());
    }

    #[test]
    fn test_plain_lines() {
        let lines = plain_lines(&views());
        assert_eq!(lines[0], "02:20 PM: vs. Dodgers  [Ended]");
        assert_eq!(lines[3], "01:20 PM: vs. D'backs  [Scheduled]");
        assert_eq!(plain_lines(&[]), vec![NO_GAMES.to_string()]);
    }
}

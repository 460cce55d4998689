mod app;
mod data;
mod error;
mod model;
mod schedule;
mod ui;

use std::{io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::{mpsc, Notify};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{App, View};
use data::{DataClient, ScheduleQuery, DEFAULT_API_BASE};
use error::ScheduleError;
use schedule::{game_views, DisplayZone, GameView};

#[derive(Parser, Debug)]
#[command(author, version, about = "Show a team's home games for the requested dates", long_about = None)]
struct Args {
    /// MLB team id (112 is the Chicago Cubs)
    #[arg(long, default_value_t = 112)]
    team_id: u32,

    /// Name shown in the header
    #[arg(long, default_value = "Cubs")]
    team_name: String,

    /// Widget background color as a hex string
    #[arg(long, default_value = "#0e3386", value_parser = ui::hex_color_arg)]
    color: String,

    /// First day to look up (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Last day to look up (YYYY-MM-DD); defaults to --date
    #[arg(short, long, requires = "date")]
    end_date: Option<NaiveDate>,

    /// Initial view
    #[arg(long, value_enum, default_value_t = View::Widget)]
    view: View,

    /// IANA time zone for game times; defaults to the local zone
    #[arg(long)]
    timezone: Option<String>,

    /// Update interval in seconds
    #[arg(short, long, default_value_t = 300)]
    interval: u64,

    /// Print the games once and exit instead of starting the UI
    #[arg(long)]
    print: bool,

    /// Schedule API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory for the log file
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Dates the user asked for; open ends follow the current day.
#[derive(Debug, Clone, Copy)]
struct DateRange {
    date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl DateRange {
    fn query(&self, team_id: u32) -> Result<ScheduleQuery, ScheduleError> {
        let start = self.date.unwrap_or_else(|| Local::now().date_naive());
        match self.end_date {
            Some(end) => ScheduleQuery::new(team_id, start, end),
            None => Ok(ScheduleQuery::single_day(team_id, start)),
        }
    }
}

fn range_label(query: &ScheduleQuery) -> String {
    if query.start == query.end {
        query.start.format("%a %b %-d, %Y").to_string()
    } else {
        format!("{} to {}", query.start, query.end)
    }
}

enum Update {
    Games { views: Vec<GameView>, range_label: String },
    Failed(String),
}

fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cubs-tui")
        .join("logs")
}

fn init_tracing(log_dir: Option<PathBuf>) -> anyhow::Result<WorkerGuard> {
    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    // The terminal belongs to the UI, so events go to a file.
    let file_appender = tracing_appender::rolling::never(&log_dir, "cubs-tui.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cubs_tui=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.clone())?;

    let zone = DisplayZone::from_name(args.timezone.as_deref())?;
    let range = DateRange {
        date: args.date,
        end_date: args.end_date,
    };
    // Reject a reversed range before touching the terminal.
    range.query(args.team_id)?;

    let client = Arc::new(DataClient::new(args.api_base.clone()));

    if args.print {
        return print_games(&client, range, args.team_id, &zone).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(&args.team_name, &args.color, args.view);

    // Setup channel for background updates
    let (tx, mut rx) = mpsc::channel::<Update>(16);
    let refresh = Arc::new(Notify::new());

    let client_clone = client.clone();
    let refresh_clone = refresh.clone();
    let interval_secs = args.interval.max(1);
    let team_id = args.team_id;

    // Spawn background data fetching task
    tokio::spawn(async move {
        loop {
            let update = match fetch_views(&client_clone, range, team_id, &zone).await {
                Ok((views, label)) => Update::Games { views, range_label: label },
                Err(err) => {
                    tracing::warn!(error = %err, "schedule refresh failed");
                    Update::Failed(err.to_string())
                }
            };
            if tx.send(update).await.is_err() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
                _ = refresh_clone.notified() => tracing::debug!("manual refresh"),
            }
        }
    });

    // Run app loop
    let res = run_app(&mut terminal, &mut app, &mut rx, &refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        return Err(err.into());
    }

    Ok(())
}

async fn fetch_views(
    client: &DataClient,
    range: DateRange,
    team_id: u32,
    zone: &DisplayZone,
) -> Result<(Vec<GameView>, String), ScheduleError> {
    let query = range.query(team_id)?;
    let games = client.fetch_home_games(&query).await?;
    Ok((game_views(&games, zone), range_label(&query)))
}

async fn print_games(
    client: &DataClient,
    range: DateRange,
    team_id: u32,
    zone: &DisplayZone,
) -> anyhow::Result<()> {
    let (views, label) = fetch_views(client, range, team_id, zone)
        .await
        .context("fetching home games")?;

    println!("{}", label);
    for line in ui::plain_lines(&views) {
        println!("{}", line);
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::Receiver<Update>,
    refresh: &Notify,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Char('t') => app.toggle_view(),
                        KeyCode::Char('r') => refresh.notify_one(),
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        _ => {}
                    }
                }
            }
        }

        while let Ok(update) = rx.try_recv() {
            match update {
                Update::Games { views, range_label } => app.set_games(views, range_label),
                Update::Failed(err) => app.set_error(err),
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["cubs-tui"]);
        assert_eq!(args.team_id, 112);
        assert_eq!(args.team_name, "Cubs");
        assert_eq!(args.view, View::Widget);
        assert_eq!(args.api_base, DEFAULT_API_BASE);
        assert!(args.date.is_none());
        assert!(!args.print);
    }

    #[test]
    fn test_args_dates_and_view() {
        let args = Args::parse_from([
            "cubs-tui", "--date", "2024-04-05", "--end-date", "2024-04-10", "--view", "table",
        ]);
        assert_eq!(args.date, Some(day(2024, 4, 5)));
        assert_eq!(args.end_date, Some(day(2024, 4, 10)));
        assert_eq!(args.view, View::Table);
    }

    #[test]
    fn test_end_date_requires_date() {
        assert!(Args::try_parse_from(["cubs-tui", "--end-date", "2024-04-10"]).is_err());
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(Args::try_parse_from(["cubs-tui", "--color", "zzzzzz"]).is_err());
        let args = Args::parse_from(["cubs-tui", "--color", "cc3433"]);
        assert_eq!(args.color, "cc3433");
    }

    #[test]
    fn test_default_log_dir() {
        assert!(default_log_dir().ends_with("cubs-tui/logs"));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Args::try_parse_from(["cubs-tui", "--date", "April 5"]).is_err());
    }

    #[test]
    fn test_date_range_queries() {
        let single = DateRange { date: Some(day(2024, 4, 5)), end_date: None }.query(112).unwrap();
        assert_eq!(single, ScheduleQuery::single_day(112, day(2024, 4, 5)));
        assert_eq!(range_label(&single), "Fri Apr 5, 2024");

        let span = DateRange { date: Some(day(2024, 4, 5)), end_date: Some(day(2024, 4, 7)) }
            .query(112)
            .unwrap();
        assert_eq!(range_label(&span), "2024-04-05 to 2024-04-07");

        let reversed = DateRange { date: Some(day(2024, 4, 5)), end_date: Some(day(2024, 4, 1)) };
        assert!(reversed.query(112).is_err());
    }

    #[test]
    fn test_open_range_uses_today() {
        let query = DateRange { date: None, end_date: None }.query(112).unwrap();
        assert_eq!(query.start, Local::now().date_naive());
    }
}

use chrono::{DateTime, Local};
use ratatui::{style::Color, widgets::TableState};

use crate::schedule::GameView;
use crate::ui::parse_color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    /// Compact team-colored card
    Widget,
    /// Row-per-game debug table
    Table,
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub games: Vec<GameView>,
    pub state: TableState,
    pub view: View,
    pub team_name: String,
    pub color: Color,
    pub range_label: String,
    pub loaded: bool,
    pub last_refresh: Option<DateTime<Local>>,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(team_name: &str, color_hex: &str, view: View) -> Self {
        let mut state = TableState::default();
        state.select(Some(0));
        Self {
            should_quit: false,
            games: Vec::new(),
            state,
            view,
            team_name: team_name.to_string(),
            color: parse_color(color_hex),
            range_label: String::new(),
            loaded: false,
            last_refresh: None,
            last_error: None,
        }
    }

    pub fn header(&self) -> String {
        format!("{} Home Games", self.team_name)
    }

    pub fn set_games(&mut self, games: Vec<GameView>, range_label: String) {
        self.games = games;
        self.range_label = range_label;
        self.loaded = true;
        self.last_refresh = Some(Local::now());
        self.last_error = None;

        let selected = self.state.selected().unwrap_or(0);
        if selected >= self.games.len() {
            self.state.select(Some(0));
        }
    }

    pub fn set_error(&mut self, err: String) {
        self.loaded = true;
        self.last_error = Some(err);
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Widget => View::Table,
            View::Table => View::Widget,
        };
    }

    pub fn next(&mut self) {
        if self.games.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.games.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.games.is_empty() { return; }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.games.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn selected_game(&self) -> Option<&GameView> {
        self.state.selected().and_then(|i| self.games.get(i))
    }
}

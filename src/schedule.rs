//! Turns a raw schedule response into the per-game records the views draw.

use crate::error::ScheduleError;
use crate::model::{Game, ScheduleResponse};
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const LOST_COLOR: &str = "#dc3545";
pub const WON_COLOR: &str = "#a4ff9e";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Pending,
    InProgress,
    Final,
}

impl GameState {
    pub fn of(game: &Game) -> Self {
        match game.status.status_code.as_str() {
            "F" => GameState::Final,
            "I" => GameState::InProgress,
            _ => GameState::Pending,
        }
    }
}

/// Zone used for game dates and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Named(Tz),
}

impl DisplayZone {
    pub fn from_name(name: Option<&str>) -> Result<Self, ScheduleError> {
        match name {
            None => Ok(DisplayZone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(DisplayZone::Named)
                .map_err(|_| ScheduleError::UnknownTimeZone(name.to_string())),
        }
    }

    fn format(&self, at: DateTime<Utc>, fmt: &str) -> String {
        match self {
            DisplayZone::Local => at.with_timezone(&Local).format(fmt).to_string(),
            DisplayZone::Named(tz) => at.with_timezone(tz).format(fmt).to_string(),
        }
    }
}

pub fn games_from_schedule(resp: ScheduleResponse) -> Vec<Game> {
    resp.dates
        .into_iter()
        .filter(|date| !date.games.is_empty())
        .flat_map(|date| date.games)
        .collect()
}

pub fn is_home_game(game: &Game, team_id: u32) -> bool {
    game.teams.home.team.id == team_id
}

pub fn home_games(resp: ScheduleResponse, team_id: u32) -> Vec<Game> {
    games_from_schedule(resp)
        .into_iter()
        .filter(|game| is_home_game(game, team_id))
        .collect()
}

pub fn is_pending(game: &Game) -> bool {
    GameState::of(game) == GameState::Pending
}

pub fn is_over(game: &Game) -> bool {
    GameState::of(game) == GameState::Final
}

pub fn status_label(game: &Game) -> String {
    match GameState::of(game) {
        GameState::Final => "Ended".to_string(),
        GameState::InProgress => {
            let inning = game.linescore.as_ref().and_then(|ls| {
                match (&ls.inning_state, &ls.current_inning_ordinal) {
                    (Some(state), Some(ordinal)) => Some(format!("{} {}", state, ordinal)),
                    _ => None,
                }
            });
            inning.unwrap_or_else(|| game.status.detailed_state.clone())
        }
        GameState::Pending => game.status.detailed_state.clone(),
    }
}

pub fn home_game_lost(game: &Game) -> bool {
    is_over(game) && !game.is_tie.unwrap_or(false) && game.teams.away.is_winner.unwrap_or(false)
}

/// Hex color for the status of a finished game; `None` until it is final.
pub fn status_color(game: &Game) -> Option<&'static str> {
    if !is_over(game) {
        return None;
    }
    Some(if home_game_lost(game) { LOST_COLOR } else { WON_COLOR })
}

pub fn opponent_name(game: &Game) -> &str {
    let team = &game.teams.away.team;
    team.club_name
        .as_deref()
        .or(team.team_name.as_deref())
        .unwrap_or(&team.name)
}

static CHAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(\d+);").expect("valid character reference pattern"));

/// Replaces decimal character references such as `&#39;`.
pub fn decode_entities(s: &str) -> String {
    CHAR_REF
        .replace_all(s, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameView {
    pub game_pk: u64,
    pub display_date: String,
    pub display_time: String,
    pub opponent: String,
    pub title: String,
    pub display_str: String,
    pub status: String,
    pub state: GameState,
    pub status_color: Option<&'static str>,
}

impl GameView {
    pub fn new(game: &Game, zone: &DisplayZone) -> Self {
        let display_date = zone.format(game.game_date, "%-m/%-d/%Y");
        let display_time = zone.format(game.game_date, "%I:%M %p");
        let opponent = decode_entities(opponent_name(game));

        Self {
            game_pk: game.game_pk,
            title: format!("{}: vs. {}", display_time, opponent),
            display_str: format!("{} {}: vs. {}", display_date, display_time, opponent),
            display_date,
            display_time,
            opponent,
            status: status_label(game),
            state: GameState::of(game),
            status_color: status_color(game),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == GameState::Pending
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::Final
    }

    pub fn titled_with_status(&self) -> String {
        if self.is_pending() {
            self.title.clone()
        } else {
            format!("{}[{}]", self.title, self.status)
        }
    }
}

pub fn game_views(games: &[Game], zone: &DisplayZone) -> Vec<GameView> {
    games.iter().map(|game| GameView::new(game, zone)).collect()
}

use crate::error::ScheduleError;
use crate::model::{Game, ScheduleResponse};
use crate::schedule;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;

pub const DEFAULT_API_BASE: &str = "https://statsapi.mlb.com";

const HYDRATE: &str = "team(venue(timezone)),venue(timezone),game(seriesStatus,seriesSummary),seriesStatus,seriesSummary,linescore";

/// A schedule lookup for one team over an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub team_id: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScheduleQuery {
    pub fn new(team_id: u32, start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        if end < start {
            return Err(ScheduleError::InvalidRange { start, end });
        }
        Ok(Self { team_id, start, end })
    }

    pub fn single_day(team_id: u32, day: NaiveDate) -> Self {
        Self {
            team_id,
            start: day,
            end: day,
        }
    }

    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/api/v1/schedule?lang=en&sportId=1&hydrate={}&season={}&startDate={}&endDate={}&teamId={}&eventTypes=primary&scheduleTypes=games,events,xref",
            base.trim_end_matches('/'),
            HYDRATE,
            self.start.year(),
            api_date(self.start),
            api_date(self.end),
            self.team_id,
        )
    }
}

// The API accepts unpadded month and day.
fn api_date(day: NaiveDate) -> String {
    day.format("%Y-%-m-%-d").to_string()
}

pub struct DataClient {
    client: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_schedule(&self, query: &ScheduleQuery) -> Result<ScheduleResponse, ScheduleError> {
        let url = query.url(&self.base_url);
        tracing::debug!(%url, "requesting schedule");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ScheduleError::Status {
                status: resp.status(),
                url,
            });
        }
        let body = resp.bytes().await?;
        let data = serde_json::from_slice::<ScheduleResponse>(&body)?;
        Ok(data)
    }

    pub async fn fetch_home_games(&self, query: &ScheduleQuery) -> Result<Vec<Game>, ScheduleError> {
        let data = self.fetch_schedule(query).await?;
        let games = schedule::home_games(data, query.team_id);
        tracing::info!(
            team_id = query.team_id,
            start = %query.start,
            end = %query.end,
            home_games = games.len(),
            "schedule refreshed"
        );
        Ok(games)
    }
}

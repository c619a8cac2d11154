//! Cricbuzz response payloads.
//!
//! Cricbuzz is loose with JSON types: ids and counts arrive as numbers in one
//! endpoint and as strings in the next, and timestamps are epoch milliseconds
//! wrapped in strings. The `de_*` helpers below absorb that so the structs can
//! use plain Rust types.

use crate::cli::types::{MatchId, MatchStatus, PlayerId, PlayerRole, SeriesId, TeamId, VenueId};
use crate::storage::models::{Match, Player, Series, Team};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flex {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Flex {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Flex::Int(i) => Some(*i),
            Flex::Float(f) => Some(*f as i64),
            Flex::Text(s) => {
                let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
                digits.parse::<i64>().ok()
            }
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Flex::Int(i) => Some(*i as f64),
            Flex::Float(f) => Some(*f),
            Flex::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

pub(crate) fn de_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Flex::deserialize(deserializer)?
        .as_i64()
        .ok_or_else(|| serde::de::Error::custom("expected an integer"))
}

pub(crate) fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flex>::deserialize(deserializer)?.and_then(|f| f.as_i64()))
}

pub(crate) fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flex>::deserialize(deserializer)?.and_then(|f| f.as_f64()))
}

fn de_opt_epoch_ms<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flex>::deserialize(deserializer)?
        .and_then(|f| f.as_i64())
        .and_then(DateTime::from_timestamp_millis))
}

// ---------------------------------------------------------------------------
// Match lists: matches/v1/{live,recent,upcoming}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListResponse {
    #[serde(default)]
    pub type_matches: Vec<TypeMatches>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMatches {
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub series_matches: Vec<SeriesMatches>,
}

/// Either a series block or an advert slot, which has no wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMatches {
    #[serde(default)]
    pub series_ad_wrapper: Option<SeriesAdWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAdWrapper {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub series_id: Option<i64>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub matches: Vec<ApiMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMatch {
    pub match_info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(deserialize_with = "de_i64")]
    pub match_id: i64,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub series_id: Option<i64>,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub match_desc: Option<String>,
    #[serde(default)]
    pub match_format: Option<String>,
    #[serde(default, deserialize_with = "de_opt_epoch_ms")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub team1: ApiTeam,
    pub team2: ApiTeam,
    #[serde(default)]
    pub venue_info: Option<ApiVenue>,
}

impl MatchInfo {
    pub fn id(&self) -> MatchId {
        MatchId::new(self.match_id)
    }

    /// Lifecycle status from `state`; a missing state means not started.
    pub fn match_status(&self) -> MatchStatus {
        self.state
            .as_deref()
            .map(MatchStatus::from_api_state)
            .unwrap_or(MatchStatus::Scheduled)
    }

    /// Local match row. Result fields are filled in later from the match
    /// centre, so they start empty.
    pub fn to_match(&self, venue_id: Option<VenueId>) -> Match {
        Match {
            id: self.id(),
            series_id: self.series_id.map(SeriesId::new),
            team1_id: TeamId::new(self.team1.team_id),
            team2_id: TeamId::new(self.team2.team_id),
            venue_id,
            status: self.match_status(),
            format: self.match_format.clone(),
            start_time: self.start_date,
            description: self.match_desc.clone(),
            winner_id: None,
            win_margin: None,
            victory_type: None,
            toss_winner_id: None,
            toss_decision: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTeam {
    #[serde(alias = "id", deserialize_with = "de_i64")]
    pub team_id: i64,
    #[serde(alias = "name")]
    pub team_name: String,
    #[serde(default, alias = "shortName")]
    pub team_s_name: Option<String>,
}

impl ApiTeam {
    pub fn to_team(&self) -> Team {
        Team {
            id: TeamId::new(self.team_id),
            name: self.team_name.clone(),
            short_name: self.team_s_name.clone(),
            country: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVenue {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub ground: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub capacity: Option<i64>,
}

/// One match from a list endpoint, with its series context.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub info: MatchInfo,
    pub series_name: Option<String>,
}

impl MatchListResponse {
    /// Flatten the type → series → match nesting, skipping advert slots.
    pub fn into_summaries(self) -> Vec<MatchSummary> {
        self.type_matches
            .into_iter()
            .flat_map(|t| t.series_matches)
            .filter_map(|s| s.series_ad_wrapper)
            .flat_map(|wrapper| {
                let series_name = wrapper.series_name;
                let series_id = wrapper.series_id;
                wrapper.matches.into_iter().map(move |m| {
                    let mut info = m.match_info;
                    if info.series_id.is_none() {
                        info.series_id = series_id;
                    }
                    MatchSummary {
                        series_name: info.series_name.clone().or_else(|| series_name.clone()),
                        info,
                    }
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Match centre: mcenter/v1/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCentre {
    pub match_header: MatchHeader,
    #[serde(default)]
    pub match_info: Option<MatchCentreInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCentreInfo {
    #[serde(default)]
    pub venue: Option<ApiVenue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHeader {
    #[serde(deserialize_with = "de_i64")]
    pub match_id: i64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub match_format: Option<String>,
    #[serde(default)]
    pub toss_results: Option<TossResults>,
    #[serde(default)]
    pub result: Option<MatchResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TossResults {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub toss_winner_id: Option<i64>,
    #[serde(default)]
    pub decision: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(default)]
    pub result_type: Option<String>,
    #[serde(default, alias = "winningteamId", deserialize_with = "de_opt_i64")]
    pub winning_team_id: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub winning_margin: Option<i64>,
    #[serde(default)]
    pub win_by_runs: Option<bool>,
    #[serde(default)]
    pub win_by_innings: Option<bool>,
}

/// Result and toss fields to merge into a stored match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub status: MatchStatus,
    pub winner_id: Option<TeamId>,
    pub win_margin: Option<String>,
    pub victory_type: Option<String>,
    pub toss_winner_id: Option<TeamId>,
    pub toss_decision: Option<String>,
}

impl MatchHeader {
    pub fn outcome(&self) -> MatchOutcome {
        let status = self
            .state
            .as_deref()
            .map(MatchStatus::from_api_state)
            .unwrap_or(MatchStatus::Scheduled);

        let (winner_id, win_margin, victory_type) = match &self.result {
            Some(result) if result.winning_team_id.is_some() => {
                let unit = if result.win_by_innings == Some(true) {
                    "innings"
                } else if result.win_by_runs == Some(true) {
                    "runs"
                } else {
                    "wickets"
                };
                let margin = result.winning_margin.map(|m| match unit {
                    "innings" => format!("innings and {m} runs"),
                    _ => format!("{m} {unit}"),
                });
                (
                    result.winning_team_id.map(TeamId::new),
                    margin,
                    Some(unit.to_string()),
                )
            }
            _ => (None, None, None),
        };

        let toss = self.toss_results.as_ref();
        MatchOutcome {
            status,
            winner_id,
            win_margin,
            victory_type,
            toss_winner_id: toss.and_then(|t| t.toss_winner_id).map(TeamId::new),
            toss_decision: toss.and_then(|t| t.decision.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Teams and squads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TeamListResponse {
    #[serde(default)]
    pub list: Vec<TeamListEntry>,
}

/// Entries without an id are section headings ("Test Teams", ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListEntry {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub team_id: Option<i64>,
    pub team_name: String,
    #[serde(default)]
    pub team_s_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

impl TeamListResponse {
    pub fn into_teams(self) -> Vec<Team> {
        self.list
            .into_iter()
            .filter_map(|entry| {
                let id = entry.team_id?;
                Some(Team {
                    id: TeamId::new(id),
                    country: entry.country_name.or_else(|| Some(entry.team_name.clone())),
                    name: entry.team_name,
                    short_name: entry.team_s_name,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquadResponse {
    #[serde(default)]
    pub player: Vec<SquadEntry>,
}

/// A squad row. Rows without an id are headings ("BATSMEN", "BOWLER", ...)
/// that set the role of the rows beneath them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadEntry {
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub batting_style: Option<String>,
    #[serde(default)]
    pub bowling_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquadPlayer {
    pub id: i64,
    pub name: String,
    pub role: Option<PlayerRole>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
}

impl SquadResponse {
    pub fn into_players(self) -> Vec<SquadPlayer> {
        let mut role = None;
        let mut players = Vec::new();
        for entry in self.player {
            match entry.id {
                None => role = entry.name.parse::<PlayerRole>().ok(),
                Some(id) => players.push(SquadPlayer {
                    id,
                    name: entry.name,
                    role,
                    batting_style: entry.batting_style,
                    bowling_style: entry.bowling_style,
                }),
            }
        }
        players
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bat: Option<String>,
    #[serde(default)]
    pub bowl: Option<String>,
    #[serde(default)]
    pub intl_team: Option<String>,
    #[serde(default, rename = "DoBFormat")]
    pub date_of_birth: Option<String>,
}

impl PlayerProfile {
    /// The profile as a player record. Profiles name the international side
    /// without its id, so the team is left unset and the side becomes the
    /// country.
    pub fn to_player(&self) -> Player {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Player {
            id: PlayerId::new(self.id),
            name: self.name.trim().to_string(),
            team_id: None,
            country: text(&self.intl_team),
            role: self.role.as_deref().and_then(|r| r.parse().ok()),
            batting_style: text(&self.bat),
            bowling_style: text(&self.bowl),
            date_of_birth: self.date_of_birth.as_deref().and_then(parse_birth_date),
        }
    }
}

/// `DoBFormat` reads like "November 05, 1988"; ISO dates are accepted too.
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%B %d, %Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSearchResponse {
    #[serde(default)]
    pub player: Vec<PlayerSearchHit>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSearchHit {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Career table from the batting/bowling stats endpoints: a header row of
/// formats and one row per statistic.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub values: Vec<StatsRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsRow {
    #[serde(default)]
    pub values: Vec<String>,
}

impl StatsTable {
    /// Value of `stat` (e.g. "Runs") in the `format` column (e.g. "ODI").
    pub fn value(&self, stat: &str, format: &str) -> Option<&str> {
        let column = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(format))?;
        self.values
            .iter()
            .find(|row| {
                row.values
                    .first()
                    .is_some_and(|name| name.eq_ignore_ascii_case(stat))
            })
            .and_then(|row| row.values.get(column))
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Series and venues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesListResponse {
    #[serde(default)]
    pub series_map_proto: Vec<SeriesMonth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesMonth {
    #[serde(default)]
    pub series: Vec<SeriesSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_epoch_ms")]
    pub start_dt: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_opt_epoch_ms")]
    pub end_dt: Option<DateTime<Utc>>,
}

impl SeriesListResponse {
    pub fn into_series(self) -> Vec<SeriesSummary> {
        self.series_map_proto
            .into_iter()
            .flat_map(|month| month.series)
            .collect()
    }
}

impl SeriesSummary {
    pub fn to_series(&self) -> Series {
        Series {
            id: SeriesId::new(self.id),
            name: self.name.trim().to_string(),
            host_country: None,
            match_type: None,
            start_date: self.start_dt.map(|d| d.date_naive()),
            end_date: self.end_dt.map(|d| d.date_naive()),
            total_matches: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_list_json() -> serde_json::Value {
        json!({
            "typeMatches": [{
                "matchType": "International",
                "seriesMatches": [
                    {
                        "seriesAdWrapper": {
                            "seriesId": 7572,
                            "seriesName": "India tour of Australia",
                            "matches": [{
                                "matchInfo": {
                                    "matchId": 100238,
                                    "matchDesc": "1st ODI",
                                    "matchFormat": "ODI",
                                    "startDate": "1700000000000",
                                    "state": "In Progress",
                                    "status": "India opt to bat",
                                    "team1": {"teamId": 2, "teamName": "India", "teamSName": "IND"},
                                    "team2": {"teamId": 4, "teamName": "Australia", "teamSName": "AUS"},
                                    "venueInfo": {"id": 31, "ground": "MCG", "city": "Melbourne"}
                                },
                                "matchScore": {}
                            }]
                        }
                    },
                    {"adDetail": {"name": "native_matches"}}
                ]
            }]
        })
    }

    #[test]
    fn test_match_list_flattens_and_skips_adverts() {
        let list: MatchListResponse = serde_json::from_value(match_list_json()).unwrap();
        let summaries = list.into_summaries();

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.info.match_id, 100238);
        assert_eq!(summary.info.series_id, Some(7572));
        assert_eq!(
            summary.series_name.as_deref(),
            Some("India tour of Australia")
        );
        assert_eq!(summary.info.match_status(), MatchStatus::Live);
        assert_eq!(
            summary.info.start_date.map(|d| d.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn test_match_info_to_match() {
        let list: MatchListResponse = serde_json::from_value(match_list_json()).unwrap();
        let info = &list.into_summaries()[0].info;
        let m = info.to_match(Some(VenueId::new(3)));

        assert_eq!(m.id, MatchId::new(100238));
        assert_eq!(m.team1_id, TeamId::new(2));
        assert_eq!(m.team2_id, TeamId::new(4));
        assert_eq!(m.venue_id, Some(VenueId::new(3)));
        assert_eq!(m.format.as_deref(), Some("ODI"));
        assert!(m.winner_id.is_none());
    }

    #[test]
    fn test_missing_team_is_an_error() {
        let bad = json!({"matchInfo": {"matchId": 1, "team1": {"teamId": 2, "teamName": "India"}}});
        let result: Result<ApiMatch, _> = serde_json::from_value(bad);
        assert!(result.is_err());
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let team: ApiTeam =
            serde_json::from_value(json!({"teamId": "2", "teamName": "India"})).unwrap();
        assert_eq!(team.team_id, 2);
    }

    #[test]
    fn test_team_list_skips_headings() {
        let teams: TeamListResponse = serde_json::from_value(json!({
            "list": [
                {"teamName": "Test Teams"},
                {"teamId": 2, "teamName": "India", "teamSName": "IND"},
                {"teamId": 4, "teamName": "Australia", "teamSName": "AUS", "countryName": "Australia"}
            ]
        }))
        .unwrap();
        let teams = teams.into_teams();

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].name, "India");
        assert_eq!(teams[0].country.as_deref(), Some("India"));
        assert_eq!(teams[1].short_name.as_deref(), Some("AUS"));
    }

    #[test]
    fn test_squad_headings_assign_roles() {
        let squad: SquadResponse = serde_json::from_value(json!({
            "player": [
                {"name": "BATSMEN"},
                {"id": "1413", "name": "Virat Kohli", "battingStyle": "Right-hand bat"},
                {"name": "WICKET KEEPER"},
                {"id": "10744", "name": "Rishabh Pant"},
                {"name": "BOWLER"},
                {"id": "9311", "name": "Jasprit Bumrah", "bowlingStyle": "Right-arm fast"}
            ]
        }))
        .unwrap();
        let players = squad.into_players();

        assert_eq!(players.len(), 3);
        assert_eq!(players[0].id, 1413);
        assert_eq!(players[0].role, Some(PlayerRole::Batsman));
        assert_eq!(players[1].role, Some(PlayerRole::WicketKeeper));
        assert_eq!(players[2].role, Some(PlayerRole::Bowler));
        assert_eq!(players[2].bowling_style.as_deref(), Some("Right-arm fast"));
    }

    #[test]
    fn test_match_header_outcome_by_wickets() {
        let centre: MatchCentre = serde_json::from_value(json!({
            "matchHeader": {
                "matchId": 100238,
                "state": "Complete",
                "status": "India won by 7 wkts",
                "tossResults": {"tossWinnerId": 4, "decision": "Batting"},
                "result": {"resultType": "win", "winningteamId": 2, "winningMargin": 7,
                           "winByRuns": false, "winByInnings": false}
            }
        }))
        .unwrap();
        let outcome = centre.match_header.outcome();

        assert_eq!(outcome.status, MatchStatus::Completed);
        assert_eq!(outcome.winner_id, Some(TeamId::new(2)));
        assert_eq!(outcome.win_margin.as_deref(), Some("7 wickets"));
        assert_eq!(outcome.victory_type.as_deref(), Some("wickets"));
        assert_eq!(outcome.toss_winner_id, Some(TeamId::new(4)));
        assert_eq!(outcome.toss_decision.as_deref(), Some("Batting"));
    }

    #[test]
    fn test_match_header_in_progress_has_no_winner() {
        let header: MatchHeader = serde_json::from_value(json!({
            "matchId": 5, "state": "In Progress", "result": {}
        }))
        .unwrap();
        let outcome = header.outcome();
        assert_eq!(outcome.status, MatchStatus::Live);
        assert!(outcome.winner_id.is_none());
        assert!(outcome.victory_type.is_none());
    }

    #[test]
    fn test_stats_table_lookup() {
        let table: StatsTable = serde_json::from_value(json!({
            "headers": ["ROWHEADER", "Test", "ODI", "T20"],
            "values": [
                {"values": ["Matches", "113", "292", "125"]},
                {"values": ["Runs", "8848", "13848", "4188"]}
            ]
        }))
        .unwrap();
        assert_eq!(table.value("Runs", "ODI"), Some("13848"));
        assert_eq!(table.value("runs", "t20"), Some("4188"));
        assert_eq!(table.value("Wickets", "ODI"), None);
        assert_eq!(table.value("Runs", "IPL"), None);
    }

    #[test]
    fn test_series_list_flattens_months() {
        let list: SeriesListResponse = serde_json::from_value(json!({
            "seriesMapProto": [
                {"date": "SEPTEMBER 2025", "series": [
                    {"id": 10587, "name": "Asia Cup 2025", "startDt": "1757462400000", "endDt": "1759017600000"}
                ]},
                {"date": "OCTOBER 2025", "series": [{"id": 10600, "name": "Women's World Cup"}]}
            ]
        }))
        .unwrap();
        let series = list.into_series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].id, 10587);
        assert!(series[0].start_dt.is_some());
        assert!(series[1].end_dt.is_none());

        let stored = series[0].to_series();
        assert_eq!(stored.start_date, NaiveDate::from_ymd_opt(2025, 9, 10));
        assert_eq!(stored.end_date, NaiveDate::from_ymd_opt(2025, 9, 28));
    }

    #[test]
    fn test_profile_to_player() {
        let profile: PlayerProfile = serde_json::from_value(json!({
            "id": "1413",
            "name": "Virat Kohli ",
            "role": "Batsman",
            "bat": "Right Handed Bat",
            "bowl": "",
            "intlTeam": "India",
            "DoBFormat": "November 05, 1988"
        }))
        .unwrap();

        let player = profile.to_player();
        assert_eq!(player.id, PlayerId::new(1413));
        assert_eq!(player.name, "Virat Kohli");
        assert_eq!(player.team_id, None);
        assert_eq!(player.country.as_deref(), Some("India"));
        assert_eq!(player.role, Some(PlayerRole::Batsman));
        assert_eq!(player.batting_style.as_deref(), Some("Right Handed Bat"));
        assert_eq!(player.bowling_style, None);
        assert_eq!(player.date_of_birth, NaiveDate::from_ymd_opt(1988, 11, 5));
    }

    #[test]
    fn test_venue_capacity_with_separators() {
        let venue: ApiVenue = serde_json::from_value(json!({
            "ground": "Eden Gardens", "city": "Kolkata", "country": "India", "capacity": "68,000"
        }))
        .unwrap();
        assert_eq!(venue.capacity, Some(68000));
    }
}

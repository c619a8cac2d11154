//! Scorecard payload (`mcenter/v1/{id}/scard`) and its conversion into
//! per-player statistics rows.
//!
//! Two innings layouts are accepted: flat `batsman`/`bowler`/`fielder`
//! lists, and the structured `batTeamDetails.batsmenData` /
//! `bowlTeamDetails.bowlersData` / `fieldingData` maps keyed `bat_1`,
//! `bowl_1`, and so on.

use super::types::{de_i64, de_opt_f64, de_opt_i64};
use crate::cli::types::{MatchId, PlayerId, TeamId};
use crate::storage::models::{BattingStat, BowlingStat, FieldingStat, Partnership};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Scorecard {
    #[serde(default, alias = "scoreCard")]
    pub scorecard: Vec<Innings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Innings {
    #[serde(default, alias = "inningsId", deserialize_with = "de_opt_i64")]
    pub inningsid: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub batteamid: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub bowlteamid: Option<i64>,
    #[serde(default)]
    pub batsman: Vec<ScorecardBatter>,
    #[serde(default)]
    pub bowler: Vec<ScorecardBowler>,
    #[serde(default)]
    pub fielder: Vec<ScorecardFielder>,
    #[serde(default)]
    pub partnerships: Vec<ScorecardPartnership>,
    #[serde(default, alias = "batTeamDetails")]
    pub bat_team_details: Option<TeamDetails>,
    #[serde(default, alias = "bowlTeamDetails")]
    pub bowl_team_details: Option<TeamDetails>,
    #[serde(default, alias = "fieldingData")]
    pub fielding_data: Option<FieldingData>,
}

/// One side's block in the structured layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    #[serde(
        default,
        alias = "batTeamId",
        alias = "bowlTeamId",
        deserialize_with = "de_opt_i64"
    )]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub batsmen_data: BTreeMap<String, ScorecardBatter>,
    #[serde(default)]
    pub bowlers_data: BTreeMap<String, ScorecardBowler>,
    #[serde(default)]
    pub partnerships: Vec<ScorecardPartnership>,
}

/// `fieldingData` arrives keyed by player id or as a plain list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldingData {
    Keyed(BTreeMap<String, ScorecardFielder>),
    Listed(Vec<ScorecardFielder>),
}

impl Innings {
    fn bat_team(&self) -> Option<i64> {
        self.batteamid
            .or_else(|| self.bat_team_details.as_ref()?.team_id)
    }

    fn bowl_team(&self) -> Option<i64> {
        self.bowlteamid
            .or_else(|| self.bowl_team_details.as_ref()?.team_id)
    }

    /// Batters in batting order.
    fn batters(&self) -> Vec<ScorecardBatter> {
        if !self.batsman.is_empty() {
            return self.batsman.clone();
        }
        self.bat_team_details
            .as_ref()
            .map(|d| numbered(&d.batsmen_data))
            .unwrap_or_default()
    }

    fn bowlers(&self) -> Vec<ScorecardBowler> {
        if !self.bowler.is_empty() {
            return self.bowler.clone();
        }
        self.bowl_team_details
            .as_ref()
            .map(|d| numbered(&d.bowlers_data))
            .unwrap_or_default()
    }

    /// Fielders with a usable id, from either layout.
    fn fielders(&self) -> Vec<(i64, ScorecardFielder)> {
        let keyed: Vec<(Option<i64>, &ScorecardFielder)> = match &self.fielding_data {
            Some(FieldingData::Keyed(map)) => map
                .iter()
                .map(|(key, f)| (f.id.or_else(|| key.trim().parse().ok()), f))
                .collect(),
            Some(FieldingData::Listed(list)) => list.iter().map(|f| (f.id, f)).collect(),
            None => Vec::new(),
        };
        self.fielder
            .iter()
            .map(|f| (f.id, f))
            .chain(keyed)
            .filter_map(|(id, f)| id.filter(|id| *id > 0).map(|id| (id, f.clone())))
            .collect()
    }

    fn listed_partnerships(&self) -> &[ScorecardPartnership] {
        match &self.bat_team_details {
            Some(details) if self.partnerships.is_empty() => &details.partnerships,
            _ => &self.partnerships,
        }
    }
}

/// Values of a `{"bat_1": .., "bat_2": ..}` map in numeric key order.
fn numbered<T: Clone>(map: &BTreeMap<String, T>) -> Vec<T> {
    let mut entries: Vec<(i64, &T)> = map
        .iter()
        .map(|(key, value)| {
            let n = key
                .rsplit('_')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(i64::MAX);
            (n, value)
        })
        .collect();
    entries.sort_by_key(|(n, _)| *n);
    entries.into_iter().map(|(_, value)| value.clone()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardBatter {
    #[serde(alias = "playerId", alias = "batId", deserialize_with = "de_i64")]
    pub id: i64,
    #[serde(default, alias = "batName")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub runs: Option<i64>,
    #[serde(default, alias = "ballsFaced", deserialize_with = "de_opt_i64")]
    pub balls: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub fours: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub sixes: Option<i64>,
    #[serde(default, alias = "strikeRate", alias = "sr", deserialize_with = "de_opt_f64")]
    pub strkrate: Option<f64>,
    #[serde(default, alias = "outDesc")]
    pub outdec: Option<String>,
    #[serde(default, rename = "isOut")]
    pub out_flag: Option<bool>,
}

impl ScorecardBatter {
    /// An explicit `isOut` wins; otherwise read the dismissal text. `None`
    /// when neither is present.
    fn is_out(&self) -> Option<bool> {
        if self.out_flag.is_some() {
            return self.out_flag;
        }
        let desc = self.outdec.as_deref()?.trim().to_ascii_lowercase();
        if desc.is_empty() {
            return None;
        }
        Some(!(desc.contains("not out") || desc == "batting"))
    }

    fn strike_rate(&self) -> Option<f64> {
        self.strkrate.or_else(|| {
            let balls = self.balls.filter(|b| *b > 0)?;
            let runs = self.runs.unwrap_or(0) as f64;
            Some((runs / balls as f64 * 10000.0).round() / 100.0)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardBowler {
    #[serde(alias = "playerId", alias = "bowlerId", deserialize_with = "de_i64")]
    pub id: i64,
    #[serde(default, alias = "bowlName")]
    pub name: Option<String>,
    #[serde(default, alias = "o", deserialize_with = "de_opt_f64")]
    pub overs: Option<f64>,
    #[serde(default, alias = "m", deserialize_with = "de_opt_i64")]
    pub maidens: Option<i64>,
    #[serde(default, alias = "r", deserialize_with = "de_opt_i64")]
    pub runs: Option<i64>,
    #[serde(default, alias = "w", deserialize_with = "de_opt_i64")]
    pub wickets: Option<i64>,
    #[serde(default, alias = "eco", deserialize_with = "de_opt_f64")]
    pub economy: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardFielder {
    #[serde(default, alias = "playerId", deserialize_with = "de_opt_i64")]
    pub id: Option<i64>,
    #[serde(default, alias = "playerName")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub catches: Option<i64>,
    #[serde(default, alias = "st", deserialize_with = "de_opt_i64")]
    pub stumpings: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardPartnership {
    #[serde(
        alias = "bat1Id",
        alias = "p1Id",
        alias = "strikerId",
        deserialize_with = "de_i64"
    )]
    pub player1_id: i64,
    #[serde(
        alias = "bat2Id",
        alias = "p2Id",
        alias = "nonStrikerId",
        deserialize_with = "de_i64"
    )]
    pub player2_id: i64,
    #[serde(default, alias = "totalRuns", alias = "r", deserialize_with = "de_opt_i64")]
    pub runs: Option<i64>,
    #[serde(default, alias = "totalBalls", alias = "b", deserialize_with = "de_opt_i64")]
    pub balls: Option<i64>,
}

/// A player seen on a scorecard, with the side they played for if known.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorecardPlayer {
    pub id: PlayerId,
    pub name: String,
    pub team_id: Option<TeamId>,
}

/// Everything a scorecard contributes to the database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorecardRows {
    pub players: Vec<ScorecardPlayer>,
    pub batting: Vec<BattingStat>,
    pub bowling: Vec<BowlingStat>,
    pub fielding: Vec<FieldingStat>,
    pub partnerships: Vec<Partnership>,
}

impl ScorecardRows {
    fn note_player(&mut self, id: i64, name: Option<&str>, team: Option<i64>) {
        let id = PlayerId::new(id);
        if self.players.iter().any(|p| p.id == id) {
            return;
        }
        self.players.push(ScorecardPlayer {
            id,
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Player {id}")),
            team_id: team.map(TeamId::new),
        });
    }
}

impl Scorecard {
    /// Convert to statistics rows for `match_id`.
    ///
    /// Innings without an id are numbered by position. When an innings has no
    /// partnership block, stands are derived from consecutive batters in
    /// batting order: the opening stand counts both openers, each later stand
    /// counts the incoming batter's runs and balls.
    pub fn to_rows(&self, match_id: MatchId) -> ScorecardRows {
        let mut rows = ScorecardRows::default();

        for (index, innings) in self.scorecard.iter().enumerate() {
            let innings_no = innings.inningsid.unwrap_or(index as i64 + 1);
            let bat_team = innings.bat_team();
            let bowl_team = innings.bowl_team();
            let batters = innings.batters();

            for (position, batter) in batters.iter().enumerate() {
                rows.note_player(batter.id, batter.name.as_deref(), bat_team);
                rows.batting.push(BattingStat {
                    match_id,
                    player_id: PlayerId::new(batter.id),
                    innings_no,
                    team_id: bat_team.map(TeamId::new),
                    runs: batter.runs.unwrap_or(0),
                    balls: batter.balls.unwrap_or(0),
                    fours: batter.fours.unwrap_or(0),
                    sixes: batter.sixes.unwrap_or(0),
                    strike_rate: batter.strike_rate(),
                    batting_pos: Some(position as i64 + 1),
                    is_out: batter.is_out(),
                });
            }

            for bowler in &innings.bowlers() {
                rows.note_player(bowler.id, bowler.name.as_deref(), bowl_team);
                rows.bowling.push(BowlingStat {
                    match_id,
                    player_id: PlayerId::new(bowler.id),
                    innings_no,
                    team_id: bowl_team.map(TeamId::new),
                    overs: bowler.overs.unwrap_or(0.0),
                    maidens: bowler.maidens.unwrap_or(0),
                    runs: bowler.runs.unwrap_or(0),
                    wickets: bowler.wickets.unwrap_or(0),
                    economy: bowler.economy,
                });
            }

            for (id, fielder) in innings.fielders() {
                rows.note_player(id, fielder.name.as_deref(), bowl_team);
                rows.fielding.push(FieldingStat {
                    match_id,
                    player_id: PlayerId::new(id),
                    catches: fielder.catches.unwrap_or(0),
                    stumpings: fielder.stumpings.unwrap_or(0),
                });
            }

            let listed = innings.listed_partnerships();
            if listed.is_empty() {
                rows.partnerships
                    .extend(derive_partnerships(match_id, innings_no, &batters));
            } else {
                for p in listed {
                    rows.note_player(p.player1_id, None, bat_team);
                    rows.note_player(p.player2_id, None, bat_team);
                    rows.partnerships.push(Partnership {
                        match_id,
                        innings_no,
                        player1_id: PlayerId::new(p.player1_id),
                        player2_id: PlayerId::new(p.player2_id),
                        runs: p.runs.unwrap_or(0),
                        balls: p.balls,
                        pair_pos_diff: None,
                    });
                }
            }
        }

        rows.fielding = merge_fielding(rows.fielding);
        rows
    }
}

fn derive_partnerships(
    match_id: MatchId,
    innings_no: i64,
    batters: &[ScorecardBatter],
) -> Vec<Partnership> {
    batters
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (first, second) = (&pair[0], &pair[1]);
            let (runs, balls) = if i == 0 {
                (
                    first.runs.unwrap_or(0) + second.runs.unwrap_or(0),
                    first.balls.unwrap_or(0) + second.balls.unwrap_or(0),
                )
            } else {
                (second.runs.unwrap_or(0), second.balls.unwrap_or(0))
            };
            Partnership {
                match_id,
                innings_no,
                player1_id: PlayerId::new(first.id),
                player2_id: PlayerId::new(second.id),
                runs,
                balls: Some(balls),
                pair_pos_diff: Some(1),
            }
        })
        .collect()
}

/// A fielder can appear in both innings lists; fielding rows are per match.
fn merge_fielding(rows: Vec<FieldingStat>) -> Vec<FieldingStat> {
    let mut merged: Vec<FieldingStat> = Vec::with_capacity(rows.len());
    for row in rows {
        match merged.iter_mut().find(|m| m.player_id == row.player_id) {
            Some(existing) => {
                existing.catches += row.catches;
                existing.stumpings += row.stumpings;
            }
            None => merged.push(row),
        }
    }
    merged
}

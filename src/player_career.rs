//! Career profile of a single batter: the player's deliveries faced, broken
//! down by season, team, venue, innings and game phase, plus per-match score
//! metrics and the bowlers they faced most.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;
use thiserror::Error;

use crate::dataset::{Delivery, Match, Name};
use crate::tally::Tally;

pub const TOP_SCORES: usize = 10;
pub const MATCHUP_LIMIT: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CareerError {
    #[error("no deliveries faced by '{player}'")]
    EmptyPlayerData { player: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Powerplay, Phase::Middle, Phase::Death];

    /// Overs are 1-indexed: 1-6 powerplay, 7-15 middle, 16 onward death.
    pub fn from_over(over: u8) -> Self {
        match over {
            0..=6 => Phase::Powerplay,
            7..=15 => Phase::Middle,
            _ => Phase::Death,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Powerplay => "Powerplay",
            Phase::Middle => "Middle",
            Phase::Death => "Death",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BattingLine {
    pub runs: u32,
    pub balls: u32,
    pub dismissals: u32,
    pub average: f64,
    pub strike_rate: f64,
    pub matches: usize,
}

/// One row of a keyed breakdown (season, team, venue, innings or phase).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown<K> {
    pub key: K,
    #[serde(flatten)]
    pub stats: BattingLine,
}

pub type SeasonStats = Breakdown<u16>;
pub type TeamStats = Breakdown<Name>;
pub type VenueStats = Breakdown<Name>;
pub type InningsStats = Breakdown<u8>;
pub type PhaseStats = Breakdown<Phase>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerSpan {
    pub seasons: Vec<u16>,
    pub total_seasons: usize,
    pub total_matches: usize,
}

impl CareerSpan {
    pub fn first_season(&self) -> Option<u16> {
        self.seasons.first().copied()
    }

    pub fn last_season(&self) -> Option<u16> {
        self.seasons.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub total_runs: u32,
    pub total_balls: u32,
    pub dismissals: u32,
    pub fours: u32,
    pub sixes: u32,
    pub average: f64,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub match_id: u32,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestones {
    /// Descending, at most [`TOP_SCORES`].
    pub highest_scores: Vec<u32>,
    pub centuries: usize,
    pub half_centuries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consistency {
    pub mean_score: f64,
    pub median_score: f64,
    pub std_deviation: f64,
    pub coefficient_of_variation: f64,
    pub scores_above_50: usize,
    pub scores_above_30: usize,
    pub ducks: usize,
    pub total_innings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlerMatchup {
    pub bowler: Name,
    pub runs: u32,
    pub balls: u32,
    pub dismissals: u32,
    pub strike_rate: f64,
    pub average: f64,
}

/// Team results around the player. Not a captaincy record: the dataset
/// carries no captain field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leadership {
    pub mom_awards: usize,
    /// Matches the player batted in.
    pub matches_batted: usize,
    /// Of those, matches won by the team the player batted for.
    pub team_wins: usize,
    pub team_win_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerProfile {
    pub player: Name,
    pub career_span: CareerSpan,
    pub basic_stats: BasicStats,
    pub season_performance: Vec<SeasonStats>,
    pub team_performance: Vec<TeamStats>,
    pub venue_performance: Vec<VenueStats>,
    pub innings_performance: Vec<InningsStats>,
    pub phase_performance: Vec<PhaseStats>,
    pub dismissal_analysis: Tally<Name>,
    pub match_scores: Vec<MatchScore>,
    pub milestones: Milestones,
    pub consistency: Consistency,
    pub bowler_matchups: Vec<BowlerMatchup>,
    pub leadership: Leadership,
}

impl CareerProfile {
    pub fn phase(&self, phase: Phase) -> Option<&BattingLine> {
        self.phase_performance
            .iter()
            .find(|row| row.key == phase)
            .map(|row| &row.stats)
    }

    pub fn innings(&self, inning: u8) -> Option<&BattingLine> {
        self.innings_performance
            .iter()
            .find(|row| row.key == inning)
            .map(|row| &row.stats)
    }
}

#[derive(Debug, Clone, Default)]
struct Accum {
    runs: u32,
    balls: u32,
    dismissals: u32,
    fours: u32,
    sixes: u32,
    match_ids: HashSet<u32>,
}

impl Accum {
    fn add(&mut self, d: &Delivery, player: &str) {
        self.runs += d.batsman_runs;
        if d.is_ball_faced() {
            self.balls += 1;
        }
        if d.dismisses(player) {
            self.dismissals += 1;
        }
        match d.batsman_runs {
            4 => self.fours += 1,
            6 => self.sixes += 1,
            _ => {}
        }
        self.match_ids.insert(d.match_id);
    }

    fn line(&self) -> BattingLine {
        BattingLine {
            runs: self.runs,
            balls: self.balls,
            dismissals: self.dismissals,
            average: average(self.runs, self.dismissals),
            strike_rate: strike_rate(self.runs, self.balls),
            matches: self.match_ids.len(),
        }
    }
}

/// Accumulators keyed by category, in first-seen order.
#[derive(Debug)]
struct Grouped<K> {
    index: HashMap<K, usize>,
    slots: Vec<(K, Accum)>,
}

impl<K: Eq + Hash + Clone> Grouped<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
        }
    }

    fn slot(&mut self, key: &K) -> &mut Accum {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push((key.clone(), Accum::default()));
                self.slots.len() - 1
            }
        };
        &mut self.slots[idx].1
    }

    /// Rows ordered by runs, highest first; ties keep first-seen order.
    fn by_runs_desc(self) -> Vec<Breakdown<K>> {
        let mut rows: Vec<Breakdown<K>> = self
            .slots
            .into_iter()
            .map(|(key, acc)| Breakdown {
                key,
                stats: acc.line(),
            })
            .collect();
        rows.sort_by(|a, b| b.stats.runs.cmp(&a.stats.runs));
        rows
    }
}

fn ordered<K>(groups: BTreeMap<K, Accum>) -> Vec<Breakdown<K>> {
    groups
        .into_iter()
        .map(|(key, acc)| Breakdown {
            key,
            stats: acc.line(),
        })
        .collect()
}

pub fn analyze_player(
    matches: &[Match],
    deliveries: &[Delivery],
    player: &str,
) -> Result<CareerProfile, CareerError> {
    let faced: Vec<&Delivery> = deliveries.iter().filter(|d| &*d.batsman == player).collect();
    let Some(first) = faced.first() else {
        return Err(CareerError::EmptyPlayerData {
            player: player.to_string(),
        });
    };
    let player_name = first.batsman.clone();

    let faced_ids: HashSet<u32> = faced.iter().map(|d| d.match_id).collect();
    let played: Vec<&Match> = matches
        .iter()
        .filter(|m| m.is_player_of_match(player) || faced_ids.contains(&m.id))
        .collect();
    let by_id: HashMap<u32, &Match> = played.iter().map(|m| (m.id, *m)).collect();

    log::debug!(
        "{player}: {} deliveries faced across {} matches",
        faced.len(),
        played.len()
    );

    // Season and venue come from the match table, so every played match opens
    // its partition even when the player did not bat in it.
    let mut seasons: BTreeMap<u16, Accum> = BTreeMap::new();
    let mut venues: Grouped<Name> = Grouped::new();
    for m in &played {
        seasons.entry(m.season).or_default().match_ids.insert(m.id);
        venues.slot(&m.venue).match_ids.insert(m.id);
    }

    let mut teams: Grouped<Name> = Grouped::new();
    let mut innings: BTreeMap<u8, Accum> = BTreeMap::new();
    let mut phases: BTreeMap<Phase, Accum> =
        Phase::ALL.iter().map(|p| (*p, Accum::default())).collect();
    let mut per_match: Grouped<u32> = Grouped::new();
    let mut bowlers: Grouped<Name> = Grouped::new();
    let mut batted_for: HashMap<u32, Name> = HashMap::new();
    let mut total = Accum::default();

    for d in &faced {
        total.add(d, player);
        if let Some(m) = by_id.get(&d.match_id) {
            seasons.entry(m.season).or_default().add(d, player);
            venues.slot(&m.venue).add(d, player);
        }
        teams.slot(&d.batting_team).add(d, player);
        innings.entry(d.inning).or_default().add(d, player);
        phases
            .entry(Phase::from_over(d.over))
            .or_default()
            .add(d, player);
        per_match.slot(&d.match_id).add(d, player);
        bowlers.slot(&d.bowler).add(d, player);
        batted_for
            .entry(d.match_id)
            .or_insert_with(|| d.batting_team.clone());
    }

    let season_performance = ordered(seasons);
    let career_span = CareerSpan {
        seasons: season_performance.iter().map(|row| row.key).collect(),
        total_seasons: season_performance.len(),
        total_matches: played.len(),
    };

    let basic_stats = BasicStats {
        total_runs: total.runs,
        total_balls: total.balls,
        dismissals: total.dismissals,
        fours: total.fours,
        sixes: total.sixes,
        average: average(total.runs, total.dismissals),
        strike_rate: strike_rate(total.runs, total.balls),
    };

    let match_scores: Vec<MatchScore> = per_match
        .slots
        .iter()
        .map(|(match_id, acc)| MatchScore {
            match_id: *match_id,
            runs: acc.runs,
        })
        .collect();
    let scores: Vec<u32> = match_scores.iter().map(|s| s.runs).collect();

    let dismissal_analysis = Tally::count(
        faced
            .iter()
            .filter(|d| d.dismisses(player))
            .filter_map(|d| d.dismissal_kind.clone()),
    );

    let mom_awards = played.iter().filter(|m| m.is_player_of_match(player)).count();
    let team_wins = batted_for
        .iter()
        .filter(|(match_id, team)| {
            by_id
                .get(*match_id)
                .and_then(|m| m.winner.as_ref())
                .is_some_and(|winner| winner == *team)
        })
        .count();

    Ok(CareerProfile {
        player: player_name,
        career_span,
        basic_stats,
        season_performance,
        team_performance: teams.by_runs_desc(),
        venue_performance: venues.by_runs_desc(),
        innings_performance: ordered(innings),
        phase_performance: ordered(phases),
        dismissal_analysis,
        milestones: milestones(&scores),
        consistency: consistency(&scores),
        match_scores,
        bowler_matchups: bowler_matchups(bowlers),
        leadership: Leadership {
            mom_awards,
            matches_batted: batted_for.len(),
            team_wins,
            team_win_pct: pct(team_wins, batted_for.len()),
        },
    })
}

fn bowler_matchups(bowlers: Grouped<Name>) -> Vec<BowlerMatchup> {
    let mut rows: Vec<BowlerMatchup> = bowlers
        .slots
        .into_iter()
        .map(|(bowler, acc)| BowlerMatchup {
            bowler,
            runs: acc.runs,
            balls: acc.balls,
            dismissals: acc.dismissals,
            strike_rate: strike_rate(acc.runs, acc.balls),
            average: average(acc.runs, acc.dismissals),
        })
        .collect();
    rows.sort_by(|a, b| b.balls.cmp(&a.balls));
    rows.truncate(MATCHUP_LIMIT);
    rows
}

pub fn milestones(scores: &[u32]) -> Milestones {
    let mut highest_scores = scores.to_vec();
    highest_scores.sort_unstable_by(|a, b| b.cmp(a));
    highest_scores.truncate(TOP_SCORES);
    Milestones {
        highest_scores,
        centuries: scores.iter().filter(|s| **s >= 100).count(),
        half_centuries: scores.iter().filter(|s| (50..100).contains(*s)).count(),
    }
}

pub fn consistency(scores: &[u32]) -> Consistency {
    let values: Vec<f64> = scores.iter().map(|s| f64::from(*s)).collect();
    let mean = mean(&values);
    let std = population_std(&values, mean);
    let cv = if mean == 0.0 { 0.0 } else { std / mean * 100.0 };
    Consistency {
        mean_score: round2(mean),
        median_score: round2(median(&values)),
        std_deviation: round2(std),
        coefficient_of_variation: round2(cv),
        scores_above_50: scores.iter().filter(|s| **s >= 50).count(),
        scores_above_30: scores.iter().filter(|s| **s >= 30).count(),
        ducks: scores.iter().filter(|s| **s == 0).count(),
        total_innings: scores.len(),
    }
}

/// Runs per dismissal; 0 for a batter never dismissed.
pub fn average(runs: u32, dismissals: u32) -> f64 {
    if dismissals == 0 {
        0.0
    } else {
        round2(f64::from(runs) / f64::from(dismissals))
    }
}

/// Runs per 100 balls faced; 0 with no balls faced.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        0.0
    } else {
        round2(f64::from(runs) / f64::from(balls) * 100.0)
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

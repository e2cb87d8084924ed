use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::dataset::{Delivery, Match, Name};
use crate::tally::{Tally, TallyRow};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxMargins {
    pub max_run_win: Option<Match>,
    pub max_wicket_win: Option<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TossAnalysis {
    /// `None` when there are no matches to divide by.
    pub toss_winner_match_winner_pct: Option<f64>,
    pub toss_winner_wins: usize,
    pub decision_distribution: Tally<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPlayers {
    pub top_man_of_match: Tally<Name>,
    pub top_six_hitters: Tally<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DlAnalysis {
    pub dl_applied_overall: Tally<u8>,
    /// Seasons ascending.
    pub dl_per_season: Tally<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefendChaseStats {
    pub best_defending_teams: Tally<Name>,
    pub best_chasing_teams: Tally<Name>,
    pub best_venues_defending: Tally<Name>,
    pub best_venues_chasing: Tally<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_matches: usize,
    pub total_deliveries: usize,
    pub total_teams: usize,
    pub total_cities: usize,
    pub total_venues: usize,
    pub seasons: Vec<u16>,
    pub most_active_venue: Option<(Name, u64)>,
    pub avg_win_margin_runs: Option<f64>,
    pub avg_win_margin_wickets: Option<f64>,
}

/// Every league-level aggregation in one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueSummary {
    pub overview: DatasetOverview,
    pub max_margins: MaxMargins,
    pub city_stats: Tally<Name>,
    pub team_wins: Tally<Name>,
    pub toss: TossAnalysis,
    pub top_players: TopPlayers,
    pub dl: DlAnalysis,
    pub defend_chase: DefendChaseStats,
}

pub fn summarize(matches: &[Match], deliveries: &[Delivery], top_n: usize) -> LeagueSummary {
    LeagueSummary {
        overview: dataset_overview(matches, deliveries),
        max_margins: max_margin_victories(matches),
        city_stats: city_stats(matches),
        team_wins: team_wins(matches),
        toss: toss_analysis(matches),
        top_players: top_players(matches, deliveries, top_n),
        dl: dl_analysis(matches),
        defend_chase: defending_chasing_stats(matches),
    }
}

/// Largest win by runs and by wickets. Ties resolve to the earliest row.
pub fn max_margin_victories(matches: &[Match]) -> MaxMargins {
    MaxMargins {
        max_run_win: first_max_by(matches, |m| m.win_by_runs).cloned(),
        max_wicket_win: first_max_by(matches, |m| m.win_by_wickets).cloned(),
    }
}

fn first_max_by(matches: &[Match], value: impl Fn(&Match) -> u32) -> Option<&Match> {
    let mut best: Option<&Match> = None;
    for m in matches {
        match best {
            Some(current) if value(m) <= value(current) => {}
            _ => best = Some(m),
        }
    }
    best
}

pub fn city_stats(matches: &[Match]) -> Tally<Name> {
    Tally::count(matches.iter().filter_map(|m| m.city.clone()))
}

pub fn team_wins(matches: &[Match]) -> Tally<Name> {
    Tally::count(matches.iter().filter_map(|m| m.winner.clone()))
}

pub fn toss_analysis(matches: &[Match]) -> TossAnalysis {
    let toss_winner_wins = matches.iter().filter(|m| m.toss_winner_won()).count();
    let toss_winner_match_winner_pct = if matches.is_empty() {
        None
    } else {
        Some(toss_winner_wins as f64 / matches.len() as f64 * 100.0)
    };
    TossAnalysis {
        toss_winner_match_winner_pct,
        toss_winner_wins,
        decision_distribution: Tally::count(matches.iter().map(|m| m.toss_decision.clone())),
    }
}

pub fn top_players(matches: &[Match], deliveries: &[Delivery], top_n: usize) -> TopPlayers {
    let top_man_of_match =
        Tally::count(matches.iter().filter_map(|m| m.player_of_match.clone())).head(top_n);
    let top_six_hitters = Tally::count(
        deliveries
            .iter()
            .filter(|d| d.batsman_runs == 6)
            .map(|d| d.batsman.clone()),
    )
    .head(top_n);
    TopPlayers {
        top_man_of_match,
        top_six_hitters,
    }
}

pub fn dl_analysis(matches: &[Match]) -> DlAnalysis {
    let mut per_season: BTreeMap<u16, u64> = BTreeMap::new();
    for m in matches {
        *per_season.entry(m.season).or_insert(0) += u64::from(m.dl_applied);
    }
    DlAnalysis {
        dl_applied_overall: Tally::count(matches.iter().map(|m| m.dl_applied)),
        dl_per_season: Tally::from_rows(
            per_season
                .into_iter()
                .map(|(key, count)| TallyRow { key, count })
                .collect(),
        ),
    }
}

pub fn defending_chasing_stats(matches: &[Match]) -> DefendChaseStats {
    let defended = || matches.iter().filter(|m| m.defended());
    let chased = || matches.iter().filter(|m| m.chased());
    DefendChaseStats {
        best_defending_teams: Tally::count(defended().filter_map(|m| m.winner.clone())),
        best_chasing_teams: Tally::count(chased().filter_map(|m| m.winner.clone())),
        best_venues_defending: Tally::count(defended().map(|m| m.venue.clone())),
        best_venues_chasing: Tally::count(chased().map(|m| m.venue.clone())),
    }
}

pub fn dataset_overview(matches: &[Match], deliveries: &[Delivery]) -> DatasetOverview {
    let teams: HashSet<&Name> = matches.iter().map(|m| &m.team1).collect();
    let cities: HashSet<&Name> = matches.iter().filter_map(|m| m.city.as_ref()).collect();
    let mut seasons: Vec<u16> = matches.iter().map(|m| m.season).collect();
    seasons.sort_unstable();
    seasons.dedup();

    let venues = Tally::count(matches.iter().map(|m| m.venue.clone()));

    DatasetOverview {
        total_matches: matches.len(),
        total_deliveries: deliveries.len(),
        total_teams: teams.len(),
        total_cities: cities.len(),
        total_venues: venues.len(),
        seasons,
        most_active_venue: venues.first().map(|(k, n)| (k.clone(), n)),
        avg_win_margin_runs: mean_positive(matches.iter().map(|m| m.win_by_runs)),
        avg_win_margin_wickets: mean_positive(matches.iter().map(|m| m.win_by_wickets)),
    }
}

fn mean_positive(values: impl Iterator<Item = u32>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| *v > 0)
        .fold((0u64, 0usize), |(sum, n), v| (sum + u64::from(v), n + 1));
    if n == 0 {
        None
    } else {
        Some(sum as f64 / n as f64)
    }
}

pub fn business_insights() -> Vec<String> {
    [
        "Cities with higher match frequency indicate strong engagement potential.",
        "Toss advantage exists but is not overwhelmingly decisive.",
        "Certain teams dominate defending and chasing conditions.",
        "Venue characteristics significantly impact match outcomes.",
        "High six-hitting players contribute strongly to audience engagement.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

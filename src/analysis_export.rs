use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis::LeagueSummary;
use crate::player_career::{BattingLine, Breakdown, CareerProfile};
use crate::tally::Tally;

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
}

enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn text(value: impl ToString) -> Self {
        Cell::Text(value.to_string())
    }

    fn num(value: impl Into<f64>) -> Self {
        Cell::Number(value.into())
    }
}

type Sheet = (&'static str, Vec<Vec<Cell>>);

fn header(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| Cell::text(n)).collect()
}

fn tally_sheet<K: ToString>(name: &'static str, key: &str, tally: &Tally<K>) -> Sheet {
    let mut rows = vec![header(&[key, "Count"])];
    rows.extend(
        tally
            .iter()
            .map(|(k, n)| vec![Cell::text(k.to_string()), Cell::Number(n as f64)]),
    );
    (name, rows)
}

fn breakdown_sheet<K>(
    name: &'static str,
    key: &str,
    rows_in: &[Breakdown<K>],
    label: impl Fn(&K) -> String,
) -> Sheet {
    let mut rows = vec![header(&[
        key,
        "Matches",
        "Runs",
        "Balls",
        "Dismissals",
        "Average",
        "Strike Rate",
    ])];
    rows.extend(rows_in.iter().map(|row| line_cells(label(&row.key), &row.stats)));
    (name, rows)
}

fn line_cells(label: String, line: &BattingLine) -> Vec<Cell> {
    vec![
        Cell::Text(label),
        Cell::Number(line.matches as f64),
        Cell::num(line.runs),
        Cell::num(line.balls),
        Cell::num(line.dismissals),
        Cell::num(line.average),
        Cell::num(line.strike_rate),
    ]
}

fn league_sheets(summary: &LeagueSummary) -> Vec<Sheet> {
    let o = &summary.overview;
    let mut overview = vec![header(&["Metric", "Value"])];
    let pairs: [(&str, Cell); 9] = [
        ("Total matches", Cell::Number(o.total_matches as f64)),
        ("Total deliveries", Cell::Number(o.total_deliveries as f64)),
        ("Total teams", Cell::Number(o.total_teams as f64)),
        ("Total cities", Cell::Number(o.total_cities as f64)),
        ("Total venues", Cell::Number(o.total_venues as f64)),
        ("Seasons", Cell::Number(o.seasons.len() as f64)),
        (
            "Toss winner won %",
            summary
                .toss
                .toss_winner_match_winner_pct
                .map_or_else(|| Cell::text("N/A"), Cell::Number),
        ),
        (
            "Avg win margin (runs)",
            o.avg_win_margin_runs
                .map_or_else(|| Cell::text("N/A"), Cell::Number),
        ),
        (
            "Avg win margin (wickets)",
            o.avg_win_margin_wickets
                .map_or_else(|| Cell::text("N/A"), Cell::Number),
        ),
    ];
    overview.extend(pairs.into_iter().map(|(k, v)| vec![Cell::text(k), v]));

    let mut margins = vec![header(&[
        "Kind", "Match ID", "Season", "Winner", "Margin", "Venue",
    ])];
    let entries = [
        ("Runs", summary.max_margins.max_run_win.as_ref(), true),
        ("Wickets", summary.max_margins.max_wicket_win.as_ref(), false),
    ];
    for (kind, m, by_runs) in entries {
        if let Some(m) = m {
            margins.push(vec![
                Cell::text(kind),
                Cell::num(m.id),
                Cell::num(m.season),
                Cell::text(m.winner.as_deref().unwrap_or("")),
                Cell::num(if by_runs { m.win_by_runs } else { m.win_by_wickets }),
                Cell::text(&m.venue),
            ]);
        }
    }

    let dc = &summary.defend_chase;
    vec![
        ("Overview", overview),
        ("MaxMargins", margins),
        tally_sheet("Cities", "City", &summary.city_stats),
        tally_sheet("TeamWins", "Team", &summary.team_wins),
        tally_sheet(
            "TossDecisions",
            "Decision",
            &summary.toss.decision_distribution,
        ),
        tally_sheet(
            "ManOfMatch",
            "Player",
            &summary.top_players.top_man_of_match,
        ),
        tally_sheet("Sixes", "Player", &summary.top_players.top_six_hitters),
        tally_sheet("DLApplied", "DL", &summary.dl.dl_applied_overall),
        tally_sheet("DLPerSeason", "Season", &summary.dl.dl_per_season),
        tally_sheet("Defending", "Team", &dc.best_defending_teams),
        tally_sheet("Chasing", "Team", &dc.best_chasing_teams),
        tally_sheet("VenuesDefending", "Venue", &dc.best_venues_defending),
        tally_sheet("VenuesChasing", "Venue", &dc.best_venues_chasing),
    ]
}

fn player_sheets(profile: &CareerProfile) -> Vec<Sheet> {
    let mut matchups = vec![header(&[
        "Bowler",
        "Runs",
        "Balls",
        "Dismissals",
        "Strike Rate",
        "Average",
    ])];
    matchups.extend(profile.bowler_matchups.iter().map(|m| {
        vec![
            Cell::text(&m.bowler),
            Cell::num(m.runs),
            Cell::num(m.balls),
            Cell::num(m.dismissals),
            Cell::num(m.strike_rate),
            Cell::num(m.average),
        ]
    }));

    let mut scores = vec![header(&["Match ID", "Runs"])];
    scores.extend(
        profile
            .match_scores
            .iter()
            .map(|s| vec![Cell::num(s.match_id), Cell::num(s.runs)]),
    );

    vec![
        breakdown_sheet(
            "PlayerSeasons",
            "Season",
            &profile.season_performance,
            |k| k.to_string(),
        ),
        breakdown_sheet("PlayerTeams", "Team", &profile.team_performance, |k| {
            k.to_string()
        }),
        breakdown_sheet("PlayerVenues", "Venue", &profile.venue_performance, |k| {
            k.to_string()
        }),
        breakdown_sheet(
            "PlayerInnings",
            "Innings",
            &profile.innings_performance,
            |k| k.to_string(),
        ),
        breakdown_sheet("PlayerPhases", "Phase", &profile.phase_performance, |k| {
            k.label().to_string()
        }),
        tally_sheet("PlayerDismissals", "Kind", &profile.dismissal_analysis),
        ("PlayerMatchups", matchups),
        ("PlayerScores", scores),
    ]
}

/// Writes one sheet per league summary table and, with a profile, one per
/// career breakdown.
pub fn export_summary_workbook(
    path: &Path,
    summary: &LeagueSummary,
    profile: Option<&CareerProfile>,
) -> Result<ExportReport> {
    let mut sheets = league_sheets(summary);
    if let Some(profile) = profile {
        sheets.extend(player_sheets(profile));
    }

    let mut workbook = Workbook::new();
    let mut total_rows = 0usize;
    for (name, rows) in &sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, rows).with_context(|| format!("sheet {name}"))?;
        total_rows += rows.len().saturating_sub(1);
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        sheets: sheets.len(),
        rows: total_rows,
    })
}

pub fn write_profile_json(path: &Path, profile: &CareerProfile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile).context("serialize career profile")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Text(text) => worksheet.write_string(r, c, text),
                Cell::Number(n) => worksheet.write_number(r, c, *n),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::analysis::LeagueSummary;
use crate::charts::RenderedChart;
use crate::dataset::{DatasetInfo, Match};
use crate::pdf::PdfReport;
use crate::player_career::CareerProfile;
use crate::tally::Tally;

pub const CHART_WIDTH_MM: f32 = 170.0;

/// Everything the league report draws on.
pub struct ReportInputs<'a> {
    pub info: &'a DatasetInfo,
    pub summary: &'a LeagueSummary,
    pub insights: &'a [String],
    pub profile: Option<&'a CareerProfile>,
    pub charts: &'a [RenderedChart],
}

/// File-name stamp shared by every artifact of one run.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn artifact_path(out_dir: &Path, prefix: &str, stamp: &str, ext: &str) -> PathBuf {
    out_dir.join(format!("{prefix}_{stamp}.{ext}"))
}

pub fn ensure_output_dir(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))
}

pub fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

pub fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// "A (12), B (9), C (7)"
pub fn top_list<K: std::fmt::Display>(tally: &Tally<K>, n: usize) -> String {
    if tally.is_empty() {
        return "N/A".to_string();
    }
    tally
        .iter()
        .take(n)
        .map(|(k, c)| format!("{k} ({c})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn winner_of(m: Option<&Match>) -> String {
    m.and_then(|m| m.winner.as_ref())
        .map_or_else(|| "N/A".to_string(), |w| w.to_string())
}

pub fn generate_pdf_report(out_dir: &Path, stamp: &str, inputs: &ReportInputs) -> Result<PathBuf> {
    ensure_output_dir(out_dir)?;
    let path = artifact_path(out_dir, "ipl_analysis_report", stamp, "pdf");
    let s = inputs.summary;
    let o = &s.overview;

    let mut pdf = PdfReport::new("IPL Data Analysis Report")?;

    pdf.spacer(60.0);
    pdf.title("IPL Data Analysis Report");
    pdf.paragraph("Comprehensive Analysis of Indian Premier League Data");
    pdf.paragraph(&format!(
        "Generated on: {}",
        Local::now().format("%B %d, %Y")
    ));
    pdf.page_break();

    pdf.heading("Executive Summary");
    pdf.paragraph(&format!(
        "This report presents an analysis of IPL cricket data, covering {} matches and {} deliveries.",
        o.total_matches, o.total_deliveries
    ));
    pdf.bullets(&[
        format!("Total teams analyzed: {}", o.total_teams),
        format!("Cities hosting matches: {}", o.total_cities),
        format!("Seasons covered: {}", o.seasons.len()),
        format!(
            "Toss winner advantage: {}%",
            fmt_pct(s.toss.toss_winner_match_winner_pct)
        ),
        format!(
            "Average win margin by runs: {}",
            fmt_pct(o.avg_win_margin_runs)
        ),
        format!(
            "Average win margin by wickets: {}",
            fmt_pct(o.avg_win_margin_wickets)
        ),
    ]);

    pdf.heading("Data Overview");
    let m = &inputs.info.matches;
    let d = &inputs.info.deliveries;
    pdf.bullets(&[
        format!("Matches dataset shape: {:?}", m.shape()),
        format!("Deliveries dataset shape: {:?}", d.shape()),
        format!(
            "Data completeness: matches {:.2}%, deliveries {:.2}%",
            m.completeness_pct(),
            d.completeness_pct()
        ),
        format!("Missing values in matches: {}", m.total_nulls()),
        format!("Missing values in deliveries: {}", d.total_nulls()),
        format!(
            "Seasons: {} - {}",
            fmt_opt(o.seasons.first()),
            fmt_opt(o.seasons.last())
        ),
    ]);
    let null_rows: Vec<Vec<String>> = m
        .nulls
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(col, n)| vec!["matches".to_string(), col.clone(), n.to_string()])
        .chain(
            d.nulls
                .iter()
                .filter(|(_, n)| *n > 0)
                .map(|(col, n)| vec!["deliveries".to_string(), col.clone(), n.to_string()]),
        )
        .collect();
    if !null_rows.is_empty() {
        pdf.table(&["Table", "Column", "Nulls"], &null_rows, &[40.0, 60.0, 30.0]);
    }

    pdf.heading("Match Analysis");
    let max_run = s.max_margins.max_run_win.as_ref();
    let max_wkt = s.max_margins.max_wicket_win.as_ref();
    pdf.bullets(&[
        format!(
            "Highest run margin victory: {} by {} runs",
            winner_of(max_run),
            fmt_opt(max_run.map(|m| m.win_by_runs))
        ),
        format!(
            "Highest wicket margin victory: {} by {} wickets",
            winner_of(max_wkt),
            fmt_opt(max_wkt.map(|m| m.win_by_wickets))
        ),
        format!(
            "Matches where toss winner won: {} ({}%)",
            s.toss.toss_winner_wins,
            fmt_pct(s.toss.toss_winner_match_winner_pct)
        ),
        format!(
            "Preferred toss decision: {}",
            fmt_opt(s.toss.decision_distribution.first().map(|(k, _)| k))
        ),
        format!(
            "Toss decision distribution: {}",
            top_list(&s.toss.decision_distribution, usize::MAX)
        ),
        format!(
            "D/L method applied: {} times",
            s.dl.dl_applied_overall.get(&1)
        ),
    ]);

    pdf.heading("Team Performance Analysis");
    pdf.bullets(&[
        format!(
            "Most wins: {}",
            fmt_opt(s.team_wins.first().map(|(k, c)| format!("{k} ({c} wins)")))
        ),
        format!(
            "Best defending teams: {}",
            top_list(&s.defend_chase.best_defending_teams, 3)
        ),
        format!(
            "Best chasing teams: {}",
            top_list(&s.defend_chase.best_chasing_teams, 3)
        ),
    ]);
    let win_rows: Vec<Vec<String>> = s
        .team_wins
        .iter()
        .map(|(team, wins)| {
            vec![
                team.to_string(),
                wins.to_string(),
                s.defend_chase.best_defending_teams.get(team).to_string(),
                s.defend_chase.best_chasing_teams.get(team).to_string(),
            ]
        })
        .collect();
    pdf.table(
        &["Team", "Wins", "Defended", "Chased"],
        &win_rows,
        &[80.0, 30.0, 30.0, 30.0],
    );

    pdf.heading("Player Performance Analysis");
    pdf.bullets(&[
        format!(
            "Most Man of Match awards: {}",
            top_list(&s.top_players.top_man_of_match, 1)
        ),
        format!(
            "Top six hitters: {}",
            top_list(&s.top_players.top_six_hitters, 3)
        ),
    ]);
    if let Some(profile) = inputs.profile {
        pdf.paragraph(&format!(
            "Featured career analysis: {} with {} runs at a strike rate of {} (see the companion player report).",
            profile.player, profile.basic_stats.total_runs, profile.basic_stats.strike_rate
        ));
    }

    pdf.heading("Venue Analysis");
    pdf.bullets(&[
        format!("Total venues: {}", o.total_venues),
        format!(
            "Most active venue: {}",
            fmt_opt(
                o.most_active_venue
                    .as_ref()
                    .map(|(v, n)| format!("{v} ({n} matches)"))
            )
        ),
        format!(
            "Best venues for defending: {}",
            top_list(&s.defend_chase.best_venues_defending, 3)
        ),
        format!(
            "Best venues for chasing: {}",
            top_list(&s.defend_chase.best_venues_chasing, 3)
        ),
        format!("Cities with IPL presence: {}", o.total_cities),
    ]);

    pdf.heading("Business Insights & Recommendations");
    let numbered: Vec<String> = inputs
        .insights
        .iter()
        .enumerate()
        .map(|(i, insight)| format!("{}. {insight}", i + 1))
        .collect();
    pdf.bullets(&numbered);

    let league_charts: Vec<&RenderedChart> = inputs
        .charts
        .iter()
        .filter(|c| !is_player_chart(c))
        .collect();
    add_chart_pages(&mut pdf, &league_charts);

    pdf.save(&path)?;
    Ok(path)
}

pub fn is_player_chart(chart: &RenderedChart) -> bool {
    chart
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("player_"))
}

/// One page per chart; a chart whose image cannot be embedded is skipped.
pub fn add_chart_pages(pdf: &mut PdfReport, charts: &[&RenderedChart]) {
    for chart in charts {
        pdf.page_break();
        pdf.heading(&chart.title);
        if let Err(err) = pdf.image(&chart.path, CHART_WIDTH_MM) {
            log::warn!("could not add visualization {}: {err:#}", chart.path.display());
            continue;
        }
        let rows: Vec<Vec<String>> = chart
            .legend
            .iter()
            .enumerate()
            .map(|(i, p)| vec![(i + 1).to_string(), p.label.clone(), format_value(p.value)])
            .collect();
        pdf.table(&["#", "Category", chart.value_label.as_str()], &rows, &[12.0, 110.0, 40.0]);
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

pub fn generate_text_report(out_dir: &Path, stamp: &str, inputs: &ReportInputs) -> Result<PathBuf> {
    ensure_output_dir(out_dir)?;
    let path = artifact_path(out_dir, "ipl_analysis_text", stamp, "txt");
    fs::write(&path, render_text_report(inputs)?)
        .with_context(|| format!("write text report {}", path.display()))?;
    Ok(path)
}

pub fn render_text_report(inputs: &ReportInputs) -> Result<String> {
    let mut out = String::new();
    write_text_report(&mut out, inputs).context("format text report")?;
    Ok(out)
}

fn write_text_report(out: &mut String, inputs: &ReportInputs) -> fmt::Result {
    let s = inputs.summary;
    let o = &s.overview;

    writeln!(out, "IPL DATA ANALYSIS REPORT")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(
        out,
        "\nGenerated on: {}\n",
        Local::now().format("%B %d, %Y %H:%M:%S")
    )?;

    section(out, "DATASET")?;
    writeln!(out, "total_matches: {}", o.total_matches)?;
    writeln!(out, "total_deliveries: {}", o.total_deliveries)?;
    writeln!(out, "total_teams: {}", o.total_teams)?;
    writeln!(out, "total_cities: {}", o.total_cities)?;
    writeln!(out, "seasons_covered: {}", o.seasons.len())?;
    writeln!(out, "matches_shape: {:?}", inputs.info.matches.shape())?;
    writeln!(out, "deliveries_shape: {:?}", inputs.info.deliveries.shape())?;

    section(out, "MATCHES")?;
    let max_run = s.max_margins.max_run_win.as_ref();
    let max_wkt = s.max_margins.max_wicket_win.as_ref();
    writeln!(
        out,
        "max_run_margin: {} by {}",
        winner_of(max_run),
        fmt_opt(max_run.map(|m| m.win_by_runs))
    )?;
    writeln!(
        out,
        "max_wicket_margin: {} by {}",
        winner_of(max_wkt),
        fmt_opt(max_wkt.map(|m| m.win_by_wickets))
    )?;
    writeln!(
        out,
        "toss_advantage_pct: {}",
        fmt_pct(s.toss.toss_winner_match_winner_pct)
    )?;
    writeln!(
        out,
        "toss_decisions: {}",
        top_list(&s.toss.decision_distribution, usize::MAX)
    )?;
    writeln!(out, "dl_applied_count: {}", s.dl.dl_applied_overall.get(&1))?;
    writeln!(out, "dl_per_season: {}", top_list(&s.dl.dl_per_season, usize::MAX))?;

    section(out, "TEAMS")?;
    writeln!(out, "team_wins: {}", top_list(&s.team_wins, usize::MAX))?;
    writeln!(
        out,
        "best_defending_teams: {}",
        top_list(&s.defend_chase.best_defending_teams, 5)
    )?;
    writeln!(
        out,
        "best_chasing_teams: {}",
        top_list(&s.defend_chase.best_chasing_teams, 5)
    )?;

    section(out, "PLAYERS")?;
    writeln!(
        out,
        "top_man_of_match: {}",
        top_list(&s.top_players.top_man_of_match, usize::MAX)
    )?;
    writeln!(
        out,
        "top_six_hitters: {}",
        top_list(&s.top_players.top_six_hitters, usize::MAX)
    )?;

    section(out, "VENUES")?;
    writeln!(out, "top_cities: {}", top_list(&s.city_stats, 5))?;
    writeln!(
        out,
        "best_venues_defending: {}",
        top_list(&s.defend_chase.best_venues_defending, 5)
    )?;
    writeln!(
        out,
        "best_venues_chasing: {}",
        top_list(&s.defend_chase.best_venues_chasing, 5)
    )?;

    section(out, "BUSINESS INSIGHTS")?;
    for (i, insight) in inputs.insights.iter().enumerate() {
        writeln!(out, "{}. {insight}", i + 1)?;
    }

    if let Some(p) = inputs.profile {
        section(out, "PLAYER CAREER")?;
        writeln!(out, "player: {}", p.player)?;
        writeln!(out, "total_matches: {}", p.career_span.total_matches)?;
        writeln!(out, "total_runs: {}", p.basic_stats.total_runs)?;
        writeln!(out, "average: {}", p.basic_stats.average)?;
        writeln!(out, "strike_rate: {}", p.basic_stats.strike_rate)?;
        writeln!(out, "centuries: {}", p.milestones.centuries)?;
        writeln!(out, "half_centuries: {}", p.milestones.half_centuries)?;
    }
    Ok(())
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{}", "-".repeat(30))
}

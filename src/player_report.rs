use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::charts::RenderedChart;
use crate::pdf::PdfReport;
use crate::player_career::{BattingLine, Breakdown, CareerProfile, Phase};
use crate::report::{add_chart_pages, artifact_path, ensure_output_dir, fmt_opt, is_player_chart};

pub const PDF_SEASONS: usize = 8;
pub const TEXT_SEASONS: usize = 5;
pub const PDF_MILESTONES: usize = 5;

/// Narrative findings; each rule adds at most one line.
pub fn player_insights(profile: &CareerProfile) -> Vec<String> {
    let mut insights = Vec::new();
    let stats = &profile.basic_stats;

    if stats.strike_rate > 130.0 {
        insights.push(
            "Excellent strike rate indicates an aggressive batting approach, ideal for the T20 format."
                .to_string(),
        );
    } else if stats.strike_rate > 120.0 {
        insights.push(
            "Good strike rate shows the ability to score quickly while staying consistent."
                .to_string(),
        );
    }

    if profile.consistency.total_innings > 0 && profile.consistency.coefficient_of_variation < 80.0
    {
        insights.push(
            "Low coefficient of variation marks a reliable, consistent run scorer.".to_string(),
        );
    }

    if profile.milestones.centuries > 0 {
        insights.push(format!(
            "Conversion of fifties to hundreds is impressive with {} centuries.",
            profile.milestones.centuries
        ));
    }

    if profile.leadership.team_win_pct > 50.0 {
        insights.push(format!(
            "Teams won {}% of the matches this player batted in.",
            profile.leadership.team_win_pct
        ));
    }

    if profile
        .phase(Phase::Death)
        .is_some_and(|line| line.strike_rate > 150.0)
    {
        insights.push(
            "Exceptional death overs strike rate shows the ability to accelerate under pressure."
                .to_string(),
        );
    }

    if let Some(team) = profile
        .team_performance
        .iter()
        .max_by(|a, b| {
            a.stats
                .matches
                .cmp(&b.stats.matches)
                .then(a.stats.runs.cmp(&b.stats.runs))
        })
    {
        insights.push(format!(
            "Longest association is with {} ({} matches, {} runs).",
            team.key, team.stats.matches, team.stats.runs
        ));
    }

    insights
}

fn last_seasons(profile: &CareerProfile, n: usize) -> &[Breakdown<u16>] {
    let rows = &profile.season_performance;
    &rows[rows.len().saturating_sub(n)..]
}

fn span_label(profile: &CareerProfile) -> String {
    format!(
        "{} - {}",
        fmt_opt(profile.career_span.first_season()),
        fmt_opt(profile.career_span.last_season())
    )
}

pub fn generate_player_pdf_report(
    out_dir: &Path,
    stamp: &str,
    profile: &CareerProfile,
    charts: &[RenderedChart],
) -> Result<PathBuf> {
    ensure_output_dir(out_dir)?;
    let path = artifact_path(out_dir, "player_career_analysis", stamp, "pdf");
    let stats = &profile.basic_stats;
    let span = &profile.career_span;
    let title = format!("{} - IPL Career Analysis", profile.player);

    let mut pdf = PdfReport::new(&title)?;
    pdf.spacer(60.0);
    pdf.title(&title);
    pdf.paragraph("Comprehensive Performance Analysis & Career Insights");
    pdf.paragraph(&format!("Generated on: {}", Local::now().format("%B %d, %Y")));
    pdf.page_break();

    pdf.heading("Executive Summary");
    pdf.paragraph(&format!(
        "{} played {} IPL matches across {} seasons ({}), scoring {} runs at an average of {} and a strike rate of {}.",
        profile.player,
        span.total_matches,
        span.total_seasons,
        span_label(profile),
        stats.total_runs,
        stats.average,
        stats.strike_rate
    ));
    pdf.bullets(&[
        format!("Centuries: {}", profile.milestones.centuries),
        format!("Half-centuries: {}", profile.milestones.half_centuries),
        format!("Man of the Match awards: {}", profile.leadership.mom_awards),
        format!("Fours: {}, Sixes: {}", stats.fours, stats.sixes),
    ]);

    pdf.heading("Career Overview");
    let overview = [
        ("Career span", span_label(profile)),
        ("Seasons", span.total_seasons.to_string()),
        ("Matches", span.total_matches.to_string()),
        ("Runs", stats.total_runs.to_string()),
        ("Balls faced", stats.total_balls.to_string()),
        ("Dismissals", stats.dismissals.to_string()),
        ("Average", stats.average.to_string()),
        ("Strike rate", stats.strike_rate.to_string()),
        ("Fours", stats.fours.to_string()),
        ("Sixes", stats.sixes.to_string()),
    ];
    let rows: Vec<Vec<String>> = overview
        .iter()
        .map(|(k, v)| vec![k.to_string(), v.clone()])
        .collect();
    pdf.table(&["Metric", "Value"], &rows, &[60.0, 60.0]);

    pdf.heading("Dismissal Patterns");
    if profile.dismissal_analysis.is_empty() {
        pdf.paragraph("Not dismissed in the recorded deliveries.");
    } else {
        let total = profile.dismissal_analysis.total() as f64;
        let rows: Vec<Vec<String>> = profile
            .dismissal_analysis
            .iter()
            .map(|(kind, n)| {
                vec![
                    kind.to_string(),
                    n.to_string(),
                    format!("{:.1}%", n as f64 / total * 100.0),
                ]
            })
            .collect();
        pdf.table(&["Dismissal", "Count", "Share"], &rows, &[60.0, 30.0, 30.0]);
    }

    pdf.heading("Innings Performance");
    let rows: Vec<Vec<String>> = profile
        .innings_performance
        .iter()
        .map(|row| line_row(format!("Innings {}", row.key), &row.stats))
        .collect();
    pdf.table(&line_headers("Innings"), &rows, &LINE_WIDTHS);

    pdf.heading("Season Performance");
    let rows: Vec<Vec<String>> = last_seasons(profile, PDF_SEASONS)
        .iter()
        .map(|row| line_row(row.key.to_string(), &row.stats))
        .collect();
    pdf.table(&line_headers("Season"), &rows, &LINE_WIDTHS);

    pdf.heading("Team Performance");
    let rows: Vec<Vec<String>> = profile
        .team_performance
        .iter()
        .map(|row| line_row(row.key.to_string(), &row.stats))
        .collect();
    pdf.table(&line_headers("Team"), &rows, &LINE_WIDTHS);

    pdf.heading("Phase Performance");
    let rows: Vec<Vec<String>> = profile
        .phase_performance
        .iter()
        .map(|row| line_row(row.key.label().to_string(), &row.stats))
        .collect();
    pdf.table(&line_headers("Phase"), &rows, &LINE_WIDTHS);

    pdf.heading("Consistency");
    let c = &profile.consistency;
    pdf.bullets(&[
        format!("Innings batted: {}", c.total_innings),
        format!("Mean score: {}", c.mean_score),
        format!("Median score: {}", c.median_score),
        format!("Standard deviation: {}", c.std_deviation),
        format!("Coefficient of variation: {}%", c.coefficient_of_variation),
        format!("Scores of 50+: {}", c.scores_above_50),
        format!("Scores of 30+: {}", c.scores_above_30),
        format!("Ducks: {}", c.ducks),
    ]);

    pdf.heading("Milestones");
    let top: Vec<String> = profile
        .milestones
        .highest_scores
        .iter()
        .take(PDF_MILESTONES)
        .map(u32::to_string)
        .collect();
    pdf.bullets(&[
        format!("Centuries: {}", profile.milestones.centuries),
        format!("Half-centuries: {}", profile.milestones.half_centuries),
        format!("Highest scores: {}", top.join(", ")),
    ]);

    pdf.heading("Leadership & Match Impact");
    let l = &profile.leadership;
    pdf.bullets(&[
        format!("Man of the Match awards: {}", l.mom_awards),
        format!("Matches batted: {}", l.matches_batted),
        format!("Team wins in those matches: {}", l.team_wins),
        format!("Team win rate: {}%", l.team_win_pct),
    ]);

    pdf.heading("Key Insights & Analysis");
    let numbered: Vec<String> = player_insights(profile)
        .into_iter()
        .enumerate()
        .map(|(i, insight)| format!("{}. {insight}", i + 1))
        .collect();
    if numbered.is_empty() {
        pdf.paragraph("No standout patterns in this career record.");
    } else {
        pdf.bullets(&numbered);
    }

    let player_charts: Vec<&RenderedChart> =
        charts.iter().filter(|c| is_player_chart(c)).collect();
    add_chart_pages(&mut pdf, &player_charts);

    pdf.save(&path)?;
    Ok(path)
}

fn line_headers(key: &str) -> [&str; 7] {
    [key, "Matches", "Runs", "Balls", "Outs", "Avg", "SR"]
}

const LINE_WIDTHS: [f32; 7] = [62.0, 18.0, 18.0, 18.0, 16.0, 20.0, 22.0];

fn line_row(label: String, line: &BattingLine) -> Vec<String> {
    vec![
        label,
        line.matches.to_string(),
        line.runs.to_string(),
        line.balls.to_string(),
        line.dismissals.to_string(),
        line.average.to_string(),
        line.strike_rate.to_string(),
    ]
}

pub fn generate_player_text_report(
    out_dir: &Path,
    stamp: &str,
    profile: &CareerProfile,
) -> Result<PathBuf> {
    ensure_output_dir(out_dir)?;
    let path = artifact_path(out_dir, "player_text_analysis", stamp, "txt");
    fs::write(&path, render_player_text(profile)?)
        .with_context(|| format!("write player text report {}", path.display()))?;
    Ok(path)
}

pub fn render_player_text(profile: &CareerProfile) -> Result<String> {
    let mut out = String::new();
    write_player_text(&mut out, profile).context("format player text report")?;
    Ok(out)
}

fn write_player_text(out: &mut String, profile: &CareerProfile) -> fmt::Result {
    let stats = &profile.basic_stats;
    let rule = "=".repeat(80);

    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "{} - IPL CAREER ANALYSIS REPORT",
        profile.player.to_uppercase()
    )?;
    writeln!(out, "{rule}\n")?;
    writeln!(
        out,
        "Generated on: {}\n",
        Local::now().format("%B %d, %Y %H:%M:%S")
    )?;

    section(out, "CAREER OVERVIEW")?;
    writeln!(out, "Career Span: {}", span_label(profile))?;
    writeln!(out, "Total Seasons: {}", profile.career_span.total_seasons)?;
    writeln!(out, "Total Matches: {}", profile.career_span.total_matches)?;
    writeln!(out, "Total Runs: {}", stats.total_runs)?;
    writeln!(out, "Batting Average: {}", stats.average)?;
    writeln!(out, "Strike Rate: {}\n", stats.strike_rate)?;

    section(out, "PERFORMANCE ANALYSIS")?;
    writeln!(out, "Centuries: {}", profile.milestones.centuries)?;
    writeln!(out, "Half-centuries: {}", profile.milestones.half_centuries)?;
    writeln!(
        out,
        "Man of Match Awards: {}\n",
        profile.leadership.mom_awards
    )?;

    section(out, "RECENT SEASON PERFORMANCE")?;
    for row in last_seasons(profile, TEXT_SEASONS) {
        writeln!(
            out,
            "{}: {} runs @ {} SR in {} matches",
            row.key, row.stats.runs, row.stats.strike_rate, row.stats.matches
        )?;
    }
    out.push('\n');

    section(out, "KEY INSIGHTS")?;
    for (i, insight) in player_insights(profile).iter().enumerate() {
        writeln!(out, "{}. {insight}", i + 1)?;
    }
    Ok(())
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(40))
}

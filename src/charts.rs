//! PNG charts for the summary tables. Bars carry their category on the x
//! axis and the value above each bar; pies label every slice.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use palette::{FromColor, Lch, Srgb};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::LeagueSummary;
use crate::dataset::Match;
use crate::player_career::CareerProfile;
use crate::tally::Tally;

pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 700;
const FONT: &str = "sans-serif";
const MAX_LABEL_CHARS: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_name: String,
    pub title: String,
    pub value_label: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn bar(file_name: &str, title: &str, value_label: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            file_name: file_name.to_string(),
            title: title.to_string(),
            value_label: value_label.to_string(),
            kind: ChartKind::Bar,
            points,
        }
    }

    pub fn pie(file_name: &str, title: &str, value_label: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            kind: ChartKind::Pie,
            ..Self::bar(file_name, title, value_label, points)
        }
    }
}

/// A chart written to disk, with what the report needs to caption it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub path: PathBuf,
    pub title: String,
    pub value_label: String,
    pub legend: Vec<ChartPoint>,
}

/// Renders each chart; a failing one is logged and skipped.
pub fn render_all(specs: &[ChartSpec], out_dir: &Path) -> Vec<RenderedChart> {
    let mut rendered = Vec::with_capacity(specs.len());
    for spec in specs {
        match render_chart(spec, out_dir) {
            Ok(path) => {
                log::debug!("chart written: {}", path.display());
                rendered.push(RenderedChart {
                    path,
                    title: spec.title.clone(),
                    value_label: spec.value_label.clone(),
                    legend: spec.points.clone(),
                });
            }
            Err(err) => log::warn!("skipping chart {}: {err:#}", spec.file_name),
        }
    }
    rendered
}

pub fn render_chart(spec: &ChartSpec, out_dir: &Path) -> Result<PathBuf> {
    if spec.points.is_empty() {
        return Err(anyhow!("no data points"));
    }
    if spec.points.iter().any(|p| !p.value.is_finite() || p.value < 0.0) {
        return Err(anyhow!("values must be finite and non-negative"));
    }
    if spec.kind == ChartKind::Pie && spec.points.iter().map(|p| p.value).sum::<f64>() <= 0.0 {
        return Err(anyhow!("pie chart needs a positive total"));
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let path = out_dir.join(&spec.file_name);
    let colors = series_colors(spec.points.len());
    let drawn = match spec.kind {
        ChartKind::Bar => draw_bars(&path, spec, &colors),
        ChartKind::Pie => draw_pie(&path, spec, &colors),
    };
    drawn.with_context(|| format!("write chart {}", path.display()))?;
    Ok(path)
}

fn draw_bars(path: &Path, spec: &ChartSpec, colors: &[RGBColor]) -> Result<()> {
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = spec.points.iter().map(|p| short_label(&p.label)).collect();
    let max = spec.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let y_top = if max > 0.0 { max * 1.15 } else { 1.0 };
    let n = spec.points.len() as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, (FONT, 30))
        .margin(16)
        .x_label_area_size(70)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_top)?;

    let category = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&category)
        .x_label_style((FONT, label_size(labels.len())))
        .y_desc(spec.value_label.as_str())
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(spec.points.iter().enumerate().map(|(i, p)| {
        let i = i as u32;
        let color = colors[i as usize % colors.len()];
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), p.value)],
            color.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;

    let value_style =
        TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(spec.points.iter().enumerate().map(|(i, p)| {
        Text::new(
            format_value(p.value),
            (SegmentValue::CenterOf(i as u32), p.value),
            value_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_pie(path: &Path, spec: &ChartSpec, colors: &[RGBColor]) -> Result<()> {
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(spec.title.as_str(), (FONT, 30))?;

    // Pie coordinates are in backend pixels, so centre below the title.
    let (w, h) = root.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32 + 20);
    let radius = f64::from(h) * 0.32;
    let sizes: Vec<f64> = spec.points.iter().map(|p| p.value).collect();
    let labels: Vec<String> = spec
        .points
        .iter()
        .map(|p| format!("{} ({})", short_label(&p.label), format_value(p.value)))
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 20).into_font().color(&BLACK));
    pie.label_offset(radius * 0.1);
    pie.percentages((FONT, 16).into_font().color(&WHITE));
    body.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn label_size(count: usize) -> u32 {
    match count {
        0..=6 => 16,
        7..=12 => 13,
        _ => 11,
    }
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    format!("{head}…")
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Seeded so a category keeps its color between runs.
fn series_colors(n: usize) -> Vec<RGBColor> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n.max(1))
        .map(|_| {
            let hue = rng.gen_range(0.0f32..360.0f32);
            let color = Lch::new(62.0f32, 70.0f32, hue);
            let srgb: Srgb<f32> = Srgb::from_color(color);
            let (r, g, b) = srgb.into_components();
            RGBColor(to_u8(r), to_u8(g), to_u8(b))
        })
        .collect()
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0) as u8
}

fn tally_points<K: ToString>(tally: &Tally<K>, limit: usize) -> Vec<ChartPoint> {
    tally
        .iter()
        .take(limit)
        .map(|(key, count)| ChartPoint {
            label: key.to_string(),
            value: count as f64,
        })
        .collect()
}

fn margin_point(m: Option<&Match>, value: impl Fn(&Match) -> u32) -> Vec<ChartPoint> {
    m.map(|m| ChartPoint {
        label: m
            .winner
            .as_ref()
            .map_or_else(|| "No result".to_string(), |w| w.to_string()),
        value: f64::from(value(m)),
    })
    .into_iter()
    .collect()
}

pub fn league_charts(summary: &LeagueSummary, city_limit: usize) -> Vec<ChartSpec> {
    let dc = &summary.defend_chase;
    vec![
        ChartSpec::bar(
            "max_run_margin.png",
            "Maximum Run Margin Victory",
            "Runs",
            margin_point(summary.max_margins.max_run_win.as_ref(), |m| m.win_by_runs),
        ),
        ChartSpec::bar(
            "max_wicket_margin.png",
            "Maximum Wicket Margin Victory",
            "Wickets",
            margin_point(summary.max_margins.max_wicket_win.as_ref(), |m| {
                m.win_by_wickets
            }),
        ),
        ChartSpec::bar(
            "matches_per_city.png",
            &format!("Top {city_limit} Cities by Number of Matches"),
            "Matches",
            tally_points(&summary.city_stats, city_limit),
        ),
        ChartSpec::bar(
            "matches_won_by_team.png",
            "Matches Won by Each Team",
            "Wins",
            tally_points(&summary.team_wins, usize::MAX),
        ),
        ChartSpec::pie(
            "toss_decision_distribution.png",
            "Toss Decision Distribution",
            "Matches",
            tally_points(&summary.toss.decision_distribution, usize::MAX),
        ),
        ChartSpec::bar(
            "top_10_mom_players.png",
            "Top Players - Man of the Match Awards",
            "Awards",
            tally_points(&summary.top_players.top_man_of_match, usize::MAX),
        ),
        ChartSpec::bar(
            "top_10_six_hitters.png",
            "Top Players with Most Sixes",
            "Sixes",
            tally_points(&summary.top_players.top_six_hitters, usize::MAX),
        ),
        ChartSpec::bar(
            "dl_per_season.png",
            "D/L Applied Per Season",
            "Count",
            tally_points(&summary.dl.dl_per_season, usize::MAX),
        ),
        ChartSpec::bar(
            "top_defending_teams.png",
            "Top Defending Teams",
            "Wins",
            tally_points(&dc.best_defending_teams, 10),
        ),
        ChartSpec::bar(
            "top_chasing_teams.png",
            "Top Chasing Teams",
            "Wins",
            tally_points(&dc.best_chasing_teams, 10),
        ),
        ChartSpec::bar(
            "best_venues_defending.png",
            "Best Venues for Defending",
            "Matches",
            tally_points(&dc.best_venues_defending, 10),
        ),
        ChartSpec::bar(
            "best_venues_chasing.png",
            "Best Venues for Chasing",
            "Matches",
            tally_points(&dc.best_venues_chasing, 10),
        ),
    ]
}

/// Buckets for the per-match score distribution chart.
const SCORE_BANDS: [(u32, u32, &str); 6] = [
    (0, 0, "0"),
    (1, 9, "1-9"),
    (10, 29, "10-29"),
    (30, 49, "30-49"),
    (50, 99, "50-99"),
    (100, u32::MAX, "100+"),
];

pub fn player_charts(profile: &CareerProfile) -> Vec<ChartSpec> {
    let runs_points = |rows: Vec<(String, u32)>| -> Vec<ChartPoint> {
        rows.into_iter()
            .map(|(label, runs)| ChartPoint {
                label,
                value: f64::from(runs),
            })
            .collect()
    };

    let season = runs_points(
        profile
            .season_performance
            .iter()
            .map(|row| (row.key.to_string(), row.stats.runs))
            .collect(),
    );
    let team = runs_points(
        profile
            .team_performance
            .iter()
            .map(|row| (row.key.to_string(), row.stats.runs))
            .collect(),
    );
    let venue = runs_points(
        profile
            .venue_performance
            .iter()
            .take(10)
            .map(|row| (row.key.to_string(), row.stats.runs))
            .collect(),
    );
    let innings = runs_points(
        profile
            .innings_performance
            .iter()
            .map(|row| (format!("Innings {}", row.key), row.stats.runs))
            .collect(),
    );
    let phase: Vec<ChartPoint> = profile
        .phase_performance
        .iter()
        .map(|row| ChartPoint {
            label: row.key.label().to_string(),
            value: row.stats.strike_rate,
        })
        .collect();
    let bands: Vec<ChartPoint> = SCORE_BANDS
        .iter()
        .map(|(lo, hi, label)| ChartPoint {
            label: label.to_string(),
            value: profile
                .match_scores
                .iter()
                .filter(|s| s.runs >= *lo && s.runs <= *hi)
                .count() as f64,
        })
        .collect();
    let milestones: Vec<ChartPoint> = profile
        .milestones
        .highest_scores
        .iter()
        .enumerate()
        .map(|(idx, runs)| ChartPoint {
            label: format!("#{}", idx + 1),
            value: f64::from(*runs),
        })
        .collect();

    vec![
        ChartSpec::bar(
            "player_season_performance.png",
            "Season-wise Runs",
            "Runs",
            season,
        ),
        ChartSpec::bar(
            "player_team_performance.png",
            "Runs by Team",
            "Runs",
            team,
        ),
        ChartSpec::pie(
            "player_dismissal_patterns.png",
            "Dismissal Patterns",
            "Dismissals",
            tally_points(&profile.dismissal_analysis, usize::MAX),
        ),
        ChartSpec::bar(
            "player_phase_performance.png",
            "Strike Rate by Phase",
            "Strike rate",
            phase,
        ),
        ChartSpec::bar(
            "player_innings_performance.png",
            "Runs by Innings",
            "Runs",
            innings,
        ),
        ChartSpec::bar(
            "player_consistency_analysis.png",
            "Score Distribution per Match",
            "Innings",
            bands,
        ),
        ChartSpec::bar(
            "player_venue_performance.png",
            "Top Venues by Runs",
            "Runs",
            venue,
        ),
        ChartSpec::bar(
            "player_milestones.png",
            "Highest Scores",
            "Runs",
            milestones,
        ),
    ]
}

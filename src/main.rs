use std::fmt::Display;

use anyhow::Result;

use ipl_insights::analysis::{self, LeagueSummary};
use ipl_insights::analysis_export;
use ipl_insights::charts;
use ipl_insights::config::AppConfig;
use ipl_insights::dataset::{self, Dataset};
use ipl_insights::player_career::{self, CareerError, CareerProfile};
use ipl_insights::player_report;
use ipl_insights::report::{self, ReportInputs};
use ipl_insights::tally::Tally;

const SAMPLE_ROWS: usize = 5;
const PRINT_TOP: usize = 5;
const RECENT_SEASONS: usize = 5;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::load();
    log::debug!("config: {config:?}");

    let banner = "=".repeat(60);
    println!("{banner}");
    println!("IPL DATA ANALYSIS PIPELINE");
    println!("{banner}");

    println!("\n1. Loading data...");
    let data = dataset::load_dataset(&config.data_dir)?;
    print_samples(&data);

    println!("\n2. Performing analyses...");
    let summary = analysis::summarize(&data.matches, &data.deliveries, config.top_n);
    print_summary(&summary);

    println!("\n3.1. Performing {} career analysis...", config.player);
    let profile = match player_career::analyze_player(&data.matches, &data.deliveries, &config.player)
    {
        Ok(profile) => {
            print_profile(&profile);
            Some(profile)
        }
        Err(err @ CareerError::EmptyPlayerData { .. }) => {
            log::warn!("{err}; skipping player career section");
            None
        }
    };

    println!("\n3. Generating visualizations...");
    let mut specs = charts::league_charts(&summary, config.city_chart_limit);
    if let Some(profile) = &profile {
        println!("\n3.1. Generating {} visualizations...", profile.player);
        specs.extend(charts::player_charts(profile));
    }
    let rendered = charts::render_all(&specs, &config.output_dir);
    log::info!("{} of {} charts written", rendered.len(), specs.len());

    println!("\n4. Business Insights:");
    let insights = analysis::business_insights();
    for (i, insight) in insights.iter().enumerate() {
        println!("{}. {insight}", i + 1);
    }

    println!("\n5. Preparing analysis results for report...");
    let stamp = report::timestamp();
    report::ensure_output_dir(&config.output_dir)?;
    let xlsx_path = report::artifact_path(&config.output_dir, "ipl_summary", &stamp, "xlsx");
    let export = analysis_export::export_summary_workbook(&xlsx_path, &summary, profile.as_ref())?;
    log::info!(
        "workbook {}: {} sheets, {} rows",
        xlsx_path.display(),
        export.sheets,
        export.rows
    );
    if let Some(profile) = &profile {
        let json_path = report::artifact_path(&config.output_dir, "player_profile", &stamp, "json");
        analysis_export::write_profile_json(&json_path, profile)?;
        log::info!("profile json {}", json_path.display());
    }

    println!("\n6. Generating PDF report...");
    let inputs = ReportInputs {
        info: &data.info,
        summary: &summary,
        insights: &insights,
        profile: profile.as_ref(),
        charts: &rendered,
    };
    let pdf_path = report::generate_pdf_report(&config.output_dir, &stamp, &inputs)?;
    let txt_path = report::generate_text_report(&config.output_dir, &stamp, &inputs)?;

    let player_paths = match &profile {
        Some(profile) => {
            println!("\n7. Generating {} specific reports...", profile.player);
            let pdf = player_report::generate_player_pdf_report(
                &config.output_dir,
                &stamp,
                profile,
                &rendered,
            )?;
            let txt =
                player_report::generate_player_text_report(&config.output_dir, &stamp, profile)?;
            Some((pdf, txt))
        }
        None => None,
    };

    println!("\n{banner}");
    println!("ANALYSIS COMPLETE!");
    println!(
        "Visualizations saved to '{}' directory",
        config.output_dir.display()
    );
    println!("Main PDF Report: {}", pdf_path.display());
    println!("Main Text Report: {}", txt_path.display());
    println!("Summary Workbook: {}", xlsx_path.display());
    if let (Some(profile), Some((pdf, txt))) = (&profile, &player_paths) {
        println!("{} PDF Report: {}", profile.player, pdf.display());
        println!("{} Text Report: {}", profile.player, txt.display());
    }
    println!("{banner}");
    Ok(())
}

fn print_samples(data: &Dataset) {
    let (matches, deliveries) = data.head(SAMPLE_ROWS);
    println!("\nSample matches data:");
    for m in matches {
        println!(
            "{:>6} {} {} vs {} at {} -> {}",
            m.id,
            m.season,
            m.team1,
            m.team2,
            m.venue,
            m.winner.as_deref().unwrap_or("no result")
        );
    }
    println!("\nSample deliveries data:");
    for d in deliveries {
        println!(
            "{:>6} inn {} over {:>2} {} to {} runs {}",
            d.match_id, d.inning, d.over, d.bowler, d.batsman, d.batsman_runs
        );
    }
    println!("\nMatches shape: {:?}", data.info.matches.shape());
    println!("Deliveries shape: {:?}", data.info.deliveries.shape());
}

fn print_tally<K: Display>(title: &str, tally: &Tally<K>, n: usize) {
    println!("\n{title}");
    if tally.is_empty() {
        println!("  (none)");
    }
    for (key, count) in tally.iter().take(n) {
        println!("  {key}: {count}");
    }
}

fn print_summary(summary: &LeagueSummary) {
    let margins = &summary.max_margins;
    println!("\nMaximum run margin victory:");
    match &margins.max_run_win {
        Some(m) => println!(
            "  {} by {} runs",
            m.winner.as_deref().unwrap_or("N/A"),
            m.win_by_runs
        ),
        None => println!("  (no matches)"),
    }
    println!("\nMaximum wicket margin victory:");
    match &margins.max_wicket_win {
        Some(m) => println!(
            "  {} by {} wickets",
            m.winner.as_deref().unwrap_or("N/A"),
            m.win_by_wickets
        ),
        None => println!("  (no matches)"),
    }

    print_tally("Top 5 cities by matches:", &summary.city_stats, PRINT_TOP);
    print_tally("Top 5 teams by wins:", &summary.team_wins, PRINT_TOP);

    match summary.toss.toss_winner_match_winner_pct {
        Some(pct) => println!("\nToss winner won match percentage: {pct:.2}%"),
        None => println!("\nToss winner won match percentage: N/A"),
    }
    print_tally(
        "Toss decision distribution:",
        &summary.toss.decision_distribution,
        usize::MAX,
    );

    print_tally(
        "Top 5 Man of Match award winners:",
        &summary.top_players.top_man_of_match,
        PRINT_TOP,
    );
    print_tally(
        "Top 5 six hitters:",
        &summary.top_players.top_six_hitters,
        PRINT_TOP,
    );

    print_tally("DL applied overall:", &summary.dl.dl_applied_overall, usize::MAX);
    print_tally("DL applied per season:", &summary.dl.dl_per_season, usize::MAX);

    print_tally(
        "Top 5 defending teams:",
        &summary.defend_chase.best_defending_teams,
        PRINT_TOP,
    );
    print_tally(
        "Top 5 chasing teams:",
        &summary.defend_chase.best_chasing_teams,
        PRINT_TOP,
    );
}

fn print_profile(profile: &CareerProfile) {
    let span = &profile.career_span;
    let stats = &profile.basic_stats;
    println!("\n{} Career Summary:", profile.player);
    println!(
        "Career Span: {} - {}",
        report::fmt_opt(span.first_season()),
        report::fmt_opt(span.last_season())
    );
    println!("Total Seasons: {}", span.total_seasons);
    println!("Total Matches: {}", span.total_matches);
    println!("Total Runs: {}", stats.total_runs);
    println!("Strike Rate: {}", stats.strike_rate);
    println!("Average: {}", stats.average);
    println!("Centuries: {}", profile.milestones.centuries);
    println!("Half-centuries: {}", profile.milestones.half_centuries);
    println!("Man of Match Awards: {}", profile.leadership.mom_awards);

    println!("\nSeason-wise Performance (Last {RECENT_SEASONS} seasons):");
    let rows = &profile.season_performance;
    for row in &rows[rows.len().saturating_sub(RECENT_SEASONS)..] {
        println!(
            "{}: {} runs @ {} SR, {} matches",
            row.key, row.stats.runs, row.stats.strike_rate, row.stats.matches
        );
    }
}

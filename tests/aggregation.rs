use std::path::PathBuf;
use std::sync::Arc;

use ipl_insights::analysis::{
    business_insights, dataset_overview, defending_chasing_stats, dl_analysis,
    max_margin_victories, summarize, toss_analysis, top_players,
};
use ipl_insights::dataset::{Dataset, Match, Name, load_dataset};

fn fixture() -> Dataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    load_dataset(&path).expect("fixtures should load")
}

fn name(s: &str) -> Name {
    Arc::from(s)
}

fn bare_match(id: u32, winner: &str, runs: u32, wickets: u32) -> Match {
    Match {
        id,
        season: 2010,
        city: None,
        venue: name("Venue"),
        team1: name("A"),
        team2: name("B"),
        toss_winner: name("A"),
        toss_decision: name("bat"),
        winner: Some(name(winner)),
        win_by_runs: runs,
        win_by_wickets: wickets,
        dl_applied: 0,
        player_of_match: None,
    }
}

fn keys<K: ToString>(rows: impl Iterator<Item = (K, u64)>) -> Vec<(String, u64)> {
    rows.map(|(k, n)| (k.to_string(), n)).collect()
}

#[test]
fn max_margin_picks_largest_winner() {
    let matches = vec![bare_match(1, "A", 120, 0), bare_match(2, "B", 45, 0)];
    let margins = max_margin_victories(&matches);
    let run = margins.max_run_win.expect("run win");
    assert_eq!(run.winner.as_deref(), Some("A"));
    assert_eq!(run.win_by_runs, 120);
}

#[test]
fn max_margin_ties_keep_first_row_and_empty_is_none() {
    let matches = vec![bare_match(1, "A", 50, 0), bare_match(2, "B", 50, 0)];
    let margins = max_margin_victories(&matches);
    assert_eq!(margins.max_run_win.map(|m| m.id), Some(1));

    let empty = max_margin_victories(&[]);
    assert!(empty.max_run_win.is_none());
    assert!(empty.max_wicket_win.is_none());
}

#[test]
fn fixture_summary_tables() {
    let data = fixture();
    let s = summarize(&data.matches, &data.deliveries, 10);

    let run = s.max_margins.max_run_win.as_ref().expect("run win");
    assert_eq!(run.id, 3);
    assert_eq!(run.win_by_runs, 97);
    let wkt = s.max_margins.max_wicket_win.as_ref().expect("wicket win");
    assert_eq!(wkt.winner.as_deref(), Some("Rising Pune Supergiant"));

    assert_eq!(
        keys(s.city_stats.iter()),
        vec![
            ("Mumbai".to_string(), 2),
            ("Hyderabad".to_string(), 1),
            ("Pune".to_string(), 1),
            ("Kolkata".to_string(), 1),
        ]
    );
    assert_eq!(
        s.team_wins.first().map(|(k, n)| (k.to_string(), n)),
        Some(("Mumbai Indians".to_string(), 2))
    );
    assert_eq!(s.team_wins.total(), 5);
}

#[test]
fn tally_sums_match_source_rows() {
    let data = fixture();
    let s = summarize(&data.matches, &data.deliveries, 10);
    let n = data.matches.len() as u64;
    let with_city = data.matches.iter().filter(|m| m.city.is_some()).count() as u64;
    let with_winner = data.matches.iter().filter(|m| m.winner.is_some()).count() as u64;

    assert_eq!(s.city_stats.total(), with_city);
    assert_eq!(s.team_wins.total(), with_winner);
    assert_eq!(s.toss.decision_distribution.total(), n);
    assert_eq!(s.dl.dl_applied_overall.total(), n);
}

#[test]
fn toss_percentage_is_bounded_and_none_when_empty() {
    let data = fixture();
    let toss = toss_analysis(&data.matches);
    assert_eq!(toss.toss_winner_wins, 3);
    let pct = toss.toss_winner_match_winner_pct.expect("non-empty");
    assert!((0.0..=100.0).contains(&pct));
    assert!((pct - 50.0).abs() < 1e-9);
    assert_eq!(
        keys(toss.decision_distribution.iter()),
        vec![("field".to_string(), 5), ("bat".to_string(), 1)]
    );

    assert!(toss_analysis(&[]).toss_winner_match_winner_pct.is_none());
}

#[test]
fn six_hitter_ties_keep_first_seen_order() {
    let data = fixture();
    let top = top_players(&data.matches, &data.deliveries, 10);
    assert_eq!(
        keys(top.top_six_hitters.iter()),
        vec![
            ("RG Sharma".to_string(), 3),
            ("DJ Bravo".to_string(), 3),
            ("Yuvraj Singh".to_string(), 2),
            ("DA Warner".to_string(), 1),
            ("SPD Smith".to_string(), 1),
        ]
    );
    assert_eq!(
        top.top_man_of_match.first().map(|(k, n)| (k.to_string(), n)),
        Some(("RG Sharma".to_string(), 2))
    );

    let top2 = top_players(&data.matches, &data.deliveries, 2);
    assert_eq!(top2.top_six_hitters.len(), 2);
    assert_eq!(top2.top_man_of_match.len(), 2);
}

#[test]
fn dl_per_season_is_ascending_with_zero_seasons() {
    let data = fixture();
    let dl = dl_analysis(&data.matches);
    assert_eq!(
        keys(dl.dl_per_season.iter()),
        vec![
            ("2017".to_string(), 0),
            ("2018".to_string(), 1),
            ("2019".to_string(), 0),
        ]
    );
    assert_eq!(dl.dl_applied_overall.get(&1), 1);
    assert_eq!(dl.dl_applied_overall.get(&0), 5);
}

#[test]
fn defending_and_chasing_split_on_margin_type() {
    let data = fixture();
    let dc = defending_chasing_stats(&data.matches);
    assert_eq!(
        keys(dc.best_defending_teams.iter()),
        vec![
            ("Mumbai Indians".to_string(), 2),
            ("Sunrisers Hyderabad".to_string(), 1),
        ]
    );
    assert_eq!(dc.best_chasing_teams.total(), 2);
    assert_eq!(dc.best_venues_defending.total(), 3);
    assert_eq!(dc.best_venues_chasing.total(), 2);
}

#[test]
fn overview_counts_distinct_values() {
    let data = fixture();
    let o = dataset_overview(&data.matches, &data.deliveries);
    assert_eq!(o.total_matches, 6);
    assert_eq!(o.total_deliveries, 25);
    assert_eq!(o.total_teams, 3);
    assert_eq!(o.total_cities, 4);
    assert_eq!(o.total_venues, 4);
    assert_eq!(o.seasons, vec![2017, 2018, 2019]);
    assert_eq!(
        o.most_active_venue.map(|(v, n)| (v.to_string(), n)),
        Some(("Wankhede Stadium".to_string(), 2))
    );
    assert_eq!(o.avg_win_margin_runs, Some(48.0));
    assert_eq!(o.avg_win_margin_wickets, Some(4.0));
}

#[test]
fn summarize_is_idempotent() {
    let data = fixture();
    let a = summarize(&data.matches, &data.deliveries, 10);
    let b = summarize(&data.matches, &data.deliveries, 10);
    assert_eq!(a, b);
}

#[test]
fn business_insights_are_fixed() {
    let insights = business_insights();
    assert_eq!(insights.len(), 5);
    assert!(insights[1].starts_with("Toss advantage"));
}

use std::path::PathBuf;
use std::sync::Arc;

use ipl_insights::dataset::{Dataset, Delivery, Match, Name, load_dataset};
use ipl_insights::player_career::{
    CareerError, MATCHUP_LIMIT, Phase, analyze_player, consistency, milestones,
};

const PLAYER: &str = "RG Sharma";

fn fixture() -> Dataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    load_dataset(&path).expect("fixtures should load")
}

fn name(s: &str) -> Name {
    Arc::from(s)
}

fn one_match(id: u32) -> Match {
    Match {
        id,
        season: 2015,
        city: Some(name("Mumbai")),
        venue: name("Wankhede Stadium"),
        team1: name("Mumbai Indians"),
        team2: name("Chennai Super Kings"),
        toss_winner: name("Mumbai Indians"),
        toss_decision: name("bat"),
        winner: Some(name("Mumbai Indians")),
        win_by_runs: 10,
        win_by_wickets: 0,
        dl_applied: 0,
        player_of_match: None,
    }
}

fn ball(match_id: u32, over: u8, bowler: &str, runs: u32) -> Delivery {
    Delivery {
        match_id,
        inning: 1,
        over,
        batting_team: name("Mumbai Indians"),
        batsman: name(PLAYER),
        bowler: name(bowler),
        batsman_runs: runs,
        wide_runs: 0,
        player_dismissed: None,
        dismissal_kind: None,
    }
}

#[test]
fn three_ball_innings_rates() {
    let matches = vec![one_match(1)];
    let deliveries = vec![
        ball(1, 1, "DL Chahar", 4),
        ball(1, 1, "DL Chahar", 6),
        ball(1, 2, "DL Chahar", 0),
    ];
    let p = analyze_player(&matches, &deliveries, PLAYER).expect("profile");
    assert_eq!(p.basic_stats.total_balls, 3);
    assert_eq!(p.basic_stats.total_runs, 10);
    assert_eq!(p.basic_stats.strike_rate, 333.33);
    assert_eq!(p.basic_stats.fours, 1);
    assert_eq!(p.basic_stats.sixes, 1);
    // Never dismissed: average falls back to zero.
    assert_eq!(p.basic_stats.dismissals, 0);
    assert_eq!(p.basic_stats.average, 0.0);
}

#[test]
fn unknown_player_is_an_error() {
    let data = fixture();
    let err = analyze_player(&data.matches, &data.deliveries, "Nobody").unwrap_err();
    assert_eq!(
        err,
        CareerError::EmptyPlayerData {
            player: "Nobody".to_string()
        }
    );
}

#[test]
fn fixture_career_totals() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");

    assert_eq!(&*p.player, PLAYER);
    assert_eq!(p.career_span.seasons, vec![2017, 2018, 2019]);
    assert_eq!(p.career_span.total_matches, 4);
    assert_eq!(p.basic_stats.total_runs, 36);
    // The wide in match 3 is not a ball faced.
    assert_eq!(p.basic_stats.total_balls, 14);
    assert_eq!(p.basic_stats.dismissals, 2);
    assert_eq!(p.basic_stats.average, 18.0);
    assert_eq!(p.basic_stats.strike_rate, 257.14);
    assert_eq!(p.basic_stats.fours, 3);
    assert_eq!(p.basic_stats.sixes, 3);
}

#[test]
fn season_runs_sum_to_career_runs() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");
    let seasons: Vec<(u16, u32, usize)> = p
        .season_performance
        .iter()
        .map(|row| (row.key, row.stats.runs, row.stats.matches))
        .collect();
    assert_eq!(seasons, vec![(2017, 17, 1), (2018, 18, 2), (2019, 1, 1)]);
    let total: u32 = p.season_performance.iter().map(|row| row.stats.runs).sum();
    assert_eq!(total, p.basic_stats.total_runs);
}

#[test]
fn phase_balls_sum_to_total_balls() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");
    let phases: Vec<Phase> = p.phase_performance.iter().map(|row| row.key).collect();
    assert_eq!(phases, Phase::ALL.to_vec());

    let balls: u32 = p.phase_performance.iter().map(|row| row.stats.balls).sum();
    assert_eq!(balls, p.basic_stats.total_balls);

    let pp = p.phase(Phase::Powerplay).expect("powerplay");
    assert_eq!((pp.runs, pp.balls), (16, 6));
    let death = p.phase(Phase::Death).expect("death");
    assert_eq!((death.runs, death.balls, death.dismissals), (8, 4, 1));
    assert_eq!(death.strike_rate, 200.0);
}

#[test]
fn innings_and_venue_breakdowns() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");

    let first = p.innings(1).expect("first innings");
    assert_eq!((first.runs, first.matches), (35, 3));
    assert_eq!(p.innings(2).map(|l| l.runs), Some(1));

    let venues: Vec<(String, u32)> = p
        .venue_performance
        .iter()
        .map(|row| (row.key.to_string(), row.stats.runs))
        .collect();
    assert_eq!(
        venues,
        vec![
            ("Wankhede Stadium".to_string(), 23),
            ("Eden Gardens".to_string(), 13),
        ]
    );
    assert_eq!(p.team_performance.len(), 1);
    assert_eq!(p.team_performance[0].stats.matches, 4);
}

#[test]
fn score_metrics_from_fixture() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");
    let scores: Vec<u32> = p.match_scores.iter().map(|s| s.runs).collect();
    assert_eq!(scores, vec![17, 6, 12, 1]);
    assert_eq!(p.milestones.highest_scores, vec![17, 12, 6, 1]);

    let c = &p.consistency;
    assert_eq!(c.mean_score, 9.0);
    assert_eq!(c.median_score, 9.0);
    assert_eq!(c.std_deviation, 6.04);
    assert_eq!(c.coefficient_of_variation, 67.13);
    assert_eq!(c.ducks, 0);
    assert_eq!(c.total_innings, 4);
    assert!(p.milestones.centuries + p.milestones.half_centuries <= c.total_innings);
    assert!(c.ducks <= c.total_innings);

    assert_eq!(p.dismissal_analysis.total(), 2);
}

#[test]
fn leadership_counts_team_results() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");
    let l = &p.leadership;
    assert_eq!(l.mom_awards, 2);
    assert_eq!(l.matches_batted, 4);
    assert_eq!(l.team_wins, 2);
    assert_eq!(l.team_win_pct, 50.0);
}

#[test]
fn matchups_sorted_by_balls_faced() {
    let data = fixture();
    let p = analyze_player(&data.matches, &data.deliveries, PLAYER).expect("profile");
    let order: Vec<(String, u32)> = p
        .bowler_matchups
        .iter()
        .map(|m| (m.bowler.to_string(), m.balls))
        .collect();
    assert_eq!(order[0], ("SP Narine".to_string(), 5));
    assert_eq!(order[1], ("AD Russell".to_string(), 2));
    assert_eq!(order.len(), 7);
    assert_eq!(p.bowler_matchups[0].runs, 13);
}

#[test]
fn matchups_capped_at_limit() {
    let matches = vec![one_match(1)];
    let deliveries: Vec<Delivery> = (0..20)
        .map(|i| ball(1, 1 + (i % 20) as u8, &format!("Bowler {i}"), 1))
        .collect();
    let p = analyze_player(&matches, &deliveries, PLAYER).expect("profile");
    assert_eq!(p.bowler_matchups.len(), MATCHUP_LIMIT);
}

#[test]
fn milestone_bounds() {
    let m = milestones(&[100, 99, 50, 49, 0, 120]);
    assert_eq!(m.centuries, 2);
    assert_eq!(m.half_centuries, 2);
    assert_eq!(m.highest_scores, vec![120, 100, 99, 50, 49, 0]);

    let many: Vec<u32> = (0..25).collect();
    assert_eq!(milestones(&many).highest_scores.len(), 10);

    let c = consistency(&[50, 30, 0]);
    assert_eq!(c.scores_above_50, 1);
    assert_eq!(c.scores_above_30, 2);
    assert_eq!(c.ducks, 1);
}

#[test]
fn man_of_match_without_batting_still_counts_as_a_match() {
    let mut batted = one_match(1);
    batted.season = 2011;
    batted.venue = name("V1");
    let mut award_only = one_match(2);
    award_only.season = 2012;
    award_only.venue = name("V2");
    award_only.player_of_match = Some(name(PLAYER));
    let matches = vec![batted, award_only];
    let deliveries = vec![ball(1, 1, "DL Chahar", 4)];

    let p = analyze_player(&matches, &deliveries, PLAYER).expect("profile");
    assert_eq!(p.career_span.total_matches, 2);
    assert_eq!(p.career_span.seasons, vec![2011, 2012]);

    let seasons: Vec<(u16, u32, usize)> = p
        .season_performance
        .iter()
        .map(|row| (row.key, row.stats.runs, row.stats.matches))
        .collect();
    assert_eq!(seasons, vec![(2011, 4, 1), (2012, 0, 1)]);
    let venues: Vec<(String, u32, usize)> = p
        .venue_performance
        .iter()
        .map(|row| (row.key.to_string(), row.stats.runs, row.stats.matches))
        .collect();
    assert_eq!(
        venues,
        vec![("V1".to_string(), 4, 1), ("V2".to_string(), 0, 1)]
    );

    assert_eq!(p.leadership.mom_awards, 1);
    assert_eq!(p.leadership.matches_batted, 1);
}

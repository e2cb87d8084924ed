use std::path::PathBuf;

use ipl_insights::dataset::{load_dataset, load_dataset_from_readers};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn null_count(nulls: &[(String, usize)], column: &str) -> usize {
    nulls
        .iter()
        .find(|(name, _)| name == column)
        .map_or(0, |(_, n)| *n)
}

#[test]
fn loads_fixture_tables_with_shapes() {
    let data = load_dataset(&fixtures_dir()).expect("fixtures should load");
    assert_eq!(data.matches.len(), 6);
    assert_eq!(data.deliveries.len(), 25);
    assert_eq!(data.info.matches.shape(), (6, 18));
    assert_eq!(data.info.deliveries.shape(), (25, 21));
}

#[test]
fn empty_cells_become_none_and_count_as_nulls() {
    let data = load_dataset(&fixtures_dir()).expect("fixtures should load");

    let fifth = &data.matches[4];
    assert!(fifth.city.is_none());
    assert_eq!(fifth.dl_applied, 1);
    let last = &data.matches[5];
    assert!(last.winner.is_none());
    assert!(last.player_of_match.is_none());

    let m = &data.info.matches;
    assert_eq!(null_count(&m.nulls, "city"), 1);
    assert_eq!(null_count(&m.nulls, "winner"), 1);
    assert_eq!(null_count(&m.nulls, "umpire3"), 6);
    assert_eq!(m.total_nulls(), 9);

    let d = &data.info.deliveries;
    assert_eq!(null_count(&d.nulls, "player_dismissed"), 22);
    assert_eq!(null_count(&d.nulls, "fielder"), 24);
    assert_eq!(d.total_nulls(), 68);
}

#[test]
fn quoted_venue_keeps_its_comma() {
    let data = load_dataset(&fixtures_dir()).expect("fixtures should load");
    assert_eq!(
        &*data.matches[0].venue,
        "Rajiv Gandhi International Stadium, Uppal"
    );
}

#[test]
fn head_caps_at_table_length() {
    let data = load_dataset(&fixtures_dir()).expect("fixtures should load");
    let (m, d) = data.head(5);
    assert_eq!(m.len(), 5);
    assert_eq!(d.len(), 5);
    let (m, _) = data.head(50);
    assert_eq!(m.len(), 6);
}

#[test]
fn missing_directory_names_the_file() {
    let err = load_dataset(&fixtures_dir().join("nope")).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("matches.csv"), "{msg}");
}

#[test]
fn malformed_number_reports_row() {
    let matches = "id,season,city,venue,team1,team2,toss_winner,toss_decision,winner,win_by_runs,win_by_wickets,dl_applied,player_of_match\n\
                   1,2017,Pune,MCA,A,B,A,bat,A,10,0,0,X\n\
                   2,twenty,Pune,MCA,A,B,A,bat,A,10,0,0,X\n";
    let deliveries = "match_id,inning,batting_team,over,batsman,bowler,batsman_runs,wide_runs,player_dismissed,dismissal_kind\n";
    let err = load_dataset_from_readers(matches.as_bytes(), deliveries.as_bytes()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("malformed row 2"), "{msg}");
}

#[test]
fn batter_column_alias_is_accepted() {
    let matches = "id,season,city,venue,team1,team2,toss_winner,toss_decision,winner,win_by_runs,win_by_wickets,dl_applied,player_of_match\n\
                   1,2020,Dubai,Dubai International Cricket Stadium,A,B,A,bat,A,5,0,0,X\n";
    let deliveries = "match_id,inning,batting_team,over,batter,bowler,batsman_runs,wide_runs,player_dismissed,dismissal_kind\n\
                      1,1,A,1,X,Y,4,0,,\n";
    let data = load_dataset_from_readers(matches.as_bytes(), deliveries.as_bytes())
        .expect("alias header should load");
    assert_eq!(&*data.deliveries[0].batsman, "X");
    assert!(data.deliveries[0].player_dismissed.is_none());
}

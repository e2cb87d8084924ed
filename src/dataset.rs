use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const MATCHES_FILE: &str = "matches.csv";
pub const DELIVERIES_FILE: &str = "deliveries.csv";

/// Team, venue, city and player names. Shared between both tables so equal
/// names point at the same allocation.
pub type Name = Arc<str>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: u32,
    pub season: u16,
    pub city: Option<Name>,
    pub venue: Name,
    pub team1: Name,
    pub team2: Name,
    pub toss_winner: Name,
    pub toss_decision: Name,
    pub winner: Option<Name>,
    pub win_by_runs: u32,
    pub win_by_wickets: u32,
    pub dl_applied: u8,
    pub player_of_match: Option<Name>,
}

impl Match {
    /// Batting-first win (defended a total).
    pub fn defended(&self) -> bool {
        self.win_by_runs > 0
    }

    /// Chasing win.
    pub fn chased(&self) -> bool {
        self.win_by_wickets > 0
    }

    pub fn toss_winner_won(&self) -> bool {
        self.winner.as_ref().is_some_and(|w| *w == self.toss_winner)
    }

    pub fn is_player_of_match(&self, player: &str) -> bool {
        self.player_of_match.as_deref() == Some(player)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub match_id: u32,
    pub inning: u8,
    pub over: u8,
    pub batting_team: Name,
    pub batsman: Name,
    pub bowler: Name,
    pub batsman_runs: u32,
    pub wide_runs: u32,
    pub player_dismissed: Option<Name>,
    pub dismissal_kind: Option<Name>,
}

impl Delivery {
    /// Wides are not a ball faced by the striker.
    pub fn is_ball_faced(&self) -> bool {
        self.wide_runs == 0
    }

    pub fn dismisses(&self, player: &str) -> bool {
        self.player_dismissed.as_deref() == Some(player)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: usize,
    /// Empty cells per column, in header order.
    pub nulls: Vec<(String, usize)>,
}

impl TableInfo {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn total_nulls(&self) -> usize {
        self.nulls.iter().map(|(_, n)| n).sum()
    }

    /// Share of non-empty cells, 0..=100.
    pub fn completeness_pct(&self) -> f64 {
        let cells = self.rows * self.columns;
        if cells == 0 {
            return 100.0;
        }
        (cells - self.total_nulls().min(cells)) as f64 / cells as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub matches: TableInfo,
    pub deliveries: TableInfo,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub matches: Vec<Match>,
    pub deliveries: Vec<Delivery>,
    pub info: DatasetInfo,
}

impl Dataset {
    pub fn head(&self, n: usize) -> (&[Match], &[Delivery]) {
        (
            &self.matches[..n.min(self.matches.len())],
            &self.deliveries[..n.min(self.deliveries.len())],
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: u32,
    season: u16,
    #[serde(default)]
    city: Option<String>,
    venue: String,
    team1: String,
    team2: String,
    toss_winner: String,
    toss_decision: String,
    #[serde(default)]
    winner: Option<String>,
    win_by_runs: u32,
    win_by_wickets: u32,
    dl_applied: u8,
    #[serde(default)]
    player_of_match: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDelivery {
    match_id: u32,
    inning: u8,
    over: u8,
    batting_team: String,
    #[serde(alias = "batter", alias = "striker")]
    batsman: String,
    bowler: String,
    batsman_runs: u32,
    wide_runs: u32,
    #[serde(default)]
    player_dismissed: Option<String>,
    #[serde(default)]
    dismissal_kind: Option<String>,
}

#[derive(Debug, Default)]
struct Interner {
    names: HashSet<Name>,
}

impl Interner {
    fn intern(&mut self, raw: &str) -> Name {
        if let Some(name) = self.names.get(raw) {
            return name.clone();
        }
        let name: Name = Arc::from(raw);
        self.names.insert(name.clone());
        name
    }

    fn intern_opt(&mut self, raw: Option<&str>) -> Option<Name> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| self.intern(s))
    }
}

pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    let matches_path = data_dir.join(MATCHES_FILE);
    let deliveries_path = data_dir.join(DELIVERIES_FILE);
    let matches = File::open(&matches_path)
        .with_context(|| format!("open matches table {}", matches_path.display()))?;
    let deliveries = File::open(&deliveries_path)
        .with_context(|| format!("open deliveries table {}", deliveries_path.display()))?;
    load_dataset_from_readers(BufReader::new(matches), BufReader::new(deliveries))
        .with_context(|| format!("load dataset from {}", data_dir.display()))
}

/// Reader-based entry point so tests can feed in-memory CSV.
pub fn load_dataset_from_readers<M: Read, D: Read>(matches: M, deliveries: D) -> Result<Dataset> {
    let mut names = Interner::default();

    let (matches, matches_info) = read_table(matches, MATCHES_FILE, |raw: RawMatch| Match {
        id: raw.id,
        season: raw.season,
        city: names.intern_opt(raw.city.as_deref()),
        venue: names.intern(&raw.venue),
        team1: names.intern(&raw.team1),
        team2: names.intern(&raw.team2),
        toss_winner: names.intern(&raw.toss_winner),
        toss_decision: names.intern(&raw.toss_decision),
        winner: names.intern_opt(raw.winner.as_deref()),
        win_by_runs: raw.win_by_runs,
        win_by_wickets: raw.win_by_wickets,
        dl_applied: raw.dl_applied,
        player_of_match: names.intern_opt(raw.player_of_match.as_deref()),
    })?;

    let (deliveries, deliveries_info) =
        read_table(deliveries, DELIVERIES_FILE, |raw: RawDelivery| Delivery {
            match_id: raw.match_id,
            inning: raw.inning,
            over: raw.over,
            batting_team: names.intern(&raw.batting_team),
            batsman: names.intern(&raw.batsman),
            bowler: names.intern(&raw.bowler),
            batsman_runs: raw.batsman_runs,
            wide_runs: raw.wide_runs,
            player_dismissed: names.intern_opt(raw.player_dismissed.as_deref()),
            dismissal_kind: names.intern_opt(raw.dismissal_kind.as_deref()),
        })?;

    log::debug!(
        "loaded {} matches, {} deliveries, {} distinct names",
        matches.len(),
        deliveries.len(),
        names.names.len()
    );

    Ok(Dataset {
        matches,
        deliveries,
        info: DatasetInfo {
            matches: matches_info,
            deliveries: deliveries_info,
        },
    })
}

fn read_table<R, Raw, T>(
    rdr: R,
    label: &str,
    mut convert: impl FnMut(Raw) -> T,
) -> Result<(Vec<T>, TableInfo)>
where
    R: Read,
    Raw: DeserializeOwned,
{
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(rdr);
    let headers = reader
        .headers()
        .with_context(|| format!("{label}: read header"))?
        .clone();

    let mut nulls = vec![0usize; headers.len()];
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let row_no = rows.len() + 1;
        let more = reader
            .read_record(&mut record)
            .with_context(|| format!("{label}: read row {row_no}"))?;
        if !more {
            break;
        }
        for (idx, field) in record.iter().enumerate() {
            if field.is_empty()
                && let Some(count) = nulls.get_mut(idx)
            {
                *count += 1;
            }
        }
        let raw: Raw = record
            .deserialize(Some(&headers))
            .with_context(|| format!("{label}: malformed row {row_no}"))?;
        rows.push(convert(raw));
    }

    let info = TableInfo {
        rows: rows.len(),
        columns: headers.len(),
        nulls: headers
            .iter()
            .map(str::to_string)
            .zip(nulls)
            .collect(),
    };
    Ok((rows, info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_shares_allocations() {
        let mut names = Interner::default();
        let a = names.intern("Mumbai Indians");
        let b = names.intern("Mumbai Indians");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(names.intern_opt(Some("  ")), None);
        assert_eq!(names.intern_opt(None), None);
    }

    #[test]
    fn completeness_counts_empty_cells() {
        let info = TableInfo {
            rows: 2,
            columns: 2,
            nulls: vec![("a".to_string(), 1), ("b".to_string(), 0)],
        };
        assert_eq!(info.shape(), (2, 2));
        assert!((info.completeness_pct() - 75.0).abs() < 1e-9);
    }
}

/*!
Aggregation of county-level election results into statewide race summaries.

The entry point is [`run_statewide_tally`]: it takes every normalized county row
of an election, groups the rows into races and candidates, and produces one
[`RaceSummary`] per race with the statewide totals, the vote share of each
candidate, the winner (if any), the margin of victory and the tie flag.

```
use statewide_tally::*;

let row = |candidate: &str, party: &str, votes: u64| NormalizedRow {
    date: "2012-11-06".to_string(),
    office: "U.S. Senate".to_string(),
    office_clean: "U.S. Senate".to_string(),
    district: None,
    party: party.to_string(),
    party_clean: party.to_string(),
    candidate: candidate.to_string(),
    first_name: "".to_string(),
    last_name: candidate.to_string(),
    votes,
};

let summaries = run_statewide_tally(
    vec![row("Smith", "REP", 350), row("Jones", "DEM", 400), row("Smith", "REP", 250)],
    &TallyRules::DEFAULT_RULES,
)?;
assert_eq!(summaries[0].all_votes, 1000);
assert_eq!(summaries[0].winner().map(|c| c.candidate.as_str()), Some("Smith"));
# Ok::<(), TallyErrors>(())
```
*/

mod config;
pub mod builder;
pub mod manual;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use log::{debug, info};

use std::ops::Sub;

pub use crate::config::*;

/// The rows of one race, grouped by candidate in encounter order.
pub type CandidateRows = IndexMap<CandidateKey, Vec<NormalizedRow>>;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

// Only used on ranked counts, where the left side is never smaller.
impl Sub for VoteCount {
    type Output = VoteCount;
    fn sub(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 - rhs.0)
    }
}

// A candidate during aggregation, before the percentages are known.
#[derive(Eq, PartialEq, Debug, Clone)]
struct CandidateInternal<'a> {
    first_row: &'a NormalizedRow,
    count: VoteCount,
}

// How the top of a ranked race resolved.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum RaceOutcome {
    // Only one candidate: elected without a margin.
    Unopposed,
    // The first two candidates have the same count.
    Tie,
    // The first candidate leads by the given count.
    Won(VoteCount),
}

/// Runs the full tabulation: groups the rows and aggregates every race.
///
/// Races are returned in the order in which they were first encountered in `rows`.
/// Any fatal condition in any race fails the whole run.
pub fn run_statewide_tally(
    rows: Vec<NormalizedRow>,
    rules: &TallyRules,
) -> Result<Vec<RaceSummary>, TallyErrors> {
    rules.validate()?;
    info!(
        "run_statewide_tally: Processing {:?} rows, rules: {:?}",
        rows.len(),
        rules
    );

    let races = group_rows(rows);
    info!("run_statewide_tally: Found {:?} races", races.len());

    let mut res: Vec<RaceSummary> = Vec::new();
    for (key, cand_rows) in races.iter() {
        let summary = aggregate_race(key, cand_rows, rules)?;
        info!(
            "Race {}: {} votes, {} candidates, winner: {:?}, tie: {}",
            key,
            summary.all_votes,
            summary.candidates.len(),
            summary.winner().map(|c| c.candidate.clone()),
            summary.tie_race
        );
        res.push(summary);
    }
    Ok(res)
}

/// Partitions the rows into races, and within each race into candidates.
///
/// Every row ends up in exactly one group. Both the races and the candidates
/// keep the order in which they first appear, and the rows of a candidate keep
/// their input order.
pub fn group_rows(rows: Vec<NormalizedRow>) -> IndexMap<RaceKey, CandidateRows> {
    let mut races: IndexMap<RaceKey, CandidateRows> = IndexMap::new();
    for row in rows {
        races
            .entry(row.race_key())
            .or_default()
            .entry(row.candidate_key())
            .or_default()
            .push(row);
    }
    debug!(
        "group_rows: races: {:?}",
        races
            .iter()
            .map(|(k, cands)| (k.to_string(), cands.len()))
            .collect::<Vec<_>>()
    );
    races
}

/// Reduces the grouped rows of one race into its statewide summary.
pub fn aggregate_race(
    key: &RaceKey,
    cand_rows: &CandidateRows,
    rules: &TallyRules,
) -> Result<RaceSummary, TallyErrors> {
    rules.validate()?;

    let mut ranked: Vec<CandidateInternal> = Vec::new();
    let mut empty_candidate: Option<&CandidateKey> = None;
    for (cand_key, rows) in cand_rows.iter() {
        // Identity fields come from the first row of the candidate.
        match rows.first() {
            Some(first_row) => {
                let count: VoteCount = rows.iter().map(|r| VoteCount(r.votes)).sum();
                debug!(
                    "aggregate_race: {}: {:?}: {:?} rows, {:?}",
                    key,
                    cand_key,
                    rows.len(),
                    count
                );
                ranked.push(CandidateInternal { first_row, count });
            }
            None => {
                empty_candidate = empty_candidate.or(Some(cand_key));
            }
        }
    }
    if ranked.is_empty() {
        return Err(TallyErrors::EmptyRace(key.clone()));
    }
    // Every candidate key must produce exactly one output record.
    if let Some(cand_key) = empty_candidate {
        return Err(TallyErrors::EmptyCandidate(key.clone(), cand_key.clone()));
    }

    let total: VoteCount = ranked.iter().map(|c| c.count).sum();
    if total == VoteCount::EMPTY {
        return Err(TallyErrors::ZeroVoteRace(key.clone()));
    }

    // Stable: equal counts keep their encounter order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    let outcome = match ranked.as_slice() {
        [_] => RaceOutcome::Unopposed,
        [first, second, ..] if first.count == second.count => RaceOutcome::Tie,
        [first, second, ..] => RaceOutcome::Won(first.count - second.count),
        [] => return Err(TallyErrors::EmptyRace(key.clone())),
    };
    debug!("aggregate_race: {}: outcome: {:?}", key, outcome);

    let candidates: Vec<CandidateTotal> = ranked
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let is_first = idx == 0;
            let (winner, margin_of_vic) = match outcome {
                RaceOutcome::Unopposed => (is_first, None),
                RaceOutcome::Tie => (false, None),
                RaceOutcome::Won(lead) if is_first => {
                    (true, Some(percentage(lead, total, rules.decimal_places)))
                }
                RaceOutcome::Won(_) => (false, None),
            };
            CandidateTotal {
                candidate: c.first_row.candidate.clone(),
                first_name: c.first_row.first_name.clone(),
                last_name: c.first_row.last_name.clone(),
                party: c.first_row.party.clone(),
                party_clean: c.first_row.party_clean.clone(),
                votes: c.count.0,
                vote_pct: percentage(c.count, total, rules.decimal_places),
                winner,
                margin_of_vic,
            }
        })
        .collect();

    // All the rows of a race share the race metadata.
    let meta = ranked[0].first_row;
    Ok(RaceSummary {
        date: meta.date.clone(),
        office: meta.office_clean.clone(),
        district: meta.district,
        all_votes: total.0,
        tie_race: outcome == RaceOutcome::Tie,
        candidates,
    })
}

/// Flattens the summaries into one record per race and candidate.
///
/// Races keep their order, and candidates keep their ranked order within a race.
pub fn summary_records(races: &[RaceSummary]) -> impl Iterator<Item = SummaryRecord> + '_ {
    races.iter().flat_map(|race| {
        race.candidates.iter().map(move |c| SummaryRecord {
            date: race.date.clone(),
            office: race.office.clone(),
            district: race.district,
            last_name: c.last_name.clone(),
            first_name: c.first_name.clone(),
            party_clean: c.party_clean.clone(),
            all_votes: race.all_votes,
            votes: c.votes,
            vote_pct: c.vote_pct.clone(),
            winner: c.winner,
            margin_of_vic: c.margin_of_vic.clone(),
            tie_race: race.tie_race,
        })
    })
}

// The share of `part` in `total`, in percent, rounded half up.
// The total must not be empty.
fn percentage(part: VoteCount, total: VoteCount, decimal_places: u32) -> BigDecimal {
    let ratio = BigDecimal::from(part.0) * BigDecimal::from(100u64) / BigDecimal::from(total.0);
    round_half_up(ratio, decimal_places)
}

// Only for non-negative values: truncation after adding half a unit.
fn round_half_up(x: BigDecimal, decimal_places: u32) -> BigDecimal {
    let half_unit = BigDecimal::from(1u64) / BigDecimal::from(2 * 10u64.pow(decimal_places));
    (x + half_unit).with_scale(decimal_places as i64)
}

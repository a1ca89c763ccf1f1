//! Cleaning of the raw rows: names, parties, offices and vote counts.

use crate::report::*;

/// The clean label of all the U.S. House races.
pub const HOUSE_OFFICE: &str = "U.S. House of Representatives";

/// Splits a "Last, First" name into `(last, first)`.
pub fn split_name(candidate: &str) -> Option<(String, String)> {
    candidate
        .split_once(',')
        .map(|(last, first)| (last.trim().to_string(), first.trim().to_string()))
}

/// Maps a party label to its canonical code.
pub fn clean_party(party: &str) -> String {
    let party = party.trim().to_uppercase();
    if party.starts_with("GOP") {
        "REP".to_string()
    } else if party.starts_with("DEM") {
        "DEM".to_string()
    } else {
        party
    }
}

/// Maps an office label to its clean label and, for House seats, its district.
///
/// Returns `None` for a House seat without a readable district number.
pub fn clean_office(office: &str) -> Option<(String, Option<u32>)> {
    if office.contains("Rep") {
        let district = office.rsplit('-').next()?.trim().parse::<u32>().ok()?;
        Some((HOUSE_OFFICE.to_string(), Some(district)))
    } else {
        Some((office.trim().to_string(), None))
    }
}

fn parse_votes(raw: &RawRow) -> ReportResult<u64> {
    raw.votes
        .trim()
        .parse::<u64>()
        .ok()
        .context(MalformedVoteCountSnafu {
            lineno: raw.lineno,
            content: &raw.votes,
        })
}

pub fn normalize_row(raw: &RawRow) -> BReportResult<NormalizedRow> {
    let (last_name, first_name) =
        split_name(&raw.candidate).context(MalformedCandidateNameSnafu {
            lineno: raw.lineno,
            content: &raw.candidate,
        })?;
    let (office_clean, district) = clean_office(&raw.office).context(MalformedDistrictSnafu {
        lineno: raw.lineno,
        content: &raw.office,
    })?;
    let votes = parse_votes(raw)?;
    Ok(NormalizedRow {
        date: raw.date.clone(),
        office: raw.office.clone(),
        office_clean,
        district,
        party: raw.party.clone(),
        party_clean: clean_party(&raw.party),
        candidate: raw.candidate.clone(),
        first_name,
        last_name,
        votes,
    })
}

/// Cleans all the rows. The first malformed row stops the run.
pub fn normalize_rows(raw_rows: &[RawRow]) -> BReportResult<Vec<NormalizedRow>> {
    let mut res: Vec<NormalizedRow> = Vec::with_capacity(raw_rows.len());
    for raw in raw_rows.iter() {
        let row = normalize_row(raw)?;
        debug!("normalize_rows: {:?} -> {:?}", raw, row);
        res.push(row);
    }
    info!("Normalized {} rows", res.len());
    Ok(res)
}

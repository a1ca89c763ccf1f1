// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use bigdecimal::BigDecimal;

/// One county-level observation for one candidate in one race.
///
/// The raw `office`, `party` and `candidate` strings are the identity keys.
/// The cleaned fields are carried through to the report.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedRow {
    /// Reporting date, passed through untouched.
    pub date: String,
    pub office: String,
    pub office_clean: String,
    /// Only present for district-based offices.
    pub district: Option<u32>,
    pub party: String,
    pub party_clean: String,
    /// Display name as supplied by the source ("Last, First").
    pub candidate: String,
    pub first_name: String,
    pub last_name: String,
    pub votes: u64,
}

impl NormalizedRow {
    pub fn race_key(&self) -> RaceKey {
        RaceKey {
            office: self.office.clone(),
            district: self.district,
        }
    }

    pub fn candidate_key(&self) -> CandidateKey {
        CandidateKey {
            party: self.party.clone(),
            candidate: self.candidate.clone(),
        }
    }
}

/// Identifies a race: the raw office label and the district, if any.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct RaceKey {
    pub office: String,
    pub district: Option<u32>,
}

impl Display for RaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.district {
            Some(d) => write!(f, "{} (district {})", self.office, d),
            None => write!(f, "{}", self.office),
        }
    }
}

/// Identifies a candidate within a race.
///
/// Two candidates may share a display name as long as they run under
/// different party labels.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct CandidateKey {
    pub party: String,
    pub candidate: String,
}

// ******** Output data structures *********

/// Statewide rollup for one candidate in one race.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateTotal {
    pub candidate: String,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    pub party_clean: String,
    pub votes: u64,
    pub vote_pct: BigDecimal,
    pub winner: bool,
    /// Only set on the winner of a race with at least two candidates.
    pub margin_of_vic: Option<BigDecimal>,
}

/// The statewide summary of one race.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RaceSummary {
    pub date: String,
    /// The clean office label.
    pub office: String,
    pub district: Option<u32>,
    pub all_votes: u64,
    pub tie_race: bool,
    /// Sorted by votes, highest first. Equal counts keep their encounter order.
    pub candidates: Vec<CandidateTotal>,
}

impl RaceSummary {
    pub fn winner(&self) -> Option<&CandidateTotal> {
        self.candidates.iter().find(|c| c.winner)
    }
}

/// A flat output record: the race-level fields merged with the fields of
/// one candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryRecord {
    pub date: String,
    pub office: String,
    pub district: Option<u32>,
    pub last_name: String,
    pub first_name: String,
    pub party_clean: String,
    pub all_votes: u64,
    pub votes: u64,
    pub vote_pct: BigDecimal,
    pub winner: bool,
    pub margin_of_vic: Option<BigDecimal>,
    pub tie_race: bool,
}

/// Errors that prevent the tabulation from completing successfully.
///
/// All of them are fatal: no partial summary is produced.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// A race was handed over without any candidate.
    EmptyRace(RaceKey),
    /// A candidate of the race was handed over without any row.
    EmptyCandidate(RaceKey, CandidateKey),
    /// A race whose candidates received zero votes in total. Percentages
    /// cannot be computed for it.
    ZeroVoteRace(RaceKey),
    /// The rules ask for more decimal places than supported.
    InvalidPrecision(u32),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyRace(key) => write!(f, "race {} has no candidates", key),
            TallyErrors::EmptyCandidate(key, cand) => write!(
                f,
                "candidate {:?} ({:?}) of race {} has no rows",
                cand.candidate, cand.party, key
            ),
            TallyErrors::ZeroVoteRace(key) => {
                write!(f, "race {} has zero votes in total", key)
            }
            TallyErrors::InvalidPrecision(places) => write!(
                f,
                "cannot round percentages to {} decimal places (maximum {})",
                places,
                TallyRules::MAX_DECIMAL_PLACES
            ),
        }
    }
}

// ********* Configuration **********

/// The rules that govern the computation of a report.
///
/// The precision is fixed once for the whole report so that every percentage
/// and margin shares the same number of decimal places.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    /// Number of digits kept after the decimal point. Values are rounded half up.
    pub decimal_places: u32,
}

impl TallyRules {
    pub const MAX_DECIMAL_PLACES: u32 = 12;

    pub const DEFAULT_RULES: TallyRules = TallyRules { decimal_places: 2 };

    pub fn validate(&self) -> Result<(), TallyErrors> {
        if self.decimal_places > TallyRules::MAX_DECIMAL_PLACES {
            return Err(TallyErrors::InvalidPrecision(self.decimal_places));
        }
        Ok(())
    }
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules::DEFAULT_RULES
    }
}

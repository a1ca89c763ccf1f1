use crate::config::*;

use crate::run_statewide_tally;

/// A builder for adding county rows one at a time.
///
/// ```
/// pub use statewide_tally::builder::Builder;
/// pub use statewide_tally::TallyRules;
/// # use statewide_tally::TallyErrors;
///
/// let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)?.date("2012-11-06");
///
/// builder.add_county_votes("U.S. Senate", None, "Smith, Joe", "REP", 600)?;
/// builder.add_county_votes("U.S. Senate", None, "Doe, Jane", "DEM", 400)?;
///
/// let summaries = builder.tally()?;
/// assert_eq!(summaries[0].date, "2012-11-06");
/// assert_eq!(summaries[0].candidates[0].last_name, "Smith");
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _date: String,
    pub(crate) _rows: Vec<NormalizedRow>,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, TallyErrors> {
        rules.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _date: String::new(),
            _rows: Vec::new(),
        })
    }

    /// Sets the reporting date used by the rows added with `add_county_votes`.
    pub fn date(self, date: &str) -> Builder {
        Builder {
            _date: date.to_string(),
            ..self
        }
    }

    /// Adds the votes of one county for one candidate.
    ///
    /// It is the simplest use case: the labels are assumed to be clean already,
    /// and the candidate name is expected in the "Last, First" form.
    pub fn add_county_votes(
        &mut self,
        office: &str,
        district: Option<u32>,
        candidate: &str,
        party: &str,
        votes: u64,
    ) -> Result<(), TallyErrors> {
        let (last_name, first_name) = match candidate.split_once(',') {
            Some((last, first)) => (last.trim(), first.trim()),
            None => (candidate.trim(), ""),
        };
        self.add_row(&NormalizedRow {
            date: self._date.clone(),
            office: office.to_string(),
            office_clean: office.to_string(),
            district,
            party: party.to_string(),
            party_clean: party.to_string(),
            candidate: candidate.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            votes,
        })
    }

    pub fn add_row(&mut self, row: &NormalizedRow) -> Result<(), TallyErrors> {
        self._rows.push(row.clone());
        Ok(())
    }

    /// Runs the tabulation over all the rows added so far.
    pub fn tally(self) -> Result<Vec<RaceSummary>, TallyErrors> {
        run_statewide_tally(self._rows, &self._rules)
    }
}

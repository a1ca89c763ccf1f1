// Serialization of the summary.

use std::io::Write;

use crate::report::*;

/// The columns of the summary, in order.
pub const SUMMARY_COLUMNS: [&str; 12] = [
    "date",
    "office",
    "district",
    "last_name",
    "first_name",
    "party_clean",
    "all_votes",
    "votes",
    "vote_pct",
    "winner",
    "margin_of_vic",
    "tie_race",
];

/// Renders the summary as CSV: one header row, then one row per race and candidate.
///
/// Flags are rendered with `marker` when set and left empty otherwise.
pub fn format_summary_csv(summaries: &[RaceSummary], marker: &str) -> BReportResult<String> {
    let flag = |b: bool| if b { marker.to_string() } else { "".to_string() };

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(SUMMARY_COLUMNS).context(CsvWriteSnafu {})?;

    let mut num_records: usize = 0;
    for rec in summary_records(summaries) {
        wtr.write_record([
            rec.date,
            rec.office,
            rec.district.map(|d| d.to_string()).unwrap_or_default(),
            rec.last_name,
            rec.first_name,
            rec.party_clean,
            rec.all_votes.to_string(),
            rec.votes.to_string(),
            rec.vote_pct.to_string(),
            flag(rec.winner),
            rec.margin_of_vic.map(|m| m.to_string()).unwrap_or_default(),
            flag(rec.tie_race),
        ])
        .context(CsvWriteSnafu {})?;
        num_records += 1;
    }
    debug!("format_summary_csv: {} records", num_records);

    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(FlushingSummarySnafu {})?;
    let res = String::from_utf8(bytes).context(SummaryEncodingSnafu {})?;
    Ok(res)
}

/// Writes the summary to a file in one go, or to the standard output.
pub fn write_summary(summary_csv: &str, output: &str) -> BReportResult<()> {
    if output == "stdout" {
        let mut out = std::io::stdout();
        out.write_all(summary_csv.as_bytes())
            .context(WritingFileSnafu { path: output })?;
        return Ok(());
    }
    fs::write(output, summary_csv).context(WritingFileSnafu { path: output })?;
    info!("Summary written to {:?}", output);
    Ok(())
}

// Primitives for reading CSV files.

use crate::report::{
    io_common::{assemble_row, get_col_index_mapping, REQUIRED_COLUMNS},
    *,
};

/// Reads the county results of a CSV file with a header row.
pub fn read_csv_results(path: &str) -> BReportResult<Vec<RawRow>> {
    let data = fs::read(path).context(OpeningFileSnafu { path })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_slice());

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_results: header: {:?}", header);
    let col_indexes = get_col_index_mapping(&REQUIRED_COLUMNS, &header, path)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // Fallback when the reader does not report a position: the header is the first line.
        let mut lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if let Some(pos) = line.position() {
            lineno = record_start_line(&data, pos);
        }
        debug!("read_csv_results: lineno: {:?} row: {:?}", lineno, line);
        let row = assemble_row(lineno, &col_indexes, |col| {
            line.get(col).map(|s| s.to_string())
        })?;
        res.push(row);
    }
    Ok(res)
}

// The reader places a record at the end of the previous one, before the
// blank lines it skips.
fn record_start_line(data: &[u8], pos: &csv::Position) -> usize {
    let start = (pos.byte() as usize).min(data.len());
    let skipped = data[start..]
        .iter()
        .take_while(|b| **b == b'\n' || **b == b'\r')
        .filter(|b| **b == b'\n')
        .count();
    pos.line() as usize + skipped
}

use std::collections::HashMap;

use crate::report::*;

/// The columns every source must provide, in the order of the fields of `RawRow`.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "office", "candidate", "party", "votes"];

/// Given the header of a file (names of each of the columns), finds the position of
/// each of the required columns.
pub fn get_col_index_mapping(
    req_col_names: &[&str],
    header: &[Option<String>],
    path: &str,
) -> BReportResult<Vec<usize>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_lowercase(), idx)))
        .collect();

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let mut col_indexes: Vec<usize> = Vec::new();
    for cname in req_col_names {
        let idx = col_names.get(*cname).context(MissingColumnSnafu {
            column: *cname,
            path,
        })?;
        col_indexes.push(*idx);
    }
    Ok(col_indexes)
}

/// Assembles a raw row from the cells of a line, using the column positions
/// returned by `get_col_index_mapping`.
pub fn assemble_row(
    lineno: usize,
    col_indexes: &[usize],
    cell: impl Fn(usize) -> Option<String>,
) -> BReportResult<RawRow> {
    let mut fields: Vec<String> = Vec::new();
    for idx in col_indexes {
        fields.push(cell(*idx).context(LineTooShortSnafu { lineno })?);
    }
    match fields.as_slice() {
        [date, office, candidate, party, votes] => Ok(RawRow {
            lineno,
            date: date.clone(),
            office: office.clone(),
            candidate: candidate.clone(),
            party: party.clone(),
            votes: votes.clone(),
        }),
        _ => Err(Box::new(ReportError::LineTooShort { lineno })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<Option<String>> {
        names.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn columns_are_found_in_any_order() {
        let h = header(&["county", "Votes", "party", "candidate", "office", "date"]);
        let idxs = get_col_index_mapping(&REQUIRED_COLUMNS, &h, "test.csv").unwrap();
        assert_eq!(idxs, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn missing_column() {
        let h = header(&["date", "office", "candidate", "votes"]);
        let res = get_col_index_mapping(&REQUIRED_COLUMNS, &h, "test.csv");
        match res.err().map(|e| *e) {
            Some(ReportError::MissingColumn { column, .. }) => assert_eq!(column, "party"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn short_line() {
        let cells = vec!["2012-11-06".to_string(), "U.S. Senate".to_string()];
        let res = assemble_row(3, &[0, 1, 2, 3, 4], |idx| cells.get(idx).cloned());
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::LineTooShort { lineno: 3 })
        ));
    }
}

// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::{
    io_common::{assemble_row, get_col_index_mapping, REQUIRED_COLUMNS},
    *,
};

/// Reads the county results of an Excel workbook. The first row of the worksheet is the header.
pub fn read_excel_results(path: &str, worksheet_name: Option<&str>) -> BReportResult<Vec<RawRow>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    debug!("read_excel_results: header: {:?}", header);
    let col_indexes = get_col_index_mapping(&REQUIRED_COLUMNS, &header, path)?;

    // The range starts at the first non-empty row of the worksheet.
    let first_row = wrange.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut res: Vec<RawRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = first_row + idx + 2;
        debug!("read_excel_results: lineno: {:?} row: {:?}", lineno, row);
        let mut cells: Vec<String> = Vec::new();
        for cell in row.iter() {
            cells.push(read_cell(cell, lineno)?);
        }
        // Rows that are completely blank are formatting leftovers.
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        res.push(assemble_row(lineno, &col_indexes, |col| {
            cells.get(col).cloned()
        })?);
    }
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize) -> BReportResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        // Vote counts are often stored as floating point numbers.
        // Values that do not fit a u64 keep their text and are rejected later.
        DataType::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64 => {
            Ok(format!("{}", *f as u64))
        }
        DataType::Float(f) => Ok(f.to_string()),
        _ => Err(Box::new(ReportError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", cell),
        })),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BReportResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_results: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => Err(Box::new(ReportError::EmptyExcel {
            path: path.to_string(),
        })),
        [(worksheet_name, wrange)] => {
            debug!(
                "read_excel_results: path: {:?} using the only worksheet: {:?}",
                path, worksheet_name
            );
            Ok(wrange.clone())
        }
        _ => Err(Box::new(ReportError::AmbiguousWorksheet {
            path: path.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook(name: &str) -> String {
        format!(
            "{}/testdata/{}/{}_results.xlsx",
            env!("CARGO_MANIFEST_DIR"),
            name,
            name
        )
    }

    #[test]
    fn cells_are_read_as_text() {
        assert_eq!(read_cell(&DataType::String("Doe, Jane".to_string()), 2).unwrap(), "Doe, Jane");
        assert_eq!(read_cell(&DataType::Int(42), 2).unwrap(), "42");
        assert_eq!(read_cell(&DataType::Float(350.0), 2).unwrap(), "350");
        assert_eq!(read_cell(&DataType::Float(3.5), 2).unwrap(), "3.5");
        assert_eq!(read_cell(&DataType::Empty, 2).unwrap(), "");
    }

    #[test]
    fn huge_floats_are_not_clamped() {
        let big = read_cell(&DataType::Float(2f64.powi(64)), 2).unwrap();
        assert!(big.parse::<u64>().is_err(), "{:?}", big);
        let largest = read_cell(&DataType::Float(2f64.powi(53)), 2).unwrap();
        assert_eq!(largest, "9007199254740992");
    }

    #[test]
    fn other_cells_fail() {
        let res = read_cell(&DataType::Bool(true), 7);
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::ExcelWrongCellType { lineno: 7, .. })
        ));
    }

    #[test]
    fn missing_workbook_fails() {
        let res = read_excel_results("/nonexistent/results.xlsx", None);
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::OpeningExcel { .. })
        ));
    }

    #[test]
    fn only_worksheet_is_used() {
        let rows = read_excel_results(&workbook("excel_single_sheet"), None).unwrap();
        // Row 4 of the worksheet is blank.
        assert_eq!(
            rows.iter().map(|r| r.lineno).collect::<Vec<usize>>(),
            vec![2, 3, 5, 6, 7]
        );
        assert_eq!(
            rows[0],
            RawRow {
                lineno: 2,
                date: "2012-11-06".to_string(),
                office: "U.S. Rep - 2".to_string(),
                candidate: "Rigell, Scott".to_string(),
                party: "GOP".to_string(),
                votes: "5612".to_string(),
            }
        );
        assert_eq!(rows[3].votes, " 2890 ");
    }

    #[test]
    fn named_worksheet_is_used() {
        let rows = read_excel_results(&workbook("excel_named_sheet"), Some("Results")).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].office, "Attorney General");
        assert_eq!(rows[0].votes, "1103777");
        assert_eq!(rows[2].lineno, 6);
    }

    #[test]
    fn several_worksheets_need_a_name() {
        let res = read_excel_results(&workbook("excel_named_sheet"), None);
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::AmbiguousWorksheet { .. })
        ));
    }

    #[test]
    fn unknown_worksheet_fails() {
        let res = read_excel_results(&workbook("excel_named_sheet"), Some("Totals"));
        assert!(matches!(
            res.err().map(|e| *e),
            Some(ReportError::EmptyExcel { .. })
        ));
    }
}

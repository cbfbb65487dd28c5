//! A1 notation helpers.

/// Quote a sheet name for use in an A1 range.
///
/// Names are always quoted, with embedded quotes doubled. A bare name that
/// also reads as a cell reference (`Q1`, `FY2024`, `R1C1`) is resolved as
/// that cell of the first sheet.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Build a range for a sheet, optionally anchored at a cell or cell range.
pub fn sheet_range(sheet: &str, cells: Option<&str>) -> String {
    let sheet = quote_sheet_name(sheet);
    match cells {
        Some(cells) => format!("{sheet}!{cells}"),
        None => sheet,
    }
}

/// Range covering a single row, starting at column A.
pub fn row_range(sheet: &str, row: usize) -> String {
    sheet_range(sheet, Some(&format!("A{row}")))
}

/// Parse the 1-based row number of the first cell in an A1 range.
///
/// The range must be qualified with a sheet name, as ranges returned by the
/// service always are. Returns None if the range has no row component, e.g.
/// `Sheet1!A:C`.
pub fn parse_start_row(range: &str) -> Option<usize> {
    // Cell references never contain '!', quoted sheet names might.
    let cells = &range[range.rfind('!')? + 1..];
    let first = cells.split(':').next()?;
    let digits: String = first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(row) => Some(row),
    }
}

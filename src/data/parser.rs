use std::path::Path;

use crate::error::LoadError;

/// Marks comment lines and the header line of whitespace-delimited files.
pub const COMMENT_MARKER: char = '%';

/// Time-column names whose leading marker is dropped.
const TIME_ALIASES: &[(&str, &str)] = &[
    ("%Time", "Time"),
    ("%CurrentSimTime", "CurrentSimTime"),
    ("%t", "t"),
];

/// Delimiter used by a text datafile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Whitespace,
}

/// Header position and delimiter detected from the first lines of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    /// 0-based line index of the header row.
    pub header_line: usize,
    pub delimiter: Delimiter,
}

/// Column names and column-major values parsed from a text datafile.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

/// Detect the header line and delimiter.
///
/// All leading lines that contain the comment marker are counted; the last of
/// them is the header. Returns `None` for a file with no lines.
pub fn detect_layout(lines: &[&str], path: &Path) -> Option<TextLayout> {
    if lines.is_empty() {
        return None;
    }
    let comment_lines = lines
        .iter()
        .take_while(|line| line.contains(COMMENT_MARKER))
        .count();
    let header_line = comment_lines.saturating_sub(1);

    let is_csv = has_extension(path, "csv");
    let delimiter = if is_csv || lines[header_line].contains(',') {
        Delimiter::Comma
    } else {
        Delimiter::Whitespace
    };

    Some(TextLayout {
        header_line,
        delimiter,
    })
}

/// Parse a comma or whitespace delimited datafile. Returns `Ok(None)` when the
/// file has no lines.
pub fn parse_delimited(text: &str, path: &Path) -> Result<Option<ParsedTable>, LoadError> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(layout) = detect_layout(&lines, path) else {
        return Ok(None);
    };

    let body = &lines[layout.header_line..];
    let rows: Vec<Vec<String>> = match layout.delimiter {
        Delimiter::Comma => split_csv(&body.join("\n"))?,
        Delimiter::Whitespace => body
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect(),
    };

    let Some((header, data)) = rows.split_first() else {
        return Ok(None);
    };
    let columns = normalize_header(header);
    Ok(Some(to_columns(columns, data)))
}

/// Parse a headerless whitespace-delimited spectral file (`.scd`/`.spc`).
pub fn parse_spectral(text: &str) -> Result<Option<ParsedTable>, LoadError> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect();
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let names: &[&str] = match first.len() {
        3 => &["wavelen", "wavenum", "trans"],
        5 => &["wavelen", "wavenum", "emis", "trans", "refl"],
        other => return Err(LoadError::SpectralColumns(other)),
    };
    let columns = names.iter().map(|s| s.to_string()).collect();
    Ok(Some(to_columns(columns, &rows)))
}

/// Fix up header tokens: drop a lone marker (`% time x y`) and strip the
/// marker from known time-column aliases.
pub fn normalize_header(tokens: &[String]) -> Vec<String> {
    let mut names: Vec<String> = tokens.iter().map(|t| t.trim().to_string()).collect();
    if names.first().map(String::as_str) == Some("%") {
        names.remove(0);
    }
    for name in &mut names {
        if let Some((_, plain)) = TIME_ALIASES.iter().find(|(marked, _)| name == marked) {
            *name = plain.to_string();
        }
    }
    names
}

fn split_csv(text: &str) -> Result<Vec<Vec<String>>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Row-major strings to column-major numbers. Unparsable or missing cells are NaN.
fn to_columns(columns: Vec<String>, rows: &[Vec<String>]) -> ParsedTable {
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); columns.len()];
    for row in rows {
        for (col_idx, col) in values.iter_mut().enumerate() {
            let v = row
                .get(col_idx)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            col.push(v);
        }
    }
    ParsedTable { columns, values }
}

pub fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, name: &str) -> ParsedTable {
        parse_delimited(text, Path::new(name)).unwrap().unwrap()
    }

    #[test]
    fn last_comment_line_is_the_header() {
        let text = "% generated by sim\n%Time x y\n0 1 2\n1 2 3\n";
        let lines: Vec<&str> = text.lines().collect();
        let layout = detect_layout(&lines, Path::new("run.txt")).unwrap();
        assert_eq!(layout.header_line, 1);
        assert_eq!(layout.delimiter, Delimiter::Whitespace);

        let table = parse(text, "run.txt");
        assert_eq!(table.columns, vec!["Time", "x", "y"]);
        assert_eq!(table.values[0], vec![0.0, 1.0]);
        assert_eq!(table.values[2], vec![2.0, 3.0]);
    }

    #[test]
    fn two_comment_lines_skip_only_the_first() {
        // The second comment line is the header; the third line is data.
        let text = "% comment\n% time alt\n0.0 10.0\n0.5 11.0\n";
        let table = parse(text, "traj.txt");
        assert_eq!(table.columns, vec!["time", "alt"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.values[1], vec![10.0, 11.0]);
    }

    #[test]
    fn marker_followed_by_space_shifts_names() {
        let text = "% t v\n0 5\n1 6\n";
        let table = parse(text, "a.dat");
        assert_eq!(table.columns, vec!["t", "v"]);
        assert_eq!(table.values[1], vec![5.0, 6.0]);
    }

    #[test]
    fn time_aliases_lose_their_marker() {
        let table = parse("%CurrentSimTime a\n0 1\n", "b.plt");
        assert_eq!(table.columns, vec!["CurrentSimTime", "a"]);
        let table = parse("%t a\n0 1\n", "b.plt");
        assert_eq!(table.columns, vec!["t", "a"]);
    }

    #[test]
    fn comma_files_use_first_line_header() {
        let table = parse("Time,alt,\"speed, m/s\"\n0,1,2\n1,bad,4\n", "x.csv");
        assert_eq!(table.columns, vec!["Time", "alt", "speed, m/s"]);
        assert_eq!(table.values[0], vec![0.0, 1.0]);
        assert!(table.values[1][1].is_nan());
        assert_eq!(table.values[2], vec![2.0, 4.0]);
    }

    #[test]
    fn csv_extension_forces_comma_even_for_single_column() {
        let table = parse("Time\n1\n2\n", "single.csv");
        assert_eq!(table.columns, vec!["Time"]);
        assert_eq!(table.values[0], vec![1.0, 2.0]);
    }

    #[test]
    fn short_rows_pad_with_nan() {
        let table = parse("a b c\n1 2\n", "short.txt");
        assert!(table.values[2][0].is_nan());
    }

    #[test]
    fn empty_file_is_none() {
        assert!(parse_delimited("", Path::new("empty.txt")).unwrap().is_none());
        assert!(parse_spectral("").unwrap().is_none());
    }

    #[test]
    fn spectral_files_are_headerless() {
        let table = parse_spectral("0.4 25000 0.9\n0.5 20000 0.8\n").unwrap().unwrap();
        assert_eq!(table.columns, vec!["wavelen", "wavenum", "trans"]);
        assert_eq!(table.row_count(), 2);

        let table = parse_spectral("1 2 3 4 5\n").unwrap().unwrap();
        assert_eq!(table.columns.len(), 5);

        assert!(matches!(
            parse_spectral("1 2 3 4\n"),
            Err(LoadError::SpectralColumns(4))
        ));
    }
}

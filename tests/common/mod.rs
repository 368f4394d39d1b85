#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dashplot::config::{CellValue, RawSheet, RawWorkbook};
use rust_xlsxwriter::Workbook;

pub const COLUMNS: &[&str] = &["Variable", "Value", "Scale", "Offset", "Mode", "LineLabel"];

pub fn text(s: &str) -> CellValue {
    CellValue::text(s)
}

pub fn num(v: f64) -> CellValue {
    CellValue::Number(v)
}

/// Builds a graph sheet row by row, in the column layout of [`COLUMNS`].
pub struct SheetBuilder {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl SheetBuilder {
    pub fn new(name: &str) -> Self {
        let header = COLUMNS.iter().map(|c| text(c)).collect();
        Self {
            name: name.to_string(),
            rows: vec![header],
        }
    }

    pub fn row(mut self, variable: &str, value: CellValue) -> Self {
        self.rows.push(vec![text(variable), value]);
        self
    }

    pub fn line(mut self, column: &str, mode: &str) -> Self {
        self.rows.push(vec![
            text("yValue"),
            text(column),
            CellValue::Empty,
            CellValue::Empty,
            text(mode),
        ]);
        self
    }

    pub fn build(self) -> RawSheet {
        RawSheet::new(self.name, self.rows)
    }
}

pub fn header_sheet(datafile: &Path) -> RawSheet {
    RawSheet::new(
        "header",
        vec![
            vec![text("Variable"), text("Value")],
            vec![text("PageTop"), text("Flight test\nrun 1")],
            vec![text("PageBottom"), text("(c) test rig")],
            vec![text("Pagetitle"), text("Test dashboard")],
            vec![text("Datafile"), text(&datafile.to_string_lossy())],
        ],
    )
}

/// A whitespace datafile: `Time` 0..=10, `alt` = 2t, `speed` = t + 100.
pub fn write_datafile(dir: &Path) -> PathBuf {
    let mut body = String::from("% test run\n%Time alt speed\n");
    for i in 0..=10 {
        let t = i as f64;
        body.push_str(&format!("{} {} {}\n", t, 2.0 * t, t + 100.0));
    }
    let path = dir.join("run.txt");
    std::fs::write(&path, body).unwrap();
    path
}

/// Two tabs: `graph-alt` with two separate charts (the second with markers)
/// and `graph-all` combining both panels as subplots.
pub fn workbook(datafile: &Path) -> RawWorkbook {
    let alt = SheetBuilder::new("graph-alt")
        .row("Datafile", text("master"))
        .row("xValue", text("Time"))
        .row("xLabel", text("Time [s]"))
        .row("Title", text("Altitude"))
        .row("yLabel", text("m"))
        .line("alt", "lines")
        .row("Title", text("Speed"))
        .row("yLabel", text("m/s"))
        .line("speed", "lines+markers")
        .build();

    let all = SheetBuilder::new("graph-all")
        .row("Datafile", text("master"))
        .row("xValue", text("Time"))
        .row("xLabel", text("Time [s]"))
        .row("UseSubplots", num(1.0))
        .row("Height", num(300.0))
        .row("GraphBottom", text("End of report"))
        .row("Title", text("Altitude"))
        .row("yLabel", text("m"))
        .line("alt", "lines")
        .row("Title", text("Speed"))
        .row("yLabel", text("m/s"))
        .line("speed", "lines")
        .build();

    RawWorkbook {
        sheets: vec![header_sheet(datafile), alt, all],
    }
}

/// Save sheets as an `.xlsx` workbook, in order, leaving empty cells unwritten.
pub fn write_xlsx(path: &Path, sheets: &[RawSheet]) {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).unwrap();
        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    CellValue::Empty => {}
                    CellValue::Number(v) => {
                        worksheet.write_number(r, c, *v).unwrap();
                    }
                    CellValue::Text(s) => {
                        worksheet.write_string(r, c, s).unwrap();
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// A spreadsheet datafile: `samples` (Time 0..=4, alt = 2t, speed = t + 100)
/// followed by a `notes` sheet that must be ignored.
pub fn write_data_workbook(dir: &Path) -> PathBuf {
    let mut rows = vec![vec![text("Time"), text("alt"), text("speed")]];
    for i in 0..=4 {
        let t = i as f64;
        rows.push(vec![num(t), num(2.0 * t), num(t + 100.0)]);
    }
    let notes = RawSheet::new("notes", vec![vec![text("operator"), text("J. Doe")]]);

    let path = dir.join("run.xlsx");
    write_xlsx(&path, &[RawSheet::new("samples", rows), notes]);
    path
}

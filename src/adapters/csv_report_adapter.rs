//! CSV writer for screen results and chart payloads.

use crate::domain::chart::ChartData;
use crate::domain::error::ScreenerError;
use crate::domain::screening::ScreenResult;
use crate::ports::report_port::ReportPort;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Writes to `path`, or to stdout when no path is set.
pub struct CsvReportAdapter {
    path: Option<PathBuf>,
}

impl CsvReportAdapter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn sink(&self) -> Result<Box<dyn Write>, ScreenerError> {
        match &self.path {
            Some(p) => Ok(Box::new(File::create(p)?)),
            None => Ok(Box::new(io::stdout().lock())),
        }
    }
}

fn csv_err(e: csv::Error) -> ScreenerError {
    ScreenerError::Io(io::Error::other(e))
}

fn opt_cell(v: Option<f64>) -> String {
    v.map(|x| format!("{:.4}", x)).unwrap_or_default()
}

pub fn write_screen_csv<W: Write>(out: W, results: &[ScreenResult]) -> Result<(), ScreenerError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["code", "last_close"]).map_err(csv_err)?;
    for r in results {
        wtr.write_record([r.security_id.clone(), format!("{:.2}", r.last_close)])
            .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_chart_csv<W: Write>(out: W, chart: &ChartData) -> Result<(), ScreenerError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "open", "high", "low", "close", "volume", "ma20", "ma100"])
        .map_err(csv_err)?;
    for row in &chart.rows {
        let b = &row.bar;
        wtr.write_record([
            b.period_end.format("%Y-%m-%d").to_string(),
            format!("{:.2}", b.open),
            format!("{:.2}", b.high),
            format!("{:.2}", b.low),
            format!("{:.2}", b.close),
            b.volume.to_string(),
            opt_cell(row.ma20),
            opt_cell(row.ma100),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write_screen(&self, results: &[ScreenResult]) -> Result<(), ScreenerError> {
        write_screen_csv(self.sink()?, results)
    }

    fn write_chart(&self, chart: &ChartData) -> Result<(), ScreenerError> {
        write_chart_csv(self.sink()?, chart)
    }
}

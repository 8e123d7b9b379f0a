//! Output port for screen results and chart payloads.

use crate::domain::chart::ChartData;
use crate::domain::error::ScreenerError;
use crate::domain::screening::ScreenResult;

pub trait ReportPort {
    fn write_screen(&self, results: &[ScreenResult]) -> Result<(), ScreenerError>;

    fn write_chart(&self, chart: &ChartData) -> Result<(), ScreenerError>;
}

mod report;

pub use report::{NewReport, Report, ReportFile, ReportMessage};

use crate::domain::model::{Action, Disposition, ResourceKind, ResourceSnapshot};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

const REPORT_HEADER: &str = "Daily Resource Optimization Report:";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub kind: ResourceKind,
    pub id: String,
    pub region: String,
    pub disposition: Disposition,
}

impl ReportLine {
    pub fn new(snapshot: &ResourceSnapshot, disposition: Disposition) -> Self {
        Self {
            kind: snapshot.kind,
            id: snapshot.id.clone(),
            region: snapshot.region.clone(),
            disposition,
        }
    }

    fn write_head(&self, f: &mut fmt::Formatter<'_>, tag: &str) -> fmt::Result {
        write!(f, "{} [{}]: {} ({})", self.kind.label(), tag, self.id, self.region)
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.disposition {
            Disposition::Excluded => self.write_head(f, "Excluded"),
            Disposition::AlreadyTransitioning => self.write_head(f, "Already Stopping"),
            Disposition::StructurallyBlocked { reason } => {
                self.write_head(f, "IDLE")?;
                write!(f, " - Reason: {}", reason)
            }
            Disposition::ActionTaken { action, detail } => {
                let tag = match action {
                    Action::Stop => "Stopped",
                    Action::ScaleToZero => "Scaled 0",
                };
                self.write_head(f, tag)?;
                match detail {
                    Some(detail) => write!(f, " - {}", detail),
                    None => Ok(()),
                }
            }
            Disposition::ActionFailed { error, .. } => {
                self.write_head(f, "Error")?;
                write!(f, " - {}", error)
            }
            Disposition::NotIdle => self.write_head(f, "Not Idle"),
            Disposition::NotActionable { reason } => {
                self.write_head(f, "Skipped")?;
                write!(f, " - {}", reason)
            }
        }
    }
}

/// Finished report, ready for a notification sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub subject: String,
    pub body: String,
    pub item_count: usize,
}

/// Append-only collection of surfaced report lines. One instance per region;
/// regions are merged with [`ReportAggregator::merge_by_region`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportAggregator {
    lines: Vec<ReportLine>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the line only if its disposition is surfaced. Returns whether it
    /// was kept.
    pub fn record(&mut self, line: ReportLine) -> bool {
        if !line.disposition.is_surfaced() {
            return false;
        }
        self.lines.push(line);
        true
    }

    pub fn extend(&mut self, other: ReportAggregator) {
        self.lines.extend(other.lines);
    }

    /// Concatenate per-region aggregators ordered by region name, independent
    /// of the order in which regions finished.
    pub fn merge_by_region(mut parts: Vec<(String, ReportAggregator)>) -> Self {
        parts.sort_by(|a, b| a.0.cmp(&b.0));
        parts
            .into_iter()
            .fold(Self::new(), |mut merged, (_, part)| {
                merged.extend(part);
                merged
            })
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `None` when nothing was surfaced; no notification should go out then.
    pub fn build(&self, date: NaiveDate) -> Option<Report> {
        if self.is_empty() {
            return None;
        }

        let mut body = format!("{}\n\n{}\n", REPORT_HEADER, "-".repeat(40));
        let rendered: Vec<String> = self.lines.iter().map(ToString::to_string).collect();
        body.push_str(&rendered.join("\n"));
        body.push_str(&format!("\n\nTotal Resources Processed: {}", self.len()));

        Some(Report {
            subject: format!("AWS Optimization Report - {}", date.format("%Y-%m-%d")),
            body,
            item_count: self.len(),
        })
    }
}

//! Run reporting sink.
//!
//! Every pipeline component receives a `&dyn Reporter` and records what went
//! wrong through it instead of writing to a shared log file.

use serde::Serialize;
use std::cell::RefCell;
use tracing::{debug, error, warn};

/// Something worth reporting during an extraction run
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A single field could not be located or converted and was defaulted
    FieldMissing {
        entity: &'static str,
        key: String,
        field: &'static str,
    },
    /// One or more required fields were missing; the record was kept
    RecordDegraded {
        entity: &'static str,
        key: String,
        fields: Vec<&'static str>,
    },
    /// A page failed to fetch or had no row container; it was skipped
    PageUnavailable { url: String, reason: String },
    /// A schedule row had no usable natural key
    RowSkipped { url: String, index: usize },
    /// Geocoding failed; latitude and longitude stay unset
    EnrichmentFailure { location: String, reason: String },
}

/// Injected sink for run events
pub trait Reporter {
    fn record(&self, event: Event);
}

/// Counts of everything that did not go to plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub fields_missing: usize,
    pub degraded_records: usize,
    pub pages_skipped: usize,
    pub rows_skipped: usize,
    pub enrichment_failures: usize,
}

impl RunReport {
    fn tally(&mut self, event: &Event) {
        match event {
            Event::FieldMissing { .. } => self.fields_missing += 1,
            Event::RecordDegraded { .. } => self.degraded_records += 1,
            Event::PageUnavailable { .. } => self.pages_skipped += 1,
            Event::RowSkipped { .. } => self.rows_skipped += 1,
            Event::EnrichmentFailure { .. } => self.enrichment_failures += 1,
        }
    }

    /// True when nothing was skipped, degraded, or left unenriched
    pub fn is_clean(&self) -> bool {
        self.degraded_records == 0
            && self.pages_skipped == 0
            && self.rows_skipped == 0
            && self.enrichment_failures == 0
    }
}

/// Forwards events to `tracing` and keeps a running tally
#[derive(Default)]
pub struct TracingReporter {
    report: RefCell<RunReport>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counts so far
    pub fn summary(&self) -> RunReport {
        self.report.borrow().clone()
    }
}

impl Reporter for TracingReporter {
    fn record(&self, event: Event) {
        match &event {
            Event::FieldMissing { entity, key, field } => {
                debug!("{} {}: field `{}` missing, using default", entity, key, field);
            }
            Event::RecordDegraded { entity, key, fields } => {
                warn!("{} {} degraded, missing required: {}", entity, key, fields.join(", "));
            }
            Event::PageUnavailable { url, reason } => {
                error!("Skipping page {}: {}", url, reason);
            }
            Event::RowSkipped { url, index } => {
                warn!("Skipping row {} on {}: no game id", index, url);
            }
            Event::EnrichmentFailure { location, reason } => {
                warn!("Could not geocode {}: {}", location, reason);
            }
        }
        self.report.borrow_mut().tally(&event);
    }
}

/// Counts events on their way to another reporter
pub struct Tally<'a> {
    inner: &'a dyn Reporter,
    report: RefCell<RunReport>,
}

impl<'a> Tally<'a> {
    pub fn new(inner: &'a dyn Reporter) -> Self {
        Self {
            inner,
            report: RefCell::new(RunReport::default()),
        }
    }

    pub fn into_report(self) -> RunReport {
        self.report.into_inner()
    }
}

impl Reporter for Tally<'_> {
    fn record(&self, event: Event) {
        self.report.borrow_mut().tally(&event);
        self.inner.record(event);
    }
}

/// Captures events in memory
#[cfg(test)]
#[derive(Default)]
pub struct MemoryReporter {
    events: RefCell<Vec<Event>>,
}

#[cfg(test)]
impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn summary(&self) -> RunReport {
        let mut report = RunReport::default();
        for event in self.events.borrow().iter() {
            report.tally(event);
        }
        report
    }
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

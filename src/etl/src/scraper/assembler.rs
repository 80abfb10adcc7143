//! Record assembly from a manifest.
//!
//! `assemble` runs one extraction per descriptor and resolves every Missing
//! to the descriptor's default, so callers read fully-populated values.

use scraper::{ElementRef, Selector};

use super::field::{descend, extract, convert, Extracted, FieldValue};
use super::manifest::{BoxScoreLayout, Manifest, ScoreColumns};
use crate::report::{Event, Reporter};
use crate::types::BoxScore;

/// Field name to outcome, in manifest order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    entries: Vec<(&'static str, Extracted)>,
}

impl ExtractionResult {
    pub fn get(&self, name: &str) -> Option<&Extracted> {
        self.entries
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assembled values for one record
#[derive(Debug, Clone)]
pub struct Assembled {
    pub entity: &'static str,
    pub result: ExtractionResult,
    /// Every field that resolved to Missing
    pub failed: Vec<&'static str>,
    /// Required fields among `failed`
    pub missing_required: Vec<&'static str>,
    pub degraded: bool,
    values: Vec<(&'static str, FieldValue)>,
}

impl Assembled {
    fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(field, _)| *field == name).map(|(_, v)| v)
    }

    /// Resolved text; unknown names read as empty
    pub fn text(&self, name: &str) -> String {
        self.value(name).map(FieldValue::as_text).unwrap_or_default()
    }

    pub fn int(&self, name: &str) -> u32 {
        self.value(name).map(FieldValue::as_u32).unwrap_or(0)
    }

    pub fn float(&self, name: &str) -> f64 {
        self.value(name).map(FieldValue::as_f64).unwrap_or(0.0)
    }

    /// Whether the field was actually found on the page
    pub fn found(&self, name: &str) -> bool {
        matches!(self.result.get(name), Some(Extracted::Found(_)))
    }

    /// Fill a Missing field from another source. Empty values are ignored.
    pub fn fallback(&mut self, name: &str, value: &str) {
        if value.is_empty() || self.found(name) {
            return;
        }
        if let Some(slot) = self.values.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = FieldValue::Text(value.to_string());
            self.failed.retain(|field| *field != name);
            self.missing_required.retain(|field| *field != name);
            self.degraded = !self.missing_required.is_empty();
        }
    }

    /// Report defaulted fields and, when degraded, the record itself
    pub fn report(&self, key: &str, reporter: &dyn Reporter) {
        for &field in &self.failed {
            if self.missing_required.contains(&field) {
                continue;
            }
            reporter.record(Event::FieldMissing {
                entity: self.entity,
                key: key.to_string(),
                field,
            });
        }
        if self.degraded {
            reporter.record(Event::RecordDegraded {
                entity: self.entity,
                key: key.to_string(),
                fields: self.missing_required.clone(),
            });
        }
    }
}

/// Apply every descriptor of `manifest` to `fragment`
pub fn assemble(fragment: ElementRef<'_>, manifest: &Manifest) -> Assembled {
    let mut entries = Vec::with_capacity(manifest.fields.len());
    let mut values = Vec::with_capacity(manifest.fields.len());
    let mut failed = Vec::new();
    let mut missing_required = Vec::new();

    for descriptor in manifest.fields {
        let outcome = extract(fragment, descriptor);
        let value = match &outcome {
            Extracted::Found(value) => value.clone(),
            Extracted::Missing => {
                failed.push(descriptor.name);
                if descriptor.required {
                    missing_required.push(descriptor.name);
                }
                descriptor.default.value()
            }
        };
        entries.push((descriptor.name, outcome));
        values.push((descriptor.name, value));
    }

    Assembled {
        entity: manifest.entity,
        result: ExtractionResult { entries },
        degraded: !missing_required.is_empty(),
        failed,
        missing_required,
        values,
    }
}

/// Away and home box scores from a game page.
///
/// No table means the game has not been played: both sides are zero.
pub fn assemble_box_scores(page: ElementRef<'_>, layout: &BoxScoreLayout) -> (BoxScore, BoxScore) {
    let Some(table) = descend(page, layout.table) else {
        return (BoxScore::default(), BoxScore::default());
    };

    let header = header_labels(table);
    let rows = body_rows(table);

    let away = rows
        .first()
        .map(|cells| map_row(cells, header.as_deref(), layout))
        .unwrap_or_default();
    let home = rows
        .get(1)
        .map(|cells| map_row(cells, header.as_deref(), layout))
        .unwrap_or_default();

    (away, home)
}

fn cell_texts(row: ElementRef<'_>, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

fn header_labels(table: ElementRef<'_>) -> Option<Vec<String>> {
    let row_selector = Selector::parse("thead tr").ok()?;
    let cell_selector = Selector::parse("th, td").ok()?;
    let row = table.select(&row_selector).next()?;
    let labels = cell_texts(row, &cell_selector);
    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

fn body_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tbody tr"), Selector::parse("td"))
    else {
        return Vec::new();
    };
    table
        .select(&row_selector)
        .map(|row| cell_texts(row, &cell_selector))
        .collect()
}

fn score(cell: Option<&String>) -> u32 {
    cell.and_then(|raw| convert::score(raw))
        .map(|value| value.as_u32())
        .unwrap_or(0)
}

fn is_overtime(label: &str) -> bool {
    label.ends_with("OT")
}

fn map_row(cells: &[String], header: Option<&[String]>, layout: &BoxScoreLayout) -> BoxScore {
    let mut bs = BoxScore::default();

    // Header labels are trusted only when they line up with the cells
    if let Some(labels) = header.filter(|labels| labels.len() == cells.len()) {
        for (label, cell) in labels.iter().zip(cells) {
            let label = label.to_ascii_uppercase();
            let value = score(Some(cell));
            if layout.total_labels.contains(&label.as_str()) {
                bs.total = value;
                continue;
            }
            if layout.columns == ScoreColumns::RunsOnly {
                continue;
            }
            match label.as_str() {
                "1" => bs.q1 = value,
                "2" => bs.q2 = value,
                "3" => bs.q3 = value,
                "4" => bs.q4 = value,
                other if is_overtime(other) => bs.overtime = bs.overtime.saturating_add(value),
                _ => {}
            }
        }
        return bs;
    }

    match layout.columns {
        ScoreColumns::Quarters => {
            // cell 0 is the team abbreviation
            bs.q1 = score(cells.get(1));
            bs.q2 = score(cells.get(2));
            bs.q3 = score(cells.get(3));
            bs.q4 = score(cells.get(4));
            if cells.len() >= 7 {
                bs.overtime = cells[5..cells.len() - 1]
                    .iter()
                    .map(|cell| score(Some(cell)))
                    .fold(0, u32::saturating_add);
                bs.total = score(cells.last());
            } else {
                bs.total = score(cells.get(5));
            }
        }
        ScoreColumns::RunsOnly => {
            // innings, then R H E
            if cells.len() >= 4 {
                bs.total = score(cells.get(cells.len() - 3));
            }
        }
    }
    bs
}

//! Single-field extraction.
//!
//! A `FieldDescriptor` names a path of CSS steps from a fragment down to one
//! node, what to read from that node, and how to convert the raw string.
//! `extract` walks the path and collapses every failure (selector does not
//! parse, node absent, attribute absent, blank text, conversion fails) into
//! `Extracted::Missing`. It never returns an error and never panics.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

/// Typed value of an extracted field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(x) => x.to_string(),
        }
    }

    /// Non-negative integer view; negatives and text clamp to 0
    pub fn as_u32(&self) -> u32 {
        match self {
            FieldValue::Int(n) => u32::try_from(*n).unwrap_or(0),
            FieldValue::Float(x) if *x >= 0.0 => *x as u32,
            _ => 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Int(n) => *n as f64,
            FieldValue::Float(x) => *x,
            FieldValue::Text(_) => 0.0,
        }
    }
}

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Found(FieldValue),
    Missing,
}

impl Extracted {
    #[cfg(test)]
    pub fn is_missing(&self) -> bool {
        matches!(self, Extracted::Missing)
    }
}

/// One descent: the `nth` descendant matching `selector`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub selector: &'static str,
    pub nth: usize,
}

/// First descendant matching `selector`
pub const fn step(selector: &'static str) -> Step {
    Step { selector, nth: 0 }
}

/// `n`th (0-based) descendant matching `selector`
pub const fn nth(selector: &'static str, n: usize) -> Step {
    Step { selector, nth: n }
}

/// What to read from the node the path lands on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capture {
    /// All descendant text
    Text,
    /// An attribute value
    Attr(&'static str),
}

/// Typed default stored when a field resolves to Missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Empty,
    Zero,
    Literal(&'static str),
}

impl FieldDefault {
    pub fn value(&self) -> FieldValue {
        match self {
            FieldDefault::Empty => FieldValue::Text(String::new()),
            FieldDefault::Zero => FieldValue::Int(0),
            FieldDefault::Literal(s) => FieldValue::Text((*s).to_string()),
        }
    }
}

pub type Converter = fn(&str) -> Option<FieldValue>;

/// Declarative description of one extractable field
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub path: &'static [Step],
    pub capture: Capture,
    pub convert: Converter,
    pub required: bool,
    pub default: FieldDefault,
}

impl FieldDescriptor {
    /// Optional text field defaulting to the empty string
    pub const fn text(name: &'static str, path: &'static [Step]) -> Self {
        Self {
            name,
            path,
            capture: Capture::Text,
            convert: convert::text,
            required: false,
            default: FieldDefault::Empty,
        }
    }

    /// Optional integer field defaulting to 0
    pub const fn integer(name: &'static str, path: &'static [Step]) -> Self {
        Self {
            name,
            path,
            capture: Capture::Text,
            convert: convert::integer,
            required: false,
            default: FieldDefault::Zero,
        }
    }

    pub const fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    pub const fn convert(mut self, convert: Converter) -> Self {
        self.convert = convert;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_to(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }
}

/// Extract one field from a fragment
pub fn extract(fragment: ElementRef<'_>, descriptor: &FieldDescriptor) -> Extracted {
    let Some(raw) = locate(fragment, descriptor.path, descriptor.capture) else {
        return Extracted::Missing;
    };
    match (descriptor.convert)(&raw) {
        Some(value) => Extracted::Found(value),
        None => Extracted::Missing,
    }
}

/// Walk `path` from `fragment` and read the captured string
pub fn locate(fragment: ElementRef<'_>, path: &[Step], capture: Capture) -> Option<String> {
    let node = descend(fragment, path)?;

    let raw = match capture {
        Capture::Text => node.text().collect::<String>(),
        Capture::Attr(name) => node.value().attr(name)?.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Follow `path` from `fragment` to a single element
pub fn descend<'a>(fragment: ElementRef<'a>, path: &[Step]) -> Option<ElementRef<'a>> {
    let mut node = fragment;
    for step in path {
        let selector = Selector::parse(step.selector).ok()?;
        node = node.select(&selector).nth(step.nth)?;
    }
    Some(node)
}

fn pattern(cell: &'static OnceLock<Regex>, re: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(re).expect("static pattern compiles"))
}

/// Raw-string converters shared by every manifest
pub mod convert {
    use super::*;

    /// Whitespace-collapsed text
    pub fn text(raw: &str) -> Option<FieldValue> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(FieldValue::Text(collapsed))
        }
    }

    /// First run of digits, thousands separators allowed ("Capacity: 80,000")
    pub fn integer(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let m = pattern(&RE, r"\d[\d,]*").find(raw)?;
        m.as_str()
            .replace(',', "")
            .parse::<i64>()
            .ok()
            .map(FieldValue::Int)
    }

    /// Strict integer: the whole cell must be a number ("14", not "14*")
    pub fn score(raw: &str) -> Option<FieldValue> {
        raw.trim().parse::<i64>().ok().map(FieldValue::Int)
    }

    /// "63.2%" → 63.2
    pub fn percentage(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let caps = pattern(&RE, r"(\d+(?:\.\d+)?)\s*%?").captures(raw)?;
        caps[1].parse::<f64>().ok().map(FieldValue::Float)
    }

    /// Game id from a "...gameId=401520281..." or ".../gameId/401520281/..." link
    pub fn game_id(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let caps = pattern(&RE, r"gameId[=/](\d+)").captures(raw)?;
        Some(FieldValue::Text(caps[1].to_string()))
    }

    /// Numeric team id from a ".../team/_/id/228/clemson-tigers" link
    pub fn team_id_numeric(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let caps = pattern(&RE, r"/id/(\d+)").captures(raw)?;
        Some(FieldValue::Text(caps[1].to_string()))
    }

    /// Abbreviation team id from a ".../team/_/name/kc/kansas-city-chiefs" link
    pub fn team_id_abbrev(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let caps = pattern(&RE, r"/name/([A-Za-z]+)").captures(raw)?;
        Some(FieldValue::Text(caps[1].to_ascii_lowercase()))
    }

    /// Win-loss(-tie) record such as "5-2" or "10-6-1"
    pub fn record(raw: &str) -> Option<FieldValue> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let m = pattern(&RE, r"\d+-\d+(?:-\d+)?").find(raw)?;
        Some(FieldValue::Text(m.as_str().to_string()))
    }
}

//! Ordered-fallback field extraction.
//!
//! A [`FieldRule`] lists [`Probe`]s in priority order. Each probe is one
//! query against a page snapshot ([`Document`]); the first probe whose
//! post-processed value is non-empty wins and the remaining probes are never
//! evaluated. A field whose probes all come back empty is left out of
//! [`RawFields`] and reads as [`FieldValue::Unknown`].

pub mod html;

use std::collections::BTreeMap;

use regex::Regex;

use crate::models::FieldValue;

pub use html::HtmlDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Title,
    Company,
    Location,
    Salary,
    ExperienceLevel,
    EmploymentType,
    WorkMode,
    Description,
}

impl FieldName {
    pub const REQUIRED: [FieldName; 2] = [FieldName::Title, FieldName::Company];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Company => "company",
            FieldName::Location => "location",
            FieldName::Salary => "salary",
            FieldName::ExperienceLevel => "experience_level",
            FieldName::EmploymentType => "employment_type",
            FieldName::WorkMode => "work_mode",
            FieldName::Description => "description",
        }
    }
}

/// Field values found on one page. Absent keys are `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    values: BTreeMap<FieldName, String>,
}

impl RawFields {
    pub fn insert(&mut self, field: FieldName, value: String) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: FieldName) -> FieldValue {
        match self.values.get(&field) {
            Some(v) => FieldValue::Found(v.clone()),
            None => FieldValue::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Required fields (title, company) that did not resolve.
    pub fn missing_required(&self) -> Vec<&'static str> {
        FieldName::REQUIRED
            .iter()
            .filter(|f| !self.values.contains_key(f))
            .map(|f| f.as_str())
            .collect()
    }

    pub fn is_viable(&self) -> bool {
        self.missing_required().is_empty()
    }
}

/// One structural query against a page. Selectors are CSS; JSON-LD paths
/// walk the page's `JobPosting` object, taking the first element of arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Single-line text of the first matching element.
    Text(&'static str),
    /// Multi-line text of the first matching element.
    Block(&'static str),
    /// Single-line text of the parent of the first matching element.
    Parent(&'static str),
    /// Single-line text of every matching element, joined with `sep`.
    All { css: &'static str, sep: &'static str },
    /// Attribute value of the first matching element.
    Attr { css: &'static str, attr: &'static str },
    /// First matching element whose whole text is one of `words`.
    Chip { css: &'static str, words: &'static [&'static str] },
    /// Text of the element following a heading whose text equals `heading`
    /// (case-insensitive). With `sep`, the lines are joined into one line.
    Sibling { heading: &'static str, sep: Option<&'static str> },
    /// Value of a label/value list item whose label contains one of `keys`.
    Criteria {
        item: &'static str,
        label: &'static str,
        value: &'static str,
        keys: &'static [&'static str],
    },
    /// Own text of the first matching element that mentions any needle
    /// (case-insensitive).
    Keyword { css: &'static str, needles: &'static [&'static str] },
    /// JSON-LD values at `paths`, joined with `sep`.
    JsonLd { paths: &'static [&'static [&'static str]], sep: &'static str },
    /// schema.org `baseSalary` rendered as "min - max CUR per unit".
    JsonLdSalary,
    /// Non-empty results of `parts`, joined with `sep`.
    Join { parts: &'static [Probe], sep: &'static str },
    /// `inner` with a literal prefix, when `inner` is non-empty.
    Prefixed { prefix: &'static str, inner: &'static Probe },
}

/// A page snapshot that can answer probes. Evaluation is synchronous: the
/// page has already been fetched by the time rules are applied.
pub trait Document {
    fn probe(&self, probe: &Probe) -> Option<String>;
}

#[derive(Debug, Clone)]
pub enum PostProcess {
    /// Remove every match.
    Strip(Regex),
    /// Keep the first capture group (or the whole match); no match empties the value.
    Capture(Regex),
    /// Join non-empty lines with a separator.
    JoinLines(&'static str),
    /// Discard the value outright when it matches.
    Reject(Regex),
}

impl PostProcess {
    fn apply(&self, value: String) -> String {
        match self {
            PostProcess::Strip(re) => re.replace_all(&value, "").into_owned(),
            PostProcess::Capture(re) => re
                .captures(&value)
                .and_then(|c| c.get(1).or_else(|| c.get(0)))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            PostProcess::JoinLines(sep) => value
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(sep),
            PostProcess::Reject(re) if re.is_match(&value) => String::new(),
            PostProcess::Reject(_) => value,
        }
    }
}

/// Compile a pattern from a rule table. Patterns are string constants, so a
/// failure here is a programming error caught by the rule-table tests.
pub(crate) fn pattern(re: &str) -> Regex {
    match Regex::new(re) {
        Ok(re) => re,
        Err(e) => panic!("invalid rule pattern {re:?}: {e}"),
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: FieldName,
    pub candidates: &'static [Probe],
    pub post: Vec<PostProcess>,
}

impl FieldRule {
    pub fn new(field: FieldName, candidates: &'static [Probe]) -> Self {
        Self {
            field,
            candidates,
            post: Vec::new(),
        }
    }

    pub fn strip(mut self, re: &str) -> Self {
        self.post.push(PostProcess::Strip(pattern(re)));
        self
    }

    pub fn capture(mut self, re: &str) -> Self {
        self.post.push(PostProcess::Capture(pattern(re)));
        self
    }

    pub fn reject(mut self, re: &str) -> Self {
        self.post.push(PostProcess::Reject(pattern(re)));
        self
    }

    pub fn join_lines(mut self, sep: &'static str) -> Self {
        self.post.push(PostProcess::JoinLines(sep));
        self
    }

    /// First candidate yielding a non-empty value after post-processing.
    pub fn resolve(&self, doc: &dyn Document) -> FieldValue {
        for probe in self.candidates {
            let Some(raw) = doc.probe(probe) else {
                continue;
            };
            let value = self.post.iter().fold(raw, |v, p| p.apply(v));
            let value = value.trim();
            if !value.is_empty() {
                return FieldValue::Found(value.to_string());
            }
        }
        FieldValue::Unknown
    }
}

pub fn extract(rules: &[FieldRule], doc: &dyn Document) -> RawFields {
    let mut fields = RawFields::default();
    for rule in rules {
        if let FieldValue::Found(value) = rule.resolve(doc) {
            fields.insert(rule.field, value);
        }
    }
    fields
}

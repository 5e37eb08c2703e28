use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScrapeError;
use crate::extract::{FieldName, RawFields};
use crate::reconcile::ViewKind;

/// A single extracted value, or the explicit marker that no declared
/// extraction path produced one. `Unknown` serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Found(String),
    #[default]
    Unknown,
}

impl FieldValue {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            FieldValue::Found(s) => Some(s),
            FieldValue::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown)
    }

    pub fn map(self, f: impl FnOnce(String) -> String) -> FieldValue {
        match self {
            FieldValue::Found(s) => FieldValue::Found(f(s)),
            FieldValue::Unknown => FieldValue::Unknown,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Found(s) => serializer.serialize_str(s),
            FieldValue::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(s) => FieldValue::Found(s),
            None => FieldValue::Unknown,
        })
    }
}

/// Error classification carried alongside `error_description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    UnsupportedUrl,
    SessionInitFailed,
    Timeout,
    ConnectionError,
    IncompleteExtraction,
    #[default]
    UnknownFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDetails {
    pub initial_url: String,
    pub url: String,
    pub title: FieldValue,
    pub company: FieldValue,
    pub source: String,
    pub location: FieldValue,
    pub salary: FieldValue,
    pub experience_level: FieldValue,
    pub employment_type: FieldValue,
    pub work_mode: FieldValue,
    pub description: FieldValue,
    pub scraped_at: DateTime<Utc>,
    /// Which page layout produced the record, for sites that serve more than one.
    #[serde(skip)]
    pub view: Option<ViewKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferFailure {
    pub initial_url: String,
    pub error_description: String,
    #[serde(skip)]
    pub kind: ErrorKind,
}

/// The uniform result of scraping one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobOffer {
    Success(OfferDetails),
    Error(OfferFailure),
}

impl JobOffer {
    pub fn failure(initial_url: impl Into<String>, err: &ScrapeError) -> Self {
        JobOffer::Error(OfferFailure {
            initial_url: initial_url.into(),
            error_description: err.to_string(),
            kind: err.kind(),
        })
    }

    pub fn initial_url(&self) -> &str {
        match self {
            JobOffer::Success(d) => &d.initial_url,
            JobOffer::Error(e) => &e.initial_url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOffer::Success(_))
    }

    pub fn details(&self) -> Option<&OfferDetails> {
        match self {
            JobOffer::Success(d) => Some(d),
            JobOffer::Error(_) => None,
        }
    }

    pub fn error_description(&self) -> Option<&str> {
        match self {
            JobOffer::Success(_) => None,
            JobOffer::Error(e) => Some(&e.error_description),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            JobOffer::Success(_) => None,
            JobOffer::Error(e) => Some(e.kind),
        }
    }

    pub fn view(&self) -> Option<ViewKind> {
        self.details().and_then(|d| d.view)
    }

    pub(crate) fn with_view(mut self, view: Option<ViewKind>) -> Self {
        if let JobOffer::Success(d) = &mut self {
            d.view = view;
        }
        self
    }
}

/// Case-insensitive vocabulary for work modes. Anything not listed is kept verbatim.
const WORK_MODES: &[(&str, &str)] = &[
    ("remote", "Remote"),
    ("fully remote", "Remote"),
    ("telecommute", "Remote"),
    ("zdalna", "Remote"),
    ("praca zdalna", "Remote"),
    ("hybrid", "Hybrid"),
    ("hybrydowa", "Hybrid"),
    ("praca hybrydowa", "Hybrid"),
    ("on-site", "On-site"),
    ("onsite", "On-site"),
    ("on site", "On-site"),
    ("office", "On-site"),
    ("stacjonarna", "On-site"),
    ("praca stacjonarna", "On-site"),
];

pub fn normalize_work_mode(raw: String) -> String {
    let key = raw.trim().to_lowercase();
    WORK_MODES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or(raw)
}

/// Turn raw extracted fields into the final record. A record without both
/// title and company is reported as an incomplete extraction. `scraped_at`
/// is when extraction finished, not when the request came in.
pub fn normalize(
    raw: &RawFields,
    url: &str,
    initial_url: &str,
    source: &str,
    scraped_at: DateTime<Utc>,
) -> JobOffer {
    let missing = raw.missing_required();
    if !missing.is_empty() {
        return JobOffer::failure(initial_url, &ScrapeError::IncompleteExtraction(missing));
    }

    JobOffer::Success(OfferDetails {
        initial_url: initial_url.to_string(),
        url: url.to_string(),
        title: raw.get(FieldName::Title),
        company: raw.get(FieldName::Company),
        source: source.to_string(),
        location: raw.get(FieldName::Location),
        salary: raw.get(FieldName::Salary),
        experience_level: raw.get(FieldName::ExperienceLevel),
        employment_type: raw.get(FieldName::EmploymentType),
        work_mode: raw.get(FieldName::WorkMode).map(normalize_work_mode),
        description: raw.get(FieldName::Description),
        scraped_at,
        view: None,
    })
}

//! LinkedIn serves two unrelated layouts for the same posting: the public
//! "guest" page and the signed-in jobs UI. Both are described here and the
//! reconciler picks whichever one the page actually rendered.

use url::Url;

use super::{Action, Layout, Site, Strategy, host_is, strip_query};
use crate::extract::{FieldName, FieldRule, Probe};
use crate::reconcile::{ViewCandidate, ViewKind};
use crate::session::SessionProfile;

const SHOW_MORE_LESS: &str = r"(?i)\s*Show (less|more)\s*$";
/// The guest bullet also carries applicant counts and bare work modes.
const NOT_A_PLACE: &str = r"(?i)\d|^\s*(Remote|Hybrid|On-site)\s*$";
const WORK_MODE: &str = r"(?i)\b(Remote|Hybrid|On-site|TELECOMMUTE)\b";

static GUEST_TITLE: &[Probe] = &[
    Probe::Text("h1.top-card-layout__title"),
    Probe::Text("h1.topcard__title"),
    Probe::JsonLd { paths: &[&["title"]], sep: "" },
];

static GUEST_COMPANY: &[Probe] = &[
    Probe::Text("a.topcard__org-name-link"),
    Probe::Text(".top-card-layout__first-subline a"),
    Probe::JsonLd { paths: &[&["hiringOrganization", "name"]], sep: "" },
];

static GUEST_LOCATION: &[Probe] = &[
    Probe::Text(".topcard__flavor--bullet"),
    Probe::JsonLd {
        paths: &[&["jobLocation", "address", "addressLocality"]],
        sep: "",
    },
];

static GUEST_WORK_MODE: &[Probe] = &[
    Probe::Text(".top-card-layout__first-subline"),
    Probe::JsonLd { paths: &[&["jobLocationType"]], sep: "" },
];

static GUEST_EXPERIENCE: &[Probe] = &[Probe::Criteria {
    item: ".description__job-criteria-item",
    label: ".description__job-criteria-subheader, .description__job-criteria-subtitle",
    value: ".description__job-criteria-text",
    keys: &["seniority", "poziom"],
}];

static GUEST_EMPLOYMENT: &[Probe] = &[Probe::Criteria {
    item: ".description__job-criteria-item",
    label: ".description__job-criteria-subheader, .description__job-criteria-subtitle",
    value: ".description__job-criteria-text",
    keys: &["employment", "zatrudnienia"],
}];

static SALARY: &[Probe] = &[Probe::JsonLdSalary, Probe::Text(".compensation__salary")];

static GUEST_DESCRIPTION: &[Probe] = &[
    Probe::Block(".show-more-less-html__markup"),
    Probe::Block(".description__text"),
];

static MEMBER_TITLE: &[Probe] = &[
    Probe::Text(".job-details-jobs-unified-top-card__job-title"),
    Probe::Text(".jobs-unified-top-card__job-title"),
    Probe::Text("h1.t-24"),
];

static MEMBER_COMPANY: &[Probe] = &[
    Probe::Text(".job-details-jobs-unified-top-card__company-name a"),
    Probe::Text(".job-details-jobs-unified-top-card__company-name"),
    Probe::Text(".jobs-unified-top-card__company-name a"),
    Probe::Text(".jobs-unified-top-card__company-name"),
];

static MEMBER_LOCATION: &[Probe] = &[
    Probe::Text(".jobs-unified-top-card__bullet"),
    Probe::Text(".job-details-jobs-unified-top-card__primary-description-container .tvm__text"),
];

const INSIGHTS: &str =
    ".job-details-jobs-unified-top-card__job-insight, .jobs-unified-top-card__job-insight";

static MEMBER_WORK_MODE: &[Probe] = &[
    Probe::Text(".jobs-unified-top-card__workplace-type"),
    Probe::Keyword {
        css: INSIGHTS,
        needles: &["remote", "hybrid", "on-site"],
    },
];

static MEMBER_EMPLOYMENT: &[Probe] = &[Probe::Keyword {
    css: INSIGHTS,
    needles: &["full-time", "part-time", "contract", "temporary", "internship"],
}];

static MEMBER_EXPERIENCE: &[Probe] = &[Probe::Keyword {
    css: INSIGHTS,
    needles: &["entry level", "mid-senior", "associate", "director", "executive"],
}];

static MEMBER_DESCRIPTION: &[Probe] = &[
    Probe::Block(".jobs-description__content"),
    Probe::Block(".jobs-box__html-content"),
    Probe::Block("#job-details"),
];

/// Numeric posting id from `currentJobId`, `/jobs/view/<id>` or
/// `/jobs/view/<slug>-<id>`.
pub fn job_id(url: &Url) -> Option<String> {
    let is_id = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "currentJobId")
        && is_id(&id)
    {
        return Some(id.into_owned());
    }

    let segment = url.path().strip_prefix("/jobs/view/")?.split('/').next()?;
    let id = segment.rsplit('-').next()?;
    is_id(id).then(|| id.to_string())
}

/// `linkedin.com/jobs/...` with a recoverable posting id.
pub fn matches(url: &Url) -> bool {
    host_is(url, "linkedin.com") && url.path().starts_with("/jobs/") && job_id(url).is_some()
}

pub fn clean_url(url: &Url) -> String {
    match job_id(url) {
        Some(id) => format!("https://www.linkedin.com/jobs/view/{id}"),
        None => strip_query(url),
    }
}

pub fn strategy() -> Strategy {
    let guest = ViewCandidate {
        kind: ViewKind::Guest,
        rules: vec![
            FieldRule::new(FieldName::Title, GUEST_TITLE),
            FieldRule::new(FieldName::Company, GUEST_COMPANY),
            FieldRule::new(FieldName::Location, GUEST_LOCATION).reject(NOT_A_PLACE),
            FieldRule::new(FieldName::WorkMode, GUEST_WORK_MODE).capture(WORK_MODE),
            FieldRule::new(FieldName::ExperienceLevel, GUEST_EXPERIENCE),
            FieldRule::new(FieldName::EmploymentType, GUEST_EMPLOYMENT),
            FieldRule::new(FieldName::Salary, SALARY),
            FieldRule::new(FieldName::Description, GUEST_DESCRIPTION).strip(SHOW_MORE_LESS),
        ],
    };
    let member = ViewCandidate {
        kind: ViewKind::LoggedIn,
        rules: vec![
            FieldRule::new(FieldName::Title, MEMBER_TITLE),
            FieldRule::new(FieldName::Company, MEMBER_COMPANY),
            FieldRule::new(FieldName::Location, MEMBER_LOCATION),
            FieldRule::new(FieldName::WorkMode, MEMBER_WORK_MODE).capture(WORK_MODE),
            FieldRule::new(FieldName::ExperienceLevel, MEMBER_EXPERIENCE),
            FieldRule::new(FieldName::EmploymentType, MEMBER_EMPLOYMENT),
            FieldRule::new(FieldName::Salary, SALARY),
            FieldRule::new(FieldName::Description, MEMBER_DESCRIPTION).strip(SHOW_MORE_LESS),
        ],
    };

    Strategy {
        site: Site::LinkedIn,
        profile: SessionProfile::Persistent,
        actions: vec![Action::expand(
            "button.show-more-less-html__button--more, .jobs-description__footer-button, button[aria-label*='more']",
        )],
        layout: Layout::DualView(vec![guest, member]),
    }
}

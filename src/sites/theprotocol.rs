use url::Url;

use super::{Action, Layout, Site, Strategy, host_is};
use crate::extract::{FieldName, FieldRule, Probe};
use crate::session::SessionProfile;

static TITLE: &[Probe] = &[Probe::Text(r#"[data-test="text-offerTitle"]"#), Probe::Text("h1")];

static COMPANY: &[Probe] = &[
    Probe::Text(r#"[data-test="text-offerEmployer"]"#),
    Probe::Text(r#"a[data-test="anchor-company-link"]"#),
];

static SALARY: &[Probe] = &[Probe::All {
    css: r#"[data-test="text-salary-value"]"#,
    sep: "; ",
}];

static LOCATION: &[Probe] = &[Probe::Text(r#"[data-test="text-primaryLocation"]"#)];

static WORK_MODE: &[Probe] = &[Probe::Block(r#"[data-test="content-workModes"]"#)];

static EXPERIENCE: &[Probe] = &[Probe::Block(r#"[data-test="content-positionLevels"]"#)];

static EMPLOYMENT: &[Probe] = &[Probe::All {
    css: r#"[data-test="text-contractName"]"#,
    sep: ", ",
}];

static DESCRIPTION: &[Probe] = &[Probe::Join {
    parts: &[
        Probe::Block(r#"[data-test="section-technologies"]"#),
        Probe::Block(r#"[data-test="section-about-project"]"#),
        Probe::Block(r#"[data-test="section-responsibilities"]"#),
        Probe::Block(r#"[data-test="section-requirements"]"#),
        Probe::Block(r#"[data-test="section-offered"]"#),
        Probe::Block(r#"[data-test="section-benefits"]"#),
        Probe::Block(r#"[data-test="section-training-space"]"#),
        Probe::Block(r#"[data-test="section-about-us-description"]"#),
    ],
    sep: "\n\n",
}];

/// `theprotocol.it/szczegoly/praca/<slug>,oferta,<uuid>`
pub fn matches(url: &Url) -> bool {
    host_is(url, "theprotocol.it") && url.path().starts_with("/szczegoly/praca/")
}

pub fn strategy() -> Strategy {
    Strategy {
        site: Site::TheProtocol,
        profile: SessionProfile::Guest,
        actions: vec![
            Action::consent("#onetrust-accept-btn-handler"),
            Action::expand(r#"button[data-test="button-toggle"]"#),
        ],
        layout: Layout::Single(vec![
            FieldRule::new(FieldName::Title, TITLE),
            FieldRule::new(FieldName::Company, COMPANY).strip(r"(?i)^\s*(Firma|Company):\s*"),
            FieldRule::new(FieldName::Salary, SALARY),
            FieldRule::new(FieldName::Location, LOCATION),
            FieldRule::new(FieldName::WorkMode, WORK_MODE).join_lines(", "),
            FieldRule::new(FieldName::ExperienceLevel, EXPERIENCE).join_lines(", "),
            FieldRule::new(FieldName::EmploymentType, EMPLOYMENT),
            FieldRule::new(FieldName::Description, DESCRIPTION),
        ]),
    }
}

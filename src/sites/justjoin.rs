use url::Url;

use super::{Action, Layout, Site, Strategy, host_is};
use crate::extract::{FieldName, FieldRule, Probe};
use crate::session::SessionProfile;

const COMPANY_ICON: &str = r#"svg[data-testid="ApartmentRoundedIcon"]"#;

static TITLE: &[Probe] = &[
    Probe::Text("h1"),
    Probe::JsonLd { paths: &[&["title"]], sep: "" },
];

static COMPANY: &[Probe] = &[
    Probe::Parent(COMPANY_ICON),
    Probe::Text(r#"a[href*="companies="]"#),
    Probe::JsonLd { paths: &[&["hiringOrganization", "name"]], sep: "" },
];

static SALARY: &[Probe] = &[Probe::JsonLdSalary, Probe::Block("body")];

static LOCATION: &[Probe] = &[
    Probe::JsonLd {
        paths: &[
            &["jobLocation", "address", "streetAddress"],
            &["jobLocation", "address", "addressLocality"],
        ],
        sep: ", ",
    },
    Probe::Parent(r#"svg[data-testid="LocationOnOutlinedIcon"]"#),
    Probe::Parent(r#"svg[data-testid="PlaceIcon"]"#),
];

static EXPERIENCE: &[Probe] = &[Probe::Chip {
    css: "div, span",
    words: &["Junior", "Mid", "Senior", "C-level"],
}];

static WORK_MODE: &[Probe] = &[Probe::Chip {
    css: "div, span",
    words: &["Remote", "Hybrid", "Office"],
}];

static EMPLOYMENT: &[Probe] = &[Probe::Chip {
    css: "div, span",
    words: &["B2B", "Permanent", "Mandate contract"],
}];

static TECH_STACK: Probe = Probe::Sibling {
    heading: "TECH STACK",
    sep: Some(", "),
};

static DESCRIPTION: &[Probe] = &[Probe::Join {
    parts: &[
        Probe::Sibling { heading: "JOB DESCRIPTION", sep: None },
        Probe::Prefixed { prefix: "Tech Stack: ", inner: &TECH_STACK },
    ],
    sep: "\n\n",
}];

/// `justjoin.it/job-offer/<slug>`
pub fn matches(url: &Url) -> bool {
    host_is(url, "justjoin.it") && url.path().starts_with("/job-offer/")
}

pub fn strategy() -> Strategy {
    Strategy {
        site: Site::JustJoin,
        profile: SessionProfile::Guest,
        actions: vec![Action::consent("#cookiescript_accept, button#accept-cookies")],
        layout: Layout::Single(vec![
            FieldRule::new(FieldName::Title, TITLE),
            FieldRule::new(FieldName::Company, COMPANY),
            FieldRule::new(FieldName::Salary, SALARY)
                .capture(r"(?i)\d[\d ]*-(?: *\d[\d ]*)? *(?:PLN|EUR|USD)(?: per \w+)?"),
            FieldRule::new(FieldName::Location, LOCATION),
            FieldRule::new(FieldName::ExperienceLevel, EXPERIENCE),
            FieldRule::new(FieldName::WorkMode, WORK_MODE),
            FieldRule::new(FieldName::EmploymentType, EMPLOYMENT),
            FieldRule::new(FieldName::Description, DESCRIPTION),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HtmlDocument;
    use crate::models::FieldValue;

    #[test]
    fn matches_offer_paths_only() {
        assert!(matches(&Url::parse("https://justjoin.it/job-offer/n-ix-junior-data-engineer-warszawa-data").unwrap()));
        assert!(!matches(&Url::parse("https://justjoin.it/all-locations/data").unwrap()));
    }

    #[test]
    fn extracts_fixture() {
        let doc = HtmlDocument::parse(include_str!("../../tests/fixtures/justjoin.html"));
        let out = strategy().extract(&doc);
        let f = |name| out.fields.get(name);

        assert_eq!(f(FieldName::Title), FieldValue::Found("Junior Data Engineer".into()));
        assert_eq!(f(FieldName::Company), FieldValue::Found("N-iX".into()));
        assert_eq!(f(FieldName::Location), FieldValue::Found("Prosta 51, Warszawa".into()));
        assert_eq!(f(FieldName::Salary), FieldValue::Found("8 000 - 12 000 PLN".into()));
        assert_eq!(f(FieldName::ExperienceLevel), FieldValue::Found("Junior".into()));
        assert_eq!(f(FieldName::WorkMode), FieldValue::Found("Hybrid".into()));
        assert_eq!(f(FieldName::EmploymentType), FieldValue::Found("B2B".into()));
        assert_eq!(
            f(FieldName::Description),
            FieldValue::Found(
                "You will build data pipelines.\nPython\nSQL\n\nTech Stack: Python, SQL, Airflow".into()
            )
        );
        assert_eq!(out.view, None);
    }
}

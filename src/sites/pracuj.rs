use url::Url;

use super::{Action, Layout, Site, Strategy, host_is};
use crate::extract::{FieldName, FieldRule, Probe};
use crate::session::SessionProfile;

static TITLE: &[Probe] = &[Probe::Text(r#"[data-test="text-positionName"]"#), Probe::Text("h1")];

static COMPANY: &[Probe] = &[
    Probe::Text(r#"[data-test="text-employerName"]"#),
    Probe::Text(r#"[data-test="anchor-company-profile"]"#),
];

static SALARY: &[Probe] = &[
    Probe::All {
        css: r#"[data-test="section-salary"] [data-test="section-salaryPerContractType"]"#,
        sep: "; ",
    },
    Probe::All {
        css: r#"[data-test="text-earningAmount"]"#,
        sep: "; ",
    },
    Probe::Text(r#"[data-test="text-salary"]"#),
];

static LOCATION: &[Probe] = &[
    Probe::Text(r#"[data-test="sections-benefit-workplaces"] [data-test="offer-badge-title"]"#),
    Probe::Join {
        parts: &[
            Probe::Text(r#"[data-test="text-address-street"]"#),
            Probe::Text(r#"[data-test="text-address-city"]"#),
        ],
        sep: ", ",
    },
    Probe::Text(r#"[data-test="text-workplaceAddress"]"#),
];

static EMPLOYMENT: &[Probe] = &[
    Probe::Join {
        parts: &[
            Probe::Text(r#"[data-test="sections-benefit-contracts"] [data-test="offer-badge-title"]"#),
            Probe::Text(r#"[data-test="sections-benefit-work-schedule"] [data-test="offer-badge-title"]"#),
        ],
        sep: ", ",
    },
    Probe::Text(r#"[data-test="text-contractType"]"#),
];

static EXPERIENCE: &[Probe] = &[
    Probe::Text(r#"[data-test="sections-benefit-employment-type-name"] [data-test="offer-badge-title"]"#),
    Probe::Text(r#"[data-test="text-experienceLevel"]"#),
];

static WORK_MODE: &[Probe] = &[
    Probe::Text(r#"[data-test^="sections-benefit-work-modes"] [data-test="offer-badge-title"]"#),
    Probe::Text(r#"[data-test="text-workModes"]"#),
];

static DESCRIPTION: &[Probe] = &[
    Probe::Join {
        parts: &[
            Probe::Block(r#"[data-test="section-about-project"]"#),
            Probe::Block(r#"[data-test="section-responsibilities"]"#),
            Probe::Block(r#"[data-test="section-requirements"]"#),
            Probe::Block(r#"[data-test="section-offered"]"#),
            Probe::Block(r#"[data-test="section-benefits"]"#),
            Probe::Block(r#"[data-test="section-technologies"]"#),
            Probe::Block(r#"[data-test="section-about-us"]"#),
            Probe::Block(r#"[data-test="section-description"]"#),
        ],
        sep: "\n\n",
    },
    Probe::Block("[data-scroll-id]"),
];

/// `pracuj.pl/praca/<slug>,oferta,<id>`
pub fn matches(url: &Url) -> bool {
    host_is(url, "pracuj.pl") && url.path().starts_with("/praca/")
}

pub fn strategy() -> Strategy {
    Strategy {
        site: Site::Pracuj,
        profile: SessionProfile::Guest,
        actions: vec![Action::consent(r#"button[data-test="button-submitCookie"]"#)],
        layout: Layout::Single(vec![
            FieldRule::new(FieldName::Title, TITLE),
            FieldRule::new(FieldName::Company, COMPANY)
                .strip(r"(?i)\s*(O firmie|About the company)\s*$"),
            FieldRule::new(FieldName::Salary, SALARY),
            // "Prosta 51, Wola, Warszawa (mazowieckie)"
            FieldRule::new(FieldName::Location, LOCATION).strip(r"\s*\([^)]*\)\s*$"),
            FieldRule::new(FieldName::EmploymentType, EMPLOYMENT),
            FieldRule::new(FieldName::ExperienceLevel, EXPERIENCE),
            FieldRule::new(FieldName::WorkMode, WORK_MODE),
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
        assert!(matches(&Url::parse(
            "https://www.pracuj.pl/praca/mlodszy-analityk-danych-warszawa-prosta-51,oferta,1004471234"
        ).unwrap()));
        assert!(!matches(&Url::parse("https://www.pracuj.pl/pracodawcy").unwrap()));
        assert!(!matches(&Url::parse("https://pracuj.pl.example.com/praca/x").unwrap()));
    }

    #[test]
    fn extracts_fixture() {
        let doc = HtmlDocument::parse(include_str!("../../tests/fixtures/pracuj.html"));
        let out = strategy().extract(&doc);
        let f = |name| out.fields.get(name);

        assert_eq!(f(FieldName::Title), FieldValue::Found("Młodszy Analityk Danych".into()));
        assert_eq!(f(FieldName::Company), FieldValue::Found("Orlen S.A.".into()));
        assert_eq!(
            f(FieldName::Salary),
            FieldValue::Found("9 000–11 000 zł brutto / mies.; 10 500–13 000 zł netto (+ VAT) / mies.".into())
        );
        assert_eq!(f(FieldName::Location), FieldValue::Found("Prosta 51, Wola, Warszawa".into()));
        assert_eq!(
            f(FieldName::EmploymentType),
            FieldValue::Found("umowa o pracę, pełny etat".into())
        );
        assert_eq!(f(FieldName::ExperienceLevel), FieldValue::Found("młodszy specjalista (Junior)".into()));
        assert_eq!(f(FieldName::WorkMode), FieldValue::Found("praca hybrydowa".into()));
        assert_eq!(
            f(FieldName::Description),
            FieldValue::Found(
                "Twój zakres obowiązków\nTworzenie raportów\n\nNasze wymagania\nZnajomość SQL".into()
            )
        );
    }

    #[test]
    fn falls_back_to_legacy_markup() {
        let doc = HtmlDocument::parse(
            r#"<html><body>
                <h1>Tester</h1>
                <a data-test="anchor-company-profile">Acme Sp. z o.o. O firmie</a>
                <span data-test="text-earningAmount">7 000 zł</span>
                <div data-test="text-workplaceAddress">Kraków (małopolskie)</div>
                <div data-scroll-id="job-description"><p>Opis</p></div>
            </body></html>"#,
        );
        let out = strategy().extract(&doc);

        assert_eq!(out.fields.get(FieldName::Title), FieldValue::Found("Tester".into()));
        assert_eq!(out.fields.get(FieldName::Company), FieldValue::Found("Acme Sp. z o.o.".into()));
        assert_eq!(out.fields.get(FieldName::Salary), FieldValue::Found("7 000 zł".into()));
        assert_eq!(out.fields.get(FieldName::Location), FieldValue::Found("Kraków".into()));
        assert_eq!(out.fields.get(FieldName::Description), FieldValue::Found("Opis".into()));
        assert_eq!(out.fields.get(FieldName::WorkMode), FieldValue::Unknown);
    }
}

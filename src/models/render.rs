//! Human-readable renderings of a scraped offer, used by the CLI.

use std::fmt::Write;

use super::offer::{FieldValue, JobOffer, OfferDetails};

const RULE: &str = "============================================================";

impl JobOffer {
    pub fn to_text(&self) -> String {
        match self {
            JobOffer::Success(d) => details_text(d),
            JobOffer::Error(e) => format!(
                "ERROR scraping {}\n{}\n",
                e.initial_url, e.error_description
            ),
        }
    }

    pub fn to_markdown(&self) -> String {
        match self {
            JobOffer::Success(d) => details_markdown(d),
            JobOffer::Error(e) => format!(
                "# Scrape failed\n\n**URL:** {}  \n**Error:** {}\n",
                e.initial_url, e.error_description
            ),
        }
    }
}

fn or_dash(value: &FieldValue) -> &str {
    value.as_deref().unwrap_or("-")
}

fn metadata(d: &OfferDetails) -> [(&'static str, &FieldValue); 5] {
    [
        ("Location", &d.location),
        ("Salary", &d.salary),
        ("Experience Level", &d.experience_level),
        ("Employment Type", &d.employment_type),
        ("Work Mode", &d.work_mode),
    ]
}

fn details_text(d: &OfferDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "JOB OFFER: {}", or_dash(&d.title));
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Company: {}", or_dash(&d.company));
    let _ = writeln!(out, "Source: {}", d.source);
    let _ = writeln!(out, "URL: {}", d.url);

    for (label, value) in metadata(d) {
        if let Some(v) = value.as_deref() {
            let _ = writeln!(out, "{label}: {v}");
        }
    }

    if let Some(desc) = d.description.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Description:");
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "{desc}");
        let _ = writeln!(out, "{}", "-".repeat(40));
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scraped at: {}",
        d.scraped_at.format("%Y-%m-%d %H:%M:%S")
    );
    out
}

fn details_markdown(d: &OfferDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", or_dash(&d.title));
    let _ = writeln!(out);
    let _ = writeln!(out, "**Company:** {}  ", or_dash(&d.company));
    let _ = writeln!(out, "**Source:** {}  ", d.source);
    let _ = writeln!(out, "**URL:** [{0}]({0})", d.url);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Details");
    let _ = writeln!(out);

    for (label, value) in metadata(d) {
        if let Some(v) = value.as_deref() {
            let _ = writeln!(out, "- **{label}:** {v}");
        }
    }

    if let Some(desc) = d.description.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Description");
        let _ = writeln!(out);
        let _ = writeln!(out, "{desc}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(
        out,
        "*Scraped at: {}*",
        d.scraped_at.format("%Y-%m-%d %H:%M:%S")
    );
    out
}

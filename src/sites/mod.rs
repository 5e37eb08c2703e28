//! Supported job boards. Each site is one variant of [`Site`] carrying an
//! immutable [`Strategy`] built once on first use and shared read-only by
//! every concurrent pipeline.

pub mod justjoin;
pub mod linkedin;
pub mod pracuj;
pub mod theprotocol;

use std::sync::LazyLock;

use serde::Serialize;
use url::Url;

use crate::extract::{Document, FieldRule, RawFields, extract};
use crate::reconcile::{Reconciler, ViewCandidate, ViewKind};
use crate::session::SessionProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    JustJoin,
    TheProtocol,
    Pracuj,
    LinkedIn,
}

impl Site {
    /// Dispatch priority order.
    pub const ALL: [Site; 4] = [Site::JustJoin, Site::TheProtocol, Site::Pracuj, Site::LinkedIn];

    /// Identifier reported as `source` on scraped offers.
    pub fn source(self) -> &'static str {
        match self {
            Site::JustJoin => "justjoin",
            Site::TheProtocol => "theprotocol",
            Site::Pracuj => "pracuj",
            Site::LinkedIn => "linkedin",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Site::JustJoin => "JustJoin.it",
            Site::TheProtocol => "TheProtocol.it",
            Site::Pracuj => "Pracuj.pl",
            Site::LinkedIn => "LinkedIn",
        }
    }

    /// Whether `url` has this site's domain and offer path shape.
    pub fn matches(self, url: &Url) -> bool {
        match self {
            Site::JustJoin => justjoin::matches(url),
            Site::TheProtocol => theprotocol::matches(url),
            Site::Pracuj => pracuj::matches(url),
            Site::LinkedIn => linkedin::matches(url),
        }
    }

    /// Canonical offer URL with tracking and session noise removed.
    pub fn clean_url(self, url: &Url) -> String {
        match self {
            Site::LinkedIn => linkedin::clean_url(url),
            _ => strip_query(url),
        }
    }

    pub fn strategy(self) -> &'static Strategy {
        static JUSTJOIN: LazyLock<Strategy> = LazyLock::new(justjoin::strategy);
        static THEPROTOCOL: LazyLock<Strategy> = LazyLock::new(theprotocol::strategy);
        static PRACUJ: LazyLock<Strategy> = LazyLock::new(pracuj::strategy);
        static LINKEDIN: LazyLock<Strategy> = LazyLock::new(linkedin::strategy);

        match self {
            Site::JustJoin => &*JUSTJOIN,
            Site::TheProtocol => &*THEPROTOCOL,
            Site::Pracuj => &*PRACUJ,
            Site::LinkedIn => &*LINKEDIN,
        }
    }
}

/// Host equals `domain` or is a subdomain of it.
pub(crate) fn host_is(url: &Url, domain: &str) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

pub(crate) fn strip_query(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Dismiss a cookie consent banner.
    Consent,
    /// Reveal a collapsed description.
    Expand,
}

/// A click performed before the page is read. A missing target is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub selector: &'static str,
}

impl Action {
    pub const fn consent(selector: &'static str) -> Self {
        Self {
            kind: ActionKind::Consent,
            selector,
        }
    }

    pub const fn expand(selector: &'static str) -> Self {
        Self {
            kind: ActionKind::Expand,
            selector,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Layout {
    Single(Vec<FieldRule>),
    DualView(Vec<ViewCandidate>),
}

#[derive(Debug, Clone)]
pub struct Strategy {
    pub site: Site,
    pub profile: SessionProfile,
    pub actions: Vec<Action>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub fields: RawFields,
    pub view: Option<ViewKind>,
}

impl Strategy {
    pub fn extract(&self, doc: &dyn Document) -> Extraction {
        match &self.layout {
            Layout::Single(rules) => Extraction {
                fields: extract(rules, doc),
                view: None,
            },
            Layout::DualView(views) => match Reconciler::new(views).run(doc) {
                Some(outcome) => Extraction {
                    fields: outcome.fields,
                    view: Some(outcome.view),
                },
                None => Extraction {
                    fields: RawFields::default(),
                    view: None,
                },
            },
        }
    }
}

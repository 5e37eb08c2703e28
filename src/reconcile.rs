//! Guest vs. logged-in view reconciliation.
//!
//! Some sites render the same offer with different markup depending on
//! whether the visitor is signed in. The reconciler tries each configured
//! view in order, cheapest first, and accepts the first one that yields a
//! minimum-viable record (title and company). When every view falls short,
//! the last attempt's fields are returned as-is so the caller can decide.

use serde::Serialize;

use crate::extract::{Document, FieldRule, RawFields, extract};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Guest,
    LoggedIn,
}

#[derive(Debug, Clone)]
pub struct ViewCandidate {
    pub kind: ViewKind,
    pub rules: Vec<FieldRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    GuestAttempt,
    LoggedInAttempt,
    Exhausted,
}

impl ReconcileState {
    fn attempting(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Guest => ReconcileState::GuestAttempt,
            ViewKind::LoggedIn => ReconcileState::LoggedInAttempt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub view: ViewKind,
    pub fields: RawFields,
    /// Whether `fields` holds a minimum-viable record.
    pub viable: bool,
}

pub struct Reconciler<'a> {
    views: &'a [ViewCandidate],
    next: usize,
    state: ReconcileState,
    last: Option<Reconciled>,
}

impl<'a> Reconciler<'a> {
    pub fn new(views: &'a [ViewCandidate]) -> Self {
        let state = match views.first() {
            Some(view) => ReconcileState::attempting(view.kind),
            None => ReconcileState::Exhausted,
        };
        Self {
            views,
            next: 0,
            state,
            last: None,
        }
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Run the current view. Returns the accepted result, or `None` when the
    /// machine moved on to the next view (or ran out of views).
    pub fn step(&mut self, doc: &dyn Document) -> Option<Reconciled> {
        let view = self.views.get(self.next)?;
        let fields = extract(&view.rules, doc);
        let viable = fields.is_viable();
        let attempt = Reconciled {
            view: view.kind,
            fields,
            viable,
        };

        if viable {
            tracing::debug!("{:?} view produced a viable record", view.kind);
            self.state = ReconcileState::Exhausted;
            self.next = self.views.len();
            return Some(attempt);
        }

        tracing::debug!(
            "{:?} view incomplete, missing {:?}",
            view.kind,
            attempt.fields.missing_required()
        );
        self.next += 1;
        self.state = match self.views.get(self.next) {
            Some(next) => ReconcileState::attempting(next.kind),
            None => ReconcileState::Exhausted,
        };
        self.last = Some(attempt);
        None
    }

    /// Drive the machine to `Exhausted`. `None` only when no views are configured.
    pub fn run(mut self, doc: &dyn Document) -> Option<Reconciled> {
        while self.state != ReconcileState::Exhausted {
            if let Some(accepted) = self.step(doc) {
                return Some(accepted);
            }
        }
        self.last
    }
}

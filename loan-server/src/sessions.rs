//! Wizard sessions held in server memory.
//!
//! Each session owns one [`FormWizard`]. The map lock is never held across
//! the repository call that stores a submitted form; the wizard's
//! `Submitting` status guards the session in the meantime.
//!
//! Sessions idle for longer than the store's timeout are dropped whenever a
//! new one is opened. A session with a submission in flight is never dropped.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use loan_core::ReportRepository;
use loan_core::calculations::DerivedTotals;
use loan_core::models::{FormAggregate, NewLoanReport};
use loan_core::wizard::{
    ErrorMap, FormAction, FormWizard, JumpOutcome, JumpPolicy, NextOutcome, WizardStatus,
    WizardStep,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Client-facing snapshot of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub active_step: usize,
    pub step: WizardStep,
    pub title: &'static str,
    pub status: WizardStatus,
    pub jump_policy: JumpPolicy,
    pub form: FormAggregate,
    pub errors: ErrorMap,
    pub last_failure: Option<String>,
    pub totals: DerivedTotals,
}

impl SessionView {
    fn of(
        id: Uuid,
        wizard: &FormWizard,
    ) -> Self {
        let step = wizard.step();
        Self {
            id,
            active_step: wizard.active_step(),
            step,
            title: step.title(),
            status: wizard.status(),
            jump_policy: wizard.jump_policy(),
            form: wizard.form().clone(),
            errors: wizard.errors().clone(),
            last_failure: wizard.last_failure().map(str::to_string),
            totals: wizard.review(),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "outcome",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum StepOutcome {
    Advanced { session: SessionView },
    Rejected { session: SessionView },
    Moved { session: SessionView },
    Blocked { session: SessionView },
    /// The form was stored and the session closed.
    Submitted { report_id: i64 },
}

impl StepOutcome {
    /// True when the move was refused by validation.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Blocked { .. })
    }
}

struct Session {
    wizard: FormWizard,
    touched: Instant,
}

impl Session {
    fn touch(&mut self) -> &mut FormWizard {
        self.touched = Instant::now();
        &mut self.wizard
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    jump_policy: JumpPolicy,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(
        jump_policy: JumpPolicy,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            jump_policy,
            idle_timeout,
        }
    }

    /// Opens a session, blank or seeded with `form`.
    pub async fn create(
        &self,
        form: Option<FormAggregate>,
    ) -> SessionView {
        let wizard =
            FormWizard::with_form(form.unwrap_or_default()).with_jump_policy(self.jump_policy);
        let id = Uuid::new_v4();
        let view = SessionView::of(id, &wizard);

        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions);
        sessions.insert(
            id,
            Session {
                wizard,
                touched: Instant::now(),
            },
        );
        info!(session = %id, "wizard session opened");
        view
    }

    fn evict_idle(
        &self,
        sessions: &mut HashMap<Uuid, Session>,
    ) {
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.wizard.status() == WizardStatus::Submitting
                || session.touched.elapsed() < self.idle_timeout
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "idle wizard sessions dropped");
        }
    }

    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<SessionView, ApiError> {
        self.with_session(id, |wizard| Ok(SessionView::of(id, wizard)))
            .await
    }

    pub async fn dispatch(
        &self,
        id: Uuid,
        actions: Vec<FormAction>,
    ) -> Result<SessionView, ApiError> {
        self.with_session(id, |wizard| {
            wizard.dispatch_all(actions)?;
            Ok(SessionView::of(id, wizard))
        })
        .await
    }

    pub async fn previous(
        &self,
        id: Uuid,
    ) -> Result<SessionView, ApiError> {
        self.with_session(id, |wizard| {
            wizard.go_previous();
            Ok(SessionView::of(id, wizard))
        })
        .await
    }

    pub async fn jump(
        &self,
        id: Uuid,
        index: usize,
    ) -> Result<StepOutcome, ApiError> {
        self.with_session(id, |wizard| {
            let outcome = wizard.jump_to(index)?;
            let session = SessionView::of(id, wizard);
            Ok(match outcome {
                JumpOutcome::Moved(_) => StepOutcome::Moved { session },
                JumpOutcome::Blocked { .. } => StepOutcome::Blocked { session },
            })
        })
        .await
    }

    pub async fn review(
        &self,
        id: Uuid,
    ) -> Result<DerivedTotals, ApiError> {
        self.with_session(id, |wizard| Ok(wizard.review())).await
    }

    /// Drops the session and its form. Refused while a submission is in
    /// flight.
    pub async fn discard(
        &self,
        id: Uuid,
    ) -> Result<(), ApiError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(ApiError::SessionNotFound(id))?;
        session.wizard.discard()?;
        sessions.remove(&id);
        info!(session = %id, "wizard session discarded");
        Ok(())
    }

    /// Validates and advances; from the last step, stores the form.
    ///
    /// A storage failure reopens the session with its form intact and is
    /// returned to the caller.
    pub async fn next(
        &self,
        id: Uuid,
        repo: &dyn ReportRepository,
    ) -> Result<StepOutcome, ApiError> {
        let form = {
            let mut sessions = self.sessions.lock().await;
            let wizard = sessions
                .get_mut(&id)
                .ok_or(ApiError::SessionNotFound(id))?
                .touch();
            match wizard.go_next()? {
                NextOutcome::Advanced(_) => {
                    return Ok(StepOutcome::Advanced {
                        session: SessionView::of(id, wizard),
                    });
                }
                NextOutcome::Rejected(_) => {
                    return Ok(StepOutcome::Rejected {
                        session: SessionView::of(id, wizard),
                    });
                }
                NextOutcome::Submit(form) => form,
            }
        };

        let stored = repo.create_report(NewLoanReport::from(form)).await;

        let mut sessions = self.sessions.lock().await;
        match stored {
            Ok(report) => {
                if let Some(mut session) = sessions.remove(&id) {
                    session.wizard.complete_submission()?;
                }
                info!(session = %id, report = report.id, "report submitted");
                Ok(StepOutcome::Submitted {
                    report_id: report.id,
                })
            }
            Err(e) => {
                warn!(session = %id, error = %e, "report submission failed");
                if let Some(session) = sessions.get_mut(&id) {
                    session.touch().submission_failed(e.to_string())?;
                }
                Err(e.into())
            }
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FormWizard) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(ApiError::SessionNotFound(id))?;
        f(session.touch())
    }
}

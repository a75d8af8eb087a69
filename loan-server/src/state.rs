//! Shared application state for the request handlers.

use std::sync::Arc;

use loan_core::ReportRepository;

use crate::config::WizardConfig;
use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ReportRepository>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn ReportRepository>,
        wizard: &WizardConfig,
    ) -> Self {
        Self {
            repo,
            sessions: Arc::new(SessionStore::new(
                wizard.jump_policy(),
                wizard.idle_timeout(),
            )),
        }
    }
}

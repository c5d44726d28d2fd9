use std::sync::Arc;

use anyhow::Context;

use crate::api::{AcademicService, ApiClient};
use crate::config::PortalConfig;
use crate::session::{AccessGuard, Session};
use crate::storage::FileStorage;
use crate::types::Student;

/// Everything a command needs: the hydrated session and a client bound to it
pub struct Portal {
    pub config: PortalConfig,
    pub session: Arc<Session>,
    pub client: Arc<ApiClient>,
}

impl Portal {
    pub fn open(config: &PortalConfig) -> anyhow::Result<Self> {
        let storage = FileStorage::open(&config.storage.dir)
            .with_context(|| format!("Failed to open storage at {}", config.storage.dir.display()))?;
        let session = Arc::new(Session::hydrate(Arc::new(storage)).context("Failed to restore session")?);
        let client = Arc::new(ApiClient::new(&config.backend, session.clone())?);

        tracing::debug!(
            "Portal opened against {} (route {})",
            client.base_url(),
            session.navigator().current().path()
        );

        Ok(Self {
            config: config.clone(),
            session,
            client,
        })
    }

    pub fn service(&self) -> Arc<dyn AcademicService> {
        self.client.clone()
    }

    /// Fail unless a credential is present
    pub fn require_login(&self) -> anyhow::Result<()> {
        AccessGuard::new(&self.session).render_or(
            || Ok(()),
            |login| {
                Err(anyhow::anyhow!(
                    "Not logged in ({}). Run `portal auth login <API_KEY>` first",
                    login.path()
                ))
            },
        )
    }

    /// Logged in and a student selected
    pub fn require_student(&self) -> anyhow::Result<Student> {
        self.require_login()?;
        self.session
            .student()
            .current()
            .ok_or_else(|| anyhow::anyhow!("No student selected. Run `portal students select <ID>` first"))
    }
}

/// Numeric form of a student id, for the write endpoints
pub fn numeric_id(student: &Student) -> anyhow::Result<u64> {
    student
        .id
        .trim()
        .parse()
        .with_context(|| format!("Student id '{}' is not numeric", student.id))
}

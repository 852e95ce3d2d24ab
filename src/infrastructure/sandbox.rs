use crate::domain::ports::{
    CheckoutRequest, CheckoutSession, PaymentProcessor, ProcessorError, SessionStatus,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct SandboxSession {
    request: CheckoutRequest,
    paid: bool,
}

/// An in-process payment processor.
///
/// Sessions live in memory and are settled explicitly with [`mark_paid`], or
/// at creation time when built with [`settling_immediately`]. Failures can be
/// injected to exercise the unavailable-processor paths.
///
/// [`mark_paid`]: SandboxProcessor::mark_paid
/// [`settling_immediately`]: SandboxProcessor::settling_immediately
#[derive(Debug)]
pub struct SandboxProcessor {
    checkout_base: String,
    sessions: Mutex<HashMap<String, SandboxSession>>,
    sequence: AtomicU64,
    settle_immediately: bool,
    failing: AtomicBool,
}

impl SandboxProcessor {
    pub fn new(checkout_base: impl Into<String>) -> Self {
        Self {
            checkout_base: checkout_base.into().trim_end_matches('/').to_owned(),
            sessions: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            settle_immediately: false,
            failing: AtomicBool::new(false),
        }
    }

    pub fn settling_immediately(mut self) -> Self {
        self.settle_immediately = true;
        self
    }

    /// Marks a session as paid. Returns false for unknown sessions.
    pub fn mark_paid(&self, session_id: &str) -> bool {
        let Ok(mut sessions) = self.sessions.lock() else {
            return false;
        };
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.paid = true;
                true
            }
            None => false,
        }
    }

    pub fn fail_requests(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or_default()
    }

    /// The request a session was opened with.
    pub fn request(&self, session_id: &str) -> Option<CheckoutRequest> {
        let sessions = self.sessions.lock().ok()?;
        sessions.get(session_id).map(|s| s.request.clone())
    }

    fn check_available(&self) -> Result<(), ProcessorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProcessorError::Transport("sandbox processor offline".into()));
        }
        Ok(())
    }

    fn lock_poisoned() -> ProcessorError {
        ProcessorError::Transport("sandbox session table poisoned".into())
    }
}

#[async_trait]
impl PaymentProcessor for SandboxProcessor {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        self.check_available()?;
        if request.amount_cents <= 0 {
            return Err(ProcessorError::Rejected {
                status: 400,
                message: "amount must be positive".into(),
            });
        }

        let id = format!(
            "cs_test_{}",
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        );
        let url = format!("{}/pay/{}", self.checkout_base, id);
        self.sessions
            .lock()
            .map_err(|_| Self::lock_poisoned())?
            .insert(
                id.clone(),
                SandboxSession {
                    request: request.clone(),
                    paid: self.settle_immediately,
                },
            );
        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, ProcessorError> {
        self.check_available()?;
        let sessions = self.sessions.lock().map_err(|_| Self::lock_poisoned())?;
        match sessions.get(session_id) {
            Some(session) if session.paid => Ok(SessionStatus::Paid),
            Some(_) => Ok(SessionStatus::Unpaid),
            None => Err(ProcessorError::SessionNotFound(session_id.to_owned())),
        }
    }
}

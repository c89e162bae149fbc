use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::NaiveDate;
use futures::future::{AbortHandle, abortable};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DraftEdit, FormError, FormView, LeaveForm};
use crate::auth::session::SessionContext;
use crate::client::{LeaveService, ServiceError};
use crate::leave::BalancePolicy;
use crate::model::leave_request::LeaveApplication;

/// One open leave form together with its session and upstream service.
///
/// Background fetches started by [`mount`](Self::mount) are abortable;
/// after [`teardown`](Self::teardown) none of them touches the form again.
pub struct FormHandle {
    form: Mutex<LeaveForm>,
    session: SessionContext,
    service: Arc<dyn LeaveService>,
    tasks: StdMutex<Vec<AbortHandle>>,
    closed: AtomicBool,
}

impl FormHandle {
    pub fn new(session: SessionContext, service: Arc<dyn LeaveService>, policy: BalancePolicy) -> Arc<Self> {
        Arc::new(Self {
            form: Mutex::new(LeaveForm::new(policy)),
            session,
            service,
            tasks: StdMutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.is_closed() {
            Err(FormError::Closed)
        } else {
            Ok(())
        }
    }

    fn token(&self) -> Result<String, ServiceError> {
        self.session.token().ok_or(ServiceError::Unauthorized)
    }

    fn note_auth_failure(&self, err: &ServiceError) {
        if matches!(err, ServiceError::Unauthorized) {
            warn!("Upstream rejected the session token, clearing session");
            self.session.clear();
        }
    }

    fn spawn_abortable<F>(&self, fut: F)
    where
        F: std::future::Future<Output = ()> + 'static,
    {
        let (task, handle) = abortable(fut);
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
        actix_web::rt::spawn(async move {
            if task.await.is_err() {
                debug!("Form fetch aborted");
            }
        });
    }

    /// Kick off the initial fetches: profile then allocations, leave types,
    /// holidays. Returns immediately.
    pub fn mount(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.spawn_abortable(async move {
            if this.load_profile().await.is_ok() {
                let _ = this.refresh_allocations().await;
            }
        });

        let this = Arc::clone(self);
        self.spawn_abortable(async move { this.load_leave_types().await });

        let this = Arc::clone(self);
        self.spawn_abortable(async move { this.load_holidays().await });
    }

    /// Resolve the signed-in user (cached in the session when possible) and
    /// bind the form to them.
    pub async fn load_profile(&self) -> Result<u64, FormError> {
        let user = match self.session.user() {
            Some(user) => Ok(user),
            None => match self.token() {
                Ok(token) => self.service.fetch_profile(&token).await,
                Err(e) => Err(e),
            },
        };
        self.ensure_open()?;

        let mut form = self.form.lock().await;
        match user {
            Ok(user) => {
                self.session.store_user(user.clone());
                let employee_id = form.apply_profile(&user);
                debug!(employee_id, "Form bound to employee");
                Ok(employee_id)
            }
            Err(e) => {
                self.note_auth_failure(&e);
                form.profile_failed(&e);
                Err(FormError::ProfileNotLoaded)
            }
        }
    }

    pub async fn load_leave_types(&self) {
        let result = self.service.fetch_leave_types().await;
        if self.is_closed() {
            return;
        }
        self.form.lock().await.set_leave_types(result);
    }

    pub async fn load_holidays(&self) {
        let result = self.service.fetch_holidays().await;
        if self.is_closed() {
            return;
        }
        self.form.lock().await.set_holidays(result);
    }

    /// Re-fetch the employee's allocations. Failures end up in the form state
    /// (`no_allocations` or `allocation_error`), not in the return value.
    pub async fn refresh_allocations(&self) -> Result<(), FormError> {
        self.ensure_open()?;
        let (ticket, employee_id) = {
            let mut form = self.form.lock().await;
            let employee_id = form.draft().employee_id.ok_or(FormError::ProfileNotLoaded)?;
            (form.begin_allocation_refresh(), employee_id)
        };

        let result = match self.token() {
            Ok(token) => self.service.fetch_allocations(&token, employee_id).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.note_auth_failure(e);
        }

        self.ensure_open()?;
        self.form.lock().await.finish_allocation_refresh(ticket, result);
        Ok(())
    }

    pub async fn edit(&self, edit: DraftEdit) -> Result<(), FormError> {
        self.ensure_open()?;
        self.form.lock().await.edit(edit)
    }

    pub async fn needs_remount(&self) -> bool {
        self.form.lock().await.needs_remount()
    }

    pub async fn view(&self, today: NaiveDate) -> FormView {
        self.form.lock().await.view(today)
    }

    /// Submit the draft if the gate is open. On success the allocations are
    /// re-fetched since the balance has changed.
    pub async fn submit(&self, today: NaiveDate) -> Result<LeaveApplication, FormError> {
        self.ensure_open()?;
        let payload = self.form.lock().await.begin_submission(today)?;

        // one key per confirmed submission so upstream can drop replays
        let idempotency_key = Uuid::new_v4().to_string();
        let result = match self.token() {
            Ok(token) => {
                self.service
                    .submit_leave_application(&token, &payload, &idempotency_key)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.note_auth_failure(e);
        }

        self.ensure_open()?;
        let outcome = self.form.lock().await.finish_submission(result);
        match &outcome {
            Ok(created) => {
                info!(
                    leave_application_id = created.id,
                    employee_id = payload.employee_id,
                    "Leave application submitted"
                );
                let _ = self.refresh_allocations().await;
            }
            Err(e) => warn!(error = %e, employee_id = payload.employee_id, "Leave application not accepted"),
        }
        outcome
    }

    /// Abort every in-flight fetch. Idempotent.
    pub fn teardown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        debug!(aborted = tasks.len(), "Tearing down leave form");
        for task in tasks {
            task.abort();
        }
    }
}

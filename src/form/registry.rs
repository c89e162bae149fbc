use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::info;

use super::FormHandle;
use crate::auth::auth::AuthUser;
use crate::auth::session::SessionContext;
use crate::client::LeaveService;
use crate::config::Config;
use crate::leave::BalancePolicy;

/// Open leave forms keyed by user id.
///
/// Forms idle for longer than the configured TTL are evicted and torn down.
#[derive(Clone)]
pub struct FormRegistry {
    forms: Cache<u64, Arc<FormHandle>>,
    service: Arc<dyn LeaveService>,
    policy: BalancePolicy,
}

impl FormRegistry {
    pub fn new(service: Arc<dyn LeaveService>, policy: BalancePolicy, idle_ttl: Duration, capacity: u64) -> Self {
        let forms = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle_ttl)
            .eviction_listener(|user_id, form: Arc<FormHandle>, cause| {
                info!(user_id = *user_id, ?cause, "Leave form closed");
                form.teardown();
            })
            .build();

        Self {
            forms,
            service,
            policy,
        }
    }

    pub fn from_config(config: &Config, service: Arc<dyn LeaveService>) -> Self {
        Self::new(
            service,
            config.balance_policy,
            Duration::from_secs(config.form_idle_ttl_secs),
            config.max_open_forms,
        )
    }

    /// Return the user's open form, or open and mount a new one. A form
    /// whose profile or leave types failed to load is replaced.
    pub async fn open(&self, user: &AuthUser) -> Arc<FormHandle> {
        if let Some(form) = self.get(user).await {
            if !form.needs_remount().await {
                return form;
            }
            info!(user_id = user.user_id, "Reopening leave form after failed fetches");
            self.close(user.user_id).await;
        }

        let form = FormHandle::new(SessionContext::load(&user.token), Arc::clone(&self.service), self.policy);
        form.mount();
        self.forms.insert(user.user_id, Arc::clone(&form)).await;
        info!(user_id = user.user_id, "Leave form opened");
        form
    }

    /// The user's open form with its session token renewed from the request.
    pub async fn get(&self, user: &AuthUser) -> Option<Arc<FormHandle>> {
        let form = self.forms.get(&user.user_id).await?;
        if form.is_closed() {
            return None;
        }
        form.session().renew(user.token.as_str());
        Some(form)
    }

    pub async fn close(&self, user_id: u64) -> bool {
        match self.forms.remove(&user_id).await {
            Some(form) => {
                form.teardown();
                true
            }
            None => false,
        }
    }
}

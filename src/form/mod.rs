//! The leave request editing session.
//!
//! [`LeaveForm`] is the synchronous state: the draft plus everything fetched
//! for it. [`FormHandle`] drives the upstream fetches for one form and
//! [`FormRegistry`] keeps one open form per signed-in user.

mod error;
mod handle;
mod registry;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::client::ServiceError;
use crate::leave::{
    BalanceLookup, BalancePolicy, GateInput, LeaveBalance, ValidationContext, ValidationResult, all_balances,
    can_submit, day_count, lookup_balance, validate,
};
use crate::model::holiday::{HolidayEntry, HolidaySet};
use crate::model::leave_allocation::{AllocationSet, LeaveAllocation};
use crate::model::leave_request::{LeaveApplication, LeaveApplicationPayload, LeaveRequestDraft};
use crate::model::leave_type::LeaveType;
use crate::model::user::{DisplayNames, UserProfile};
use crate::utils::date::parse_date;

pub use error::FormError;
pub use handle::FormHandle;
pub use registry::FormRegistry;

pub const MSG_SUBMIT_FIELD_ERRORS: &str = "Validation failed. Please check the form fields.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum LeaveTypes {
    Loading,
    Loaded(Vec<LeaveType>),
    Failed,
}

/// Partial edit of the draft. Absent fields are untouched; an empty string
/// clears the type or a date.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DraftEdit {
    #[schema(example = "1")]
    pub leave_type_id: Option<String>,
    #[schema(example = "2026-01-05")]
    pub start_date: Option<String>,
    #[schema(example = "2026-01-06")]
    pub end_date: Option<String>,
    #[schema(example = "Family event out of town")]
    pub reason: Option<String>,
}

/// Snapshot of the form for the presentation layer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormView {
    pub draft: LeaveRequestDraft,
    pub display: DisplayNames,
    pub day_count: u32,
    pub selected_leave_type: Option<LeaveType>,
    pub balance: Option<LeaveBalance>,
    pub balances: Vec<LeaveBalance>,
    pub leave_types: Vec<LeaveType>,
    pub holiday_count: usize,
    pub validation: ValidationResult,
    pub can_submit: bool,
    pub submitting: bool,
    pub loading_leave_types: bool,
    pub leave_type_selection_enabled: bool,
    pub loading_allocations: bool,
    pub no_allocations: bool,
    pub allocation_error: Option<String>,
    pub error: Option<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct LeaveForm {
    draft: LeaveRequestDraft,
    display: DisplayNames,
    profile_failed: bool,
    leave_types: LeaveTypes,
    allocations: AllocationSet,
    loading_allocations: bool,
    allocation_ticket: u64,
    holidays: HolidaySet,
    submitting: bool,
    error: Option<String>,
    field_errors: BTreeMap<String, Vec<String>>,
    policy: BalancePolicy,
}

fn parse_date_field(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FormError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(value).map(Some).ok_or_else(|| FormError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

impl LeaveForm {
    pub fn new(policy: BalancePolicy) -> Self {
        Self {
            draft: LeaveRequestDraft::default(),
            display: DisplayNames::default(),
            profile_failed: false,
            leave_types: LeaveTypes::Loading,
            allocations: AllocationSet::Unknown,
            loading_allocations: false,
            allocation_ticket: 0,
            holidays: HolidaySet::new(),
            submitting: false,
            error: None,
            field_errors: BTreeMap::new(),
            policy,
        }
    }

    pub fn draft(&self) -> &LeaveRequestDraft {
        &self.draft
    }

    /// Populate the session-derived identifiers. Only the first profile
    /// counts; returns the employee id the form is bound to.
    pub fn apply_profile(&mut self, user: &UserProfile) -> u64 {
        if let Some(id) = self.draft.employee_id {
            return id;
        }
        self.profile_failed = false;
        self.draft.employee_id = Some(user.employee_id());
        self.draft.division_id = user.division_id();
        self.draft.leave_approver_id = user.leave_approver_id();
        self.display = user.display();
        user.employee_id()
    }

    pub fn profile_failed(&mut self, err: &ServiceError) {
        self.profile_failed = true;
        self.error = Some(format!("Failed to load user data: {err}"));
    }

    pub fn set_leave_types(&mut self, result: Result<Vec<LeaveType>, ServiceError>) {
        match result {
            Ok(types) => self.leave_types = LeaveTypes::Loaded(types),
            Err(e) => {
                warn!(error = %e, "Leave types unavailable");
                self.leave_types = LeaveTypes::Failed;
                self.error = Some(format!("Failed to load leave types: {e}"));
            }
        }
    }

    /// True once the profile or leave type fetch has failed. Such a form is
    /// unusable and gets replaced when it is opened again.
    pub fn needs_remount(&self) -> bool {
        self.profile_failed || self.leave_types == LeaveTypes::Failed
    }

    /// A failed holiday fetch leaves the set empty; the holiday rule then never fires.
    pub fn set_holidays(&mut self, result: Result<Vec<HolidayEntry>, ServiceError>) {
        match result {
            Ok(entries) => self.holidays = HolidaySet::from_entries(&entries),
            Err(e) => {
                debug!(error = %e, "Holiday list unavailable, continuing without it");
                self.holidays = HolidaySet::new();
            }
        }
    }

    /// Start an allocation fetch; the returned ticket must be handed back to
    /// [`finish_allocation_refresh`](Self::finish_allocation_refresh).
    pub fn begin_allocation_refresh(&mut self) -> u64 {
        self.allocation_ticket += 1;
        self.loading_allocations = true;
        if !matches!(self.allocations, AllocationSet::Known(_)) {
            self.allocations = AllocationSet::Unknown;
        }
        self.allocation_ticket
    }

    /// Apply a fetch result. Results of superseded fetches are dropped so the
    /// latest issued request always wins.
    pub fn finish_allocation_refresh(
        &mut self,
        ticket: u64,
        result: Result<Vec<LeaveAllocation>, ServiceError>,
    ) -> bool {
        if ticket != self.allocation_ticket {
            debug!(ticket, current = self.allocation_ticket, "Dropping stale allocation response");
            return false;
        }

        self.loading_allocations = false;
        self.allocations = match result {
            Ok(list) => AllocationSet::from_list(list),
            Err(e) if e.is_not_found() => AllocationSet::Empty,
            Err(e) => AllocationSet::Failed(format!("Failed to load leave allocations: {e}")),
        };
        true
    }

    /// Apply a partial edit. Nothing changes if any part of it is invalid.
    pub fn edit(&mut self, edit: DraftEdit) -> Result<(), FormError> {
        let leave_type_id = match edit.leave_type_id.as_deref().map(str::trim) {
            None => None,
            Some(_) if self.leave_types == LeaveTypes::Failed => return Err(FormError::SelectionDisabled),
            Some("") => Some(None),
            Some(raw) => Some(Some(
                raw.parse::<u32>()
                    .map_err(|_| FormError::InvalidLeaveType(raw.to_string()))?,
            )),
        };
        let start_date = match edit.start_date.as_deref() {
            Some(v) => Some(parse_date_field("start_date", v)?),
            None => None,
        };
        let end_date = match edit.end_date.as_deref() {
            Some(v) => Some(parse_date_field("end_date", v)?),
            None => None,
        };

        if let Some(v) = leave_type_id {
            self.draft.leave_type_id = v;
            self.touch("leave_type_id");
        }
        if let Some(v) = start_date {
            self.draft.start_date = v;
            self.touch("start_date");
        }
        if let Some(v) = end_date {
            self.draft.end_date = v;
            self.touch("end_date");
        }
        if let Some(reason) = edit.reason {
            self.draft.reason = reason;
            self.touch("reason");
        }
        Ok(())
    }

    // Editing a field dismisses the banner and that field's backend errors.
    fn touch(&mut self, field: &str) {
        self.error = None;
        self.field_errors.remove(field);
    }

    pub fn day_count(&self) -> u32 {
        day_count(self.draft.start_date, self.draft.end_date)
    }

    pub fn balance(&self) -> BalanceLookup {
        lookup_balance(self.draft.leave_type_id, &self.allocations)
    }

    pub fn validation(&self, today: NaiveDate) -> ValidationResult {
        let balance = self.balance();
        validate(&ValidationContext {
            draft: &self.draft,
            day_count: self.day_count(),
            balance: &balance,
            no_allocations: self.allocations.has_no_allocations(),
            holidays: &self.holidays,
            today,
            policy: self.policy,
        })
    }

    fn gate(&self, validation: &ValidationResult) -> bool {
        can_submit(&GateInput {
            validation,
            submitting: self.submitting,
            loading_leave_types: self.leave_types == LeaveTypes::Loading,
            no_allocations: self.allocations.has_no_allocations(),
        })
    }

    pub fn can_submit(&self, today: NaiveDate) -> bool {
        self.gate(&self.validation(today))
    }

    /// Pass the gate and mark the form as submitting.
    pub fn begin_submission(&mut self, today: NaiveDate) -> Result<LeaveApplicationPayload, FormError> {
        let validation = self.validation(today);
        if !self.gate(&validation) {
            if !validation.errors.is_empty() {
                self.error = Some(format!("Validation errors:\n{}", validation.errors.join("\n")));
            }
            return Err(FormError::Blocked(validation.errors));
        }

        let payload = self
            .draft
            .to_payload()
            .ok_or_else(|| FormError::Blocked(validation.errors.clone()))?;

        self.submitting = true;
        self.error = None;
        self.field_errors.clear();
        Ok(payload)
    }

    /// Record the backend's answer. Success clears the editable fields; any
    /// failure leaves the draft as it was.
    pub fn finish_submission(
        &mut self,
        result: Result<LeaveApplication, ServiceError>,
    ) -> Result<LeaveApplication, FormError> {
        self.submitting = false;
        match result {
            Ok(created) => {
                self.draft.reset_editable();
                self.error = None;
                self.field_errors.clear();
                Ok(created)
            }
            Err(ServiceError::Validation { errors, .. }) => {
                self.field_errors = errors;
                self.error = Some(MSG_SUBMIT_FIELD_ERRORS.to_string());
                Err(FormError::Rejected(MSG_SUBMIT_FIELD_ERRORS.to_string()))
            }
            Err(ServiceError::Unauthorized) => {
                self.error = Some(FormError::SessionExpired.to_string());
                Err(FormError::SessionExpired)
            }
            Err(e) => {
                let msg = format!("Failed to create leave application: {e}");
                self.error = Some(msg.clone());
                Err(FormError::Rejected(msg))
            }
        }
    }

    pub fn view(&self, today: NaiveDate) -> FormView {
        let validation = self.validation(today);
        let leave_types = match &self.leave_types {
            LeaveTypes::Loaded(types) => types.clone(),
            _ => Vec::new(),
        };
        let selected_leave_type = self
            .draft
            .leave_type_id
            .and_then(|id| leave_types.iter().find(|t| t.id == id).cloned());

        FormView {
            draft: self.draft.clone(),
            display: self.display.clone(),
            day_count: self.day_count(),
            selected_leave_type,
            balance: self.balance().balance().cloned(),
            balances: all_balances(&self.allocations),
            leave_types,
            holiday_count: self.holidays.len(),
            can_submit: self.gate(&validation),
            validation,
            submitting: self.submitting,
            loading_leave_types: self.leave_types == LeaveTypes::Loading,
            leave_type_selection_enabled: self.leave_types != LeaveTypes::Failed,
            loading_allocations: self.loading_allocations,
            no_allocations: self.allocations.has_no_allocations(),
            allocation_error: self.allocations.error().map(str::to_string),
            error: self.error.clone(),
            field_errors: self.field_errors.clone(),
        }
    }
}

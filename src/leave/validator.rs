use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::balance::BalanceLookup;
use crate::model::holiday::HolidaySet;
use crate::model::leave_request::LeaveRequestDraft;

pub const REASON_MIN_CHARS: usize = 10;
pub const REASON_MAX_CHARS: usize = 500;
pub const MAX_LEAVE_DAYS: u32 = 30;

pub const MSG_LEAVE_TYPE_REQUIRED: &str = "Leave type must be selected";
pub const MSG_START_REQUIRED: &str = "Start date is required";
pub const MSG_END_REQUIRED: &str = "End date is required";
pub const MSG_REASON_REQUIRED: &str = "Reason is required";
pub const MSG_EMPLOYEE_MISSING: &str = "Employee data is not available";
pub const MSG_DIVISION_MISSING: &str = "Division data is not available";
pub const MSG_APPROVER_MISSING: &str = "Leave approver data is not available";
pub const MSG_REASON_TOO_SHORT: &str = "Reason must be at least 10 characters";
pub const MSG_REASON_TOO_LONG: &str = "Reason must not exceed 500 characters";
pub const MSG_START_IN_PAST: &str = "Start date cannot be earlier than today";
pub const MSG_END_BEFORE_START: &str = "End date cannot be earlier than start date";
pub const MSG_START_WEEKEND: &str = "Start date cannot fall on a weekend (Saturday/Sunday)";
pub const MSG_END_WEEKEND: &str = "End date cannot fall on a weekend (Saturday/Sunday)";
pub const MSG_START_HOLIDAY: &str = "Start date cannot fall on a holiday";
pub const MSG_END_HOLIDAY: &str = "End date cannot fall on a holiday";
pub const MSG_PERIOD_TOO_LONG: &str = "Leave period cannot exceed 30 days";
pub const MSG_NO_ALLOCATIONS: &str = "No leave allocation is available for this employee";

pub fn insufficient_balance_message(leave_type_name: &str) -> String {
    format!("Insufficient leave balance for {leave_type_name}")
}

/// What to do when the request costs more days than remain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BalancePolicy {
    /// Report an error; submission is blocked.
    #[default]
    Block,
    /// Report a warning; submission stays possible.
    Warn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything the validator looks at.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub draft: &'a LeaveRequestDraft,
    pub day_count: u32,
    pub balance: &'a BalanceLookup,
    pub no_allocations: bool,
    pub holidays: &'a HolidaySet,
    pub today: NaiveDate,
    pub policy: BalancePolicy,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Check a draft against every rule and report all violations in rule order.
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    let draft = ctx.draft;
    let mut result = ValidationResult::default();
    let errors = &mut result.errors;

    // Required fields. Missing identifiers point at a profile problem upstream.
    if draft.leave_type_id.is_none() {
        errors.push(MSG_LEAVE_TYPE_REQUIRED.to_string());
    }
    if draft.start_date.is_none() {
        errors.push(MSG_START_REQUIRED.to_string());
    }
    if draft.end_date.is_none() {
        errors.push(MSG_END_REQUIRED.to_string());
    }
    if draft.reason.is_empty() {
        errors.push(MSG_REASON_REQUIRED.to_string());
    }
    if draft.employee_id.is_none() {
        errors.push(MSG_EMPLOYEE_MISSING.to_string());
    }
    if draft.division_id.is_none() {
        errors.push(MSG_DIVISION_MISSING.to_string());
    }
    if draft.leave_approver_id.is_none() {
        errors.push(MSG_APPROVER_MISSING.to_string());
    }

    if !draft.reason.is_empty() {
        let len = draft.reason.trim().chars().count();
        if len < REASON_MIN_CHARS {
            errors.push(MSG_REASON_TOO_SHORT.to_string());
        } else if len > REASON_MAX_CHARS {
            errors.push(MSG_REASON_TOO_LONG.to_string());
        }
    }

    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
        if start < ctx.today {
            errors.push(MSG_START_IN_PAST.to_string());
        }
        if end < start {
            errors.push(MSG_END_BEFORE_START.to_string());
        }
        if is_weekend(start) {
            errors.push(MSG_START_WEEKEND.to_string());
        }
        if is_weekend(end) {
            errors.push(MSG_END_WEEKEND.to_string());
        }
        if ctx.holidays.contains(start) {
            errors.push(MSG_START_HOLIDAY.to_string());
        }
        if ctx.holidays.contains(end) {
            errors.push(MSG_END_HOLIDAY.to_string());
        }
        if ctx.day_count > MAX_LEAVE_DAYS {
            errors.push(MSG_PERIOD_TOO_LONG.to_string());
        }
    }

    if let (Some(_), Some(balance)) = (draft.leave_type_id, ctx.balance.balance()) {
        if ctx.day_count > 0 && !ctx.no_allocations && ctx.day_count > balance.remaining {
            let msg = insufficient_balance_message(&balance.name);
            match ctx.policy {
                BalancePolicy::Block => result.errors.push(msg),
                BalancePolicy::Warn => result.warnings.push(msg),
            }
        }
    }

    if ctx.no_allocations && draft.leave_type_id.is_some() {
        result.errors.push(MSG_NO_ALLOCATIONS.to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::balance::lookup_balance;
    use crate::leave::day_count::day_count;
    use crate::model::leave_allocation::{AllocationSet, LeaveAllocation};

    // 2025-07-14 is a Monday.
    fn today() -> NaiveDate {
        date("2025-07-14")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn valid_draft() -> LeaveRequestDraft {
        LeaveRequestDraft {
            leave_type_id: Some(1),
            start_date: Some(date("2025-07-21")),
            end_date: Some(date("2025-07-21")),
            reason: "Family event today".into(),
            employee_id: Some(7),
            division_id: Some(2),
            leave_approver_id: Some(9),
        }
    }

    fn allocations(remaining: u32) -> AllocationSet {
        AllocationSet::from_list(vec![LeaveAllocation {
            leave_type_id: 1,
            leave_type_name: "Annual Leave".into(),
            allocated_days: 12,
            remaining_days: remaining,
            status: None,
            allocation_period: None,
        }])
    }

    fn run(draft: &LeaveRequestDraft, set: &AllocationSet, holidays: &HolidaySet, policy: BalancePolicy) -> ValidationResult {
        let balance = lookup_balance(draft.leave_type_id, set);
        validate(&ValidationContext {
            draft,
            day_count: day_count(draft.start_date, draft.end_date),
            balance: &balance,
            no_allocations: set.has_no_allocations(),
            holidays,
            today: today(),
            policy,
        })
    }

    fn check(draft: &LeaveRequestDraft) -> ValidationResult {
        run(draft, &allocations(11), &HolidaySet::new(), BalancePolicy::Block)
    }

    #[test]
    fn valid_single_day_request_passes() {
        let result = check(&valid_draft());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_draft_reports_required_fields_in_order() {
        let result = check(&LeaveRequestDraft::default());
        assert_eq!(
            result.errors,
            vec![
                MSG_LEAVE_TYPE_REQUIRED,
                MSG_START_REQUIRED,
                MSG_END_REQUIRED,
                MSG_REASON_REQUIRED,
                MSG_EMPLOYEE_MISSING,
                MSG_DIVISION_MISSING,
                MSG_APPROVER_MISSING,
            ]
        );
    }

    #[test]
    fn reason_length_boundary() {
        let mut draft = valid_draft();

        draft.reason = "  123456789  ".into();
        assert_eq!(check(&draft).errors, vec![MSG_REASON_TOO_SHORT]);

        draft.reason = "  1234567890  ".into();
        assert!(check(&draft).is_valid());

        draft.reason = "x".repeat(500);
        assert!(check(&draft).is_valid());

        draft.reason = "x".repeat(501);
        assert_eq!(check(&draft).errors, vec![MSG_REASON_TOO_LONG]);
    }

    #[test]
    fn whitespace_reason_is_too_short_not_missing() {
        let mut draft = valid_draft();
        draft.reason = "     ".into();
        assert_eq!(check(&draft).errors, vec![MSG_REASON_TOO_SHORT]);
    }

    #[test]
    fn holiday_start_is_reported_regardless_of_other_fields() {
        let holidays: HolidaySet = [date("2025-07-21")].into_iter().collect();

        let result = run(&valid_draft(), &allocations(11), &holidays, BalancePolicy::Block);
        assert!(result.errors.contains(&MSG_START_HOLIDAY.to_string()));

        let mut broken = valid_draft();
        broken.leave_type_id = None;
        broken.reason.clear();
        broken.employee_id = None;
        let result = run(&broken, &allocations(11), &holidays, BalancePolicy::Block);
        assert!(result.errors.contains(&MSG_START_HOLIDAY.to_string()));
    }

    #[test]
    fn date_rules() {
        let mut draft = valid_draft();

        draft.start_date = Some(date("2025-07-11"));
        draft.end_date = Some(date("2025-07-11"));
        assert_eq!(check(&draft).errors, vec![MSG_START_IN_PAST]);

        draft.start_date = Some(date("2025-07-14"));
        draft.end_date = Some(date("2025-07-14"));
        assert!(check(&draft).is_valid(), "today itself is allowed");

        draft.start_date = Some(date("2025-07-19"));
        draft.end_date = Some(date("2025-07-20"));
        assert_eq!(check(&draft).errors, vec![MSG_START_WEEKEND, MSG_END_WEEKEND]);

        draft.start_date = Some(date("2025-07-23"));
        draft.end_date = Some(date("2025-07-22"));
        assert_eq!(check(&draft).errors, vec![MSG_END_BEFORE_START]);
    }

    #[test]
    fn period_longer_than_thirty_days() {
        let mut draft = valid_draft();
        let set = AllocationSet::from_list(vec![LeaveAllocation {
            leave_type_id: 1,
            leave_type_name: "Unpaid Leave".into(),
            allocated_days: 60,
            remaining_days: 60,
            status: None,
            allocation_period: None,
        }]);

        // Mon 21 Jul .. Tue 19 Aug is exactly 30 days
        draft.end_date = Some(date("2025-08-19"));
        assert!(run(&draft, &set, &HolidaySet::new(), BalancePolicy::Block).is_valid());

        draft.end_date = Some(date("2025-08-20"));
        assert_eq!(
            run(&draft, &set, &HolidaySet::new(), BalancePolicy::Block).errors,
            vec![MSG_PERIOD_TOO_LONG]
        );
    }

    #[test]
    fn insufficient_balance_is_the_only_error() {
        let mut draft = valid_draft();
        draft.end_date = Some(date("2025-07-25"));

        let result = run(&draft, &allocations(3), &HolidaySet::new(), BalancePolicy::Block);
        assert_eq!(result.errors, vec![insufficient_balance_message("Annual Leave")]);
    }

    #[test]
    fn warn_policy_moves_balance_error_to_warnings() {
        let mut draft = valid_draft();
        draft.end_date = Some(date("2025-07-25"));

        let result = run(&draft, &allocations(3), &HolidaySet::new(), BalancePolicy::Warn);
        assert!(result.is_valid());
        assert_eq!(result.warnings, vec![insufficient_balance_message("Annual Leave")]);
    }

    #[test]
    fn no_allocations_with_selected_type_is_an_error() {
        let result = run(&valid_draft(), &AllocationSet::Empty, &HolidaySet::new(), BalancePolicy::Block);
        assert_eq!(result.errors, vec![MSG_NO_ALLOCATIONS]);

        let mut draft = valid_draft();
        draft.leave_type_id = None;
        let result = run(&draft, &AllocationSet::Empty, &HolidaySet::new(), BalancePolicy::Block);
        assert_eq!(result.errors, vec![MSG_LEAVE_TYPE_REQUIRED]);
    }

    #[test]
    fn unknown_allocation_state_skips_balance_rule() {
        let mut draft = valid_draft();
        draft.end_date = Some(date("2025-07-25"));
        let result = run(&draft, &AllocationSet::Unknown, &HolidaySet::new(), BalancePolicy::Block);
        assert!(result.is_valid());
    }

    #[test]
    fn validation_is_idempotent() {
        let mut draft = valid_draft();
        draft.reason = "short".into();
        draft.end_date = Some(date("2025-07-26"));
        let holidays: HolidaySet = [date("2025-07-21")].into_iter().collect();

        let first = run(&draft, &allocations(1), &holidays, BalancePolicy::Block);
        let second = run(&draft, &allocations(1), &holidays, BalancePolicy::Block);
        assert_eq!(first, second);
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("block".parse::<BalancePolicy>().unwrap(), BalancePolicy::Block);
        assert_eq!("WARN".parse::<BalancePolicy>().unwrap(), BalancePolicy::Warn);
        assert!("maybe".parse::<BalancePolicy>().is_err());
    }
}

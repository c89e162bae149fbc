use super::validator::ValidationResult;

#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub validation: &'a ValidationResult,
    pub submitting: bool,
    pub loading_leave_types: bool,
    pub no_allocations: bool,
}

/// Whether the submit action is enabled.
pub fn can_submit(input: &GateInput<'_>) -> bool {
    input.validation.is_valid() && !input.submitting && !input.loading_leave_types && !input.no_allocations
}

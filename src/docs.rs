use crate::api::leave_form::SubmitResponse;
use crate::leave::history::ApplicationHistory;
use crate::model::dashboard::Statistics;
use crate::form::{DraftEdit, FormView};
use crate::leave::{BalanceStatus, LeaveBalance, PaletteColor, ValidationResult};
use crate::model::leave_allocation::{AllocationPeriod, AllocationStatus, LeaveAllocation};
use crate::model::leave_request::{LeaveApplication, LeaveRequestDraft, LeaveStatus};
use crate::model::leave_type::LeaveType;
use crate::model::user::DisplayNames;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave Form API",
        version = "1.0.0",
        description = r#"
## Leave Request Form

Backs the employee self-service **leave application** screen.

### 🔹 Key Features
- **Draft editing**
  - Open a form, change leave type, dates and reason one field at a time
- **Live validation**
  - Required fields, reason length, past dates, weekends, holidays, 30-day limit
- **Leave balances**
  - Allocated, used and remaining days per leave type
- **Submission**
  - Gated on validation, forwarded to the HRM backend
- **History**
  - Applications filtered by status, with dashboard statistics

### 🔐 Security
Every endpoint needs a **JWT Bearer access token**; the same token is forwarded
to the HRM backend.

---
Built with **Rust**, **Actix Web**, **reqwest**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_form::open_form,
        crate::api::leave_form::get_form,
        crate::api::leave_form::close_form,
        crate::api::leave_form::edit_draft,
        crate::api::leave_form::refresh_allocations,
        crate::api::leave_form::list_balances,
        crate::api::leave_form::submit,
        crate::api::leave_applications::list_applications
    ),
    components(
        schemas(
            DraftEdit,
            FormView,
            SubmitResponse,
            LeaveRequestDraft,
            LeaveApplication,
            LeaveStatus,
            LeaveType,
            LeaveAllocation,
            AllocationPeriod,
            AllocationStatus,
            LeaveBalance,
            BalanceStatus,
            PaletteColor,
            ValidationResult,
            DisplayNames,
            ApplicationHistory,
            Statistics
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave Form", description = "Leave application form APIs"),
        (name = "Leave Applications", description = "Leave application history and statistics"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

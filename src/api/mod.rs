pub mod leave_applications;
pub mod leave_form;

//! Leave request validation and balance derivation.
//!
//! Everything here is pure: no I/O, no clocks. Callers pass `today` in.

pub mod balance;
pub mod day_count;
pub mod gate;
pub mod history;
pub mod validator;

pub use balance::{BalanceLookup, BalanceStatus, LeaveBalance, PaletteColor, all_balances, lookup_balance};
pub use day_count::day_count;
pub use gate::{GateInput, can_submit};
pub use history::{ApplicationHistory, assemble};
pub use validator::{BalancePolicy, ValidationContext, ValidationResult, validate};

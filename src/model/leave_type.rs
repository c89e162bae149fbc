use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: u32,
    #[schema(example = "Annual Leave")]
    pub name: String,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cash::ShiftSummary,
    models::{CashShift, TransactionKind},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenShiftRequest {
    pub base_amount: i64,
    pub opened_by: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseShiftRequest {
    /// Cash actually counted in the drawer.
    pub real: i64,
    pub notes: Option<String>,
    pub closed_by: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTransactionRequest {
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClosedShift {
    pub shift: CashShift,
    pub summary: ShiftSummary,
}

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    cash::{ShiftSummary, summarize},
    dto::cash::{AddTransactionRequest, CloseShiftRequest, ClosedShift, OpenShiftRequest},
    entity::{
        cash_shifts::{ActiveModel as ShiftActive, Column as ShiftCol, Entity as CashShifts, Model as ShiftModel},
        cash_transactions::{ActiveModel as TxActive, Column as TxCol, Entity as CashTransactions, Model as TxModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    models::{CashShift, CashTransaction, OrderStatus, ShiftStatus},
    response::ApiResponse,
    state::AppState,
};

async fn open_shift_row<C: ConnectionTrait>(conn: &C) -> AppResult<Option<ShiftModel>> {
    Ok(CashShifts::find()
        .filter(ShiftCol::Status.eq(ShiftStatus::Open.as_str()))
        .order_by_desc(ShiftCol::OpenedAt)
        .one(conn)
        .await?)
}

async fn find_shift(state: &AppState, id: Uuid) -> AppResult<ShiftModel> {
    CashShifts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn current_shift(state: &AppState) -> AppResult<ApiResponse<Option<CashShift>>> {
    let shift = open_shift_row(&state.orm)
        .await?
        .map(shift_from_entity)
        .transpose()?;
    let message = if shift.is_some() { "Shift open" } else { "No open shift" };
    Ok(ApiResponse::success(message, shift, None))
}

/// Only one shift may be open. The check and the insert are separate
/// statements, so two simultaneous opens can still both succeed.
pub async fn open_shift(state: &AppState, payload: OpenShiftRequest) -> AppResult<ApiResponse<CashShift>> {
    if payload.base_amount < 0 {
        return Err(AppError::BadRequest("Base amount cannot be negative".into()));
    }
    if open_shift_row(&state.orm).await?.is_some() {
        return Err(AppError::Conflict("A cash shift is already open".into()));
    }

    let shift = ShiftActive {
        id: Set(Uuid::new_v4()),
        opened_at: Set(Utc::now().into()),
        closed_at: Set(None),
        base_amount: Set(payload.base_amount),
        final_cash_expected: Set(None),
        final_cash_real: Set(None),
        difference: Set(None),
        status: Set(ShiftStatus::Open.as_str().into()),
        opened_by: Set(payload.opened_by),
        closed_by: Set(None),
        notes: Set(None),
    }
    .insert(&state.orm)
    .await?;

    let shift = shift_from_entity(shift)?;
    state.feed.inserted("cash_shifts", &shift);
    tracing::info!(shift_id = %shift.id, base = shift.base_amount, "cash shift opened");
    audit::record(
        &state.pool,
        Some(payload.opened_by),
        "shift_opened",
        "cash_shifts",
        serde_json::json!({ "shift_id": shift.id, "base_amount": shift.base_amount }),
    )
    .await;

    Ok(ApiResponse::success("Shift opened", shift, None))
}

pub async fn add_transaction(
    state: &AppState,
    shift_id: Uuid,
    payload: AddTransactionRequest,
) -> AppResult<ApiResponse<CashTransaction>> {
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("Amount must be positive".into()));
    }
    let description = payload.description.trim().to_string();
    if description.is_empty() {
        return Err(AppError::BadRequest("Description is required".into()));
    }

    let shift = shift_from_entity(find_shift(state, shift_id).await?)?;
    if shift.status != ShiftStatus::Open {
        return Err(AppError::Conflict("Shift is closed".into()));
    }

    let tx = TxActive {
        id: Set(Uuid::new_v4()),
        shift_id: Set(shift_id),
        kind: Set(payload.kind.as_str().into()),
        amount: Set(payload.amount),
        description: Set(description),
        user_id: Set(payload.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let tx = transaction_from_entity(tx)?;
    state.feed.inserted("cash_transactions", &tx);
    tracing::info!(shift_id = %shift_id, kind = %tx.kind, amount = tx.amount, "cash movement recorded");

    Ok(ApiResponse::success("Transaction recorded", tx, None))
}

pub async fn list_transactions(
    state: &AppState,
    shift_id: Uuid,
) -> AppResult<ApiResponse<Vec<CashTransaction>>> {
    find_shift(state, shift_id).await?;
    let txs = load_transactions(state, shift_id).await?;
    Ok(ApiResponse::list("Ok", txs))
}

async fn load_transactions(state: &AppState, shift_id: Uuid) -> AppResult<Vec<CashTransaction>> {
    CashTransactions::find()
        .filter(TxCol::ShiftId.eq(shift_id))
        .order_by_desc(TxCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(transaction_from_entity)
        .collect()
}

/// Totals of orders paid inside `[since, until)`; an open shift has no `until`.
async fn paid_order_totals(
    state: &AppState,
    since: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
) -> AppResult<Vec<i64>> {
    Ok(Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Status.eq(OrderStatus::Paid.as_str()))
                .add(OrderCol::UpdatedAt.gte(since))
                .add_option(until.map(|until| OrderCol::UpdatedAt.lt(until))),
        )
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| o.total_amount)
        .collect())
}

async fn summary_for(state: &AppState, shift: &CashShift) -> AppResult<ShiftSummary> {
    let txs = load_transactions(state, shift.id).await?;
    // Sales that cannot be loaded count as zero rather than blocking the drawer.
    let sales = match paid_order_totals(state, shift.opened_at, shift.closed_at).await {
        Ok(totals) => totals,
        Err(err) => {
            tracing::error!(shift_id = %shift.id, error = %err, "loading paid orders failed, counting no sales");
            Vec::new()
        }
    };
    Ok(summarize(shift.base_amount, &txs, sales))
}

pub async fn shift_summary(state: &AppState, shift_id: Uuid) -> AppResult<ApiResponse<ShiftSummary>> {
    let shift = shift_from_entity(find_shift(state, shift_id).await?)?;
    let summary = summary_for(state, &shift).await?;
    Ok(ApiResponse::success("Ok", summary, None))
}

pub async fn close_shift(
    state: &AppState,
    shift_id: Uuid,
    payload: CloseShiftRequest,
) -> AppResult<ApiResponse<ClosedShift>> {
    let existing = find_shift(state, shift_id).await?;
    let shift = shift_from_entity(existing.clone())?;
    if shift.status != ShiftStatus::Open {
        return Err(AppError::Conflict("Shift is already closed".into()));
    }

    let summary = summary_for(state, &shift).await?;
    let difference = payload.real - summary.expected_total;

    let mut active: ShiftActive = existing.into();
    active.closed_at = Set(Some(Utc::now().into()));
    active.final_cash_expected = Set(Some(summary.expected_total));
    active.final_cash_real = Set(Some(payload.real));
    active.difference = Set(Some(difference));
    active.status = Set(ShiftStatus::Closed.as_str().into());
    active.closed_by = Set(Some(payload.closed_by));
    active.notes = Set(payload.notes.filter(|n| !n.trim().is_empty()));
    let closed = shift_from_entity(active.update(&state.orm).await?)?;

    state.feed.updated("cash_shifts", Some(&shift), &closed);
    tracing::info!(
        shift_id = %closed.id,
        expected = summary.expected_total,
        real = payload.real,
        difference,
        "cash shift closed"
    );
    audit::record(
        &state.pool,
        Some(payload.closed_by),
        "shift_closed",
        "cash_shifts",
        serde_json::json!({ "shift_id": closed.id, "difference": difference }),
    )
    .await;

    Ok(ApiResponse::success(
        "Shift closed",
        ClosedShift {
            shift: closed,
            summary,
        },
        None,
    ))
}

pub fn shift_from_entity(model: ShiftModel) -> AppResult<CashShift> {
    Ok(CashShift {
        id: model.id,
        opened_at: model.opened_at.with_timezone(&Utc),
        closed_at: model.closed_at.map(|dt| dt.with_timezone(&Utc)),
        base_amount: model.base_amount,
        final_cash_expected: model.final_cash_expected,
        final_cash_real: model.final_cash_real,
        difference: model.difference,
        status: model.status.parse()?,
        opened_by: model.opened_by,
        closed_by: model.closed_by,
        notes: model.notes,
    })
}

fn transaction_from_entity(model: TxModel) -> AppResult<CashTransaction> {
    Ok(CashTransaction {
        id: model.id,
        shift_id: model.shift_id,
        kind: model.kind.parse()?,
        amount: model.amount,
        description: model.description,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

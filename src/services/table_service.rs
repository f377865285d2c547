use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::tables::{
        ChangeTableStatusRequest, CreateTableRequest, OccupyTableRequest, TableBoardEntry,
        TableWithSession, UpdateTableRequest,
    },
    entity::{
        dining_tables::{ActiveModel as TableActive, Column as TableCol, Entity as DiningTables, Model as TableModel},
        orders::{Column as OrderCol, Entity as Orders},
        table_sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as TableSessions, Model as SessionModel},
    },
    error::{AppError, AppResult},
    lifecycle::{self, IDEAL_SESSION_MINUTES, TableEvent},
    models::{DiningTable, OrderStatus, SessionStatus, TableSession, TableStatus},
    response::ApiResponse,
    state::AppState,
};

/// Floor board: every table ordered by number, with the running session clock.
pub async fn list_tables(state: &AppState) -> AppResult<ApiResponse<Vec<TableBoardEntry>>> {
    let tables = DiningTables::find()
        .order_by_asc(TableCol::Number)
        .all(&state.orm)
        .await?;

    let ideal: HashMap<Uuid, i32> = TableSessions::find()
        .filter(SessionCol::Status.eq(SessionStatus::Active.as_str()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, s.ideal_duration))
        .collect();

    let now = Utc::now();
    let entries = tables
        .into_iter()
        .map(|model| {
            let table = table_from_entity(model)?;
            let ideal_minutes = table
                .current_session_id
                .and_then(|id| ideal.get(&id).copied())
                .unwrap_or(IDEAL_SESSION_MINUTES);
            let elapsed_ms = table
                .current_session_start_time
                .map(|start| lifecycle::elapsed_ms(start, now));
            let over_ideal_time = table
                .current_session_start_time
                .is_some_and(|start| lifecycle::over_ideal_time(start, ideal_minutes, now));
            Ok(TableBoardEntry {
                table,
                elapsed_ms,
                over_ideal_time,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::list("Ok", entries))
}

pub async fn get_table(state: &AppState, id: Uuid) -> AppResult<ApiResponse<TableWithSession>> {
    let table = find_table(&state.orm, id).await?;
    let session = match table.current_session_id {
        Some(session_id) => TableSessions::find_by_id(session_id)
            .one(&state.orm)
            .await?
            .map(session_from_entity)
            .transpose()?,
        None => None,
    };

    Ok(ApiResponse::success(
        "Ok",
        TableWithSession {
            table: table_from_entity(table)?,
            session,
        },
        None,
    ))
}

async fn find_table<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<TableModel> {
    DiningTables::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn lock_table(txn: &DatabaseTransaction, id: Uuid) -> AppResult<TableModel> {
    DiningTables::find()
        .filter(TableCol::Id.eq(id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn ensure_number_free<C: ConnectionTrait>(conn: &C, number: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(TableCol::Number.eq(number));
    if let Some(id) = except {
        condition = condition.add(TableCol::Id.ne(id));
    }
    if DiningTables::find().filter(condition).one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Table {number} already exists")));
    }
    Ok(())
}

/// New tables start free with their QR link already stamped.
pub async fn create_table(
    state: &AppState,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let number = payload.number.trim().to_string();
    if number.is_empty() {
        return Err(AppError::BadRequest("Table number is required".into()));
    }
    ensure_number_free(&state.orm, &number, None).await?;

    let id = Uuid::new_v4();
    let table = TableActive {
        id: Set(id),
        zone_id: Set(payload.zone_id),
        number: Set(number),
        status: Set(TableStatus::Free.as_str().into()),
        capacity: Set(payload.capacity.unwrap_or(4).max(1)),
        x_position: Set(payload.x_position.unwrap_or_default()),
        y_position: Set(payload.y_position.unwrap_or_default()),
        shape: Set(payload.shape),
        qr_code: Set(Some(state.config.table_menu_url(id))),
        current_session_id: Set(None),
        current_session_start_time: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let table = table_from_entity(table)?;
    state.feed.inserted("tables", &table);
    tracing::info!(table_id = %table.id, number = %table.number, "table created");

    Ok(ApiResponse::success("Table created", table, None))
}

pub async fn update_table(
    state: &AppState,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    let existing = find_table(&state.orm, id).await?;
    let previous = table_from_entity(existing.clone())?;
    let mut active: TableActive = existing.into();

    if let Some(number) = payload.number.map(|n| n.trim().to_string()) {
        if number.is_empty() {
            return Err(AppError::BadRequest("Table number is required".into()));
        }
        ensure_number_free(&state.orm, &number, Some(id)).await?;
        active.number = Set(number);
    }
    if let Some(zone_id) = payload.zone_id {
        active.zone_id = Set(Some(zone_id));
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(capacity.max(1));
    }
    if let Some(x) = payload.x_position {
        active.x_position = Set(x);
    }
    if let Some(y) = payload.y_position {
        active.y_position = Set(y);
    }
    if let Some(shape) = payload.shape {
        active.shape = Set(Some(shape));
    }

    let table = table_from_entity(active.update(&state.orm).await?)?;
    state.feed.updated("tables", Some(&previous), &table);

    Ok(ApiResponse::success("Table updated", table, None))
}

pub async fn delete_table(state: &AppState, id: Uuid) -> AppResult<ApiResponse<DiningTable>> {
    let existing = table_from_entity(find_table(&state.orm, id).await?)?;
    if existing.status.has_session() {
        return Err(AppError::Conflict(format!(
            "Table {} is {} and cannot be deleted",
            existing.number, existing.status
        )));
    }

    DiningTables::delete_by_id(id).exec(&state.orm).await?;
    state.feed.deleted("tables", serde_json::json!({ "id": id }));
    tracing::info!(table_id = %id, "table deleted");

    Ok(ApiResponse::success("Table deleted", existing, None))
}

/// Seat a party: opens a session and stamps it on the table.
pub async fn occupy_table(
    state: &AppState,
    id: Uuid,
    payload: OccupyTableRequest,
) -> AppResult<ApiResponse<TableWithSession>> {
    let txn = state.orm.begin().await?;

    let table = lock_table(&txn, id).await?;
    let previous = table_from_entity(table.clone())?;
    let next = previous.status.apply(TableEvent::Seat)?;

    let now = Utc::now();
    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        table_id: Set(table.id),
        waiter_id: Set(payload.waiter_id),
        start_time: Set(now.into()),
        end_time: Set(None),
        ideal_duration: Set(IDEAL_SESSION_MINUTES),
        client_count: Set(payload.client_count.unwrap_or(1).max(1)),
        total_amount: Set(0),
        status: Set(SessionStatus::Active.as_str().into()),
    }
    .insert(&txn)
    .await?;

    let mut active: TableActive = table.into();
    active.status = Set(next.as_str().into());
    active.current_session_id = Set(Some(session.id));
    active.current_session_start_time = Set(Some(session.start_time));
    let table = active.update(&txn).await?;

    txn.commit().await?;

    let table = table_from_entity(table)?;
    let session = session_from_entity(session)?;
    state.feed.inserted("table_sessions", &session);
    state.feed.updated("tables", Some(&previous), &table);
    tracing::info!(table = %table.number, session_id = %session.id, "table occupied");

    audit::record(
        &state.pool,
        payload.waiter_id,
        "table_occupied",
        "tables",
        serde_json::json!({ "table_id": table.id, "session_id": session.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Table occupied",
        TableWithSession {
            table,
            session: Some(session),
        },
        None,
    ))
}

/// Release a table: closes its session with the session's order total and
/// clears the table's session reference.
pub async fn free_table(state: &AppState, id: Uuid) -> AppResult<ApiResponse<TableWithSession>> {
    let txn = state.orm.begin().await?;

    let table = lock_table(&txn, id).await?;
    let previous = table_from_entity(table.clone())?;
    let next = previous.status.apply(TableEvent::Release)?;

    let closed = match table.current_session_id {
        Some(session_id) => close_session(&txn, session_id).await?,
        None => {
            tracing::warn!(table = %table.number, "occupied table without a session");
            None
        }
    };

    let mut active: TableActive = table.into();
    active.status = Set(next.as_str().into());
    active.current_session_id = Set(None);
    active.current_session_start_time = Set(None);
    let table = active.update(&txn).await?;

    txn.commit().await?;

    let table = table_from_entity(table)?;
    let session = closed.map(session_from_entity).transpose()?;
    if let Some(session) = &session {
        state.feed.updated("table_sessions", None, session);
    }
    state.feed.updated("tables", Some(&previous), &table);
    tracing::info!(table = %table.number, total = session.as_ref().map(|s| s.total_amount), "table freed");

    audit::record(
        &state.pool,
        None,
        "table_freed",
        "tables",
        serde_json::json!({ "table_id": table.id, "session_id": session.as_ref().map(|s| s.id) }),
    )
    .await;

    Ok(ApiResponse::success(
        "Table freed",
        TableWithSession { table, session },
        None,
    ))
}

async fn close_session(txn: &DatabaseTransaction, session_id: Uuid) -> AppResult<Option<SessionModel>> {
    let Some(session) = TableSessions::find_by_id(session_id).one(txn).await? else {
        return Ok(None);
    };

    let total_amount: i64 = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::SessionId.eq(session_id))
                .add(OrderCol::Status.ne(OrderStatus::Cancelled.as_str())),
        )
        .all(txn)
        .await?
        .iter()
        .map(|o| o.total_amount)
        .sum();

    let mut active: SessionActive = session.into();
    active.end_time = Set(Some(Utc::now().into()));
    active.status = Set(SessionStatus::Closed.as_str().into());
    active.total_amount = Set(total_amount);
    Ok(Some(active.update(txn).await?))
}

/// Direct status request. Seating and releasing carry session bookkeeping,
/// so they are routed through [`occupy_table`] and [`free_table`].
pub async fn change_status(
    state: &AppState,
    id: Uuid,
    payload: ChangeTableStatusRequest,
) -> AppResult<ApiResponse<TableWithSession>> {
    let existing = find_table(&state.orm, id).await?;
    let current: TableStatus = existing.status.parse()?;

    match current.event_towards(payload.status)? {
        TableEvent::Seat => occupy_table(state, id, OccupyTableRequest::default()).await,
        TableEvent::Release => free_table(state, id).await,
        event => {
            let txn = state.orm.begin().await?;
            let table = lock_table(&txn, id).await?;
            let previous = table_from_entity(table.clone())?;
            // Re-check under the lock; another request may have moved the table.
            let next = previous.status.apply(event)?;

            let mut active: TableActive = table.into();
            active.status = Set(next.as_str().into());
            let table = table_from_entity(active.update(&txn).await?)?;
            txn.commit().await?;

            state.feed.updated("tables", Some(&previous), &table);
            tracing::debug!(table = %table.number, from = %previous.status, to = %table.status, "table status changed");

            Ok(ApiResponse::success(
                "Table updated",
                TableWithSession {
                    table,
                    session: None,
                },
                None,
            ))
        }
    }
}

pub fn table_from_entity(model: TableModel) -> AppResult<DiningTable> {
    Ok(DiningTable {
        id: model.id,
        zone_id: model.zone_id,
        number: model.number,
        status: model.status.parse()?,
        capacity: model.capacity,
        x_position: model.x_position,
        y_position: model.y_position,
        shape: model.shape,
        qr_code: model.qr_code,
        current_session_id: model.current_session_id,
        current_session_start_time: model
            .current_session_start_time
            .map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn session_from_entity(model: SessionModel) -> AppResult<TableSession> {
    Ok(TableSession {
        id: model.id,
        table_id: model.table_id,
        waiter_id: model.waiter_id,
        start_time: model.start_time.with_timezone(&Utc),
        end_time: model.end_time.map(|dt| dt.with_timezone(&Utc)),
        ideal_duration: model.ideal_duration,
        client_count: model.client_count,
        total_amount: model.total_amount,
        status: model.status.parse()?,
    })
}

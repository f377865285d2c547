use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::CartLine,
    dto::orders::{CreateOrderRequest, OrderLineRequest, OrderList, OrderWithItems, SessionItem},
    entity::{
        dining_tables::{Column as TableCol, Entity as DiningTables, Model as TableModel},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{ItemStatus, Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Look a table up by id, falling back to its printed number.
pub async fn resolve_table<C: ConnectionTrait>(conn: &C, table_ref: &str) -> AppResult<TableModel> {
    let table_ref = table_ref.trim();
    if table_ref.is_empty() {
        return Err(AppError::BadRequest("table is required".into()));
    }
    let found = match Uuid::parse_str(table_ref) {
        Ok(id) => DiningTables::find_by_id(id).one(conn).await?,
        Err(_) => {
            DiningTables::find()
                .filter(TableCol::Number.eq(table_ref))
                .one(conn)
                .await?
        }
    };
    found.ok_or(AppError::NotFound)
}

/// Create an order and its items for a table in a single transaction. Unit
/// prices come from the product rows, never from the caller.
pub async fn create_client_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    if let Some(line) = payload.items.iter().find(|l| l.quantity <= 0) {
        return Err(AppError::BadRequest(format!(
            "Invalid quantity for product {}",
            line.product_id
        )));
    }

    let txn = state.orm.begin().await?;

    let table = resolve_table(&txn, &payload.table).await?;

    let product_ids: Vec<Uuid> = payload.items.iter().map(|l| l.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut total_amount: i64 = 0;
    let mut estimate: i32 = 0;
    for line in &payload.items {
        let product = products.get(&line.product_id).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown product {}", line.product_id))
        })?;
        if !product.is_available {
            return Err(AppError::BadRequest(format!(
                "{} is not available",
                product.name
            )));
        }
        total_amount = add_line(total_amount, product.price, line.quantity)?;
        estimate = estimate.max(product.prep_time_minutes);
    }

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        session_id: Set(table.current_session_id),
        table_id: Set(table.id),
        waiter_id: Set(payload.waiter_id),
        status: Set(OrderStatus::Pending.as_str().into()),
        priority: Set(1),
        estimated_total_time: Set((estimate > 0).then_some(estimate)),
        total_amount: Set(total_amount),
        kitchen_started_at: Set(None),
        kitchen_finished_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let unit_price = products
            .get(&line.product_id)
            .map(|p| p.price)
            .unwrap_or_default();
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(unit_price),
            notes: Set(line.notes.clone().filter(|n| !n.trim().is_empty())),
            status: Set(ItemStatus::Pending.as_str().into()),
            started_at: Set(None),
            finished_at: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item)?);
    }

    txn.commit().await?;

    let order = order_from_entity(order)?;
    state.feed.inserted("orders", &order);
    for item in &items {
        state.feed.inserted("order_items", item);
    }
    tracing::info!(order_id = %order.id, table = %table.number, total = order.total_amount, "order placed");

    audit::record(
        &state.pool,
        payload.waiter_id,
        "order_created",
        "orders",
        serde_json::json!({ "order_id": order.id, "table_id": order.table_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

/// `running + price * quantity`, refusing totals that do not fit.
fn add_line(running: i64, price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .and_then(|line_total| running.checked_add(line_total))
        .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))
}

/// Turn the table's stored cart into an order. The lines are taken out of the
/// cart up front and put back if the order cannot be created.
pub async fn submit_cart(
    state: &AppState,
    table_id: Uuid,
    waiter_id: Option<Uuid>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let lines = state.carts.take(table_id).await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let payload = CreateOrderRequest {
        table: table_id.to_string(),
        waiter_id,
        items: lines.iter().map(line_request).collect(),
    };
    match create_client_order(state, payload).await {
        Ok(created) => Ok(created),
        Err(err) => {
            if let Err(restore_err) = state.carts.restore(table_id, lines).await {
                tracing::error!(table_id = %table_id, error = %restore_err, "order failed and cart lines were lost");
            }
            Err(err)
        }
    }
}

fn line_request(line: &CartLine) -> OrderLineRequest {
    OrderLineRequest {
        product_id: line.product_id,
        quantity: line.quantity,
        notes: Some(line.notes.clone()).filter(|n| !n.is_empty()),
    }
}

/// Items of the table's running bill: every non-cancelled order of the
/// current session.
pub async fn active_order_items(
    state: &AppState,
    table_id: Uuid,
) -> AppResult<ApiResponse<Vec<SessionItem>>> {
    let table = DiningTables::find_by_id(table_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let Some(session_id) = table.current_session_id else {
        return Ok(ApiResponse::list("No active session", Vec::new()));
    };

    let order_ids: Vec<Uuid> = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::SessionId.eq(session_id))
                .add(OrderCol::Status.ne(OrderStatus::Cancelled.as_str())),
        )
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| o.id)
        .collect();

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .find_also_related(Products)
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, product)| {
            Ok(SessionItem {
                item: order_item_from_entity(item)?,
                product_name: product.as_ref().map(|p| p.name.clone()),
                product_price: product.map(|p| p.price),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::list("Ok", items))
}

pub async fn list_orders(state: &AppState, query: OrderListQuery) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(table_id) = query.table_id {
        condition = condition.add(OrderCol::TableId.eq(table_id));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = load_items(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "Ok",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn load_items<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect()
}

/// Mark an order paid. `updated_at` is the payment instant the cash summary
/// counts sales by.
pub async fn pay_order(
    state: &AppState,
    id: Uuid,
    staff_id: Option<Uuid>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    match order.status.parse::<OrderStatus>()? {
        OrderStatus::Paid => return Err(AppError::BadRequest("Order already paid".into())),
        OrderStatus::Cancelled => {
            return Err(AppError::BadRequest("Cancelled orders cannot be paid".into()));
        }
        _ => {}
    }

    let previous = order_from_entity(order.clone())?;
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Paid.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let items = load_items(&txn, order.id).await?;

    txn.commit().await?;

    let order = order_from_entity(order)?;
    state.feed.updated("orders", Some(&previous), &order);
    audit::record(
        &state.pool,
        staff_id,
        "order_paid",
        "orders",
        serde_json::json!({ "order_id": order.id, "amount": order.total_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment recorded",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn deliver_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let status: OrderStatus = existing.status.parse()?;
    if status != OrderStatus::Ready {
        return Err(AppError::BadRequest(format!(
            "Order is {status}, only ready orders can be delivered"
        )));
    }

    let previous = order_from_entity(existing.clone())?;
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Delivered.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = order_from_entity(active.update(&state.orm).await?)?;

    state.feed.updated("orders", Some(&previous), &order);
    Ok(ApiResponse::success("Order delivered", order, None))
}

pub fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        session_id: model.session_id,
        table_id: model.table_id,
        waiter_id: model.waiter_id,
        status: model.status.parse()?,
        priority: model.priority,
        estimated_total_time: model.estimated_total_time,
        total_amount: model.total_amount,
        kitchen_started_at: model.kitchen_started_at.map(|dt| dt.with_timezone(&Utc)),
        kitchen_finished_at: model.kitchen_finished_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub fn order_item_from_entity(model: OrderItemModel) -> AppResult<OrderItem> {
    Ok(OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        notes: model.notes,
        status: model.status.parse()?,
        started_at: model.started_at.map(|dt| dt.with_timezone(&Utc)),
        finished_at: model.finished_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_lines_drop_blank_notes() {
        let line = CartLine {
            product_id: Uuid::nil(),
            name: "Agua".into(),
            unit_price: 150,
            quantity: 2,
            notes: String::new(),
        };
        let req = line_request(&line);
        assert_eq!(req.quantity, 2);
        assert!(req.notes.is_none());
    }

    #[test]
    fn line_totals_accumulate_and_reject_overflow() {
        assert_eq!(add_line(1_000, 2_500, 2).unwrap(), 6_000);
        assert!(matches!(add_line(0, i64::MAX, 2), Err(AppError::BadRequest(_))));
        assert!(matches!(add_line(i64::MAX, 1, 1), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_status_column_is_an_error() {
        let now = Utc::now();
        let model = OrderModel {
            id: Uuid::nil(),
            session_id: None,
            table_id: Uuid::nil(),
            waiter_id: None,
            status: "shipped".into(),
            priority: 1,
            estimated_total_time: None,
            total_amount: 0,
            kitchen_started_at: None,
            kitchen_finished_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        assert!(matches!(order_from_entity(model), Err(AppError::CorruptRow(_))));
    }
}

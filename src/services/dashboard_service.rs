use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};

use crate::{
    dto::dashboard::Dashboard,
    entity::{
        cash_shifts::{Column as ShiftCol, Entity as CashShifts},
        dining_tables::{Column as TableCol, Entity as DiningTables},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::AppResult,
    models::{OrderStatus, ShiftStatus, TableStatus},
    response::ApiResponse,
    services::zone_service,
    state::AppState,
};

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub async fn dashboard(state: &AppState) -> AppResult<ApiResponse<Dashboard>> {
    let now = Utc::now();
    let floor = zone_service::load_stats(state).await?;

    let tables_waiting = DiningTables::find()
        .filter(TableCol::Status.eq(TableStatus::Waiting.as_str()))
        .count(&state.orm)
        .await? as usize;
    let tables_paying = DiningTables::find()
        .filter(TableCol::Status.eq(TableStatus::Paying.as_str()))
        .count(&state.orm)
        .await? as usize;

    let paid_today = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Status.eq(OrderStatus::Paid.as_str()))
                .add(OrderCol::UpdatedAt.gte(start_of_day(now))),
        )
        .all(&state.orm)
        .await?;

    let shift_open = CashShifts::find()
        .filter(ShiftCol::Status.eq(ShiftStatus::Open.as_str()))
        .count(&state.orm)
        .await?
        > 0;

    let dashboard = Dashboard {
        floor,
        tables_waiting,
        tables_paying,
        kitchen_orders: state.board.len(),
        kitchen_tiers: state.board.tiers(now),
        sales_today: paid_today.iter().map(|o| o.total_amount).sum(),
        paid_orders_today: paid_today.len() as u64,
        shift_open,
    };

    Ok(ApiResponse::success("Dashboard", dashboard, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_starts_at_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2026, 7, 9, 21, 45, 3).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2026, 7, 9, 0, 0, 0).unwrap()
        );
    }
}

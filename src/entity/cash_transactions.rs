use sea_orm::entity::prelude::*;

/// Append-only: rows are inserted, never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: String,
    pub amount: i64,
    pub description: String,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_shifts::Entity",
        from = "Column::ShiftId",
        to = "super::cash_shifts::Column::Id"
    )]
    CashShifts,
}

impl Related<super::cash_shifts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashShifts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

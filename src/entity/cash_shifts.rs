use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_shifts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub opened_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub base_amount: i64,
    pub final_cash_expected: Option<i64>,
    pub final_cash_real: Option<i64>,
    pub difference: Option<i64>,
    pub status: String,
    pub opened_by: Uuid,
    pub closed_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_transactions::Entity")]
    CashTransactions,
}

impl Related<super::cash_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

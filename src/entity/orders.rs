use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub table_id: Uuid,
    pub waiter_id: Option<Uuid>,
    pub status: String,
    pub priority: i32,
    pub estimated_total_time: Option<i32>,
    pub total_amount: i64,
    pub kitchen_started_at: Option<DateTimeWithTimeZone>,
    pub kitchen_finished_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_tables::Entity",
        from = "Column::TableId",
        to = "super::dining_tables::Column::Id"
    )]
    DiningTables,
    #[sea_orm(
        belongs_to = "super::table_sessions::Entity",
        from = "Column::SessionId",
        to = "super::table_sessions::Column::Id"
    )]
    TableSessions,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::dining_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTables.def()
    }
}

impl Related<super::table_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableSessions.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

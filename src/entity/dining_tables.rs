use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub zone_id: Option<Uuid>,
    pub number: String,
    pub status: String,
    pub capacity: i32,
    pub x_position: i32,
    pub y_position: i32,
    pub shape: Option<String>,
    pub qr_code: Option<String>,
    pub current_session_id: Option<Uuid>,
    pub current_session_start_time: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::zones::Entity",
        from = "Column::ZoneId",
        to = "super::zones::Column::Id"
    )]
    Zones,
    #[sea_orm(has_many = "super::table_sessions::Entity")]
    TableSessions,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::zones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Zones.def()
    }
}

impl Related<super::table_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableSessions.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

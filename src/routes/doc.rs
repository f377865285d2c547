use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartLine, CartTotals},
    cash::ShiftSummary,
    dto::{
        cart::{AddToCartRequest, CartView, SubmitCartRequest, UpdateCartLineRequest},
        cash::{AddTransactionRequest, CloseShiftRequest, ClosedShift, OpenShiftRequest},
        dashboard::Dashboard,
        kitchen::{ArchiveResult, StationQuery, UpdateItemStatusRequest},
        orders::{CreateOrderRequest, OrderLineRequest, OrderList, OrderWithItems, PayOrderRequest, SessionItem},
        products::{
            CreateCategoryRequest, CreateProductRequest, CreateStationRequest, ProductList,
            UpdateProductRequest,
        },
        tables::{
            ChangeTableStatusRequest, CreateTableRequest, CreateZoneRequest, OccupyTableRequest,
            TableBoardEntry, TableWithSession, UpdateTableRequest, UpdateZoneRequest, ZoneStats,
            ZoneWithTables,
        },
    },
    kitchen::{CategoryRef, KitchenItem, KitchenOrder, KitchenOrderView, Priority, ProductRef, board::TierCounts},
    lifecycle::TableEvent,
    models::{
        CashShift, CashTransaction, Category, DiningTable, ItemStatus, Order, OrderItem,
        OrderStatus, Product, SessionStatus, ShiftStatus, Station, TableSession, TableStatus,
        TransactionKind, Zone,
    },
    realtime::{ChangeEvent, ChangeKind},
    response::{ApiResponse, Meta},
    routes::{cash, catalog, dashboard, health, kitchen, orders, params, products, realtime, tables, zones},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        catalog::list_stations,
        catalog::create_station,
        catalog::rename_station,
        catalog::delete_station,
        catalog::list_categories,
        catalog::create_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::upload_image,
        zones::list_zones,
        zones::zone_stats,
        zones::create_zone,
        zones::update_zone,
        zones::delete_zone,
        tables::list_tables,
        tables::get_table,
        tables::create_table,
        tables::update_table,
        tables::delete_table,
        tables::occupy_table,
        tables::free_table,
        tables::change_status,
        tables::session_items,
        tables::get_cart,
        tables::add_to_cart,
        tables::clear_cart,
        tables::update_cart_line,
        tables::remove_cart_line,
        tables::submit_cart,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::pay_order,
        orders::deliver_order,
        kitchen::board,
        kitchen::start_preparation,
        kitchen::complete_order,
        kitchen::mark_station_ready,
        kitchen::update_item_status,
        kitchen::toggle_item,
        kitchen::archive_all,
        cash::current_shift,
        cash::open_shift,
        cash::list_transactions,
        cash::add_transaction,
        cash::shift_summary,
        cash::close_shift,
        dashboard::dashboard,
        realtime::subscribe
    ),
    components(
        schemas(
            Station,
            Category,
            Product,
            Zone,
            DiningTable,
            TableSession,
            Order,
            OrderItem,
            CashShift,
            CashTransaction,
            OrderStatus,
            ItemStatus,
            TableStatus,
            SessionStatus,
            ShiftStatus,
            TransactionKind,
            TableEvent,
            CartLine,
            CartTotals,
            CartView,
            AddToCartRequest,
            UpdateCartLineRequest,
            SubmitCartRequest,
            CreateOrderRequest,
            OrderLineRequest,
            PayOrderRequest,
            OrderList,
            OrderWithItems,
            SessionItem,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateStationRequest,
            CreateCategoryRequest,
            CreateTableRequest,
            UpdateTableRequest,
            OccupyTableRequest,
            ChangeTableStatusRequest,
            TableWithSession,
            TableBoardEntry,
            CreateZoneRequest,
            UpdateZoneRequest,
            ZoneWithTables,
            ZoneStats,
            StationQuery,
            UpdateItemStatusRequest,
            ArchiveResult,
            CategoryRef,
            ProductRef,
            KitchenItem,
            KitchenOrder,
            KitchenOrderView,
            Priority,
            TierCounts,
            OpenShiftRequest,
            CloseShiftRequest,
            AddTransactionRequest,
            ClosedShift,
            ShiftSummary,
            Dashboard,
            ChangeEvent,
            ChangeKind,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<TableWithSession>,
            ApiResponse<ShiftSummary>,
            ApiResponse<Dashboard>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Stations and categories"),
        (name = "Products", description = "Product endpoints"),
        (name = "Zones", description = "Floor zones"),
        (name = "Tables", description = "Tables and seating sessions"),
        (name = "Cart", description = "Per-table carts for QR ordering"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Kitchen", description = "Kitchen display board"),
        (name = "Cash", description = "Cash shifts and movements"),
        (name = "Dashboard", description = "Overview counts"),
        (name = "Realtime", description = "Server-sent change streams"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

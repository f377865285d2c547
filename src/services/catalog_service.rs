use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CreateCategoryRequest, CreateProductRequest, CreateStationRequest, ProductList,
        UpdateProductRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
        stations::{ActiveModel as StationActive, Column as StationCol, Entity as Stations, Model as StationModel},
    },
    error::{AppError, AppResult},
    models::{Category, Product, Station},
    response::ApiResponse,
    routes::params::ProductQuery,
    state::AppState,
};

/// Bucket product photos are uploaded to.
pub const PRODUCT_IMAGES: &str = "products";

fn required(name: &str, what: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(format!("{what} name is required")));
    }
    Ok(name.to_string())
}

// ---- stations ----

pub async fn list_stations(state: &AppState) -> AppResult<ApiResponse<Vec<Station>>> {
    let stations = Stations::find()
        .order_by_asc(StationCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(station_from_entity)
        .collect();
    Ok(ApiResponse::list("Stations", stations))
}

pub async fn create_station(
    state: &AppState,
    payload: CreateStationRequest,
) -> AppResult<ApiResponse<Station>> {
    let name = required(&payload.name, "Station")?;
    if Stations::find()
        .filter(StationCol::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!("Station {name} already exists")));
    }

    let station = StationActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let station = station_from_entity(station);
    state.feed.inserted("stations", &station);
    Ok(ApiResponse::success("Station created", station, None))
}

pub async fn rename_station(
    state: &AppState,
    id: Uuid,
    payload: CreateStationRequest,
) -> AppResult<ApiResponse<Station>> {
    let name = required(&payload.name, "Station")?;
    let existing = Stations::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: StationActive = existing.into();
    active.name = Set(name);
    let station = station_from_entity(active.update(&state.orm).await?);
    state.feed.updated("stations", None, &station);
    Ok(ApiResponse::success("Station updated", station, None))
}

/// Categories routed to a deleted station fall back to "no station".
pub async fn delete_station(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Station>> {
    let existing = Stations::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Stations::delete_by_id(id).exec(&state.orm).await?;

    state.feed.deleted("stations", serde_json::json!({ "id": id }));
    Ok(ApiResponse::success(
        "Station deleted",
        station_from_entity(existing),
        None,
    ))
}

// ---- categories ----

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = Categories::find()
        .filter(CategoryCol::Active.eq(true))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::list("Categories", categories))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let name = required(&payload.name, "Category")?;
    if let Some(station_id) = payload.station_id {
        Stations::find_by_id(station_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown station {station_id}")))?;
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        icon: Set(payload.icon.filter(|i| !i.trim().is_empty())),
        active: Set(true),
        station_id: Set(payload.station_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let category = category_from_entity(category);
    state.feed.inserted("categories", &category);
    Ok(ApiResponse::success("Category created", category, None))
}

// ---- products ----

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all();
    if let Some(category_id) = query.category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::col(ProdCol::Name).ilike(format!("%{}%", search.trim())));
    }

    let items: Vec<Product> = Products::find()
        .filter(condition)
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = crate::response::Meta::total(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", product_from_entity(product), None))
}

/// An empty `category_id` is read as "uncategorised".
fn parse_category(raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid category id '{id}'"))),
    }
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = required(&payload.name, "Product")?;
    if payload.price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    let category_id = parse_category(payload.category_id.as_deref())?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        cost: Set(payload.cost),
        stock: Set(payload.stock.unwrap_or_default()),
        is_available: Set(payload.is_available.unwrap_or(true)),
        prep_time_minutes: Set(payload.prep_time_minutes.unwrap_or(10).max(0)),
        image_url: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    let product = product_from_entity(product);
    state.feed.inserted("products", &product);
    audit::record(
        &state.pool,
        None,
        "product_created",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success("Product created", product, None))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: ProductActive = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(required(&name, "Product")?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(cost) = payload.cost {
        active.cost = Set(Some(cost));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(available) = payload.is_available {
        active.is_available = Set(available);
    }
    if let Some(minutes) = payload.prep_time_minutes {
        active.prep_time_minutes = Set(minutes.max(0));
    }

    let product = product_from_entity(active.update(&state.orm).await?);
    state.feed.updated("products", None, &product);
    Ok(ApiResponse::success("Product updated", product, None))
}

pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(format!(
            "{} appears on {ordered} order items; mark it unavailable instead",
            existing.name
        )));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    state.feed.deleted("products", serde_json::json!({ "id": id }));
    audit::record(
        &state.pool,
        None,
        "product_deleted",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        product_from_entity(existing),
        None,
    ))
}

/// Store the photo in the public bucket and point the product at it.
pub async fn upload_image(
    state: &AppState,
    id: Uuid,
    file_name: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let path = state.blobs.upload(PRODUCT_IMAGES, file_name, bytes).await?;
    let url = state.blobs.public_url(PRODUCT_IMAGES, &path);

    let mut active: ProductActive = existing.into();
    active.image_url = Set(Some(url));
    let product = product_from_entity(active.update(&state.orm).await?);
    state.feed.updated("products", None, &product);

    Ok(ApiResponse::success("Image uploaded", product, None))
}

fn station_from_entity(model: StationModel) -> Station {
    Station {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        icon: model.icon,
        active: model.active,
        station_id: model.station_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        cost: model.cost,
        stock: model.stock,
        is_available: model.is_available,
        prep_time_minutes: model.prep_time_minutes,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_means_uncategorised() {
        assert_eq!(parse_category(None).unwrap(), None);
        assert_eq!(parse_category(Some("  ")).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_category(Some(&id.to_string())).unwrap(), Some(id));
        assert!(matches!(
            parse_category(Some("drinks")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(required("  Bar ", "Station").unwrap(), "Bar");
        assert!(required("   ", "Station").is_err());
    }
}

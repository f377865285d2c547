use std::sync::Arc;

use crate::{
    cart::CartStore,
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn, create_pool},
    kitchen::KitchenBoard,
    realtime::ChangeFeed,
    storage::BlobStore,
};

/// Shared handles injected into every handler and service.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub feed: ChangeFeed,
    pub blobs: BlobStore,
    pub carts: CartStore,
    pub board: KitchenBoard,
}

impl AppState {
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url).await?;
        let orm = create_orm_conn(&config.database_url).await?;
        Ok(Self::from_parts(pool, orm, config).await)
    }

    pub async fn from_parts(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let carts = CartStore::open(config.cart_store_path.clone()).await;
        let blobs = BlobStore::new(config.storage_dir.clone(), config.public_base_url.clone());
        Self {
            pool,
            orm,
            config: Arc::new(config),
            feed: ChangeFeed::default(),
            blobs,
            carts,
            board: KitchenBoard::default(),
        }
    }
}

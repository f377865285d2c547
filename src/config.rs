use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Origin used to build QR-code links and public blob URLs.
    pub public_base_url: String,
    pub storage_dir: PathBuf,
    pub cart_store_path: PathBuf,
    pub kitchen_resort_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));
        let storage_dir = env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));
        let cart_store_path = env::var("CART_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| storage_dir.join("carts.json"));
        let resort_secs = env::var("KITCHEN_RESORT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(30);
        Ok(Self {
            port,
            database_url,
            host,
            public_base_url,
            storage_dir,
            cart_store_path,
            kitchen_resort_interval: Duration::from_secs(resort_secs),
        })
    }

    /// Link printed on a table's QR code, opening the customer menu for that table.
    pub fn table_menu_url(&self, table_id: uuid::Uuid) -> String {
        format!(
            "{}/client/menu/{}",
            self.public_base_url.trim_end_matches('/'),
            table_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_url_has_no_double_slash() {
        let config = AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 3000,
            public_base_url: "https://pos.example.com/".into(),
            storage_dir: PathBuf::from("storage"),
            cart_store_path: PathBuf::from("storage/carts.json"),
            kitchen_resort_interval: Duration::from_secs(30),
        };
        let id = uuid::Uuid::nil();
        assert_eq!(
            config.table_menu_url(id),
            format!("https://pos.example.com/client/menu/{id}")
        );
    }
}

//! Per-table shopping carts for the QR ordering flow, persisted to a JSON
//! file keyed by table id so they survive restarts.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartTotals {
    pub items: i64,
    pub price: i64,
}

pub fn totals(lines: &[CartLine]) -> CartTotals {
    lines.iter().fold(CartTotals { items: 0, price: 0 }, |acc, line| CartTotals {
        items: acc.items + i64::from(line.quantity),
        price: acc.price + line.unit_price * i64::from(line.quantity),
    })
}

type Carts = HashMap<String, Vec<CartLine>>;

#[derive(Clone)]
pub struct CartStore {
    path: PathBuf,
    carts: Arc<Mutex<Carts>>,
}

impl CartStore {
    /// Load carts from `path`. A missing file starts empty; an unreadable one
    /// is logged and also starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let carts = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Carts>(&bytes).unwrap_or_else(|err| {
                tracing::error!(path = %path.display(), error = %err, "cart store corrupt, starting empty");
                Carts::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Carts::new(),
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "cart store unreadable, starting empty");
                Carts::new()
            }
        };
        Self {
            path,
            carts: Arc::new(Mutex::new(carts)),
        }
    }

    pub async fn cart(&self, table_id: Uuid) -> Vec<CartLine> {
        let carts = self.carts.lock().await;
        carts.get(&table_id.to_string()).cloned().unwrap_or_default()
    }

    /// Add a line, merging into an existing one with the same product and notes.
    pub async fn add(&self, table_id: Uuid, line: CartLine) -> AppResult<Vec<CartLine>> {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be positive".into()));
        }
        self.mutate(table_id, |lines| {
            match lines
                .iter_mut()
                .find(|l| l.product_id == line.product_id && l.notes == line.notes)
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or_else(|| AppError::BadRequest("quantity too large".into()))?;
                }
                None => lines.push(line),
            }
            Ok(())
        })
        .await
    }

    pub async fn remove(&self, table_id: Uuid, index: usize) -> AppResult<Vec<CartLine>> {
        self.mutate(table_id, |lines| {
            if index >= lines.len() {
                return Err(AppError::NotFound);
            }
            lines.remove(index);
            Ok(())
        })
        .await
    }

    /// Set a line's quantity; zero or less removes it.
    pub async fn update_quantity(
        &self,
        table_id: Uuid,
        index: usize,
        quantity: i32,
    ) -> AppResult<Vec<CartLine>> {
        self.mutate(table_id, |lines| {
            if index >= lines.len() {
                return Err(AppError::NotFound);
            }
            if quantity <= 0 {
                lines.remove(index);
            } else {
                lines[index].quantity = quantity;
            }
            Ok(())
        })
        .await
    }

    pub async fn clear(&self, table_id: Uuid) -> AppResult<()> {
        self.mutate(table_id, |lines| {
            lines.clear();
            Ok(())
        })
        .await
        .map(|_| ())
    }

    /// Empty the cart and hand back what it held, so two submits for the same
    /// table cannot both order the same lines.
    pub async fn take(&self, table_id: Uuid) -> AppResult<Vec<CartLine>> {
        let mut taken = Vec::new();
        self.mutate(table_id, |lines| {
            taken = std::mem::take(lines);
            Ok(())
        })
        .await?;
        Ok(taken)
    }

    /// Put lines from a failed submit back ahead of anything added since.
    pub async fn restore(&self, table_id: Uuid, taken: Vec<CartLine>) -> AppResult<Vec<CartLine>> {
        self.mutate(table_id, |lines| {
            let added = std::mem::replace(lines, taken);
            lines.extend(added);
            Ok(())
        })
        .await
    }

    /// Apply `change` to one table's lines. The file is written first; memory
    /// only changes once it is on disk.
    async fn mutate(
        &self,
        table_id: Uuid,
        change: impl FnOnce(&mut Vec<CartLine>) -> AppResult<()>,
    ) -> AppResult<Vec<CartLine>> {
        let mut carts = self.carts.lock().await;
        let key = table_id.to_string();
        let mut lines = carts.get(&key).cloned().unwrap_or_default();
        change(&mut lines)?;

        let mut next = carts.clone();
        if lines.is_empty() {
            next.remove(&key);
        } else {
            next.insert(key, lines.clone());
        }
        persist(&self.path, &next).await?;
        *carts = next;
        Ok(lines)
    }
}

async fn persist(path: &Path, carts: &Carts) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec(carts).map_err(anyhow::Error::from)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, quantity: i32, notes: &str) -> CartLine {
        CartLine {
            product_id,
            name: "Tacos".into(),
            unit_price: 300,
            quantity,
            notes: notes.into(),
        }
    }

    #[tokio::test]
    async fn same_product_and_notes_merge() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::open(dir.path().join("carts.json")).await;
        let table = Uuid::new_v4();
        let tacos = Uuid::new_v4();

        store.add(table, line(tacos, 1, "")).await.unwrap();
        store.add(table, line(tacos, 2, "")).await.unwrap();
        let lines = store.add(table, line(tacos, 1, "no onion")).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(totals(&lines), CartTotals { items: 4, price: 1200 });
    }

    #[tokio::test]
    async fn carts_are_isolated_per_table_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("carts.json");
        let store = CartStore::open(&path).await;
        let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());

        store.add(t1, line(Uuid::new_v4(), 2, "")).await.unwrap();
        assert!(store.cart(t2).await.is_empty());

        let reopened = CartStore::open(&path).await;
        assert_eq!(reopened.cart(t1).await.len(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_removes_and_bad_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::open(dir.path().join("carts.json")).await;
        let table = Uuid::new_v4();
        store.add(table, line(Uuid::new_v4(), 2, "")).await.unwrap();

        let lines = store.update_quantity(table, 0, 0).await.unwrap();
        assert!(lines.is_empty());
        assert!(matches!(store.remove(table, 0).await, Err(AppError::NotFound)));
        assert!(matches!(
            store.add(table, line(Uuid::new_v4(), 0, "")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn failed_write_leaves_cart_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        tokio::fs::write(&blocker, b"").await.unwrap();
        let store = CartStore::open(blocker.join("carts.json")).await;
        let table = Uuid::new_v4();

        assert!(store.add(table, line(Uuid::new_v4(), 1, "")).await.is_err());
        assert!(store.cart(table).await.is_empty());
    }

    #[tokio::test]
    async fn merging_past_i32_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::open(dir.path().join("carts.json")).await;
        let table = Uuid::new_v4();
        let tacos = Uuid::new_v4();

        store.add(table, line(tacos, i32::MAX, "")).await.unwrap();
        assert!(matches!(
            store.add(table, line(tacos, 1, "")).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(store.cart(table).await[0].quantity, i32::MAX);
    }

    #[tokio::test]
    async fn take_empties_and_restore_puts_lines_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::open(dir.path().join("carts.json")).await;
        let table = Uuid::new_v4();
        let (tacos, beer) = (Uuid::new_v4(), Uuid::new_v4());
        store.add(table, line(tacos, 2, "")).await.unwrap();

        let taken = store.take(table).await.unwrap();
        assert_eq!(taken.len(), 1);
        assert!(store.take(table).await.unwrap().is_empty());

        store.add(table, line(beer, 1, "")).await.unwrap();
        let lines = store.restore(table, taken).await.unwrap();
        assert_eq!(
            lines.iter().map(|l| l.product_id).collect::<Vec<_>>(),
            vec![tacos, beer]
        );
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carts.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let store = CartStore::open(&path).await;
        assert!(store.cart(Uuid::new_v4()).await.is_empty());
    }
}

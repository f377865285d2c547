//! Apply a change to a cached value before the backing write confirms, and
//! undo it if the write fails.
//!
//! The change hands back its own undo instead of the cache being snapshotted,
//! so anything else written to the cache while the write is pending survives
//! a rollback.

use std::future::Future;

use parking_lot::RwLock;

/// Guard over a tentative change. Dropping it without [`Tentative::commit`]
/// runs the undo returned by the change.
#[must_use = "dropping a Tentative immediately rolls the change back"]
pub struct Tentative<'a, T, U>
where
    U: FnOnce(&mut T),
{
    cache: &'a RwLock<T>,
    undo: Option<U>,
}

impl<'a, T, U> Tentative<'a, T, U>
where
    U: FnOnce(&mut T),
{
    pub fn begin(cache: &'a RwLock<T>, change: impl FnOnce(&mut T) -> U) -> Self {
        let undo = change(&mut *cache.write());
        Self {
            cache,
            undo: Some(undo),
        }
    }

    pub fn commit(mut self) {
        self.undo = None;
    }

    pub fn rollback(self) {
        drop(self);
    }
}

impl<T, U> Drop for Tentative<'_, T, U>
where
    U: FnOnce(&mut T),
{
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            undo(&mut *self.cache.write());
        }
    }
}

/// Apply `change` to `cache`, await `write`, and keep the change only if the
/// write succeeds. `change` returns the closure that reverts it.
pub async fn with_tentative<T, U, R, E, F>(
    cache: &RwLock<T>,
    change: impl FnOnce(&mut T) -> U,
    write: F,
) -> Result<R, E>
where
    U: FnOnce(&mut T),
    F: Future<Output = Result<R, E>>,
{
    let pending = Tentative::begin(cache, change);
    match write.await {
        Ok(value) => {
            pending.commit();
            Ok(value)
        }
        Err(err) => {
            pending.rollback();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(n: u32) -> impl FnOnce(&mut Vec<u32>) -> Box<dyn FnOnce(&mut Vec<u32>)> {
        move |v: &mut Vec<u32>| -> Box<dyn FnOnce(&mut Vec<u32>)> {
            v.push(n);
            Box::new(move |v: &mut Vec<u32>| v.retain(|x| *x != n))
        }
    }

    #[test]
    fn commit_keeps_the_change() {
        let cache = RwLock::new(vec![1, 2]);
        Tentative::begin(&cache, push(3)).commit();
        assert_eq!(*cache.read(), vec![1, 2, 3]);
    }

    #[test]
    fn drop_runs_the_undo() {
        let cache = RwLock::new(vec![1]);
        {
            let _pending = Tentative::begin(&cache, push(2));
            assert_eq!(*cache.read(), vec![1, 2]);
        }
        assert_eq!(*cache.read(), vec![1]);
    }

    #[tokio::test]
    async fn failed_write_reverts() {
        let cache = RwLock::new(vec![1]);
        let result: Result<(), &str> =
            with_tentative(&cache, push(2), async { Err("backend down") }).await;
        assert_eq!(result, Err("backend down"));
        assert_eq!(*cache.read(), vec![1]);
    }

    #[tokio::test]
    async fn successful_write_is_kept() {
        let cache = RwLock::new(vec![1]);
        let result: Result<u32, &str> = with_tentative(&cache, push(2), async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(*cache.read(), vec![1, 2]);
    }

    #[tokio::test]
    async fn rollback_keeps_writes_made_while_pending() {
        let cache = RwLock::new(vec![1]);
        let result: Result<(), &str> = with_tentative(&cache, push(2), async {
            *cache.write() = vec![1, 2, 9];
            Err("backend down")
        })
        .await;
        assert!(result.is_err());
        assert_eq!(*cache.read(), vec![1, 9]);
    }
}

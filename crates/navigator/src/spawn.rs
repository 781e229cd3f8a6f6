use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};

/// Spawns navigator tasks onto the current tokio `LocalSet`
///
/// Must be used from inside `LocalSet::run_until` (or a task spawned on a
/// local set); tokio panics otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLocalSpawner;

impl LocalSpawn for TokioLocalSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::task::spawn_local(future);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_spawns_onto_local_set() {
        let ran = Rc::new(Cell::new(false));
        let local = tokio::task::LocalSet::new();

        let flag = Rc::clone(&ran);
        local
            .run_until(async move {
                TokioLocalSpawner
                    .spawn_local(async move { flag.set(true) })
                    .unwrap();
                tokio::task::yield_now().await;
            })
            .await;
        local.await;

        assert!(ran.get());
    }
}

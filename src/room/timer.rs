use futures::future::BoxFuture;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The single pending phase timer of a room.
///
/// Every arm or cancel bumps the generation. A firing task reports the
/// generation it was armed with and is ignored unless it is still current,
/// which covers a task that woke up just before being cancelled.
#[derive(Debug, Default)]
pub struct PhaseTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl PhaseTimer {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Replaces any pending timer. `on_fire` receives the new generation and
    /// builds the future to run once `after` has elapsed.
    pub fn arm<F>(&mut self, after: Duration, on_fire: F)
    where
        F: FnOnce(u64) -> BoxFuture<'static, ()>,
    {
        self.cancel();
        let fire = on_fire(self.generation);
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            fire.await;
        }));
    }

    /// Claims the firing for `generation`. The handle is released without
    /// aborting, since the caller is running inside that task.
    pub fn disarm(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.handle.is_none() {
            return false;
        }
        self.handle = None;
        true
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

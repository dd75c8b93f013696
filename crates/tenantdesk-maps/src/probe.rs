//! Waiting for a render target to exist before the map is drawn into it.

use std::time::Duration;

use tokio::sync::watch;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// A named place the map can be drawn into.
pub trait RenderContainer: Send + Sync {
    fn id(&self) -> &str;

    fn is_mounted(&self) -> bool;

    /// Mount notifications, for containers that can push them. Containers
    /// returning `None` are polled.
    fn mount_signal(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// Container that announces mount and unmount through a watch channel.
#[derive(Debug)]
pub struct ContainerSlot {
    id: String,
    tx: watch::Sender<bool>,
}

impl ContainerSlot {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { id: id.into(), tx }
    }

    #[must_use]
    pub fn mounted(id: impl Into<String>) -> Self {
        let slot = Self::new(id);
        slot.mount();
        slot
    }

    pub fn mount(&self) {
        self.tx.send_replace(true);
    }

    pub fn unmount(&self) {
        self.tx.send_replace(false);
    }
}

impl RenderContainer for ContainerSlot {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_mounted(&self) -> bool {
        *self.tx.borrow()
    }

    fn mount_signal(&self) -> Option<watch::Receiver<bool>> {
        Some(self.tx.subscribe())
    }
}

/// Container whose presence can only be checked, never awaited.
pub struct PolledContainer<F> {
    id: String,
    check: F,
}

impl<F> PolledContainer<F>
where
    F: Fn() -> bool + Send + Sync,
{
    pub fn new(id: impl Into<String>, check: F) -> Self {
        Self {
            id: id.into(),
            check,
        }
    }
}

impl<F> RenderContainer for PolledContainer<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn is_mounted(&self) -> bool {
        (self.check)()
    }
}

/// Bounded wait for a [`RenderContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    max_attempts: u32,
    interval: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL)
    }
}

impl ReadinessProbe {
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` once the container is mounted, `false` when the
    /// attempt budget runs out. Exhaustion is not an error.
    pub async fn wait(&self, container: &dyn RenderContainer) -> bool {
        if self.max_attempts == 0 {
            return false;
        }
        match container.mount_signal() {
            Some(rx) => self.wait_for_signal(container.id(), rx).await,
            None => self.poll(container).await,
        }
    }

    /// Total time a mount notification is awaited: the whole attempt budget.
    #[must_use]
    pub fn signal_budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }

    async fn wait_for_signal(&self, id: &str, mut rx: watch::Receiver<bool>) -> bool {
        let budget = self.signal_budget();
        tracing::debug!(
            container = id,
            attempt = 1,
            max_attempts = self.max_attempts,
            budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
            "awaiting map container mount"
        );
        match tokio::time::timeout(budget, rx.wait_for(|mounted| *mounted)).await {
            Ok(Ok(_)) => {
                tracing::debug!(container = id, "container mounted");
                true
            }
            Ok(Err(_)) => {
                tracing::debug!(container = id, "container dropped before mounting");
                false
            }
            Err(_) => {
                tracing::debug!(
                    container = id,
                    budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                    "container not mounted within budget"
                );
                false
            }
        }
    }

    async fn poll(&self, container: &dyn RenderContainer) -> bool {
        for attempt in 1..=self.max_attempts {
            tracing::debug!(
                container = container.id(),
                attempt,
                max_attempts = self.max_attempts,
                "checking map container"
            );
            if container.is_mounted() {
                return true;
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        tracing::debug!(
            container = container.id(),
            max_attempts = self.max_attempts,
            "map container never appeared"
        );
        false
    }
}

// ── Hub abstraction ──
//
// The entry point for consumers. Mutations and refreshes go through the
// serialized request queue; plain reads go straight to the hub.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use powerview_api::{HubClient, TransportConfig};

use crate::config::HubConfig;
use crate::dispatcher::QueueHandle;
use crate::error::CoreError;
use crate::model::{Motion, PositionKind, Shade, ShadeId, UserData, position_from_percent};
use crate::queue::Update;

/// Handle to one PowerView hub.
///
/// Cheaply cloneable via `Arc<HubInner>`; every clone shares the same request
/// queue, so at most one mutation is ever outstanding per hub.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    config: HubConfig,
    client: HubClient,
    queue: QueueHandle,
}

impl Hub {
    /// Build the HTTP client and start the request queue.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = HubClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Start a hub around a pre-built client.
    pub fn with_client(config: HubConfig, client: HubClient) -> Self {
        let queue = QueueHandle::spawn(client.clone(), config.timing);
        debug!(url = %config.url, "hub request queue started");

        Self {
            inner: Arc::new(HubInner {
                config,
                client,
                queue,
            }),
        }
    }

    /// Access the hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    // ── Queued operations ────────────────────────────────────────

    /// Move one axis of a shade to a raw hub position (0..=65535).
    ///
    /// Merges with any not-yet-sent position update for the same shade.
    pub async fn set_position(
        &self,
        id: ShadeId,
        kind: PositionKind,
        value: u16,
        user_initiated: bool,
    ) -> Result<Shade, CoreError> {
        self.inner
            .queue
            .submit(
                id,
                Update::Position {
                    kind,
                    value,
                    user_initiated,
                },
            )
            .await
    }

    /// Move one axis of a shade to a percentage (0..=100).
    pub async fn set_position_percent(
        &self,
        id: ShadeId,
        kind: PositionKind,
        percent: u8,
        user_initiated: bool,
    ) -> Result<Shade, CoreError> {
        let value = position_from_percent(percent)?;
        self.set_position(id, kind, value, user_initiated).await
    }

    /// Send a motion command. Repeats of a queued command are answered together.
    pub async fn motion(&self, id: ShadeId, motion: Motion) -> Result<Shade, CoreError> {
        self.inner.queue.submit(id, Update::Motion(motion)).await
    }

    /// Briefly move the shade so it can be identified.
    pub async fn jog(&self, id: ShadeId) -> Result<Shade, CoreError> {
        self.motion(id, Motion::Jog).await
    }

    /// Re-learn the shade's travel limits.
    pub async fn calibrate(&self, id: ShadeId) -> Result<Shade, CoreError> {
        self.motion(id, Motion::Calibrate).await
    }

    /// Make the hub poll the shade and return fresh state.
    ///
    /// Queued like a mutation: the hub is unstable under concurrent refreshes.
    pub async fn refresh_shade(&self, id: ShadeId) -> Result<Shade, CoreError> {
        self.inner.queue.submit(id, Update::Refresh).await
    }

    // ── Unqueued reads ───────────────────────────────────────────

    /// List every shade, as last known by the hub.
    pub async fn shades(&self) -> Result<Vec<Shade>, CoreError> {
        let response = self
            .inner
            .client
            .get_shades()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list shades"))?;
        Ok(response.shade_data.into_iter().map(Shade::from).collect())
    }

    /// Fetch one shade as last known by the hub, without a refresh.
    pub async fn shade(&self, id: ShadeId) -> Result<Shade, CoreError> {
        let shade = self
            .inner
            .client
            .get_shade(id, false)
            .await
            .inspect_err(|e| warn!(shade = %id, error = %e, "failed to get shade"))?;
        Ok(Shade::from(shade))
    }

    /// Fetch hub identity and account information.
    pub async fn user_data(&self) -> Result<UserData, CoreError> {
        let user_data = self
            .inner
            .client
            .get_user_data()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to get hub user data"))?;
        Ok(user_data)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Stop the request queue. See [`QueueHandle::shutdown`].
    pub async fn shutdown(&self) {
        self.inner.queue.shutdown().await;
    }

    /// One-shot: start a hub, run the closure, shut the queue down.
    pub async fn oneshot<F, Fut, T>(config: HubConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Hub) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let hub = Hub::new(config)?;
        let result = f(hub.clone()).await;
        hub.shutdown().await;
        result
    }
}

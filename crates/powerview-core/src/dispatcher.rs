// ── Dispatch scheduler ──
//
// A single background task owns the `RequestQueue`. Callers hand it updates
// over an mpsc channel together with a oneshot reply channel; the task merges
// them, paces dispatches, keeps at most one hub request outstanding and fans
// each result out to every waiter of the completed entry.
//
//   Empty ──enqueue──▶ Scheduled(initial delay) ──timer──▶ Dispatching
//     ▲                      ▲                                 │
//     └──── queue empty ─────┴──── queue non-empty (interval) ─┘

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use powerview_api::{HubClient, ShadeUpdate};

use crate::config::DispatchTiming;
use crate::error::CoreError;
use crate::model::{Shade, ShadeId};
use crate::queue::{Dispatch, HubRequest, RequestQueue, Update};

const QUEUE_CHANNEL_SIZE: usize = 64;

type Reply = Result<Shade, CoreError>;
type Waiter = oneshot::Sender<Reply>;

// ── Transport seam ───────────────────────────────────────────────

/// The HTTP capability the scheduler sends queued requests through.
///
/// Implemented by [`HubClient`]; tests substitute their own.
pub trait HubTransport: Clone + Send + Sync + 'static {
    /// `PUT /home/shades/{id}` with `update`.
    fn put_shade(
        &self,
        id: ShadeId,
        update: &ShadeUpdate,
    ) -> impl Future<Output = Result<powerview_api::Shade, powerview_api::Error>> + Send;

    /// `GET /home/shades/{id}?refresh=true`.
    fn refresh_shade(
        &self,
        id: ShadeId,
    ) -> impl Future<Output = Result<powerview_api::Shade, powerview_api::Error>> + Send;
}

impl HubTransport for HubClient {
    fn put_shade(
        &self,
        id: ShadeId,
        update: &ShadeUpdate,
    ) -> impl Future<Output = Result<powerview_api::Shade, powerview_api::Error>> + Send {
        HubClient::put_shade(self, id, update)
    }

    fn refresh_shade(
        &self,
        id: ShadeId,
    ) -> impl Future<Output = Result<powerview_api::Shade, powerview_api::Error>> + Send {
        self.get_shade(id, true)
    }
}

// ── Queue handle ─────────────────────────────────────────────────

/// An update sent to the scheduler, with the channel its result goes back on.
struct QueueEnvelope {
    target: ShadeId,
    update: Update,
    response_tx: Waiter,
}

/// Cheaply cloneable handle to a running scheduler task.
#[derive(Clone)]
pub struct QueueHandle {
    inner: Arc<QueueHandleInner>,
}

struct QueueHandleInner {
    tx: mpsc::Sender<QueueEnvelope>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl QueueHandle {
    /// Spawn the scheduler task. Must be called from within a Tokio runtime.
    pub fn spawn<T: HubTransport>(transport: T, timing: DispatchTiming) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(scheduler_task(transport, timing, rx, cancel.clone()));

        Self {
            inner: Arc::new(QueueHandleInner {
                tx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    /// Queue an update and wait for the hub's answer to the (possibly merged)
    /// request that carried it.
    pub async fn submit(&self, target: ShadeId, update: Update) -> Result<Shade, CoreError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.inner
            .tx
            .send(QueueEnvelope {
                target,
                update,
                response_tx,
            })
            .await
            .map_err(|_| CoreError::HubShutdown)?;

        response_rx.await.map_err(|_| CoreError::HubShutdown)?
    }

    /// Stop the scheduler.
    ///
    /// A request already sent to the hub finishes and its waiters get the
    /// result; everything still queued resolves with [`CoreError::HubShutdown`].
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        if let Some(task) = self.inner.task.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "queue scheduler task ended abnormally");
            }
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

// ── Scheduler task ───────────────────────────────────────────────

enum DispatchState {
    /// Nothing queued, no timer armed.
    Empty,
    /// Timer armed; the head is sent at the deadline.
    Scheduled(Instant),
    /// The head's hub request is outstanding.
    Dispatching(JoinHandle<Reply>),
}

async fn scheduler_task<T: HubTransport>(
    transport: T,
    timing: DispatchTiming,
    mut rx: mpsc::Receiver<QueueEnvelope>,
    cancel: CancellationToken,
) {
    let mut queue: RequestQueue<Waiter> = RequestQueue::new();
    let mut state = DispatchState::Empty;
    // Every handle is gone; drain what is queued, then stop.
    let mut closed = false;

    loop {
        state = match state {
            DispatchState::Empty => {
                if closed {
                    break;
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    envelope = rx.recv() => {
                        let Some(envelope) = envelope else { break };
                        accept(&mut queue, envelope);
                        DispatchState::Scheduled(Instant::now() + timing.initial_delay)
                    }
                }
            }

            DispatchState::Scheduled(deadline) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = sleep_until(deadline) => dispatch_head(&mut queue, &transport),
                    envelope = rx.recv(), if !closed => {
                        match envelope {
                            Some(envelope) => accept(&mut queue, envelope),
                            None => closed = true,
                        }
                        DispatchState::Scheduled(deadline)
                    }
                }
            }

            // Cancellation is not observed here: a sent request runs to completion.
            DispatchState::Dispatching(mut call) => {
                tokio::select! {
                    biased;
                    joined = &mut call => {
                        let reply = joined.unwrap_or_else(|e| {
                            Err(CoreError::Internal(format!("hub request task failed: {e}")))
                        });
                        finish_head(&mut queue, &reply);

                        if queue.is_empty() {
                            DispatchState::Empty
                        } else {
                            DispatchState::Scheduled(Instant::now() + timing.request_interval)
                        }
                    }
                    envelope = rx.recv(), if !closed => {
                        match envelope {
                            Some(envelope) => accept(&mut queue, envelope),
                            None => closed = true,
                        }
                        DispatchState::Dispatching(call)
                    }
                }
            }
        };
    }

    // Resolve everything left over so no caller waits forever.
    rx.close();
    while let Ok(envelope) = rx.try_recv() {
        let _ = envelope.response_tx.send(Err(CoreError::HubShutdown));
    }
    let leftover = queue.len();
    for entry in queue.drain() {
        notify(entry.into_waiters(), &Err(CoreError::HubShutdown));
    }
    debug!(leftover, "queue scheduler stopped");
}

fn accept(queue: &mut RequestQueue<Waiter>, envelope: QueueEnvelope) {
    queue.enqueue(envelope.target, envelope.update, envelope.response_tx);
}

/// Freeze the head entry and send it on a separate task.
fn dispatch_head<T: HubTransport>(
    queue: &mut RequestQueue<Waiter>,
    transport: &T,
) -> DispatchState {
    let Some(Dispatch { target, request }) = queue.begin_dispatch() else {
        return DispatchState::Empty;
    };

    let transport = transport.clone();
    DispatchState::Dispatching(tokio::spawn(async move {
        send(&transport, target, &request).await
    }))
}

async fn send<T: HubTransport>(transport: &T, target: ShadeId, request: &HubRequest) -> Reply {
    let shade = match request {
        HubRequest::Put(update) => {
            debug!(shade = %target, ?update, "put for shade");
            transport.put_shade(target, update).await?
        }
        HubRequest::Refresh => {
            debug!(shade = %target, "refreshing shade");
            transport.refresh_shade(target).await?
        }
    };
    Ok(Shade::from(shade))
}

/// Pop the completed head and hand its result to every waiter.
fn finish_head(queue: &mut RequestQueue<Waiter>, reply: &Reply) {
    let Some(entry) = queue.complete() else {
        warn!("hub request completed with no in-flight entry");
        return;
    };

    match reply {
        Ok(_) => debug!(
            shade = %entry.target(),
            waiters = entry.waiters().len(),
            "hub request complete"
        ),
        Err(e) => warn!(shade = %entry.target(), error = %e, "hub request failed"),
    }

    notify(entry.into_waiters(), reply);
}

fn notify(waiters: Vec<Waiter>, reply: &Reply) {
    for waiter in waiters {
        // A caller that stopped waiting does not affect the others.
        let _ = waiter.send(reply.clone());
    }
}

//! Fetch service: runs image searches in the background and fans the
//! lifecycle of each search out to subscribers.
//!
//! Every call to [`FetchService::fetch_images`] opens a new *cycle*. A cycle
//! publishes [`FetchEvent::Started`] and then exactly one of
//! [`FetchEvent::Failed`] or [`FetchEvent::Completed`]. Subscribers receive
//! events over their own channel and drain it from the UI thread.
//!
//! Only the newest cycle may publish its outcome: starting another cycle, or
//! calling [`FetchService::cancel`], makes any search still in flight drop
//! its result on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryIter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{FetchFailure, Result};
use crate::models::ImageResult;

/// Number of pages requested per search.
pub const IMAGES_LIMIT: u32 = 50;

/// Anything that can answer an image search. [`WikiClient`](crate::WikiClient)
/// is the real one.
pub trait ImageSource: Send + Sync {
    fn search(&self, search_term: &str, thumb_size: u32, limit: u32) -> Result<Vec<ImageResult>>;
}

/// Lifecycle notification for one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Started {
        cycle: u64,
    },
    Failed {
        cycle: u64,
        failure: FetchFailure,
    },
    Completed {
        cycle: u64,
        images: Vec<ImageResult>,
    },
}

impl FetchEvent {
    pub fn cycle(&self) -> u64 {
        match self {
            FetchEvent::Started { cycle }
            | FetchEvent::Failed { cycle, .. }
            | FetchEvent::Completed { cycle, .. } => *cycle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving end of a subscription.
///
/// Dropping it without calling [`FetchService::unsubscribe`] leaves a stale
/// entry behind; the next notification detects and prunes it.
pub struct Subscription {
    id: SubscriberId,
    events: Receiver<FetchEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Drain pending events without blocking.
    pub fn try_iter(&self) -> TryIter<'_, FetchEvent> {
        self.events.try_iter()
    }

    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<FetchEvent, RecvTimeoutError> {
        self.events.recv_timeout(timeout)
    }
}

/// Handle on a started cycle.
#[derive(Debug)]
pub struct FetchTicket {
    cycle: u64,
    worker: Option<JoinHandle<()>>,
}

impl FetchTicket {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Block until the background search (if any) has finished.
    pub fn wait(self) {
        if let Some(worker) = self.worker {
            if worker.join().is_err() {
                warn!(cycle = self.cycle, "fetch worker panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Sender<FetchEvent>)>,
}

impl Registry {
    /// Send `event` to every subscriber in registration order, pruning the
    /// ones whose receiver is gone. Returns how many were pruned.
    fn broadcast(&mut self, event: &FetchEvent) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        before - self.subscribers.len()
    }
}

struct Shared {
    source: Arc<dyn ImageSource>,
    limit: u32,
    // Cycle number of the newest fetch; bumped under the registry lock.
    generation: AtomicU64,
    registry: Mutex<Registry>,
}

impl Shared {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `event` unless its cycle has been superseded.
    fn publish_current(&self, event: FetchEvent) -> bool {
        let mut registry = self.registry();
        if self.generation.load(Ordering::SeqCst) != event.cycle() {
            return false;
        }
        deliver(&mut registry, event);
        true
    }

    fn run_cycle(&self, cycle: u64, search_term: &str, thumb_size: u32) {
        let event = match self.source.search(search_term, thumb_size, self.limit) {
            Ok(images) => {
                info!(cycle, count = images.len(), "fetch finished");
                FetchEvent::Completed { cycle, images }
            }
            Err(err) => {
                warn!(cycle, error = %err, "fetch failed");
                FetchEvent::Failed {
                    cycle,
                    failure: FetchFailure::from(&err),
                }
            }
        };

        if !self.publish_current(event) {
            debug!(cycle, "discarding result of superseded fetch");
        }
    }
}

/// Deliver `event`; if some subscriber turned out to be stale, tell the
/// remaining ones once. A failure notification is never followed by another.
fn deliver(registry: &mut Registry, event: FetchEvent) {
    let pruned = registry.broadcast(&event);
    if pruned == 0 {
        return;
    }

    if let FetchEvent::Failed { cycle, .. } = event {
        warn!(cycle, pruned, "dropped stale subscribers while reporting a failure");
        return;
    }

    let cycle = event.cycle();
    warn!(cycle, pruned, "dropped stale subscribers");
    let failure = FetchEvent::Failed {
        cycle,
        failure: FetchFailure::dispatch(format!("{pruned} subscriber(s) stopped listening")),
    };
    let pruned = registry.broadcast(&failure);
    if pruned > 0 {
        warn!(cycle, pruned, "dropped stale subscribers while reporting a failure");
    }
}

// ---------------------------------------------------------------------------
// Public service
// ---------------------------------------------------------------------------

/// Cloneable handle on the fetch service. Clones share subscribers and
/// cycle numbering.
#[derive(Clone)]
pub struct FetchService {
    shared: Arc<Shared>,
}

impl FetchService {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self::with_limit(source, IMAGES_LIMIT)
    }

    /// Like [`FetchService::new`] with a custom page limit.
    pub fn with_limit(source: Arc<dyn ImageSource>, limit: u32) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                limit,
                generation: AtomicU64::new(0),
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut registry = self.shared.registry();
        registry.next_id += 1;
        let id = SubscriberId(registry.next_id);
        registry.subscribers.push((id, tx));
        debug!(subscriber = id.0, "subscribed");

        Subscription { id, events: rx }
    }

    /// Remove a subscriber. Unknown or already removed ids are ignored;
    /// returns whether anything was removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut registry = self.shared.registry();
        let before = registry.subscribers.len();
        registry.subscribers.retain(|(sub, _)| *sub != id);
        before != registry.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.registry().subscribers.len()
    }

    /// Cycle number of the newest fetch (0 before the first one).
    pub fn current_cycle(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Discard the outcome of whatever fetch is in flight.
    pub fn cancel(&self) {
        let _registry = self.shared.registry();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "cancelled in-flight fetch");
    }

    /// Start a fetch cycle for `search_term` with thumbnails capped at
    /// `thumb_size` pixels.
    ///
    /// An empty term completes immediately with no results and no network
    /// call.
    pub fn fetch_images(&self, search_term: &str, thumb_size: u32) -> FetchTicket {
        let cycle = {
            let mut registry = self.shared.registry();
            let cycle = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

            if search_term.is_empty() {
                debug!(cycle, "empty search term, skipping request");
                deliver(
                    &mut registry,
                    FetchEvent::Completed {
                        cycle,
                        images: Vec::new(),
                    },
                );
                return FetchTicket {
                    cycle,
                    worker: None,
                };
            }

            deliver(&mut registry, FetchEvent::Started { cycle });
            cycle
        };

        info!(cycle, term = search_term, thumb_size, "fetch started");
        let shared = Arc::clone(&self.shared);
        let term = search_term.to_string();
        let worker = thread::spawn(move || shared.run_cycle(cycle, &term, thumb_size));

        FetchTicket {
            cycle,
            worker: Some(worker),
        }
    }
}

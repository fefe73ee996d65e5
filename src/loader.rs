//! Background loading with a last-good-result cache.
//!
//! A [`ResourceLoader`] owns one logical "load this resource" task.  The UI
//! thread drives it (`start`, `attach`, `detach`, `cancel`, `reset`); each
//! fetch + parse runs on its own worker thread so the UI never blocks on the
//! network.
//!
//! ```text
//!            start                 worker done
//!   Idle ─────────────► Loading ─────────────────► Ready
//!    ▲                     │                         │
//!    └────── cancel ───────┘   ◄──── start/restart ──┘
//!
//!   any state ──reset──► Reset (terminal)
//! ```
//!
//! The cached result outlives the observer: detaching and re-attaching (the
//! UI being rebuilt) replays it without touching the network.
//!
//! ## For contributors
//!
//! All loader state sits behind one [`Mutex`].  A worker's result is written
//! into the cache and handed to the observer while that lock is held, so a
//! concurrent `reset` or `detach` can never let a late result reach an
//! observer that already left.  The flip side: an [`Observer`] must not call
//! back into its loader from `on_result`.  [`ChannelObserver`] forwards to the
//! UI thread instead.  For the same reason [`Connectivity`] must answer from
//! state it already has; [`NetworkWatch`] keeps its checks on its own thread.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::source::{build_url, parse, Fetch, LoadRequest, LoadResult, NetworkFailure};

/// Where a loader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// No cached result and nothing in flight.
    Idle,
    /// A fetch + parse is running on a worker thread.
    Loading,
    /// The cache holds the result of the last completed load.
    Ready,
    /// Torn down.  Every further operation is ignored.
    Reset,
}

/// Consumer of load results.
pub trait Observer: Send {
    /// Called once per completed load, plus on cache replays.
    fn on_result(&mut self, result: &LoadResult);
}

/// Forwards results over an [`mpsc`] channel to the thread that owns the UI.
pub struct ChannelObserver {
    tx: mpsc::Sender<LoadResult>,
}

impl ChannelObserver {
    /// Create an observer and the receiver the UI loop should drain.
    pub fn channel() -> (Self, mpsc::Receiver<LoadResult>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn on_result(&mut self, result: &LoadResult) {
        // A closed channel means the UI is gone; nothing left to tell.
        if self.tx.send(result.clone()).is_err() {
            debug!("observer channel closed, dropping result");
        }
    }
}

/// Answers "is the network reachable right now?".
///
/// `None` means the host could not tell, which the loader treats as offline.
/// The loader asks while holding its lock, so answers must not wait on I/O.
pub trait Connectivity: Send + Sync {
    fn is_reachable(&self) -> Option<bool>;
}

impl<F> Connectivity for F
where
    F: Fn() -> Option<bool> + Send + Sync,
{
    fn is_reachable(&self) -> Option<bool> {
        self()
    }
}

/// How often [`NetworkWatch`] re-checks the API host.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(15);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Tracks reachability of the API host from a background thread.
///
/// The thread connects to the host on an interval and records the outcome;
/// [`is_reachable`](Connectivity::is_reachable) only reads that record, so it
/// never touches the network.  It answers `None` until the first check
/// completes.  The thread exits once every handle has been dropped.
#[derive(Clone)]
pub struct NetworkWatch {
    status: Arc<Mutex<Option<bool>>>,
}

impl NetworkWatch {
    /// Watch the host of `base_url`, on its port or the scheme default.
    ///
    /// Returns `None` when `base_url` carries no host to watch.
    pub fn for_url(base_url: &str) -> Option<Self> {
        Self::every(base_url, WATCH_INTERVAL)
    }

    fn every(base_url: &str, interval: Duration) -> Option<Self> {
        let url = url::Url::parse(base_url).ok()?;
        let addr = format!("{}:{}", url.host_str()?, url.port_or_known_default()?);

        let status = Arc::new(Mutex::new(None));
        let weak = Arc::downgrade(&status);
        let spawned = thread::Builder::new()
            .name("network-watch".into())
            .spawn(move || watch(&addr, &weak, interval));
        if let Err(e) = spawned {
            warn!(error = %e, "could not spawn network watch, assuming reachable");
            *lock_status(&status) = Some(true);
        }
        Some(Self { status })
    }
}

impl Connectivity for NetworkWatch {
    fn is_reachable(&self) -> Option<bool> {
        *lock_status(&self.status)
    }
}

fn watch(addr: &str, status: &Weak<Mutex<Option<bool>>>, interval: Duration) {
    loop {
        let reachable = connects(addr);
        let Some(status) = status.upgrade() else {
            debug!("network watch stopped");
            return;
        };
        let previous = lock_status(&status).replace(reachable);
        if previous != Some(reachable) {
            info!(addr, reachable, "network reachability changed");
        }
        drop(status);
        thread::sleep(interval);
    }
}

fn connects(addr: &str) -> bool {
    match addr.to_socket_addrs() {
        Ok(mut addrs) => addrs.any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok()),
        Err(e) => {
            debug!(addr, error = %e, "could not resolve host");
            false
        }
    }
}

fn lock_status(status: &Mutex<Option<bool>>) -> MutexGuard<'_, Option<bool>> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The fetch currently owned by the loader.
struct InFlight {
    request: LoadRequest,
    cancel: CancellationToken,
    generation: u64,
}

struct Inner {
    state: LoaderState,
    cache: Option<(LoadRequest, LoadResult)>,
    task: Option<InFlight>,
    observer: Option<Box<dyn Observer>>,
    /// Bumped for every spawned task; a worker only commits if it still matches.
    generation: u64,
}

impl Inner {
    fn replay_cache(&mut self) {
        if let (Some((_, result)), Some(observer)) = (self.cache.as_ref(), self.observer.as_mut()) {
            observer.on_result(result);
        }
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(generation = task.generation, "cancelling in-flight load");
            task.cancel.cancel();
        }
    }

    /// Store `result` as the current one and hand it to the observer.
    fn complete(&mut self, request: LoadRequest, result: LoadResult) {
        self.state = LoaderState::Ready;
        self.cache = Some((request, result));
        self.replay_cache();
    }
}

/// Coordinates one background load, its cache, and its observer.
pub struct ResourceLoader {
    inner: Arc<Mutex<Inner>>,
    fetcher: Arc<dyn Fetch>,
    connectivity: Box<dyn Connectivity>,
}

impl ResourceLoader {
    pub fn new(fetcher: Arc<dyn Fetch>, connectivity: Box<dyn Connectivity>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: LoaderState::Idle,
                cache: None,
                task: None,
                observer: None,
                generation: 0,
            })),
            fetcher,
            connectivity,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.lock().state
    }

    /// A copy of the cached result, if any.
    pub fn cached(&self) -> Option<LoadResult> {
        self.lock().cache.as_ref().map(|(_, result)| result.clone())
    }

    /// Make `observer` the recipient of results, replacing any previous one.
    ///
    /// If a result is already cached it is delivered right away.
    pub fn attach(&self, observer: Box<dyn Observer>) {
        let mut inner = self.lock();
        if inner.state == LoaderState::Reset {
            warn!("attach on a reset loader ignored");
            return;
        }
        inner.observer = Some(observer);
        if inner.state == LoaderState::Ready {
            debug!("replaying cached result to new observer");
            inner.replay_cache();
        }
    }

    /// Stop delivering results.  The cache and any running load are kept.
    pub fn detach(&self) {
        self.lock().observer = None;
    }

    /// Load `request`, reusing work where possible.
    ///
    /// * already loading the same request: joins it, no second fetch;
    /// * a successful result for the same request is cached: replays it;
    /// * otherwise: starts a fresh load (a cached failure is retried).
    pub fn start(&self, request: LoadRequest) {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            LoaderState::Reset => {
                warn!("start on a reset loader ignored");
                return;
            }
            LoaderState::Loading
                if inner.task.as_ref().is_some_and(|task| task.request == request) =>
            {
                debug!("load already in flight, joining");
                return;
            }
            LoaderState::Ready
                if matches!(&inner.cache, Some((cached, Ok(_))) if *cached == request) =>
            {
                debug!("serving cached result");
                inner.replay_cache();
                return;
            }
            _ => {}
        }
        self.begin(&mut inner, request);
    }

    /// Load `request` from the network even if it is cached or in flight.
    pub fn restart(&self, request: LoadRequest) {
        let mut inner = self.lock();
        if inner.state == LoaderState::Reset {
            warn!("restart on a reset loader ignored");
            return;
        }
        self.begin(&mut inner, request);
    }

    /// Abandon the running load.  Only meaningful while loading.
    ///
    /// Returns whether a load was actually abandoned; `false` means the
    /// loader was not loading, for instance because the load just finished.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != LoaderState::Loading {
            debug!(state = ?inner.state, "cancel outside of a load ignored");
            return false;
        }
        inner.cancel_task();
        inner.cache = None;
        inner.state = LoaderState::Idle;
        true
    }

    /// Tear the loader down: cancel, drop the cache, forget the observer.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.cancel_task();
        inner.cache = None;
        inner.observer = None;
        inner.state = LoaderState::Reset;
        debug!("loader reset");
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    fn begin(&self, inner: &mut Inner, request: LoadRequest) {
        inner.cancel_task();

        if self.connectivity.is_reachable() != Some(true) {
            warn!("network unreachable, not fetching");
            inner.complete(request, Err(NetworkFailure::Offline.into()));
            return;
        }

        inner.generation += 1;
        let generation = inner.generation;
        let cancel = CancellationToken::new();
        let url = build_url(&request);

        let worker = {
            let shared = Arc::clone(&self.inner);
            let fetcher = Arc::clone(&self.fetcher);
            let cancel = cancel.clone();
            let request = request.clone();
            move || {
                let result = run_pipeline(fetcher.as_ref(), &url, &cancel);
                commit(&shared, generation, request, result);
            }
        };

        match thread::Builder::new().name(format!("loader-{generation}")).spawn(worker) {
            Ok(_) => {
                debug!(generation, "load started");
                inner.task = Some(InFlight {
                    request,
                    cancel,
                    generation,
                });
                inner.state = LoaderState::Loading;
            }
            Err(e) => {
                warn!(error = %e, "could not spawn loader thread");
                inner.complete(request, Err(NetworkFailure::IoError(e.to_string()).into()));
            }
        }
    }
}

/// Fetch then parse.  Runs on the worker thread.
fn run_pipeline(fetcher: &dyn Fetch, url: &str, cancel: &CancellationToken) -> LoadResult {
    let body = fetcher.fetch(url, cancel)?;
    if cancel.is_cancelled() {
        return Err(NetworkFailure::Cancelled.into());
    }
    Ok(parse(&body)?)
}

/// Publish a worker's result, unless the loader moved on without it.
fn commit(shared: &Mutex<Inner>, generation: u64, request: LoadRequest, result: LoadResult) {
    let mut inner = lock(shared);

    let owned = inner.state != LoaderState::Reset
        && inner.task.as_ref().is_some_and(|task| task.generation == generation);
    if !owned {
        debug!(generation, "discarding result of abandoned load");
        return;
    }

    match &result {
        Ok(articles) => info!(generation, count = articles.len(), "load finished"),
        Err(e) => warn!(generation, error = %e, "load failed"),
    }

    inner.task = None;
    inner.complete(request, result);
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // A panicking observer must not wedge the loader for good.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

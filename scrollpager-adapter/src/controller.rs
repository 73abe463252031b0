use scrollpager::{ChangeRecord, FilterContext, PaginationState};

use crate::renderer::{ScrollIntent, render_page, restore_visibility};
use crate::session::Session;
use crate::{
    ContentProvider, EngineError, EngineOptions, InfiniteScrollLoader, LoadRequest, LoadStart,
    LocationStore, MutationReconciler, NavigationKind, RenderSink, RouteMatcher, RouteWatcher,
};

/// Where the engine is in its route-driven lifecycle.
///
/// Teardown returns to `Uninitialized`; the engine is re-entered on every route match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    Uninitialized,
    /// The initial load loop is running.
    Initializing,
    Active,
}

enum Phase<N, I, Sub> {
    Idle,
    Loading { epoch: u64, region: N },
    Active(Session<N, I, Sub>),
}

/// The top-level pagination engine.
///
/// This type holds no timers and no UI objects of its own. Hosts drive it by calling:
/// - `tick(now_ms)` on every frame/timer tick (advances the load loop, debounced resyncs,
///   navigation debounce, and the periodic route/growth check)
/// - `on_changes` from the content region's change notifications
/// - `on_navigate` from intercepted history navigation
/// - `go_to_page` when a page button is clicked
///
/// Entry points never return errors: failures are logged, recorded in `last_error`, and retried
/// by the next periodic check. The worst case is a missing page bar, never a broken list.
pub struct Controller<P: ContentProvider, S, L> {
    options: EngineOptions,
    provider: P,
    sink: S,
    location: L,
    phase: Phase<P::Node, P::Item, P::Subscription>,
    loader: InfiniteScrollLoader<P::Node>,
    reconciler: MutationReconciler,
    route: RouteWatcher,
    matcher: RouteMatcher,
    epoch: u64,
    last_check_ms: Option<u64>,
    last_error: Option<EngineError>,
}

impl<P, S, L> Controller<P, S, L>
where
    P: ContentProvider,
    S: RenderSink<Node = P::Node>,
    L: LocationStore,
{
    pub fn new(options: EngineOptions, provider: P, sink: S, location: L) -> Self {
        adebug!(
            items_per_page = options.pager.items_per_page(),
            max_pages = options.pager.max_pages(),
            route_prefix = options.route_prefix.as_str(),
            "Controller::new"
        );
        Self {
            reconciler: MutationReconciler::new(options.resync_quiet_ms),
            route: RouteWatcher::new(options.navigation_debounce_ms),
            matcher: RouteMatcher::new(options.route_prefix.clone()),
            options,
            provider,
            sink,
            location,
            phase: Phase::Idle,
            loader: InfiniteScrollLoader::new(),
            epoch: 0,
            last_check_ms: None,
            last_error: None,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.phase {
            Phase::Idle => Lifecycle::Uninitialized,
            Phase::Loading { .. } => Lifecycle::Initializing,
            Phase::Active(_) => Lifecycle::Active,
        }
    }

    /// The pagination state of the active session.
    pub fn state(&self) -> Option<PaginationState> {
        match &self.phase {
            Phase::Active(session) => Some(session.state),
            _ => None,
        }
    }

    pub fn current_page(&self) -> Option<usize> {
        self.state().map(|s| s.current_page())
    }

    /// The item snapshot of the active session (empty otherwise).
    pub fn items(&self) -> &[P::Item] {
        match &self.phase {
            Phase::Active(session) => session.items.as_slice(),
            _ => &[],
        }
    }

    /// The session counter; bumped every time initialization starts.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn is_resync_pending(&self) -> bool {
        self.reconciler.is_pending()
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<EngineError> {
        self.last_error.take()
    }

    /// Advances the engine to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Lifecycle {
        self.poll_route(now_ms);

        if let Some(report) = self.loader.poll(&mut self.provider, now_ms) {
            let result = self.finish_initialize(report.tag);
            self.settle(result);
        }

        if let Some(pending) = self.reconciler.take_due(now_ms) {
            let result = self.resync(pending.epoch);
            self.settle(result);
        }

        let check_due = self
            .last_check_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.options.check_interval_ms);
        if check_due {
            self.check(now_ms);
        }

        self.lifecycle()
    }

    /// Handles a batch of change notifications from the content region.
    ///
    /// Returns `true` if the batch scheduled a resync.
    pub fn on_changes(&mut self, batch: &[ChangeRecord<P::Node>], now_ms: u64) -> bool {
        let Phase::Active(session) = &self.phase else {
            atrace!(records = batch.len(), "on_changes: no active session");
            return false;
        };
        let ctx = FilterContext {
            region: &session.region,
            surface: Some(&session.surface),
        };
        self.reconciler.observe(
            &self.options.change_filter,
            &self.provider,
            ctx,
            batch,
            session.epoch,
            now_ms,
        )
    }

    /// Handles an intercepted navigation.
    pub fn on_navigate(&mut self, kind: NavigationKind, now_ms: u64) {
        self.route.notify(kind, now_ms);
        if kind == NavigationKind::History {
            self.poll_route(now_ms);
        }
    }

    /// Shows `page` (clamped into range), scrolls the list into view, and records the page in the
    /// location.
    ///
    /// Returns the page actually shown, or `None` without an active session.
    pub fn go_to_page(&mut self, page: usize) -> Option<usize> {
        let Phase::Active(session) = &mut self.phase else {
            return None;
        };
        session.state = session.state.go_to(page);
        let shown = session.state.current_page();
        let result = self.show_current(ScrollIntent::IntoView);
        self.settle(result);
        Some(shown)
    }

    /// Removes the render surface and change subscription and makes every item visible again.
    pub fn teardown(&mut self) {
        self.reconciler.cancel();
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Loading { .. } => {
                adebug!(epoch = self.epoch, "initialization abandoned");
            }
            Phase::Active(session) => {
                restore_visibility(&mut self.provider, &session.items);
                if let Some(subscription) = session.subscription {
                    self.provider.unsubscribe(subscription);
                }
                self.sink.unmount(&session.surface);
                adebug!(epoch = session.epoch, "session torn down");
            }
        }
    }

    fn poll_route(&mut self, now_ms: u64) {
        if !self.route.poll(self.location.href(), now_ms) {
            return;
        }
        self.teardown();
        self.check(now_ms);
    }

    fn check(&mut self, now_ms: u64) {
        self.last_check_ms = Some(now_ms);

        if !self.matcher.matches(self.location.path()) {
            if self.lifecycle() != Lifecycle::Uninitialized {
                adebug!("route no longer matches");
                self.teardown();
            }
            return;
        }

        let result = match self.lifecycle() {
            Lifecycle::Uninitialized => self.begin_initialize(now_ms),
            Lifecycle::Initializing => Ok(()),
            Lifecycle::Active => self.check_growth(),
        };
        self.settle(result);
    }

    fn begin_initialize(&mut self, now_ms: u64) -> Result<(), EngineError> {
        if self.loader.is_loading() {
            return Err(EngineError::LoaderBusy);
        }
        let region = self
            .provider
            .locate_region()
            .ok_or(EngineError::RegionNotFound)?;

        self.epoch += 1;
        let epoch = self.epoch;
        adebug!(epoch, "initializing");

        let request = LoadRequest {
            target_count: self.options.load_target(),
            max_attempts: self.options.max_load_attempts,
            wait_ms: self.options.load_wait_ms,
            tag: epoch,
        };
        let start = self
            .loader
            .begin(&mut self.provider, &region, request, now_ms);
        self.phase = Phase::Loading { epoch, region };

        match start {
            LoadStart::Started => Ok(()),
            LoadStart::Busy => {
                self.phase = Phase::Idle;
                Err(EngineError::LoaderBusy)
            }
            LoadStart::Finished(report) => self.finish_initialize(report.tag),
        }
    }

    fn finish_initialize(&mut self, epoch: u64) -> Result<(), EngineError> {
        let region = match &self.phase {
            Phase::Loading {
                epoch: current,
                region,
            } if *current == epoch => region.clone(),
            _ => {
                return Err(EngineError::StaleOperation {
                    operation: "load",
                    epoch,
                });
            }
        };
        if !self.matcher.matches(self.location.path()) {
            self.teardown();
            return Err(EngineError::StaleOperation {
                operation: "load",
                epoch,
            });
        }

        if self.options.suspend_source_after_load {
            self.provider.suspend_background_loading();
        }

        let items = self.provider.snapshot_items(&region);
        if items.is_empty() {
            self.phase = Phase::Idle;
            return Err(EngineError::EmptyCollection);
        }

        let surface = match self.sink.mount(&region) {
            Ok(surface) => surface,
            Err(err) => {
                self.phase = Phase::Idle;
                return Err(err.into());
            }
        };

        let param = self.location.page_param(&self.options.page_param);
        let state = PaginationState::new(self.options.pager)
            .recompute(items.len())
            .seed_from_param(param);
        adebug!(
            epoch,
            items = items.len(),
            page = state.current_page(),
            "session active"
        );

        self.phase = Phase::Active(Session {
            epoch,
            region,
            surface,
            items,
            state,
            subscription: None,
        });
        let rendered = self.show_current(ScrollIntent::IntoView);

        // Subscribe after the first render so its writes are never observed.
        if let Phase::Active(session) = &mut self.phase {
            match self.provider.subscribe_to_changes(&session.region) {
                Ok(subscription) => session.subscription = Some(subscription),
                Err(err) => {
                    awarn!(%err, "change subscription failed; relying on periodic checks");
                    self.last_error = Some(err.into());
                }
            }
        }
        rendered
    }

    fn check_growth(&mut self) -> Result<(), EngineError> {
        let Phase::Active(session) = &self.phase else {
            return Ok(());
        };
        let count = self.provider.snapshot_items(&session.region).len();
        if count <= session.items.len() {
            return Ok(());
        }
        if self.reconciler.is_pending() {
            atrace!(count, "growth detected; resync already pending");
            return Ok(());
        }
        adebug!(from = session.items.len(), to = count, "growth detected by periodic check");
        let epoch = session.epoch;
        self.resync(epoch)
    }

    fn resync(&mut self, epoch: u64) -> Result<(), EngineError> {
        let session = match &mut self.phase {
            Phase::Active(session) if session.epoch == epoch => session,
            _ => {
                return Err(EngineError::StaleOperation {
                    operation: "resync",
                    epoch,
                });
            }
        };

        let _previous_page = session.state.current_page();
        let items = self.provider.snapshot_items(&session.region);
        session.replace_items(items);
        adebug!(
            epoch,
            items = session.items.len(),
            previous_page = _previous_page,
            page = session.state.current_page(),
            "resync"
        );
        self.show_current(ScrollIntent::Preserve)
    }

    fn show_current(&mut self, scroll: ScrollIntent) -> Result<(), EngineError> {
        let Phase::Active(session) = &self.phase else {
            return Err(EngineError::StaleOperation {
                operation: "render",
                epoch: self.epoch,
            });
        };

        render_page(
            &mut self.provider,
            &mut self.sink,
            session.target(),
            &session.items,
            &session.state,
            scroll,
        )?;

        let page = session.state.current_page();
        let name = self.options.page_param.as_str();
        if self.location.page_param(name) != i64::try_from(page).ok() {
            self.location.set_page_param(name, page)?;
            self.route.acknowledge(self.location.href());
        }
        Ok(())
    }

    fn settle(&mut self, result: Result<(), EngineError>) {
        let Err(err) = result else {
            return;
        };
        if err.is_benign() {
            adebug!(%err, "engine step skipped");
        } else {
            awarn!(%err, "engine step failed");
        }
        self.last_error = Some(err);
    }
}

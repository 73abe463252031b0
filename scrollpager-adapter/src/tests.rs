use crate::*;

use scrollpager::{ButtonKind, ChangeRecord, ItemSource, NodeTree, WindowSpec};

use std::collections::VecDeque;

const BODY: usize = 0;
const REGION: usize = 1;
const SURFACE: usize = 2;
const ASIDE: usize = 3;

struct Node {
    parent: Option<usize>,
    tag: &'static str,
    selectors: Vec<&'static str>,
    visible: bool,
}

/// A synthetic document with a topic-list region whose rows grow on request.
struct Dom {
    nodes: Vec<Node>,
    /// Rows appended per `request_more_items`; `endless` applies once this runs dry.
    growth: VecDeque<usize>,
    endless: usize,
    requests: usize,
    scroll_top_restores: usize,
    subscribe_fails: bool,
    next_subscription: u32,
    active_subscriptions: Vec<u32>,
    suspended: bool,
}

impl Dom {
    fn new(rows: usize) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            growth: VecDeque::new(),
            endless: 0,
            requests: 0,
            scroll_top_restores: 0,
            subscribe_fails: false,
            next_subscription: 1,
            active_subscriptions: Vec::new(),
            suspended: false,
        };
        dom.add_node(None, "body", &[]);
        dom.add_node(Some(BODY), "tbody", &[".topic-list tbody"]);
        dom.add_node(Some(BODY), "div", &[]);
        dom.add_node(Some(BODY), "aside", &[]);
        dom.append_rows(rows);
        dom
    }

    fn with_growth(mut self, growth: &[usize]) -> Self {
        self.growth = growth.iter().copied().collect();
        self
    }

    fn add_node(&mut self, parent: Option<usize>, tag: &'static str, selectors: &[&'static str]) -> usize {
        self.nodes.push(Node {
            parent,
            tag,
            selectors: selectors.to_vec(),
            visible: true,
        });
        self.nodes.len() - 1
    }

    fn append_rows(&mut self, n: usize) {
        for _ in 0..n {
            self.add_node(Some(REGION), "tr", &["tr.topic-list-item", ".topic-list-item"]);
        }
    }

    fn rows(&self) -> Vec<usize> {
        self.select_all(&REGION, "tr.topic-list-item")
    }

    fn detach_last_rows(&mut self, n: usize) {
        for id in self.rows().into_iter().rev().take(n) {
            self.nodes[id].parent = None;
        }
    }

    fn visible_row_indices(&self) -> Vec<usize> {
        self.rows()
            .into_iter()
            .enumerate()
            .filter(|&(_, id)| self.nodes[id].visible)
            .map(|(i, _)| i)
            .collect()
    }

    fn all_rows_visible(&self) -> bool {
        self.rows().into_iter().all(|id| self.nodes[id].visible)
    }
}

impl NodeTree for Dom {
    type Node = usize;

    fn parent(&self, node: &usize) -> Option<usize> {
        self.nodes[*node].parent
    }

    fn tag_name(&self, node: &usize) -> Option<&str> {
        Some(self.nodes[*node].tag)
    }
}

impl ItemSource for Dom {
    type Item = usize;

    fn query_selector(&self, selector: &str) -> Option<usize> {
        (0..self.nodes.len()).find(|&i| self.nodes[i].selectors.contains(&selector))
    }

    fn select_all(&self, scope: &usize, selector: &str) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| i != *scope && self.is_inclusive_descendant(&i, scope))
            .filter(|&i| self.nodes[i].selectors.contains(&selector))
            .collect()
    }

    fn children(&self, scope: &usize) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].parent == Some(*scope))
            .collect()
    }
}

impl ContentProvider for Dom {
    type Subscription = u32;

    fn request_more_items(&mut self, _region: &usize) {
        self.requests += 1;
        let n = self.growth.pop_front().unwrap_or(self.endless);
        self.append_rows(n);
    }

    fn restore_scroll_top(&mut self) {
        self.scroll_top_restores += 1;
    }

    fn set_item_visible(&mut self, item: &usize, visible: bool) {
        self.nodes[*item].visible = visible;
    }

    fn subscribe_to_changes(&mut self, _region: &usize) -> Result<u32, HostError> {
        if self.subscribe_fails {
            return Err(HostError::new("subscribe_to_changes", "observer unavailable"));
        }
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.active_subscriptions.push(id);
        Ok(id)
    }

    fn unsubscribe(&mut self, subscription: u32) {
        self.active_subscriptions.retain(|&s| s != subscription);
    }

    fn suspend_background_loading(&mut self) {
        self.suspended = true;
    }
}

#[derive(Default)]
struct Sink {
    mounted: Option<usize>,
    mounts: usize,
    unmounts: usize,
    button_updates: usize,
    buttons: WindowSpec,
    surface_visible: bool,
    scrolls: usize,
    fail_mount: bool,
}

impl RenderSink for Sink {
    type Node = usize;

    fn mount(&mut self, _region: &usize) -> Result<usize, HostError> {
        if self.fail_mount {
            return Err(HostError::new("mount", "no insertion point"));
        }
        self.mounts += 1;
        self.mounted = Some(SURFACE);
        Ok(SURFACE)
    }

    fn unmount(&mut self, surface: &usize) {
        assert_eq!(self.mounted, Some(*surface));
        self.unmounts += 1;
        self.mounted = None;
    }

    fn set_buttons(&mut self, surface: &usize, spec: &WindowSpec) -> Result<(), HostError> {
        assert_eq!(self.mounted, Some(*surface));
        self.button_updates += 1;
        self.buttons = spec.clone();
        Ok(())
    }

    fn set_surface_visible(&mut self, _surface: &usize, visible: bool) {
        self.surface_visible = visible;
    }

    fn scroll_into_view(&mut self, region: &usize) {
        assert_eq!(*region, REGION);
        self.scrolls += 1;
    }
}

struct Loc {
    path: String,
    page: Option<String>,
    href: String,
    writes: Vec<usize>,
    fail_writes: bool,
}

impl Loc {
    fn new(path: &str) -> Self {
        let mut loc = Self {
            path: path.to_string(),
            page: None,
            href: String::new(),
            writes: Vec::new(),
            fail_writes: false,
        };
        loc.rebuild_href();
        loc
    }

    fn with_page(mut self, page: &str) -> Self {
        self.page = Some(page.to_string());
        self.rebuild_href();
        self
    }

    fn navigate(&mut self, path: &str) {
        self.path = path.to_string();
        self.page = None;
        self.rebuild_href();
    }

    fn rebuild_href(&mut self) {
        self.href = match &self.page {
            Some(page) => format!("https://forum.test{}?custom_page={page}", self.path),
            None => format!("https://forum.test{}", self.path),
        };
    }
}

impl LocationStore for Loc {
    fn href(&self) -> &str {
        &self.href
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn page_param(&self, name: &str) -> Option<i64> {
        assert_eq!(name, "custom_page");
        self.page.as_deref().and_then(parse_page_param)
    }

    fn set_page_param(&mut self, name: &str, page: usize) -> Result<(), HostError> {
        assert_eq!(name, "custom_page");
        if self.fail_writes {
            return Err(HostError::new("set_page_param", "history unavailable"));
        }
        self.page = Some(page.to_string());
        self.writes.push(page);
        self.rebuild_href();
        Ok(())
    }
}

type Engine = Controller<Dom, Sink, Loc>;

fn engine_with(options: EngineOptions, dom: Dom, loc: Loc) -> Engine {
    Controller::new(options, dom, Sink::default(), loc)
}

fn engine(rows: usize) -> Engine {
    engine_with(EngineOptions::default(), Dom::new(rows), Loc::new("/c/general"))
}

fn active_engine(rows: usize) -> Engine {
    let mut e = engine(rows);
    assert_eq!(e.tick(0), Lifecycle::Active);
    e
}

fn labels(spec: &WindowSpec) -> Vec<String> {
    spec.buttons.iter().map(|b| b.label()).collect()
}

fn added_under(target: usize, node: usize) -> ChangeRecord<usize> {
    ChangeRecord::child_list(target, vec![node], Vec::new())
}

#[test]
fn initializes_on_matching_route_and_shows_first_page() {
    let e = active_engine(42);

    let state = e.state().unwrap();
    assert_eq!(state.total_pages(), 3);
    assert_eq!(state.current_page(), 1);
    assert_eq!(e.items().len(), 42);
    assert_eq!(e.provider().visible_row_indices(), (0..15).collect::<Vec<_>>());

    assert_eq!(e.sink().mounts, 1);
    assert!(e.sink().surface_visible);
    assert_eq!(labels(&e.sink().buttons), ["1", "2", "3", ">", ">>"]);
    assert_eq!(e.sink().scrolls, 1);

    // The source already held a full page: no loading, but the scroll is still reset.
    assert_eq!(e.provider().requests, 0);
    assert_eq!(e.provider().scroll_top_restores, 1);
    assert_eq!(e.provider().active_subscriptions, [1]);
    assert_eq!(e.location().writes, [1]);
    assert_eq!(e.epoch(), 1);
}

#[test]
fn stays_idle_off_route() {
    let mut e = engine_with(EngineOptions::default(), Dom::new(42), Loc::new("/latest"));
    assert_eq!(e.tick(0), Lifecycle::Uninitialized);
    assert_eq!(e.sink().mounts, 0);
    assert!(e.provider().all_rows_visible());
    assert_eq!(e.last_error(), None);
}

#[test]
fn missing_region_is_retried_on_the_next_check() {
    let mut dom = Dom::new(42);
    dom.nodes[REGION].selectors.clear();
    let mut e = engine_with(EngineOptions::default(), dom, Loc::new("/c/general"));

    assert_eq!(e.tick(0), Lifecycle::Uninitialized);
    assert_eq!(e.last_error(), Some(&EngineError::RegionNotFound));

    e.provider_mut().nodes[REGION].selectors.push("#list-area");
    assert_eq!(e.tick(500), Lifecycle::Uninitialized);
    assert_eq!(e.tick(1000), Lifecycle::Active);
}

#[test]
fn empty_collection_stays_idle_until_items_arrive() {
    let mut e = engine(0);
    assert_eq!(e.tick(0), Lifecycle::Uninitialized);
    assert_eq!(e.last_error(), Some(&EngineError::EmptyCollection));
    assert_eq!(e.sink().mounts, 0);
    assert_eq!(e.provider().requests, 0);

    // Short of a full page: one load attempt, which stalls, then the session starts.
    e.provider_mut().append_rows(3);
    assert_eq!(e.tick(1000), Lifecycle::Initializing);
    assert_eq!(e.tick(2000), Lifecycle::Active);
    assert_eq!(e.provider().requests, 1);
    assert_eq!(e.state().unwrap().total_pages(), 1);
    assert!(e.sink().buttons.has(ButtonKind::Page));
}

#[test]
fn load_loop_grows_the_source_until_the_target() {
    let dom = Dom::new(5).with_growth(&[5, 5, 5]);
    let mut e = engine_with(EngineOptions::default(), dom, Loc::new("/c/general"));

    assert_eq!(e.tick(0), Lifecycle::Initializing);
    assert!(e.is_loading());
    assert_eq!(e.provider().requests, 1);

    assert_eq!(e.tick(999), Lifecycle::Initializing);
    assert_eq!(e.tick(1000), Lifecycle::Initializing);
    assert_eq!(e.provider().requests, 2);

    assert_eq!(e.tick(2000), Lifecycle::Active);
    assert!(!e.is_loading());
    assert_eq!(e.provider().requests, 2);
    assert_eq!(e.provider().scroll_top_restores, 1);
    assert_eq!(e.state().unwrap().total_items(), 15);
}

#[test]
fn load_stops_as_soon_as_the_count_stops_growing() {
    let mut dom = Dom::new(15).with_growth(&[0]);
    let mut loader = InfiniteScrollLoader::new();
    let request = LoadRequest {
        target_count: 30,
        max_attempts: 10,
        wait_ms: 1000,
        tag: 7,
    };

    assert_eq!(loader.begin(&mut dom, &REGION, request, 0), LoadStart::Started);
    assert_eq!(loader.poll(&mut dom, 500), None);
    let report = loader.poll(&mut dom, 1000).unwrap();
    assert_eq!(
        report,
        LoadReport {
            outcome: LoadOutcome::Stalled,
            attempts: 1,
            final_count: 15,
            tag: 7,
        }
    );
    assert_eq!(dom.requests, 1);
    assert_eq!(dom.scroll_top_restores, 1);
    assert!(!loader.is_loading());
}

#[test]
fn load_terminates_within_max_attempts_for_an_endless_source() {
    let mut dom = Dom::new(5);
    dom.endless = 1;
    let mut loader = InfiniteScrollLoader::new();
    let request = LoadRequest {
        target_count: 1_000,
        max_attempts: 10,
        wait_ms: 100,
        tag: 0,
    };

    assert_eq!(loader.begin(&mut dom, &REGION, request, 0), LoadStart::Started);
    let mut now = 0;
    let report = loop {
        now += 100;
        if let Some(report) = loader.poll(&mut dom, now) {
            break report;
        }
        assert!(now <= 10 * 100, "loader did not terminate");
    };

    assert_eq!(report.outcome, LoadOutcome::AttemptsExhausted);
    assert_eq!(report.attempts, 10);
    assert_eq!(report.final_count, 15);
    assert_eq!(dom.requests, 10);
}

#[test]
fn concurrent_load_is_a_no_op() {
    let mut dom = Dom::new(5).with_growth(&[5]);
    let mut loader = InfiniteScrollLoader::new();
    let request = LoadRequest {
        target_count: 15,
        max_attempts: 10,
        wait_ms: 1000,
        tag: 0,
    };

    assert_eq!(loader.begin(&mut dom, &REGION, request, 0), LoadStart::Started);
    assert_eq!(loader.begin(&mut dom, &REGION, request, 10), LoadStart::Busy);
    assert_eq!(dom.requests, 1);
}

#[test]
fn load_is_skipped_for_an_unpopulated_region_or_zero_budget() {
    let mut dom = Dom::new(0);
    let mut loader = InfiniteScrollLoader::new();
    let request = LoadRequest {
        target_count: 15,
        max_attempts: 10,
        wait_ms: 1000,
        tag: 0,
    };
    let LoadStart::Finished(report) = loader.begin(&mut dom, &REGION, request, 0) else {
        panic!("expected an immediate finish");
    };
    assert_eq!(report.outcome, LoadOutcome::Stalled);
    assert_eq!(report.attempts, 0);
    assert_eq!(dom.requests, 0);

    dom.append_rows(3);
    let no_budget = LoadRequest {
        max_attempts: 0,
        ..request
    };
    let LoadStart::Finished(report) = loader.begin(&mut dom, &REGION, no_budget, 0) else {
        panic!("expected an immediate finish");
    };
    assert_eq!(report.outcome, LoadOutcome::AttemptsExhausted);
    assert_eq!(dom.requests, 0);
    assert_eq!(dom.scroll_top_restores, 2);
}

#[test]
fn url_page_param_seeds_and_clamps_the_page() {
    let mut e = engine_with(
        EngineOptions::default(),
        Dom::new(42),
        Loc::new("/c/general").with_page("99"),
    );
    assert_eq!(e.tick(0), Lifecycle::Active);
    assert_eq!(e.current_page(), Some(3));
    assert_eq!(e.provider().visible_row_indices(), (30..42).collect::<Vec<_>>());
    assert_eq!(labels(&e.sink().buttons), ["<<", "<", "1", "2", "3"]);
    assert_eq!(e.location().writes, [3]);

    let mut e = engine_with(
        EngineOptions::default(),
        Dom::new(42),
        Loc::new("/c/general").with_page("2"),
    );
    e.tick(0);
    assert_eq!(e.current_page(), Some(2));
    assert!(e.location().writes.is_empty());

    let mut e = engine_with(
        EngineOptions::default(),
        Dom::new(42),
        Loc::new("/c/general").with_page("abc"),
    );
    e.tick(0);
    assert_eq!(e.current_page(), Some(1));
}

#[test]
fn go_to_page_renders_the_slice_and_records_the_page() {
    let mut e = active_engine(42);

    assert_eq!(e.go_to_page(2), Some(2));
    assert_eq!(e.provider().visible_row_indices(), (15..30).collect::<Vec<_>>());
    assert_eq!(e.sink().scrolls, 2);
    assert_eq!(e.location().writes, [1, 2]);
    assert_eq!(
        labels(&e.sink().buttons),
        ["<<", "<", "1", "2", "3", ">", ">>"]
    );

    assert_eq!(e.go_to_page(50), Some(3));
    assert_eq!(e.provider().visible_row_indices(), (30..42).collect::<Vec<_>>());

    // The engine's own URL writes are not navigation.
    assert_eq!(e.tick(1000), Lifecycle::Active);
    assert_eq!(e.sink().mounts, 1);
    assert_eq!(e.epoch(), 1);
}

#[test]
fn go_to_page_without_a_session_does_nothing() {
    let mut e = engine(42);
    assert_eq!(e.go_to_page(2), None);
    assert!(e.location().writes.is_empty());
}

#[test]
fn self_inflicted_changes_never_schedule_a_resync() {
    let mut e = active_engine(42);
    let first_row = e.provider().rows()[0];

    let batch = vec![
        added_under(SURFACE, ASIDE),
        ChangeRecord::attributes(first_row),
        ChangeRecord::attributes(REGION),
    ];
    assert!(!e.on_changes(&batch, 10));
    assert!(!e.is_resync_pending());

    e.go_to_page(2);
    assert!(!e.on_changes(&[added_under(SURFACE, ASIDE)], 20));
    assert!(!e.is_resync_pending());
}

#[test]
fn media_and_outside_changes_never_schedule_a_resync() {
    let mut e = active_engine(42);
    let row = e.provider().rows()[3];
    let video = e.provider_mut().add_node(Some(row), "video", &[]);
    let controls = e.provider_mut().add_node(Some(video), "div", &[]);
    let frame = e.provider_mut().add_node(Some(row), "IFRAME", &[]);

    let batch = vec![
        added_under(controls, ASIDE),
        added_under(video, ASIDE),
        added_under(frame, ASIDE),
        added_under(ASIDE, BODY),
    ];
    assert!(!e.on_changes(&batch, 10));
    assert!(!e.is_resync_pending());
}

#[test]
fn external_growth_resyncs_after_the_quiet_period_and_keeps_the_page() {
    let mut e = active_engine(42);
    e.go_to_page(2);
    let scrolls = e.sink().scrolls;

    e.provider_mut().append_rows(20);
    let new_row = *e.provider().rows().last().unwrap();
    assert!(e.on_changes(&[added_under(REGION, new_row)], 100));
    assert!(!e.on_changes(&[added_under(REGION, new_row)], 150));

    e.tick(399);
    assert!(e.is_resync_pending());
    assert_eq!(e.state().unwrap().total_items(), 42);

    e.tick(400);
    assert!(!e.is_resync_pending());
    let state = e.state().unwrap();
    assert_eq!(state.total_items(), 62);
    assert_eq!(state.total_pages(), 5);
    assert_eq!(state.current_page(), 2);
    assert_eq!(e.provider().visible_row_indices(), (15..30).collect::<Vec<_>>());
    assert_eq!(e.sink().scrolls, scrolls);
    assert_eq!(e.location().writes, [1, 2]);
    assert_eq!(
        labels(&e.sink().buttons),
        ["<<", "<", "1", "2", "3", "4", "5", ">", ">>"]
    );
}

#[test]
fn shrinking_collection_clamps_the_current_page() {
    let mut e = active_engine(42);
    e.go_to_page(3);

    e.provider_mut().detach_last_rows(22);
    let removed = e.provider().nodes.len() - 1;
    assert!(e.on_changes(
        &[ChangeRecord::child_list(REGION, Vec::new(), vec![removed])],
        0
    ));
    e.tick(300);

    let state = e.state().unwrap();
    assert_eq!(state.total_items(), 20);
    assert_eq!(state.current_page(), 2);
    assert_eq!(e.provider().visible_row_indices(), (15..20).collect::<Vec<_>>());
    assert_eq!(e.location().writes, [1, 3, 2]);
}

#[test]
fn empty_resync_hides_the_surface_until_items_return() {
    let mut e = active_engine(20);

    e.provider_mut().detach_last_rows(20);
    assert!(e.on_changes(
        &[ChangeRecord::child_list(REGION, Vec::new(), vec![5])],
        0
    ));
    e.tick(300);
    assert_eq!(e.lifecycle(), Lifecycle::Active);
    assert!(!e.sink().surface_visible);
    assert!(e.sink().buttons.is_empty());

    e.provider_mut().append_rows(4);
    let row = *e.provider().rows().last().unwrap();
    assert!(e.on_changes(&[added_under(REGION, row)], 400));
    e.tick(700);
    assert!(e.sink().surface_visible);
    assert_eq!(labels(&e.sink().buttons), ["1"]);
}

#[test]
fn periodic_check_resyncs_growth_without_notifications() {
    let mut e = active_engine(42);
    e.go_to_page(3);

    e.provider_mut().append_rows(10);
    e.tick(999);
    assert_eq!(e.state().unwrap().total_items(), 42);

    e.tick(1000);
    let state = e.state().unwrap();
    assert_eq!(state.total_items(), 52);
    assert_eq!(state.current_page(), 3);
    assert_eq!(e.provider().visible_row_indices(), (30..45).collect::<Vec<_>>());
}

#[test]
fn periodic_check_defers_to_a_pending_resync() {
    let mut e = active_engine(42);
    let updates = e.sink().button_updates;

    e.provider_mut().append_rows(10);
    let row = *e.provider().rows().last().unwrap();
    assert!(e.on_changes(&[added_under(REGION, row)], 900));

    e.tick(1000);
    assert_eq!(e.state().unwrap().total_items(), 42);
    assert_eq!(e.sink().button_updates, updates);

    e.tick(1200);
    assert_eq!(e.state().unwrap().total_items(), 52);
    assert_eq!(e.sink().button_updates, updates + 1);
}

#[test]
fn route_change_tears_down_and_restores_items() {
    let mut e = active_engine(42);
    e.go_to_page(2);
    assert!(!e.provider().all_rows_visible());

    e.location_mut().navigate("/latest");
    e.on_navigate(NavigationKind::History, 50);

    assert_eq!(e.lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(e.sink().unmounts, 1);
    assert_eq!(e.sink().mounted, None);
    assert!(e.provider().all_rows_visible());
    assert!(e.provider().active_subscriptions.is_empty());
    assert_eq!(e.state(), None);
    assert!(e.items().is_empty());
}

#[test]
fn route_mismatch_found_by_polling_tears_down() {
    let mut e = active_engine(42);
    e.location_mut().navigate("/top");
    assert_eq!(e.tick(16), Lifecycle::Uninitialized);
    assert_eq!(e.sink().unmounts, 1);
}

#[test]
fn programmatic_navigation_is_debounced_then_reenters() {
    let mut e = active_engine(42);

    e.location_mut().navigate("/c/other");
    e.on_navigate(NavigationKind::Programmatic, 100);
    assert_eq!(e.tick(300), Lifecycle::Active);
    assert_eq!(e.sink().unmounts, 0);

    // A second push inside the window moves the deadline.
    e.on_navigate(NavigationKind::Programmatic, 400);
    assert_eq!(e.tick(600), Lifecycle::Active);
    assert_eq!(e.sink().unmounts, 0);

    assert_eq!(e.tick(900), Lifecycle::Active);
    assert_eq!(e.sink().unmounts, 1);
    assert_eq!(e.sink().mounts, 2);
    assert_eq!(e.epoch(), 2);
    assert_eq!(e.provider().active_subscriptions, [2]);
}

#[test]
fn teardown_cancels_a_pending_resync() {
    let mut e = active_engine(42);
    e.provider_mut().append_rows(5);
    let row = *e.provider().rows().last().unwrap();
    assert!(e.on_changes(&[added_under(REGION, row)], 100));

    e.teardown();
    assert!(!e.is_resync_pending());
    let updates = e.sink().button_updates;
    e.tick(400);

    assert_eq!(e.last_error(), None);
    assert_eq!(e.sink().button_updates, updates);
    assert!(e.provider().all_rows_visible());
}

#[test]
fn changes_after_quick_reentry_resync_the_new_session() {
    let mut e = active_engine(42);
    let row = e.provider().rows()[0];
    assert!(e.on_changes(&[added_under(REGION, row)], 100));

    // The region already holds a full page, so the new session starts synchronously.
    e.location_mut().navigate("/c/other");
    e.on_navigate(NavigationKind::History, 150);
    assert_eq!(e.lifecycle(), Lifecycle::Active);
    assert_eq!(e.epoch(), 2);
    assert!(!e.is_resync_pending());

    e.provider_mut().detach_last_rows(10);
    let removed = e.provider().nodes.len() - 1;
    assert!(e.on_changes(
        &[ChangeRecord::child_list(REGION, Vec::new(), vec![removed])],
        200
    ));

    e.tick(500);
    assert_eq!(e.state().unwrap().total_items(), 32);
    assert_eq!(e.last_error(), None);
    assert_eq!(e.provider().visible_row_indices(), (0..15).collect::<Vec<_>>());
}

#[test]
fn on_changes_without_a_session_is_ignored() {
    let mut e = engine(42);
    assert!(!e.on_changes(&[added_under(REGION, ASIDE)], 0));
    assert!(!e.is_resync_pending());
}

#[test]
fn stale_load_after_route_change_is_discarded() {
    let dom = Dom::new(5).with_growth(&[0]);
    let mut e = engine_with(EngineOptions::default(), dom, Loc::new("/c/general"));
    assert_eq!(e.tick(0), Lifecycle::Initializing);

    e.location_mut().navigate("/latest");
    e.on_navigate(NavigationKind::History, 10);
    assert_eq!(e.lifecycle(), Lifecycle::Uninitialized);
    assert!(e.is_loading());

    assert_eq!(e.tick(1000), Lifecycle::Uninitialized);
    assert!(!e.is_loading());
    assert_eq!(
        e.last_error(),
        Some(&EngineError::StaleOperation {
            operation: "load",
            epoch: 1
        })
    );
    assert_eq!(e.sink().mounts, 0);
    assert_eq!(e.provider().scroll_top_restores, 1);
}

#[test]
fn reentry_waits_for_an_in_flight_load() {
    let dom = Dom::new(5).with_growth(&[0]);
    let mut e = engine_with(EngineOptions::default(), dom, Loc::new("/c/general"));
    e.tick(0);

    e.location_mut().navigate("/c/other");
    e.on_navigate(NavigationKind::History, 10);
    assert_eq!(e.lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(e.last_error(), Some(&EngineError::LoaderBusy));

    // The stale load finishes at 1000; the next check starts a fresh one.
    assert_eq!(e.tick(1000), Lifecycle::Uninitialized);
    assert_eq!(e.tick(1010), Lifecycle::Initializing);
    assert_eq!(e.tick(2010), Lifecycle::Active);
    assert_eq!(e.epoch(), 2);
}

#[test]
fn subscription_failure_falls_back_to_periodic_checks() {
    let mut dom = Dom::new(42);
    dom.subscribe_fails = true;
    let mut e = engine_with(EngineOptions::default(), dom, Loc::new("/c/general"));

    assert_eq!(e.tick(0), Lifecycle::Active);
    assert!(matches!(e.last_error(), Some(EngineError::Host(_))));

    e.provider_mut().append_rows(3);
    e.tick(1000);
    assert_eq!(e.state().unwrap().total_items(), 45);

    e.teardown();
    assert!(e.provider().active_subscriptions.is_empty());
}

#[test]
fn mount_failure_leaves_the_engine_idle() {
    let mut e = engine(42);
    e.sink_mut().fail_mount = true;
    assert_eq!(e.tick(0), Lifecycle::Uninitialized);
    assert_eq!(
        e.take_last_error(),
        Some(EngineError::Host(HostError::new("mount", "no insertion point")))
    );
    assert!(e.provider().all_rows_visible());

    e.sink_mut().fail_mount = false;
    assert_eq!(e.tick(1000), Lifecycle::Active);
}

#[test]
fn url_write_failure_still_renders_the_page() {
    let mut e = active_engine(42);
    e.location_mut().fail_writes = true;

    assert_eq!(e.go_to_page(2), Some(2));
    assert_eq!(e.provider().visible_row_indices(), (15..30).collect::<Vec<_>>());
    let err = e.last_error().unwrap();
    assert!(!err.is_benign());
    assert_eq!(err.to_string(), "set_page_param failed: history unavailable");
}

#[test]
fn suspends_the_source_only_when_configured() {
    let e = active_engine(42);
    assert!(!e.provider().suspended);

    let options = EngineOptions::default().with_suspend_source_after_load(true);
    let mut e = engine_with(options, Dom::new(42), Loc::new("/c/general"));
    e.tick(0);
    assert!(e.provider().suspended);
}

#[test]
fn custom_options_change_page_size_and_route() {
    let options = EngineOptions::new(scrollpager::PagerOptions::new(10, 5))
        .with_route_prefix("/t/")
        .with_check_interval_ms(250);
    assert_eq!(options.load_target(), 10);

    let mut e = engine_with(options, Dom::new(42), Loc::new("/t/thread"));
    assert_eq!(e.tick(0), Lifecycle::Active);
    assert_eq!(e.state().unwrap().total_pages(), 5);
    assert_eq!(labels(&e.sink().buttons), ["1", "2", "3", "4", "5", ">", ">>"]);

    e.provider_mut().append_rows(1);
    e.tick(250);
    assert_eq!(e.state().unwrap().total_pages(), 5);
    assert_eq!(e.state().unwrap().total_items(), 43);
}

#[test]
fn reconciler_coalesces_and_waits_for_quiet_period() {
    let mut r = MutationReconciler::new(300);
    assert!(r.request(1, 0));
    assert!(!r.request(1, 100));
    assert_eq!(r.take_due(299), None);
    assert_eq!(r.take_due(300), Some(PendingResync { epoch: 1, due_ms: 300 }));
    assert!(!r.is_pending());
    assert!(r.request(2, 400));
    assert_eq!(r.pending(), Some(PendingResync { epoch: 2, due_ms: 700 }));
}

#[test]
fn reconciler_replaces_a_resync_left_by_another_session() {
    let mut r = MutationReconciler::default();
    assert!(r.request(1, 0));
    assert!(r.request(2, 100));
    assert!(!r.request(2, 150));
    assert_eq!(r.pending(), Some(PendingResync { epoch: 2, due_ms: 400 }));

    assert_eq!(r.cancel(), Some(PendingResync { epoch: 2, due_ms: 400 }));
    assert_eq!(r.cancel(), None);
    assert_eq!(r.take_due(1_000), None);
}

#[test]
fn route_watcher_reports_each_change_once() {
    let mut w = RouteWatcher::new(500);
    assert!(!w.poll("/c/a", 0));
    assert!(!w.poll("/c/a", 10));
    assert!(w.poll("/c/b", 20));
    assert!(!w.poll("/c/b", 30));

    w.acknowledge("/c/b?custom_page=2");
    assert!(!w.poll("/c/b?custom_page=2", 40));

    w.notify(NavigationKind::Programmatic, 100);
    assert!(w.is_settling());
    assert!(!w.poll("/c/c", 599));
    assert!(w.poll("/c/c", 600));
    assert!(!w.is_settling());

    w.notify(NavigationKind::History, 700);
    assert!(w.poll("/c/d", 700));
    assert_eq!(w.last_href(), Some("/c/d"));
}

#[test]
fn route_matcher_uses_path_prefix() {
    let m = RouteMatcher::new("/c/");
    assert!(m.matches("/c/general/12"));
    assert!(!m.matches("/latest"));
    assert!(!m.matches("/c"));
}

#[test]
fn page_param_parses_leading_integers() {
    assert_eq!(parse_page_param("3"), Some(3));
    assert_eq!(parse_page_param("12abc"), Some(12));
    assert_eq!(parse_page_param("  -2"), Some(-2));
    assert_eq!(parse_page_param("+7"), Some(7));
    assert_eq!(parse_page_param("abc"), None);
    assert_eq!(parse_page_param(""), None);
    assert_eq!(parse_page_param("-"), None);
    assert_eq!(parse_page_param("99999999999999999999999"), Some(i64::MAX));
}

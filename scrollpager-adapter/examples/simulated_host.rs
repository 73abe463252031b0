// Example: drive the engine against an in-memory list that grows when asked for more items.
//
// Run with `RUST_LOG=scrollpager_adapter=debug cargo run -p scrollpager-adapter --example
// simulated_host --features tracing` to see the engine's own logs.
use scrollpager::{ChangeRecord, ItemSource, NodeTree, WindowSpec};
use scrollpager_adapter::{
    ContentProvider, Controller, EngineOptions, HostError, LocationStore, NavigationKind,
    RenderSink,
};
use tracing_subscriber::EnvFilter;

const REGION: usize = 0;
const SURFACE: usize = 1;

/// Node 0 is the list region, node 1 the page bar, everything after is a row.
struct Feed {
    parents: Vec<Option<usize>>,
    visible: Vec<bool>,
    remaining: usize,
}

impl Feed {
    fn new(initial: usize, remaining: usize) -> Self {
        let mut feed = Self {
            parents: vec![None, None],
            visible: vec![true, true],
            remaining,
        };
        feed.push_rows(initial);
        feed
    }

    fn push_rows(&mut self, n: usize) {
        for _ in 0..n {
            self.parents.push(Some(REGION));
            self.visible.push(true);
        }
    }

    fn shown(&self) -> Vec<usize> {
        (2..self.parents.len())
            .filter(|&i| self.visible[i])
            .map(|i| i - 2)
            .collect()
    }
}

impl NodeTree for Feed {
    type Node = usize;

    fn parent(&self, node: &usize) -> Option<usize> {
        self.parents[*node]
    }

    fn tag_name(&self, node: &usize) -> Option<&str> {
        Some(if *node < 2 { "div" } else { "tr" })
    }
}

impl ItemSource for Feed {
    type Item = usize;

    fn query_selector(&self, selector: &str) -> Option<usize> {
        (selector == "#list-area").then_some(REGION)
    }

    fn select_all(&self, _scope: &usize, _selector: &str) -> Vec<usize> {
        Vec::new()
    }

    fn children(&self, scope: &usize) -> Vec<usize> {
        (0..self.parents.len())
            .filter(|&i| self.parents[i] == Some(*scope))
            .collect()
    }
}

impl ContentProvider for Feed {
    type Subscription = ();

    fn request_more_items(&mut self, _region: &usize) {
        let n = self.remaining.min(8);
        self.remaining -= n;
        self.push_rows(n);
    }

    fn restore_scroll_top(&mut self) {}

    fn set_item_visible(&mut self, item: &usize, visible: bool) {
        self.visible[*item] = visible;
    }

    fn subscribe_to_changes(&mut self, _region: &usize) -> Result<(), HostError> {
        Ok(())
    }

    fn unsubscribe(&mut self, _subscription: ()) {}
}

struct PrintSink;

impl RenderSink for PrintSink {
    type Node = usize;

    fn mount(&mut self, _region: &usize) -> Result<usize, HostError> {
        println!("mount page bar");
        Ok(SURFACE)
    }

    fn unmount(&mut self, _surface: &usize) {
        println!("unmount page bar");
    }

    fn set_buttons(&mut self, _surface: &usize, spec: &WindowSpec) -> Result<(), HostError> {
        let labels: Vec<String> = spec
            .buttons
            .iter()
            .map(|b| if b.active { format!("[{}]", b.label()) } else { b.label() })
            .collect();
        println!("buttons: {}", labels.join(" "));
        Ok(())
    }

    fn scroll_into_view(&mut self, _region: &usize) {}
}

struct Address {
    path: String,
    page: Option<usize>,
    href: String,
}

impl Address {
    fn new(path: &str) -> Self {
        let mut address = Self {
            path: path.to_string(),
            page: None,
            href: String::new(),
        };
        address.sync();
        address
    }

    fn sync(&mut self) {
        self.href = match self.page {
            Some(page) => format!("{}?custom_page={page}", self.path),
            None => self.path.clone(),
        };
    }
}

impl LocationStore for Address {
    fn href(&self) -> &str {
        &self.href
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn page_param(&self, _name: &str) -> Option<i64> {
        self.page.and_then(|p| i64::try_from(p).ok())
    }

    fn set_page_param(&mut self, _name: &str, page: usize) -> Result<(), HostError> {
        self.page = Some(page);
        self.sync();
        println!("location: {}", self.href);
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = EngineOptions::default().with_load(10, 200, 2);
    let mut engine = Controller::new(
        options,
        Feed::new(6, 60),
        PrintSink,
        Address::new("/c/announcements"),
    );

    let mut now = 0;
    while engine.tick(now) != scrollpager_adapter::Lifecycle::Active {
        now += 100;
    }
    println!("active after {now} ms: rows shown {:?}", engine.provider().shown());

    engine.go_to_page(2);
    println!("page 2: rows shown {:?}", engine.provider().shown());

    // The source appends rows on its own; the notification triggers a quiet-period resync.
    engine.provider_mut().push_rows(40);
    let last = engine.provider().parents.len() - 1;
    engine.on_changes(&[ChangeRecord::child_list(REGION, vec![last], Vec::new())], now);
    now += engine.options().resync_quiet_ms;
    engine.tick(now);
    println!(
        "after resync: page {:?} of {:?}",
        engine.current_page(),
        engine.state().map(|s| s.total_pages())
    );

    engine.location_mut().path = "/latest".to_string();
    engine.location_mut().sync();
    engine.on_navigate(NavigationKind::History, now);
    println!("left the category: {:?}", engine.lifecycle());
}

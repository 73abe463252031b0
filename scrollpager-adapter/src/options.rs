use scrollpager::{ChangeFilter, PagerOptions};

/// Configuration for [`crate::Controller`].
///
/// All durations are milliseconds on the host's clock (the same clock passed to `tick`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    pub pager: PagerOptions,

    /// How often the route/growth check runs while the host keeps calling `tick`.
    pub check_interval_ms: u64,

    /// Upper bound on load-loop iterations during initialization.
    pub max_load_attempts: u32,
    /// Settle delay between asking the source for more items and re-counting them.
    pub load_wait_ms: u64,
    /// How many pages worth of items the initial load tries to materialize.
    pub auto_load_pages: usize,

    /// Quiet period between a relevant change and the resync it schedules.
    pub resync_quiet_ms: u64,
    /// Delay before a programmatic navigation is checked for a route change.
    pub navigation_debounce_ms: u64,

    /// The engine is active only on paths starting with this prefix.
    pub route_prefix: String,
    /// Name of the query parameter holding the current page.
    pub page_param: String,

    /// Ask the source to stop appending items on its own once the initial load is done.
    pub suspend_source_after_load: bool,

    pub change_filter: ChangeFilter,
}

impl EngineOptions {
    pub fn new(pager: PagerOptions) -> Self {
        Self {
            pager,
            ..Self::default()
        }
    }

    /// The item count the initial load stops at.
    pub fn load_target(&self) -> usize {
        self.auto_load_pages
            .max(1)
            .saturating_mul(self.pager.items_per_page())
    }

    pub fn with_check_interval_ms(mut self, check_interval_ms: u64) -> Self {
        self.check_interval_ms = check_interval_ms;
        self
    }

    pub fn with_load(mut self, max_attempts: u32, wait_ms: u64, auto_load_pages: usize) -> Self {
        self.max_load_attempts = max_attempts;
        self.load_wait_ms = wait_ms;
        self.auto_load_pages = auto_load_pages;
        self
    }

    pub fn with_resync_quiet_ms(mut self, resync_quiet_ms: u64) -> Self {
        self.resync_quiet_ms = resync_quiet_ms;
        self
    }

    pub fn with_navigation_debounce_ms(mut self, navigation_debounce_ms: u64) -> Self {
        self.navigation_debounce_ms = navigation_debounce_ms;
        self
    }

    pub fn with_route_prefix(mut self, route_prefix: impl Into<String>) -> Self {
        self.route_prefix = route_prefix.into();
        self
    }

    pub fn with_page_param(mut self, page_param: impl Into<String>) -> Self {
        self.page_param = page_param.into();
        self
    }

    pub fn with_suspend_source_after_load(mut self, suspend: bool) -> Self {
        self.suspend_source_after_load = suspend;
        self
    }

    pub fn with_change_filter(mut self, change_filter: ChangeFilter) -> Self {
        self.change_filter = change_filter;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            pager: PagerOptions::default(),
            check_interval_ms: 1000,
            max_load_attempts: 10,
            load_wait_ms: 1000,
            auto_load_pages: 1,
            resync_quiet_ms: 300,
            navigation_debounce_ms: 500,
            route_prefix: "/c/".to_string(),
            page_param: "custom_page".to_string(),
            suspend_source_after_load: false,
            change_filter: ChangeFilter::default(),
        }
    }
}

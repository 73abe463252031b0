/// How a navigation reached the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    /// A programmatic history push. The location settles asynchronously, so the route check is
    /// deferred by the navigation debounce.
    Programmatic,
    /// A history traversal (back/forward); checked immediately.
    History,
}

/// Funnels location polling and intercepted navigation into one "route changed" signal.
///
/// Polling happens on every `poll` call. A programmatic navigation opens a debounce window during
/// which polling reports nothing; the first poll after the window compares the location once.
/// Repeated navigations inside the window push the deadline back.
#[derive(Clone, Debug)]
pub struct RouteWatcher {
    debounce_ms: u64,
    last_href: Option<String>,
    settle_at_ms: Option<u64>,
}

impl RouteWatcher {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            last_href: None,
            settle_at_ms: None,
        }
    }

    pub fn last_href(&self) -> Option<&str> {
        self.last_href.as_deref()
    }

    pub fn is_settling(&self) -> bool {
        self.settle_at_ms.is_some()
    }

    pub fn notify(&mut self, kind: NavigationKind, now_ms: u64) {
        let delay = match kind {
            NavigationKind::Programmatic => self.debounce_ms,
            NavigationKind::History => 0,
        };
        self.settle_at_ms = Some(now_ms.saturating_add(delay));
        atrace!(?kind, now_ms, "RouteWatcher::notify");
    }

    /// Returns `true` exactly once per observed location change.
    ///
    /// The first observed location is recorded as the baseline and is not a change.
    pub fn poll(&mut self, href: &str, now_ms: u64) -> bool {
        if let Some(settle_at) = self.settle_at_ms {
            if now_ms < settle_at {
                return false;
            }
            self.settle_at_ms = None;
        }

        match self.last_href.as_deref() {
            Some(last) if last == href => false,
            Some(_) => {
                adebug!(href, "route changed");
                self.last_href = Some(href.to_string());
                true
            }
            None => {
                self.last_href = Some(href.to_string());
                false
            }
        }
    }

    /// Records `href` as the current location without reporting a change.
    ///
    /// Used after the engine rewrites its own page parameter.
    pub fn acknowledge(&mut self, href: &str) {
        if self.last_href.as_deref() != Some(href) {
            self.last_href = Some(href.to_string());
        }
    }
}

impl Default for RouteWatcher {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Matches paths the engine should be active on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatcher {
    prefix: String,
}

impl RouteMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Parses a page query value by its leading integer: `"3"` and `"3abc"` give 3, `" -2"` gives -2,
/// `"abc"` and `""` give `None`. Values beyond `i64` saturate.
pub fn parse_page_param(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

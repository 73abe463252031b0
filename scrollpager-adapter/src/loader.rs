use crate::ContentProvider;

/// Parameters for one load loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    /// Stop once at least this many items exist.
    pub target_count: usize,
    pub max_attempts: u32,
    /// Settle delay after each request for more items.
    pub wait_ms: u64,
    /// Opaque caller tag returned in the report (the controller stores its session epoch here).
    pub tag: u64,
}

/// Why a load loop ended. Every variant is a normal termination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadOutcome {
    TargetReached,
    /// The count did not grow since the previous iteration (source exhausted or stalled).
    Stalled,
    AttemptsExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    pub attempts: u32,
    pub final_count: usize,
    pub tag: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStart {
    Started,
    /// Another loop is in flight; this call did nothing.
    Busy,
    /// The loop ended before its first iteration.
    Finished(LoadReport),
}

#[derive(Clone, Debug)]
struct LoadState<N> {
    request: LoadRequest,
    region: N,
    attempts: u32,
    last_count: usize,
    deadline_ms: u64,
}

/// Drives an incremental source until enough items exist, the source stops growing, or the
/// attempt budget runs out.
///
/// The loop is advanced by the host clock: `begin` issues the first request for more items, and
/// each `poll` past the settle deadline re-counts and either finishes or issues the next request.
/// At most one loop is in flight; `begin` while loading returns [`LoadStart::Busy`].
#[derive(Clone, Debug)]
pub struct InfiniteScrollLoader<N> {
    in_flight: Option<LoadState<N>>,
}

impl<N: Clone> InfiniteScrollLoader<N> {
    pub fn new() -> Self {
        Self { in_flight: None }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn begin<P>(
        &mut self,
        provider: &mut P,
        region: &N,
        request: LoadRequest,
        now_ms: u64,
    ) -> LoadStart
    where
        P: ContentProvider<Node = N> + ?Sized,
    {
        if self.in_flight.is_some() {
            atrace!(tag = request.tag, "InfiniteScrollLoader::begin: busy");
            return LoadStart::Busy;
        }

        let count = provider.snapshot_items(region).len();
        let early = if request.max_attempts == 0 {
            Some(LoadOutcome::AttemptsExhausted)
        } else if count >= request.target_count {
            Some(LoadOutcome::TargetReached)
        } else if count == 0 {
            // Nothing rendered yet to grow from; the periodic check retries later.
            Some(LoadOutcome::Stalled)
        } else {
            None
        };
        if let Some(outcome) = early {
            return LoadStart::Finished(Self::finish(provider, request, outcome, 0, count));
        }

        provider.request_more_items(region);
        self.in_flight = Some(LoadState {
            request,
            region: region.clone(),
            attempts: 0,
            last_count: count,
            deadline_ms: now_ms.saturating_add(request.wait_ms),
        });
        LoadStart::Started
    }

    /// Advances the loop. Returns the report once the loop has ended.
    pub fn poll<P>(&mut self, provider: &mut P, now_ms: u64) -> Option<LoadReport>
    where
        P: ContentProvider<Node = N> + ?Sized,
    {
        let mut state = self.in_flight.take()?;
        if now_ms < state.deadline_ms {
            self.in_flight = Some(state);
            return None;
        }

        let count = provider.snapshot_items(&state.region).len();
        state.attempts += 1;
        atrace!(
            attempt = state.attempts,
            count,
            previous = state.last_count,
            "InfiniteScrollLoader::poll"
        );

        let outcome = if state.attempts >= state.request.max_attempts {
            Some(LoadOutcome::AttemptsExhausted)
        } else if count >= state.request.target_count {
            Some(LoadOutcome::TargetReached)
        } else if count <= state.last_count {
            Some(LoadOutcome::Stalled)
        } else {
            None
        };

        match outcome {
            Some(outcome) => Some(Self::finish(
                provider,
                state.request,
                outcome,
                state.attempts,
                count,
            )),
            None => {
                state.last_count = count;
                state.deadline_ms = now_ms.saturating_add(state.request.wait_ms);
                provider.request_more_items(&state.region);
                self.in_flight = Some(state);
                None
            }
        }
    }

    fn finish<P>(
        provider: &mut P,
        request: LoadRequest,
        outcome: LoadOutcome,
        attempts: u32,
        final_count: usize,
    ) -> LoadReport
    where
        P: ContentProvider<Node = N> + ?Sized,
    {
        provider.restore_scroll_top();
        adebug!(?outcome, attempts, final_count, "load loop finished");
        LoadReport {
            outcome,
            attempts,
            final_count,
            tag: request.tag,
        }
    }
}

impl<N: Clone> Default for InfiniteScrollLoader<N> {
    fn default() -> Self {
        Self::new()
    }
}

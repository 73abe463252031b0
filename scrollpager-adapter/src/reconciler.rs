use scrollpager::{ChangeFilter, ChangeRecord, FilterContext, NodeTree};

/// A scheduled resync, tagged with the session it was requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingResync {
    pub epoch: u64,
    pub due_ms: u64,
}

/// Turns filtered change notifications into debounced, coalesced resync requests.
///
/// At most one resync is pending at a time. Requests arriving while one is pending are dropped,
/// not queued: the pending resync re-snapshots everything anyway.
#[derive(Clone, Debug)]
pub struct MutationReconciler {
    quiet_ms: u64,
    pending: Option<PendingResync>,
}

impl MutationReconciler {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
        }
    }

    pub fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingResync> {
        self.pending
    }

    /// Runs `batch` through `filter` and schedules a resync if any change is relevant.
    ///
    /// Returns `true` only if this call scheduled a new resync.
    pub fn observe<T: NodeTree + ?Sized>(
        &mut self,
        filter: &ChangeFilter,
        tree: &T,
        ctx: FilterContext<'_, T::Node>,
        batch: &[ChangeRecord<T::Node>],
        epoch: u64,
        now_ms: u64,
    ) -> bool {
        if !filter.needs_resync(tree, ctx, batch) {
            atrace!(records = batch.len(), "MutationReconciler::observe: nothing relevant");
            return false;
        }
        self.request(epoch, now_ms)
    }

    /// Schedules a resync `quiet_ms` from now unless one is already pending for `epoch`.
    ///
    /// A pending resync left over from another session is replaced.
    pub fn request(&mut self, epoch: u64, now_ms: u64) -> bool {
        if self.pending.is_some_and(|pending| pending.epoch == epoch) {
            atrace!(epoch, "MutationReconciler::request: coalesced");
            return false;
        }
        let due_ms = now_ms.saturating_add(self.quiet_ms);
        adebug!(epoch, due_ms, "resync scheduled");
        self.pending = Some(PendingResync { epoch, due_ms });
        true
    }

    /// Drops the pending resync, if any.
    pub fn cancel(&mut self) -> Option<PendingResync> {
        let pending = self.pending.take();
        if pending.is_some() {
            atrace!("MutationReconciler::cancel: pending resync dropped");
        }
        pending
    }

    /// Takes the pending resync once its quiet period has elapsed.
    pub fn take_due(&mut self, now_ms: u64) -> Option<PendingResync> {
        match self.pending {
            Some(pending) if now_ms >= pending.due_ms => self.pending.take(),
            _ => None,
        }
    }
}

impl Default for MutationReconciler {
    fn default() -> Self {
        Self::new(300)
    }
}

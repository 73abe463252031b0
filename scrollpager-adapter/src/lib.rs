//! Host-driven engine for the `scrollpager` crate.
//!
//! The `scrollpager` crate is UI-agnostic and holds the pure pagination math and filters. This
//! crate wires them to a live, incrementally loaded list:
//!
//! - a bounded load loop that materializes the first page from an infinite-scroll source
//! - debounced, coalesced resyncs driven by filtered change notifications
//! - route-scoped sessions with URL page seeding and clean teardown
//!
//! The engine owns no timers or UI objects. Hosts implement [`ContentProvider`], [`RenderSink`]
//! and [`LocationStore`], then drive a [`Controller`] with a millisecond clock.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod error;
mod host;
mod loader;
mod options;
mod reconciler;
mod renderer;
mod route;
mod session;

#[cfg(test)]
mod tests;

pub use controller::{Controller, Lifecycle};
pub use error::{EngineError, HostError};
pub use host::{ContentProvider, LocationStore, RenderSink};
pub use loader::{InfiniteScrollLoader, LoadOutcome, LoadReport, LoadRequest, LoadStart};
pub use options::EngineOptions;
pub use reconciler::{MutationReconciler, PendingResync};
pub use renderer::{RenderTarget, ScrollIntent, apply_visibility, render_page, restore_visibility};
pub use route::{NavigationKind, RouteMatcher, RouteWatcher, parse_page_param};

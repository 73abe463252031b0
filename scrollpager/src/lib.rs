//! A headless pagination engine for lists that grow incrementally.
//!
//! For the host-driven engine (loading loop, change reconciliation, route lifecycle), see the
//! `scrollpager-adapter` crate.
//!
//! This crate holds the pure parts: the sliding page-button window, per-page item slices,
//! ordered item/region discovery strategies, and the change filter chain that separates external
//! structural changes from the engine's own writes.
//!
//! It is UI-agnostic. A DOM/TUI/GUI layer is expected to provide:
//! - node ancestry and tag names (`NodeTree`)
//! - selector queries over a content region (`ItemSource`)
//! - change records describing structural mutations
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod collector;
mod mutation;
mod options;
mod state;
mod types;


pub use collector::{ItemCollector, ItemSource, ItemStrategy, NodeTree, RegionLocator};
pub use mutation::{
    ChangeFilter, ChangeKind, ChangeRecord, FilterContext, FilterRule, MEDIA_TAGS, Verdict,
    is_inside_media,
};
pub use options::PagerOptions;
pub use state::PaginationState;
pub use types::{ButtonKind, NavAffordances, PageButton, PageSlice, PageWindow, WindowSpec};

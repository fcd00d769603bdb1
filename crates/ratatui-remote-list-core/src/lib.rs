//! `ratatui-remote-list-core` provides the data-side building blocks for terminal UIs that
//! browse remote, paginated collections.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: no async runtime, no timers. Anything time-based (search debouncing,
//!   delayed list hiding) is a deadline the host polls with an explicit [`std::time::Instant`].
//! - The network is injected: [`controller::RemoteListController`] calls a fetch function you
//!   supply and never builds transport requests itself.
//! - Staleness is handled by versioned cache keys, not cancellation: every mutation of the
//!   query state bumps a version, and [`cache::PageCache`] entries from older versions are
//!   simply never read again.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-remote-list`, which adds the search
//! field and picker widgets. Use this crate directly if you only need the controller and cache.
//!
//! Useful entry points:
//! - [`controller::RemoteListController`]: query/filter/sort/search state plus page fetching.
//! - [`cache::PageCache`]: consumer-owned page cache keyed by `(page, version)`.
//! - [`debounce::Debounce`]: trailing-edge debounce as a pollable deadline.
pub mod cache;
pub mod controller;
#[cfg(feature = "crossterm")]
pub mod crossterm_input;
pub mod debounce;
pub mod input;
pub mod query;
pub mod theme;

//! Ready-to-use ratatui components for browsing and picking from remote, paginated
//! collections.
//!
//! The data side lives in `ratatui-remote-list-core` (re-exported here): a
//! [`controller::RemoteListController`] owns the query/filter/sort/search state of one
//! remote collection and fetches pages through an injected function, and a
//! [`cache::PageCache`] keyed by `(page, state version)` keeps stale pages from ever being
//! displayed. This crate adds the widgets on top:
//!
//! - [`search_field::SearchField`]: a single-line search input.
//! - [`picker::PickerView`]: search field + incrementally loaded result list + single-item
//!   selection with submit/cancel affordances.
//!
//! Everything is event-loop agnostic. The host converts its input events (a `crossterm`
//! adapter is available behind the `crossterm` feature), forwards them to the widget, calls
//! `tick(now)` once per frame (or sleeps until `deadline()`), and drives page fetching with
//! whatever executor it likes; the widgets only say *which* page they want next.
pub use ratatui_remote_list_core::cache;
pub use ratatui_remote_list_core::controller;
#[cfg(feature = "crossterm")]
pub use ratatui_remote_list_core::crossterm_input;
pub use ratatui_remote_list_core::debounce;
pub use ratatui_remote_list_core::input;
pub use ratatui_remote_list_core::query;
pub use ratatui_remote_list_core::theme;

pub mod picker;
pub mod search_field;

use crate::cache::PageKey;
use crate::debounce::Debounce;
use crate::query::Constraints;
use crate::query::PAGE_SIZE;
use crate::query::PageRequest;
use crate::query::Query;
use crate::query::merged_where;
use futures::future::LocalBoxFuture;
use futures::future::try_join_all;
use std::cell::Cell;
use std::time::Duration;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;
use tracing::trace;

/// Quiet window for [`RemoteListController::debounced_search`].
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(100);

/// The injected fetch function rejected. The controller performs no retries; whatever the
/// fetch function reports is handed straight back to the caller of [`page`] or
/// [`full_list`].
///
/// [`page`]: RemoteListController::page
/// [`full_list`]: RemoteListController::full_list
#[derive(Debug, Error)]
#[error("page fetch failed: {source}")]
pub struct FetchError {
    #[from]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn msg(msg: impl Into<String>) -> Self {
        Self {
            source: msg.into().into(),
        }
    }
}

/// What the injected fetch function must resolve to: the page's items plus the total item
/// count across all pages. The controller does not validate this any further; a fetch
/// function reporting a bogus `total` will produce a bogus page bound downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub type FetchFuture<T> = LocalBoxFuture<'static, Result<PageResponse<T>, FetchError>>;

/// Controller for a remote, paginated collection: owns the query/filter/sort/search state,
/// builds the effective per-page request, and tracks a monotonically increasing state
/// version so consumers can tell that previously fetched pages are stale.
///
/// The fetch function is the sole network collaborator. It receives the effective
/// [`PageRequest`] plus the current search string and resolves to a [`PageResponse`]; how
/// that maps onto a transport is entirely the host's business (as is retrying).
///
/// All timing is host-driven: [`debounced_search`](Self::debounced_search) records intent
/// and [`poll_search`](Self::poll_search) applies it once the quiet window has elapsed.
pub struct RemoteListController<T> {
    fetch: Box<dyn Fn(PageRequest, Option<String>) -> FetchFuture<T>>,
    query: Query,
    filter: Constraints,
    search: Option<String>,
    sort: Option<String>,
    state_version: u64,
    // Written by page futures holding `&self`, hence the cell.
    total_pages: Cell<Option<u32>>,
    debounce: Debounce<String>,
}

impl<T> RemoteListController<T> {
    pub fn new(
        fetch: impl Fn(PageRequest, Option<String>) -> FetchFuture<T> + 'static,
        query: Query,
    ) -> Self {
        let mut controller = Self {
            fetch: Box::new(fetch),
            query,
            filter: Constraints::new(),
            search: None,
            sort: None,
            state_version: 0,
            total_pages: Cell::new(None),
            debounce: Debounce::new(SEARCH_DEBOUNCE),
        };
        controller.refresh();
        controller
    }

    /// Invalidate everything fetched so far by bumping the state version. No I/O happens
    /// here; consumers notice because their cache keys stop matching.
    pub fn refresh(&mut self) {
        self.state_version += 1;
        trace!(version = self.state_version, "refresh");
    }

    pub fn version(&self) -> u64 {
        self.state_version
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = query;
        self.refresh();
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn set_filter(&mut self, filter: Constraints) {
        self.filter = filter;
        self.refresh();
    }

    pub fn filter(&self) -> &Constraints {
        &self.filter
    }

    pub fn set_sort(&mut self, sort: Option<String>) {
        self.sort = sort;
        self.refresh();
    }

    /// Replace the search string without bumping the version. The debounced path combines
    /// this with [`refresh`](Self::refresh) once the quiet window elapses; callers setting
    /// the search directly are expected to do the same.
    pub fn set_search(&mut self, search: Option<String>) {
        self.search = search;
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Record a search update from a keystroke. Rapid calls coalesce: only the last value
    /// submitted within [`SEARCH_DEBOUNCE`] takes effect, when [`poll_search`] observes the
    /// elapsed deadline.
    ///
    /// [`poll_search`]: Self::poll_search
    pub fn debounced_search(&mut self, search: impl Into<String>, now: Instant) {
        self.debounce.submit(search.into(), now);
    }

    /// Apply a pending debounced search whose quiet window has elapsed. Returns `true` when
    /// the search was applied (and the version bumped), which is the host's cue to redraw
    /// and refetch.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        let Some(search) = self.debounce.poll(now) else {
            return false;
        };
        debug!(search = %search, "applying debounced search");
        self.set_search(Some(search));
        self.refresh();
        true
    }

    /// Deadline of the pending debounced search, if any, for hosts that sleep instead of
    /// polling every frame.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// The effective request for `page`: base query parameters, the fixed page size, the
    /// merged `where` clause (ad-hoc filter wins over the base `where` on key collision;
    /// the key is omitted entirely when the merge is empty), and the sort token.
    pub fn page_request(&self, page: u32) -> PageRequest {
        PageRequest {
            params: self.query.params.clone(),
            max_results: PAGE_SIZE,
            page,
            where_clause: merged_where(&self.query.where_clause, &self.filter),
            sort: self.sort.clone(),
        }
    }

    /// Fetch one page. The request is built synchronously, so it snapshots the state as of
    /// the call; later mutations do not leak into an in-flight fetch. On success the total
    /// page count is recorded and the page's items are returned; a fetch rejection is
    /// propagated untouched.
    pub async fn page(&self, page: u32) -> Result<Vec<T>, FetchError> {
        let request = self.page_request(page);
        let search = self.search.clone();
        debug!(page, version = self.state_version, "fetching page");
        let response = (self.fetch)(request, search).await?;
        self.total_pages
            .set(Some(response.total.div_ceil(PAGE_SIZE) as u32));
        Ok(response.items)
    }

    /// Fetch every page and return the concatenated items in page order.
    ///
    /// Page 1 is fetched first to learn the page count; that count is then snapshotted so a
    /// concurrent refresh cannot move the goalposts mid-aggregation. The remaining pages
    /// are fetched concurrently and reassembled by page number, so the result order does
    /// not depend on completion order. Any failing page fails the whole call; no partial
    /// list is produced.
    pub async fn full_list(&self) -> Result<Vec<T>, FetchError> {
        let mut items = self.page(1).await?;
        let total_pages = self.total_pages.get().unwrap_or(0);
        if total_pages <= 1 {
            return Ok(items);
        }
        debug!(total_pages, "aggregating full list");
        let mut rest = try_join_all((2..=total_pages).map(|page| async move {
            Ok::<(u32, Vec<T>), FetchError>((page, self.page(page).await?))
        }))
        .await?;
        rest.sort_by_key(|(page, _)| *page);
        for (_, mut page_items) in rest {
            items.append(&mut page_items);
        }
        Ok(items)
    }

    /// Cache key for `page` under the current state version.
    pub fn page_key(&self, page: u32) -> PageKey {
        PageKey::new(page, self.state_version)
    }

    /// Upper page bound from the most recent fetch. `None` until a fetch completes, and
    /// also when the backend reported a total of 0 (an empty collection leaves the scroll
    /// view unbounded).
    pub fn max_pages(&self) -> Option<u32> {
        self.total_pages.get().filter(|pages| *pages > 0)
    }

    /// Bundle the contract a generic infinite-scroll view consumes: a page-data accessor, a
    /// versioned cache-key function, the optional page bound, and the per-item renderer.
    pub fn scroll_params<R>(&self, render_item: R) -> InfiniteScrollParams<'_, T, R> {
        InfiniteScrollParams {
            controller: self,
            render_item,
        }
    }
}

/// The configuration a generic infinite-scroll view needs, borrowed from a controller.
pub struct InfiniteScrollParams<'a, T, R> {
    controller: &'a RemoteListController<T>,
    pub render_item: R,
}

impl<'a, T, R> InfiniteScrollParams<'a, T, R> {
    pub fn page_data(&self, page: u32) -> LocalBoxFuture<'a, Result<Vec<T>, FetchError>> {
        Box::pin(self.controller.page(page))
    }

    pub fn page_key(&self, page: u32) -> PageKey {
        self.controller.page_key(page)
    }

    pub fn max_pages(&self) -> Option<u32> {
        self.controller.max_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::Value;
    use serde_json::json;
    use std::cell::RefCell;
    use std::future::Future;
    use std::rc::Rc;
    use std::task::Poll;

    fn constraints(value: Value) -> Constraints {
        value.as_object().expect("object literal").clone()
    }

    fn fixed_fetch(items: Vec<u32>, total: u64) -> impl Fn(PageRequest, Option<String>) -> FetchFuture<u32> {
        move |_, _| {
            let response = PageResponse {
                items: items.clone(),
                total,
            };
            Box::pin(async move { Ok(response) })
        }
    }

    /// Resolves to `value` after returning `Pending` the given number of times.
    fn ready_after<T>(mut polls: u32, value: T) -> impl Future<Output = T> {
        let mut value = Some(value);
        std::future::poll_fn(move |cx| {
            if polls == 0 {
                Poll::Ready(value.take().expect("polled after completion"))
            } else {
                polls -= 1;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
    }

    #[test]
    fn version_increments_exactly_once_per_mutation() {
        let mut c = RemoteListController::new(fixed_fetch(vec![], 0), Query::default());
        assert_eq!(c.version(), 1);
        c.set_query(Query::default());
        c.set_filter(Constraints::new());
        c.set_sort(Some("-name".into()));
        c.refresh();
        assert_eq!(c.version(), 5);
        // Reads do not move the version.
        let _ = c.page_request(1);
        let _ = c.max_pages();
        assert_eq!(c.version(), 5);
    }

    #[test]
    fn set_search_alone_does_not_bump_the_version() {
        let mut c = RemoteListController::new(fixed_fetch(vec![], 0), Query::default());
        c.set_search(Some("ann".into()));
        assert_eq!(c.version(), 1);
        assert_eq!(c.search(), Some("ann"));
    }

    #[test]
    fn request_omits_where_when_filter_and_base_are_empty() {
        let c = RemoteListController::new(fixed_fetch(vec![], 0), Query::default());
        let request = c.page_request(1);
        assert_eq!(request.where_clause, None);
        assert_eq!(request.max_results, 10);
        assert_eq!(request.page, 1);
    }

    #[test]
    fn filter_wins_over_base_where_on_collision() {
        let query = Query::default().with_where(constraints(json!({"a": 2, "b": 3})));
        let mut c = RemoteListController::new(fixed_fetch(vec![], 0), query);
        c.set_filter(constraints(json!({"a": 1})));
        assert_eq!(
            c.page_request(1).where_clause,
            Some(constraints(json!({"a": 1, "b": 3})))
        );
    }

    #[test]
    fn page_resolves_items_and_records_the_page_count() {
        let c = RemoteListController::new(fixed_fetch(vec![1], 1), Query::default());
        assert_eq!(c.max_pages(), None);
        let items = block_on(c.page(1)).unwrap();
        assert_eq!(items, vec![1]);
        assert_eq!(c.max_pages(), Some(1));
    }

    #[test]
    fn max_pages_stays_unbounded_for_an_empty_collection() {
        let c = RemoteListController::new(fixed_fetch(vec![], 0), Query::default());
        block_on(c.page(1)).unwrap();
        assert_eq!(c.max_pages(), None);
    }

    #[test]
    fn fetch_receives_the_current_search() {
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut c = RemoteListController::new(
            move |_, search| {
                log.borrow_mut().push(search);
                Box::pin(async { Ok(PageResponse { items: vec![0u32], total: 1 }) })
            },
            Query::default(),
        );
        block_on(c.page(1)).unwrap();
        c.set_search(Some("berg".into()));
        block_on(c.page(1)).unwrap();
        assert_eq!(*seen.borrow(), vec![None, Some("berg".to_string())]);
    }

    #[test]
    fn debounced_search_applies_only_the_last_value() {
        let mut c = RemoteListController::new(fixed_fetch(vec![], 0), Query::default());
        let t0 = Instant::now();
        for (i, text) in ["a", "an", "ann", "anna", "annab"].iter().enumerate() {
            let at = t0 + Duration::from_millis(50 * i as u64);
            assert!(!c.poll_search(at));
            c.debounced_search(*text, at);
        }
        assert_eq!(c.version(), 1);
        assert!(c.poll_search(t0 + Duration::from_millis(200) + SEARCH_DEBOUNCE));
        assert_eq!(c.search(), Some("annab"));
        assert_eq!(c.version(), 2);
        // Nothing left pending afterwards.
        assert!(!c.poll_search(t0 + Duration::from_secs(10)));
        assert_eq!(c.version(), 2);
    }

    #[test]
    fn full_list_reorders_pages_fetched_out_of_order() {
        let completed: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(Cell::new(0u32));
        let log = completed.clone();
        let counter = calls.clone();
        let c = RemoteListController::new(
            move |request: PageRequest, _| {
                counter.set(counter.get() + 1);
                let page = request.page;
                let log = log.clone();
                // Page 2 resolves well after page 3.
                let delay = match page {
                    2 => 4,
                    _ => 1,
                };
                let count = if page == 3 { 5 } else { 10 };
                let items: Vec<u32> = (0..count).map(|i| (page - 1) * 10 + i).collect();
                Box::pin(async move {
                    let response = ready_after(delay, PageResponse { items, total: 25 }).await;
                    log.borrow_mut().push(page);
                    Ok(response)
                })
            },
            Query::default(),
        );
        let items = block_on(c.full_list()).unwrap();
        assert_eq!(calls.get(), 3);
        assert_eq!(*completed.borrow(), vec![1, 3, 2]);
        assert_eq!(items.len(), 25);
        let expected: Vec<u32> = (0..25).collect();
        assert_eq!(items, expected);
    }

    #[test]
    fn full_list_with_a_single_page_issues_one_fetch() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = calls.clone();
        let c = RemoteListController::new(
            move |_, _| {
                counter.set(counter.get() + 1);
                Box::pin(async { Ok(PageResponse { items: vec![7u32; 7], total: 7 }) })
            },
            Query::default(),
        );
        let items = block_on(c.full_list()).unwrap();
        assert_eq!(items.len(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn full_list_fails_fast_when_a_page_fails() {
        let c = RemoteListController::new(
            |request: PageRequest, _| {
                let page = request.page;
                Box::pin(async move {
                    if page == 2 {
                        Err(FetchError::msg("boom"))
                    } else {
                        Ok(PageResponse {
                            items: vec![page; 10],
                            total: 30,
                        })
                    }
                })
            },
            Query::default(),
        );
        let err = block_on(c.full_list()).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn scroll_params_expose_versioned_keys_and_bounds() {
        let mut c = RemoteListController::new(fixed_fetch(vec![1], 12), Query::default());
        block_on(c.page(1)).unwrap();
        let params = c.scroll_params(|item: &u32| item.to_string());
        assert_eq!(params.page_key(3).to_string(), "3-1");
        assert_eq!(params.max_pages(), Some(2));
        assert_eq!(block_on(params.page_data(1)).unwrap(), vec![1]);
        drop(params);
        c.refresh();
        assert_eq!(c.scroll_params(|_: &u32| String::new()).page_key(3).to_string(), "3-2");
    }
}

//! Cursor-paginated, search-filtered message list.
//!
//! The list never performs I/O itself. Each operation that needs data hands
//! back a [`PageRequest`]; the caller runs it (see [`fetch_page`]) and feeds
//! the outcome to [`SearchList::apply`]. Every request carries the generation
//! it was issued under, so completions that arrive after the search term
//! changed are recognised and dropped.

use std::time::Duration;

use crate::api::MessageBoard;
use crate::error::{BoardError, Result};
use crate::types::{MessageSummary, Page, PageInfo, PageQuery};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    /// First page in flight; nothing to show yet
    Loading,
    Ready,
    /// Next page in flight; loaded edges stay visible
    LoadingMore,
    /// Next page failed; loaded edges kept, retry allowed
    LoadMoreFailed(String),
    /// First page failed; no data
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Initial,
    LoadMore,
}

/// A fetch the list wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: RequestKind,
    pub query: PageQuery,
}

#[derive(Debug, Clone)]
pub struct SearchList {
    search_term: Option<String>,
    edges: Vec<MessageSummary>,
    page_info: Option<PageInfo>,
    status: ListStatus,
    generation: u64,
    page_size: u32,
}

impl SearchList {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_term: None,
            edges: Vec::new(),
            page_info: None,
            status: ListStatus::Idle,
            generation: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn edges(&self) -> &[MessageSummary] {
        &self.edges
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }

    pub fn can_load_more(&self) -> bool {
        matches!(
            self.status,
            ListStatus::Ready | ListStatus::LoadMoreFailed(_)
        ) && self.has_next_page()
    }

    /// Start over with `search_term`, dropping everything accumulated so far.
    /// An empty term is treated as no filter.
    pub fn initialize(&mut self, search_term: Option<String>) -> PageRequest {
        self.generation += 1;
        self.search_term = search_term.filter(|t| !t.is_empty());
        self.edges.clear();
        self.page_info = None;
        self.status = ListStatus::Loading;

        tracing::debug!(
            generation = self.generation,
            search = ?self.search_term,
            "list initialize"
        );

        self.request(RequestKind::Initial, None)
    }

    /// Request the page after the current end cursor. `None` when there is no
    /// next page or a fetch is already in flight.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.can_load_more() {
            return None;
        }
        let after = self.page_info.as_ref().and_then(|p| p.end_cursor.clone());
        self.status = ListStatus::LoadingMore;
        Some(self.request(RequestKind::LoadMore, after))
    }

    /// Restart the list if `search_term` differs from the current one.
    pub fn set_search_term(&mut self, search_term: Option<String>) -> Option<PageRequest> {
        let search_term = search_term.filter(|t| !t.is_empty());
        if search_term == self.search_term && self.status != ListStatus::Idle {
            return None;
        }
        Some(self.initialize(search_term))
    }

    /// Fold a finished fetch into the list.
    ///
    /// Returns `StaleResponse` without touching state if the request belongs
    /// to an older generation. Fetch errors are recorded in `status` and then
    /// handed back so the caller can surface them.
    pub fn apply(&mut self, request: &PageRequest, result: Result<Page>) -> Result<()> {
        if request.generation != self.generation
            || request.query.search_term != self.search_term
        {
            tracing::debug!(
                stale = request.generation,
                current = self.generation,
                "dropping stale page"
            );
            return Err(BoardError::StaleResponse {
                generation: request.generation,
            });
        }

        match (request.kind, result) {
            (RequestKind::Initial, Ok(page)) => {
                self.edges = page.edges;
                self.page_info = Some(page.page_info);
                self.status = ListStatus::Ready;
                Ok(())
            }
            (RequestKind::Initial, Err(e)) => {
                self.edges.clear();
                self.page_info = None;
                self.status = ListStatus::Errored(e.to_string());
                Err(e)
            }
            (RequestKind::LoadMore, Ok(page)) => {
                self.edges.extend(page.edges);
                self.page_info = Some(page.page_info);
                self.status = ListStatus::Ready;
                Ok(())
            }
            (RequestKind::LoadMore, Err(e)) => {
                self.status = ListStatus::LoadMoreFailed(e.to_string());
                Err(e)
            }
        }
    }

    fn request(&self, kind: RequestKind, after: Option<String>) -> PageRequest {
        PageRequest {
            generation: self.generation,
            kind,
            query: PageQuery {
                search_term: self.search_term.clone(),
                page_size: self.page_size,
                after,
            },
        }
    }
}

/// Run `request` against `board`, failing with a transport error once
/// `timeout` elapses.
pub async fn fetch_page(
    board: &dyn MessageBoard,
    request: &PageRequest,
    timeout: Duration,
) -> Result<Page> {
    match tokio::time::timeout(timeout, board.search_messages(&request.query)).await {
        Ok(result) => result,
        Err(_) => Err(BoardError::Transport(format!(
            "request timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

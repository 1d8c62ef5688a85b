//! The posts table's state: filters, cursor, visible rows, and which listing request is the newest.
//!
//! Listing requests are tagged with a sequence number when they're issued. Responses can finish in
//! any order; only the response to the newest request is allowed to replace what's visible.
use crate::client::structs::{ChannelOption, Post, PostListResponse};
use crate::client::Client;
use crate::export::{self, ExportArtifact, ExportRequest};
use crate::metrics;
use crate::query::params::listing_params;
use crate::query::{FilterEdit, FilterError, FilterState, PageSize, PageState, ParamSet, SortKey};
use crate::twoface::Fallible;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// A listing request that has been issued but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub params: ParamSet,
}

/// What completing a request did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the visible rows and cursor.
    Applied,
    /// The request failed; rows and cursor are as they were.
    Failed,
    /// A newer request was issued after this one, so the response was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct PostsView {
    filters: FilterState,
    page: PageState,
    rows: Vec<Post>,
    error: Option<String>,
    loading: bool,
    issued: u64,
    channels: Vec<ChannelOption>,
}

impl PostsView {
    pub fn new(page_size: PageSize) -> Self {
        Self::seeded(FilterState::reset(), PageState::new(page_size))
    }

    /// A view opened on existing filters and cursor, e.g. from a link.
    pub fn seeded(filters: FilterState, page: PageState) -> Self {
        Self {
            filters,
            page,
            rows: Vec::new(),
            error: None,
            loading: false,
            issued: 0,
            channels: Vec::new(),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn rows(&self) -> &[Post] {
        &self.rows
    }

    /// The last listing failure, if the newest request failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn channels(&self) -> &[ChannelOption] {
        &self.channels
    }

    /// Apply one filter edit. A refused edit leaves the view exactly as it was.
    pub fn edit_filter(&mut self, edit: FilterEdit) -> Result<(), FilterError> {
        let next = self.filters.apply(edit)?;
        self.replace_filters(next);
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.replace_filters(FilterState::reset());
    }

    /// A click on a column's sort arrow. Sorting is always done by the server.
    pub fn toggle_sort(&mut self, key: SortKey) {
        let next = self.filters.toggle_sort(key);
        self.replace_filters(next);
    }

    // A different filtered set makes the old page index meaningless.
    fn replace_filters(&mut self, next: FilterState) {
        if next != self.filters {
            self.filters = next;
            self.page = self.page.first_page();
            self.supersede_pending();
        }
    }

    fn move_cursor(&mut self, next: PageState) {
        if next != self.page {
            self.page = next;
            self.supersede_pending();
        }
    }

    // Requests in flight were built from the old filters or cursor. Their responses must not land
    // on top of the new ones, so none of them is the newest any more.
    fn supersede_pending(&mut self) {
        self.issued += 1;
        self.loading = false;
    }

    pub fn set_page(&mut self, page: i64) {
        self.move_cursor(self.page.set_page(page));
    }

    pub fn next_page(&mut self) {
        self.move_cursor(self.page.next_page());
    }

    pub fn previous_page(&mut self) {
        self.move_cursor(self.page.previous_page());
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.move_cursor(self.page.set_page_size(page_size));
    }

    /// Issue a listing request for the current filters and cursor. Any request issued earlier is
    /// now stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket {
            seq: self.issued,
            params: listing_params(&self.filters, &self.page),
        }
    }

    /// Hand the view a completed request. Only the newest request may change it.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Fallible<PostListResponse>,
    ) -> FetchOutcome {
        if ticket.seq != self.issued {
            metrics::STALE_RESPONSES.inc();
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "dropping stale listing response"
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(listing) => {
                self.page = self
                    .page
                    .on_fetch_succeeded(listing.total, listing.page, listing.page_size);
                self.rows = listing.posts;
                self.error = None;
                FetchOutcome::Applied
            }
            Err(e) => {
                warn!(internal = %e.internal, "listing failed");
                self.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch the current page and apply it.
    pub async fn refresh<C: Client + ?Sized>(&mut self, client: &C) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = client.list_posts(&ticket.params).await;
        self.complete_fetch(ticket, result)
    }

    /// Load the choices for the channel filter.
    pub async fn load_channels<C: Client + ?Sized>(&mut self, client: &C) -> Fallible<()> {
        let listing = client.list_channels().await?;
        self.channels = listing.channels.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Export everything matching the current filters. The view itself is not changed, whatever
    /// the outcome.
    pub async fn export<C: Client + ?Sized>(
        &self,
        client: &C,
        request: &ExportRequest,
        today: NaiveDate,
    ) -> Fallible<ExportArtifact> {
        export::export_all(client, &self.filters, request, today).await
    }
}

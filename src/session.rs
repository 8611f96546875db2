use crate::model::AnalysisRecord;
use crate::table::pager::PageWindow;
use crate::table::{sort_records, SortField, SortSpec};

// Token handed out per submission. Tokens are monotonic, so a completion
// can always be checked against the newest submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

// Owns everything the displayed table needs: the record collection, the
// active sort, the page window, and the in-flight submission state. The
// source behavior let the last response to arrive win; here the *latest
// submission issued* wins and stale completions are discarded.
#[derive(Debug)]
pub struct ViewSession {
    records: Vec<AnalysisRecord>,
    sort: Option<SortSpec>,
    window: PageWindow,
    next_token: u64,
    in_flight: Option<u64>,
}

impl ViewSession {
    pub fn new(page_size: u32) -> Self {
        Self {
            records: Vec::new(),
            sort: None,
            window: PageWindow::new(page_size),
            next_token: 0,
            in_flight: None,
        }
    }

    // True while a submission is outstanding; the caller uses this to keep
    // its submit control disabled.
    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    // Starts a submission. A begin while another is outstanding supersedes
    // it: the earlier completion will be rejected as stale.
    pub fn submit_begin(&mut self) -> RequestToken {
        self.next_token += 1;
        self.in_flight = Some(self.next_token);
        RequestToken(self.next_token)
    }

    // Installs the fetched records if the token still identifies the newest
    // submission. Returns false (and changes nothing) for stale tokens.
    pub fn submit_complete(&mut self, token: RequestToken, records: Vec<AnalysisRecord>) -> bool {
        if self.in_flight != Some(token.0) {
            return false;
        }
        self.in_flight = None;
        self.records = records;
        self.window.set_total_count(self.records.len());
        self.window.go_to_page(1);
        if let Some(spec) = self.sort {
            sort_records(&mut self.records, spec);
        }
        true
    }

    // Marks a failed submission as settled without touching the collection.
    pub fn submit_abort(&mut self, token: RequestToken) {
        if self.in_flight == Some(token.0) {
            self.in_flight = None;
        }
    }

    pub fn sort_by(&mut self, field: SortField) -> SortSpec {
        let spec = match self.sort {
            Some(current) => current.toggled(field),
            None => SortSpec::ascending(field),
        };
        self.apply_sort(spec);
        spec
    }

    pub fn apply_sort(&mut self, spec: SortSpec) {
        self.sort = Some(spec);
        sort_records(&mut self.records, spec);
    }

    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn go_to_page(&mut self, page: i64) {
        self.window.go_to_page(page);
    }

    pub fn next_page(&mut self) {
        self.window.next_page();
    }

    pub fn previous_page(&mut self) {
        self.window.previous_page();
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.window.set_page_size(page_size);
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn page_records(&self) -> &[AnalysisRecord] {
        self.window.slice(&self.records)
    }

    pub fn visible_pages(&self, max_visible: u32) -> Vec<u32> {
        self.window.visible_pages(max_visible)
    }
}

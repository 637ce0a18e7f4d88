//! Dashboard session state: which view is active and the overview date filter.

use chrono::NaiveDate;

use crate::models::{EntryForm, OpdRecord};
use crate::overview::OverviewSnapshot;
use crate::store::{RecordStore, StoreResult};
use crate::DashboardError;

/// Shown instead of metrics when the store has no data rows.
pub const NO_DATA_MESSAGE: &str = "No OPD data available. Add entries using 'Add OPD Entry'.";

/// Scope notice shown with the overview.
pub const DISCLAIMER: &str =
    "For OPD overview only. No diagnosis or treatment decisions are made here.";

/// The two dashboard views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Overview,
    Entry,
}

/// Result of rendering the overview view.
#[derive(Debug, Clone, PartialEq)]
pub enum OverviewPage {
    /// The store holds no data rows at all
    NoData,
    Ready(OverviewSnapshot),
}

/// Per-user session. Starts on the overview with no date filter.
#[derive(Debug, Clone, Default)]
pub struct Session {
    view: View,
    date_filter: Option<NaiveDate>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn show_overview(&mut self) {
        self.view = View::Overview;
    }

    pub fn show_entry(&mut self) {
        self.view = View::Entry;
    }

    /// Leave the entry form without writing anything.
    pub fn cancel_entry(&mut self) {
        self.show_overview();
    }

    pub fn date_filter(&self) -> Option<NaiveDate> {
        self.date_filter
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.date_filter = date;
    }

    /// Validate the form, append it, then return to the overview.
    ///
    /// On any error the session stays on the entry view and nothing is
    /// written beyond what the store itself did.
    pub fn submit_entry(
        &mut self,
        store: &dyn RecordStore,
        form: &EntryForm,
    ) -> Result<OpdRecord, DashboardError> {
        let record = form.validate()?;
        store.append(&record)?;
        self.show_overview();
        Ok(record)
    }

    /// Fetch every record and aggregate under the current date filter.
    pub fn render_overview(&self, store: &dyn RecordStore) -> StoreResult<OverviewPage> {
        let records = store.fetch_all()?;
        if records.is_empty() {
            return Ok(OverviewPage::NoData);
        }
        Ok(OverviewPage::Ready(OverviewSnapshot::compute(
            &records,
            self.date_filter,
        )))
    }
}

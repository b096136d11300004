/// GridView Table Data View
///
/// A `TableDataView` is the backing store a virtualized grid reads from. It
/// owns the full, unfiltered row store and the filtered view derived from
/// it, and tells observers when either changes shape.
///
/// Filtering is deferred and total: the filter function is only run when
/// `filter()` is called (or on `push` while a filter is active), and it is
/// always handed the complete row store, never a previously filtered
/// subset. Whatever it returns becomes the filtered view as-is.
///
/// Search, positional access and sorting all work on the filtered view,
/// since that is what the grid shows.
///
/// # Examples
///
/// ```
/// use gridview::{record, CellValue, Record, TableDataView};
///
/// let rows: Vec<Record> = (0..10)
///     .map(|i| record([("id", CellValue::Int64(i)), ("name", CellValue::from(format!("row {}", i)))]))
///     .collect();
///
/// let mut view = TableDataView::builder(rows)
///     .filter_fn(|rows: &[Record]| {
///         rows.iter()
///             .filter(|r| r["id"].as_i64().map_or(false, |id| id % 2 == 0))
///             .cloned()
///             .collect()
///     })
///     .text_search(vec!["id".into(), "name".into()])
///     .build();
///
/// view.filter();
/// assert_eq!(view.len(), 5);
/// assert_eq!(view.len_non_filtered(), 10);
///
/// let hit = view.find("row 4", None).unwrap().unwrap();
/// assert_eq!((hit.row, hit.column), (2, 1));
/// ```

use crate::config::ViewConfig;
use crate::error::{Result, ViewError};
use crate::event::Emitter;
use crate::find::{column_text_search, FindPosition, Finder, SearchFn};
use crate::record::FieldAccess;
use crate::sort::{compare_field_values, default_sort, SortArgs};
use log::debug;
use std::collections::BTreeSet;
use std::fmt;

/// Caller-supplied filter: the rows to present, given the full row store.
pub type FilterFn<R> = Box<dyn Fn(&[R]) -> Vec<R>>;

/// Caller-supplied sort of the filtered view.
pub type SortFn<R> = Box<dyn Fn(&SortArgs, &mut [R])>;

type SearchFactory<R> = Box<dyn FnOnce(bool) -> SearchFn<R>>;

pub struct TableDataView<R> {
    /// Row store: every row pushed since the last clear
    data: Vec<R>,
    /// Filtered view: what the grid presents
    filtered: Vec<R>,
    search_fn: Option<SearchFn<R>>,
    sort_fn: Option<SortFn<R>>,
    filter_fn: Option<FilterFn<R>>,
    filter_active: bool,
    finder: Finder,
    config: ViewConfig,
    row_count_changed: Emitter<usize>,
    filter_state_changed: Emitter<()>,
    sort_completed: Emitter<SortArgs>,
}

impl<R: Clone> TableDataView<R> {
    /// A view with no search, sort or filter function.
    pub fn new(rows: Vec<R>) -> Self {
        Self::builder(rows).build()
    }

    pub fn builder(rows: Vec<R>) -> TableDataViewBuilder<R> {
        TableDataViewBuilder::new(rows)
    }

    /// Append rows to the row store.
    ///
    /// While a filter is active the filter is re-run over the whole store;
    /// otherwise the rows are appended to the filtered view directly. Fires
    /// `on_row_count_change` with the filtered length either way.
    ///
    /// A re-filter drops the cached matches of an active search; appending
    /// keeps them and lets a capped search discover the new rows.
    pub fn push<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = R>,
    {
        let start = self.data.len();
        self.data.extend(rows);
        let added = self.data.len() - start;

        if self.filter_active && self.filter_fn.is_some() {
            self.apply_filter();
        } else {
            self.filtered.extend_from_slice(&self.data[start..]);
            self.finder.rows_appended();
        }

        debug!(
            "push: {} row(s) added, {} of {} shown",
            added,
            self.filtered.len(),
            self.data.len()
        );
        self.row_count_changed.fire(&self.filtered.len());
    }

    /// Empty the row store and the filtered view and end any search. Fires
    /// no events; the next `push` or `filter` does.
    pub fn clear(&mut self) {
        debug!("clear: dropping {} row(s)", self.data.len());
        self.data.clear();
        self.filtered.clear();
        self.clear_find();
    }

    /// Run the configured filter over the full row store.
    ///
    /// Fires `on_filter_state_change` then `on_row_count_change`. Does
    /// nothing, and fires nothing, when no filter function is configured.
    /// An active search stays active, and its next step searches the new
    /// filtered view.
    pub fn filter(&mut self) {
        if self.filter_fn.is_none() {
            debug!("filter: no filter function configured");
            return;
        }

        self.apply_filter();
        self.filter_active = true;

        debug!(
            "filter: {} of {} row(s) shown",
            self.filtered.len(),
            self.data.len()
        );
        self.filter_state_changed.fire(&());
        self.row_count_changed.fire(&self.filtered.len());
    }

    /// Replace the filter function for this and all later calls, then
    /// filter.
    pub fn filter_with<F>(&mut self, filter_fn: F)
    where
        F: Fn(&[R]) -> Vec<R> + 'static,
    {
        self.filter_fn = Some(Box::new(filter_fn));
        self.filter();
    }

    /// Show every row again. Always fires `on_filter_state_change` then
    /// `on_row_count_change`, even if nothing was filtered.
    ///
    /// The filtered view becomes a copy of the row store made with
    /// `R::clone`. Use `Rc<_>` rows to share them instead of duplicating.
    pub fn clear_filter(&mut self) {
        self.filtered = self.data.clone();
        self.filter_active = false;
        self.finder.invalidate();

        debug!("clear_filter: {} row(s) shown", self.filtered.len());
        self.filter_state_changed.fire(&());
        self.row_count_changed.fire(&self.filtered.len());
    }

    fn apply_filter(&mut self) {
        if let Some(filter_fn) = self.filter_fn.as_ref() {
            // Only replaced once the filter has returned
            let result = filter_fn(self.data.as_slice());
            self.filtered = result;
            self.finder.invalidate();
        }
    }

    /// Sort the filtered view with the configured sort function and fire
    /// `on_sort_complete`. Returns false (and fires nothing) when no sort
    /// function is configured. An active search resumes from its row index
    /// in the reordered view.
    pub fn sort(&mut self, args: SortArgs) -> bool {
        let Some(sort_fn) = self.sort_fn.as_ref() else {
            debug!("sort: no sort function configured");
            return false;
        };

        sort_fn(&args, self.filtered.as_mut_slice());
        self.finder.invalidate();
        debug!(
            "sort: {} row(s) by {:?} {:?}",
            self.filtered.len(),
            args.field,
            args.order
        );
        self.sort_completed.fire(&args);
        true
    }
}

impl<R> TableDataView<R> {
    /// Number of rows in the filtered view.
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Number of rows in the row store, ignoring any filter.
    pub fn len_non_filtered(&self) -> usize {
        self.data.len()
    }

    /// Row at `index` of the filtered view; `None` past the end.
    pub fn get_item(&self, index: usize) -> Option<&R> {
        self.filtered.get(index)
    }

    pub fn get_items(&self) -> &[R] {
        &self.filtered
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    pub fn has_filter_fn(&self) -> bool {
        self.filter_fn.is_some()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Start a new search from the first row, discarding any previous one.
    ///
    /// `max_matches` falls back to `ViewConfig::max_find_matches`. Returns
    /// `Ok(None)` when nothing matches; the search still counts as active.
    pub fn find(
        &mut self,
        expression: &str,
        max_matches: Option<usize>,
    ) -> Result<Option<FindPosition>> {
        let search = self.search_fn.as_deref().ok_or(ViewError::NoSearchFunction)?;
        let max_matches = max_matches.or(self.config.max_find_matches);
        Ok(self.finder.find(&self.filtered, search, expression, max_matches))
    }

    /// Next match after the current one, wrapping to the first row.
    pub fn find_next(&mut self) -> Result<Option<FindPosition>> {
        match self.search_fn.as_deref() {
            Some(search) => self.finder.find_next(&self.filtered, search),
            None => Err(ViewError::NoActiveSearch),
        }
    }

    /// Previous match before the current one, wrapping to the last row.
    pub fn find_previous(&mut self) -> Result<Option<FindPosition>> {
        match self.search_fn.as_deref() {
            Some(search) => self.finder.find_previous(&self.filtered, search),
            None => Err(ViewError::NoActiveSearch),
        }
    }

    pub fn find_position(&self) -> Option<FindPosition> {
        self.finder.position()
    }

    pub fn find_expression(&self) -> Option<&str> {
        self.finder.expression()
    }

    pub fn is_searching(&self) -> bool {
        self.finder.is_active()
    }

    pub fn clear_find(&mut self) {
        self.finder.clear();
    }

    /// Subscribe here to hear the filtered row count after push, filter and
    /// clear_filter.
    pub fn on_row_count_change(&mut self) -> &mut Emitter<usize> {
        &mut self.row_count_changed
    }

    pub fn on_filter_state_change(&mut self) -> &mut Emitter<()> {
        &mut self.filter_state_changed
    }

    pub fn on_sort_complete(&mut self) -> &mut Emitter<SortArgs> {
        &mut self.sort_completed
    }
}

impl<R: FieldAccess> TableDataView<R> {
    /// Distinct texts of `field` over the row store, in default sort order.
    /// Missing values are skipped.
    pub fn column_values(&self, field: &str) -> Vec<String> {
        distinct_field_values(&self.data, field)
    }

    /// Like `column_values`, over the filtered view.
    pub fn filtered_column_values(&self, field: &str) -> Vec<String> {
        distinct_field_values(&self.filtered, field)
    }
}

fn distinct_field_values<R: FieldAccess>(rows: &[R], field: &str) -> Vec<String> {
    let unique: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| row.field(field).map(|v| v.into_owned()))
        .collect();

    let mut values: Vec<String> = unique.into_iter().collect();
    values.sort_by(|a, b| compare_field_values(Some(a.as_str()), Some(b.as_str())));
    values
}

impl<R> fmt::Debug for TableDataView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDataView")
            .field("rows", &self.data.len())
            .field("filtered_rows", &self.filtered.len())
            .field("filter_active", &self.filter_active)
            .field("searching", &self.finder.is_active())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for `TableDataView`
pub struct TableDataViewBuilder<R> {
    rows: Vec<R>,
    search_fn: Option<SearchFactory<R>>,
    sort_fn: Option<SortFn<R>>,
    filter_fn: Option<FilterFn<R>>,
    config: ViewConfig,
}

impl<R: Clone> TableDataViewBuilder<R> {
    pub fn new(rows: Vec<R>) -> Self {
        TableDataViewBuilder {
            rows,
            search_fn: None,
            sort_fn: None,
            filter_fn: None,
            config: ViewConfig::default(),
        }
    }

    pub fn search_fn<F>(mut self, search_fn: F) -> Self
    where
        F: Fn(&R, &str) -> Vec<usize> + 'static,
    {
        let factory: SearchFactory<R> =
            Box::new(move |_: bool| -> SearchFn<R> { Box::new(search_fn) });
        self.search_fn = Some(factory);
        self
    }

    pub fn sort_fn<F>(mut self, sort_fn: F) -> Self
    where
        F: Fn(&SortArgs, &mut [R]) + 'static,
    {
        self.sort_fn = Some(Box::new(sort_fn));
        self
    }

    pub fn filter_fn<F>(mut self, filter_fn: F) -> Self
    where
        F: Fn(&[R]) -> Vec<R> + 'static,
    {
        self.filter_fn = Some(Box::new(filter_fn));
        self
    }

    pub fn config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TableDataView<R> {
        let capacity = self.config.initial_capacity.max(self.rows.len());
        let mut data = Vec::with_capacity(capacity);
        data.extend(self.rows);
        let mut filtered = Vec::with_capacity(capacity);
        filtered.extend_from_slice(&data);

        let case_sensitive = self.config.case_sensitive_search;

        TableDataView {
            data,
            filtered,
            search_fn: self.search_fn.map(|factory| factory(case_sensitive)),
            sort_fn: self.sort_fn,
            filter_fn: self.filter_fn,
            filter_active: false,
            finder: Finder::new(),
            config: self.config,
            row_count_changed: Emitter::new(),
            filter_state_changed: Emitter::new(),
            sort_completed: Emitter::new(),
        }
    }
}

impl<R: Clone + FieldAccess + 'static> TableDataViewBuilder<R> {
    /// Search by substring over the named columns. Case sensitivity comes
    /// from the view's `ViewConfig`.
    pub fn text_search(mut self, columns: Vec<String>) -> Self {
        let factory: SearchFactory<R> = Box::new(move |case_sensitive: bool| {
            column_text_search(columns, case_sensitive)
        });
        self.search_fn = Some(factory);
        self
    }

    /// Sort with the numeric-aware default comparator.
    pub fn default_sort(mut self) -> Self {
        self.sort_fn = Some(Box::new(|args: &SortArgs, rows: &mut [R]| {
            rows.sort_by(|a, b| default_sort(a, b, args))
        }));
        self
    }
}

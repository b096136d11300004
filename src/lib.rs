/// GridView - Virtualized Table Data View
///
/// The in-memory backing store for a virtualized grid: an unfiltered row
/// store, a filtered view produced by a caller-supplied filter function,
/// change notifications for observers, an incremental wrap-around cell
/// search and a numeric-aware default sort comparator.
///
/// Rows are opaque to the view. Bring your own row type, or use `Record`
/// (a column-name to `CellValue` map) with the `FieldAccess`-based helpers.

pub mod config;
pub mod error;
pub mod event;
pub mod find;
pub mod record;
pub mod sort;
pub mod view;

pub use config::ViewConfig;
pub use error::{Result, ViewError};
pub use event::{Emitter, ListenerId};
pub use find::{column_text_search, FindPosition, Finder, SearchFn};
pub use record::{record, record_from_json, CellValue, FieldAccess, Record};
pub use sort::{compare_field_values, default_sort, SortArgs, SortOrder};
pub use view::{FilterFn, SortFn, TableDataView, TableDataViewBuilder};

/// Default sorting for GridView
///
/// The default comparator orders a field's text in three tiers:
///
/// 1. missing values (field absent or null)
/// 2. numeric text, compared by magnitude
/// 3. any other text, compared lexically
///
/// Text counts as numeric when, after trimming, it parses as a finite
/// `f64` in full. `"10b"` is therefore text, not the number 10.
///
/// `SortOrder::Descending` reverses the whole ascending order, missing
/// values included, so they come last.
///
/// # Examples
///
/// ```
/// use gridview::{default_sort, record, CellValue, SortArgs};
///
/// let mut rows = vec![
///     record([("v", CellValue::from("10b"))]),
///     record([("v", CellValue::Null)]),
///     record([("v", CellValue::from("100.01"))]),
///     record([("v", CellValue::from("10.1"))]),
/// ];
///
/// let args = SortArgs::ascending("v");
/// rows.sort_by(|a, b| default_sort(a, b, &args));
///
/// let order: Vec<_> = rows.iter().map(|r| r["v"].to_string()).collect();
/// assert_eq!(order, vec!["", "10.1", "100.01", "10b"]);
/// ```

use crate::record::FieldAccess;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

/// Arguments of a sort request, as issued by a grid header click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortArgs {
    /// Field (column) to sort by
    pub field: String,
    pub order: SortOrder,
    /// Set when the grid is building a multi-column sort. The pairwise
    /// comparison is the same either way.
    #[serde(default)]
    pub multi_column: bool,
}

impl SortArgs {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        SortArgs {
            field: field.into(),
            order,
            multi_column: false,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Descending)
    }

    pub fn multi_column(mut self, multi_column: bool) -> Self {
        self.multi_column = multi_column;
        self
    }
}

/// A field's value as classified for sorting
#[derive(Debug, Clone, PartialEq)]
enum SortKey<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn classify(value: Option<&'a str>) -> Self {
        match value {
            None => SortKey::Missing,
            Some(text) => match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SortKey::Number(n),
                _ => SortKey::Text(text),
            },
        }
    }

    fn tier(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

/// Compare two optional field texts in ascending order.
pub fn compare_field_values(a: Option<&str>, b: Option<&str>) -> Ordering {
    let key_a = SortKey::classify(a);
    let key_b = SortKey::classify(b);

    match (&key_a, &key_b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => key_a.tier().cmp(&key_b.tier()),
    }
}

/// Default comparator for two rows on `args.field`.
pub fn default_sort<R: FieldAccess + ?Sized>(a: &R, b: &R, args: &SortArgs) -> Ordering {
    let value_a = a.field(&args.field);
    let value_b = b.field(&args.field);

    let base_cmp = compare_field_values(value_a.as_deref(), value_b.as_deref());

    match args.order {
        SortOrder::Ascending => base_cmp,
        SortOrder::Descending => base_cmp.reverse(),
    }
}

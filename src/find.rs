/// Incremental search over a grid of rows
///
/// A `Finder` walks (row, column) matches of a text expression one at a time.
/// The caller supplies a search function that reports, for one row, the
/// ordered indices of the columns that match. Matches are discovered lazily:
/// the search function is invoked row by row as the cursor moves, never for
/// the whole table up front, and rows are searched again on each pass after
/// a wrap.
///
/// # Sessions
///
/// - `find` opens a session and returns the first match from row 0.
/// - `find_next` / `find_previous` move the cursor, wrapping around the
///   table ends. They fail with `ViewError::NoActiveSearch` when no
///   session is open.
/// - `clear` closes the session.
///
/// When a session is opened with `max_matches = Some(n)` (n > 0), only the
/// first `n` matches in table order are candidates. Once they are found,
/// navigation cycles among them. `Some(0)` is the same as `None`.

use crate::error::{Result, ViewError};
use crate::record::FieldAccess;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Caller-supplied search: matching column indices for one row.
pub type SearchFn<R> = Box<dyn Fn(&R, &str) -> Vec<usize>>;

/// A match location in the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindPosition {
    pub row: usize,
    pub column: usize,
}

impl FindPosition {
    pub fn new(row: usize, column: usize) -> Self {
        FindPosition { row, column }
    }
}

/// Position inside one row's match list
#[derive(Debug, Clone)]
struct RowCursor {
    row: usize,
    columns: Vec<usize>,
    column_pos: usize,
}

impl RowCursor {
    /// `None` once the cached columns were dropped by `invalidate`.
    fn position(&self) -> Option<FindPosition> {
        self.columns
            .get(self.column_pos)
            .map(|&column| FindPosition::new(self.row, column))
    }
}

/// First-n matches of a capped session
#[derive(Debug)]
struct CandidateSet {
    limit: usize,
    matches: Vec<FindPosition>,
    pos: usize,
    /// No further candidates will be discovered.
    complete: bool,
}

#[derive(Debug)]
struct Session {
    expression: String,
    /// Navigation cursor for uncapped sessions, discovery cursor for capped
    cursor: Option<RowCursor>,
    candidates: Option<CandidateSet>,
}

#[derive(Debug, Default)]
pub struct Finder {
    session: Option<Session>,
}

/// First row in `indices` with at least one matching column.
fn scan<R, I>(
    rows: &[R],
    search: &dyn Fn(&R, &str) -> Vec<usize>,
    expression: &str,
    indices: I,
) -> Option<(usize, Vec<usize>)>
where
    I: IntoIterator<Item = usize>,
{
    for row in indices {
        let Some(item) = rows.get(row) else {
            continue;
        };
        let columns = search(item, expression);
        trace!("find: row {} -> {} matching column(s)", row, columns.len());
        if !columns.is_empty() {
            return Some((row, columns));
        }
    }
    None
}

/// Move `at` to the next match. With `wrap`, continues from row 0 after the
/// last row. Leaves `at` untouched when nothing is found.
fn step_forward<R>(
    at: &mut Option<RowCursor>,
    rows: &[R],
    search: &dyn Fn(&R, &str) -> Vec<usize>,
    expression: &str,
    wrap: bool,
) -> Option<FindPosition> {
    if let Some(cursor) = at.as_mut() {
        if cursor.column_pos + 1 < cursor.columns.len() {
            cursor.column_pos += 1;
            return cursor.position();
        }
    }

    let len = rows.len();
    let start = at.as_ref().map(|c| c.row + 1).unwrap_or(0);

    let mut found = scan(rows, search, expression, start..len);
    if found.is_none() && wrap && start > 0 {
        debug!("find: wrapping to first row for {:?}", expression);
        found = scan(rows, search, expression, 0..start.min(len));
    }

    let (row, columns) = found?;
    let cursor = RowCursor {
        row,
        columns,
        column_pos: 0,
    };
    let position = cursor.position();
    *at = Some(cursor);
    position
}

fn step_backward<R>(
    at: &mut Option<RowCursor>,
    rows: &[R],
    search: &dyn Fn(&R, &str) -> Vec<usize>,
    expression: &str,
) -> Option<FindPosition> {
    if let Some(cursor) = at.as_mut() {
        if cursor.column_pos > 0 {
            cursor.column_pos -= 1;
            return cursor.position();
        }
    }

    let len = rows.len();
    let end = at.as_ref().map(|c| c.row.min(len)).unwrap_or(len);

    let mut found = scan(rows, search, expression, (0..end).rev());
    if found.is_none() && end < len {
        debug!("find: wrapping to last row for {:?}", expression);
        found = scan(rows, search, expression, (end..len).rev());
    }

    let (row, columns) = found?;
    let cursor = RowCursor {
        row,
        column_pos: columns.len() - 1,
        columns,
    };
    let position = cursor.position();
    *at = Some(cursor);
    position
}

impl Session {
    /// Discover the next candidate after the last one found. Returns false
    /// once the candidate set is closed.
    fn discover<R>(&mut self, rows: &[R], search: &dyn Fn(&R, &str) -> Vec<usize>) -> bool {
        let Some(set) = self.candidates.as_mut() else {
            return false;
        };
        if set.complete {
            return false;
        }

        match step_forward(&mut self.cursor, rows, search, &self.expression, false) {
            Some(position) => {
                set.matches.push(position);
                if set.matches.len() >= set.limit {
                    debug!(
                        "find: match cap of {} reached for {:?}",
                        set.limit, self.expression
                    );
                    set.complete = true;
                }
                true
            }
            None => {
                set.complete = true;
                false
            }
        }
    }

    fn position(&self) -> Option<FindPosition> {
        match &self.candidates {
            Some(set) => set.matches.get(set.pos).copied(),
            None => self.cursor.as_ref().and_then(RowCursor::position),
        }
    }
}

impl Finder {
    pub fn new() -> Self {
        Finder { session: None }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn expression(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.expression.as_str())
    }

    /// The match the cursor is on, if any.
    pub fn position(&self) -> Option<FindPosition> {
        self.session.as_ref().and_then(Session::position)
    }

    /// Open a new session, discarding any previous one, and return the first
    /// match. `Ok`-shaped `None` means nothing matched; the session stays
    /// open so `find_next` keeps working.
    pub fn find<R>(
        &mut self,
        rows: &[R],
        search: &dyn Fn(&R, &str) -> Vec<usize>,
        expression: &str,
        max_matches: Option<usize>,
    ) -> Option<FindPosition> {
        let limit = max_matches.filter(|&n| n > 0);
        debug!(
            "find: new search {:?} over {} row(s), max matches {:?}",
            expression,
            rows.len(),
            limit
        );

        let mut session = Session {
            expression: expression.to_string(),
            cursor: None,
            candidates: limit.map(|limit| CandidateSet {
                limit,
                matches: Vec::new(),
                pos: 0,
                complete: false,
            }),
        };

        let first = if session.candidates.is_some() {
            session.discover(rows, search);
            session.position()
        } else {
            step_forward(&mut session.cursor, rows, search, expression, false)
        };

        self.session = Some(session);
        first
    }

    pub fn find_next<R>(
        &mut self,
        rows: &[R],
        search: &dyn Fn(&R, &str) -> Vec<usize>,
    ) -> Result<Option<FindPosition>> {
        let session = self.session.as_mut().ok_or(ViewError::NoActiveSearch)?;

        if session.candidates.is_none() {
            return Ok(step_forward(
                &mut session.cursor,
                rows,
                search,
                &session.expression,
                true,
            ));
        }

        let needs_discovery = session
            .candidates
            .as_ref()
            .map(|set| set.pos + 1 >= set.matches.len())
            .unwrap_or(false);
        let discovered = needs_discovery && session.discover(rows, search);

        if let Some(set) = session.candidates.as_mut() {
            if set.matches.is_empty() {
                return Ok(None);
            }
            if discovered {
                set.pos = set.matches.len() - 1;
            } else if needs_discovery {
                set.pos = 0;
            } else {
                set.pos += 1;
            }
        }
        Ok(session.position())
    }

    pub fn find_previous<R>(
        &mut self,
        rows: &[R],
        search: &dyn Fn(&R, &str) -> Vec<usize>,
    ) -> Result<Option<FindPosition>> {
        let session = self.session.as_mut().ok_or(ViewError::NoActiveSearch)?;

        if session.candidates.is_none() {
            return Ok(step_backward(
                &mut session.cursor,
                rows,
                search,
                &session.expression,
            ));
        }

        let at_first = session
            .candidates
            .as_ref()
            .map(|set| set.pos == 0)
            .unwrap_or(true);
        if at_first {
            // Wrapping backwards needs the full candidate set
            while session.discover(rows, search) {}
        }

        if let Some(set) = session.candidates.as_mut() {
            if set.matches.is_empty() {
                return Ok(None);
            }
            set.pos = if at_first {
                set.matches.len() - 1
            } else {
                set.pos - 1
            };
        }
        Ok(session.position())
    }

    pub fn clear(&mut self) {
        if self.session.take().is_some() {
            debug!("find: search cleared");
        }
    }

    /// The rows were replaced or reordered. Cached match columns and
    /// candidates no longer describe them, so drop them and keep only the
    /// expression and the row the cursor was on. Navigation resumes from
    /// the next row and searches every row again; a capped session starts
    /// collecting candidates from row 0.
    pub fn invalidate(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        debug!("find: rows changed, dropping cached matches for {:?}", session.expression);

        match session.candidates.as_mut() {
            Some(set) => {
                set.matches.clear();
                set.pos = 0;
                set.complete = false;
                session.cursor = None;
            }
            None => {
                if let Some(cursor) = session.cursor.as_mut() {
                    cursor.columns.clear();
                    cursor.column_pos = 0;
                }
            }
        }
    }

    /// Rows were appended after the last one. Existing positions stay
    /// valid; a capped session that ran out of rows before reaching its
    /// cap may discover more.
    pub fn rows_appended(&mut self) {
        if let Some(set) = self.session.as_mut().and_then(|s| s.candidates.as_mut()) {
            set.complete = set.matches.len() >= set.limit;
        }
    }
}

/// Build a search function over named columns for rows with `FieldAccess`.
///
/// A column matches when its text contains the expression. Missing values
/// never match, and neither does an empty expression. Returned indices are
/// positions in `columns`.
///
/// ```
/// use gridview::{column_text_search, record, CellValue, Record};
///
/// let search = column_text_search::<Record>(vec!["a".into(), "b".into()], false);
/// let row = record([("a", CellValue::from("Hello")), ("b", CellValue::from("help"))]);
/// assert_eq!(search(&row, "HEL"), vec![0, 1]);
/// assert_eq!(search(&row, "llo"), vec![0]);
/// ```
pub fn column_text_search<R>(columns: Vec<String>, case_sensitive: bool) -> SearchFn<R>
where
    R: FieldAccess + 'static,
{
    Box::new(move |row: &R, expression: &str| {
        if expression.is_empty() {
            return Vec::new();
        }
        let needle = if case_sensitive {
            expression.to_string()
        } else {
            expression.to_lowercase()
        };

        columns
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                row.field(name).map_or(false, |text| {
                    if case_sensitive {
                        text.contains(needle.as_str())
                    } else {
                        text.to_lowercase().contains(needle.as_str())
                    }
                })
            })
            .map(|(i, _)| i)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each row is a list of cell texts; a column matches on substring.
    fn grid(rows: usize, cols: usize) -> Vec<Vec<String>> {
        (0..rows)
            .map(|r| (0..cols).map(|_| format!("row {}", r)).collect())
            .collect()
    }

    fn contains(row: &Vec<String>, expression: &str) -> Vec<usize> {
        row.iter()
            .enumerate()
            .filter(|(_, cell)| cell.contains(expression))
            .map(|(i, _)| i)
            .collect()
    }

    fn pos(row: usize, column: usize) -> Option<FindPosition> {
        Some(FindPosition::new(row, column))
    }

    #[test]
    fn test_find_and_wrap_within_single_row() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "row 2", None), pos(2, 0));
        for col in 1..5 {
            assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, col));
        }
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.position(), pos(2, 0));
    }

    #[test]
    fn test_find_next_crosses_rows_and_wraps() {
        let rows = vec![
            vec!["a".to_string(), "x".to_string()],
            vec!["y".to_string(), "z".to_string()],
            vec!["x".to_string(), "x".to_string()],
        ];
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "x", None), pos(0, 1));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 1));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(0, 1));
    }

    #[test]
    fn test_find_previous_mirrors_next() {
        let rows = vec![
            vec!["a".to_string(), "x".to_string()],
            vec!["y".to_string(), "z".to_string()],
            vec!["x".to_string(), "x".to_string()],
        ];
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "x", None), pos(0, 1));
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), pos(2, 1));
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), pos(0, 1));
    }

    #[test]
    fn test_navigation_requires_session() {
        let rows = grid(3, 2);
        let mut finder = Finder::new();

        assert_eq!(finder.find_next(&rows, &contains), Err(ViewError::NoActiveSearch));
        assert_eq!(finder.find_previous(&rows, &contains), Err(ViewError::NoActiveSearch));

        finder.find(&rows, &contains, "row 1", None);
        assert!(finder.is_active());
        finder.clear();
        assert!(!finder.is_active());
        assert_eq!(finder.expression(), None);
        assert_eq!(finder.find_next(&rows, &contains), Err(ViewError::NoActiveSearch));
    }

    #[test]
    fn test_no_match_keeps_session_open() {
        let rows = grid(3, 2);
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "nothing", None), None);
        assert!(finder.is_active());
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), None);
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), None);
    }

    #[test]
    fn test_max_matches_caps_cycle() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "row 2", Some(2)), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 1));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 1));
    }

    #[test]
    fn test_max_matches_larger_than_total() {
        let rows = vec![
            vec!["x".to_string()],
            vec!["y".to_string()],
            vec!["x".to_string()],
        ];
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "x", Some(10)), pos(0, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(0, 0));
    }

    #[test]
    fn test_capped_previous_completes_candidates() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "row 2", Some(3)), pos(2, 0));
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), pos(2, 2));
        assert_eq!(finder.find_previous(&rows, &contains).unwrap(), pos(2, 1));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 2));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
    }

    #[test]
    fn test_zero_max_matches_is_uncapped() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();

        finder.find(&rows, &contains, "row 2", Some(0));
        for col in 1..5 {
            assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, col));
        }
    }

    #[test]
    fn test_search_is_lazy() {
        use std::cell::Cell;

        let rows = grid(100, 3);
        let calls = Cell::new(0);
        let counting = |row: &Vec<String>, exp: &str| {
            calls.set(calls.get() + 1);
            contains(row, exp)
        };

        let mut finder = Finder::new();
        assert_eq!(finder.find(&rows, &counting, "row 1", None), pos(1, 0));
        // Rows 0 and 1 only
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_rescans_rows_after_wrap() {
        let mut rows = grid(3, 1);
        let mut finder = Finder::new();

        assert_eq!(finder.find(&rows, &contains, "row 1", None), pos(1, 0));
        rows[0][0] = "row 1 copy".to_string();
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(0, 0));
    }

    #[test]
    fn test_cursor_past_shrunken_rows() {
        let rows = grid(10, 1);
        let mut finder = Finder::new();
        assert_eq!(finder.find(&rows, &contains, "row 8", None), pos(8, 0));

        let fewer = grid(3, 1);
        assert_eq!(finder.find_next(&fewer, &contains).unwrap(), None);

        let grown = vec![vec!["row 8".to_string()]; 2];
        assert_eq!(finder.find_next(&grown, &contains).unwrap(), pos(0, 0));
    }

    /// Same cells as `grid`, last row first.
    fn reversed_grid(rows: usize, cols: usize) -> Vec<Vec<String>> {
        let mut g = grid(rows, cols);
        g.reverse();
        g
    }

    #[test]
    fn test_invalidate_rescans_rows() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();
        assert_eq!(finder.find(&rows, &contains, "row 2", None), pos(2, 0));

        // "row 2" now lives at index 7
        let reordered = reversed_grid(10, 5);
        finder.invalidate();
        assert!(finder.is_active());
        assert_eq!(finder.position(), None);

        assert_eq!(finder.find_next(&reordered, &contains).unwrap(), pos(7, 0));
        assert_eq!(finder.find_next(&reordered, &contains).unwrap(), pos(7, 1));
    }

    #[test]
    fn test_invalidate_then_previous() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();
        finder.find(&rows, &contains, "row 2", None);
        finder.find_next(&rows, &contains).unwrap();

        let reordered = reversed_grid(10, 5);
        finder.invalidate();
        assert_eq!(finder.find_previous(&reordered, &contains).unwrap(), pos(7, 4));
    }

    #[test]
    fn test_invalidate_restarts_capped_candidates() {
        let rows = grid(10, 5);
        let mut finder = Finder::new();
        assert_eq!(finder.find(&rows, &contains, "row 2", Some(2)), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 1));

        let reordered = reversed_grid(10, 5);
        finder.invalidate();
        assert_eq!(finder.find_next(&reordered, &contains).unwrap(), pos(7, 0));
        assert_eq!(finder.find_next(&reordered, &contains).unwrap(), pos(7, 1));
        assert_eq!(finder.find_next(&reordered, &contains).unwrap(), pos(7, 0));
    }

    #[test]
    fn test_rows_appended_reopens_capped_discovery() {
        let mut rows = vec![vec!["x".to_string()], vec!["y".to_string()]];
        let mut finder = Finder::new();
        assert_eq!(finder.find(&rows, &contains, "x", Some(3)), pos(0, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(0, 0));

        rows.push(vec!["x".to_string()]);
        finder.rows_appended();
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(2, 0));
        assert_eq!(finder.find_next(&rows, &contains).unwrap(), pos(0, 0));
    }

    #[test]
    fn test_invalidate_without_session_is_noop() {
        let mut finder = Finder::new();
        finder.invalidate();
        finder.rows_appended();
        assert!(!finder.is_active());
    }
}

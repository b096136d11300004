/// Filter and Find Example
///
/// This example demonstrates:
/// - Building a TableDataView over JSON rows
/// - Watching row-count and filter-state notifications
/// - Filtering, streaming in more rows, clearing the filter
/// - Sorting with the default comparator
/// - Walking search matches with find / find_next / find_previous

use gridview::{record_from_json, Record, SortArgs, TableDataView, ViewConfig};
use serde_json::json;

fn main() -> gridview::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== GridView Filter and Find Example ===\n");

    // 1. Load rows
    let batch = json!([
        { "server": "prod-sql-01", "database": "sales", "sizeMb": "2048" },
        { "server": "prod-sql-01", "database": "hr", "sizeMb": "512" },
        { "server": "dev-sql-02", "database": "sales_dev", "sizeMb": "96.5" },
        { "server": "dev-sql-02", "database": "scratch", "sizeMb": null },
        { "server": "prod-sql-03", "database": "reporting", "sizeMb": "n/a" },
    ]);
    let rows = batch
        .as_array()
        .into_iter()
        .flatten()
        .map(record_from_json)
        .collect::<gridview::Result<Vec<Record>>>()?;

    let config = ViewConfig::from_json(r#"{ "maxFindMatches": 10 }"#)?;
    let mut view = TableDataView::builder(rows)
        .filter_fn(|rows: &[Record]| {
            rows.iter()
                .filter(|r| r["server"].to_string().starts_with("prod"))
                .cloned()
                .collect()
        })
        .text_search(vec!["server".into(), "database".into()])
        .default_sort()
        .config(config)
        .build();

    view.on_row_count_change()
        .subscribe(|count| println!("   [event] row count -> {}", count));
    view.on_filter_state_change()
        .subscribe(|_| println!("   [event] filter state changed"));

    println!("1. Loaded {} rows\n", view.len());

    // 2. Filter to production servers
    println!("2. Filtering to production servers...");
    view.filter();
    println!("   Showing {} of {}\n", view.len(), view.len_non_filtered());

    // 3. More rows arrive while filtered
    println!("3. Pushing two more rows...");
    let more = vec![
        record_from_json(&json!({ "server": "prod-sql-04", "database": "billing", "sizeMb": "300" }))?,
        record_from_json(&json!({ "server": "dev-sql-05", "database": "tmp", "sizeMb": "1" }))?,
    ];
    view.push(more);
    println!("   Showing {} of {}\n", view.len(), view.len_non_filtered());

    // 4. Sort by size
    println!("4. Sorting by sizeMb (descending)...");
    view.sort(SortArgs::descending("sizeMb"));
    for row in view.get_items() {
        println!("   {:<12} {:<10} {}", row["server"], row["database"], row["sizeMb"]);
    }
    println!();

    // 5. Search
    println!("5. Searching for \"sql-0\"...");
    if let Some(hit) = view.find("sql-0", None)? {
        println!("   first match at row {}, column {}", hit.row, hit.column);
        for _ in 0..3 {
            if let Some(hit) = view.find_next()? {
                println!("   next  match at row {}, column {}", hit.row, hit.column);
            }
        }
        if let Some(hit) = view.find_previous()? {
            println!("   prev  match at row {}, column {}", hit.row, hit.column);
        }
    }
    view.clear_find();
    println!();

    // 6. Clear the filter
    println!("6. Clearing filter...");
    view.clear_filter();
    println!("   Showing {} of {}", view.len(), view.len_non_filtered());
    println!("   Databases: {:?}", view.column_values("database"));

    println!("\n=== Example Complete ===");
    Ok(())
}

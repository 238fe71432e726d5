// src/source/table.rs
// =============================================================================
// This module reads link records out of an HTML table.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Expected layout (only the first <table> on the page is read):
//
//   <tr><td><a href="URL">Description</a></td><td>Category</td></tr>
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: For processing collections
// - Closures: Anonymous functions (|x| ...)
// =============================================================================

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::checker::InputRecord;

// Extracts the records from the first table in an HTML document
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   skip_header: whether the first <tr> is a header row
//
// Returns: the records in table order, or an error if there is no table
//
// Rows are silently dropped when they have fewer than two cells, or when the
// first cell has no link with a non-empty href.
pub fn extract_table_records(html: &str, skip_header: bool) -> Result<Vec<InputRecord>> {
    let document = Html::parse_document(html);

    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| anyhow!("No table found in the HTML document"))?;

    let start = if skip_header { 1 } else { 0 };
    let mut records = Vec::new();

    for row in table.select(&row_selector).skip(start) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < 2 {
            continue;
        }

        let link = match cells[0].select(&link_selector).next() {
            Some(link) => link,
            None => continue,
        };

        let href = match link.value().attr("href") {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };

        let description = stripped_text(link)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        records.push(InputRecord {
            description,
            url: href.to_string(),
            category: stripped_text(cells[1]),
        });
    }

    Ok(records)
}

// Joins the element's text nodes, each trimmed, with nothing in between
fn stripped_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid CSS selector '{}': {:?}", css, e))
}

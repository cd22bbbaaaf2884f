//! Concordance results model
//!
//! The server answers a search with an HTML table (a pandas frame rendered
//! as `<table class="dataframe">`). The results container shows that table
//! with sortable columns, or the raw text when no table was returned.

use crate::model::fragment::text_content;
use scraper::{ElementRef, Html, Selector};
use std::cmp::Ordering;
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static THEAD_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("thead tr").unwrap());
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static ANY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            SortOrder::Ascending => "▲",
            SortOrder::Descending => "▼",
        }
    }
}

/// A results table with headers and body rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub sort: Option<(usize, SortOrder)>,
}

impl ResultsTable {
    /// Build a table from the first `<table>` in the markup
    pub fn from_html(markup: &str) -> Option<Self> {
        let html = Html::parse_fragment(markup);
        let table = html.select(&TABLE).next()?;
        Some(Self::from_table(table))
    }

    fn from_table(table: ElementRef<'_>) -> Self {
        let cells = |row: ElementRef<'_>| -> Vec<String> { row.select(&CELL).map(text_content).collect() };

        let header_row = table.select(&THEAD_ROW).last();
        let (headers, rows) = match header_row {
            Some(head) => {
                let rows = table.select(&BODY_ROW).map(cells).collect();
                (cells(head), rows)
            }
            None => {
                let mut all = table.select(&ANY_ROW).map(cells);
                let headers = all.next().unwrap_or_default();
                (headers, all.collect())
            }
        };

        Self {
            headers,
            rows,
            sort: None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Sort rows by a column. Numeric cells compare as numbers.
    pub fn sort_by(&mut self, column: usize, order: SortOrder) {
        self.rows.sort_by(|a, b| {
            let ord = compare_cells(
                a.get(column).map(String::as_str).unwrap_or(""),
                b.get(column).map(String::as_str).unwrap_or(""),
            );
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        self.sort = Some((column, order));
    }

    /// Sort by `column`, flipping the order if it is already the sort column
    pub fn toggle_sort(&mut self, column: usize) {
        let order = match self.sort {
            Some((current, order)) if current == column => order.toggled(),
            _ => SortOrder::Ascending,
        };
        self.sort_by(column, order);
    }
}

/// Finite numbers only: words like "inf" and pandas' `NaN` stay text
fn numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Contents of the results container
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsView {
    #[default]
    Empty,
    Table(ResultsTable),
    Text(String),
}

impl ResultsView {
    /// Replace the container with a search response
    pub fn from_response(markup: &str) -> Self {
        if let Some(table) = ResultsTable::from_html(markup) {
            return ResultsView::Table(table);
        }
        let html = Html::parse_fragment(markup);
        let text = text_content(html.root_element());
        if text.is_empty() {
            ResultsView::Empty
        } else {
            ResultsView::Text(text)
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ResultsView::Table(table) => table.rows.len(),
            _ => 0,
        }
    }
}

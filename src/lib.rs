//! sheetzero - Google Sheets data normalizer with schema inference
//!
//! This crate turns raw Google Sheets payloads (the `spreadsheets.get` grid
//! shape or the legacy GViz column shape) into clean, uniform records, infers
//! a per-column `{type, format}` schema, derives KPI summaries, and renders
//! the result as CSV or pretty-printed JSON. Fetching and rendering are left
//! to the caller; this crate only consumes already-retrieved payload strings.
//!
//! # Quick Start
//!
//! ```rust
//! use sheetzero::{sheets_from_api_json, NormalizerBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A spreadsheets.get response body (includeGridData=true)
//!     let body = r#"{"sheets": [{"properties": {"title": "Sales"}, "data": [{"rowData": [
//!         {"values": [{"formattedValue": "Platform"}, {"formattedValue": "Revenue"}]},
//!         {"values": [{"formattedValue": "YouTube"}, {"formattedValue": "$1,200"}]},
//!         {"values": [{"formattedValue": "TikTok"}, {"formattedValue": "$800"}]}
//!     ]}]}]}"#;
//!
//!     let normalizer = NormalizerBuilder::new().build()?;
//!     let sheets = sheets_from_api_json(body)?;
//!     let set = normalizer.normalize(&sheets);
//!
//!     // Inspect the active (largest) sheet
//!     let sheet = set.active().expect("non-empty sheet");
//!     assert_eq!(sheet.len(), 2);
//!
//!     // Infer a schema and derive KPI cards
//!     let schema = normalizer.infer_schema(sheet);
//!     let kpis = normalizer.generate_kpis(sheet, &schema);
//!     assert_eq!(kpis[0].title, "Total Revenue");
//!
//!     // Export
//!     let csv = normalizer.to_csv(&set)?;
//!     assert!(csv.starts_with("Platform,Revenue"));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Legacy GViz Responses
//!
//! ```rust
//! use sheetzero::{table_from_gviz_response, NormalizerBuilder, RawSheet, RawTable};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let body = concat!(
//!     "google.visualization.Query.setResponse(",
//!     r#"{"status":"ok","table":{"cols":[{"id":"A","label":"Name","type":"string"}],"#,
//!     r#""rows":[{"c":[{"v":"Alice"}]}]}}"#,
//!     ");"
//! );
//!
//! let table = table_from_gviz_response(body)?;
//! let sheets = vec![RawSheet::new("Sheet1", RawTable::Columns(table))];
//!
//! let normalizer = NormalizerBuilder::new().build()?;
//! let set = normalizer.normalize(&sheets);
//! assert_eq!(set.active().unwrap().records[0]["Name"], "Alice");
//! # Ok(())
//! # }
//! ```
//!
//! # Interactive Views
//!
//! ```rust
//! use sheetzero::TableView;
//! use serde_json::json;
//!
//! let mut record = serde_json::Map::new();
//! record.insert("Name".to_string(), json!("Alice"));
//! record.insert("Score".to_string(), json!("42"));
//!
//! let mut view = TableView::new(vec![record]);
//! view.search("ali");
//! assert_eq!(view.visible().len(), 1);
//! view.sort_by("Score");
//! ```

mod api;
mod builder;
mod clean;
mod error;
mod header;
mod kpi;
mod normalize;
mod output;
mod schema;
mod source;
mod types;
mod view;

// 公開API
pub use api::{EmptySentinel, SortDirection};
pub use builder::{Normalizer, NormalizerBuilder};
pub use error::SheetZeroError;
pub use kpi::{generate_kpis, Kpi, KpiFormat, KpiValue};
pub use output::OutputFormatter;
pub use schema::{detect_column_type, parse_value, ColumnFormat, ColumnSchema, ColumnType, Schema};
pub use source::{
    sheets_from_api_json, table_from_gviz_response, ColumnTable, GridCell, GridRow, GridSheet,
    GvizCell, GvizColumn, GvizRow, RawSheet, RawTable, SheetRef,
};
pub use types::{Record, Sheet, SheetSet};
pub use view::TableView;

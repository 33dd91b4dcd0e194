//! Integration Tests for sheetzero
//!
//! Full-pipeline tests: payload parsing → normalization → cleaning →
//! schema inference → KPI generation → CSV/JSON export.

use sheetzero::{
    sheets_from_api_json, table_from_gviz_response, ColumnType, EmptySentinel, KpiValue,
    NormalizerBuilder, RawSheet, RawTable, SheetRef, SheetZeroError,
};

// Helper module for generating test fixtures
mod fixtures {
    use serde_json::{json, Value};

    /// Build a spreadsheets.get response body from sheet names and rows
    pub fn api_body(sheets: &[(&str, &[&[&str]])]) -> String {
        let sheets: Vec<Value> = sheets
            .iter()
            .map(|(title, rows)| {
                let row_data: Vec<Value> = rows
                    .iter()
                    .map(|cells| {
                        let values: Vec<Value> = cells
                            .iter()
                            .map(|cell| json!({ "formattedValue": cell }))
                            .collect();
                        json!({ "values": values })
                    })
                    .collect();
                json!({
                    "properties": { "title": title, "sheetId": 0 },
                    "data": [{ "rowData": row_data }]
                })
            })
            .collect();
        json!({ "sheets": sheets }).to_string()
    }

    /// Build a GViz JSONP response body from column labels and cell values
    pub fn gviz_body(labels: &[&str], rows: &[&[&str]]) -> String {
        let cols: Vec<Value> = labels
            .iter()
            .map(|label| json!({ "id": "", "label": label, "type": "string" }))
            .collect();
        let rows: Vec<Value> = rows
            .iter()
            .map(|cells| {
                let c: Vec<Value> = cells.iter().map(|cell| json!({ "v": cell })).collect();
                json!({ "c": c })
            })
            .collect();
        format!(
            "/*O_o*/\ngoogle.visualization.Query.setResponse({});",
            json!({ "status": "ok", "table": { "cols": cols, "rows": rows } })
        )
    }

    /// A small sales sheet exercising currency, category and date columns
    pub fn sales_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Platform", "Revenue", "Posted Date"],
            vec!["YouTube", "$1,200", "2024-01-05"],
            vec!["TikTok", "$800", "2024-01-06"],
            vec!["YouTube", "$2,400", "2024-01-07"],
        ]
    }
}

fn sales_body() -> String {
    let rows = fixtures::sales_rows();
    let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
    fixtures::api_body(&[("Sales", &rows)])
}

#[test]
fn test_full_pipeline_from_api_body() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    let sheets = sheets_from_api_json(&sales_body()).unwrap();
    let set = normalizer.normalize(&sheets);

    let sheet = set.active().unwrap();
    assert_eq!(sheet.name, "Sales");
    assert_eq!(sheet.len(), 3);
    assert_eq!(sheet.keys(), vec!["Platform", "Revenue", "Posted Date"]);

    let schema = normalizer.infer_schema(sheet);
    assert_eq!(
        schema.get("Platform").unwrap().column_type,
        ColumnType::Category
    );
    assert_eq!(
        schema.get("Revenue").unwrap().column_type,
        ColumnType::Currency
    );
    assert_eq!(
        schema.get("Posted Date").unwrap().column_type,
        ColumnType::Date
    );

    let kpis = normalizer.generate_kpis(sheet, &schema);
    assert_eq!(kpis[0].title, "Total Revenue");
    assert_eq!(kpis[0].value, KpiValue::Number(4400.0));
    let top = kpis.iter().find(|k| k.title == "Top Platform").unwrap();
    assert_eq!(top.value, KpiValue::Text("YouTube".to_string()));
    assert_eq!(top.subtitle.as_deref(), Some("2 records"));
}

#[test]
fn test_gviz_and_api_shapes_agree() {
    let normalizer = NormalizerBuilder::new().build().unwrap();

    let api_sheets = sheets_from_api_json(&sales_body()).unwrap();
    let api_set = normalizer.normalize(&api_sheets);

    let gviz = fixtures::gviz_body(
        &["Platform", "Revenue", "Posted Date"],
        &[
            &["YouTube", "$1,200", "2024-01-05"],
            &["TikTok", "$800", "2024-01-06"],
            &["YouTube", "$2,400", "2024-01-07"],
        ],
    );
    let table = table_from_gviz_response(&gviz).unwrap();
    let gviz_sheets = vec![RawSheet::new("Sales", RawTable::Columns(table))];
    let gviz_set = normalizer.normalize(&gviz_sheets);

    // 両形状から同一のレコード、同一のCSVが得られる
    assert_eq!(
        api_set.active().unwrap().records,
        gviz_set.active().unwrap().records
    );
    assert_eq!(
        normalizer.to_csv(&api_set).unwrap(),
        normalizer.to_csv(&gviz_set).unwrap()
    );
}

#[test]
fn test_multi_sheet_sorting_and_empty_drop() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    let body = fixtures::api_body(&[
        ("Tiny", &[&["Key"][..], &["v1"][..]]),
        ("Blank", &[]),
        (
            "Main",
            &[
                &["Name", "Score"][..],
                &["Alice", "10"][..],
                &["Bob", "20"][..],
                &["Cara", "30"][..],
            ],
        ),
    ]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);

    assert_eq!(set.len(), 2);
    assert_eq!(set.active().unwrap().name, "Main");
    assert!(set.get("Blank").is_none());
}

#[test]
fn test_csv_has_rows_plus_one_lines() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    let body = fixtures::api_body(&[
        ("A", &[&["X"][..], &["1"][..], &["2"][..]]),
        ("B", &[&["Y"][..], &["3"][..]]),
    ]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);
    let csv = normalizer.to_csv(&set).unwrap();

    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines.len(), 4);
    // ヘッダーは全シートのキー和集合（初出順＝大きいシートが先）
    assert_eq!(lines[0], "X,Y");
    assert!(!csv.ends_with('\n'));
}

#[test]
fn test_json_round_trip_preserves_records() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    let sheets = sheets_from_api_json(&sales_body()).unwrap();
    let set = normalizer.normalize(&sheets);

    let json = normalizer.to_json(&set).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["Sales"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["Sales"][0]["Platform"], "YouTube");
    assert_eq!(parsed["Sales"][1]["Revenue"], "$800");
}

#[test]
fn test_null_sentinel_appears_in_json_output() {
    let normalizer = NormalizerBuilder::new()
        .with_sentinel(EmptySentinel::Null)
        .build()
        .unwrap();
    let body = fixtures::api_body(&[(
        "S",
        &[
            &["Name", "Note"][..],
            &["Alice", "kept"][..],
            &["Bob", ""][..],
        ],
    )]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);
    let json = normalizer.to_json(&set).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["S"][1]["Note"], serde_json::Value::Null);
    // CSVではどちらのセンチネルも空フィールドになる
    let csv = normalizer.to_csv(&set).unwrap();
    assert!(csv.ends_with("\"Bob\",\"\""));
}

#[test]
fn test_messy_sheet_is_cleaned() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    // プレースホルダー行の下にヘッダー、空行と空列、前後空白入りの値
    let body = fixtures::api_body(&[(
        "Messy",
        &[
            &["", "", "0"][..],
            &["Name", "Age", "Empty"][..],
            &["  Alice  ", "30", ""][..],
            &["", "", ""][..],
            &["Bob", "25", ""][..],
        ],
    )]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);
    let sheet = set.active().unwrap();

    assert_eq!(sheet.len(), 2);
    // 空列"Empty"は落ち、値はトリムされる
    assert_eq!(sheet.keys(), vec!["Name", "Age"]);
    assert_eq!(sheet.records[0]["Name"], "Alice");
    assert_eq!(sheet.records[1]["Name"], "Bob");
}

#[test]
fn test_header_row_disabled() {
    let normalizer = NormalizerBuilder::new()
        .with_header_row(false)
        .build()
        .unwrap();
    let body = fixtures::api_body(&[("S", &[&["Alice", "30"][..], &["Bob", "25"][..]])]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);
    let sheet = set.active().unwrap();

    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.keys(), vec!["Column_0", "Column_1"]);
    assert_eq!(sheet.records[0]["Column_0"], "Alice");
}

#[test]
fn test_gviz_error_response_is_source_error() {
    let body = concat!(
        "google.visualization.Query.setResponse(",
        r#"{"status":"error","errors":[{"reason":"access_denied","#,
        r#""detailed_message":"Sheet is private"}]}"#,
        ");"
    );

    match table_from_gviz_response(body) {
        Err(SheetZeroError::Source(msg)) => {
            assert!(msg.contains("Sheet is private"));
        }
        other => panic!("Expected Source error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_empty_spreadsheet_is_source_error() {
    match sheets_from_api_json(r#"{"sheets": []}"#) {
        Err(SheetZeroError::Source(msg)) => {
            assert!(msg.contains("No sheets found"));
        }
        other => panic!("Expected Source error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_malformed_payload_is_json_error() {
    assert!(matches!(
        sheets_from_api_json("{not json"),
        Err(SheetZeroError::Json(_))
    ));
}

#[test]
fn test_sheet_ref_parse_from_pasted_url() {
    let sheet_ref = SheetRef::parse(
        "https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit#gid=0",
    )
    .unwrap();

    assert_eq!(sheet_ref.id, "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms");
    assert_eq!(sheet_ref.gid.as_deref(), Some("0"));
}

#[test]
fn test_all_rows_blank_yields_empty_set() {
    let normalizer = NormalizerBuilder::new().build().unwrap();
    let body = fixtures::api_body(&[("S", &[&["", ""][..], &["", ""][..]])]);

    let sheets = sheets_from_api_json(&body).unwrap();
    let set = normalizer.normalize(&sheets);

    assert!(set.is_empty());
    assert_eq!(normalizer.to_csv(&set).unwrap(), "");
    assert_eq!(normalizer.to_json(&set).unwrap(), "{}");
}

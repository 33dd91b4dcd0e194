//! Normalization Module
//!
//! ソースデータ（グリッド形式／列形式）のレコード化を行うモジュール。
//! ヘッダー検出、キー合成、空値の番兵置換を経て順序付きレコード列を構築し、
//! 複数シートをRayonで並列に正規化・クリーニングして[`SheetSet`]に
//! まとめます。
//!
//! 空のシートは破棄され、残りはレコード数の降順で並びます（同数は元順を維持）。

use rayon::prelude::*;

use crate::api::EmptySentinel;
use crate::builder::NormalizeConfig;
use crate::clean::clean_records;
use crate::header::detect_header_row;
use crate::source::{RawSheet, RawTable};
use crate::types::{Record, Sheet, SheetSet};

/// セル値をレコード値へ変換（空ならば番兵値）
fn cell_value(text: Option<String>, sentinel: EmptySentinel) -> serde_json::Value {
    match text {
        Some(s) if !s.trim().is_empty() => serde_json::Value::String(s),
        _ => sentinel.value(),
    }
}

/// キーをレコードへ挿入（重複キーは後勝ち）
fn insert_key(record: &mut Record, key: String, value: serde_json::Value) {
    if record.contains_key(&key) {
        tracing::warn!(key = %key, "duplicate column key, keeping last value");
    }
    record.insert(key, value);
}

/// グリッド形式テーブルをレコード列へ変換
fn grid_to_records(table: &RawTable, config: &NormalizeConfig) -> Vec<Record> {
    let header_row = if config.use_header_row {
        detect_header_row(table, config.header_scan_limit)
    } else {
        0
    };

    let headers: Vec<String> = if config.use_header_row {
        table.display_row(header_row)
    } else {
        Vec::new()
    };
    let data_start = if config.use_header_row {
        header_row + 1
    } else {
        0
    };

    let mut records = Vec::new();
    for row in data_start..table.row_count() {
        let mut record = Record::new();
        for col in 0..table.row_len(row) {
            let key = headers
                .get(col)
                .filter(|h| !h.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| format!("Column_{}", col));
            let value = cell_value(table.formatted_value(row, col), config.sentinel);
            insert_key(&mut record, key, value);
        }
        records.push(record);
    }
    records
}

/// 列形式テーブルをレコード列へ変換
///
/// 列ラベルがヘッダーとして本データより優先されるため、ヘッダー検出は
/// 行いません。全列がレコードに現れます（値のない列は番兵値）。
fn columns_to_records(table: &RawTable, config: &NormalizeConfig) -> Vec<Record> {
    let mut headers = Vec::with_capacity(table.col_count());
    for col in 0..table.col_count() {
        let key = table
            .column_label(col)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Column_{}", col));
        headers.push(key);
    }

    let mut records = Vec::new();
    for row in 0..table.row_count() {
        let mut record = Record::new();
        for (col, key) in headers.iter().enumerate() {
            let value = cell_value(table.formatted_value(row, col), config.sentinel);
            insert_key(&mut record, key.clone(), value);
        }
        records.push(record);
    }
    records
}

/// 1テーブル分のレコード列を構築
///
/// クリーニング前の生レコードです。通常は[`normalize_sheets`]経由で
/// クリーニングとセットで実行します。
pub(crate) fn normalize_table(table: &RawTable, config: &NormalizeConfig) -> Vec<Record> {
    if table.is_column_oriented() {
        columns_to_records(table, config)
    } else {
        grid_to_records(table, config)
    }
}

/// 複数シートを並列に正規化
///
/// 各シートを正規化・クリーニングし、空のシートを破棄した上で
/// レコード数の降順に並べます（安定ソート、同数は元順）。
/// 先頭のシートがアクティブシートです。
pub(crate) fn normalize_sheets(sheets: &[RawSheet], config: &NormalizeConfig) -> SheetSet {
    let mut normalized: Vec<Sheet> = sheets
        .par_iter()
        .map(|raw| {
            let records = normalize_table(&raw.table, config);
            let records = clean_records(records, config.sentinel);
            Sheet::new(raw.name.clone(), records)
        })
        .filter(|sheet| !sheet.is_empty())
        .collect();

    normalized.sort_by(|a, b| b.len().cmp(&a.len()));

    tracing::debug!(sheets = normalized.len(), "normalized sheet set");
    SheetSet::new(normalized)
}

//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use std::io::Write;

use serde_json::{Map, Value};

use crate::error::SheetZeroError;
use crate::types::{value_text, SheetSet};

/// JSON形式のフォーマッター
///
/// シート名をキー、レコード配列を値とするオブジェクトを整形付きで
/// 出力します。シート集合が空の場合は空のオブジェクトです。
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render<W: Write>(&self, set: &SheetSet, writer: &mut W) -> Result<(), SheetZeroError> {
        let mut root = Map::new();
        for sheet in &set.sheets {
            let records: Vec<Value> = sheet
                .records
                .iter()
                .map(|record| Value::Object(record.clone()))
                .collect();
            root.insert(sheet.name.clone(), Value::Array(records));
        }

        serde_json::to_writer_pretty(&mut *writer, &Value::Object(root))?;
        writer.flush()?;
        Ok(())
    }
}

/// CSV形式のフォーマッター
///
/// 全シートのレコードを1つの行集合にフラット化します。ヘッダー行は
/// 全レコードのキーの和集合（初出順）、各データセルは二重引用符で
/// 囲み、内部の引用符は`""`にエスケープします。行は`\n`で連結され、
/// 末尾の改行はありません。
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn render<W: Write>(&self, set: &SheetSet, writer: &mut W) -> Result<(), SheetZeroError> {
        let mut headers: Vec<&str> = Vec::new();
        let mut row_count = 0usize;
        for sheet in &set.sheets {
            for record in &sheet.records {
                row_count += 1;
                for key in record.keys() {
                    if !headers.iter().any(|h| h == key) {
                        headers.push(key);
                    }
                }
            }
        }

        // レコードが1件もない場合は空文字列（エラーではない）
        if row_count == 0 {
            return Ok(());
        }

        write!(writer, "{}", headers.join(","))?;

        for sheet in &set.sheets {
            for record in &sheet.records {
                let mut line = String::new();
                for (idx, header) in headers.iter().enumerate() {
                    if idx > 0 {
                        line.push(',');
                    }
                    let value = record.get(*header).map(value_text).unwrap_or("");
                    line.push('"');
                    line.push_str(&value.replace('"', "\"\""));
                    line.push('"');
                }
                write!(writer, "\n{}", line)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

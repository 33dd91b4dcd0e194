//! Header Detection Module
//!
//! 行指向グリッドの先頭付近からヘッダー行らしい行を採点して選ぶモジュール。
//! 列指向テーブルでは列ラベルが正であり、この検出は行われません。

use tracing::debug;

use crate::source::RawTable;

/// プレースホルダー値かどうかを判定
///
/// 空文字列・`-`・`0`・`null`はヘッダーセルとして無価値とみなします。
fn is_placeholder(value: &str) -> bool {
    matches!(value, "" | "-" | "0" | "null")
}

/// 候補行のヘッダー適性スコアを算出
///
/// スコア = 有効な文字列セル数 − 0.5 × プレースホルダーセル数。
/// 有効セルに重複があるとレコードのキー一意性が壊れるため失格（−1）です。
/// 有効セルが1つもない行も失格です。
pub(crate) fn score_header_row(values: &[String]) -> f64 {
    if values.is_empty() {
        return -1.0;
    }

    let mut valid_strings = 0usize;
    let mut placeholders = 0usize;
    let mut unique = std::collections::HashSet::new();

    for value in values {
        let trimmed = value.trim();
        if is_placeholder(trimmed) {
            placeholders += 1;
        } else {
            valid_strings += 1;
            unique.insert(trimmed);
        }
    }

    if unique.len() != valid_strings {
        return -1.0;
    }
    if valid_strings == 0 {
        return -1.0;
    }

    valid_strings as f64 - (placeholders as f64 * 0.5)
}

/// ヘッダー行のインデックスを検出
///
/// 先頭から`scan_limit`行（既定10行）を採点し、最大スコアの行を返します。
/// 同点は先に現れた行が勝ちます。どの行も正のスコアにならない場合は
/// 行0にフォールバックします（エラーにはしません）。
///
/// データ行は戻り値 + 1 から始まります。
pub(crate) fn detect_header_row(table: &RawTable, scan_limit: usize) -> usize {
    let limit = table.row_count().min(scan_limit);

    let mut best_index = 0usize;
    let mut max_score = f64::NEG_INFINITY;

    for row in 0..limit {
        let values = table.display_row(row);
        let score = score_header_row(&values);
        if score > max_score {
            max_score = score;
            best_index = row;
        }
    }

    if max_score <= 0.0 {
        debug!(scan_limit, "no positive header score, defaulting to row 0");
        return 0;
    }

    best_index
}

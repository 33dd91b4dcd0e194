//! Data Cleaner Module
//!
//! 正規化直後のレコード列を整形するモジュール。空行・空列の除去、
//! 名前付きキーとフォールバックキーの調停、キー集合の統一、値のトリムを
//! この順序で行います（順序は正しさに影響します）。
//!
//! クリーニング後の不変条件:
//! すべてのレコードが同一の順序付きキー集合を持ち、どのキーについても
//! 少なくとも1レコードが空でない値を持ちます（シート全体が空の場合を除く）。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::EmptySentinel;
use crate::types::{value_is_empty, Record};

/// フォールバック由来の「位置キー」パターン
///
/// `Column_<n>`（合成ヘッダー）または単一の大文字（スプレッドシートの列ID）。
static POSITIONAL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Column_\d+|[A-Z])$").expect("valid regex"));

/// キーが位置キー（フォールバック由来）かどうかを判定
fn is_positional_key(key: &str) -> bool {
    POSITIONAL_KEY_RE.is_match(key)
}

/// レコードのすべての値が空かどうかを判定
fn record_is_empty(record: &Record) -> bool {
    record.values().all(value_is_empty)
}

/// レコード列をクリーニング
///
/// # 手順（順序固定）
///
/// 1. 全値が空のレコードを除去
/// 2. 生存レコード全体のキー和集合を出現順で収集
/// 3. 名前付きキーと位置キーが混在する場合、名前付きキーのみを採用
///    （位置キーはフォールバックの産物として破棄）
/// 4. 全レコードを最終キー集合に再インデックス（欠損はセンチネルで充填）
/// 5. 全レコードで空の列（キー）を除去
/// 6. 生存キー集合に再インデックス
/// 7. 文字列値の前後空白をトリム
pub(crate) fn clean_records(records: Vec<Record>, sentinel: EmptySentinel) -> Vec<Record> {
    // 1. 完全に空のレコードを除去
    let mut cleaned: Vec<Record> = records
        .into_iter()
        .filter(|record| !record_is_empty(record))
        .collect();

    if cleaned.is_empty() {
        return Vec::new();
    }

    // 2. キー和集合（出現順）
    let mut all_keys: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for record in &cleaned {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                all_keys.push(key.clone());
            }
        }
    }

    // 3. 名前付きキーを優先
    let has_named = all_keys.iter().any(|k| !is_positional_key(k));
    let has_positional = all_keys.iter().any(|k| is_positional_key(k));
    let final_keys: Vec<String> = if has_named && has_positional {
        all_keys
            .into_iter()
            .filter(|k| !is_positional_key(k))
            .collect()
    } else {
        all_keys
    };

    // 4. 最終キー集合への再インデックス
    cleaned = reindex(cleaned, &final_keys, sentinel);

    // 5. 全レコードで空の列を除去
    let keys_with_data: Vec<String> = final_keys
        .into_iter()
        .filter(|key| {
            cleaned
                .iter()
                .any(|record| record.get(key).map(|v| !value_is_empty(v)).unwrap_or(false))
        })
        .collect();

    // 6. 生存キー集合への再インデックス
    cleaned = reindex(cleaned, &keys_with_data, sentinel);

    // 7. 文字列値のトリム
    for record in &mut cleaned {
        for (_, value) in record.iter_mut() {
            if let serde_json::Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *value = serde_json::Value::String(trimmed.to_string());
                }
            }
        }
    }

    cleaned
}

/// 各レコードを指定キー集合の順序に再構成
///
/// 欠損キーはセンチネルで充填し、キー集合外のエントリは落とします。
fn reindex(records: Vec<Record>, keys: &[String], sentinel: EmptySentinel) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let mut reindexed = Record::new();
            for key in keys {
                let value = record.get(key).cloned().unwrap_or_else(|| sentinel.value());
                reindexed.insert(key.clone(), value);
            }
            reindexed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        let mut rec = Record::new();
        for (key, value) in pairs {
            rec.insert((*key).to_string(), value.clone());
        }
        rec
    }

    fn keys_of(record: &Record) -> Vec<&str> {
        record.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_positional_key_patterns() {
        assert!(is_positional_key("Column_0"));
        assert!(is_positional_key("Column_12"));
        assert!(is_positional_key("A"));
        assert!(is_positional_key("Z"));
        assert!(!is_positional_key("Name"));
        assert!(!is_positional_key("Column_"));
        assert!(!is_positional_key("AB"));
        assert!(!is_positional_key("a"));
    }

    #[test]
    fn test_drops_all_empty_records() {
        let records = vec![
            record(&[("Name", json!("Alice")), ("Age", json!("30"))]),
            record(&[("Name", json!("")), ("Age", json!("  "))]),
            record(&[("Name", Value::Null), ("Age", Value::Null)]),
        ];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0]["Name"], json!("Alice"));
    }

    #[test]
    fn test_all_records_share_ordered_key_set() {
        let records = vec![
            record(&[("Name", json!("Alice"))]),
            record(&[("Age", json!("30")), ("Name", json!("Bob"))]),
        ];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(cleaned.len(), 2);
        // キー和集合の出現順（Name, Age）で全レコードが統一される
        assert_eq!(keys_of(&cleaned[0]), vec!["Name", "Age"]);
        assert_eq!(keys_of(&cleaned[1]), vec!["Name", "Age"]);
        assert_eq!(cleaned[0]["Age"], json!(""));
    }

    #[test]
    fn test_named_keys_win_over_positional() {
        let records = vec![
            record(&[("Name", json!("Alice")), ("Column_1", json!("stale"))]),
            record(&[("Name", json!("Bob")), ("B", json!("stale"))]),
        ];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(keys_of(&cleaned[0]), vec!["Name"]);
    }

    #[test]
    fn test_only_positional_keys_are_kept() {
        let records = vec![record(&[
            ("Column_0", json!("a")),
            ("Column_1", json!("b")),
        ])];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(keys_of(&cleaned[0]), vec!["Column_0", "Column_1"]);
    }

    #[test]
    fn test_drops_entirely_empty_column() {
        let records = vec![
            record(&[("Name", json!("Alice")), ("Notes", json!(""))]),
            record(&[("Name", json!("Bob")), ("Notes", json!("   "))]),
        ];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(keys_of(&cleaned[0]), vec!["Name"]);
        assert_eq!(keys_of(&cleaned[1]), vec!["Name"]);
    }

    #[test]
    fn test_trims_string_values() {
        let records = vec![record(&[("Name", json!("  Alice  "))])];

        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert_eq!(cleaned[0]["Name"], json!("Alice"));
    }

    #[test]
    fn test_null_sentinel_fills_missing_keys() {
        let records = vec![
            record(&[("Name", json!("Alice")), ("Age", json!("30"))]),
            record(&[("Name", json!("Bob"))]),
        ];

        let cleaned = clean_records(records, EmptySentinel::Null);
        assert_eq!(cleaned[1]["Age"], Value::Null);
    }

    #[test]
    fn test_empty_input() {
        let cleaned = clean_records(Vec::new(), EmptySentinel::EmptyString);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_whole_sheet_empty_after_cleaning() {
        let records = vec![
            record(&[("A", json!(""))]),
            record(&[("A", Value::Null)]),
        ];
        let cleaned = clean_records(records, EmptySentinel::EmptyString);
        assert!(cleaned.is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// 任意のキー/値からレコードを構築する戦略
        fn arb_record() -> impl Strategy<Value = Record> {
            proptest::collection::btree_map(
                "[A-Za-z_][A-Za-z0-9_]{0,6}",
                prop_oneof![
                    Just(Value::Null),
                    "[ a-z0-9$,%.-]{0,10}".prop_map(Value::String),
                ],
                0..6,
            )
            .prop_map(|map| {
                let mut record = Record::new();
                for (key, value) in map {
                    record.insert(key, value);
                }
                record
            })
        }

        proptest! {
            /// クリーニング後、全レコードのキー集合は同一・同順
            #[test]
            fn cleaned_records_share_key_set(records in proptest::collection::vec(arb_record(), 0..8)) {
                let cleaned = clean_records(records, EmptySentinel::EmptyString);

                if let Some(first) = cleaned.first() {
                    let expected: Vec<&String> = first.keys().collect();
                    for record in &cleaned {
                        let keys: Vec<&String> = record.keys().collect();
                        prop_assert_eq!(&keys, &expected);
                    }
                }
            }

            /// クリーニング後、全レコードで空になる列は存在しない
            #[test]
            fn cleaned_records_have_no_empty_column(records in proptest::collection::vec(arb_record(), 0..8)) {
                let cleaned = clean_records(records, EmptySentinel::EmptyString);

                if let Some(first) = cleaned.first() {
                    for key in first.keys() {
                        let has_data = cleaned
                            .iter()
                            .any(|record| record.get(key).map(|v| !value_is_empty(v)).unwrap_or(false));
                        prop_assert!(has_data, "column '{}' is entirely empty", key);
                    }
                }
            }

        }
    }
}

//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde_json::Value;

/// 空セルのセンチネル値
///
/// 正規化時に「データなし」を表すために使用する値を指定します。
/// 1回の正規化呼び出しにつき1つのセンチネルが一貫して使用され、
/// クリーニング段階ではどちらも「空」として扱われます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EmptySentinel {
    /// 空文字列 `""`（デフォルト）
    ///
    /// JSON出力では `""` として現れます。CSV出力では空フィールドになります。
    EmptyString,

    /// JSONの `null`
    ///
    /// JSON出力では `null` として現れます。CSV出力では空フィールドになります。
    Null,
}

impl EmptySentinel {
    /// センチネルに対応するJSON値を生成
    pub(crate) fn value(&self) -> Value {
        match self {
            EmptySentinel::EmptyString => Value::String(String::new()),
            EmptySentinel::Null => Value::Null,
        }
    }
}

impl Default for EmptySentinel {
    fn default() -> Self {
        EmptySentinel::EmptyString
    }
}

/// ソート方向
///
/// `TableView::sort_by`で使用する列ソートの方向を指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// 昇順（デフォルト）
    Ascending,

    /// 降順
    Descending,
}

impl SortDirection {
    /// 反対方向を返す
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

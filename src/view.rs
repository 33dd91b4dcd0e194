//! Table View Module
//!
//! 正規化済みレコードに対する検索フィルターとソートの状態を保持する
//! モジュール。フィルターは元レコードを変更せず、表示対象の部分集合を
//! 別に保持します。ソートは表示中の集合（フィルター中はフィルター結果
//! のみ）をインプレースで並べ替えます。

use crate::api::SortDirection;
use crate::schema::parse_value;
use crate::types::{value_text, Record};

/// 検索・ソート状態付きのテーブルビュー
///
/// # 使用例
///
/// ```rust
/// use sheetzero::TableView;
/// use serde_json::json;
///
/// let mut record = serde_json::Map::new();
/// record.insert("Name".to_string(), json!("Alice"));
///
/// let mut view = TableView::new(vec![record]);
/// view.search("ali");
/// assert_eq!(view.visible().len(), 1);
/// view.search("zzz");
/// assert_eq!(view.visible().len(), 0);
/// view.clear_filter();
/// assert_eq!(view.visible().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableView {
    /// 全レコード
    records: Vec<Record>,

    /// フィルター結果（フィルターなしの場合は`None`）
    filtered: Option<Vec<Record>>,

    /// 現在のソート列と方向
    sort: Option<(String, SortDirection)>,
}

impl TableView {
    /// 新しいビューを生成
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            filtered: None,
            sort: None,
        }
    }

    /// 表示対象のレコードを取得（フィルター中はフィルター結果）
    pub fn visible(&self) -> &[Record] {
        self.filtered.as_deref().unwrap_or(&self.records)
    }

    /// 現在のソート状態を取得
    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// 検索フィルターを適用
    ///
    /// クエリを小文字化し、レコードのいずれかの値に（大文字小文字を無視した）
    /// 部分一致があるレコードだけを残します。空のクエリはフィルター解除です。
    pub fn search(&mut self, query: &str) {
        let query = query.to_lowercase();
        if query.is_empty() {
            self.filtered = None;
            return;
        }

        self.filtered = Some(
            self.records
                .iter()
                .filter(|record| {
                    record
                        .values()
                        .any(|value| value_text(value).to_lowercase().contains(&query))
                })
                .cloned()
                .collect(),
        );
    }

    /// フィルターを解除
    pub fn clear_filter(&mut self) {
        self.filtered = None;
    }

    /// 指定列でソート
    ///
    /// 同じ列を続けて指定すると方向が反転し、別の列を指定すると昇順から
    /// 始まります。両方の値がゼロでない数値に解釈できるペアは数値比較、
    /// それ以外は文字列比較です。
    pub fn sort_by(&mut self, column: &str) {
        let direction = match &self.sort {
            Some((current, dir)) if current == column => dir.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some((column.to_string(), direction));

        let target = match self.filtered.as_mut() {
            Some(filtered) => filtered,
            None => &mut self.records,
        };
        target.sort_by(|a, b| {
            let text_a = a.get(column).map(value_text).unwrap_or("");
            let text_b = b.get(column).map(value_text).unwrap_or("");
            let num_a = parse_value(text_a);
            let num_b = parse_value(text_b);

            let ordering = if num_a != 0.0 && num_b != 0.0 {
                num_a.partial_cmp(&num_b).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                text_a.cmp(text_b)
            };
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// レコードを差し替え（フィルター・ソート状態はリセット）
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.filtered = None;
        self.sort = None;
    }
}

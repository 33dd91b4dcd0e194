//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;
use serde_json::Value;

/// 正規化された1行分のレコード
///
/// 列キー（文字列）からセル値へのマッピングです。挿入順を保持するため、
/// `serde_json`の`preserve_order`フィーチャーによる順序付きマップを使用します。
///
/// 値は常に`Value::String`または`Value::Null`のいずれかです（センチネルの
/// ポリシーに依存）。クリーニング後、同一シート内のすべてのレコードは
/// 同一のキー集合を同一の順序で持ちます。
pub type Record = serde_json::Map<String, Value>;

/// セル値が「空」かどうかを判定
///
/// `null`、空文字列、および空白のみの文字列を空として扱います。
/// どちらのセンチネル（`""` / `null`）もここで吸収されます。
pub(crate) fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// セル値をテキストとして取得（`null`は空文字列）
pub(crate) fn value_text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

/// 名前付きのレコード集合（1シート分）
///
/// クリーニング後の不変条件: `records`内のすべてのレコードは同一の
/// 順序付きキー集合を持ち、全レコードで空になる列は存在しません。
#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    /// シート名
    pub name: String,

    /// 正規化・クリーニング済みのレコード列
    pub records: Vec<Record>,
}

impl Sheet {
    /// 新しいシートを生成
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// レコード数を取得
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// レコードが1件もないかどうかを判定
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// シートの列キーを順序付きで取得
    ///
    /// クリーニング後は全レコードが同一キー集合を持つため、
    /// 先頭レコードのキー順をそのまま返します。空シートは空のリストです。
    pub fn keys(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|record| record.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// 正規化されたシートの集合
///
/// シートはレコード数の降順に並びます（最大のシートが先頭＝アクティブ）。
/// クリーニング後に空になったシートは含まれません。
#[derive(Debug, Clone, Default)]
pub struct SheetSet {
    /// シートのリスト（レコード数の降順）
    pub sheets: Vec<Sheet>,
}

impl SheetSet {
    /// 新しいシート集合を生成
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// アクティブシート（最大のシート）を取得
    pub fn active(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// シート数を取得
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// シートが1つもないかどうかを判定
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// 名前でシートを検索
    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

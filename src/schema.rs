//! Schema Inference Module
//!
//! クリーニング済みシートの各列について`{type, format}`を推論するモジュール。
//! 推論は順序付きルールリスト（述語 → 結果）として実装されており、
//! ヘッダー名のヒューリスティックが値形状のヒューリスティックより先に
//! 評価されます。ルールはディスパッチロジックに触れずに個別にテスト・
//! 拡張できます。
//!
//! スキーマはシートごとに独立して再計算されます（シート間でマージされません）。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::types::{value_is_empty, value_text, Sheet};

/// 数値プレフィックスのパターン（`parseFloat`相当の先頭一致）
static NUMERIC_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid regex"));

/// 列の論理型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 自由テキスト
    Text,
    /// 数値
    Number,
    /// 通貨
    Currency,
    /// パーセンテージ
    Percentage,
    /// 日付
    Date,
    /// カテゴリ（少数の離散値）
    Category,
    /// URL
    Url,
    /// メールアドレス
    Email,
}

impl ColumnType {
    /// 数値系の型（集計対象）かどうかを判定
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Currency | ColumnType::Percentage
        )
    }
}

/// 列の表示フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnFormat {
    /// 既定の表示
    #[serde(rename = "default")]
    Default,
    /// 数値
    #[serde(rename = "number")]
    Number,
    /// 大きな数値（桁区切り）
    #[serde(rename = "largeNumber")]
    LargeNumber,
    /// 通貨
    #[serde(rename = "money")]
    Money,
    /// パーセント
    #[serde(rename = "percent")]
    Percent,
    /// 日付
    #[serde(rename = "date")]
    Date,
    /// バッジ表示
    #[serde(rename = "badge")]
    Badge,
    /// リンク
    #[serde(rename = "link")]
    Link,
    /// メールリンク
    #[serde(rename = "email")]
    Email,
    /// 長文（折りたたみ表示）
    #[serde(rename = "longtext")]
    LongText,
}

/// 1列分の推論結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    /// 列の論理型
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// 列の表示フォーマット
    pub format: ColumnFormat,
}

impl ColumnSchema {
    /// 新しいColumnSchemaを生成
    pub const fn new(column_type: ColumnType, format: ColumnFormat) -> Self {
        Self {
            column_type,
            format,
        }
    }

    /// 既定のスキーマ（text / default）
    pub const fn text_default() -> Self {
        Self::new(ColumnType::Text, ColumnFormat::Default)
    }
}

/// シート1枚分のスキーマ（キー → ColumnSchema、キー順を保持）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnSchema)>,
}

impl Schema {
    /// キーに対応するスキーマを取得
    pub fn get(&self, key: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, schema)| schema)
    }

    /// (キー, スキーマ)のイテレーターを取得（キー順）
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnSchema)> {
        self.columns
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
    }

    /// キーのイテレーターを取得（キー順）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// 列数を取得
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// 列が1つもないかどうかを判定
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, schema) in &self.columns {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

/// セル値を数値として解釈
///
/// 通貨・パーセント・桁区切り・空白の記号（`$ , % 空白`）を取り除いた上で、
/// 文字列先頭の数値部分を浮動小数点数として解析します（`parseFloat`相当）。
/// 解析できない値は`0.0`です。
///
/// # 使用例
///
/// ```rust
/// use sheetzero::parse_value;
///
/// assert_eq!(parse_value("$1,200.50"), 1200.5);
/// assert_eq!(parse_value("85%"), 85.0);
/// assert_eq!(parse_value("n/a"), 0.0);
/// ```
pub fn parse_value(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();

    NUMERIC_PREFIX_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// 推論ルール（述語 + 結果）
///
/// 小文字化済みのヘッダー名とサンプル値を受け取り、マッチすれば
/// スキーマを返します。リスト中の最初にマッチしたルールが勝ちます。
struct InferenceRule {
    /// ルール名（デバッグ・テスト用）
    name: &'static str,

    /// 判定関数
    apply: fn(header: &str, samples: &[&str]) -> Option<ColumnSchema>,
}

/// ヘッダー名にいずれかのキーワードが含まれるかを判定
fn header_contains(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| header.contains(kw))
}

/// 順序付き推論ルールリスト
///
/// 名前ベースのルールが値形状ベースのルール（numeric）より先に並びます。
const RULES: &[InferenceRule] = &[
    InferenceRule {
        name: "date_time",
        apply: |header, _| {
            header_contains(header, &["date", "time"])
                .then(|| ColumnSchema::new(ColumnType::Date, ColumnFormat::Date))
        },
    },
    InferenceRule {
        name: "category",
        apply: |header, _| {
            header_contains(header, &["platform", "category", "type", "status"])
                .then(|| ColumnSchema::new(ColumnType::Category, ColumnFormat::Badge))
        },
    },
    InferenceRule {
        name: "identifier",
        apply: |header, _| {
            (header.contains("id") && !header.contains("video"))
                .then(ColumnSchema::text_default)
        },
    },
    InferenceRule {
        name: "currency",
        apply: |header, samples| {
            let keyword = header_contains(
                header,
                &[
                    "$", "price", "cost", "amount", "profit", "sale", "revenue", "rev",
                ],
            );
            let currency_shaped = samples
                .iter()
                .any(|v| v.contains('$') || v.contains(','));
            (keyword && currency_shaped)
                .then(|| ColumnSchema::new(ColumnType::Currency, ColumnFormat::Money))
        },
    },
    InferenceRule {
        name: "percentage",
        apply: |header, _| {
            header_contains(header, &["%", "percent", "roi", "rate"])
                .then(|| ColumnSchema::new(ColumnType::Percentage, ColumnFormat::Percent))
        },
    },
    InferenceRule {
        name: "url",
        apply: |header, _| {
            header_contains(header, &["url", "link", "website"])
                .then(|| ColumnSchema::new(ColumnType::Url, ColumnFormat::Link))
        },
    },
    InferenceRule {
        name: "email",
        apply: |header, _| {
            header
                .contains("email")
                .then(|| ColumnSchema::new(ColumnType::Email, ColumnFormat::Email))
        },
    },
    InferenceRule {
        name: "longtext",
        apply: |header, _| {
            header_contains(header, &["note", "desc", "comment"])
                .then(|| ColumnSchema::new(ColumnType::Text, ColumnFormat::LongText))
        },
    },
    InferenceRule {
        name: "numeric",
        apply: |_, samples| {
            // ゼロに解析される値はカウントしない（0に化けるテキストの誤検出防止）
            let numeric_count = samples
                .iter()
                .filter(|v| parse_value(v) != 0.0 && !v.trim().is_empty())
                .count();
            let ratio = numeric_count as f64 / samples.len() as f64;
            if ratio <= 0.7 {
                return None;
            }

            let avg: f64 =
                samples.iter().map(|v| parse_value(v)).sum::<f64>() / samples.len() as f64;
            let format = if avg > 10000.0 {
                ColumnFormat::LargeNumber
            } else {
                ColumnFormat::Number
            };
            Some(ColumnSchema::new(ColumnType::Number, format))
        },
    },
];

/// 1列分の型を検出
///
/// サンプルが空の場合は`{text, default}`です。それ以外は順序付きルール
/// リストを先頭から評価し、最初にマッチした結果を返します。
/// どのルールにもマッチしなければ`{text, default}`です。
pub fn detect_column_type(samples: &[&str], header_name: &str) -> ColumnSchema {
    if samples.is_empty() {
        return ColumnSchema::text_default();
    }

    let header = header_name.to_lowercase();
    for rule in RULES {
        if let Some(schema) = (rule.apply)(&header, samples) {
            tracing::trace!(rule = rule.name, header = header_name, "schema rule matched");
            return schema;
        }
    }

    ColumnSchema::text_default()
}

/// シート全体のスキーマを推論
///
/// 各キーについて先頭`sample_limit`レコード（既定20件）の値から空値を除いた
/// サンプルを取り、ヘッダー名と合わせて型を検出します。
pub(crate) fn infer_schema(sheet: &Sheet, sample_limit: usize) -> Schema {
    let mut columns = Vec::new();

    let keys: Vec<String> = sheet.keys().iter().map(|k| k.to_string()).collect();
    for key in keys {
        let samples: Vec<&str> = sheet
            .records
            .iter()
            .take(sample_limit)
            .filter_map(|record| record.get(&key))
            .filter(|value| !value_is_empty(value))
            .map(|value| value_text(value))
            .collect();

        let schema = detect_column_type(&samples, &key);
        columns.push((key, schema));
    }

    Schema { columns }
}

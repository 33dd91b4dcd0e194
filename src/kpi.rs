//! KPI Module
//!
//! クリーニング済みレコードとスキーマからサマリーKPIカードを導出する
//! モジュール。KPIは最大4件で、数値列・カテゴリ列の有無に応じて
//! 合計／最頻カテゴリ／平均／ユニーク数のスロットが埋まります。
//!
//! トレンド値はデータから導出できる場合のみ設定されます（現状は常に`None`）。

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

use crate::schema::{parse_value, ColumnFormat, ColumnSchema, ColumnType, Schema};
use crate::types::{value_text, Record};

/// KPIの値（数値またはテキスト）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KpiValue {
    /// 数値
    Number(f64),
    /// テキスト
    Text(String),
}

/// KPIの表示フォーマット
///
/// 数値KPIは由来する列のフォーマットを引き継ぎ、カテゴリKPIは`text`です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiFormat {
    /// テキスト表示
    Text,
    /// 由来列のフォーマットを引き継ぐ
    Column(ColumnFormat),
}

impl Serialize for KpiFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KpiFormat::Text => serializer.serialize_str("text"),
            KpiFormat::Column(format) => format.serialize(serializer),
        }
    }
}

/// 1枚のKPIカード
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    /// タイトル（例: `Total Revenue`）
    pub title: String,

    /// 値
    pub value: KpiValue,

    /// 表示フォーマット
    pub format: KpiFormat,

    /// トレンド表示（導出できない場合は省略）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,

    /// サブタイトル（例: `12 records`）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Kpi {
    fn new(title: String, value: KpiValue, format: KpiFormat) -> Self {
        Self {
            title,
            value,
            format,
            trend: None,
            subtitle: None,
        }
    }
}

/// 指定列の値を数値として収集
fn numeric_values(records: &[Record], key: &str) -> Vec<f64> {
    records
        .iter()
        .map(|record| {
            record
                .get(key)
                .map(|value| parse_value(value_text(value)))
                .unwrap_or(0.0)
        })
        .collect()
}

/// カテゴリ列の最頻値を計数
///
/// 空値は`Unk`として計数されます。出現数が同じ場合は先に現れた
/// カテゴリが勝ちます。
fn top_category(records: &[Record], key: &str) -> Option<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let raw = record.get(key).map(value_text).unwrap_or("");
        let category = if raw.is_empty() { "Unk" } else { raw };
        match counts.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category.to_string(), 1)),
        }
    }

    let mut top: Option<(String, usize)> = None;
    for (name, count) in counts {
        match &top {
            Some((_, best)) if count <= *best => {}
            _ => top = Some((name, count)),
        }
    }
    top
}

/// レコードとスキーマからKPIカードを生成
///
/// スロットの内訳:
///
/// 1. 最初の数値列の合計（通貨は常に合計、それ以外は平均が1000を超える
///    場合のみ合計、さもなくば平均）
/// 2. 最初のカテゴリ列の最頻値（サブタイトルにレコード数）
/// 3. 2番目の数値列の平均、なければ最初のカテゴリ列のユニーク数
///
/// 最大4件に切り詰められます。
///
/// # 使用例
///
/// ```rust
/// use sheetzero::NormalizerBuilder;
/// use sheetzero::{sheets_from_api_json, generate_kpis};
///
/// let body = r#"{"sheets": [{"properties": {"title": "Sales"}, "data": [{"rowData": [
///     {"values": [{"formattedValue": "Platform"}, {"formattedValue": "Revenue"}]},
///     {"values": [{"formattedValue": "YouTube"}, {"formattedValue": "$1,200"}]},
///     {"values": [{"formattedValue": "TikTok"}, {"formattedValue": "$800"}]}
/// ]}]}]}"#;
///
/// let normalizer = NormalizerBuilder::new().build().unwrap();
/// let sheets = sheets_from_api_json(body).unwrap();
/// let set = normalizer.normalize(&sheets);
/// let sheet = set.active().unwrap();
/// let schema = normalizer.infer_schema(sheet);
///
/// let kpis = generate_kpis(&sheet.records, &schema);
/// assert_eq!(kpis[0].title, "Total Revenue");
/// ```
pub fn generate_kpis(records: &[Record], schema: &Schema) -> Vec<Kpi> {
    let mut kpis = Vec::new();

    let numeric_columns: Vec<(&str, ColumnSchema)> = schema
        .iter()
        .filter(|(_, col)| col.column_type.is_numeric())
        .map(|(name, col)| (name, *col))
        .collect();
    let category_columns: Vec<&str> = schema
        .iter()
        .filter(|(_, col)| col.column_type == ColumnType::Category)
        .map(|(name, _)| name)
        .collect();

    // 最初の数値列: 合計または平均
    if let Some(&(col, col_schema)) = numeric_columns.first() {
        let values = numeric_values(records, col);
        let total: f64 = values.iter().sum();
        let avg = total / values.len() as f64;
        let value = if col_schema.column_type == ColumnType::Currency || avg > 1000.0 {
            total
        } else {
            avg
        };
        kpis.push(Kpi::new(
            format!("Total {}", col),
            KpiValue::Number(value),
            KpiFormat::Column(col_schema.format),
        ));
    }

    // 最頻カテゴリ
    if let Some(&col) = category_columns.first() {
        if let Some((top, count)) = top_category(records, col) {
            let mut kpi = Kpi::new(format!("Top {}", col), KpiValue::Text(top), KpiFormat::Text);
            kpi.subtitle = Some(format!("{} records", count));
            kpis.push(kpi);
        }
    }

    // 2番目の数値列の平均、なければユニークカテゴリ数
    if numeric_columns.len() > 1 {
        let (col, col_schema) = numeric_columns[1];
        let values = numeric_values(records, col);
        let avg: f64 = values.iter().sum::<f64>() / values.len() as f64;
        kpis.push(Kpi::new(
            format!("Avg {}", col),
            KpiValue::Number(avg),
            KpiFormat::Column(col_schema.format),
        ));
    } else if let Some(&col) = category_columns.first() {
        let unique: BTreeSet<String> = records
            .iter()
            .map(|record| {
                record
                    .get(col)
                    .map(|value| value_text(value).to_string())
                    .unwrap_or_default()
            })
            .collect();
        kpis.push(Kpi::new(
            "Unique Categories".to_string(),
            KpiValue::Number(unique.len() as f64),
            KpiFormat::Column(ColumnFormat::Number),
        ));
    }

    kpis.truncate(4);
    kpis
}

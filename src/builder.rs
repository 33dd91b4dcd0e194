//! Builder Module
//!
//! Fluent Builder APIを提供し、`Normalizer`インスタンスを段階的に構築する。

use crate::api::EmptySentinel;
use crate::error::SheetZeroError;
use crate::kpi::{generate_kpis, Kpi};
use crate::normalize::normalize_sheets;
use crate::output::OutputFormatter;
use crate::schema::{infer_schema, Schema};
use crate::source::RawSheet;
use crate::types::{Sheet, SheetSet};

/// 正規化処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct NormalizeConfig {
    /// 先頭付近の行をヘッダーとして検出・消費するか
    pub use_header_row: bool,

    /// 空セルのセンチネル値
    pub sentinel: EmptySentinel,

    /// ヘッダー検出で走査する最大行数
    pub header_scan_limit: usize,

    /// スキーマ推論でサンプリングする最大レコード数
    pub sample_limit: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            use_header_row: true,
            sentinel: EmptySentinel::EmptyString,
            header_scan_limit: 10,
            sample_limit: 20,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Normalizer`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみを
/// オーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use sheetzero::{NormalizerBuilder, EmptySentinel};
///
/// # fn main() -> Result<(), sheetzero::SheetZeroError> {
/// let normalizer = NormalizerBuilder::new()
///     .with_sentinel(EmptySentinel::Null)
///     .with_header_row(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NormalizerBuilder {
    /// 内部設定（構築中）
    config: NormalizeConfig,
}

impl Default for NormalizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - ヘッダー行: 検出して消費する
    /// - 空セルのセンチネル: 空文字列 `""`
    /// - ヘッダー検出の走査行数: 10
    /// - スキーマ推論のサンプル数: 20
    pub fn new() -> Self {
        Self {
            config: NormalizeConfig::default(),
        }
    }

    /// ヘッダー行の検出・消費を行うかを指定する
    ///
    /// `false`の場合、すべての行がデータ行として扱われ、キーは
    /// `Column_0`, `Column_1`, ... になります。列指向テーブルでは
    /// この設定に関わらず列ラベルがキーです。
    pub fn with_header_row(mut self, use_header_row: bool) -> Self {
        self.config.use_header_row = use_header_row;
        self
    }

    /// 空セルのセンチネル値を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetzero::{NormalizerBuilder, EmptySentinel};
    ///
    /// let builder = NormalizerBuilder::new()
    ///     .with_sentinel(EmptySentinel::Null);
    /// ```
    pub fn with_sentinel(mut self, sentinel: EmptySentinel) -> Self {
        self.config.sentinel = sentinel;
        self
    }

    /// ヘッダー検出で走査する最大行数を指定する
    ///
    /// # 制約
    ///
    /// * 1以上でなければならない（違反時は`build()`が`Config`エラー）
    pub fn with_header_scan_limit(mut self, limit: usize) -> Self {
        self.config.header_scan_limit = limit;
        self
    }

    /// スキーマ推論でサンプリングする最大レコード数を指定する
    ///
    /// # 制約
    ///
    /// * 1以上でなければならない（違反時は`build()`が`Config`エラー）
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.config.sample_limit = limit;
        self
    }

    /// 設定を検証し、`Normalizer`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Normalizer)` - 設定が有効な場合
    /// * `Err(SheetZeroError::Config)` - 走査行数またはサンプル数が0の場合
    pub fn build(self) -> Result<Normalizer, SheetZeroError> {
        if self.config.header_scan_limit == 0 {
            return Err(SheetZeroError::Config(
                "header_scan_limit must be at least 1".to_string(),
            ));
        }
        if self.config.sample_limit == 0 {
            return Err(SheetZeroError::Config(
                "sample_limit must be at least 1".to_string(),
            ));
        }

        Ok(Normalizer::new(self.config))
    }
}

/// 正規化処理のファサード
///
/// ソースデータをレコード集合へ正規化し、スキーマ推論・KPI生成・
/// CSV/JSON出力を行うためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust
/// use sheetzero::{sheets_from_api_json, NormalizerBuilder};
///
/// # fn main() -> Result<(), sheetzero::SheetZeroError> {
/// let body = r#"{"sheets": [{"properties": {"title": "Data"}, "data": [{"rowData": [
///     {"values": [{"formattedValue": "Name"}, {"formattedValue": "Age"}]},
///     {"values": [{"formattedValue": "Alice"}, {"formattedValue": "30"}]}
/// ]}]}]}"#;
///
/// let normalizer = NormalizerBuilder::new().build()?;
/// let sheets = sheets_from_api_json(body)?;
/// let set = normalizer.normalize(&sheets);
///
/// let csv = normalizer.to_csv(&set)?;
/// assert_eq!(csv, "Name,Age\n\"Alice\",\"30\"");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Normalizer {
    /// 正規化設定
    config: NormalizeConfig,
}

impl Normalizer {
    pub(crate) fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// ソースシート群を正規化してシート集合を生成
    ///
    /// 各シートはヘッダー検出・レコード化・クリーニングを経て、
    /// 空のシートは破棄されます。残りはレコード数の降順に並び、
    /// 先頭がアクティブシートです。シート間の処理は並列です。
    pub fn normalize(&self, sheets: &[RawSheet]) -> SheetSet {
        normalize_sheets(sheets, &self.config)
    }

    /// クリーニング済みシートのスキーマを推論
    ///
    /// 各列について先頭レコード（設定された件数）の非空値をサンプルし、
    /// ヘッダー名と値形状から`{type, format}`を決定します。
    pub fn infer_schema(&self, sheet: &Sheet) -> Schema {
        infer_schema(sheet, self.config.sample_limit)
    }

    /// シートとスキーマからKPIカードを生成
    pub fn generate_kpis(&self, sheet: &Sheet, schema: &Schema) -> Vec<Kpi> {
        generate_kpis(&sheet.records, schema)
    }

    /// シート集合をCSV文字列に変換
    ///
    /// 全シートが1つの行集合にフラット化されます。レコードが1件も
    /// ない場合は空文字列です（エラーではありません）。
    pub fn to_csv(&self, set: &SheetSet) -> Result<String, SheetZeroError> {
        self.render(set, OutputFormatter::Csv)
    }

    /// シート集合を整形済みJSON文字列に変換
    ///
    /// シート名をキー、レコード配列を値とするオブジェクトです。
    pub fn to_json(&self, set: &SheetSet) -> Result<String, SheetZeroError> {
        self.render(set, OutputFormatter::Json)
    }

    fn render(&self, set: &SheetSet, formatter: OutputFormatter) -> Result<String, SheetZeroError> {
        let mut buffer = Vec::new();
        formatter.render(set, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            SheetZeroError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

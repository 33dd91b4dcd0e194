//! Source Module
//!
//! フェッチ層から受け取る2種類のRawTable形状（行指向グリッド / 列指向テーブル）を
//! 定義するモジュール。Sheets API（`spreadsheets.get` + `includeGridData`）の応答と、
//! レガシーGVizクエリ（`/gviz/tq`）の応答の両方をデシリアライズします。
//!
//! フェッチそのものは外部コラボレーターの責務であり、本モジュールは
//! 取得済みのペイロード文字列だけを扱います。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SheetZeroError;

/// スプレッドシートURL中のID部分
static SPREADSHEET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

/// URLフラグメント/クエリ中のgid部分
static GID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#&]gid=([0-9]+)").expect("valid regex"));

/// スプレッドシートURLから抽出した参照情報
///
/// 貼り付けられたGoogle SheetsのURLからスプレッドシートIDと
/// （存在すれば）対象シートのgidを抽出します。
///
/// # 使用例
///
/// ```rust
/// use sheetzero::SheetRef;
///
/// let sheet_ref = SheetRef::parse(
///     "https://docs.google.com/spreadsheets/d/abc123XYZ_-/edit#gid=42",
/// ).unwrap();
/// assert_eq!(sheet_ref.id, "abc123XYZ_-");
/// assert_eq!(sheet_ref.gid.as_deref(), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    /// スプレッドシートID
    pub id: String,

    /// 対象シートのgid（URLに含まれる場合のみ）
    pub gid: Option<String>,
}

impl SheetRef {
    /// URLからスプレッドシート参照を抽出
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetRef)` - IDが抽出できた場合
    /// * `Err(SheetZeroError::Source)` - URLがスプレッドシートを指していない場合
    pub fn parse(url: &str) -> Result<Self, SheetZeroError> {
        let id = SPREADSHEET_ID_RE
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                SheetZeroError::Source(format!("Not a Google Sheets URL: '{}'", url))
            })?;

        let gid = GID_RE
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        Ok(Self { id, gid })
    }
}

/// 行指向グリッドの1セル
///
/// Sheets APIの`CellData`のうち、正規化に必要な部分だけを保持します。
/// `effectiveValue`と`hyperlink`はワイヤーデータのパススルーであり、
/// 正規化自体は`formattedValue`（表示値）のみを参照します。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// 表示値（シートの書式適用後の文字列）
    #[serde(default)]
    pub formatted_value: Option<String>,

    /// 生の型付き値（数値・文字列・論理値など、APIのラッパーオブジェクト）
    #[serde(default)]
    pub effective_value: Option<Value>,

    /// ハイパーリンク（存在する場合）
    #[serde(default)]
    pub hyperlink: Option<String>,
}

impl GridCell {
    /// 表示値を持つセルを生成
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            formatted_value: Some(value.into()),
            effective_value: None,
            hyperlink: None,
        }
    }

    /// 空セルを生成
    pub fn empty() -> Self {
        Self::default()
    }
}

/// 行指向グリッドの1行
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridRow {
    /// 行内のセル（行末の空セルはAPI応答から省略されることがある）
    #[serde(default)]
    pub values: Vec<GridCell>,
}

/// 行指向グリッド（RawTableバリアントa）
///
/// Sheets APIの`sheets[].data[0].rowData`に対応します。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSheet {
    /// 行データ
    #[serde(default)]
    pub row_data: Vec<GridRow>,
}

impl GridSheet {
    /// 表示値の2次元配列からグリッドを生成（テスト・ベンチマーク用途）
    pub fn from_rows<S: Into<String>>(rows: Vec<Vec<S>>) -> Self {
        Self {
            row_data: rows
                .into_iter()
                .map(|cells| GridRow {
                    values: cells.into_iter().map(GridCell::text).collect(),
                })
                .collect(),
        }
    }
}

/// 列指向テーブルの列定義
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizColumn {
    /// 列ID（A, B, C, ...）
    #[serde(default)]
    pub id: String,

    /// 列ラベル（ヘッダー行の代わりに使用される）
    #[serde(default)]
    pub label: String,

    /// 列型（string, number, boolean, date, datetime, timeofday）
    #[serde(default, rename = "type")]
    pub column_type: String,
}

/// 列指向テーブルの1セル
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizCell {
    /// 生の値
    #[serde(default)]
    pub v: Value,

    /// 書式適用済みの表示値（省略時は`v`から導出）
    #[serde(default)]
    pub f: Option<String>,
}

impl GvizCell {
    /// 表示値を取得（`f`優先、なければ`v`の文字列表現）
    fn display_value(&self) -> Option<String> {
        if let Some(formatted) = &self.f {
            return Some(formatted.clone());
        }
        match &self.v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// 列指向テーブルの1行
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GvizRow {
    /// セルのリスト（欠損セルは`null`）
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

/// 列指向テーブル（RawTableバリアントb）
///
/// GVizクエリ応答の`table`オブジェクトに対応します。列ラベルが
/// ヘッダーとして扱われ、ヘッダー行の検出は行われません。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnTable {
    /// 列定義
    #[serde(default)]
    pub cols: Vec<GvizColumn>,

    /// 行データ
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

/// GVizエラー情報
#[derive(Debug, Clone, Default, Deserialize)]
struct GvizError {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    detailed_message: String,
}

/// GVizクエリ応答の外側のエンベロープ
#[derive(Debug, Clone, Default, Deserialize)]
struct GvizResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<GvizError>,
    #[serde(default)]
    table: Option<ColumnTable>,
}

/// 未処理のテーブルデータ（2形状のタグ付き共用体）
///
/// 正規化はこの列挙型の共通ケイパビリティ
/// （行数・列数・表示値・列ラベル）に対して1回だけ書かれます。
#[derive(Debug, Clone)]
pub enum RawTable {
    /// 行指向グリッド（Sheets API形状）
    Grid(GridSheet),

    /// 列指向テーブル（GViz形状）
    Columns(ColumnTable),
}

impl RawTable {
    /// データ行数を取得
    pub fn row_count(&self) -> usize {
        match self {
            RawTable::Grid(grid) => grid.row_data.len(),
            RawTable::Columns(table) => table.rows.len(),
        }
    }

    /// 列数を取得
    ///
    /// グリッドでは最長行のセル数です（API応答は行末の空セルを省略するため、
    /// 行ごとに長さが異なることがあります）。
    pub fn col_count(&self) -> usize {
        match self {
            RawTable::Grid(grid) => grid
                .row_data
                .iter()
                .map(|row| row.values.len())
                .max()
                .unwrap_or(0),
            RawTable::Columns(table) => table.cols.len(),
        }
    }

    /// 指定セルの表示値を取得
    ///
    /// セルが存在しない、または表示値を持たない場合は`None`です。
    pub fn formatted_value(&self, row: usize, col: usize) -> Option<String> {
        match self {
            RawTable::Grid(grid) => grid
                .row_data
                .get(row)?
                .values
                .get(col)?
                .formatted_value
                .clone(),
            RawTable::Columns(table) => table
                .rows
                .get(row)?
                .c
                .get(col)?
                .as_ref()?
                .display_value(),
        }
    }

    /// 指定列のラベルを取得（列指向テーブルのみ、空ラベルは`None`）
    pub fn column_label(&self, col: usize) -> Option<&str> {
        match self {
            RawTable::Grid(_) => None,
            RawTable::Columns(table) => {
                let label = table.cols.get(col)?.label.as_str();
                if label.is_empty() {
                    None
                } else {
                    Some(label)
                }
            }
        }
    }

    /// 列指向テーブルかどうかを判定
    pub fn is_column_oriented(&self) -> bool {
        matches!(self, RawTable::Columns(_))
    }

    /// 指定行の表示値リストを取得（ヘッダー検出用）
    ///
    /// 行自身が持つセル数分だけ返します（欠損セルは空文字列）。
    pub(crate) fn display_row(&self, row: usize) -> Vec<String> {
        match self {
            RawTable::Grid(grid) => grid
                .row_data
                .get(row)
                .map(|r| {
                    r.values
                        .iter()
                        .map(|cell| cell.formatted_value.clone().unwrap_or_default())
                        .collect()
                })
                .unwrap_or_default(),
            RawTable::Columns(table) => table
                .rows
                .get(row)
                .map(|r| {
                    r.c.iter()
                        .map(|cell| {
                            cell.as_ref()
                                .and_then(GvizCell::display_value)
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// グリッドの指定行のセル数を取得（グリッド以外は列数）
    pub(crate) fn row_len(&self, row: usize) -> usize {
        match self {
            RawTable::Grid(grid) => grid
                .row_data
                .get(row)
                .map(|r| r.values.len())
                .unwrap_or(0),
            RawTable::Columns(table) => table.cols.len(),
        }
    }
}

/// 名前付きのRawTable（1シート分のソースデータ）
#[derive(Debug, Clone)]
pub struct RawSheet {
    /// シート名
    pub name: String,

    /// テーブルデータ
    pub table: RawTable,
}

impl RawSheet {
    /// 新しいRawSheetを生成
    pub fn new(name: impl Into<String>, table: RawTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

/// Sheets API応答のシートプロパティ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSheetProperties {
    #[serde(default)]
    title: String,
}

/// Sheets API応答のグリッドデータ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGridData {
    #[serde(default)]
    row_data: Vec<GridRow>,
}

/// Sheets API応答の1シート
#[derive(Debug, Clone, Default, Deserialize)]
struct ApiSheet {
    #[serde(default)]
    properties: ApiSheetProperties,
    #[serde(default)]
    data: Vec<ApiGridData>,
}

/// Sheets API応答のトップレベル
#[derive(Debug, Clone, Default, Deserialize)]
struct ApiSpreadsheet {
    #[serde(default)]
    sheets: Vec<ApiSheet>,
}

/// `spreadsheets.get`（`includeGridData=true`）の応答ボディを解析
///
/// 各シートの先頭グリッド（`data[0].rowData`）を行指向の`RawSheet`に
/// 変換します。タイトルのないシートは`Sheet1`になります。
///
/// # 戻り値
///
/// * `Ok(Vec<RawSheet>)` - 1件以上のシートが見つかった場合
/// * `Err(SheetZeroError::Json)` - ボディがJSONとして解析できない場合
/// * `Err(SheetZeroError::Source)` - シートが1件も含まれない場合
pub fn sheets_from_api_json(body: &str) -> Result<Vec<RawSheet>, SheetZeroError> {
    let spreadsheet: ApiSpreadsheet = serde_json::from_str(body)?;

    if spreadsheet.sheets.is_empty() {
        return Err(SheetZeroError::Source(
            "No sheets found in this spreadsheet.".to_string(),
        ));
    }

    let sheets: Vec<RawSheet> = spreadsheet
        .sheets
        .into_iter()
        .map(|sheet| {
            let name = if sheet.properties.title.is_empty() {
                "Sheet1".to_string()
            } else {
                sheet.properties.title
            };
            let row_data = sheet
                .data
                .into_iter()
                .next()
                .map(|data| data.row_data)
                .unwrap_or_default();
            RawSheet::new(name, RawTable::Grid(GridSheet { row_data }))
        })
        .collect();

    debug!(sheet_count = sheets.len(), "parsed spreadsheets.get body");
    Ok(sheets)
}

/// GVizクエリ応答（`/gviz/tq`）を解析
///
/// 応答はJSONPラッパー
/// `google.visualization.Query.setResponse({...});`に包まれているため、
/// まずラッパーを剥がしてからデシリアライズします。裸のJSONオブジェクトも
/// 受け付けます。
///
/// # 戻り値
///
/// * `Ok(ColumnTable)` - テーブルが取得できた場合
/// * `Err(SheetZeroError::Source)` - GVizがエラー状態を返した場合、
///   またはラッパー/テーブルが不正な場合
pub fn table_from_gviz_response(body: &str) -> Result<ColumnTable, SheetZeroError> {
    let trimmed = body.trim();

    let json_str = match trimmed.find("setResponse(") {
        Some(idx) => {
            let rest = &trimmed[idx + "setResponse(".len()..];
            let end = rest.rfind(')').ok_or_else(|| {
                SheetZeroError::Source("Unterminated GViz JSONP wrapper".to_string())
            })?;
            &rest[..end]
        }
        None => trimmed,
    };

    let response: GvizResponse = serde_json::from_str(json_str)?;

    if response.status == "error" {
        let message = response
            .errors
            .first()
            .map(|err| {
                if !err.detailed_message.is_empty() {
                    err.detailed_message.clone()
                } else if !err.message.is_empty() {
                    err.message.clone()
                } else {
                    err.reason.clone()
                }
            })
            .unwrap_or_else(|| "GViz query failed".to_string());
        return Err(SheetZeroError::Source(format!(
            "Flash conversion failed: {}",
            message
        )));
    }

    let table = response.table.ok_or_else(|| {
        SheetZeroError::Source("GViz response contains no table".to_string())
    })?;

    debug!(
        cols = table.cols.len(),
        rows = table.rows.len(),
        "parsed GViz response"
    );
    Ok(table)
}

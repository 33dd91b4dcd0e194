//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sheetzeroクレート全体で使用するエラー型
///
/// ソースデータの解析、設定の検証、出力のシリアライズ中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// 正規化・クリーニング・スキーマ推論のパイプライン自体は全域関数であり、
/// エラーを返しません（空の入力は空の出力になります）。エラーが発生するのは
/// 入力ペイロードの解析、設定の検証、およびライターへの書き込みのみです。
///
/// # エラーの種類
///
/// - `Io`: 出力ライターへの書き込み中に発生したエラー
/// - `Json`: ソースペイロードまたはJSON出力のシリアライズ/デシリアライズエラー
/// - `Config`: 設定の検証に失敗したエラー（無効なサンプル数など）
/// - `Source`: ソースデータが期待する形状でないエラー（シートなし、GVizエラー応答など）
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetzero::{NormalizerBuilder, SheetZeroError};
///
/// fn build() -> Result<(), SheetZeroError> {
///     let normalizer = NormalizerBuilder::new().build()?;
///     let _ = normalizer;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum SheetZeroError {
    /// I/O操作中に発生したエラー
    ///
    /// 出力ライターへの書き込み失敗など、標準ライブラリの
    /// `std::io::Error`が発生した場合に使用されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSONの解析・シリアライズ中に発生したエラー
    ///
    /// Sheets API応答やGVizペイロードのデシリアライズ、および
    /// JSON出力のシリアライズに失敗した場合に発生します。
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `NormalizerBuilder::build()`時に設定を検証し、無効な設定が
    /// 検出された場合に発生します。例えば、サンプル数が0の場合などです。
    #[error("Configuration error: {0}")]
    Config(String),

    /// ソースデータが期待する形状でないエラー
    ///
    /// スプレッドシート応答にシートが含まれない、GVizがエラー状態を
    /// 返した、URLがスプレッドシートを指していない、などの場合に発生します。
    #[error("Invalid source data: {0}")]
    Source(String),
}

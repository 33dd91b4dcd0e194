//! Output Format Module
//!
//! Strategy Patternによる出力フォーマットの抽象化を提供するモジュール。

mod formatters;

use crate::error::SheetZeroError;
use crate::types::SheetSet;
use std::io::Write;

pub use formatters::*;

/// 出力フォーマッター（Strategy Pattern）
///
/// 各出力フォーマット（JSON, CSV）をenumとして表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatter {
    Json,
    Csv,
}

impl OutputFormatter {
    /// シート集合を指定されたフォーマットで出力する
    ///
    /// # 引数
    ///
    /// * `set` - 出力するシート集合
    /// * `writer` - 出力先のライター
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(SheetZeroError)` - エラーが発生した場合
    pub fn render<W: Write>(&self, set: &SheetSet, writer: &mut W) -> Result<(), SheetZeroError> {
        match self {
            OutputFormatter::Json => JsonFormatter.render(set, writer),
            OutputFormatter::Csv => CsvFormatter.render(set, writer),
        }
    }
}

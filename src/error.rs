//! 統一的なエラーハンドリングモジュール
//!
//! このモジュールは、kagami全体で使用される統一的なエラー型と
//! エラー報告システムを提供します。構造的な不一致はエラーではなく
//! マッチ失敗として扱われるため、ここに現れるのはパターン構築の
//! 失敗とパターン形状の不正だけです。

use crate::tree::Span;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// kagamiの統一エラー型
#[derive(Error, Debug, Clone)]
pub enum KagamiError {
    /// レキサーエラー
    #[error("字句解析エラー")]
    Lexer(#[from] LexerError),

    /// パーサーエラー
    #[error("構文解析エラー")]
    Parser(#[from] ParserError),

    /// マッチャーエラー
    #[error("マッチングエラー")]
    Match(#[from] MatchError),

    /// その他のエラー
    #[error("{0}")]
    Other(String),
}

/// レキサーエラーの詳細
#[derive(Error, Debug, Clone)]
pub enum LexerError {
    #[error("認識できないトークン: '{token}'")]
    UnrecognizedToken { token: String, span: Span },

    #[error("未終了の文字リテラル")]
    UnterminatedChar { span: Span },
}

/// パーサーエラーの詳細
#[derive(Error, Debug, Clone)]
pub enum ParserError {
    #[error("予期しないトークン: {expected}を期待しましたが、{found}が見つかりました")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("予期しない入力の終了")]
    UnexpectedEof { expected: String, span: Span },

    #[error("構文エラー: {message}")]
    SyntaxError { message: String, span: Span },
}

/// マッチャーエラーの詳細。
///
/// 構造の不一致・未解決シンボルはエラーにならない。ここに来るのは
/// アルゴリズムが規則を定義していないパターン形状だけで、黙って
/// 誤った結果を返すかわりに即座に失敗させる。
#[derive(Error, Debug, Clone)]
pub enum MatchError {
    #[error("未対応のパターン形状: {0}")]
    UnsupportedPatternShape(String),
}

/// エラー情報とソースコードの位置情報を含むエラー
#[derive(Debug, Clone)]
pub struct DiagnosticError {
    pub error: KagamiError,
    pub file_id: usize,
}

impl DiagnosticError {
    pub fn new(error: KagamiError, file_id: usize) -> Self {
        Self { error, file_id }
    }

    /// codespan-reportingのDiagnosticに変換
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let (message, labels) = match &self.error {
            KagamiError::Lexer(e) => match e {
                LexerError::UnrecognizedToken { token, span } => (
                    format!("認識できないトークン: '{}'", token),
                    vec![Label::primary(self.file_id, span.start..span.end)
                        .with_message("ここに不正なトークンがあります")],
                ),
                LexerError::UnterminatedChar { span } => (
                    "未終了の文字リテラル".to_string(),
                    vec![Label::primary(self.file_id, span.start..span.end)
                        .with_message("文字リテラルが閉じられていません")],
                ),
            },
            KagamiError::Parser(e) => match e {
                ParserError::UnexpectedToken {
                    expected,
                    found,
                    span,
                } => (
                    format!(
                        "予期しないトークン: {}を期待しましたが、{}が見つかりました",
                        expected, found
                    ),
                    vec![Label::primary(self.file_id, span.start..span.end)],
                ),
                ParserError::UnexpectedEof { expected, span } => (
                    format!("予期しない入力の終了: {}を期待していました", expected),
                    vec![Label::primary(self.file_id, span.start..span.end)],
                ),
                ParserError::SyntaxError { message, span } => (
                    format!("構文エラー: {}", message),
                    vec![Label::primary(self.file_id, span.start..span.end)],
                ),
            },
            KagamiError::Match(e) => match e {
                MatchError::UnsupportedPatternShape(message) => (
                    format!("未対応のパターン形状: {}", message),
                    vec![],
                ),
            },
            KagamiError::Other(message) => (message.clone(), vec![]),
        };

        Diagnostic::error().with_message(message).with_labels(labels)
    }
}

/// Result型のエイリアス
pub type KagamiResult<T> = Result<T, KagamiError>;

/// エラー変換用のヘルパートレイト
pub trait IntoKagamiError {
    fn into_kagami_error(self) -> KagamiError;
}

impl IntoKagamiError for anyhow::Error {
    fn into_kagami_error(self) -> KagamiError {
        KagamiError::Other(self.to_string())
    }
}

//! パーサーモジュール
//!
//! このモジュールはトークン列をホスト木（`tree::Node`）に解析する
//! 責任を持ちます。再帰下降構文解析を使用し、適切な優先順位処理を
//! 行います。
//!
//! 対象はマッチャーが扱う構文種別をすべて綴れるJava風の小言語です。
//! `$`付きの名前はただの識別子として解析され、自由変数・ワイルド
//! カードとしての意味づけはマッチャー側で行われます。あいまいな
//! 構文（キャストとかっこ式、ラムダ、ローカル変数宣言と式文）は
//! 位置の保存・復元つきの先読みで解決します。

mod decl_parser;
mod expr_parser;
mod stmt_parser;

use std::rc::Rc;

use crate::error::{KagamiResult, ParserError};
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::tree::{Node, NodeRef, Span};

/// 後方互換性のための型エイリアス
pub type ParseError = ParserError;
pub type ParseResult<T> = Result<T, ParseError>;

/// ソースを単一の式として解析する
pub fn parse_expression(source: &str) -> KagamiResult<NodeRef> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expr)
}

/// ソースを単一の文として解析する
pub fn parse_statement(source: &str) -> KagamiResult<NodeRef> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let stmt = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

/// ソースを文の並びとして解析する
pub fn parse_statements(source: &str) -> KagamiResult<Vec<NodeRef>> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let statements = parser.parse_statements()?;
    parser.expect_end()?;
    Ok(statements)
}

/// ソースを単一のクラス宣言として解析する
pub fn parse_class(source: &str) -> KagamiResult<NodeRef> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let class = parser.parse_class()?;
    parser.expect_end()?;
    Ok(class)
}

/// パターン言語のパーサー
pub struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, current: 0 }
    }

    /// 単一の式を解析
    pub fn parse_expression(&mut self) -> ParseResult<NodeRef> {
        self.parse_expression_internal()
    }

    /// 単一の文を解析
    pub fn parse_statement(&mut self) -> ParseResult<NodeRef> {
        self.parse_statement_internal()
    }

    /// 入力の終わりまで文を解析
    pub fn parse_statements(&mut self) -> ParseResult<Vec<NodeRef>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement_internal()?);
        }
        Ok(statements)
    }

    /// クラス宣言を解析
    pub fn parse_class(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let modifiers = self.parse_modifiers()?;
        self.parse_class_declaration(modifiers, start)
    }

    // ==================== ユーティリティメソッド ====================

    /// 現在のトークンを取得
    pub(super) fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|t| &t.token)
    }

    /// 特定のオフセット先のトークンを取得
    pub(super) fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset).map(|t| &t.token)
    }

    /// 現在のスパンを取得
    pub(super) fn current_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .map(|t| t.span)
            .or_else(|| self.tokens.last().map(|t| Span::new(t.span.end, t.span.end)))
            .unwrap_or_else(Span::dummy)
    }

    /// 開始位置から現在位置までのスパンを作成
    pub(super) fn span_from(&self, start: usize) -> Span {
        let end = if self.current > 0 {
            self.tokens
                .get(self.current - 1)
                .map(|t| t.span.end)
                .unwrap_or(start)
        } else {
            self.current_span().end
        };
        Span::new(start, end)
    }

    /// 次のトークンに進む
    pub(super) fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    /// 終端に到達したかチェック
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// 現在位置を保存（先読みの巻き戻し用）
    pub(super) fn save(&self) -> usize {
        self.current
    }

    /// 保存した位置に巻き戻す
    pub(super) fn restore(&mut self, position: usize) {
        self.current = position;
    }

    /// 特定のトークンをチェック（進まない）
    pub(super) fn check(&self, token_type: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(token) == std::mem::discriminant(token_type)
        } else {
            false
        }
    }

    /// 特定のトークンにマッチしたら進む
    pub(super) fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// 複数のトークンタイプのいずれかにマッチしたら進む
    pub(super) fn match_tokens(&mut self, token_types: &[Token]) -> Option<Token> {
        for token_type in token_types {
            if self.check(token_type) {
                let token = self.current_token()?.clone();
                self.advance();
                return Some(token);
            }
        }
        None
    }

    /// 特定のトークンを期待
    pub(super) fn expect(&mut self, token_type: Token) -> ParseResult<()> {
        if self.check(&token_type) {
            self.advance();
            Ok(())
        } else {
            let found = self
                .current_token()
                .map(|t| format!("{}", t))
                .unwrap_or_else(|| "EOF".to_string());
            Err(ParserError::UnexpectedToken {
                expected: format!("{:?}", token_type),
                found,
                span: self.current_span(),
            })
        }
    }

    /// 識別子を期待
    pub(super) fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current_token() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("識別子を期待しました".to_string())),
        }
    }

    /// 入力をすべて消費したことを期待
    pub(super) fn expect_end(&mut self) -> ParseResult<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("入力の終端を期待しました".to_string()))
        }
    }

    /// ジェネリクスの閉じ`>`を1つ消費する。`>>`系のトークンは
    /// 残った`>`を現在位置に書き戻して1段だけ閉じる。
    pub(super) fn expect_type_close(&mut self) -> ParseResult<()> {
        match self.current_token() {
            Some(Token::Greater) => {
                self.advance();
                Ok(())
            }
            Some(Token::Shr) => {
                self.tokens[self.current].token = Token::Greater;
                Ok(())
            }
            Some(Token::UShr) => {
                self.tokens[self.current].token = Token::Shr;
                Ok(())
            }
            _ => Err(self.error("'>'を期待しました".to_string())),
        }
    }

    /// 型引数の閉じトークンかどうか
    pub(super) fn check_type_close(&self) -> bool {
        matches!(
            self.current_token(),
            Some(Token::Greater) | Some(Token::Shr) | Some(Token::UShr)
        )
    }

    /// エラーを作成
    pub(super) fn error(&self, message: String) -> ParseError {
        ParserError::SyntaxError {
            message,
            span: self.current_span(),
        }
    }
}

/// ノードを共有参照に包む
pub(super) fn rc(node: Node) -> NodeRef {
    Rc::new(node)
}

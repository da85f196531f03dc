//! 宣言と型の解析

use std::collections::BTreeSet;

use crate::lexer::Token;
use crate::tree::{
    Annotation, ArrayType, Block, Class, Identifier, MemberSelect, Method, Modifier, Modifiers,
    Node, NodeRef, ParameterizedType, PrimitiveKind, PrimitiveType, TypeParameter, Variable,
    WildcardType,
};

use super::{rc, ParseResult, Parser};

impl Parser {
    /// 修飾子と注釈の並びを解析。何もなければ`None`。
    pub(super) fn parse_modifiers(&mut self) -> ParseResult<Option<NodeRef>> {
        let start = self.current_span().start;
        let mut flags = BTreeSet::new();
        let mut annotations = Vec::new();

        loop {
            let flag = match self.current_token() {
                Some(Token::At) => {
                    annotations.push(self.parse_annotation()?);
                    continue;
                }
                Some(Token::Public) => Modifier::Public,
                Some(Token::Protected) => Modifier::Protected,
                Some(Token::Private) => Modifier::Private,
                Some(Token::Abstract) => Modifier::Abstract,
                Some(Token::Static) => Modifier::Static,
                Some(Token::Final) => Modifier::Final,
                Some(Token::Synchronized) => Modifier::Synchronized,
                Some(Token::Native) => Modifier::Native,
                Some(Token::Transient) => Modifier::Transient,
                Some(Token::Volatile) => Modifier::Volatile,
                Some(Token::Strictfp) => Modifier::Strictfp,
                Some(Token::Default) => Modifier::Default,
                _ => break,
            };
            flags.insert(flag);
            self.advance();
        }

        if flags.is_empty() && annotations.is_empty() {
            return Ok(None);
        }

        Ok(Some(rc(Node::Modifiers(Modifiers {
            flags,
            annotations,
            span: self.span_from(start),
        }))))
    }

    /// 注釈を解析。`@Name`・`@Name(args)`の形
    pub(super) fn parse_annotation(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::At)?;
        let annotation_type = self.parse_name_chain()?;

        let arguments = if self.check(&Token::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(rc(Node::Annotation(Annotation {
            annotation_type,
            arguments,
            span: self.span_from(start),
        })))
    }

    /// 修飾名（`a.b.c`）を識別子・メンバ選択の連鎖として解析
    fn parse_name_chain(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let name = self.expect_identifier()?;
        let mut node = rc(Node::Identifier(Identifier {
            name,
            span: self.span_from(start),
        }));

        while self.check(&Token::Dot) && matches!(self.peek(1), Some(Token::Identifier(_))) {
            self.advance();
            let identifier = self.expect_identifier()?;
            node = rc(Node::MemberSelect(MemberSelect {
                expression: node,
                identifier,
                span: self.span_from(start),
            }));
        }

        Ok(node)
    }

    /// クラス宣言を解析（`class`キーワードから）
    pub(super) fn parse_class_declaration(
        &mut self,
        modifiers: Option<NodeRef>,
        start: usize,
    ) -> ParseResult<NodeRef> {
        self.expect(Token::Class)?;
        let name = self.expect_identifier()?;

        let type_parameters = if self.check(&Token::Less) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        let extends_clause = if self.match_token(&Token::Extends) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut implements_clause = Vec::new();
        if self.match_token(&Token::Implements) {
            loop {
                implements_clause.push(self.parse_type()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_class_body()?;

        Ok(rc(Node::Class(Class {
            modifiers,
            name,
            type_parameters,
            extends_clause,
            implements_clause,
            members,
            span: self.span_from(start),
        })))
    }

    /// 匿名クラス本体を解析（名前は空）
    pub(super) fn parse_anonymous_class_body(&mut self, start: usize) -> ParseResult<NodeRef> {
        let members = self.parse_class_body()?;

        Ok(rc(Node::Class(Class {
            modifiers: None,
            name: String::new(),
            type_parameters: Vec::new(),
            extends_clause: None,
            implements_clause: Vec::new(),
            members,
            span: self.span_from(start),
        })))
    }

    /// クラス本体のメンバ列を解析
    fn parse_class_body(&mut self) -> ParseResult<Vec<NodeRef>> {
        self.expect(Token::LeftBrace)?;

        let mut members = Vec::new();
        while !self.check(&Token::RightBrace) && !self.is_at_end() {
            members.push(self.parse_member()?);
        }

        self.expect(Token::RightBrace)?;
        Ok(members)
    }

    /// クラスメンバ（初期化子・ネストクラス・メソッド・フィールド）を解析
    fn parse_member(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;

        // 静的初期化子
        if self.check(&Token::Static) && matches!(self.peek(1), Some(Token::LeftBrace)) {
            self.advance();
            let block = self.parse_block()?;
            let Node::Block(inner) = &*block else {
                unreachable!("parse_blockはブロックを返す");
            };
            return Ok(rc(Node::Block(Block {
                is_static: true,
                statements: inner.statements.clone(),
                span: inner.span,
            })));
        }

        // インスタンス初期化子
        if self.check(&Token::LeftBrace) {
            return self.parse_block();
        }

        let modifiers = self.parse_modifiers()?;

        if self.check(&Token::Class) {
            return self.parse_class_declaration(modifiers, start);
        }

        let type_parameters = if self.check(&Token::Less) {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };

        // コンストラクタ: 識別子の直後に`(`
        if let Some(Token::Identifier(name)) = self.current_token() {
            if matches!(self.peek(1), Some(Token::LeftParen)) {
                let name = name.clone();
                self.advance();
                return self.parse_method_rest(modifiers, type_parameters, None, name, start);
            }
        }

        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;

        if self.check(&Token::LeftParen) {
            return self.parse_method_rest(modifiers, type_parameters, Some(ty), name, start);
        }

        let initializer = self.parse_variable_initializer()?;
        self.expect(Token::Semicolon)?;

        Ok(rc(Node::Variable(Variable {
            modifiers,
            ty: Some(ty),
            name,
            initializer,
            span: self.span_from(start),
        })))
    }

    /// メソッド宣言の残り（引数リスト以降）を解析
    fn parse_method_rest(
        &mut self,
        modifiers: Option<NodeRef>,
        type_parameters: Vec<NodeRef>,
        return_type: Option<NodeRef>,
        name: String,
        start: usize,
    ) -> ParseResult<NodeRef> {
        let parameters = self.parse_parameter_list()?;

        let mut throws = Vec::new();
        if self.match_token(&Token::Throws) {
            loop {
                throws.push(self.parse_type()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        let body = if self.match_token(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(rc(Node::Method(Method {
            modifiers,
            type_parameters,
            return_type,
            name,
            parameters,
            throws,
            body,
            default_value: None,
            span: self.span_from(start),
        })))
    }

    /// 仮引数リストを解析
    fn parse_parameter_list(&mut self) -> ParseResult<Vec<NodeRef>> {
        self.expect(Token::LeftParen)?;
        let mut parameters = Vec::new();

        if !self.check(&Token::RightParen) {
            loop {
                let param_start = self.current_span().start;
                let modifiers = self.parse_modifiers()?;
                let ty = self.parse_type()?;
                let name = self.expect_identifier()?;

                parameters.push(rc(Node::Variable(Variable {
                    modifiers,
                    ty: Some(ty),
                    name,
                    initializer: None,
                    span: self.span_from(param_start),
                })));

                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::RightParen)?;
        Ok(parameters)
    }

    /// 型パラメータ宣言`<T, U extends Bound & Other>`を解析
    pub(super) fn parse_type_parameters(&mut self) -> ParseResult<Vec<NodeRef>> {
        self.expect(Token::Less)?;
        let mut parameters = Vec::new();

        loop {
            let start = self.current_span().start;
            let name = self.expect_identifier()?;

            let mut bounds = Vec::new();
            if self.match_token(&Token::Extends) {
                loop {
                    bounds.push(self.parse_type()?);
                    if !self.match_token(&Token::Ampersand) {
                        break;
                    }
                }
            }

            parameters.push(rc(Node::TypeParameter(TypeParameter {
                name,
                bounds,
                span: self.span_from(start),
            })));

            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        self.expect_type_close()?;
        Ok(parameters)
    }

    /// 型を解析（プリミティブ・修飾名・ジェネリクス・配列）
    pub(super) fn parse_type(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;

        let primitive = match self.current_token() {
            Some(Token::Boolean) => Some(PrimitiveKind::Boolean),
            Some(Token::Byte) => Some(PrimitiveKind::Byte),
            Some(Token::Short) => Some(PrimitiveKind::Short),
            Some(Token::Int) => Some(PrimitiveKind::Int),
            Some(Token::Long) => Some(PrimitiveKind::Long),
            Some(Token::Char) => Some(PrimitiveKind::Char),
            Some(Token::Float) => Some(PrimitiveKind::Float),
            Some(Token::Double) => Some(PrimitiveKind::Double),
            Some(Token::Void) => Some(PrimitiveKind::Void),
            _ => None,
        };

        let mut ty = if let Some(kind) = primitive {
            self.advance();
            rc(Node::PrimitiveType(PrimitiveType {
                kind,
                span: self.span_from(start),
            }))
        } else {
            let base = self.parse_name_chain()?;

            if self.match_token(&Token::Less) {
                let mut type_arguments = Vec::new();

                if !self.check_type_close() {
                    loop {
                        type_arguments.push(self.parse_type_argument()?);
                        if !self.match_token(&Token::Comma) {
                            break;
                        }
                    }
                }

                self.expect_type_close()?;
                rc(Node::ParameterizedType(ParameterizedType {
                    ty: base,
                    type_arguments,
                    span: self.span_from(start),
                }))
            } else {
                base
            }
        };

        while self.check(&Token::LeftBracket) && matches!(self.peek(1), Some(Token::RightBracket))
        {
            self.advance();
            self.advance();
            ty = rc(Node::ArrayType(ArrayType {
                ty,
                span: self.span_from(start),
            }));
        }

        Ok(ty)
    }

    /// 型引数（型またはワイルドカード）を解析
    fn parse_type_argument(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;

        if self.match_token(&Token::Question) {
            let bound = if self.match_token(&Token::Extends) {
                Some(self.parse_type()?)
            } else {
                None
            };
            return Ok(rc(Node::WildcardType(WildcardType {
                bound,
                span: self.span_from(start),
            })));
        }

        self.parse_type()
    }
}

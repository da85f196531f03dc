//! 文の解析

use crate::lexer::Token;
use crate::tree::{
    Assert, Block, Break, Case, Catch, Continue, DoWhile, EmptyStatement, EnhancedFor,
    ExpressionStatement, For, If, Labeled, NewArray, Node, NodeRef, Return, Switch, Synchronized,
    Throw, Try, Variable, While,
};

use super::{rc, ParseResult, Parser};

impl Parser {
    /// 文を解析（内部実装）
    pub(super) fn parse_statement_internal(&mut self) -> ParseResult<NodeRef> {
        match self.current_token() {
            Some(Token::LeftBrace) => self.parse_block(),
            Some(Token::If) => self.parse_if_statement(),
            Some(Token::While) => self.parse_while_statement(),
            Some(Token::Do) => self.parse_do_while_statement(),
            Some(Token::For) => self.parse_for_statement(),
            Some(Token::Return) => self.parse_return_statement(),
            Some(Token::Break) => self.parse_break_statement(),
            Some(Token::Continue) => self.parse_continue_statement(),
            Some(Token::Throw) => self.parse_throw_statement(),
            Some(Token::Try) => self.parse_try_statement(),
            Some(Token::Switch) => self.parse_switch_statement(),
            Some(Token::Assert) => self.parse_assert_statement(),
            Some(Token::Semicolon) => {
                let start = self.current_span().start;
                self.advance();
                Ok(rc(Node::EmptyStatement(EmptyStatement {
                    span: self.span_from(start),
                })))
            }
            // `synchronized (expr) { ... }`は文、それ以外は修飾子
            Some(Token::Synchronized) if matches!(self.peek(1), Some(Token::LeftParen)) => {
                self.parse_synchronized_statement()
            }
            Some(Token::Class)
            | Some(Token::Public)
            | Some(Token::Protected)
            | Some(Token::Private)
            | Some(Token::Abstract)
            | Some(Token::Static)
            | Some(Token::Final)
            | Some(Token::Native)
            | Some(Token::Transient)
            | Some(Token::Volatile)
            | Some(Token::Strictfp)
            | Some(Token::Synchronized)
            | Some(Token::At) => self.parse_declaration_statement(),
            Some(Token::Identifier(_)) if matches!(self.peek(1), Some(Token::Colon)) => {
                self.parse_labeled_statement()
            }
            _ => {
                if let Some(decl) = self.try_parse_local_variable(true)? {
                    return Ok(decl);
                }

                let start = self.current_span().start;
                let expression = self.parse_expression_internal()?;
                self.expect(Token::Semicolon)?;
                Ok(rc(Node::ExpressionStatement(ExpressionStatement {
                    expression,
                    span: self.span_from(start),
                })))
            }
        }
    }

    /// ブロックを解析
    pub(super) fn parse_block(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::LeftBrace)?;

        let mut statements = Vec::new();
        while !self.check(&Token::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement_internal()?);
        }

        self.expect(Token::RightBrace)?;
        Ok(rc(Node::Block(Block {
            is_static: false,
            statements,
            span: self.span_from(start),
        })))
    }

    /// if文を解析
    fn parse_if_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::If)?;
        self.expect(Token::LeftParen)?;
        let condition = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;

        let then_statement = self.parse_statement_internal()?;
        let else_statement = if self.match_token(&Token::Else) {
            Some(self.parse_statement_internal()?)
        } else {
            None
        };

        Ok(rc(Node::If(If {
            condition,
            then_statement,
            else_statement,
            span: self.span_from(start),
        })))
    }

    /// while文を解析
    fn parse_while_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::While)?;
        self.expect(Token::LeftParen)?;
        let condition = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;
        let statement = self.parse_statement_internal()?;

        Ok(rc(Node::While(While {
            condition,
            statement,
            span: self.span_from(start),
        })))
    }

    /// do-while文を解析
    fn parse_do_while_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Do)?;
        let statement = self.parse_statement_internal()?;
        self.expect(Token::While)?;
        self.expect(Token::LeftParen)?;
        let condition = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;
        self.expect(Token::Semicolon)?;

        Ok(rc(Node::DoWhile(DoWhile {
            statement,
            condition,
            span: self.span_from(start),
        })))
    }

    /// for文（クラシック・拡張）を解析
    fn parse_for_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::For)?;
        self.expect(Token::LeftParen)?;

        if let Some((variable, expression)) = self.try_parse_enhanced_for_header()? {
            let statement = self.parse_statement_internal()?;
            return Ok(rc(Node::EnhancedFor(EnhancedFor {
                variable,
                expression,
                statement,
                span: self.span_from(start),
            })));
        }

        let initializer = if self.match_token(&Token::Semicolon) {
            Vec::new()
        } else if let Some(declaration) = self.try_parse_local_variable(true)? {
            vec![declaration]
        } else {
            let expressions = self.parse_statement_expression_list()?;
            self.expect(Token::Semicolon)?;
            expressions
        };

        let condition = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression_internal()?)
        };
        self.expect(Token::Semicolon)?;

        let update = if self.check(&Token::RightParen) {
            Vec::new()
        } else {
            self.parse_statement_expression_list()?
        };
        self.expect(Token::RightParen)?;

        let statement = self.parse_statement_internal()?;

        Ok(rc(Node::For(For {
            initializer,
            condition,
            update,
            statement,
            span: self.span_from(start),
        })))
    }

    /// 拡張forのヘッダ`Type name : expr)`の先読み解析
    fn try_parse_enhanced_for_header(&mut self) -> ParseResult<Option<(NodeRef, NodeRef)>> {
        let saved = self.save();
        let start = self.current_span().start;

        let attempt = self.parse_modifiers().and_then(|modifiers| {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            Ok((modifiers, ty, name))
        });

        let Ok((modifiers, ty, name)) = attempt else {
            self.restore(saved);
            return Ok(None);
        };

        if !self.match_token(&Token::Colon) {
            self.restore(saved);
            return Ok(None);
        }

        let variable = rc(Node::Variable(Variable {
            modifiers,
            ty: Some(ty),
            name,
            initializer: None,
            span: self.span_from(start),
        }));
        let expression = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;

        Ok(Some((variable, expression)))
    }

    /// for文の初期化・更新部の式リスト（式文として包む）
    fn parse_statement_expression_list(&mut self) -> ParseResult<Vec<NodeRef>> {
        let mut expressions = Vec::new();

        loop {
            let start = self.current_span().start;
            let expression = self.parse_expression_internal()?;
            expressions.push(rc(Node::ExpressionStatement(ExpressionStatement {
                expression,
                span: self.span_from(start),
            })));

            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        Ok(expressions)
    }

    /// return文を解析
    fn parse_return_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Return)?;

        let expression = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression_internal()?)
        };

        self.expect(Token::Semicolon)?;
        Ok(rc(Node::Return(Return {
            expression,
            span: self.span_from(start),
        })))
    }

    /// break文を解析
    fn parse_break_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Break)?;

        let label = match self.current_token() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        self.expect(Token::Semicolon)?;
        Ok(rc(Node::Break(Break {
            label,
            span: self.span_from(start),
        })))
    }

    /// continue文を解析
    fn parse_continue_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Continue)?;

        let label = match self.current_token() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        self.expect(Token::Semicolon)?;
        Ok(rc(Node::Continue(Continue {
            label,
            span: self.span_from(start),
        })))
    }

    /// throw文を解析
    fn parse_throw_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Throw)?;
        let expression = self.parse_expression_internal()?;
        self.expect(Token::Semicolon)?;

        Ok(rc(Node::Throw(Throw {
            expression,
            span: self.span_from(start),
        })))
    }

    /// try文（リソース・catch節・finally節）を解析
    fn parse_try_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Try)?;

        let mut resources = Vec::new();
        if self.match_token(&Token::LeftParen) {
            loop {
                let Some(resource) = self.try_parse_local_variable(false)? else {
                    return Err(self.error("tryリソースには変数宣言が必要です".to_string()));
                };
                resources.push(resource);

                if !self.match_token(&Token::Semicolon) {
                    break;
                }
                if self.check(&Token::RightParen) {
                    break;
                }
            }
            self.expect(Token::RightParen)?;
        }

        let block = self.parse_block()?;

        let mut catches = Vec::new();
        while self.check(&Token::Catch) {
            let catch_start = self.current_span().start;
            self.advance();
            self.expect(Token::LeftParen)?;

            let param_start = self.current_span().start;
            let modifiers = self.parse_modifiers()?;
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            let parameter = rc(Node::Variable(Variable {
                modifiers,
                ty: Some(ty),
                name,
                initializer: None,
                span: self.span_from(param_start),
            }));

            self.expect(Token::RightParen)?;
            let catch_block = self.parse_block()?;

            catches.push(rc(Node::Catch(Catch {
                parameter,
                block: catch_block,
                span: self.span_from(catch_start),
            })));
        }

        let finally_block = if self.match_token(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(rc(Node::Try(Try {
            resources,
            block,
            catches,
            finally_block,
            span: self.span_from(start),
        })))
    }

    /// switch文を解析
    fn parse_switch_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Switch)?;
        self.expect(Token::LeftParen)?;
        let expression = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;
        self.expect(Token::LeftBrace)?;

        let mut cases = Vec::new();
        while !self.check(&Token::RightBrace) && !self.is_at_end() {
            let case_start = self.current_span().start;

            let case_expression = if self.match_token(&Token::Case) {
                let expression = self.parse_expression_internal()?;
                self.expect(Token::Colon)?;
                Some(expression)
            } else if self.match_token(&Token::Default) {
                self.expect(Token::Colon)?;
                None
            } else {
                return Err(self.error("caseまたはdefaultを期待しました".to_string()));
            };

            let mut statements = Vec::new();
            while !matches!(
                self.current_token(),
                Some(Token::Case) | Some(Token::Default) | Some(Token::RightBrace) | None
            ) {
                statements.push(self.parse_statement_internal()?);
            }

            cases.push(rc(Node::Case(Case {
                expression: case_expression,
                statements,
                span: self.span_from(case_start),
            })));
        }

        self.expect(Token::RightBrace)?;
        Ok(rc(Node::Switch(Switch {
            expression,
            cases,
            span: self.span_from(start),
        })))
    }

    /// synchronized文を解析
    fn parse_synchronized_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Synchronized)?;
        self.expect(Token::LeftParen)?;
        let expression = self.parse_expression_internal()?;
        self.expect(Token::RightParen)?;
        let block = self.parse_block()?;

        Ok(rc(Node::Synchronized(Synchronized {
            expression,
            block,
            span: self.span_from(start),
        })))
    }

    /// assert文を解析
    fn parse_assert_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::Assert)?;
        let condition = self.parse_expression_internal()?;

        let detail = if self.match_token(&Token::Colon) {
            Some(self.parse_expression_internal()?)
        } else {
            None
        };

        self.expect(Token::Semicolon)?;
        Ok(rc(Node::Assert(Assert {
            condition,
            detail,
            span: self.span_from(start),
        })))
    }

    /// ラベルつき文を解析
    fn parse_labeled_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let label = self.expect_identifier()?;
        self.expect(Token::Colon)?;
        let statement = self.parse_statement_internal()?;

        Ok(rc(Node::Labeled(Labeled {
            label,
            statement,
            span: self.span_from(start),
        })))
    }

    /// 修飾子で始まる文（ローカルクラス・修飾子つき変数宣言）を解析
    fn parse_declaration_statement(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let modifiers = self.parse_modifiers()?;

        if self.check(&Token::Class) {
            return self.parse_class_declaration(modifiers, start);
        }

        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
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

    /// ローカル変数宣言の先読み解析。`Type name`まで読めて
    /// 続きが`=`か`;`でなければ巻き戻して`None`を返す。
    pub(super) fn try_parse_local_variable(
        &mut self,
        require_semicolon: bool,
    ) -> ParseResult<Option<NodeRef>> {
        let saved = self.save();
        let start = self.current_span().start;

        let attempt = self.parse_type().and_then(|ty| {
            let name = self.expect_identifier()?;
            Ok((ty, name))
        });

        let Ok((ty, name)) = attempt else {
            self.restore(saved);
            return Ok(None);
        };

        if !self.check(&Token::Assign) && !self.check(&Token::Semicolon) {
            self.restore(saved);
            return Ok(None);
        }

        let initializer = self.parse_variable_initializer()?;
        if require_semicolon {
            self.expect(Token::Semicolon)?;
        }

        Ok(Some(rc(Node::Variable(Variable {
            modifiers: None,
            ty: Some(ty),
            name,
            initializer,
            span: self.span_from(start),
        }))))
    }

    /// 変数初期化子（`= 式`または`= {配列初期化子}`）を解析
    pub(super) fn parse_variable_initializer(&mut self) -> ParseResult<Option<NodeRef>> {
        if !self.match_token(&Token::Assign) {
            return Ok(None);
        }

        if self.check(&Token::LeftBrace) {
            let start = self.current_span().start;
            let initializers = self.parse_array_initializer()?;
            return Ok(Some(rc(Node::NewArray(NewArray {
                ty: None,
                dimensions: Vec::new(),
                initializers: Some(initializers),
                span: self.span_from(start),
            }))));
        }

        Ok(Some(self.parse_expression_internal()?))
    }
}

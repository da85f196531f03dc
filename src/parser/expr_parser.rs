//! 式の解析

use crate::lexer::Token;
use crate::tree::{
    ArrayAccess, Assignment, BinaryOp, CompoundAssignment, Conditional, Identifier, InstanceOf,
    Lambda, Literal, LiteralValue, MemberReference, MemberSelect, MethodInvocation, NewArray,
    NewClass, Node, NodeRef, Parenthesized, ReferenceMode, TypeCast, Unary, UnaryOp, Variable,
};

use super::{rc, ParseResult, Parser};

impl Parser {
    /// 式を解析（内部実装）
    pub(super) fn parse_expression_internal(&mut self) -> ParseResult<NodeRef> {
        if let Some(lambda) = self.try_parse_lambda()? {
            return Ok(lambda);
        }
        self.parse_assignment()
    }

    /// ラムダ式の先読み解析。`x -> ...` と `(params) -> ...` の
    /// 形だけを認め、違ったら位置を巻き戻して`None`を返す。
    fn try_parse_lambda(&mut self) -> ParseResult<Option<NodeRef>> {
        let start = self.current_span().start;

        if let (Some(Token::Identifier(name)), Some(Token::Arrow)) =
            (self.current_token(), self.peek(1))
        {
            let name = name.clone();
            self.advance();
            let param = rc(Node::Variable(Variable {
                modifiers: None,
                ty: None,
                name,
                initializer: None,
                span: self.span_from(start),
            }));
            self.advance();
            let body = self.parse_lambda_body()?;
            return Ok(Some(rc(Node::Lambda(Lambda {
                parameters: vec![param],
                body,
                span: self.span_from(start),
            }))));
        }

        if !self.check(&Token::LeftParen) {
            return Ok(None);
        }

        let saved = self.save();
        self.advance();

        let mut parameters = Vec::new();

        if !self.match_token(&Token::RightParen) {
            loop {
                let param_start = self.current_span().start;

                let bare = matches!(self.current_token(), Some(Token::Identifier(_)))
                    && matches!(self.peek(1), Some(Token::Comma) | Some(Token::RightParen));

                let param = if bare {
                    let name = self.expect_identifier()?;
                    rc(Node::Variable(Variable {
                        modifiers: None,
                        ty: None,
                        name,
                        initializer: None,
                        span: self.span_from(param_start),
                    }))
                } else {
                    let attempt = self.parse_type().and_then(|ty| {
                        let name = self.expect_identifier()?;
                        Ok(rc(Node::Variable(Variable {
                            modifiers: None,
                            ty: Some(ty),
                            name,
                            initializer: None,
                            span: self.span_from(param_start),
                        })))
                    });
                    match attempt {
                        Ok(param) => param,
                        Err(_) => {
                            self.restore(saved);
                            return Ok(None);
                        }
                    }
                };

                parameters.push(param);

                if !self.match_token(&Token::Comma) {
                    break;
                }
            }

            if !self.match_token(&Token::RightParen) {
                self.restore(saved);
                return Ok(None);
            }
        }

        if !self.match_token(&Token::Arrow) {
            self.restore(saved);
            return Ok(None);
        }

        let body = self.parse_lambda_body()?;

        Ok(Some(rc(Node::Lambda(Lambda {
            parameters,
            body,
            span: self.span_from(start),
        }))))
    }

    fn parse_lambda_body(&mut self) -> ParseResult<NodeRef> {
        if self.check(&Token::LeftBrace) {
            self.parse_block()
        } else {
            self.parse_expression_internal()
        }
    }

    /// 代入式を解析（右結合）
    fn parse_assignment(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let left = self.parse_ternary()?;

        if self.match_token(&Token::Assign) {
            let value = self.parse_expression_internal()?;
            return Ok(rc(Node::Assignment(Assignment {
                variable: left,
                expression: value,
                span: self.span_from(start),
            })));
        }

        if let Some(token) = self.match_tokens(&[
            Token::PlusAssign,
            Token::MinusAssign,
            Token::StarAssign,
            Token::SlashAssign,
            Token::PercentAssign,
            Token::AmpAssign,
            Token::PipeAssign,
            Token::CaretAssign,
            Token::ShlAssign,
            Token::ShrAssign,
            Token::UShrAssign,
        ]) {
            let op = match token {
                Token::PlusAssign => BinaryOp::Plus,
                Token::MinusAssign => BinaryOp::Minus,
                Token::StarAssign => BinaryOp::Multiply,
                Token::SlashAssign => BinaryOp::Divide,
                Token::PercentAssign => BinaryOp::Remainder,
                Token::AmpAssign => BinaryOp::And,
                Token::PipeAssign => BinaryOp::Or,
                Token::CaretAssign => BinaryOp::Xor,
                Token::ShlAssign => BinaryOp::LeftShift,
                Token::ShrAssign => BinaryOp::RightShift,
                Token::UShrAssign => BinaryOp::UnsignedRightShift,
                _ => unreachable!(),
            };
            let value = self.parse_expression_internal()?;
            return Ok(rc(Node::CompoundAssignment(CompoundAssignment {
                op,
                variable: left,
                expression: value,
                span: self.span_from(start),
            })));
        }

        Ok(left)
    }

    /// 三項条件式を解析
    fn parse_ternary(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let condition = self.parse_or_expression()?;

        if self.match_token(&Token::Question) {
            let true_expression = self.parse_expression_internal()?;
            self.expect(Token::Colon)?;
            let false_expression = self.parse_expression_internal()?;
            return Ok(rc(Node::Conditional(Conditional {
                condition,
                true_expression,
                false_expression,
                span: self.span_from(start),
            })));
        }

        Ok(condition)
    }

    fn binary(&self, start: usize, op: BinaryOp, left: NodeRef, right: NodeRef) -> NodeRef {
        rc(Node::Binary(crate::tree::Binary {
            op,
            left,
            right,
            span: self.span_from(start),
        }))
    }

    /// 論理OR式を解析
    fn parse_or_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_and_expression()?;

        while self.match_token(&Token::OrOr) {
            let right = self.parse_and_expression()?;
            left = self.binary(start, BinaryOp::ConditionalOr, left, right);
        }

        Ok(left)
    }

    /// 論理AND式を解析
    fn parse_and_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_bitwise_or_expression()?;

        while self.match_token(&Token::AndAnd) {
            let right = self.parse_bitwise_or_expression()?;
            left = self.binary(start, BinaryOp::ConditionalAnd, left, right);
        }

        Ok(left)
    }

    /// ビット演算OR式を解析
    fn parse_bitwise_or_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_bitwise_xor_expression()?;

        while self.match_token(&Token::Pipe) {
            let right = self.parse_bitwise_xor_expression()?;
            left = self.binary(start, BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    /// ビット演算XOR式を解析
    fn parse_bitwise_xor_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_bitwise_and_expression()?;

        while self.match_token(&Token::Caret) {
            let right = self.parse_bitwise_and_expression()?;
            left = self.binary(start, BinaryOp::Xor, left, right);
        }

        Ok(left)
    }

    /// ビット演算AND式を解析
    fn parse_bitwise_and_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_equality_expression()?;

        while self.match_token(&Token::Ampersand) {
            let right = self.parse_equality_expression()?;
            left = self.binary(start, BinaryOp::And, left, right);
        }

        Ok(left)
    }

    /// 等価式を解析
    fn parse_equality_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_relational_expression()?;

        while let Some(token) = self.match_tokens(&[Token::Equal, Token::NotEqual]) {
            let op = match token {
                Token::Equal => BinaryOp::Equal,
                Token::NotEqual => BinaryOp::NotEqual,
                _ => unreachable!(),
            };
            let right = self.parse_relational_expression()?;
            left = self.binary(start, op, left, right);
        }

        Ok(left)
    }

    /// 関係式・instanceof式を解析
    fn parse_relational_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_shift_expression()?;

        loop {
            if self.match_token(&Token::InstanceOf) {
                let ty = self.parse_type()?;

                // 束縛つき`instanceof`はパターンとして表す
                if let Some(Token::Identifier(name)) = self.current_token() {
                    let name = name.clone();
                    let binding_start = self.current_span().start;
                    self.advance();
                    let variable = rc(Node::Variable(Variable {
                        modifiers: None,
                        ty: Some(ty),
                        name,
                        initializer: None,
                        span: self.span_from(binding_start),
                    }));
                    let pattern = rc(Node::BindingPattern(crate::tree::BindingPattern {
                        variable,
                        span: self.span_from(binding_start),
                    }));
                    left = rc(Node::InstanceOf(InstanceOf {
                        expression: left,
                        ty: None,
                        pattern: Some(pattern),
                        span: self.span_from(start),
                    }));
                } else {
                    left = rc(Node::InstanceOf(InstanceOf {
                        expression: left,
                        ty: Some(ty),
                        pattern: None,
                        span: self.span_from(start),
                    }));
                }
                continue;
            }

            let Some(token) = self.match_tokens(&[
                Token::Less,
                Token::Greater,
                Token::LessEqual,
                Token::GreaterEqual,
            ]) else {
                break;
            };
            let op = match token {
                Token::Less => BinaryOp::Less,
                Token::Greater => BinaryOp::Greater,
                Token::LessEqual => BinaryOp::LessEqual,
                Token::GreaterEqual => BinaryOp::GreaterEqual,
                _ => unreachable!(),
            };
            let right = self.parse_shift_expression()?;
            left = self.binary(start, op, left, right);
        }

        Ok(left)
    }

    /// シフト式を解析
    fn parse_shift_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_additive_expression()?;

        while let Some(token) = self.match_tokens(&[Token::Shl, Token::Shr, Token::UShr]) {
            let op = match token {
                Token::Shl => BinaryOp::LeftShift,
                Token::Shr => BinaryOp::RightShift,
                Token::UShr => BinaryOp::UnsignedRightShift,
                _ => unreachable!(),
            };
            let right = self.parse_additive_expression()?;
            left = self.binary(start, op, left, right);
        }

        Ok(left)
    }

    /// 加減算式を解析
    fn parse_additive_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_multiplicative_expression()?;

        while let Some(token) = self.match_tokens(&[Token::Plus, Token::Minus]) {
            let op = match token {
                Token::Plus => BinaryOp::Plus,
                Token::Minus => BinaryOp::Minus,
                _ => unreachable!(),
            };
            let right = self.parse_multiplicative_expression()?;
            left = self.binary(start, op, left, right);
        }

        Ok(left)
    }

    /// 乗除算式を解析
    fn parse_multiplicative_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut left = self.parse_unary_expression()?;

        while let Some(token) = self.match_tokens(&[Token::Star, Token::Slash, Token::Percent]) {
            let op = match token {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                Token::Percent => BinaryOp::Remainder,
                _ => unreachable!(),
            };
            let right = self.parse_unary_expression()?;
            left = self.binary(start, op, left, right);
        }

        Ok(left)
    }

    /// 前置単項式・キャスト式を解析
    fn parse_unary_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;

        if let Some(token) = self.match_tokens(&[
            Token::Plus,
            Token::Minus,
            Token::Not,
            Token::Tilde,
            Token::PlusPlus,
            Token::MinusMinus,
        ]) {
            let op = match token {
                Token::Plus => UnaryOp::Plus,
                Token::Minus => UnaryOp::Minus,
                Token::Not => UnaryOp::Not,
                Token::Tilde => UnaryOp::Complement,
                Token::PlusPlus => UnaryOp::PrefixIncrement,
                Token::MinusMinus => UnaryOp::PrefixDecrement,
                _ => unreachable!(),
            };
            let operand = self.parse_unary_expression()?;
            return Ok(rc(Node::Unary(Unary {
                op,
                operand,
                span: self.span_from(start),
            })));
        }

        // `(Type) expr`のキャストを先読みで試す
        if self.check(&Token::LeftParen) {
            let saved = self.save();
            self.advance();

            if let Ok(ty) = self.parse_type() {
                if self.check(&Token::RightParen) && self.cast_operand_follows() {
                    self.advance();
                    let expression = self.parse_unary_expression()?;
                    return Ok(rc(Node::TypeCast(TypeCast {
                        ty,
                        expression,
                        span: self.span_from(start),
                    })));
                }
            }

            self.restore(saved);
        }

        self.parse_postfix_expression()
    }

    /// 閉じかっこの次がキャストの被演算子になり得るか
    fn cast_operand_follows(&self) -> bool {
        matches!(
            self.peek(1),
            Some(Token::Identifier(_))
                | Some(Token::IntLiteral(_))
                | Some(Token::FloatLiteral(_))
                | Some(Token::StringLiteral(_))
                | Some(Token::CharLiteral(_))
                | Some(Token::True)
                | Some(Token::False)
                | Some(Token::Null)
                | Some(Token::LeftParen)
                | Some(Token::Not)
                | Some(Token::Tilde)
                | Some(Token::New)
        )
    }

    /// 後置式（メンバ選択・呼び出し・添字・メソッド参照・増減）を解析
    fn parse_postfix_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        let mut expr = self.parse_primary_expression()?;

        loop {
            if self.match_token(&Token::Dot) {
                let identifier = self.expect_identifier()?;
                expr = rc(Node::MemberSelect(MemberSelect {
                    expression: expr,
                    identifier,
                    span: self.span_from(start),
                }));
            } else if self.check(&Token::LeftParen) {
                let arguments = self.parse_arguments()?;
                expr = rc(Node::MethodInvocation(MethodInvocation {
                    type_arguments: Vec::new(),
                    method_select: expr,
                    arguments,
                    span: self.span_from(start),
                }));
            } else if self.match_token(&Token::LeftBracket) {
                let index = self.parse_expression_internal()?;
                self.expect(Token::RightBracket)?;
                expr = rc(Node::ArrayAccess(ArrayAccess {
                    expression: expr,
                    index,
                    span: self.span_from(start),
                }));
            } else if self.match_token(&Token::DoubleColon) {
                let (mode, name) = if self.match_token(&Token::New) {
                    (ReferenceMode::New, "new".to_string())
                } else {
                    (ReferenceMode::Invoke, self.expect_identifier()?)
                };
                expr = rc(Node::MemberReference(MemberReference {
                    mode,
                    qualifier_expression: expr,
                    name,
                    type_arguments: Vec::new(),
                    span: self.span_from(start),
                }));
            } else if self.match_token(&Token::PlusPlus) {
                expr = rc(Node::Unary(Unary {
                    op: UnaryOp::PostfixIncrement,
                    operand: expr,
                    span: self.span_from(start),
                }));
            } else if self.match_token(&Token::MinusMinus) {
                expr = rc(Node::Unary(Unary {
                    op: UnaryOp::PostfixDecrement,
                    operand: expr,
                    span: self.span_from(start),
                }));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// 一次式を解析
    fn parse_primary_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;

        let literal = match self.current_token() {
            Some(Token::IntLiteral(value)) => Some(LiteralValue::Int(*value)),
            Some(Token::FloatLiteral(value)) => Some(LiteralValue::Float(*value)),
            Some(Token::StringLiteral(value)) => Some(LiteralValue::String(value.clone())),
            Some(Token::CharLiteral(value)) => Some(LiteralValue::Char(*value)),
            Some(Token::True) => Some(LiteralValue::Boolean(true)),
            Some(Token::False) => Some(LiteralValue::Boolean(false)),
            Some(Token::Null) => Some(LiteralValue::Null),
            _ => None,
        };

        if let Some(value) = literal {
            self.advance();
            return Ok(rc(Node::Literal(Literal {
                value,
                span: self.span_from(start),
            })));
        }

        match self.current_token() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(rc(Node::Identifier(Identifier {
                    name,
                    span: self.span_from(start),
                })))
            }
            Some(Token::LeftParen) => {
                self.advance();
                let expression = self.parse_expression_internal()?;
                self.expect(Token::RightParen)?;
                Ok(rc(Node::Parenthesized(Parenthesized {
                    expression,
                    span: self.span_from(start),
                })))
            }
            Some(Token::New) => self.parse_new_expression(),
            _ => Err(self.error("式を期待しました".to_string())),
        }
    }

    /// `new`式（クラス生成・配列生成）を解析
    fn parse_new_expression(&mut self) -> ParseResult<NodeRef> {
        let start = self.current_span().start;
        self.expect(Token::New)?;
        let ty = self.parse_type()?;

        if self.check(&Token::LeftBracket) {
            let mut dimensions = Vec::new();

            while self.match_token(&Token::LeftBracket) {
                if self.match_token(&Token::RightBracket) {
                    continue;
                }
                dimensions.push(self.parse_expression_internal()?);
                self.expect(Token::RightBracket)?;
            }

            let initializers = if self.check(&Token::LeftBrace) {
                Some(self.parse_array_initializer()?)
            } else {
                None
            };

            return Ok(rc(Node::NewArray(NewArray {
                ty: Some(ty),
                dimensions,
                initializers,
                span: self.span_from(start),
            })));
        }

        let arguments = self.parse_arguments()?;

        let class_body = if self.check(&Token::LeftBrace) {
            Some(self.parse_anonymous_class_body(start)?)
        } else {
            None
        };

        Ok(rc(Node::NewClass(NewClass {
            enclosing_expression: None,
            type_arguments: Vec::new(),
            identifier: ty,
            arguments,
            class_body,
            span: self.span_from(start),
        })))
    }

    /// 配列初期化子を解析（要素は式またはネストした初期化子）
    pub(super) fn parse_array_initializer(&mut self) -> ParseResult<Vec<NodeRef>> {
        self.expect(Token::LeftBrace)?;
        let mut elements = Vec::new();

        if !self.check(&Token::RightBrace) {
            loop {
                if self.check(&Token::LeftBrace) {
                    let start = self.current_span().start;
                    let initializers = self.parse_array_initializer()?;
                    elements.push(rc(Node::NewArray(NewArray {
                        ty: None,
                        dimensions: Vec::new(),
                        initializers: Some(initializers),
                        span: self.span_from(start),
                    })));
                } else {
                    elements.push(self.parse_expression_internal()?);
                }

                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::RightBrace)?;
        Ok(elements)
    }

    /// 実引数リストを解析
    pub(super) fn parse_arguments(&mut self) -> ParseResult<Vec<NodeRef>> {
        self.expect(Token::LeftParen)?;
        let mut arguments = Vec::new();

        if !self.check(&Token::RightParen) {
            loop {
                arguments.push(self.parse_expression_internal()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::RightParen)?;
        Ok(arguments)
    }
}

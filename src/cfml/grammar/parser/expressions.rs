//! Expression productions
//!
//! Binary operators use precedence climbing over the levels in
//! [`crate::cfml::ast::decompile::precedence`], so the parse tree already has the nesting the
//! decompiler would print without parentheses.

use super::{ParseResult, ScriptGrammar};
use crate::cfml::ast::decompile::precedence;
use crate::cfml::ast::elements::operators::{binary_precedence, is_right_associative};
use crate::cfml::grammar::interpolation::{self, Segment};
use crate::cfml::grammar::stream::TokenStream;
use crate::cfml::grammar::token::{is_reserved, Token};
use crate::cfml::grammar::tree::{NodeKind, ParseNode};
use std::ops::Range;

/// Single-word binary operators, lower case
const WORD_OPERATORS: [&str; 16] = [
    "and", "or", "xor", "eqv", "imp", "mod", "eq", "neq", "is", "gt", "gte", "ge", "lt", "lte",
    "le", "contains",
];

impl ScriptGrammar {
    /// Full expression: declarations, assignments and everything below
    pub(super) fn parse_expression(&mut self) -> ParseResult {
        if self.stream.nth_is_word(0, "var") && self.stream.nth_token(1) == Some(Token::Identifier) {
            return self.parse_var_declaration();
        }

        let target = self.parse_ternary()?;
        match self.stream.peek_token() {
            Some(token) if token.is_assignment_operator() => {
                let operator = self.stream.nth_text(0).to_string();
                self.stream.advance();
                let value = self.parse_expression()?;
                let span = target.span.start..value.span.end;
                Ok(ParseNode::new(NodeKind::AssignmentExpression, span)
                    .with_token(operator)
                    .with_children(vec![target, value]))
            }
            _ => Ok(target),
        }
    }

    fn parse_var_declaration(&mut self) -> ParseResult {
        let start = self.expect_word("var")?.span.start;
        let mut node = ParseNode::new(NodeKind::VarDeclaration, 0..0).with_child(self.parse_dotted_path()?);
        if self.eat(Token::Assign) {
            node = node.with_child(self.parse_expression()?);
        }
        node.span = self.span_from(start);
        Ok(node)
    }

    /// `a.b.c` as an identifier or access path of dot suffixes
    pub(super) fn parse_dotted_path(&mut self) -> ParseResult {
        let (name, span) = self.expect_identifier()?;
        let root = ParseNode::new(NodeKind::Identifier, span.clone()).with_token(name);
        let mut path = vec![root];
        while self.check(Token::Dot) && self.stream.nth_token(1) == Some(Token::Identifier) {
            self.stream.advance();
            let (member, member_span) = self.expect_identifier()?;
            path.push(ParseNode::new(NodeKind::DotSuffix, member_span).with_token(member));
        }
        if path.len() == 1 {
            return Ok(path.remove(0));
        }
        Ok(self.node(NodeKind::AccessPath, span.start).with_children(path))
    }

    pub(super) fn parse_ternary(&mut self) -> ParseResult {
        let condition = self.parse_binary(precedence::IMP)?;
        match self.stream.peek_token() {
            Some(Token::Elvis) => {
                self.stream.advance();
                let fallback = self.parse_ternary()?;
                let span = condition.span.start..fallback.span.end;
                Ok(ParseNode::new(NodeKind::ElvisExpression, span).with_children(vec![condition, fallback]))
            }
            Some(Token::Question) => {
                self.stream.advance();
                let then_branch = self.parse_ternary()?;
                self.expect(Token::Colon)?;
                let else_branch = self.parse_ternary()?;
                let span = condition.span.start..else_branch.span.end;
                Ok(ParseNode::new(NodeKind::TernaryExpression, span)
                    .with_children(vec![condition, then_branch, else_branch]))
            }
            _ => Ok(condition),
        }
    }

    /// Operator at the cursor: its text as written and how many tokens it spans
    fn peek_binary_operator(&self) -> Option<(String, usize)> {
        let stream = &self.stream;
        let token = stream.peek_token()?;
        if token.is_symbolic_binary_operator() {
            return Some((stream.nth_text(0).to_string(), 1));
        }
        if token != Token::Identifier {
            return None;
        }
        if stream.nth_is_word(0, "is") && stream.nth_is_word(1, "not") {
            return Some((format!("{} {}", stream.nth_text(0), stream.nth_text(1)), 2));
        }
        if stream.nth_is_word(0, "does") && stream.nth_is_word(1, "not") && stream.nth_is_word(2, "contain") {
            let text = format!("{} {} {}", stream.nth_text(0), stream.nth_text(1), stream.nth_text(2));
            return Some((text, 3));
        }
        WORD_OPERATORS
            .iter()
            .any(|word| stream.nth_is_word(0, word))
            .then(|| (stream.nth_text(0).to_string(), 1))
    }

    fn parse_binary(&mut self, minimum: u8) -> ParseResult {
        let mut left = self.parse_unary()?;
        while let Some((operator, width)) = self.peek_binary_operator() {
            let Some(level) = binary_precedence(&operator) else {
                break;
            };
            if level < minimum {
                break;
            }
            for _ in 0..width {
                self.stream.advance();
            }
            let next = if is_right_associative(&operator) { level } else { level + 1 };
            let right = self.parse_binary(next)?;
            let span = left.span.start..right.span.end;
            left = ParseNode::new(NodeKind::BinaryExpression, span)
                .with_token(operator)
                .with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult {
        let start = self.stream.offset();
        let operator = self.stream.nth_text(0).to_string();
        let operand = match self.stream.peek_token() {
            Some(Token::Bang) => {
                self.stream.advance();
                self.parse_binary(precedence::NOT)?
            }
            Some(Token::Identifier) if self.stream.nth_is_word(0, "not") => {
                self.stream.advance();
                self.parse_binary(precedence::NOT)?
            }
            Some(Token::Plus | Token::Minus) => {
                self.stream.advance();
                self.parse_binary(precedence::SIGN)?
            }
            Some(Token::PlusPlus | Token::MinusMinus) => {
                self.stream.advance();
                self.parse_unary()?
            }
            _ => return self.parse_postfix(),
        };
        Ok(self
            .node(NodeKind::PrefixExpression, start)
            .with_token(operator)
            .with_child(operand))
    }

    fn parse_postfix(&mut self) -> ParseResult {
        let operand = self.parse_access()?;
        match self.stream.peek_token() {
            Some(Token::PlusPlus | Token::MinusMinus) => {
                let operator = self.stream.nth_text(0).to_string();
                self.stream.advance();
                Ok(self
                    .node(NodeKind::PostfixExpression, operand.span.start)
                    .with_token(operator)
                    .with_child(operand))
            }
            _ => Ok(operand),
        }
    }

    /// Primary followed by `.name`, `[index]` and `(args)` suffixes
    fn parse_access(&mut self) -> ParseResult {
        let primary = self.parse_primary()?;
        let start = primary.span.start;
        let mut path = vec![primary];
        loop {
            let suffix_start = self.stream.offset();
            match self.stream.peek_token() {
                Some(Token::Dot) if self.stream.nth_token(1) == Some(Token::Identifier) => {
                    self.stream.advance();
                    let (member, member_span) = self.expect_identifier()?;
                    path.push(ParseNode::new(NodeKind::DotSuffix, member_span).with_token(member));
                }
                Some(Token::LeftBracket) => {
                    self.stream.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RightBracket)?;
                    path.push(self.node(NodeKind::IndexSuffix, suffix_start).with_child(index));
                }
                Some(Token::LeftParen) => {
                    let arguments = self.parse_arguments()?;
                    path.push(self.node(NodeKind::CallSuffix, suffix_start).with_children(arguments));
                }
                _ => break,
            }
        }
        if path.len() == 1 {
            return Ok(path.remove(0));
        }
        Ok(self.node(NodeKind::AccessPath, start).with_children(path))
    }

    /// `( [name =] value, ... )`
    fn parse_arguments(&mut self) -> ParseResult<Vec<ParseNode>> {
        self.expect(Token::LeftParen)?;
        let mut arguments = Vec::new();
        if !self.check(Token::RightParen) {
            loop {
                let start = self.stream.offset();
                let named = self.check(Token::Identifier)
                    && matches!(self.stream.nth_token(1), Some(Token::Assign | Token::Colon));
                let mut argument = ParseNode::new(NodeKind::Argument, 0..0);
                if named {
                    argument = argument.with_token(self.expect_identifier()?.0);
                    self.stream.advance();
                }
                argument = argument.with_child(self.parse_ternary()?);
                argument.span = self.span_from(start);
                arguments.push(argument);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult {
        let Some(lexeme) = self.stream.peek().cloned() else {
            return Err(self.unexpected("expression"));
        };
        let text = self.stream.text(&lexeme).to_string();
        let start = lexeme.span.start;
        match lexeme.token {
            Token::Integer | Token::Float => {
                self.stream.advance();
                let kind = if lexeme.token == Token::Integer {
                    NodeKind::IntegerLiteral
                } else {
                    NodeKind::FloatLiteral
                };
                Ok(ParseNode::new(kind, lexeme.span).with_token(text))
            }
            Token::DoubleString | Token::SingleString => {
                self.stream.advance();
                self.parse_string(&text, lexeme.span)
            }
            Token::Hash => {
                self.stream.advance();
                let inner = self.parse_expression()?;
                self.expect(Token::Hash)?;
                Ok(self.node(NodeKind::NestedExpression, start).with_child(inner))
            }
            Token::LeftBracket => self.parse_array(),
            Token::LeftBrace => self.parse_struct(),
            Token::LeftParen => {
                self.decide("parenthesized-or-arrow", Self::parse_parenthesized, Self::parse_arrow_function)
            }
            Token::Identifier => {
                let word = text.to_ascii_lowercase();
                match word.as_str() {
                    "true" | "false" => {
                        self.stream.advance();
                        Ok(ParseNode::new(NodeKind::BooleanLiteral, lexeme.span).with_token(text))
                    }
                    "function" => self.parse_function_expression(),
                    "new" => self.parse_new(),
                    _ if self.stream.nth_token(1) == Some(Token::Arrow) => self.parse_arrow_function(),
                    _ if is_reserved(&word) => Err(self.unexpected("expression")),
                    _ => {
                        self.stream.advance();
                        Ok(ParseNode::new(NodeKind::Identifier, lexeme.span).with_token(text))
                    }
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    pub(super) fn parse_parenthesized(&mut self) -> ParseResult {
        let start = self.expect(Token::LeftParen)?.span.start;
        let inner = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        if self.check(Token::Arrow) {
            return Err(self.unexpected("operator"));
        }
        Ok(self.node(NodeKind::ParenthesizedExpression, start).with_child(inner))
    }

    /// `(a, b) => body` or `a => body`
    pub(super) fn parse_arrow_function(&mut self) -> ParseResult {
        let start = self.stream.offset();
        let parameters = if self.check(Token::LeftParen) {
            self.parse_parameter_list()?
        } else {
            let (name, span) = self.expect_identifier()?;
            let parameter = ParseNode::new(NodeKind::Parameter, span.clone()).with_token(name);
            ParseNode::new(NodeKind::ParameterList, span).with_child(parameter)
        };
        self.expect(Token::Arrow)?;
        let (style, body) = if self.check(Token::LeftBrace) {
            ("arrow", self.parse_block()?)
        } else {
            ("arrow-expression", self.parse_expression()?)
        };
        Ok(self
            .node(NodeKind::FunctionExpression, start)
            .with_token(style)
            .with_children(vec![parameters, body]))
    }

    fn parse_function_expression(&mut self) -> ParseResult {
        let start = self.expect_word("function")?.span.start;
        let mut children = vec![self.parse_parameter_list()?];
        children.extend(self.parse_attributes()?);
        children.push(self.parse_block()?);
        Ok(self
            .node(NodeKind::FunctionExpression, start)
            .with_token("function")
            .with_children(children))
    }

    /// `new a.b.C(args)` or `new "a.b.C"(args)`
    fn parse_new(&mut self) -> ParseResult {
        let start = self.expect_word("new")?.span.start;
        let class = match self.stream.peek() {
            Some(lexeme) if lexeme.token.is_string() => {
                let lexeme = lexeme.clone();
                let raw = self.stream.text(&lexeme).to_string();
                self.stream.advance();
                self.parse_string(&raw, lexeme.span)?
            }
            _ => self.parse_dotted_path()?,
        };
        let mut children = vec![class];
        children.extend(self.parse_arguments()?);
        Ok(self.node(NodeKind::NewExpression, start).with_children(children))
    }

    fn parse_array(&mut self) -> ParseResult {
        let start = self.expect(Token::LeftBracket)?.span.start;
        let mut elements = Vec::new();
        if !self.check(Token::RightBracket) {
            loop {
                elements.push(self.parse_ternary()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightBracket)?;
        Ok(self.node(NodeKind::ArrayLiteral, start).with_children(elements))
    }

    /// `{ key: value, "key" = value }`
    fn parse_struct(&mut self) -> ParseResult {
        let start = self.expect(Token::LeftBrace)?.span.start;
        let mut entries = Vec::new();
        if !self.check(Token::RightBrace) {
            loop {
                entries.push(self.parse_struct_entry()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightBrace)?;
        Ok(self.node(NodeKind::StructLiteral, start).with_children(entries))
    }

    fn parse_struct_entry(&mut self) -> ParseResult {
        let Some(lexeme) = self.stream.peek().cloned() else {
            return Err(self.unexpected("struct key"));
        };
        let text = self.stream.text(&lexeme).to_string();
        let key = match lexeme.token {
            Token::Identifier => ParseNode::new(NodeKind::Identifier, lexeme.span.clone()).with_token(text),
            Token::Integer => ParseNode::new(NodeKind::IntegerLiteral, lexeme.span.clone()).with_token(text),
            Token::DoubleString | Token::SingleString => {
                let value = interpolation::unescape(&text)
                    .map_err(|error| self.error_at(lexeme.span.clone(), error.to_string()))?;
                ParseNode::new(NodeKind::StringLiteral, lexeme.span.clone()).with_token(value)
            }
            _ => return Err(self.unexpected("struct key")),
        };
        self.stream.advance();
        if !self.eat(Token::Colon) && !self.eat(Token::Assign) {
            return Err(self.unexpected("':' or '='"));
        }
        let value = self.parse_ternary()?;
        Ok(self
            .node(NodeKind::StructEntry, lexeme.span.start)
            .with_children(vec![key, value]))
    }

    /// A string token; interpolated parts become a left-nested `&` chain
    fn parse_string(&mut self, raw: &str, span: Range<usize>) -> ParseResult {
        let segments = interpolation::split(raw, span.start).map_err(|error| {
            let offset = error.offset();
            self.error_at(offset..offset + 1, error.to_string())
        })?;

        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            let part = match segment {
                Segment::Text(text) => ParseNode::new(NodeKind::StringLiteral, span.clone()).with_token(text),
                Segment::Expression(region) => {
                    let outer = region.start - 1..region.end + 1;
                    let inner = self.parse_embedded(region)?;
                    ParseNode::new(NodeKind::NestedExpression, outer).with_child(inner)
                }
            };
            parts.push(part);
        }

        let mut parts = parts.into_iter();
        let Some(mut folded) = parts.next() else {
            return Ok(ParseNode::new(NodeKind::StringLiteral, span).with_token(""));
        };
        for part in parts {
            folded = ParseNode::new(NodeKind::BinaryExpression, span.clone())
                .with_token("&")
                .with_children(vec![folded, part]);
        }
        Ok(folded)
    }

    /// Parse the expression inside `#...#` from its own token stream
    fn parse_embedded(&mut self, region: Range<usize>) -> ParseResult {
        let embedded = TokenStream::for_region(self.source.clone(), region);
        self.check_lex_errors(&embedded)?;
        let outer = std::mem::replace(&mut self.stream, embedded);
        let result = self.parse_expression().and_then(|expression| {
            if self.stream.at_end() {
                Ok(expression)
            } else {
                Err(self.unexpected("'#'"))
            }
        });
        self.stream = outer;
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::cfml::grammar::engine::{EntryPoint, GrammarEngine, PredictionMode};
    use crate::cfml::grammar::parser::ScriptGrammar;
    use crate::cfml::grammar::tree::ParseNode;

    fn expression(source: &str) -> ParseNode {
        let mut grammar = ScriptGrammar::new();
        grammar.set_input(source);
        grammar.set_prediction_mode(PredictionMode::Full);
        grammar.parse(EntryPoint::Expression).unwrap()
    }

    /// Compact s-expression of node kinds and tokens
    fn shape(node: &ParseNode) -> String {
        let head = match &node.token {
            Some(token) => format!("{:?}:{}", node.kind, token),
            None => format!("{:?}", node.kind),
        };
        if node.children.is_empty() {
            head
        } else {
            let children: Vec<_> = node.children.iter().map(shape).collect();
            format!("({} {})", head, children.join(" "))
        }
    }

    #[test]
    fn test_precedence_climbing() {
        assert_eq!(
            shape(&expression("1 + 2 * 3")),
            "(BinaryExpression:+ IntegerLiteral:1 (BinaryExpression:* IntegerLiteral:2 IntegerLiteral:3))"
        );
        assert_eq!(
            shape(&expression("a - b - c")),
            "(BinaryExpression:- (BinaryExpression:- Identifier:a Identifier:b) Identifier:c)"
        );
        assert_eq!(
            shape(&expression("a ^ b ^ c")),
            "(BinaryExpression:^ Identifier:a (BinaryExpression:^ Identifier:b Identifier:c))"
        );
    }

    #[test]
    fn test_keyword_operators() {
        assert_eq!(
            shape(&expression("a IS NOT b and not c")),
            "(BinaryExpression:and (BinaryExpression:IS NOT Identifier:a Identifier:b) (PrefixExpression:not Identifier:c))"
        );
        assert_eq!(
            shape(&expression("x does not contain 'y'")).split(' ').next(),
            Some("(BinaryExpression:does")
        );
    }

    #[test]
    fn test_access_path_suffixes() {
        assert_eq!(
            shape(&expression("a.b[1](x = 2)")),
            "(AccessPath Identifier:a DotSuffix:b (IndexSuffix IntegerLiteral:1) (CallSuffix (Argument:x IntegerLiteral:2)))"
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_multiplication() {
        assert_eq!(
            shape(&expression("-a * b")),
            "(BinaryExpression:* (PrefixExpression:- Identifier:a) Identifier:b)"
        );
        assert_eq!(shape(&expression("i++")), "(PostfixExpression:++ Identifier:i)");
    }

    #[test]
    fn test_ternary_and_elvis() {
        assert_eq!(
            shape(&expression("a ? b : c ?: d")),
            "(TernaryExpression Identifier:a Identifier:b (ElvisExpression Identifier:c Identifier:d))"
        );
    }

    #[test]
    fn test_interpolated_string() {
        assert_eq!(
            shape(&expression("\"Hi #name#!\"")),
            "(BinaryExpression:& (BinaryExpression:& StringLiteral:Hi  (NestedExpression Identifier:name)) StringLiteral:!)"
        );
        assert_eq!(shape(&expression("'a''b'")), "StringLiteral:a'b");
    }

    #[test]
    fn test_embedded_expression_spans_are_absolute() {
        let node = expression("'x#foo#'");
        let nested = &node.children[1];
        assert_eq!(nested.span, 2..7);
        assert_eq!(nested.children[0].span, 3..6);
    }

    #[test]
    fn test_dot_suffix_spans_the_member_name() {
        let node = expression("a.  b[1]");
        assert_eq!(node.children[1].span, 4..5);
        assert_eq!(node.span, 0..8);
    }

    #[test]
    fn test_arrow_functions() {
        assert_eq!(
            shape(&expression("x => x * 2")),
            "(FunctionExpression:arrow-expression (ParameterList Parameter:x) (BinaryExpression:* Identifier:x IntegerLiteral:2))"
        );
        assert_eq!(
            shape(&expression("(a) => {}")),
            "(FunctionExpression:arrow (ParameterList Parameter:a) Block)"
        );
    }

    #[test]
    fn test_var_declaration_and_assignment() {
        assert_eq!(
            shape(&expression("var a = b = 1")),
            "(VarDeclaration Identifier:a (AssignmentExpression:= Identifier:b IntegerLiteral:1))"
        );
        assert_eq!(
            shape(&expression("x += 1")),
            "(AssignmentExpression:+= Identifier:x IntegerLiteral:1)"
        );
    }

    #[test]
    fn test_collections_and_new() {
        assert_eq!(
            shape(&expression("{a: [1, 2], 'b' = new foo.Bar(1)}")),
            "(StructLiteral (StructEntry Identifier:a (ArrayLiteral IntegerLiteral:1 IntegerLiteral:2)) (StructEntry StringLiteral:b (NewExpression (AccessPath Identifier:foo DotSuffix:Bar) (Argument IntegerLiteral:1))))"
        );
    }
}

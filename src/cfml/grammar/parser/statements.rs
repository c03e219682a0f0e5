//! Statement productions

use super::{ParseResult, ScriptGrammar};
use crate::cfml::grammar::stream::TokenStream;
use crate::cfml::grammar::token::{is_reserved, is_tag_keyword, Token};
use crate::cfml::grammar::tree::{NodeKind, ParseNode};

const ACCESS_MODIFIERS: [&str; 4] = ["public", "private", "package", "remote"];

/// Attribute names that make `param x = ...` the attribute form rather than shorthand
const PARAM_ATTRIBUTES: [&str; 7] = ["name", "type", "default", "min", "max", "pattern", "maxlength"];

fn at_block_end(stream: &TokenStream) -> bool {
    stream.peek_token() == Some(Token::RightBrace)
}

fn at_case_end(stream: &TokenStream) -> bool {
    at_block_end(stream)
        || stream.nth_is_word(0, "case")
        || (stream.nth_is_word(0, "default") && stream.nth_token(1) == Some(Token::Colon))
}

impl ScriptGrammar {
    pub(super) fn parse_statements(&mut self, stop: fn(&TokenStream) -> bool) -> ParseResult<Vec<ParseNode>> {
        let mut statements = Vec::new();
        while !self.stream.at_end() && !stop(&self.stream) {
            let start = self.stream.mark();
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) if self.can_recover() => {
                    self.report(&error);
                    self.synchronize(start);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult {
        match self.stream.peek_token() {
            None => Err(self.unexpected("statement")),
            Some(Token::LeftBrace) => {
                self.decide("block-or-struct", Self::parse_block, Self::parse_expression_statement)
            }
            Some(Token::Semicolon) => {
                let start = self.stream.offset();
                self.stream.advance();
                Ok(self.node(NodeKind::EmptyStatement, start))
            }
            Some(Token::Identifier) => self.parse_word_statement(),
            Some(_) => self.parse_expression_statement(),
        }
    }

    fn parse_word_statement(&mut self) -> ParseResult {
        let word = self.stream.nth_text(0).to_ascii_lowercase();
        let next = self.stream.nth_token(1);
        match word.as_str() {
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "for" => self.parse_for(),
            "switch" => self.parse_switch(),
            "try" => self.parse_try(),
            "return" => self.parse_jump(NodeKind::ReturnStatement),
            "break" => self.parse_jump(NodeKind::BreakStatement),
            "continue" => self.parse_jump(NodeKind::ContinueStatement),
            "function" => self.decide(
                "declaration-or-closure",
                Self::parse_function_declaration,
                Self::parse_expression_statement,
            ),
            "component" | "interface"
                if next == Some(Token::LeftBrace)
                    || (next == Some(Token::Identifier) && self.stream.nth_token(2) == Some(Token::Assign)) =>
            {
                self.parse_component()
            }
            _ if self.starts_function_declaration() => self.parse_function_declaration(),
            _ if is_tag_keyword(&word) => self.decide(
                "tag-or-expression",
                Self::parse_tag_keyword_statement,
                Self::parse_expression_statement,
            ),
            _ if self.starts_generic_tag() => self.parse_generic_tag(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `public function`, `private string function`, `numeric function f`
    fn starts_function_declaration(&self) -> bool {
        let stream = &self.stream;
        let modifier = ACCESS_MODIFIERS
            .iter()
            .any(|access| stream.nth_is_word(0, access));
        if modifier && stream.nth_token(1) == Some(Token::Identifier) {
            return true;
        }
        let mut n = 0;
        while stream.nth_token(n + 1) == Some(Token::Dot) && stream.nth_token(n + 2) == Some(Token::Identifier) {
            n += 2;
        }
        !is_reserved(stream.nth_text(0))
            && stream.nth_is_word(n + 1, "function")
            && stream.nth_token(n + 2) == Some(Token::Identifier)
    }

    /// `name attr=value ...`
    fn starts_generic_tag(&self) -> bool {
        let stream = &self.stream;
        !is_reserved(stream.nth_text(0))
            && stream.nth_token(1) == Some(Token::Identifier)
            && !is_reserved(stream.nth_text(1))
            && stream.nth_token(2) == Some(Token::Assign)
    }

    fn parse_expression_statement(&mut self) -> ParseResult {
        let start = self.stream.offset();
        let expression = self.parse_expression()?;
        self.end_statement()?;
        Ok(self.node(NodeKind::ExpressionStatement, start).with_child(expression))
    }

    pub(super) fn parse_block(&mut self) -> ParseResult {
        let start = self.expect(Token::LeftBrace)?.span.start;
        let statements = self.parse_statements(at_block_end)?;
        self.expect(Token::RightBrace)?;
        Ok(self.node(NodeKind::Block, start).with_children(statements))
    }

    fn parse_condition(&mut self) -> ParseResult {
        self.expect(Token::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult {
        let start = self.expect_word("if")?.span.start;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_statement()?;
        let mut node = ParseNode::new(NodeKind::IfStatement, 0..0)
            .with_child(condition)
            .with_child(then_branch);
        if self.stream.nth_is_word(0, "else") {
            self.stream.advance();
            node = node.with_child(self.parse_statement()?);
        }
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_while(&mut self) -> ParseResult {
        let start = self.expect_word("while")?.span.start;
        let condition = self.parse_condition()?;
        let body = self.parse_statement()?;
        Ok(self
            .node(NodeKind::WhileStatement, start)
            .with_child(condition)
            .with_child(body))
    }

    fn parse_do_while(&mut self) -> ParseResult {
        let start = self.expect_word("do")?.span.start;
        let body = self.parse_statement()?;
        self.expect_word("while")?;
        let condition = self.parse_condition()?;
        self.eat(Token::Semicolon);
        Ok(self
            .node(NodeKind::DoWhileStatement, start)
            .with_child(body)
            .with_child(condition))
    }

    fn parse_for(&mut self) -> ParseResult {
        let start = self.expect_word("for")?.span.start;
        self.expect(Token::LeftParen)?;
        if self.starts_for_in() {
            return self.parse_for_in(start);
        }

        let init = self.parse_for_clause(NodeKind::ForInit, Token::Semicolon)?;
        let condition = self.parse_for_clause(NodeKind::ForCondition, Token::Semicolon)?;
        let step = self.parse_for_clause(NodeKind::ForStep, Token::RightParen)?;
        let body = self.parse_statement()?;
        Ok(self
            .node(NodeKind::ForStatement, start)
            .with_children(vec![init, condition, step, body]))
    }

    /// One `for (;;)` clause, possibly empty, followed by `terminator`
    fn parse_for_clause(&mut self, kind: NodeKind, terminator: Token) -> ParseResult {
        let start = self.stream.offset();
        let mut clause = ParseNode::new(kind, start..start);
        if !self.check(terminator) {
            clause = clause.with_child(self.parse_expression()?);
            clause.span = self.span_from(start);
        }
        self.expect(terminator)?;
        Ok(clause)
    }

    fn starts_for_in(&self) -> bool {
        let stream = &self.stream;
        let mut n = usize::from(stream.nth_is_word(0, "var"));
        if stream.nth_token(n) != Some(Token::Identifier) {
            return false;
        }
        while stream.nth_token(n + 1) == Some(Token::Dot) && stream.nth_token(n + 2) == Some(Token::Identifier) {
            n += 2;
        }
        stream.nth_is_word(n + 1, "in")
    }

    fn parse_for_in(&mut self, start: usize) -> ParseResult {
        let declared = self.stream.nth_is_word(0, "var");
        if declared {
            self.stream.advance();
        }
        let variable = self.parse_dotted_path()?;
        self.expect_word("in")?;
        let collection = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        let body = self.parse_statement()?;
        let mut node = self
            .node(NodeKind::ForInStatement, start)
            .with_children(vec![variable, collection, body]);
        if declared {
            node = node.with_token("var");
        }
        Ok(node)
    }

    fn parse_switch(&mut self) -> ParseResult {
        let start = self.expect_word("switch")?.span.start;
        let subject = self.parse_condition()?;
        self.expect(Token::LeftBrace)?;
        let mut node = ParseNode::new(NodeKind::SwitchStatement, 0..0).with_child(subject);
        while !self.check(Token::RightBrace) {
            let case_start = self.stream.offset();
            let case = if self.stream.nth_is_word(0, "case") {
                self.stream.advance();
                let label = self.parse_ternary()?;
                self.expect(Token::Colon)?;
                let body = self.parse_statements(at_case_end)?;
                let mut children = vec![label];
                children.extend(body);
                self.node(NodeKind::Case, case_start).with_children(children)
            } else if self.stream.nth_is_word(0, "default") {
                self.stream.advance();
                self.expect(Token::Colon)?;
                let body = self.parse_statements(at_case_end)?;
                self.node(NodeKind::DefaultCase, case_start).with_children(body)
            } else {
                return Err(self.unexpected("'case' or 'default'"));
            };
            node = node.with_child(case);
        }
        self.expect(Token::RightBrace)?;
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_try(&mut self) -> ParseResult {
        let start = self.expect_word("try")?.span.start;
        let mut node = ParseNode::new(NodeKind::TryStatement, 0..0).with_child(self.parse_block()?);
        while self.stream.nth_is_word(0, "catch") {
            let catch_start = self.stream.offset();
            self.stream.advance();
            self.expect(Token::LeftParen)?;
            let exception_type = match self.stream.peek() {
                Some(lexeme) if lexeme.token.is_string() => {
                    let raw = self.stream.text(lexeme).to_string();
                    self.stream.advance();
                    crate::cfml::grammar::interpolation::unescape(&raw)
                        .map_err(|error| self.error_at(catch_start..catch_start, error.to_string()))?
                }
                _ => self.dotted_name()?.0,
            };
            let (variable, variable_span) = self.expect_identifier()?;
            self.expect(Token::RightParen)?;
            let body = self.parse_block()?;
            let catch = self
                .node(NodeKind::Catch, catch_start)
                .with_token(exception_type)
                .with_child(ParseNode::new(NodeKind::Identifier, variable_span).with_token(variable))
                .with_child(body);
            node = node.with_child(catch);
        }
        if self.stream.nth_is_word(0, "finally") {
            let finally_start = self.stream.offset();
            self.stream.advance();
            let body = self.parse_block()?;
            node = node.with_child(self.node(NodeKind::Finally, finally_start).with_child(body));
        }
        node.span = self.span_from(start);
        Ok(node)
    }

    /// `return [expr];`, `break;`, `continue;`, `abort [expr];`, `exit [expr];`, `throw [expr];`
    fn parse_jump(&mut self, kind: NodeKind) -> ParseResult {
        let start = self.stream.offset();
        self.stream.advance();
        let mut node = ParseNode::new(kind, 0..0);
        let takes_value = !matches!(kind, NodeKind::BreakStatement | NodeKind::ContinueStatement);
        let at_end = self.stream.at_end() || self.check(Token::Semicolon) || self.check(Token::RightBrace);
        if takes_value && !at_end {
            node = node.with_child(self.parse_expression()?);
        }
        self.end_statement()?;
        node.span = self.span_from(start);
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    pub(super) fn parse_function_declaration(&mut self) -> ParseResult {
        let start = self.stream.offset();
        let mut children = Vec::new();
        if ACCESS_MODIFIERS.iter().any(|access| self.stream.nth_is_word(0, access)) {
            let (access, span) = self.expect_identifier()?;
            children.push(ParseNode::new(NodeKind::Modifier, span).with_token(access));
        }
        if !self.stream.nth_is_word(0, "function") {
            let (type_name, span) = self.dotted_name()?;
            children.push(ParseNode::new(NodeKind::TypeName, span).with_token(type_name));
        }
        self.expect_word("function")?;
        let (name, _) = self.expect_identifier()?;
        if is_reserved(&name) {
            return Err(self.error_at(self.span_from(start), format!("'{}' is not a valid function name", name)));
        }
        children.push(self.parse_parameter_list()?);
        children.extend(self.parse_attributes()?);
        children.push(self.parse_block()?);
        Ok(self
            .node(NodeKind::FunctionDeclaration, start)
            .with_token(name)
            .with_children(children))
    }

    /// `( [required] [type] name [= default], ... )`
    pub(super) fn parse_parameter_list(&mut self) -> ParseResult {
        let start = self.expect(Token::LeftParen)?.span.start;
        let mut parameters = Vec::new();
        if !self.check(Token::RightParen) {
            loop {
                parameters.push(self.parse_parameter()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen)?;
        Ok(self.node(NodeKind::ParameterList, start).with_children(parameters))
    }

    fn parse_parameter(&mut self) -> ParseResult {
        let start = self.stream.offset();
        let mut children = Vec::new();
        if self.stream.nth_is_word(0, "required") && self.stream.nth_token(1) == Some(Token::Identifier) {
            let lexeme = self.expect(Token::Identifier)?;
            children.push(ParseNode::new(NodeKind::ParameterRequired, lexeme.span));
        }
        let (first, first_span) = self.dotted_name()?;
        let name = if self.check(Token::Identifier) {
            children.push(ParseNode::new(NodeKind::TypeName, first_span).with_token(first));
            self.expect_identifier()?.0
        } else if first.contains('.') {
            return Err(self.error_at(first_span, format!("invalid parameter name '{}'", first)));
        } else {
            first
        };
        if self.check(Token::Assign) {
            let default_start = self.stream.offset();
            self.stream.advance();
            let value = self.parse_ternary()?;
            children.push(self.node(NodeKind::ParameterDefault, default_start).with_child(value));
        }
        Ok(self
            .node(NodeKind::Parameter, start)
            .with_token(name)
            .with_children(children))
    }

    /// `name=value` pairs, optionally comma separated
    pub(super) fn parse_attributes(&mut self) -> ParseResult<Vec<ParseNode>> {
        let mut attributes = Vec::new();
        loop {
            let comma = !attributes.is_empty()
                && self.check(Token::Comma)
                && self.stream.nth_token(1) == Some(Token::Identifier)
                && self.stream.nth_token(2) == Some(Token::Assign);
            if comma {
                self.stream.advance();
            }
            if self.stream.nth_token(0) != Some(Token::Identifier) || self.stream.nth_token(1) != Some(Token::Assign) {
                break;
            }
            attributes.push(self.parse_attribute()?);
        }
        Ok(attributes)
    }

    fn parse_attribute(&mut self) -> ParseResult {
        let (name, span) = self.expect_identifier()?;
        self.expect(Token::Assign)?;
        let value = self.parse_ternary()?;
        Ok(self
            .node(NodeKind::Attribute, span.start)
            .with_token(name)
            .with_child(value))
    }

    /// Attribute synthesized from shorthand syntax
    fn synthesized_attribute(name: &str, value: &str, span: std::ops::Range<usize>) -> ParseNode {
        ParseNode::new(NodeKind::Attribute, span.clone())
            .with_token(name)
            .with_child(ParseNode::new(NodeKind::StringLiteral, span).with_token(value))
    }

    // ------------------------------------------------------------------
    // Components and tag-style statements
    // ------------------------------------------------------------------

    fn parse_component(&mut self) -> ParseResult {
        let (keyword, span) = self.expect_identifier()?;
        let mut children = self.parse_attributes()?;
        children.push(self.parse_block()?);
        Ok(self
            .node(NodeKind::ComponentDeclaration, span.start)
            .with_token(keyword.to_ascii_lowercase())
            .with_children(children))
    }

    pub(super) fn parse_tag_keyword_statement(&mut self) -> ParseResult {
        let keyword = self.stream.nth_text(0).to_ascii_lowercase();
        match keyword.as_str() {
            "include" => self.parse_include(),
            "import" => self.parse_import(),
            "abort" => self.parse_jump(NodeKind::AbortStatement),
            "exit" => self.parse_jump(NodeKind::ExitStatement),
            "throw" => self.parse_jump(NodeKind::ThrowStatement),
            "property" => self.parse_property(),
            "param" => self.parse_param(),
            _ => {
                let start = self.stream.offset();
                self.stream.advance();
                let attributes = self.parse_attributes()?;
                self.finish_tag(start, keyword, attributes)
            }
        }
    }

    fn parse_generic_tag(&mut self) -> ParseResult {
        let (name, span) = self.expect_identifier()?;
        let attributes = self.parse_attributes()?;
        self.finish_tag(span.start, name, attributes)
    }

    /// Optional body block, otherwise a statement end
    fn finish_tag(&mut self, start: usize, keyword: String, mut children: Vec<ParseNode>) -> ParseResult {
        if self.check(Token::LeftBrace) {
            children.push(self.parse_block()?);
        } else {
            self.end_statement()?;
        }
        Ok(self
            .node(NodeKind::TagStatement, start)
            .with_token(keyword)
            .with_children(children))
    }

    fn parse_include(&mut self) -> ParseResult {
        let start = self.expect_word("include")?.span.start;
        let template = self.parse_expression()?;
        self.end_statement()?;
        Ok(self.node(NodeKind::IncludeStatement, start).with_child(template))
    }

    /// `import a.b.*;` or `import "a.b";`
    fn parse_import(&mut self) -> ParseResult {
        let start = self.expect_word("import")?.span.start;
        let path = match self.stream.peek() {
            Some(lexeme) if lexeme.token.is_string() => {
                let raw = self.stream.text(lexeme).to_string();
                let span = lexeme.span.clone();
                self.stream.advance();
                crate::cfml::grammar::interpolation::unescape(&raw)
                    .map_err(|error| self.error_at(span, error.to_string()))?
            }
            _ => {
                let (mut path, _) = self.dotted_name()?;
                if self.check(Token::Dot) && self.stream.nth_token(1) == Some(Token::Star) {
                    self.stream.advance();
                    self.stream.advance();
                    path.push_str(".*");
                }
                path
            }
        };
        self.end_statement()?;
        Ok(self.node(NodeKind::ImportStatement, start).with_token(path))
    }

    /// `property name="x" type="string";` or shorthand `property [type] name [attrs];`
    fn parse_property(&mut self) -> ParseResult {
        let start = self.expect_word("property")?.span.start;
        let mut attributes = Vec::new();
        let attribute_form =
            self.check(Token::Identifier) && self.stream.nth_token(1) == Some(Token::Assign);
        if !attribute_form {
            let (first, first_span) = self.dotted_name()?;
            let attribute_follows = self.stream.nth_token(1) == Some(Token::Assign);
            if self.check(Token::Identifier) && !attribute_follows {
                let (name, name_span) = self.expect_identifier()?;
                attributes.push(Self::synthesized_attribute("name", &name, name_span));
                attributes.push(Self::synthesized_attribute("type", &first, first_span));
            } else {
                attributes.push(Self::synthesized_attribute("name", &first, first_span));
            }
        }
        attributes.extend(self.parse_attributes()?);
        self.finish_tag(start, "property".to_string(), attributes)
    }

    fn at_param_attribute(&self) -> bool {
        self.stream.nth_token(1) == Some(Token::Assign)
            && PARAM_ATTRIBUTES
                .iter()
                .any(|name| self.stream.nth_is_word(0, name))
    }

    /// `param name="x" default=1;` or shorthand `param [type] name [= default] [attrs];`
    fn parse_param(&mut self) -> ParseResult {
        let start = self.expect_word("param")?.span.start;
        let mut attributes = Vec::new();
        if !self.at_param_attribute() {
            let (first, first_span) = self.dotted_name()?;
            if self.check(Token::Identifier) && !self.at_param_attribute() {
                let (name, name_span) = self.expect_identifier()?;
                attributes.push(Self::synthesized_attribute("name", &name, name_span));
                attributes.push(Self::synthesized_attribute("type", &first, first_span));
            } else {
                attributes.push(Self::synthesized_attribute("name", &first, first_span));
            }
            if self.check(Token::Assign) {
                let default_start = self.stream.offset();
                self.stream.advance();
                let value = self.parse_ternary()?;
                attributes.push(
                    self.node(NodeKind::Attribute, default_start)
                        .with_token("default")
                        .with_child(value),
                );
            }
        }
        attributes.extend(self.parse_attributes()?);
        self.finish_tag(start, "param".to_string(), attributes)
    }
}

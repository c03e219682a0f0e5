//! Statement visitor
//!
//!     Folds statement-kind parse nodes into [`Statement`]s, handing expressions to the
//!     [`ExpressionVisitor`]. Blocks aggregate through [`Compound::aggregate`], which hoists
//!     function declarations. Tag-style statements are split by keyword into the fixed kinds
//!     (`lock`, `param`, ...) and generic tags; the latter are checked against the syntax
//!     dictionary when one is configured.
//!
//!     An expression statement that is only a call to `cf<name>(...)` with named arguments,
//!     where the dictionary knows `<name>`, is rewritten into the equivalent tag statement.

use super::context::AstBuilder;
use super::expressions::ExpressionVisitor;
use crate::cfml::ast::attributes::{validate_tag, AttributeMap};
use crate::cfml::ast::elements::{
    AnonymousFunction, Access, AttributeStatement, Case, Catch, ClosureStyle, Component, Compound, DoWhile,
    For, ForIn, FunctionDecl, If, Import, Include, JumpStatement, Parameter, Switch, TryCatch, While,
};
use crate::cfml::ast::error::MalformedConstruct;
use crate::cfml::ast::expression::{Expression, ExpressionKind};
use crate::cfml::ast::statement::{Statement, StatementKind};
use crate::cfml::ast::traits::AstNode;
use crate::cfml::grammar::dictionary::resolve_tag;
use crate::cfml::grammar::tree::{NodeKind, ParseNode};

type BuildResult<T = Statement> = Result<T, MalformedConstruct>;

pub struct StatementVisitor<'b> {
    builder: &'b mut AstBuilder,
}

impl<'b> StatementVisitor<'b> {
    pub fn new(builder: &'b mut AstBuilder) -> Self {
        Self { builder }
    }

    fn expressions(&mut self) -> ExpressionVisitor<'_> {
        ExpressionVisitor::new(self.builder)
    }

    fn expression(&mut self, node: &ParseNode, index: usize) -> BuildResult<Expression> {
        let child = self.child(node, index)?;
        self.expressions().visit(child)
    }

    fn optional_expression(&mut self, node: &ParseNode) -> BuildResult<Option<Expression>> {
        match node.child(0) {
            Some(child) => Ok(Some(self.expressions().visit(child)?)),
            None => Ok(None),
        }
    }

    fn statement(&mut self, node: &ParseNode, index: usize) -> BuildResult {
        let child = self.child(node, index)?;
        self.visit(child)
    }

    fn child<'n>(&self, node: &'n ParseNode, index: usize) -> BuildResult<&'n ParseNode> {
        node.child(index).ok_or_else(|| {
            MalformedConstruct::invalid(
                "Statement",
                format!("{:?} node is missing child {}", node.kind, index),
                self.builder.position(node.span.start),
            )
        })
    }

    /// The unbraced root compound of a script
    pub fn visit_script(&mut self, node: &ParseNode) -> BuildResult {
        let mut root = Compound::root();
        for child in &node.children {
            root.aggregate(self.visit(child)?);
        }
        let info = self.builder.info_at(node.span.clone(), "");
        Ok(Statement::new(info, StatementKind::Compound(root)))
    }

    pub fn visit(&mut self, node: &ParseNode) -> BuildResult {
        let kind = match node.kind {
            NodeKind::Block => {
                let mut block = Compound::block();
                for child in &node.children {
                    block.aggregate(self.visit(child)?);
                }
                StatementKind::Compound(block)
            }
            NodeKind::ExpressionStatement => {
                let expression = self.expression(node, 0)?;
                match self.tag_call(node, &expression)? {
                    Some(statement) => return Ok(statement),
                    None => StatementKind::Expression(expression),
                }
            }
            NodeKind::IfStatement => StatementKind::If(If {
                condition: self.expression(node, 0)?,
                then_branch: Box::new(self.statement(node, 1)?),
                else_branch: match node.child(2) {
                    Some(branch) => Some(Box::new(self.visit(branch)?)),
                    None => None,
                },
            }),
            NodeKind::WhileStatement => StatementKind::While(While {
                condition: self.expression(node, 0)?,
                body: Box::new(self.statement(node, 1)?),
            }),
            NodeKind::DoWhileStatement => StatementKind::DoWhile(DoWhile {
                body: Box::new(self.statement(node, 0)?),
                condition: self.expression(node, 1)?,
            }),
            NodeKind::ForStatement => {
                let (init, condition, step) = (self.child(node, 0)?, self.child(node, 1)?, self.child(node, 2)?);
                StatementKind::For(For {
                    init: self.optional_expression(init)?,
                    condition: self.optional_expression(condition)?,
                    step: self.optional_expression(step)?,
                    body: Box::new(self.statement(node, 3)?),
                })
            }
            NodeKind::ForInStatement => StatementKind::ForIn(ForIn {
                declared: node.text() == "var",
                variable: self.expression(node, 0)?,
                collection: self.expression(node, 1)?,
                body: Box::new(self.statement(node, 2)?),
            }),
            NodeKind::SwitchStatement => self.switch(node)?,
            NodeKind::TryStatement => self.try_catch(node)?,
            NodeKind::FunctionDeclaration => StatementKind::FunctionDecl(self.function(node)?),
            NodeKind::ComponentDeclaration => {
                let attributes = self.attributes(node)?;
                let body = self.last_block(node)?;
                let component = Component {
                    interface: node.text().eq_ignore_ascii_case("interface"),
                    attributes,
                    body: Box::new(body),
                };
                if component.interface {
                    StatementKind::Interface(component)
                } else {
                    StatementKind::Component(component)
                }
            }
            NodeKind::TagStatement => {
                let attributes = self.attributes(node)?;
                let body = match node.first_of(NodeKind::Block) {
                    Some(block) => Some(self.visit(block)?),
                    None => None,
                };
                return self.tag_statement(node, node.text(), attributes, body);
            }
            NodeKind::ImportStatement => StatementKind::Import(Import {
                path: node.text().to_string(),
            }),
            NodeKind::IncludeStatement => StatementKind::Include(Include {
                template: self.expression(node, 0)?,
            }),
            NodeKind::ReturnStatement => StatementKind::Return(JumpStatement::new(self.optional_expression(node)?)),
            NodeKind::ThrowStatement => StatementKind::Throw(JumpStatement::new(self.optional_expression(node)?)),
            NodeKind::AbortStatement => StatementKind::Abort(JumpStatement::new(self.optional_expression(node)?)),
            NodeKind::ExitStatement => StatementKind::Exit(JumpStatement::new(self.optional_expression(node)?)),
            NodeKind::BreakStatement => StatementKind::Break,
            NodeKind::ContinueStatement => StatementKind::Continue,
            NodeKind::EmptyStatement => StatementKind::Empty,
            other => {
                return Err(MalformedConstruct::invalid(
                    "Statement",
                    format!("unexpected {:?} node", other),
                    self.builder.position(node.span.start),
                ))
            }
        };
        let info = self.builder.info(node);
        finish(Statement::new(info, kind))
    }

    fn switch(&mut self, node: &ParseNode) -> BuildResult<StatementKind> {
        let subject = self.expression(node, 0)?;
        let mut cases = Vec::new();
        for case in node.children.iter().skip(1) {
            let (label, body) = match case.kind {
                NodeKind::Case => (Some(self.expression(case, 0)?), case.children.get(1..).unwrap_or_default()),
                _ => (None, case.children.as_slice()),
            };
            let body = body
                .iter()
                .map(|statement| self.visit(statement))
                .collect::<BuildResult<Vec<_>>>()?;
            let info = self.builder.info_for_span(case.span.clone());
            cases.push(Statement::new(info, StatementKind::Case(Case { label, body })));
        }
        Ok(StatementKind::Switch(Switch { subject, cases }))
    }

    fn try_catch(&mut self, node: &ParseNode) -> BuildResult<StatementKind> {
        let body = self.statement(node, 0)?;
        let mut catches = Vec::new();
        let mut finally = None;
        for clause in node.children.iter().skip(1) {
            match clause.kind {
                NodeKind::Catch => {
                    let variable = self.child(clause, 0)?.text().to_string();
                    let catch = Catch {
                        exception_type: clause.text().to_string(),
                        variable,
                        body: Box::new(self.statement(clause, 1)?),
                    };
                    let info = self.builder.info_for_span(clause.span.clone());
                    catches.push(Statement::new(info, StatementKind::Catch(catch)));
                }
                _ => finally = Some(Box::new(self.statement(clause, 0)?)),
            }
        }
        Ok(StatementKind::TryCatch(TryCatch {
            body: Box::new(body),
            catches,
            finally,
        }))
    }

    fn attributes(&mut self, node: &ParseNode) -> BuildResult<AttributeMap> {
        let mut attributes = AttributeMap::new();
        for attribute in node.children_of(NodeKind::Attribute) {
            let value = self.expression(attribute, 0)?;
            attributes.insert(attribute.text(), value);
        }
        Ok(attributes)
    }

    fn last_block(&mut self, node: &ParseNode) -> BuildResult {
        match node.children.last() {
            Some(block) if block.kind == NodeKind::Block => self.visit(block),
            _ => Err(MalformedConstruct::invalid(
                "Statement",
                format!("{:?} node has no body", node.kind),
                self.builder.position(node.span.start),
            )),
        }
    }

    fn parameters(&mut self, list: &ParseNode) -> BuildResult<Vec<Parameter>> {
        list.children
            .iter()
            .map(|parameter| {
                let default = match parameter.first_of(NodeKind::ParameterDefault) {
                    Some(default) => Some(self.expression(default, 0)?),
                    None => None,
                };
                Ok(Parameter {
                    required: parameter.first_of(NodeKind::ParameterRequired).is_some(),
                    type_name: parameter.first_of(NodeKind::TypeName).map(|t| t.text().to_string()),
                    name: parameter.text().to_string(),
                    default,
                })
            })
            .collect()
    }

    fn function(&mut self, node: &ParseNode) -> BuildResult<FunctionDecl> {
        let access = match node.first_of(NodeKind::Modifier) {
            Some(modifier) => Some(Access::parse(modifier.text()).ok_or_else(|| {
                MalformedConstruct::invalid(
                    "FunctionDecl",
                    format!("unknown access modifier '{}'", modifier.text()),
                    self.builder.position(modifier.span.start),
                )
            })?),
            None => None,
        };
        let parameters = match node.first_of(NodeKind::ParameterList) {
            Some(list) => self.parameters(list)?,
            None => Vec::new(),
        };
        Ok(FunctionDecl {
            access,
            return_type: node.first_of(NodeKind::TypeName).map(|t| t.text().to_string()),
            name: node.text().to_string(),
            parameters,
            attributes: self.attributes(node)?,
            body: Box::new(self.last_block(node)?),
        })
    }

    /// A function literal: a nameless declaration wrapped in an expression
    pub fn visit_closure(&mut self, node: &ParseNode) -> BuildResult<Expression> {
        let style = match node.text() {
            "arrow" => ClosureStyle::Arrow,
            "arrow-expression" => ClosureStyle::ArrowExpression,
            _ => ClosureStyle::Function,
        };
        let parameters = match node.first_of(NodeKind::ParameterList) {
            Some(list) => self.parameters(list)?,
            None => Vec::new(),
        };
        let attributes = self.attributes(node)?;
        let body = match style {
            ClosureStyle::ArrowExpression => {
                let value = match node.children.last() {
                    Some(last) => self.expressions().visit(last)?,
                    None => {
                        return Err(MalformedConstruct::invalid(
                            "AnonymousFunction",
                            "arrow function has no body",
                            self.builder.position(node.span.start),
                        ))
                    }
                };
                let span = value.info().span().clone();
                let info = self.builder.info_at(span, "return");
                Statement::new(info, StatementKind::Return(JumpStatement::new(Some(value))))
            }
            _ => self.last_block(node)?,
        };

        let declaration = FunctionDecl {
            access: None,
            return_type: None,
            name: String::new(),
            parameters,
            attributes,
            body: Box::new(body),
        };
        let declaration_info = self.builder.info_for_span(node.span.clone());
        let declaration = Statement::new(declaration_info, StatementKind::FunctionDecl(declaration));
        let info = self.builder.info(node);
        let closure = Expression::new(
            info,
            ExpressionKind::AnonymousFunction(AnonymousFunction {
                declaration: Box::new(declaration),
                style,
            }),
        );
        closure.validate()?;
        Ok(closure)
    }

    /// Split a tag-style statement into its fixed kind, or a dictionary-checked generic tag
    fn tag_statement(
        &mut self,
        node: &ParseNode,
        keyword: &str,
        attributes: AttributeMap,
        body: Option<Statement>,
    ) -> BuildResult {
        let canonical = keyword.to_ascii_lowercase();
        let position = self.builder.position(node.span.start);
        let fixed = matches!(
            canonical.as_str(),
            "lock" | "thread" | "transaction" | "param" | "admin" | "property"
        );
        if !fixed && self.builder.validates_tags() {
            let syntax = self
                .builder
                .dictionary()
                .and_then(|dictionary| resolve_tag(dictionary, keyword));
            validate_tag(keyword, syntax.as_ref(), &attributes, body.is_some(), position)?;
        }

        let keyword = if fixed { canonical.clone() } else { keyword.to_string() };
        let statement = AttributeStatement::new(keyword, attributes, body);
        let kind = match canonical.as_str() {
            "lock" => StatementKind::Lock(statement),
            "thread" => StatementKind::Thread(statement),
            "transaction" => StatementKind::Transaction(statement),
            "param" => StatementKind::Param(statement),
            "admin" => StatementKind::Admin(statement),
            "property" => StatementKind::Property(statement),
            _ => StatementKind::Tag(statement),
        };
        let info = self.builder.info(node);
        finish(Statement::new(info, kind))
    }

    /// `cfhttp(url = "x");` as the tag statement `http url='x';`
    fn tag_call(&mut self, node: &ParseNode, expression: &Expression) -> BuildResult<Option<Statement>> {
        let Some(call) = expression.as_call() else {
            return Ok(None);
        };
        let Some(name) = call.simple_name() else {
            return Ok(None);
        };
        let tag = match name.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("cf") && name.len() > 2 => &name[2..],
            _ => return Ok(None),
        };
        if call.arguments.is_empty() || !call.has_only_named_arguments() {
            return Ok(None);
        }
        let known = self
            .builder
            .dictionary()
            .is_some_and(|dictionary| resolve_tag(dictionary, name).is_some());
        if !known {
            return Ok(None);
        }

        let mut attributes = AttributeMap::new();
        for argument in &call.arguments {
            if let Some(argument_name) = &argument.name {
                attributes.insert(argument_name.clone(), argument.value.clone());
            }
        }
        let tag = tag.to_string();
        self.tag_statement(node, &tag, attributes, None).map(Some)
    }
}

fn finish(statement: Statement) -> BuildResult {
    statement.validate()?;
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::grammar::dictionary::{StaticDictionary, TagSyntax};
    use crate::cfml::grammar::engine::{EntryPoint, GrammarEngine, PredictionMode};
    use crate::cfml::grammar::parser::ScriptGrammar;
    use std::sync::Arc;

    fn tree(source: &str) -> ParseNode {
        let mut grammar = ScriptGrammar::new();
        grammar.set_input(source);
        grammar.set_prediction_mode(PredictionMode::Full);
        grammar.parse(EntryPoint::ScriptBlock).unwrap()
    }

    fn build(source: &str) -> Result<Statement, MalformedConstruct> {
        AstBuilder::new().build_script(source, &tree(source))
    }

    fn first(script: &Statement) -> &Statement {
        &script.as_compound().unwrap().statements[0]
    }

    #[test]
    fn test_functions_are_hoisted() {
        let script = build("x = 1;\nfunction f() {}\ny = 2;\nfunction g() {}").unwrap();
        let kinds: Vec<_> = script
            .as_compound()
            .unwrap()
            .statements
            .iter()
            .map(|s| s.node_type())
            .collect();
        assert_eq!(kinds, vec!["FunctionDecl", "FunctionDecl", "ExpressionStatement", "ExpressionStatement"]);
        assert_eq!(first(&script).as_function().unwrap().name, "f");
    }

    #[test]
    fn test_switch_cases_keep_order() {
        let script = build("switch(x){case 'a': break; default: y;}").unwrap();
        let StatementKind::Switch(switch) = &first(&script).kind else {
            panic!("expected switch");
        };
        assert_eq!(switch.cases.len(), 2);
        assert!(switch.default_case().is_some());
        let StatementKind::Case(second) = &switch.cases[1].kind else {
            panic!("expected case");
        };
        assert!(second.is_default());
    }

    #[test]
    fn test_try_without_handlers_is_malformed() {
        let error = build("try { a(); }").unwrap_err();
        assert!(matches!(error, MalformedConstruct::MissingCatchOrFinally { .. }));
    }

    #[test]
    fn test_lock_attribute_rules() {
        let error = build("lock name='a' scope='b' { }").unwrap_err();
        assert!(matches!(error, MalformedConstruct::ConflictingAttributes { .. }));

        let error = build("lock type='exclusive' { }").unwrap_err();
        assert!(matches!(error, MalformedConstruct::MissingAttribute { .. }));

        assert!(build("lock timeout=5 { }").is_ok());
    }

    #[test]
    fn test_param_shorthand() {
        let script = build("param string name = 'x';").unwrap();
        let statement = first(&script).kind.as_attribute_statement().unwrap();
        assert_eq!(statement.attributes.string_value("name"), Some("name"));
        assert_eq!(statement.attributes.string_value("type"), Some("string"));
        assert!(statement.attributes.contains("default"));
    }

    #[test]
    fn test_arrow_expression_body_is_a_return() {
        let script = build("f = (a) => a * 2;").unwrap();
        let expression = first(&script).as_expression().unwrap();
        let ExpressionKind::Assignment(assignment) = &expression.kind else {
            panic!("expected assignment");
        };
        let ExpressionKind::AnonymousFunction(closure) = &assignment.right.kind else {
            panic!("expected closure");
        };
        assert_eq!(closure.style, ClosureStyle::ArrowExpression);
        let body = &closure.function().unwrap().body;
        assert_eq!(body.node_type(), "Return");
    }

    #[test]
    fn test_generic_tags_use_the_dictionary() {
        let dictionary = StaticDictionary::new()
            .with_tag("http", TagSyntax::new().with_attributes(["url", "method"]))
            .with_tag("log", TagSyntax::new().single());
        let mut builder = AstBuilder::new().with_dictionary(Arc::new(dictionary));

        let source = "http url='x' method='get';";
        assert!(builder.build_script(source, &tree(source)).is_ok());

        let source = "http url='x' port=80;";
        let error = builder.build_script(source, &tree(source)).unwrap_err();
        assert!(matches!(error, MalformedConstruct::UnknownAttribute { .. }));

        let source = "log text='x' { }";
        let error = builder.build_script(source, &tree(source)).unwrap_err();
        assert!(matches!(error, MalformedConstruct::UnexpectedBody { .. }));

        let source = "mail to='x';";
        let error = builder.build_script(source, &tree(source)).unwrap_err();
        assert!(matches!(error, MalformedConstruct::UnknownTag { .. }));

        builder.set_validate_tag_attributes(false);
        assert!(builder.build_script(source, &tree(source)).is_ok());
    }

    #[test]
    fn test_tag_call_becomes_tag_statement() {
        let dictionary = StaticDictionary::new().with_tag("http", TagSyntax::new());
        let mut builder = AstBuilder::new().with_dictionary(Arc::new(dictionary));
        let source = "cfhttp(url = 'x');\ncfhttp('x');";
        let script = builder.build_script(source, &tree(source)).unwrap();
        let statements = &script.as_compound().unwrap().statements;
        assert_eq!(statements[0].node_type(), "Tag");
        assert_eq!(statements[0].decompile(0).unwrap(), "http url='x';");
        assert_eq!(statements[1].node_type(), "ExpressionStatement");
    }
}

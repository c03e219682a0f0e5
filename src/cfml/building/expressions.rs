//! Expression visitor
//!
//!     Folds expression-kind parse nodes into [`Expression`]s. The interesting part is the
//!     access path fold: `primary suffix*` is consumed left to right, and the kind of the
//!     accumulated expression decides what each suffix turns it into.
//!
//!         accumulated               .name                 [index]           (args)
//!         Identifier (a scope)      scoped Identifier     FullVar           FunctionCall
//!         Identifier                MultipartIdentifier   FullVar           FunctionCall
//!         MultipartIdentifier       MultipartIdentifier   FullVar           FunctionCall
//!         FullVar                   FullVar               FullVar           FullVar, last name called
//!         anything else             FullVar               FullVar           FunctionCall
//!
//!     Scope folding only applies to the primary itself, so `local.a.b` is a two-part
//!     multipart identifier whose first part is `a` in scope `local`.

use super::context::AstBuilder;
use super::statements::StatementVisitor;
use crate::cfml::ast::elements::{
    Argument, ArrayLiteral, Assignment, Binary, ChainTarget, Elvis, FullVar, FunctionCall, Identifier,
    Literal, LiteralKind, Member, MultipartIdentifier, Nested, New, StructEntry, StructLiteral, Ternary,
    Unary, VarDecl,
};
use crate::cfml::ast::error::MalformedConstruct;
use crate::cfml::ast::expression::{Expression, ExpressionKind};
use crate::cfml::ast::traits::AstNode;
use crate::cfml::grammar::token::is_scope;
use crate::cfml::grammar::tree::{NodeKind, ParseNode};
use std::ops::Range;

type BuildResult<T = Expression> = Result<T, MalformedConstruct>;

pub struct ExpressionVisitor<'b> {
    builder: &'b mut AstBuilder,
}

impl<'b> ExpressionVisitor<'b> {
    pub fn new(builder: &'b mut AstBuilder) -> Self {
        Self { builder }
    }

    pub fn visit(&mut self, node: &ParseNode) -> BuildResult {
        let kind = match node.kind {
            NodeKind::IntegerLiteral => ExpressionKind::Literal(Literal::new(LiteralKind::Integer, node.text())),
            NodeKind::FloatLiteral => ExpressionKind::Literal(Literal::new(LiteralKind::Float, node.text())),
            NodeKind::BooleanLiteral => ExpressionKind::Literal(Literal::new(LiteralKind::Boolean, node.text())),
            NodeKind::StringLiteral => ExpressionKind::Literal(Literal::string(node.text())),
            NodeKind::Identifier => ExpressionKind::Identifier(Identifier::new(node.text())),
            NodeKind::AccessPath => return self.visit_access_path(node),
            NodeKind::BinaryExpression => ExpressionKind::Binary(Binary {
                operator: node.text().to_string(),
                left: Box::new(self.visit_child(node, 0)?),
                right: Box::new(self.visit_child(node, 1)?),
            }),
            NodeKind::PrefixExpression | NodeKind::PostfixExpression => ExpressionKind::Unary(Unary {
                operator: node.text().to_string(),
                operand: Box::new(self.visit_child(node, 0)?),
                postfix: node.kind == NodeKind::PostfixExpression,
            }),
            NodeKind::TernaryExpression => ExpressionKind::Ternary(Ternary {
                condition: Box::new(self.visit_child(node, 0)?),
                then_branch: Box::new(self.visit_child(node, 1)?),
                else_branch: Box::new(self.visit_child(node, 2)?),
            }),
            NodeKind::ElvisExpression => ExpressionKind::Elvis(Elvis {
                left: Box::new(self.visit_child(node, 0)?),
                fallback: Box::new(self.visit_child(node, 1)?),
            }),
            NodeKind::AssignmentExpression => self.assignment(node)?,
            NodeKind::VarDeclaration => self.var_declaration(node)?,
            NodeKind::ParenthesizedExpression => return self.visit_child(node, 0),
            NodeKind::NestedExpression => ExpressionKind::Nested(Nested {
                inner: Box::new(self.visit_child(node, 0)?),
            }),
            NodeKind::ArrayLiteral => ExpressionKind::Array(ArrayLiteral {
                elements: node
                    .children
                    .iter()
                    .map(|element| self.visit(element))
                    .collect::<BuildResult<Vec<_>>>()?,
            }),
            NodeKind::StructLiteral => ExpressionKind::Struct(StructLiteral {
                entries: node
                    .children
                    .iter()
                    .map(|entry| {
                        Ok(StructEntry {
                            key: self.visit_child(entry, 0)?,
                            value: self.visit_child(entry, 1)?,
                        })
                    })
                    .collect::<BuildResult<Vec<_>>>()?,
            }),
            NodeKind::NewExpression => ExpressionKind::New(New {
                class: Box::new(self.visit_child(node, 0)?),
                arguments: self.arguments(node.children.iter().skip(1))?,
            }),
            NodeKind::FunctionExpression => {
                return StatementVisitor::new(self.builder).visit_closure(node);
            }
            other => {
                return Err(MalformedConstruct::invalid(
                    "Expression",
                    format!("unexpected {:?} node", other),
                    self.builder.position(node.span.start),
                ))
            }
        };
        let info = self.builder.info(node);
        finish(Expression::new(info, kind))
    }

    fn visit_child(&mut self, node: &ParseNode, index: usize) -> BuildResult {
        match node.child(index) {
            Some(child) => self.visit(child),
            None => Err(MalformedConstruct::invalid(
                "Expression",
                format!("{:?} node is missing child {}", node.kind, index),
                self.builder.position(node.span.start),
            )),
        }
    }

    pub(crate) fn arguments<'n>(&mut self, nodes: impl Iterator<Item = &'n ParseNode>) -> BuildResult<Vec<Argument>> {
        nodes
            .map(|argument| {
                let value = self.visit_child(argument, 0)?;
                Ok(match &argument.token {
                    Some(name) => Argument::named(name.clone(), value),
                    None => Argument::positional(value),
                })
            })
            .collect()
    }

    fn assignment(&mut self, node: &ParseNode) -> BuildResult<ExpressionKind> {
        let operator = node.text().to_string();
        let left = self.visit_child(node, 0)?;
        let right = self.visit_child(node, 1)?;
        let (chain, right) = if operator == "=" {
            split_chain(right)
        } else {
            (Vec::new(), right)
        };
        Ok(ExpressionKind::Assignment(Assignment {
            operator,
            left: Box::new(left),
            chain,
            right: Box::new(right),
        }))
    }

    fn var_declaration(&mut self, node: &ParseNode) -> BuildResult<ExpressionKind> {
        let name = self.visit_child(node, 0)?;
        if !name.is_name() {
            return Err(MalformedConstruct::invalid(
                "VarDecl",
                format!("cannot declare '{}'", name.info().token()),
                name.position(),
            ));
        }
        let (chain, initializer) = match node.child(1) {
            Some(initializer) => {
                let (chain, value) = split_chain(self.visit(initializer)?);
                (chain, Some(Box::new(value)))
            }
            None => (Vec::new(), None),
        };
        Ok(ExpressionKind::VarDecl(VarDecl {
            name: Box::new(name),
            chain,
            initializer,
        }))
    }

    fn visit_access_path(&mut self, node: &ParseNode) -> BuildResult {
        let Some((primary, suffixes)) = node.children.split_first() else {
            return Err(MalformedConstruct::TooFewSegments {
                kind: "FullVar",
                minimum: 1,
                found: 0,
                position: self.builder.position(node.span.start),
            });
        };
        let mut current = self.visit(primary)?;
        let mut at_primary = true;
        for suffix in suffixes {
            let span = current.info().offset()..suffix.span.end.max(current.info().end());
            current = match suffix.kind {
                NodeKind::DotSuffix => self.fold_dot(current, suffix, span, at_primary)?,
                NodeKind::IndexSuffix => {
                    let index = self.visit_child(suffix, 0)?;
                    let member_info = self.builder.info_for_span(suffix.span.clone());
                    let member = Expression::new(member_info, ExpressionKind::Member(Member { index: Box::new(index) }));
                    self.extend_full_var(current, member, span)?
                }
                NodeKind::CallSuffix => self.fold_call(current, suffix, span)?,
                other => {
                    return Err(MalformedConstruct::invalid(
                        "FullVar",
                        format!("unexpected {:?} suffix", other),
                        self.builder.position(suffix.span.start),
                    ))
                }
            };
            at_primary = false;
        }
        Ok(current)
    }

    fn fold_dot(&mut self, current: Expression, suffix: &ParseNode, span: Range<usize>, at_primary: bool) -> BuildResult {
        let scope = match &current.kind {
            ExpressionKind::Identifier(identifier) if at_primary && identifier.scope.is_none() && is_scope(&identifier.name) => {
                Some(identifier.name.clone())
            }
            _ => None,
        };
        if let Some(scope) = scope {
            let info = self.builder.info_for_span(span);
            return finish(Expression::new(
                info,
                ExpressionKind::Identifier(Identifier::scoped(scope, suffix.text())),
            ));
        }

        let member_info = self.builder.info_at(suffix.span.clone(), suffix.text());
        let member = Expression::new(member_info, ExpressionKind::Identifier(Identifier::new(suffix.text())));
        if matches!(current.kind, ExpressionKind::Identifier(_)) {
            let info = self.builder.info_for_span(span);
            return finish(Expression::new(
                info,
                ExpressionKind::MultipartIdentifier(MultipartIdentifier::new(vec![current, member])),
            ));
        }
        let (info, kind) = current.into_parts();
        match kind {
            ExpressionKind::MultipartIdentifier(mut multipart) => {
                multipart.parts.push(member);
                let info = self.builder.info_for_span(span);
                finish(Expression::new(info, ExpressionKind::MultipartIdentifier(multipart)))
            }
            kind => self.extend_full_var(Expression::new(info, kind), member, span),
        }
    }

    fn fold_call(&mut self, current: Expression, suffix: &ParseNode, span: Range<usize>) -> BuildResult {
        let arguments = self.arguments(suffix.children.iter())?;
        let calls_last_name = match &current.kind {
            ExpressionKind::FullVar(full_var) => full_var
                .segments
                .last()
                .is_some_and(|segment| matches!(segment.kind, ExpressionKind::Identifier(_))),
            _ => false,
        };
        if !calls_last_name {
            let info = self.builder.info_for_span(span);
            return finish(Expression::new(
                info,
                ExpressionKind::FunctionCall(FunctionCall {
                    callee: Box::new(current),
                    arguments,
                }),
            ));
        }

        let (info, kind) = current.into_parts();
        let ExpressionKind::FullVar(mut full_var) = kind else {
            return Err(MalformedConstruct::invalid("FullVar", "call target vanished", info.position()));
        };
        let Some(callee) = full_var.segments.pop() else {
            return Err(MalformedConstruct::invalid("FullVar", "call target vanished", info.position()));
        };
        let call_span = callee.info().offset()..suffix.span.end;
        let call_info = self.builder.info_for_span(call_span);
        full_var.segments.push(Expression::new(
            call_info,
            ExpressionKind::FunctionCall(FunctionCall {
                callee: Box::new(callee),
                arguments,
            }),
        ));
        let info = self.builder.info_for_span(span);
        finish(Expression::new(info, ExpressionKind::FullVar(full_var)))
    }

    /// Append `segment` to `current` if it is already a full-var path, or start one
    fn extend_full_var(&mut self, current: Expression, segment: Expression, span: Range<usize>) -> BuildResult {
        let (info, kind) = current.into_parts();
        let segments = match kind {
            ExpressionKind::FullVar(FullVar { mut segments }) => {
                segments.push(segment);
                segments
            }
            kind => vec![Expression::new(info, kind), segment],
        };
        let info = self.builder.info_for_span(span);
        finish(Expression::new(info, ExpressionKind::FullVar(FullVar::new(segments))))
    }
}

fn finish(expression: Expression) -> BuildResult {
    expression.validate()?;
    Ok(expression)
}

/// Absorb a right-hand `=` assignment or initialized declaration into a chain
fn split_chain(value: Expression) -> (Vec<ChainTarget>, Expression) {
    let chainable = match &value.kind {
        ExpressionKind::Assignment(assignment) => assignment.is_chainable(),
        ExpressionKind::VarDecl(declaration) => declaration.initializer.is_some(),
        _ => false,
    };
    if !chainable {
        return (Vec::new(), value);
    }

    let (info, kind) = value.into_parts();
    match kind {
        ExpressionKind::Assignment(assignment) => {
            let mut chain = vec![ChainTarget {
                declared: false,
                target: *assignment.left,
            }];
            chain.extend(assignment.chain);
            (chain, *assignment.right)
        }
        ExpressionKind::VarDecl(VarDecl {
            name,
            chain: inner,
            initializer: Some(initializer),
        }) => {
            let mut chain = vec![ChainTarget {
                declared: true,
                target: *name,
            }];
            chain.extend(inner);
            (chain, *initializer)
        }
        kind => (Vec::new(), Expression::new(info, kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::ast::traits::AstNode;
    use crate::cfml::grammar::engine::{EntryPoint, GrammarEngine, PredictionMode};
    use crate::cfml::grammar::parser::ScriptGrammar;

    fn build(source: &str) -> Expression {
        let mut grammar = ScriptGrammar::new();
        grammar.set_input(source);
        grammar.set_prediction_mode(PredictionMode::Full);
        let tree = grammar.parse(EntryPoint::Expression).unwrap();
        AstBuilder::new().build_expression(source, &tree).unwrap()
    }

    #[test]
    fn test_dotted_chain_is_one_multipart_identifier() {
        let expression = build("a.b.c");
        let ExpressionKind::MultipartIdentifier(multipart) = &expression.kind else {
            panic!("expected multipart identifier, got {}", expression.node_type());
        };
        assert_eq!(multipart.names(), vec!["a", "b", "c"]);
        assert_eq!(expression.decompile(0).unwrap(), "a.b.c");
    }

    #[test]
    fn test_scope_folds_into_first_identifier() {
        let expression = build("local.x");
        let identifier = expression.as_identifier().unwrap();
        assert_eq!(identifier.scope.as_deref(), Some("local"));
        assert_eq!(identifier.name, "x");

        let expression = build("local.a.b");
        assert_eq!(expression.node_type(), "MultipartIdentifier");
        assert_eq!(expression.decompile(0).unwrap(), "local.a.b");
    }

    #[test]
    fn test_call_on_name_is_function_call() {
        let expression = build("a.b(1, x = 2)");
        let call = expression.as_call().unwrap();
        assert_eq!(call.callee.node_type(), "MultipartIdentifier");
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(expression.decompile(0).unwrap(), "a.b(1,x=2)");
    }

    #[test]
    fn test_suffixes_after_index_extend_full_var() {
        let expression = build("a[1].b(2).c");
        let ExpressionKind::FullVar(full_var) = &expression.kind else {
            panic!("expected full var, got {}", expression.node_type());
        };
        let kinds: Vec<_> = full_var.segments.iter().map(|s| s.node_type()).collect();
        assert_eq!(kinds, vec!["Identifier", "Member", "FunctionCall", "Identifier"]);
        assert_eq!(expression.decompile(0).unwrap(), "a[1].b(2).c");
    }

    #[test]
    fn test_assignment_chain_flattens() {
        let expression = build("a = b = c = 1");
        let ExpressionKind::Assignment(assignment) = &expression.kind else {
            panic!("expected assignment");
        };
        assert_eq!(assignment.chain.len(), 2);
        assert_eq!(expression.decompile(0).unwrap(), "a = b = c = 1");

        let expression = build("a += b = 1");
        assert_eq!(expression.decompile(0).unwrap(), "a += b = 1");
    }

    #[test]
    fn test_var_declaration_chain() {
        let expression = build("var yy = var zz = qq = 1");
        let ExpressionKind::VarDecl(declaration) = &expression.kind else {
            panic!("expected declaration");
        };
        assert_eq!(declaration.chain.len(), 2);
        assert!(declaration.chain[0].declared);
        assert!(!declaration.chain[1].declared);
        assert_eq!(expression.decompile(0).unwrap(), "var yy = var zz = qq = 1");
    }

    #[test]
    fn test_parentheses_are_dropped() {
        let expression = build("((a))");
        assert_eq!(expression.node_type(), "Identifier");
        assert_eq!(build("(a + b) * c").decompile(0).unwrap(), "(a+b)*c");
    }

    #[test]
    fn test_interpolation_assembles_concatenation() {
        let expression = build("\"Hi #name#\"");
        assert_eq!(expression.node_type(), "Binary");
        assert_eq!(expression.decompile(0).unwrap(), "'Hi '&#name#");
    }
}

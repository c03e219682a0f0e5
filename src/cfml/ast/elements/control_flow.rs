//! Branching and looping statements

use super::Element;
use crate::cfml::ast::decompile::{body, braced, indentation};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::{Statement, StatementKind};
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
}

impl Element for If {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let condition = self.condition.decompile(indent)?;
        let Some(else_branch) = &self.else_branch else {
            return Ok(format!("if ({}) {}", condition, body(&self.then_branch, indent)?));
        };

        // an else-less inner `if` would capture our `else` when read back
        let dangling = matches!(
            &self.then_branch.kind,
            StatementKind::If(inner) if inner.else_branch.is_none()
        );
        let then_branch = if dangling {
            braced(std::slice::from_ref(self.then_branch.as_ref()), indent)?
        } else {
            body(&self.then_branch, indent)?
        };
        Ok(format!(
            "if ({}) {} else {}",
            condition,
            then_branch,
            body(else_branch, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.condition]
    }

    fn statements(&self) -> Vec<&Statement> {
        let mut children = vec![self.then_branch.as_ref()];
        children.extend(self.else_branch.as_deref());
        children
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expression,
    pub body: Box<Statement>,
}

impl Element for While {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "while ({}) {}",
            self.condition.decompile(indent)?,
            body(&self.body, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.condition]
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhile {
    pub body: Box<Statement>,
    pub condition: Expression,
}

impl Element for DoWhile {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "do {} while ({});",
            body(&self.body, indent)?,
            self.condition.decompile(indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.condition]
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub init: Option<Expression>,
    pub condition: Option<Expression>,
    pub step: Option<Expression>,
    pub body: Box<Statement>,
}

impl Element for For {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let part = |expression: &Option<Expression>| -> DecompileResult {
            expression
                .as_ref()
                .map_or(Ok(String::new()), |expression| expression.decompile(indent))
        };
        Ok(format!(
            "for ({};{};{}) {}",
            part(&self.init)?,
            part(&self.condition)?,
            part(&self.step)?,
            body(&self.body, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        [&self.init, &self.condition, &self.step]
            .into_iter()
            .filter_map(Option::as_ref)
            .collect()
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

/// `for (var item in collection)`
#[derive(Debug, Clone, PartialEq)]
pub struct ForIn {
    pub declared: bool,
    pub variable: Expression,
    pub collection: Expression,
    pub body: Box<Statement>,
}

impl Element for ForIn {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "for ({}{} in {}) {}",
            if self.declared { "var " } else { "" },
            self.variable.decompile(indent)?,
            self.collection.decompile(indent)?,
            body(&self.body, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.variable, &self.collection]
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub subject: Expression,
    /// Case statements in declared order
    pub cases: Vec<Statement>,
}

impl Switch {
    pub fn default_case(&self) -> Option<&Statement> {
        self.cases
            .iter()
            .find(|case| matches!(&case.kind, StatementKind::Case(case) if case.is_default()))
    }

    pub(crate) fn validate(&self, position: Position) -> Result<(), MalformedConstruct> {
        let mut defaults = 0;
        for case in &self.cases {
            match &case.kind {
                StatementKind::Case(case) if case.is_default() => defaults += 1,
                StatementKind::Case(_) => {}
                _ => {
                    return Err(MalformedConstruct::invalid(
                        "Switch",
                        format!("{} statement in place of a case", case.node_type()),
                        position,
                    ))
                }
            }
        }
        if defaults > 1 {
            return Err(MalformedConstruct::invalid(
                "Switch",
                "more than one default case",
                position,
            ));
        }
        Ok(())
    }
}

impl Element for Switch {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        self.validate(position)?;
        Ok(format!(
            "switch ({}) {}",
            self.subject.decompile(indent)?,
            braced(&self.cases, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.subject]
    }

    fn statements(&self) -> Vec<&Statement> {
        self.cases.iter().collect()
    }
}

/// One `case label:` or `default:` arm and the statements under it
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub label: Option<Expression>,
    pub body: Vec<Statement>,
}

impl Case {
    pub fn is_default(&self) -> bool {
        self.label.is_none()
    }
}

impl Element for Case {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let mut out = match &self.label {
            Some(label) => format!("case {}:", label.decompile(indent)?),
            None => "default:".to_string(),
        };
        let inner = indentation(indent + 1);
        for statement in &self.body {
            out.push('\n');
            out.push_str(&inner);
            out.push_str(&statement.decompile(indent + 1)?);
        }
        Ok(out)
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.label.iter().collect()
    }

    fn statements(&self) -> Vec<&Statement> {
        self.body.iter().collect()
    }
}

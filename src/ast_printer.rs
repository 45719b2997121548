use crate::{
    syntax::{
        expr::{self, Expr, Visitor as _},
        stmt::{self, Stmt, Visitor as _},
        token::Literal,
    },
    value::Value,
};

/// Renders syntax trees as parenthesized prefix notation, e.g.
/// `(* (- 123) (group 45.67))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        self.visit_expr(expr)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        self.visit_stmt(stmt)
    }

    /// One line per top-level statement.
    pub fn print_program(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|statement| self.print_stmt(statement))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut string = String::from("(");
        string.push_str(name);

        for expr in exprs {
            string.push(' ');
            string.push_str(&self.visit_expr(expr));
        }

        string.push(')');
        string
    }

    fn parenthesize_stmts(
        &mut self,
        name: &str,
        head: Option<&Expr>,
        stmts: &[&Stmt],
    ) -> String {
        let mut string = String::from("(");
        string.push_str(name);

        if let Some(expr) = head {
            string.push(' ');
            string.push_str(&self.visit_expr(expr));
        }
        for stmt in stmts {
            string.push(' ');
            string.push_str(&self.visit_stmt(stmt));
        }

        string.push(')');
        string
    }
}

impl expr::Visitor<String> for AstPrinter {
    fn visit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Grouping { expression } => self.parenthesize("group", &[expression.as_ref()]),
            Expr::Unary { operator, right } => self.parenthesize(&operator.lexeme, &[right.as_ref()]),
            Expr::Literal { value } => match value {
                Literal::String(value) => format!("\"{value}\""),
                other => Value::from(other).to_string(),
            },
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
            Expr::Variable { name } => name.lexeme.clone(),
            Expr::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.visit_expr(value))
            }
        }
    }
}

impl stmt::Visitor<String> for AstPrinter {
    fn visit_stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => self.parenthesize(";", &[expr]),
            Stmt::Print(expr) => self.parenthesize("print", &[expr]),
            Stmt::Var { name, initializer } => match initializer {
                Some(initializer) => {
                    self.parenthesize(&format!("var {}", name.lexeme), &[initializer])
                }
                None => format!("(var {})", name.lexeme),
            },
            Stmt::Block(statements) => {
                let statements: Vec<&Stmt> = statements.iter().collect();
                self.parenthesize_stmts("block", None, &statements)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut branches = vec![then_branch.as_ref()];
                if let Some(else_branch) = else_branch {
                    branches.push(else_branch.as_ref());
                }
                self.parenthesize_stmts("if", Some(condition), &branches)
            }
            Stmt::While { condition, body } => {
                self.parenthesize_stmts("while", Some(condition), &[body.as_ref()])
            }
        }
    }
}

use super::token::{Literal, Token};

pub trait Visitor<T> {
    fn visit_expr(&mut self, expression: &Expr) -> T;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Grouping {
        expression: Box<Expr>,
    },
    Literal {
        value: Literal,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    // kept apart from Binary so the right operand can be skipped
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
}

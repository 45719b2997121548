use tracing::{debug, trace};

use crate::{
    environment::Environment,
    error::RuntimeError,
    logger::{Logger, StdoutLogger},
    syntax::{
        expr::{self, Expr, Visitor as _},
        stmt::{self, Stmt, Visitor as _},
        token::{Literal, Token, TokenType},
    },
    value::Value,
};

type EvalResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    environment: Environment,
    logger: Box<dyn Logger>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_logger(Box::new(StdoutLogger))
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Interpreter {
        Interpreter {
            environment: Environment::new(),
            logger,
        }
    }

    pub fn logger(&mut self) -> &mut dyn Logger {
        self.logger.as_mut()
    }

    /// Runs the statements in order. The first runtime fault stops the rest
    /// of the program and is handed back; bindings made before it stay in
    /// the global scope.
    pub fn interpret(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                debug!(line = error.line(), %error, "runtime fault");
                return Err(error);
            }
        }

        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.visit_expr(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.visit_stmt(stmt)
    }

    /// Runs `statements` in a fresh child scope. The scope is closed again
    /// whether or not a statement faults.
    fn execute_block(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        self.environment.push_scope();
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment.pop_scope();

        result
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> EvalResult<()> {
        let value = self.evaluate(expr)?;
        self.logger.print(format_args!("{}", value));
        Ok(())
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: &Option<Expr>) -> EvalResult<()> {
        let value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        trace!(name = %name.lexeme, %value, "define");
        self.environment.define(&name.lexeme, value);
        Ok(())
    }

    fn visit_if_stmt(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: &Option<Box<Stmt>>,
    ) -> EvalResult<()> {
        if self.evaluate(condition)?.is_truthy() {
            self.execute(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, condition: &Expr, body: &Stmt) -> EvalResult<()> {
        while self.evaluate(condition)?.is_truthy() {
            self.execute(body)?;
        }

        Ok(())
    }

    fn visit_assign_expr(&mut self, name: &Token, value: &Expr) -> EvalResult<Value> {
        let value = self.evaluate(value)?;
        self.environment.assign(name, value.clone())?;
        Ok(value)
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult<Value> {
        let left = self.evaluate(left)?;

        let short_circuits = match operator.token_type {
            TokenType::Or => left.is_truthy(),
            _ => !left.is_truthy(),
        };
        if short_circuits {
            return Ok(left);
        }

        self.evaluate(right)
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> EvalResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Plus => match (left, right) {
                (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
                (Value::String(mut left), Value::String(right)) => {
                    left.push_str(&right);
                    Ok(Value::String(left))
                }
                _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings {
                    operator: operator.clone(),
                }),
            },

            // equality never fails, whatever the operand types
            TokenType::EqualEqual => Ok(Value::Boolean(left.is_equal(&right))),
            TokenType::BangEqual => Ok(Value::Boolean(!left.is_equal(&right))),

            _ => {
                let (left, right) = Interpreter::number_operands(operator, left, right)?;
                let value = match operator.token_type {
                    TokenType::Minus => Value::Number(left - right),
                    TokenType::Star => Value::Number(left * right),
                    TokenType::Slash => Value::Number(left / right),
                    TokenType::Greater => Value::Boolean(left > right),
                    TokenType::GreaterEqual => Value::Boolean(left >= right),
                    TokenType::Less => Value::Boolean(left < right),
                    TokenType::LessEqual => Value::Boolean(left <= right),
                    _ => unreachable!("parser produced binary operator {:?}", operator.token_type),
                };
                Ok(value)
            }
        }
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> EvalResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Bang => Ok(Value::Boolean(!right.is_truthy())),
            _ => match right {
                Value::Number(value) => Ok(Value::Number(-value)),
                _ => Err(RuntimeError::OperandMustBeNumber {
                    operator: operator.clone(),
                }),
            },
        }
    }

    fn visit_literal(&self, literal: &Literal) -> Value {
        Value::from(literal)
    }

    fn number_operands(operator: &Token, left: Value, right: Value) -> EvalResult<(f64, f64)> {
        match (left, right) {
            (Value::Number(left), Value::Number(right)) => Ok((left, right)),
            _ => Err(RuntimeError::OperandsMustBeNumbers {
                operator: operator.clone(),
            }),
        }
    }
}

impl expr::Visitor<EvalResult<Value>> for Interpreter {
    fn visit_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            } => self.visit_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.visit_logical(left, operator, right),
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Literal { value } => Ok(self.visit_literal(value)),
            Expr::Unary { operator, right } => self.visit_unary(operator, right),
            Expr::Variable { name } => self.environment.get(name),
            Expr::Assign { name, value } => self.visit_assign_expr(name, value),
        }
    }
}

impl stmt::Visitor<EvalResult<()>> for Interpreter {
    fn visit_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expression(expr) => self.evaluate(expr).map(|_| ()),
            Stmt::Print(expr) => self.visit_print_stmt(expr),
            Stmt::Var { name, initializer } => self.visit_var_stmt(name, initializer),
            Stmt::Block(statements) => self.execute_block(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.visit_if_stmt(condition, then_branch, else_branch),
            Stmt::While { condition, body } => self.visit_while_stmt(condition, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fmt::Arguments, rc::Rc};

    use super::*;
    use crate::{parser::Parser, scanner::Scanner};

    struct MockLogger {
        logs: Rc<RefCell<Vec<String>>>,
    }
    impl MockLogger {
        fn new() -> MockLogger {
            MockLogger {
                logs: Rc::new(RefCell::new(vec![])),
            }
        }
    }
    impl Logger for MockLogger {
        fn print(&mut self, value: Arguments) {
            self.logs.borrow_mut().push(value.to_string());
        }
    }

    fn identifier(name: &str, line: usize) -> Token {
        Token::new(TokenType::Identifier, name, Literal::None, line)
    }

    fn string(value: &str) -> Expr {
        Expr::Literal {
            value: Literal::String(String::from(value)),
        }
    }

    /// Scans, parses and runs `source`, returning the printed lines and the
    /// fault that stopped it, if any.
    fn run(source: &str) -> (Vec<String>, Option<RuntimeError>) {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(scan_errors.is_empty() && parse_errors.is_empty());

        let logger = Box::new(MockLogger::new());
        let logs = logger.logs.clone();
        let mut interpreter = Interpreter::with_logger(logger);
        let result = interpreter.interpret(&statements);

        let printed = logs.borrow().clone();
        (printed, result.err())
    }

    fn prints(source: &str) -> Vec<String> {
        let (printed, error) = run(source);
        assert_eq!(error, None);
        printed
    }

    fn faults(source: &str) -> RuntimeError {
        match run(source).1 {
            Some(error) => error,
            None => panic!("expected a runtime error from {source:?}"),
        }
    }

    #[test]
    fn variable_declaration_and_assignment() {
        let mut interpreter = Interpreter::new();
        let variable_token = identifier("x", 1);

        // declaration
        let var_stmt = Stmt::Var {
            name: variable_token.clone(),
            initializer: Some(Expr::Literal {
                value: Literal::Number(10.0),
            }),
        };
        assert!(interpreter.execute(&var_stmt).is_ok());

        let result = interpreter.environment.get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "10");

        // assignment
        let assign_stmt = Stmt::Expression(Expr::Assign {
            name: variable_token.clone(),
            value: Box::new(Expr::Literal {
                value: Literal::Number(20.5),
            }),
        });
        assert!(interpreter.execute(&assign_stmt).is_ok());

        // check that variable got updated
        let result = interpreter.environment.get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "20.5");
    }

    #[test]
    fn expression_evaluation() {
        let mut interpreter = Interpreter::new();

        let expr = Expr::Binary {
            left: Box::new(Expr::Literal {
                value: Literal::Number(10.0),
            }),
            operator: Token::new(TokenType::Plus, "+", Literal::None, 1),
            right: Box::new(Expr::Literal {
                value: Literal::Number(5.0),
            }),
        };

        let value = interpreter.evaluate(&expr).unwrap();
        assert_eq!(value.to_string(), "15");
    }

    #[test]
    fn block_scope_is_closed_after_a_fault() {
        let mut interpreter = Interpreter::new();

        let stmts = vec![
            Stmt::Var {
                name: identifier("x", 1),
                initializer: Some(string("inner")),
            },
            Stmt::Expression(Expr::Variable {
                name: identifier("missing", 2),
            }),
        ];

        assert!(interpreter.execute_block(&stmts).is_err());
        assert_eq!(interpreter.environment.depth(), 1);
        assert!(interpreter.environment.get(&identifier("x", 3)).is_err());
    }

    #[test]
    fn variable_scoping() {
        let logger = Box::new(MockLogger::new());
        let logs = logger.logs.clone();

        let mut interpreter = Interpreter::with_logger(logger);

        // these are used for print statements, the line number should not matter
        let a = identifier("a", 9999999);
        let b = identifier("b", 9999999);
        let c = identifier("c", 9999999);

        let statements = vec![
            Stmt::Var {
                name: identifier("a", 1),
                initializer: Some(string("global a")),
            },
            Stmt::Var {
                name: identifier("b", 2),
                initializer: Some(string("global b")),
            },
            Stmt::Var {
                name: identifier("c", 3),
                initializer: Some(string("global c")),
            },
            Stmt::Block(vec![
                Stmt::Var {
                    name: identifier("a", 5),
                    initializer: Some(string("outer a")),
                },
                Stmt::Var {
                    name: identifier("b", 6),
                    initializer: Some(string("outer b")),
                },
                Stmt::Block(vec![
                    Stmt::Var {
                        name: identifier("a", 8),
                        initializer: Some(string("inner a")),
                    },
                    Stmt::Print(Expr::Variable { name: a.clone() }),
                    Stmt::Print(Expr::Variable { name: b.clone() }),
                    Stmt::Print(Expr::Variable { name: c.clone() }),
                ]),
                Stmt::Print(Expr::Variable { name: a.clone() }),
                Stmt::Print(Expr::Variable { name: b.clone() }),
                Stmt::Print(Expr::Variable { name: c.clone() }),
            ]),
            Stmt::Print(Expr::Variable { name: a.clone() }),
            Stmt::Print(Expr::Variable { name: b.clone() }),
            Stmt::Print(Expr::Variable { name: c.clone() }),
        ];

        assert!(interpreter.interpret(&statements).is_ok());

        let expected_logs = vec![
            "inner a", "outer b", "global c", "outer a", "outer b", "global c", "global a",
            "global b", "global c",
        ];
        assert_eq!(*logs.borrow(), expected_logs);
    }

    #[test]
    fn arithmetic_and_stringification() {
        assert_eq!(
            prints("print 5 + 3; print 15 - 1; print 10 * 10; print 10 / 5; print 1 / 2;"),
            vec!["8", "14", "100", "2", "0.5"]
        );
        assert_eq!(prints("print -1; print 55; print 6.125;"), vec!["-1", "55", "6.125"]);
        assert_eq!(prints("print !(5 / (-6.0 * 1) >= 0.0);"), vec!["true"]);
    }

    #[test]
    fn division_by_zero_follows_float_semantics() {
        assert_eq!(prints("print 1 / 0; print -1 / 0;"), vec!["inf", "-inf"]);
        assert_eq!(prints("var n = 0 / 0; print n == n;"), vec!["false"]);
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(prints("print \"hello\" + \"world\";"), vec!["helloworld"]);
    }

    #[test]
    fn truthiness_and_negation() {
        assert_eq!(
            prints("print !1; print !0; print !\"\"; print !nil; print !!false;"),
            vec!["false", "false", "false", "true", "false"]
        );
    }

    #[test]
    fn equality_across_types() {
        assert_eq!(
            prints("print 6 == \"hello\"; print nil == false; print true != 5; print nil == nil;"),
            vec!["false", "false", "true", "true"]
        );
        assert_eq!(
            prints("print \"a\" == \"a\"; print 1 == 2; print true == true;"),
            vec!["true", "false", "true"]
        );
    }

    #[test]
    fn type_mismatches_fault() {
        let error = faults("print 5 + \"hello\";");
        assert_eq!(
            error.to_string(),
            "Operands must both be numbers or both be strings."
        );

        assert_eq!(
            faults("print -true;").to_string(),
            "Operand must be a number."
        );
        assert_eq!(
            faults("print \"a\" < \"b\";").to_string(),
            "Operands must be numbers."
        );
        assert_eq!(faults("\n\nprint nil * 2;").line(), 3);
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(
            prints("print false and (1 / nil); print true or (1 / nil);"),
            vec!["false", "true"]
        );
        assert_eq!(
            prints("print nil or \"yes\"; print 1 and 2; print nil and 2;"),
            vec!["yes", "2", "nil"]
        );
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(
            prints("var a; var b; a = b = 5; print a; print b;"),
            vec!["5", "5"]
        );
    }

    #[test]
    fn undefined_variables_fault_at_runtime() {
        let error = faults("a = 1;");
        assert_eq!(
            error,
            RuntimeError::UndefinedVariable {
                name: identifier("a", 1)
            }
        );

        assert_eq!(faults("print b;").to_string(), "Undefined variable b.");
    }

    #[test]
    fn first_fault_stops_the_program() {
        let (printed, error) = run("print 1; print -\"x\"; print 2;");
        assert_eq!(printed, vec!["1"]);
        assert!(error.is_some());
    }

    #[test]
    fn control_flow() {
        assert_eq!(
            prints("if (1 == 1) print \"then\"; else print \"else\";"),
            vec!["then"]
        );
        assert_eq!(prints("if (nil) print \"then\"; else print \"else\";"), vec!["else"]);
        assert_eq!(prints("if (false) print 1; print 2;"), vec!["2"]);
        assert_eq!(
            prints("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn for_loop_variable_does_not_leak() {
        let (printed, error) = run("for (var i = 0; i < 3; i = i + 1) print i; print i;");
        assert_eq!(printed, vec!["0", "1", "2"]);
        assert!(matches!(error, Some(RuntimeError::UndefinedVariable { .. })));
    }

    #[test]
    fn redeclaration_replaces_binding() {
        assert_eq!(prints("var a = 1; var a = a + 1; print a;"), vec!["2"]);
    }
}

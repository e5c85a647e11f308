//! Runtime scalar-expression evaluator over pre-declared `x0..x{n-1}`
//! variable slots. The expression is parsed once at construction into a
//! small tree and evaluated without allocation on every tick.

use crate::error::ConstructionError;
use crate::port::{PortSet, PortType, PortValue};

#[derive(Clone, Debug)]
enum Expr {
    Const(f32),
    Var(usize),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, vars: &[f32]) -> f32 {
        match self {
            Expr::Const(c) => *c,
            Expr::Var(i) => vars.get(*i).copied().unwrap_or(0.0),
            Expr::Neg(e) => -e.eval(vars),
            Expr::Add(a, b) => a.eval(vars) + b.eval(vars),
            Expr::Sub(a, b) => a.eval(vars) - b.eval(vars),
            Expr::Mul(a, b) => a.eval(vars) * b.eval(vars),
            Expr::Div(a, b) => {
                let d = b.eval(vars);
                if d.abs() < 1e-10 { 0.0 } else { a.eval(vars) / d }
            }
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    n: usize,
}

impl Parser {
    fn new(src: &str, n: usize) -> Self {
        Self { chars: src.chars().collect(), pos: 0, n }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        let mut node = self.parse_term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Expr::Add(Box::new(node), Box::new(rhs));
                }
                Some('-') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    node = Expr::Sub(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut node = self.parse_factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Expr::Mul(Box::new(node), Box::new(rhs));
                }
                Some('/') => {
                    self.bump();
                    let rhs = self.parse_factor()?;
                    node = Expr::Div(Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr, String> {
        self.skip_ws();
        if self.peek() == Some('-') {
            self.bump();
            let inner = self.parse_factor()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.bump();
                let e = self.parse_expr()?;
                self.skip_ws();
                if self.bump() != Some(')') {
                    return Err("expected ')'".to_string());
                }
                Ok(e)
            }
            Some('x') => {
                self.bump();
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err("expected variable index after 'x'".to_string());
                }
                let idx: usize = self.chars[start..self.pos]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .map_err(|_| "malformed variable index".to_string())?;
                if idx >= self.n {
                    return Err(format!("variable x{idx} out of range"));
                }
                Ok(Expr::Var(idx))
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                text.parse::<f32>().map(Expr::Const).map_err(|_| format!("bad number literal '{text}'"))
            }
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Compiles and evaluates a scalar arithmetic expression over `x0..x{n-1}`.
pub struct Math {
    pub ports: PortSet,
    expr: Expr,
    vars: Vec<f32>,
}

impl Math {
    pub fn new(expression: &str, n: usize) -> Result<Self, ConstructionError> {
        let mut parser = Parser::new(expression, n);
        let expr = parser.parse_expr().map_err(|_| ConstructionError::ExpressionParse(expression.to_string()))?;
        parser.skip_ws();
        if parser.pos != parser.chars.len() {
            return Err(ConstructionError::ExpressionParse(expression.to_string()));
        }

        let mut ports = PortSet::new();
        for i in 0..n {
            let name = Box::leak(format!("x{i}").into_boxed_str());
            ports = ports.with_input(name, PortType::Analog);
        }
        ports = ports.with_output("output", PortType::Analog);

        Ok(Self { ports, expr, vars: vec![0.0; n] })
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        for (slot, value) in self.vars.iter_mut().zip(inputs.iter()) {
            *slot = value.as_analog();
        }
        let result = self.expr.eval(&self.vars);
        self.ports.outputs[0].value = PortValue::Analog(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_precedence_and_parens() {
        let mut m = Math::new("x0 + x1 * 2 - (x0 / 2)", 2).unwrap();
        m.update(&[PortValue::Analog(4.0), PortValue::Analog(3.0)]);
        // 4 + 6 - 2 = 8
        assert_eq!(m.ports.outputs[0].value.as_analog(), 8.0);
    }

    #[test]
    fn unary_minus_and_literals() {
        let mut m = Math::new("-x0 + 1.5", 1).unwrap();
        m.update(&[PortValue::Analog(2.0)]);
        assert_eq!(m.ports.outputs[0].value.as_analog(), -0.5);
    }

    #[test]
    fn out_of_range_variable_is_a_construction_error() {
        assert!(Math::new("x3", 2).is_err());
    }

    #[test]
    fn malformed_expression_is_a_construction_error() {
        assert!(Math::new("x0 + * 1", 1).is_err());
    }
}

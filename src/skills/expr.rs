//! Evaluator for bracketed numeric expressions such as `{base * index}`.
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom ('^' unary)?
//! atom    := number | ident | ident '(' sum ')' | '(' sum ')'
//! ```

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at {0}")]
    UnexpectedToken(usize),

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text.parse().map_err(|_| ExprError::InvalidNumber(text.clone()))?;
                tokens.push((start, Token::Num(n)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push((i, Token::Op(c)));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            _ => return Err(ExprError::UnexpectedChar { ch: c, pos: i }),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    vars: &'a HashMap<String, f64>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        tok
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(p, _)| *p).unwrap_or(0)
    }

    fn sum(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.product()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.product()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn product(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = match op {
                '*' => acc * rhs,
                _ if rhs == 0.0 => return Err(ExprError::DivisionByZero),
                '/' => acc / rhs,
                _ => acc % rhs,
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, ExprError> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, ExprError> {
        let at = self.offset();
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let v = self.sum()?;
                self.expect_rparen()?;
                Ok(v)
            }
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.pos += 1;
                    let arg = self.sum()?;
                    self.expect_rparen()?;
                    return apply_function(&name, arg);
                }
                self.vars
                    .get(&name)
                    .copied()
                    .ok_or(ExprError::UndefinedVariable(name))
            }
            Some(_) => Err(ExprError::UnexpectedToken(at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ExprError> {
        let at = self.offset();
        match self.next() {
            Some(Token::RParen) => Ok(()),
            Some(_) => Err(ExprError::UnexpectedToken(at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn apply_function(name: &str, arg: f64) -> Result<f64, ExprError> {
    Ok(match name {
        "abs" => arg.abs(),
        "ceil" => arg.ceil(),
        "floor" => arg.floor(),
        "round" => arg.round(),
        "sqrt" => arg.sqrt(),
        "exp" => arg.exp(),
        "log" => arg.ln(),
        "log10" => arg.log10(),
        _ => return Err(ExprError::UnknownFunction(name.to_string())),
    })
}

/// Evaluate `src` (without the surrounding braces) against `vars`.
pub fn evaluate(src: &str, vars: &HashMap<String, f64>) -> Result<f64, ExprError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        vars,
    };
    let value = parser.sum()?;
    if parser.pos < parser.tokens.len() {
        return Err(ExprError::UnexpectedToken(parser.offset()));
    }
    Ok(value)
}

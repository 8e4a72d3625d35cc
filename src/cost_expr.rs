//! Arithmetic evaluation of the cost field.
//!
//! The create form accepts expressions such as `12.50*3 + 4` so a user can
//! total a receipt without leaving the page. Supported syntax: decimal
//! numbers, `+ - * /`, parentheses and unary minus. The result must come out
//! finite and non-negative, since the API rejects anything else.

use std::fmt;

/// Why a cost expression could not be turned into an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostExprError {
    /// The text is not a valid arithmetic expression.
    Parse(String),
    /// The expression evaluated to infinity or NaN, e.g. division by zero.
    NonFinite,
    /// The expression evaluated to a negative amount.
    Negative,
}

impl fmt::Display for CostExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostExprError::Parse(detail) => write!(f, "Invalid cost expression: {detail}"),
            CostExprError::NonFinite => {
                write!(f, "Cost expression does not evaluate to a number")
            }
            CostExprError::Negative => write!(f, "Cost must not be negative"),
        }
    }
}

/// Evaluate an arithmetic cost expression to a finite, non-negative amount.
pub fn evaluate_cost(text: &str) -> Result<f64, CostExprError> {
    let tokens = tokenize(text)?;

    let mut parser = Parser { tokens, position: 0 };
    let value = parser.expression()?;

    if parser.position != parser.tokens.len() {
        return Err(CostExprError::Parse(format!(
            "unexpected '{}'",
            parser.tokens[parser.position]
        )));
    }

    if !value.is_finite() {
        return Err(CostExprError::NonFinite);
    }

    if value < 0.0 {
        return Err(CostExprError::Negative);
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, CostExprError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();

                while let Some(&digit) = chars.peek() {
                    if digit.is_ascii_digit() || digit == '.' {
                        literal.push(digit);
                        chars.next();
                    } else {
                        break;
                    }
                }

                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CostExprError::Parse(format!("bad number '{literal}'")))?;
                tokens.push(Token::Number(value));
            }
            other => {
                return Err(CostExprError::Parse(format!("unexpected '{other}'")));
            }
        }
    }

    if tokens.is_empty() {
        return Err(CostExprError::Parse("empty expression".to_owned()));
    }

    Ok(tokens)
}

/// Recursive descent over the usual grammar: expression handles `+ -`,
/// term handles `* /`, factor handles numbers, parens and unary minus.
struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }

        token
    }

    fn expression(&mut self) -> Result<f64, CostExprError> {
        let mut value = self.term()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.position += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.position += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CostExprError> {
        let mut value = self.factor()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.position += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.position += 1;
                    value /= self.factor()?;
                }
                _ => break,
            }
        }

        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CostExprError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::OpenParen) => {
                let value = self.expression()?;

                match self.next() {
                    Some(Token::CloseParen) => Ok(value),
                    _ => Err(CostExprError::Parse("missing ')'".to_owned())),
                }
            }
            Some(token) => Err(CostExprError::Parse(format!("unexpected '{token}'"))),
            None => Err(CostExprError::Parse("unexpected end of expression".to_owned())),
        }
    }
}

//! Arithmetic expression evaluation and answer formatting.
//!
//! A small recursive-descent evaluator restricted to `+ - * /`, unary signs
//! and parentheses. Integer arithmetic stays exact until it overflows, `/`
//! always produces a float.

use std::fmt;

use crate::error::ChallengeError;

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{x:.1}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Op(char),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ChallengeError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let number = if literal.contains('.') {
                    literal.parse::<f64>().map(Number::Float).ok()
                } else {
                    literal.parse::<i128>().map(Number::Int).ok()
                };
                let number = number.ok_or_else(|| {
                    ChallengeError::Evaluation(format!("invalid number '{literal}'"))
                })?;
                tokens.push(Token::Num(number));
            }
            other => {
                return Err(ChallengeError::Evaluation(format!(
                    "unexpected character '{other}'"
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn expression(&mut self) -> Result<Number, ChallengeError> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Number, ChallengeError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = apply(op, acc, rhs)?;
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<Number, ChallengeError> {
        match self.next() {
            Some(Token::Op('-')) => negate(self.unary()?),
            Some(Token::Op('+')) => self.unary(),
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(ChallengeError::Evaluation("unbalanced parenthesis".into())),
                }
            }
            Some(t) => Err(ChallengeError::Evaluation(format!("unexpected token {t:?}"))),
            None => Err(ChallengeError::Evaluation("unexpected end of expression".into())),
        }
    }
}

fn negate(n: Number) -> Result<Number, ChallengeError> {
    Ok(match n {
        Number::Int(i) => i.checked_neg().map_or(Number::Float(-(i as f64)), Number::Int),
        Number::Float(f) => Number::Float(-f),
    })
}

fn apply(op: char, lhs: Number, rhs: Number) -> Result<Number, ChallengeError> {
    if op == '/' {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(ChallengeError::Evaluation("division by zero".into()));
        }
        return finite(lhs.as_f64() / divisor);
    }

    if let (Number::Int(a), Number::Int(b)) = (lhs, rhs) {
        let exact = match op {
            '+' => a.checked_add(b),
            '-' => a.checked_sub(b),
            '*' => a.checked_mul(b),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Number::Int(v));
        }
    }

    let (a, b) = (lhs.as_f64(), rhs.as_f64());
    match op {
        '+' => finite(a + b),
        '-' => finite(a - b),
        '*' => finite(a * b),
        other => Err(ChallengeError::Evaluation(format!("unknown operator '{other}'"))),
    }
}

fn finite(x: f64) -> Result<Number, ChallengeError> {
    if x.is_finite() {
        Ok(Number::Float(x))
    } else {
        Err(ChallengeError::Evaluation("result out of range".into()))
    }
}

/// Evaluate an expression such as `"12 + -3 * 4"`.
pub fn evaluate(input: &str) -> Result<Number, ChallengeError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ChallengeError::Evaluation("empty expression".into()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos < parser.tokens.len() {
        return Err(ChallengeError::Evaluation(format!(
            "trailing input in '{input}'"
        )));
    }
    Ok(value)
}

/// Format a raw answer for matching.
///
/// A trailing `.0` is dropped and remaining fractions are truncated to
/// `frac_dec` decimals. Returns the answer and whether truncation lost
/// digits.
pub fn truncate_answer(raw: &str, frac_dec: u32) -> (String, bool) {
    let answer = raw.strip_suffix(".0").unwrap_or(raw);
    let Some(dot) = answer.find('.') else {
        return (answer.to_string(), false);
    };

    let fraction = &answer[dot + 1..];
    let kept_digits = fraction
        .chars()
        .take(frac_dec as usize)
        .take_while(|c| c.is_ascii_digit())
        .count();

    let truncated = if kept_digits == 0 {
        let int_part = &answer[..dot];
        if int_part == "-0" || int_part == "-" || int_part.is_empty() {
            "0".to_string()
        } else {
            int_part.to_string()
        }
    } else {
        answer[..dot + 1 + kept_digits].to_string()
    };

    let lost = truncated.len() < answer.len();
    (truncated, lost)
}

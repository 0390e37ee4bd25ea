// Constrained arithmetic evaluator for the add-expense calculator.
//
// The amount field accepts small sums like "120+45*2". Only decimal numbers
// and + - * / are legal; anything else is rejected before evaluation, so no
// general expression ever gets executed.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A character outside digits, '.', and the four operators.
    IllegalCharacter(char),
    /// A number with more than one decimal point, or a bare '.'.
    MalformedNumber(String),
    /// Operator with a missing operand, empty input, trailing operator.
    UnexpectedEnd,
    /// Two operands in a row, or an operator where a number was expected.
    UnexpectedToken(String),
    /// Division blew up (or overflow): the result is not a finite number.
    NotFinite,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::IllegalCharacter(c) => write!(f, "illegal character '{}'", c),
            CalcError::MalformedNumber(s) => write!(f, "malformed number '{}'", s),
            CalcError::UnexpectedEnd => write!(f, "expression ended unexpectedly"),
            CalcError::UnexpectedToken(s) => write!(f, "unexpected '{}'", s),
            CalcError::NotFinite => write!(f, "result is not a finite number"),
        }
    }
}

impl std::error::Error for CalcError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' => {
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
            '0'..='9' | '.' => {
                let mut literal = String::new();
                let mut dots = 0;
                while let Some(&d) = chars.peek() {
                    match d {
                        '0'..='9' => literal.push(d),
                        '.' => {
                            dots += 1;
                            literal.push(d);
                        }
                        _ => break,
                    }
                    chars.next();
                }
                if dots > 1 || literal == "." {
                    return Err(CalcError::MalformedNumber(literal));
                }
                let value: f64 = literal
                    .parse()
                    .map_err(|_| CalcError::MalformedNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(CalcError::IllegalCharacter(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.next();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.next();
                    value -= self.term()?;
                }
                other => {
                    return Err(CalcError::UnexpectedToken(format!("{:?}", other)));
                }
            }
        }
        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.next();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.next();
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor := '-' factor | number
    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(other) => Err(CalcError::UnexpectedToken(format!("{:?}", other))),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

/// Evaluate a calculator expression. Usual precedence (* / before + -),
/// left associative, unary minus allowed where a number may start.
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(CalcError::UnexpectedEnd);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NotFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_number() {
        assert_eq!(evaluate("250"), Ok(250.0));
        assert_eq!(evaluate("99.50"), Ok(99.5));
        assert_eq!(evaluate(" 42 "), Ok(42.0));
    }

    #[test]
    fn test_addition_and_subtraction() {
        assert_eq!(evaluate("200+150"), Ok(350.0));
        assert_eq!(evaluate("500-120-80"), Ok(300.0));
        assert_eq!(evaluate("99.5+0.5"), Ok(100.0));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("200+150*2"), Ok(500.0));
        assert_eq!(evaluate("100-90/3"), Ok(70.0));
        assert_eq!(evaluate("2*3+4*5"), Ok(26.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(evaluate("100/5/2"), Ok(10.0));
        assert_eq!(evaluate("10-3-2"), Ok(5.0));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(evaluate("-5+10"), Ok(5.0));
        assert_eq!(evaluate("10*-2"), Ok(-20.0));
    }

    #[test]
    fn test_rejects_foreign_characters() {
        assert!(matches!(
            evaluate("2+2; rm -rf /"),
            Err(CalcError::IllegalCharacter(';'))
        ));
        assert!(matches!(
            evaluate("(1+2)*3"),
            Err(CalcError::IllegalCharacter('('))
        ));
        assert!(matches!(
            evaluate("1e10"),
            Err(CalcError::IllegalCharacter('e'))
        ));
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        assert!(matches!(
            evaluate("1.2.3"),
            Err(CalcError::MalformedNumber(_))
        ));
        assert!(matches!(evaluate("."), Err(CalcError::MalformedNumber(_))));
    }

    #[test]
    fn test_rejects_incomplete_expressions() {
        assert_eq!(evaluate(""), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("5+"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("   "), Err(CalcError::UnexpectedEnd));
        assert!(matches!(
            evaluate("*5"),
            Err(CalcError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        assert_eq!(evaluate("5/0"), Err(CalcError::NotFinite));
        assert_eq!(evaluate("0/0"), Err(CalcError::NotFinite));
    }
}

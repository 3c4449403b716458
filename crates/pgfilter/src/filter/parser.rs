use super::ParseError;
use super::lexer::{ComparisonOp, Token, TokenKind, tokenize};
use std::iter::Peekable;
use std::vec::IntoIter;

/// Deepest parenthesis nesting accepted before parsing gives up.
pub(crate) const MAX_DEPTH: usize = 128;

/// A literal as written in the expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Literal {
    pub raw: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Comparison {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Literal,
}

/// Parsed filter expression. `And`/`Or` hold two or more operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
    Compare(Comparison),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// Length of the input in chars, reported for errors at end of input.
    end: usize,
    /// Open parentheses enclosing the current position.
    depth: usize,
}

/// Parse a complete expression.
///
/// ```text
/// expr       := and_expr ( "or" and_expr )*
/// and_expr   := primary ( "and" primary )*
/// primary    := "(" expr ")" | comparison
/// comparison := word op ( word | string )
/// ```
pub(crate) fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        end: input.chars().count(),
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.tokens.next() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::syntax(
            tok.position,
            format!("unexpected {}", tok.kind),
        )),
    }
}

impl Parser {
    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.and_expr()?];
        while self.eat(&TokenKind::Or) {
            operands.push(self.and_expr()?);
        }
        Ok(collapse(operands, Expr::Or))
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut operands = vec![self.primary()?];
        while self.eat(&TokenKind::And) {
            operands.push(self.primary()?);
        }
        Ok(collapse(operands, Expr::And))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(open) = self.tokens.next_if(|tok| tok.kind == TokenKind::LParen) else {
            return self.comparison();
        };
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::syntax(
                open.position,
                "expression nested too deeply",
            ));
        }

        self.depth += 1;
        let expr = self.expr()?;
        self.depth -= 1;

        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(expr),
            Some(tok) => Err(ParseError::syntax(
                tok.position,
                format!("expected \")\", found {}", tok.kind),
            )),
            None => Err(ParseError::syntax(self.end, "missing closing \")\"")),
        }
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let column = match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => word,
            Some(tok) => {
                return Err(ParseError::syntax(
                    tok.position,
                    format!("expected column name, found {}", tok.kind),
                ));
            }
            None => return Err(ParseError::syntax(self.end, "expected column name")),
        };

        let op = match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) => op,
            Some(tok) => {
                return Err(ParseError::syntax(
                    tok.position,
                    format!("expected comparison operator after \"{column}\", found {}", tok.kind),
                ));
            }
            None => {
                return Err(ParseError::syntax(
                    self.end,
                    format!("expected comparison operator after \"{column}\""),
                ));
            }
        };

        let value = match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Word(raw),
                ..
            }) => Literal { raw, quoted: false },
            Some(Token {
                kind: TokenKind::Quoted(raw),
                ..
            }) => Literal { raw, quoted: true },
            Some(tok) => {
                return Err(ParseError::syntax(
                    tok.position,
                    format!("expected value after \"{column} {op}\", found {}", tok.kind),
                ));
            }
            None => {
                return Err(ParseError::syntax(
                    self.end,
                    format!("expected value after \"{column} {op}\""),
                ));
            }
        };

        Ok(Expr::Compare(Comparison { column, op, value }))
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.tokens.next_if(|tok| &tok.kind == kind).is_some()
    }
}

fn collapse(mut operands: Vec<Expr>, join: fn(Vec<Expr>) -> Expr) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        join(operands)
    }
}

use super::ParseError;
use std::fmt;

/// Comparison operators of the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `%`: the column contains the value.
    Contains,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Contains => "%",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LParen,
    RParen,
    And,
    Or,
    Op(ComparisonOp),
    /// Unquoted run of characters: a column name, number or bare word.
    Word(String),
    /// Quoted string with escapes resolved.
    Quoted(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => f.write_str("\"(\""),
            TokenKind::RParen => f.write_str("\")\""),
            TokenKind::And => f.write_str("\"and\""),
            TokenKind::Or => f.write_str("\"or\""),
            TokenKind::Op(op) => write!(f, "\"{op}\""),
            TokenKind::Word(w) => write!(f, "\"{w}\""),
            TokenKind::Quoted(q) => write!(f, "string \"{q}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Character offset into the expression.
    pub position: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '=' | '!' | '<' | '>' | '%' | '\'' | '"' | '`')
}

/// Split an expression into tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().enumerate().peekable();

    while let Some((position, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Op(ComparisonOp::Eq),
            '%' => TokenKind::Op(ComparisonOp::Contains),
            '!' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => TokenKind::Op(ComparisonOp::Ne),
                None => return Err(ParseError::syntax(position, "expected \"=\" after \"!\"")),
            },
            '>' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => TokenKind::Op(ComparisonOp::Gte),
                None => TokenKind::Op(ComparisonOp::Gt),
            },
            '<' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => TokenKind::Op(ComparisonOp::Lte),
                None => TokenKind::Op(ComparisonOp::Lt),
            },
            '\'' | '"' | '`' => {
                let quote = c;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => {
                                return Err(ParseError::syntax(position, "unterminated string"));
                            }
                        },
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => value.push(c),
                        None => return Err(ParseError::syntax(position, "unterminated string")),
                    }
                }
                TokenKind::Quoted(value)
            }
            c => {
                let mut word = String::from(c);
                while let Some((_, c)) = chars.next_if(|&(_, c)| !is_delimiter(c)) {
                    word.push(c);
                }
                if word.eq_ignore_ascii_case("and") {
                    TokenKind::And
                } else if word.eq_ignore_ascii_case("or") {
                    TokenKind::Or
                } else {
                    TokenKind::Word(word)
                }
            }
        };
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

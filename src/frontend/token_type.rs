use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Special
    Error,
    Eof,
    Eol,

    // Identifiers and literals
    Ident,
    Int,
    Float,

    // Arithmetic operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,

    // Comparison operators
    Eq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Logical operators
    And,
    Or,

    // Assignment
    Assign,

    // Syntax markers
    Backslash,
    Dot,
    Dollar,
    Underscore,

    // Delimiters
    LParen,
    RParen,
    Semicolon,

    // Keywords
    If,
    Then,
    Else,
    Let,
    In,
}

/// Resolves reserved words; everything else is an identifier.
pub fn lookup_ident(ident: &str) -> TokenType {
    match ident {
        "if" => TokenType::If,
        "then" => TokenType::Then,
        "else" => TokenType::Else,
        "let" => TokenType::Let,
        "in" => TokenType::In,
        _ => TokenType::Ident,
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Error => "ERROR",
            TokenType::Eof => "EOF",
            TokenType::Eol => "EOL",

            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::Float => "FLOAT",

            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Caret => "^",

            TokenType::Eq => "==",
            TokenType::Lt => "<",
            TokenType::Gt => ">",
            TokenType::Lte => "<=",
            TokenType::Gte => ">=",

            TokenType::And => "&&",
            TokenType::Or => "||",

            TokenType::Assign => "=",

            TokenType::Backslash => "\\",
            TokenType::Dot => ".",
            TokenType::Dollar => "$",
            TokenType::Underscore => "_",

            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::Semicolon => ";",

            TokenType::If => "IF",
            TokenType::Then => "THEN",
            TokenType::Else => "ELSE",
            TokenType::Let => "LET",
            TokenType::In => "IN",
        };
        write!(f, "{}", s)
    }
}

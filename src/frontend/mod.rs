pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod precedence;
pub mod reader;
pub mod token;
pub mod token_type;

pub use position::{Position, Span};
pub use token::Token;
pub use token_type::TokenType;

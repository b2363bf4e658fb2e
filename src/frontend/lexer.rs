use crate::frontend::diagnostics::Diagnostic;
use crate::frontend::position::{Position, Span};
use crate::frontend::reader::LineSource;
use crate::frontend::token::Token;
use crate::frontend::token_type::{TokenType, lookup_ident};

pub const PRIMARY_PROMPT: &str = "> ";
pub const CONTINUATION_PROMPT: &str = "..";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// A fresh line must be read before lexing continues.
    LineStart,
    /// Lexing inside the current line.
    InLine,
    /// The current line is exhausted; an end-of-line token is pending.
    LineEnd,
    Eof,
}

/// The lilt lexer.
///
/// Pulls raw lines from a [`LineSource`] on demand and retains every line it
/// has seen so error reports can quote them. While `skip_newline` is active
/// (inside parentheses and `if`..`else`), line breaks are consumed silently
/// and the continuation prompt is used for further reads.
pub struct Lexer<'a> {
    source: &'a mut dyn LineSource,
    lines: Vec<String>,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    cursor: Cursor,
    fresh_statement: bool,
    pub skip_newline: bool,
    pub token: Token,
    pub errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a mut dyn LineSource) -> Self {
        Self {
            source,
            lines: Vec::new(),
            chars: Vec::new(),
            pos: 0,
            line: 0,
            cursor: Cursor::LineStart,
            fresh_statement: true,
            skip_newline: false,
            token: Token::new(TokenType::Eof, "", 0, 0),
            errors: Vec::new(),
        }
    }

    /// Marks the start of a top-level expression: the next line read gets the
    /// primary prompt and `skip_newline` is reset.
    pub fn begin_statement(&mut self) {
        self.fresh_statement = true;
        self.skip_newline = false;
    }

    /// The raw source lines seen so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_errors(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.errors)
    }

    pub fn token_type(&self) -> TokenType {
        self.token.token_type
    }

    /// Reports an error, discards the rest of the current line for recovery,
    /// and leaves the lexer on an error token.
    pub fn report(&mut self, message: impl Into<String>, span: Span) -> TokenType {
        self.errors.push(Diagnostic::new(message, span));
        if self.cursor == Cursor::Eof {
            self.errors
                .push(Diagnostic::new("Unexpected end of file.", span));
        } else {
            self.pos = self.chars.len();
            self.cursor = Cursor::LineStart;
        }
        self.skip_newline = false;
        self.token = Token::new(TokenType::Error, "", span.start.line, span.start.column);
        TokenType::Error
    }

    pub fn report_diagnostic(&mut self, diagnostic: Diagnostic) -> TokenType {
        self.report(diagnostic.message, diagnostic.span)
    }

    pub fn next_token(&mut self) -> TokenType {
        loop {
            match self.cursor {
                Cursor::LineStart => {
                    let prompt = if self.fresh_statement {
                        PRIMARY_PROMPT
                    } else {
                        CONTINUATION_PROMPT
                    };
                    match self.source.read_line(prompt) {
                        Some(text) => {
                            self.fresh_statement = false;
                            self.chars = text.chars().collect();
                            self.lines.push(text);
                            self.line = self.lines.len();
                            self.pos = 0;
                            self.cursor = Cursor::InLine;
                        }
                        None => self.cursor = Cursor::Eof,
                    }
                    continue;
                }
                Cursor::Eof => {
                    self.token = Token::new(TokenType::Eof, "", self.line, self.chars.len());
                    return TokenType::Eof;
                }
                Cursor::LineEnd => {
                    self.cursor = Cursor::LineStart;
                    if self.skip_newline {
                        continue;
                    }
                    self.token = Token::new(TokenType::Eol, "", self.line, self.chars.len());
                    return TokenType::Eol;
                }
                Cursor::InLine => {}
            }

            while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
                self.pos += 1;
            }
            // Comments run to the end of the line.
            if self.peek() == Some('-') && self.peek_at(1) == Some('-') {
                self.pos = self.chars.len();
            }
            if self.pos >= self.chars.len() {
                self.cursor = Cursor::LineEnd;
                continue;
            }
            break;
        }

        let line = self.line;
        let col = self.pos;
        let c = self.chars[self.pos];

        let token = match c {
            '+' => self.single(TokenType::Plus, "+", line, col),
            '-' => self.single(TokenType::Minus, "-", line, col),
            '*' => self.single(TokenType::Asterisk, "*", line, col),
            '/' => self.single(TokenType::Slash, "/", line, col),
            '^' => self.single(TokenType::Caret, "^", line, col),
            '=' if self.peek_at(1) == Some('=') => self.double(TokenType::Eq, "==", line, col),
            '=' => self.single(TokenType::Assign, "=", line, col),
            '<' if self.peek_at(1) == Some('=') => self.double(TokenType::Lte, "<=", line, col),
            '<' => self.single(TokenType::Lt, "<", line, col),
            '>' if self.peek_at(1) == Some('=') => self.double(TokenType::Gte, ">=", line, col),
            '>' => self.single(TokenType::Gt, ">", line, col),
            '&' if self.peek_at(1) == Some('&') => self.double(TokenType::And, "&&", line, col),
            '|' if self.peek_at(1) == Some('|') => self.double(TokenType::Or, "||", line, col),
            '\\' => self.single(TokenType::Backslash, "\\", line, col),
            '.' => self.single(TokenType::Dot, ".", line, col),
            '$' => self.single(TokenType::Dollar, "$", line, col),
            '_' => self.single(TokenType::Underscore, "_", line, col),
            '(' => self.single(TokenType::LParen, "(", line, col),
            ')' => self.single(TokenType::RParen, ")", line, col),
            ';' => self.single(TokenType::Semicolon, ";", line, col),
            '"' => return self.read_quoted_identifier(line, col),
            c if c.is_ascii_alphabetic() => return self.read_identifier(line, col),
            c if c.is_ascii_digit() => return self.read_number(line, col),
            _ => {
                let span = self.span_at(line, col, 1);
                return self.report("Unknown/Unsupported character!", span);
            }
        };

        self.token = token;
        self.token.token_type
    }

    fn single(&mut self, token_type: TokenType, literal: &str, line: usize, col: usize) -> Token {
        self.pos += 1;
        Token::new(token_type, literal, line, col)
    }

    fn double(&mut self, token_type: TokenType, literal: &str, line: usize, col: usize) -> Token {
        self.pos += 2;
        Token::new(token_type, literal, line, col)
    }

    fn read_identifier(&mut self, line: usize, col: usize) -> TokenType {
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let span = self.span_at(line, col, self.pos - col + 1);
            return self.report("Digits are not allowed directly after identifiers!", span);
        }
        let ident: String = self.chars[col..self.pos].iter().collect();
        let token_type = lookup_ident(&ident);
        self.token = Token::new(token_type, ident, line, col);
        token_type
    }

    /// A quoted identifier: the quotes belong to the name. No line break may
    /// occur before the closing quote.
    fn read_quoted_identifier(&mut self, line: usize, col: usize) -> TokenType {
        self.pos += 1;
        while self.peek().is_some_and(|c| c != '"') {
            self.pos += 1;
        }
        if self.peek().is_none() {
            let span = self.span_at(line, col, self.pos - col);
            return self.report("Unterminated string literal.", span);
        }
        self.pos += 1; // closing quote
        let name: String = self.chars[col..self.pos].iter().collect();
        self.token = Token::new(TokenType::Ident, name, line, col);
        TokenType::Ident
    }

    fn read_number(&mut self, line: usize, col: usize) -> TokenType {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                let span = self.span_at(line, col, self.pos - col);
                return self.report("At least one digit expected after '.'.", span);
            }
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            let span = self.span_at(line, col, self.pos - col + 1);
            return self.report(
                "Alphabetic characters are not allowed directly after numbers!",
                span,
            );
        }
        let literal: String = self.chars[col..self.pos].iter().collect();
        let token_type = if is_float {
            TokenType::Float
        } else {
            TokenType::Int
        };
        self.token = Token::new(token_type, literal, line, col);
        token_type
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn span_at(&self, line: usize, col: usize, len: usize) -> Span {
        Span::new(
            Position::new(line, col),
            Position::new(line, col + len.max(1)),
        )
    }
}

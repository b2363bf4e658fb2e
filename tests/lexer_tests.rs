use lilt::frontend::lexer::Lexer;
use lilt::frontend::reader::ScriptSource;
use lilt::frontend::token_type::TokenType;

fn lex_all(input: &str) -> Vec<(TokenType, String)> {
    let mut source = ScriptSource::new(input.as_bytes());
    let mut lexer = Lexer::new(&mut source);
    let mut tokens = Vec::new();
    loop {
        let token_type = lexer.next_token();
        tokens.push((token_type, lexer.token.literal.clone()));
        if matches!(token_type, TokenType::Eof | TokenType::Error) {
            break;
        }
    }
    tokens
}

fn lex_types(input: &str) -> Vec<TokenType> {
    lex_all(input).into_iter().map(|(t, _)| t).collect()
}

#[test]
fn operators_and_delimiters() {
    let types = lex_types("+ - * / ^ = == < <= > >= && || \\ . $ _ ( ) ;");
    assert_eq!(
        types,
        vec![
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Asterisk,
            TokenType::Slash,
            TokenType::Caret,
            TokenType::Assign,
            TokenType::Eq,
            TokenType::Lt,
            TokenType::Lte,
            TokenType::Gt,
            TokenType::Gte,
            TokenType::And,
            TokenType::Or,
            TokenType::Backslash,
            TokenType::Dot,
            TokenType::Dollar,
            TokenType::Underscore,
            TokenType::LParen,
            TokenType::RParen,
            TokenType::Semicolon,
            TokenType::Eol,
            TokenType::Eof,
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    let tokens = lex_all("if then else let in foo");
    assert_eq!(tokens[0].0, TokenType::If);
    assert_eq!(tokens[1].0, TokenType::Then);
    assert_eq!(tokens[2].0, TokenType::Else);
    assert_eq!(tokens[3].0, TokenType::Let);
    assert_eq!(tokens[4].0, TokenType::In);
    assert_eq!(tokens[5], (TokenType::Ident, "foo".to_string()));
}

#[test]
fn integer_and_float_literals() {
    let tokens = lex_all("42 3.14 10");
    assert_eq!(tokens[0], (TokenType::Int, "42".to_string()));
    assert_eq!(tokens[1], (TokenType::Float, "3.14".to_string()));
    assert_eq!(tokens[2], (TokenType::Int, "10".to_string()));
}

#[test]
fn quoted_identifier_keeps_quotes() {
    let tokens = lex_all("\"No Match\"");
    assert_eq!(tokens[0], (TokenType::Ident, "\"No Match\"".to_string()));
}

#[test]
fn unterminated_quote_is_an_error() {
    let mut source = ScriptSource::new("\"oops".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Error);
    let errors = lexer.take_errors();
    assert_eq!(errors[0].message, "Unterminated string literal.");
}

#[test]
fn digit_after_identifier_is_an_error() {
    let mut source = ScriptSource::new("abc1".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Error);
    let errors = lexer.take_errors();
    assert_eq!(
        errors[0].message,
        "Digits are not allowed directly after identifiers!"
    );
}

#[test]
fn letter_after_number_is_an_error() {
    let mut source = ScriptSource::new("12a".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Error);
    let errors = lexer.take_errors();
    assert_eq!(
        errors[0].message,
        "Alphabetic characters are not allowed directly after numbers!"
    );
}

#[test]
fn dot_without_digits_is_an_error() {
    let mut source = ScriptSource::new("5.".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Error);
    let errors = lexer.take_errors();
    assert_eq!(errors[0].message, "At least one digit expected after '.'.");
}

#[test]
fn unknown_character_is_an_error() {
    let mut source = ScriptSource::new("#".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Error);
    let errors = lexer.take_errors();
    assert_eq!(errors[0].message, "Unknown/Unsupported character!");
}

#[test]
fn comments_run_to_end_of_line() {
    let types = lex_types("1 -- the rest is ignored\n2");
    assert_eq!(
        types,
        vec![
            TokenType::Int,
            TokenType::Eol,
            TokenType::Int,
            TokenType::Eol,
            TokenType::Eof,
        ]
    );
}

#[test]
fn skip_newline_consumes_line_breaks() {
    let mut source = ScriptSource::new("1\n2".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Int);
    lexer.skip_newline = true;
    assert_eq!(lexer.next_token(), TokenType::Int);
    assert_eq!(lexer.token.literal, "2");
}

#[test]
fn tokens_carry_positions() {
    let mut source = ScriptSource::new("ab + 1".as_bytes());
    let mut lexer = Lexer::new(&mut source);

    lexer.next_token();
    assert_eq!(lexer.token.position.line, 1);
    assert_eq!(lexer.token.position.column, 0);
    assert_eq!(lexer.token.end_position.column, 2);

    lexer.next_token();
    assert_eq!(lexer.token.position.column, 3);

    lexer.next_token();
    assert_eq!(lexer.token.position.column, 5);
}

#[test]
fn error_recovery_discards_rest_of_line() {
    let mut source = ScriptSource::new("1 # 2\n3".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    assert_eq!(lexer.next_token(), TokenType::Int);
    assert_eq!(lexer.next_token(), TokenType::Error);
    // The `2` on the broken line is gone; lexing resumes on the next line.
    assert_eq!(lexer.next_token(), TokenType::Int);
    assert_eq!(lexer.token.literal, "3");
}

#[test]
fn retained_lines_match_input() {
    let mut source = ScriptSource::new("one\ntwo".as_bytes());
    let mut lexer = Lexer::new(&mut source);
    while lexer.next_token() != TokenType::Eof {}
    assert_eq!(lexer.lines(), &["one".to_string(), "two".to_string()]);
}

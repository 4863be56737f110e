use crate::token::{Lexer, Token};

fn lex(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize().tokens
}

#[test]
fn lexes_declaration_line() {
    let tokens = lex("def pipeline = new Runner()");
    assert_eq!(
        tokens,
        vec![
            Token::Def,
            Token::Id("pipeline".into()),
            Token::Assign,
            Token::New,
            Token::Id("Runner".into()),
            Token::LParen,
            Token::RParen,
        ]
    );
}

#[test]
fn keywords_are_distinguished_from_identifiers() {
    let tokens = lex("classy class");
    assert_eq!(tokens, vec![Token::Id("classy".into()), Token::Class]);
}

#[test]
fn line_comments_are_skipped_but_newlines_kept() {
    let tokens = lex("a // trailing\nb");
    assert_eq!(
        tokens,
        vec![Token::Id("a".into()), Token::Newline, Token::Id("b".into())]
    );
}

#[test]
fn block_comments_may_span_lines() {
    let tokens = lex("a /* x\ny */ b");
    assert_eq!(tokens, vec![Token::Id("a".into()), Token::Id("b".into())]);
}

#[test]
fn string_content_is_raw_with_placeholders() {
    let tokens = lex(r#"x = "hello ${name}!""#);
    assert!(matches!(&tokens[2], Token::Str(s) if s == "hello ${name}!"));
}

#[test]
fn triple_quoted_strings_span_lines() {
    let out = Lexer::new("x = '''line1\nline2'''").tokenize();
    assert!(out.diagnostics.is_empty());
    assert!(matches!(&out.tokens[2], Token::Str(s) if s == "line1\nline2"));
}

#[test]
fn unterminated_string_recovers_with_diagnostic() {
    let out = Lexer::new("x = \"oops\ny = 1").tokenize();
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].message.contains("Unterminated"));
    // The scan keeps going on the next line.
    assert!(out.tokens.contains(&Token::Id("y".into())));
}

#[test]
fn escaped_quote_does_not_terminate() {
    let tokens = lex(r#"x = "a\"b""#);
    assert!(matches!(&tokens[2], Token::Str(s) if s == r#"a\"b"#));
}

#[test]
fn multi_char_operators_merge() {
    let tokens = lex("a == b && c ?: d");
    assert!(tokens.contains(&Token::Op("==".into())));
    assert!(tokens.contains(&Token::Op("&&".into())));
    assert!(tokens.contains(&Token::Op("?:".into())));
}

#[test]
fn spans_carry_one_based_lines() {
    let out = Lexer::new("a\nb").tokenize();
    assert_eq!(out.spans[0].start.line, 1);
    assert_eq!(out.spans[2].start.line, 2);
    assert_eq!(out.spans[2].start.column, 1);
}

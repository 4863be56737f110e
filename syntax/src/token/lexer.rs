use crate::diag::Diagnostic;
use crate::token::{Position, Span, Token};

/// Tokenizer output. The lexer never fails hard: malformed input surfaces
/// as diagnostics and the token stream continues at the next safe point.
#[derive(Debug, Clone)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub spans: Vec<Span>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column, self.pos)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn tokenize(mut self) -> LexOutput {
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        let mut diagnostics = Vec::new();

        let mut push = |tok: Token, start: Position, end: Position| {
            tokens.push(tok);
            spans.push(Span::new(start, end));
        };

        while let Some(c) = self.peek() {
            let start = self.here();
            match c {
                '\n' => {
                    self.bump();
                    push(Token::Newline, start, self.here());
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        diagnostics.push(Diagnostic::error(
                            "Unterminated block comment",
                            start.line - 1,
                            start.column - 1,
                        ));
                    }
                }
                '\'' | '"' => {
                    let (content, err) = self.scan_string(c);
                    if let Some(msg) = err {
                        diagnostics.push(Diagnostic::error(msg, start.line - 1, start.column - 1));
                    }
                    push(Token::Str(content), start, self.here());
                }
                c if c.is_ascii_digit() => {
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_alphanumeric() || c == '_' || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
                            text.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    push(Token::Num(text), start, self.here());
                }
                c if is_ident_start(c) => {
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if is_ident_continue(c) {
                            text.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    let tok = Token::keyword(&text).unwrap_or(Token::Id(text));
                    push(tok, start, self.here());
                }
                '(' => {
                    self.bump();
                    push(Token::LParen, start, self.here());
                }
                ')' => {
                    self.bump();
                    push(Token::RParen, start, self.here());
                }
                '{' => {
                    self.bump();
                    push(Token::LBrace, start, self.here());
                }
                '}' => {
                    self.bump();
                    push(Token::RBrace, start, self.here());
                }
                '[' => {
                    self.bump();
                    push(Token::LBracket, start, self.here());
                }
                ']' => {
                    self.bump();
                    push(Token::RBracket, start, self.here());
                }
                ',' => {
                    self.bump();
                    push(Token::Comma, start, self.here());
                }
                ';' => {
                    self.bump();
                    push(Token::Semicolon, start, self.here());
                }
                ':' => {
                    self.bump();
                    push(Token::Colon, start, self.here());
                }
                '.' if !self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.bump();
                    push(Token::Dot, start, self.here());
                }
                _ => {
                    let op = self.scan_operator();
                    let tok = match op.as_str() {
                        "=" => Token::Assign,
                        "->" => Token::Arrow,
                        _ => Token::Op(op),
                    };
                    push(tok, start, self.here());
                }
            }
        }

        LexOutput {
            tokens,
            spans,
            diagnostics,
        }
    }

    /// Scan a quoted string after detecting its opening quote. Returns the
    /// raw content (escapes and `${...}` placeholders untouched) and an
    /// error message when the literal is unterminated.
    fn scan_string(&mut self, quote: char) -> (String, Option<String>) {
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.bump();
        if triple {
            self.bump();
            self.bump();
        }
        let mut content = String::new();
        loop {
            match self.peek() {
                None => {
                    return (content, Some("Unterminated string literal".to_string()));
                }
                Some('\\') => {
                    content.push('\\');
                    self.bump();
                    if let Some(c) = self.bump() {
                        content.push(c);
                    }
                }
                Some('\n') if !triple => {
                    // Recover at end of line; single-line literals cannot span lines.
                    return (content, Some("Unterminated string literal".to_string()));
                }
                Some(c) if c == quote => {
                    if triple {
                        if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                            self.bump();
                            self.bump();
                            self.bump();
                            return (content, None);
                        }
                        content.push(c);
                        self.bump();
                    } else {
                        self.bump();
                        return (content, None);
                    }
                }
                Some(c) => {
                    content.push(c);
                    self.bump();
                }
            }
        }
    }

    fn scan_operator(&mut self) -> String {
        const OP_CHARS: &str = "+-*/%<>=!&|^~?:.@";
        let mut op = String::new();
        while let Some(c) = self.peek() {
            if OP_CHARS.contains(c) && op.len() < 3 {
                // Stop before a comment opener glued to an operator.
                if c == '/' && matches!(self.peek_at(1), Some('/') | Some('*')) && !op.is_empty() {
                    break;
                }
                op.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if op.is_empty() {
            // Unknown character; consume it so the scan always advances.
            if let Some(c) = self.bump() {
                op.push(c);
            }
        }
        op
    }
}

mod lexer;

#[cfg(test)]
mod token_test;

pub use lexer::{LexOutput, Lexer};

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Dot,      // .
    Comma,    // ,
    Colon,    // :
    Semicolon,
    Newline,
    Assign, // = (never ==)
    Arrow,  // -> (closure parameter separator)
    // Declaration keywords
    Class,
    Interface,
    Extends,
    Implements,
    Def,
    // Statement keywords
    If,
    Else,
    While,
    For,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Return,
    Throw,
    // Expression keywords
    New,
    This,
    Super,
    As,
    In,
    Instanceof,
    // Modifiers
    Static,
    Final,
    Public,
    Private,
    Protected,
    Void,
    // Import / structure
    Import,
    Package,
    // Literals
    True,
    False,
    Null,
    Str(String), // quoted literal content, quotes stripped, escapes kept raw
    Num(String),
    Id(String),
    Op(String), // any other operator run (==, &&, +, ?:, ...)
}

impl Token {
    pub fn keyword(ident: &str) -> Option<Token> {
        use Token::*;
        let tok = match ident {
            "class" => Class,
            "interface" => Interface,
            "extends" => Extends,
            "implements" => Implements,
            "def" => Def,
            "if" => If,
            "else" => Else,
            "while" => While,
            "for" => For,
            "switch" => Switch,
            "case" => Case,
            "default" => Default,
            "try" => Try,
            "catch" => Catch,
            "finally" => Finally,
            "return" => Return,
            "throw" => Throw,
            "new" => New,
            "this" => This,
            "super" => Super,
            "as" => As,
            "in" => In,
            "instanceof" => Instanceof,
            "static" => Static,
            "final" => Final,
            "public" => Public,
            "private" => Private,
            "protected" => Protected,
            "void" => Void,
            "import" => Import,
            "package" => Package,
            "true" => True,
            "false" => False,
            "null" => Null,
            _ => return None,
        };
        Some(tok)
    }
}

mod helpers;

#[cfg(test)]
mod parse_test;

use crate::ast::{Block, ClassDecl, FieldDecl, MethodDecl, Param, Script, Stmt};
use crate::diag::Diagnostic;
use crate::token::{Span, Token};

/// Tolerant recursive-descent parser over the token stream.
///
/// Expressions are consumed as balanced token runs rather than parsed into
/// trees; the resolution engine only needs declarations, bodies, and line
/// ranges. The parser never fails hard: unexpected input produces a
/// diagnostic and the scan continues at the next safe point, so downstream
/// consumers always receive a (possibly partial) tree.
pub struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) spans: &'a [Span],
    pub(crate) pos: usize,
    pub(crate) len: usize,
    pub(crate) diags: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], spans: &'a [Span]) -> Self {
        Self {
            tokens,
            spans,
            pos: 0,
            len: tokens.len(),
            diags: Vec::new(),
        }
    }

    pub fn parse_script(mut self) -> (Script, Vec<Diagnostic>) {
        let mut script = Script::default();

        while self.pos < self.len {
            self.skip_separators();
            if self.pos >= self.len {
                break;
            }
            self.consume_modifiers();
            match self.tok() {
                Some(Token::Class) | Some(Token::Interface) => {
                    if let Some(class) = self.parse_class() {
                        script.classes.push(class);
                    }
                }
                Some(Token::Package) | Some(Token::Import) => {
                    self.consume_expr_run();
                }
                _ if self.at_method_decl() => {
                    if let Some(method) = self.parse_method() {
                        script.script_methods.push(method);
                    }
                }
                _ => {
                    let stmt = self.parse_stmt();
                    script.statements.push(stmt);
                }
            }
        }

        (script, self.diags)
    }

    fn parse_class(&mut self) -> Option<ClassDecl> {
        let start_line = self.line();
        self.bump(); // class / interface
        let name = match self.tok() {
            Some(Token::Id(n)) => {
                let n = n.clone();
                self.bump();
                n
            }
            _ => {
                self.error_here("Expected class name");
                self.recover_to_separator();
                return None;
            }
        };

        let mut superclass = None;
        let mut interfaces = Vec::new();
        loop {
            match self.tok() {
                Some(Token::Extends) => {
                    self.bump();
                    superclass = self.parse_type_name();
                }
                Some(Token::Implements) => {
                    self.bump();
                    while let Some(iface) = self.parse_type_name() {
                        interfaces.push(iface);
                        if matches!(self.tok(), Some(Token::Comma)) {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        self.skip_separators();
        if !matches!(self.tok(), Some(Token::LBrace)) {
            self.error_here("Expected '{' to open class body");
            return Some(ClassDecl {
                name,
                superclass,
                interfaces,
                fields: Vec::new(),
                methods: Vec::new(),
                start_line,
                end_line: start_line,
            });
        }
        self.bump(); // {

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        loop {
            self.skip_separators();
            match self.tok() {
                None => {
                    self.error_here("Unclosed class body");
                    break;
                }
                Some(Token::RBrace) => break,
                _ => {}
            }
            self.consume_modifiers();
            if self.at_method_decl() || self.at_constructor_decl(&name) {
                if let Some(method) = self.parse_method() {
                    methods.push(method);
                }
            } else if let Some(field) = self.parse_field() {
                fields.push(field);
            }
        }
        let end_line = self.line();
        if matches!(self.tok(), Some(Token::RBrace)) {
            self.bump();
        }

        Some(ClassDecl {
            name,
            superclass,
            interfaces,
            fields,
            methods,
            start_line,
            end_line,
        })
    }

    /// `def name(`, `void name(`, or `Type name(` at the current position.
    fn at_method_decl(&self) -> bool {
        matches!(self.tok(), Some(Token::Def) | Some(Token::Void) | Some(Token::Id(_)))
            && matches!(self.tok_at(1), Some(Token::Id(_)))
            && matches!(self.tok_at(2), Some(Token::LParen))
    }

    /// `Name(` where the name matches the enclosing class.
    fn at_constructor_decl(&self, class_name: &str) -> bool {
        matches!(self.tok(), Some(Token::Id(n)) if n == class_name) && matches!(self.tok_at(1), Some(Token::LParen))
    }

    fn parse_method(&mut self) -> Option<MethodDecl> {
        let start_line = self.line();
        let return_type = match self.tok() {
            Some(Token::Def) => {
                self.bump();
                None
            }
            Some(Token::Void) => {
                self.bump();
                Some("void".to_string())
            }
            Some(Token::Id(t)) if matches!(self.tok_at(1), Some(Token::Id(_))) => {
                let t = t.clone();
                self.bump();
                Some(t)
            }
            _ => None, // constructor form
        };
        let name = match self.tok() {
            Some(Token::Id(n)) => {
                let n = n.clone();
                self.bump();
                n
            }
            _ => {
                self.error_here("Expected method name");
                self.recover_to_separator();
                return None;
            }
        };
        if !matches!(self.tok(), Some(Token::LParen)) {
            self.error_here("Expected '(' after method name");
            self.recover_to_separator();
            return None;
        }
        self.bump(); // (
        let params = self.parse_params();

        self.skip_newlines();
        let body = if matches!(self.tok(), Some(Token::LBrace)) {
            self.parse_block()
        } else {
            // Abstract/interface methods carry no body.
            Block {
                stmts: Vec::new(),
                start_line,
                end_line: start_line,
            }
        };
        let end_line = body.end_line.max(start_line);

        Some(MethodDecl {
            name,
            return_type,
            params,
            body,
            start_line,
            end_line,
        })
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        loop {
            self.skip_newlines();
            match self.tok() {
                None => break,
                Some(Token::RParen) => {
                    self.bump();
                    break;
                }
                Some(Token::Comma) => {
                    self.bump();
                }
                _ => {
                    if matches!(self.tok(), Some(Token::Def)) {
                        self.bump();
                    }
                    let declared_type = match (self.tok(), self.tok_at(1)) {
                        (Some(Token::Id(t)), Some(Token::Id(_))) => {
                            let t = t.clone();
                            self.bump();
                            Some(t)
                        }
                        _ => None,
                    };
                    let name = match self.tok() {
                        Some(Token::Id(n)) => {
                            let n = n.clone();
                            self.bump();
                            n
                        }
                        _ => {
                            // Not a parameter shape; skip one token to make progress.
                            self.bump();
                            continue;
                        }
                    };
                    let has_default = matches!(self.tok(), Some(Token::Assign));
                    if has_default {
                        self.bump();
                        self.consume_until_arg_end();
                    }
                    params.push(Param {
                        name,
                        declared_type,
                        has_default,
                    });
                }
            }
        }
        params
    }

    fn parse_field(&mut self) -> Option<FieldDecl> {
        let line = self.line();
        match (self.tok(), self.tok_at(1)) {
            (Some(Token::Def), Some(Token::Id(n))) => {
                let name = n.clone();
                self.bump();
                self.bump();
                if matches!(self.tok(), Some(Token::Assign)) {
                    self.bump();
                    self.consume_expr_run();
                }
                Some(FieldDecl {
                    name,
                    declared_type: None,
                    is_property: true,
                    line,
                })
            }
            (Some(Token::Id(t)), Some(Token::Id(n))) => {
                let declared_type = Some(t.clone());
                let name = n.clone();
                self.bump();
                self.bump();
                if matches!(self.tok(), Some(Token::Assign)) {
                    self.bump();
                    self.consume_expr_run();
                }
                Some(FieldDecl {
                    name,
                    declared_type,
                    is_property: false,
                    line,
                })
            }
            _ => {
                self.error_here("Unexpected token in class body");
                self.recover_to_separator();
                None
            }
        }
    }

    pub(crate) fn parse_block(&mut self) -> Block {
        let start_line = self.line();
        self.bump(); // {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            match self.tok() {
                None => {
                    self.error_here("Unclosed block");
                    break;
                }
                Some(Token::RBrace) => break,
                _ => stmts.push(self.parse_stmt()),
            }
        }
        let end_line = self.line().max(start_line);
        if matches!(self.tok(), Some(Token::RBrace)) {
            self.bump();
        }
        Block {
            stmts,
            start_line,
            end_line,
        }
    }

    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        let line = self.line();
        match self.tok() {
            Some(Token::If) => self.parse_if(),
            Some(Token::While) | Some(Token::For) => {
                self.bump();
                self.consume_parens();
                let body = self.parse_branch();
                Stmt::Loop { body, line }
            }
            Some(Token::Switch) => self.parse_switch(),
            Some(Token::Try) => self.parse_try(),
            Some(Token::Return) => {
                self.bump();
                self.consume_expr_run();
                Stmt::Return { line }
            }
            Some(Token::Throw) => {
                self.bump();
                self.consume_expr_run();
                Stmt::Throw { line }
            }
            Some(Token::LBrace) => Stmt::Block(self.parse_block()),
            Some(Token::Def) if matches!(self.tok_at(1), Some(Token::Id(_))) => {
                self.bump();
                let name = self.bump_id().unwrap_or_default();
                if matches!(self.tok(), Some(Token::Assign)) {
                    self.bump();
                    self.consume_expr_run();
                }
                Stmt::Decl {
                    name,
                    declared_type: None,
                    line,
                }
            }
            Some(Token::Id(t))
                if matches!(self.tok_at(1), Some(Token::Id(_)))
                    && matches!(
                        self.tok_at(2),
                        None | Some(Token::Assign) | Some(Token::Newline) | Some(Token::Semicolon)
                    ) =>
            {
                let declared_type = Some(t.clone());
                self.bump();
                let name = self.bump_id().unwrap_or_default();
                if matches!(self.tok(), Some(Token::Assign)) {
                    self.bump();
                    self.consume_expr_run();
                }
                Stmt::Decl {
                    name,
                    declared_type,
                    line,
                }
            }
            _ => {
                self.consume_expr_run();
                Stmt::Expr { line }
            }
        }
    }

    fn parse_if(&mut self) -> Stmt {
        let line = self.line();
        self.bump(); // if
        self.consume_parens();
        let then = self.parse_branch();

        // `else` may sit on the next line after the closing brace.
        let mark = self.pos;
        self.skip_separators();
        let orelse = if matches!(self.tok(), Some(Token::Else)) {
            self.bump();
            self.skip_newlines();
            if matches!(self.tok(), Some(Token::If)) {
                let nested_line = self.line();
                let nested = self.parse_if();
                Some(Block {
                    start_line: nested_line,
                    end_line: nested_line,
                    stmts: vec![nested],
                })
            } else {
                Some(self.parse_branch())
            }
        } else {
            self.pos = mark;
            None
        };
        Stmt::If { then, orelse, line }
    }

    fn parse_switch(&mut self) -> Stmt {
        let line = self.line();
        self.bump(); // switch
        self.consume_parens();
        self.skip_newlines();
        if !matches!(self.tok(), Some(Token::LBrace)) {
            self.error_here("Expected '{' after switch");
            return Stmt::Expr { line };
        }
        self.bump(); // {

        let mut cases: Vec<Block> = Vec::new();
        let mut default: Option<Block> = None;
        loop {
            self.skip_separators();
            match self.tok() {
                None => {
                    self.error_here("Unclosed switch body");
                    break;
                }
                Some(Token::RBrace) => {
                    self.bump();
                    break;
                }
                Some(Token::Case) => {
                    self.bump();
                    // Case label expression runs to the colon.
                    while !matches!(self.tok(), None | Some(Token::Colon) | Some(Token::Newline)) {
                        self.bump();
                    }
                    if matches!(self.tok(), Some(Token::Colon)) {
                        self.bump();
                    }
                    cases.push(self.parse_case_arm());
                }
                Some(Token::Default) => {
                    self.bump();
                    if matches!(self.tok(), Some(Token::Colon)) {
                        self.bump();
                    }
                    default = Some(self.parse_case_arm());
                }
                _ => {
                    // Statement outside any case arm; tolerate and move on.
                    self.parse_stmt();
                }
            }
        }
        Stmt::Switch { cases, default, line }
    }

    fn parse_case_arm(&mut self) -> Block {
        let start_line = self.line();
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            match self.tok() {
                None | Some(Token::RBrace) | Some(Token::Case) | Some(Token::Default) => break,
                _ => stmts.push(self.parse_stmt()),
            }
        }
        let end_line = self.line().max(start_line);
        Block {
            stmts,
            start_line,
            end_line,
        }
    }

    fn parse_try(&mut self) -> Stmt {
        let line = self.line();
        self.bump(); // try
        self.skip_newlines();
        let body = if matches!(self.tok(), Some(Token::LBrace)) {
            self.parse_block()
        } else {
            Block::default()
        };

        let mut catches = Vec::new();
        let mut finally = None;
        loop {
            let mark = self.pos;
            self.skip_separators();
            match self.tok() {
                Some(Token::Catch) => {
                    self.bump();
                    self.consume_parens();
                    self.skip_newlines();
                    if matches!(self.tok(), Some(Token::LBrace)) {
                        catches.push(self.parse_block());
                    }
                }
                Some(Token::Finally) => {
                    self.bump();
                    self.skip_newlines();
                    if matches!(self.tok(), Some(Token::LBrace)) {
                        finally = Some(self.parse_block());
                    }
                    break;
                }
                _ => {
                    self.pos = mark;
                    break;
                }
            }
        }
        Stmt::Try {
            body,
            catches,
            finally,
            line,
        }
    }

    /// A branch body: a braced block, or a single statement wrapped in one.
    fn parse_branch(&mut self) -> Block {
        self.skip_newlines();
        if matches!(self.tok(), Some(Token::LBrace)) {
            return self.parse_block();
        }
        let start_line = self.line();
        let stmt = self.parse_stmt();
        Block {
            start_line,
            end_line: start_line,
            stmts: vec![stmt],
        }
    }
}

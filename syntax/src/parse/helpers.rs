use crate::diag::Diagnostic;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn tok(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn tok_at(&self, ahead: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + ahead)
    }

    pub(crate) fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn bump_id(&mut self) -> Option<String> {
        match self.tok() {
            Some(Token::Id(n)) => {
                let n = n.clone();
                self.pos += 1;
                Some(n)
            }
            _ => None,
        }
    }

    /// 1-based line of the current token (or of the last token at EOF).
    pub(crate) fn line(&self) -> u32 {
        if let Some(span) = self.spans.get(self.pos) {
            span.start.line
        } else {
            self.spans.last().map(|s| s.end.line).unwrap_or(1)
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while matches!(self.tok(), Some(Token::Newline)) {
            self.pos += 1;
        }
    }

    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.tok(), Some(Token::Newline) | Some(Token::Semicolon)) {
            self.pos += 1;
        }
    }

    pub(crate) fn consume_modifiers(&mut self) {
        while matches!(
            self.tok(),
            Some(Token::Static) | Some(Token::Final) | Some(Token::Public) | Some(Token::Private) | Some(Token::Protected)
        ) {
            self.pos += 1;
        }
    }

    /// Possibly-dotted type reference; returns the simple (last) name.
    pub(crate) fn parse_type_name(&mut self) -> Option<String> {
        let mut name = self.bump_id()?;
        while matches!(self.tok(), Some(Token::Dot)) && matches!(self.tok_at(1), Some(Token::Id(_))) {
            self.bump();
            name = self.bump_id().unwrap_or(name);
        }
        Some(name)
    }

    /// Consume a balanced `( ... )` group if one starts here (newlines allowed
    /// before it). Tolerates EOF inside the group.
    pub(crate) fn consume_parens(&mut self) {
        self.skip_newlines();
        if !matches!(self.tok(), Some(Token::LParen)) {
            return;
        }
        let mut depth = 0i32;
        while let Some(tok) = self.tok() {
            match tok {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consume a default-value expression inside a parameter list: runs to
    /// the next `,` or `)` at group depth zero, leaving the terminator.
    pub(crate) fn consume_until_arg_end(&mut self) {
        let mut depth = 0i32;
        while let Some(tok) = self.tok() {
            match tok {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                Token::Comma if depth == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consume an expression as a balanced token run. The run ends at a
    /// newline or semicolon at group depth zero (unless the line clearly
    /// continues), or before a `}` that closes the enclosing block.
    pub(crate) fn consume_expr_run(&mut self) {
        let mut depth = 0i32;
        let mut consumed = 0usize;
        let mut prev_significant: Option<&'a Token> = None;
        while let Some(tok) = self.tok() {
            match tok {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket => {
                    if depth == 0 && consumed > 0 {
                        return;
                    }
                    depth -= 1;
                }
                Token::RBrace => {
                    if depth == 0 {
                        if consumed == 0 {
                            // Stray closer; consume so the scan advances.
                            self.pos += 1;
                        }
                        return;
                    }
                    depth -= 1;
                }
                Token::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                Token::Newline if depth == 0 => {
                    let continues_before = matches!(
                        prev_significant,
                        Some(Token::Dot) | Some(Token::Comma) | Some(Token::Assign) | Some(Token::Arrow) | Some(Token::Op(_))
                    );
                    let continues_after = self.next_significant_is_dot();
                    if !(continues_before || continues_after) {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            if !matches!(tok, Token::Newline) {
                prev_significant = self.tokens.get(self.pos);
            }
            self.pos += 1;
            consumed += 1;
        }
    }

    fn next_significant_is_dot(&self) -> bool {
        let mut i = self.pos + 1;
        while let Some(tok) = self.tokens.get(i) {
            match tok {
                Token::Newline => i += 1,
                Token::Dot => return true,
                _ => return false,
            }
        }
        false
    }

    pub(crate) fn error_here(&mut self, message: &str) {
        let (line, column) = if let Some(span) = self.spans.get(self.pos) {
            (span.start.line - 1, span.start.column - 1)
        } else {
            // At EOF report on the last token's start line; a trailing
            // newline token *ends* past the final document line.
            let line = self.spans.last().map(|s| s.start.line.saturating_sub(1)).unwrap_or(0);
            (line, 0)
        };
        self.diags.push(Diagnostic::error(message, line, column));
    }

    /// Skip to the next statement separator, leaving it for the caller.
    pub(crate) fn recover_to_separator(&mut self) {
        while let Some(tok) = self.tok() {
            match tok {
                Token::Newline | Token::Semicolon | Token::RBrace => return,
                _ => self.pos += 1,
            }
        }
    }
}

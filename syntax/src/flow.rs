//! Conservative "does every path return" walk over statement blocks.
//!
//! The walk recognizes straight-line sequences, `if/else`, `switch` with an
//! explicit default, and `try/catch`. Loops may execute zero times, so they
//! never satisfy the requirement on their own. Any construct the walk does
//! not understand degrades to "does not guarantee a return".

use crate::ast::{Block, Stmt};

/// True when every path through the block reaches a `return` or `throw`.
pub fn always_returns(block: &Block) -> bool {
    block.stmts.iter().any(stmt_always_returns)
}

fn stmt_always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } | Stmt::Throw { .. } => true,
        Stmt::If { then, orelse, .. } => match orelse {
            Some(orelse) => always_returns(then) && always_returns(orelse),
            None => false,
        },
        Stmt::Switch { cases, default, .. } => match default {
            Some(default) => cases.iter().all(always_returns) && always_returns(default),
            None => false,
        },
        Stmt::Try { body, catches, finally, .. } => {
            let guarded = always_returns(body) && catches.iter().all(always_returns);
            guarded || finally.as_ref().is_some_and(always_returns)
        }
        Stmt::Block(inner) => always_returns(inner),
        Stmt::Loop { .. } | Stmt::Decl { .. } | Stmt::Expr { .. } => false,
    }
}

#[cfg(test)]
mod flow_test {
    use crate::parse;

    fn method_returns(src: &str) -> bool {
        let out = parse(src);
        let method = out
            .script
            .script_methods
            .first()
            .expect("expected a script method");
        super::always_returns(&method.body)
    }

    #[test]
    fn straight_line_return() {
        assert!(method_returns("String f() { return \"x\" }"));
    }

    #[test]
    fn if_without_else_falls_through() {
        assert!(!method_returns("String f() { if (cond) { return \"y\" } }"));
    }

    #[test]
    fn if_with_else_on_both_paths() {
        assert!(method_returns(
            "String f() {\n  if (cond) { return \"y\" } else { return \"n\" }\n}"
        ));
    }

    #[test]
    fn throw_counts_as_return() {
        assert!(method_returns("String f() { throw new IllegalStateException(\"bad\") }"));
    }

    #[test]
    fn loop_never_guarantees() {
        assert!(!method_returns("String f() { while (true) { return \"x\" } }"));
    }

    #[test]
    fn switch_requires_default() {
        assert!(!method_returns(
            "String f(x) { switch (x) { case 1: return \"a\" } }"
        ));
        assert!(method_returns(
            "String f(x) { switch (x) { case 1: return \"a\"\n default: return \"b\" } }"
        ));
    }

    #[test]
    fn try_needs_all_catches() {
        assert!(method_returns(
            "String f() { try { return \"a\" } catch (e) { return \"b\" } }"
        ));
        assert!(!method_returns(
            "String f() { try { return \"a\" } catch (e) { log(e) } }"
        ));
    }
}

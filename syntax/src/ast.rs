//! Syntax tree for a parsed Pipescript document.
//!
//! Every node carries 1-based start/end line numbers from the lexer spans.
//! The tree is deliberately shallow: expressions are not modeled beyond the
//! statement level, because the resolution engine works textually on the
//! original source and only needs structural containment and declaration
//! metadata from the tree.

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub classes: Vec<ClassDecl>,
    pub script_methods: Vec<MethodDecl>,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub start_line: u32,
    pub end_line: u32,
}

/// A class-body `Type name` (field) or `def name` (property) declaration.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub declared_type: Option<String>,
    pub is_property: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// `None` for `def`-declared (untyped) methods.
    pub return_type: Option<String>,
    pub params: Vec<Param>,
    pub body: Block,
    pub start_line: u32,
    pub end_line: u32,
}

impl MethodDecl {
    /// Parameters without a default value.
    pub fn required_param_count(&self) -> usize {
        self.params.iter().filter(|p| !p.has_default).count()
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub declared_type: Option<String>,
    pub has_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `def name = ...` or `Type name = ...` inside a body.
    Decl {
        name: String,
        declared_type: Option<String>,
        line: u32,
    },
    If {
        then: Block,
        orelse: Option<Block>,
        line: u32,
    },
    /// `while` and `for`; the distinction does not matter to the flow walk.
    Loop { body: Block, line: u32 },
    Switch {
        cases: Vec<Block>,
        default: Option<Block>,
        line: u32,
    },
    Try {
        body: Block,
        catches: Vec<Block>,
        finally: Option<Block>,
        line: u32,
    },
    Return { line: u32 },
    Throw { line: u32 },
    Block(Block),
    Expr { line: u32 },
}

impl Stmt {
    pub fn line(&self) -> u32 {
        match self {
            Stmt::Decl { line, .. }
            | Stmt::If { line, .. }
            | Stmt::Loop { line, .. }
            | Stmt::Switch { line, .. }
            | Stmt::Try { line, .. }
            | Stmt::Return { line }
            | Stmt::Throw { line }
            | Stmt::Expr { line } => *line,
            Stmt::Block(b) => b.start_line,
        }
    }
}

impl Script {
    /// Class whose body contains the given 1-based line.
    pub fn find_enclosing_class(&self, line: u32) -> Option<&ClassDecl> {
        self.classes
            .iter()
            .find(|c| line >= c.start_line && line <= c.end_line)
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Method of `class` whose body contains the given 1-based line.
    pub fn find_enclosing_method<'a>(&self, class: &'a ClassDecl, line: u32) -> Option<&'a MethodDecl> {
        class
            .methods
            .iter()
            .find(|m| line >= m.start_line && line <= m.end_line)
    }

    /// Script-level (top-of-file) method containing the given 1-based line.
    pub fn find_enclosing_script_method(&self, line: u32) -> Option<&MethodDecl> {
        self.script_methods
            .iter()
            .find(|m| line >= m.start_line && line <= m.end_line)
    }

    /// True when a 1-based line sits outside every class and script-method
    /// body, i.e. in script scope as far as the tree can tell.
    pub fn is_top_level_line(&self, line: u32) -> bool {
        self.find_enclosing_class(line).is_none() && self.find_enclosing_script_method(line).is_none()
    }
}

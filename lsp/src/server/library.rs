//! Index of sibling scripts in the workspace's shared library directory.
//! An unresolved bare call name falls back to this index, jumping into the
//! library script that declares a top-level method of that name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analyzer::{ParseResult, SymbolLocation};

const SCRIPT_EXTENSION: &str = "pps";

/// One indexed library script.
pub(crate) struct LibraryScript {
    pub(crate) path: PathBuf,
    /// Top-level and script-method names to their 0-based declaration sites.
    pub(crate) methods: HashMap<String, SymbolLocation>,
}

pub(crate) struct LibraryIndex {
    /// Keyed by script base name (file stem).
    scripts: HashMap<String, LibraryScript>,
}

impl LibraryIndex {
    /// Scan `root/library_dir` for scripts and index their top-level
    /// methods. Unreadable or unparsable files are skipped.
    pub(crate) fn build(root: &Path, library_dir: &str) -> Self {
        let mut scripts = HashMap::new();
        let dir = root.join(library_dir);
        let Ok(entries) = fs::read_dir(&dir) else {
            debug!("no library directory at {}", dir.display());
            return Self { scripts };
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            let methods = index_methods(&text);
            debug!("indexed library script {} ({} methods)", stem, methods.len());
            scripts.insert(stem, LibraryScript { path, methods });
        }
        Self { scripts }
    }

    /// Find a top-level method by name across every indexed script.
    pub(crate) fn find_method(&self, name: &str) -> Option<(&Path, &SymbolLocation)> {
        self.scripts
            .values()
            .find_map(|s| s.methods.get(name).map(|loc| (s.path.as_path(), loc)))
    }

    /// The script with the given base name, for `scriptName.method` jumps.
    pub(crate) fn script(&self, base_name: &str) -> Option<&LibraryScript> {
        self.scripts.get(base_name)
    }
}

fn index_methods(text: &str) -> HashMap<String, SymbolLocation> {
    let parsed = ParseResult::new(text);
    let mut methods = HashMap::new();
    for method in &parsed.script.script_methods {
        methods.insert(method.name.clone(), locate_method(&parsed, &method.name, method.start_line));
    }
    for class in &parsed.script.classes {
        for method in &class.methods {
            if method.name == class.name {
                continue;
            }
            methods
                .entry(method.name.clone())
                .or_insert_with(|| locate_method(&parsed, &method.name, method.start_line));
        }
    }
    methods
}

fn locate_method(parsed: &ParseResult, name: &str, start_line: u32) -> SymbolLocation {
    let line0 = start_line.saturating_sub(1) as usize;
    let line = parsed.line(line0);
    let column = line
        .find(name)
        .map(|b| line[..b].encode_utf16().count() as u32)
        .unwrap_or(0);
    SymbolLocation {
        line: line0 as u32,
        column,
        text: name.to_string(),
        kind: crate::analyzer::SymbolKind::Method,
    }
}

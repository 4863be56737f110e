use anyhow::Context;
use std::path::{Component, Path};

use crate::analyzer::Analyzer;

use super::analysis::to_lsp_diagnostics;

pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() <= 1 {
        return Ok(None);
    }

    if let Some(i) = args.iter().position(|a| a == "--analyze") {
        let mut path_index = i + 1;
        while path_index < args.len() && args[path_index].starts_with("--") {
            path_index += 1;
        }

        let path = args.get(path_index).cloned().ok_or_else(|| {
            anyhow::anyhow!(
                "Usage: pps-lsp --analyze [--errors-only] <relative-file-path>\n  --analyze <file>     : Full analysis with JSON output\n  --errors-only        : Show only errors in simple format"
            )
        })?;

        let errors_only = args.iter().any(|a| a == "--errors-only");
        let content = read_file_content(&path)?;

        let analyzer = Analyzer::new();
        let parsed = analyzer.parse(&content);
        let diagnostics = to_lsp_diagnostics(&parsed);

        if errors_only {
            let errors: Vec<String> = diagnostics
                .iter()
                .filter(|d| d.severity == Some(tower_lsp::lsp_types::DiagnosticSeverity::ERROR))
                .map(|d| {
                    format!(
                        "Line {}:{}: {}",
                        d.range.start.line + 1,
                        d.range.start.character + 1,
                        d.message
                    )
                })
                .collect();

            if errors.is_empty() {
                return Ok(Some("No errors found".to_string()));
            }
            return Ok(Some(errors.join("\n")));
        }

        let output = serde_json::json!({
            "diagnostics": diagnostics,
            "classes": parsed.script.classes.iter().map(|c| &c.name).collect::<Vec<_>>(),
            "scriptMethods": parsed.script.script_methods.iter().map(|m| &m.name).collect::<Vec<_>>(),
        });
        return Ok(Some(serde_json::to_string_pretty(&output)?));
    }

    Ok(None)
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }
    true
}

fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        anyhow::bail!("unsafe path: {path} (must be relative, without '..')");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

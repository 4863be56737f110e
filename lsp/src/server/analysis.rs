use std::sync::Arc;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};

use crate::analyzer::ParseResult;

use pps_syntax::Severity;

use super::state::PpsLanguageServer;

impl PpsLanguageServer {
    /// Cached parse of a document, computing and caching it on miss.
    pub(crate) fn get_or_compute_parse(&self, uri: &Url) -> Option<Arc<ParseResult>> {
        if let Some(doc) = self.documents.get(uri) {
            if let Some(cached) = doc.cached_parse.clone() {
                return Some(cached);
            }
        }

        let content = self.documents.get(uri)?.content.to_string();
        let parsed = {
            let analyzer = self.analyzer.lock().ok()?;
            Arc::new(analyzer.parse(&content))
        };
        if let Some(mut doc) = self.documents.get_mut(uri) {
            doc.cached_parse = Some(parsed.clone());
        }
        Some(parsed)
    }

    /// Publish the full diagnostic set for the current document version.
    pub(crate) async fn publish_diagnostics(&self, uri: Url, version: i32) {
        let diagnostics = match self.get_or_compute_parse(&uri) {
            Some(parsed) => to_lsp_diagnostics(&parsed),
            None => Vec::new(),
        };
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

pub(crate) fn to_lsp_diagnostics(parsed: &ParseResult) -> Vec<Diagnostic> {
    parsed
        .diagnostics
        .iter()
        .map(|d| {
            let pos = Position::new(d.line, d.column);
            Diagnostic {
                range: Range::new(pos, pos),
                severity: Some(match d.severity {
                    Severity::Error => DiagnosticSeverity::ERROR,
                    Severity::Warning => DiagnosticSeverity::WARNING,
                }),
                source: Some("pps".to_string()),
                message: d.message.clone(),
                ..Default::default()
            }
        })
        .collect()
}

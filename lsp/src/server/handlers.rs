use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::info;

use crate::analyzer::{scan, CompletionKind, SymbolLocation};

use super::analysis::to_lsp_diagnostics;
use super::library::LibraryIndex;
use super::state::{Document, PpsLanguageServer};
use super::text::{symbol_range, word_at};

static QUALIFIED_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*\.\s*([A-Za-z_]\w*)\s*\(").unwrap());

#[tower_lsp::async_trait]
impl LanguageServer for PpsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("Pipescript Language Server initializing with root: {:?}", params.root_uri);

        if let Some(root) = params.root_uri.as_ref().and_then(|u| u.to_file_path().ok()) {
            *self.workspace_root.lock().unwrap() = Some(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Documents are replaced wholesale on every change.
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                definition_provider: Some(OneOf::Left(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some("pps".to_string()),
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                    work_done_progress_options: Default::default(),
                })),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Pipescript Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Pipescript Language Server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "Pipescript Language Server started")
            .await;
        self.load_config().await;
        self.rebuild_library_index();
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Pipescript Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
        self.rebuild_library_index();
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version,
            cached_parse: None,
        };
        self.documents.insert(uri.clone(), document);
        self.publish_diagnostics(uri, version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = version;
            // Full sync: the last change event carries the whole text.
            if let Some(change) = params.content_changes.into_iter().last() {
                entry.content = Rope::from_str(&change.text);
            }
            entry.cached_parse = None;
        }

        self.publish_diagnostics(uri, version).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(parsed) = self.get_or_compute_parse(&uri) else {
            return Ok(None);
        };

        let local = {
            match self.analyzer.lock() {
                Ok(analyzer) => analyzer.find_definition(&parsed, position.line, position.character),
                Err(_) => None,
            }
        };
        if let Some(loc) = local {
            let location = Location::new(uri, symbol_range(&loc));
            return Ok(Some(GotoDefinitionResponse::Scalar(location)));
        }

        Ok(self
            .library_definition(&parsed.line(position.line as usize).to_string(), position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn diagnostic(&self, params: DocumentDiagnosticParams) -> Result<DocumentDiagnosticReportResult> {
        let uri = &params.text_document.uri;
        let items = self
            .get_or_compute_parse(uri)
            .map(|parsed| to_lsp_diagnostics(&parsed))
            .unwrap_or_default();

        Ok(DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
            RelatedFullDocumentDiagnosticReport {
                related_documents: None,
                full_document_diagnostic_report: FullDocumentDiagnosticReport {
                    result_id: None,
                    items,
                },
            },
        )))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(parsed) = self.get_or_compute_parse(uri) else {
            return Ok(None);
        };

        let entries = match self.analyzer.lock() {
            Ok(analyzer) => analyzer.completions(&parsed, position.line, position.character),
            Err(_) => Vec::new(),
        };
        if entries.is_empty() {
            return Ok(None);
        }

        let items = entries
            .into_iter()
            .map(|entry| {
                let range = Range::new(
                    Position::new(position.line, entry.replace_start),
                    Position::new(position.line, entry.replace_end),
                );
                CompletionItem {
                    label: entry.label.clone(),
                    kind: Some(match entry.kind {
                        CompletionKind::Method => CompletionItemKind::METHOD,
                        CompletionKind::Property => CompletionItemKind::PROPERTY,
                        CompletionKind::Field => CompletionItemKind::FIELD,
                    }),
                    detail: Some(entry.detail),
                    text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                        range,
                        new_text: entry.label,
                    })),
                    ..Default::default()
                }
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }
}

impl PpsLanguageServer {
    pub(crate) fn rebuild_library_index(&self) {
        let root = self.workspace_root.lock().unwrap().clone();
        let Some(root) = root else { return };
        let dir = self.config.lock().unwrap().library_dir.clone();
        let index = LibraryIndex::build(&root, &dir);
        *self.library.lock().unwrap() = Some(index);
    }

    /// Cross-file fallback: an unresolved bare call (or a call qualified by
    /// a library script's base name) jumps into the library index.
    fn library_definition(&self, line: &str, position: Position) -> Option<Location> {
        let word = word_at(line, position.character as usize)?;
        if scan::is_keyword(&word) {
            return None;
        }

        let library = self.library.lock().ok()?;
        let library = library.as_ref()?;

        for caps in QUALIFIED_CALL.captures_iter(line) {
            let (qual, method) = (caps.get(1)?, caps.get(2)?);
            if method.as_str() != word {
                continue;
            }
            if let Some(script) = library.script(qual.as_str()) {
                if let Some(loc) = script.methods.get(&word) {
                    return location_in_file(&script.path, loc);
                }
            }
        }

        // Only bare *calls* fall through to the library; a plain identifier
        // that failed local resolution stays unresolved.
        let call_re = Regex::new(&format!(r"\b{}\s*\(", regex::escape(&word))).ok()?;
        if !call_re.is_match(line) {
            return None;
        }
        let (path, loc) = library.find_method(&word)?;
        location_in_file(path, loc)
    }
}

fn location_in_file(path: &std::path::Path, loc: &SymbolLocation) -> Option<Location> {
    let uri = Url::from_file_path(path).ok()?;
    Some(Location::new(uri, symbol_range(loc)))
}

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

use crate::analyzer::{Analyzer, ParseResult};

use super::config::ServerConfig;
use super::library::LibraryIndex;

/// An open Pipescript document and its cached analysis.
#[derive(Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    pub(crate) cached_parse: Option<Arc<ParseResult>>,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct PpsLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) analyzer: Mutex<Analyzer>,
    pub(crate) config: Mutex<ServerConfig>,
    pub(crate) workspace_root: Mutex<Option<PathBuf>>,
    pub(crate) library: Mutex<Option<LibraryIndex>>,
}

impl PpsLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            analyzer: Mutex::new(Analyzer::new()),
            config: Mutex::new(ServerConfig::default()),
            workspace_root: Mutex::new(None),
            library: Mutex::new(None),
        }
    }
}

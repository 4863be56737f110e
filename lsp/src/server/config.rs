use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;

use crate::analyzer::DEFAULT_MAP_KEY_SCAN_WINDOW;

use super::state::PpsLanguageServer;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    /// Lookahead, in lines, for the relaxed map-key scan.
    pub(crate) map_key_scan_window: usize,
    /// Workspace-relative directory holding shared library scripts.
    pub(crate) library_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            map_key_scan_window: DEFAULT_MAP_KEY_SCAN_WINDOW,
            library_dir: "lib".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PpsLspConfigSection {
    #[serde(default)]
    map_key_scan_window: Option<usize>,
    #[serde(default)]
    library_dir: Option<String>,
}

impl PpsLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some("pipescript.lsp".to_string()),
        }];

        if let Ok(values) = self.client.configuration(items).await {
            if let Some(val) = values.into_iter().next() {
                if let Ok(cfg) = serde_json::from_value::<PpsLspConfigSection>(val) {
                    let mut guard = self.config.lock().unwrap();
                    if let Some(v) = cfg.map_key_scan_window.filter(|v| *v > 0) {
                        guard.map_key_scan_window = v;
                    }
                    if let Some(dir) = cfg.library_dir.filter(|d| !d.is_empty()) {
                        guard.library_dir = dir;
                    }
                    let window = guard.map_key_scan_window;
                    drop(guard);

                    if let Ok(mut analyzer) = self.analyzer.lock() {
                        analyzer.set_map_key_scan_window(window);
                    }
                }
            }
        }
    }
}

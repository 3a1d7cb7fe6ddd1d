//! Inserts vault items and literal text into the focused window.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::text_injector::TextInjector;
use crate::vault::VaultManager;

pub struct SnippetHandler {
    vault: Arc<VaultManager>,
    injector: Arc<dyn TextInjector>,
}

impl SnippetHandler {
    pub fn new(vault: Arc<VaultManager>, injector: Arc<dyn TextInjector>) -> Self {
        Self { vault, injector }
    }

    /// Type the value of vault item `item_id`. Returns false if the item does
    /// not exist or nothing could be inserted.
    pub fn insert_snippet(&self, item_id: &str) -> bool {
        match self.vault.find_item(item_id) {
            Some(item) => self.type_text(&item.value),
            None => {
                warn!(item_id, "Snippet not found");
                false
            }
        }
    }

    /// Type `text`, falling back to a clipboard paste if typing fails.
    pub fn type_text(&self, text: &str) -> bool {
        if text.is_empty() {
            debug!("Nothing to type");
            return false;
        }

        let typed = match self.injector.type_text(text) {
            Ok(()) => return true,
            Err(e) => e,
        };
        warn!(error = %typed, "Typing failed, falling back to clipboard paste");

        match self.injector.paste_text(text) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Clipboard paste failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StratumError};
    use parking_lot::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingInjector {
        fail_type: bool,
        fail_paste: bool,
        calls: Mutex<Vec<String>>,
    }

    impl TextInjector for RecordingInjector {
        fn delete_chars(&self, count: usize) -> Result<()> {
            self.calls.lock().push(format!("delete:{}", count));
            Ok(())
        }

        fn type_text(&self, text: &str) -> Result<()> {
            self.calls.lock().push(format!("type:{}", text));
            if self.fail_type {
                return Err(StratumError::Inject("typing blocked".to_string()));
            }
            Ok(())
        }

        fn paste_text(&self, text: &str) -> Result<()> {
            self.calls.lock().push(format!("paste:{}", text));
            if self.fail_paste {
                return Err(StratumError::Inject("no clipboard".to_string()));
            }
            Ok(())
        }
    }

    fn handler_with(injector: Arc<RecordingInjector>) -> (SnippetHandler, Arc<VaultManager>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let vault = Arc::new(VaultManager::new(dir.path().join("vault.json")));
        vault.load().unwrap();
        let handler = SnippetHandler::new(Arc::clone(&vault), injector);
        (handler, vault, dir)
    }

    #[test]
    fn inserts_vault_item_value() {
        let injector = Arc::new(RecordingInjector::default());
        let (handler, vault, _dir) = handler_with(Arc::clone(&injector));
        let id = vault.add_item("sig", "Best regards", "snippets", "snippet").unwrap();

        assert!(handler.insert_snippet(&id));
        assert_eq!(*injector.calls.lock(), vec!["type:Best regards"]);
    }

    #[test]
    fn unknown_item_is_false() {
        let injector = Arc::new(RecordingInjector::default());
        let (handler, _vault, _dir) = handler_with(Arc::clone(&injector));
        assert!(!handler.insert_snippet("missing"));
        assert!(injector.calls.lock().is_empty());
    }

    #[test]
    fn empty_text_is_false() {
        let injector = Arc::new(RecordingInjector::default());
        let (handler, _vault, _dir) = handler_with(Arc::clone(&injector));
        assert!(!handler.type_text(""));
        assert!(injector.calls.lock().is_empty());
    }

    #[test]
    fn typing_failure_falls_back_to_paste() {
        let injector = Arc::new(RecordingInjector {
            fail_type: true,
            ..Default::default()
        });
        let (handler, _vault, _dir) = handler_with(Arc::clone(&injector));

        assert!(handler.type_text("héllo"));
        assert_eq!(*injector.calls.lock(), vec!["type:héllo", "paste:héllo"]);
    }

    #[test]
    fn both_paths_failing_is_false() {
        let injector = Arc::new(RecordingInjector {
            fail_type: true,
            fail_paste: true,
            ..Default::default()
        });
        let (handler, _vault, _dir) = handler_with(Arc::clone(&injector));
        assert!(!handler.type_text("x"));
    }
}

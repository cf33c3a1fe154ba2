use importer_engine::{Clipboard, ClipboardError};

/// System clipboard through `arboard`. A fresh handle is opened per write.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

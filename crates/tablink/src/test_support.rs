//! Shared fixtures for tests.

use std::sync::Arc;
use std::time::Duration;

use tablink_core::LinkConfig;
use tablink_core::testing::{ManualEditor, ScriptedModel, StaticHost};

use crate::{Orchestrator, Registry};

/// Debounce window of every scripted model built by [`Fixture`].
pub(crate) const INTERVAL: Duration = Duration::from_millis(50);

pub(crate) struct Fixture {
    pub editor: Arc<ManualEditor>,
    pub host: Arc<StaticHost>,
    pub registry: Registry<ScriptedModel>,
}

impl Fixture {
    /// Editor mounted under the default id, default config.
    pub fn new() -> Self {
        let editor = ManualEditor::new("root\n  child\n");
        let host = StaticHost::with_editor("editor", Arc::clone(&editor));
        Self::build(editor, host, LinkConfig::default())
    }

    /// Nothing mounted yet; mount `fx.editor` on `fx.host` when needed.
    pub fn without_editor(config: LinkConfig) -> Self {
        let editor = ManualEditor::new("");
        let host = StaticHost::empty(config.editor_id.clone());
        Self::build(editor, host, config)
    }

    fn build(editor: Arc<ManualEditor>, host: Arc<StaticHost>, config: LinkConfig) -> Self {
        let registry = Registry::new(
            config,
            Arc::clone(&host) as Arc<dyn tablink_core::EditorHost>,
            Arc::clone(&editor) as Arc<dyn tablink_core::EditorText>,
            || ScriptedModel::new(INTERVAL),
        )
        .expect("valid test config");

        Self {
            editor,
            host,
            registry,
        }
    }

    pub async fn link(&self) -> Orchestrator<ScriptedModel> {
        self.registry.create().await.expect("create link")
    }
}

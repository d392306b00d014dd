//! In-memory collaborators for tests.
//!
//! - [`ManualEditor`]: editor widget and text accessor driven by hand
//! - [`StaticHost`]: host with at most one mounted editor
//! - [`ScriptedModel`]: model whose activity is scripted against the tokio clock

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::editor::{EditorHost, EditorText, EditorWidget, InputHandler};
use crate::model::{Model, ModelError, ModelState};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Editor whose text and input events are driven by the test.
#[derive(Default)]
pub struct ManualEditor {
    text: Mutex<String>,
    handler: Mutex<Option<InputHandler>>,
    attached: AtomicUsize,
    detached: AtomicUsize,
}

impl ManualEditor {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: Mutex::new(text.into()),
            ..Default::default()
        })
    }

    /// Replace the text and fire the input hook, like a keystroke would.
    pub fn type_text(&self, text: impl Into<String>) {
        *lock(&self.text) = text.into();
        let handler = lock(&self.handler).clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Whether an input hook is installed
    pub fn has_handler(&self) -> bool {
        lock(&self.handler).is_some()
    }

    /// Number of times a handler was installed
    pub fn attach_count(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of times the hook was cleared
    pub fn detach_count(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

impl EditorWidget for ManualEditor {
    fn set_on_input(&self, handler: Option<InputHandler>) {
        let counter = if handler.is_some() {
            &self.attached
        } else {
            &self.detached
        };
        counter.fetch_add(1, Ordering::SeqCst);
        *lock(&self.handler) = handler;
    }
}

impl EditorText for ManualEditor {
    fn get_text(&self) -> String {
        lock(&self.text).clone()
    }
}

/// Host with at most one mounted editor, found under a fixed id.
pub struct StaticHost {
    id: String,
    editor: Mutex<Option<Arc<ManualEditor>>>,
}

impl StaticHost {
    /// Host with `editor` mounted under `id`
    pub fn with_editor(id: impl Into<String>, editor: Arc<ManualEditor>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            editor: Mutex::new(Some(editor)),
        })
    }

    /// Host with nothing mounted yet
    pub fn empty(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            editor: Mutex::new(None),
        })
    }

    pub fn mount(&self, editor: Arc<ManualEditor>) {
        *lock(&self.editor) = Some(editor);
    }

    pub fn unmount(&self) {
        *lock(&self.editor) = None;
    }
}

impl EditorHost for StaticHost {
    fn find_editor(&self, id: &str) -> Option<Arc<dyn EditorWidget>> {
        if id != self.id {
            return None;
        }
        lock(&self.editor)
            .clone()
            .map(|editor| editor as Arc<dyn EditorWidget>)
    }
}

/// Model whose activity is scripted by the test.
///
/// Activity is measured against the tokio clock, so paused-time tests can say
/// "busy for 100ms" and get exact timings.
pub struct ScriptedModel {
    update_interval: Duration,
    busy_until: Mutex<Option<Instant>>,
    stalled: AtomicBool,
    fail_uncache: AtomicBool,
    last_text: Mutex<String>,
    updates: Mutex<Vec<(Instant, String)>>,
    interrupts: AtomicUsize,
    uncaches: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(update_interval: Duration) -> Self {
        Self {
            update_interval,
            busy_until: Mutex::new(None),
            stalled: AtomicBool::new(false),
            fail_uncache: AtomicBool::new(false),
            last_text: Mutex::new(String::new()),
            updates: Mutex::new(Vec::new()),
            interrupts: AtomicUsize::new(0),
            uncaches: AtomicUsize::new(0),
        }
    }

    /// Stay active for `duration` from now, then go idle.
    pub fn busy_for(&self, duration: Duration) {
        *lock(&self.busy_until) = Some(Instant::now() + duration);
    }

    /// Stay active until [`settle`](Self::settle) is called.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    /// Go idle immediately.
    pub fn settle(&self) {
        self.stalled.store(false, Ordering::SeqCst);
        *lock(&self.busy_until) = None;
    }

    /// Make `uncache` fail.
    pub fn fail_uncache(&self, fail: bool) {
        self.fail_uncache.store(fail, Ordering::SeqCst);
    }

    /// Every update so far, with the instant it started.
    pub fn updates(&self) -> Vec<(Instant, String)> {
        lock(&self.updates).clone()
    }

    pub fn interrupt_count(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    pub fn uncache_count(&self) -> usize {
        self.uncaches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Model for ScriptedModel {
    type Output = ModelState<usize>;

    fn update_interval(&self) -> Duration {
        self.update_interval
    }

    fn is_active(&self) -> bool {
        if self.stalled.load(Ordering::SeqCst) {
            return true;
        }
        lock(&self.busy_until).is_some_and(|until| Instant::now() < until)
    }

    async fn update(&self, text: String) -> Result<Self::Output, ModelError> {
        lock(&self.updates).push((Instant::now(), text.clone()));
        let old_text = std::mem::replace(&mut *lock(&self.last_text), text.clone());
        let lines = text.lines().count();
        Ok(ModelState::new(old_text, text, lines))
    }

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }

    async fn uncache(&self) -> Result<(), ModelError> {
        if self.fail_uncache.load(Ordering::SeqCst) {
            return Err(ModelError::failed("cache is locked"));
        }
        self.uncaches.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_text) = String::new();
        Ok(())
    }
}

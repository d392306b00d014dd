//! Editor collaborator contracts.
//!
//! - [`EditorText`]: synchronous read of the current editor contents
//! - [`EditorWidget`]: the widget's single input hook
//! - [`EditorHost`]: environment lookup of widgets by id
//! - [`EditorSlot`]: lazily resolved back-reference to the widget

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::error::{Error, Result};

/// Callback installed on the editor's input hook.
pub type InputHandler = Arc<dyn Fn() + Send + Sync>;

/// Read access to the editor contents.
pub trait EditorText: Send + Sync {
    /// Current editor text. Must not have side effects.
    fn get_text(&self) -> String;
}

/// The editor widget as seen by the link.
pub trait EditorWidget: Send + Sync {
    /// Replace the input hook. `None` clears it.
    fn set_on_input(&self, handler: Option<InputHandler>);
}

/// Environment that owns editor widgets.
pub trait EditorHost: Send + Sync {
    /// Look up a widget by its fixed id.
    fn find_editor(&self, id: &str) -> Option<Arc<dyn EditorWidget>>;
}

/// Lazily resolved, re-resolvable reference to the editor widget.
///
/// Holds the widget weakly: the host owns it. When the cached widget is gone
/// (or was never found) the next [`resolve`](Self::resolve) asks the host again.
pub struct EditorSlot {
    id: String,
    host: Arc<dyn EditorHost>,
    cached: Mutex<Option<Weak<dyn EditorWidget>>>,
}

impl EditorSlot {
    /// Create a slot for the widget with the given id
    pub fn new(id: impl Into<String>, host: Arc<dyn EditorHost>) -> Self {
        Self {
            id: id.into(),
            host,
            cached: Mutex::new(None),
        }
    }

    /// Id the widget is looked up by
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the widget, or [`Error::EditorUnavailable`] if the host has none.
    pub fn resolve(&self) -> Result<Arc<dyn EditorWidget>> {
        self.try_resolve()?
            .ok_or_else(|| Error::EditorUnavailable(self.id.clone()))
    }

    /// Return the widget if the host currently has one.
    pub fn try_resolve(&self) -> Result<Option<Arc<dyn EditorWidget>>> {
        let mut cached = self.cached.lock().map_err(|_| Error::LockPoisoned)?;

        if let Some(editor) = cached.as_ref().and_then(Weak::upgrade) {
            return Ok(Some(editor));
        }

        let found = self.host.find_editor(&self.id);
        match &found {
            Some(editor) => {
                debug!(editor_id = %self.id, "Resolved editor widget");
                *cached = Some(Arc::downgrade(editor));
            }
            None => *cached = None,
        }
        Ok(found)
    }
}

impl fmt::Debug for EditorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSlot").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Widget;

    impl EditorWidget for Widget {
        fn set_on_input(&self, _handler: Option<InputHandler>) {}
    }

    #[derive(Default)]
    struct Host {
        widget: Mutex<Option<Arc<dyn EditorWidget>>>,
        lookups: AtomicUsize,
    }

    impl Host {
        fn mount(&self) -> Arc<dyn EditorWidget> {
            let widget: Arc<dyn EditorWidget> = Arc::new(Widget);
            *self.widget.lock().unwrap() = Some(Arc::clone(&widget));
            widget
        }

        fn unmount(&self) {
            *self.widget.lock().unwrap() = None;
        }
    }

    impl EditorHost for Host {
        fn find_editor(&self, id: &str) -> Option<Arc<dyn EditorWidget>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if id != "editor" {
                return None;
            }
            self.widget.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_resolve_missing_editor() {
        let host = Arc::new(Host::default());
        let slot = EditorSlot::new("editor", host);

        let err = slot.resolve().err().unwrap();
        assert_eq!(err, Error::EditorUnavailable("editor".into()));
        assert!(slot.try_resolve().unwrap().is_none());
    }

    #[test]
    fn test_resolve_caches_widget() {
        let host = Arc::new(Host::default());
        let widget = host.mount();
        let slot = EditorSlot::new("editor", Arc::clone(&host) as Arc<dyn EditorHost>);

        let first = slot.resolve().unwrap();
        let second = slot.resolve().unwrap();

        assert!(Arc::ptr_eq(&first, &widget));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(host.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_again_after_remount() {
        let host = Arc::new(Host::default());
        let slot = EditorSlot::new("editor", Arc::clone(&host) as Arc<dyn EditorHost>);
        assert!(slot.resolve().is_err());

        let widget = host.mount();
        assert!(Arc::ptr_eq(&slot.resolve().unwrap(), &widget));

        // Old widget dropped, new one mounted
        host.unmount();
        drop(widget);
        let remounted = host.mount();
        assert!(Arc::ptr_eq(&slot.resolve().unwrap(), &remounted));
        assert_eq!(host.lookups.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_slot_id() {
        let slot = EditorSlot::new("sidebar", Arc::new(Host::default()));
        assert_eq!(slot.id(), "sidebar");
        assert!(slot.resolve().is_err());
    }
}

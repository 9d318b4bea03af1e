//! In-memory document implementing [`TargetSurface`].
//!
//! Elements are addressed by the exact selector they were registered
//! under; a comma-separated selector list matches the first registered
//! element (in insertion order) named by any alternative, mirroring
//! `querySelector` on a selector group. Every capability call is recorded
//! in a journal so rehearsals and tests can inspect what a run did.

use std::time::Duration;

use async_trait::async_trait;
use formpilot_core_types::{ElementId, SurfaceError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::ports::{KeyPhase, ScrollBehavior, TargetSurface};

/// Side effect observed by the surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    Click { selector: String },
    Focus { selector: String },
    SetValue { selector: String, value: String },
    Key { selector: String, key: String, phase: KeyPhase },
    Scroll { x: f64, y: f64, behavior: ScrollBehavior },
    Highlight { selector: String, duration_ms: u64 },
}

/// Declarative page description used to seed a [`MemorySurface`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub elements: Vec<ElementFixture>,

    /// Selector of the element that starts focused
    pub focused: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementFixture {
    pub selector: String,

    #[serde(default)]
    pub value: String,

    /// Element only becomes queryable this long after the page is built
    #[serde(default)]
    pub appear_after_ms: u64,
}

#[derive(Debug)]
struct ElementState {
    id: ElementId,
    selector: String,
    value: String,
    visible_from: Instant,
}

#[derive(Debug, Default)]
struct Document {
    elements: Vec<ElementState>,
    active: Option<ElementId>,
    scroll: (f64, f64),
    journal: Vec<SurfaceEvent>,
    queries: usize,
    next_id: u64,
}

impl Document {
    fn element(&self, id: &ElementId) -> Result<&ElementState, SurfaceError> {
        self.elements
            .iter()
            .find(|el| &el.id == id)
            .ok_or_else(|| SurfaceError::Detached(id.to_string()))
    }

    fn element_mut(&mut self, id: &ElementId) -> Result<&mut ElementState, SurfaceError> {
        self.elements
            .iter_mut()
            .find(|el| &el.id == id)
            .ok_or_else(|| SurfaceError::Detached(id.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    doc: Mutex<Document>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let surface = Self::new();
        for element in &fixture.elements {
            surface.add_element_after(
                &element.selector,
                &element.value,
                Duration::from_millis(element.appear_after_ms),
            );
        }
        if let Some(selector) = &fixture.focused {
            surface.set_focused(selector);
        }
        surface
    }

    /// Builder-style helper for tests.
    pub fn with_element(self, selector: &str) -> Self {
        self.add_element(selector, "");
        self
    }

    pub fn add_element(&self, selector: &str, value: &str) -> ElementId {
        self.add_element_after(selector, value, Duration::ZERO)
    }

    pub fn add_element_after(&self, selector: &str, value: &str, delay: Duration) -> ElementId {
        let mut doc = self.doc.lock();
        doc.next_id += 1;
        let id = ElementId::new(format!("el-{}", doc.next_id));
        doc.elements.push(ElementState {
            id: id.clone(),
            selector: selector.to_string(),
            value: value.to_string(),
            visible_from: Instant::now() + delay,
        });
        id
    }

    pub fn remove_element(&self, selector: &str) {
        let mut doc = self.doc.lock();
        doc.elements.retain(|el| el.selector != selector);
        let active_alive = doc
            .active
            .as_ref()
            .map(|id| doc.elements.iter().any(|el| &el.id == id))
            .unwrap_or(false);
        if !active_alive {
            doc.active = None;
        }
    }

    /// Focus an element directly, without journaling it.
    pub fn set_focused(&self, selector: &str) {
        let mut doc = self.doc.lock();
        let id = doc
            .elements
            .iter()
            .find(|el| el.selector == selector)
            .map(|el| el.id.clone());
        doc.active = id;
    }

    pub fn journal(&self) -> Vec<SurfaceEvent> {
        self.doc.lock().journal.clone()
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.doc
            .lock()
            .elements
            .iter()
            .find(|el| el.selector == selector)
            .map(|el| el.value.clone())
    }

    pub fn focused_selector(&self) -> Option<String> {
        let doc = self.doc.lock();
        let active = doc.active.as_ref()?;
        doc.element(active).ok().map(|el| el.selector.clone())
    }

    pub fn selector_of(&self, element: &ElementId) -> Option<String> {
        self.doc
            .lock()
            .element(element)
            .ok()
            .map(|el| el.selector.clone())
    }

    pub fn scroll_position(&self) -> (f64, f64) {
        self.doc.lock().scroll
    }

    /// Number of `query_selector` calls served so far.
    pub fn query_count(&self) -> usize {
        self.doc.lock().queries
    }

    fn record(&self, doc: &mut Document, event: SurfaceEvent) {
        debug!(?event, "surface event");
        doc.journal.push(event);
    }
}

#[async_trait]
impl TargetSurface for MemorySurface {
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SurfaceError> {
        let mut doc = self.doc.lock();
        doc.queries += 1;
        let now = Instant::now();
        let alternatives: Vec<&str> = selector.split(',').map(str::trim).collect();
        Ok(doc
            .elements
            .iter()
            .filter(|el| el.visible_from <= now)
            .find(|el| alternatives.contains(&el.selector.as_str()))
            .map(|el| el.id.clone()))
    }

    async fn active_element(&self) -> Result<Option<ElementId>, SurfaceError> {
        Ok(self.doc.lock().active.clone())
    }

    async fn click(&self, element: &ElementId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        let selector = doc.element(element)?.selector.clone();
        self.record(&mut doc, SurfaceEvent::Click { selector });
        Ok(())
    }

    async fn focus(&self, element: &ElementId) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        let selector = doc.element(element)?.selector.clone();
        doc.active = Some(element.clone());
        self.record(&mut doc, SurfaceEvent::Focus { selector });
        Ok(())
    }

    async fn read_value(&self, element: &ElementId) -> Result<String, SurfaceError> {
        Ok(self.doc.lock().element(element)?.value.clone())
    }

    async fn set_value(&self, element: &ElementId, text: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        let state = doc.element_mut(element)?;
        state.value = text.to_string();
        let selector = state.selector.clone();
        self.record(
            &mut doc,
            SurfaceEvent::SetValue {
                selector,
                value: text.to_string(),
            },
        );
        Ok(())
    }

    async fn dispatch_key(
        &self,
        element: &ElementId,
        key: &str,
        phase: KeyPhase,
    ) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        let selector = doc.element(element)?.selector.clone();
        self.record(
            &mut doc,
            SurfaceEvent::Key {
                selector,
                key: key.to_string(),
                phase,
            },
        );
        Ok(())
    }

    async fn scroll_by(
        &self,
        x: f64,
        y: f64,
        behavior: ScrollBehavior,
    ) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        doc.scroll.0 += x;
        doc.scroll.1 += y;
        self.record(&mut doc, SurfaceEvent::Scroll { x, y, behavior });
        Ok(())
    }

    async fn apply_transient_style(
        &self,
        element: &ElementId,
        duration_ms: u64,
    ) -> Result<(), SurfaceError> {
        let mut doc = self.doc.lock();
        let selector = doc.element(element)?.selector.clone();
        self.record(
            &mut doc,
            SurfaceEvent::Highlight {
                selector,
                duration_ms,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn selector_groups_match_first_registered_element() {
        let surface = MemorySurface::new();
        surface.add_element("textarea", "");
        surface.add_element("input", "");

        let found = surface.query_selector("input, textarea").await.unwrap();
        assert_eq!(
            found.and_then(|id| surface.selector_of(&id)).as_deref(),
            Some("textarea")
        );
    }

    #[tokio::test]
    async fn removed_elements_become_detached() {
        let surface = MemorySurface::new();
        let id = surface.add_element("#gone", "x");
        surface.remove_element("#gone");

        assert_eq!(
            surface.click(&id).await,
            Err(SurfaceError::Detached(id.to_string()))
        );
        assert!(surface.journal().is_empty());
    }

    #[tokio::test]
    async fn fixture_seeds_values_and_focus() {
        let fixture: PageFixture = serde_yaml::from_str(
            "elements:\n  - selector: '#q'\n    value: seed\n  - selector: '#late'\n    appear_after_ms: 1000\nfocused: '#q'\n",
        )
        .unwrap();
        let surface = MemorySurface::from_fixture(&fixture);

        assert_eq!(surface.value_of("#q").as_deref(), Some("seed"));
        assert_eq!(surface.focused_selector().as_deref(), Some("#q"));
        assert!(surface.query_selector("#late").await.unwrap().is_none());
    }
}

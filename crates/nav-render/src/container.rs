//! Surface that holds the visible views

use crate::view::View;
use std::fmt;

/// Stack-less holder of the views currently on screen
///
/// Normally holds a single view. Change handlers record each animation
/// step as a frame so the swap can be inspected after the fact.
#[derive(Default)]
pub struct ViewContainer {
    views: Vec<Box<dyn View>>,
    frames: Vec<String>,
}

impl ViewContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_view(&mut self, view: Box<dyn View>) {
        self.views.push(view);
    }

    /// Remove and return the top-most view
    pub fn take_current(&mut self) -> Option<Box<dyn View>> {
        self.views.pop()
    }

    pub fn current(&self) -> Option<&dyn View> {
        self.views.last().map(|view| view.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut Box<dyn View>> {
        self.views.last_mut()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Drop every view
    pub fn clear(&mut self) {
        self.views.clear();
        self.frames.push("clear".to_string());
    }

    pub fn record_frame(&mut self, frame: impl Into<String>) {
        self.frames.push(frame.into());
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn take_frames(&mut self) -> Vec<String> {
        std::mem::take(&mut self.frames)
    }

    /// Rendered content of the top-most view, empty when nothing is shown
    pub fn render(&self) -> String {
        self.current().map(|view| view.render()).unwrap_or_default()
    }
}

impl fmt::Debug for ViewContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewContainer")
            .field("views", &self.views.iter().map(|view| view.name()).collect::<Vec<_>>())
            .field("frames", &self.frames.len())
            .finish()
    }
}

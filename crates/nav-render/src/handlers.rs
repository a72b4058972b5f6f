//! Swaps between the outgoing and incoming view

use crate::container::ViewContainer;
use crate::key::ChangeStyle;
use crate::view::View;
use nav_core::Direction;
use std::time::Duration;

/// Performs one view swap on a container
///
/// `previous` has already been taken out of the container; the caller puts
/// it back if the swap fails. After the call the container must show `new`.
pub trait ChangeHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// How long the swap animates before the change may complete
    fn duration(&self) -> Duration;

    fn perform_change(
        &self,
        container: &mut ViewContainer,
        previous: &dyn View,
        new: Box<dyn View>,
        direction: Direction,
    ) -> anyhow::Result<()>;
}

impl dyn ChangeHandler {
    /// Built-in handler for a change style
    pub fn for_style(style: ChangeStyle) -> &'static dyn ChangeHandler {
        match style {
            ChangeStyle::Instant => &InstantChangeHandler,
            ChangeStyle::Fade => &FadeChangeHandler,
            ChangeStyle::Horizontal => &HorizontalChangeHandler,
        }
    }
}

/// Swaps views without animation
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantChangeHandler;

impl ChangeHandler for InstantChangeHandler {
    fn name(&self) -> &'static str {
        "instant"
    }

    fn duration(&self) -> Duration {
        Duration::ZERO
    }

    fn perform_change(
        &self,
        container: &mut ViewContainer,
        previous: &dyn View,
        new: Box<dyn View>,
        _direction: Direction,
    ) -> anyhow::Result<()> {
        container.record_frame(format!("swap {} -> {}", previous.name(), new.name()));
        container.add_view(new);
        Ok(())
    }
}

/// Fades the old view out, then the new one in
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeChangeHandler;

impl ChangeHandler for FadeChangeHandler {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn duration(&self) -> Duration {
        Duration::from_millis(200)
    }

    fn perform_change(
        &self,
        container: &mut ViewContainer,
        previous: &dyn View,
        new: Box<dyn View>,
        _direction: Direction,
    ) -> anyhow::Result<()> {
        container.record_frame(format!("fade out {}", previous.name()));
        container.record_frame(format!("fade in {}", new.name()));
        container.add_view(new);
        Ok(())
    }
}

/// Slides both views sideways; backward changes slide the other way
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalChangeHandler;

impl ChangeHandler for HorizontalChangeHandler {
    fn name(&self) -> &'static str {
        "horizontal"
    }

    fn duration(&self) -> Duration {
        Duration::from_millis(300)
    }

    fn perform_change(
        &self,
        container: &mut ViewContainer,
        previous: &dyn View,
        new: Box<dyn View>,
        direction: Direction,
    ) -> anyhow::Result<()> {
        let (out_side, in_side) = match direction {
            Direction::Backward => ("right", "left"),
            Direction::Forward | Direction::Replace => ("left", "right"),
        };
        container.record_frame(format!("slide {} out to the {}", previous.name(), out_side));
        container.record_frame(format!("slide {} in from the {}", new.name(), in_side));
        container.add_view(new);
        Ok(())
    }
}

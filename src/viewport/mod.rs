//! Viewport state for an interactive canvas: the zoom scale and the pan
//! offset that place a computed layout on screen.
//!
//! Both services are plain owned values driven by the embedding UI loop.
//! Changes are pushed to subscribers registered through [`Subject`].

mod panner;
mod zoom;

pub use panner::{PannerService, PanningState, PanningUpdate, PointerButton, WheelEvent};
pub use zoom::ZoomingService;

use std::fmt;

use serde::Serialize;

use crate::layout::Point;

/// Visible size of the canvas host, header included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Maps layout coordinates to screen coordinates:
/// `screen = layout * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasTransform {
    pub offset: Point,
    pub scale: f32,
}

impl CanvasTransform {
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    /// Value for an SVG `transform` attribute.
    pub fn to_svg_transform(&self) -> String {
        format!(
            "translate({:.2} {:.2}) scale({:.4})",
            self.offset.x, self.offset.y, self.scale
        )
    }
}

/// Handle returned by [`Subject::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callbacks notified with every published value.
pub struct Subject<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, value: &T) {
        for (_, callback) in &mut self.subscribers {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subject = Subject::new();
        let sink = Rc::clone(&seen);
        let id = subject.subscribe(move |v: &i32| sink.borrow_mut().push(*v));
        subject.publish(&1);
        assert!(subject.unsubscribe(id));
        assert!(!subject.unsubscribe(id));
        subject.publish(&2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert!(subject.is_empty());
    }

    #[test]
    fn transform_scales_then_translates() {
        let transform = CanvasTransform {
            offset: Point::new(10.0, 20.0),
            scale: 0.5,
        };
        assert_eq!(transform.apply(Point::new(100.0, 40.0)), Point::new(60.0, 40.0));
        assert_eq!(
            transform.to_svg_transform(),
            "translate(10.00 20.00) scale(0.5000)"
        );
    }
}

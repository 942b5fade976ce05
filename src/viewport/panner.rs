use std::time::{Duration, Instant};

use crate::config::ViewportConfig;
use crate::layout::{FlowDrawer, Point};

use super::{CanvasTransform, Subject, SubscriptionId, Viewport, ZoomingService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f32,
    pub delta_y: f32,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

impl WheelEvent {
    pub fn new(delta_x: f32, delta_y: f32) -> Self {
        Self {
            delta_x,
            delta_y,
            ctrl_key: false,
            meta_key: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanningState {
    Idle,
    /// A drag is in progress; `last_pointer` is the baseline for the next
    /// move delta.
    Panning { last_pointer: Point },
}

/// Published whenever the pan offset moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanningUpdate {
    pub offset: Point,
    /// Pointer position that produced the update, if it came from a drag.
    pub pointer: Option<Point>,
}

/// Pan offset of the canvas and the gestures that move it.
#[derive(Debug)]
pub struct PannerService {
    config: ViewportConfig,
    state: PanningState,
    last_panning_offset: Point,
    touchpad_panning: bool,
    last_wheel_at: Option<Instant>,
    changes: Subject<PanningUpdate>,
}

impl PannerService {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            config: config.clone(),
            state: PanningState::Idle,
            last_panning_offset: Point::default(),
            touchpad_panning: false,
            last_wheel_at: None,
            changes: Subject::new(),
        }
    }

    pub fn state(&self) -> PanningState {
        self.state
    }

    pub fn offset(&self) -> Point {
        self.last_panning_offset
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, PanningState::Panning { .. })
    }

    pub fn is_touchpad_panning(&self) -> bool {
        self.touchpad_panning
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PanningUpdate) + 'static) -> SubscriptionId {
        self.changes.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }

    /// Scale and offset that bring `layout` into view.
    ///
    /// With `reset_zoom` the flow height used for the scale is capped at twice
    /// the canvas height, so very tall flows keep a legible zoom and are
    /// top-aligned instead of shrunk to fit.
    pub fn set_canvas_transform(
        &mut self,
        zooming: &mut ZoomingService,
        layout: &FlowDrawer<'_>,
        viewport: Viewport,
        reset_zoom: bool,
    ) -> CanvasTransform {
        let config = &self.config;
        let bbox = layout.bounding_box();
        let margin_above = config.top_margin + config.widget_space_above;
        let flow_height = bbox.height + margin_above + config.widget_space_below;
        let canvas_height = (viewport.height - config.header_height).max(1.0);
        let effective_height = if reset_zoom {
            flow_height.min(2.0 * canvas_height)
        } else {
            flow_height
        };
        let scale = zooming.set_scale((canvas_height / effective_height).min(config.fit_max_zoom));

        let scaled_height = flow_height * scale;
        let free_space = (canvas_height - scaled_height).max(0.0);
        let offset_y =
            config.header_height + free_space / 2.0 + (margin_above - bbox.min_y) * scale;
        let trigger_center = layout
            .steps
            .first()
            .map_or(0.0, |s| s.x + layout.card_width() / 2.0);
        let offset_x = viewport.width / 2.0 - trigger_center * scale;

        let transform = CanvasTransform {
            offset: Point::new(offset_x, offset_y),
            scale,
        };
        tracing::debug!(
            reset_zoom,
            scale,
            offset_x,
            offset_y,
            flow_height,
            canvas_height,
            "canvas transform"
        );
        self.state = PanningState::Idle;
        self.last_panning_offset = transform.offset;
        self.changes.publish(&PanningUpdate {
            offset: transform.offset,
            pointer: None,
        });
        transform
    }

    pub fn fit_to_screen(
        &mut self,
        zooming: &mut ZoomingService,
        layout: &FlowDrawer<'_>,
        viewport: Viewport,
    ) -> CanvasTransform {
        self.set_canvas_transform(zooming, layout, viewport, false)
    }

    pub fn reset_zoom(
        &mut self,
        zooming: &mut ZoomingService,
        layout: &FlowDrawer<'_>,
        viewport: Viewport,
    ) -> CanvasTransform {
        self.set_canvas_transform(zooming, layout, viewport, true)
    }

    /// Starts a drag unless a step is being dragged or the button does not
    /// pan. Returns whether panning started.
    pub fn mouse_down(
        &mut self,
        pointer: Point,
        button: PointerButton,
        dragging_step: bool,
    ) -> bool {
        if dragging_step || button == PointerButton::Secondary {
            return false;
        }
        tracing::trace!(x = pointer.x, y = pointer.y, "panning started");
        self.state = PanningState::Panning {
            last_pointer: pointer,
        };
        true
    }

    /// Moves the canvas by the pointer delta while panning.
    pub fn mouse_move(&mut self, pointer: Point) -> Option<Point> {
        let PanningState::Panning { last_pointer } = self.state else {
            return None;
        };
        let offset = self
            .last_panning_offset
            .offset(pointer.x - last_pointer.x, pointer.y - last_pointer.y);
        self.last_panning_offset = offset;
        self.state = PanningState::Panning {
            last_pointer: pointer,
        };
        self.changes.publish(&PanningUpdate {
            offset,
            pointer: Some(pointer),
        });
        Some(offset)
    }

    pub fn mouse_up(&mut self) {
        if self.is_panning() {
            tracing::trace!("panning ended");
        }
        self.state = PanningState::Idle;
    }

    pub fn mouse_leave(&mut self) {
        self.mouse_up();
    }

    /// Pans by the wheel deltas. Events with ctrl or meta held are zoom
    /// gestures and are left alone.
    pub fn wheel(&mut self, event: WheelEvent, now: Instant) -> Option<Point> {
        if event.ctrl_key || event.meta_key {
            return None;
        }
        self.touchpad_panning = true;
        self.last_wheel_at = Some(now);
        let offset = self
            .last_panning_offset
            .offset(-event.delta_x, -event.delta_y);
        self.last_panning_offset = offset;
        self.changes.publish(&PanningUpdate {
            offset,
            pointer: None,
        });
        Some(offset)
    }

    /// Clears touchpad mode once no wheel event arrived for the idle period.
    /// Returns whether the mode was cleared by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        let idle = Duration::from_millis(self.config.touchpad_idle_ms);
        match self.last_wheel_at {
            Some(at) if self.touchpad_panning && now.saturating_duration_since(at) >= idle => {
                self.touchpad_panning = false;
                self.last_wheel_at = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for PannerService {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

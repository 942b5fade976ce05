use crate::config::ViewportConfig;

use super::{Subject, SubscriptionId};

const DEFAULT_SCALE: f32 = 1.0;

/// Zoom scale of the canvas, always within `[min, max]`.
#[derive(Debug)]
pub struct ZoomingService {
    scale: f32,
    min: f32,
    max: f32,
    step: f32,
    changes: Subject<f32>,
}

impl ZoomingService {
    pub fn new(config: &ViewportConfig) -> Self {
        let (min, max) = if config.zoom_min <= config.zoom_max {
            (config.zoom_min, config.zoom_max)
        } else {
            tracing::warn!(
                min = config.zoom_min,
                max = config.zoom_max,
                "zoom limits are reversed; swapping them"
            );
            (config.zoom_max, config.zoom_min)
        };
        Self {
            scale: DEFAULT_SCALE.clamp(min, max),
            min,
            max,
            step: config.zoom_step,
            changes: Subject::new(),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.scale + self.step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.scale - self.step)
    }

    /// Sets the clamped scale, notifies subscribers when it changed and
    /// returns the scale in effect.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        let clamped = if scale.is_nan() {
            self.scale
        } else {
            scale.clamp(self.min, self.max)
        };
        if clamped != self.scale {
            tracing::trace!(from = self.scale, to = clamped, "zoom changed");
            self.scale = clamped;
            self.changes.publish(&clamped);
        }
        self.scale
    }

    pub fn reset(&mut self) -> f32 {
        self.set_scale(DEFAULT_SCALE)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&f32) + 'static) -> SubscriptionId {
        self.changes.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }
}

impl Default for ZoomingService {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn any_zoom_sequence_stays_in_range() {
        let mut zoom = ZoomingService::default();
        // Deterministic pseudo-random walk over in/out steps.
        let mut state: u32 = 0x2545_f491;
        for _ in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let scale = if state % 3 == 0 {
                zoom.zoom_out()
            } else {
                zoom.zoom_in()
            };
            assert!((zoom.min()..=zoom.max()).contains(&scale), "{scale}");
        }
        for _ in 0..40 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.scale(), zoom.min());
        for _ in 0..40 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.scale(), zoom.max());
    }

    #[test]
    fn set_scale_clamps_and_ignores_nan() {
        let mut zoom = ZoomingService::default();
        assert_eq!(zoom.set_scale(10.0), 1.5);
        assert_eq!(zoom.set_scale(0.0), 0.25);
        assert_eq!(zoom.set_scale(f32::NAN), 0.25);
        assert_eq!(zoom.reset(), 1.0);
    }

    #[test]
    fn subscribers_see_only_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut zoom = ZoomingService::default();
        let sink = Rc::clone(&seen);
        zoom.subscribe(move |scale| sink.borrow_mut().push(*scale));
        zoom.set_scale(0.5);
        zoom.set_scale(0.5);
        zoom.set_scale(0.1);
        assert_eq!(*seen.borrow(), vec![0.5, 0.25]);
    }

    #[test]
    fn reversed_limits_are_swapped() {
        let config = ViewportConfig {
            zoom_min: 2.0,
            zoom_max: 0.5,
            ..ViewportConfig::default()
        };
        let zoom = ZoomingService::new(&config);
        assert_eq!((zoom.min(), zoom.max()), (0.5, 2.0));
        assert_eq!(zoom.scale(), 1.0);
    }
}

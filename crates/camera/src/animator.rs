use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::math::Vec3;
use foundation::time::Time;
use runtime::frame::Frame;
use runtime::ticker::{TaskId, Ticker};

use crate::easing::Easing;
use crate::store::CameraStore;

pub const DEFAULT_MOVE_DURATION_MS: f64 = 1000.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MoveOptions {
    pub duration_ms: f64,
    pub animated: bool,
    pub easing: Easing,
}

impl MoveOptions {
    pub fn instant() -> Self {
        Self {
            duration_ms: 0.0,
            animated: false,
            easing: Easing::Linear,
        }
    }

    pub fn animated(duration_ms: f64, easing: Easing) -> Self {
        Self {
            duration_ms,
            animated: true,
            easing,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Tween {
    from: Vec3,
    to: Vec3,
    start: Option<Time>,
    duration_ms: f64,
    easing: Easing,
}

/// Camera motion commands.
///
/// Instant moves write the store directly. Animated moves are tweens stepped
/// by the render ticker, so the camera glides at display cadence while the
/// store's subscribers still see throttled updates.
#[derive(Debug)]
pub struct CameraAnimator {
    store: Rc<CameraStore>,
    tween: RefCell<Option<Tween>>,
    default_duration_ms: f64,
    default_easing: Easing,
}

impl CameraAnimator {
    pub fn new(store: Rc<CameraStore>) -> Self {
        Self::with_defaults(store, DEFAULT_MOVE_DURATION_MS, Easing::EaseOutQuart)
    }

    pub fn with_defaults(store: Rc<CameraStore>, duration_ms: f64, easing: Easing) -> Self {
        Self {
            store,
            tween: RefCell::new(None),
            default_duration_ms: duration_ms,
            default_easing: easing,
        }
    }

    /// Registers the per-frame step on the shared ticker.
    pub fn attach(self: &Rc<Self>, ticker: &Ticker) -> TaskId {
        let weak: Weak<Self> = Rc::downgrade(self);
        ticker.add("camera-animator", -10, move |frame| {
            if let Some(animator) = weak.upgrade() {
                animator.step(frame);
            }
        })
    }

    pub fn store(&self) -> &Rc<CameraStore> {
        &self.store
    }

    pub fn is_animating(&self) -> bool {
        self.tween.borrow().is_some()
    }

    pub fn cancel(&self) {
        self.tween.borrow_mut().take();
    }

    pub fn move_to(&self, target: Vec3, options: MoveOptions) {
        if !options.animated || options.duration_ms <= 0.0 {
            self.cancel();
            tracing::debug!(x = target.x, y = target.y, "camera jump");
            self.store.set_position(target);
            return;
        }

        let from = self.store.get_state().position;
        *self.tween.borrow_mut() = Some(Tween {
            from,
            to: target,
            start: None,
            duration_ms: options.duration_ms,
            easing: options.easing,
        });
    }

    /// `easing` is a host-side name; unknown names fall back to linear.
    pub fn move_to_island(&self, target: Vec3, animated: bool, easing: Option<&str>) {
        let easing = easing.map_or(self.default_easing, Easing::from_name);
        let options = if animated {
            MoveOptions::animated(self.default_duration_ms, easing)
        } else {
            MoveOptions::instant()
        };
        self.move_to(target, options);
    }

    pub fn step(&self, frame: Frame) {
        let current = *self.tween.borrow();
        let Some(mut tween) = current else {
            return;
        };
        let start = *tween.start.get_or_insert(frame.time);
        let progress = frame.time.since(start) / tween.duration_ms;

        let done = progress >= 1.0;
        let position = if done {
            tween.to
        } else {
            tween.from.lerp(tween.to, tween.easing.apply(progress))
        };

        *self.tween.borrow_mut() = if done { None } else { Some(tween) };
        self.store.set_position(position);
    }
}

//! # Transitions
//!
//! Short-lived tweens for the camera parameters (lock factor and zoom).
//!
//! A [`TransitionSlot`] holds at most one running transition. Starting a new
//! one or cancelling replaces the slot's token, so a transition started under
//! an older token is never applied.

use crate::animation::{Animated, EasingType};

#[derive(Debug, Clone)]
pub struct Transition {
    value: Animated<f64>,
    start_millis: f64,
    token: u64,
}

impl Transition {
    pub fn new(
        from: f64,
        to: f64,
        start_millis: f64,
        duration_millis: f64,
        easing: EasingType,
        token: u64,
    ) -> Self {
        let mut value = Animated::new(from);
        value.add_keyframe(to, duration_millis.max(0.0), easing);
        Self {
            value,
            start_millis,
            token,
        }
    }

    pub fn value_at(&mut self, now_millis: f64) -> f64 {
        self.value.update(now_millis - self.start_millis);
        self.value.current_value
    }

    pub fn is_finished(&self, now_millis: f64) -> bool {
        now_millis - self.start_millis >= self.value.duration()
    }

    pub fn target(&self) -> f64 {
        self.value.target()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransitionSlot {
    active: Option<Transition>,
    token: u64,
}

impl TransitionSlot {
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, from: f64, to: f64, now_millis: f64, duration_millis: f64) {
        self.token += 1;
        self.active = Some(Transition::new(
            from,
            to,
            now_millis,
            duration_millis,
            EasingType::EaseInOut,
            self.token,
        ));
    }

    /// Drops the running transition and returns its target, if any.
    pub fn cancel(&mut self) -> Option<f64> {
        self.token += 1;
        self.active.take().map(|t| t.target())
    }

    /// Current value of the running transition. Finished transitions are
    /// retired after reporting their final value.
    pub fn advance(&mut self, now_millis: f64) -> Option<f64> {
        let token = self.token;
        let transition = self.active.as_mut().filter(|t| t.token == token)?;
        if transition.is_finished(now_millis) {
            let target = transition.target();
            self.active = None;
            return Some(target);
        }
        Some(transition.value_at(now_millis))
    }
}

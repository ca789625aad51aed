use keyframe::{AnimationSequence, CanTween, EasingFunction, Keyframe};
use std::fmt;

// Easing curves stored uniformly so keyframes can carry them by value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EasingType {
    Linear,
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

/// A value driven by a keyframe sequence. Times are in milliseconds.
#[derive(Clone)]
pub struct Animated<T>
where
    T: Clone + CanTween + Default,
{
    pub raw_keyframes: Vec<(T, f64, EasingType)>,
    pub sequence: AnimationSequence<T>,
    pub current_value: T,
}

impl<T> Animated<T>
where
    T: Clone + CanTween + Default,
{
    pub fn new(initial: T) -> Self {
        let raw = vec![(initial.clone(), 0.0, EasingType::Linear)];
        let kf = Keyframe::new(initial.clone(), 0.0, EasingType::Linear);

        Self {
            sequence: AnimationSequence::from(vec![kf]),
            raw_keyframes: raw,
            current_value: initial,
        }
    }

    /// Appends a keyframe reaching `target` after `duration` more time.
    pub fn add_keyframe(&mut self, target: T, duration: f64, easing: EasingType) {
        let new_time = self.sequence.duration() + duration;
        self.raw_keyframes.push((target, new_time, easing));

        let frames: Vec<Keyframe<T>> = self
            .raw_keyframes
            .iter()
            .map(|(val, time, ease_type)| Keyframe::new(val.clone(), *time, *ease_type))
            .collect();
        self.sequence = AnimationSequence::from(frames);
    }

    pub fn duration(&self) -> f64 {
        self.sequence.duration()
    }

    /// Final value of the sequence.
    pub fn target(&self) -> T {
        self.raw_keyframes
            .last()
            .map(|(val, _, _)| val.clone())
            .unwrap_or_else(|| self.current_value.clone())
    }

    pub fn update(&mut self, time: f64) {
        self.sequence.advance_to(time.clamp(0.0, self.duration()));
        self.current_value = self.sequence.now();
    }
}

impl<T> fmt::Debug for Animated<T>
where
    T: Clone + CanTween + Default + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animated")
            .field("current_value", &self.current_value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_segment_interpolates() {
        let mut value = Animated::new(0.0f64);
        value.add_keyframe(10.0, 100.0, EasingType::Linear);
        assert_eq!(value.duration(), 100.0);

        value.update(25.0);
        assert!((value.current_value - 2.5).abs() < 1e-9);
        value.update(250.0);
        assert!((value.current_value - 10.0).abs() < 1e-9);
        assert_eq!(value.target(), 10.0);
    }

    #[test]
    fn eased_segment_hits_both_ends() {
        let mut value = Animated::new(1.0f64);
        value.add_keyframe(0.0, 500.0, EasingType::EaseInOut);
        value.update(0.0);
        assert!((value.current_value - 1.0).abs() < 1e-9);
        value.update(500.0);
        assert!(value.current_value.abs() < 1e-9);
    }
}

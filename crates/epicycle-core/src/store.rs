//! # Epicycle Store
//!
//! Single owner of the animation parameters and the memoized arrow list.
//!
//! ## Responsibilities
//! - **Arrows**: coefficients are computed lazily, one per frequency, and
//!   kept until the sample set changes. `arrow_count` only selects how many
//!   are visible.
//! - **Sampling Jobs**: a drawable or sampling-rate change resets the scene
//!   synchronously and re-samples on the rayon pool. A newer job supersedes
//!   an older one; results from a superseded job are never installed.
//! - **Playback**: drives [`AnimationDriver`] from the host frame clock given
//!   to [`EpicycleStore::tick`].
//! - **Notification**: every accepted mutation publishes an
//!   [`EpicycleState`] to all subscribers.
//!
//! Requests outside the accepted ranges are ignored and logged at `debug`.

use crate::compositor::{Frame, FrameParams, SceneCompositor};
use crate::config::EpicycleConfig;
use crate::driver::AnimationDriver;
use crate::drawable::DrawableLibrary;
use crate::error::Result;
use crate::fourier::{coefficient, frequency_for_index, Arrow};
use crate::sampler::PathSampler;
use crate::transitions::TransitionSlot;
use crate::viewport::Viewport;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use kurbo::{BezPath, Point};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Failed(String),
}

/// Observable snapshot of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EpicycleState {
    pub drawable_index: usize,
    pub load_state: LoadState,
    pub sample_count: usize,
    pub arrow_count: usize,
    pub memoized_arrows: usize,
    pub time: f64,
    pub playing: bool,
    pub period_speed: f64,
    /// Seconds per loop at speed 1.
    pub period_duration: f64,
    pub fading_duration: f64,
    pub fading_scale: f64,
    pub zoom_factor: f64,
    pub lock_factor: f64,
    pub locked: bool,
    pub sampling_rate: f64,
    /// Host reported itself hidden.
    pub hidden: bool,
}

impl EpicycleState {
    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }
}

struct SamplingJob {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    receiver: Receiver<Vec<Point>>,
}

pub struct EpicycleStore {
    config: EpicycleConfig,
    library: DrawableLibrary,
    drawable_index: usize,
    drawable: Option<Arc<BezPath>>,
    samples: Vec<Point>,
    arrows: Vec<Arrow>,
    arrow_count: usize,

    period_speed: f64,
    period_duration: f64,
    fading_duration: f64,
    fading_scale: f64,
    zoom_factor: f64,
    lock_factor: f64,
    locked: bool,
    sampling_rate: f64,
    playing: bool,
    hidden: bool,

    clock_millis: f64,
    driver: AnimationDriver,
    lock_transition: TransitionSlot,
    zoom_transition: TransitionSlot,
    compositor: SceneCompositor,

    job: Option<SamplingJob>,
    generation: u64,
    load_state: LoadState,
    subscribers: Vec<Sender<EpicycleState>>,
}

impl EpicycleStore {
    /// Creates a store and starts loading `initial_index`.
    pub fn new(config: EpicycleConfig, library: DrawableLibrary, initial_index: usize) -> Result<Self> {
        let mut store = Self {
            sampling_rate: config.sampling_rate,
            config,
            library,
            drawable_index: initial_index,
            drawable: None,
            samples: Vec::new(),
            arrows: Vec::new(),
            arrow_count: 0,
            period_speed: 1.0,
            period_duration: 0.0,
            fading_duration: 0.0,
            fading_scale: 0.0,
            zoom_factor: 1.0,
            lock_factor: 0.0,
            locked: false,
            playing: false,
            hidden: false,
            clock_millis: 0.0,
            driver: AnimationDriver::new(),
            lock_transition: TransitionSlot::default(),
            zoom_transition: TransitionSlot::default(),
            compositor: SceneCompositor::new(),
            job: None,
            generation: 0,
            load_state: LoadState::Idle,
            subscribers: Vec::new(),
        };
        store.change_drawable(initial_index)?;
        Ok(store)
    }

    pub fn config(&self) -> &EpicycleConfig {
        &self.config
    }

    pub fn samples(&self) -> &[Point] {
        &self.samples
    }

    /// Arrows currently shown.
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows[..self.arrow_count.min(self.arrows.len())]
    }

    /// Every coefficient computed for the current sample set.
    pub fn memoized_arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn compositor(&self) -> &SceneCompositor {
        &self.compositor
    }

    pub fn selected_drawable(&self) -> usize {
        self.drawable_index
    }

    pub fn drawable_names(&self) -> &[String] {
        &self.library.names
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn time(&self) -> f64 {
        self.driver.fraction(self.clock_millis)
    }

    fn period_millis(&self) -> f64 {
        self.period_duration * 1000.0 / self.period_speed
    }

    pub fn snapshot(&self) -> EpicycleState {
        EpicycleState {
            drawable_index: self.drawable_index,
            load_state: self.load_state.clone(),
            sample_count: self.samples.len(),
            arrow_count: self.arrow_count,
            memoized_arrows: self.arrows.len(),
            time: self.time(),
            playing: self.playing,
            period_speed: self.period_speed,
            period_duration: self.period_duration,
            fading_duration: self.fading_duration,
            fading_scale: self.fading_scale,
            zoom_factor: self.zoom_factor,
            lock_factor: self.lock_factor,
            locked: self.locked,
            sampling_rate: self.sampling_rate,
            hidden: self.hidden,
        }
    }

    /// Receives the current state immediately and again after every change.
    pub fn subscribe(&mut self) -> Receiver<EpicycleState> {
        let (tx, rx) = unbounded();
        if tx.send(self.snapshot()).is_ok() {
            self.subscribers.push(tx);
        }
        rx
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let state = self.snapshot();
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }

    /// Switches to another drawable. On failure nothing but the load state
    /// changes, and the previous scene stays intact; a sampling job still in
    /// flight for that scene completes without clearing the failure.
    pub fn change_drawable(&mut self, index: usize) -> Result<()> {
        let drawable = match self.library.load(index, self.config.half_extent) {
            Ok(drawable) => drawable,
            Err(err) => {
                warn!(index, error = %err, "unable to load drawing");
                self.load_state = LoadState::Failed(err.to_string());
                self.publish();
                return Err(err);
            }
        };
        info!(index, name = %drawable.name, "loading drawable");
        self.drawable_index = index;
        self.drawable = Some(Arc::new(drawable.path));
        self.begin_sampling();
        Ok(())
    }

    /// Accepted only within the configured range. Invalidates every arrow.
    pub fn change_sampling_rate(&mut self, rate: f64) {
        if !self.config.accepts_sampling_rate(rate) {
            debug!(rate, "ignoring out-of-range sampling rate");
            return;
        }
        if rate == self.sampling_rate {
            return;
        }
        self.sampling_rate = rate;
        if self.drawable.is_some() {
            self.begin_sampling();
        } else {
            self.publish();
        }
    }

    fn begin_sampling(&mut self) {
        let Some(path) = self.drawable.clone() else {
            return;
        };

        // Supersede everything tied to the old sample set.
        if let Some(job) = self.job.take() {
            job.cancelled.store(true, Ordering::Relaxed);
        }
        self.driver.reset();
        if let Some(target) = self.lock_transition.cancel() {
            self.lock_factor = target;
        }
        if let Some(target) = self.zoom_transition.cancel() {
            self.zoom_factor = target;
        }
        self.arrow_count = 0;
        self.arrows.clear();
        self.samples.clear();
        self.compositor.clear_markers();

        self.generation += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = bounded(1);
        let rate = self.sampling_rate;
        let accuracy = self.config.arc_accuracy;
        let flag = Arc::clone(&cancelled);
        rayon::spawn(move || {
            if flag.load(Ordering::Relaxed) {
                return;
            }
            let samples = PathSampler::new(&path, accuracy).sample(rate);
            if !flag.load(Ordering::Relaxed) {
                let _ = tx.send(samples);
            }
        });

        self.job = Some(SamplingJob {
            generation: self.generation,
            cancelled,
            receiver: rx,
        });
        self.load_state = LoadState::Loading;
        self.publish();
    }

    fn poll_sampling(&mut self) {
        let Some(job) = self.job.as_ref() else {
            return;
        };
        let outcome = match job.receiver.try_recv() {
            Ok(samples) => Ok(samples),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(()),
        };
        self.finish_sampling(outcome);
    }

    /// Blocks until the in-flight sampling job, if any, has finished.
    pub fn wait_for_load(&mut self) -> &LoadState {
        if let Some(job) = self.job.as_ref() {
            let outcome = job.receiver.recv().map_err(|_| ());
            self.finish_sampling(outcome);
        }
        &self.load_state
    }

    fn finish_sampling(&mut self, outcome: std::result::Result<Vec<Point>, ()>) {
        let Some(job) = self.job.take() else {
            return;
        };
        if job.generation != self.generation {
            return;
        }
        let Ok(samples) = outcome else {
            warn!("sampling job ended without a result");
            self.load_state = LoadState::Failed("sampling aborted".to_string());
            self.publish();
            return;
        };

        self.samples = samples;
        self.period_duration = self.config.period_duration(self.samples.len());
        self.fading_duration = self.config.natural_fading_duration(self.period_duration);
        self.fading_scale = self.fading_duration;
        // A failed switch stays reported until a later switch succeeds.
        if !matches!(self.load_state, LoadState::Failed(_)) {
            self.load_state = LoadState::Idle;
        }
        info!(
            samples = self.samples.len(),
            period = self.period_duration,
            "drawable sampled"
        );

        self.memoize_visible();
        if self.playing {
            self.driver.play(self.clock_millis, self.period_millis());
        }
        self.publish();
    }

    fn memoize_visible(&mut self) {
        if self.job.is_some() {
            return;
        }
        while self.arrows.len() < self.arrow_count {
            let frequency = frequency_for_index(self.arrows.len());
            let arrow = coefficient(&self.samples, frequency);
            debug!(frequency, length = arrow.length, "computed coefficient");
            self.arrows.push(arrow);
        }
    }

    /// Shows one more arrow, computing its coefficient the first time.
    pub fn add_arrow(&mut self) {
        self.arrow_count += 1;
        self.memoize_visible();
        self.publish();
    }

    /// Hides the last arrow. Its coefficient stays memoized.
    pub fn drop_arrow(&mut self) {
        if self.arrow_count == 0 {
            return;
        }
        self.arrow_count -= 1;
        self.publish();
    }

    pub fn change_fading_factor(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > self.fading_duration / 2.0) {
            debug!(factor, threshold = self.fading_duration / 2.0, "ignoring fading factor");
            return;
        }
        self.fading_scale = factor;
        self.publish();
    }

    pub fn change_zoom_factor(&mut self, factor: f64) {
        if !(factor.is_finite() && factor >= 1.0) {
            debug!(factor, "ignoring zoom factor below 1");
            return;
        }
        if self.zoom_transition.is_animating() {
            debug!(factor, "zoom transition running, ignoring zoom factor");
            return;
        }
        self.zoom_factor = factor;
        self.publish();
    }

    /// Eases the camera onto the chain tip, or back to the origin. Unlocking
    /// also eases the zoom back to 1.
    pub fn change_lock_to_path(&mut self, lock: bool) {
        let duration = self.config.transition_millis;
        self.locked = lock;
        let target = if lock { 1.0 } else { 0.0 };
        self.lock_transition
            .start(self.lock_factor, target, self.clock_millis, duration);
        if !lock {
            self.zoom_transition
                .start(self.zoom_factor, 1.0, self.clock_millis, duration);
        }
        self.publish();
    }

    pub fn play(&mut self) {
        if self.playing && self.driver.is_running() {
            return;
        }
        self.playing = true;
        if self.job.is_none() {
            self.driver.play(self.clock_millis, self.period_millis());
        }
        self.publish();
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.driver.pause(self.clock_millis);
        self.publish();
    }

    /// Switches speed and (re)starts playback from the current fraction.
    pub fn change_period_speed(&mut self, speed: f64) {
        if !self.config.accepts_speed(speed) {
            debug!(speed, "ignoring speed outside the ladder");
            return;
        }
        self.period_speed = speed;
        self.playing = true;
        if self.job.is_none() {
            self.driver.play(self.clock_millis, self.period_millis());
        }
        self.publish();
    }

    /// Scrubs to `time`. Only honored while paused.
    pub fn change_time(&mut self, time: f64) {
        if self.playing {
            debug!(time, "ignoring scrub while playing");
            return;
        }
        if !self.driver.scrub(time) {
            debug!(time, "ignoring scrub outside [0, 1]");
            return;
        }
        self.compositor.clear_markers();
        self.publish();
    }

    /// Host visibility changes. Hiding pauses a running playback.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden && self.playing {
            debug!("host hidden, pausing playback");
            self.pause();
        }
    }

    /// Advances the store to `now_millis` and returns the resulting state.
    pub fn tick(&mut self, now_millis: f64) -> EpicycleState {
        self.clock_millis = now_millis.max(self.clock_millis);
        self.poll_sampling();

        let now = self.clock_millis;
        let mut changed = false;
        if let Some(value) = self.lock_transition.advance(now) {
            self.lock_factor = value;
            changed = true;
        }
        if let Some(value) = self.zoom_transition.advance(now) {
            self.zoom_factor = value;
            changed = true;
        }
        if changed {
            self.publish();
        }
        self.snapshot()
    }

    /// Advances to `now_millis` and composes the scene for a
    /// `width` x `height` pixel surface.
    pub fn compose(&mut self, now_millis: f64, width: f64, height: f64) -> Frame {
        self.tick(now_millis);
        let viewport = Viewport::new(width, height, self.config.half_extent);
        let visible = self.arrow_count.min(self.arrows.len());
        let params = FrameParams {
            time: self.driver.fraction(self.clock_millis),
            arrows: &self.arrows[..visible],
            playing: self.playing,
            lock_factor: self.lock_factor,
            zoom_factor: self.zoom_factor,
            fading_scale: self.fading_scale,
            period_speed: self.period_speed,
        };
        self.compositor.compose(params, &viewport)
    }
}

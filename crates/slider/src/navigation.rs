use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use effects::{ParamKey, ParameterStore};
use scheduler::{TimerId, TimerQueue};

use crate::deck::Deck;
use crate::engine::TransitionEngine;
use crate::notify::{Notification, Notifier};

/// Period of the auto-advance indicator ticker.
pub const PROGRESS_TICK: Duration = Duration::from_millis(50);
/// Grace period between a finished transition and the next auto-advance cycle.
pub const RESTART_DELAY: Duration = Duration::from_millis(100);
/// Fade-out of a full indicator.
pub const PROGRESS_FADE: Duration = Duration::from_millis(300);
/// Shortest horizontal touch travel that counts as a swipe, in pixels.
pub const MIN_SWIPE_DISTANCE: f32 = 50.0;

const MIN_TEXTURES: usize = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("slider needs at least {required} loaded slides, found {loaded}")]
pub struct NotReadyError {
    pub loaded: usize,
    pub required: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    /// Pointer click; clicks on the navigation chrome are handled by
    /// [`InputEvent::NavItem`] instead.
    Click { on_navigation: bool },
    TouchStart { x: f32 },
    TouchEnd { x: f32 },
    /// Click on the indicator of slide `index`.
    NavItem(usize),
    Visibility { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavTiming {
    pub transition: Duration,
    pub auto_slide: Duration,
}

impl NavTiming {
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            transition: Duration::from_secs_f32(store.get(ParamKey::TransitionDuration).max(0.0)),
            auto_slide: Duration::from_millis(store.get(ParamKey::AutoSlideSpeed).max(0.0) as u64),
        }
    }
}

impl Default for NavTiming {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(2500),
            auto_slide: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationState {
    pub current_index: usize,
    pub enabled: bool,
    pub auto_advance_progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavTimer {
    Progress,
    Restart,
}

/// Owns the current slide index, the auto-advance cycle and input
/// arbitration. Every entry point takes the current instant; timers replay
/// in deadline order when [`NavigationController::advance`] catches up.
#[derive(Debug)]
pub struct NavigationController {
    deck: Deck,
    engine: TransitionEngine,
    current_index: usize,
    enabled: bool,
    auto_play: bool,
    visible: bool,
    progress: f32,
    progress_ticks: u32,
    timing: NavTiming,
    timers: TimerQueue<NavTimer>,
    progress_timer: Option<TimerId>,
    restart_timer: Option<TimerId>,
    touch_start: Option<f32>,
    completed_tx: Sender<usize>,
    completed_rx: Receiver<usize>,
    notifier: Notifier,
}

impl NavigationController {
    pub fn new(deck: Deck, timing: NavTiming) -> Self {
        let (completed_tx, completed_rx) = unbounded();
        let mut engine = TransitionEngine::new();
        if let Some(texture) = deck.texture(0) {
            engine.set_current(texture.clone());
        }
        Self {
            deck,
            engine,
            current_index: 0,
            enabled: false,
            auto_play: true,
            visible: true,
            progress: 0.0,
            progress_ticks: 0,
            timing,
            timers: TimerQueue::new(),
            progress_timer: None,
            restart_timer: None,
            touch_start: None,
            completed_tx,
            completed_rx,
            notifier: Notifier::default(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifier.emit(notification);
    }

    pub fn set_timing(&mut self, timing: NavTiming) {
        self.timing = timing;
    }

    pub fn timing(&self) -> NavTiming {
        self.timing
    }

    /// With auto-play off the indicator never runs and slides only change
    /// on input.
    pub fn set_auto_play(&mut self, auto_play: bool, now: Instant) {
        self.auto_play = auto_play;
        if !auto_play {
            self.stop_all_timers();
        } else if self.enabled && !self.engine.in_progress() && !self.timers_armed() {
            self.start_auto_slide(Duration::ZERO, now);
        }
    }

    pub fn start(&mut self, now: Instant) -> Result<(), NotReadyError> {
        if self.deck.len() < MIN_TEXTURES {
            let err = NotReadyError {
                loaded: self.deck.len(),
                required: MIN_TEXTURES,
            };
            tracing::warn!(loaded = err.loaded, "textures not loaded yet; slider stays disabled");
            return Err(err);
        }
        self.enabled = true;
        self.emit_slide_changed();
        self.start_auto_slide(Duration::ZERO, now);
        tracing::info!(slides = self.deck.len(), "slider started");
        Ok(())
    }

    pub fn stop(&mut self) {
        self.enabled = false;
        self.stop_all_timers();
    }

    /// Shows `index` without a transition. Only allowed before [`start`],
    /// so the first cycle begins on that slide.
    ///
    /// [`start`]: NavigationController::start
    pub fn open_at(&mut self, index: usize) -> bool {
        if self.enabled || self.engine.in_progress() {
            return false;
        }
        let Some(texture) = self.deck.texture(index).cloned() else {
            return false;
        };
        self.current_index = index;
        self.engine.set_current(texture);
        true
    }

    /// Moves to `target`. Returns whether a transition was started; disabled,
    /// mid-transition, same-index and out-of-range requests are ignored.
    pub fn navigate_to(&mut self, target: usize, now: Instant) -> bool {
        if !self.enabled || self.engine.in_progress() {
            return false;
        }
        if target == self.current_index || target >= self.deck.len() {
            return false;
        }

        self.stop_all_timers();
        self.quick_reset_progress();

        let from_texture = self.deck.texture(self.current_index).cloned();
        let to_texture = self.deck.texture(target).cloned();
        if from_texture.is_none() || to_texture.is_none() {
            return false;
        }

        let from = self.current_index;
        self.current_index = target;
        self.emit_slide_changed();

        let completed = self.completed_tx.clone();
        let started = self.engine.start(
            from_texture,
            to_texture,
            self.timing.transition,
            now,
            move |_| {
                let _ = completed.send(target);
            },
        );
        if started {
            tracing::debug!(from, to = target, "navigating");
            self.notifier
                .emit(Notification::TransitionStarted { from, to: target });
        }
        started
    }

    pub fn next(&mut self, now: Instant) -> bool {
        let count = self.deck.len();
        if count == 0 {
            return false;
        }
        self.navigate_to((self.current_index + 1) % count, now)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        let count = self.deck.len();
        if count == 0 {
            return false;
        }
        self.navigate_to((self.current_index + count - 1) % count, now)
    }

    /// Routes one input event. Returns whether it started a transition.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> bool {
        match event {
            InputEvent::Key(Key::ArrowRight | Key::Space) => self.accept_input() && self.next(now),
            InputEvent::Key(Key::ArrowLeft) => self.accept_input() && self.previous(now),
            InputEvent::Key(Key::Other) => false,
            InputEvent::Click { on_navigation: true } => false,
            InputEvent::Click { on_navigation: false } => self.accept_input() && self.next(now),
            InputEvent::NavItem(index) => self.navigate_to(index, now),
            InputEvent::TouchStart { x } => {
                self.touch_start = Some(x);
                false
            }
            InputEvent::TouchEnd { x } => {
                let Some(start) = self.touch_start.take() else {
                    return false;
                };
                if (x - start).abs() < MIN_SWIPE_DISTANCE {
                    return false;
                }
                if x < start {
                    self.accept_input() && self.next(now)
                } else {
                    self.accept_input() && self.previous(now)
                }
            }
            InputEvent::Visibility { visible } => {
                self.set_visible(visible, now);
                false
            }
        }
    }

    /// Hidden hosts stop every timer and keep them stopped, even when a
    /// transition finishes meanwhile; becoming visible restarts a full
    /// auto-advance cycle when nothing is transitioning.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        self.visible = visible;
        if !visible {
            self.stop_all_timers();
            tracing::debug!("host hidden; timers paused");
        } else if self.enabled && !self.engine.in_progress() {
            self.start_auto_slide(Duration::ZERO, now);
        }
    }

    /// Fires every timer and transition completion due at or before `now`,
    /// in deadline order, then brings transition progress up to `now`.
    pub fn advance(&mut self, now: Instant) {
        loop {
            let timer_due = self.timers.next_deadline().filter(|at| *at <= now);
            let engine_due = self.engine.deadline().filter(|at| *at <= now);
            match (timer_due, engine_due) {
                (None, None) => break,
                (Some(timer_at), Some(engine_at)) if engine_at <= timer_at => {
                    self.finish_transition(engine_at)
                }
                (None, Some(engine_at)) => self.finish_transition(engine_at),
                (Some(_), _) => {
                    if let Some(fired) = self.timers.pop_due(now) {
                        self.on_timer(fired.id, fired.kind, fired.deadline);
                    }
                }
            }
        }
        self.engine.tick(now);
    }

    /// Earliest instant at which [`NavigationController::advance`] has work.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.engine.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn dispose(&mut self) {
        self.stop_all_timers();
        self.enabled = false;
        tracing::debug!("navigation disposed");
    }

    pub fn state(&self) -> NavigationState {
        NavigationState {
            current_index: self.current_index,
            enabled: self.enabled,
            auto_advance_progress: self.progress,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn auto_advance_progress(&self) -> f32 {
        self.progress
    }

    pub fn slide_count(&self) -> usize {
        self.deck.len()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    /// Whether the auto-advance ticker or its delayed restart is armed.
    pub fn timers_armed(&self) -> bool {
        self.progress_timer.is_some() || self.restart_timer.is_some()
    }

    fn finish_transition(&mut self, at: Instant) {
        self.engine.tick(at);
        while let Ok(index) = self.completed_rx.try_recv() {
            self.notifier
                .emit(Notification::TransitionCompleted { index });
            self.start_auto_slide(RESTART_DELAY, at);
        }
    }

    fn on_timer(&mut self, id: TimerId, kind: NavTimer, at: Instant) {
        match kind {
            NavTimer::Restart => {
                if self.restart_timer == Some(id) {
                    self.restart_timer = None;
                    self.begin_progress(at);
                }
            }
            NavTimer::Progress => self.on_progress_tick(at),
        }
    }

    fn on_progress_tick(&mut self, at: Instant) {
        if !self.enabled {
            self.stop_all_timers();
            return;
        }

        // Derived from the tick count so the cycle ends exactly on its last tick.
        let cycle_ms = self.timing.auto_slide.as_millis().max(1);
        let tick_ms = PROGRESS_TICK.as_millis();
        let ticks_per_cycle = cycle_ms.div_ceil(tick_ms);
        self.progress_ticks = self.progress_ticks.saturating_add(1);
        self.progress = if u128::from(self.progress_ticks) >= ticks_per_cycle {
            100.0
        } else {
            let increment = (100.0 / cycle_ms as f32) * tick_ms as f32;
            (self.progress_ticks as f32 * increment).min(100.0)
        };
        let index = self.current_index;
        self.notifier.emit(Notification::ProgressUpdated {
            index,
            percent: self.progress,
        });

        if self.progress >= 100.0 {
            self.stop_progress_timer();
            self.notifier.emit(Notification::ProgressFaded {
                index,
                fade: PROGRESS_FADE,
            });
            if self.engine.in_progress() {
                tracing::debug!(index, "auto-advance reached while transitioning; dropped");
            } else {
                self.next(at);
            }
        }
    }

    fn start_auto_slide(&mut self, delay: Duration, at: Instant) {
        if !self.enabled {
            return;
        }
        self.stop_all_timers();
        if !self.auto_play || !self.visible {
            return;
        }
        if delay.is_zero() {
            self.begin_progress(at);
        } else {
            self.restart_timer = Some(self.timers.schedule_once(NavTimer::Restart, at + delay));
        }
    }

    fn begin_progress(&mut self, at: Instant) {
        self.progress = 0.0;
        self.progress_ticks = 0;
        match self
            .timers
            .schedule_interval(NavTimer::Progress, at + PROGRESS_TICK, PROGRESS_TICK)
        {
            Ok(id) => self.progress_timer = Some(id),
            Err(err) => tracing::warn!(error = %err, "failed to start auto-advance ticker"),
        }
    }

    fn stop_progress_timer(&mut self) {
        if let Some(id) = self.progress_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn stop_all_timers(&mut self) {
        self.stop_progress_timer();
        if let Some(id) = self.restart_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn quick_reset_progress(&mut self) {
        self.progress = 0.0;
        self.progress_ticks = 0;
        self.notifier.emit(Notification::ProgressReset {
            index: self.current_index,
        });
    }

    /// Gate shared by keyboard, click and swipe input.
    fn accept_input(&mut self) -> bool {
        if !self.enabled || self.engine.in_progress() {
            return false;
        }
        self.stop_all_timers();
        self.quick_reset_progress();
        true
    }

    fn emit_slide_changed(&mut self) {
        let slide_id = self
            .deck
            .slide(self.current_index)
            .map(|slide| slide.id.clone())
            .unwrap_or_default();
        self.notifier.emit(Notification::SlideChanged {
            index: self.current_index,
            total: self.deck.len(),
            slide_id,
        });
    }
}

use std::fmt;
use std::time::{Duration, Instant};

use renderer::TextureHandle;

/// Called once when a transition reaches the end of its ramp. The engine is
/// already idle when it runs, so the callback may start the next transition.
pub type Completion = Box<dyn FnOnce(&mut TransitionEngine)>;

/// power2.inOut: slow start, fast middle, slow end.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

struct Ramp {
    started: Instant,
    duration: Duration,
    on_complete: Option<Completion>,
}

enum EngineState {
    Idle,
    Running(Ramp),
}

/// Drives one progress ramp at a time between two textures.
///
/// Time is supplied by the caller through [`TransitionEngine::start`] and
/// [`TransitionEngine::tick`]; the engine never reads the clock itself.
pub struct TransitionEngine {
    state: EngineState,
    progress: f32,
    from: Option<TextureHandle>,
    to: Option<TextureHandle>,
    current: Option<TextureHandle>,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
            progress: 0.0,
            from: None,
            to: None,
            current: None,
        }
    }

    /// Shows `texture` on both inputs with no transition pending.
    pub fn set_current(&mut self, texture: TextureHandle) {
        self.from = Some(texture.clone());
        self.to = Some(texture.clone());
        self.current = Some(texture);
        self.progress = 0.0;
    }

    /// Begins a ramp from `from` to `to`. Returns `false` without touching any
    /// state when a transition is already running or a texture is missing.
    pub fn start<F>(
        &mut self,
        from: Option<TextureHandle>,
        to: Option<TextureHandle>,
        duration: Duration,
        now: Instant,
        on_complete: F,
    ) -> bool
    where
        F: FnOnce(&mut TransitionEngine) + 'static,
    {
        if self.in_progress() {
            tracing::warn!("transition already in progress");
            return false;
        }
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!("transition needs both textures; ignoring");
            return false;
        };

        tracing::debug!(
            from = from.id(),
            to = to.id(),
            duration_ms = duration.as_millis() as u64,
            "transition started"
        );
        self.from = Some(from);
        self.to = Some(to);
        self.progress = 0.0;
        self.state = EngineState::Running(Ramp {
            started: now,
            duration,
            on_complete: Some(Box::new(on_complete)),
        });
        true
    }

    /// Advances the ramp to `now`. Returns `true` when this call completed
    /// the transition.
    pub fn tick(&mut self, now: Instant) -> bool {
        let EngineState::Running(ramp) = &self.state else {
            return false;
        };

        let finished = now >= ramp.started + ramp.duration;
        let linear = if finished {
            1.0
        } else {
            let elapsed = now.saturating_duration_since(ramp.started);
            (elapsed.as_secs_f32() / ramp.duration.as_secs_f32()).min(1.0)
        };
        self.progress = self.progress.max(ease_in_out(linear)).min(1.0);

        if finished {
            self.complete();
            return true;
        }
        false
    }

    fn complete(&mut self) {
        let state = std::mem::replace(&mut self.state, EngineState::Idle);
        let EngineState::Running(mut ramp) = state else {
            return;
        };

        self.progress = 0.0;
        if let Some(target) = self.to.clone() {
            self.from = Some(target.clone());
            self.current = Some(target);
        }
        tracing::debug!("transition complete");

        if let Some(callback) = ramp.on_complete.take() {
            callback(self);
        }
    }

    /// Halts the ramp and drops its completion callback. Progress and
    /// textures keep their last values.
    pub fn cancel(&mut self) {
        if let EngineState::Running(_) = self.state {
            self.state = EngineState::Idle;
            tracing::debug!(progress = self.progress, "transition cancelled");
        }
    }

    pub fn in_progress(&self) -> bool {
        matches!(self.state, EngineState::Running(_))
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Instant at which the running ramp reaches the end.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            EngineState::Running(ramp) => Some(ramp.started + ramp.duration),
            EngineState::Idle => None,
        }
    }

    pub fn current_texture(&self) -> Option<&TextureHandle> {
        self.current.as_ref()
    }

    pub fn from_texture(&self) -> Option<&TextureHandle> {
        self.from.as_ref()
    }

    pub fn to_texture(&self) -> Option<&TextureHandle> {
        self.to.as_ref()
    }

    /// Releases every texture reference and returns to idle.
    pub fn dispose(&mut self) {
        self.cancel();
        self.from = None;
        self.to = None;
        self.current = None;
        self.progress = 0.0;
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("in_progress", &self.in_progress())
            .field("progress", &self.progress)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn textures() -> (TextureHandle, TextureHandle) {
        (
            TextureHandle::solid(2, 2, [0, 0, 0, 255]),
            TextureHandle::solid(2, 2, [255, 255, 255, 255]),
        )
    }

    fn secs(value: f32) -> Duration {
        Duration::from_secs_f32(value)
    }

    #[test]
    fn easing_is_symmetric_and_pinned() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-6);
        assert!(ease_in_out(0.1) < 0.1);
    }

    #[test]
    fn completes_after_duration_and_swaps_current() {
        let (a, b) = textures();
        let start = Instant::now();
        let mut engine = TransitionEngine::new();
        engine.set_current(a.clone());
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        assert!(engine.start(Some(a), Some(b.clone()), secs(2.5), start, move |_| flag.set(true)));
        assert!(engine.in_progress());
        assert!(!engine.tick(start + secs(1.0)));
        assert!(engine.progress() > 0.0);

        assert!(engine.tick(start + secs(2.5) + Duration::from_millis(1)));
        assert!(!engine.in_progress());
        assert_eq!(engine.current_texture(), Some(&b));
        assert_eq!(engine.from_texture(), Some(&b));
        assert_eq!(engine.progress(), 0.0);
        assert!(fired.get());
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let (a, b) = textures();
        let other = TextureHandle::solid(2, 2, [9, 9, 9, 255]);
        let start = Instant::now();
        let mut engine = TransitionEngine::new();
        engine.start(Some(a.clone()), Some(b.clone()), secs(2.0), start, |_| {});
        engine.tick(start + secs(1.2));
        let progress = engine.progress();

        assert!(!engine.start(Some(other.clone()), Some(other), secs(2.0), start + secs(1.2), |_| {}));
        assert_eq!(engine.from_texture(), Some(&a));
        assert_eq!(engine.to_texture(), Some(&b));
        assert_eq!(engine.progress(), progress);
        assert_eq!(engine.deadline(), Some(start + secs(2.0)));
    }

    #[test]
    fn missing_texture_is_a_no_op() {
        let (a, _) = textures();
        let mut engine = TransitionEngine::new();
        assert!(!engine.start(Some(a), None, secs(1.0), Instant::now(), |_| {}));
        assert!(!engine.in_progress());
        assert!(engine.from_texture().is_none());
    }

    #[test]
    fn progress_never_decreases() {
        let (a, b) = textures();
        let start = Instant::now();
        let mut engine = TransitionEngine::new();
        engine.start(Some(a), Some(b), secs(1.0), start, |_| {});
        let mut last = 0.0;
        for step in 0..20 {
            engine.tick(start + Duration::from_millis(step * 45));
            assert!(engine.progress() >= last);
            last = engine.progress();
        }
        engine.tick(start + Duration::from_millis(200));
        assert_eq!(engine.progress(), last);
    }

    #[test]
    fn cancel_drops_callback_and_keeps_progress() {
        let (a, b) = textures();
        let start = Instant::now();
        let mut engine = TransitionEngine::new();
        engine.set_current(a.clone());
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        engine.start(Some(a.clone()), Some(b.clone()), secs(1.0), start, move |_| flag.set(true));
        engine.tick(start + secs(0.5));
        let progress = engine.progress();

        engine.cancel();
        engine.cancel();
        assert!(!engine.in_progress());
        assert_eq!(engine.progress(), progress);
        assert_eq!(engine.to_texture(), Some(&b));
        assert_eq!(engine.current_texture(), Some(&a));
        assert!(!engine.tick(start + secs(5.0)));
        assert!(!fired.get());
    }

    #[test]
    fn callback_can_chain_a_new_transition() {
        let (a, b) = textures();
        let start = Instant::now();
        let mut engine = TransitionEngine::new();
        let back = a.clone();
        let done = start + secs(1.0);
        engine.start(Some(a.clone()), Some(b.clone()), secs(1.0), start, move |engine| {
            let from = engine.current_texture().cloned();
            engine.start(from, Some(back), Duration::from_secs(1), done, |_| {});
        });

        assert!(engine.tick(done));
        assert!(engine.in_progress());
        assert_eq!(engine.from_texture(), Some(&b));
        assert_eq!(engine.to_texture(), Some(&a));
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let (a, b) = textures();
        let now = Instant::now();
        let mut engine = TransitionEngine::new();
        engine.start(Some(a), Some(b.clone()), Duration::ZERO, now, |_| {});
        assert!(engine.tick(now));
        assert_eq!(engine.current_texture(), Some(&b));
    }
}

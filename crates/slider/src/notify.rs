use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use effects::{EffectFamily, ParamChange};

/// Everything a presentation layer can react to. Indices are zero-based.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    SlideChanged {
        index: usize,
        total: usize,
        slide_id: String,
    },
    /// Auto-advance indicator for `index`, in percent.
    ProgressUpdated { index: usize, percent: f32 },
    /// Indicator snapped back to zero after a manual navigation.
    ProgressReset { index: usize },
    /// Indicator reached 100% and fades out over `fade`.
    ProgressFaded { index: usize, fade: Duration },
    TransitionStarted { from: usize, to: usize },
    TransitionCompleted { index: usize },
    EffectChanged {
        previous: EffectFamily,
        current: EffectFamily,
    },
    PresetChanged {
        effect: EffectFamily,
        preset: String,
    },
    ParametersChanged(Vec<ParamChange>),
    /// The whole configuration was replaced.
    ParametersReset {
        effect: EffectFamily,
        preset: String,
    },
}

#[derive(Debug, Default)]
pub(crate) struct Notifier {
    observers: Vec<Sender<Notification>>,
}

impl Notifier {
    pub(crate) fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = unbounded();
        self.observers.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, notification: Notification) {
        self.observers
            .retain(|observer| observer.send(notification.clone()).is_ok());
    }
}

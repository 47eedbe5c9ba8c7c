use std::time::Instant;

use crossbeam_channel::Receiver;
use effects::{EffectFamily, ParamGroup, ParameterStore, Randomizer, StoreEvent};
use renderer::{FrameRenderer, FrameUniforms};

use crate::bridge::UniformBridge;
use crate::deck::Deck;
use crate::navigation::{InputEvent, NavTiming, NavigationController, NotReadyError};
use crate::notify::Notification;

/// The assembled slider: one parameter store, one navigation controller
/// with its transition engine, and the uniform bridge that joins them.
#[derive(Debug)]
pub struct Slider {
    store: ParameterStore,
    navigation: NavigationController,
    bridge: UniformBridge,
    store_events: Receiver<StoreEvent>,
}

impl Slider {
    pub fn new(deck: Deck, mut store: ParameterStore, width: u32, height: u32) -> Self {
        let store_events = store.subscribe();
        let navigation = NavigationController::new(deck, NavTiming::from_store(&store));
        Self {
            store,
            navigation,
            bridge: UniformBridge::new(width, height),
            store_events,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.navigation.subscribe()
    }

    pub fn start(&mut self, now: Instant) -> Result<(), NotReadyError> {
        self.sync_store();
        self.navigation.start(now)
    }

    pub fn stop(&mut self) {
        self.navigation.stop();
    }

    /// Opens on `index` instead of the first slide; see
    /// [`NavigationController::open_at`].
    pub fn open_at(&mut self, index: usize) -> bool {
        self.navigation.open_at(index)
    }

    pub fn set_auto_play(&mut self, auto_play: bool, now: Instant) {
        self.navigation.set_auto_play(auto_play, now);
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> bool {
        self.navigation.handle_input(event, now)
    }

    pub fn navigate_to(&mut self, index: usize, now: Instant) -> bool {
        self.navigation.navigate_to(index, now)
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.navigation.next(now)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        self.navigation.previous(now)
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Runs `edit` against the store, then forwards its notifications and
    /// picks up timing changes.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut ParameterStore) -> R) -> R {
        let result = edit(&mut self.store);
        self.sync_store();
        result
    }

    pub fn randomize(&mut self, randomizer: &mut Randomizer) -> EffectFamily {
        self.edit(|store| randomizer.randomize(store))
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn deck(&self) -> &Deck {
        self.navigation.deck()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.bridge.resize(width, height);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.navigation.next_deadline()
    }

    /// Catches timers up to `now` and returns the uniforms for that instant.
    pub fn frame(&mut self, now: Instant) -> Option<FrameUniforms> {
        self.navigation.advance(now);
        self.sync_store();
        self.bridge.frame(&self.store, self.navigation.engine())
    }

    /// Returns `false` when there was nothing to draw yet.
    pub fn render<R>(&mut self, now: Instant, renderer: &mut R) -> anyhow::Result<bool>
    where
        R: FrameRenderer + ?Sized,
    {
        match self.frame(now) {
            Some(frame) => {
                renderer.render_frame(&frame)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn dispose(&mut self) {
        self.navigation.dispose();
    }

    fn sync_store(&mut self) {
        while let Ok(event) = self.store_events.try_recv() {
            match event {
                StoreEvent::ParametersChanged(changes) => {
                    if changes.iter().any(|change| change.key.group() == ParamGroup::Timing) {
                        self.apply_timing();
                    }
                    self.navigation
                        .notify(Notification::ParametersChanged(changes));
                }
                StoreEvent::EffectChanged { previous, current } => {
                    tracing::info!(effect = %current, "effect changed");
                    self.navigation
                        .notify(Notification::EffectChanged { previous, current });
                }
                StoreEvent::PresetChanged { effect, preset } => {
                    self.navigation
                        .notify(Notification::PresetChanged { effect, preset });
                }
                StoreEvent::Reset => {
                    self.apply_timing();
                    self.navigation.notify(Notification::ParametersReset {
                        effect: self.store.current_effect(),
                        preset: self.store.current_preset().to_string(),
                    });
                }
            }
        }
    }

    fn apply_timing(&mut self) {
        let timing = NavTiming::from_store(&self.store);
        tracing::debug!(
            transition_ms = timing.transition.as_millis() as u64,
            auto_slide_ms = timing.auto_slide.as_millis() as u64,
            "timing updated"
        );
        self.navigation.set_timing(timing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::tests::solid_deck;
    use effects::ParamKey;
    use renderer::HeadlessRenderer;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn timing_edits_reach_navigation() {
        let mut slider = Slider::new(solid_deck(3), ParameterStore::new(), 64, 36);
        slider
            .edit(|store| store.set(ParamKey::AutoSlideSpeed, 2000.0))
            .unwrap();
        slider
            .edit(|store| store.set(ParamKey::TransitionDuration, 1.0))
            .unwrap();
        assert_eq!(slider.navigation().timing().auto_slide, ms(2000));
        assert_eq!(slider.navigation().timing().transition, ms(1000));

        let now = Instant::now();
        slider.start(now).unwrap();
        slider.frame(now + ms(2000));
        assert_eq!(slider.navigation().current_index(), 1);
        assert_eq!(slider.navigation().engine().deadline(), Some(now + ms(3000)));
    }

    #[test]
    fn store_notifications_are_forwarded() {
        let mut slider = Slider::new(solid_deck(2), ParameterStore::new(), 64, 36);
        let events = slider.subscribe();
        slider
            .edit(|store| store.apply_preset(EffectFamily::Frost, "Arctic"))
            .unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received.first(),
            Some(&Notification::EffectChanged {
                previous: EffectFamily::Glass,
                current: EffectFamily::Frost
            })
        );
        assert!(received.contains(&Notification::PresetChanged {
            effect: EffectFamily::Frost,
            preset: "Arctic".into()
        }));
    }

    #[test]
    fn render_pushes_transition_frames() {
        let mut slider = Slider::new(solid_deck(2), ParameterStore::new(), 64, 36);
        let mut renderer = HeadlessRenderer::new();
        let now = Instant::now();
        assert!(slider.render(now, &mut renderer).unwrap());
        assert_eq!(renderer.last_block().unwrap().progress, 0.0);

        slider.start(now).unwrap();
        slider.next(now);
        slider.render(now + ms(1250), &mut renderer).unwrap();
        let block = renderer.last_block().unwrap();
        assert!((block.progress - 0.5).abs() < 1e-6);
        assert_eq!(block.effect_type, 0);

        slider.render(now + ms(2500), &mut renderer).unwrap();
        assert_eq!(renderer.last_block().unwrap().progress, 0.0);
        let target = slider.deck().texture(1).unwrap().id();
        assert_eq!(renderer.last_textures(), Some((target, target)));
    }

    #[test]
    fn randomize_switches_to_custom() {
        let mut slider = Slider::new(solid_deck(2), ParameterStore::new(), 64, 36);
        let mut randomizer = Randomizer::new(7);
        let family = slider.randomize(&mut randomizer);
        assert_eq!(slider.store().current_effect(), family);
        assert_eq!(slider.store().current_preset(), effects::CUSTOM_PRESET);
    }
}

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossbeam_channel::{never, Receiver, RecvTimeoutError};
use effects::{EffectFamily, Randomizer};
use renderer::{FrameRenderer, HeadlessRenderer, ImageLoader, ReferenceRenderer};
use slider::{Deck, InputEvent, Key, Notification, Slider};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{bootstrap_filesystem, build_store, load_deck};
use crate::cli::RunArgs;
use crate::commands::{spawn_stdin_reader, ShellCommand};
use crate::paths::AppPaths;
use crate::state::{AppState, SavedEffect};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let mut state = bootstrap_filesystem(&paths)?;
    let deck_path = args.config.clone().unwrap_or_else(|| paths.deck_file());
    if !deck_path.exists() {
        bail!(
            "no deck configuration at {}; pass --config or create it",
            deck_path.display()
        );
    }
    let (config, base) = load_deck(&deck_path)?;

    let loader = match args.max_texture {
        Some(max) => ImageLoader::with_max_dimension(max),
        None => ImageLoader::new(),
    };
    let (deck, failures) = Deck::load(&config, &base, &loader);
    if !failures.is_empty() {
        tracing::warn!(
            failed = failures.len(),
            loaded = deck.len(),
            "some slides could not be loaded"
        );
    }
    if deck.len() < slideconfig::MIN_SLIDES {
        bail!(
            "need at least {} loadable slides, only {} loaded from {}",
            slideconfig::MIN_SLIDES,
            deck.len(),
            deck_path.display()
        );
    }

    let store = build_store(&config, &state, args.fresh)?;
    let (width, height) = args
        .size
        .unwrap_or((config.display.width, config.display.height));
    let resume_at = state
        .last_slide
        .as_deref()
        .and_then(|id| deck.position(id));

    let mut slider = Slider::new(deck, store, width, height);
    if let Some(index) = resume_at.filter(|index| *index != 0) {
        if slider.open_at(index) {
            tracing::info!(index, "resuming at last shown slide");
        }
    }
    let notifications = slider.subscribe();
    let started = Instant::now();
    slider.set_auto_play(config.timing.auto_play, started);
    slider
        .start(started)
        .context("failed to start the slideshow")?;

    let mut renderer: Box<dyn FrameRenderer> = match &args.frames {
        Some(dir) => Box::new(ReferenceRenderer::with_output(dir.clone(), args.frame_stride)),
        None => Box::new(HeadlessRenderer::new()),
    };
    let mut randomizer = match args.seed {
        Some(seed) => Randomizer::new(seed),
        None => Randomizer::from_entropy(),
    };

    let frame_interval = Duration::from_secs_f32(1.0 / args.fps);
    let stop_at = args.duration.map(|duration| started + duration);
    let mut commands = spawn_stdin_reader();
    let mut next_frame = started;
    tracing::info!(
        slides = slider.deck().len(),
        width,
        height,
        fps = args.fps,
        effect = %slider.store().current_effect(),
        "slideshow running"
    );

    'main: loop {
        let now = Instant::now();
        if stop_at.is_some_and(|at| now >= at) {
            break;
        }
        if now >= next_frame {
            slider.render(now, renderer.as_mut())?;
            log_notifications(&notifications);
            next_frame += frame_interval;
            if next_frame < now {
                next_frame = now + frame_interval;
            }
        }

        let mut wake = next_frame;
        if let Some(at) = stop_at {
            wake = wake.min(at);
        }
        let timeout = wake.saturating_duration_since(Instant::now());
        match commands.recv_timeout(timeout) {
            Ok(command) => {
                let now = Instant::now();
                if !apply_command(&mut slider, &mut randomizer, command, now) {
                    break 'main;
                }
                log_notifications(&notifications);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                commands = never();
            }
        }
    }

    slider.dispose();
    tracing::info!(frames = ?args.frames.as_ref().map(|dir| dir.display().to_string()), "slideshow stopped");
    save_state(&paths, &mut state, &mut slider)
}

/// Returns `false` when the loop should stop.
fn apply_command(
    slider: &mut Slider,
    randomizer: &mut Randomizer,
    command: ShellCommand,
    now: Instant,
) -> bool {
    match command {
        ShellCommand::Next => {
            slider.handle_input(InputEvent::Key(Key::ArrowRight), now);
        }
        ShellCommand::Previous => {
            slider.handle_input(InputEvent::Key(Key::ArrowLeft), now);
        }
        ShellCommand::Space => {
            slider.handle_input(InputEvent::Key(Key::Space), now);
        }
        ShellCommand::Goto(number) => {
            slider.handle_input(InputEvent::NavItem(number - 1), now);
        }
        ShellCommand::Hide => {
            slider.handle_input(InputEvent::Visibility { visible: false }, now);
        }
        ShellCommand::Show => {
            slider.handle_input(InputEvent::Visibility { visible: true }, now);
        }
        ShellCommand::Pause => slider.set_auto_play(false, now),
        ShellCommand::Resume => slider.set_auto_play(true, now),
        ShellCommand::Random => {
            let family = slider.randomize(randomizer);
            tracing::info!(effect = %family, "randomized effect");
        }
        ShellCommand::Preset(name) => {
            let family = slider.store().current_effect();
            if let Err(err) = slider.edit(|store| store.apply_preset(family, &name)) {
                tracing::warn!(error = %err, "preset not applied");
            }
        }
        ShellCommand::Effect(name) => match name.parse::<EffectFamily>() {
            Ok(family) => slider.edit(|store| store.set_effect(family)),
            Err(err) => tracing::warn!(error = %err, "effect not changed"),
        },
        ShellCommand::Set(key, value) => {
            if let Err(err) = slider.edit(|store| store.set_by_name(&key, value)) {
                tracing::warn!(error = %err, "parameter not changed");
            }
        }
        ShellCommand::Status => print_status(slider),
        ShellCommand::Quit => return false,
    }
    true
}

fn print_status(slider: &Slider) {
    let state = slider.navigation().state();
    let total = slider.deck().len();
    let title = slider
        .deck()
        .slide(state.current_index)
        .map(|slide| slide.title.as_str())
        .unwrap_or_default();
    println!(
        "slide {:02}/{:02} {title} effect={} preset={} progress={:.0}% transitioning={}",
        state.current_index + 1,
        total,
        slider.store().current_effect(),
        slider.store().current_preset(),
        state.auto_advance_progress,
        slider.navigation().engine().in_progress()
    );
}

fn log_notifications(notifications: &Receiver<Notification>) {
    for notification in notifications.try_iter() {
        match notification {
            Notification::SlideChanged {
                index,
                total,
                slide_id,
            } => {
                tracing::info!(slide = %slide_id, "slide {:02}/{:02}", index + 1, total);
            }
            Notification::EffectChanged { current, .. } => {
                tracing::info!(effect = %current, "effect changed");
            }
            Notification::PresetChanged { effect, preset } => {
                tracing::info!(effect = %effect, preset = %preset, "preset changed");
            }
            Notification::ProgressUpdated { .. } => {}
            other => tracing::debug!(?other, "slider notification"),
        }
    }
}

fn save_state(paths: &AppPaths, state: &mut AppState, slider: &mut Slider) -> Result<()> {
    let current = slider.navigation().current_index();
    let last_slide = slider.deck().slide(current).map(|slide| slide.id.clone());
    let dirty = slider.store().is_dirty();
    if !dirty && state.last_slide == last_slide {
        return Ok(());
    }

    state.last_slide = last_slide;
    if dirty {
        state.effect = Some(SavedEffect::from_config(&slider.store().get_all()));
    }
    state.persist(&paths.state_file())?;
    slider.edit(|store| store.mark_saved());
    tracing::debug!(path = %paths.state_file().display(), "saved slidewall state");
    Ok(())
}

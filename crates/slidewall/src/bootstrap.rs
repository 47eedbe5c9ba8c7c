use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use effects::{EffectFamily, ParamKey, ParameterStore, DEFAULT_PRESET};
use slideconfig::DeckConfig;
use tracing::{debug, info, warn};

use crate::paths::AppPaths;
use crate::state::AppState;

pub fn bootstrap_filesystem(paths: &AppPaths) -> Result<AppState> {
    ensure_directory(paths.config_dir())?;

    let state_path = paths.state_file();
    let state = AppState::load_or_default(&state_path)?;
    if state_path.exists() {
        debug!(path = %state_path.display(), "loaded slidewall state file");
    }
    Ok(state)
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            Ok(())
        } else {
            bail!("filesystem entry at {} is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path).with_context(|| {
            format!("failed to create slidewall directory at {}", path.display())
        })?;
        info!(path = %path.display(), "created slidewall directory");
        Ok(())
    }
}

/// Reads and validates the deck; relative media paths resolve against the
/// returned directory.
pub fn load_deck(path: &Path) -> Result<(DeckConfig, PathBuf)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read deck configuration at {}", path.display()))?;
    let config = DeckConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid deck configuration at {}", path.display()))?;
    let base = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(path = %path.display(), slides = config.slides.len(), "loaded deck configuration");
    Ok((config, base))
}

/// Builds the parameter store. A saved configuration wins unless `fresh`
/// is set; otherwise the deck's effect section and timing apply.
pub fn build_store(deck: &DeckConfig, state: &AppState, fresh: bool) -> Result<ParameterStore> {
    let mut store = ParameterStore::new();

    if !fresh {
        if let Some(saved) = &state.effect {
            match saved.to_config().and_then(|config| {
                store
                    .restore(config)
                    .context("saved effect configuration is out of bounds")
            }) {
                Ok(()) => {
                    info!(
                        effect = %store.current_effect(),
                        preset = store.current_preset(),
                        "restored saved effect configuration"
                    );
                    return Ok(store);
                }
                Err(err) => warn!(error = %format!("{err:#}"), "ignoring saved effect configuration"),
            }
        }
    }

    let family: EffectFamily = match &deck.effect.name {
        Some(name) => name
            .parse()
            .with_context(|| format!("deck selects unknown effect '{name}'"))?,
        None => EffectFamily::Glass,
    };
    let preset = deck.effect.preset.as_deref().unwrap_or(DEFAULT_PRESET);
    store
        .apply_preset(family, preset)
        .with_context(|| format!("deck selects unknown preset '{preset}'"))?;

    let mut patch = vec![
        (
            ParamKey::TransitionDuration,
            deck.timing.transition.as_secs_f32(),
        ),
        (
            ParamKey::AutoSlideSpeed,
            deck.timing.auto_slide.as_millis() as f32,
        ),
    ];
    for (name, value) in &deck.effect.overrides {
        let key: ParamKey = name
            .parse()
            .with_context(|| format!("deck overrides unknown parameter '{name}'"))?;
        patch.push((key, *value));
    }
    store
        .set_many(patch)
        .context("deck effect settings are out of bounds")?;
    store.mark_saved();
    Ok(store)
}

//! One-shot subcommands: `render` and `randomize`.

use anyhow::{Context, Result};
use effects::{EffectConfig, EffectFamily, ParameterStore, Randomizer};
use renderer::{reference, FrameUniforms, ImageLoader, TextureLoader};

use crate::cli::{RandomizeArgs, RenderArgs};

/// Applies the preset and then each override in order.
pub fn configure_store(effect: &str, preset: &str, overrides: &[(String, f32)]) -> Result<ParameterStore> {
    let family: EffectFamily = effect
        .parse()
        .with_context(|| format!("unknown effect '{effect}'"))?;
    let mut store = ParameterStore::new();
    store
        .apply_preset(family, preset)
        .with_context(|| format!("unknown preset '{preset}' for {family}"))?;
    for (name, value) in overrides {
        store
            .set_by_name(name, *value)
            .with_context(|| format!("cannot set {name}={value}"))?;
    }
    Ok(store)
}

pub fn render(args: RenderArgs) -> Result<()> {
    let store = configure_store(&args.effect, &args.preset, &args.overrides)?;
    let loader = ImageLoader::new();
    let texture1 = loader.load(&args.from)?;
    let texture2 = loader.load(&args.to)?;
    let (width, height) = args.size;

    let frame = FrameUniforms {
        progress: args.progress,
        effect: store.current_effect(),
        values: store.get_all().values,
        texture1,
        texture2,
        resolution: [width as f32, height as f32],
    };
    let image = reference::render_image(&frame);
    reference::save_png(&image, &args.out)?;
    tracing::info!(
        effect = %frame.effect,
        preset = store.current_preset(),
        progress = frame.progress,
        "rendered transition frame"
    );
    println!("{}", args.out.display());
    Ok(())
}

pub fn randomize(args: RandomizeArgs) -> Result<()> {
    let mut randomizer = match args.seed {
        Some(seed) => Randomizer::new(seed),
        None => Randomizer::from_entropy(),
    };
    let config = randomized_config(&mut randomizer);
    let rendered =
        serde_json::to_string_pretty(&config).context("failed to encode configuration as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn randomized_config(randomizer: &mut Randomizer) -> EffectConfig {
    let mut store = ParameterStore::new();
    randomizer.randomize(&mut store);
    store.get_all()
}

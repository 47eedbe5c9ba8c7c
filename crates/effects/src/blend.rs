//! CPU reference of the per-pixel transition functions.
//!
//! Each family maps `(uv, progress)` to a color from two samplers. The GPU
//! path runs the equivalent GLSL in `shaders/transition.frag`; this module is
//! what headless rendering and the tests evaluate.

use crate::family::EffectFamily;
use crate::math::{mix, rand_hash, smooth_noise, smoothstep, Rgba, Vec2};
use crate::params::{ParamKey, ParamValues};

/// Progress after which every family converges to the undistorted target.
pub const CLEANUP_TAIL_START: f32 = 0.95;

/// A texture that can be sampled in normalized coordinates.
pub trait Sampler {
    /// Pixel dimensions used for aspect-correct cover mapping.
    fn size(&self) -> Vec2;

    /// Color at `uv` in texture space. Out-of-range coordinates clamp to the edge.
    fn sample(&self, uv: Vec2) -> Rgba;
}

/// Maps a viewport coordinate onto a texture so the texture covers the
/// viewport while keeping its aspect ratio (cropping the overflow).
pub fn cover_uv(uv: Vec2, resolution: Vec2, texture_size: Vec2) -> Vec2 {
    if texture_size.x <= 0.0 || texture_size.y <= 0.0 || resolution.x <= 0.0 || resolution.y <= 0.0 {
        return uv;
    }
    let scale = (resolution / texture_size).max_element();
    let scaled = texture_size * scale;
    let offset = (resolution - scaled) * 0.5;
    (uv * resolution - offset) / scaled
}

/// Everything a blend function reads besides the pixel coordinate.
pub struct BlendInput<'a> {
    pub from: &'a dyn Sampler,
    pub to: &'a dyn Sampler,
    pub resolution: Vec2,
    pub values: &'a ParamValues,
}

impl BlendInput<'_> {
    fn v(&self, key: ParamKey) -> f32 {
        self.values.get(key)
    }

    fn from_at(&self, uv: Vec2) -> Rgba {
        self.from
            .sample(cover_uv(uv, self.resolution, self.from.size()))
    }

    fn to_at(&self, uv: Vec2) -> Rgba {
        self.to.sample(cover_uv(uv, self.resolution, self.to.size()))
    }
}

type BlendFn = fn(&BlendInput<'_>, Vec2, f32) -> Rgba;

/// Handle the renderer uses to dispatch one family's blend.
#[derive(Debug, Clone, Copy)]
pub struct TransitionFunction {
    pub family: EffectFamily,
    /// Value of `uEffectType` that selects this branch in the shader.
    pub selector: i32,
    /// Name of the GLSL function implementing the same blend.
    pub glsl_entry: &'static str,
    blend: BlendFn,
}

impl TransitionFunction {
    pub fn for_family(family: EffectFamily) -> Self {
        let (glsl_entry, blend): (&'static str, BlendFn) = match family {
            EffectFamily::Glass => ("glassEffect", glass),
            EffectFamily::Frost => ("frostEffect", frost),
            EffectFamily::Ripple => ("rippleEffect", ripple),
            EffectFamily::Plasma => ("plasmaEffect", plasma),
            EffectFamily::Timeshift => ("timeshiftEffect", timeshift),
        };
        Self {
            family,
            selector: family.selector(),
            glsl_entry,
            blend,
        }
    }

    /// Color at `uv` for `progress`. Progress is clamped to `0.0..=1.0`;
    /// zero returns the source image and one returns the target image.
    pub fn evaluate(&self, input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        if progress <= 0.0 {
            return input.from_at(uv);
        }
        let color = (self.blend)(input, uv, progress);
        cleanup_tail(color, input.to_at(uv), progress)
    }
}

fn cleanup_tail(color: Rgba, target: Rgba, progress: f32) -> Rgba {
    if progress <= CLEANUP_TAIL_START {
        return color;
    }
    let t = ((progress - CLEANUP_TAIL_START) / (1.0 - CLEANUP_TAIL_START)).min(1.0);
    color.mix(target, t)
}

fn enhance(color: Rgba, amount: f32) -> Rgba {
    color.mix_rgb(color.map_rgb(|c| c * 1.2), (amount - 1.0) * 0.5)
}

const CENTER: Vec2 = Vec2::splat(0.5);

fn glass(input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
    use ParamKey::*;
    const RIM_LIGHT_WIDTH: f32 = 0.05;
    const GLASS_EDGE_WIDTH: f32 = 0.025;

    let global = input.v(GlobalIntensity);
    let speed = input.v(SpeedMultiplier);
    let distortion = input.v(DistortionStrength);
    let edge_glow = input.v(GlassEdgeGlow);

    let glass_strength = 0.08 * input.v(GlassRefractionStrength) * distortion * global;
    let chromatic = 0.02 * input.v(GlassChromaticAberration) * global;
    let wave_distortion = 0.025 * distortion;
    let clear_center = 0.3 * input.v(GlassBubbleClarity);
    let surface_ripples = 0.004 * distortion;
    let liquid_flow = 0.015 * input.v(GlassLiquidFlow) * speed;

    let brightness_phase = smoothstep(0.8, 1.0, progress);
    let rim_intensity = 0.08 * (1.0 - brightness_phase) * edge_glow * global;
    let edge_opacity = 0.06 * (1.0 - brightness_phase) * edge_glow;

    let resolution = input.resolution;
    let p = uv * resolution;
    let to_uv = cover_uv(uv, resolution, input.to.size());

    let bubble_radius = progress * resolution.length() * 0.85;
    let sphere_center = CENTER * resolution;
    let dist = (p - sphere_center).length();
    let normalized = dist / bubble_radius.max(0.001);
    let direction = (p - sphere_center).normalize_or_zero();
    let inside = smoothstep(bubble_radius + 3.0, bubble_radius - 3.0, dist);

    let distance_factor = smoothstep(clear_center, 1.0, normalized);
    let time = progress * 5.0 * speed;

    let liquid_surface = (Vec2::new(
        smooth_noise(uv * 100.0 + time * 0.3),
        smooth_noise(uv * 100.0 + time * 0.2 + 50.0),
    ) - 0.5)
        * (surface_ripples * distance_factor);

    let mut distorted = to_uv;
    if inside > 0.0 {
        let refraction = glass_strength * distance_factor.powf(1.5);
        let flow_direction =
            (direction + Vec2::new(time.sin(), (time * 0.7).cos()) * 0.3).normalize_or_zero();
        distorted -= flow_direction * refraction;

        let wave1 = (normalized * 22.0 - time * 3.5).sin();
        let wave2 = (normalized * 35.0 + time * 2.8).sin() * 0.7;
        let wave3 = (normalized * 50.0 - time * 4.2).sin() * 0.5;
        let wave_offset = (wave1 + wave2 + wave3) / 3.0 * wave_distortion * distance_factor;
        distorted -= direction * wave_offset + liquid_surface;

        distorted += Vec2::new(
            (time + normalized * 10.0).sin(),
            (time * 0.8 + normalized * 8.0).cos(),
        ) * (liquid_flow * distance_factor * inside);
    }

    let mut new_img = if inside > 0.0 {
        let aberration = chromatic * distance_factor.powf(1.2);
        Rgba::new(
            input.to.sample(distorted + direction * aberration * 1.2).r,
            input.to.sample(distorted + direction * aberration * 0.2).g,
            input.to.sample(distorted - direction * aberration * 0.8).b,
            1.0,
        )
    } else {
        input.to.sample(to_uv)
    };

    if inside > 0.0 && rim_intensity > 0.0 {
        let outer = 1.0 - smoothstep(1.0, 1.01, normalized);
        let rim = smoothstep(1.0 - RIM_LIGHT_WIDTH, 1.0, normalized) * outer;
        new_img = new_img.map_rgb(|c| c + rim * rim_intensity);

        let edge = smoothstep(1.0 - GLASS_EDGE_WIDTH, 1.0, normalized) * outer;
        new_img = new_img.mix_rgb(Rgba::WHITE, edge * edge_opacity);
    }

    let new_img = enhance(new_img, input.v(ColorEnhancement));
    input.from_at(uv).mix(new_img, inside)
}

fn frost(input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
    use ParamKey::*;

    let current = input.from_at(uv);
    let regular = input.to_at(uv);

    let crystal_size = input.v(FrostCrystalSize);
    let temperature = input.v(FrostTemperature);
    let effective_intensity = input.v(FrostIntensity) * input.v(GlobalIntensity);
    let crystal_scale = 80.0 / crystal_size;
    let ice_scale = 40.0 / crystal_size;

    let frost1 = smooth_noise(uv * crystal_scale * input.v(FrostTexture));
    let frost2 = smooth_noise(uv * ice_scale + 50.0) * 0.7;
    let frost3 = smooth_noise(uv * (crystal_scale * 2.0) + 100.0) * 0.3;
    let frost = (frost1 + frost2 + frost3) / 2.0;

    let ice_spread = smooth_noise(uv * (25.0 / crystal_size) + 200.0);

    let jitter_base = uv + frost * 0.1;
    let mut jitter = Vec2::new(rand_hash(jitter_base), rand_hash(jitter_base + 0.5));

    let coverage = input.v(FrostIceCoverage).clamp(0.1, 2.5);
    let size = mix(progress, progress.sqrt(), 0.5) * 1.12 * coverage + 0.000_000_1;
    let lens_y = (size.powi(4) / 2.0).clamp(size * 0.1, size * 8.0);

    let dist = uv.distance(CENTER);
    let vignette = (1.0 - smoothstep(size, lens_y, dist)).powi(2);

    let frostyness = 0.8 * effective_intensity * input.v(DistortionStrength);
    jitter = jitter * (frost * vignette * frostyness * (1.0 - vignette.floor()));

    let temp_shift = (temperature * 0.15).clamp(0.0, 0.3);
    let tint = Rgba::new(
        (0.85 + temp_shift).clamp(0.7, 1.2),
        0.9,
        (1.2 - temp_shift).clamp(0.8, 1.3),
        1.0,
    );
    let frozen = input
        .to_at(uv + jitter * 0.06)
        .mul(tint)
        .mix(Rgba::new(0.9, 0.95, 1.1, 1.0), (0.1 * temperature).clamp(0.0, 0.25));

    let frost_mask = smoothstep(ice_spread * 0.8, 1.0, vignette.powf(1.5));
    let frost_result = frozen.mix(regular, frost_mask);

    let transition_start = mix(0.85, 0.7, (effective_intensity - 1.0).clamp(0.0, 1.0));
    let color_transition = smoothstep(transition_start, 1.0, progress);
    let final_frost = enhance(
        frost_result.mix(regular, color_transition),
        input.v(ColorEnhancement),
    );

    current.mix(final_frost, smoothstep(0.0, 1.0, progress))
}

fn ripple(input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
    use ParamKey::*;
    const MAX_DIST: f32 = 0.8;

    let current = input.from_at(uv);
    let new_img = input.to_at(uv);

    let dist = uv.distance(CENTER);
    let frequency = input.v(RippleFrequency);
    let decay = input.v(RippleDecay);
    let count = input.v(RippleRippleCount);
    let speed = input.v(RippleWaveSpeed) * input.v(SpeedMultiplier);
    let amplitude = input.v(RippleAmplitude) * input.v(DistortionStrength) * input.v(GlobalIntensity);

    let wave_radius = progress * MAX_DIST * 1.5 * speed;
    let ring = |radius: f32, freq: f32, falloff: f32| {
        ((dist - radius) * frequency * freq).sin() * (-(dist - radius).abs() * falloff * decay).exp()
    };
    let ripple1 = ring(wave_radius, 1.0, 8.0);
    let ripple2 = ring(wave_radius * 0.7, 1.3, 6.0) * 0.6 * count;
    let ripple3 = ring(wave_radius * 0.4, 1.8, 4.0) * 0.3 * count;
    let combined = (ripple1 + ripple2 + ripple3) * amplitude;

    let normal = (uv - CENTER).normalize_or_zero();
    let distorted = input.to_at(uv + normal * combined);

    let fade_edge = smoothstep(MAX_DIST, MAX_DIST * 0.9, dist);
    let mask = smoothstep(0.0, 0.3, progress) * (1.0 - smoothstep(0.7, 1.0, progress));
    let result = new_img.mix(new_img.mix(distorted, fade_edge), mask);
    let result = enhance(result, input.v(ColorEnhancement));

    current.mix(result, smoothstep(0.0, 1.0, progress))
}

fn plasma(input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
    use ParamKey::*;

    let current = input.from_at(uv);
    let new_img = input.to_at(uv);

    let distortion = input.v(DistortionStrength);
    let energy = input.v(PlasmaEnergyIntensity);
    let turbulence = input.v(PlasmaTurbulence);
    let effective_intensity = input.v(PlasmaIntensity) * input.v(GlobalIntensity);
    let time = progress * 8.0 * input.v(PlasmaSpeed) * input.v(SpeedMultiplier);

    let plasma1 = (uv.x * 10.0 + time).sin() * (uv.y * 8.0 + time * 0.7).cos();
    let plasma2 = ((uv.x + uv.y) * 12.0 + time * 1.3).sin() * ((uv.x - uv.y) * 15.0 + time * 0.9).cos();
    let plasma3 = ((uv - CENTER).length() * 20.0 + time * 1.8).sin();

    let turbulence1 = smooth_noise(uv * 15.0 * turbulence + Vec2::new(time * 0.5, time * 0.3));
    let turbulence2 = smooth_noise(uv * 25.0 * turbulence + Vec2::new(time * 0.8, -time * 0.4)) * 0.7;
    let turbulence3 = smooth_noise(uv * 40.0 * turbulence + Vec2::new(-time * 0.6, time * 0.9)) * 0.4;
    let combined_turbulence = (turbulence1 + turbulence2 + turbulence3) / 2.1;

    let field = (plasma1 + plasma2 + plasma3) * 0.333 + combined_turbulence * 0.5;
    let field = (field * std::f32::consts::PI).sin();

    let phase = smoothstep(0.0, 0.3, progress) * (1.0 - smoothstep(0.7, 1.0, progress));
    let strength = effective_intensity * phase * distortion;

    let electric = Vec2::new(
        (field * 6.28 + time).sin() * 0.02,
        (field * 4.71 + time * 1.1).cos() * 0.02,
    ) * strength;
    let flow1 = (Vec2::new(
        smooth_noise(uv * 8.0 + time * 0.4),
        smooth_noise(uv * 8.0 + time * 0.4 + 100.0),
    ) - 0.5)
        * (0.015 * strength);
    let flow2 = (Vec2::new(
        smooth_noise(uv * 16.0 + time * 0.6 + 200.0),
        smooth_noise(uv * 16.0 + time * 0.6 + 300.0),
    ) - 0.5)
        * (0.008 * strength);
    let displaced = uv + electric + flow1 + flow2;

    let blended = input.from_at(displaced).mix(input.to_at(displaced), progress);

    let energy_mask = field.abs() * phase * effective_intensity;
    let pulse = (time * 4.0).sin() * 0.5 + 0.5;
    let glow_strength = energy_mask * energy * (0.7 + pulse * 0.3);

    let contrast = 1.0 + energy_mask * input.v(PlasmaContrastBoost);
    let contrasted = blended.map_rgb(|c| (c - 0.5) * contrast + 0.5);
    let luminance = contrasted.luminance();
    let saturation = 1.0 + energy_mask * 0.4;
    let saturated = contrasted.map_rgb(|c| mix(luminance, c, saturation));

    let mut glow = Rgba::new(
        saturated.r + 0.9 * glow_strength,
        saturated.g + 0.95 * glow_strength,
        saturated.b + glow_strength,
        1.0,
    );

    let crackle = smoothstep(0.85, 1.0, smooth_noise(uv * 50.0 + time * 2.0)) * energy_mask;
    glow = glow.map_rgb(|c| c + crackle * energy * 0.5);

    let brightness_pulse = (time * 6.0 + field * 10.0).sin() * 0.5 + 0.5;
    glow = glow.map_rgb(|c| c + energy_mask * brightness_pulse * energy * 0.2);

    let mut result = enhance(glow, input.v(ColorEnhancement));
    if progress > 0.85 {
        result = result.mix(new_img, (progress - 0.85) / 0.15);
    }

    current.mix(result, smoothstep(0.0, 1.0, progress))
}

fn timeshift(input: &BlendInput<'_>, uv: Vec2, progress: f32) -> Rgba {
    use ParamKey::*;

    let current = input.from_at(uv);
    let new_img = input.to_at(uv);

    let global = input.v(GlobalIntensity);
    let distortion = input.v(TimeshiftDistortion) * input.v(DistortionStrength) * global;
    let blur = input.v(TimeshiftBlur) * global;
    let flow = input.v(TimeshiftFlow) * input.v(SpeedMultiplier);
    let chromatic = input.v(TimeshiftChromatic) * global;
    let turbulence_scale = input.v(TimeshiftTurbulence);

    let resolution = input.resolution;
    let circle_radius = progress * resolution.length() * 0.85;
    let dist = (uv * resolution - CENTER * resolution).length();
    let normalized = dist / circle_radius.max(0.001);

    let boundary = circle_radius * 0.2 * blur;
    let inside = smoothstep(circle_radius + boundary, circle_radius - boundary, dist);

    let color = if inside > 0.01 && inside < 0.99 {
        let from_center = uv - CENTER;
        let radius = from_center.length();
        let direction = from_center.normalize_or_zero();

        let boundary_strength = smoothstep(0.0, 0.3, inside) * smoothstep(1.0, 0.7, inside);
        let time = progress * 6.28 * flow;

        let turb1 = smooth_noise(uv * 12.0 * turbulence_scale + time * 0.4);
        let turb2 = smooth_noise(uv * 20.0 * turbulence_scale - time * 0.5);
        let turb3 = smooth_noise(uv * 35.0 * turbulence_scale + time * 0.7);
        let turb4 = smooth_noise(uv * 55.0 * turbulence_scale - time * 0.4);
        let turbulence = Vec2::new(
            (turb1 - 0.5) * 1.2 + (turb2 - 0.5) * 0.8 + (turb3 - 0.5) * 0.4,
            (turb2 - 0.5) * 1.2 + (turb3 - 0.5) * 0.8 + (turb4 - 0.5) * 0.4,
        );

        let mut displacement = turbulence * (0.18 * distortion * boundary_strength);
        let radial_pull = (normalized * 12.0 - time * 2.5).sin() * 0.05 * distortion;
        displacement += direction * (radial_pull * boundary_strength);
        let swirl = (time * 2.5 + normalized * 10.0).sin() * 0.06 * flow;
        displacement += direction.perp() * (swirl * boundary_strength);

        let shifted = uv + displacement;
        let mut old = input.from_at(shifted);
        let mut new = input.to_at(shifted);

        if chromatic > 0.01 {
            let offset = direction * (boundary_strength * 0.03 * chromatic);
            let red_uv = shifted + offset * 2.0;
            let blue_uv = shifted - offset * 1.2;
            old = Rgba::new(input.from_at(red_uv).r, old.g, input.from_at(blue_uv).b, 1.0);
            new = Rgba::new(input.to_at(red_uv).r, new.g, input.to_at(blue_uv).b, 1.0);
        }

        let mut color = old.mix(new, inside);
        if blur > 0.5 {
            let smear = turbulence * 0.015;
            let blurred = color
                .add(input.to_at(shifted + smear))
                .add(input.to_at(shifted - smear))
                .add(input.from_at(shifted + Vec2::new(smear.y, -smear.x)))
                .scale(0.25);
            color = color.mix(blurred, boundary_strength * blur * 0.6);
        }
        color
    } else if inside >= 0.99 {
        new_img
    } else {
        current
    };

    let color = enhance(color, input.v(ColorEnhancement));
    current.mix(color, smoothstep(0.0, 1.0, progress))
}

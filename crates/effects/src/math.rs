//! Scalar helpers with GLSL semantics, so the CPU blend functions read
//! line-for-line like the fragment shader they mirror. Vectors are `glam`.

pub use glam::Vec2;

/// Linear RGBA color with components nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn mix(self, other: Rgba, t: f32) -> Rgba {
        Rgba::new(
            mix(self.r, other.r, t),
            mix(self.g, other.g, t),
            mix(self.b, other.b, t),
            mix(self.a, other.a, t),
        )
    }

    /// Mixes only the color channels and keeps alpha.
    pub fn mix_rgb(self, other: Rgba, t: f32) -> Rgba {
        Rgba::new(
            mix(self.r, other.r, t),
            mix(self.g, other.g, t),
            mix(self.b, other.b, t),
            self.a,
        )
    }

    pub fn map_rgb(self, f: impl Fn(f32) -> f32) -> Rgba {
        Rgba::new(f(self.r), f(self.g), f(self.b), self.a)
    }

    pub fn mul(self, other: Rgba) -> Rgba {
        Rgba::new(
            self.r * other.r,
            self.g * other.g,
            self.b * other.b,
            self.a * other.a,
        )
    }

    pub fn add(self, other: Rgba) -> Rgba {
        Rgba::new(
            self.r + other.r,
            self.g + other.g,
            self.b + other.b,
            self.a + other.a,
        )
    }

    pub fn scale(self, k: f32) -> Rgba {
        Rgba::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }

    pub fn luminance(self) -> f32 {
        self.r * 0.299 + self.g * 0.587 + self.b * 0.114
    }

    pub fn approx_eq(self, other: Rgba, epsilon: f32) -> bool {
        (self.r - other.r).abs() <= epsilon
            && (self.g - other.g).abs() <= epsilon
            && (self.b - other.b).abs() <= epsilon
            && (self.a - other.a).abs() <= epsilon
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn from_rgba8(px: [u8; 4]) -> Rgba {
        let f = |v: u8| f32::from(v) / 255.0;
        Rgba::new(f(px[0]), f(px[1]), f(px[2]), f(px[3]))
    }
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// Hermite step. Equal edges degrade to a hard step instead of dividing by zero.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn noise(p: Vec2) -> f32 {
    fract((p.dot(Vec2::new(127.1, 311.7))).sin() * 43758.547)
}

/// Value noise with Hermite interpolation between lattice hashes.
pub fn smooth_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;
    let f = f * f * (Vec2::splat(3.0) - f * 2.0);

    mix(
        mix(noise(i), noise(i + Vec2::new(1.0, 0.0)), f.x),
        mix(noise(i + Vec2::new(0.0, 1.0)), noise(i + Vec2::new(1.0, 1.0)), f.x),
        f.y,
    )
}

pub fn rand_hash(uv: Vec2) -> f32 {
    let a = uv.dot(Vec2::new(92.0, 80.0));
    let b = uv.dot(Vec2::new(41.0, 62.0));
    fract(a.sin() + b.cos() * 51.0)
}

//! Renderer collaborators for the slider.
//!
//! ```text
//!   slider::UniformBridge
//!          │ FrameUniforms
//!          ▼
//!   FrameRenderer::render_frame ──▶ UniformBlock (std140) ──▶ GPU backend
//!                               └─▶ reference::render_image (CPU) ──▶ PNG
//! ```
//!
//! Textures come from a [`TextureLoader`]; [`TextureSet::load_all`] keeps the
//! slides that decoded and logs the rest.

mod frame;
pub mod reference;
mod texture;
mod uniforms;

pub use frame::{FrameRenderer, HeadlessRenderer};
pub use reference::ReferenceRenderer;
pub use texture::{ImageLoader, LoadFailure, LoadedTexture, TextureHandle, TextureLoader, TextureSet};
pub use uniforms::{FrameUniforms, UniformBlock};

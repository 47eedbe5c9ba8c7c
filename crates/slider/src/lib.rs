//! Slide navigation, transition timing and the per-frame uniform bridge.
//!
//! ```text
//!   InputEvent / timers ──▶ NavigationController ──▶ TransitionEngine
//!                                   │                      │ progress, textures
//!   ParameterStore ─────────────────┼──────▶ UniformBridge ◀┘
//!                                   ▼              │
//!                             Notification    FrameUniforms ──▶ FrameRenderer
//! ```

mod bridge;
mod context;
mod deck;
mod engine;
mod navigation;
mod notify;

pub use bridge::UniformBridge;
pub use context::Slider;
pub use deck::{Deck, DeckEntry, Slide};
pub use engine::{ease_in_out, Completion, TransitionEngine};
pub use navigation::{
    InputEvent, Key, NavTiming, NavigationController, NavigationState, NotReadyError,
    MIN_SWIPE_DISTANCE, PROGRESS_FADE, PROGRESS_TICK, RESTART_DELAY,
};
pub use notify::Notification;

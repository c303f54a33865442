//! Animated 3D background layer for page sections.
//!
//! [`BackdropCanvas`] is the page-facing component. Everything below it is
//! host-independent: [`Backdrop`] drives a [`Scene`] through a [`Renderer`]
//! on any [`Host`] and [`GraphicsBackend`], so the lifecycle runs natively
//! in tests.

mod component;
pub mod config;
pub mod connections;
pub mod dom;
pub mod geometry;
pub mod gpu;
pub mod lifecycle;
pub mod renderer;
pub mod scene;
pub mod shapes;
#[cfg(test)]
mod testing;
pub mod viewport;
pub mod webgl;

pub use component::BackdropCanvas;
pub use config::BackdropConfig;
pub use gpu::GraphicsBackend;
pub use lifecycle::{Backdrop, CancelHandle, Host, Phase};
pub use renderer::Renderer;
pub use scene::Scene;

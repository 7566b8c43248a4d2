mod canvas;
mod converter;
mod framebuffer;
mod icons;
mod mock;
mod stats;
mod surface;
#[cfg(test)]
mod tests;

pub use canvas::{Canvas, Color};
pub use converter::{DisplayConverter, FrameConverter, I420Converter};
pub use framebuffer::FramebufferSurface;
pub use icons::{Icon, IconSet};
pub use mock::{MemorySurface, MemorySurfaceState};
pub use stats::DisplayStats;
pub use surface::DisplaySurface;

use super::canvas::Color;
use super::icons::Icon;
use crate::error::Result;

/// Presentation surface the control loop draws on.
///
/// Drawing calls compose into a back buffer; nothing reaches the screen
/// until `present`.
pub trait DisplaySurface: Send {
    fn size(&self) -> (u32, u32);

    fn fill(&mut self, color: Color);

    fn blit_rgb(&mut self, rgb: &[u8], width: u32, height: u32, x: i32, y: i32);

    fn blit_icon(&mut self, icon: &Icon, x: i32, y: i32);

    fn present(&mut self) -> Result<()>;
}

//! On-screen buttons: geometry, hit testing and action dispatch.

use crate::config::ButtonConfig;
use crate::error::{DashcamError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(test)]
mod tests;

/// Screen coordinate in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle covering `x..=x+width-1` and `y..=y+height-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let right = self.x as i64 + self.width as i64 - 1;
        let bottom = self.y as i64 + self.height as i64 - 1;
        let (px, py) = (point.x as i64, point.y as i64);
        px >= self.x as i64 && px <= right && py >= self.y as i64 && py <= bottom
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// What pressing a button does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    StartRecording,
    Shutdown,
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    pub rect: Rect,
    pub icon: Option<String>,
    pub action: Option<ButtonAction>,
    pub param: Option<String>,
}

impl ButtonSpec {
    pub fn new(
        rect: Rect,
        icon: Option<String>,
        action: Option<ButtonAction>,
        param: Option<String>,
    ) -> Result<Self> {
        if rect.width == 0 || rect.height == 0 {
            return Err(DashcamError::component(
                "buttons",
                "Button width and height must be positive",
            ));
        }

        Ok(Self {
            rect,
            icon,
            action,
            param,
        })
    }

    /// Top-left corner that centers an icon of the given size inside the button
    pub fn icon_position(&self, icon_width: u32, icon_height: u32) -> Point {
        Point::new(
            self.rect.x + (self.rect.width as i32 - icon_width as i32) / 2,
            self.rect.y + (self.rect.height as i32 - icon_height as i32) / 2,
        )
    }
}

impl TryFrom<&ButtonConfig> for ButtonSpec {
    type Error = DashcamError;

    fn try_from(config: &ButtonConfig) -> Result<Self> {
        let (x, y, width, height) = config.rect;
        ButtonSpec::new(
            Rect::new(x, y, width, height),
            config.icon.clone(),
            config.action,
            config.param.clone(),
        )
    }
}

/// Ordered button set; earlier registrations win on overlap
#[derive(Debug, Default)]
pub struct ButtonRegistry {
    buttons: Vec<ButtonSpec>,
}

impl ButtonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[ButtonConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(ButtonSpec::try_from(config)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, spec: ButtonSpec) {
        debug!(
            "Registered button at ({}, {}) {}x{} action={:?}",
            spec.rect.x, spec.rect.y, spec.rect.width, spec.rect.height, spec.action
        );
        self.buttons.push(spec);
    }

    pub fn buttons(&self) -> &[ButtonSpec] {
        &self.buttons
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn hit_test(&self, point: Point) -> Option<&ButtonSpec> {
        self.buttons.iter().find(|b| b.rect.contains(point))
    }

    /// Invoke `handler` for the first button containing `point` that has an action.
    ///
    /// Returns true when a button was hit, whether or not it carried an action.
    pub fn dispatch<F>(&self, point: Point, mut handler: F) -> bool
    where
        F: FnMut(ButtonAction, Option<&str>),
    {
        match self.hit_test(point) {
            Some(button) => {
                if let Some(action) = button.action {
                    debug!("Button hit at ({}, {}): {:?}", point.x, point.y, action);
                    handler(action, button.param.as_deref());
                }
                true
            }
            None => false,
        }
    }
}

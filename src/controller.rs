//! Overlay state and the two buttons driving it.
//!
//! [`ViewportController`] owns the [`OverlayState`]. Every transition marks the controller
//! dirty so the render loop knows to recompose the scene; [`ViewportController::take_dirty`]
//! reads and clears that flag.

use winit::dpi::PhysicalPosition;

use crate::{
    config::{hex_rgb, srgb_to_linear},
    overlay::ShapeKind,
    pipelines::gui::Quad,
};

pub const BUTTON_WIDTH: f32 = 216.0;
pub const BUTTON_HEIGHT: f32 = 46.0;
pub const BUTTON_GAP: f32 = 20.0;
pub const BUTTON_BOTTOM: f32 = 20.0;
pub const DISABLED_OPACITY: f32 = 0.6;

const GREEN: u32 = 0x28a745;
const GREY: u32 = 0x6c757d;
const BLUE: u32 = 0x007bff;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonId {
    /// Shows or hides the overlay.
    Blackvision,
    /// Switches between ring and sphere.
    Analysis,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub visible: bool,
    pub shape: ShapeKind,
}

/// Rectangle in physical pixels, origin at the top left of the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: [f32; 2],
    pub size: [f32; 2],
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.origin[0]
            && x < self.origin[0] + self.size[0]
            && y >= self.origin[1]
            && y < self.origin[1] + self.size[1]
    }
}

/// Everything needed to draw one button.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonView {
    pub id: ButtonId,
    pub label: &'static str,
    pub rect: Rect,
    /// sRGB fill colour.
    pub color: [f32; 3],
    pub enabled: bool,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewportController {
    state: OverlayState,
    dirty: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    /// Starts with the overlay hidden and the ring selected. The first frame always
    /// composes the scene.
    pub fn new() -> Self {
        Self {
            state: OverlayState::default(),
            dirty: true,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn toggle_overlay(&mut self) {
        self.state.visible = !self.state.visible;
        self.dirty = true;
        log::debug!("overlay visible: {}", self.state.visible);
    }

    /// Flips the stored shape regardless of visibility.
    pub fn toggle_shape(&mut self) {
        self.state.shape = self.state.shape.toggled();
        self.dirty = true;
        log::debug!("overlay shape: {:?}", self.state.shape);
    }

    pub fn is_enabled(&self, id: ButtonId) -> bool {
        match id {
            ButtonId::Blackvision => true,
            ButtonId::Analysis => self.state.visible,
        }
    }

    /// Handles a button press. Returns whether the state changed; presses on a disabled
    /// button do nothing.
    pub fn click(&mut self, id: ButtonId) -> bool {
        if !self.is_enabled(id) {
            log::debug!("ignoring click on disabled {id:?} button");
            return false;
        }
        match id {
            ButtonId::Blackvision => self.toggle_overlay(),
            ButtonId::Analysis => self.toggle_shape(),
        }
        true
    }

    /// Returns whether the state changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn buttons(&self, surface: [u32; 2], scale_factor: f64) -> Vec<ButtonView> {
        let scale = scale_factor.max(f64::EPSILON) as f32;
        let width = BUTTON_WIDTH * scale;
        let height = BUTTON_HEIGHT * scale;
        let gap = BUTTON_GAP * scale;
        let total = 2.0 * width + gap;
        let left = (surface[0] as f32 - total) / 2.0;
        let top = surface[1] as f32 - BUTTON_BOTTOM * scale - height;

        let OverlayState { visible, shape } = self.state;
        [ButtonId::Blackvision, ButtonId::Analysis]
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let (label, color) = match id {
                    ButtonId::Blackvision if visible => ("Blackvision On", GREEN),
                    ButtonId::Blackvision => ("Blackvision Off", GREY),
                    ButtonId::Analysis if shape == ShapeKind::Ring => ("Pre Analysis", BLUE),
                    ButtonId::Analysis => ("After Analysis", GREY),
                };
                let enabled = self.is_enabled(id);
                ButtonView {
                    id,
                    label,
                    rect: Rect {
                        origin: [left + i as f32 * (width + gap), top],
                        size: [width, height],
                    },
                    color: hex_rgb(color),
                    enabled,
                    opacity: if enabled { 1.0 } else { DISABLED_OPACITY },
                }
            })
            .collect()
    }

    /// The button under `position`, if any. Disabled buttons are still hit so the press does
    /// not fall through to the orbit controls.
    pub fn hit_test(
        &self,
        position: PhysicalPosition<f64>,
        surface: [u32; 2],
        scale_factor: f64,
    ) -> Option<ButtonId> {
        self.buttons(surface, scale_factor)
            .into_iter()
            .find(|button| button.rect.contains(position.x as f32, position.y as f32))
            .map(|button| button.id)
    }

    /// Button backgrounds in linear colour, ready for the GUI pipeline.
    pub fn quads(&self, surface: [u32; 2], scale_factor: f64) -> Vec<Quad> {
        self.buttons(surface, scale_factor)
            .into_iter()
            .map(|button| {
                let [r, g, b] = srgb_to_linear(button.color);
                Quad {
                    origin: button.rect.origin,
                    size: button.rect.size,
                    color: [r, g, b, button.opacity],
                }
            })
            .collect()
    }

    #[cfg(feature = "ui")]
    pub fn labels(&self, surface: [u32; 2], scale_factor: f64) -> Vec<crate::pipelines::text::Label> {
        self.buttons(surface, scale_factor)
            .into_iter()
            .map(|button| crate::pipelines::text::Label {
                text: button.label.to_string(),
                origin: button.rect.origin,
                size: button.rect.size,
                opacity: button.opacity,
                scale: scale_factor as f32,
            })
            .collect()
    }
}

//! Button captions rendered with glyphon. Only built with the `ui` feature.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::data_structures::texture::Texture;

/// In logical pixels.
pub const FONT_SIZE: f32 = 18.0;
pub const LINE_HEIGHT: f32 = 22.0;

/// A caption centered inside a pixel rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub opacity: f32,
    /// Window scale factor, applied to the font metrics.
    pub scale: f32,
}

impl Label {
    /// Font size and line height in physical pixels.
    pub fn metrics(&self) -> Metrics {
        let scale = self.scale.max(f32::EPSILON);
        Metrics::new(FONT_SIZE * scale, LINE_HEIGHT * scale)
    }
}

pub struct LabelRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    #[allow(unused)]
    cache: Cache,
    atlas: TextAtlas,
    viewport: Viewport,
    renderer: TextRenderer,
    buffers: Vec<(Buffer, Label)>,
}

impl std::fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRenderer")
            .field("labels", &self.buffers.len())
            .finish()
    }
}

impl LabelRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let viewport = Viewport::new(device, &cache);
        // The labels share the scene pass and its depth attachment
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        Self {
            font_system,
            swash_cache,
            cache,
            atlas,
            viewport,
            renderer,
            buffers: Vec::new(),
        }
    }

    /// Shapes the captions and uploads the glyphs they need.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        labels: &[Label],
        surface: [u32; 2],
    ) -> anyhow::Result<()> {
        self.viewport.update(
            queue,
            Resolution {
                width: surface[0],
                height: surface[1],
            },
        );

        self.buffers = labels
            .iter()
            .map(|label| {
                let mut buffer = Buffer::new(&mut self.font_system, label.metrics());
                buffer.set_size(
                    &mut self.font_system,
                    Some(label.size[0]),
                    Some(label.size[1]),
                );
                buffer.set_text(
                    &mut self.font_system,
                    &label.text,
                    &Attrs::new().family(Family::SansSerif),
                    Shaping::Advanced,
                    None,
                );
                buffer.shape_until_scroll(&mut self.font_system, false);
                (buffer, label.clone())
            })
            .collect();

        let areas = self.buffers.iter().map(|(buffer, label)| {
            let line_width = buffer
                .layout_runs()
                .map(|run| run.line_w)
                .fold(0.0, f32::max);
            let left = label.origin[0] + (label.size[0] - line_width) / 2.0;
            let top = label.origin[1] + (label.size[1] - label.metrics().line_height) / 2.0;
            let alpha = (label.opacity.clamp(0.0, 1.0) * 255.0) as u8;
            TextArea {
                buffer,
                left,
                top,
                scale: 1.0,
                bounds: TextBounds {
                    left: label.origin[0] as i32,
                    top: label.origin[1] as i32,
                    right: (label.origin[0] + label.size[0]) as i32,
                    bottom: (label.origin[1] + label.size[1]) as i32,
                },
                default_color: Color::rgba(255, 255, 255, alpha),
                custom_glyphs: &[],
            }
        });

        self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        )?;
        Ok(())
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, pass) {
            log::warn!("could not render button labels: {e}");
        }
    }

    /// Frees glyphs that were not used since the last call.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

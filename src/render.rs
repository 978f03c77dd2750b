//! Render composition and pipeline batching.
//!
//! The scene produces a [`Render`] tree every frame. The tree is flattened into
//! [`Batches`], one per pipeline, so every pipeline is bound exactly once per frame.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] is a textured model with its instance buffer
//! - [`Dotted<'a>`] is the overlay mesh with its dot pattern uniform
//! - [`Sprites<'a>`] is the instanced starfield
//! - [`Flat<'a>`] is plain vertex data (helper lines, GUI quads)
//!

use crate::{
    context::Context,
    data_structures::model::{DrawModel, Mesh, Model},
    pipelines::stars::QUAD_VERTICES,
};

/// A model drawn with the lit model pipeline.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// A mesh drawn with the dot pattern pipeline.
pub struct Dotted<'a> {
    pub mesh: &'a Mesh,
    pub instance: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
}

/// Camera facing quads, one per instance.
pub struct Sprites<'a> {
    pub instances: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// Vertex data with an optional `u16` index buffer. `amount` counts indices if present,
/// vertices otherwise.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: Option<&'a wgpu::Buffer>,
    pub amount: usize,
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `None` renders nothing (e.g. a model that is still loading)
/// - `Defaults(Vec<Instanced>)` renders a batch of lit models
/// - `Dotted(Dotted)` renders the overlay shape
/// - `Stars(Sprites)` renders the starfield
/// - `Lines(Flat)` renders helper line lists
/// - `GUI(Flat)` renders screen space quads on top of everything
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
///
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
    Dotted(Dotted<'a>),
    Stars(Sprites<'a>),
    Lines(Flat<'a>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Defaults(mut vec) => batches.basics.append(&mut vec),
            Render::Dotted(dotted) => batches.dotted.push(dotted),
            Render::Stars(sprites) => batches.stars.push(sprites),
            Render::Lines(flat) => batches.lines.push(flat),
            Render::GUI(flat) => batches.guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}

/// Renders sorted by pipeline.
#[derive(Default)]
pub(crate) struct Batches<'a> {
    basics: Vec<Instanced<'a>>,
    dotted: Vec<Dotted<'a>>,
    stars: Vec<Sprites<'a>>,
    lines: Vec<Flat<'a>>,
    guis: Vec<Flat<'a>>,
}

impl<'a> Batches<'a> {
    pub(crate) fn new(render: Render<'a>) -> Self {
        let mut batches = Self::default();
        render.set_pipelines(&mut batches);
        batches
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.basics.is_empty()
            && self.dotted.is_empty()
            && self.stars.is_empty()
            && self.lines.is_empty()
            && self.guis.is_empty()
    }

    /// Opaque geometry first, then the additive stars, then the GUI.
    pub(crate) fn draw(self, ctx: &'a Context, render_pass: &mut wgpu::RenderPass<'_>) {
        let camera = &ctx.camera.bind_group;

        render_pass.set_pipeline(&ctx.pipelines.model);
        for instanced in self.basics {
            if instanced.amount == 0 || instanced.instance.size() == 0 {
                log::warn!("you attempted to render something with zero instances");
                continue;
            }
            render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
            render_pass.draw_model_instanced(
                instanced.model,
                0..instanced.amount as u32,
                camera,
                &ctx.light.bind_group,
            );
        }

        render_pass.set_pipeline(&ctx.pipelines.dot_pattern);
        for dotted in self.dotted {
            render_pass.set_bind_group(0, camera, &[]);
            render_pass.set_bind_group(1, dotted.group, &[]);
            render_pass.set_vertex_buffer(0, dotted.mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, dotted.instance.slice(..));
            render_pass.set_index_buffer(
                dotted.mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..dotted.mesh.num_elements, 0, 0..1);
        }

        render_pass.set_pipeline(&ctx.pipelines.lines);
        for line in self.lines {
            render_pass.set_bind_group(0, camera, &[]);
            render_pass.set_vertex_buffer(0, line.vertex.slice(..));
            render_pass.draw(0..line.amount as u32, 0..1);
        }

        render_pass.set_pipeline(&ctx.pipelines.stars);
        for sprites in self.stars {
            if sprites.amount == 0 {
                log::warn!("you attempted to render an empty starfield");
                continue;
            }
            render_pass.set_bind_group(0, camera, &[]);
            render_pass.set_bind_group(1, sprites.group, &[]);
            render_pass.set_vertex_buffer(0, sprites.instances.slice(..));
            render_pass.draw(0..QUAD_VERTICES, 0..sprites.amount as u32);
        }

        render_pass.set_pipeline(&ctx.pipelines.gui);
        for gui in self.guis {
            render_pass.set_vertex_buffer(0, gui.vertex.slice(..));
            match gui.index {
                Some(index) => {
                    render_pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
                    render_pass.draw_indexed(0..gui.amount as u32, 0, 0..1);
                }
                None => render_pass.draw(0..gui.amount as u32, 0..1),
            }
        }
    }
}

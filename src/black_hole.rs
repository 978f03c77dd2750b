//! The animated black hole model.
//!
//! The model starts out empty. Once its asset resolves, [`BlackHoleModel::mount`] uploads
//! the decoded glTF scene and starts every embedded animation clip. Until then, and forever
//! if loading failed, it renders nothing.

use std::sync::Arc;

use crate::{
    data_structures::{
        instance::Instance,
        model::Material,
        scene_graph::{SceneNode, to_scene_node},
        texture::Texture,
    },
    render::Render,
    resources::{GltfScene, MaterialData, animation::AnimationMixer},
};

#[derive(Debug)]
struct Mounted {
    roots: Vec<Box<dyn SceneNode>>,
    mixer: AnimationMixer,
}

#[derive(Debug, Default)]
pub struct BlackHoleModel {
    mounted: Option<Mounted>,
}

impl BlackHoleModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.mounted.is_some()
    }

    /// Uploads `scene` and plays all of its clips from the start, looping.
    pub fn mount(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        scene: &GltfScene,
    ) -> anyhow::Result<()> {
        let mut materials = scene
            .materials
            .iter()
            .map(|material| upload_material(device, queue, layout, scene, material))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let default_material = materials.len();
        materials.push(Material::new(
            device,
            "default material",
            Texture::from_color(device, queue, [255; 4], "default base colour", false),
            Texture::create_default_normal_map(device, queue),
            layout,
        )?);
        let materials = Arc::new(materials);

        let roots = scene
            .roots
            .iter()
            .map(|root| to_scene_node(root, device, &materials, default_material))
            .collect::<Vec<_>>();

        let mut mixer = AnimationMixer::new(scene.clips.clone());
        mixer.play_all();
        log::info!(
            "black hole mounted: {} nodes, {} materials, {} clips",
            roots.iter().map(|r| r.count()).sum::<usize>(),
            materials.len(),
            scene.clips.len()
        );

        self.mounted = Some(Mounted { roots, mixer });
        Ok(())
    }

    /// Advances the animations by `dt` seconds and places the model at `placement`.
    pub fn update(&mut self, queue: &wgpu::Queue, dt: f32, placement: &Instance) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let poses = mounted.mixer.advance(dt);
        for root in mounted.roots.iter_mut() {
            root.apply_poses(&poses);
            root.update_world_transforms(placement);
            root.write_to_buffers(queue);
        }
    }

    pub fn get_render(&self) -> Render<'_> {
        match &self.mounted {
            Some(mounted) => Render::Defaults(
                mounted
                    .roots
                    .iter()
                    .flat_map(|root| root.get_render())
                    .collect(),
            ),
            None => Render::None,
        }
    }
}

fn upload_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    scene: &GltfScene,
    material: &MaterialData,
) -> anyhow::Result<Material> {
    let factor = material.base_color_factor;
    let diffuse = match material.base_color_image.and_then(|i| scene.images.get(i)) {
        Some(image) => {
            let mut tinted = image.clone();
            if factor != [1.0; 4] {
                for pixel in tinted.pixels_mut() {
                    for (channel, f) in pixel.0.iter_mut().zip(factor) {
                        *channel = (*channel as f32 * f.clamp(0.0, 1.0)).round() as u8;
                    }
                }
            }
            Texture::from_rgba(device, queue, &tinted, Some(&material.name), false)
        }
        None => {
            // The factor is linear, the texture is sampled as sRGB
            let rgba = [
                linear_to_srgb_byte(factor[0]),
                linear_to_srgb_byte(factor[1]),
                linear_to_srgb_byte(factor[2]),
                (factor[3].clamp(0.0, 1.0) * 255.0).round() as u8,
            ];
            Texture::from_color(device, queue, rgba, &material.name, false)
        }
    };
    let normal = match material.normal_image.and_then(|i| scene.images.get(i)) {
        Some(image) => Texture::from_rgba(device, queue, image, Some(&material.name), true),
        None => Texture::create_default_normal_map(device, queue),
    };
    Material::new(device, &material.name, diffuse, normal, layout)
}

fn linear_to_srgb_byte(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let srgb = if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (srgb * 255.0).round() as u8
}

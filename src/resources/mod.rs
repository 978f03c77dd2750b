//! Loading of external assets.
//!
//! Bytes are fetched through an [`AssetSource`] (files natively, HTTP on the web) and glTF
//! files are parsed into a CPU-side [`GltfScene`]. GPU upload happens later on the render
//! thread, see [`crate::black_hole`]. The [`cache`] module deduplicates loads.

pub mod animation;
pub mod cache;

use std::{collections::HashSet, path::Path, sync::Arc};

use anyhow::{Context as _, bail};
use futures::FutureExt;

use crate::{
    data_structures::{
        geometry::{MeshData, compute_tangents},
        instance::Instance,
        model::ModelVertex,
        texture::decode_image,
    },
    resources::animation::{AnimationClip, Channel, Interpolation, Keyframes},
};

#[cfg(not(target_arch = "wasm32"))]
pub type SourceFuture = futures::future::BoxFuture<'static, anyhow::Result<Vec<u8>>>;
#[cfg(target_arch = "wasm32")]
pub type SourceFuture = futures::future::LocalBoxFuture<'static, anyhow::Result<Vec<u8>>>;

/// Fetches raw bytes for a logical asset path such as `blackhole/scene.gltf`.
pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str) -> SourceFuture;
}

/// Environment variable overriding the native asset root.
pub const ASSET_ROOT_ENV: &str = "BLACKVISION_ASSETS";

/// Reads assets from `<root>/<path>` natively or `<origin>/assets/<path>` on the web.
#[derive(Clone, Debug)]
pub struct FileSource {
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    root: std::path::PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$BLACKVISION_ASSETS` if set, `./assets` otherwise.
    pub fn from_env() -> Self {
        let root = std::env::var_os(ASSET_ROOT_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| Path::new("./").join("assets"));
        Self::new(root)
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("could not read the page origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

impl AssetSource for FileSource {
    #[cfg(not(target_arch = "wasm32"))]
    fn fetch(&self, path: &str) -> SourceFuture {
        let path = self.root.join(path);
        async move {
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read asset {}", path.display()))
        }
        .boxed()
    }

    #[cfg(target_arch = "wasm32")]
    fn fetch(&self, path: &str) -> SourceFuture {
        let path = path.to_string();
        async move {
            let url = format_url(&path)?;
            let response = reqwest::get(url).await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        }
        .boxed_local()
    }
}

/// Resolves `uri` against the directory of the glTF file at `base`.
pub fn resolve_relative(base: &str, uri: &str) -> String {
    match base.rfind('/') {
        Some(idx) => format!("{}/{}", &base[..idx], uri),
        None => uri.to_string(),
    }
}

/// Decoded material inputs of the model shader.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color_factor: [f32; 4],
    /// Index into [`GltfScene::images`].
    pub base_color_image: Option<usize>,
    /// Index into [`GltfScene::images`].
    pub normal_image: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveData {
    pub mesh: MeshData,
    /// Index into [`GltfScene::materials`].
    pub material: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GltfNode {
    /// glTF node index, the key animation channels refer to.
    pub index: usize,
    pub name: Option<String>,
    /// Rest pose relative to the parent.
    pub transform: Instance,
    pub primitives: Vec<PrimitiveData>,
    pub children: Vec<GltfNode>,
}

impl GltfNode {
    pub fn iter(&self) -> Box<dyn Iterator<Item = &GltfNode> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(|c| c.iter())))
    }
}

/// Everything the black hole model needs from its asset, decoded and ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GltfScene {
    pub roots: Vec<GltfNode>,
    pub materials: Vec<MaterialData>,
    pub images: Vec<image::RgbaImage>,
    pub clips: Vec<AnimationClip>,
}

impl GltfScene {
    pub fn nodes(&self) -> impl Iterator<Item = &GltfNode> {
        self.roots.iter().flat_map(|root| root.iter())
    }

    pub fn node(&self, index: usize) -> Option<&GltfNode> {
        self.nodes().find(|n| n.index == index)
    }
}

/// Fetches and decodes a glTF (or binary glb) file together with the buffers and images it
/// references.
pub async fn load_gltf(source: &dyn AssetSource, path: &str) -> anyhow::Result<GltfScene> {
    let bytes = source.fetch(path).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).with_context(|| format!("invalid glTF {path}"))?;

    // Load buffers
    let mut buffers: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffers.push(blob.into()),
                None => bail!("{path} references a binary chunk but has none"),
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("{path}: embedded data URIs are not supported, export with separate files")
            }
            gltf::buffer::Source::Uri(uri) => {
                buffers.push(source.fetch(&resolve_relative(path, uri)).await?);
            }
        }
    }

    // Load images
    let mut images = Vec::new();
    for image in gltf.images() {
        let img = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let buffer = buffers
                    .get(view.buffer().index())
                    .context("image references a missing buffer")?;
                let start = view.offset();
                let end = start + view.length();
                let bytes = buffer
                    .get(start..end)
                    .context("image buffer view is out of bounds")?;
                decode_image(bytes, mime_type.split('/').last())?
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let bytes = source.fetch(&resolve_relative(path, uri)).await?;
                let hint = mime_type
                    .and_then(|mt| mt.split('/').last())
                    .or_else(|| uri.rsplit('.').next());
                decode_image(&bytes, hint).with_context(|| format!("failed to decode {uri}"))?
            }
        };
        images.push(img);
    }

    // Load materials
    let materials = gltf
        .materials()
        .enumerate()
        .map(|(idx, material)| {
            let pbr = material.pbr_metallic_roughness();
            MaterialData {
                name: material
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{path}#material{idx}")),
                base_color_factor: pbr.base_color_factor(),
                base_color_image: pbr
                    .base_color_texture()
                    .map(|info| info.texture().source().index()),
                normal_image: material
                    .normal_texture()
                    .map(|normal| normal.texture().source().index()),
            }
        })
        .collect();

    let clips = read_animations(&gltf, &buffers);

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .with_context(|| format!("{path} contains no scene"))?;
    let roots = scene
        .nodes()
        .map(|node| read_node(node, &buffers))
        .collect::<anyhow::Result<Vec<_>>>()?;

    log::info!(
        "loaded {path}: {} root node(s), {} material(s), {} clip(s)",
        roots.len(),
        gltf.materials().len(),
        clips.len()
    );

    Ok(GltfScene {
        roots,
        materials,
        images,
        clips,
    })
}

fn read_node(node: gltf::scene::Node, buffers: &[Vec<u8>]) -> anyhow::Result<GltfNode> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Instance {
        position: translation.into(),
        // glTF stores quaternions as [x, y, z, w]
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    };

    let mut primitives = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping primitive of mesh {:?} with unsupported mode {:?}",
                    mesh.name(),
                    primitive.mode()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
                Some(positions) => positions
                    .map(|position| ModelVertex {
                        position,
                        ..Default::default()
                    })
                    .collect(),
                None => {
                    log::warn!("primitive of mesh {:?} has no positions", mesh.name());
                    continue;
                }
            };
            if let Some(normals) = reader.read_normals() {
                vertices
                    .iter_mut()
                    .zip(normals)
                    .for_each(|(v, normal)| v.normal = normal);
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                vertices
                    .iter_mut()
                    .zip(tex_coords)
                    .for_each(|(v, tex_coord)| v.tex_coords = tex_coord);
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            let mut mesh_data = MeshData { vertices, indices };
            match reader.read_tangents() {
                Some(tangents) => {
                    mesh_data
                        .vertices
                        .iter_mut()
                        .zip(tangents)
                        .for_each(|(v, tangent)| {
                            // The 4th component carries the handedness of the bitangent
                            let tangent: cgmath::Vector4<f32> = tangent.into();
                            let normal: cgmath::Vector3<f32> = v.normal.into();
                            v.tangent = tangent.truncate().into();
                            v.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
                        });
                }
                None => compute_tangents(&mut mesh_data),
            }

            primitives.push(PrimitiveData {
                mesh: mesh_data,
                material: primitive.material().index(),
            });
        }
    }

    let children = node
        .children()
        .map(|child| read_node(child, buffers))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(GltfNode {
        index: node.index(),
        name: node.name().map(str::to_string),
        transform,
        primitives,
        children,
    })
}

fn read_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    let mut names = HashSet::new();
    let mut clips = Vec::new();
    for animation in gltf.animations() {
        let mut name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("clip{}", animation.index()));
        // Clips are looked up by name, keep them distinct
        if names.contains(&name) {
            let base = name.clone();
            let mut suffix = animation.index();
            name = format!("{base}#{suffix}");
            while names.contains(&name) {
                suffix += 1;
                name = format!("{base}#{suffix}");
            }
        }
        names.insert(name.clone());

        let mut channels = Vec::new();
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let timestamps: Vec<f32> = match reader.read_inputs() {
                Some(inputs) => inputs.collect(),
                None => {
                    log::warn!("no timestamps found in channel {} of {name}", channel.index());
                    continue;
                }
            };
            let keyframes = match reader.read_outputs() {
                Some(gltf::animation::util::ReadOutputs::Translations(translations)) => {
                    Keyframes::Translation(translations.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                    Keyframes::Rotation(
                        rotations
                            .into_f32()
                            .map(|q| cgmath::Quaternion::new(q[3], q[0], q[1], q[2]))
                            .collect(),
                    )
                }
                Some(gltf::animation::util::ReadOutputs::Scales(scales)) => {
                    Keyframes::Scale(scales.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) => {
                    log::warn!("morph target animation in {name} is not supported, skipping");
                    continue;
                }
                None => {
                    log::warn!("no keyframes found in channel {} of {name}", channel.index());
                    continue;
                }
            };
            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => Interpolation::Linear,
                gltf::animation::Interpolation::Step => Interpolation::Step,
                gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
            };
            channels.push(Channel {
                node: channel.target().node().index(),
                interpolation,
                timestamps,
                keyframes,
            });
        }
        clips.push(AnimationClip { name, channels });
    }
    clips
}

/// Convenience used by tests and tools: parse a scene straight from an in-memory source.
pub fn load_gltf_blocking(source: Arc<dyn AssetSource>, path: &str) -> anyhow::Result<GltfScene> {
    futures::executor::block_on(load_gltf(source.as_ref(), path))
}

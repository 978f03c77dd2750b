//! Declarative scene description.
//!
//! [`compose`] turns the overlay state and the scene configuration into a tree of
//! [`SceneGraphNode`]s. The tree is plain data: it has no GPU resources and no state of its
//! own, and is rebuilt whenever the overlay state changes. The render loop walks it to
//! decide what to draw and with which light and placement.

use crate::{
    config::{SceneConfig, StarfieldConfig},
    controller::OverlayState,
    data_structures::instance::Instance,
    overlay::ShapeKind,
    pipelines::light::LightUniform,
};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    Group,
    AmbientLight {
        intensity: f32,
    },
    PointLight {
        intensity: f32,
    },
    DirectionalLight {
        intensity: f32,
    },
    Starfield(StarfieldConfig),
    BlackHole {
        asset: String,
    },
    Overlay {
        shape: ShapeKind,
    },
    AxesHelper {
        size: f32,
    },
    GridHelper {
        size: f32,
        divisions: u32,
    },
    OrbitControls,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraphNode {
    pub name: String,
    /// Relative to the parent.
    pub transform: Instance,
    pub content: NodeContent,
    pub children: Vec<SceneGraphNode>,
}

impl SceneGraphNode {
    pub fn new(name: &str, content: NodeContent) -> Self {
        Self {
            name: name.to_string(),
            transform: Instance::new(),
            content,
            children: vec![],
        }
    }

    pub fn with_transform(mut self, transform: Instance) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneGraphNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth first, parents before children.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &SceneGraphNode> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(|c| c.iter())))
    }

    pub fn find(&self, name: &str) -> Option<&SceneGraphNode> {
        self.iter().find(|node| node.name == name)
    }

    /// The overlay node, present only while the overlay is visible.
    pub fn overlay(&self) -> Option<(ShapeKind, Instance)> {
        self.iter().find_map(|node| match node.content {
            NodeContent::Overlay { shape } => Some((shape, node.transform)),
            _ => None,
        })
    }

    pub fn black_hole(&self) -> Option<(&str, Instance)> {
        self.iter().find_map(|node| match &node.content {
            NodeContent::BlackHole { asset } => Some((asset.as_str(), node.transform)),
            _ => None,
        })
    }

    /// Collects the light nodes into the uniform of the model shader. Missing lights
    /// contribute nothing.
    pub fn light_uniform(&self, color: [f32; 3]) -> LightUniform {
        let mut uniform = LightUniform {
            point_intensity: 0.0,
            directional_intensity: 0.0,
            ambient_intensity: 0.0,
            color,
            ..LightUniform::default()
        };
        for node in self.iter() {
            match node.content {
                NodeContent::AmbientLight { intensity } => uniform.ambient_intensity = intensity,
                NodeContent::PointLight { intensity } => {
                    uniform.point_position = node.transform.position.into();
                    uniform.point_intensity = intensity;
                }
                NodeContent::DirectionalLight { intensity } => {
                    uniform.directional_position = node.transform.position.into();
                    uniform.directional_intensity = intensity;
                }
                _ => (),
            }
        }
        uniform
    }

    pub fn has_orbit_controls(&self) -> bool {
        self.iter()
            .any(|node| node.content == NodeContent::OrbitControls)
    }
}

/// Builds the scene for the given overlay state.
pub fn compose(state: &OverlayState, config: &SceneConfig) -> SceneGraphNode {
    let lights = &config.lights;
    let helpers = &config.helpers;
    let black_hole = &config.black_hole;

    let mut root = SceneGraphNode::new("scene", NodeContent::Group)
        .with_child(SceneGraphNode::new(
            "ambient_light",
            NodeContent::AmbientLight {
                intensity: lights.ambient_intensity,
            },
        ))
        .with_child(
            SceneGraphNode::new(
                "point_light",
                NodeContent::PointLight {
                    intensity: lights.point_intensity,
                },
            )
            .with_transform(Instance::new().with_position(lights.point_position)),
        )
        .with_child(
            SceneGraphNode::new(
                "directional_light",
                NodeContent::DirectionalLight {
                    intensity: lights.directional_intensity,
                },
            )
            .with_transform(Instance::new().with_position(lights.directional_position)),
        )
        .with_child(SceneGraphNode::new(
            "stars",
            NodeContent::Starfield(config.stars.clone()),
        ))
        .with_child(
            SceneGraphNode::new(
                "black_hole",
                NodeContent::BlackHole {
                    asset: black_hole.asset.clone(),
                },
            )
            .with_transform(
                Instance::new()
                    .with_position(black_hole.position)
                    .with_uniform_scale(black_hole.scale),
            ),
        );

    if state.visible {
        root = root.with_child(
            SceneGraphNode::new(
                "overlay",
                NodeContent::Overlay { shape: state.shape },
            )
            .with_transform(state.shape.placement()),
        );
    }

    root.with_child(SceneGraphNode::new(
        "axes_helper",
        NodeContent::AxesHelper {
            size: helpers.axes_size,
        },
    ))
    .with_child(SceneGraphNode::new(
        "grid_helper",
        NodeContent::GridHelper {
            size: helpers.grid_size,
            divisions: helpers.grid_divisions,
        },
    ))
    .with_child(SceneGraphNode::new("controls", NodeContent::OrbitControls))
}

//! GPU scene graph for loaded glTF hierarchies.
//!
//! Every glTF node becomes a [`SceneNode`]: a [`ModelNode`] when it carries meshes, a
//! [`ContainerNode`] otherwise. Nodes keep their rest pose, their current local transform
//! (rest pose overridden by animation) and the world transform derived from their parents.

use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{self, Material},
    },
    render::Instanced,
    resources::{GltfNode, animation::Pose},
};

pub trait SceneNode: Debug {
    /// glTF node index this node was created from.
    fn index(&self) -> usize;

    fn get_rest_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Recomputes the world transform of `self` and all descendants.
    fn update_world_transforms(&mut self, parent_world_transform: &Instance);

    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    fn get_render(&self) -> Vec<Instanced<'_>>;

    /// Sets the local transform of every animated node in the subtree. Nodes without a
    /// pose keep their current transform.
    fn apply_poses(&mut self, poses: &BTreeMap<usize, Pose>) {
        if let Some(pose) = poses.get(&self.index()) {
            let local = pose.apply_to(&self.get_rest_transform());
            self.set_local_transform(local);
        }
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.apply_poses(poses));
    }

    fn count(&self) -> usize {
        1 + self.get_children().iter().map(|c| c.count()).sum::<usize>()
    }
}

/// Local and world transform of a node, kept together.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Transforms {
    rest: Instance,
    local: Instance,
    world: Instance,
}

impl Transforms {
    fn new(rest: Instance) -> Self {
        Self {
            rest,
            local: rest,
            world: rest,
        }
    }
}

#[derive(Debug)]
pub struct ContainerNode {
    index: usize,
    transforms: Transforms,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(index: usize, rest: Instance) -> Self {
        Self {
            index,
            transforms: Transforms::new(rest),
            children: vec![],
        }
    }
}

impl SceneNode for ContainerNode {
    fn index(&self) -> usize {
        self.index
    }

    fn get_rest_transform(&self) -> Instance {
        self.transforms.rest
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.transforms.local = instance;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.transforms.world = parent_world_transform * &self.transforms.local;
        let world = self.transforms.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

pub struct ModelNode {
    index: usize,
    transforms: Transforms,
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    model: model::Model,
}

impl Debug for ModelNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelNode")
            .field("index", &self.index)
            .field("meshes", &self.model.meshes.len())
            .field("children", &self.children)
            .finish()
    }
}

impl ModelNode {
    pub fn from_model(
        index: usize,
        rest: Instance,
        device: &wgpu::Device,
        model: model::Model,
    ) -> Self {
        let transforms = Transforms::new(rest);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[transforms.world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            index,
            transforms,
            children: vec![],
            instance_buffer,
            model,
        }
    }
}

impl SceneNode for ModelNode {
    fn index(&self) -> usize {
        self.index
    }

    fn get_rest_transform(&self) -> Instance {
        self.transforms.rest
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.transforms.local = instance;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.transforms.world = parent_world_transform * &self.transforms.local;
        let world = self.transforms.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        let raw: [InstanceRaw; 1] = [self.transforms.world.to_raw()];
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        let mut renders = vec![Instanced {
            instance: &self.instance_buffer,
            model: &self.model,
            amount: 1,
        }];
        renders.extend(self.children.iter().flat_map(|child| child.get_render()));
        renders
    }
}

/// Uploads a parsed glTF node and its descendants.
///
/// `default_material` is used for primitives without a material of their own and must be a
/// valid index into `materials`.
pub fn to_scene_node(
    node: &GltfNode,
    device: &wgpu::Device,
    materials: &Arc<Vec<Material>>,
    default_material: usize,
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = if node.primitives.is_empty() {
        Box::new(ContainerNode::new(node.index, node.transform))
    } else {
        let name = node
            .name
            .clone()
            .unwrap_or_else(|| format!("node{}", node.index));
        let meshes = node
            .primitives
            .iter()
            .enumerate()
            .map(|(i, primitive)| {
                let material = primitive
                    .material
                    .filter(|&m| m < materials.len())
                    .unwrap_or(default_material);
                model::Mesh::from_data(device, &format!("{name}#{i}"), &primitive.mesh, material)
            })
            .collect();
        let model = model::Model {
            meshes,
            materials: materials.clone(),
        };
        Box::new(ModelNode::from_model(node.index, node.transform, device, model))
    };
    for child in &node.children {
        scene_node.add_child(to_scene_node(child, device, materials, default_material));
    }
    scene_node
}

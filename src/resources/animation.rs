//! Keyframe animation clips and their playback.
//!
//! A glTF animation becomes an [`AnimationClip`]: a named set of [`Channel`]s, each driving
//! the translation, rotation or scale of one node. An [`AnimationMixer`] owns one
//! [`AnimationAction`] per clip and samples all playing actions into node poses.

use std::collections::BTreeMap;

use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::instance::Instance;

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
}

impl Keyframes {
    fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// Outputs are stored as (in-tangent, value, out-tangent) triplets. Only the values
    /// are used and blended linearly.
    CubicSpline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// glTF node index the channel targets.
    pub node: usize,
    pub interpolation: Interpolation,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

/// An animation clip: a named animation with keyframes and timing.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Length of the clip in seconds: the last timestamp over all channels.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .filter_map(|c| c.timestamps.last())
            .fold(0.0, |acc: f32, &t| acc.max(t))
    }
}

/// Partial transform produced by sampling. Unset components keep the node's rest pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub translation: Option<cgmath::Vector3<f32>>,
    pub rotation: Option<cgmath::Quaternion<f32>>,
    pub scale: Option<cgmath::Vector3<f32>>,
}

impl Pose {
    /// Overrides the animated components of `rest`.
    pub fn apply_to(&self, rest: &Instance) -> Instance {
        Instance {
            position: self.translation.unwrap_or(rest.position),
            rotation: self.rotation.unwrap_or(rest.rotation),
            scale: self.scale.unwrap_or(rest.scale),
        }
    }
}

/// Index of the keyframe at or before `t` and the blend factor towards the next one.
fn locate(timestamps: &[f32], t: f32) -> (usize, usize, f32) {
    let last = timestamps.len() - 1;
    if t <= timestamps[0] {
        return (0, 0, 0.0);
    }
    if t >= timestamps[last] {
        return (last, last, 0.0);
    }
    let next = timestamps.partition_point(|&ts| ts <= t);
    let prev = next - 1;
    let span = timestamps[next] - timestamps[prev];
    let factor = if span > 0.0 {
        (t - timestamps[prev]) / span
    } else {
        0.0
    };
    (prev, next, factor)
}

impl Channel {
    fn value_index(&self, key: usize) -> usize {
        match self.interpolation {
            Interpolation::CubicSpline => key * 3 + 1,
            _ => key,
        }
    }

    /// Samples the channel at `t` seconds and writes the result into `pose`.
    pub fn sample_into(&self, t: f32, pose: &mut Pose) {
        if self.timestamps.is_empty() {
            return;
        }
        let (prev, next, mut factor) = locate(&self.timestamps, t);
        if self.interpolation == Interpolation::Step {
            factor = 0.0;
        }
        let (a, b) = (self.value_index(prev), self.value_index(next));
        if b >= self.keyframes.len() {
            log::warn!(
                "channel for node {} has fewer keyframes than timestamps, skipping",
                self.node
            );
            return;
        }
        match &self.keyframes {
            Keyframes::Translation(v) => pose.translation = Some(v[a].lerp(v[b], factor)),
            Keyframes::Scale(v) => pose.scale = Some(v[a].lerp(v[b], factor)),
            Keyframes::Rotation(v) => {
                let (qa, mut qb) = (v[a], v[b]);
                // Take the short way around
                if qa.dot(qb) < 0.0 {
                    qb = -qb;
                }
                pose.rotation = Some(qa.slerp(qb, factor));
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    #[default]
    Repeat,
}

/// Playback state of a single clip.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationAction {
    time: f32,
    playing: bool,
    pub loop_mode: LoopMode,
}

impl AnimationAction {
    fn new() -> Self {
        Self {
            time: 0.0,
            playing: false,
            loop_mode: LoopMode::default(),
        }
    }

    /// Rewinds to frame zero.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    fn advance(&mut self, dt: f32, duration: f32) {
        if !self.playing {
            return;
        }
        self.time += dt;
        if duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        match self.loop_mode {
            LoopMode::Repeat => self.time = self.time.rem_euclid(duration),
            LoopMode::Once if self.time >= duration => {
                self.time = duration;
                self.playing = false;
            }
            LoopMode::Once => (),
        }
    }
}

/// Drives every clip of one asset. Actions are stored per clip index, so clips sharing a
/// name still each get their own action.
#[derive(Clone, Debug, Default)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        let actions = clips.iter().map(|_| AnimationAction::new()).collect();
        Self { clips, actions }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|clip| clip.name == name)
    }

    /// The action of the first clip called `name`.
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.index_of(name).and_then(|i| self.actions.get(i))
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut AnimationAction> {
        self.index_of(name).and_then(|i| self.actions.get_mut(i))
    }

    pub fn actions(&self) -> impl Iterator<Item = (&str, &AnimationAction)> {
        self.clips
            .iter()
            .zip(&self.actions)
            .map(|(clip, action)| (clip.name.as_str(), action))
    }

    /// Resets every action to frame zero and starts it. Works for zero clips too.
    pub fn play_all(&mut self) {
        for action in self.actions.iter_mut() {
            action.reset().play();
        }
    }

    /// Moves all playing actions forward by `dt` seconds and samples the resulting poses,
    /// keyed by glTF node index.
    pub fn advance(&mut self, dt: f32) -> BTreeMap<usize, Pose> {
        let mut poses = BTreeMap::new();
        for (clip, action) in self.clips.iter().zip(self.actions.iter_mut()) {
            if !action.is_playing() {
                continue;
            }
            action.advance(dt, clip.duration());
            for channel in &clip.channels {
                channel.sample_into(action.time, poses.entry(channel.node).or_default());
            }
        }
        poses
    }
}

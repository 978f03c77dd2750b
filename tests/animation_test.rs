use blackvision::{
    data_structures::instance::Instance,
    resources::{
        animation::{
            AnimationClip, AnimationMixer, Channel, Interpolation, Keyframes, LoopMode, Pose,
        },
        load_gltf_blocking,
    },
};
use cgmath::{Deg, Quaternion, Rad, Rotation3, Vector3};

mod common;
use common::test_utils::{BIN_PATH, MemorySource, SCENE_PATH, approx_eq, scene_bin, scene_json_with_clips};

fn fixture_mixer() -> AnimationMixer {
    let scene = load_gltf_blocking(MemorySource::with_black_hole().into_arc(), SCENE_PATH).unwrap();
    AnimationMixer::new(scene.clips)
}

fn translation_clip(interpolation: Interpolation, keys: Vec<Vector3<f32>>) -> AnimationClip {
    AnimationClip {
        name: "clip".to_string(),
        channels: vec![Channel {
            node: 3,
            interpolation,
            timestamps: vec![0.0, 1.0],
            keyframes: Keyframes::Translation(keys),
        }],
    }
}

#[test]
fn actions_start_stopped_until_played() {
    let mut mixer = fixture_mixer();
    let action = mixer.action("orbit").unwrap();
    assert!(!action.is_playing());
    assert!(mixer.advance(0.5).is_empty());

    mixer.play_all();
    assert!(mixer.actions().all(|(_, action)| action.is_playing()));
    let poses = mixer.advance(0.5);
    let translation = poses[&1].translation.unwrap();
    assert!(approx_eq(translation.x, 1.0));
}

#[test]
fn clips_loop_by_default() {
    let mut mixer = fixture_mixer();
    mixer.play_all();
    mixer.advance(0.5);
    let poses = mixer.advance(0.75);
    let action = mixer.action("orbit").unwrap();
    assert!(approx_eq(action.time(), 0.25));
    assert!(approx_eq(poses[&1].translation.unwrap().x, 0.5));
}

#[test]
fn play_all_rewinds() {
    let mut mixer = fixture_mixer();
    mixer.play_all();
    mixer.advance(0.6);
    mixer.play_all();
    assert_eq!(mixer.action("orbit").unwrap().time(), 0.0);
}

#[test]
fn once_stops_at_the_end() {
    let mut mixer = fixture_mixer();
    mixer.play_all();
    mixer.action_mut("orbit").unwrap().loop_mode = LoopMode::Once;
    let poses = mixer.advance(2.0);
    assert!(approx_eq(poses[&1].translation.unwrap().x, 2.0));
    assert!(!mixer.action("orbit").unwrap().is_playing());
    assert!(mixer.advance(0.1).is_empty());
}

#[test]
fn zero_clips_are_fine() {
    let mut mixer = AnimationMixer::new(vec![]);
    mixer.play_all();
    assert!(mixer.advance(1.0).is_empty());
    assert_eq!(mixer.actions().count(), 0);
}

#[test]
fn step_holds_the_previous_key() {
    let clip = translation_clip(
        Interpolation::Step,
        vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)],
    );
    let mut pose = Pose::default();
    clip.channels[0].sample_into(0.7, &mut pose);
    assert_eq!(pose.translation, Some(Vector3::new(0.0, 0.0, 0.0)));
    clip.channels[0].sample_into(1.0, &mut pose);
    assert_eq!(pose.translation, Some(Vector3::new(4.0, 0.0, 0.0)));
}

#[test]
fn cubic_spline_uses_the_value_keys() {
    let tangent = Vector3::new(9.0, 9.0, 9.0);
    let clip = translation_clip(
        Interpolation::CubicSpline,
        vec![
            tangent,
            Vector3::new(0.0, 0.0, 0.0),
            tangent,
            tangent,
            Vector3::new(2.0, 0.0, 0.0),
            tangent,
        ],
    );
    let mut pose = Pose::default();
    clip.channels[0].sample_into(0.5, &mut pose);
    let translation = pose.translation.unwrap();
    assert!(approx_eq(translation.x, 1.0));
    assert!(approx_eq(translation.y, 0.0));
}

#[test]
fn short_tracks_are_skipped() {
    let clip = translation_clip(Interpolation::Linear, vec![Vector3::new(1.0, 0.0, 0.0)]);
    let mut pose = Pose::default();
    clip.channels[0].sample_into(0.5, &mut pose);
    assert_eq!(pose.translation, None);
}

#[test]
fn poses_only_override_animated_components() {
    let rest = Instance::new()
        .with_position([0.0, 1.0, 0.0])
        .with_uniform_scale(3.0);
    let pose = Pose {
        translation: Some(Vector3::new(5.0, 0.0, 0.0)),
        ..Default::default()
    };
    let posed = pose.apply_to(&rest);
    assert_eq!(posed.position, Vector3::new(5.0, 0.0, 0.0));
    assert_eq!(posed.scale, rest.scale);
    assert_eq!(posed.rotation, rest.rotation);
}

#[test]
fn rotations_turn_at_constant_speed() {
    let end = Quaternion::from_angle_z(Rad(0.9 * std::f32::consts::PI));
    let channel = Channel {
        node: 0,
        interpolation: Interpolation::Linear,
        timestamps: vec![0.0, 1.0],
        keyframes: Keyframes::Rotation(vec![Quaternion::from_angle_z(Deg(0.0)), end]),
    };
    let mut pose = Pose::default();
    channel.sample_into(0.25, &mut pose);
    let rotation = pose.rotation.unwrap();
    let angle = 2.0 * rotation.v.z.atan2(rotation.s);
    assert!(approx_eq(angle, 0.225 * std::f32::consts::PI));
}

#[test]
fn clashing_clip_names_keep_every_clip() {
    let source = MemorySource::new()
        .with_file(SCENE_PATH, scene_json_with_clips(&["x", "x#2", "x"]))
        .with_file(BIN_PATH, scene_bin())
        .into_arc();
    let scene = load_gltf_blocking(source, SCENE_PATH).unwrap();
    let names: Vec<_> = scene.clips.iter().map(|clip| clip.name.as_str()).collect();
    assert_eq!(names, ["x", "x#2", "x#3"]);

    let mut mixer = AnimationMixer::new(scene.clips);
    mixer.play_all();
    assert_eq!(mixer.actions().count(), 3);
    assert!(mixer.actions().all(|(_, action)| action.is_playing()));
}

#[test]
fn clips_sharing_a_name_each_play() {
    let clip = |node| AnimationClip {
        name: "x#2".to_string(),
        channels: vec![Channel {
            node,
            interpolation: Interpolation::Linear,
            timestamps: vec![0.0, 1.0],
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
            ]),
        }],
    };
    let mut mixer = AnimationMixer::new(vec![clip(0), clip(1), clip(2)]);
    mixer.play_all();
    let poses = mixer.advance(0.5);
    assert_eq!(poses.keys().copied().collect::<Vec<_>>(), [0, 1, 2]);
}

use super::keyframe::{AnimationClip, JointPose, Keyframe};
use crate::mesh::coords::convert_joint_transform;
use crate::scene::accessor::SceneAccessor;
use crate::skeleton::Joint;
use bevy::log::{debug, warn};

/// Keyframes per second.
pub const SAMPLE_RATE: f64 = 24.0;

/// Longest animation span that will be baked, in seconds (one hour).
pub const MAX_DURATION: f64 = 3600.0;

/// Number of whole frames at [`SAMPLE_RATE`] in `duration` seconds, or `None`
/// when the duration is not finite or exceeds [`MAX_DURATION`].
pub fn frame_count(duration: f64) -> Option<usize> {
    if !duration.is_finite() || duration > MAX_DURATION {
        return None;
    }
    Some((duration * SAMPLE_RATE).round().max(0.0) as usize)
}

/// Samples every joint's global transform at [`SAMPLE_RATE`] over the current
/// animation stack.
///
/// Frame `n` is evaluated at `n / SAMPLE_RATE` seconds. Each transform is
/// converted to the left-handed renderer convention with
/// [`convert_joint_transform`].
pub fn sample_animation<S: SceneAccessor + ?Sized>(scene: &S, joints: &[Joint]) -> AnimationClip {
    let Some(span) = scene.current_animation_stack() else {
        warn!("Scene has no animation stack; producing an empty clip");
        return AnimationClip::default();
    };
    let duration = span.duration();
    let Some(frames) = frame_count(duration) else {
        warn!(
            "Animation span of {}s is unbounded or longer than {}s; producing an empty clip",
            duration, MAX_DURATION
        );
        return AnimationClip::default();
    };

    let keyframes = (0..frames)
        .map(|frame| {
            let seconds = frame as f64 / SAMPLE_RATE;
            Keyframe {
                time: seconds as f32,
                joints: joints
                    .iter()
                    .map(|joint| JointPose {
                        parent: joint.parent,
                        transform: convert_joint_transform(
                            scene.evaluate_global_transform(joint.node, seconds),
                        ),
                    })
                    .collect(),
            }
        })
        .collect();

    debug!(
        "Sampled {} keyframes for {} joints over {:.3}s",
        frames,
        joints.len(),
        duration
    );
    AnimationClip {
        duration: duration as f32,
        keyframes,
    }
}

//! Baked joint animation: fixed-rate keyframes of global joint transforms.

pub mod keyframe;
pub mod sampler;

pub use keyframe::{AnimationClip, JointPose, Keyframe};
pub use sampler::{MAX_DURATION, SAMPLE_RATE, frame_count, sample_animation};

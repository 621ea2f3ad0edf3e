use bevy::math::Mat4;

/// Global transform of one joint in one keyframe.
///
/// `transform` uses the renderer's row-vector layout mapped onto glam columns:
/// `x_axis`..`z_axis` are the basis rows and `w_axis` is the translation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    /// Copied from the joint list so a keyframe can be consumed on its own.
    pub parent: i32,
    pub transform: Mat4,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframe {
    /// Seconds.
    pub time: f32,
    /// Index-aligned with the joint list.
    pub joints: Vec<JointPose>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    pub duration: f32,
    /// Ordered by increasing time.
    pub keyframes: Vec<Keyframe>,
}

impl AnimationClip {
    pub fn joint_count(&self) -> usize {
        self.keyframes.first().map_or(0, |k| k.joints.len())
    }

    /// The first sampled keyframe, used as the bind pose.
    pub fn bind_pose(&self) -> Option<&Keyframe> {
        self.keyframes.first()
    }

    pub fn inverse_bind_matrices(&self) -> Vec<Mat4> {
        self.bind_pose()
            .map(|bind| bind.joints.iter().map(|j| j.transform.inverse()).collect())
            .unwrap_or_default()
    }

    /// Per-joint skinning matrices for keyframe `frame`: the keyframe's pose
    /// composed with the inverse bind pose. No blending between keyframes.
    pub fn skinning_matrices(&self, frame: usize) -> Option<Vec<Mat4>> {
        let keyframe = self.keyframes.get(frame)?;
        Some(
            keyframe
                .joints
                .iter()
                .zip(self.inverse_bind_matrices())
                .map(|(pose, inverse_bind)| pose.transform * inverse_bind)
                .collect(),
        )
    }

    /// Every keyframe has the bind pose's joint count and parent indices.
    pub fn is_consistent(&self) -> bool {
        let Some(bind) = self.bind_pose() else {
            return true;
        };
        self.keyframes.iter().all(|keyframe| {
            keyframe.joints.len() == bind.joints.len()
                && keyframe
                    .joints
                    .iter()
                    .zip(&bind.joints)
                    .all(|(a, b)| a.parent == b.parent)
        })
    }
}

pub mod influence;

pub use influence::{
    Influence, InfluenceBuffer, InfluenceSet, MAX_INFLUENCES, apply_influences, insert_influence,
    resolve_influences,
};

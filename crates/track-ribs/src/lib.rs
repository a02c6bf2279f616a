//! Umbrella crate for the `track-ribs` workspace.
//!
//! Re-exports the stage crates and adds [`pipeline`], which chains them:
//! image → binary mask → cleaned mask → skeleton → centerline → ribs →
//! overlay.

pub mod pipeline;

pub use pipeline::{
    Masks, PipelineConfig, PipelineError, PipelineOutput, RayMaskSource, build_masks, load_image,
    process_path, run_pipeline,
};
pub use tr_contour::*;
pub use tr_core::*;
pub use tr_mask::*;
pub use tr_morph::*;
pub use tr_rib::*;

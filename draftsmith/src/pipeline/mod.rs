//! The multi-phase content generation pipeline.
//!
//! `workflow` drives the primary draft path and the on-demand stages; the
//! other modules each implement one stage contract.

pub mod assemble;
pub mod audio;
pub mod image;
pub mod outline;
pub mod refine;
pub mod sections;
pub mod seo;
pub mod seo_plan;
pub mod social;
pub mod workflow;

pub use workflow::{
    analyze_post_seo, narrate_post, optimize_post_seo, refine_post, run_generation_pipeline,
    socialize_post, PipelineContext, PipelineOutcome,
};

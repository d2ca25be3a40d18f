//! Binding resolution and diagnostics for captured GPU pipeline state.
//!
//! Given a [`PipelineSnapshot`] (what is bound to which stage/slot at one event), the frame's
//! [`ResourceCatalog`] and a [`VisibilityPolicy`], [`resolve_pipeline`] produces a
//! display-ready [`ResolvedPipeline`]:
//!
//! - Every binding slot is classified as filled/empty and used/unused (see [`visibility`]).
//! - Opaque resource ids are resolved to names, dimensions, formats and type names
//!   (see [`catalog`] and [`inference`]).
//! - Sampler state is compressed into short strings such as `UV: Wrap, W: Clamp`
//!   (see [`sampler`]).
//! - Input layout elements get resolved byte offsets, including `APPEND_ALIGNED` elements
//!   (see [`vertex_input`]).
//! - The input-assembler layout signature is checked against the vertex shader's input
//!   signature (see [`signature`]).
//!
//! Resolution is pure: it never mutates its inputs, never fails, and resolving the same inputs
//! twice yields identical output. Unresolvable ids and missing reflection degrade to
//! placeholder rows instead of errors.
//!
//! [`capture`] loads snapshot + catalog pairs from JSON and [`export`] renders resolved
//! pipelines as text tables.

#![forbid(unsafe_code)]

pub mod capture;
pub mod catalog;
pub mod export;
pub mod fixed_function;
pub mod format;
pub mod inference;
pub mod model;
pub mod reflection_index;
pub mod resolve;
pub mod sampler;
pub mod signature;
pub mod vertex_input;
pub mod visibility;

pub use crate::capture::{CaptureError, PipelineCapture};
pub use crate::catalog::{
    BufferDescriptor, CatalogRef, ResourceCatalog, ResourceDescriptor, TextureDescriptor,
    TextureKind,
};
pub use crate::format::{CompType, PackedFormat, ResourceFormat};
pub use crate::model::{PipelineSnapshot, ResourceId, ShaderStage, ShaderStageKind};
pub use crate::resolve::{
    resolve_pipeline, resolve_stage, ResolvedPipeline, ResolvedSlot, ResolvedStage, SlotDetail,
    SlotIndex, StageCapabilities,
};
pub use crate::signature::{check_signatures, MismatchReport};
pub use crate::visibility::{should_show, VisibilityPolicy};

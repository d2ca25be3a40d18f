//! Captured pipeline state at one GPU event.
//!
//! These are the resolver's inputs. They mirror the D3D11 pipeline: an input assembler, six
//! programmable stages, stream-out, rasterizer and output merger. Everything is plain data and
//! deserializes from the capture JSON with missing fields defaulted.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::format::{CompType, ResourceFormat};

/// Sentinel byte offset meaning "directly after the previous element in the same slot"
/// (`D3D11_APPEND_ALIGNED_ELEMENT`).
pub const D3D11_APPEND_ALIGNED_ELEMENT: u32 = 0xFFFF_FFFF;

/// Number of IA vertex buffer slots (`D3D11_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT`).
pub const D3D11_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT: u32 = 32;

/// Opaque resource identifier. `0` means "nothing bound".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl ResourceId {
    pub const NULL: ResourceId = ResourceId(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId::{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStageKind {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStageKind {
    /// Pipeline order.
    pub const ALL: [ShaderStageKind; 6] = [
        ShaderStageKind::Vertex,
        ShaderStageKind::Hull,
        ShaderStageKind::Domain,
        ShaderStageKind::Geometry,
        ShaderStageKind::Pixel,
        ShaderStageKind::Compute,
    ];

    pub fn abbrev(self) -> &'static str {
        match self {
            ShaderStageKind::Vertex => "VS",
            ShaderStageKind::Hull => "HS",
            ShaderStageKind::Domain => "DS",
            ShaderStageKind::Geometry => "GS",
            ShaderStageKind::Pixel => "PS",
            ShaderStageKind::Compute => "CS",
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShaderStageKind::Vertex => "Vertex Shader",
            ShaderStageKind::Hull => "Hull Shader",
            ShaderStageKind::Domain => "Domain Shader",
            ShaderStageKind::Geometry => "Geometry Shader",
            ShaderStageKind::Pixel => "Pixel Shader",
            ShaderStageKind::Compute => "Compute Shader",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSnapshot {
    pub input_assembler: InputAssembler,
    pub vertex: ShaderStage,
    pub hull: ShaderStage,
    pub domain: ShaderStage,
    pub geometry: ShaderStage,
    pub pixel: ShaderStage,
    pub compute: ShaderStage,
    pub stream_out: StreamOut,
    pub rasterizer: Rasterizer,
    pub output_merger: OutputMerger,
    /// The event the snapshot was taken at, when known.
    pub draw: Option<DrawInfo>,
}

impl PipelineSnapshot {
    pub fn stage(&self, kind: ShaderStageKind) -> &ShaderStage {
        match kind {
            ShaderStageKind::Vertex => &self.vertex,
            ShaderStageKind::Hull => &self.hull,
            ShaderStageKind::Domain => &self.domain,
            ShaderStageKind::Geometry => &self.geometry,
            ShaderStageKind::Pixel => &self.pixel,
            ShaderStageKind::Compute => &self.compute,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawInfo {
    pub uses_index_buffer: bool,
    pub is_dispatch: bool,
    /// Index width in bytes (2 or 4) for indexed draws.
    pub index_byte_width: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Unknown,
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    LineListAdj,
    LineStripAdj,
    TriangleListAdj,
    TriangleStripAdj,
    /// Patch list with the given number of control points.
    PatchList(u32),
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Topology::Unknown => "Unknown",
            Topology::PointList => "PointList",
            Topology::LineList => "LineList",
            Topology::LineStrip => "LineStrip",
            Topology::TriangleList => "TriangleList",
            Topology::TriangleStrip => "TriangleStrip",
            Topology::LineListAdj => "LineList_Adj",
            Topology::LineStripAdj => "LineStrip_Adj",
            Topology::TriangleListAdj => "TriangleList_Adj",
            Topology::TriangleStripAdj => "TriangleStrip_Adj",
            Topology::PatchList(_) => "PatchList",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputAssembler {
    /// Debug name of the input layout object.
    pub layout_name: String,
    pub layout: Vec<InputLayoutElement>,
    pub vertex_buffers: Vec<VertexBufferBinding>,
    pub index_buffer: IndexBufferBinding,
    /// Bytecode the layout was created against, if known.
    pub bytecode: Option<LayoutBytecode>,
    pub topology: Topology,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutBytecode {
    pub entry_point: String,
    pub input_signature: Vec<SignatureElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLayoutElement {
    pub semantic_name: String,
    pub semantic_index: u32,
    pub format: ResourceFormat,
    pub input_slot: u32,
    /// Byte offset within the slot, or [`D3D11_APPEND_ALIGNED_ELEMENT`].
    pub byte_offset: u32,
    pub per_instance: bool,
    pub instance_step_rate: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexBufferBinding {
    pub buffer: ResourceId,
    pub stride: u32,
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexBufferBinding {
    pub buffer: ResourceId,
    pub format: ResourceFormat,
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderStage {
    /// Bound shader object; null when the stage is unbound.
    pub shader: ResourceId,
    /// Debug name of the shader object.
    pub name: String,
    pub reflection: Option<ShaderReflection>,
    pub resource_views: Vec<ResourceBinding>,
    pub uavs: Vec<ResourceBinding>,
    pub samplers: Vec<SamplerBinding>,
    pub constant_buffers: Vec<ConstantBufferBinding>,
    /// Class instance bound at each interface slot; empty string for none.
    pub class_instances: Vec<String>,
}

impl ShaderStage {
    pub fn is_bound(&self) -> bool {
        !self.shader.is_null()
    }
}

/// Pre-extracted shader reflection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderReflection {
    pub entry_point: String,
    pub source_files: Vec<String>,
    pub resources: Vec<ShaderResourceDecl>,
    pub constant_blocks: Vec<ConstantBlockDecl>,
    pub interfaces: Vec<String>,
    pub input_signature: Vec<SignatureElement>,
    pub output_signature: Vec<SignatureElement>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    #[default]
    ResourceView,
    UnorderedAccess,
    Sampler,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderResourceDecl {
    pub name: String,
    pub kind: BindingKind,
    pub bind_point: u32,
    pub is_texture: bool,
    pub variable_type: VariableType,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantBlockDecl {
    pub name: String,
    pub bind_point: u32,
    pub variable_count: u32,
    pub byte_size: u32,
}

/// Reflected variable type. `members` is non-empty for structs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableType {
    /// Scalar/vector type name (`float`, `uint`, ...) or struct name.
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub elements: u32,
    pub row_major: bool,
    pub members: Vec<VariableMember>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableMember {
    pub name: String,
    pub ty: VariableType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureElement {
    pub semantic_name: String,
    pub semantic_index: u32,
    pub comp_count: u8,
    pub comp_type: CompType,
    pub system_value: bool,
}

impl SignatureElement {
    /// `TEXCOORD1`-style name.
    pub fn semantic_idx_name(&self) -> String {
        format!("{}{}", self.semantic_name, self.semantic_index)
    }
}

bitflags! {
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BufferViewFlags: u32 {
        /// Byte-address view.
        const RAW = 1 << 0;
        const APPEND = 1 << 1;
        const COUNTER = 1 << 2;
    }
}

/// A view bound to a slot (SRV, UAV, render target or depth target).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceBinding {
    pub resource: ResourceId,
    /// Declared view format; typeless when the view carries none.
    pub format: ResourceFormat,
    pub flags: BufferViewFlags,
    /// Hidden counter value for append/counter UAVs.
    pub buffer_struct_count: u32,
    pub first_element: u32,
    pub num_elements: u32,
    pub element_size: u32,
    pub highest_mip: u32,
    /// `0` means all mips from `highest_mip`.
    pub num_mip_levels: u32,
    pub first_array_slice: u32,
    /// `0` means all slices from `first_array_slice`.
    pub array_size: u32,
}

impl ResourceBinding {
    pub fn is_filled(&self) -> bool {
        !self.resource.is_null()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressMode {
    #[default]
    Wrap,
    Mirror,
    MirrorOnce,
    Clamp,
    Border,
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressMode::Wrap => "Wrap",
            AddressMode::Mirror => "Mirror",
            AddressMode::MirrorOnce => "MirrorOnce",
            AddressMode::Clamp => "Clamp",
            AddressMode::Border => "Border",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    None,
    Point,
    Linear,
    Cubic,
    Anisotropic,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterMode::None => "None",
            FilterMode::Point => "Point",
            FilterMode::Linear => "Linear",
            FilterMode::Cubic => "Cubic",
            FilterMode::Anisotropic => "Anisotropic",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterFunc {
    #[default]
    Normal,
    Comparison,
    Minimum,
    Maximum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunc {
    Never,
    Always,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl fmt::Display for CompareFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareFunc::Never => "Never",
            CompareFunc::Always => "Always",
            CompareFunc::Less => "Less",
            CompareFunc::LessEqual => "Less Equal",
            CompareFunc::Greater => "Greater",
            CompareFunc::GreaterEqual => "Greater Equal",
            CompareFunc::Equal => "Equal",
            CompareFunc::NotEqual => "NotEqual",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureFilter {
    pub minify: FilterMode,
    pub magnify: FilterMode,
    pub mip: FilterMode,
    pub func: FilterFunc,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerBinding {
    pub sampler: ResourceId,
    /// Debug name of the sampler object, when one was set.
    pub name: Option<String>,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub border_color: [f32; 4],
    pub filter: TextureFilter,
    pub comparison: Option<CompareFunc>,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub max_anisotropy: u32,
}

impl Default for SamplerBinding {
    fn default() -> Self {
        // D3D11 default sampler state.
        Self {
            sampler: ResourceId::NULL,
            name: None,
            address_u: AddressMode::Clamp,
            address_v: AddressMode::Clamp,
            address_w: AddressMode::Clamp,
            border_color: [1.0; 4],
            filter: TextureFilter {
                minify: FilterMode::Linear,
                magnify: FilterMode::Linear,
                mip: FilterMode::Linear,
                func: FilterFunc::Normal,
            },
            comparison: None,
            min_lod: -f32::MAX,
            max_lod: f32::MAX,
            lod_bias: 0.0,
            max_anisotropy: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantBufferRange {
    /// D3D11.1-style range in 16-byte constants.
    Vectors { offset: u32, count: u32 },
    Bytes { offset: u64, size: u64 },
}

impl Default for ConstantBufferRange {
    fn default() -> Self {
        ConstantBufferRange::Vectors {
            offset: 0,
            count: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantBufferBinding {
    pub buffer: ResourceId,
    pub range: ConstantBufferRange,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOut {
    pub outputs: Vec<StreamOutBinding>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOutBinding {
    pub buffer: ResourceId,
    pub offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rasterizer {
    pub viewports: Vec<Viewport>,
    pub scissors: Vec<Scissor>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scissor {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputMerger {
    pub render_targets: Vec<ResourceBinding>,
    pub uavs: Vec<ResourceBinding>,
    /// Register of the first OM UAV (`u#`), after the render targets.
    pub uav_start_slot: u32,
    pub depth_target: ResourceBinding,
    pub depth_read_only: bool,
    pub stencil_read_only: bool,
    pub blends: Vec<BlendTarget>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendEquation {
    pub source: String,
    pub destination: String,
    pub operation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendTarget {
    pub enabled: bool,
    pub logic_enabled: bool,
    pub color: BlendEquation,
    pub alpha: BlendEquation,
    pub logic_op: String,
    /// `D3D11_COLOR_WRITE_ENABLE` bits, R = bit 0.
    pub write_mask: u8,
}

impl Default for BlendTarget {
    fn default() -> Self {
        let equation = BlendEquation {
            source: "One".into(),
            destination: "Zero".into(),
            operation: "Add".into(),
        };
        Self {
            enabled: false,
            logic_enabled: false,
            color: equation.clone(),
            alpha: equation,
            logic_op: "NoOp".into(),
            write_mask: 0xF,
        }
    }
}

//! Snapshot + catalog + policy -> display-ready rows.
//!
//! [`resolve_pipeline`] is the only entry point most callers need. It walks every binding
//! category of every stage, decides which slots are emitted (see [`crate::visibility`]) and
//! fills in their descriptive fields (see [`crate::inference`]). All six shader stages go through
//! the same [`resolve_stage`]; what differs between them is captured by [`StageCapabilities`].
//!
//! Resolution never fails. Ids missing from the catalog become placeholder rows, and stages
//! without reflection report every slot as unused.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{CatalogRef, ResourceCatalog};
use crate::fixed_function::{
    blend_rows, scissor_rows, stage_flow, topology_label, viewport_rows, BlendRow, ScissorRow,
    StageFlow, ViewportRow,
};
use crate::inference::{depth_read_only_notes, describe_resource, Dimensions, ViewCategory};
use crate::model::{
    ConstantBlockDecl, ConstantBufferBinding, ConstantBufferRange, PipelineSnapshot,
    ResourceBinding, ResourceId, SamplerBinding, ShaderResourceDecl, ShaderStage,
    ShaderStageKind,
};
use crate::reflection_index::ReflectionIndex;
use crate::sampler::{summarize_sampler, SamplerSummary};
use crate::signature::{check_snapshot, MismatchReport};
use crate::vertex_input::{map_vertex_input, ResolvedLayoutElement};
use crate::visibility::{should_show, VisibilityPolicy};

/// Binding categories that vary between stages.
///
/// Every D3D11 stage has SRVs, samplers, constant buffers and class instances, so only
/// UAV ownership is recorded here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageCapabilities {
    /// Stage-owned UAVs. Graphics stages see UAVs through the output merger instead.
    pub uavs: bool,
}

impl StageCapabilities {
    pub fn for_stage(kind: ShaderStageKind) -> Self {
        Self {
            uavs: kind == ShaderStageKind::Compute,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SlotIndex {
    Index(u32),
    /// Synthetic final output-merger row.
    Depth,
    /// The input assembler's index buffer.
    IndexBuffer,
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotIndex::Index(i) => write!(f, "{i}"),
            SlotIndex::Depth => f.write_str("Depth"),
            SlotIndex::IndexBuffer => f.write_str("Index"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstantBufferSummary {
    /// `"{first} - {last}"`, in vectors or bytes depending on the binding.
    pub range: String,
    pub variable_count: u32,
    /// Size the shader's constant block needs.
    pub byte_size: u32,
    /// Bytes actually bound.
    pub provided_bytes: u64,
    /// `N Variables, X bytes` or `N Variables, X bytes needed, Y provided`.
    pub size_label: String,
    /// Less data bound than the block declares.
    pub undersized: bool,
}

/// Category-specific part of a row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SlotDetail {
    View { notes: Vec<String> },
    Sampler(SamplerSummary),
    ConstantBuffer(ConstantBufferSummary),
    VertexBuffer { stride: u32, offset: u32 },
    IndexBuffer { byte_width: u32, offset: u32 },
    StreamOut { offset: u32 },
    ClassInstance { interface_name: String },
}

/// One emitted binding slot.
///
/// For resource-backed rows `filled` is exactly "the bound id is not null".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedSlot {
    pub slot: SlotIndex,
    /// `3`, or `3: name` when reflection names the slot.
    pub label: String,
    pub name: String,
    pub type_name: String,
    pub format: String,
    pub dims: Dimensions,
    pub filled: bool,
    pub used: bool,
    pub resource: Option<CatalogRef>,
    pub detail: SlotDetail,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedStage {
    pub kind: ShaderStageKind,
    /// `Unbound Shader`, the shader's name, or `main() - file.hlsl`.
    pub shader_label: String,
    pub bound: bool,
    pub resource_views: Vec<ResolvedSlot>,
    pub uavs: Vec<ResolvedSlot>,
    pub samplers: Vec<ResolvedSlot>,
    pub constant_buffers: Vec<ResolvedSlot>,
    pub class_instances: Vec<ResolvedSlot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedInputAssembler {
    /// `layout (entry)` for the layout's creation bytecode, or `None`.
    pub bytecode_label: String,
    pub layout: Vec<ResolvedLayoutElement>,
    pub vertex_buffers: Vec<ResolvedSlot>,
    pub index_buffer: Option<ResolvedSlot>,
    pub topology: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedRasterizer {
    pub viewports: Vec<ViewportRow>,
    pub scissors: Vec<ScissorRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedOutputMerger {
    /// Render targets, then UAVs, then the `Depth` row.
    pub targets: Vec<ResolvedSlot>,
    pub blends: Vec<BlendRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPipeline {
    pub input_assembler: ResolvedInputAssembler,
    /// One entry per [`ShaderStageKind::ALL`], in that order.
    pub stages: Vec<ResolvedStage>,
    pub stream_out: Vec<ResolvedSlot>,
    pub rasterizer: ResolvedRasterizer,
    pub output_merger: ResolvedOutputMerger,
    pub stage_flow: StageFlow,
    pub mismatch: MismatchReport,
}

impl ResolvedPipeline {
    pub fn stage(&self, kind: ShaderStageKind) -> Option<&ResolvedStage> {
        self.stages.iter().find(|stage| stage.kind == kind)
    }
}

pub fn resolve_pipeline(
    snapshot: &PipelineSnapshot,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> ResolvedPipeline {
    let indices: Vec<(ShaderStageKind, ReflectionIndex<'_>)> = ShaderStageKind::ALL
        .iter()
        .map(|&kind| {
            let stage = snapshot.stage(kind);
            (kind, ReflectionIndex::new(stage.reflection.as_ref()))
        })
        .collect();

    let stages = indices
        .iter()
        .map(|(kind, index)| {
            resolve_stage_with(*kind, snapshot.stage(*kind), index, catalog, policy)
        })
        .collect();

    ResolvedPipeline {
        input_assembler: resolve_input_assembler(snapshot, catalog, policy),
        stages,
        stream_out: resolve_stream_out(snapshot, catalog, policy),
        rasterizer: ResolvedRasterizer {
            viewports: viewport_rows(&snapshot.rasterizer.viewports, policy),
            scissors: scissor_rows(&snapshot.rasterizer.scissors, policy),
        },
        output_merger: resolve_output_merger(snapshot, &indices, catalog, policy),
        stage_flow: stage_flow(snapshot),
        mismatch: check_snapshot(snapshot),
    }
}

/// Resolves one shader stage on its own.
pub fn resolve_stage(
    kind: ShaderStageKind,
    stage: &ShaderStage,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> ResolvedStage {
    let index = ReflectionIndex::new(stage.reflection.as_ref());
    resolve_stage_with(kind, stage, &index, catalog, policy)
}

fn resolve_stage_with(
    kind: ShaderStageKind,
    stage: &ShaderStage,
    index: &ReflectionIndex<'_>,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> ResolvedStage {
    let caps = StageCapabilities::for_stage(kind);

    if stage.is_bound() && stage.reflection.is_none() {
        debug!(stage = %kind, "no reflection for bound shader, all slots unused");
    }
    if !caps.uavs && !stage.uavs.is_empty() {
        debug!(stage = %kind, count = stage.uavs.len(), "ignoring stage UAVs");
    }

    let resource_views = view_rows(
        &stage.resource_views,
        |slot| index.resource_view(slot),
        ViewCategory::ShaderResource,
        catalog,
        policy,
    );

    let uavs = if caps.uavs {
        view_rows(
            &stage.uavs,
            |slot| index.uav(slot),
            ViewCategory::UnorderedAccess,
            catalog,
            policy,
        )
    } else {
        Vec::new()
    };

    let samplers = stage
        .samplers
        .iter()
        .enumerate()
        .filter_map(|(i, sampler)| {
            let slot = i as u32;
            sampler_row(slot, sampler, index.sampler(slot), policy)
        })
        .collect();

    let constant_buffers = stage
        .constant_buffers
        .iter()
        .enumerate()
        .filter_map(|(i, cb)| {
            let slot = i as u32;
            constant_buffer_row(slot, cb, index.constant_block(slot), catalog, policy)
        })
        .collect();

    let class_instances = class_instance_rows(&stage.class_instances, index, policy);

    ResolvedStage {
        kind,
        shader_label: shader_label(stage),
        bound: stage.is_bound(),
        resource_views,
        uavs,
        samplers,
        constant_buffers,
        class_instances,
    }
}

fn shader_label(stage: &ShaderStage) -> String {
    if !stage.is_bound() {
        return "Unbound Shader".to_owned();
    }

    if let Some(reflection) = stage
        .reflection
        .as_ref()
        .filter(|r| !r.entry_point.is_empty())
    {
        if let Some(file) = reflection.source_files.first() {
            let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
            return format!("{}() - {}", reflection.entry_point, file_name);
        }
    }

    if stage.name.is_empty() {
        format!("Shader {}", stage.shader)
    } else {
        stage.name.clone()
    }
}

fn slot_label(slot: SlotIndex, reflected_name: Option<&str>) -> String {
    match reflected_name {
        Some(name) if !name.is_empty() => format!("{slot}: {name}"),
        _ => slot.to_string(),
    }
}

fn view_rows<'a>(
    views: &[ResourceBinding],
    lookup: impl Fn(u32) -> Option<&'a ShaderResourceDecl>,
    category: ViewCategory,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> Vec<ResolvedSlot> {
    views
        .iter()
        .enumerate()
        .filter_map(|(i, view)| {
            let slot = i as u32;
            let decl = lookup(slot);
            view_row(
                SlotIndex::Index(slot),
                view,
                decl,
                decl.is_some(),
                category,
                catalog,
                policy,
            )
        })
        .collect()
}

fn view_row(
    slot: SlotIndex,
    view: &ResourceBinding,
    decl: Option<&ShaderResourceDecl>,
    used: bool,
    category: ViewCategory,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> Option<ResolvedSlot> {
    let filled = view.is_filled();
    if !should_show(used, filled, policy) {
        return None;
    }

    let desc = describe_resource(catalog, view, decl, category);
    Some(ResolvedSlot {
        slot,
        label: slot_label(slot, decl.map(|d| d.name.as_str())),
        name: desc.name,
        type_name: desc.type_name,
        format: desc.format,
        dims: desc.dims,
        filled,
        used,
        resource: desc.resource,
        detail: SlotDetail::View { notes: desc.notes },
    })
}

fn sampler_row(
    slot: u32,
    sampler: &SamplerBinding,
    decl: Option<&ShaderResourceDecl>,
    policy: VisibilityPolicy,
) -> Option<ResolvedSlot> {
    let filled = !sampler.sampler.is_null();
    let used = decl.is_some();
    if !should_show(used, filled, policy) {
        return None;
    }

    let mut label = slot_label(SlotIndex::Index(slot), decl.map(|d| d.name.as_str()));
    if let Some(name) = &sampler.name {
        label.push_str(&format!("({name})"));
    }

    let name = match &sampler.name {
        _ if !filled => "Empty".to_owned(),
        Some(name) => name.clone(),
        None => format!("Sampler {}", sampler.sampler),
    };

    Some(ResolvedSlot {
        slot: SlotIndex::Index(slot),
        label,
        name,
        type_name: "Sampler".to_owned(),
        format: "-".to_owned(),
        dims: Dimensions::ZERO,
        filled,
        used,
        resource: None,
        detail: SlotDetail::Sampler(summarize_sampler(sampler)),
    })
}

fn constant_buffer_row(
    slot: u32,
    cb: &ConstantBufferBinding,
    block: Option<&ConstantBlockDecl>,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> Option<ResolvedSlot> {
    let filled = !cb.buffer.is_null();
    let used = block.is_some();
    if !should_show(used, filled, policy) {
        return None;
    }

    let view = ResourceBinding {
        resource: cb.buffer,
        ..Default::default()
    };
    let desc = describe_resource(catalog, &view, None, ViewCategory::ConstantBuffer);

    let buffer_len = match catalog.buffer(cb.buffer) {
        Some(buf) => buf.length,
        None if filled => 1,
        None => 0,
    };
    let (range, provided_bytes) = match cb.range {
        ConstantBufferRange::Vectors { offset, count } => (
            format!("{} - {}", offset, u64::from(offset) + u64::from(count)),
            buffer_len,
        ),
        ConstantBufferRange::Bytes { offset, size } => (
            format!("{} - {}", offset, offset.saturating_add(size)),
            if size > 0 { size } else { buffer_len },
        ),
    };

    let variable_count = block.map_or(0, |b| b.variable_count);
    let byte_size = block.map_or(0, |b| b.byte_size);
    let size_label = if u64::from(byte_size) == provided_bytes {
        format!("{variable_count} Variables, {provided_bytes} bytes")
    } else {
        format!("{variable_count} Variables, {byte_size} bytes needed, {provided_bytes} provided")
    };

    Some(ResolvedSlot {
        slot: SlotIndex::Index(slot),
        label: slot_label(SlotIndex::Index(slot), block.map(|b| b.name.as_str())),
        name: desc.name,
        type_name: desc.type_name,
        format: desc.format,
        dims: desc.dims,
        filled,
        used,
        resource: desc.resource,
        detail: SlotDetail::ConstantBuffer(ConstantBufferSummary {
            range,
            variable_count,
            byte_size,
            provided_bytes,
            size_label,
            undersized: provided_bytes < u64::from(byte_size),
        }),
    })
}

fn class_instance_rows(
    instances: &[String],
    index: &ReflectionIndex<'_>,
    policy: VisibilityPolicy,
) -> Vec<ResolvedSlot> {
    let mut rows = Vec::new();
    for (i, instance) in instances.iter().enumerate() {
        let interface = index.interface(i);
        let filled = !instance.is_empty();
        let used = interface.is_some();
        if !should_show(used, filled, policy) {
            continue;
        }

        let slot = SlotIndex::Index(i as u32);
        let interface_name = match interface {
            Some(name) => name.to_owned(),
            None => format!("Interface {i}"),
        };
        rows.push(ResolvedSlot {
            slot,
            label: slot.to_string(),
            name: if filled {
                instance.clone()
            } else {
                "Empty".to_owned()
            },
            type_name: "Class Instance".to_owned(),
            format: "-".to_owned(),
            dims: Dimensions::ZERO,
            filled,
            used,
            resource: None,
            detail: SlotDetail::ClassInstance { interface_name },
        });
    }
    rows
}

fn buffer_row(
    slot: SlotIndex,
    buffer: ResourceId,
    used: bool,
    category: ViewCategory,
    detail: SlotDetail,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> Option<ResolvedSlot> {
    let filled = !buffer.is_null();
    if !should_show(used, filled, policy) {
        return None;
    }

    let view = ResourceBinding {
        resource: buffer,
        ..Default::default()
    };
    let desc = describe_resource(catalog, &view, None, category);
    let name = if filled {
        desc.name
    } else {
        "No Buffer Set".to_owned()
    };

    Some(ResolvedSlot {
        slot,
        label: slot.to_string(),
        name,
        type_name: desc.type_name,
        format: desc.format,
        dims: desc.dims,
        filled,
        used,
        resource: desc.resource,
        detail,
    })
}

fn resolve_input_assembler(
    snapshot: &PipelineSnapshot,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> ResolvedInputAssembler {
    let ia = &snapshot.input_assembler;

    let bytecode_label = match &ia.bytecode {
        None => "None".to_owned(),
        Some(bytecode) if bytecode.entry_point.is_empty() => ia.layout_name.clone(),
        Some(bytecode) => format!("{} ({})", ia.layout_name, bytecode.entry_point),
    };

    let usage = map_vertex_input(
        &ia.layout,
        ia.bytecode.as_ref().map(|b| b.input_signature.as_slice()),
    );

    let vertex_buffers = ia
        .vertex_buffers
        .iter()
        .enumerate()
        .filter_map(|(i, vb)| {
            buffer_row(
                SlotIndex::Index(i as u32),
                vb.buffer,
                usage.slot_used(i),
                ViewCategory::VertexBuffer,
                SlotDetail::VertexBuffer {
                    stride: vb.stride,
                    offset: vb.offset,
                },
                catalog,
                policy,
            )
        })
        .collect();

    let uses_index_buffer = snapshot.draw.is_some_and(|draw| draw.uses_index_buffer);
    let byte_width = match snapshot.draw {
        Some(draw) if draw.index_byte_width > 0 => draw.index_byte_width,
        _ => ia.index_buffer.format.element_byte_size(),
    };
    let index_buffer = buffer_row(
        SlotIndex::IndexBuffer,
        ia.index_buffer.buffer,
        uses_index_buffer,
        ViewCategory::IndexBuffer,
        SlotDetail::IndexBuffer {
            byte_width,
            offset: ia.index_buffer.offset,
        },
        catalog,
        policy,
    );

    let layout = usage
        .elements
        .into_iter()
        .filter(|elem| should_show(elem.used, true, policy))
        .collect();

    ResolvedInputAssembler {
        bytecode_label,
        layout,
        vertex_buffers,
        index_buffer,
        topology: topology_label(ia.topology),
    }
}

fn resolve_stream_out(
    snapshot: &PipelineSnapshot,
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> Vec<ResolvedSlot> {
    snapshot
        .stream_out
        .outputs
        .iter()
        .enumerate()
        .filter_map(|(i, so)| {
            buffer_row(
                SlotIndex::Index(i as u32),
                so.buffer,
                !so.buffer.is_null(),
                ViewCategory::StreamOut,
                SlotDetail::StreamOut { offset: so.offset },
                catalog,
                policy,
            )
        })
        .collect()
}

/// Graphics stages whose reflection can declare OM UAVs, in search order.
const OM_UAV_SEARCH_ORDER: [ShaderStageKind; 5] = [
    ShaderStageKind::Vertex,
    ShaderStageKind::Domain,
    ShaderStageKind::Hull,
    ShaderStageKind::Geometry,
    ShaderStageKind::Pixel,
];

/// Declaration for OM UAV register `bind`. A later stage in the search order overrides an
/// earlier one.
fn om_uav_decl<'a>(
    indices: &[(ShaderStageKind, ReflectionIndex<'a>)],
    bind: u32,
) -> Option<&'a ShaderResourceDecl> {
    OM_UAV_SEARCH_ORDER
        .iter()
        .filter_map(|kind| {
            indices
                .iter()
                .find(|(k, _)| k == kind)
                .and_then(|(_, index)| index.uav(bind))
        })
        .last()
}

fn resolve_output_merger(
    snapshot: &PipelineSnapshot,
    indices: &[(ShaderStageKind, ReflectionIndex<'_>)],
    catalog: &ResourceCatalog,
    policy: VisibilityPolicy,
) -> ResolvedOutputMerger {
    let om = &snapshot.output_merger;
    let mut targets = Vec::new();

    for (i, rt) in om.render_targets.iter().enumerate() {
        targets.extend(view_row(
            SlotIndex::Index(i as u32),
            rt,
            None,
            rt.is_filled(),
            ViewCategory::RenderTarget,
            catalog,
            policy,
        ));
    }

    for (i, uav) in om.uavs.iter().enumerate() {
        let bind = om.uav_start_slot.saturating_add(i as u32);
        let decl = om_uav_decl(indices, bind);
        targets.extend(view_row(
            SlotIndex::Index(bind),
            uav,
            decl,
            decl.is_some(),
            ViewCategory::UnorderedAccess,
            catalog,
            policy,
        ));
    }

    let depth = view_row(
        SlotIndex::Depth,
        &om.depth_target,
        None,
        om.depth_target.is_filled(),
        ViewCategory::DepthTarget,
        catalog,
        policy,
    );
    if let Some(mut depth) = depth {
        if depth.filled {
            if let SlotDetail::View { notes } = &mut depth.detail {
                notes.extend(depth_read_only_notes(
                    om.depth_read_only,
                    om.stencil_read_only,
                ));
            }
        }
        targets.push(depth);
    }

    ResolvedOutputMerger {
        targets,
        blends: blend_rows(&om.blends, &om.render_targets, policy),
    }
}

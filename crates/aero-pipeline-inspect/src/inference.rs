//! Descriptive fields (name, type, format, dimensions) for bound resources.
//!
//! The catalog says what a resource *is*; the view and the shader's reflection say how it is
//! being *used*. This module merges the three into display strings, falling back to
//! placeholders when the id does not resolve.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{
    BufferDescriptor, CatalogRef, ResourceCatalog, ResourceDescriptor, TextureDescriptor,
};
use crate::format::raw_buffer_format;
use crate::model::{
    BufferViewFlags, ResourceBinding, ShaderResourceDecl, VariableMember, VariableType,
};

/// Binding category a resource is described for. Selects the placeholder name prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewCategory {
    ShaderResource,
    UnorderedAccess,
    RenderTarget,
    DepthTarget,
    ConstantBuffer,
    VertexBuffer,
    IndexBuffer,
    StreamOut,
}

impl ViewCategory {
    fn placeholder_prefix(self) -> &'static str {
        match self {
            ViewCategory::ShaderResource => "Shader Resource",
            ViewCategory::UnorderedAccess => "UAV",
            ViewCategory::RenderTarget => "Texture",
            ViewCategory::DepthTarget => "Depth Target",
            ViewCategory::ConstantBuffer => "Constant Buffer",
            ViewCategory::VertexBuffer | ViewCategory::IndexBuffer | ViewCategory::StreamOut => {
                "Buffer"
            }
        }
    }

    /// Categories backed by a real view, which can cover a sub-range of the resource.
    fn is_view(self) -> bool {
        matches!(
            self,
            ViewCategory::ShaderResource
                | ViewCategory::UnorderedAccess
                | ViewCategory::RenderTarget
                | ViewCategory::DepthTarget
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Texture width, or byte length for buffers.
    pub width: u64,
    pub height: u32,
    pub depth: u32,
    pub array_size: u32,
}

impl Dimensions {
    pub const ZERO: Dimensions = Dimensions {
        width: 0,
        height: 0,
        depth: 0,
        array_size: 0,
    };

    /// Placeholder for a filled slot whose resource is not in the catalog.
    pub const UNRESOLVED: Dimensions = Dimensions {
        width: 1,
        height: 1,
        depth: 1,
        array_size: 1,
    };
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDescription {
    pub name: String,
    pub type_name: String,
    pub format: String,
    pub dims: Dimensions,
    pub resource: Option<CatalogRef>,
    /// Sub-range and reinterpretation notes, one sentence per entry.
    pub notes: Vec<String>,
}

/// Describes the resource behind `view`.
///
/// `decl` is the reflection declaration at the slot, if any; it only contributes to buffer
/// formats.
pub fn describe_resource(
    catalog: &ResourceCatalog,
    view: &ResourceBinding,
    decl: Option<&ShaderResourceDecl>,
    category: ViewCategory,
) -> ResourceDescription {
    if view.resource.is_null() {
        return ResourceDescription {
            name: "Empty".to_owned(),
            type_name: "Unknown".to_owned(),
            format: "Unknown".to_owned(),
            dims: Dimensions::ZERO,
            resource: None,
            notes: Vec::new(),
        };
    }

    match catalog.find(view.resource) {
        Some(ResourceDescriptor::Texture(tex)) => describe_texture(tex, view, category),
        Some(ResourceDescriptor::Buffer(buf)) => describe_buffer(buf, view, decl, category),
        None => {
            debug!(
                resource = view.resource.0,
                ?category,
                "bound resource is not in the catalog"
            );
            ResourceDescription {
                name: format!("{} {}", category.placeholder_prefix(), view.resource),
                type_name: "Unknown".to_owned(),
                format: "Unknown".to_owned(),
                dims: Dimensions::UNRESOLVED,
                resource: None,
                notes: Vec::new(),
            }
        }
    }
}

fn describe_texture(
    tex: &TextureDescriptor,
    view: &ResourceBinding,
    category: ViewCategory,
) -> ResourceDescription {
    let mut type_name = tex.kind.to_string();
    if tex.kind.is_multisampled() {
        type_name.push_str(&format!(" {}x", tex.sample_count));
    }

    let notes = if category.is_view() {
        texture_view_notes(tex, view)
    } else {
        Vec::new()
    };

    ResourceDescription {
        name: tex.name.clone(),
        type_name,
        format: tex.format.to_string(),
        dims: Dimensions {
            width: u64::from(tex.width),
            height: tex.height,
            depth: tex.depth,
            array_size: tex.array_size,
        },
        resource: Some(CatalogRef::Texture(tex.id)),
        notes,
    }
}

fn describe_buffer(
    buf: &BufferDescriptor,
    view: &ResourceBinding,
    decl: Option<&ShaderResourceDecl>,
    category: ViewCategory,
) -> ResourceDescription {
    let rw = if category == ViewCategory::UnorderedAccess {
        "RW"
    } else {
        ""
    };

    let mut type_name = if view.flags.contains(BufferViewFlags::RAW) {
        format!("{rw}ByteAddressBuffer")
    } else if buf.structure_stride > 0 {
        format!(
            "{rw}StructuredBuffer[{}]",
            buf.length / u64::from(buf.structure_stride)
        )
    } else {
        "Buffer".to_owned()
    };
    if view
        .flags
        .intersects(BufferViewFlags::APPEND | BufferViewFlags::COUNTER)
    {
        type_name.push_str(&format!(" (Count: {})", view.buffer_struct_count));
    }

    let notes = if category.is_view() {
        buffer_view_notes(buf, view)
    } else {
        Vec::new()
    };

    ResourceDescription {
        name: buf.name.clone(),
        type_name,
        format: buffer_format(view, decl),
        dims: Dimensions {
            width: buf.length,
            height: 0,
            depth: 0,
            array_size: 0,
        },
        resource: Some(CatalogRef::Buffer(buf.id)),
        notes,
    }
}

fn buffer_format(view: &ResourceBinding, decl: Option<&ShaderResourceDecl>) -> String {
    if view.format.is_typed() {
        return view.format.to_string();
    }
    match decl.filter(|decl| !decl.is_texture) {
        Some(decl) if !decl.variable_type.members.is_empty() => {
            format!("struct {}", decl.variable_type.name)
        }
        Some(decl) if !decl.variable_type.name.is_empty() => decl.variable_type.name.clone(),
        _ => "Unknown".to_owned(),
    }
}

fn texture_view_notes(tex: &TextureDescriptor, view: &ResourceBinding) -> Vec<String> {
    let mut notes = Vec::new();

    if !view.format.name.is_empty() && view.format.name != tex.format.name {
        notes.push(format!(
            "The texture is format {}, the view treats it as {}.",
            tex.format, view.format
        ));
    }

    let mips = if view.num_mip_levels == 0 {
        tex.mips.saturating_sub(view.highest_mip)
    } else {
        view.num_mip_levels
    };
    if tex.mips > 1 && (mips != tex.mips || view.highest_mip > 0) {
        if mips == 1 {
            notes.push(format!(
                "The texture has {} mips, the view covers mip {}.",
                tex.mips, view.highest_mip
            ));
        } else {
            notes.push(format!(
                "The texture has {} mips, the view covers mips {}-{}.",
                tex.mips,
                view.highest_mip,
                view.highest_mip.saturating_add(mips).saturating_sub(1)
            ));
        }
    }

    let slices = if view.array_size == 0 {
        tex.array_size.saturating_sub(view.first_array_slice)
    } else {
        view.array_size
    };
    if tex.array_size > 1 && (slices != tex.array_size || view.first_array_slice > 0) {
        if slices == 1 {
            notes.push(format!(
                "The texture has {} array slices, the view covers slice {}.",
                tex.array_size, view.first_array_slice
            ));
        } else {
            notes.push(format!(
                "The texture has {} array slices, the view covers slices {}-{}.",
                tex.array_size,
                view.first_array_slice,
                view.first_array_slice.saturating_add(slices).saturating_sub(1)
            ));
        }
    }

    notes
}

fn buffer_view_notes(buf: &BufferDescriptor, view: &ResourceBinding) -> Vec<String> {
    // Views without an element size carry no range to report.
    if view.element_size == 0 {
        return Vec::new();
    }
    let elem = u64::from(view.element_size);
    let start = u64::from(view.first_element) * elem;
    let covered = u64::from(view.num_elements) * elem;
    if start == 0 && covered >= buf.length {
        return Vec::new();
    }

    vec![
        format!(
            "The view covers bytes {}-{} ({} elements).",
            start,
            start.saturating_add(covered),
            view.num_elements
        ),
        format!(
            "The buffer is {} bytes in length ({} elements).",
            buf.length,
            buf.length / elem
        ),
    ]
}

/// Read-only notes for the depth target row.
pub fn depth_read_only_notes(depth_read_only: bool, stencil_read_only: bool) -> Vec<String> {
    let mut notes = Vec::new();
    if depth_read_only {
        notes.push("Depth component is read-only".to_owned());
    }
    if stencil_read_only {
        notes.push("Stencil component is read-only".to_owned());
    }
    notes
}

/// Element format handed to a buffer viewer opened on `view`.
///
/// Reflected structs become an HLSL-like declaration, other reflected buffers their
/// scalar/vector declaration, and everything else the raw token for the view format.
pub fn buffer_viewer_format(view: &ResourceBinding, decl: Option<&ShaderResourceDecl>) -> String {
    if let Some(decl) = decl.filter(|decl| !decl.is_texture) {
        let ty = &decl.variable_type;
        if !ty.members.is_empty() {
            return format!(
                "// struct {}\n{{\n{}}}",
                ty.name,
                format_members(1, "", &ty.members)
            );
        }
        if view.format.name.is_empty() {
            return variable_declaration(ty, &decl.name);
        }
    }

    let raw = view.flags.contains(BufferViewFlags::RAW);
    raw_buffer_format(&view.format, raw).unwrap_or_default()
}

fn variable_declaration(ty: &VariableType, name: &str) -> String {
    let mut out = String::new();
    if ty.row_major {
        out.push_str("row_major ");
    }
    out.push_str(&ty.name);
    if ty.rows > 1 && ty.cols > 1 {
        out.push_str(&format!("{}x{}", ty.rows, ty.cols));
    } else if ty.cols > 1 {
        out.push_str(&ty.cols.to_string());
    }
    if !name.is_empty() {
        out.push(' ');
        out.push_str(name);
    }
    if ty.elements > 1 {
        out.push_str(&format!("[{}]", ty.elements));
    }
    out
}

/// Renders struct members one per line; nested structs are flattened with `outer_` prefixes.
pub fn format_members(indent: usize, name_prefix: &str, members: &[VariableMember]) -> String {
    let indent_str = " ".repeat(indent * 4);
    let mut out = String::new();

    for (i, member) in members.iter().enumerate() {
        if member.ty.members.is_empty() {
            let arr = if member.ty.elements > 1 {
                format!("[{}]", member.ty.elements)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "{indent_str}{} {name_prefix}{}{arr};\n",
                member.ty.name, member.name
            ));
            continue;
        }

        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{indent_str}// struct {}\n", member.ty.name));
        out.push_str(&format!("{indent_str}{{\n"));
        out.push_str(&format_members(
            indent + 1,
            &format!("{}_", member.name),
            &member.ty.members,
        ));
        out.push_str(&format!("{indent_str}}}\n"));
        if i + 1 < members.len() {
            out.push('\n');
        }
    }

    out
}

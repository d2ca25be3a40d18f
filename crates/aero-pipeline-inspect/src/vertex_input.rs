//! Input layout walk: per-slot usage and resolved element offsets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    InputLayoutElement, SignatureElement, D3D11_APPEND_ALIGNED_ELEMENT,
    D3D11_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepClass {
    PerVertex,
    PerInstance,
}

impl StepClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StepClass::PerVertex => "PER_VERTEX",
            StepClass::PerInstance => "PER_INSTANCE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLayoutElement {
    /// Position in the layout.
    pub index: usize,
    pub semantic_name: String,
    pub semantic_index: u32,
    pub format: String,
    pub input_slot: u32,
    /// Offset actually used, after resolving `APPEND_ALIGNED`.
    pub byte_offset: u32,
    pub append_aligned: bool,
    /// `12`, or `APPEND_ALIGNED (12)`.
    pub offset_label: String,
    pub step: StepClass,
    pub instance_step_rate: u32,
    /// The layout's creation bytecode consumes this element.
    pub used: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VertexInputUsage {
    /// Indexed by input slot; `true` when at least one element reads the slot.
    pub used_slots: Vec<bool>,
    pub elements: Vec<ResolvedLayoutElement>,
}

impl VertexInputUsage {
    pub fn slot_used(&self, slot: usize) -> bool {
        self.used_slots.get(slot).copied().unwrap_or(false)
    }
}

/// Walks `elements` in declaration order, tracking one offset cursor per input slot.
///
/// An explicit offset moves the slot's cursor; an append-aligned element takes the cursor as
/// its offset. Either way the cursor then advances by the element's size. Elements naming a
/// slot past the IA slot count are kept as rows but do not mark a slot.
///
/// `ia_signature` is the input signature of the layout's creation bytecode. Without one every
/// element counts as used.
pub fn map_vertex_input(
    elements: &[InputLayoutElement],
    ia_signature: Option<&[SignatureElement]>,
) -> VertexInputUsage {
    let slot_count = D3D11_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT as usize;
    let mut used_slots = vec![false; slot_count];
    let mut cursors = vec![0u32; slot_count];
    let mut resolved = Vec::with_capacity(elements.len());

    for (index, elem) in elements.iter().enumerate() {
        let size = u32::from(elem.format.comp_byte_width) * u32::from(elem.format.comp_count);
        let append_aligned = elem.byte_offset == D3D11_APPEND_ALIGNED_ELEMENT;

        let byte_offset = match cursors.get_mut(elem.input_slot as usize) {
            Some(cursor) => {
                used_slots[elem.input_slot as usize] = true;
                if !append_aligned {
                    *cursor = elem.byte_offset;
                }
                let offset = *cursor;
                *cursor = cursor.saturating_add(size);
                offset
            }
            None => {
                debug!(
                    slot = elem.input_slot,
                    semantic = %elem.semantic_name,
                    "input layout element targets a slot past the IA slot count"
                );
                if append_aligned {
                    0
                } else {
                    elem.byte_offset
                }
            }
        };

        let offset_label = if append_aligned {
            format!("APPEND_ALIGNED ({byte_offset})")
        } else {
            byte_offset.to_string()
        };

        let used = match ia_signature {
            Some(sig) => sig.iter().any(|param| {
                param.semantic_name.eq_ignore_ascii_case(&elem.semantic_name)
                    && param.semantic_index == elem.semantic_index
            }),
            None => true,
        };

        resolved.push(ResolvedLayoutElement {
            index,
            semantic_name: elem.semantic_name.clone(),
            semantic_index: elem.semantic_index,
            format: elem.format.to_string(),
            input_slot: elem.input_slot,
            byte_offset,
            append_aligned,
            offset_label,
            step: if elem.per_instance {
                StepClass::PerInstance
            } else {
                StepClass::PerVertex
            },
            instance_step_rate: elem.instance_step_rate,
            used,
        });
    }

    VertexInputUsage {
        used_slots,
        elements: resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{CompType, ResourceFormat};

    fn element(name: &str, slot: u32, offset: u32, count: u8) -> InputLayoutElement {
        InputLayoutElement {
            semantic_name: name.into(),
            semantic_index: 0,
            format: ResourceFormat::new("R32_FLOAT", CompType::Float, count, 4),
            input_slot: slot,
            byte_offset: offset,
            per_instance: false,
            instance_step_rate: 0,
        }
    }

    #[test]
    fn append_aligned_follows_previous_element() {
        let layout = [
            element("POSITION", 0, 0, 3),
            element("NORMAL", 0, D3D11_APPEND_ALIGNED_ELEMENT, 3),
        ];
        let usage = map_vertex_input(&layout, None);
        assert_eq!(usage.elements[1].byte_offset, 12);
        assert_eq!(usage.elements[1].offset_label, "APPEND_ALIGNED (12)");
        assert_eq!(usage.elements[0].offset_label, "0");
        assert!(usage.slot_used(0));
        assert!(!usage.slot_used(1));
    }

    #[test]
    fn cursors_are_per_slot_in_declaration_order() {
        let layout = [
            element("POSITION", 1, 0, 4),
            element("TEXCOORD", 0, 8, 2),
            element("COLOR", 1, D3D11_APPEND_ALIGNED_ELEMENT, 4),
            element("NORMAL", 0, D3D11_APPEND_ALIGNED_ELEMENT, 3),
        ];
        let usage = map_vertex_input(&layout, None);
        let offsets: Vec<u32> = usage.elements.iter().map(|e| e.byte_offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 16]);
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let layout = [element("POSITION", 40, D3D11_APPEND_ALIGNED_ELEMENT, 4)];
        let usage = map_vertex_input(&layout, None);
        assert_eq!(usage.used_slots.len(), 32);
        assert!(usage.used_slots.iter().all(|used| !used));
        assert_eq!(usage.elements[0].byte_offset, 0);
    }

    #[test]
    fn used_comes_from_bytecode_signature() {
        let layout = [element("position", 0, 0, 3), element("TANGENT", 0, 12, 4)];
        let sig = [SignatureElement {
            semantic_name: "POSITION".into(),
            semantic_index: 0,
            comp_count: 3,
            comp_type: CompType::Float,
            system_value: false,
        }];
        let usage = map_vertex_input(&layout, Some(&sig));
        assert!(usage.elements[0].used);
        assert!(!usage.elements[1].used);
    }
}

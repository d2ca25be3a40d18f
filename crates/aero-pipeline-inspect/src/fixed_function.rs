//! Rows for fixed-function state: viewports, scissors, blend targets, topology and the
//! per-stage enable flags of the pipeline flow diagram.

use serde::{Deserialize, Serialize};

use crate::model::{
    BlendEquation, BlendTarget, PipelineSnapshot, ResourceBinding, Scissor, Topology, Viewport,
};
use crate::visibility::{should_show, VisibilityPolicy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportRow {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
    pub enabled: bool,
    /// Zero area or zero depth range.
    pub empty: bool,
}

/// Enabled viewports, plus disabled ones when `show_empty` is set.
pub fn viewport_rows(viewports: &[Viewport], policy: VisibilityPolicy) -> Vec<ViewportRow> {
    viewports
        .iter()
        .enumerate()
        .filter(|(_, vp)| vp.enabled || policy.show_empty)
        .map(|(index, vp)| ViewportRow {
            index,
            x: vp.x,
            y: vp.y,
            width: vp.width,
            height: vp.height,
            min_depth: vp.min_depth,
            max_depth: vp.max_depth,
            enabled: vp.enabled,
            empty: vp.width == 0.0 || vp.height == 0.0 || vp.min_depth == vp.max_depth,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScissorRow {
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub enabled: bool,
    pub empty: bool,
}

pub fn scissor_rows(scissors: &[Scissor], policy: VisibilityPolicy) -> Vec<ScissorRow> {
    scissors
        .iter()
        .enumerate()
        .filter(|(_, sc)| sc.enabled || policy.show_empty)
        .map(|(index, sc)| ScissorRow {
            index,
            x: sc.left,
            y: sc.top,
            width: sc.right.saturating_sub(sc.left),
            height: sc.bottom.saturating_sub(sc.top),
            enabled: sc.enabled,
            empty: sc.right == sc.left || sc.bottom == sc.top,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendRow {
    pub index: usize,
    pub enabled: bool,
    pub logic_enabled: bool,
    pub color: BlendEquation,
    pub alpha: BlendEquation,
    pub logic_op: String,
    /// `RGBA` with `_` for disabled channels.
    pub write_mask: String,
    pub filled: bool,
    pub used: bool,
}

/// A blend target is used when its render target is bound, and filled when it is also enabled.
pub fn blend_rows(
    blends: &[BlendTarget],
    render_targets: &[ResourceBinding],
    policy: VisibilityPolicy,
) -> Vec<BlendRow> {
    let mut rows = Vec::new();
    for (index, blend) in blends.iter().enumerate() {
        let target_bound = render_targets
            .get(index)
            .is_some_and(ResourceBinding::is_filled);
        let filled = blend.enabled || target_bound;
        let used = target_bound;
        if !should_show(used, filled, policy) {
            continue;
        }
        rows.push(BlendRow {
            index,
            enabled: blend.enabled,
            logic_enabled: blend.logic_enabled,
            color: blend.color.clone(),
            alpha: blend.alpha.clone(),
            logic_op: blend.logic_op.clone(),
            write_mask: write_mask_string(blend.write_mask),
            filled,
            used,
        });
    }
    rows
}

pub fn write_mask_string(mask: u8) -> String {
    ['R', 'G', 'B', 'A']
        .iter()
        .enumerate()
        .map(|(bit, &c)| if mask & (1 << bit) != 0 { c } else { '_' })
        .collect()
}

pub fn topology_label(topology: Topology) -> String {
    match topology {
        Topology::PatchList(points) if points > 0 => {
            format!("PatchList ({points} Control Points)")
        }
        other => other.to_string(),
    }
}

/// Stage enable flags for the pipeline flow diagram, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFlow {
    pub input_assembler: bool,
    pub vertex: bool,
    pub hull: bool,
    pub domain: bool,
    pub geometry: bool,
    pub rasterizer: bool,
    pub pixel: bool,
    pub output_merger: bool,
    pub compute: bool,
}

impl StageFlow {
    const fn all(enabled: bool) -> Self {
        Self {
            input_assembler: enabled,
            vertex: enabled,
            hull: enabled,
            domain: enabled,
            geometry: enabled,
            rasterizer: enabled,
            pixel: enabled,
            output_merger: enabled,
            compute: enabled,
        }
    }

    /// `(abbreviation, enabled)` pairs in pipeline order.
    pub fn entries(&self) -> [(&'static str, bool); 9] {
        [
            ("IA", self.input_assembler),
            ("VS", self.vertex),
            ("HS", self.hull),
            ("DS", self.domain),
            ("GS", self.geometry),
            ("RS", self.rasterizer),
            ("PS", self.pixel),
            ("OM", self.output_merger),
            ("CS", self.compute),
        ]
    }
}

pub fn stage_flow(snapshot: &PipelineSnapshot) -> StageFlow {
    match snapshot.draw {
        None => StageFlow::all(true),
        Some(draw) if draw.is_dispatch => StageFlow {
            compute: true,
            ..StageFlow::all(false)
        },
        Some(_) => StageFlow {
            input_assembler: true,
            vertex: true,
            hull: snapshot.hull.is_bound(),
            domain: snapshot.domain.is_bound(),
            geometry: snapshot.geometry.is_bound(),
            rasterizer: true,
            pixel: snapshot.pixel.is_bound(),
            output_merger: true,
            compute: false,
        },
    }
}

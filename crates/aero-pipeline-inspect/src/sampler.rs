//! Short human strings for sampler state.

use serde::{Deserialize, Serialize};

use crate::model::{AddressMode, FilterFunc, SamplerBinding, TextureFilter};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerSummary {
    /// e.g. `UV: Wrap, W: Clamp` or `UVW: Border<0, 0, 0, 1>`.
    pub addressing: String,
    /// e.g. `Min&Mag: Linear, Mip: Point 16x (Less Equal)`.
    pub filter: String,
    /// e.g. `0 - FLT_MAX`.
    pub lod_range: String,
    pub lod_bias: f32,
    pub max_anisotropy: u32,
}

pub fn summarize_sampler(sampler: &SamplerBinding) -> SamplerSummary {
    SamplerSummary {
        addressing: addressing_string(sampler),
        filter: filter_string(sampler),
        lod_range: lod_range_string(sampler.min_lod, sampler.max_lod),
        lod_bias: sampler.lod_bias,
        max_anisotropy: sampler.max_anisotropy,
    }
}

/// Joins runs of equal consecutive values into `"{labels}: {value}"` clauses.
///
/// `UV: Wrap, W: Clamp` uses an empty separator between labels, `Min&Mag: Linear` uses `&`.
fn group_runs(labels: &[&str], values: &[String], separator: &str) -> String {
    let mut clauses: Vec<(String, &str)> = Vec::new();
    for (label, value) in labels.iter().zip(values) {
        match clauses.last_mut() {
            Some((prefix, last)) if *last == value.as_str() => {
                prefix.push_str(separator);
                prefix.push_str(label);
            }
            _ => clauses.push(((*label).to_owned(), value.as_str())),
        }
    }

    clauses
        .iter()
        .map(|(prefix, value)| format!("{prefix}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn addressing_string(sampler: &SamplerBinding) -> String {
    let axes = [sampler.address_u, sampler.address_v, sampler.address_w];
    let values: Vec<String> = axes.iter().map(ToString::to_string).collect();
    let mut out = group_runs(&["U", "V", "W"], &values, "");

    if axes.contains(&AddressMode::Border) {
        let [r, g, b, a] = sampler.border_color;
        out.push_str(&format!("<{r}, {g}, {b}, {a}>"));
    }
    out
}

/// `Min&Mag&Mip: Linear`, `Min&Mag: Linear, Mip: Point`, ...
pub fn texture_filter_name(filter: &TextureFilter) -> String {
    let values = [
        filter.minify.to_string(),
        filter.magnify.to_string(),
        filter.mip.to_string(),
    ];
    group_runs(&["Min", "Mag", "Mip"], &values, "&")
}

pub fn filter_string(sampler: &SamplerBinding) -> String {
    let mut out = texture_filter_name(&sampler.filter);

    if sampler.max_anisotropy > 0 {
        out.push_str(&format!(" {}x", sampler.max_anisotropy));
    }

    if let Some(cmp) = sampler.comparison {
        out.push_str(&format!(" ({cmp})"));
    }

    match sampler.filter.func {
        FilterFunc::Minimum => out.push_str(" (Minimum)"),
        FilterFunc::Maximum => out.push_str(" (Maximum)"),
        FilterFunc::Normal | FilterFunc::Comparison => {}
    }

    out
}

pub fn lod_range_string(min_lod: f32, max_lod: f32) -> String {
    let min = if min_lod == -f32::MAX {
        "0".to_owned()
    } else {
        min_lod.to_string()
    };
    let max = if max_lod == f32::MAX {
        "FLT_MAX".to_owned()
    } else {
        max_lod.to_string()
    };
    format!("{min} - {max}")
}

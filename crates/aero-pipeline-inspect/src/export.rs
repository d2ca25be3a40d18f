//! Plain-text export of a [`ResolvedPipeline`].
//!
//! Every cell comes straight from the resolved rows, so the export always agrees with what an
//! interactive view built from the same [`ResolvedPipeline`] shows.

use std::fmt::{self, Write};

use crate::resolve::{ResolvedPipeline, ResolvedSlot, ResolvedStage, SlotDetail};

const REPORT_HEADER: &str = "pipeline-report v1";

pub fn render_text_report(pipeline: &ResolvedPipeline) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text_report(pipeline, &mut out);
    out
}

pub fn write_text_report<W: Write>(pipeline: &ResolvedPipeline, out: &mut W) -> fmt::Result {
    writeln!(out, "{REPORT_HEADER}")?;
    writeln!(out)?;

    let flow: Vec<String> = pipeline
        .stage_flow
        .entries()
        .iter()
        .map(|(name, enabled)| {
            if *enabled {
                (*name).to_owned()
            } else {
                format!("({name})")
            }
        })
        .collect();
    writeln!(out, "stages: {}", flow.join(" "))?;
    writeln!(out)?;

    write_input_assembler(pipeline, out)?;

    for stage in &pipeline.stages {
        write_stage(stage, out)?;
    }

    writeln!(out, "stream out:")?;
    write_buffer_table(&pipeline.stream_out, out)?;
    writeln!(out)?;

    write_rasterizer(pipeline, out)?;
    write_output_merger(pipeline, out)?;
    Ok(())
}

fn write_input_assembler<W: Write>(pipeline: &ResolvedPipeline, out: &mut W) -> fmt::Result {
    let ia = &pipeline.input_assembler;
    writeln!(out, "input assembler:")?;
    writeln!(out, "  bytecode: {}", ia.bytecode_label)?;
    writeln!(out, "  topology: {}", ia.topology)?;

    if let Some(summary) = pipeline.mismatch.summary() {
        writeln!(out, "  {summary}")?;
        for line in &pipeline.mismatch.lines {
            writeln!(out, "    {line}")?;
        }
    }

    writeln!(out, "  layout:")?;
    let rows: Vec<Vec<String>> = ia
        .layout
        .iter()
        .map(|elem| {
            vec![
                elem.index.to_string(),
                elem.semantic_name.clone(),
                elem.semantic_index.to_string(),
                elem.format.clone(),
                elem.input_slot.to_string(),
                elem.offset_label.clone(),
                elem.step.as_str().to_owned(),
                elem.instance_step_rate.to_string(),
                if elem.used { "" } else { "unused" }.to_owned(),
            ]
        })
        .collect();
    write_table(
        out,
        4,
        &[
            "Slot",
            "Semantic",
            "Index",
            "Format",
            "Input Slot",
            "Offset",
            "Class",
            "Step Rate",
            "Flags",
        ],
        &rows,
    )?;

    writeln!(out, "  buffers:")?;
    let buffers: Vec<&ResolvedSlot> = ia
        .index_buffer
        .iter()
        .chain(ia.vertex_buffers.iter())
        .collect();
    let rows: Vec<Vec<String>> = buffers
        .iter()
        .map(|row| {
            let (stride, offset) = match row.detail {
                SlotDetail::VertexBuffer { stride, offset } => {
                    (stride.to_string(), offset.to_string())
                }
                SlotDetail::IndexBuffer { byte_width, offset } => {
                    (byte_width.to_string(), offset.to_string())
                }
                _ => ("-".to_owned(), "-".to_owned()),
            };
            if row.filled {
                vec![
                    row.label.clone(),
                    row.name.clone(),
                    stride,
                    offset,
                    row.dims.width.to_string(),
                    flags(row),
                ]
            } else {
                vec![
                    row.label.clone(),
                    row.name.clone(),
                    "-".to_owned(),
                    "-".to_owned(),
                    "-".to_owned(),
                    flags(row),
                ]
            }
        })
        .collect();
    write_table(
        out,
        4,
        &["Slot", "Buffer", "Stride", "Offset", "Byte Length", "Flags"],
        &rows,
    )?;
    writeln!(out)
}

fn write_stage<W: Write>(stage: &ResolvedStage, out: &mut W) -> fmt::Result {
    writeln!(out, "{}: {}", stage.kind.abbrev(), stage.shader_label)?;

    writeln!(out, "  resources:")?;
    write_view_table(&stage.resource_views, out)?;

    if !stage.uavs.is_empty() {
        writeln!(out, "  uavs:")?;
        write_view_table(&stage.uavs, out)?;
    }

    writeln!(out, "  samplers:")?;
    let rows: Vec<Vec<String>> = stage
        .samplers
        .iter()
        .map(|row| match &row.detail {
            SlotDetail::Sampler(s) => vec![
                row.label.clone(),
                s.addressing.clone(),
                s.filter.clone(),
                s.lod_range.clone(),
                s.lod_bias.to_string(),
                flags(row),
            ],
            _ => vec![row.label.clone(), row.name.clone()],
        })
        .collect();
    write_table(
        out,
        4,
        &["Slot", "Addressing", "Filter", "LOD Clamp", "LOD Bias", "Flags"],
        &rows,
    )?;

    writeln!(out, "  constant buffers:")?;
    let rows: Vec<Vec<String>> = stage
        .constant_buffers
        .iter()
        .map(|row| match &row.detail {
            SlotDetail::ConstantBuffer(cb) => vec![
                row.label.clone(),
                row.name.clone(),
                cb.range.clone(),
                cb.size_label.clone(),
                flags(row),
            ],
            _ => vec![row.label.clone(), row.name.clone()],
        })
        .collect();
    write_table(
        out,
        4,
        &["Slot", "Buffer", "Range", "Size", "Flags"],
        &rows,
    )?;

    if !stage.class_instances.is_empty() {
        writeln!(out, "  class instances:")?;
        let rows: Vec<Vec<String>> = stage
            .class_instances
            .iter()
            .map(|row| {
                let interface = match &row.detail {
                    SlotDetail::ClassInstance { interface_name } => interface_name.clone(),
                    _ => String::new(),
                };
                vec![row.label.clone(), interface, row.name.clone(), flags(row)]
            })
            .collect();
        write_table(out, 4, &["Slot", "Interface", "Instance", "Flags"], &rows)?;
    }

    writeln!(out)
}

fn write_rasterizer<W: Write>(pipeline: &ResolvedPipeline, out: &mut W) -> fmt::Result {
    let rs = &pipeline.rasterizer;
    writeln!(out, "rasterizer:")?;

    writeln!(out, "  viewports:")?;
    let rows: Vec<Vec<String>> = rs
        .viewports
        .iter()
        .map(|vp| {
            vec![
                vp.index.to_string(),
                vp.x.to_string(),
                vp.y.to_string(),
                vp.width.to_string(),
                vp.height.to_string(),
                vp.min_depth.to_string(),
                vp.max_depth.to_string(),
                row_state(vp.enabled, !vp.empty),
            ]
        })
        .collect();
    write_table(
        out,
        4,
        &["Slot", "X", "Y", "Width", "Height", "MinDepth", "MaxDepth", "Flags"],
        &rows,
    )?;

    writeln!(out, "  scissors:")?;
    let rows: Vec<Vec<String>> = rs
        .scissors
        .iter()
        .map(|sc| {
            vec![
                sc.index.to_string(),
                sc.x.to_string(),
                sc.y.to_string(),
                sc.width.to_string(),
                sc.height.to_string(),
                row_state(sc.enabled, !sc.empty),
            ]
        })
        .collect();
    write_table(
        out,
        4,
        &["Slot", "X", "Y", "Width", "Height", "Flags"],
        &rows,
    )?;
    writeln!(out)
}

fn write_output_merger<W: Write>(pipeline: &ResolvedPipeline, out: &mut W) -> fmt::Result {
    let om = &pipeline.output_merger;
    writeln!(out, "output merger:")?;

    writeln!(out, "  targets:")?;
    write_view_table(&om.targets, out)?;

    writeln!(out, "  blends:")?;
    let rows: Vec<Vec<String>> = om
        .blends
        .iter()
        .map(|b| {
            vec![
                b.index.to_string(),
                bool_text(b.enabled),
                bool_text(b.logic_enabled),
                b.color.source.clone(),
                b.color.destination.clone(),
                b.color.operation.clone(),
                b.alpha.source.clone(),
                b.alpha.destination.clone(),
                b.alpha.operation.clone(),
                b.logic_op.clone(),
                b.write_mask.clone(),
                row_state(b.used, b.filled),
            ]
        })
        .collect();
    write_table(
        out,
        4,
        &[
            "Slot",
            "Enabled",
            "Logic",
            "Col Src",
            "Col Dst",
            "Col Op",
            "Alpha Src",
            "Alpha Dst",
            "Alpha Op",
            "Logic Op",
            "Write Mask",
            "Flags",
        ],
        &rows,
    )
}

fn write_view_table<W: Write>(slots: &[ResolvedSlot], out: &mut W) -> fmt::Result {
    let rows: Vec<Vec<String>> = slots
        .iter()
        .map(|row| {
            vec![
                row.label.clone(),
                row.name.clone(),
                row.type_name.clone(),
                row.dims.width.to_string(),
                row.dims.height.to_string(),
                row.dims.depth.to_string(),
                row.dims.array_size.to_string(),
                row.format.clone(),
                flags(row),
            ]
        })
        .collect();
    write_table(
        out,
        4,
        &[
            "Slot",
            "Resource",
            "Type",
            "Width",
            "Height",
            "Depth",
            "Array Size",
            "Format",
            "Flags",
        ],
        &rows,
    )?;

    for row in slots {
        if let SlotDetail::View { notes } = &row.detail {
            for note in notes {
                writeln!(out, "      {}: {note}", row.label)?;
            }
        }
    }
    Ok(())
}

fn write_buffer_table<W: Write>(slots: &[ResolvedSlot], out: &mut W) -> fmt::Result {
    let rows: Vec<Vec<String>> = slots
        .iter()
        .map(|row| {
            let offset = match row.detail {
                SlotDetail::StreamOut { offset } => offset.to_string(),
                _ => "-".to_owned(),
            };
            vec![
                row.label.clone(),
                row.name.clone(),
                row.dims.width.to_string(),
                offset,
                flags(row),
            ]
        })
        .collect();
    write_table(
        out,
        2,
        &["Slot", "Buffer", "Byte Length", "Offset", "Flags"],
        &rows,
    )
}

fn flags(row: &ResolvedSlot) -> String {
    row_state(row.used, row.filled)
}

fn row_state(used: bool, filled: bool) -> String {
    match (used, filled) {
        (true, true) => String::new(),
        (true, false) => "empty".to_owned(),
        (false, true) => "unused".to_owned(),
        (false, false) => "empty, unused".to_owned(),
    }
}

fn bool_text(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_owned()
}

/// Left-aligned columns sized to their widest cell. Rows shorter than `headers` are padded
/// with blanks.
fn write_table<W: Write>(
    out: &mut W,
    indent: usize,
    headers: &[&str],
    rows: &[Vec<String>],
) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(out, "{:indent$}<none>", "", indent = indent);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_owned()).collect();
    write_row(out, indent, &widths, &header_cells)?;
    for row in rows {
        write_row(out, indent, &widths, row)?;
    }
    Ok(())
}

fn write_row<W: Write>(
    out: &mut W,
    indent: usize,
    widths: &[usize],
    cells: &[String],
) -> fmt::Result {
    let mut line = " ".repeat(indent);
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(&format!("{cell:<width$}"));
    }
    writeln!(out, "{}", line.trim_end())
}

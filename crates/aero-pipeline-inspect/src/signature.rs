//! IA layout bytecode vs. bound vertex shader input signature.

use serde::{Deserialize, Serialize};

use crate::model::{PipelineSnapshot, SignatureElement};

/// Banner shown when [`MismatchReport::has_mismatch`] is true.
pub const MISMATCH_SUMMARY: &str =
    "Warning: Mismatch detected between bytecode used to create IA and currently bound VS inputs";

/// Ordered diagnostic lines. Empty means the signatures agree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchReport {
    pub lines: Vec<String>,
}

impl MismatchReport {
    pub fn has_mismatch(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn summary(&self) -> Option<&'static str> {
        self.has_mismatch().then_some(MISMATCH_SUMMARY)
    }

    /// All lines joined with newlines.
    pub fn details(&self) -> String {
        self.lines.join("\n")
    }
}

/// Compares the layout's creation signature against the vertex shader's input signature.
///
/// Only the common prefix is compared element by element; a shorter IA signature gets one
/// extra line. Each rule adds its own line.
pub fn check_signatures(ia: &[SignatureElement], vs: &[SignatureElement]) -> MismatchReport {
    let mut lines = Vec::new();

    if ia.len() < vs.len() {
        lines.push("IA bytecode provides fewer elements than VS wants.".to_owned());
    }

    for (i, (ia_elem, vs_elem)) in ia.iter().zip(vs).enumerate() {
        let ia_name = ia_elem.semantic_idx_name();
        let vs_name = vs_elem.semantic_idx_name();

        if !ia_name.eq_ignore_ascii_case(&vs_name) {
            lines.push(format!(
                "IA bytecode semantic {i}: {ia_name} != VS bytecode semantic {i}: {vs_name}"
            ));
        }

        if ia_elem.comp_count < vs_elem.comp_count {
            lines.push(format!(
                "IA bytecode semantic {i} ({ia_name}) is {}-wide, VS bytecode semantic {i} ({vs_name}) is {}-wide",
                ia_elem.comp_count, vs_elem.comp_count
            ));
        }

        if ia_elem.comp_type != vs_elem.comp_type {
            lines.push(format!(
                "IA bytecode semantic {i} ({ia_name}) is {}, VS bytecode semantic {i} ({vs_name}) is {}",
                ia_elem.comp_type, vs_elem.comp_type
            ));
        }
    }

    MismatchReport { lines }
}

/// Runs [`check_signatures`] when both the IA bytecode and VS reflection are present.
pub fn check_snapshot(snapshot: &PipelineSnapshot) -> MismatchReport {
    let ia = snapshot.input_assembler.bytecode.as_ref();
    let vs = snapshot.vertex.reflection.as_ref();
    match (ia, vs) {
        (Some(ia), Some(vs)) => check_signatures(&ia.input_signature, &vs.input_signature),
        _ => MismatchReport::default(),
    }
}

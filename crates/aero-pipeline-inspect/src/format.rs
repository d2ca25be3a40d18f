//! Resource formats as seen through views and catalog entries.
//!
//! Formats arrive pre-described by the capture layer: a display name plus the component layout.
//! Nothing here decodes DXGI enums; it only classifies what is already known.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base type of each component of a format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompType {
    #[default]
    Typeless,
    Float,
    UNorm,
    SNorm,
    UInt,
    SInt,
    UScaled,
    SScaled,
    Depth,
    Double,
    UNormSrgb,
}

impl fmt::Display for CompType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompType::Typeless => "Typeless",
            CompType::Float => "Float",
            CompType::UNorm => "UNorm",
            CompType::SNorm => "SNorm",
            CompType::UInt => "UInt",
            CompType::SInt => "SInt",
            CompType::UScaled => "UScaled",
            CompType::SScaled => "SScaled",
            CompType::Depth => "Depth/Stencil",
            CompType::Double => "Double",
            CompType::UNormSrgb => "sRGB",
        };
        f.write_str(s)
    }
}

/// Packed layouts whose components do not share a byte width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackedFormat {
    /// 10-10-10-2 (`R10G10B10A2_UNORM` / `_UINT`).
    R10G10B10A2,
    /// 11-11-10 float (`R11G11B10_FLOAT`).
    R11G11B10,
}

/// A described format: display name plus component layout.
///
/// The default value (empty name, typeless, no components) stands for "no format declared".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceFormat {
    /// Display name, e.g. `R8G8B8A8_UNORM`.
    pub name: String,
    pub comp_type: CompType,
    pub comp_count: u8,
    pub comp_byte_width: u8,
    pub packed: Option<PackedFormat>,
}

impl ResourceFormat {
    /// Convenience constructor for a non-packed format.
    pub fn new(
        name: impl Into<String>,
        comp_type: CompType,
        comp_count: u8,
        comp_byte_width: u8,
    ) -> Self {
        Self {
            name: name.into(),
            comp_type,
            comp_count,
            comp_byte_width,
            packed: None,
        }
    }

    /// A view format is typed when its component type is known.
    pub fn is_typed(&self) -> bool {
        self.comp_type != CompType::Typeless
    }

    /// Bytes occupied by one element of this format.
    ///
    /// Packed formats always occupy 4 bytes.
    pub fn element_byte_size(&self) -> u32 {
        match self.packed {
            Some(_) => 4,
            None => u32::from(self.comp_byte_width) * u32::from(self.comp_count),
        }
    }
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str("Unknown")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Synthesizes the raw buffer-viewer token for a view format (`float3`, `unormb4`, `xint1`, ...).
///
/// A `(byte width, component type)` pair with no token, e.g. an 8-bit float, keeps only the
/// component count. Returns `None` for a 10-10-10-2 format that is neither `UInt` nor `UNorm`.
pub fn raw_buffer_format(format: &ResourceFormat, raw_view: bool) -> Option<String> {
    match format.packed {
        Some(PackedFormat::R10G10B10A2) => {
            return match format.comp_type {
                CompType::UInt => Some("uintten".to_owned()),
                CompType::UNorm => Some("unormten".to_owned()),
                _ => None,
            };
        }
        Some(PackedFormat::R11G11B10) => return Some("floateleven".to_owned()),
        None => {}
    }

    let base = if raw_view {
        "xint"
    } else {
        scalar_token(format.comp_byte_width, format.comp_type).unwrap_or_default()
    };

    Some(format!("{base}{}", format.comp_count))
}

fn scalar_token(byte_width: u8, comp_type: CompType) -> Option<&'static str> {
    let token = match (byte_width, comp_type) {
        (1, CompType::UNorm) => "unormb",
        (1, CompType::SNorm) => "snormb",
        (1, CompType::UInt) => "ubyte",
        (1, CompType::SInt) => "byte",
        (2, CompType::UNorm) => "unormh",
        (2, CompType::SNorm) => "snormh",
        (2, CompType::UInt) => "ushort",
        (2, CompType::SInt) => "short",
        (2, CompType::Float) => "half",
        (4, CompType::UNorm) => "unormf",
        (4, CompType::SNorm) => "snormf",
        (4, CompType::UInt) => "uint",
        (4, CompType::SInt) => "int",
        (4, CompType::Float) => "float",
        _ => return None,
    };
    Some(token)
}

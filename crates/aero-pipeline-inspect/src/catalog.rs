//! Frame-level texture/buffer descriptor tables.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::ResourceFormat;
use crate::model::ResourceId;

/// Resource-kind tag of a texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    #[default]
    Unknown,
    Buffer,
    Texture1D,
    Texture1DArray,
    Texture2D,
    TextureRect,
    Texture2DArray,
    Texture2DMS,
    Texture2DMSArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
}

impl TextureKind {
    pub fn is_multisampled(self) -> bool {
        matches!(self, TextureKind::Texture2DMS | TextureKind::Texture2DMSArray)
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextureKind::Unknown => "Unknown",
            TextureKind::Buffer => "Buffer",
            TextureKind::Texture1D => "Texture 1D",
            TextureKind::Texture1DArray => "Texture 1D Array",
            TextureKind::Texture2D => "Texture 2D",
            TextureKind::TextureRect => "Texture Rect",
            TextureKind::Texture2DArray => "Texture 2D Array",
            TextureKind::Texture2DMS => "Texture 2D MS",
            TextureKind::Texture2DMSArray => "Texture 2D MS Array",
            TextureKind::Texture3D => "Texture 3D",
            TextureKind::TextureCube => "Texture Cube",
            TextureKind::TextureCubeArray => "Texture Cube Array",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDescriptor {
    pub id: ResourceId,
    pub name: String,
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_size: u32,
    pub mips: u32,
    pub sample_count: u32,
    pub format: ResourceFormat,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferDescriptor {
    pub id: ResourceId,
    pub name: String,
    /// Length in bytes.
    pub length: u64,
    /// Record size for structured buffers, `0` otherwise.
    pub structure_stride: u32,
}

/// Result of a successful catalog lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResourceDescriptor<'a> {
    Texture(&'a TextureDescriptor),
    Buffer(&'a BufferDescriptor),
}

impl ResourceDescriptor<'_> {
    pub fn catalog_ref(&self) -> CatalogRef {
        match self {
            ResourceDescriptor::Texture(tex) => CatalogRef::Texture(tex.id),
            ResourceDescriptor::Buffer(buf) => CatalogRef::Buffer(buf.id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceDescriptor::Texture(tex) => &tex.name,
            ResourceDescriptor::Buffer(buf) => &buf.name,
        }
    }
}

/// Back-reference from a resolved row to the catalog entry it came from.
///
/// Downstream viewers use this to open the texture or buffer behind a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogRef {
    Texture(ResourceId),
    Buffer(ResourceId),
}

/// A catalog consistency problem found by [`ResourceCatalog::first_conflict`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogConflict {
    /// The id appears in both the texture and the buffer table.
    Ambiguous(ResourceId),
    /// The id appears twice in the named table.
    Duplicate {
        id: ResourceId,
        table: &'static str,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCatalog {
    pub textures: Vec<TextureDescriptor>,
    pub buffers: Vec<BufferDescriptor>,
}

impl ResourceCatalog {
    /// Looks `id` up in the texture table, then the buffer table.
    ///
    /// The null id never resolves.
    pub fn find(&self, id: ResourceId) -> Option<ResourceDescriptor<'_>> {
        if id.is_null() {
            return None;
        }
        if let Some(tex) = self.texture(id) {
            return Some(ResourceDescriptor::Texture(tex));
        }
        self.buffer(id).map(ResourceDescriptor::Buffer)
    }

    pub fn texture(&self, id: ResourceId) -> Option<&TextureDescriptor> {
        if id.is_null() {
            return None;
        }
        self.textures.iter().find(|tex| tex.id == id)
    }

    pub fn buffer(&self, id: ResourceId) -> Option<&BufferDescriptor> {
        if id.is_null() {
            return None;
        }
        self.buffers.iter().find(|buf| buf.id == id)
    }

    /// Returns the first id that would make [`Self::find`] ambiguous, if any.
    ///
    /// Null ids are ignored since they never resolve.
    pub fn first_conflict(&self) -> Option<CatalogConflict> {
        let mut textures = HashSet::new();
        for tex in self.textures.iter().filter(|tex| !tex.id.is_null()) {
            if !textures.insert(tex.id) {
                return Some(CatalogConflict::Duplicate {
                    id: tex.id,
                    table: "textures",
                });
            }
        }

        let mut buffers = HashSet::new();
        for buf in self.buffers.iter().filter(|buf| !buf.id.is_null()) {
            if textures.contains(&buf.id) {
                return Some(CatalogConflict::Ambiguous(buf.id));
            }
            if !buffers.insert(buf.id) {
                return Some(CatalogConflict::Duplicate {
                    id: buf.id,
                    table: "buffers",
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ResourceCatalog {
        ResourceCatalog {
            textures: vec![TextureDescriptor {
                id: ResourceId(10),
                name: "albedo".into(),
                kind: TextureKind::Texture2D,
                ..Default::default()
            }],
            buffers: vec![BufferDescriptor {
                id: ResourceId(20),
                name: "instances".into(),
                length: 256,
                structure_stride: 16,
            }],
        }
    }

    #[test]
    fn find_checks_textures_then_buffers() {
        let catalog = catalog();
        assert!(matches!(
            catalog.find(ResourceId(10)),
            Some(ResourceDescriptor::Texture(tex)) if tex.name == "albedo"
        ));
        assert!(matches!(
            catalog.find(ResourceId(20)),
            Some(ResourceDescriptor::Buffer(buf)) if buf.length == 256
        ));
        assert_eq!(catalog.find(ResourceId(30)), None);
    }

    #[test]
    fn null_id_never_resolves() {
        let mut catalog = catalog();
        catalog.buffers.push(BufferDescriptor::default());
        assert_eq!(catalog.find(ResourceId::NULL), None);
        assert_eq!(catalog.buffer(ResourceId::NULL), None);
        assert_eq!(catalog.first_conflict(), None);
    }

    #[test]
    fn conflicts_are_reported() {
        let mut catalog = catalog();
        catalog.buffers.push(BufferDescriptor {
            id: ResourceId(10),
            ..Default::default()
        });
        assert_eq!(
            catalog.first_conflict(),
            Some(CatalogConflict::Ambiguous(ResourceId(10)))
        );

        let mut catalog = self::catalog();
        catalog.buffers.push(catalog.buffers[0].clone());
        assert_eq!(
            catalog.first_conflict(),
            Some(CatalogConflict::Duplicate {
                id: ResourceId(20),
                table: "buffers"
            })
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(TextureKind::Texture2DMSArray.to_string(), "Texture 2D MS Array");
        assert_eq!(TextureKind::TextureCubeArray.to_string(), "Texture Cube Array");
        assert!(TextureKind::Texture2DMS.is_multisampled());
        assert!(!TextureKind::Texture2D.is_multisampled());
    }
}

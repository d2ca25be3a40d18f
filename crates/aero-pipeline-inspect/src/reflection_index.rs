//! Bind point -> declaration lookup, built once per stage.

use std::collections::HashMap;

use crate::model::{BindingKind, ConstantBlockDecl, ShaderReflection, ShaderResourceDecl};

/// Index over one stage's reflection.
///
/// When several declarations share a bind point, the first one in declaration order wins. A
/// stage without reflection gets an empty index, so every lookup reports "unused".
#[derive(Debug, Default)]
pub struct ReflectionIndex<'a> {
    resource_views: HashMap<u32, &'a ShaderResourceDecl>,
    uavs: HashMap<u32, &'a ShaderResourceDecl>,
    samplers: HashMap<u32, &'a ShaderResourceDecl>,
    constant_blocks: HashMap<u32, &'a ConstantBlockDecl>,
    interfaces: &'a [String],
}

impl<'a> ReflectionIndex<'a> {
    pub fn new(reflection: Option<&'a ShaderReflection>) -> Self {
        let Some(reflection) = reflection else {
            return Self::default();
        };

        let mut index = Self {
            interfaces: &reflection.interfaces,
            ..Self::default()
        };
        for decl in &reflection.resources {
            let map = match decl.kind {
                BindingKind::ResourceView => &mut index.resource_views,
                BindingKind::UnorderedAccess => &mut index.uavs,
                BindingKind::Sampler => &mut index.samplers,
            };
            map.entry(decl.bind_point).or_insert(decl);
        }
        for block in &reflection.constant_blocks {
            index.constant_blocks.entry(block.bind_point).or_insert(block);
        }
        index
    }

    pub fn resource_view(&self, bind_point: u32) -> Option<&'a ShaderResourceDecl> {
        self.resource_views.get(&bind_point).copied()
    }

    pub fn uav(&self, bind_point: u32) -> Option<&'a ShaderResourceDecl> {
        self.uavs.get(&bind_point).copied()
    }

    pub fn sampler(&self, bind_point: u32) -> Option<&'a ShaderResourceDecl> {
        self.samplers.get(&bind_point).copied()
    }

    pub fn constant_block(&self, bind_point: u32) -> Option<&'a ConstantBlockDecl> {
        self.constant_blocks.get(&bind_point).copied()
    }

    /// Interface name declared at `slot`.
    pub fn interface(&self, slot: usize) -> Option<&'a str> {
        self.interfaces.get(slot).map(String::as_str)
    }
}

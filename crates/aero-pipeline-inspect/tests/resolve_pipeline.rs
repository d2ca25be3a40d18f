use aero_pipeline_inspect::export::render_text_report;
use aero_pipeline_inspect::model::{
    BindingKind, BufferViewFlags, InputLayoutElement, LayoutBytecode, ResourceBinding,
    SamplerBinding, ShaderReflection, ShaderResourceDecl, SignatureElement,
    D3D11_APPEND_ALIGNED_ELEMENT,
};
use aero_pipeline_inspect::{
    resolve_pipeline, resolve_stage, BufferDescriptor, CompType, PipelineCapture,
    PipelineSnapshot, ResourceCatalog, ResourceFormat, ResourceId, ResolvedSlot, ShaderStage,
    ShaderStageKind, SlotDetail, SlotIndex, TextureDescriptor, TextureKind, VisibilityPolicy,
};
use pretty_assertions::assert_eq;

const FORWARD_PASS: &str = include_str!("fixtures/forward_pass.json");

const ALL_POLICIES: [VisibilityPolicy; 4] = [
    VisibilityPolicy::new(false, false),
    VisibilityPolicy::new(true, false),
    VisibilityPolicy::new(false, true),
    VisibilityPolicy::new(true, true),
];

fn forward_pass() -> PipelineCapture {
    PipelineCapture::from_json_str(FORWARD_PASS).expect("fixture should load")
}

fn labels(rows: &[ResolvedSlot]) -> Vec<&str> {
    rows.iter().map(|row| row.label.as_str()).collect()
}

fn every_slot(pipeline: &aero_pipeline_inspect::ResolvedPipeline) -> Vec<&ResolvedSlot> {
    let mut slots: Vec<&ResolvedSlot> = Vec::new();
    slots.extend(&pipeline.input_assembler.vertex_buffers);
    slots.extend(&pipeline.input_assembler.index_buffer);
    for stage in &pipeline.stages {
        slots.extend(&stage.resource_views);
        slots.extend(&stage.uavs);
        slots.extend(&stage.samplers);
        slots.extend(&stage.constant_buffers);
        slots.extend(&stage.class_instances);
    }
    slots.extend(&pipeline.stream_out);
    slots.extend(&pipeline.output_merger.targets);
    slots
}

#[test]
fn forward_pass_default_policy() {
    let capture = forward_pass();
    let pipeline = capture.resolve(VisibilityPolicy::default());

    let ia = &pipeline.input_assembler;
    assert_eq!(ia.bytecode_label, "MeshLayout (VSMain)");
    assert_eq!(ia.topology, "TriangleList");
    assert_eq!(ia.layout.len(), 2);
    assert_eq!(ia.layout[1].offset_label, "APPEND_ALIGNED (12)");
    assert_eq!(labels(&ia.vertex_buffers), vec!["0"]);
    assert_eq!(ia.vertex_buffers[0].name, "Mesh VB");

    let index = ia.index_buffer.as_ref().expect("index buffer row");
    assert_eq!(index.slot, SlotIndex::IndexBuffer);
    assert_eq!(index.name, "Mesh IB");
    assert_eq!(
        index.detail,
        SlotDetail::IndexBuffer {
            byte_width: 2,
            offset: 0
        }
    );

    let vs = pipeline.stage(ShaderStageKind::Vertex).unwrap();
    assert_eq!(vs.shader_label, "VSMain() - mesh.hlsl");
    assert_eq!(labels(&vs.constant_buffers), vec!["0: PerFrame"]);
    let SlotDetail::ConstantBuffer(cb) = &vs.constant_buffers[0].detail else {
        panic!("expected constant buffer detail");
    };
    assert_eq!(cb.range, "0 - 8");
    assert_eq!(cb.size_label, "2 Variables, 128 bytes");

    let ps = pipeline.stage(ShaderStageKind::Pixel).unwrap();
    assert_eq!(labels(&ps.resource_views), vec!["0: albedoTex", "2: lights"]);
    let albedo = &ps.resource_views[0];
    assert_eq!(albedo.name, "Brick Albedo");
    assert_eq!(albedo.type_name, "Texture 2D");
    assert_eq!(albedo.format, "R8G8B8A8_UNORM_SRGB");
    assert_eq!(albedo.dims.width, 1024);
    let lights = &ps.resource_views[1];
    assert_eq!(lights.type_name, "StructuredBuffer[16]");
    assert_eq!(lights.format, "struct Light");
    assert_eq!(lights.dims.width, 256);

    assert_eq!(labels(&ps.samplers), vec!["0: linearSampler"]);
    let SlotDetail::Sampler(sampler) = &ps.samplers[0].detail else {
        panic!("expected sampler detail");
    };
    assert_eq!(sampler.addressing, "UV: Wrap, W: Clamp");
    assert_eq!(sampler.filter, "Min&Mag: Linear, Mip: Point");
    assert_eq!(sampler.lod_range, "0 - FLT_MAX");

    let om = &pipeline.output_merger;
    assert_eq!(labels(&om.targets), vec!["0", "1: counters", "Depth"]);
    assert_eq!(om.targets[1].type_name, "RWStructuredBuffer[16] (Count: 7)");
    let depth = &om.targets[2];
    assert_eq!(depth.name, "Scene Depth");
    assert_eq!(depth.format, "D32_FLOAT");
    assert_eq!(
        depth.detail,
        SlotDetail::View {
            notes: vec!["Depth component is read-only".to_owned()]
        }
    );
    assert_eq!(om.blends.len(), 1);
    assert_eq!(om.blends[0].write_mask, "RGBA");

    let flow: Vec<_> = pipeline.stage_flow.entries().to_vec();
    assert_eq!(
        flow,
        vec![
            ("IA", true),
            ("VS", true),
            ("HS", false),
            ("DS", false),
            ("GS", false),
            ("RS", true),
            ("PS", true),
            ("OM", true),
            ("CS", false),
        ]
    );
}

#[test]
fn narrower_layout_element_is_a_single_mismatch() {
    let pipeline = forward_pass().resolve(VisibilityPolicy::default());
    assert!(pipeline.mismatch.has_mismatch());
    assert_eq!(
        pipeline.mismatch.lines,
        vec![
            "IA bytecode semantic 0 (POSITION0) is 3-wide, VS bytecode semantic 0 (POSITION0) is 4-wide"
                .to_owned()
        ]
    );
}

#[test]
fn show_disabled_adds_bound_unused_slots() {
    let capture = forward_pass();
    let hidden = capture.resolve(VisibilityPolicy::default());
    let shown = capture.resolve(VisibilityPolicy::new(true, false));

    let ps = shown.stage(ShaderStageKind::Pixel).unwrap();
    assert_eq!(
        labels(&ps.resource_views),
        vec!["0: albedoTex", "1", "2: lights"]
    );
    let extra = &ps.resource_views[1];
    assert!(extra.filled && !extra.used);
    assert_eq!(extra.name, "Unused Normal");

    let before = hidden.stage(ShaderStageKind::Pixel).unwrap();
    assert_eq!(before.resource_views.len() + 1, ps.resource_views.len());
}

#[test]
fn used_slots_survive_every_policy() {
    let capture = forward_pass();
    let baseline = capture.resolve(VisibilityPolicy::default());
    let used: Vec<String> = every_slot(&baseline)
        .into_iter()
        .filter(|row| row.used)
        .map(|row| row.label.clone())
        .collect();
    assert!(!used.is_empty());

    for policy in ALL_POLICIES {
        let pipeline = capture.resolve(policy);
        let shown: Vec<String> = every_slot(&pipeline)
            .into_iter()
            .filter(|row| row.used)
            .map(|row| row.label.clone())
            .collect();
        assert_eq!(shown, used, "policy {policy:?}");
    }
}

#[test]
fn filled_matches_bound_id() {
    let mut capture = forward_pass();
    capture.snapshot.pixel.resource_views.push(ResourceBinding::default());
    // Bound but not in the catalog.
    capture.snapshot.pixel.resource_views.push(ResourceBinding {
        resource: ResourceId(999),
        ..Default::default()
    });

    let pipeline = capture.resolve(VisibilityPolicy::new(true, true));
    for row in every_slot(&pipeline) {
        if row.name == "Empty" || row.name == "No Buffer Set" {
            assert!(!row.filled, "{row:?}");
        }
        if row.resource.is_some() {
            assert!(row.filled, "{row:?}");
        }
    }

    let ps = pipeline.stage(ShaderStageKind::Pixel).unwrap();
    let empty = &ps.resource_views[3];
    assert!(!empty.filled);
    assert_eq!(empty.name, "Empty");
    assert_eq!(empty.type_name, "Unknown");

    let dangling = &ps.resource_views[4];
    assert!(dangling.filled);
    assert_eq!(dangling.name, "Shader Resource ResourceId::999");
    assert_eq!(dangling.resource, None);
    assert_eq!(
        (dangling.dims.width, dangling.dims.height, dangling.dims.depth),
        (1, 1, 1)
    );
}

#[test]
fn resolution_is_repeatable() {
    let capture = forward_pass();
    for policy in ALL_POLICIES {
        let first = resolve_pipeline(&capture.snapshot, &capture.catalog, policy);
        let second = resolve_pipeline(&capture.snapshot, &capture.catalog, policy);
        assert_eq!(first, second);
        assert_eq!(render_text_report(&first), render_text_report(&second));
    }
    assert_eq!(capture, forward_pass());
}

#[test]
fn view_notes_describe_sub_ranges() {
    let catalog = ResourceCatalog {
        textures: vec![TextureDescriptor {
            id: ResourceId(1),
            name: "shadow cascades".into(),
            kind: TextureKind::Texture2DArray,
            width: 2048,
            height: 2048,
            depth: 1,
            array_size: 4,
            mips: 12,
            sample_count: 1,
            format: ResourceFormat::new("R32_TYPELESS", CompType::Typeless, 1, 4),
        }],
        buffers: vec![BufferDescriptor {
            id: ResourceId(2),
            name: "particles".into(),
            length: 4096,
            structure_stride: 0,
        }],
    };
    let stage = ShaderStage {
        shader: ResourceId(50),
        reflection: Some(ShaderReflection {
            resources: vec![
                ShaderResourceDecl {
                    name: "cascades".into(),
                    kind: BindingKind::ResourceView,
                    bind_point: 0,
                    is_texture: true,
                    ..Default::default()
                },
                ShaderResourceDecl {
                    name: "particleData".into(),
                    kind: BindingKind::ResourceView,
                    bind_point: 1,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }),
        resource_views: vec![
            ResourceBinding {
                resource: ResourceId(1),
                format: ResourceFormat::new("R32_FLOAT", CompType::Float, 1, 4),
                highest_mip: 2,
                num_mip_levels: 1,
                first_array_slice: 1,
                array_size: 2,
                ..Default::default()
            },
            ResourceBinding {
                resource: ResourceId(2),
                format: ResourceFormat::new("R32_TYPELESS", CompType::Typeless, 1, 4),
                flags: BufferViewFlags::RAW,
                first_element: 16,
                num_elements: 64,
                element_size: 4,
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let resolved = resolve_stage(
        ShaderStageKind::Pixel,
        &stage,
        &catalog,
        VisibilityPolicy::default(),
    );
    assert_eq!(
        resolved.resource_views[0].detail,
        SlotDetail::View {
            notes: vec![
                "The texture is format R32_TYPELESS, the view treats it as R32_FLOAT.".to_owned(),
                "The texture has 12 mips, the view covers mip 2.".to_owned(),
                "The texture has 4 array slices, the view covers slices 1-2.".to_owned(),
            ]
        }
    );
    assert_eq!(resolved.resource_views[1].type_name, "ByteAddressBuffer");
    assert_eq!(
        resolved.resource_views[1].detail,
        SlotDetail::View {
            notes: vec![
                "The view covers bytes 64-320 (64 elements).".to_owned(),
                "The buffer is 4096 bytes in length (1024 elements).".to_owned(),
            ]
        }
    );
}

#[test]
fn om_uavs_follow_show_empty() {
    let mut snapshot = PipelineSnapshot::default();
    snapshot.output_merger.uav_start_slot = 2;
    snapshot.output_merger.uavs = vec![
        ResourceBinding::default(),
        ResourceBinding {
            resource: ResourceId(3),
            ..Default::default()
        },
    ];
    snapshot.pixel.shader = ResourceId(9);
    snapshot.pixel.reflection = Some(ShaderReflection {
        resources: vec![ShaderResourceDecl {
            name: "histogram".into(),
            kind: BindingKind::UnorderedAccess,
            bind_point: 3,
            ..Default::default()
        }],
        ..Default::default()
    });
    let catalog = ResourceCatalog::default();

    let pipeline = resolve_pipeline(&snapshot, &catalog, VisibilityPolicy::default());
    assert_eq!(labels(&pipeline.output_merger.targets), vec!["3: histogram"]);

    let pipeline = resolve_pipeline(&snapshot, &catalog, VisibilityPolicy::new(false, true));
    let targets = &pipeline.output_merger.targets;
    assert_eq!(labels(targets), vec!["2", "3: histogram", "Depth"]);
    assert_eq!(targets[0].slot, SlotIndex::Index(2));
    assert!(!targets[0].filled && !targets[0].used);
    assert_eq!(targets[0].name, "Empty");
    assert_eq!(targets[1].slot, SlotIndex::Index(3));
    assert_eq!(targets[1].name, "UAV ResourceId::3");
    assert!(!targets[2].filled);
}

#[test]
fn stages_without_reflection_report_unused_slots() {
    let stage = ShaderStage {
        shader: ResourceId(7),
        resource_views: vec![ResourceBinding {
            resource: ResourceId(1),
            ..Default::default()
        }],
        samplers: vec![SamplerBinding {
            sampler: ResourceId(2),
            ..Default::default()
        }],
        ..Default::default()
    };
    let catalog = ResourceCatalog::default();

    let hidden = resolve_stage(
        ShaderStageKind::Geometry,
        &stage,
        &catalog,
        VisibilityPolicy::default(),
    );
    assert!(hidden.resource_views.is_empty());
    assert!(hidden.samplers.is_empty());

    let shown = resolve_stage(
        ShaderStageKind::Geometry,
        &stage,
        &catalog,
        VisibilityPolicy::new(true, false),
    );
    assert_eq!(shown.shader_label, "Shader ResourceId::7");
    assert!(shown.resource_views.iter().all(|row| !row.used));
    assert_eq!(shown.samplers[0].name, "Sampler ResourceId::2");
}

#[test]
fn layout_without_bytecode_counts_every_element_used() {
    let float3 = ResourceFormat::new("R32G32B32_FLOAT", CompType::Float, 3, 4);
    let mut snapshot = PipelineSnapshot::default();
    snapshot.input_assembler.layout = vec![
        InputLayoutElement {
            semantic_name: "POSITION".into(),
            format: float3.clone(),
            ..Default::default()
        },
        InputLayoutElement {
            semantic_name: "NORMAL".into(),
            format: float3,
            byte_offset: D3D11_APPEND_ALIGNED_ELEMENT,
            input_slot: 1,
            ..Default::default()
        },
    ];

    let pipeline = resolve_pipeline(
        &snapshot,
        &ResourceCatalog::default(),
        VisibilityPolicy::default(),
    );
    assert_eq!(pipeline.input_assembler.bytecode_label, "None");
    assert!(pipeline.input_assembler.layout.iter().all(|e| e.used));
    assert_eq!(pipeline.input_assembler.layout[1].offset_label, "APPEND_ALIGNED (0)");
    assert!(!pipeline.mismatch.has_mismatch());

    snapshot.input_assembler.bytecode = Some(LayoutBytecode {
        entry_point: "main".into(),
        input_signature: vec![SignatureElement {
            semantic_name: "position".into(),
            semantic_index: 0,
            comp_count: 3,
            comp_type: CompType::Float,
            system_value: false,
        }],
    });
    let pipeline = resolve_pipeline(
        &snapshot,
        &ResourceCatalog::default(),
        VisibilityPolicy::new(true, false),
    );
    let used: Vec<_> = pipeline
        .input_assembler
        .layout
        .iter()
        .map(|e| (e.semantic_name.as_str(), e.used))
        .collect();
    assert_eq!(used, vec![("POSITION", true), ("NORMAL", false)]);

    let pipeline = resolve_pipeline(
        &snapshot,
        &ResourceCatalog::default(),
        VisibilityPolicy::default(),
    );
    assert_eq!(pipeline.input_assembler.layout.len(), 1);
}

#[test]
fn text_report_covers_every_section() {
    let pipeline = forward_pass().resolve(VisibilityPolicy::default());
    let text = render_text_report(&pipeline);

    assert!(text.starts_with("pipeline-report v1\n"));
    assert!(text.contains("stages: IA VS (HS) (DS) (GS) RS PS OM (CS)"));
    assert!(text.contains("  bytecode: MeshLayout (VSMain)"));
    assert!(text.contains(
        "  Warning: Mismatch detected between bytecode used to create IA and currently bound VS inputs"
    ));
    assert!(text.contains("APPEND_ALIGNED (12)"));
    assert!(text.contains("VS: VSMain() - mesh.hlsl"));
    assert!(text.contains("PS: PSMain() - mesh.hlsl"));
    assert!(text.contains("2 Variables, 128 bytes"));
    assert!(text.contains("UV: Wrap, W: Clamp"));
    assert!(text.contains("RWStructuredBuffer[16] (Count: 7)"));
    assert!(text.contains("Depth: Depth component is read-only"));
    assert!(text.contains("stream out:\n  <none>\n"));
    assert!(!text.contains("Unused Normal"));
}

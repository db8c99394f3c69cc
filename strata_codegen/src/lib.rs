pub mod asset;
pub mod error;
pub mod generator;
pub mod hooks;
pub mod level;
pub mod model;
pub mod names;
pub mod node;
pub mod resources;
pub mod script;

pub use asset::{CURVE_SUB_RESOURCE_ID, curve_script_path};
pub use error::GenerateError;
pub use generator::SceneGenerator;
pub use hooks::*;
pub use level::Stage;
pub use model::*;
pub use names::{resolve_names, resolve_references, unique_names};
pub use node::{EmittedNode, is_path_container, node_type_for};
pub use resources::{ExtResource, ResourceRegistry, resource_type_for};
pub use script::SCRIPT_BOILERPLATE;

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use serde_json::json;
    use strata_io::{FileSystem, MemoryFs};
    use strata_project::ConverterConfig;
    use strata_props::{Property, PropertyMap};

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> ConverterConfig {
        ConverterConfig {
            authoring_root: PathBuf::from("/work/authoring"),
            project_root: PathBuf::from("/work/game"),
            output_dir: PathBuf::from("/work/game/levels"),
            ..ConverterConfig::default_for_name("Test")
        }
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::new()
            .with_asset("crate", "/work/authoring/models/crate.glb")
            .with_asset("door_script", "/work/authoring/scripts/door.gd")
            .with_asset("path_curve", "/work/authoring/curves/path_curve.tres")
            .with_asset("splash", "/work/authoring/audio/splash.ogg")
    }

    fn props(items: Vec<Property>) -> PropertyMap {
        items
            .into_iter()
            .map(|p| (p.id().to_string(), p))
            .collect()
    }

    fn forest() -> Level {
        let mut first = LevelInstance::new("c1", "", "Crate");
        first.properties = props(vec![Property::from_declared(
            "Pos",
            "vector3",
            &Default::default(),
        )
        .with_value(&json!([1, 2, 3]))]);
        first.references = vec!["crate".to_string()];

        let mut second = LevelInstance::new("c2", "", "Crate");
        second.properties = props(vec![Property::bool("Flag", true)]);
        second.references = vec!["crate".to_string()];

        let mut door = LevelInstance::new("d1", "Door", "Door");
        door.properties = props(vec![
            Property::reference("Target", "reference", "c1"),
            Property::from_declared("Links", "reference[]", &Default::default())
                .with_value(&json!(["c2", "ghost"])),
        ]);
        door.references = vec!["door_script".to_string()];

        Level {
            name: "Forest".to_string(),
            logical_id: "lvl_1".to_string(),
            layers: vec![Layer {
                name: "Props".to_string(),
                instances: vec![first, second, door],
            }],
        }
    }

    fn generator() -> SceneGenerator {
        SceneGenerator::new(HookTable::standard(&["crate", "door"]), config())
    }

    const FOREST_TSCN: &str = r#"[gd_scene load_steps=3 format=3]
[ext_resource path="../models/crate.glb" type="PackedScene" id="1"]
[ext_resource path="../scripts/door.gd" type="Script" id="2"]


[node name="Forest" type="Node3D"]
id = "lvl_1"

[node name="Props" type="Node3D" parent="."]

[node name="Crate" parent="Props" instance=ExtResource("1")]
Pos = Vector3(1, 2, 3)
id = "c1"

[node name="Crate_0" parent="Props" instance=ExtResource("1")]
Flag = true
id = "c2"

[node name="Door" type="Node3D" parent="Props" node_paths=PackedStringArray("Target", "Links")]
script = ExtResource("2")
Target = NodePath("../Crate")
Links = [NodePath("../Crate_0"), NodePath("ghost")]
id = "d1"
"#;

    // -------------------- Levels --------------------

    #[test]
    fn level_document_matches_expected_layout() {
        init_logger();
        let mut level = forest();
        let text = generator().generate_level(&mut level, &catalog(), Path::new("/work/game/levels/forest.tscn"));
        assert_eq!(text, FOREST_TSCN);
    }

    #[test]
    fn generating_twice_is_byte_identical() {
        let generator = generator();
        let output = Path::new("/work/game/levels/forest.tscn");

        let mut level = forest();
        let first = generator.generate_level(&mut level, &catalog(), output);
        let second = generator.generate_level(&mut level, &catalog(), output);
        let fresh = generator.generate_level(&mut forest(), &catalog(), output);
        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn resolved_names_are_written_back() {
        let mut level = forest();
        generator().generate_level(&mut level, &catalog(), Path::new("/work/game/levels/forest.tscn"));
        let names: Vec<&str> = level.layers[0]
            .instances
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Crate", "Crate_0", "Door"]);
    }

    #[test]
    fn missing_hooks_degrade_without_failing() {
        init_logger();
        let generator = SceneGenerator::from_config(&config());
        let mut level = forest();
        let text = generator.generate_level(&mut level, &catalog(), Path::new("/work/game/levels/forest.tscn"));

        assert!(text.starts_with("[gd_scene load_steps=1 format=3]\n"));
        assert!(!text.contains("ext_resource"));
        assert!(text.contains("[node name=\"Crate\" type=\"Node3D\" parent=\"Props\"]\nPos = Vector3(1, 2, 3)"));
        assert!(text.contains("id = \"d1\""));
    }

    #[test]
    fn pre_process_runs_before_rendering() {
        let hooks = HookTable::standard(&["crate"]).with_pre_process("Crate", |instance| {
            instance
                .properties
                .insert("Tag".to_string(), Property::string("Tag", "loot"));
        });
        let generator = SceneGenerator::new(hooks, config());
        let mut level = forest();
        let text = generator.generate_level(&mut level, &catalog(), Path::new("/work/game/levels/forest.tscn"));
        assert_eq!(text.matches("Tag = \"loot\"").count(), 2);
    }

    #[test]
    fn attached_script_wins_over_script_property() {
        init_logger();
        let mut level = forest();
        let door = &mut level.layers[0].instances[2];
        door.properties.insert(
            "script".to_string(),
            Property::raw("script", "ExtResource(\"9\")"),
        );
        let text = generator().generate_level(&mut level, &catalog(), Path::new("/work/game/levels/forest.tscn"));

        assert_eq!(text.matches("script = ").count(), 1);
        assert!(text.contains("script = ExtResource(\"2\")\nTarget = NodePath(\"../Crate\")"));
        assert!(!text.contains("ExtResource(\"9\")"));
    }

    #[test]
    fn script_property_renders_first() {
        let properties = props(vec![
            Property::float("Speed", 2.0),
            Property::bool("Open", false),
            Property::raw("script", "ExtResource(\"4\")"),
        ]);
        assert_eq!(
            node::property_lines(&properties, "Door", false),
            vec!["script = ExtResource(\"4\")", "Speed = 2", "Open = false"]
        );
        assert_eq!(
            node::property_lines(&properties, "Door", true),
            vec!["Speed = 2", "Open = false"]
        );
    }

    #[test]
    fn path_container_level_root_uses_path_type() {
        let mut level = Level {
            name: "River".to_string(),
            ..Level::default()
        };
        let text = generator().generate_level(&mut level, &catalog(), Path::new("levels/river.tscn"));
        assert_eq!(
            text,
            "[gd_scene load_steps=1 format=3]\n\n\n[node name=\"River\" type=\"Path3D\"]\n"
        );
    }

    #[test]
    fn stages_walk_layers_then_instances() {
        let level = forest();
        let mut stage = Stage::NotStarted;
        let mut seen = vec![stage];
        while stage != Stage::Done {
            stage = stage.next(&level);
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::NotStarted,
                Stage::EmitResources,
                Stage::EmitRoot,
                Stage::EmitLayer(0),
                Stage::EmitInstance { layer: 0, instance: 0 },
                Stage::EmitInstance { layer: 0, instance: 1 },
                Stage::EmitInstance { layer: 0, instance: 2 },
                Stage::Done,
            ]
        );
    }

    // -------------------- Names & references --------------------

    #[test]
    fn empty_names_of_same_type_get_suffixes() {
        let mut instances = vec![
            LevelInstance::new("a", "", "Barrel"),
            LevelInstance::new("b", "", "Barrel"),
        ];
        resolve_names(&mut instances);
        assert_eq!(instances[0].name, "Barrel");
        assert_eq!(instances[1].name, "Barrel_0");
    }

    #[test]
    fn originally_unique_names_never_change() {
        let bases: Vec<String> = ["Tree", "Tree", "Tree_0", "Rock"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(unique_names(&bases), vec!["Tree", "Tree_1", "Tree_0", "Rock"]);
    }

    #[test]
    fn reference_array_rewrites_only_known_ids() {
        let mut door = LevelInstance::new("d1", "Door", "Door");
        door.properties = props(vec![
            Property::from_declared("Links", "reference[]", &Default::default())
                .with_value(&json!(["lamp_7", "nowhere"])),
        ]);
        let mut instances = vec![LevelInstance::new("lamp_7", "Lamp", "Lamp"), door];
        resolve_references(&mut instances);

        assert_eq!(
            instances[1].properties["Links"].value(),
            json!(["../Lamp", "nowhere"])
        );
    }

    // -------------------- Resources --------------------

    #[test]
    fn resource_ids_are_contiguous_and_deduplicated() {
        let mut registry = ResourceRegistry::new(
            Path::new("/work/authoring"),
            Path::new("/work/game"),
            Path::new("/work/game/levels/forest"),
        );
        let a = registry.register(Path::new("/work/authoring/models/crate.glb"));
        let b = registry.register(Path::new("/work/authoring/audio/splash.ogg"));
        let again = registry.register(Path::new("/work/authoring/models/../models/crate.glb"));

        assert_eq!((a, b, again), (1, 2, 1));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.render_lines(),
            vec![
                "[ext_resource path=\"../../models/crate.glb\" type=\"PackedScene\" id=\"1\"]",
                "[ext_resource path=\"../../audio/splash.ogg\" type=\"AudioStream\" id=\"2\"]",
            ]
        );
    }

    #[test]
    fn unknown_extension_is_a_plain_resource() {
        init_logger();
        assert_eq!(resource_type_for(Path::new("data/level.bin")), "Resource");
        assert_eq!(resource_type_for(Path::new("a/B.GLB")), "PackedScene");
    }

    // -------------------- Single assets --------------------

    fn rail() -> AssetDefinition {
        AssetDefinition {
            name: "Rail".to_string(),
            type_name: "Track".to_string(),
            properties: props(vec![Property::float("Speed", 2.5)]),
            script: Some(PathBuf::from("/work/authoring/scripts/rail.gd")),
            models: vec!["crate".to_string(), "splash".to_string(), "missing".to_string()],
        }
    }

    #[test]
    fn path_asset_embeds_curve_sub_resource() {
        init_logger();
        let text = generator()
            .generate_asset(&rail(), &catalog(), Path::new("/work/game/assets/rail.tscn"))
            .unwrap();
        let expected = r#"[gd_scene load_steps=4 format=3]
[ext_resource path="../scripts/rail.gd" type="Script" id="1"]
[ext_resource path="../scripts/path_curve.gd" type="Script" id="2"]
[ext_resource path="../models/crate.glb" type="PackedScene" id="3"]

[sub_resource type="Curve3D" id="Curve3D_1"]
script = ExtResource("2")


[node name="Rail" type="Path3D"]
script = ExtResource("1")
curve = SubResource("Curve3D_1")
Speed = 2.5

[node name="crate" parent="." instance=ExtResource("3")]
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn asset_script_replaces_script_property() {
        let mut asset = rail();
        asset.properties.insert(
            "script".to_string(),
            Property::raw("script", "ExtResource(\"9\")"),
        );
        let text = generator()
            .generate_asset(&asset, &catalog(), Path::new("/work/game/assets/rail.tscn"))
            .unwrap();
        assert!(text.contains(
            "[node name=\"Rail\" type=\"Path3D\"]\nscript = ExtResource(\"1\")\ncurve = SubResource(\"Curve3D_1\")\nSpeed = 2.5\n"
        ));
        assert!(!text.contains("ExtResource(\"9\")"));
    }

    #[test]
    fn missing_curve_asset_is_an_error() {
        let catalog = AssetCatalog::new().with_asset("crate", "/work/authoring/models/crate.glb");
        let err = generator()
            .generate_asset(&rail(), &catalog, Path::new("/work/game/assets/rail.tscn"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingCurveAsset(ref key) if key == "path_curve"));
    }

    #[test]
    fn curve_script_swaps_directory_and_extension() {
        assert_eq!(
            curve_script_path(Path::new("/work/authoring/curves/path_curve.tres")),
            PathBuf::from("/work/authoring/scripts/path_curve.gd")
        );
    }

    #[test]
    fn plain_asset_has_no_sub_resources() {
        let asset = AssetDefinition {
            name: "Barrel".to_string(),
            type_name: "Prop".to_string(),
            ..AssetDefinition::default()
        };
        let text = generator()
            .generate_asset(&asset, &AssetCatalog::new(), Path::new("/work/game/assets/barrel.tscn"))
            .unwrap();
        assert_eq!(
            text,
            "[gd_scene load_steps=1 format=3]\n\n\n\n[node name=\"Barrel\" type=\"Node3D\"]\n"
        );
    }

    // -------------------- Scripts --------------------

    #[test]
    fn companion_script_skips_denied_properties() {
        let asset = AssetDefinition {
            name: "crate_box".to_string(),
            type_name: "Prop".to_string(),
            properties: props(vec![
                Property::string("name", "ignored"),
                Property::int("Health", 3.0),
                Property::reference("Target", "reference", ""),
            ]),
            ..AssetDefinition::default()
        };
        let script = generator().generate_script(&asset);
        let expected = format!(
            "@tool\nclass_name CrateBox\nextends Node3D\n\n@export var Health: int = 3\n# @export var Target: Node\n\n\n{SCRIPT_BOILERPLATE}"
        );
        assert_eq!(script, expected);
    }

    // -------------------- Output --------------------

    #[test]
    fn write_level_goes_through_filesystem() {
        let fs = MemoryFs::new();
        let output = Path::new("/work/game/levels/forest.tscn");
        generator()
            .write_level(&fs, &mut forest(), &catalog(), output)
            .unwrap();
        assert_eq!(fs.read_to_string(output).unwrap(), FOREST_TSCN);
    }

    #[test]
    fn write_asset_and_script_go_through_filesystem() {
        let fs = MemoryFs::new();
        let generator = generator();
        let scene = Path::new("/work/game/assets/rail.tscn");
        let script = Path::new("/work/game/scripts/rail.gd");

        generator.write_asset(&fs, &rail(), &catalog(), scene).unwrap();
        generator.write_script(&fs, &rail(), script).unwrap();

        let expected_scene = generator
            .generate_asset(&rail(), &catalog(), scene)
            .unwrap();
        assert_eq!(fs.read_to_string(scene).unwrap(), expected_scene);
        assert_eq!(fs.read_to_string(script).unwrap(), generator.generate_script(&rail()));
        assert!(fs.exists(script));
    }

    #[test]
    fn write_asset_without_curve_writes_nothing() {
        let fs = MemoryFs::new();
        let scene = Path::new("/work/game/assets/rail.tscn");
        let err = generator()
            .write_asset(&fs, &rail(), &AssetCatalog::new(), scene)
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingCurveAsset(_)));
        assert!(!fs.exists(scene));
    }
}

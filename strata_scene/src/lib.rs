pub mod error;
pub mod instance;
mod matchers;
pub mod parser;

pub use error::*;
pub use instance::*;
pub use parser::*;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use serde_json::json;
    use strata_io::MemoryFs;
    use strata_props::{Property, PropertyMap};

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const LEVEL: &str = r#"[gd_scene load_steps=3 format=3]

[ext_resource path="../models/crate.glb" type="PackedScene" id="1"]
[ext_resource path="../scripts/door.gd" type="Script" id="2"]

[node name="Forest" type="Node3D"]

[node name="Crate" parent="." node_paths=PackedStringArray("Target") instance=ExtResource("1")]
Pos = Vector3(1, 2, 3)
Flag = true
Mode = 2
Target = NodePath("../Door")
Sizes = [1, 2.5, 3]
metadata/_edit_lock_ = true
id = "crate_01"
"#;

    #[test]
    fn parse_groups_instances_by_header_type() {
        init_logger();
        let index = parse_scene(LEVEL, "forest.tscn").unwrap();

        let types: Vec<&str> = index.keys().map(String::as_str).collect();
        assert_eq!(types, vec!["gd_scene", "ext_resource", "node"]);
        assert_eq!(index["ext_resource"].len(), 2);

        let nodes = &index["node"];
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name(), Some("Forest"));
        assert_eq!(nodes[1].name(), Some("Crate"));
        assert_eq!(nodes[1].get_str("id"), Some("crate_01"));
    }

    #[test]
    fn header_attributes_use_the_full_cascade() {
        let index = parse_scene(LEVEL, "forest.tscn").unwrap();

        let header = &index["gd_scene"][0];
        assert_eq!(header.get("load_steps"), Some(&SceneValue::EnumIndex(3)));

        let crate_node = &index["node"][1];
        let instance = crate_node.get("instance").and_then(SceneValue::as_complex).unwrap();
        assert_eq!(instance.ty, "ExtResource");
        assert_eq!(instance.params, vec![SceneValue::Str("1".to_string())]);
    }

    #[test]
    fn continuation_lines_fill_the_open_instance() {
        let index = parse_scene(LEVEL, "forest.tscn").unwrap();
        let crate_node = &index["node"][1];

        let pos = crate_node.get("Pos").and_then(SceneValue::as_complex).unwrap();
        assert_eq!(pos.ty, "Vector3");
        assert_eq!(
            pos.params,
            vec![
                SceneValue::Number(1.0),
                SceneValue::Number(2.0),
                SceneValue::Number(3.0),
            ]
        );
        assert_eq!(crate_node.get("Flag"), Some(&SceneValue::Bool(true)));
        assert_eq!(crate_node.get("Mode"), Some(&SceneValue::EnumIndex(2)));
        assert!(
            crate_node
                .attributes
                .keys()
                .all(|key| !key.starts_with("metadata"))
        );
    }

    #[test]
    fn several_entries_on_one_header_line() {
        let index = parse_scene(r#"[node name="A" type="Node3D" visible=false scale=-1.5]"#, "a.tscn").unwrap();
        let node = &index["node"][0];
        assert_eq!(node.get_str("type"), Some("Node3D"));
        assert_eq!(node.get("visible"), Some(&SceneValue::Bool(false)));
        assert_eq!(node.get_f64("scale"), Some(-1.5));
    }

    #[test]
    fn multi_line_struct_folds_onto_instance() {
        let src = r#"[sub_resource type="Curve3D" id="Curve3D_1"]
_data {
    points = PackedVector3Array(0, 0, 0, 1, 0, 0),
    tilts = [0, 0],
}
point_count = 2
"#;
        let index = parse_scene(src, "path.tscn").unwrap();
        let curve = &index["sub_resource"][0];

        let Some(SceneValue::Struct(data)) = curve.get("_data") else {
            panic!("expected `_data` struct");
        };
        assert_eq!(data.name, "_data");
        let keys: Vec<&str> = data.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["points", "tilts"]);
        assert_eq!(
            data.fields["tilts"],
            SceneValue::Array(vec![SceneValue::Number(0.0), SceneValue::Number(0.0)])
        );
        assert_eq!(curve.get("point_count"), Some(&SceneValue::EnumIndex(2)));
    }

    #[test]
    fn single_line_struct_with_quoted_keys() {
        let index = parse_scene("[resource]\nlimits = { \"low\": -1, \"high\": 4 }\n", "r.tres").unwrap();
        let Some(SceneValue::Struct(limits)) = index["resource"][0].get("limits") else {
            panic!("expected `limits` struct");
        };
        assert_eq!(limits.fields["low"], SceneValue::Number(-1.0));
        assert_eq!(limits.fields["high"], SceneValue::EnumIndex(4));
    }

    // -------------------- Failures --------------------

    #[test]
    fn attribute_before_any_header_fails_on_its_line() {
        init_logger();
        let err = parse_scene("\nFlag = true\n[node name=\"A\"]\n", "broken.tscn").unwrap_err();
        assert!(matches!(err, ParseError::OrphanAttribute { .. }));
        assert_eq!(err.line(), 2);
        assert_eq!(err.file(), "broken.tscn");
        assert_eq!(err.to_string(), "broken.tscn:2: attribute line has no preceding header");
    }

    #[test]
    fn unrecognized_value_fails_the_whole_file() {
        let err = parse_scene("[node name=\"A\"]\nPos = @@@\n", "bad.tscn").unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, ParseError::Unrecognized { ref text, .. } if text == "Pos = @@@"));
    }

    #[test]
    fn unclosed_struct_reports_its_opening_line() {
        let err = parse_scene("[resource]\n\n_data {\n  a = 1,\n", "open.tres").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnclosedStruct {
                file: "open.tres".to_string(),
                line: 3,
                name: "_data".to_string(),
            }
        );
    }

    // -------------------- Bridges --------------------

    #[test]
    fn float_array_round_trips_through_properties() {
        let index = parse_scene(LEVEL, "forest.tscn").unwrap();
        let crate_node = &index["node"][1];

        let custom = HashSet::new();
        let mut properties = PropertyMap::new();
        for (id, declared) in [("Sizes", "float[]"), ("Pos", "vector3"), ("Flag", "bool")] {
            properties.insert(id.to_string(), Property::from_declared(id, declared, &custom));
        }

        assert_eq!(crate_node.apply_to(&mut properties), 3);
        assert_eq!(properties["Sizes"].render_assignment(), "Sizes = [1, 2.5, 3]");
        assert_eq!(properties["Pos"].render_assignment(), "Pos = Vector3(1, 2, 3)");
        assert_eq!(properties["Flag"].render_assignment(), "Flag = true");
    }

    #[test]
    fn rendered_assignments_parse_back() {
        init_logger();
        let custom = HashSet::new();
        let properties = vec![
            Property::from_declared("R", "raw", &custom),
            Property::float("Inf", f64::INFINITY),
            Property::float("NegInf", f64::NEG_INFINITY),
            Property::float("Nan", f64::NAN),
            Property::float("Huge", 1e300),
            Property::float("Tiny", 2.5e-7),
            Property::from_declared("Pos", "vector3", &custom),
            Property::from_declared("Label", "string", &custom).with_value(&json!("a \"b\"")),
            Property::from_declared("Targets", "reference[]", &custom).with_value(&json!(["x"])),
            Property::selection("Mode", vec!["A".to_string()], "missing"),
        ];

        for property in &properties {
            let doc = format!("[node name=\"A\"]\n{}\n", property.render_assignment());
            let index = parse_scene(&doc, "rendered.tscn")
                .unwrap_or_else(|err| panic!("`{}` did not parse: {err}", property.render_assignment()));
            assert!(index["node"][0].get(property.id()).is_some());
        }

        let doc: String = std::iter::once("[node name=\"A\"]".to_string())
            .chain(properties.iter().map(Property::render_assignment))
            .collect::<Vec<_>>()
            .join("\n");
        let node = &parse_scene(&doc, "rendered.tscn").unwrap()["node"][0];
        assert_eq!(node.get("R"), Some(&SceneValue::Null));
        assert_eq!(node.get_f64("Inf"), Some(f64::INFINITY));
        assert_eq!(node.get_f64("NegInf"), Some(f64::NEG_INFINITY));
        assert!(node.get_f64("Nan").is_some_and(f64::is_nan));
        assert_eq!(node.get_f64("Huge"), Some(1e300));
        assert_eq!(node.get_f64("Tiny"), Some(2.5e-7));
        assert_eq!(node.get_str("Label"), Some("a \"b\""));
    }

    #[test]
    fn enum_index_selects_by_position() {
        let index = parse_scene(LEVEL, "forest.tscn").unwrap();
        let mut mode = Property::selection(
            "Mode",
            vec!["Off".to_string(), "On".to_string(), "Auto".to_string()],
            "Off",
        );
        mode.set_value(&index["node"][1].get("Mode").unwrap().to_json());
        assert_eq!(mode.value(), json!("Auto"));
        assert_eq!(mode.render_value(), "2");
    }

    #[test]
    fn transform_constructor_becomes_basis_object() {
        let index = parse_scene(
            "[node name=\"A\"]\ntransform = Transform3D(1, 0, 0, 0, 1, 0, 0, 0, 1, 4, 5, 6)\n",
            "t.tscn",
        )
        .unwrap();
        let json = index["node"][0].get("transform").unwrap().to_json();
        assert_eq!(json["position"], json!([4, 5, 6]));
        assert_eq!(json["basis_y"], json!([0, 1, 0]));
    }

    #[test]
    fn load_scene_reads_through_filesystem() {
        let fs = MemoryFs::new().with_file("levels/forest.tscn", LEVEL);
        let index = load_scene(&fs, Path::new("levels/forest.tscn")).unwrap();
        assert_eq!(index["node"].len(), 2);

        let err = load_scene(&fs, Path::new("levels/missing.tscn")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}

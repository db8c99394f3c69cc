use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::GenerateError;
use crate::generator::SceneGenerator;
use crate::model::{AssetCatalog, AssetDefinition};
use crate::names::unique_names;
use crate::node::{
    DEFAULT_NODE_TYPE, EmittedNode, PATH_NODE_TYPE, is_path_container, node_path_names,
    property_lines,
};
use crate::resources::{ResourceRegistry, resource_type_for};

pub const CURVE_SUB_RESOURCE_ID: &str = "Curve3D_1";

/// Companion script of a curve asset: its `curves` directory becomes
/// `scripts` and the extension `.gd`.
pub fn curve_script_path(curve_path: &Path) -> PathBuf {
    let mut out: PathBuf = curve_path
        .components()
        .map(|component| match component {
            Component::Normal(part) if part == OsStr::new("curves") => OsStr::new("scripts"),
            other => other.as_os_str(),
        })
        .collect();
    out.set_extension("gd");
    out
}

pub(crate) fn asset_node_type(asset: &AssetDefinition) -> &'static str {
    if is_path_container(&asset.name) || is_path_container(&asset.type_name) {
        PATH_NODE_TYPE
    } else {
        DEFAULT_NODE_TYPE
    }
}

impl SceneGenerator {
    /// Renders one asset as its own scene: the root node carries the asset's
    /// script and properties, each model becomes an instanced child.
    ///
    /// Path containers also get a `Curve3D` sub-resource; that needs the
    /// configured curve asset in `assets`, and its absence is the only error.
    pub fn generate_asset(
        &self,
        asset: &AssetDefinition,
        assets: &AssetCatalog,
        output_path: &Path,
    ) -> Result<String, GenerateError> {
        let mut resources = self.resource_registry(output_path);
        let node_type = asset_node_type(asset);

        let mut root = EmittedNode {
            type_name: Some(node_type.to_string()),
            node_paths: node_path_names(&asset.properties),
            ..EmittedNode::new(&asset.name)
        };

        if let Some(script) = &asset.script {
            let id = resources.register(script);
            root.lines.push(format!("script = ExtResource(\"{id}\")"));
        }

        let mut sub_resources = Vec::new();
        if node_type == PATH_NODE_TYPE {
            sub_resources = self.curve_sub_resource(assets, &mut resources)?;
            root.lines
                .push(format!("curve = SubResource(\"{CURVE_SUB_RESOURCE_ID}\")"));
        }
        root.lines.extend(property_lines(
            &asset.properties,
            &asset.name,
            asset.script.is_some(),
        ));

        let mut nodes = vec![root];
        nodes.extend(model_nodes(asset, assets, &mut resources));

        let mut lines = vec![self.scene_header(resources.len())];
        lines.extend(resources.render_lines());
        lines.push(String::new());
        lines.extend(sub_resources);
        lines.push(String::new());
        for node in &nodes {
            lines.push(String::new());
            lines.extend(node.render());
        }
        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn curve_sub_resource(
        &self,
        assets: &AssetCatalog,
        resources: &mut ResourceRegistry,
    ) -> Result<Vec<String>, GenerateError> {
        let key = &self.config().curve_asset;
        let curve_path = assets
            .get(key)
            .ok_or_else(|| GenerateError::MissingCurveAsset(key.clone()))?;
        let id = resources.register_as(&curve_script_path(curve_path), "Script");
        Ok(vec![
            format!("[sub_resource type=\"Curve3D\" id=\"{CURVE_SUB_RESOURCE_ID}\"]"),
            format!("script = ExtResource(\"{id}\")"),
        ])
    }
}

fn model_nodes(
    asset: &AssetDefinition,
    assets: &AssetCatalog,
    resources: &mut ResourceRegistry,
) -> Vec<EmittedNode> {
    let mut found = Vec::new();
    for model in &asset.models {
        let Some(path) = assets.get(model) else {
            log::warn!("asset `{}` references unknown model `{model}`", asset.name);
            continue;
        };
        let ty = resource_type_for(path);
        if !matches!(ty, "PackedScene" | "Mesh") {
            log::warn!(
                "asset `{}`: model `{model}` is a {ty}, not a scene; skipping",
                asset.name
            );
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| model.clone());
        found.push((stem, resources.register(path)));
    }

    let bases: Vec<String> = found.iter().map(|(stem, _)| stem.clone()).collect();
    unique_names(&bases)
        .into_iter()
        .zip(found)
        .map(|(name, (_, id))| EmittedNode {
            parent: Some(".".to_string()),
            instance_clause: Some(format!("instance=ExtResource(\"{id}\")")),
            ..EmittedNode::new(name)
        })
        .collect()
}

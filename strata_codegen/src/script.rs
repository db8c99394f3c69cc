use strata_props::format::to_pascal_case;

use crate::asset::asset_node_type;
use crate::generator::SceneGenerator;
use crate::model::AssetDefinition;

/// Appended verbatim to every companion script.
pub const SCRIPT_BOILERPLATE: &str = "func _ready() -> void:
\tif Engine.is_editor_hint():
\t\treturn
\tset_notify_transform(true)


func _get_configuration_warnings() -> PackedStringArray:
\treturn PackedStringArray()
";

impl SceneGenerator {
    /// Tool-mode script exposing the asset's properties to the editor.
    /// Properties on the configured deny list are left out.
    pub fn generate_script(&self, asset: &AssetDefinition) -> String {
        let mut out = String::new();
        out.push_str("@tool\n");
        out.push_str(&format!("class_name {}\n", to_pascal_case(&asset.name)));
        out.push_str(&format!("extends {}\n\n", asset_node_type(asset)));

        for property in asset.properties.values() {
            if self.config().is_denied_script_property(property.id()) {
                continue;
            }
            out.push_str(&property.render_export());
            out.push('\n');
        }

        out.push_str("\n\n");
        out.push_str(SCRIPT_BOILERPLATE);
        out
    }
}

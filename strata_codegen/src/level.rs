use std::path::Path;

use crate::generator::SceneGenerator;
use crate::hooks::NodeAttachments;
use crate::model::{AssetCatalog, Layer, Level, LevelInstance};
use crate::names::{resolve_names, resolve_references, unique_names};
use crate::node::{
    DEFAULT_NODE_TYPE, EmittedNode, attaches_script, node_path_names, node_type_for, property_lines,
};

/// Progress through one level document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    EmitResources,
    EmitRoot,
    EmitLayer(usize),
    EmitInstance { layer: usize, instance: usize },
    Done,
}

impl Stage {
    pub fn next(self, level: &Level) -> Stage {
        let layer_or_done = |layer: usize| {
            if layer < level.layers.len() {
                Stage::EmitLayer(layer)
            } else {
                Stage::Done
            }
        };

        match self {
            Stage::NotStarted => Stage::EmitResources,
            Stage::EmitResources => Stage::EmitRoot,
            Stage::EmitRoot => layer_or_done(0),
            Stage::EmitLayer(layer) => {
                if level.layers[layer].instances.is_empty() {
                    layer_or_done(layer + 1)
                } else {
                    Stage::EmitInstance { layer, instance: 0 }
                }
            }
            Stage::EmitInstance { layer, instance } => {
                if instance + 1 < level.layers[layer].instances.len() {
                    Stage::EmitInstance {
                        layer,
                        instance: instance + 1,
                    }
                } else {
                    layer_or_done(layer + 1)
                }
            }
            Stage::Done => Stage::Done,
        }
    }
}

impl SceneGenerator {
    /// Renders a level document.
    ///
    /// Resolved instance and layer names, and rewritten references, are
    /// written back onto `level`. Rendering an already-resolved level again
    /// yields the same text.
    pub fn generate_level(&self, level: &mut Level, assets: &AssetCatalog, output_path: &Path) -> String {
        let mut resources = self.resource_registry(output_path);
        let mut attachments: Vec<Vec<NodeAttachments>> = Vec::with_capacity(level.layers.len());
        let mut units: Vec<Vec<String>> = Vec::new();

        let mut stage = Stage::NotStarted;
        loop {
            log::debug!("level `{}`: {stage:?}", level.name);
            match stage {
                Stage::NotStarted => {}
                Stage::EmitResources => {
                    resolve_layer_names(&mut level.layers);
                    for layer in &mut level.layers {
                        resolve_names(&mut layer.instances);
                        for instance in &mut layer.instances {
                            self.pre_process(instance);
                        }
                        resolve_references(&mut layer.instances);
                        attachments.push(
                            layer
                                .instances
                                .iter()
                                .map(|instance| self.attach(instance, assets, &mut resources))
                                .collect(),
                        );
                    }
                }
                Stage::EmitRoot => units.push(root_node(level).render()),
                Stage::EmitLayer(layer) => units.push(layer_node(&level.layers[layer]).render()),
                Stage::EmitInstance { layer, instance } => {
                    let owner = &level.layers[layer];
                    let node = instance_node(
                        &owner.instances[instance],
                        &owner.name,
                        &attachments[layer][instance],
                    );
                    units.push(node.render());
                }
                Stage::Done => break,
            }
            stage = stage.next(level);
        }

        let mut lines = vec![self.scene_header(resources.len())];
        lines.extend(resources.render_lines());
        lines.push(String::new());
        for unit in units {
            lines.push(String::new());
            lines.extend(unit);
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn resolve_layer_names(layers: &mut [Layer]) {
    let bases: Vec<String> = layers
        .iter()
        .map(|layer| {
            if layer.name.trim().is_empty() {
                "Layer".to_string()
            } else {
                layer.name.clone()
            }
        })
        .collect();
    for (layer, name) in layers.iter_mut().zip(unique_names(&bases)) {
        layer.name = name;
    }
}

fn root_node(level: &Level) -> EmittedNode {
    EmittedNode {
        type_name: Some(node_type_for(&level.name).to_string()),
        logical_id: Some(level.logical_id.clone()),
        ..EmittedNode::new(&level.name)
    }
}

fn layer_node(layer: &Layer) -> EmittedNode {
    EmittedNode {
        type_name: Some(DEFAULT_NODE_TYPE.to_string()),
        parent: Some(".".to_string()),
        ..EmittedNode::new(&layer.name)
    }
}

fn instance_node(instance: &LevelInstance, layer_name: &str, attachments: &NodeAttachments) -> EmittedNode {
    let mut lines = attachments.lines.clone();
    lines.extend(property_lines(
        &instance.properties,
        &instance.name,
        attaches_script(&attachments.lines),
    ));

    EmittedNode {
        type_name: Some(node_type_for(&instance.type_name).to_string()),
        parent: Some(layer_name.to_string()),
        node_paths: node_path_names(&instance.properties),
        instance_clause: attachments.heading.clone(),
        lines,
        logical_id: Some(instance.logical_id.clone()),
        ..EmittedNode::new(&instance.name)
    }
}

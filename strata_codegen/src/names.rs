use std::collections::{HashMap, HashSet};

use strata_props::Property;

use crate::model::LevelInstance;

/// Makes every name in `bases` distinct.
///
/// The first holder of a name keeps it. Later holders get `<name>_<n>` with
/// the smallest `n` from 0 that collides with nothing, including names other
/// entries started with.
pub fn unique_names(bases: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = bases.iter().cloned().collect();
    let mut claimed = HashSet::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();

    bases
        .iter()
        .map(|base| {
            if claimed.insert(base.clone()) {
                return base.clone();
            }
            let counter = counters.entry(base.as_str()).or_insert(0);
            loop {
                let candidate = format!("{base}_{counter}");
                *counter += 1;
                if taken.insert(candidate.clone()) {
                    claimed.insert(candidate.clone());
                    return candidate;
                }
            }
        })
        .collect()
}

/// Resolves display names for one layer and writes them back onto the instances.
pub fn resolve_names(instances: &mut [LevelInstance]) {
    let bases: Vec<String> = instances
        .iter()
        .map(|instance| {
            if instance.name.trim().is_empty() {
                instance.type_name.clone()
            } else {
                instance.name.clone()
            }
        })
        .collect();

    for (instance, name) in instances.iter_mut().zip(unique_names(&bases)) {
        if instance.name != name {
            log::debug!("instance `{}` named `{name}`", instance.logical_id);
            instance.name = name;
        }
    }
}

/// Rewrites reference values naming a sibling's logical id to `../<sibling name>`.
/// Values that match no sibling are left as they are.
pub fn resolve_references(instances: &mut [LevelInstance]) {
    let paths: HashMap<String, String> = instances
        .iter()
        .filter(|instance| !instance.logical_id.is_empty())
        .map(|instance| (instance.logical_id.clone(), format!("../{}", instance.name)))
        .collect();

    for instance in instances.iter_mut() {
        for property in instance.properties.values_mut() {
            match property {
                Property::Reference(reference) => rewrite(&mut reference.value, &paths),
                Property::Array(array) => {
                    for item in &mut array.items {
                        if let Property::Reference(reference) = item {
                            rewrite(&mut reference.value, &paths);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn rewrite(value: &mut String, paths: &HashMap<String, String>) {
    if let Some(path) = paths.get(value.as_str()) {
        *value = path.clone();
    }
}

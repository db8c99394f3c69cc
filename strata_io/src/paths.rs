use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the disk.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expresses `target` relative to the directory `base`.
///
/// Both paths are normalized lexically first. When they share no common
/// prefix (different roots or drives) the normalized target is returned.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target = lexical_normalize(target);
    let base = lexical_normalize(base);

    if target.has_root() != base.has_root() {
        return target;
    }

    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let shared = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if shared == 0 && target.has_root() {
        return target;
    }

    let mut out = PathBuf::new();
    for _ in shared..base_parts.len() {
        out.push("..");
    }
    for part in &target_parts[shared..] {
        out.push(part.as_os_str());
    }
    out
}

/// Renders a path with `/` separators regardless of host platform.
pub fn to_forward_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push('/'),
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out.replace('\\', "/")
}

/// Moves `path` from under `from_root` to under `to_root`.
///
/// Paths outside `from_root` are treated as already relative to it.
pub fn rebase(path: &Path, from_root: &Path, to_root: &Path) -> PathBuf {
    let normalized = lexical_normalize(path);
    let from_root = lexical_normalize(from_root);
    match normalized.strip_prefix(&from_root) {
        Ok(rel) => to_root.join(rel),
        Err(_) if normalized.is_relative() => to_root.join(normalized),
        Err(_) => normalized,
    }
}

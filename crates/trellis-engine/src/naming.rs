use std::collections::HashSet;

/// Name given to a copy of a template.
pub fn copy_name(name: &str, millis: i64) -> String {
  format!("{name}_copy_{millis}")
}

/// Name given to an imported template once its base name is resolved.
pub fn import_name(resolved: &str, millis: i64) -> String {
  format!("{resolved}_import_{millis}")
}

/// The `n`th candidate for `base`: `base`, `base(1)`, `base(2)`, ...
pub(crate) fn candidate(base: &str, n: usize) -> String {
  if n == 0 {
    base.to_string()
  } else {
    format!("{base}({n})")
  }
}

/// Whether a candidate base name is already used by a template or by an
/// earlier import of that candidate.
pub(crate) fn is_taken(candidate: &str, existing: &HashSet<String>) -> bool {
  if existing.contains(candidate) {
    return true;
  }
  let import_prefix = format!("{candidate}_import_");
  existing.iter().any(|name| name.starts_with(&import_prefix))
}

/// First free candidate within `max_attempts` tries.
pub(crate) fn resolve_name(
  base: &str,
  existing: &HashSet<String>,
  max_attempts: usize,
) -> Option<String> {
  (0..max_attempts)
    .map(|n| candidate(base, n))
    .find(|c| !is_taken(c, existing))
}

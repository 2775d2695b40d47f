use std::collections::HashSet;

use trellis_config::Property;

/// Collapse global parameters that are equal in every field.
///
/// The first occurrence of each distinct parameter is kept.
pub fn dedup_global_params(params: Vec<Property>) -> Vec<Property> {
  let mut seen = HashSet::new();
  params
    .into_iter()
    .filter(|p| seen.insert(p.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_duplicates_collapse() {
    let params = vec![
      Property::new("a", "1"),
      Property::new("a", "1"),
      Property::new("b", "2"),
    ];
    assert_eq!(
      dedup_global_params(params),
      vec![Property::new("a", "1"), Property::new("b", "2")]
    );
  }

  #[test]
  fn test_same_name_different_value_kept() {
    let params = vec![Property::new("a", "1"), Property::new("a", "2")];
    assert_eq!(dedup_global_params(params).len(), 2);
  }
}

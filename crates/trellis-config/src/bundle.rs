use serde::{Deserialize, Serialize};

/// One entry of an export bundle.
///
/// Export fills the project name, template name, payload and layout fields.
/// Import additionally honours the description and classification fields when
/// a bundle carries them. Every field is optional on the wire; import checks
/// the required ones and reports which is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
  #[serde(default)]
  pub project_name: Option<String>,
  #[serde(default)]
  pub process_template_name: Option<String>,
  #[serde(default)]
  pub process_template_json: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub process_template_description: Option<String>,
  #[serde(default)]
  pub process_template_locations: Option<String>,
  #[serde(default)]
  pub process_template_connects: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub biz_type_id: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub biz_form_url: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_export_shape_omits_classification() {
    let meta = TemplateMeta {
      project_name: Some("p".to_string()),
      process_template_name: Some("t".to_string()),
      process_template_json: Some("{}".to_string()),
      process_template_locations: Some("{}".to_string()),
      process_template_connects: Some("[]".to_string()),
      ..Default::default()
    };

    let value = serde_json::to_value(&meta).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert!(keys.contains(&"processTemplateJson"));
    assert!(!keys.contains(&"bizTypeId"));
    assert!(!keys.contains(&"processTemplateDescription"));
  }
}

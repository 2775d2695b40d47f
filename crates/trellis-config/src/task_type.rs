use std::fmt;

/// The closed set of task types the engine knows how to interpret.
///
/// Tags outside this set parse as [`TaskType::Unknown`] rather than failing,
/// so templates carrying newer task types still pass through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
  Shell,
  Python,
  Sql,
  Procedure,
  SubProcess,
  Mr,
  Spark,
  Flink,
  Http,
  Dependent,
  Conditions,
  Datax,
  Sqoop,
  Unknown,
}

impl TaskType {
  pub fn parse(tag: &str) -> Self {
    match tag.trim().to_ascii_uppercase().as_str() {
      "SHELL" => Self::Shell,
      "PYTHON" => Self::Python,
      "SQL" => Self::Sql,
      "PROCEDURE" => Self::Procedure,
      "SUB_PROCESS" => Self::SubProcess,
      "MR" => Self::Mr,
      "SPARK" => Self::Spark,
      "FLINK" => Self::Flink,
      "HTTP" => Self::Http,
      "DEPENDENT" => Self::Dependent,
      "CONDITIONS" => Self::Conditions,
      "DATAX" => Self::Datax,
      "SQOOP" => Self::Sqoop,
      _ => Self::Unknown,
    }
  }

  /// The canonical tag as it appears in payloads.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Shell => "SHELL",
      Self::Python => "PYTHON",
      Self::Sql => "SQL",
      Self::Procedure => "PROCEDURE",
      Self::SubProcess => "SUB_PROCESS",
      Self::Mr => "MR",
      Self::Spark => "SPARK",
      Self::Flink => "FLINK",
      Self::Http => "HTTP",
      Self::Dependent => "DEPENDENT",
      Self::Conditions => "CONDITIONS",
      Self::Datax => "DATAX",
      Self::Sqoop => "SQOOP",
      Self::Unknown => "UNKNOWN",
    }
  }

  pub fn is_sub_process(&self) -> bool {
    matches!(self, Self::SubProcess)
  }
}

impl fmt::Display for TaskType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_known_tags() {
    assert_eq!(TaskType::parse("SUB_PROCESS"), TaskType::SubProcess);
    assert_eq!(TaskType::parse("sql"), TaskType::Sql);
    assert!(TaskType::parse("SUB_PROCESS").is_sub_process());
  }

  #[test]
  fn test_unknown_tag() {
    assert_eq!(TaskType::parse("WATERDROP"), TaskType::Unknown);
    assert_eq!(TaskType::parse(""), TaskType::Unknown);
  }
}

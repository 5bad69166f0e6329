//! Typed YAML parsing

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content, reporting errors against `filename`
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename)))
}

/// Parse a YAML file
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::routing::RoutingMap;

    #[test]
    fn test_parse_routing_map() {
        let yaml = "inside:\n  Saw:\n    - work_center: SAW\n      operation: SC\noutside:\n  Anodize:\n    - vendor: PLATECO\n";
        let map: RoutingMap = parse_yaml(yaml, "routing.yaml").unwrap();
        assert_eq!(map.inside["Saw"][0].work_center, "SAW");
        assert_eq!(map.inside["Saw"][0].operation.as_deref(), Some("SC"));
        assert_eq!(map.outside["Anodize"][0].service, None);
    }

    #[test]
    fn test_wrong_shape_is_syntax_error() {
        let yaml = "inside:\n  Saw: SAW\n";
        let result: Result<RoutingMap, _> = parse_yaml(yaml, "routing.yaml");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<RoutingMap, _> = parse_yaml_file(Path::new("/nonexistent/jobflow.yaml"));
        assert!(matches!(result, Err(YamlError::Io(_))));
    }
}

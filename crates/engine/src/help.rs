//! Help text for an action's merged parameters.

use actionctl_types::{Action, ParameterSpec};
use serde_json::Value;
use textwrap::Options;

use crate::{error::EngineError, schema::MergedSchema};

const HELP_WIDTH: usize = 78;
const DESCRIPTION_WIDTH: usize = 70;
const NAME_INDENT: &str = "    ";
const DETAIL_INDENT: &str = "        ";

/// Ordering key for parameters in help output.
///
/// Positioned parameters come first in position order, the rest follow by
/// name, so a mixed schema still has a total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Position(u64),
    Name(String),
}

impl SortKey {
    fn of(name: &str, spec: Option<&ParameterSpec>) -> Self {
        match spec.and_then(|spec| spec.position) {
            Some(position) => Self::Position(position),
            None => Self::Name(name.to_string()),
        }
    }
}

/// Sort `names` by declared position, falling back to the name itself.
pub fn sort_parameters<'n, I>(schema: &MergedSchema, names: I) -> Vec<&'n str>
where
    I: IntoIterator<Item = &'n String>,
{
    let mut sorted: Vec<&str> = names.into_iter().map(String::as_str).collect();
    sorted.sort_by_cached_key(|name| SortKey::of(name, schema.get(name)));
    sorted
}

/// Render one parameter block: its name, then description, type, enum and
/// default when present.
pub fn render_parameter(name: &str, spec: Option<&ParameterSpec>) -> Result<String, EngineError> {
    let spec = spec.ok_or_else(|| EngineError::MissingSchema { name: name.to_string() })?;

    let name_options = Options::new(HELP_WIDTH).initial_indent(NAME_INDENT).subsequent_indent(NAME_INDENT);
    let detail_options = Options::new(HELP_WIDTH).initial_indent(DETAIL_INDENT).subsequent_indent(DETAIL_INDENT);

    let mut lines = vec![textwrap::fill(name, &name_options)];
    if let Some(description) = spec.description.as_deref().filter(|text| !text.is_empty()) {
        lines.push(textwrap::fill(description, &detail_options));
    }
    if let Some(kind) = spec.r#type.as_deref().filter(|text| !text.is_empty()) {
        lines.push(textwrap::fill(&format!("Type: {kind}"), &detail_options));
    }
    if let Some(values) = spec.r#enum.as_ref().filter(|values| !values.is_empty()) {
        let joined = values.iter().map(display_value).collect::<Vec<_>>().join(", ");
        lines.push(textwrap::fill(&format!("Enum: {joined}"), &detail_options));
    }
    if let Some(default) = spec.default.as_ref().filter(|value| is_truthy(value)) {
        lines.push(textwrap::fill(&format!("Default: {}", display_value(default)), &detail_options));
    }
    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// Render the full help for `action`: its description followed by the
/// required and optional parameter sections. Immutable parameters are not
/// listed.
pub fn render_action_help(action: &Action, schema: &MergedSchema) -> Result<String, EngineError> {
    let description = action.description.as_deref().unwrap_or_default();
    let mut sections = vec![
        String::new(),
        textwrap::fill(description, DESCRIPTION_WIDTH),
        String::new(),
    ];

    let required = sort_parameters(schema, schema.required().iter().chain(schema.undeclared_required()));
    if !required.is_empty() {
        sections.push("Required Parameters:".to_string());
        for name in required {
            sections.push(render_parameter(name, schema.get(name))?);
        }
    }

    let optional = sort_parameters(schema, schema.optional());
    if !optional.is_empty() {
        sections.push("Optional Parameters:".to_string());
        for name in optional {
            sections.push(render_parameter(name, schema.get(name))?);
        }
    }

    Ok(sections.join("\n"))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actionctl_types::ParameterSchema;
    use serde_json::json;

    fn schema(value: Value) -> MergedSchema {
        let action: ParameterSchema = serde_json::from_value(value).unwrap();
        MergedSchema::merge(&ParameterSchema::new(), &[], &action, &[])
    }

    #[test]
    fn positions_sort_ascending_regardless_of_input_order() {
        let merged = schema(json!({
            "third": {"type": "string", "position": 2},
            "first": {"type": "string", "position": 0},
            "second": {"type": "string", "position": 1}
        }));
        let names: Vec<String> = merged.parameters().keys().cloned().collect();
        assert_eq!(sort_parameters(&merged, &names), vec!["first", "second", "third"]);
    }

    #[test]
    fn unpositioned_parameters_sort_by_name_after_positioned() {
        let merged = schema(json!({
            "zeta": {"type": "string"},
            "alpha": {"type": "string"},
            "cmd": {"type": "string", "position": 0},
            "mid": {"type": "string"}
        }));
        let names: Vec<String> = merged.parameters().keys().cloned().collect();
        assert_eq!(sort_parameters(&merged, &names), vec!["cmd", "alpha", "mid", "zeta"]);
    }

    #[test]
    fn parameter_block_lists_present_fields() {
        let spec: ParameterSpec = serde_json::from_value(json!({
            "type": "string",
            "description": "Log level",
            "enum": ["debug", "info"],
            "default": "info"
        }))
        .unwrap();
        let rendered = render_parameter("level", Some(&spec)).unwrap();
        assert_eq!(
            rendered,
            "    level\n        Log level\n        Type: string\n        Enum: debug, info\n        Default: info\n"
        );
    }

    #[test]
    fn falsy_defaults_are_omitted() {
        for default in [json!(false), json!(0), json!(""), json!([]), json!(null)] {
            let spec = ParameterSpec {
                r#type: Some("string".into()),
                default: Some(default),
                ..Default::default()
            };
            let rendered = render_parameter("flag", Some(&spec)).unwrap();
            assert!(!rendered.contains("Default"), "{rendered}");
        }
    }

    #[test]
    fn long_descriptions_wrap_with_detail_indent() {
        let spec = ParameterSpec {
            description: Some("word ".repeat(40)),
            ..Default::default()
        };
        let rendered = render_parameter("verbose", Some(&spec)).unwrap();
        for line in rendered.lines().skip(1).filter(|line| !line.is_empty()) {
            assert!(line.starts_with(DETAIL_INDENT), "{line:?}");
            assert!(line.len() <= HELP_WIDTH, "{line:?}");
        }
    }

    #[test]
    fn missing_schema_is_fatal() {
        let error = render_parameter("ghost", None).unwrap_err();
        assert!(matches!(error, EngineError::MissingSchema { ref name } if name == "ghost"));
        assert_eq!(error.to_string(), "Missing schema for parameter \"ghost\"");
    }

    #[test]
    fn action_help_has_required_and_optional_sections() {
        let action: Action = serde_json::from_value(json!({
            "name": "remote",
            "pack": "core",
            "description": "Run a command on remote hosts",
            "runner_type": "remote-shell-cmd",
            "parameters": {
                "hosts": {"type": "array", "required": true, "position": 0},
                "cmd": {"type": "string", "required": true, "position": 1},
                "timeout": {"type": "integer", "default": 60},
                "sudo": {"type": "boolean", "immutable": true}
            }
        }))
        .unwrap();
        let merged = MergedSchema::merge(&ParameterSchema::new(), &[], &action.parameters, &[]);
        let help = render_action_help(&action, &merged).unwrap();

        let required_at = help.find("Required Parameters:").unwrap();
        let optional_at = help.find("Optional Parameters:").unwrap();
        assert!(help.starts_with("\nRun a command on remote hosts\n"));
        assert!(required_at < optional_at);
        assert!(help.find("    hosts").unwrap() < help.find("    cmd").unwrap());
        assert!(help[optional_at..].contains("Default: 60"));
        assert!(!help.contains("sudo"));
    }

    #[test]
    fn undeclared_required_parameter_fails_help() {
        let action: Action = serde_json::from_value(json!({
            "name": "local",
            "pack": "core",
            "runner_type": "local-shell-cmd",
            "required_parameters": ["ghost"]
        }))
        .unwrap();
        let merged = MergedSchema::for_action(
            &serde_json::from_value(json!({"name": "local-shell-cmd"})).unwrap(),
            &action,
        );
        let error = render_action_help(&action, &merged).unwrap_err();
        assert!(matches!(error, EngineError::MissingSchema { .. }));
    }
}

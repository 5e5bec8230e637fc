//! Parsing of `key=value`, `@key=path` and bare command-line tokens.

use std::{
    fs,
    path::{Path, PathBuf},
};

use actionctl_types::{ParameterValue, Parameters};
use actionctl_util::normalize_path;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{EngineError, FileAccessError},
    schema::MergedSchema,
    transform::transform_value,
};

/// Key holding the raw bytes of a file-valued parameter.
pub const FILE_CONTENT_KEY: &str = "file_content";
/// Key holding the basename of the file that was read.
pub const FILE_NAME_KEY: &str = "file_name";
pub const METHOD_KEY: &str = "method";
/// Key collecting the trailing free-form tokens.
pub const CMD_KEY: &str = "cmd";
/// Method assumed for file uploads when none is supplied.
pub const DEFAULT_FILE_METHOD: &str = "POST";

/// Resolves raw CLI tokens into a parameter mapping for one action.
///
/// Scanning stops at the first token without `=`: that token and every token
/// after it are joined with single spaces into the `cmd` parameter.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentParser<'a> {
    schema: &'a MergedSchema,
    working_dir: &'a Path,
}

impl<'a> ArgumentParser<'a> {
    /// `working_dir` anchors relative paths of file-valued parameters.
    pub fn new(schema: &'a MergedSchema, working_dir: &'a Path) -> Self {
        Self { schema, working_dir }
    }

    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Parameters, EngineError> {
        let mut parameters = Parameters::new();
        let mut staged_file_name: Option<String> = None;

        for (index, token) in tokens.iter().enumerate() {
            let Some((key, raw)) = token.as_ref().split_once('=') else {
                let command = tokens[index..].iter().map(|rest| rest.as_ref()).collect::<Vec<&str>>().join(" ");
                debug!(consumed = index, remaining = tokens.len() - index, "collapsing bare tokens into cmd");
                parameters.insert(CMD_KEY.to_string(), ParameterValue::Value(Value::String(command)));
                break;
            };

            if key.starts_with('@') {
                let path = normalize_path(&self.working_dir.join(raw));
                let content = read_file_parameter(&path)?;
                debug!(path = %path.display(), bytes = content.len(), "read file-valued parameter");
                staged_file_name = Some(
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                parameters.insert(FILE_CONTENT_KEY.to_string(), ParameterValue::Bytes(content));
            } else {
                let value = transform_value(key, raw, self.schema)?;
                parameters.insert(key.to_string(), ParameterValue::Value(value));
            }
        }

        if let Some(file_name) = staged_file_name {
            parameters
                .entry(METHOD_KEY.to_string())
                .or_insert_with(|| ParameterValue::from(DEFAULT_FILE_METHOD));
            parameters
                .entry(FILE_NAME_KEY.to_string())
                .or_insert_with(|| ParameterValue::from(file_name.as_str()));
        }

        Ok(parameters)
    }
}

fn read_file_parameter(path: &Path) -> Result<Vec<u8>, FileAccessError> {
    let owned = || PathBuf::from(path);
    if !path.exists() {
        return Err(FileAccessError::Missing { path: owned() });
    }
    if !path.is_file() {
        return Err(FileAccessError::NotAFile { path: owned() });
    }
    fs::read(path).map_err(|source| FileAccessError::Read { path: owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actionctl_types::ParameterSchema;
    use serde_json::json;

    fn merged() -> MergedSchema {
        let runner: ParameterSchema = serde_json::from_value(json!({
            "x": {"type": "integer"},
            "y": {"type": "string"},
            "debug": {"type": "boolean"},
            "hosts": {"type": "array"}
        }))
        .unwrap();
        MergedSchema::merge(&runner, &[], &ParameterSchema::new(), &[])
    }

    fn value<'p>(parameters: &'p Parameters, key: &str) -> &'p Value {
        parameters.get(key).and_then(ParameterValue::as_value).unwrap()
    }

    #[test]
    fn bare_tokens_collapse_into_cmd() {
        let schema = merged();
        let parser = ArgumentParser::new(&schema, Path::new("."));
        let parameters = parser.parse(&["x=1", "y=2", "free", "text"]).unwrap();

        assert_eq!(parameters.len(), 3);
        assert_eq!(value(&parameters, "x"), &json!(1));
        assert_eq!(value(&parameters, "y"), &json!("2"));
        assert_eq!(value(&parameters, CMD_KEY), &json!("free text"));
    }

    #[test]
    fn tokens_after_bare_run_are_not_parsed() {
        let schema = merged();
        let parser = ArgumentParser::new(&schema, Path::new("."));
        let parameters = parser.parse(&["hosts=a,b", "echo", "debug=maybe", "x=oops"]).unwrap();

        assert_eq!(value(&parameters, "hosts"), &json!(["a", "b"]));
        assert_eq!(value(&parameters, CMD_KEY), &json!("echo debug=maybe x=oops"));
        assert!(!parameters.contains_key("debug"));
        assert!(!parameters.contains_key("x"));
    }

    #[test]
    fn value_is_split_on_first_equals_only() {
        let schema = merged();
        let parser = ArgumentParser::new(&schema, Path::new("."));
        let parameters = parser.parse(&["query=a=b", "empty="]).unwrap();
        assert_eq!(value(&parameters, "query"), &json!("a=b"));
        assert_eq!(value(&parameters, "empty"), &json!(""));
    }

    #[test]
    fn coercion_failure_aborts_parsing() {
        let schema = merged();
        let parser = ArgumentParser::new(&schema, Path::new("."));
        let error = parser.parse(&["debug=maybe"]).unwrap_err();
        assert!(matches!(error, EngineError::InvalidValue { ref name, .. } if name == "debug"));
    }

    #[test]
    fn file_parameter_reads_bytes_and_sets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.txt"), b"line one\nline two\n").unwrap();

        let schema = merged();
        let parser = ArgumentParser::new(&schema, dir.path());
        let parameters = parser.parse(&["@file=./data.txt"]).unwrap();

        assert_eq!(
            parameters.get(FILE_CONTENT_KEY).and_then(ParameterValue::as_bytes),
            Some(&b"line one\nline two\n"[..])
        );
        assert_eq!(value(&parameters, FILE_NAME_KEY), &json!("data.txt"));
        assert_eq!(value(&parameters, METHOD_KEY), &json!("POST"));
        assert!(!parameters.contains_key("file"));
        assert!(!parameters.contains_key("@file"));
    }

    #[test]
    fn explicit_method_and_file_name_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/payload.json"), b"{}").unwrap();

        let schema = merged();
        let parser = ArgumentParser::new(&schema, dir.path());
        let parameters = parser
            .parse(&["method=PUT", "@upload=nested/../nested/payload.json", "file_name=remote.json"])
            .unwrap();

        assert_eq!(value(&parameters, METHOD_KEY), &json!("PUT"));
        assert_eq!(value(&parameters, FILE_NAME_KEY), &json!("remote.json"));
        assert_eq!(parameters.get(FILE_CONTENT_KEY).and_then(ParameterValue::as_bytes), Some(&b"{}"[..]));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let schema = merged();
        let parser = ArgumentParser::new(&schema, dir.path());
        let error = parser.parse(&["@file=absent.txt"]).unwrap_err();

        assert!(matches!(error, EngineError::FileAccess(FileAccessError::Missing { .. })));
        let message = error.to_string();
        assert!(message.contains("absent.txt"), "{message}");
        assert!(message.contains("doesn't exist"), "{message}");
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("folder")).unwrap();
        let schema = merged();
        let parser = ArgumentParser::new(&schema, dir.path());
        let error = parser.parse(&["@file=folder"]).unwrap_err();

        assert!(matches!(error, EngineError::FileAccess(FileAccessError::NotAFile { .. })));
        assert!(error.to_string().contains("is not a file"));
    }

    #[test]
    fn no_tokens_yield_no_parameters() {
        let schema = merged();
        let parser = ArgumentParser::new(&schema, Path::new("."));
        assert!(parser.parse::<&str>(&[]).unwrap().is_empty());
    }
}

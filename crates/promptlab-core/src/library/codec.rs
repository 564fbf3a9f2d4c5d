//! Library document decoding and rendering.

use serde_json::Value;

use crate::domain::{
    ExportMetadata, LibraryDocument, LibraryError, LibraryExport, LibraryFormat, Prompt,
};

/// Decode library text into its raw prompt records.
///
/// With no explicit format the text is sniffed with [`LibraryFormat::detect`].
/// The document must be an object whose `prompts` field is an array; the
/// records themselves are not inspected here so that one bad entry cannot
/// sink the whole import.
pub fn parse_library(text: &str, format: Option<LibraryFormat>) -> Result<Vec<Value>, LibraryError> {
    let format = format.unwrap_or_else(|| LibraryFormat::detect(text));
    let parse_err = |message: String| LibraryError::Parse { format, message };

    let document: Value = match format {
        LibraryFormat::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        LibraryFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    };

    let Value::Object(mut object) = document else {
        return Err(LibraryError::InvalidStructure);
    };
    match object.remove("prompts") {
        None => Err(LibraryError::MissingPromptsField),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(LibraryError::InvalidPromptsStructure),
    }
}

/// Render prompts into a library document in the given format.
pub fn build_export(prompts: Vec<Prompt>, format: LibraryFormat) -> Result<LibraryExport, LibraryError> {
    let document = LibraryDocument {
        metadata: ExportMetadata::new(prompts.len()),
        prompts,
    };
    let render_err = |message: String| LibraryError::Render { format, message };

    let data = match format {
        LibraryFormat::Json => {
            serde_json::to_string_pretty(&document).map_err(|e| render_err(e.to_string()))?
        }
        LibraryFormat::Yaml => {
            serde_yaml::to_string(&document).map_err(|e| render_err(e.to_string()))?
        }
    };

    Ok(LibraryExport {
        format,
        content_type: format.content_type(),
        data,
        metadata: document.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn prompt(id: i64, name: &str) -> Prompt {
        Prompt {
            id,
            name: name.to_string(),
            description: None,
            system_prompt: format!("You are {name}."),
            model: "llama2".to_string(),
            temperature: 0.7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_json_autodetected() {
        let records =
            parse_library(r#" {"prompts": [{"name": "A"}, {"name": "B"}]}"#, None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], "B");
    }

    #[test]
    fn test_parse_yaml_autodetected() {
        let text = "metadata:\n  total_prompts: 1\nprompts:\n  - name: Tutor\n    system_prompt: Teach.\n    temperature: 0.4\n";
        let records = parse_library(text, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["system_prompt"], "Teach.");
        assert_eq!(records[0]["temperature"], 0.4);
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(
            parse_library("[1, 2]", None),
            Err(LibraryError::InvalidStructure)
        );
        assert_eq!(
            parse_library(r#"{"items": []}"#, None),
            Err(LibraryError::MissingPromptsField)
        );
        assert_eq!(
            parse_library(r#"{"prompts": {"name": "A"}}"#, None),
            Err(LibraryError::InvalidPromptsStructure)
        );
        assert_eq!(
            parse_library("just some words", None),
            Err(LibraryError::InvalidStructure)
        );
    }

    #[test]
    fn test_explicit_format_overrides_detection() {
        let err = parse_library("prompts: []", Some(LibraryFormat::Json)).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Parse {
                format: LibraryFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_export_json_has_metadata() {
        let export = build_export(vec![prompt(1, "A"), prompt(2, "B")], LibraryFormat::Json).unwrap();
        assert_eq!(export.content_type, "application/json");
        assert_eq!(export.metadata.total_prompts, 2);
        assert_eq!(export.metadata.format_version, "1.0");
        assert_eq!(export.metadata.exported_by, "PromptLab");

        let parsed: Value = serde_json::from_str(&export.data).unwrap();
        assert_eq!(parsed["metadata"]["total_prompts"], 2);
        assert_eq!(parsed["prompts"][0]["name"], "A");
    }

    #[test]
    fn test_export_yaml_parses_back() {
        let export = build_export(vec![prompt(1, "Reviewer")], LibraryFormat::Yaml).unwrap();
        assert_eq!(export.content_type, "application/x-yaml");
        let records = parse_library(&export.data, None).unwrap();
        assert_eq!(records[0]["name"], "Reviewer");
        assert_eq!(records[0]["system_prompt"], "You are Reviewer.");
    }
}

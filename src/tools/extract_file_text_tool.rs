use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::extractor::{ExtractionKind, Extractor};
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::output::{build_error_payload, truncate_chars, TRUNCATION_MARKER};

pub static EXTRACT_FILE_TEXT_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "extract-file-text".to_string(),
    description: "Extract the text content of a local file. Text files are returned as-is, \
                  PDFs have the text of their pages extracted; binary files yield no text"
        .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": "Path of the file to read"
            },
            "maxLength": {
                "type": "integer",
                "description": "Maximum number of characters to return (defaults to the server setting)",
                "minimum": 100
            }
        },
        "required": ["path"]
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Extract File Text".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

#[derive(Debug, Deserialize)]
struct ExtractFileTextParams {
    path: String,
    #[serde(default, rename = "maxLength")]
    max_length: Option<usize>,
}

pub struct ExtractFileTextTool {
    extractor: Extractor,
    default_max_length: usize,
}

impl ExtractFileTextTool {
    pub fn new(extractor: Extractor, default_max_length: usize) -> Self {
        Self {
            extractor,
            default_max_length,
        }
    }

    pub async fn execute(&self, arguments: Option<serde_json::Value>) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<ExtractFileTextParams>(args) {
                Ok(params) => params,
                Err(e) => {
                    error!("Invalid extract-file-text parameters: {}", e);
                    return CallToolResult::error(format!("Invalid parameters: {}", e));
                }
            },
            None => {
                return CallToolResult::error("Missing required parameters");
            }
        };

        if params.path.trim().is_empty() {
            return CallToolResult::error("Invalid parameters: path must not be empty");
        }

        let max_length = params.max_length.unwrap_or(self.default_max_length);
        let path = PathBuf::from(&params.path);
        let kind = ExtractionKind::for_path(&path);
        info!(
            "Extracting text from file: {} (maxLength: {})",
            params.path, max_length
        );

        let extractor = self.extractor;
        let outcome = tokio::task::spawn_blocking(move || extractor.extract(&path)).await;

        let document = match outcome {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => {
                error!("Error extracting text from {}: {}", params.path, e);
                return CallToolResult::error(build_error_payload(
                    e.code(),
                    &e.to_string(),
                    json!({ "path": params.path, "kind": kind.as_str() }),
                ));
            }
            Err(e) => {
                error!("Extraction task for {} failed: {}", params.path, e);
                return CallToolResult::error(build_error_payload(
                    "INTERNAL_ERROR",
                    "Extraction task failed",
                    json!({ "path": params.path, "reason": e.to_string() }),
                ));
            }
        };

        let Some(text) = document.into_text() else {
            info!("No extractable text in {}", params.path);
            return CallToolResult::success(format!(
                "No extractable text found in {}. The file is binary, not valid UTF-8, \
                 or a PDF without a text layer.",
                params.path
            ));
        };

        let content_chars = text.chars().count();
        let output = truncate_chars(&text, max_length, TRUNCATION_MARKER);
        let truncated = content_chars > max_length;

        let metadata = format!(
            "\n---\nExtraction details:\n- File: {}\n- Extraction kind: {}\n- Content length: {} characters{}\n---",
            params.path,
            kind.as_str(),
            content_chars,
            if truncated {
                format!("\n- Truncated to {} characters", max_length)
            } else {
                String::new()
            }
        );

        CallToolResult::success(format!("{}{}", output, metadata))
    }
}

use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::extractor::{classify, DetectionStage, ExtractionKind};
use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::output::build_error_payload;

pub static DETECT_FILE_TYPE_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "detect-file-type".to_string(),
    description: "Classify a local file as text or binary using its extension, content sniffing \
                  and byte statistics, without returning its content"
        .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": "Path of the file to classify"
            }
        },
        "required": ["path"]
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Detect File Type".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

#[derive(Debug, Deserialize)]
struct DetectFileTypeParams {
    path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectionReport<'a> {
    path: &'a str,
    is_text: bool,
    mime_hint: &'static str,
    decided_by: Option<DetectionStage>,
    extraction_kind: &'static str,
}

pub struct DetectFileTypeTool;

impl DetectFileTypeTool {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, arguments: Option<serde_json::Value>) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<DetectFileTypeParams>(args) {
                Ok(params) => params,
                Err(e) => {
                    error!("Invalid detect-file-type parameters: {}", e);
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

        info!("Detecting file type: {}", params.path);
        let path = PathBuf::from(&params.path);
        let kind = ExtractionKind::for_path(&path);
        let verdict = match tokio::task::spawn_blocking(move || classify(&path)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                error!("Error detecting file type of {}: {}", params.path, e);
                return CallToolResult::error(build_error_payload(
                    "DETECTION_FAILED",
                    &e.to_string(),
                    json!({ "path": params.path }),
                ));
            }
            Err(e) => {
                error!("Detection task for {} failed: {}", params.path, e);
                return CallToolResult::error(build_error_payload(
                    "INTERNAL_ERROR",
                    "Detection task failed",
                    json!({ "path": params.path, "reason": e.to_string() }),
                ));
            }
        };

        let report = DetectionReport {
            path: &params.path,
            is_text: verdict.is_text,
            mime_hint: verdict.mime_hint,
            decided_by: verdict.decided_by,
            extraction_kind: kind.as_str(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(body) => CallToolResult::success(body),
            Err(e) => CallToolResult::error(format!("Failed to encode detection report: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    async fn report_for(path: &std::path::Path) -> Value {
        let result = DetectFileTypeTool::new()
            .execute(Some(json!({ "path": path.to_string_lossy() })))
            .await;
        assert!(!result.is_error(), "{}", result.first_text());
        serde_json::from_str(result.first_text()).unwrap()
    }

    #[tokio::test]
    async fn reports_extension_verdict() {
        let report = report_for(std::path::Path::new("/not/read/at/all.py")).await;
        assert_eq!(report["isText"], json!(true));
        assert_eq!(report["mimeHint"], json!("text/plain"));
        assert_eq!(report["decidedBy"], json!("extension"));
        assert_eq!(report["extractionKind"], json!("PlainText"));
    }

    #[tokio::test]
    async fn reports_sniffed_binary_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.dat");
        std::fs::write(&path, b"PK\x03\x04\x14\x00\x00\x00").unwrap();

        let report = report_for(&path).await;
        assert_eq!(report["isText"], json!(false));
        assert_eq!(report["mimeHint"], json!("application/zip"));
        assert_eq!(report["decidedBy"], Value::Null);
    }

    #[tokio::test]
    async fn pdf_is_routed_to_page_extraction() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        // The binary comment line keeps the byte heuristic from accepting it.
        std::fs::write(&path, b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n").unwrap();

        let report = report_for(&path).await;
        assert_eq!(report["isText"], json!(false));
        assert_eq!(report["mimeHint"], json!("application/pdf"));
        assert_eq!(report["extractionKind"], json!("PDF"));
    }

    #[tokio::test]
    async fn missing_file_is_a_tool_error() {
        let result = DetectFileTypeTool::new()
            .execute(Some(json!({ "path": "/nonexistent/blob.bin" })))
            .await;
        assert!(result.is_error());
        assert!(result.first_text().contains("DETECTION_FAILED"));
    }
}

pub mod detect_file_type_tool;
pub mod extract_file_text_tool;

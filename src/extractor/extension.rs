use std::path::Path;

/// Extensions (without the dot, lower-case) whose files are treated as text
/// without looking at their content.
pub const TEXT_EXTENSIONS: &[&str] = &[
    // Documents
    "txt", "md", "markdown", "rst", "tex", "bib", "log",
    // Data
    "csv", "tsv", "json", "xml", "yaml", "yml", "sql",
    // Config
    "conf", "cfg", "ini",
    // Web
    "html", "htm", "css", "js", "ts",
    // Code
    "py", "go", "java", "c", "cpp", "h", "hpp", "r", "rb", "php", "pl",
    // Shell scripts
    "sh", "bash", "zsh", "fish", "ps1",
];

/// Returns the extension of the path's base name: the text after its last dot.
///
/// `None` means the base name has no dot at all (`README`, `Makefile`).
/// A trailing dot yields `Some("")`, and a dot-file such as `.bashrc`
/// yields `Some("bashrc")`.
pub fn file_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rfind('.').map(|dot| name[dot + 1..].to_string())
}

/// Checks whether the file name alone says the file is text.
///
/// Files without any extension count as text, since README, LICENSE and
/// Makefile style files almost always are.
pub fn is_text_by_extension(path: &Path) -> bool {
    match file_extension(path) {
        None => true,
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            TEXT_EXTENSIONS.contains(&ext.as_str())
        }
    }
}

/// Case-insensitive `.pdf` check used to route files to the PDF extractor.
pub fn has_pdf_extension(path: &Path) -> bool {
    file_extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

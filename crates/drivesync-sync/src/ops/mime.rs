//! Export-format extension to mime-type mapping.

/// Maps an export extension to the mime type keying the export-link map.
pub fn mime_type_from_ext(ext: &str) -> Option<&'static str> {
    let normalized = ext.trim_start_matches('.').to_ascii_lowercase();
    let mime = match normalized.as_str() {
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "txt" | "text" => "text/plain",
        "gif" => "image/gif",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "application/rtf",
        "pdf" => "application/pdf",
        "doc" | "docx" => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        "ppt" | "pptx" => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.presentation"
        }
        "xls" | "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime)
}

//! Extension-to-MIME lookup for common upload types.

/// Returns the MIME type for a file extension (without the dot, any case),
/// or `None` for unknown extensions.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let lower = ext.to_ascii_lowercase();
    let mime = match lower.as_str() {
        "txt" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "deb" => "application/vnd.debian.binary-package",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "bin" | "iso" | "img" => "application/octet-stream",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_types() {
        assert_eq!(mime_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_for_extension("jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("txt"), Some("text/plain"));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("Pdf"), Some("application/pdf"));
    }

    #[test]
    fn unknown_yields_none() {
        assert_eq!(mime_for_extension("part"), None);
        assert_eq!(mime_for_extension("xyz123"), None);
        assert_eq!(mime_for_extension(""), None);
    }
}

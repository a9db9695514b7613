//! Filesystem-safe cleanup of upload filenames.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Cleans a single path component for safe storage on Linux.
///
/// - NUL, `/`, `\`, and control characters become `_`
/// - Leading/trailing dots and whitespace are trimmed
/// - Names over 255 bytes are shortened, keeping the extension intact
///
/// Interior spaces and case are preserved; the declared name is the user's,
/// only the parts a filesystem cannot hold are rewritten.
pub fn sanitize_upload_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.len() > NAME_MAX {
        shorten_keeping_extension(trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Cuts a too-long name down to NAME_MAX bytes, sacrificing the stem rather
/// than the extension so type derivation still works afterwards.
fn shorten_keeping_extension(name: &str) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };

    if ext.len() >= NAME_MAX {
        // Degenerate extension longer than the whole budget.
        return floor_char_boundary(name, NAME_MAX).to_string();
    }

    let budget = NAME_MAX - ext.len();
    format!("{}{}", floor_char_boundary(stem, budget), ext)
}

fn floor_char_boundary(s: &str, mut take: usize) -> &str {
    if take >= s.len() {
        return s;
    }
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_controls() {
        assert_eq!(sanitize_upload_name("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_upload_name("file\x00name.txt"), "file_name.txt");
        assert_eq!(sanitize_upload_name("tab\there.log"), "tab_here.log");
    }

    #[test]
    fn trims_dots_and_whitespace() {
        assert_eq!(sanitize_upload_name("  ..file.txt..  "), "file.txt");
        assert_eq!(sanitize_upload_name("..."), "");
    }

    #[test]
    fn preserves_interior_spaces_and_case() {
        assert_eq!(sanitize_upload_name("My Report.PDF"), "My Report.PDF");
    }

    #[test]
    fn shortens_long_names_keeping_extension() {
        let long = format!("{}.tar.gz", "x".repeat(300));
        let out = sanitize_upload_name(&long);
        assert_eq!(out.len(), NAME_MAX);
        assert!(out.ends_with(".gz"));
    }

    #[test]
    fn shortens_long_names_without_extension() {
        let long = "y".repeat(300);
        let out = sanitize_upload_name(&long);
        assert_eq!(out.len(), NAME_MAX);
    }

    #[test]
    fn multibyte_boundary_is_respected() {
        // 2-byte chars; 255 is not a char boundary for a run of them.
        let long = "é".repeat(200);
        let out = sanitize_upload_name(&long);
        assert!(out.len() <= NAME_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }
}

//! Filename sanitization for downloaded PDFs

/// Fallback name used when nothing usable survives sanitization
pub const DEFAULT_FILENAME: &str = "downloaded.pdf";

/// Maximum filename length in characters, extension included
pub const MAX_FILENAME_LENGTH: usize = 200;

const PDF_EXTENSION: &str = ".pdf";

/// Characters that are unsafe in filenames on at least one common platform
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Sanitizes a filename so it is safe to join onto an output directory
///
/// # Sanitization Steps
///
/// 1. Percent-decode the name
/// 2. Keep only the final path component (`/` and `\` are both separators)
/// 3. Remove NUL bytes
/// 4. Strip leading and trailing dots, collapse repeated dots
/// 5. Replace `<>:"|?*` with `_`, and neutralize leftover `%XX` escapes
/// 6. Fall back to `downloaded.pdf` when nothing is left
/// 7. Append `.pdf` unless already present (case-insensitive)
/// 8. Truncate to 200 characters, keeping the extension
///
/// The result never contains a path separator, a NUL byte or `..`, always
/// ends in `.pdf`, and feeding it back in returns it unchanged.
///
/// # Examples
///
/// ```
/// use fetcharoo::url::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd"), "passwd.pdf");
/// assert_eq!(sanitize_filename("my%20report.pdf"), "my report.pdf");
/// assert_eq!(sanitize_filename(""), "downloaded.pdf");
/// ```
pub fn sanitize_filename(filename: &str) -> String {
    // Step 1: Percent-decode (invalid UTF-8 is replaced, never rejected)
    let decoded = urlencoding::decode_binary(filename.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    // Step 2: Keep only the final path component
    let base = decoded
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default();

    // Step 3: Remove NUL bytes
    let base: String = base.chars().filter(|&c| c != '\0').collect();

    // Step 4: No hidden files, no dot runs, no dot left before the extension
    let base = collapse_dots(base.trim_start_matches('.'));
    let base = base.trim_end_matches('.');

    // Step 5: Replace reserved characters
    let mut name: String = base
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    name = neutralize_percent_escapes(&name);

    // Step 6: Fallback for empty names
    if name.is_empty() || name == PDF_EXTENSION {
        name = DEFAULT_FILENAME.to_string();
    }

    // Step 7: Force the extension, preserving the caller's case
    if !name.to_lowercase().ends_with(PDF_EXTENSION) {
        name.push_str(PDF_EXTENSION);
    }

    // Step 8: Enforce the length ceiling
    truncate_preserving_extension(name)
}

/// Collapses runs of `.` into a single dot
fn collapse_dots(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_dot = false;
    for c in name.chars() {
        if c == '.' && previous_dot {
            continue;
        }
        previous_dot = c == '.';
        out.push(c);
    }
    out
}

/// Replaces the `%` of any `%XX` hex escape with `_`
///
/// The name has already been decoded once; an escape that survives would be
/// decoded again on a second pass.
fn neutralize_percent_escapes(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let is_escape = c == '%'
                && chars.get(i + 1).is_some_and(|c| c.is_ascii_hexdigit())
                && chars.get(i + 2).is_some_and(|c| c.is_ascii_hexdigit());
            if is_escape {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn truncate_preserving_extension(name: String) -> String {
    if name.chars().count() <= MAX_FILENAME_LENGTH {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name.as_str(), ""),
    };
    let keep = MAX_FILENAME_LENGTH.saturating_sub(ext.chars().count());
    let stem: String = stem.chars().take(keep).collect();

    format!("{}{}", stem.trim_end_matches('.'), ext)
}

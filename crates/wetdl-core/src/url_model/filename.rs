//! Linux file-name validity for key segments.

/// Linux NAME_MAX, in bytes.
pub const NAME_MAX: usize = 255;

/// Returns `segment` unchanged if Linux accepts it as a file name.
///
/// Rejects the empty name, `.`, `..`, names containing NUL or `/`, and names longer
/// than NAME_MAX bytes. Everything else (leading dots, whitespace, control
/// characters) is kept as-is, so distinct segments stay distinct files.
pub fn linux_file_name(segment: &str) -> Option<&str> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    if segment.len() > NAME_MAX || segment.contains(['\0', '/']) {
        return None;
    }
    Some(segment)
}

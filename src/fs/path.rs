//! Shared helpers for slash-delimited virtual paths.

/// Check for a path separator. Both separators are accepted on input and
/// both are illegal inside a single name.
pub(crate) fn is_path_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Split a path into its segments, discarding empty ones, so `"/a//b/"`,
/// `"a/b"` and `"a\\b"` are all equivalent. An empty result denotes the
/// root.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split(is_path_separator)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join path segments back into a `/`-separated path.
pub(crate) fn join_parts(parts: &[&str]) -> String {
    parts.join("/")
}

/// Join a parent path and a leaf name, keeping the empty parent (root)
/// from producing a leading slash.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Replace characters a name must not carry into a store query: the path
/// separators and the quoting character. The stored name may therefore
/// differ from the requested one.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if is_path_separator(c) || c == '\'' {
                '-'
            } else {
                c
            }
        })
        .collect()
}

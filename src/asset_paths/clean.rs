const SEPARATORS: [char; 2] = ['/', '\\'];

/// Strip leading and trailing path separators from an asset path.
///
/// Both forward and back slashes are removed so that paths authored on any platform map onto
/// the same storage key. Interior separators are left untouched.
pub fn clean_path(path: &str) -> &str {
    path.trim_matches(SEPARATORS)
}

/// Clean `path` and prepend a fixed segment such as `public/`.
pub fn prefixed_path(prepend: &str, path: &str) -> String {
    format!("{prepend}{}", clean_path(path))
}

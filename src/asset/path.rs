//! Application-relative path utilities
//!
//! Asset and bundle paths are application relative and start with `~/`, use
//! forward slashes only, and never contain `.` segments. `..` segments are
//! collapsed where a parent exists and kept otherwise.

/// Check whether a reference target is an absolute or protocol-relative URL
pub fn is_url(path: &str) -> bool {
    let lower = path.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Convert backslashes to forward slashes
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join a directory and a relative path with a single forward slash
pub fn combine(directory: &str, relative: &str) -> String {
    let directory = to_forward_slashes(directory);
    let relative = to_forward_slashes(relative);
    format!(
        "{}/{}",
        directory.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Collapse `.` and `..` segments and duplicate slashes
///
/// # Examples
///
/// ```
/// use satchel::asset::path::normalize;
///
/// assert_eq!(normalize("~/scripts/./lib/../app.js"), "~/scripts/app.js");
/// assert_eq!(normalize("~\\styles\\site.css"), "~/styles/site.css");
/// ```
pub fn normalize(path: &str) -> String {
    let path = to_forward_slashes(path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." && last != "~" => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Make a configured path application relative: `scripts` and `/scripts` become `~/scripts`
pub fn app_relative(path: &str) -> String {
    let path = to_forward_slashes(path.trim());
    let rooted = if path == "~" || path.starts_with("~/") {
        path
    } else {
        format!("~/{}", path.trim_start_matches('/'))
    };
    normalize(&rooted)
}

/// Resolve a reference target written in an asset against that asset's directory.
///
/// Rooted targets (`~/...`, `/...`) are used as they are, with `/` rewritten
/// to `~/`; anything else is combined with `directory`. The result is always
/// normalized.
pub fn resolve(directory: &str, target: &str) -> String {
    let target = to_forward_slashes(target);
    if target.starts_with('~') {
        normalize(&target)
    } else if target.starts_with('/') {
        normalize(&format!("~{target}"))
    } else {
        normalize(&combine(directory, &target))
    }
}

/// The directory part of an application-relative path
pub fn directory_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((directory, _)) if !directory.is_empty() => directory,
        _ => "~",
    }
}

/// Case-insensitive path comparison
pub fn same_path(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

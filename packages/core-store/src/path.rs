//! Bucket path normalization.
//!
//! A bucket is identified by the normalized form of a filesystem path. Any two
//! spellings that clean to the same string address the same bucket, so
//! `"x"`, `"/x"`, `"./x"`, `"x//"` and `"y/../x"` are one bucket.

/// Separator used in normalized bucket paths.
pub const SEPARATOR: char = '/';

fn is_separator(c: char) -> bool {
    c == SEPARATOR || c == std::path::MAIN_SEPARATOR
}

/// Normalize a bucket path.
///
/// Resolves `.` and `..` lexically the way a filesystem path cleaner does,
/// collapses repeated separators and strips leading and trailing separators.
/// The root path normalizes to `""`.
///
/// `..` above the root of an absolute path is dropped; `..` at the start of a
/// relative path is kept, so `"../x"` stays `"../x"`.
///
/// # Examples
///
/// ```rust
/// use metafile_core_store::normalize;
///
/// assert_eq!(normalize("/./x//"), "x");
/// assert_eq!(normalize("y/../x"), "x");
/// assert_eq!(normalize("/"), "");
/// ```
pub fn normalize(path: &str) -> String {
    let rooted = path.starts_with(is_separator);
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    joined.trim_matches(&['/', '\\'][..]).to_string()
}

/// Check whether `child` lies strictly below `parent`.
///
/// Both paths must already be normalized. The match is on whole path
/// segments: `"foo/bar"` is below `"foo"` but `"foobar"` is not. Every
/// non-root bucket is below the root bucket `""`.
pub fn is_descendant(child: &str, parent: &str) -> bool {
    if parent.is_empty() {
        return !child.is_empty();
    }
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Re-root `child` from under `from` to the same relative place under `to`.
///
/// Returns `None` if `child` is neither `from` nor one of its descendants.
pub fn rebase(child: &str, from: &str, to: &str) -> Option<String> {
    if child == from {
        return Some(to.to_string());
    }
    if !is_descendant(child, from) {
        return None;
    }
    let suffix = if from.is_empty() {
        child
    } else {
        &child[from.len() + 1..]
    };
    if to.is_empty() {
        Some(suffix.to_string())
    } else {
        Some(format!("{to}{SEPARATOR}{suffix}"))
    }
}

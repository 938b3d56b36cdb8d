//! Helper functions.

/// Checks if the given target represents plain text.
///
/// # Examples
///
/// ```
/// use x11_selection_rs::utils::is_text;
///
/// assert!(is_text("UTF8_STRING"));
/// assert!(is_text("text/plain;charset=utf-8"));
/// assert!(!is_text("image/png"));
/// ```
pub fn is_text(target: &str) -> bool {
    match target {
        "TEXT" | "STRING" | "UTF8_STRING" | "COMPOUND_TEXT" => true,
        x if x.starts_with("text/") => true,
        _ => false,
    }
}

/// Checks if the given target is part of the selection protocol itself rather than a data
/// format.
///
/// Owners usually list these among their targets, but converting to them either describes the
/// selection (`TARGETS`, `TIMESTAMP`) or has side effects (`DELETE`, `SAVE_TARGETS`).
///
/// # Examples
///
/// ```
/// use x11_selection_rs::utils::is_meta_target;
///
/// assert!(is_meta_target("TARGETS"));
/// assert!(is_meta_target("SAVE_TARGETS"));
/// assert!(!is_meta_target("UTF8_STRING"));
/// ```
pub fn is_meta_target(target: &str) -> bool {
    matches!(
        target,
        "TARGETS"
            | "MULTIPLE"
            | "TIMESTAMP"
            | "TARGET_SIZES"
            | "SAVE_TARGETS"
            | "DELETE"
            | "INSERT_PROPERTY"
            | "INSERT_SELECTION"
            | "INCR"
    )
}

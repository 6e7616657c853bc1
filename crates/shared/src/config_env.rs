use std::env;

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    trimmed_non_empty(env::var(key).ok())
}

/// Returns the value of the first key in `keys` that resolves to a non-blank
/// value through `lookup`.
pub(crate) fn first_present_with<F>(keys: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| trimmed_non_empty(lookup(key)))
}

pub(crate) fn first_present_env(keys: &[&str]) -> Option<String> {
    first_present_with(keys, |key| env::var(key).ok())
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

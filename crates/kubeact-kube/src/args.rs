//! Argument vector helpers
//!
//! Each helper appends to the vector only when its input is present, so
//! processors can list every flag in order and let absent options vanish.

use std::future::Future;

use indexmap::IndexMap;

/// Append `flag value` when the value is present
pub fn push_with_value<T: ToString>(args: &mut Vec<String>, flag: &str, value: Option<T>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// Append `flag transform(value)` for every value
///
/// The transform is async because manifest values are resolved into temp
/// files before they can be passed on.
pub async fn push_multiple_with_value<T, F, Fut, E>(
    args: &mut Vec<String>,
    flag: &str,
    values: Option<&[T]>,
    mut transform: F,
) -> Result<(), E>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    for value in values.unwrap_or_default() {
        let value = transform(value).await?;
        args.push(flag.to_string());
        args.push(value);
    }
    Ok(())
}

/// Append a bare flag when set
pub fn push_without_value(args: &mut Vec<String>, flag: &str, present: bool) {
    if present {
        args.push(flag.to_string());
    }
}

/// Append `-l key=value` per label, in map order
pub fn push_labels(args: &mut Vec<String>, labels: Option<&IndexMap<String, String>>) {
    for (key, value) in labels.into_iter().flatten() {
        args.push("-l".to_string());
        args.push(format!("{}={}", key, value));
    }
}

/// Append raw extra arguments verbatim
pub fn push_extra(args: &mut Vec<String>, extra: Option<&[String]>) {
    args.extend(extra.unwrap_or_default().iter().cloned());
}

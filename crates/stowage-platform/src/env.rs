use std::borrow::Cow;
use std::env;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("variable pattern is valid")
});

/// Expand `$VAR` and `${VAR}` references from the process environment.
///
/// Undefined variables expand to the empty string, as in a POSIX shell. A `$`
/// that does not start a variable name is kept literally.
pub fn expand_env(input: &str) -> Cow<'_, str> {
    expand_with(input, |name| env::var(name).ok())
}

/// Same as [`expand_env`] with a caller-supplied lookup.
pub fn expand_with<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    VAR_PATTERN.replace_all(input, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        lookup(name).unwrap_or_default()
    })
}

use sonar_runner_types::{Logs, RunConfiguration};

/// Deprecated property names and their replacements.
pub const DEPRECATED_PROPERTIES: &[(&str, &str)] = &[
    ("sources", "sonar.sources"),
    ("tests", "sonar.tests"),
    ("binaries", "sonar.binaries"),
    ("libraries", "sonar.libraries"),
];

pub fn deprecation_warning(old: &str, new: &str) -> String {
    format!(
        "/!\\ The '{}' property is deprecated and is replaced by '{}'. Don't forget to update your files.",
        old, new
    )
}

/// Rewrite deprecated keys to their canonical names.
///
/// Every deprecated key present is removed and reported once. Its value is
/// carried over unless the canonical key is already set. Returns the
/// `(old, new)` pairs that were found.
pub fn translate_deprecated(
    config: &mut RunConfiguration,
    logs: &mut Logs,
) -> Vec<(&'static str, &'static str)> {
    let mut translated = Vec::new();

    for &(old, new) in DEPRECATED_PROPERTIES {
        let Some(value) = config.remove(old) else {
            continue;
        };

        logs.warn(deprecation_warning(old, new));
        if !config.contains_key(new) {
            config.insert(new, value);
        }
        translated.push((old, new));
    }

    translated
}

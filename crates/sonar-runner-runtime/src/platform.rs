use sonar_runner_types::{Logs, RunConfiguration, keys};

const FALLBACK_LOCALE: &str = "en_US";
const FALLBACK_ENCODING: &str = "UTF-8";

/// Locale variables in lookup order
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];

/// Default locale and character encoding of the machine running the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub locale: String,
    pub encoding: String,
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self {
            locale: FALLBACK_LOCALE.to_string(),
            encoding: FALLBACK_ENCODING.to_string(),
        }
    }
}

impl PlatformInfo {
    pub fn new(locale: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            encoding: encoding.into(),
        }
    }

    pub fn detect() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Detect from the first non-empty locale variable returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        LOCALE_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .map(|value| Self::parse_locale(&value))
            .unwrap_or_default()
    }

    /// Parse a POSIX locale name such as `de_DE.ISO-8859-1@euro`.
    fn parse_locale(raw: &str) -> Self {
        let without_modifier = raw.trim().split('@').next().unwrap_or_default();
        if matches!(without_modifier, "C" | "POSIX") {
            return Self::default();
        }

        match without_modifier.split_once('.') {
            Some((locale, encoding)) if !locale.is_empty() && !encoding.is_empty() => {
                Self::new(locale, encoding)
            }
            Some((locale, _)) if !locale.is_empty() => Self::new(locale, FALLBACK_ENCODING),
            None if !without_modifier.is_empty() => Self::new(without_modifier, FALLBACK_ENCODING),
            _ => Self::default(),
        }
    }

    /// Log the locale and the encoding the analysis will read sources with.
    pub fn log_notice(&self, configuration: &RunConfiguration, logs: &mut Logs) {
        match configuration.non_blank(keys::SOURCE_ENCODING) {
            Some(configured) => logs.always(format!(
                "Default locale: \"{}\", source code encoding: \"{}\"",
                self.locale, configured
            )),
            None => logs.always(format!(
                "Default locale: \"{}\", source code encoding: \"{}\" (analysis is platform dependent)",
                self.locale, self.encoding
            )),
        }
    }
}

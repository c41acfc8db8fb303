//! Locale identifiers and host language negotiation.

/// Normalize a host-reported locale identifier for matching.
///
/// - Trims whitespace.
/// - Converts `_` to `-` (POSIX and Android report `en_US`).
/// - Drops POSIX `.codeset` and `@modifier` suffixes (`de_DE.UTF-8@euro`).
pub fn normalize_locale(s: &str) -> String {
    let s = s.trim();
    let end = s.find(['.', '@']).unwrap_or(s.len());
    s[..end].replace('_', "-")
}

/// Primary language subtag: the text before the first `-`.
pub fn primary_subtag(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

/// Language preferences declared by the host environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LanguagePreferences {
    /// Ordered preference list, most preferred first.
    pub languages: Vec<String>,
    /// Primary UI language.
    pub language: Option<String>,
    /// Legacy single-value language setting.
    pub legacy: Option<String>,
}

impl LanguagePreferences {
    /// Candidates in priority order, empty entries skipped.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .map(String::as_str)
            .chain(self.language.as_deref())
            .chain(self.legacy.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Read-only access to the host's language signals.
pub trait LanguageSource: Send + Sync {
    /// `None` when no language signal is accessible at all.
    fn preferences(&self) -> Option<LanguagePreferences>;
}

/// Language preferences of the running operating system.
///
/// The preference list and primary language come from the OS locale APIs;
/// the legacy field is the `LANG` environment variable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLanguages;

impl LanguageSource for SystemLanguages {
    fn preferences(&self) -> Option<LanguagePreferences> {
        #[cfg(feature = "system-locale")]
        let (languages, language) = (
            sys_locale::get_locales().collect::<Vec<_>>(),
            sys_locale::get_locale(),
        );
        #[cfg(not(feature = "system-locale"))]
        let (languages, language) = (Vec::<String>::new(), None::<String>);

        let legacy = std::env::var("LANG").ok().filter(|s| !s.is_empty());

        if languages.is_empty() && language.is_none() && legacy.is_none() {
            return None;
        }
        Some(LanguagePreferences {
            languages,
            language,
            legacy,
        })
    }
}

/// A fixed set of preferences, for embedding hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticLanguages(Option<LanguagePreferences>);

impl StaticLanguages {
    /// A source that reports no language signal.
    pub fn none() -> Self {
        Self(None)
    }

    /// A source reporting only an ordered preference list.
    pub fn list<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(LanguagePreferences {
            languages: languages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }))
    }

    pub fn new(prefs: LanguagePreferences) -> Self {
        Self(Some(prefs))
    }
}

impl LanguageSource for StaticLanguages {
    fn preferences(&self) -> Option<LanguagePreferences> {
        self.0.clone()
    }
}

/// Pick the best entry of `available` for the operating system's language
/// preferences. See [`detect_locale_from`].
pub fn detect_locale<S: AsRef<str>>(available: &[S]) -> Option<String> {
    detect_locale_from(&SystemLanguages, available)
}

/// Pick the best entry of `available` for the preferences in `source`.
///
/// Candidates are tried in priority order. For each one, a case-insensitive
/// exact match wins first, then a match on its primary subtag (`de-DE`
/// matches an available `de`). The first candidate that matches either way
/// decides. The returned string keeps the casing used in `available`.
pub fn detect_locale_from<S: AsRef<str>>(
    source: &dyn LanguageSource,
    available: &[S],
) -> Option<String> {
    let prefs = source.preferences()?;
    // Both sides compare in normalized form, so `en_US` matches `en-US`.
    let lowered: Vec<String> = available
        .iter()
        .map(|l| normalize_locale(l.as_ref()).to_lowercase())
        .collect();

    for raw in prefs.candidates() {
        let candidate = normalize_locale(raw).to_lowercase();
        if candidate.is_empty() {
            continue;
        }

        if let Some(i) = lowered.iter().position(|l| *l == candidate) {
            return Some(available[i].as_ref().to_string());
        }

        let base = primary_subtag(&candidate);
        if let Some(i) = lowered.iter().position(|l| l == base) {
            return Some(available[i].as_ref().to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_posix_forms() {
        assert_eq!(normalize_locale(" en_US "), "en-US");
        assert_eq!(normalize_locale("de_DE.UTF-8"), "de-DE");
        assert_eq!(normalize_locale("ca_ES@valencia"), "ca-ES");
        assert_eq!(normalize_locale("fr"), "fr");
    }

    #[test]
    fn subtag_match_beats_later_exact_match() {
        let src = StaticLanguages::list(["de-DE", "en"]);
        assert_eq!(detect_locale_from(&src, &["en", "de"]), Some("de".to_string()));
    }

    #[test]
    fn exact_match_preferred_for_same_candidate() {
        let src = StaticLanguages::list(["pt-BR"]);
        assert_eq!(
            detect_locale_from(&src, &["pt", "pt-BR"]),
            Some("pt-BR".to_string())
        );
    }

    #[test]
    fn matching_ignores_case_and_keeps_available_casing() {
        let src = StaticLanguages::list(["EN-us"]);
        assert_eq!(
            detect_locale_from(&src, &["fr", "en-US"]),
            Some("en-US".to_string())
        );
    }

    #[test]
    fn underscore_locales_match_exactly() {
        let src = StaticLanguages::list(["en_US"]);
        assert_eq!(
            detect_locale_from(&src, &["en_US", "de"]),
            Some("en_US".to_string())
        );

        let src = StaticLanguages::list(["pt-BR"]);
        assert_eq!(
            detect_locale_from(&src, &["pt", "pt_BR"]),
            Some("pt_BR".to_string())
        );

        let src = StaticLanguages::list(["zh_Hant_TW"]);
        assert_eq!(
            detect_locale_from(&src, &["zh-Hant-TW"]),
            Some("zh-Hant-TW".to_string())
        );
    }

    #[test]
    fn falls_through_to_primary_and_legacy_fields() {
        let src = StaticLanguages::new(LanguagePreferences {
            languages: vec!["".into(), "ja".into()],
            language: Some("it-IT".into()),
            legacy: Some("es_ES.UTF-8".into()),
        });
        assert_eq!(detect_locale_from(&src, &["es"]), Some("es".to_string()));
        assert_eq!(detect_locale_from(&src, &["es", "it"]), Some("it".to_string()));
    }

    #[test]
    fn none_without_signal_or_match() {
        assert_eq!(detect_locale_from(&StaticLanguages::none(), &["en"]), None);
        let src = StaticLanguages::list(["ko-KR"]);
        assert_eq!(detect_locale_from(&src, &["en", "de"]), None);
        assert_eq!(detect_locale_from::<&str>(&src, &[]), None);
    }
}

//! Static UI strings per language, backed by `locales/*.yml`.

use rust_i18n::t;

/// Language codes offered when the dataset has not announced any.
pub const BUILTIN_LANGUAGES: &[&str] = &["PT", "ES", "EN"];

/// Map a dataset language code to a locale file. Codes without their own
/// table (sign-language variants included) use Portuguese.
pub fn locale_for(lang: &str) -> &'static str {
    match lang {
        "ES" => "es",
        "EN" => "en",
        _ => "pt",
    }
}

/// A snapshot of every label for one language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    pub samu: String,
    pub back: String,
    pub title_cat: String,
    pub choose: String,
    pub btn_location: String,
    pub select_lang: String,
    pub library: String,
    pub protocol: String,
    pub metronome: String,
    pub btn_metronome: String,
    pub metronome_stop: String,
    pub pause: String,
    pub resume: String,
    pub searching: String,
    pub language_changed: String,
    pub loading: String,
    pub load_error: String,
    pub video: String,
    pub no_items: String,
    pub gps_denied: String,
    pub gps_unavailable: String,
    pub gps_timeout: String,
    pub gps_error: String,
    pub gps_unsupported: String,
    pub hint_select: String,
    pub hint_back: String,
    pub hint_language: String,
    pub hint_location: String,
    pub hint_voice: String,
    pub hint_metronome: String,
    pub hint_retry: String,
    pub hint_quit: String,
}

impl Labels {
    pub fn for_language(lang: &str) -> Self {
        let locale = locale_for(lang);
        let get = |key: &str| t!(key, locale = locale).to_string();
        Self {
            samu: get("samu"),
            back: get("back"),
            title_cat: get("title_cat"),
            choose: get("choose"),
            btn_location: get("btn_location"),
            select_lang: get("select_lang"),
            library: get("library"),
            protocol: get("protocol"),
            metronome: get("metronome"),
            btn_metronome: get("btn_metronome"),
            metronome_stop: get("metronome_stop"),
            pause: get("pause"),
            resume: get("resume"),
            searching: get("searching"),
            language_changed: get("language_changed"),
            loading: get("loading"),
            load_error: get("load_error"),
            video: get("video"),
            no_items: get("no_items"),
            gps_denied: get("gps_denied"),
            gps_unavailable: get("gps_unavailable"),
            gps_timeout: get("gps_timeout"),
            gps_error: get("gps_error"),
            gps_unsupported: get("gps_unsupported"),
            hint_select: get("hint_select"),
            hint_back: get("hint_back"),
            hint_language: get("hint_language"),
            hint_location: get("hint_location"),
            hint_voice: get("hint_voice"),
            hint_metronome: get("hint_metronome"),
            hint_retry: get("hint_retry"),
            hint_quit: get("hint_quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_per_language() {
        assert_eq!(Labels::for_language("PT").language_changed, "Idioma alterado");
        assert_eq!(Labels::for_language("ES").language_changed, "Idioma cambiado");
        assert_eq!(Labels::for_language("EN").language_changed, "Language changed");
    }

    #[test]
    fn test_unknown_language_falls_back_to_portuguese() {
        assert_eq!(Labels::for_language("LIBRAS"), Labels::for_language("PT"));
        assert_eq!(Labels::for_language(""), Labels::for_language("PT"));
    }
}

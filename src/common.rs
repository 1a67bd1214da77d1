use crate::poll::loose_eq;
use log::debug;
use serde_json::Value;

/// Interface languages as (abbreviation, display name).
pub const LANGUAGES: [(&str, &str); 47] = [
    ("af", "Afrikaans"),
    ("sq", "Albanian - Shqip"),
    ("ar", "Arabic - العربية"),
    ("be", "Belarusian - беларуская"),
    ("bn", "Bengali - বাংলা"),
    ("bs", "Bosnian - Bosanski"),
    ("bg", "Bulgarian - български"),
    ("zh", "Chinese - 中文"),
    ("hr", "Croatian - Hrvatski"),
    ("cs", "Czech - čeština"),
    ("da", "Danish - Dansk"),
    ("nl", "Dutch - Nederlands"),
    ("en", "English"),
    ("eo", "Esperanto - Esperanto"),
    ("et", "Estonian - Eesti"),
    ("fi", "Finnish - Suomi"),
    ("fr", "French - Français"),
    ("de", "German - Deutsch"),
    ("ds", "German (Switzerland) - Deutsch (Schweiz)"),
    ("el", "Greek - Ελληνικά"),
    ("hu", "Hungarian - Magyar"),
    ("is", "Icelandic - íslenska"),
    ("id", "Indonesian - Indonesia"),
    ("it", "Italian - Italiano"),
    ("ja", "Japanese - 日本語"),
    ("ko", "Korean - 한국어"),
    ("la", "Latin"),
    ("lt", "Lithuanian - Lietuvių"),
    ("mk", "Macedonian - македонски"),
    ("mt", "Maltese - Malti"),
    ("ne", "Nepali - नेपाली"),
    ("no", "Norwegian - Norsk"),
    ("pl", "Polish - Polski"),
    ("pt", "Portuguese - Português"),
    ("pa", "Punjabi - ਪੰਜਾਬੀ"),
    ("ro", "Romanian - Română"),
    ("ru", "Russian - Pусский"),
    ("sk", "Slovak - Slovenčina"),
    ("sl", "Slovenian - Slovenščina"),
    ("so", "Somali - Soomaali"),
    ("es", "Spanish - Español"),
    ("sv", "Swedish - Svenska"),
    ("th", "Thai - ไทย"),
    ("tr", "Turkish - Türkçe"),
    ("uk", "Ukrainian - Yкраїнська"),
    ("vi", "Vietnamese - Tiếng Việt"),
    ("fy", "Western Frisian"),
];

/// Position of a language in [`LANGUAGES`].
pub fn language_index(abbreviation: &str) -> Option<usize> {
    LANGUAGES
        .iter()
        .position(|(abbr, _)| *abbr == abbreviation)
}

pub fn language_name(abbreviation: &str) -> Option<&'static str> {
    language_index(abbreviation).map(|index| LANGUAGES[index].1)
}

/// Text after the last point of `filename`.
pub fn file_extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, extension)| extension)
}

/// Index of the first item matching `id`.
///
/// With `id_key` the items are objects compared by their `id` member, otherwise the
/// items themselves are compared. Ids compare coercively, so `"3"` finds `3`.
pub fn index_from_id(items: &[Value], id: &Value, id_key: bool) -> Option<usize> {
    let index = items.iter().position(|item| {
        let candidate = if id_key { item.get("id") } else { Some(item) };
        loose_eq(candidate, id)
    });

    if index.is_none() {
        debug!("no item with id {id}");
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn languages_by_abbreviation() {
        assert_eq!(language_index("af"), Some(0));
        assert_eq!(language_name("nl"), Some("Dutch - Nederlands"));
        assert_eq!(language_name("fy"), Some("Western Frisian"));
        assert_eq!(language_index("xx"), None);
    }

    #[test]
    fn abbreviations_are_unique() {
        for (index, (abbr, _)) in LANGUAGES.iter().enumerate() {
            assert_eq!(language_index(abbr), Some(index), "{abbr}");
        }
    }

    #[test]
    fn file_extension_takes_last_part() {
        assert_eq!(file_extension("firmware.bin"), Some("bin"));
        assert_eq!(file_extension("backup.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
    }

    mod index_from_id {
        use super::*;

        #[test]
        fn finds_object_by_id_member() {
            let items = vec![json!({"id": 1, "name": "kitchen"}), json!({"id": 2, "name": "hall"})];

            assert_eq!(index_from_id(&items, &json!(2), true), Some(1));
            assert_eq!(index_from_id(&items, &json!("1"), true), Some(0));
            assert_eq!(index_from_id(&items, &json!(3), true), None);
        }

        #[test]
        fn compares_plain_items() {
            let items = vec![json!(4), json!(8), json!(15)];

            assert_eq!(index_from_id(&items, &json!(8), false), Some(1));
            assert_eq!(index_from_id(&items, &json!("15"), false), Some(2));
        }

        #[test]
        fn items_without_id_never_match() {
            let items = vec![json!({"name": "kitchen"})];
            assert_eq!(index_from_id(&items, &json!(1), true), None);
        }
    }
}

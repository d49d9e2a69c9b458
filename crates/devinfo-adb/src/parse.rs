use std::collections::HashMap;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

/// `versionName=` value from `dumpsys package <pkg>` output.
pub(crate) fn parse_dumpsys_version_name(output: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("versionName="))
        .map(str::trim)
        .find(|value| !value.is_empty() && *value != "null")
        .map(str::to_string)
}

/// Value printed by `settings get`, which reports unset keys as `null`.
pub(crate) fn parse_settings_value(output: &str) -> Option<String> {
    let value = output.trim();
    if value.is_empty() || value == "null" {
        None
    } else {
        Some(value.to_string())
    }
}

/// String and boolean entries of an Android SharedPreferences XML file.
#[derive(Debug, Default)]
pub(crate) struct SharedPrefs {
    strings: HashMap<String, String>,
    booleans: HashMap<String, bool>,
}

impl SharedPrefs {
    /// `None` unless `xml` is a well-formed `<map>` document, so shell error
    /// text such as `Permission denied` is rejected.
    pub(crate) fn parse(xml: &str) -> Option<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut prefs = SharedPrefs::default();
        let mut saw_map = false;
        let mut open_string: Option<(String, String)> = None;
        loop {
            match reader.read_event().ok()? {
                Event::Start(tag) => match tag.name().as_ref() {
                    b"map" => saw_map = true,
                    b"string" => {
                        open_string = attribute(&tag, "name").map(|name| (name, String::new()))
                    }
                    _ => {}
                },
                Event::Empty(tag) => match tag.name().as_ref() {
                    b"map" => saw_map = true,
                    b"boolean" => {
                        let name = attribute(&tag, "name");
                        let value = attribute(&tag, "value");
                        if let (Some(name), Some(value)) = (name, value) {
                            match value.as_str() {
                                "true" => prefs.booleans.insert(name, true),
                                "false" => prefs.booleans.insert(name, false),
                                _ => None,
                            };
                        }
                    }
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some((_, value)) = open_string.as_mut() {
                        value.push_str(&text.unescape().ok()?);
                    }
                }
                Event::End(tag) if tag.name().as_ref() == b"string" => {
                    if let Some((name, value)) = open_string.take() {
                        prefs.strings.insert(name, value.trim().to_string());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        saw_map.then_some(prefs)
    }

    /// Non-empty `<string name="...">` value.
    pub(crate) fn string(&self, name: &str) -> Option<&str> {
        self.strings
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// `<boolean name="..." value="..." />` value.
    pub(crate) fn boolean(&self, name: &str) -> Option<bool> {
        self.booleans.get(name).copied()
    }
}

fn attribute(tag: &BytesStart<'_>, key: &str) -> Option<String> {
    let attr = tag.try_get_attribute(key).ok()??;
    attr.unescape_value().ok().map(|value| value.into_owned())
}

/// Converts a BCP-47 tag (`en-US`, `zh-Hans-CN`) into the canonical
/// `language_COUNTRY[_variant][_#Script]` form Android apps report.
pub(crate) fn bcp47_to_locale(tag: &str) -> Option<String> {
    let mut parts = tag.trim().split(['-', '_']).filter(|part| !part.is_empty());
    let language = parts.next()?.to_ascii_lowercase();

    let mut script = None;
    let mut region = None;
    let mut variants = Vec::new();
    for part in parts {
        // Extensions and private use start with a single-character singleton.
        if part.len() == 1 {
            break;
        }
        let alpha = part.chars().all(|c| c.is_ascii_alphabetic());
        let digits = part.chars().all(|c| c.is_ascii_digit());
        if script.is_none() && region.is_none() && variants.is_empty() && alpha && part.len() == 4
        {
            let mut chars = part.chars();
            let first = chars.next().map(|c| c.to_ascii_uppercase());
            script = first.map(|c| format!("{c}{}", chars.as_str().to_ascii_lowercase()));
        } else if region.is_none()
            && variants.is_empty()
            && ((alpha && part.len() == 2) || (digits && part.len() == 3))
        {
            region = Some(part.to_ascii_uppercase());
        } else {
            variants.push(part.to_string());
        }
    }

    let mut out = language;
    if region.is_some() || !variants.is_empty() || script.is_some() {
        out.push('_');
        out.push_str(region.as_deref().unwrap_or(""));
    }
    if !variants.is_empty() {
        out.push('_');
        out.push_str(&variants.join("_"));
    }
    if let Some(script) = script {
        out.push_str("_#");
        out.push_str(&script);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADID_PREFS: &str = r#"<?xml version='1.0' encoding='utf-8' standalone='yes' ?>
<map>
    <string name="adid_key">38400000-8cf0-11bd-b23e-10b96e40000d</string>
    <int name="adid_reset_count" value="0" />
    <boolean name="enable_limit_ad_tracking" value="true" />
</map>
"#;

    #[test]
    fn version_name_from_dumpsys() {
        let output = "Packages:\n  Package [com.example.demo] (1a2b3c):\n    versionCode=42 minSdk=24 targetSdk=34\n    versionName=1.4.2\n    splits=[base]\n";
        assert_eq!(parse_dumpsys_version_name(output), Some("1.4.2".into()));
        assert_eq!(parse_dumpsys_version_name("Unable to find package"), None);
        assert_eq!(parse_dumpsys_version_name("    versionName=null\n"), None);
    }

    #[test]
    fn settings_null_is_unset() {
        assert_eq!(parse_settings_value("9774d56d682e549c\n"), Some("9774d56d682e549c".into()));
        assert_eq!(parse_settings_value("null"), None);
        assert_eq!(parse_settings_value(""), None);
    }

    #[test]
    fn adid_prefs() {
        let prefs = SharedPrefs::parse(ADID_PREFS).unwrap();
        assert_eq!(
            prefs.string("adid_key"),
            Some("38400000-8cf0-11bd-b23e-10b96e40000d")
        );
        assert_eq!(prefs.boolean("enable_limit_ad_tracking"), Some(true));
        assert_eq!(prefs.string("missing"), None);
        assert_eq!(prefs.boolean("adid_reset_count"), None);
    }

    #[test]
    fn prefs_attribute_order_does_not_matter() {
        let xml = r#"<map><boolean value="false" name="enable_limit_ad_tracking" /></map>"#;
        let prefs = SharedPrefs::parse(xml).unwrap();
        assert_eq!(prefs.boolean("enable_limit_ad_tracking"), Some(false));
    }

    #[test]
    fn prefs_strings_are_unescaped() {
        let xml = r#"<map><string name="k">a&amp;b&#38;c</string><string name="empty" /></map>"#;
        let prefs = SharedPrefs::parse(xml).unwrap();
        assert_eq!(prefs.string("k"), Some("a&b&c"));
        assert_eq!(prefs.string("empty"), None);
    }

    #[test]
    fn shell_errors_are_not_prefs() {
        assert!(SharedPrefs::parse("su: not found").is_none());
        assert!(SharedPrefs::parse("").is_none());
        assert!(SharedPrefs::parse("<map><string name=\"k\">x</map>").is_none());
    }

    #[test]
    fn locale_tags() {
        assert_eq!(bcp47_to_locale("en-US"), Some("en_US".into()));
        assert_eq!(bcp47_to_locale("fr"), Some("fr".into()));
        assert_eq!(bcp47_to_locale("es-419"), Some("es_419".into()));
        assert_eq!(bcp47_to_locale("zh-Hans-CN"), Some("zh_CN_#Hans".into()));
        assert_eq!(bcp47_to_locale("sr-Latn"), Some("sr__#Latn".into()));
        assert_eq!(bcp47_to_locale("de-DE-u-fw-mon"), Some("de_DE".into()));
        assert_eq!(bcp47_to_locale(""), None);
    }
}

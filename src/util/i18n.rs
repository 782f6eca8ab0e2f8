use std::collections::HashMap;

use crate::error::Result;

const BUNDLED_TRANSLATIONS: &str = include_str!("../../assets/translations.yaml");

pub const DEFAULT_LOCALE: &str = "en";

/// 多语言文案，`locale -> key -> text`
#[derive(Debug, Default)]
pub struct Translations {
    locales: HashMap<String, HashMap<String, String>>,
}

impl Translations {
    /// 解析随程序打包的 `assets/translations.yaml`
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_TRANSLATIONS)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            locales: serde_yaml::from_str(content)?,
        })
    }

    /// 规范化语言代码：`es-MX` -> `es`，未知语言回退到 `en`
    pub fn resolve_locale<'a>(&self, locale: Option<&'a str>) -> &'a str {
        locale
            .and_then(|l| l.split(['-', '_']).next())
            .map(str::trim)
            .filter(|l| self.locales.contains_key(*l))
            .unwrap_or(DEFAULT_LOCALE)
    }

    /// 查找文案：指定语言 -> `en` -> key 本身
    pub fn get<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        self.locales
            .get(locale)
            .and_then(|m| m.get(key))
            .or_else(|| self.locales.get(DEFAULT_LOCALE).and_then(|m| m.get(key)))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// 查找文案并替换 `{name}` 形式的占位符
    pub fn render(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.get(locale, key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_lookup_and_fallback() {
        let t = Translations::bundled().expect("解析翻译文件失败");

        assert_eq!(t.get("es", "contact.success"), "Tu mensaje ha sido enviado.");
        assert_eq!(
            t.get("fr", "verification.subject"),
            t.get("en", "verification.subject"),
            "缺失的文案应回退到英文"
        );
        assert_eq!(t.get("de", "no.such.key"), "no.such.key");
    }

    #[test]
    fn test_resolve_locale() {
        let t = Translations::bundled().expect("解析翻译文件失败");

        assert_eq!(t.resolve_locale(Some("es-MX")), "es");
        assert_eq!(t.resolve_locale(Some("fr")), "fr");
        assert_eq!(t.resolve_locale(Some("de")), "en");
        assert_eq!(t.resolve_locale(None), "en");
    }

    #[test]
    fn test_render_placeholders() {
        let t = Translations::bundled().expect("解析翻译文件失败");
        assert_eq!(
            t.render("en", "contact.confirmation.greeting", &[("name", "Ada")]),
            "Hi Ada,"
        );
        assert!(t.render("en", "verification.body", &[("code", "123456")]).contains("123456"));
    }
}

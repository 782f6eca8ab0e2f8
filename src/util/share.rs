use reqwest::Url;
use serde::Serialize;

/// 文章的社交分享链接
#[derive(Debug, Clone, Serialize)]
pub struct ShareLinks {
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub reddit: String,
    pub whatsapp: String,
    pub email: String,
}

fn link(base: &str, params: &[(&str, &str)]) -> String {
    // base 均为常量，解析失败时退回原地址
    Url::parse_with_params(base, params)
        .map(String::from)
        .unwrap_or_else(|_| base.to_string())
}

impl ShareLinks {
    pub fn new(url: &str, title: &str) -> Self {
        let text = format!("{title} {url}");

        Self {
            twitter: link(
                "https://twitter.com/intent/tweet",
                &[("url", url), ("text", title)],
            ),
            facebook: link("https://www.facebook.com/sharer/sharer.php", &[("u", url)]),
            linkedin: link(
                "https://www.linkedin.com/sharing/share-offsite/",
                &[("url", url)],
            ),
            reddit: link(
                "https://www.reddit.com/submit",
                &[("url", url), ("title", title)],
            ),
            whatsapp: link("https://wa.me/", &[("text", text.as_str())]),
            // 邮件客户端不会把 `+` 解码为空格
            email: link("mailto:", &[("subject", title), ("body", url)]).replace('+', "%20"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_links_encode_params() {
        let links = ShareLinks::new("https://example.com/blog/a-b-1", "Tom & Jerry");

        assert_eq!(
            links.twitter,
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fexample.com%2Fblog%2Fa-b-1&text=Tom+%26+Jerry"
        );
        assert!(links.facebook.starts_with("https://www.facebook.com/sharer/sharer.php?u="));
        assert!(links.reddit.contains("title=Tom+%26+Jerry"));
        assert!(links.email.starts_with("mailto:?subject=Tom%20%26%20Jerry"));
    }
}

/// 阅读速度，单位：词/分钟
const WORDS_PER_MINUTE: usize = 200;
/// 摘要最大字符数
pub const EXCERPT_CHARS: usize = 160;

/// 估算阅读时间（分钟），至少 1 分钟
pub fn reading_time(content: &str) -> u32 {
    minutes_for_words(content.split_whitespace().count())
}

pub fn minutes_for_words(words: usize) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// 去掉 HTML 标签后的纯文本摘要
///
/// 连续空白合并为一个空格；超过 `max_chars` 时在词边界截断并追加 `...`。
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let mut plain = String::with_capacity(content.len().min(max_chars * 4));
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                plain.push(' ');
            }
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }

    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.chars().count() <= max_chars {
        return plain;
    }

    let cut: String = plain.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time(&"word ".repeat(200)), 1);
        assert_eq!(reading_time(&"word ".repeat(201)), 2);
        assert_eq!(reading_time(&"word ".repeat(1000)), 5);
    }

    #[test]
    fn test_excerpt_short_content_kept() {
        assert_eq!(excerpt("<p>Hello   <b>world</b></p>", 160), "Hello world");
    }

    #[test]
    fn test_excerpt_truncates_on_word_boundary() {
        let text = "one two three four five";
        assert_eq!(excerpt(text, 10), "one two...");
        assert!(excerpt(&"a".repeat(300), EXCERPT_CHARS).ends_with("..."));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}

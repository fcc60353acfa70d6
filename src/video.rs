//! Video identifier extraction for embedded procedure videos.

const ID_LEN: usize = 11;
const EMBED_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoEmbed {
    pub id: String,
}

impl VideoEmbed {
    pub fn from_url(url: Option<&str>) -> Option<Self> {
        youtube_id(url?).map(|id| Self { id })
    }

    pub fn embed_url(&self) -> String {
        format!("{EMBED_BASE}{}", self.id)
    }
}

/// Extract an 11-character video id from watch, short-link, `/v/`,
/// `/u/x/` and embed URLs. The last marker in the URL wins; the id runs
/// up to the first `#`, `&` or `?`.
pub fn youtube_id(url: &str) -> Option<String> {
    let chars: Vec<char> = url.chars().collect();
    if chars.contains(&'\n') {
        return None;
    }
    let start = (0..=chars.len())
        .rev()
        .find_map(|pos| marker_len_at(&chars, pos).map(|len| pos + len))?;

    let id: String = chars[start..]
        .iter()
        .take_while(|c| !matches!(c, '#' | '&' | '?'))
        .collect();
    (id.chars().count() == ID_LEN).then_some(id)
}

/// Length of the first marker that matches at `pos`, in priority order.
fn marker_len_at(chars: &[char], pos: usize) -> Option<usize> {
    let rest = &chars[pos..];
    let literal = |pattern: &str| {
        let pat: Vec<char> = pattern.chars().collect();
        rest.starts_with(&pat).then_some(pat.len())
    };

    // "youtu" + any char + "be/"
    if rest.len() >= 9 && literal("youtu").is_some() && rest[6..9] == ['b', 'e', '/'] {
        return Some(9);
    }
    if let Some(len) = literal("v/") {
        return Some(len);
    }
    if rest.len() >= 4
        && rest[0] == 'u'
        && rest[1] == '/'
        && (rest[2].is_ascii_alphanumeric() || rest[2] == '_')
        && rest[3] == '/'
    {
        return Some(4);
    }
    literal("embed/")
        .or_else(|| literal("watch?v="))
        .or_else(|| literal("&v="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_watch_urls() {
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_embed_and_extra_params() {
        assert_eq!(
            youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ#t=10").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/v/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/user/u/1/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_malformed_urls_have_no_video() {
        assert_eq!(youtube_id(""), None);
        assert_eq!(youtube_id("https://example.com/video.mp4"), None);
        assert_eq!(youtube_id("https://youtu.be/short"), None);
        assert_eq!(youtube_id("https://youtu.be/dQw4w9WgXcQextra"), None);
        assert_eq!(VideoEmbed::from_url(None), None);
    }

    #[test]
    fn test_embed_url() {
        let embed = VideoEmbed::from_url(Some("https://youtu.be/dQw4w9WgXcQ")).unwrap();
        assert_eq!(embed.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
    }
}

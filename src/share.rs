use crate::gamification::UserProgress;

pub const SHARE_URL: &str = "https://chargesense.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    /// Copy to the clipboard; desktop stand-in for a share sheet.
    Native,
    Twitter,
    Facebook,
}

impl SharePlatform {
    pub fn label(&self) -> &'static str {
        match self {
            SharePlatform::Native => "Share",
            SharePlatform::Twitter => "Twitter",
            SharePlatform::Facebook => "Facebook",
        }
    }
}

pub fn share_text(progress: &UserProgress) -> String {
    format!(
        "I've reduced {}g of CO₂ and maintained a {}-day streak! 🌿 #ChargeSense #CarbonFootprint",
        progress.total_carbon_reduced, progress.current_streak
    )
}

/// Text placed on the clipboard for a native share.
pub fn clipboard_text(progress: &UserProgress) -> String {
    format!("{}\n{}", share_text(progress), SHARE_URL)
}

/// Web intent URL, or `None` for the native share.
pub fn share_url(platform: SharePlatform, progress: &UserProgress) -> Option<String> {
    match platform {
        SharePlatform::Native => None,
        SharePlatform::Twitter => Some(format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            encode_uri_component(&share_text(progress)),
            encode_uri_component(SHARE_URL)
        )),
        SharePlatform::Facebook => Some(format!(
            "https://www.facebook.com/sharer/sharer.php?u={}",
            encode_uri_component(SHARE_URL)
        )),
    }
}

/// Open the intent in the default browser. Failures are logged only.
pub fn open(url: &str) {
    match webbrowser::open(url) {
        Ok(()) => tracing::info!("Opened share link"),
        Err(e) => tracing::warn!("Failed to open share link: {e}"),
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::generate_user_progress;

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text(&generate_user_progress()),
            "I've reduced 450g of CO₂ and maintained a 7-day streak! 🌿 #ChargeSense #CarbonFootprint"
        );
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_uri_component("https://x.y"), "https%3A%2F%2Fx.y");
        assert_eq!(encode_uri_component("CO₂"), "CO%E2%82%82");
        assert_eq!(encode_uri_component("I've (ok)!"), "I've%20(ok)!");
    }

    #[test]
    fn test_share_urls() {
        let progress = generate_user_progress();
        assert_eq!(share_url(SharePlatform::Native, &progress), None);
        assert_eq!(
            share_url(SharePlatform::Facebook, &progress).unwrap(),
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fchargesense.app"
        );
        let twitter = share_url(SharePlatform::Twitter, &progress).unwrap();
        assert!(twitter.starts_with("https://twitter.com/intent/tweet?text=I've%20reduced%20450g"));
        assert!(twitter.ends_with("&url=https%3A%2F%2Fchargesense.app"));
    }
}

//! Outbound text shaping for news posts

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Platform limit on post length, in characters
pub const MAX_POST_CHARS: usize = 280;

const NEWS_PREFIX: &str = "📰 ";

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[A-Z]{3,5}\b").expect("ticker pattern is valid"))
}

/// Prefix every standalone 3-5 letter uppercase token with `marker`
/// (`BTC` -> `$BTC`). Every such token is treated as a ticker; ordinary
/// acronyms are not told apart. Tokens already carrying the marker are left
/// alone so re-marking is a no-op.
pub fn mark_tickers(text: &str, marker: char) -> String {
    ticker_pattern()
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            let already_marked = caps
                .get(0)
                .map(|m| text[..m.start()].ends_with(marker))
                .unwrap_or(false);
            if already_marked {
                token.to_string()
            } else {
                format!("{marker}{token}")
            }
        })
        .into_owned()
}

/// Wrap marked headline text into the outbound post format, truncating the
/// headline so the whole post fits the platform limit.
pub fn compose_news_post(marked_text: &str) -> String {
    let headline = marked_text.trim();
    // prefix + trailing newline
    let budget = MAX_POST_CHARS - NEWS_PREFIX.chars().count() - 1;

    let headline = if headline.chars().count() > budget {
        let mut cut: String = headline.chars().take(budget - 1).collect();
        cut.push('…');
        cut
    } else {
        headline.to_string()
    };

    format!("{NEWS_PREFIX}{headline}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_ticker_like_tokens() {
        assert_eq!(
            mark_tickers("BTC supera nuevo máximo mientras ETH cae", '$'),
            "$BTC supera nuevo máximo mientras $ETH cae"
        );
        assert_eq!(mark_tickers("DOGE y SHIBA suben", '$'), "$DOGE y $SHIBA suben");
    }

    #[test]
    fn test_length_bounds() {
        // 2 letters and 6 letters are outside the ticker range
        assert_eq!(mark_tickers("EU y BITCOIN", '$'), "EU y BITCOIN");
        assert_eq!(mark_tickers("SOL", '$'), "$SOL");
        assert_eq!(mark_tickers("USDCX", '$'), "$USDCX");
    }

    #[test]
    fn test_requires_whole_uppercase_token() {
        assert_eq!(mark_tickers("Bitcoin BTCs btc", '$'), "Bitcoin BTCs btc");
        assert_eq!(mark_tickers("BTC2 ETH-USD", '$'), "BTC2 $ETH-$USD");
    }

    #[test]
    fn test_common_acronyms_are_marked_too() {
        // No acronym disambiguation: SEC and ETF look like tickers
        assert_eq!(
            mark_tickers("La SEC aprueba el ETF", '$'),
            "La $SEC aprueba el $ETF"
        );
    }

    #[test]
    fn test_accented_words_are_not_split() {
        // Word boundaries are Unicode-aware, so no partial match inside ÉXITO
        assert_eq!(mark_tickers("ÉXITO total", '$'), "ÉXITO total");
    }

    #[test]
    fn test_marking_is_idempotent() {
        let once = mark_tickers("BTC y ETH", '$');
        assert_eq!(mark_tickers(&once, '$'), once);
        assert_eq!(mark_tickers("$BTC sube", '$'), "$BTC sube");
    }

    #[test]
    fn test_custom_marker() {
        assert_eq!(mark_tickers("XRP gana", '#'), "#XRP gana");
    }

    #[test]
    fn test_compose_news_post_format() {
        assert_eq!(compose_news_post("$BTC alcanza un nuevo máximo"), "📰 $BTC alcanza un nuevo máximo\n");
        assert_eq!(compose_news_post("  spaced  "), "📰 spaced\n");
    }

    #[test]
    fn test_compose_truncates_long_headlines() {
        let long = "a".repeat(400);
        let post = compose_news_post(&long);
        assert_eq!(post.chars().count(), MAX_POST_CHARS);
        assert!(post.ends_with("…\n"));
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SearchEngine {
    pub(crate) name: String,
    pub(crate) base_url: String,
}

impl SearchEngine {
    pub(crate) fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

pub(crate) fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine::new("DuckDuckGo", "https://duckduckgo.com/?q="),
        SearchEngine::new("Google", "https://www.google.com/search?q="),
        SearchEngine::new("Wikipedia", "https://en.wikipedia.org/w/index.php?search="),
    ]
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_host_char(c: char) -> bool {
    is_word(c) || c == '-' || c == '.'
}

fn is_path_char(c: char) -> bool {
    is_host_char(c) || "~:/?#[]@!$&'()*+,;=%".contains(c)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// `[http[s]://][www.]host.tld[/path]` where the TLD has at least two word
/// characters. Anything with spaces is a query.
pub(crate) fn looks_like_url(text: &str) -> bool {
    let rest = strip_prefix_ci(text, "https://")
        .or_else(|| strip_prefix_ci(text, "http://"))
        .unwrap_or(text);

    let (host, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };

    if !host.chars().all(is_host_char) {
        return false;
    }
    let Some(dot) = host.rfind('.') else {
        return false;
    };
    let (name, tld) = (&host[..dot], &host[dot + 1..]);
    if name.is_empty() || tld.len() < 2 || !tld.chars().all(is_word) {
        return false;
    }

    path.chars().all(is_path_char)
}

/// Same output as JavaScript's `encodeURIComponent`.
pub(crate) fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in text.bytes() {
        let keep = b.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&b);
        if keep {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Where a submitted query should go, if anywhere.
pub(crate) fn resolve(query: &str, engine: &SearchEngine) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if looks_like_url(query) {
        if query.starts_with("http") {
            Some(query.to_string())
        } else {
            Some(format!("https://{}", query))
        }
    } else {
        Some(format!("{}{}", engine.base_url, percent_encode(query)))
    }
}

pub(crate) struct SearchBar {
    engines: Vec<SearchEngine>,
    active: usize,
    input: String,
}

impl SearchBar {
    pub(crate) fn new(engines: Vec<SearchEngine>, active: usize) -> Self {
        let engines = if engines.is_empty() {
            default_engines()
        } else {
            engines
        };
        let active = active.min(engines.len() - 1);
        Self {
            engines,
            active,
            input: String::new(),
        }
    }

    pub(crate) fn engine(&self) -> &SearchEngine {
        &self.engines[self.active]
    }

    pub(crate) fn active(&self) -> usize {
        self.active
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn push(&mut self, ch: char) {
        const INPUT_MAX: usize = 512;
        if self.input.chars().count() < INPUT_MAX {
            self.input.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.input.clear();
    }

    pub(crate) fn cycle_engine(&mut self, delta: i32) {
        let len = self.engines.len() as i32;
        self.active = (self.active as i32 + delta).rem_euclid(len) as usize;
    }

    /// Consumes the typed text and returns the URL to open.
    pub(crate) fn submit(&mut self) -> Option<String> {
        let query = std::mem::take(&mut self.input);
        resolve(&query, self.engine())
    }
}

/// Hands `url` to the desktop's default browser.
pub(crate) fn open_url(url: &str) -> Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not launch a browser for {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddg() -> SearchEngine {
        SearchEngine::new("ddg", "https://duckduckgo.com/?q=")
    }

    #[test]
    fn url_detection() {
        for yes in [
            "example.com",
            "www.example.com",
            "https://example.com",
            "HTTP://Example.COM/path?x=1&y=2#frag",
            "sub.domain-name.co.uk/a/b~c",
            "github.com/rust-lang/rust/issues",
        ] {
            assert!(looks_like_url(yes), "{yes} should be a url");
        }
        for no in [
            "hello world",
            "rust",
            "example.c",
            ".com",
            "example.com/has space",
            "ftp://example.com",
            "what is 2.5",
            "example.com\\path",
        ] {
            assert!(!looks_like_url(no), "{no} should be a query");
        }
    }

    #[test]
    fn percent_encoding_matches_uri_component() {
        assert_eq!(percent_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(percent_encode("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(percent_encode("č/?#"), "%C4%8D%2F%3F%23");
    }

    #[test]
    fn resolve_dispatches_urls_and_queries() {
        let e = ddg();
        assert_eq!(resolve("   ", &e), None);
        assert_eq!(
            resolve("example.com", &e).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            resolve("http://example.com/x", &e).as_deref(),
            Some("http://example.com/x")
        );
        assert_eq!(
            resolve("  rust borrow checker ", &e).as_deref(),
            Some("https://duckduckgo.com/?q=rust%20borrow%20checker")
        );
    }

    #[test]
    fn search_bar_edits_and_cycles() {
        let mut bar = SearchBar::new(default_engines(), 9);
        assert_eq!(bar.engine().name, "Wikipedia");
        assert_eq!(bar.active(), 2);
        bar.cycle_engine(1);
        assert_eq!(bar.engine().name, "DuckDuckGo");
        assert_eq!(bar.active(), 0);
        bar.cycle_engine(-1);
        assert_eq!(bar.engine().name, "Wikipedia");

        for ch in "rustt".chars() {
            bar.push(ch);
        }
        bar.backspace();
        assert_eq!(bar.input(), "rust");
        let url = bar.submit();
        assert_eq!(
            url.as_deref(),
            Some("https://en.wikipedia.org/w/index.php?search=rust")
        );
        assert_eq!(bar.input(), "");
        assert_eq!(bar.submit(), None);
    }

    #[test]
    fn empty_engine_list_falls_back_to_defaults() {
        let bar = SearchBar::new(Vec::new(), 0);
        assert_eq!(bar.engine(), &default_engines()[0]);
    }
}

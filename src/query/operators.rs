//! Search operator compiler
//!
//! Maps operator requests onto the backend's query syntax. Every function is
//! total: odd input produces a syntactically valid (if meaningless) fragment,
//! input quality is the analyzer's job.

use serde::{Deserialize, Serialize};

/// Where a content-scoped operator should look for the text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentFocus {
    Title,
    Url,
    Text,
}

impl ContentFocus {
    /// Operator keyword for this focus
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "intitle",
            Self::Url => "inurl",
            Self::Text => "intext",
        }
    }

    /// Wrap `text` in the scoped operator for this focus
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Title => intitle(text),
            Self::Url => inurl(text),
            Self::Text => intext(text),
        }
    }
}

impl std::fmt::Display for ContentFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn exact_phrase(text: &str) -> String {
    format!("\"{}\"", text)
}

pub fn site_restrict(domain: &str) -> String {
    format!("site:{}", domain)
}

pub fn exclude_site(domain: &str) -> String {
    format!("-site:{}", domain)
}

pub fn filetype(ext: &str) -> String {
    format!("filetype:{}", ext)
}

pub fn intitle(text: &str) -> String {
    format!("intitle:\"{}\"", strip_quotes(text))
}

pub fn inurl(text: &str) -> String {
    format!("inurl:{}", strip_quotes(text))
}

pub fn intext(text: &str) -> String {
    format!("intext:\"{}\"", strip_quotes(text))
}

/// `"a" AROUND(n) "b"`
pub fn proximity(term_a: &str, term_b: &str, distance: u32) -> String {
    format!("\"{}\" AROUND({}) \"{}\"", term_a, distance, term_b)
}

pub fn date_after(date: &str) -> String {
    format!("after:{}", date)
}

pub fn date_before(date: &str) -> String {
    format!("before:{}", date)
}

pub fn exclude_term(term: &str) -> String {
    format!("-{}", term)
}

/// Parenthesized OR-group of quoted terms
pub fn or_group<S: AsRef<str>>(terms: &[S]) -> String {
    let quoted: Vec<String> = terms.iter().map(|t| exact_phrase(t.as_ref())).collect();
    format!("({})", quoted.join(" OR "))
}

fn strip_quotes(text: &str) -> String {
    text.replace('"', "")
}

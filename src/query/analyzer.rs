//! Request analysis
//!
//! Pattern-based extraction of entities, proximity hints, restriction
//! directives and content focus from a free-form research request. Extraction
//! is an ordered list of independent rules ([`RULES`]); a later rule may
//! override what an earlier one set, so the order is part of the contract.

use super::operators::ContentFocus;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Distance used when a proximity keyword is present without an explicit one
pub const DEFAULT_PROXIMITY: u32 = 3;

/// Keywords that ask for co-located entities (substring match, lowercase)
const PROXIMITY_KEYWORDS: &[&str] = &[
    "close",
    "together",
    "near",
    "mentioned together",
    "same paragraph",
    "same sentence",
];

/// Filetype keywords, checked in order; first hit wins
const FILETYPE_KEYWORDS: &[(&str, &str)] = &[
    ("pdf", "pdf"),
    ("document", "doc"),
    ("spreadsheet", "xls"),
];

const RUN_BREAKERS: &[char] = &[',', ';', ':', '.', '!', '?', ')'];
const SENTENCE_ENDS: &[char] = &['.', '!', '?'];

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

static DISTANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"within (\d+) words?").expect("valid regex"));

static SITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:on|in|from)\s+([\w.-]+\.\w+)").expect("valid regex"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(after|since|before|until)\s+(\d{4}(?:/\d{1,2}(?:/\d{1,2})?)?)")
        .expect("valid regex")
});

static EXCLUSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:but not|exclude|without|except)\s+(.*)$").expect("valid regex")
});

static EXCLUSION_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s]+").expect("valid regex"));

static CONTENT_FOCUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"in\s+(title|url|text|paragraphs?)").expect("valid regex")
});

/// Restriction directives parsed out of a request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestrictionSet {
    pub site: Option<String>,
    pub exclude_sites: Vec<String>,
    pub filetype: Option<String>,
    pub date_after: Option<String>,
    pub date_before: Option<String>,
    pub exclude_terms: Vec<String>,
}

/// Everything the analyzer could extract from one request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestAnalysis {
    /// Candidate terms in first-appearance order, deduplicated
    pub entities: Vec<String>,
    /// Requested proximity distance between entities
    pub proximity: Option<u32>,
    pub restrictions: RestrictionSet,
    pub content_focus: Option<ContentFocus>,
}

impl RequestAnalysis {
    /// Add an entity unless it is a duplicate or a single character
    fn add_entity(&mut self, entity: &str) {
        if entity.trim().chars().count() <= 1 {
            return;
        }
        if !self.entities.iter().any(|e| e == entity) {
            self.entities.push(entity.to_string());
        }
    }
}

/// One named extraction step
pub struct ExtractionRule {
    pub name: &'static str,
    apply: fn(&str, &mut RequestAnalysis),
}

impl ExtractionRule {
    pub fn apply(&self, request: &str, analysis: &mut RequestAnalysis) {
        (self.apply)(request, analysis)
    }
}

/// Extraction rules in evaluation order
pub const RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "quoted_entities",
        apply: quoted_entities,
    },
    ExtractionRule {
        name: "capitalized_entities",
        apply: capitalized_entities,
    },
    ExtractionRule {
        name: "proximity_keywords",
        apply: proximity_keywords,
    },
    // Must run after proximity_keywords: an explicit distance always wins.
    ExtractionRule {
        name: "explicit_distance",
        apply: explicit_distance,
    },
    ExtractionRule {
        name: "site",
        apply: site,
    },
    ExtractionRule {
        name: "filetype",
        apply: filetype,
    },
    ExtractionRule {
        name: "date",
        apply: date,
    },
    ExtractionRule {
        name: "exclusions",
        apply: exclusions,
    },
    ExtractionRule {
        name: "content_focus",
        apply: content_focus,
    },
];

/// Run every rule over the request
pub fn analyze(request: &str) -> RequestAnalysis {
    let mut analysis = RequestAnalysis::default();
    for rule in RULES {
        rule.apply(request, &mut analysis);
    }
    analysis
}

fn quoted_entities(request: &str, analysis: &mut RequestAnalysis) {
    for cap in QUOTED_RE.captures_iter(request) {
        analysis.add_entity(&cap[1]);
    }
}

/// Maximal runs of capitalized words outside quoted spans. The first word of
/// a sentence never starts a run.
fn capitalized_entities(request: &str, analysis: &mut RequestAnalysis) {
    // Quoted spans become a break token so runs never cross them.
    let unquoted = QUOTED_RE.replace_all(request, " \" ");

    let mut runs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut sentence_start = true;

    for raw in unquoted.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let capitalized =
            !sentence_start && word.chars().next().map(char::is_uppercase).unwrap_or(false);

        if capitalized {
            current.push(word);
        } else if !current.is_empty() {
            runs.push(current.join(" "));
            current.clear();
        }

        // Punctuation after a word closes the run it belongs to.
        if raw.ends_with(RUN_BREAKERS) && !current.is_empty() {
            runs.push(current.join(" "));
            current.clear();
        }

        if !word.is_empty() || raw == "\"" {
            sentence_start = raw.ends_with(SENTENCE_ENDS);
        }
    }
    if !current.is_empty() {
        runs.push(current.join(" "));
    }

    for run in runs {
        analysis.add_entity(&run);
    }
}

fn proximity_keywords(request: &str, analysis: &mut RequestAnalysis) {
    let lower = request.to_lowercase();
    if PROXIMITY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        analysis.proximity = Some(DEFAULT_PROXIMITY);
    }
}

fn explicit_distance(request: &str, analysis: &mut RequestAnalysis) {
    let lower = request.to_lowercase();
    if let Some(distance) = DISTANCE_RE
        .captures(&lower)
        .and_then(|cap| cap[1].parse::<u32>().ok())
    {
        analysis.proximity = Some(distance);
    }
}

fn site(request: &str, analysis: &mut RequestAnalysis) {
    if let Some(cap) = SITE_RE.captures(request) {
        analysis.restrictions.site = Some(cap[1].to_string());
    }
}

fn filetype(request: &str, analysis: &mut RequestAnalysis) {
    let lower = request.to_lowercase();
    analysis.restrictions.filetype = FILETYPE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, ext)| ext.to_string());
}

fn date(request: &str, analysis: &mut RequestAnalysis) {
    let Some(cap) = DATE_RE.captures(request) else {
        return;
    };
    let date = cap[2].to_string();
    match &cap[1] {
        "after" | "since" => analysis.restrictions.date_after = Some(date),
        _ => analysis.restrictions.date_before = Some(date),
    }
}

fn exclusions(request: &str, analysis: &mut RequestAnalysis) {
    if let Some(cap) = EXCLUSION_RE.captures(request) {
        analysis.restrictions.exclude_terms = EXCLUSION_SPLIT_RE
            .split(cap[1].trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }
}

fn content_focus(request: &str, analysis: &mut RequestAnalysis) {
    let lower = request.to_lowercase();
    analysis.content_focus = CONTENT_FOCUS_RE
        .captures(&lower)
        .map(|cap| match &cap[1] {
            "title" => ContentFocus::Title,
            "url" => ContentFocus::Url,
            _ => ContentFocus::Text,
        });
}

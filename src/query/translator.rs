//! Request-to-query translation

use super::analyzer::{analyze, RequestAnalysis};
use super::operators;
use super::{CompiledQuery, Fragments, OperatorBreakdown, OperatorCategory};
use tracing::debug;

/// Longest request prefix kept in a query's purpose
const PURPOSE_MAX_CHARS: usize = 100;

/// Compiles research requests into backend queries
#[derive(Debug, Clone, Default)]
pub struct Translator {
    /// Append parsed `before:` dates to compiled queries
    include_date_before: bool,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether parsed "before/until" dates are appended to the query.
    /// Off by default: the date is extracted but not compiled.
    pub fn with_date_before(mut self, include: bool) -> Self {
        self.include_date_before = include;
        self
    }

    /// Translate a request, with optional operator text supplied by the user
    pub fn translate(&self, request: &str, user_restrictions: Option<&str>) -> CompiledQuery {
        let request = request.trim();
        let analysis = analyze(request);
        self.compile(request, &analysis, user_restrictions)
    }

    /// The primary query plus, when the request names two or more entities,
    /// an exact-phrase and an OR-group alternative
    pub fn create_variations(
        &self,
        request: &str,
        user_restrictions: Option<&str>,
    ) -> Vec<CompiledQuery> {
        let request = request.trim();
        let analysis = analyze(request);
        let mut variations = vec![self.compile(request, &analysis, user_restrictions)];

        let entities = &analysis.entities;
        if entities.len() < 2 {
            return variations;
        }

        let restrictions = normalize_restrictions(user_restrictions);

        let combined = entities.join(" ");
        let exact = operators::exact_phrase(&combined);
        let mut breakdown = OperatorBreakdown::new();
        breakdown.insert(OperatorCategory::ExactPhrase, Fragments::One(exact.clone()));
        variations.push(CompiledQuery {
            text: append_restrictions(exact, restrictions),
            purpose: format!("Exact phrase search: {}", combined),
            operator_breakdown: breakdown,
        });

        let or_terms: Vec<String> = entities.iter().map(|e| operators::exact_phrase(e)).collect();
        let mut breakdown = OperatorBreakdown::new();
        breakdown.insert(OperatorCategory::OrTerms, Fragments::Many(or_terms));
        variations.push(CompiledQuery {
            text: append_restrictions(operators::or_group(entities.as_slice()), restrictions),
            purpose: format!("Any of these entities: {}", entities.join(", ")),
            operator_breakdown: breakdown,
        });

        variations
    }

    fn compile(
        &self,
        request: &str,
        analysis: &RequestAnalysis,
        user_restrictions: Option<&str>,
    ) -> CompiledQuery {
        let mut parts: Vec<String> = Vec::new();
        let mut breakdown = OperatorBreakdown::new();
        let entities = &analysis.entities;

        // Query body: proximity chain, else one exact phrase per entity.
        match analysis.proximity {
            Some(distance) if entities.len() >= 2 => {
                let chain = proximity_chain(entities, distance);
                parts.push(chain.clone());
                breakdown.insert(OperatorCategory::Proximity, Fragments::One(chain));
            }
            _ if !entities.is_empty() => {
                let phrases: Vec<String> =
                    entities.iter().map(|e| operators::exact_phrase(e)).collect();
                parts.extend(phrases.iter().cloned());
                breakdown.insert(OperatorCategory::Entities, Fragments::Many(phrases));
            }
            _ => {}
        }

        // Content focus replaces the body built so far.
        if let Some(focus) = analysis.content_focus {
            if !parts.is_empty() {
                let scoped = focus.apply(&parts.join(" "));
                parts = vec![scoped.clone()];
                breakdown.remove(OperatorCategory::Proximity);
                breakdown.remove(OperatorCategory::Entities);
                breakdown.insert(OperatorCategory::ContentFocus, Fragments::One(scoped));
            }
        }

        if let Some(user) = normalize_restrictions(user_restrictions) {
            parts.push(user.to_string());
            breakdown.insert(
                OperatorCategory::UserRestrictions,
                Fragments::One(user.to_string()),
            );
        }

        let restrictions = &analysis.restrictions;

        if let Some(ref site) = restrictions.site {
            let op = operators::site_restrict(site);
            parts.push(op.clone());
            breakdown.insert(OperatorCategory::SiteRestriction, Fragments::One(op));
        }

        if !restrictions.exclude_sites.is_empty() {
            let ops: Vec<String> = restrictions
                .exclude_sites
                .iter()
                .map(|s| operators::exclude_site(s))
                .collect();
            parts.extend(ops.iter().cloned());
            breakdown.insert(OperatorCategory::ExcludeSites, Fragments::Many(ops));
        }

        if let Some(ref ext) = restrictions.filetype {
            let op = operators::filetype(ext);
            parts.push(op.clone());
            breakdown.insert(OperatorCategory::Filetype, Fragments::One(op));
        }

        if let Some(ref date) = restrictions.date_after {
            let op = operators::date_after(date);
            parts.push(op.clone());
            breakdown.insert(OperatorCategory::DateRestriction, Fragments::One(op));
        }

        if self.include_date_before {
            if let Some(ref date) = restrictions.date_before {
                let op = operators::date_before(date);
                parts.push(op.clone());
                breakdown.insert(OperatorCategory::DateBefore, Fragments::One(op));
            }
        }

        if !restrictions.exclude_terms.is_empty() {
            let ops: Vec<String> = restrictions
                .exclude_terms
                .iter()
                .map(|t| operators::exclude_term(t))
                .collect();
            parts.extend(ops.iter().cloned());
            breakdown.insert(OperatorCategory::ExcludeTerms, Fragments::Many(ops));
        }

        let text = parts.join(" ");
        debug!(request = %request, query = %text, "translated request");

        CompiledQuery {
            text,
            purpose: purpose(request),
            operator_breakdown: breakdown,
        }
    }
}

/// Pairwise AROUND clauses linking entities in order: e1~e2 e2~e3 ...
fn proximity_chain(entities: &[String], distance: u32) -> String {
    entities
        .windows(2)
        .map(|pair| operators::proximity(&pair[0], &pair[1], distance))
        .collect::<Vec<_>>()
        .join(" ")
}

fn purpose(request: &str) -> String {
    if request.chars().count() > PURPOSE_MAX_CHARS {
        let truncated: String = request.chars().take(PURPOSE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        request.to_string()
    }
}

fn normalize_restrictions(restrictions: Option<&str>) -> Option<&str> {
    restrictions.map(str::trim).filter(|r| !r.is_empty())
}

fn append_restrictions(query: String, restrictions: Option<&str>) -> String {
    match restrictions {
        Some(r) => format!("{} {}", query, r),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERALS: &str = r#"how are "General Smith" and "General Jones" described when mentioned close together on army.mil"#;

    #[test]
    fn test_no_entities_no_restrictions() {
        let q = Translator::new().translate("how does this even work", None);
        assert_eq!(q.text, "");
        assert!(q.operator_breakdown.is_empty());
    }

    #[test]
    fn test_no_entities_keeps_user_restrictions_only() {
        let q = Translator::new().translate("how does this even work", Some("site:example.com"));
        assert_eq!(q.text, "site:example.com");
        assert_eq!(
            q.operator_breakdown.categories(),
            vec![OperatorCategory::UserRestrictions]
        );
    }

    #[test]
    fn test_blank_user_restrictions_ignored() {
        let q = Translator::new().translate("how does this even work", Some("   "));
        assert_eq!(q.text, "");
        assert!(q.operator_breakdown.is_empty());
    }

    #[test]
    fn test_two_quoted_entities_default_proximity() {
        let q = Translator::new().translate(r#"are "alpha team" and "beta team" close"#, None);
        assert_eq!(q.text.matches("AROUND(").count(), 1);
        assert_eq!(q.text, r#""alpha team" AROUND(3) "beta team""#);
    }

    #[test]
    fn test_explicit_distance_overrides_default() {
        let q = Translator::new().translate(
            r#"are "alpha team" and "beta team" close, within 5 words"#,
            None,
        );
        assert_eq!(q.text.matches("AROUND(").count(), 1);
        assert!(q.text.contains("AROUND(5)"));
        assert!(!q.text.contains("AROUND(3)"));
    }

    #[test]
    fn test_proximity_chain_for_three_entities() {
        let q = Translator::new().translate(r#""aa" "bb" "cc" near each other"#, None);
        assert_eq!(
            q.text,
            r#""aa" AROUND(3) "bb" "bb" AROUND(3) "cc""#
        );
    }

    #[test]
    fn test_entities_without_proximity_are_exact_phrases() {
        let q = Translator::new().translate("research about Facebook scams targeting Netherlands users", None);
        assert_eq!(q.text, r#""Facebook" "Netherlands""#);
        assert_eq!(
            q.operator_breakdown.get(OperatorCategory::Entities),
            Some(&Fragments::Many(vec![
                "\"Facebook\"".to_string(),
                "\"Netherlands\"".to_string()
            ]))
        );
    }

    #[test]
    fn test_content_focus_replaces_entities() {
        let q = Translator::new().translate("find the word Einstein in title", None);
        assert_eq!(q.text, r#"intitle:"Einstein""#);
        assert_eq!(
            q.operator_breakdown.categories(),
            vec![OperatorCategory::ContentFocus]
        );
    }

    #[test]
    fn test_content_focus_without_entities_is_ignored() {
        let q = Translator::new().translate("anything at all in title", None);
        assert_eq!(q.text, "");
    }

    #[test]
    fn test_generals_end_to_end() {
        let q = Translator::new().translate(GENERALS, None);
        assert_eq!(
            q.text,
            r#""General Smith" AROUND(3) "General Jones" site:army.mil"#
        );
        let smith = q.text.find("General Smith").unwrap();
        let jones = q.text.find("General Jones").unwrap();
        assert!(smith < jones);
        assert_eq!(
            q.operator_breakdown.categories(),
            vec![OperatorCategory::Proximity, OperatorCategory::SiteRestriction]
        );
    }

    #[test]
    fn test_fixed_append_order() {
        let q = Translator::new().translate(
            r#""solar" reports from nasa.gov as pdf after 2019/06 but exclude press releases"#,
            Some("-site:twitter.com"),
        );
        assert_eq!(
            q.text,
            r#""solar" -site:twitter.com site:nasa.gov filetype:pdf after:2019/06 -press -releases"#
        );
        assert_eq!(
            q.operator_breakdown.categories(),
            vec![
                OperatorCategory::Entities,
                OperatorCategory::UserRestrictions,
                OperatorCategory::SiteRestriction,
                OperatorCategory::Filetype,
                OperatorCategory::DateRestriction,
                OperatorCategory::ExcludeTerms,
            ]
        );
    }

    #[test]
    fn test_date_before_not_compiled_by_default() {
        let request = r#""budget" memos before 2001"#;
        let q = Translator::new().translate(request, None);
        assert_eq!(q.text, r#""budget""#);

        let q = Translator::new().with_date_before(true).translate(request, None);
        assert_eq!(q.text, r#""budget" before:2001"#);
        assert!(q.operator_breakdown.get(OperatorCategory::DateBefore).is_some());
    }

    #[test]
    fn test_translation_is_idempotent() {
        let translator = Translator::new();
        let a = translator.translate(GENERALS, Some("filetype:pdf"));
        let b = translator.translate(GENERALS, Some("filetype:pdf"));
        assert_eq!(a.text, b.text);
        assert_eq!(a, b);
    }

    #[test]
    fn test_purpose_truncation() {
        let long = "a".repeat(150);
        let q = Translator::new().translate(&long, None);
        assert_eq!(q.purpose.len(), 103);
        assert!(q.purpose.ends_with("..."));

        let q = Translator::new().translate("short request", None);
        assert_eq!(q.purpose, "short request");
    }

    #[test]
    fn test_variations_with_entities() {
        let variations = Translator::new().create_variations(GENERALS, Some("site:army.mil"));
        assert_eq!(variations.len(), 3);
        assert_eq!(variations[1].text, r#""General Smith General Jones" site:army.mil"#);
        assert_eq!(
            variations[2].text,
            r#"("General Smith" OR "General Jones") site:army.mil"#
        );
        assert_eq!(
            variations[2].purpose,
            "Any of these entities: General Smith, General Jones"
        );
    }

    #[test]
    fn test_variations_without_restrictions_have_no_trailing_space() {
        let variations = Translator::new().create_variations(GENERALS, None);
        assert_eq!(variations[1].text, r#""General Smith General Jones""#);
    }

    #[test]
    fn test_variations_single_entity_only_primary() {
        let variations = Translator::new().create_variations("what is Kubernetes", None);
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].text, r#""Kubernetes""#);
    }
}

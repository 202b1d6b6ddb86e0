//! Candidate discovery over a rendered document.
//!
//! Several independent strategies scan the same markup for profile links;
//! a strategy whose structure is absent on the current page simply
//! contributes nothing. The final result is the deduplicated union, with
//! no ordering guarantee.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::trace;
use url::Url;

/// Optional allow-list restricting candidates to those whose nearby label
/// text (occupation, headline) matches one of the configured strings.
#[derive(Debug, Clone)]
pub struct LabelFilter {
    labels: Vec<String>,
}

impl LabelFilter {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into_iter().map(|l| l.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive substring match against any configured label.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.labels.iter().any(|label| text.contains(label))
    }
}

/// Reduce a link target to the one canonical profile-path form the ledger
/// compares against: path only, query and fragment stripped, no trailing
/// slash. Returns `None` for anything that is not a profile path.
pub fn normalize_profile_path(href: &str) -> Option<String> {
    let path = if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href).ok()?.path().to_string()
    } else {
        let end = href.find(['?', '#']).unwrap_or(href.len());
        href[..end].to_string()
    };

    if !path.starts_with("/in/") || path.len() <= "/in/".len() {
        return None;
    }

    Some(path.trim_end_matches('/').to_string())
}

/// Union of every extraction strategy's output. When the label filter is
/// active, links claimed by a labeled strategy are decided by that
/// strategy alone; the generic scan must not re-admit its rejects.
pub fn extract_candidates(html: &str, filter: Option<&LabelFilter>) -> HashSet<String> {
    let document = Html::parse_document(html);

    let labeled = filter.is_some().then(|| labeled_anchor_targets(&document));
    let mut candidates = feed_links(&document, labeled.as_ref());
    candidates.extend(network_page_cards(&document, filter));
    candidates.extend(also_viewed_cards(&document, filter));
    candidates.extend(section_list_items(&document, filter));
    candidates
}

/// Every target reachable through a strategy that carries label text,
/// regardless of whether the label matches.
fn labeled_anchor_targets(document: &Html) -> HashSet<String> {
    let labeled = Selector::parse(
        "a.discover-entity-type-card__link, \
         a.pv-browsemap-section__member, \
         ul.pv-profile-section__section-info li a",
    )
    .unwrap();

    document
        .select(&labeled)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(normalize_profile_path)
        .collect()
}

/// Generic anchor scan over the home feed. These links carry no label
/// text, so the filter cannot apply to them directly; in filtering mode
/// the scan skips targets owned by the labeled strategies instead.
fn feed_links(document: &Html, exclude: Option<&HashSet<String>>) -> HashSet<String> {
    let anchors = Selector::parse("a[href]").unwrap();

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(normalize_profile_path)
        .filter(|id| exclude.is_none_or(|set| !set.contains(id)))
        .collect()
}

/// Cards on the network page, labelled with the person's occupation.
fn network_page_cards(document: &Html, filter: Option<&LabelFilter>) -> HashSet<String> {
    let cards = Selector::parse("a.discover-entity-type-card__link").unwrap();
    let occupation = Selector::parse("span.discover-person-card__occupation").unwrap();

    document
        .select(&cards)
        .filter(|a| label_matches(a, &occupation, filter))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(normalize_profile_path)
        .collect()
}

/// The "people also viewed" side panel.
fn also_viewed_cards(document: &Html, filter: Option<&LabelFilter>) -> HashSet<String> {
    let members = Selector::parse("a.pv-browsemap-section__member").unwrap();
    let label = Selector::parse("div").unwrap();

    document
        .select(&members)
        .filter(|a| label_matches(a, &label, filter))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(normalize_profile_path)
        .collect()
}

/// Profile-section list items; some page variants use this shape instead
/// of the card classes above.
fn section_list_items(document: &Html, filter: Option<&LabelFilter>) -> HashSet<String> {
    let items = Selector::parse("ul.pv-profile-section__section-info li a").unwrap();
    let label = Selector::parse("div").unwrap();

    document
        .select(&items)
        .filter(|a| label_matches(a, &label, filter))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(normalize_profile_path)
        .collect()
}

fn label_matches(anchor: &ElementRef, label: &Selector, filter: Option<&LabelFilter>) -> bool {
    let Some(filter) = filter else {
        return true;
    };

    anchor.select(label).any(|el| {
        let text: String = el.text().collect();
        let matched = filter.matches(&text);
        if matched {
            trace!("Label '{}' matched filter", text.trim());
        }
        matched
    })
}

/// Resolve the acting account's own profile path from the feed document.
/// The nav exposes it as a mini-profile link; fall back to the first
/// profile anchor on the page.
pub fn own_profile_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let mini = Selector::parse(r#"a[class*="mini-profile"][href]"#).unwrap();
    if let Some(a) = document.select(&mini).next()
        && let Some(path) = a.value().attr("href").and_then(normalize_profile_path)
    {
        return Some(path);
    }

    let anchors = Selector::parse("a[href]").unwrap();
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find_map(normalize_profile_path)
}

/// Detect the site signalling an access error after sign-in.
pub fn detect_auth_error(html: &str) -> Option<&'static str> {
    let document = Html::parse_document(html);

    let alert = Selector::parse("div.alert.error").unwrap();
    if document.select(&alert).next().is_some() {
        return Some("credentials rejected, verify your username and password");
    }

    let title = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&title).next() {
        let text: String = el.text().collect();
        if text.contains("403: Forbidden") {
            return Some("site momentarily unavailable (403), try again later");
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_query_and_fragment() {
        assert_eq!(
            normalize_profile_path("/in/alice?trk=feed#anchor"),
            Some("/in/alice".to_string())
        );
    }

    #[test]
    fn test_normalize_absolute_url_reduced_to_path() {
        assert_eq!(
            normalize_profile_path("https://www.linkedin.com/in/alice/?trk=nav"),
            Some("/in/alice".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_non_profile_paths() {
        assert_eq!(normalize_profile_path("/feed/"), None);
        assert_eq!(normalize_profile_path("/in/"), None);
        assert_eq!(normalize_profile_path("https://example.com/about"), None);
    }

    #[test]
    fn test_feed_links_found() {
        let html = r#"<html><body>
            <a href="/in/alice">Alice</a>
            <a href="/in/bob?trk=x">Bob</a>
            <a href="/jobs/123">A job</a>
        </body></html>"#;

        let candidates = extract_candidates(html, None);
        assert!(candidates.contains("/in/alice"));
        assert!(candidates.contains("/in/bob"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_network_cards_with_label_filter() {
        let html = r#"<html><body>
            <a class="discover-entity-type-card__link" href="/in/carol">
                <span class="discover-person-card__occupation">Senior Developer</span>
            </a>
            <a class="discover-entity-type-card__link" href="/in/dave">
                <span class="discover-person-card__occupation">Accountant</span>
            </a>
        </body></html>"#;

        let filter = LabelFilter::new(vec!["developer".to_string(), "CEO".to_string()]);
        let candidates = extract_candidates(html, Some(&filter));

        assert!(candidates.contains("/in/carol"));
        assert!(!candidates.contains("/in/dave"));
    }

    #[test]
    fn test_also_viewed_cards() {
        let html = r#"<html><body>
            <a class="pv-browsemap-section__member" href="/in/erin">
                <div>Erin · Recruiter</div>
            </a>
        </body></html>"#;

        let filter = LabelFilter::new(vec!["recruiter".to_string()]);
        assert!(extract_candidates(html, Some(&filter)).contains("/in/erin"));

        let filter = LabelFilter::new(vec!["plumber".to_string()]);
        assert!(extract_candidates(html, Some(&filter)).is_empty());
    }

    #[test]
    fn test_filtered_out_card_never_reenters_via_generic_scan() {
        // The card anchor is also a plain a[href]; rejection by the
        // labeled strategy must hold across the union.
        let html = r#"<html><body>
            <a class="discover-entity-type-card__link" href="/in/dave">
                <span class="discover-person-card__occupation">Accountant</span>
            </a>
        </body></html>"#;

        let filter = LabelFilter::new(vec!["developer".to_string()]);
        assert!(extract_candidates(html, Some(&filter)).is_empty());
    }

    #[test]
    fn test_unlabeled_feed_anchors_survive_filtering_mode() {
        let html = r#"<html><body>
            <a href="/in/alice">Alice</a>
            <a class="pv-browsemap-section__member" href="/in/erin">
                <div>Erin · Plumber</div>
            </a>
        </body></html>"#;

        let filter = LabelFilter::new(vec!["developer".to_string()]);
        let candidates = extract_candidates(html, Some(&filter));

        assert!(candidates.contains("/in/alice"));
        assert!(!candidates.contains("/in/erin"));
    }

    #[test]
    fn test_section_list_items() {
        let html = r#"<html><body>
            <ul class="pv-profile-section__section-info">
                <li><a href="/in/frank"><div>Frank</div></a></li>
            </ul>
        </body></html>"#;

        assert!(extract_candidates(html, None).contains("/in/frank"));
    }

    #[test]
    fn test_missing_structures_do_not_block_other_strategies() {
        // Only the feed shape is present; the card strategies find
        // nothing and must not prevent the union from forming.
        let html = r#"<html><body><a href="/in/grace">Grace</a></body></html>"#;

        let candidates = extract_candidates(html, None);
        assert_eq!(candidates.len(), 1);
        assert!(candidates.contains("/in/grace"));
    }

    #[test]
    fn test_duplicates_across_strategies_collapse() {
        let html = r#"<html><body>
            <a href="/in/henry">Henry</a>
            <a class="discover-entity-type-card__link" href="/in/henry"></a>
        </body></html>"#;

        let candidates = extract_candidates(html, None);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_own_profile_prefers_mini_profile_link() {
        let html = r#"<html><body>
            <a href="/in/someone-else">feed item</a>
            <a class="global-nav mini-profile-link" href="/in/me?trk=nav">Me</a>
        </body></html>"#;

        assert_eq!(own_profile_url(html), Some("/in/me".to_string()));
    }

    #[test]
    fn test_own_profile_falls_back_to_first_profile_anchor() {
        let html = r#"<html><body><a href="/in/me">Me</a></body></html>"#;
        assert_eq!(own_profile_url(html), Some("/in/me".to_string()));
    }

    #[test]
    fn test_detect_auth_error_banner() {
        let html = r#"<html><body><div class="alert error">Wrong password</div></body></html>"#;
        assert!(detect_auth_error(html).is_some());
    }

    #[test]
    fn test_detect_auth_error_forbidden_title() {
        let html = "<html><head><title>403: Forbidden</title></head><body></body></html>";
        assert!(detect_auth_error(html).is_some());
    }

    #[test]
    fn test_detect_auth_error_clean_page() {
        let html = "<html><head><title>Feed</title></head><body></body></html>";
        assert!(detect_auth_error(html).is_none());
    }
}

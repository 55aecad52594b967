//! Offline keyword scan for common risk categories.
//!
//! A quick pre-check that needs no model call. It only counts words, so it
//! flags clauses worth reading rather than judging them; the model-backed
//! risk stage does the actual analysis.

use lazy_static::lazy_static;
use serde::Serialize;

lazy_static! {
    /// Keywords per category, English and Hindi
    static ref RISK_KEYWORDS: Vec<(&'static str, Vec<&'static str>)> = vec![
        (
            "penalties",
            vec!["penalty", "fine", "charge", "fee", "cost", "damages", "जुर्माना", "दंड", "शुल्क", "लागत"],
        ),
        (
            "data_sharing",
            vec![
                "data", "information", "personal", "privacy", "share", "third party",
                "डेटा", "जानकारी", "निजी", "गोपनीयता", "साझा",
            ],
        ),
        (
            "auto_renewal",
            vec![
                "auto-renew", "automatic", "renewal", "subscription", "recurring",
                "स्वचालित", "नवीकरण", "सदस्यता",
            ],
        ),
        (
            "lock_in",
            vec![
                "termination", "cancel", "exit", "lock-in", "binding", "commitment",
                "समाप्ति", "रद्द", "बाध्यकारी", "प्रतिबद्धता",
            ],
        ),
        (
            "unfair_terms",
            vec![
                "liability", "disclaimer", "warranty", "guarantee", "responsibility",
                "दायित्व", "अस्वीकरण", "वारंटी", "जिम्मेदारी",
            ],
        ),
    ];
}

/// Keyword occurrences for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryHits {
    pub category: &'static str,
    /// Matched keywords with their occurrence counts, in keyword order
    pub keywords: Vec<(&'static str, usize)>,
    pub total: usize,
}

/// Count keyword occurrences per category (case-insensitive substring match).
///
/// Categories without any hit are omitted.
pub fn scan(text: &str) -> Vec<CategoryHits> {
    let haystack = text.to_lowercase();
    RISK_KEYWORDS
        .iter()
        .filter_map(|(category, words)| {
            let keywords: Vec<(&'static str, usize)> = words
                .iter()
                .map(|word| (*word, haystack.matches(*word).count()))
                .filter(|(_, count)| *count > 0)
                .collect();
            let total: usize = keywords.iter().map(|(_, count)| count).sum();
            (total > 0).then_some(CategoryHits {
                category: *category,
                keywords,
                total,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_hits_per_category() {
        let hits = scan(
            "Late payments incur a 5% PENALTY. We may share your personal data with a third party. \
             This agreement automatically renews.",
        );
        let categories: Vec<_> = hits.iter().map(|h| h.category).collect();
        assert_eq!(categories, vec!["penalties", "data_sharing", "auto_renewal"]);

        let penalties = &hits[0];
        assert_eq!(penalties.keywords, vec![("penalty", 1)]);
        assert_eq!(penalties.total, 1);

        let data = &hits[1];
        assert!(data.keywords.contains(&("third party", 1)));
        assert!(data.keywords.contains(&("personal", 1)));
    }

    #[test]
    fn matches_hindi_keywords() {
        let hits = scan("देर से भुगतान पर जुर्माना लगेगा।");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "penalties");
    }

    #[test]
    fn clean_text_has_no_hits() {
        assert!(scan("The sky is blue.").is_empty());
    }
}

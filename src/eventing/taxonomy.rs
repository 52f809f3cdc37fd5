//! Keyword taxonomy for event-type classification

use std::collections::BTreeMap;

pub const OTHER_EVENT_TYPE: &str = "other";

/// Built-in categories, in match order
const DEFAULT_RULES: [(&str, &[&str]); 4] = [
    (
        "policy",
        &[
            "정책", "규제", "완화", "정부", "보도자료", "금융위원회", "공정거래위원회", "관세",
            "관보", "지원 확대",
        ],
    ),
    (
        "celebrity_comment",
        &[
            "발언", "코멘트", "견해", "트윗", "인터뷰", "유명", "인플루언서", "거물",
            "빌리어네어", "대주주",
        ],
    ),
    (
        "collaboration",
        &["콜라보", "협업", "제휴", "파트너십", "MOU", "공동", "협력", "공동개발"],
    ),
    (
        "industry",
        &[
            "산업", "업계", "공급망", "수출", "수입", "생산", "라인", "증설", "감산", "출시",
            "신제품",
        ],
    ),
];

/// Ordered categories with their (lower-cased) keywords
#[derive(Debug, Clone, PartialEq)]
pub struct EventTaxonomy {
    categories: Vec<(String, Vec<String>)>,
}

impl Default for EventTaxonomy {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

impl EventTaxonomy {
    /// Built-in categories with `overrides` unioned in
    ///
    /// Built-in categories keep their fixed order; categories that only appear in
    /// `overrides` follow in name order.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        let mut categories: Vec<(String, Vec<String>)> = DEFAULT_RULES
            .iter()
            .map(|(name, kws)| (name.to_string(), kws.iter().map(|k| k.to_lowercase()).collect()))
            .collect();

        for (name, extra) in overrides {
            let extra = extra
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty());

            match categories.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, kws)) => {
                    for kw in extra {
                        if !kws.contains(&kw) {
                            kws.push(kw);
                        }
                    }
                }
                None => {
                    let mut kws: Vec<String> = Vec::new();
                    for kw in extra {
                        if !kws.contains(&kw) {
                            kws.push(kw);
                        }
                    }
                    categories.push((name.clone(), kws));
                }
            }
        }

        Self { categories }
    }

    /// First category with a keyword contained in `"{title} {summary}"`, else `other`
    pub fn classify(&self, title: &str, summary: &str) -> &str {
        let text = format!("{} {}", title, summary).to_lowercase();
        self.categories
            .iter()
            .find(|(_, kws)| kws.iter().any(|kw| text.contains(kw.as_str())))
            .map(|(name, _)| name.as_str())
            .unwrap_or(OTHER_EVENT_TYPE)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }
}

//! Channel categories used to group channel lists for display and to select
//! whole groups of channels at once.

use std::sync::OnceLock;

use exrmerge_core::codec::ChannelInfo;
use regex::Regex;

/// Ordered (label, pattern) table. A channel belongs to the first category
/// whose pattern matches its whole name.
const CATEGORY_PATTERNS: &[(&str, &str)] = &[
    ("Color (Beauty)", "[RGBA]"),
    ("Normal (N)", r"N\.[XYZ]"),
    ("Depth (Z)", "Z"),
    ("Ambient Occlusion (AO)", r"AO\.[RGBA]"),
    ("Crypto Object", "crypto_object.*"),
    ("Crypto Material", "crypto_material.*"),
    ("Sample density", "AA_inv_density.*"),
    ("Variance", "variance.*"),
    ("Noice", ".*noice.*"),
    ("Others", ".*"),
];

pub struct Category {
    pub label: &'static str,
    pattern: Regex,
}

impl Category {
    pub fn matches(&self, channel: &str) -> bool {
        self.pattern.is_match(channel)
    }
}

pub fn categories() -> &'static [Category] {
    static CATEGORIES: OnceLock<Vec<Category>> = OnceLock::new();
    CATEGORIES.get_or_init(|| {
        CATEGORY_PATTERNS
            .iter()
            .map(|&(label, pattern)| Category {
                label,
                pattern: Regex::new(&format!("^(?:{pattern})$"))
                    .expect("category patterns are valid"),
            })
            .collect()
    })
}

pub fn is_known(label: &str) -> bool {
    categories().iter().any(|c| c.label == label)
}

/// Label of the first category matching `channel`.
pub fn category_of(channel: &str) -> &'static str {
    categories()
        .iter()
        .find(|c| c.matches(channel))
        .map_or("Others", |c| c.label)
}

/// Group channels by category, in table order. Empty groups are omitted.
pub fn group_channels(channels: &[ChannelInfo]) -> Vec<(&'static str, Vec<&ChannelInfo>)> {
    let mut groups: Vec<(&'static str, Vec<&ChannelInfo>)> = categories()
        .iter()
        .map(|c| (c.label, Vec::new()))
        .collect();

    for channel in channels {
        let label = category_of(&channel.name);
        if let Some((_, members)) = groups.iter_mut().find(|(l, _)| *l == label) {
            members.push(channel);
        }
    }

    groups.retain(|(_, members)| !members.is_empty());
    groups
}

/// Names of the channels whose category is listed in `labels`.
pub fn select_channels(labels: &[String], channels: &[ChannelInfo]) -> Vec<String> {
    channels
        .iter()
        .filter(|c| labels.iter().any(|l| l == category_of(&c.name)))
        .map(|c| c.name.clone())
        .collect()
}

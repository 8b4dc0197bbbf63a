//! Prompt text for the chat classifier.

use std::fmt::Write as _;

use super::{ClassifierItem, HistoricalHints};

const MAX_HINT_EXAMPLES: usize = 5;

pub(super) const BRIEFING_SYSTEM: &str = "You explain search topics. In at most three sentences, \
say what the topic means, which domain it belongs to, and name unrelated domains where the same \
words appear with a different meaning. Reply with plain text only.";

pub(super) const RELEVANCE_SYSTEM: &str = "You judge whether social media posts are relevant to a \
research topic. Apply a strict standard: a post that only repeats a keyword without discussing the \
topic is NOT relevant. Any meaningful discussion of the topic counts, whether business, personal, \
or consumer. Reply with JSON only: {\"relevant\": [<item numbers>]}.";

pub(super) const INTENT_SYSTEM: &str = "You sort social media posts about a topic by intent. \
Put every item in exactly one bucket: \"painPoints\" for problems, complaints, and frustration; \
\"trendingIdeas\" for popular, viral, or high-engagement discussion; \"contentIdeas\" for how-to \
requests, questions, and advice seeking. Exclude posts that only match the topic's words in an \
unrelated domain. Reply with JSON only: {\"painPoints\": [...], \"trendingIdeas\": [...], \
\"contentIdeas\": [...]} using item numbers.";

fn write_items(out: &mut String, items: &[ClassifierItem]) {
    for item in items {
        let _ = writeln!(
            out,
            "{}. [{} | {} | engagement {}] {}",
            item.index, item.platform, item.source, item.engagement, item.excerpt
        );
    }
}

pub(super) fn briefing_user(query: &str) -> String {
    format!("Topic: \"{query}\"")
}

pub(super) fn relevance_user(
    items: &[ClassifierItem],
    query: &str,
    briefing: &str,
    hints: Option<&HistoricalHints>,
) -> String {
    let mut out = format!("Topic: \"{query}\"\nAbout the topic: {briefing}\n");

    if let Some(hints) = hints.filter(|h| !h.is_empty()) {
        out.push_str("\nPast reader feedback for similar topics:\n");
        for example in hints.relevant.iter().take(MAX_HINT_EXAMPLES) {
            let _ = writeln!(out, "- relevant: {example}");
        }
        for example in hints.irrelevant.iter().take(MAX_HINT_EXAMPLES) {
            let _ = writeln!(out, "- not relevant: {example}");
        }
    }

    let _ = writeln!(
        out,
        "\nWhich of these {} items are relevant to the topic?",
        items.len()
    );
    write_items(&mut out, items);
    out
}

pub(super) fn intent_user(items: &[ClassifierItem], query: &str, briefing: &str) -> String {
    let mut out = format!(
        "Topic: \"{query}\"\nAbout the topic: {briefing}\n\nSort these {} items:\n",
        items.len()
    );
    write_items(&mut out, items);
    out
}

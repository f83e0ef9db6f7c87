use chrono::{DateTime, NaiveDate, Utc};

use crate::filter::contains_keywords;

pub const PROJECT_URL: &str = "https://github.com/paper-daily/paper-daily";

const HASHTAG_CAP: usize = 5;
const COVER_CAP: usize = 2;
const GENERIC_TOPIC: &str = "BlockchainTech";
const STATIC_TAGS: &str = "#Research #TechFrontier #AI #PaperDigest";

/// Fully enriched paper record, ready for rendering and the history log.
/// Created once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub link: String,
    pub published: DateTime<Utc>,
    pub summary: String,
    pub insights: Vec<String>,
    pub recommendation: String,
    pub venue: Option<String>,
    pub affiliation: Option<String>,
}

struct TopicRule {
    label: &'static str,
    keywords: &'static [&'static str],
}

const HASHTAG_RULES: &[TopicRule] = &[
    TopicRule { label: "Blockchain", keywords: &["blockchain"] },
    TopicRule { label: "Consensus", keywords: &["consensus", "bft", "byzantine", "pbft"] },
    TopicRule { label: "SmartContracts", keywords: &["smart contract", "solidity"] },
    TopicRule { label: "Security", keywords: &["security", "attack", "defense"] },
    TopicRule { label: "Privacy", keywords: &["privacy", "anonymous", "zero-knowledge", "zk-", "private"] },
    TopicRule { label: "Scalability", keywords: &["performance", "scalability", "sharding", "throughput"] },
    TopicRule { label: "CrossChain", keywords: &["cross-chain", "interoperability"] },
    TopicRule { label: "Wallets", keywords: &["wallet"] },
    TopicRule { label: "Oracles", keywords: &["oracle"] },
    TopicRule { label: "Governance", keywords: &["governance"] },
    TopicRule { label: "DeFi", keywords: &["defi", "decentralized finance"] },
    TopicRule { label: "NFT", keywords: &["nft", "non-fungible"] },
    TopicRule { label: "Layer2", keywords: &["layer 2", "layer2", "rollup"] },
    TopicRule { label: "Mining", keywords: &["miner", "mining"] },
    TopicRule { label: "Cryptocurrency", keywords: &["cryptocurrency", "token", "digital currency"] },
    TopicRule { label: "DistributedSystems", keywords: &["distributed"] },
    TopicRule { label: "Storage", keywords: &["storage"] },
    TopicRule { label: "Networking", keywords: &["network"] },
    TopicRule { label: "Cryptography", keywords: &["cryptographic", "cipher", "hash", "signature"] },
    TopicRule { label: "Ethereum", keywords: &["ethereum"] },
    TopicRule { label: "Bitcoin", keywords: &["bitcoin"] },
];

const COVER_RULES: &[TopicRule] = &[
    TopicRule { label: "Consensus", keywords: &["consensus", "bft", "byzantine", "pbft"] },
    TopicRule { label: "Smart Contracts", keywords: &["smart contract", "solidity"] },
    TopicRule { label: "Security", keywords: &["security", "attack", "defense"] },
    TopicRule { label: "Privacy", keywords: &["privacy", "anonymous", "zero-knowledge", "zk-", "private"] },
    TopicRule { label: "Performance", keywords: &["performance", "scalability", "sharding", "throughput"] },
    TopicRule { label: "Cross-chain", keywords: &["cross-chain", "interoperability"] },
    TopicRule { label: "Wallets", keywords: &["wallet"] },
    TopicRule { label: "Oracles", keywords: &["oracle"] },
    TopicRule { label: "Governance", keywords: &["governance"] },
    TopicRule { label: "DeFi", keywords: &["defi", "decentralized finance"] },
    TopicRule { label: "NFT", keywords: &["nft", "non-fungible"] },
    TopicRule { label: "Layer 2", keywords: &["layer 2", "layer2", "rollup"] },
    TopicRule { label: "Mining", keywords: &["miner", "mining"] },
    TopicRule { label: "Cryptocurrency", keywords: &["cryptocurrency", "token", "digital currency"] },
    TopicRule { label: "Distributed Systems", keywords: &["distributed"] },
    TopicRule { label: "Storage", keywords: &["storage"] },
    TopicRule { label: "Networking", keywords: &["network"] },
];

/// Long-form daily report. Deterministic: the generation date comes in as an
/// argument instead of being read from the clock.
pub fn render_daily(record: &ReportRecord, generated_on: NaiveDate) -> String {
    let mut out = format!(
        "# 📚 ArXiv Blockchain Paper Daily ({})\n\n\
         > 🔍 Source: fetched from arXiv and curated with a language model\n\n\
         ---\n\n\
         ## 📘 Title\n\
         [{}]({})\n\n\
         ## 👥 Authors\n\
         {}\n",
        generated_on.format("%Y-%m-%d"),
        record.title,
        record.link,
        record.authors.join(", "),
    );

    if let Some(affiliation) = record.affiliation.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(&format!("\n🏢 Affiliation\n{affiliation}\n"));
    }

    out.push_str("\n## 🗂️ Publication\nArXiv preprint");
    if let Some(venue) = record.venue.as_deref().filter(|v| !v.is_empty()) {
        out.push_str(&format!(" • {venue}"));
    }
    out.push_str(&format!(
        " • Submitted: {}\n",
        record.published.format("%Y-%m-%d")
    ));

    out.push_str(&format!(
        "\n## 🧾 Overview\n\n### 💡 Summary\n{}\n\n### ⭐ Key insights\n",
        record.summary
    ));
    for insight in &record.insights {
        out.push_str(&format!("- {insight}\n"));
    }

    out.push_str(&format!(
        "\n## 🎯 Recommendation\n{}\n\n---\n*🤖 Generated by AI. For reference only.*\n",
        record.recommendation
    ));
    out
}

/// Short-form social post: numbered insights, a link back to the project and
/// a dynamic hashtag line at the end.
pub fn render_social(record: &ReportRecord) -> String {
    let mut out = format!(
        "📖 Title: {}\n\n\
         👥 Authors: {}\n\n\
         📅 Published: {}\n\n\
         🔍 Summary:\n{}\n\n\
         ⭐ Key insights:",
        record.title,
        record.authors.join(", "),
        record.published.format("%Y-%m-%d"),
        record.summary,
    );
    for (i, insight) in record.insights.iter().enumerate() {
        out.push_str(&format!("\n{}. {insight}", i + 1));
    }
    out.push_str(&format!(
        "\n\n🎯 Recommendation:\n{}\n\n\
         🔗 Link: {}\n\n\
         🤖 Generated by AI. Visit the project for more:\n{}\n\n\
         {}\n",
        record.recommendation,
        record.link,
        PROJECT_URL,
        hashtag_line(record),
    ));
    out
}

/// Space-joined `#`-prefixed topic labels derived from title and summary,
/// followed by the fixed static tags.
pub fn hashtag_line(record: &ReportRecord) -> String {
    let labels = matched_labels(record, HASHTAG_RULES, HASHTAG_CAP);
    let dynamic: Vec<String> = labels.iter().map(|label| format!("#{label}")).collect();
    format!("{} {STATIC_TAGS}", dynamic.join(" "))
}

/// One-line cover caption built from at most two matched topics.
pub fn cover_text(record: &ReportRecord) -> String {
    let labels = matched_labels(record, COVER_RULES, COVER_CAP);
    format!("ArXiv blockchain paper pick: {}", labels.join(" & "))
}

/// Walks the rule table in declared order, appending each topic the first
/// time any of its keyword variants matches the title or summary, up to
/// `cap`. Falls back to the generic topic when nothing matches.
fn matched_labels(record: &ReportRecord, rules: &[TopicRule], cap: usize) -> Vec<String> {
    let mut labels = Vec::new();
    for rule in rules {
        if labels.len() >= cap {
            break;
        }
        if contains_keywords(&record.title, rule.keywords)
            || contains_keywords(&record.summary, rule.keywords)
        {
            labels.push(rule.label.to_string());
        }
    }
    if labels.is_empty() {
        labels.push(GENERIC_TOPIC.to_string());
    }
    labels
}

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;

use crate::config::Config;

const ARXIV_API: &str = "http://export.arxiv.org/api/query";

/// A paper record as retrieved from the search API, before any relevance
/// filtering. Immutable once fetched.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub link: String,
    pub published: DateTime<Utc>,
    pub comment: Option<String>,
}

/// Retrieves candidates for every configured keyword within the trailing
/// lookback window. Per-keyword failures are skipped; if every keyword
/// search fails the built-in sample set stands in so the pipeline stays
/// runnable offline. Duplicates across keyword buckets are accepted.
pub fn recent_candidates(client: &Client, config: &Config, now: DateTime<Utc>) -> Vec<Candidate> {
    let window_start = now - Duration::days(config.lookback_days);
    let mut candidates = Vec::new();
    let mut failed_keywords = 0usize;

    for keyword in &config.keywords {
        println!("searching keyword '{keyword}'...");
        match search_keyword(client, config, keyword) {
            Ok(papers) => {
                let in_window: Vec<Candidate> = papers
                    .into_iter()
                    .filter(|paper| within_window(paper.published, window_start, now))
                    .collect();
                println!("keyword '{keyword}': {} papers in window", in_window.len());
                candidates.extend(in_window);
            }
            Err(err) => {
                failed_keywords += 1;
                eprintln!("warning: keyword '{keyword}' search failed: {err:#}");
            }
        }
    }

    if !config.keywords.is_empty() && failed_keywords == config.keywords.len() {
        eprintln!("warning: arxiv search unavailable, using built-in sample set");
        return sample_candidates(now);
    }

    println!("retrieved {} candidate papers", candidates.len());
    candidates
}

/// Inclusive on both window endpoints.
pub fn within_window(published: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= published && published <= end
}

fn search_keyword(client: &Client, config: &Config, keyword: &str) -> Result<Vec<Candidate>> {
    let query = build_query(keyword, &config.categories);
    let max_results = config.max_results_per_keyword.to_string();
    let response = client
        .get(ARXIV_API)
        .query(&[
            ("search_query", query.as_str()),
            ("start", "0"),
            ("max_results", max_results.as_str()),
            ("sortBy", "submittedDate"),
            ("sortOrder", "descending"),
        ])
        .send()
        .with_context(|| format!("fetch arxiv query '{query}'"))?
        .error_for_status()
        .context("bad arxiv response status")?;
    let body = response.text().context("read arxiv response body")?;
    parse_feed(&body)
}

/// Fetches one paper by identifier for a single-paper run.
pub fn fetch_by_id(client: &Client, id: &str) -> Result<Option<Candidate>> {
    let response = client
        .get(ARXIV_API)
        .query(&[("id_list", id), ("max_results", "1")])
        .send()
        .with_context(|| format!("fetch arxiv id '{id}'"))?
        .error_for_status()
        .context("bad arxiv response status")?;
    let body = response.text().context("read arxiv response body")?;
    Ok(parse_feed(&body)?.into_iter().next())
}

/// Query syntax: `all:term` (quoted when the keyword has spaces), ANDed with
/// a `cat:` disjunction when categories are configured.
fn build_query(keyword: &str, categories: &[String]) -> String {
    let keyword = keyword.trim();
    let term = if keyword.contains(' ') {
        format!("all:\"{}\"", keyword.replace('"', ""))
    } else {
        format!("all:{keyword}")
    };
    let cats: Vec<String> = categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| format!("cat:{c}"))
        .collect();
    if cats.is_empty() {
        term
    } else {
        format!("{term} AND ({})", cats.join(" OR "))
    }
}

fn parse_feed(body: &str) -> Result<Vec<Candidate>> {
    let feed = feed_rs::parser::parse(body.as_bytes()).context("parse arxiv atom feed")?;
    let comments = comments_by_entry(body);

    let mut papers = Vec::new();
    for entry in feed.entries {
        let link = entry
            .links
            .iter()
            .map(|link| link.href.clone())
            .find(|href| !href.trim().is_empty())
            .unwrap_or_else(|| entry.id.clone());
        if link.trim().is_empty() {
            continue;
        }
        let title = entry
            .title
            .as_ref()
            .map(|text| normalize_text(&text.content))
            .unwrap_or_else(|| "Untitled".to_string());
        let Some(published) = entry.published.or(entry.updated).map(|dt| dt.with_timezone(&Utc))
        else {
            continue;
        };
        let abstract_text = entry
            .summary
            .as_ref()
            .map(|text| normalize_text(&text.content))
            .unwrap_or_default();
        let authors = entry
            .authors
            .iter()
            .map(|person| person.name.clone())
            .filter(|name| !name.trim().is_empty())
            .collect();
        let comment = comments.get(&entry.id).cloned();
        papers.push(Candidate {
            title,
            abstract_text,
            authors,
            link,
            published,
            comment,
        });
    }
    Ok(papers)
}

/// feed-rs does not surface the `arxiv:comment` extension, so the comments
/// are recovered with a raw tag scan keyed by entry id.
fn comments_by_entry(xml: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut search_from = 0;
    while let Some(found) = xml[search_from..].find("<entry") {
        let start = search_from + found;
        let Some(found_end) = xml[start..].find("</entry>") else {
            break;
        };
        let end = start + found_end + "</entry>".len();
        let entry = &xml[start..end];
        if let (Some(id), Some(comment)) = (
            extract_tag_text(entry, "id"),
            extract_tag_text(entry, "arxiv:comment"),
        ) {
            map.insert(id, normalize_text(&comment));
        }
        search_from = end;
    }
    map
}

fn extract_tag_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let start_pos = xml.find(&open)?;
    let content_start = xml[start_pos..].find('>')? + start_pos + 1;
    let content_end = xml[content_start..].find(&close)? + content_start;
    Some(xml[content_start..content_end].trim().to_string())
}

fn normalize_text(input: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

static ARXIV_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d+\.\d+)(v\d+)?$").expect("valid arxiv id pattern"));

/// Accepts either a bare identifier or a full abs URL; URLs are reduced to
/// the identifier without version suffix.
pub fn extract_arxiv_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http") {
        return ARXIV_ID_RE
            .captures(input)
            .map(|caps| caps[1].to_string());
    }
    Some(input.to_string())
}

/// Fixed demo dataset used when retrieval fails entirely. Same shape and
/// field set as live results, stamped relative to `now` so the window
/// filter downstream stays meaningful.
pub fn sample_candidates(now: DateTime<Utc>) -> Vec<Candidate> {
    let sample = |days: i64, title: &str, abstract_text: &str, authors: &[&str], link: &str| {
        Candidate {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            link: link.to_string(),
            published: now - Duration::days(days),
            comment: None,
        }
    };
    vec![
        sample(
            1,
            "LMM-Incentive: Large Multimodal Model-based Incentive Design for User-Generated Content in Web 3.0",
            "Web 3.0 lets anyone own and monetize their content, which also attracts low-effort spam submitted to farm rewards. LMM-Incentive uses a large multimodal model as referee, combined with smart contracts and reinforcement learning, to design reward mechanisms that automatically favor high-quality creation.",
            &["Jinbo Wen", "Jiawen Kang", "Linfeng Zhang", "Xiaoying Tang", "Jianhang Tang", "Yang Zhang", "Zhaohui Yang", "Dusit Niyato"],
            "http://arxiv.org/abs/2510.04765v1",
        ),
        sample(
            2,
            "ConsensusNet: A Novel High-Throughput Consensus Algorithm for Blockchain Networks",
            "Consensus directly bounds the throughput and safety of a blockchain network. ConsensusNet combines Byzantine fault tolerance with proof of stake to raise transaction throughput substantially while preserving safety guarantees.",
            &["Alice Johnson", "Bob Smith", "Charlie Brown", "Diana Lee"],
            "http://arxiv.org/abs/2510.04766v1",
        ),
        sample(
            3,
            "Privacy-Preserving Smart Contracts with zk-SNARKs Integration",
            "Contract transparency builds trust but exposes user privacy. This work proposes a zk-SNARK-based framework that hides sensitive transaction data while still proving contracts executed correctly.",
            &["Eva Martinez", "Frank Wilson", "Grace Davis", "Henry Garcia"],
            "http://arxiv.org/abs/2510.04767v1",
        ),
        sample(
            4,
            "Cross-chain Atomic Swaps with Game-Theoretic Security Guarantees",
            "Atomic swaps are the key primitive for moving value between chains. The proposed protocol backs the exchange with game-theoretic incentives so that honest completion is every party's best strategy.",
            &["Ivy Rodriguez", "Jack Anderson", "Kate Thomas", "Leo Jackson"],
            "http://arxiv.org/abs/2510.04768v1",
        ),
        sample(
            5,
            "Decentralized Identity Verification using Blockchain and Biometrics",
            "Decentralized identity is core Web 3.0 infrastructure. Combining an on-chain registry with biometric binding yields identities that are unique per person yet keep the biometric templates private.",
            &["Mia White", "Noah Harris", "Olivia Martin", "Peter Thompson"],
            "http://arxiv.org/abs/2510.04769v1",
        ),
        sample(
            6,
            "Energy-Efficient Mining with Renewable Energy Certificates on Blockchain",
            "Mining's energy footprint draws wide criticism. Settling renewable energy certificates on chain lets the protocol discount fees for miners who can prove clean-energy consumption, steering the network toward sustainability.",
            &["Quinn Moore", "Rachel Taylor", "Steve Allen", "Tina Young"],
            "http://arxiv.org/abs/2510.04770v1",
        ),
        sample(
            7,
            "Scalable Layer-2 Solutions with Optimistic Rollups and Fraud Proofs",
            "Layer-2 rollups remain the most practical route around base-layer throughput limits. The proposed architecture pairs optimistic rollups with succinct fraud proofs to cut confirmation latency without weakening fund safety.",
            &["Uma Scott", "Victor King", "Wendy Wright", "Xavier Hill"],
            "http://arxiv.org/abs/2510.04771v1",
        ),
        sample(
            8,
            "Quantum-Resistant Cryptographic Algorithms for Future Blockchains",
            "Progress in quantum computing threatens the signature schemes most chains rely on. This paper designs a post-quantum suite and evaluates its cost when dropped into a contemporary blockchain stack.",
            &["Yara Green", "Zack Baker", "Amy Adams", "Ben Clark"],
            "http://arxiv.org/abs/2510.04772v1",
        ),
        sample(
            9,
            "Machine Learning-Based Anomaly Detection in Blockchain Networks",
            "Detecting anomalous behavior early is critical for network safety. A learned detector over transaction graphs flags suspected attacks in real time and raises the robustness of the overall system.",
            &["Cindy Lewis", "Dan Walker", "Ella Hall", "Fred Allen"],
            "http://arxiv.org/abs/2510.04773v1",
        ),
        sample(
            10,
            "Tokenomics Design for Sustainable Decentralized Autonomous Organizations",
            "Token economics decides whether a DAO survives. Using tools from game theory and control, the paper derives a token model that rewards long-term participation and dampens governance attacks.",
            &["Gina Young", "Harry King", "Iris Wright", "Jack Lopez"],
            "http://arxiv.org/abs/2510.04774v1",
        ),
    ]
}

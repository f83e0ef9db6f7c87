use anyhow::{bail, Result};

use crate::arxiv::Candidate;
use crate::filter::truncate_chars;
use crate::llm::LlmClient;

/// Literal tokens accepted as an affirmative classification reply.
const ACCEPT_TOKENS: &[&str] = &["是", "yes", "true", "✅"];

/// Per-candidate abstract cap inside the selection prompt, to bound the
/// overall prompt size.
const SELECTOR_ABSTRACT_CAP: usize = 500;

/// Asks the model whether one paper is on-topic. Any call failure or any
/// reply outside the accepted token set counts as "not relevant"; there is
/// no partial credit and no confidence score.
pub fn is_relevant(llm: &LlmClient, title: &str, abstract_text: &str) -> bool {
    let prompt = format!(
        "You are an expert in computer science. Based on the paper information below, \
         decide whether the research primarily belongs to the field of blockchain or \
         distributed ledger technology. This includes but is not limited to consensus \
         algorithms, smart contracts, cryptographic protocols, decentralized \
         applications, Layer-2 scaling, and cross-chain techniques.\n\n\
         Title: {title}\n\
         Abstract: {abstract_text}\n\n\
         Answer only \"yes\" or \"no\". Do not explain."
    );
    match llm.complete(&prompt) {
        Ok(reply) => is_affirmative(&reply),
        Err(err) => {
            eprintln!("warning: relevance call failed: {err:#}");
            false
        }
    }
}

/// The reply's first whitespace-delimited token must equal one of the
/// accepted literals, case-insensitively. "是的" is not "是" and stays false.
fn is_affirmative(reply: &str) -> bool {
    let Some(first) = reply.split_whitespace().next() else {
        return false;
    };
    let first = first.to_lowercase();
    ACCEPT_TOKENS.contains(&first.as_str())
}

/// Picks one paper out of a relevance-approved batch. A single paper is
/// returned without a model call; with more, the model is asked for an index
/// and any ambiguity (call failure, no integer, out of range) falls back to
/// the first paper in input order.
pub fn select_best<'a>(llm: &LlmClient, papers: &'a [Candidate]) -> Result<&'a Candidate> {
    if papers.is_empty() {
        bail!("select_best called with an empty batch");
    }
    if papers.len() == 1 {
        return Ok(&papers[0]);
    }

    let reply = match llm.complete(&selection_prompt(papers)) {
        Ok(reply) => reply,
        Err(err) => {
            eprintln!("warning: selection call failed, keeping the first paper: {err:#}");
            return Ok(&papers[0]);
        }
    };
    let index = parse_selection(&reply, papers.len()).unwrap_or_else(|| {
        eprintln!("warning: no usable selection in model reply, keeping the first paper");
        0
    });
    Ok(&papers[index])
}

fn selection_prompt(papers: &[Candidate]) -> String {
    let entries: Vec<String> = papers
        .iter()
        .enumerate()
        .map(|(i, paper)| {
            format!(
                "Paper {}:\nTitle: {}\nAbstract: {}",
                i + 1,
                paper.title,
                truncate_chars(&paper.abstract_text, SELECTOR_ABSTRACT_CAP)
            )
        })
        .collect();
    format!(
        "You are a blockchain research expert choosing the single most valuable and \
         innovative paper out of the {n} blockchain papers below for an in-depth read.\n\
         Weigh these factors:\n\
         1. Novelty and technical depth\n\
         2. Potential impact on the blockchain field\n\
         3. Completeness and practicality of the work\n\
         4. Whether it solves an important problem\n\n\
         {entries}\n\n\
         Reply with only the number of your chosen paper (1-{n}), nothing else.",
        n = papers.len(),
        entries = entries.join("\n\n"),
    )
}

/// First run of digits found anywhere in the reply, if it lands in [1, n].
/// Returned zero-indexed.
fn parse_selection(reply: &str, n: usize) -> Option<usize> {
    let digits: String = reply
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let value: usize = digits.parse().ok()?;
    if (1..=n).contains(&value) {
        Some(value - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Utc;

    fn paper(title: &str) -> Candidate {
        Candidate {
            title: title.to_string(),
            abstract_text: "An abstract.".to_string(),
            authors: vec!["A. Author".to_string()],
            link: format!("http://arxiv.org/abs/{title}"),
            published: Utc::now(),
            comment: None,
        }
    }

    #[test]
    fn only_exact_first_tokens_are_affirmative() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("Yes, clearly on-topic"));
        assert!(is_affirmative("TRUE"));
        assert!(is_affirmative("是"));
        assert!(is_affirmative("✅ definitely"));
        assert!(!is_affirmative("是的"));
        assert!(!is_affirmative("No, this is unrelated"));
        assert!(!is_affirmative("maybe yes"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("   "));
    }

    #[test]
    fn selection_parses_first_integer_anywhere() {
        assert_eq!(parse_selection("I choose paper 2", 3), Some(1));
        assert_eq!(parse_selection("3", 3), Some(2));
        assert_eq!(parse_selection("42nd entry", 50), Some(41));
        assert_eq!(parse_selection("none of them", 3), None);
        assert_eq!(parse_selection("7", 3), None);
        assert_eq!(parse_selection("0", 3), None);
    }

    #[test]
    fn single_candidate_is_returned_without_a_model_call() {
        let llm = LlmClient::new(&Config::default()).unwrap();
        let papers = vec![paper("solo")];
        let chosen = select_best(&llm, &papers).unwrap();
        assert_eq!(chosen.title, "solo");
    }

    #[test]
    fn unparseable_reply_falls_back_to_first() {
        // simulated mode answers "yes", which carries no digits
        let llm = LlmClient::new(&Config::default()).unwrap();
        let papers = vec![paper("first"), paper("second")];
        let chosen = select_best(&llm, &papers).unwrap();
        assert_eq!(chosen.title, "first");
    }

    #[test]
    fn empty_batch_is_a_contract_violation() {
        let llm = LlmClient::new(&Config::default()).unwrap();
        assert!(select_best(&llm, &[]).is_err());
    }
}

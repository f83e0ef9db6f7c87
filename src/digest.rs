use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::llm::LlmClient;

pub const PLACEHOLDER_SUMMARY: &str = "Summary unavailable.";
pub const PLACEHOLDER_INSIGHT: &str = "-";
pub const PLACEHOLDER_RECOMMENDATION: &str = "No recommendation available.";

/// Generated synopsis of one paper. Every field is always populated;
/// downstream rendering never has to handle a missing key.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperDigest {
    pub summary: String,
    pub insights: Vec<String>,
    pub recommendation: String,
}

impl PaperDigest {
    pub fn placeholder() -> Self {
        Self {
            summary: PLACEHOLDER_SUMMARY.to_string(),
            insights: placeholder_insights(),
            recommendation: PLACEHOLDER_RECOMMENDATION.to_string(),
        }
    }
}

fn placeholder_insights() -> Vec<String> {
    vec![PLACEHOLDER_INSIGHT.to_string(); 3]
}

/// Asks the model for a strict-JSON synopsis of the paper. Call failures and
/// unparseable replies degrade to placeholder content instead of erroring.
pub fn generate(llm: &LlmClient, title: &str, abstract_text: &str, link: &str) -> PaperDigest {
    if llm.is_simulated() {
        eprintln!("warning: no model credential configured, using simulated digest");
        thread::sleep(Duration::from_secs(1));
        return PaperDigest {
            summary: "This is a simulated paper summary. With a model credential configured \
                      this would be a generated digest of the selected paper."
                .to_string(),
            insights: vec![
                "Simulated insight 1".to_string(),
                "Simulated insight 2".to_string(),
                "Simulated insight 3".to_string(),
            ],
            recommendation: "This is a simulated recommendation.".to_string(),
        };
    }

    let prompt = digest_prompt(title, abstract_text, link);
    match llm.complete(&prompt) {
        Ok(reply) => parse_digest(&reply),
        Err(err) => {
            eprintln!("warning: summary call failed: {err:#}");
            PaperDigest::placeholder()
        }
    }
}

fn digest_prompt(title: &str, abstract_text: &str, link: &str) -> String {
    format!(
        "You are a professional research-communication assistant who excels at turning \
         complex computer-science research into accessible language.\n\n\
         Read the paper information below and complete these tasks:\n\n\
         1. Summary: one concise paragraph (about 100-150 words) covering the core idea, \
         the problem solved and the main results, written so a non-expert reader gets why \
         the work matters.\n\
         2. Insights: the three most important technical contributions or findings, each \
         under 20 words.\n\
         3. Recommendation: one sentence on why this paper deserves attention.\n\n\
         Title: {title}\n\
         Abstract: {abstract_text}\n\
         Link: {link}\n\n\
         Return strictly the following JSON and nothing else:\n\
         {{\n\
           \"summary\": \"your summary here\",\n\
           \"insights\": [\"insight 1\", \"insight 2\", \"insight 3\"],\n\
           \"recommendation\": \"one sentence that makes the reader curious\"\n\
         }}"
    )
}

/// Strict JSON decode; a non-object reply means the whole placeholder
/// record, a missing or malformed key only that key's placeholder.
fn parse_digest(raw: &str) -> PaperDigest {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(_) => {
            eprintln!("warning: model reply was not valid JSON, using placeholder digest");
            return PaperDigest::placeholder();
        }
    };
    if !value.is_object() {
        eprintln!("warning: model reply was not a JSON object, using placeholder digest");
        return PaperDigest::placeholder();
    }
    PaperDigest {
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| PLACEHOLDER_SUMMARY.to_string()),
        insights: value
            .get("insights")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty())
            .unwrap_or_else(placeholder_insights),
        recommendation: value
            .get("recommendation")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| PLACEHOLDER_RECOMMENDATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_json_reply_becomes_the_placeholder_triple() {
        let digest = parse_digest("Sorry, I cannot produce JSON today.");
        assert_eq!(digest, PaperDigest::placeholder());
        assert_eq!(digest.summary, PLACEHOLDER_SUMMARY);
        assert_eq!(digest.insights, vec!["-", "-", "-"]);
        assert_eq!(digest.recommendation, PLACEHOLDER_RECOMMENDATION);
    }

    #[test]
    fn non_object_json_becomes_the_placeholder_triple() {
        assert_eq!(parse_digest("5"), PaperDigest::placeholder());
        assert_eq!(parse_digest("[1, 2, 3]"), PaperDigest::placeholder());
    }

    #[test]
    fn well_formed_reply_is_taken_verbatim() {
        let digest = parse_digest(
            r#"{"summary": "S", "insights": ["a", "b", "c"], "recommendation": "R"}"#,
        );
        assert_eq!(digest.summary, "S");
        assert_eq!(digest.insights, vec!["a", "b", "c"]);
        assert_eq!(digest.recommendation, "R");
    }

    #[test]
    fn missing_keys_get_their_own_placeholders() {
        let digest = parse_digest(r#"{"summary": "S", "insights": ["a", "b", "c"]}"#);
        assert_eq!(digest.summary, "S");
        assert_eq!(digest.insights, vec!["a", "b", "c"]);
        assert_eq!(digest.recommendation, PLACEHOLDER_RECOMMENDATION);

        let digest = parse_digest(r#"{"recommendation": "R"}"#);
        assert_eq!(digest.summary, PLACEHOLDER_SUMMARY);
        assert_eq!(digest.insights, vec!["-", "-", "-"]);
        assert_eq!(digest.recommendation, "R");
    }

    #[test]
    fn malformed_insight_entries_do_not_poison_the_list() {
        let digest = parse_digest(r#"{"insights": [1, 2, 3]}"#);
        assert_eq!(digest.insights, vec!["-", "-", "-"]);
        let digest = parse_digest(r#"{"insights": ["a", 2, "c"]}"#);
        assert_eq!(digest.insights, vec!["a", "c"]);
    }
}

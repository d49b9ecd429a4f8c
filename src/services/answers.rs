use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const MAX_ANSWERS: usize = 3;
const NO_ANSWER_SNIPPET: &str = "No answer found.";
const PLACEHOLDER_LINK: &str = "#";

/// Bound on the single outbound call. The provider is attempted once, no
/// retries.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

#[derive(Error, Debug)]
enum AskFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Forwards `question` to the search provider and maps the response into
/// at most three answers. Failure never escapes this boundary: a timeout,
/// transport error, or unparseable body degrades into a single answer
/// describing the problem.
pub async fn ask(http: &reqwest::Client, api_key: &str, question: &str) -> Vec<Answer> {
    match fetch(http, api_key, question).await {
        Ok(response) => map_answers(question, response),
        Err(e) => {
            warn!("answer lookup failed: {e}");
            vec![Answer {
                title: question.to_string(),
                snippet: format!("Could not fetch an answer: {e}"),
                link: PLACEHOLDER_LINK.to_string(),
            }]
        }
    }
}

async fn fetch(
    http: &reqwest::Client,
    api_key: &str,
    question: &str,
) -> Result<SearchResponse, AskFailure> {
    let body = http
        .get(SERPAPI_URL)
        .query(&[
            ("q", question),
            ("hl", "tr"),
            ("gl", "tr"),
            ("api_key", api_key),
        ])
        .send()
        .await?
        .bytes()
        .await?;

    Ok(serde_json::from_slice(&body)?)
}

fn map_answers(question: &str, response: SearchResponse) -> Vec<Answer> {
    let answers: Vec<Answer> = response
        .organic_results
        .into_iter()
        .take(MAX_ANSWERS)
        .map(|result| Answer {
            title: result.title.unwrap_or_else(|| question.to_string()),
            snippet: result
                .snippet
                .unwrap_or_else(|| NO_ANSWER_SNIPPET.to_string()),
            link: result.link.unwrap_or_else(|| PLACEHOLDER_LINK.to_string()),
        })
        .collect();

    if answers.is_empty() {
        return vec![Answer {
            title: question.to_string(),
            snippet: NO_ANSWER_SNIPPET.to_string(),
            link: PLACEHOLDER_LINK.to_string(),
        }];
    }
    answers
}

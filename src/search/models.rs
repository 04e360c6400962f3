// Search query and result envelope
// Author: nofomo contributors

use crate::error::{ProxyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_START_INDEX: u64 = 1;
const DEFAULT_RESULT_COUNT: u64 = 10;
const DEFAULT_TOTAL_RESULTS: u64 = 0;

/// Raw query-string parameters of the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub start: Option<String>,
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// 1-based index of the first result; `None` means the first page.
    pub start_offset: Option<u32>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, start_offset: Option<u32>) -> Self {
        Self {
            text: text.into(),
            start_offset,
        }
    }

    /// Validate raw parameters: `q` is required, `start` is kept only above 1.
    pub fn from_params(params: SearchParams) -> Result<Self> {
        let text = params
            .q
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| {
                ProxyError::InvalidRequest("Query parameter \"q\" is required".to_string())
            })?;

        let start_offset = params
            .start
            .and_then(|start| leading_integer(&start))
            .and_then(|start| u32::try_from(start).ok())
            .filter(|start| *start > 1);

        Ok(Self::new(text, start_offset))
    }
}

/// Normalized answer of the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultEnvelope {
    pub results: Vec<Value>,
    #[serde(rename = "searchInformation")]
    pub search_information: Map<String, Value>,
}

impl SearchResultEnvelope {
    /// Reshape a Custom Search response.
    ///
    /// `items` become `results`; the upstream `searchInformation` fields are
    /// kept and extended with `currentStartIndex`, `resultCount` and
    /// `totalResults`, each defaulted when missing, zero or unparseable.
    pub fn from_upstream(mut data: Value) -> Self {
        let results = match data.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let request = data
            .get("queries")
            .and_then(|queries| queries.get("request"))
            .and_then(|request| request.get(0));

        let current_start_index = request
            .and_then(|r| parse_count(r.get("startIndex")))
            .unwrap_or(DEFAULT_START_INDEX);
        let result_count = request
            .and_then(|r| parse_count(r.get("count")))
            .unwrap_or(DEFAULT_RESULT_COUNT);

        let mut search_information = match data.get_mut("searchInformation").map(Value::take) {
            Some(Value::Object(info)) => info,
            _ => Map::new(),
        };

        let total_results = parse_count(search_information.get("totalResults"))
            .unwrap_or(DEFAULT_TOTAL_RESULTS);

        search_information.insert("currentStartIndex".to_string(), current_start_index.into());
        search_information.insert("resultCount".to_string(), result_count.into());
        search_information.insert("totalResults".to_string(), total_results.into());

        Self {
            results,
            search_information,
        }
    }
}

/// Read a positive count given either as a JSON number or a numeric string.
fn parse_count(value: Option<&Value>) -> Option<u64> {
    let count = match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }?;
    (count != 0).then_some(count)
}

/// Integer value of the digits a string starts with, after leading whitespace.
fn leading_integer(s: &str) -> Option<u64> {
    let digits: String = s.trim_start().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

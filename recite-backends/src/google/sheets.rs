//! Google Sheets v4 `values:batchGet` / `values:batchUpdate`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use recite_core::types::SheetRange;
use recite_sync::{BackendError, TabularStore};

use crate::http::{decode_json, from_ureq, TokenSource};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets client reading and writing single columns.
pub struct GoogleSheets {
    agent: ureq::Agent,
    token: TokenSource,
    base_url: String,
}

impl GoogleSheets {
    pub fn new(agent: ureq::Agent, token: TokenSource) -> Self {
        Self {
            agent,
            token,
            base_url: SHEETS_BASE.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: usize,
}

/// First cell of every returned row; rows with no cells become `""`.
fn first_column(response: BatchGetResponse) -> Vec<String> {
    response
        .value_ranges
        .into_iter()
        .next()
        .map(|range| {
            range
                .values
                .iter()
                .map(|row| row.first().map(cell_text).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One-column write: `COLUMNS` orientation, `RAW` input.
fn column_update(range: &SheetRange, values: &[String]) -> BatchUpdateRequest {
    BatchUpdateRequest {
        value_input_option: "RAW",
        data: vec![ValueRange {
            range: range.a1_notation(),
            major_dimension: Some("COLUMNS".to_string()),
            values: vec![values.iter().cloned().map(Value::String).collect()],
        }],
    }
}

impl TabularStore for GoogleSheets {
    fn read(&self, range: &SheetRange) -> Result<Vec<String>, BackendError> {
        let a1 = range.a1_notation();
        let url = format!("{}/{}/values:batchGet", self.base_url, range.sheet_id);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.token.authorization()?)
            .query("ranges", &a1)
            .query("majorDimension", "ROWS")
            .call()
            .map_err(|e| from_ureq("sheets read", e))?;
        let values = first_column(decode_json("sheets read", response)?);
        tracing::info!(
            "retrieved {} cell(s) {a1} from {}",
            values.len(),
            range.sheet_id
        );
        Ok(values)
    }

    fn write(&self, range: &SheetRange, values: &[String]) -> Result<usize, BackendError> {
        let url = format!("{}/{}/values:batchUpdate", self.base_url, range.sheet_id);
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &self.token.authorization()?)
            .send_json(column_update(range, values))
            .map_err(|e| from_ureq("sheets write", e))?;
        let body: BatchUpdateResponse = decode_json("sheets write", response)?;
        Ok(body.total_updated_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_column_keeps_gaps_as_empty_strings() {
        let response: BatchGetResponse = serde_json::from_str(
            r#"{"spreadsheetId":"s","valueRanges":[{"range":"Sheet1!A1:A1000","majorDimension":"ROWS","values":[["こんにちは"],[],["さようなら","ignored"]]}]}"#,
        )
        .expect("parse");
        assert_eq!(first_column(response), vec!["こんにちは", "", "さようなら"]);
    }

    #[test]
    fn missing_values_is_an_empty_column() {
        let response: BatchGetResponse = serde_json::from_str(
            r#"{"spreadsheetId":"s","valueRanges":[{"range":"Sheet1!L1:L1000","majorDimension":"ROWS"}]}"#,
        )
        .expect("parse");
        assert!(first_column(response).is_empty());
    }

    #[test]
    fn non_string_cells_are_rendered() {
        let response: BatchGetResponse =
            serde_json::from_str(r#"{"valueRanges":[{"values":[[12],[true],[null]]}]}"#)
                .expect("parse");
        assert_eq!(first_column(response), vec!["12", "true", ""]);
    }

    #[test]
    fn update_body_is_raw_columns() {
        let range = SheetRange::new("sums", "Sheet1", "L1");
        let body = serde_json::to_value(column_update(
            &range,
            &["32955b2a".to_string(), String::new()],
        ))
        .expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "valueInputOption": "RAW",
                "data": [{
                    "range": "Sheet1!L1:L",
                    "majorDimension": "COLUMNS",
                    "values": [["32955b2a", ""]]
                }]
            })
        );
    }

    #[test]
    fn update_response_defaults_to_zero_cells() {
        let body: BatchUpdateResponse =
            serde_json::from_str(r#"{"spreadsheetId":"s"}"#).expect("parse");
        assert_eq!(body.total_updated_cells, 0);
    }
}

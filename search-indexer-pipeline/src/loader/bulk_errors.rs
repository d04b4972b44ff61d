//! Grouped reporting of bulk failures.

use std::fmt;

use tracing::error;

use search_indexer_repository::{BulkErrorGroup, BulkResponse};

/// Maximum number of document ids listed per error group.
pub const FAILED_IDS_SAMPLE_SIZE: usize = 10;

/// One logged summary of failures sharing a cause.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkErrorReport {
    pub operation: String,
    pub index: String,
    pub document_type: String,
    pub error_type: String,
    pub error_reason: String,
    pub count: usize,
    /// First failed ids, at most [`FAILED_IDS_SAMPLE_SIZE`].
    pub sample_ids: Vec<String>,
}

impl From<&BulkErrorGroup> for BulkErrorReport {
    fn from(group: &BulkErrorGroup) -> Self {
        Self {
            operation: group.operation.clone(),
            index: group.index.clone(),
            document_type: group.document_type.clone(),
            error_type: group.error_type.clone(),
            error_reason: group.error_reason.clone(),
            count: group.count,
            sample_ids: group
                .document_ids
                .iter()
                .take(FAILED_IDS_SAMPLE_SIZE)
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for BulkErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bulk {} operation failed {} times in index {} for type {}. Error ({}) : {}. Failed doc ids sample : {}.",
            self.operation,
            self.count,
            self.index,
            self.document_type,
            self.error_type,
            self.error_reason,
            self.sample_ids.join(", ")
        )
    }
}

/// Log one error entry per failure group of the response.
///
/// Returns the emitted reports; an error-free response logs nothing.
pub fn log_bulk_errors(response: &BulkResponse) -> Vec<BulkErrorReport> {
    if !response.has_errors() {
        return Vec::new();
    }

    let reports: Vec<BulkErrorReport> = response
        .aggregate_errors_by_reason()
        .iter()
        .map(BulkErrorReport::from)
        .collect();

    for report in &reports {
        error!(
            operation = %report.operation,
            index = %report.index,
            document_type = %report.document_type,
            error_type = %report.error_type,
            error_reason = %report.error_reason,
            count = report.count,
            sample_ids = %report.sample_ids.join(", "),
            "{}",
            report
        );
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_indexer_repository::{BulkItem, BulkItemError};

    fn failed(id: usize, error_type: &str) -> BulkItem {
        BulkItem {
            operation: "index".to_string(),
            index: "catalog_default".to_string(),
            document_type: "product".to_string(),
            id: Some(id.to_string()),
            status: 400,
            error: Some(BulkItemError {
                error_type: error_type.to_string(),
                reason: Some(format!("{} reason", error_type)),
            }),
        }
    }

    fn succeeded(id: usize) -> BulkItem {
        BulkItem {
            operation: "index".to_string(),
            index: "catalog_default".to_string(),
            document_type: "product".to_string(),
            id: Some(id.to_string()),
            status: 201,
            error: None,
        }
    }

    #[test]
    fn test_no_errors_logs_nothing() {
        let response = BulkResponse::new(5, vec![succeeded(1), succeeded(2)]);
        assert!(log_bulk_errors(&response).is_empty());
    }

    #[test]
    fn test_one_report_per_group_with_bounded_sample() {
        let mut items: Vec<BulkItem> = (0..15).map(|id| failed(id, "mapper_parsing_exception")).collect();
        items.push(succeeded(100));
        items.extend((200..203).map(|id| failed(id, "version_conflict_engine_exception")));
        let response = BulkResponse::new(5, items);

        let reports = log_bulk_errors(&response);

        assert_eq!(reports.len(), 2);

        assert_eq!(reports[0].count, 15);
        assert_eq!(reports[0].sample_ids.len(), FAILED_IDS_SAMPLE_SIZE);
        assert_eq!(reports[0].sample_ids[0], "0");
        assert_eq!(reports[0].sample_ids[9], "9");

        assert_eq!(reports[1].error_type, "version_conflict_engine_exception");
        assert_eq!(reports[1].count, 3);
        assert_eq!(reports[1].sample_ids, vec!["200", "201", "202"]);
    }

    #[test]
    fn test_report_message() {
        let response = BulkResponse::new(1, vec![failed(7, "mapper_parsing_exception"), failed(8, "mapper_parsing_exception")]);

        let reports = log_bulk_errors(&response);

        assert_eq!(
            reports[0].to_string(),
            "Bulk index operation failed 2 times in index catalog_default for type product. \
             Error (mapper_parsing_exception) : mapper_parsing_exception reason. \
             Failed doc ids sample : 7, 8."
        );
    }
}

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::filter::truncate_chars;
use crate::report::ReportRecord;

const HEADER: &str = "# Blockchain paper history\n\n";
const SUMMARY_CAP: usize = 200;
const RECOMMENDATION_CAP: usize = 100;

/// Appends one record block to the history log, writing the header line only
/// when the file did not previously exist. Append-only; duplicate entries
/// are allowed to accumulate.
pub fn append(path: &Path, record: &ReportRecord, on: NaiveDate) -> Result<()> {
    let existed = path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open history log {}", path.display()))?;
    if !existed {
        file.write_all(HEADER.as_bytes())
            .context("write history header")?;
    }
    let block = format!(
        "## [{}]({})\n\
         - **Date**: {}\n\
         - **Authors**: {}\n\
         - **Summary**: {}\n\
         - **Recommendation**: {}\n\n\
         ---\n",
        record.title,
        record.link,
        on.format("%Y-%m-%d"),
        record.authors.join(", "),
        truncate_chars(&record.summary, SUMMARY_CAP),
        truncate_chars(&record.recommendation, RECOMMENDATION_CAP),
    );
    file.write_all(block.as_bytes())
        .context("write history record")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> ReportRecord {
        ReportRecord {
            title: "Sharded Consensus".to_string(),
            authors: vec!["A. Author".to_string()],
            link: "http://arxiv.org/abs/2507.01234v1".to_string(),
            published: Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap(),
            summary: "s".repeat(300),
            recommendation: "r".repeat(150),
            insights: vec!["one".to_string()],
            venue: None,
            affiliation: None,
        }
    }

    #[test]
    fn header_is_written_once_and_records_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper_history.md");
        let on = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();

        append(&path, &sample_record(), on).unwrap();
        append(&path, &sample_record(), on).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("# Blockchain paper history").count(), 1);
        assert_eq!(content.matches("## [Sharded Consensus]").count(), 2);
        assert!(content.starts_with(HEADER));
    }

    #[test]
    fn long_fields_are_truncated_with_ellipsis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper_history.md");
        let on = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();

        append(&path, &sample_record(), on).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let summary_line = format!("- **Summary**: {}...", "s".repeat(200));
        let rec_line = format!("- **Recommendation**: {}...", "r".repeat(100));
        assert!(content.contains(&summary_line));
        assert!(content.contains(&rec_line));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Report generation.
//!
//! Renders the current ledger snapshot into a fixed-column table document
//! plus a machine-readable JSON side-file. Both artifacts are rebuilt from
//! scratch on every request; neither is a source of truth.

use crate::error::StorageError;
use crate::models::run::MediaRun;
use log::info;
use std::path::{Path, PathBuf};

pub const REPORT_JSON: &str = "defect_information.json";
pub const REPORT_DOCUMENT: &str = "defect_information.html";

const HEADER: [&str; 4] = ["Date", "File", "Type", "Defect Count"];

/// The tabular report contract: fixed header, one row per run in ledger
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub rows: Vec<[String; 4]>,
}

impl ReportTable {
    pub fn header(&self) -> [&str; 4] {
        HEADER
    }
}

/// Build the report table from a ledger snapshot. An empty ledger yields
/// `None`: there is nothing to report and no document should be written.
pub fn build(history: &[MediaRun]) -> Option<ReportTable> {
    if history.is_empty() {
        return None;
    }
    let rows = history
        .iter()
        .map(|run| {
            [
                run.date.to_rfc3339(),
                run.file.clone(),
                run.kind.label().to_string(),
                // Failed runs report zero defects.
                run.defect_count.unwrap_or(0).to_string(),
            ]
        })
        .collect();
    Some(ReportTable {
        title: "Defect report".to_string(),
        rows,
    })
}

/// Paths of the artifacts written for one report request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifacts {
    pub json: PathBuf,
    pub document: PathBuf,
}

/// Serialize the snapshot side-file and render the table document into
/// `report_dir`. Call only with a non-empty table from [`build`].
pub fn write_artifacts(
    history: &[MediaRun],
    table: &ReportTable,
    report_dir: &Path,
) -> Result<ReportArtifacts, StorageError> {
    let json_path = report_dir.join(REPORT_JSON);
    let json = serde_json::to_string_pretty(history)?;
    std::fs::write(&json_path, json).map_err(|source| StorageError::Write {
        path: json_path.clone(),
        source,
    })?;

    let document_path = report_dir.join(REPORT_DOCUMENT);
    std::fs::write(&document_path, render_html(table)).map_err(|source| StorageError::Write {
        path: document_path.clone(),
        source,
    })?;

    info!(
        "report written: {} and {}",
        json_path.display(),
        document_path.display()
    );
    Ok(ReportArtifacts {
        json: json_path,
        document: document_path,
    })
}

fn render_html(table: &ReportTable) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&table.title)));
    html.push_str(
        "<style>\n\
         table { border-collapse: collapse; margin: 1em auto; }\n\
         th, td { border: 1px solid #000; padding: 6px 12px; text-align: center; }\n\
         th { background: #cce5ff; font-size: 12pt; }\n\
         td { background: #f7fbff; }\n\
         h1 { text-align: center; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h1>{}</h1>\n<table>\n<tr>", escape(&table.title)));
    for column in HEADER {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::MediaKind;

    #[test]
    fn test_empty_ledger_builds_nothing() {
        assert!(build(&[]).is_none());
    }

    #[test]
    fn test_rows_follow_ledger_order_and_defaults() {
        let history = vec![
            MediaRun::success("processed_a.mp4".into(), MediaKind::Video, 4),
            MediaRun::failure("b.png".into(), MediaKind::Image, "decode".into()),
        ];
        let table = build(&history).unwrap();

        assert_eq!(table.header(), ["Date", "File", "Type", "Defect Count"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "processed_a.mp4");
        assert_eq!(table.rows[0][2], "Video");
        assert_eq!(table.rows[0][3], "4");
        assert_eq!(table.rows[1][2], "Picture");
        // Failed run has no count; the report shows 0.
        assert_eq!(table.rows[1][3], "0");
    }

    #[test]
    fn test_artifacts_written_and_json_mirrors_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = vec![MediaRun::success("x.png".into(), MediaKind::Image, 1)];
        let table = build(&history).unwrap();

        let artifacts = write_artifacts(&history, &table, dir.path()).unwrap();
        assert!(artifacts.json.is_file());
        assert!(artifacts.document.is_file());

        let side: Vec<MediaRun> =
            serde_json::from_str(&std::fs::read_to_string(&artifacts.json).unwrap()).unwrap();
        assert_eq!(side, history);

        let html = std::fs::read_to_string(&artifacts.document).unwrap();
        assert!(html.contains("<th>Defect Count</th>"));
        assert!(html.contains("x.png"));
    }

    #[test]
    fn test_html_escapes_file_names() {
        let history = vec![MediaRun::success("<evil>&.png".into(), MediaKind::Image, 0)];
        let table = build(&history).unwrap();
        let html = render_html(&table);
        assert!(html.contains("&lt;evil&gt;&amp;.png"));
        assert!(!html.contains("<evil>"));
    }
}

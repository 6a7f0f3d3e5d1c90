//! Argument parsing helpers and terminal rendering of documents.

use anyhow::{Context, Result};
use archiver_core::{Document, DocumentEdit, TaggingStatus};
use chrono::NaiveDate;
use providers::DownloadStatus;
use std::collections::BTreeSet;

/// `"Bill, clothes,,"` -> `{"bill", "clothes"}`
pub fn parse_tags(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {text:?}, expected yyyy-mm-dd"))
}

pub fn edit_from_args(
    date: Option<&str>,
    description: Option<&str>,
    tags: Option<&str>,
) -> Result<DocumentEdit> {
    Ok(DocumentEdit {
        date: date.map(parse_date).transpose()?,
        description: description.map(str::to_string),
        tags: tags.map(parse_tags),
    })
}

pub fn parse_status(text: &str) -> Result<TaggingStatus> {
    match text.to_lowercase().as_str() {
        "tagged" => Ok(TaggingStatus::Tagged),
        "untagged" => Ok(TaggingStatus::Untagged),
        other => anyhow::bail!("unknown status {other:?}, expected tagged|untagged"),
    }
}

fn download_label(status: DownloadStatus) -> String {
    match status {
        DownloadStatus::Local => "local".into(),
        DownloadStatus::Remote => "remote".into(),
        DownloadStatus::Downloading(pct) => format!("{pct:.0}%"),
    }
}

/// One line per document: date, status, download state, tags, path.
pub fn document_line(doc: &Document) -> String {
    let date = doc
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".into());
    let status = match doc.tagging_status() {
        TaggingStatus::Tagged => "tagged",
        TaggingStatus::Untagged => "untagged",
    };
    let tags = doc.tags.iter().cloned().collect::<Vec<_>>().join(",");
    format!(
        "{date}  {status:<8}  {:<7}  [{tags}]  {}",
        download_label(doc.download_status()),
        doc.path().display()
    )
}

pub fn print_documents(docs: &[Document], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(docs)?);
    } else {
        for doc in docs {
            println!("{}", document_line(doc));
        }
        println!("{} document(s)", docs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::FileDetails;
    use std::path::PathBuf;

    #[test]
    fn tags_are_normalised() {
        let tags = parse_tags(" Bill, clothes,,");
        assert_eq!(
            tags,
            ["bill", "clothes"]
                .iter()
                .map(|t| t.to_string())
                .collect::<BTreeSet<String>>()
        );
    }

    #[test]
    fn edit_arguments() {
        let edit = edit_from_args(Some("2021-03-12"), None, Some("bill")).unwrap();
        assert_eq!(edit.date, NaiveDate::from_ymd_opt(2021, 3, 12));
        assert!(edit.description.is_none());
        assert!(edit_from_args(Some("12.03.2021"), None, None).is_err());
        assert!(edit_from_args(None, None, None).unwrap().is_empty());
    }

    #[test]
    fn status_names() {
        assert_eq!(parse_status("Tagged").unwrap(), TaggingStatus::Tagged);
        assert!(parse_status("done").is_err());
    }

    #[test]
    fn line_shows_metadata() {
        let path = PathBuf::from("/archive/2021/2021-03-12--x__bill_tax.pdf");
        let doc = Document::from_details(&FileDetails {
            filename: "2021-03-12--x__bill_tax.pdf".into(),
            path,
            size: 1,
            download_status: DownloadStatus::Downloading(42.0),
        });
        let line = document_line(&doc);
        assert!(line.starts_with("2021-03-12  tagged"));
        assert!(line.contains("42%"));
        assert!(line.contains("[bill,tax]"));
    }
}

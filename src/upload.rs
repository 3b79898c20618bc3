// src/upload.rs
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::client::FraudClient;
use crate::error::UploadError;

/// Header names the batch endpoint requires, case-sensitive
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "step",
    "type",
    "amount",
    "nameOrig",
    "oldbalanceOrg",
    "newbalanceOrig",
    "nameDest",
    "oldbalanceDest",
    "newbalanceDest",
];

pub fn check_file_name(file_name: &str) -> Result<(), UploadError> {
    if file_name.to_ascii_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(UploadError::NotCsv(file_name.to_string()))
    }
}

/// The header row must hold exactly the nine feature columns, in any order.
/// Rows are not inspected; the backend owns ingestion.
pub fn check_header(contents: &[u8]) -> Result<(), UploadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents);
    let headers = reader.headers()?;

    let mut seen = HashSet::new();
    let unexpected: Vec<String> = headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(h) || !seen.insert(*h))
        .map(str::to_string)
        .collect();
    if !unexpected.is_empty() {
        return Err(UploadError::UnexpectedColumns(unexpected));
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !seen.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(UploadError::MissingColumns(missing));
    }

    Ok(())
}

/// Check and forward an in-memory batch file
pub async fn upload_bytes(
    client: &FraudClient,
    file_name: &str,
    contents: Vec<u8>,
) -> Result<serde_json::Value, UploadError> {
    check_file_name(file_name)?;
    check_header(&contents)?;
    let result = client.upload_csv(file_name, contents).await?;
    info!("Batch upload of {} accepted", file_name);
    Ok(result)
}

pub async fn upload_file(client: &FraudClient, path: &Path) -> Result<serde_json::Value, UploadError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    check_file_name(&file_name)?;

    let contents = tokio::fs::read(path).await?;
    upload_bytes(client, &file_name, contents).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "step,type,amount,nameOrig,oldbalanceOrg,newbalanceOrig,nameDest,oldbalanceDest,newbalanceDest";

    #[test]
    fn exact_header_passes() {
        let csv = format!("{}\n1,PAYMENT,9839.64,C1,170136,160296.36,M1,0,0\n", HEADER);
        assert!(check_header(csv.as_bytes()).is_ok());
    }

    #[test]
    fn column_order_does_not_matter() {
        let csv = "type, step ,amount,nameDest,nameOrig,oldbalanceOrg,newbalanceOrig,oldbalanceDest,newbalanceDest\n";
        assert!(check_header(csv.as_bytes()).is_ok());
    }

    #[test]
    fn missing_column_is_named() {
        let csv = "step,type,amount,nameOrig,oldbalanceOrg,newbalanceOrig,nameDest,oldbalanceDest\n";
        match check_header(csv.as_bytes()) {
            Err(UploadError::MissingColumns(cols)) => assert_eq!(cols, vec!["newbalanceDest"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn extra_duplicate_or_miscased_columns_rejected() {
        for extra in ["isFraud", "amount", "NAMEORIG"] {
            let csv = format!("{},{}\n", HEADER, extra);
            assert!(matches!(
                check_header(csv.as_bytes()),
                Err(UploadError::UnexpectedColumns(_))
            ));
        }
    }

    #[test]
    fn empty_file_reports_all_columns_missing() {
        match check_header(b"") {
            Err(UploadError::MissingColumns(cols)) => assert_eq!(cols.len(), 9),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn only_csv_extension_accepted() {
        assert!(check_file_name("batch.CSV").is_ok());
        assert!(matches!(
            check_file_name("batch.xlsx"),
            Err(UploadError::NotCsv(_))
        ));
    }
}

use anyhow::Result;
use elective_ledger::utils::validation::Validate;
use elective_ledger::{
    AllocationLedger, Candidate, ConfigProvider, LedgerError, SheetStore, StoreSettings,
    SubmissionState, TomlConfig,
};
use httpmock::prelude::*;

const SHEET_CSV: &str = "Name,PRN,Email,Elective 1,Elective 2\n\
                         Jane Doe,234567890,jane@x.com,Financial Modeling,Pricing\n\
                         John Roe,345678901,john@x.com,Financial Modeling,Entrepreneurship\n";

fn toml_for(server: &MockServer) -> String {
    format!(
        r#"
[form]
title = "Elective Selection"

[store]
type = "sheet"
read_url = "{}"
append_url = "{}"
credential = "service-token"
timeout_seconds = 5

[catalog.capacity_overrides]
"Financial Modeling" = 2
"#,
        server.url("/pub?output=csv"),
        server.url("/append")
    )
}

fn ledger_from(server: &MockServer) -> Result<AllocationLedger<SheetStore, TomlConfig>> {
    let config = TomlConfig::from_toml_str(&toml_for(server))?;
    config.validate()?;

    let store = match config.store_settings()? {
        StoreSettings::Sheet {
            read_url,
            append_url,
            credential,
        } => SheetStore::new(read_url, append_url, credential, config.request_timeout())?,
        other => panic!("unexpected store settings {:?}", other),
    };
    Ok(AllocationLedger::new(store, config))
}

#[tokio::test]
async fn test_seat_board_from_published_sheet() -> Result<()> {
    let server = MockServer::start();
    let sheet_mock = server.mock(|when, then| {
        when.method(GET).path("/pub");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(SHEET_CSV);
    });

    let ledger = ledger_from(&server)?;
    let snapshot = ledger.load_snapshot().await?;
    let board = ledger.available_electives(&snapshot);

    sheet_mock.assert();
    // Financial Modeling 已滿（2/2）
    assert!(board.resolve("Financial Modeling").is_none());
    assert_eq!(board.resolve("Pricing").map(|l| l.remaining), Some(59));
    assert_eq!(board.listings().len(), 14);
    Ok(())
}

#[tokio::test]
async fn test_submission_appends_through_sheet_api() -> Result<()> {
    let server = MockServer::start();
    let sheet_mock = server.mock(|when, then| {
        when.method(GET).path("/pub");
        then.status(200).body(SHEET_CSV);
    });
    let append_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/append")
            .header("Authorization", "Bearer service-token")
            .json_body(serde_json::json!({
                "values": [["Ada Lovelace", "456789012", "ada@x.com", "Machine learning", "Pricing"]]
            }));
        then.status(200).json_body(serde_json::json!({"updates": {"updatedRows": 1}}));
    });

    let ledger = ledger_from(&server)?;
    let attempt = ledger
        .submit(&Candidate::new(
            " Ada Lovelace ",
            "456789012",
            "ada@x.com",
            vec!["Machine learning".to_string(), "Pricing".to_string()],
        ))
        .await?;

    sheet_mock.assert();
    append_mock.assert();
    assert!(matches!(attempt.state(), SubmissionState::Appended(_)));
    Ok(())
}

#[tokio::test]
async fn test_full_elective_never_reaches_append() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pub");
        then.status(200).body(SHEET_CSV);
    });
    let append_mock = server.mock(|when, then| {
        when.method(POST).path("/append");
        then.status(200);
    });

    let ledger = ledger_from(&server)?;
    let attempt = ledger
        .submit(&Candidate::new(
            "Ada Lovelace",
            "456789012",
            "ada@x.com",
            vec!["Pricing".to_string(), "Financial Modeling".to_string()],
        ))
        .await?;

    append_mock.assert_hits(0);
    assert!(matches!(
        attempt.into_result(),
        Err(LedgerError::Rejected(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_append_rejected_by_sheet_is_write_failed() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pub");
        then.status(200).body(SHEET_CSV);
    });
    let append_mock = server.mock(|when, then| {
        when.method(POST).path("/append");
        then.status(503).body("backend unavailable");
    });

    let ledger = ledger_from(&server)?;
    let attempt = ledger
        .submit(&Candidate::new(
            "Ada Lovelace",
            "456789012",
            "ada@x.com",
            vec!["Machine learning".to_string(), "Pricing".to_string()],
        ))
        .await?;

    append_mock.assert();
    match attempt.state() {
        SubmissionState::WriteFailed { reason, .. } => assert!(reason.contains("503")),
        other => panic!("expected write failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_unreachable_sheet_aborts_with_source_unavailable() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pub");
        then.status(500);
    });

    let ledger = ledger_from(&server)?;
    let err = ledger.load_snapshot().await.unwrap_err();

    assert!(matches!(err, LedgerError::SourceUnavailable { .. }));
    assert_eq!(
        err.user_friendly_message(),
        "Error reading data from the online sheet."
    );
    Ok(())
}

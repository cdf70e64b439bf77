use anyhow::Result;
use elective_ledger::{
    AllocationLedger, Candidate, Catalog, CsvFileStore, LedgerConfig, LedgerError, Rejection,
    SubmissionState, TabularStore,
};
use std::collections::HashMap;
use tempfile::TempDir;

fn candidate(name: &str, prn: &str, email: &str, electives: &[&str]) -> Candidate {
    Candidate::new(
        name,
        prn,
        email,
        electives.iter().map(|e| e.to_string()).collect(),
    )
}

fn ledger_in(dir: &TempDir, config: LedgerConfig) -> AllocationLedger<CsvFileStore, LedgerConfig> {
    AllocationLedger::new(CsvFileStore::new(dir.path().join("enrollments.csv")), config)
}

#[tokio::test]
async fn test_end_to_end_submission_with_csv_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    // 空表：所有課程都有名額
    let snapshot = ledger.load_snapshot().await?;
    assert!(snapshot.is_empty());
    assert_eq!(ledger.available_electives(&snapshot).listings().len(), 15);

    let attempt = ledger
        .submit(&candidate(
            "Jane Doe",
            "234567890",
            "jane@x.com",
            &["Pricing", "Entrepreneurship"],
        ))
        .await?;
    assert!(matches!(attempt.state(), SubmissionState::Appended(_)));

    let after = ledger.load_snapshot().await?;
    assert_eq!(after.usage("Pricing"), 1);
    assert_eq!(after.usage("Entrepreneurship"), 1);

    let board = ledger.available_electives(&after);
    assert_eq!(
        board.resolve("Pricing").map(|l| l.label()),
        Some("Pricing (Seats Left: 59/60)".to_string())
    );

    // 連續讀取結果一致
    let again = ledger.load_snapshot().await?;
    assert_eq!(after.usage_map(), again.usage_map());
    Ok(())
}

#[tokio::test]
async fn test_resubmitting_same_prn_is_duplicate_regardless_of_other_fields() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    ledger
        .submit(&candidate(
            "Jane Doe",
            "123456789",
            "jane@x.com",
            &["Pricing", "Entrepreneurship"],
        ))
        .await?;

    let attempt = ledger
        .submit(&candidate(
            "Someone Else",
            "123456789",
            "other@y.org",
            &["Behavioral Finance", "Machine learning"],
        ))
        .await?;

    match attempt.state() {
        SubmissionState::Rejected(rejection) => {
            assert_eq!(
                rejection,
                &Rejection::DuplicatePrn {
                    prn: "123456789".to_string()
                }
            );
            assert!(rejection.is_warning());
        }
        other => panic!("expected duplicate PRN warning, got {:?}", other),
    }
    assert_eq!(ledger.store().read_all_rows().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_small_capacity_elective_fills_up() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let overrides = HashMap::from([("Financial Modeling".to_string(), 5)]);
    let config = LedgerConfig {
        catalog: Catalog::new(
            [
                "Financial Modeling",
                "Pricing",
                "Entrepreneurship",
                "Behavioral Finance",
            ],
            60,
            &overrides,
        ),
        ..LedgerConfig::default()
    };
    let ledger = ledger_in(&temp_dir, config);

    for i in 0..5 {
        let attempt = ledger
            .submit(&candidate(
                "Student Name",
                &format!("10000000{}", i),
                "s@x.com",
                &["Financial Modeling", "Pricing"],
            ))
            .await?;
        assert!(matches!(attempt.state(), SubmissionState::Appended(_)));
    }

    let snapshot = ledger.load_snapshot().await?;
    let board = ledger.available_electives(&snapshot);
    assert!(board.resolve("Financial Modeling").is_none());
    assert!(board.listings().iter().all(|l| l.remaining > 0));

    let attempt = ledger
        .submit(&candidate(
            "Late Student",
            "200000000",
            "late@x.com",
            &["Entrepreneurship", "Financial Modeling"],
        ))
        .await?;
    assert!(matches!(
        attempt.into_result(),
        Err(LedgerError::Rejected(Rejection::ElectiveFull { ref elective })) if elective == "Financial Modeling"
    ));

    assert!(ledger.audit().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_validation_order_is_preserved() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    let cases = [
        (candidate("", "12345", "a@b", &["Pricing"]), Rejection::MissingField),
        (candidate("John3", "12345", "a@b", &["Pricing"]), Rejection::InvalidName),
        (candidate("John", "12345", "a@b", &["Pricing"]), Rejection::InvalidPrn),
        (candidate("John", "123456789", "a@b", &["Pricing"]), Rejection::InvalidEmail),
        (
            candidate("John", "123456789", "a@b.com", &["Pricing"]),
            Rejection::WrongSelectionCount { count: 1 },
        ),
    ];

    for (input, expected) in cases {
        let attempt = ledger.submit(&input).await?;
        assert_eq!(attempt.state(), &SubmissionState::Rejected(expected));
    }

    // 沒有任何寫入
    assert!(ledger.store().read_all_rows().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_read_only_mode_validates_without_saving() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = LedgerConfig {
        read_only: true,
        ..LedgerConfig::default()
    };
    let ledger = ledger_in(&temp_dir, config);

    let attempt = ledger
        .submit(&candidate(
            "Jane Doe",
            "234567890",
            "jane@x.com",
            &["Pricing", "Entrepreneurship"],
        ))
        .await?;

    assert!(matches!(attempt.state(), SubmissionState::Accepted(_)));
    assert!(!temp_dir.path().join("enrollments.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_malformed_store_is_source_unavailable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("enrollments.csv"),
        "Name,PRN,Email,Elective 1,Elective 2\nJane Doe,234567890\n",
    )?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    let err = ledger.load_snapshot().await.unwrap_err();
    assert!(matches!(err, LedgerError::SourceUnavailable { .. }));
    Ok(())
}

#[tokio::test]
async fn test_existing_sheet_export_with_extra_columns() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("enrollments.csv"),
        "Timestamp,Name,PRN,Email,Elective 1,Elective 2\n\
         2024-06-01 10:00,Jane Doe,234567890,jane@x.com,Pricing,Entrepreneurship\n",
    )?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    let attempt = ledger
        .submit(&candidate(
            "John Roe",
            "345678901",
            "john@x.com",
            &["Pricing", "Behavioral Finance"],
        ))
        .await?;
    assert!(matches!(attempt.state(), SubmissionState::Appended(_)));

    let snapshot = ledger.load_snapshot().await?;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.usage("Pricing"), 2);
    assert_eq!(snapshot.records()[1].name, "John Roe");
    Ok(())
}

#[tokio::test]
async fn test_submission_after_hand_edited_file_without_final_newline() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("enrollments.csv"),
        "Name,PRN,Email,Elective 1,Elective 2\n\
         Jane Doe,234567890,jane@x.com,Pricing,Entrepreneurship",
    )?;
    let ledger = ledger_in(&temp_dir, LedgerConfig::default());

    let attempt = ledger
        .submit(&candidate(
            "John Roe",
            "345678901",
            "john@x.com",
            &["Pricing", "Behavioral Finance"],
        ))
        .await?;
    assert!(matches!(attempt.state(), SubmissionState::Appended(_)));

    let snapshot = ledger.load_snapshot().await?;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.usage("Entrepreneurship"), 1);
    assert_eq!(snapshot.usage("Pricing"), 2);
    Ok(())
}

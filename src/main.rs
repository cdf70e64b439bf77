use clap::Parser;
use elective_ledger::utils::error::ErrorSeverity;
use elective_ledger::utils::{logger, validation::Validate};
use elective_ledger::{
    AllocationLedger, Candidate, CliConfig, Command, ConfigProvider, CsvFileStore, LedgerError,
    Result, SheetStore, StoreSettings, SubmissionState, TabularStore, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting elective-ledger");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => run_with_toml(path, &cli).await,
        None => run_with_flags(&cli).await,
    };

    if let Err(e) = outcome {
        exit_with(&e);
    }

    Ok(())
}

async fn run_with_toml(path: &str, cli: &CliConfig) -> Result<()> {
    tracing::info!("📁 Loading configuration from: {}", path);
    let mut config = TomlConfig::from_file(path)?;
    cli.apply_to(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded: {}", config.title());

    let store = config.store_settings()?;
    dispatch(config, store, &cli.command).await
}

async fn run_with_flags(cli: &CliConfig) -> Result<()> {
    let config = cli.ledger_config()?;
    let store = cli.store_settings()?;
    dispatch(config, store, &cli.command).await
}

async fn dispatch<C: ConfigProvider>(
    config: C,
    store: StoreSettings,
    command: &Command,
) -> Result<()> {
    match store {
        StoreSettings::Sheet {
            read_url,
            append_url,
            credential,
        } => {
            let store = SheetStore::new(read_url, append_url, credential, config.request_timeout())?;
            if store.is_read_only() && !config.read_only() {
                tracing::warn!("⚠️ No append endpoint configured; submissions will fail to save");
            }
            run(AllocationLedger::new(store, config), command).await
        }
        StoreSettings::CsvFile { path } => {
            run(AllocationLedger::new(CsvFileStore::new(path), config), command).await
        }
    }
}

async fn run<S: TabularStore, C: ConfigProvider>(
    ledger: AllocationLedger<S, C>,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Seats { json } => show_seats(&ledger, *json).await,
        Command::Submit {
            name,
            prn,
            email,
            electives,
        } => submit(&ledger, name, prn, email, electives).await,
        Command::Audit => audit(&ledger).await,
    }
}

async fn show_seats<S: TabularStore, C: ConfigProvider>(
    ledger: &AllocationLedger<S, C>,
    json: bool,
) -> Result<()> {
    let snapshot = ledger.load_snapshot().await?;
    if snapshot.is_empty() {
        tracing::warn!("⚠️ Connected to the enrollment sheet, but no data found.");
    } else {
        tracing::info!("✅ Read {} enrollment records", snapshot.len());
    }

    let board = ledger.available_electives(&snapshot);
    if json {
        println!("{}", serde_json::to_string_pretty(board.listings())?);
        return Ok(());
    }

    if board.is_empty() {
        println!("All electives are full.");
    }
    for listing in board.listings() {
        println!("[{:>2}] {}", listing.id, listing.label());
    }
    Ok(())
}

async fn submit<S: TabularStore, C: ConfigProvider>(
    ledger: &AllocationLedger<S, C>,
    name: &str,
    prn: &str,
    email: &str,
    selected: &[String],
) -> Result<()> {
    // 用顯示時的名額表把 id / 標籤換回課程名稱；最終仍以重新讀取的資料判斷
    let board = ledger.available_electives(&ledger.load_snapshot().await?);
    let electives = selected
        .iter()
        .map(|token| {
            board
                .resolve(token)
                .map(|listing| listing.name.clone())
                .unwrap_or_else(|| token.clone())
        })
        .collect();

    let candidate = Candidate::new(name, prn, email, electives);
    let attempt = ledger.submit(&candidate).await?;

    match attempt.state() {
        SubmissionState::Appended(_) => {
            println!("✅ Your electives have been recorded successfully!");
        }
        SubmissionState::Accepted(_) => {
            println!("✅ Your electives have been recorded successfully!");
            println!("ℹ️ However, this is a read-only version. Your submission has not been saved.");
            println!("Please contact the admin to enable data submission to the sheet.");
        }
        SubmissionState::Rejected(rejection) if rejection.is_warning() => {
            println!("⚠️ {}", rejection);
            return Ok(());
        }
        _ => {}
    }
    attempt.into_result().map(|_| ())
}

async fn audit<S: TabularStore, C: ConfigProvider>(ledger: &AllocationLedger<S, C>) -> Result<()> {
    let report = ledger.audit().await?;
    if report.is_empty() {
        println!("✅ No elective is over capacity.");
    }
    for over in &report {
        println!(
            "⚠️ {}: {}/{} (+{})",
            over.elective,
            over.usage,
            over.capacity,
            over.excess()
        );
    }
    Ok(())
}

fn exit_with(e: &LedgerError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,      // 提醒
        ErrorSeverity::Medium => 2,   // 需重新提交
        ErrorSeverity::High => 1,     // 輸入或配置錯誤
        ErrorSeverity::Critical => 3, // 資料來源無法使用
    };
    std::process::exit(exit_code);
}

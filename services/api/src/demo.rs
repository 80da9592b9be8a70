use crate::cli::RejectionDisplayArg;
use crate::infra::{InMemoryCredentialExchange, InMemoryLoanRepository};
use clap::Args;
use loan_desk::config::AppConfig;
use loan_desk::error::AppError;
use loan_desk::workflows::approval::{LoanApprovalService, LoanEntry, LoanRepository};
use loan_desk::workflows::session::{
    CallOptions, Credentials, FileTokenStore, NewAccount, RecordingCacheInvalidator,
    SessionManager, TokenStore, PROFILE_CACHE_KEY, TOKEN_KEY,
};
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_USERNAME: &str = "john";
const DEMO_EMAIL: &str = "john@example.com";
const DEMO_PASSWORD: &str = "secret123";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Amount suggested for the demo loan
    #[arg(long, default_value_t = 500.0)]
    pub(crate) amount: f64,
    /// Reject the loan instead of approving it
    #[arg(long)]
    pub(crate) reject: bool,
    /// Which milestone renders as failed for rejected loans
    #[arg(long, value_enum, default_value_t = RejectionDisplayArg::Suggested)]
    pub(crate) rejection_display: RejectionDisplayArg,
    /// Token file used for the session portion (defaults to APP_TOKEN_PATH)
    #[arg(long)]
    pub(crate) token_file: Option<PathBuf>,
    /// Leave the token on disk instead of signing out at the end
    #[arg(long)]
    pub(crate) keep_session: bool,
    /// Skip the session portion of the demo.
    #[arg(long)]
    pub(crate) skip_session: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        amount,
        reject,
        rejection_display,
        token_file,
        keep_session,
        skip_session,
    } = args;

    println!("Loan approval demo");
    let repository = Arc::new(InMemoryLoanRepository::default());
    let service = LoanApprovalService::with_display(repository, rejection_display.into());

    let entry = service.open()?;
    render_loan(&service, &entry);

    if let Err(err) = service.approve(&entry.loan_id) {
        println!("  Approve before suggesting refused: {err}");
    }
    if let Err(err) = service.suggest(&entry.loan_id, Some(0.0)) {
        println!("  Zero suggestion refused: {err}");
    }

    let entry = service.suggest(&entry.loan_id, Some(amount))?;
    render_loan(&service, &entry);

    let entry = if reject {
        service.reject(&entry.loan_id)?
    } else {
        service.approve(&entry.loan_id)?
    };
    render_loan(&service, &entry);

    if skip_session {
        return Ok(());
    }

    let config = AppConfig::load()?;
    let token_path = token_file.unwrap_or(config.session.token_path.clone());
    println!("\nSession demo (token file: {})", token_path.display());

    let store = Arc::new(FileTokenStore::new(token_path));
    let cache = Arc::new(RecordingCacheInvalidator::default());
    let manager = SessionManager::from_config(store.clone(), cache.clone(), &config.session);
    let exchange = InMemoryCredentialExchange::with_account(DEMO_USERNAME, DEMO_EMAIL, DEMO_PASSWORD);

    // The in-memory exchange forgets its tokens between runs, so a token kept by an earlier
    // run is rejected here and cleared from disk.
    let had_token = store.get(TOKEN_KEY).ok().flatten().is_some();
    match manager.resume(&exchange, CallOptions::default()).await? {
        Some(session) => println!("  Resumed session for {:?}", session.user().username),
        None if had_token => println!("  Stale token on disk was rejected and cleared"),
        None => println!("  No persisted token to resume"),
    }

    let declined = manager
        .register(
            NewAccount {
                username: "jane".to_string(),
                password: "abc12".to_string(),
                confirm_password: "abc12".to_string(),
                agree_to_terms: false,
            },
            &exchange,
            CallOptions::default(),
        )
        .await;
    if let Err(err) = declined {
        println!("  Registration refused: {err}");
    }

    if let Err(err) = manager
        .authenticate(
            Credentials::username(DEMO_USERNAME, "wrong-password"),
            &exchange,
            CallOptions::default(),
        )
        .await
    {
        println!("  Login refused: {err}");
    }

    let session = manager
        .authenticate(
            Credentials::email(DEMO_EMAIL, DEMO_PASSWORD),
            &exchange,
            CallOptions::default(),
        )
        .await?;
    println!(
        "  Signed in as {} at {}",
        session.user().display_name.as_deref().unwrap_or("unknown"),
        session.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    report_session_state(&store, &cache);

    if keep_session {
        println!("  Session kept; the token stays on disk until the next run clears it");
        return Ok(());
    }

    manager.logout()?;
    manager.logout()?;
    println!("  Signed out (twice, second call is a no-op)");
    report_session_state(&store, &cache);
    Ok(())
}

fn render_loan<R>(service: &LoanApprovalService<R>, entry: &LoanEntry)
where
    R: LoanRepository + 'static,
{
    let view = service.view(entry);
    let amount = view
        .suggested_amount
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let steps = view
        .steps
        .iter()
        .map(|step| format!("{}={:?}", step.title, step.state))
        .collect::<Vec<_>>()
        .join(" | ");
    let actions = view
        .actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "- {} [{}] amount {} :: {}",
        view.loan_id, view.status, amount, steps
    );
    if let Some(outcome) = view.outcome {
        println!("  {outcome}");
    } else {
        println!("  Available actions: {actions}");
    }
}

fn report_session_state(store: &FileTokenStore, cache: &RecordingCacheInvalidator) {
    let token = match store.get(TOKEN_KEY) {
        Ok(Some(_)) => "present",
        Ok(None) => "absent",
        Err(_) => "unreadable",
    };
    println!(
        "  Persisted token: {token} | profile cache invalidations: {}",
        cache.count(PROFILE_CACHE_KEY)
    );
}

use anyhow::{bail, Result};
use edusp_autopilot::utils::logging;
use edusp_autopilot::{App, Config, TaskFilter};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();
    logging::log_startup(config.max_concurrent_tasks, config.mock_mode);

    let (ra, password) = if config.mock_mode {
        ("123456".to_string(), "senha".to_string())
    } else {
        match (std::env::var("EDUSP_RA"), std::env::var("EDUSP_PASSWORD")) {
            (Ok(ra), Ok(password)) => (ra, password),
            _ => bail!("EDUSP_RA and EDUSP_PASSWORD must be set (or enable MOCK_MODE=true)"),
        }
    };

    let app = App::new(config)?;

    let login = app.login(&ra, &password).await;
    let Some(session) = login.payload else {
        bail!(login.message.unwrap_or_else(|| "login failed".to_string()));
    };

    let listing = app.list_assignments(&session.token, TaskFilter::Pending).await;
    let Some(tasks) = listing.payload else {
        bail!(listing.message.unwrap_or_else(|| "listing failed".to_string()));
    };

    if tasks.is_empty() {
        tracing::info!("no pending tasks, nothing to do");
        return Ok(());
    }

    let pacing = app.default_pacing();
    let response = app.process_batch(&session.token, tasks, pacing, false).await;
    if let Some(outcomes) = response.payload {
        logging::log_batch_summary(&outcomes);
    }

    Ok(())
}

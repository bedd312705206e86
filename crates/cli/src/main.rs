use clap::Parser;
use market_pulse_core::dashboard::{Dashboard, LOADING_MESSAGE};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "market_pulse", about = "Macro indicator dashboard with an on-demand market summary")]
struct Args {
    /// Generate a market summary once the indicators are shown.
    #[arg(long)]
    summarize: bool,

    /// Keep the session open: `s` summarizes the shown snapshot again, `q` quits.
    #[arg(long)]
    interactive: bool,

    /// Print the dashboard as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = market_pulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let llm = market_pulse_core::llm::openai::OpenAiClient::from_settings(&settings)?;
    let fred = market_pulse_core::ingest::fred::FredClient::from_settings(&settings)?;

    eprintln!("{LOADING_MESSAGE}");
    let mut dashboard = Dashboard::load(&fred, &settings.series).await;

    if args.summarize {
        let res = dashboard.request_summary(&llm).await;
        print_dashboard(&dashboard, args.json)?;
        if let Err(err) = res {
            sentry_anyhow::capture_anyhow(&err);
            if !args.interactive {
                return Err(err);
            }
        }
    } else {
        print_dashboard(&dashboard, args.json)?;
    }

    if !args.interactive {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("[s]ummarize, [q]uit > ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "s" | "summarize" => {
                eprintln!("Generating market summary...");
                if let Err(err) = dashboard.request_summary(&llm).await {
                    sentry_anyhow::capture_anyhow(&err);
                }
                print_dashboard(&dashboard, args.json)?;
            }
            "q" | "quit" => break,
            "" => {}
            other => eprintln!("unknown command: {other}"),
        }
    }

    Ok(())
}

fn print_dashboard(dashboard: &Dashboard, json: bool) -> anyhow::Result<()> {
    let view = dashboard.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render::text(&view));
    }
    Ok(())
}

fn init_sentry(settings: &market_pulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use pulseboard_client::{ClientConfig, DashboardCache, HttpApi, RefreshScheduler, Resolver};
use pulseboard_core::export::{export, ExportFormat, ExportTable};
use pulseboard_core::metrics::HealthStatus;
use pulseboard_core::view::{AudienceView, CampaignsView, DashboardView, RevenueView};

const USAGE: &str = "usage:
  pulseboard-report [dashboard|campaigns|revenue|audience|status]
  pulseboard-report export <overview|campaigns|revenue> [--format csv|document] [--out DIR]
  pulseboard-report watch";

enum Command {
    View(String),
    Export {
        dataset: String,
        format: ExportFormat,
        out: PathBuf,
    },
    Watch,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::View("dashboard".to_string()));
    };
    match first.as_str() {
        "export" => {
            let dataset = args
                .get(1)
                .cloned()
                .ok_or_else(|| anyhow!("export needs a dataset\n{USAGE}"))?;
            let mut format = ExportFormat::Csv;
            let mut out = PathBuf::from(".");
            let mut rest = args[2..].iter();
            while let Some(flag) = rest.next() {
                let value = rest
                    .next()
                    .ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"))?;
                match flag.as_str() {
                    "--format" => format = value.parse().map_err(|e: String| anyhow!(e))?,
                    "--out" => out = PathBuf::from(value),
                    other => bail!("unknown flag {other}\n{USAGE}"),
                }
            }
            Ok(Command::Export {
                dataset,
                format,
                out,
            })
        }
        "watch" => Ok(Command::Watch),
        "-h" | "--help" => bail!("{USAGE}"),
        view => Ok(Command::View(view.to_string())),
    }
}

async fn print_view(resolver: &Resolver<HttpApi>, view: &str) -> Result<()> {
    let body = match view {
        "dashboard" => {
            let (latest, history, campaigns, revenue) = tokio::join!(
                resolver.latest_overview(),
                resolver.overview_history(),
                resolver.campaigns(),
                resolver.revenue(),
            );
            serde_json::to_value(DashboardView::build(
                Some(&latest.data),
                &history.data,
                &campaigns.data,
                &revenue.data,
            ))?
        }
        "campaigns" => {
            serde_json::to_value(CampaignsView::build(&resolver.campaigns().await.data))?
        }
        "revenue" => serde_json::to_value(RevenueView::build(&resolver.revenue().await.data))?,
        "audience" => {
            let latest = resolver.latest_overview().await;
            serde_json::to_value(AudienceView::build(Some(&latest.data), Utc::now()))?
        }
        "status" => {
            resolver.refresh_all().await;
            let health = resolver.cache().get::<HealthStatus>().await;
            let demo = resolver.demo_mode().await;
            json!({ "health": health, "domains": demo })
        }
        other => bail!("unknown view {other}\n{USAGE}"),
    };
    let demo = resolver.demo_mode().await;
    let output = json!({ "view": view, "demo_mode": demo.any(), "data": body });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn write_export(
    resolver: &Resolver<HttpApi>,
    dataset: &str,
    format: ExportFormat,
    out: PathBuf,
) -> Result<()> {
    let table = match dataset {
        "overview" => ExportTable::from_records(
            Some("Overview Metrics".to_string()),
            &resolver.overview_history().await.data,
        ),
        "campaigns" => ExportTable::from_records(
            Some("Campaign Performance".to_string()),
            &resolver.campaigns().await.data,
        ),
        "revenue" => ExportTable::from_records(
            Some("Revenue Report".to_string()),
            &resolver.revenue().await.data,
        ),
        other => bail!("unknown dataset {other}\n{USAGE}"),
    };
    let stem = format!("{dataset}-{}", Utc::now().format("%Y-%m-%d"));
    let artifact = export(format, &table, &stem, Utc::now())?;
    std::fs::create_dir_all(&out)?;
    let path = out.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = table.rows.len(),
        content_type = artifact.content_type,
        "export written"
    );
    println!("{}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pulseboard_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let cfg = ClientConfig::from_env().map_err(|e| anyhow!(e))?;
    let api = HttpApi::new(&cfg)?;
    info!(api_url = %cfg.api_url, fallback = ?cfg.fallback, "resolver ready");
    let resolver = Arc::new(Resolver::new(api, Arc::new(DashboardCache::new()), cfg.fallback));

    match command {
        Command::View(view) => print_view(&resolver, &view).await,
        Command::Export {
            dataset,
            format,
            out,
        } => write_export(&resolver, &dataset, format, out).await,
        Command::Watch => {
            resolver.refresh_all().await;
            let scheduler = RefreshScheduler::spawn(Arc::clone(&resolver), cfg.refresh_tick);
            tokio::signal::ctrl_c().await.ok();
            scheduler.shutdown().await;
            Ok(())
        }
    }
}

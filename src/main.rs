use anyhow::Result;
use fleetpipe::{
    aggregate,
    config::PipelineConfig,
    error::PipelineError,
    extract,
    render::{self, BitmapRenderer, Renderer},
    store::{mem::MemFleet, pg::PgFleet},
    transform::{self, HeaderMode},
};
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) assemble config ──────────────────────────────────────────
    let cfg = PipelineConfig::load(std::env::args().nth(1))?;
    info!(source = %cfg.source.display(), output = %cfg.output_dir.display(), "configured");

    // ─── 3) extract + normalize ──────────────────────────────────────
    let raw = extract::read_table(&cfg.source)?;
    let ships = transform::normalize(&raw, HeaderMode::Positional)?;

    // ─── 4) load, then re-read the persisted snapshot ────────────────
    let ships = match &cfg.store {
        Some(store_cfg) => {
            let mut fleet = PgFleet::connect(store_cfg).await?;
            let loaded = fleet.replace_all(&ships).await?;
            info!(rows = loaded, table = %store_cfg.table, "data loaded successfully");
            fleet.fetch_all().await?
        }
        None => {
            warn!("no store configured; keeping the run in memory");
            let mut fleet = MemFleet::new();
            fleet.replace_all(&ships)?;
            fleet.fetch_all()
        }
    };

    // ─── 5) aggregate ────────────────────────────────────────────────
    let views = match aggregate::derive_views(&ships) {
        Ok(views) => views,
        Err(PipelineError::EmptyDataset) => {
            warn!("no rows to aggregate; no charts produced");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // ─── 6) render one artifact per view ─────────────────────────────
    fs::create_dir_all(&cfg.output_dir)?;
    let renderer = BitmapRenderer::default();
    for view in &views {
        let dest = render::artifact_path(&cfg.output_dir, view);
        renderer.render(view, &dest)?;
        info!(chart = view.slug, path = %dest.display(), "chart saved");
    }

    info!(charts = views.len(), "all done");
    Ok(())
}

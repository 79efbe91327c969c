#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect
)]

use acadia::DEFAULT_TRAFFIC_DATA_DIR;
use acadia::clock::{Clock, SystemClock};
use acadia::historical::{CsvDirectorySource, HistoricalAggregator};
use acadia::sensor_readings::SensorReadingStore;
use acadia::simulation_config::SimulationConfig;
use acadia::traffic_simulation::{LiveSnapshotEngine, TimeSeriesStore};
use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpResponse, HttpServer, Responder, middleware, web};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod sensor_api;
mod traffic_api;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
    /// Folder with the <location>_<in|out>.csv count tables.
    /// Falls back to $TRAFFIC_DATA_DIR, then ./hidden_traffic_data
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// RON file overriding simulation rates, steps and congestion thresholds
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    workers: usize,
}

async fn index() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain"))
        .body("Acadia pedestrian traffic, Juniper HTTP endpoint")
}

async fn robots() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain"))
        .insert_header(("Cache-Control", "no-cache"))
        .body("User-agent: *\nDisallow: /api/")
}

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    traffic_api::config(cfg);
    sensor_api::config(cfg);

    cfg.route("/", web::get().to(index))
        .route("/robots.txt", web::get().to(robots));
}

fn resolve_data_dir(from_args: Option<PathBuf>) -> PathBuf {
    from_args
        .or_else(|| std::env::var("TRAFFIC_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRAFFIC_DATA_DIR))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let simulation_config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let ladder = simulation_config.congestion_ladder()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store = Arc::new(TimeSeriesStore::generate(
        &simulation_config,
        clock.now(),
        rand::rng(),
    )?);

    info!(
        "Simulating {} buckets of {}s starting {}",
        store.steps(),
        store.bucket_seconds(),
        store.start_time()
    );

    let engine = Arc::new(LiveSnapshotEngine::new(store, ladder));

    let data_dir = resolve_data_dir(args.data_dir.clone());
    if !data_dir.is_dir() {
        warn!(
            "Traffic data folder {} does not exist, historical endpoints will fail",
            data_dir.display()
        );
    }

    let aggregator = Arc::new(HistoricalAggregator::new(Arc::new(
        CsvDirectorySource::new(data_dir),
    )));

    let sensors = Arc::new(SensorReadingStore::new());

    info!("Starting Juniper on {}:{}", args.address, args.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(DefaultHeaders::new().add(("Server", "Acadia")))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(Arc::clone(&engine)))
            .app_data(web::Data::new(Arc::clone(&aggregator)))
            .app_data(web::Data::new(Arc::clone(&sensors)))
            .app_data(web::Data::new(Arc::clone(&clock)))
            .configure(configure_app)
    })
    .workers(args.workers)
    .bind((args.address.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}

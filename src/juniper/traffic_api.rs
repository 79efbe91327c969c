use acadia::HOURS_PER_DAY;
use acadia::TrafficError;
use acadia::clock::Clock;
use acadia::historical::HistoricalAggregator;
use acadia::locations::{LOCATION_COUNT, Location};
use acadia::traffic_simulation::{CongestionLevel, LiveSnapshot, LiveSnapshotEngine};
use actix_web::error::{BlockingError, InternalError};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// 400 for bad requests, 500 for everything the server or its data got wrong.
pub fn error_response(err: &TrafficError) -> HttpResponse {
    let body = ErrorBody {
        error: err.to_string(),
    };

    if err.is_client_error() {
        warn!("Rejected traffic request: {}", err);
        HttpResponse::BadRequest()
            .append_header(("Cache-Control", "no-cache"))
            .json(body)
    } else {
        error!("Traffic request failed: {}", err);
        HttpResponse::InternalServerError()
            .append_header(("Cache-Control", "no-cache"))
            .json(body)
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct LiveTrafficRow {
    location_id: String,
    in_count: u32,
    out_count: u32,
    total_in: u64,
    total_out: u64,
    count: i64,
    congestion: CongestionLevel,
}

impl From<LiveSnapshot> for LiveTrafficRow {
    fn from(snapshot: LiveSnapshot) -> Self {
        LiveTrafficRow {
            location_id: snapshot.location.display_name().to_string(),
            in_count: snapshot.in_count,
            out_count: snapshot.out_count,
            total_in: snapshot.total_in,
            total_out: snapshot.total_out,
            count: snapshot.net_count,
            congestion: snapshot.congestion,
        }
    }
}

#[derive(Deserialize, Debug)]
struct HistoricalDayQuery {
    location: u8,
    day: u32,
}

#[derive(Deserialize, Debug)]
struct HistoricalMonthQuery {
    location: u8,
}

#[derive(Serialize, Deserialize, Debug)]
struct HistoricalDayResponse {
    hours: Vec<u32>,
    inbound: [u32; HOURS_PER_DAY],
    outbound: [u32; HOURS_PER_DAY],
}

fn location_from_query(id: u8) -> Result<Location, TrafficError> {
    Location::from_id(id).ok_or_else(|| {
        TrafficError::Validation(format!(
            "unknown location {}, expected 1 to {}",
            id, LOCATION_COUNT
        ))
    })
}

fn day_from_query(day: u32) -> Result<u32, TrafficError> {
    match day {
        1..=31 => Ok(day),
        _ => Err(TrafficError::Validation(format!(
            "day {} is outside 1 to 31",
            day
        ))),
    }
}

fn blocking_failure(err: BlockingError) -> HttpResponse {
    error!("Historical lookup did not complete: {}", err);
    HttpResponse::InternalServerError()
        .append_header(("Cache-Control", "no-cache"))
        .json(ErrorBody {
            error: String::from("historical lookup did not complete"),
        })
}

#[actix_web::get("/api/traffic/live")]
pub async fn traffic_live(
    engine: web::Data<Arc<LiveSnapshotEngine>>,
    clock: web::Data<Arc<dyn Clock>>,
) -> impl Responder {
    let now = clock.now();

    debug!("Live snapshot for bucket {}", engine.bucket_index(now));

    let rows: Vec<LiveTrafficRow> = engine
        .snapshot(now)
        .into_iter()
        .map(LiveTrafficRow::from)
        .collect();

    HttpResponse::Ok()
        .append_header(("Cache-Control", "no-cache"))
        .json(rows)
}

#[actix_web::get("/api/traffic/historical/day")]
pub async fn historical_day(
    query: web::Query<HistoricalDayQuery>,
    aggregator: web::Data<Arc<HistoricalAggregator>>,
) -> impl Responder {
    let location = match location_from_query(query.location) {
        Ok(location) => location,
        Err(err) => return error_response(&err),
    };

    let day = match day_from_query(query.day) {
        Ok(day) => day,
        Err(err) => return error_response(&err),
    };

    let aggregator = Arc::clone(aggregator.get_ref());

    match web::block(move || aggregator.day_hours(location, day)).await {
        Ok(Ok(day_hours)) => HttpResponse::Ok()
            .append_header(("Cache-Control", "no-cache"))
            .json(HistoricalDayResponse {
                hours: (1..=HOURS_PER_DAY as u32).collect(),
                inbound: day_hours.inbound,
                outbound: day_hours.outbound,
            }),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failure(err),
    }
}

#[actix_web::get("/api/traffic/historical/month")]
pub async fn historical_month(
    query: web::Query<HistoricalMonthQuery>,
    aggregator: web::Data<Arc<HistoricalAggregator>>,
) -> impl Responder {
    let location = match location_from_query(query.location) {
        Ok(location) => location,
        Err(err) => return error_response(&err),
    };

    let aggregator = Arc::clone(aggregator.get_ref());

    match web::block(move || aggregator.month_totals(location)).await {
        Ok(Ok(month)) => HttpResponse::Ok()
            .append_header(("Cache-Control", "no-cache"))
            .json(month),
        Ok(Err(err)) => error_response(&err),
        Err(err) => blocking_failure(err),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    // missing or non-numeric query parameters get the same JSON error body
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        warn!("Rejected query string: {}", message);
        InternalError::from_response(
            err,
            HttpResponse::BadRequest()
                .append_header(("Cache-Control", "no-cache"))
                .json(ErrorBody {
                    error: format!("invalid request: {}", message),
                }),
        )
        .into()
    }))
    .service(traffic_live)
    .service(historical_day)
    .service(historical_month);
}

#[cfg(test)]
mod tests {
    use super::*;
    use acadia::clock::FixedClock;
    use acadia::historical::{Direction, InMemorySource};
    use acadia::simulation_config::SimulationConfig;
    use acadia::traffic_simulation::{CongestionLadder, TimeSeriesStore};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{DateTime, TimeDelta, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn engine() -> Arc<LiveSnapshotEngine> {
        let store = TimeSeriesStore::generate(
            &SimulationConfig::default(),
            start(),
            StdRng::seed_from_u64(7),
        )
        .unwrap();

        Arc::new(LiveSnapshotEngine::new(
            Arc::new(store),
            CongestionLadder::default(),
        ))
    }

    fn day_row(label: &str, hour_value: u32) -> String {
        let hours = vec![hour_value.to_string(); HOURS_PER_DAY].join(",");
        format!("{},{},{}\n", label, hours, hour_value * HOURS_PER_DAY as u32)
    }

    fn aggregator() -> Arc<HistoricalAggregator> {
        let inbound = format!("Jordan Pond,in\n{}{}", day_row("M 2", 5), day_row("T 1", 3));
        let outbound = format!("{}{}", day_row("T 1", 2), day_row("M 2", 4));

        let source = InMemorySource::new()
            .with_csv(Location::JordanPond, Direction::Inbound, &inbound)
            .unwrap()
            .with_csv(Location::JordanPond, Direction::Outbound, &outbound)
            .unwrap()
            .with_csv(Location::SandBeach, Direction::Inbound, &day_row("W 3", 1))
            .unwrap()
            .with_csv(Location::SandBeach, Direction::Outbound, &day_row("T 4", 1))
            .unwrap();

        Arc::new(HistoricalAggregator::new(Arc::new(source)))
    }

    macro_rules! traffic_app {
        () => {{
            let clock: Arc<dyn Clock> = Arc::new(FixedClock(start() + TimeDelta::minutes(10)));
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(engine()))
                    .app_data(web::Data::new(aggregator()))
                    .app_data(web::Data::new(clock))
                    .configure(config),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn live_lists_every_location_in_order() {
        let app = traffic_app!();

        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/live")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Cache-Control").unwrap(),
            "no-cache"
        );

        let rows: Vec<LiveTrafficRow> = actix_test::read_body_json(resp).await;
        assert_eq!(rows.len(), LOCATION_COUNT);

        for (row, location) in rows.iter().zip(Location::ALL) {
            assert_eq!(row.location_id, location.display_name());
            assert_eq!(row.count, row.total_in as i64 - row.total_out as i64);
            assert!(row.total_in >= row.in_count as u64);
            assert!(row.total_out >= row.out_count as u64);
        }
    }

    #[actix_web::test]
    async fn live_rows_use_congestion_labels() {
        let app = traffic_app!();

        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/live")
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        let labels: Vec<&str> = CongestionLevel::ALL.iter().map(|level| level.label()).collect();
        for row in body.as_array().unwrap() {
            let congestion = row["congestion"].as_str().unwrap();
            assert!(labels.contains(&congestion), "{}", congestion);
        }
    }

    #[actix_web::test]
    async fn historical_day_shape() {
        let app = traffic_app!();

        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/historical/day?location=1&day=2")
            .to_request();
        let body: HistoricalDayResponse = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.hours, (1..=24).collect::<Vec<u32>>());
        assert_eq!(body.inbound, [5; HOURS_PER_DAY]);
        assert_eq!(body.outbound, [4; HOURS_PER_DAY]);
    }

    #[actix_web::test]
    async fn historical_day_without_records_is_zeros() {
        let app = traffic_app!();

        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/historical/day?location=1&day=31")
            .to_request();
        let body: HistoricalDayResponse = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.inbound, [0; HOURS_PER_DAY]);
        assert_eq!(body.outbound, [0; HOURS_PER_DAY]);
    }

    #[actix_web::test]
    async fn historical_day_rejects_bad_parameters() {
        let app = traffic_app!();

        for uri in [
            "/api/traffic/historical/day?location=7&day=2",
            "/api/traffic/historical/day?location=0&day=2",
            "/api/traffic/historical/day?location=1&day=0",
            "/api/traffic/historical/day?location=1&day=32",
            "/api/traffic/historical/day?location=1",
            "/api/traffic/historical/day?location=pond&day=2",
        ] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body: ErrorBody = actix_test::read_body_json(resp).await;
            assert!(body.error.starts_with("invalid request"), "{}", body.error);
        }
    }

    #[actix_web::test]
    async fn historical_month_shape() {
        let app = traffic_app!();

        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/historical/month?location=1")
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["days"], serde_json::json!([1, 2]));
        assert_eq!(body["inbound"], serde_json::json!([72, 120]));
        assert_eq!(body["outbound"], serde_json::json!([48, 96]));
    }

    #[actix_web::test]
    async fn data_errors_are_server_errors() {
        let app = traffic_app!();

        // no csv for Cadillac Summit
        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/historical/month?location=3")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = actix_test::read_body_json(resp).await;
        assert!(body.error.contains("Cadillac Summit"), "{}", body.error);

        // Sand Beach has different inbound and outbound days
        let req = actix_test::TestRequest::get()
            .uri("/api/traffic/historical/month?location=2")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

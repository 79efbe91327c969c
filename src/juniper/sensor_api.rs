use crate::traffic_api::ErrorBody;
use acadia::clock::Clock;
use acadia::sensor_readings::{SensorReading, SensorReadingStore};
use actix_web::error::InternalError;
use actix_web::{HttpResponse, Responder, web};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Body posted by the weather stations.
#[derive(Serialize, Deserialize, Debug)]
struct SensorPayload {
    /// device id
    d: i32,
    /// temperature
    t: f64,
    /// humidity
    h: f64,
    /// pressure
    p: f64,
}

#[derive(Serialize, Deserialize, Debug)]
struct SensorStatsRow {
    device_id: i32,
    temperature: f64,
    humidity: f64,
    pressure: f64,
    timestamp: String,
}

impl From<SensorReading> for SensorStatsRow {
    fn from(reading: SensorReading) -> Self {
        SensorStatsRow {
            device_id: reading.device_id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            timestamp: reading
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[actix_web::post("/api/sensordata")]
pub async fn ingest_sensor_data(
    payload: web::Json<SensorPayload>,
    sensors: web::Data<Arc<SensorReadingStore>>,
    clock: web::Data<Arc<dyn Clock>>,
) -> impl Responder {
    let payload = payload.into_inner();

    debug!("Reading from device {}", payload.d);

    sensors.insert(SensorReading {
        device_id: payload.d,
        temperature: payload.t,
        humidity: payload.h,
        pressure: payload.p,
        timestamp: clock.now(),
    });

    HttpResponse::Created()
        .append_header(("Cache-Control", "no-cache"))
        .json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::get("/api/sensordata/stats")]
pub async fn sensor_stats(sensors: web::Data<Arc<SensorReadingStore>>) -> impl Responder {
    let rows: Vec<SensorStatsRow> = sensors
        .latest_per_device()
        .into_iter()
        .map(SensorStatsRow::from)
        .collect();

    HttpResponse::Ok()
        .append_header(("Cache-Control", "no-cache"))
        .json(rows)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    // stations post JSON without a content type
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(|err, _req| {
                let message = err.to_string();
                warn!("Rejected sensor payload: {}", message);
                InternalError::from_response(
                    err,
                    HttpResponse::BadRequest()
                        .append_header(("Cache-Control", "no-cache"))
                        .json(ErrorBody {
                            error: format!("invalid request: {}", message),
                        }),
                )
                .into()
            }),
    )
    .service(ingest_sensor_data)
    .service(sensor_stats);
}

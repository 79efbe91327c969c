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
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

pub mod clock;
pub mod errors;
pub mod historical;
pub mod locations;
pub mod sensor_readings;
pub mod simulation_config;
pub mod traffic_simulation;

pub use errors::TrafficError;
pub use locations::Location;

/// Number of 30 second buckets precomputed at startup (90 minutes).
pub const SIM_STEPS: usize = 180;

/// Width of a simulation bucket in seconds.
pub const BUCKET_SECONDS: i64 = 30;

/// Hourly columns in a historical day row.
pub const HOURS_PER_DAY: usize = 24;

pub const DEFAULT_TRAFFIC_DATA_DIR: &str = "hidden_traffic_data";

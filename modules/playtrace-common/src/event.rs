use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seconds since the Unix epoch, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTime(pub i64);

/// One ingested telemetry point. The field set is fixed; every field is
/// present in the serialized form, absent wire fields take the kind's zero
/// value (`""`, `0`, epoch `0`, `{}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub player_id: String,
    pub event_type: String,
    pub event_data: Value,
    pub player_meta_data: Value,
    pub session_uid: String,
    pub date_time: UnixTime,
    pub registered: UnixTime,
    pub app_version: String,
    pub player_level: i64,
    pub exp_count: i64,
    pub session_num: i64,
    pub soft_balance: i64,
    pub hard_balance: i64,
    pub stars_balance: i64,
    pub energy_balance: i64,
    pub traffic_source: String,
    pub ad_company: String,
    pub ad_name: String,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            player_id: String::new(),
            event_type: String::new(),
            event_data: Value::Object(Map::new()),
            player_meta_data: Value::Object(Map::new()),
            session_uid: String::new(),
            date_time: UnixTime(0),
            registered: UnixTime(0),
            app_version: String::new(),
            player_level: 0,
            exp_count: 0,
            session_num: 0,
            soft_balance: 0,
            hard_balance: 0,
            stars_balance: 0,
            energy_balance: 0,
            traffic_source: String::new(),
            ad_company: String::new(),
            ad_name: String::new(),
        }
    }
}

//! Save record encoding and the field-by-field merge used on load.
//!
//! A record is the JSON form of [`GameState`]. Decoding is lenient per
//! field: a missing, null or ill-typed value falls back to its fresh-state
//! default while the rest of the record still loads. Only text that is not
//! a JSON object at all is rejected. Zero is a valid value everywhere it is
//! in range.

use std::collections::{BTreeMap, BTreeSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};
use sim_core::{
    catalog, fresh_industries, ActiveEvent, GameState, IndustryState, Millis, SAVE_VERSION,
    START_YEAR,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that abort a load or import as a whole.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("save text is empty")]
    Empty,
    #[error("save text is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("save text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("save record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save record must be a JSON object")]
    NotAnObject,
}

/// Stamps `last_tick` and returns the structured record.
pub fn to_record(state: &mut GameState, now: Millis) -> Result<Value, CodecError> {
    state.last_tick = now;
    Ok(serde_json::to_value(&*state)?)
}

pub fn to_json(state: &mut GameState, now: Millis) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&to_record(state, now)?)?)
}

/// Portable text form: base64 of the JSON record.
pub fn export_text(state: &mut GameState, now: Millis) -> Result<String, CodecError> {
    Ok(STANDARD.encode(to_json(state, now)?))
}

pub fn parse_json(json: &str) -> Result<Value, CodecError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }
    Ok(value)
}

/// Reverses [`export_text`] up to the JSON value.
pub fn decode_text(text: &str) -> Result<Value, CodecError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CodecError::Empty);
    }
    let bytes = STANDARD.decode(text)?;
    parse_json(&String::from_utf8(bytes)?)
}

/// Builds a state from a record, defaulting every unusable field.
///
/// `now` stands in for a missing `lastTick`, which makes the offline
/// interval zero.
pub fn merge_record(value: &Value, now: Millis) -> Result<GameState, CodecError> {
    let obj = value.as_object().ok_or(CodecError::NotAnObject)?;
    let mut s = GameState::new(now);
    s.version = SAVE_VERSION;
    s.gdp = field(obj, "gdp", finite).unwrap_or(0.0);
    s.total_gained = field(obj, "totalGained", non_negative).unwrap_or(0.0);
    s.country_id = field(obj, "countryId", |v| v.as_str().and_then(catalog::country))
        .map(|c| c.id.to_string());
    s.last_tick = field(obj, "lastTick", millis).unwrap_or(now);
    s.click_base = field(obj, "clickBase", non_negative).unwrap_or(1.0);
    s.industries = industries(obj.get("industries"));
    s.upgrades_bought = field(obj, "upgradesBought", |v| {
        id_set(v, |id| catalog::upgrade(id).is_some())
    })
    .unwrap_or_default();
    s.achievements = field(obj, "achievements", |v| {
        id_set(v, |id| catalog::achievement(id).is_some())
    })
    .unwrap_or_default();
    s.prestige_points = field(obj, "prestigePoints", Value::as_u64).unwrap_or(0);
    s.premium_bought = field(obj, "premiumBought", |v| {
        id_set(v, |id| catalog::premium(id).is_some())
    })
    .unwrap_or_default();
    s.current_year = field(obj, "currentYear", finite).unwrap_or(START_YEAR);
    s.end_game = field(obj, "endGame", Value::as_bool).unwrap_or(false);
    s.active_event = field(obj, "activeEvent", active_event);
    s.next_event_at = field(obj, "nextEventAt", millis);
    s.debug = field(obj, "debug", Value::as_bool).unwrap_or(false);
    Ok(s)
}

/// Present (non-null) field parsed by `parse`; ill-typed values are logged
/// and dropped.
fn field<T>(
    obj: &Map<String, Value>,
    key: &str,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = obj.get(key).filter(|v| !v.is_null())?;
    let parsed = parse(value);
    if parsed.is_none() {
        warn!(field = key, "ignoring invalid save field");
    }
    parsed
}

fn finite(v: &Value) -> Option<f64> {
    v.as_f64().filter(|x| x.is_finite())
}

fn non_negative(v: &Value) -> Option<f64> {
    finite(v).filter(|x| *x >= 0.0)
}

fn positive(v: &Value) -> Option<f64> {
    finite(v).filter(|x| *x > 0.0)
}

// Timestamps may arrive fractional.
fn millis(v: &Value) -> Option<Millis> {
    v.as_i64().or_else(|| finite(v).map(|x| x as Millis))
}

/// Accepts `["id", ...]` or `{"id": true, ...}` and keeps known ids only.
fn id_set(v: &Value, known: fn(&str) -> bool) -> Option<BTreeSet<String>> {
    let ids: Vec<&str> = match v {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, on)| on.as_bool() == Some(true))
            .map(|(id, _)| id.as_str())
            .collect(),
        _ => return None,
    };
    let mut out = BTreeSet::new();
    for id in ids {
        if known(id) {
            out.insert(id.to_string());
        } else {
            debug!(id, "dropping unknown id from save");
        }
    }
    Some(out)
}

fn active_event(v: &Value) -> Option<ActiveEvent> {
    let o = v.as_object()?;
    Some(ActiveEvent {
        id: o.get("id")?.as_str()?.to_string(),
        name: o.get("name")?.as_str()?.to_string(),
        desc: o
            .get("desc")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        mult: o.get("mult").and_then(positive)?,
        end_time: o.get("endTime").and_then(millis)?,
    })
}

/// One entry per catalog industry; unknown ids in the record are ignored.
fn industries(v: Option<&Value>) -> BTreeMap<String, IndustryState> {
    let mut out = fresh_industries();
    let Some(map) = v.and_then(Value::as_object) else {
        return out;
    };
    for (id, entry) in out.iter_mut() {
        let Some(saved) = map.get(id) else {
            continue;
        };
        if let Some(count) = saved.get("count").and_then(Value::as_u64) {
            entry.count = u32::try_from(count).unwrap_or(u32::MAX);
        }
        if let Some(mult) = saved.get("mult").and_then(positive) {
            entry.mult = mult;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let s = merge_record(&json!({}), 500).unwrap();
        assert_eq!(s, GameState::new(500));
    }

    #[test]
    fn zero_is_kept_not_defaulted() {
        let s = merge_record(&json!({"clickBase": 0, "gdp": 0, "lastTick": 0}), 500).unwrap();
        assert_eq!(s.click_base, 0.0);
        assert_eq!(s.last_tick, 0);
    }

    #[test]
    fn ill_typed_fields_fall_back_individually() {
        let s = merge_record(
            &json!({
                "gdp": "lots",
                "totalGained": 42.5,
                "prestigePoints": -3,
                "countryId": "atlantis",
                "endGame": "yes",
                "currentYear": 1999.5,
            }),
            0,
        )
        .unwrap();
        assert_eq!(s.gdp, 0.0);
        assert_eq!(s.total_gained, 42.5);
        assert_eq!(s.prestige_points, 0);
        assert_eq!(s.country_id, None);
        assert!(!s.end_game);
        assert_eq!(s.current_year, 1999.5);
    }

    #[test]
    fn industries_ignore_unknown_ids_and_bad_values() {
        let s = merge_record(
            &json!({"industries": {
                "farm": {"count": 12, "mult": 4},
                "tech": {"count": "many", "mult": 0},
                "mining": {"count": 99, "mult": 9},
            }}),
            0,
        )
        .unwrap();
        assert_eq!(s.industries.len(), catalog::INDUSTRIES.len());
        assert_eq!(s.industry("farm"), Some(&IndustryState { count: 12, mult: 4.0 }));
        assert_eq!(s.industry("tech"), Some(&IndustryState::default()));
        assert!(s.industry("mining").is_none());
    }

    #[test]
    fn id_sets_accept_arrays_and_flag_objects() {
        let s = merge_record(
            &json!({
                "achievements": {"a_country": true, "a_first_buy": false, "a_fake": true},
                "premiumBought": ["p_click1", "p_nope"],
                "upgradesBought": 7,
            }),
            0,
        )
        .unwrap();
        assert_eq!(s.achievements, BTreeSet::from(["a_country".to_string()]));
        assert_eq!(s.premium_bought, BTreeSet::from(["p_click1".to_string()]));
        assert!(s.upgrades_bought.is_empty());
    }

    #[test]
    fn active_event_requires_core_fields() {
        let ok = merge_record(
            &json!({"activeEvent": {"id": "war", "name": "Regional Conflict", "mult": 0.65, "endTime": 12000.7}, "nextEventAt": 1500.2}),
            0,
        )
        .unwrap();
        let ev = ok.active_event.unwrap();
        assert_eq!(ev.end_time, 12_000);
        assert_eq!(ev.desc, "");
        assert_eq!(ok.next_event_at, Some(1_500));
        let bad = merge_record(&json!({"activeEvent": {"id": "war", "mult": 0.65}}), 0).unwrap();
        assert!(bad.active_event.is_none());
    }

    #[test]
    fn text_round_trip_and_rejections() {
        let mut s = GameState::new(0);
        s.gdp = 123.5;
        let text = export_text(&mut s, 1_000).unwrap();
        let value = decode_text(&format!("  {text}\n")).unwrap();
        assert_eq!(value["gdp"], 123.5);
        assert_eq!(value["lastTick"], 1_000);
        assert!(matches!(decode_text(""), Err(CodecError::Empty)));
        assert!(matches!(decode_text("%%%"), Err(CodecError::Base64(_))));
        let not_json = STANDARD.encode("not json");
        assert!(matches!(decode_text(&not_json), Err(CodecError::Json(_))));
        let array = STANDARD.encode("[1,2]");
        assert!(matches!(decode_text(&array), Err(CodecError::NotAnObject)));
    }
}

use core::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ncube_model::{AxisKind, AxisValueType, ComparableValue, Value};
use ncube_parser::SpecParser;
use num_traits::ToPrimitive;

use crate::error::NCubeError;

/// Promotes an already-typed caller value to an axis's value-type (spec
/// §4.1, the programmatic half of value coercion — the textual half is
/// [`coerce_text`]).
pub fn coerce_value(value: Value, target: AxisValueType) -> Result<Value, NCubeError> {
    use Value::*;
    let failed = |input: &Value| NCubeError::ConversionFailed {
        target_type: target.to_string(),
        input: input.to_string(),
    };
    match (value, target) {
        (v @ Long(_), AxisValueType::Long) => Ok(v),
        (v @ Double(_), AxisValueType::Double) => Ok(v),
        (v @ BigDecimal(_), AxisValueType::BigDecimal) => Ok(v),
        (v @ String(_), AxisValueType::String) => Ok(v),
        (v @ Date(_), AxisValueType::Date) => Ok(v),
        (v @ Comparable(_), AxisValueType::Comparable) => Ok(v),
        (v @ Expression(_), AxisValueType::Expression) => Ok(v),

        (Long(n), AxisValueType::Double) => Ok(Double(n as f64)),
        (Long(n), AxisValueType::BigDecimal) => Ok(BigDecimal(bigdecimal::BigDecimal::from(n))),
        (Long(n), AxisValueType::String) => Ok(String(n.to_string())),
        (Long(millis), AxisValueType::Date) => chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| Date(dt.naive_utc()))
            .ok_or_else(|| failed(&Value::Long(millis))),

        (Double(d), AxisValueType::Long) => {
            if d.fract() == 0.0 {
                Ok(Long(d as i64))
            } else {
                Err(failed(&Value::Double(d)))
            }
        }
        (Double(d), AxisValueType::BigDecimal) => BigDecimal::from_str(&d.to_string())
            .map(Value::BigDecimal)
            .map_err(|_| failed(&Value::Double(d))),
        (Double(d), AxisValueType::String) => Ok(String(d.to_string())),

        (BigDecimal(d), AxisValueType::Long) => {
            d.to_i64().map(Long).ok_or_else(|| failed(&Value::BigDecimal(d.clone())))
        }
        (BigDecimal(d), AxisValueType::Double) => {
            d.to_f64().map(Double).ok_or_else(|| failed(&Value::BigDecimal(d.clone())))
        }
        (BigDecimal(d), AxisValueType::String) => Ok(String(d.to_string())),

        (String(s), AxisValueType::Long) => {
            s.parse::<i64>().map(Long).map_err(|_| failed(&Value::String(s)))
        }
        (String(s), AxisValueType::Double) => {
            s.parse::<f64>().map(Double).map_err(|_| failed(&Value::String(s)))
        }
        (String(s), AxisValueType::BigDecimal) => {
            BigDecimal::from_str(&s).map(Value::BigDecimal).map_err(|_| failed(&Value::String(s)))
        }
        (String(s), AxisValueType::Date) => parse_date(&s).ok_or_else(|| failed(&Value::String(s))),
        (String(s), AxisValueType::Comparable) => Ok(Comparable(ComparableValue::from_label(s))),
        (String(s), AxisValueType::Expression) => {
            Ok(Expression(ncube_model::ExpressionDescriptor::new(s)))
        }

        (other, AxisValueType::Comparable) => Ok(Comparable(ComparableValue::from_label(other.to_string()))),

        (other, _) => Err(failed(&other)),
    }
}

/// Which point representation a NEAREST axis's comma literal should parse
/// into: plain Euclidean coordinates, or a geodesic lat/lon pair (spec §3
/// "2-D/3-D point, geodesic lat/lon"). A 2-part literal is ambiguous between
/// `Point2D` and `LatLon` on its own, so the caller — which knows the axis's
/// intended semantics — disambiguates.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PointKind {
    /// 2-D/3-D Euclidean coordinates (the default).
    #[default]
    Cartesian,
    /// A (latitude, longitude) pair, compared by great-circle distance.
    LatLon,
}

/// Parses a textual column spec — DISCRETE/NEAREST scalars, RANGE
/// `"lo,hi"`/`"[lo,hi]"`, SET lists, or a 2-D/3-D/lat-lon point literal —
/// into the typed [`Value`] the owning axis expects (spec §4.1).
pub fn coerce_text(text: &str, kind: AxisKind, value_type: AxisValueType, point_kind: PointKind) -> Result<Value, NCubeError> {
    match kind {
        AxisKind::Discrete | AxisKind::Nearest => {
            if matches!(value_type, AxisValueType::Comparable) && looks_like_point(text) {
                return parse_point_literal(text, point_kind);
            }
            Ok(SpecParser::new(text)?.parse_discrete(value_type)?)
        }
        AxisKind::Range => Ok(SpecParser::new(text)?.parse_range(value_type)?),
        AxisKind::Set => Ok(SpecParser::new(text)?.parse_set(value_type)?),
        AxisKind::Rule => Ok(Value::Expression(ncube_model::ExpressionDescriptor::new(text))),
    }
}

fn looks_like_point(text: &str) -> bool {
    text.matches(',').count() >= 1
}

fn parse_point_literal(text: &str, point_kind: PointKind) -> Result<Value, NCubeError> {
    let parts: Vec<&str> = text.split(',').collect();
    let parser = SpecParser::new(text)?;
    Ok(match (parts.len(), point_kind) {
        (2, PointKind::LatLon) => parser.parse_lat_lon()?,
        (2, PointKind::Cartesian) => parser.parse_point2d()?,
        (3, _) => parser.parse_point3d()?,
        _ => {
            return Err(NCubeError::ConversionFailed {
                target_type: "point".to_string(),
                input: text.to_string(),
            })
        }
    })
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d %Y", "%d %b %Y"];

fn parse_date(s: &str) -> Option<Value> {
    for format in DATE_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(Value::Date(dt));
        }
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(Value::Date(d.and_hms_opt(0, 0, 0).expect("midnight is valid")));
        }
    }
    None
}

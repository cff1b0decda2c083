use core::cmp::Ordering;
use core::fmt;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The value-type an axis promotes caller values to (spec §3: STRING, LONG,
/// BIG_DECIMAL, DOUBLE, DATE, COMPARABLE, EXPRESSION).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisValueType {
    /// UTF-8 text.
    String,
    /// 64-bit signed integer.
    Long,
    /// Arbitrary-precision decimal.
    BigDecimal,
    /// IEEE-754 double.
    Double,
    /// Calendar date, optionally with a time-of-day.
    Date,
    /// Opaque comparable (spec: "any comparable implementation").
    Comparable,
    /// Expression source (used by RULE axis condition columns, among others).
    Expression,
}

impl fmt::Display for AxisValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "STRING",
            Self::Long => "LONG",
            Self::BigDecimal => "BIG_DECIMAL",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::Comparable => "COMPARABLE",
            Self::Expression => "EXPRESSION",
        })
    }
}

/// Source text (plus optional URL and cache flag) backing an EXPRESSION value
/// or an expression/template/method cell (spec §3, §4.1, §6).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExpressionDescriptor {
    /// The expression source text.
    pub source: String,
    /// An optional URL the source is fetched from instead of being inline.
    pub url: Option<String>,
    /// Whether the compiled artifact for this source should be cached.
    pub cache: bool,
    /// For a METHOD cell, the named entry point within `source` to invoke
    /// (spec §3 "named entry-point within an expression body", §6
    /// `compile(source, entryPoint?)`). `None` for plain EXPRESSION/TEMPLATE
    /// source, which has no named entry points to choose between.
    pub entry_point: Option<String>,
}

impl ExpressionDescriptor {
    /// Creates an inline, cached-by-default expression descriptor with no
    /// entry point.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: None,
            cache: true,
            entry_point: None,
        }
    }

    /// Sets the named entry point to invoke within this descriptor's source,
    /// for METHOD cells.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }
}

impl fmt::Display for ExpressionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.url, &self.entry_point) {
            (Some(url), Some(entry)) => write!(f, "<expression url={url} entry_point={entry}>"),
            (Some(url), None) => write!(f, "<expression url={url}>"),
            (None, Some(entry)) => write!(f, "<expression {} entry_point={entry}>", self.source),
            (None, None) => write!(f, "<expression {}>", self.source),
        }
    }
}

/// An opaque value that merely supports a total order, for axes whose
/// value-type is COMPARABLE. Rust has no dynamic `Comparable` like Java's;
/// callers supply a canonical ordering key alongside a display label.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparableValue {
    /// The value's ordering key, compared byte-wise.
    pub key: Vec<u8>,
    /// A human-readable label for display/tracing.
    pub label: String,
}

impl ComparableValue {
    /// Creates a comparable value from a UTF-8 label, using the label's own
    /// bytes as the ordering key.
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            key: label.as_bytes().to_vec(),
            label,
        }
    }
}

impl fmt::Display for ComparableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A dynamically-typed coordinate/cell/column scalar or compound value.
///
/// This is the tagged union the binder, column store and coercion layer all
/// dispatch over (spec §9 "Dynamic coordinate maps").
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Absence of a value.
    Null,
    /// A boolean, used mostly for rule-condition truthiness.
    Boolean(bool),
    /// A 64-bit signed integer (LONG).
    Long(i64),
    /// An arbitrary-precision decimal (BIG_DECIMAL).
    BigDecimal(BigDecimal),
    /// An IEEE-754 double (DOUBLE).
    Double(f64),
    /// UTF-8 text (STRING).
    String(String),
    /// A calendar date with optional time-of-day (DATE).
    Date(NaiveDateTime),
    /// A 2-D point, for NEAREST axes using Euclidean distance.
    Point2D(f64, f64),
    /// A 3-D point, for NEAREST axes using Euclidean distance.
    Point3D(f64, f64, f64),
    /// A (latitude, longitude) pair, for NEAREST axes using geodesic distance.
    LatLon(f64, f64),
    /// A half-open `[low, high)` range of two same-typed discretes.
    Range(Box<Value>, Box<Value>),
    /// A non-empty collection of discretes and/or ranges (SET columns).
    Set(Vec<Value>),
    /// An opaque totally-ordered value (COMPARABLE).
    Comparable(ComparableValue),
    /// Expression source (EXPRESSION).
    Expression(ExpressionDescriptor),
}

impl Value {
    /// Convenience constructor for [`Value::Range`].
    pub fn range(low: Value, high: Value) -> Self {
        Value::Range(Box::new(low), Box::new(high))
    }

    /// Returns the truthiness of this value per the rule engine's policy
    /// (spec §4.6): null/false/0/empty collection/empty string are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Long(n) => *n != 0,
            Value::Double(d) => *d != 0.0,
            Value::BigDecimal(d) => !d.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Set(items) => !items.is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::BigDecimal(d) => write!(f, "{d}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Value::Point2D(x, y) => write!(f, "({x},{y})"),
            Value::Point3D(x, y, z) => write!(f, "({x},{y},{z})"),
            Value::LatLon(lat, lon) => write!(f, "({lat},{lon})"),
            Value::Range(lo, hi) => write!(f, "[{lo},{hi})"),
            Value::Set(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Comparable(c) => write!(f, "{c}"),
            Value::Expression(e) => write!(f, "{e}"),
        }
    }
}

/// Partial order used by RANGE containment and DISCRETE/SORTED ordering.
///
/// Only same-variant comparisons (plus the natural numeric tower) are
/// defined; everything else is [`None`], matching Java's `ClassCastException`
/// boundary made explicit instead of panicking.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Long(a), Long(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (BigDecimal(a), BigDecimal(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Date(a), Date(b)) => a.partial_cmp(b),
            (Comparable(a), Comparable(b)) => a.partial_cmp(b),
            (Long(a), Double(b)) => (*a as f64).partial_cmp(b),
            (Double(a), Long(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }
}

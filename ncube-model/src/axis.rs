use core::fmt;

use crate::{AxisValueType, ModelError, Name, NameMap, Value};

const ORDINAL_BITS: u32 = 48;
const ORDINAL_MASK: u64 = (1u64 << ORDINAL_BITS) - 1;

/// The default column's reserved ordinal, stable for the lifetime of the
/// axis (spec invariant 2: column ids never change meaning, never reused).
const DEFAULT_ORDINAL: u64 = 0;

/// The unique 64-bit id of an axis within a cube (spec §3).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AxisId(
    /// The raw id value.
    pub u16,
);

/// The unique 64-bit id of a column (spec invariant 2): the low 48 bits
/// encode an ordinal within the axis, the upper 16 bits encode the owning
/// axis id, so ids are globally unique within a cube without a central
/// counter.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ColumnId(u64);

impl ColumnId {
    fn new(axis: AxisId, ordinal: u64) -> Self {
        debug_assert!(ordinal <= ORDINAL_MASK, "column ordinal overflow");
        Self(((axis.0 as u64) << ORDINAL_BITS) | (ordinal & ORDINAL_MASK))
    }

    /// The owning axis's id, decoded from the upper bits.
    pub fn axis_id(&self) -> AxisId {
        AxisId((self.0 >> ORDINAL_BITS) as u16)
    }

    /// The ordinal within the owning axis, decoded from the lower bits.
    pub fn ordinal(&self) -> u64 {
        self.0 & ORDINAL_MASK
    }

    /// Raw 64-bit representation, e.g. for wire formats.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Reconstructs a column id from its raw 64-bit representation.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    fn is_default(&self) -> bool {
        self.ordinal() == DEFAULT_ORDINAL
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColumnId(axis={}, ordinal={})", self.axis_id().0, self.ordinal())
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The shape of an axis's columns (spec §3).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AxisKind {
    /// Exact-match discrete values.
    Discrete,
    /// Half-open `[low, high)` ranges.
    Range,
    /// Non-empty collections of discretes and/or ranges.
    Set,
    /// Proximity search by a type-appropriate distance metric.
    Nearest,
    /// Condition expressions evaluated in sequence by the rule engine.
    Rule,
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discrete => "DISCRETE",
            Self::Range => "RANGE",
            Self::Set => "SET",
            Self::Nearest => "NEAREST",
            Self::Rule => "RULE",
        })
    }
}

/// Iteration/display order policy for an axis's columns (spec §3).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ColumnOrder {
    /// Columns iterate in value order.
    Sorted,
    /// Columns iterate in the order they were added.
    Display,
}

/// One column on an axis: a stable id, its semantic value, a display order
/// and optional meta-properties (spec §3).
#[derive(Clone, Debug)]
pub struct Column {
    id: ColumnId,
    value: Value,
    display_order: u32,
    meta_properties: NameMap,
}

impl Column {
    /// The column's stable id.
    pub fn id(&self) -> ColumnId {
        self.id
    }

    /// The column's semantic value (discrete/range/set/nearest-point/rule
    /// condition, per the owning axis's kind).
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Position among siblings in iteration order.
    pub fn display_order(&self) -> u32 {
        self.display_order
    }

    /// Case-insensitive meta-properties (participates in delta, not in
    /// axis/column identity equality, spec §4.2).
    pub fn meta_properties(&self) -> &NameMap {
        &self.meta_properties
    }

    /// Mutable access to meta-properties, e.g. to set a RULE column's name.
    pub fn meta_properties_mut(&mut self) -> &mut NameMap {
        &mut self.meta_properties
    }

    /// The column's name, read from the `"name"` meta-property. RULE axis
    /// columns are matched by this (spec §4.2 `findColumn`).
    pub fn name(&self) -> Option<&str> {
        match self.meta_properties.get("name") {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn ranges_overlap(a_lo: &Value, a_hi: &Value, b_lo: &Value, b_hi: &Value) -> bool {
    // half-open [lo, hi): overlap iff a_lo < b_hi && b_lo < a_hi
    matches!(a_lo.partial_cmp(b_hi), Some(core::cmp::Ordering::Less))
        && matches!(b_lo.partial_cmp(a_hi), Some(core::cmp::Ordering::Less))
}

fn range_contains(lo: &Value, hi: &Value, point: &Value) -> bool {
    matches!(
        lo.partial_cmp(point),
        Some(core::cmp::Ordering::Less) | Some(core::cmp::Ordering::Equal)
    ) && matches!(point.partial_cmp(hi), Some(core::cmp::Ordering::Less))
}

fn as_range(value: &Value) -> Option<(&Value, &Value)> {
    match value {
        Value::Range(lo, hi) => Some((lo, hi)),
        _ => None,
    }
}

/// A column's footprint used for overlap detection: either a single
/// discrete point or a range, irrespective of whether it came directly from
/// a DISCRETE/RANGE column or from one element of a SET column.
enum Footprint<'a> {
    Point(&'a Value),
    Range(&'a Value, &'a Value),
}

fn footprints(value: &Value) -> Vec<Footprint<'_>> {
    match value {
        Value::Range(lo, hi) => vec![Footprint::Range(lo, hi)],
        Value::Set(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Range(lo, hi) => vec![Footprint::Range(lo, hi)],
                other => vec![Footprint::Point(other)],
            })
            .collect(),
        other => vec![Footprint::Point(other)],
    }
}

fn footprints_overlap(a: &Footprint<'_>, b: &Footprint<'_>) -> bool {
    match (a, b) {
        (Footprint::Point(a), Footprint::Point(b)) => a == b,
        (Footprint::Point(p), Footprint::Range(lo, hi)) | (Footprint::Range(lo, hi), Footprint::Point(p)) => {
            range_contains(lo, hi, p)
        }
        (Footprint::Range(a_lo, a_hi), Footprint::Range(b_lo, b_hi)) => {
            ranges_overlap(a_lo, a_hi, b_lo, b_hi)
        }
    }
}

/// One dimension of a cube: a kind, a value-type, an ordered column store and
/// a default-column flag (spec §3, §4.2).
#[derive(Clone, Debug)]
pub struct Axis {
    id: AxisId,
    name: Name,
    kind: AxisKind,
    value_type: AxisValueType,
    has_default: bool,
    column_order: ColumnOrder,
    fire_all: bool,
    next_ordinal: u64,
    columns: Vec<Column>,
    meta_properties: NameMap,
}

impl Axis {
    /// Creates a new, empty axis.
    ///
    /// A NEAREST axis constructed with `has_default = true` is silently
    /// coerced to `false` (spec invariant 4, open question (a) in §9) — a
    /// diagnostic is logged rather than failing the call.
    pub fn new(
        id: AxisId,
        name: impl Into<Name>,
        kind: AxisKind,
        value_type: AxisValueType,
        has_default: bool,
        column_order: ColumnOrder,
    ) -> Self {
        let name = name.into();
        let has_default = if kind == AxisKind::Nearest && has_default {
            log::warn!(
                "axis '{name}' is NEAREST and cannot carry a default column; coercing has_default to false"
            );
            false
        } else {
            has_default
        };
        Self {
            id,
            name,
            kind,
            value_type,
            has_default,
            column_order,
            fire_all: true,
            next_ordinal: DEFAULT_ORDINAL + 1,
            columns: Vec::new(),
            meta_properties: NameMap::new(),
        }
    }

    /// The axis's unique id.
    pub fn id(&self) -> AxisId {
        self.id
    }

    /// The axis's case-insensitive name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The axis's kind.
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// The axis's declared value-type.
    pub fn value_type(&self) -> AxisValueType {
        self.value_type
    }

    /// Whether the axis has a default column.
    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// The axis's column iteration order policy.
    pub fn column_order(&self) -> ColumnOrder {
        self.column_order
    }

    /// Whether a RULE axis fires all true conditions (`true`) or stops at
    /// the first (`false`). Meaningless for non-RULE axes.
    pub fn fire_all(&self) -> bool {
        self.fire_all
    }

    /// Sets the `fire-all` policy (RULE axes only).
    pub fn set_fire_all(&mut self, fire_all: bool) {
        self.fire_all = fire_all;
    }

    /// Case-insensitive meta-properties.
    pub fn meta_properties(&self) -> &NameMap {
        &self.meta_properties
    }

    /// Mutable access to meta-properties.
    pub fn meta_properties_mut(&mut self) -> &mut NameMap {
        &mut self.meta_properties
    }

    /// The reserved id of this axis's default column, if it has one.
    pub fn default_column_id(&self) -> Option<ColumnId> {
        self.has_default.then(|| ColumnId::new(self.id, DEFAULT_ORDINAL))
    }

    /// Enables the default column on an axis that doesn't yet have one.
    ///
    /// Fails with [`ModelError::InvalidArgument`] if a default is already
    /// present (spec boundary case: "adding a duplicate default column
    /// fails"), or if the axis is NEAREST (invariant 4).
    pub fn enable_default(&mut self) -> Result<(), ModelError> {
        if self.has_default {
            return Err(ModelError::InvalidArgument(format!(
                "axis '{}' already has a default column",
                self.name
            )));
        }
        if self.kind == AxisKind::Nearest {
            return Err(ModelError::InvalidArgument(format!(
                "NEAREST axis '{}' cannot carry a default column",
                self.name
            )));
        }
        self.has_default = true;
        Ok(())
    }

    /// Removes the default column, if present. Returns whether one was
    /// removed. The caller is responsible for clearing any cells bound to
    /// it (spec §3 lifecycle; that cross-cutting cleanup lives in
    /// `ncube-engine` alongside the cell map).
    pub fn disable_default(&mut self) -> bool {
        core::mem::take(&mut self.has_default)
    }

    /// Non-default columns, in this axis's iteration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to non-default columns, e.g. to set a column's `name`
    /// meta-property after insertion (RULE axes, spec §4.2).
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    fn validate_shape(&self, value: &Value) -> Result<(), ModelError> {
        let ok = match self.kind {
            AxisKind::Discrete | AxisKind::Nearest => !matches!(value, Value::Range(..) | Value::Set(..)),
            AxisKind::Range => matches!(value, Value::Range(..)),
            AxisKind::Set => matches!(value, Value::Set(items) if !items.is_empty()),
            AxisKind::Rule => matches!(value, Value::Expression(..) | Value::String(..)),
        };
        if ok {
            if let AxisKind::Range = self.kind {
                let (lo, hi) = as_range(value).expect("validated above");
                if !matches!(lo.partial_cmp(hi), Some(core::cmp::Ordering::Less)) {
                    return Err(ModelError::Unsupported {
                        axis: self.name.to_string(),
                        reason: format!("range low {lo} must be strictly less than high {hi}"),
                    });
                }
            }
            Ok(())
        } else {
            Err(ModelError::Unsupported {
                axis: self.name.to_string(),
                reason: format!("value {value} is not a valid {} column on a {} axis", value_shape(value), self.kind),
            })
        }
    }

    fn overlaps_existing(&self, value: &Value) -> Option<&Column> {
        if matches!(self.kind, AxisKind::Nearest | AxisKind::Rule) {
            return None;
        }
        let new_fps = footprints(value);
        self.columns.iter().find(|existing| {
            footprints(&existing.value)
                .iter()
                .any(|ef| new_fps.iter().any(|nf| footprints_overlap(ef, nf)))
        })
    }

    /// Adds a column, assigning it the next ordinal (monotonic, never
    /// reused — spec lifecycle). `value` must already be coerced to this
    /// axis's value-type (see `ncube-engine::coerce`); this call validates
    /// only the column *shape* (RANGE needs a Range, SET a non-empty Set,
    /// etc.) and overlap/duplication.
    pub fn add_column(&mut self, value: Value) -> Result<ColumnId, ModelError> {
        self.validate_shape(&value)?;
        if let Some(existing) = self.overlaps_existing(&value) {
            return Err(ModelError::AxisOverlap {
                axis: self.name.to_string(),
                value: format!("{value} overlaps existing column {}", existing.value),
            });
        }
        let id = ColumnId::new(self.id, self.next_ordinal);
        self.next_ordinal += 1;
        let display_order = self.columns.len() as u32;
        self.columns.push(Column {
            id,
            value,
            display_order,
            meta_properties: NameMap::new(),
        });
        if self.column_order == ColumnOrder::Sorted {
            self.columns.sort_by(|a, b| {
                a.value.partial_cmp(&b.value).unwrap_or(core::cmp::Ordering::Equal)
            });
            for (i, c) in self.columns.iter_mut().enumerate() {
                c.display_order = i as u32;
            }
        }
        log::debug!("added column {id} to axis '{}'", self.name);
        Ok(id)
    }

    /// Finds the column that matches `value`, per spec §4.2 `findColumn`:
    /// - DISCRETE: equality.
    /// - RANGE: containment (`low <= value < high`).
    /// - SET: any-member-match.
    /// - NEAREST: minimum type-appropriate distance, ties broken by lowest
    ///   column id.
    /// - RULE: column name (the `"name"` meta-property) equality.
    ///
    /// Falls back to the default column if present; otherwise fails with
    /// `None`, which callers surface as `CoordinateNotFound`.
    pub fn find_column(&self, value: &Value) -> Option<ColumnId> {
        let found = match self.kind {
            AxisKind::Discrete => self.columns.iter().find(|c| &c.value == value).map(|c| c.id),
            AxisKind::Range => self
                .columns
                .iter()
                .find(|c| {
                    let (lo, hi) = as_range(&c.value).expect("RANGE column always holds a Range");
                    range_contains(lo, hi, value)
                })
                .map(|c| c.id),
            AxisKind::Set => self
                .columns
                .iter()
                .find(|c| match &c.value {
                    Value::Set(items) => items.iter().any(|item| match item {
                        Value::Range(lo, hi) => range_contains(lo, hi, value),
                        discrete => discrete == value,
                    }),
                    _ => false,
                })
                .map(|c| c.id),
            AxisKind::Nearest => self.find_nearest(value),
            AxisKind::Rule => match value {
                Value::String(name) => self
                    .columns
                    .iter()
                    .find(|c| c.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
                    .map(|c| c.id),
                _ => None,
            },
        };
        found.or_else(|| self.default_column_id())
    }

    fn find_nearest(&self, value: &Value) -> Option<ColumnId> {
        self.columns
            .iter()
            .filter_map(|c| distance(&c.value, value).map(|d| (d, c.id)))
            .min_by(|(d1, id1), (d2, id2)| {
                d1.partial_cmp(d2)
                    .unwrap_or(core::cmp::Ordering::Equal)
                    .then(id1.as_u64().cmp(&id2.as_u64()))
            })
            .map(|(_, id)| id)
    }

    /// Removes the column matching `value` (or with the given id via
    /// [`Axis::delete_column_by_id`]). Returns whether one was removed.
    pub fn delete_column(&mut self, value: &Value) -> bool {
        match self.find_column_exact(value) {
            Some(id) => self.delete_column_by_id(id),
            None => false,
        }
    }

    fn find_column_exact(&self, value: &Value) -> Option<ColumnId> {
        self.columns.iter().find(|c| &c.value == value).map(|c| c.id)
    }

    /// Removes the column with the given id. Returns whether one was
    /// removed.
    pub fn delete_column_by_id(&mut self, id: ColumnId) -> bool {
        if id.is_default() {
            return false;
        }
        let before = self.columns.len();
        self.columns.retain(|c| c.id != id);
        let removed = self.columns.len() != before;
        if removed {
            for (i, c) in self.columns.iter_mut().enumerate() {
                c.display_order = i as u32;
            }
        }
        removed
    }

    /// Reconciles this axis with a `proposed` list of (possibly negative,
    /// meaning "new") column ids and values, per spec §4.2 `updateColumns`:
    /// columns with negative ids are additions, matching ids are updates
    /// (value + meta-properties), omitted ids are deletions. Overlap is
    /// re-checked after applying the whole batch; on conflict the axis is
    /// left unchanged and `AxisOverlap` is returned.
    pub fn update_columns(
        &mut self,
        proposed: Vec<(Option<ColumnId>, Value, NameMap)>,
    ) -> Result<(), ModelError> {
        let saved = self.clone();
        let mut kept: Vec<Column> = Vec::new();
        for (id, value, meta) in proposed {
            self.validate_shape(&value)?;
            match id {
                Some(existing_id) => {
                    if let Some(mut col) = self.columns.iter().find(|c| c.id == existing_id).cloned() {
                        col.value = value;
                        col.meta_properties = meta;
                        kept.push(col);
                    } else {
                        *self = saved;
                        return Err(ModelError::InvalidArgument(format!(
                            "unknown column id {existing_id} on axis '{}'",
                            self.name
                        )));
                    }
                }
                None => {
                    let new_id = ColumnId::new(self.id, self.next_ordinal);
                    self.next_ordinal += 1;
                    kept.push(Column {
                        id: new_id,
                        value,
                        display_order: 0,
                        meta_properties: meta,
                    });
                }
            }
        }
        for (i, c) in kept.iter_mut().enumerate() {
            c.display_order = i as u32;
        }
        self.columns = kept;
        if let Some(conflict) = self.check_overlaps() {
            *self = saved;
            return Err(conflict);
        }
        if self.column_order == ColumnOrder::Sorted {
            self.columns.sort_by(|a, b| {
                a.value.partial_cmp(&b.value).unwrap_or(core::cmp::Ordering::Equal)
            });
            for (i, c) in self.columns.iter_mut().enumerate() {
                c.display_order = i as u32;
            }
        }
        Ok(())
    }

    fn check_overlaps(&self) -> Option<ModelError> {
        if matches!(self.kind, AxisKind::Nearest | AxisKind::Rule) {
            return None;
        }
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                let a = footprints(&self.columns[i].value);
                let b = footprints(&self.columns[j].value);
                if a.iter().any(|x| b.iter().any(|y| footprints_overlap(x, y))) {
                    return Some(ModelError::AxisOverlap {
                        axis: self.name.to_string(),
                        value: format!("{} overlaps {}", self.columns[i].value, self.columns[j].value),
                    });
                }
            }
        }
        None
    }

    /// Renames this axis. Uniqueness against sibling axes is the caller's
    /// responsibility (spec §4.2: "fails if target name already exists on
    /// the cube" — that check needs the owning cube's axis list, which this
    /// type doesn't have).
    pub fn rename(&mut self, new_name: impl Into<Name>) {
        self.name = new_name.into();
    }

    /// Axis identity equality per spec §4.2: name, kind, value-type,
    /// has-default and column-order, excluding meta-properties.
    pub fn same_identity(&self, other: &Axis) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.value_type == other.value_type
            && self.has_default == other.has_default
            && self.column_order == other.column_order
    }
}

fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Range(..) => "range",
        Value::Set(..) => "set",
        _ => "discrete",
    }
}

/// Distance between a column's value and a query value, for NEAREST axes
/// (spec §3: "numeric, string Levenshtein-like, 2-D/3-D point, geodesic
/// lat/lon").
fn distance(column: &Value, query: &Value) -> Option<f64> {
    match (column, query) {
        (Value::Long(a), Value::Long(b)) => Some((*a - *b).unsigned_abs() as f64),
        (Value::Double(a), Value::Double(b)) => Some((a - b).abs()),
        (Value::Long(a), Value::Double(b)) | (Value::Double(b), Value::Long(a)) => {
            Some((*a as f64 - b).abs())
        }
        (Value::String(a), Value::String(b)) => Some(levenshtein(a, b) as f64),
        (Value::Point2D(x1, y1), Value::Point2D(x2, y2)) => {
            Some(((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt())
        }
        (Value::Point3D(x1, y1, z1), Value::Point3D(x2, y2, z2)) => {
            Some(((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt())
        }
        (Value::LatLon(lat1, lon1), Value::LatLon(lat2, lon2)) => {
            Some(haversine_km(*lat1, *lon1, *lat2, *lon2))
        }
        _ => None,
    }
}

/// Levenshtein edit distance, used by NEAREST STRING axes.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let tmp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = tmp;
        }
    }
    row[b.len()]
}

/// Great-circle distance in kilometers, used by NEAREST LatLon axes.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
}

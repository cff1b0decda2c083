use core::fmt;
use std::collections::HashMap;

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{ColumnId, ExpressionDescriptor, NameMap, Value};

/// A cell's content (spec §3, §4.4): a literal, a deferred computation, or a
/// reference into another cube's coordinate space.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellValue {
    /// A literal value, returned as-is.
    Scalar(Value),
    /// Source evaluated fresh (or from cache) against the execution
    /// context's input map (spec §4.5/§4.1 EXPRESSION).
    Expression(ExpressionDescriptor),
    /// Source rendered as a template (e.g. string interpolation) rather than
    /// evaluated as a full expression.
    Template(ExpressionDescriptor),
    /// Source invoked as a named method against the execution context.
    Method(ExpressionDescriptor),
    /// A pointer to a cell in a different cube, with coordinate overrides
    /// merged over the caller's coordinate before lookup (spec §4.5).
    CrossCubeReference {
        /// The name of the cube to look up the value in.
        target_cube: String,
        /// Coordinate axis values to override before delegating the lookup.
        overrides: NameMap,
    },
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Scalar(v) => write!(f, "{v}"),
            CellValue::Expression(e) => write!(f, "{e}"),
            CellValue::Template(e) => write!(f, "<template {}>", e.source),
            CellValue::Method(e) => write!(f, "<method {}>", e.source),
            CellValue::CrossCubeReference { target_cube, .. } => {
                write!(f, "<ref {target_cube}>")
            }
        }
    }
}

/// The inline capacity a cell's key is expected to need: most cubes bind
/// cells on a handful of axes, so four ids cover the common case without a
/// heap allocation (grounded in the same fixed-capacity-first preference the
/// teacher applies to small, bounded collections).
type ColumnIdInline = [ColumnId; 4];

/// A cell's composite key: one column id per axis the cell is explicitly
/// bound on (spec §4.4). An axis bound to its default column is omitted from
/// the set entirely — "the cell whose binding on axis A is the default
/// column is stored with A's id omitted" — so a fully-default coordinate
/// maps to the empty set, which is exactly the cube's default cell slot.
///
/// Equality and hashing are order-insensitive: a cell set on axes `(A, B)`
/// is the same cell however the caller enumerated the axes.
#[derive(Clone, Debug, Default)]
pub struct ColumnIdSet(SmallVec<ColumnIdInline>);

impl ColumnIdSet {
    /// The empty set — the cube's default cell.
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    /// Builds a set from an arbitrary iterator of ids, normalizing order so
    /// equal sets hash and compare equal regardless of input order.
    pub fn from_ids(ids: impl IntoIterator<Item = ColumnId>) -> Self {
        let mut v: SmallVec<ColumnIdInline> = ids.into_iter().collect();
        v.sort_by_key(ColumnId::as_u64);
        v.dedup_by_key(|id| id.as_u64());
        Self(v)
    }

    /// The ids in this set, in ascending order.
    pub fn ids(&self) -> &[ColumnId] {
        &self.0
    }

    /// Whether this binds no axes explicitly (the cube's default cell).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ColumnIdSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }
}

impl Eq for ColumnIdSet {}

impl std::hash::Hash for ColumnIdSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for id in &self.0 {
            id.as_u64().hash(state);
        }
    }
}

/// The sparse storage for a cube's cells (spec §4.4 "Cell Map"): a hash map
/// keyed by the set of non-default column ids a cell is bound on.
///
/// Deliberately doesn't know about axes or names — translating a
/// [`ColumnIdSet`] back into `axis name -> column value` pairs needs the
/// owning axes, which live on `NCube` in `ncube-engine`.
#[derive(Clone, Debug, Default)]
pub struct CellMap(HashMap<ColumnIdSet, CellValue>);

impl CellMap {
    /// Creates an empty cell map.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Sets the cell at `key`, returning the previous value if any.
    pub fn set(&mut self, key: ColumnIdSet, value: CellValue) -> Option<CellValue> {
        self.0.insert(key, value)
    }

    /// Looks up the cell at `key`.
    pub fn get(&self, key: &ColumnIdSet) -> Option<&CellValue> {
        self.0.get(key)
    }

    /// Removes the cell at `key`, returning it if present.
    pub fn remove(&mut self, key: &ColumnIdSet) -> Option<CellValue> {
        self.0.remove(key)
    }

    /// Whether a cell is explicitly set at `key`. Pass `fall_back_to_default
    /// = true` to also report the cube-level default cell (the empty key) as
    /// present when `key` itself has nothing.
    pub fn contains_cell(&self, key: &ColumnIdSet, fall_back_to_default: bool) -> bool {
        self.0.contains_key(key)
            || (fall_back_to_default && !key.is_empty() && self.0.contains_key(&ColumnIdSet::empty()))
    }

    /// Number of explicitly set cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no cells are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnIdSet, &CellValue)> {
        self.0.iter()
    }
}

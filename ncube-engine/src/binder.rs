use ncube_model::{AxisId, AxisKind, ColumnId, ColumnIdSet};

use crate::cube::NCube;
use crate::coordinate::Coordinate;
use crate::error::NCubeError;

/// A coordinate resolved to one concrete column per axis (spec §4.3).
///
/// Axes bound to their default column are tracked here too (for tracing),
/// but are dropped by [`BoundCoordinate::into_cell_key`] since the cell map
/// stores default bindings by omission (spec §4.4).
#[derive(Clone, Debug, Default)]
pub struct BoundCoordinate(Vec<(AxisId, ColumnId)>);

impl BoundCoordinate {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn push(&mut self, axis: AxisId, column: ColumnId) {
        self.0.push((axis, column));
    }

    /// Appends an additional `(axis, column)` binding, e.g. a rule column
    /// that fired after the non-rule axes were already bound.
    pub(crate) fn push_binding(&mut self, axis: AxisId, column: ColumnId) {
        self.0.push((axis, column));
    }

    /// The resolved `(axis id, column id)` pairs, in the cube's axis order.
    pub fn bindings(&self) -> &[(AxisId, ColumnId)] {
        &self.0
    }

    /// Converts this into the cell map key, dropping bindings to each
    /// axis's default column (spec §4.4).
    pub fn into_cell_key(self, cube: &NCube) -> ColumnIdSet {
        let ids = self.0.into_iter().filter_map(|(axis_id, column_id)| {
            let is_default = cube
                .axis_by_id(axis_id)
                .and_then(|a| a.default_column_id())
                .is_some_and(|default_id| default_id == column_id);
            (!is_default).then_some(column_id)
        });
        ColumnIdSet::from_ids(ids)
    }
}

/// Binds a coordinate against every non-RULE axis on `cube`, failing with
/// [`NCubeError::MissingScope`] if a required axis has no binding and no
/// default, or [`NCubeError::CoordinateNotFound`] if a bound value matches
/// no column and the axis has no default (spec §4.3, §7).
///
/// RULE axes are left out entirely: they're resolved by the rule engine's
/// Start/Evaluate/Fire/Advance loop (spec §4.6), including "jump-start"
/// (repositioning where that loop begins), not by a single value lookup.
pub fn bind(cube: &NCube, coordinate: &Coordinate) -> Result<BoundCoordinate, NCubeError> {
    let mut bound = BoundCoordinate::new();
    for axis in cube.axes() {
        if axis.kind() == AxisKind::Rule {
            continue;
        }
        match coordinate.get(axis.name().as_str()) {
            Some(value) => {
                let column = axis.find_column(value).ok_or_else(|| NCubeError::CoordinateNotFound {
                    axis: axis.name().to_string(),
                    value: value.to_string(),
                })?;
                bound.push(axis.id(), column);
            }
            None => match axis.default_column_id() {
                Some(default_id) => bound.push(axis.id(), default_id),
                None => return Err(NCubeError::MissingScope { axis: axis.name().to_string() }),
            },
        }
    }
    Ok(bound)
}

/// Expands a coordinate into every bound combination needed for `getMap()`:
/// axes left unbound in `coordinate` that are SET axes fan out to one
/// binding per column (plus the default, if any) instead of failing with
/// `MissingScope`; every other axis binds exactly as [`bind`] does (spec
/// §4.3 "SET-wildcard Cartesian product").
pub fn bind_map(cube: &NCube, coordinate: &Coordinate) -> Result<Vec<BoundCoordinate>, NCubeError> {
    let mut combinations = vec![BoundCoordinate::new()];
    for axis in cube.axes() {
        if axis.kind() == AxisKind::Rule {
            continue;
        }
        let candidates: Vec<ColumnId> = match coordinate.get(axis.name().as_str()) {
            Some(value) => vec![axis.find_column(value).ok_or_else(|| NCubeError::CoordinateNotFound {
                axis: axis.name().to_string(),
                value: value.to_string(),
            })?],
            None if axis.kind() == AxisKind::Set => {
                let mut ids: Vec<ColumnId> = axis.columns().iter().map(|c| c.id()).collect();
                ids.extend(axis.default_column_id());
                if ids.is_empty() {
                    return Err(NCubeError::MissingScope { axis: axis.name().to_string() });
                }
                ids
            }
            None => match axis.default_column_id() {
                Some(default_id) => vec![default_id],
                None => return Err(NCubeError::MissingScope { axis: axis.name().to_string() }),
            },
        };
        let mut expanded = Vec::with_capacity(combinations.len() * candidates.len());
        for partial in &combinations {
            for &column in &candidates {
                let mut next = partial.clone();
                next.push(axis.id(), column);
                expanded.push(next);
            }
        }
        combinations = expanded;
    }
    Ok(combinations)
}

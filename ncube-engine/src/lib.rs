//! # ncube-engine
//!
//! ncube-engine assembles [`ncube_model`]'s axes, columns and cells into
//! [`NCube`], the full decision table: coordinate binding, default-column
//! fallback, cell dispatch through an embedding host's expression/resource/
//! registry collaborators, the RULE-axis engine, textual/typed coercion and
//! content-addressed identity and delta/merge (spec §4-§7).

#![deny(missing_docs)]
#![deny(unused_imports)]

mod binder;
mod coerce;
mod coordinate;
mod cube;
mod error;
mod executor;
mod identity;
mod rule;

pub use self::{
    binder::BoundCoordinate,
    coerce::{coerce_text, coerce_value, PointKind},
    coordinate::Coordinate,
    cube::NCube,
    error::NCubeError,
    executor::{dispatch, ExecutionContext},
    identity::{diff, merge, CubeDelta},
    rule::{execute as execute_rules, RuleInfo, RuleOutcome},
};

pub use ncube_core::{ApplicationId, CompiledArtifact, CubeRegistry, ExpressionHost, NCubeContext, ResourceFetcher, Sha1Digest};
pub use ncube_model::{
    Axis, AxisId, AxisKind, AxisValueType, CellMap, CellValue, Column, ColumnId, ColumnIdSet, ColumnOrder, ExpressionDescriptor,
    ModelError, Name, NameMap, Value,
};

/// Looks up a single cell for `coordinate`, resolving any RULE axis by
/// firing its conditions (spec §4.3, §4.6): a thin convenience wrapper over
/// [`execute_rules`] for the common case where callers want one value rather
/// than the full outcome trace.
pub fn get_cell(cube: &NCube, coordinate: &Coordinate, ctx: &mut ExecutionContext<'_>) -> Result<Value, NCubeError> {
    let mut outcomes = execute_rules(cube, coordinate, ctx)?;
    if outcomes.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(outcomes.remove(0).value)
    }
}

/// Resolves every combination implied by leaving SET axes unbound in
/// `coordinate` (spec §4.3 `getMap`), dispatching a cell for each.
pub fn get_map(
    cube: &NCube,
    coordinate: &Coordinate,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Vec<(NameMap, Value)>, NCubeError> {
    let combinations = cube.bind_map(coordinate)?;
    let mut results = Vec::with_capacity(combinations.len());
    for bound in combinations {
        let coordinate_out = bound
            .bindings()
            .iter()
            .filter_map(|&(axis_id, column_id)| {
                let axis = cube.axis_by_id(axis_id)?;
                let column = axis.columns().iter().find(|c| c.id() == column_id)?;
                Some((axis.name().clone(), column.value().clone()))
            })
            .collect::<NameMap>();
        let key = bound.into_cell_key(cube);
        let value = dispatch(cube, &key, ctx)?;
        results.push((coordinate_out, value));
    }
    Ok(results)
}

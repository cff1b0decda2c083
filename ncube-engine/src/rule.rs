use ncube_model::{Axis, AxisId, AxisKind, ColumnId, Value};

use crate::binder::{self, BoundCoordinate};
use crate::coordinate::Coordinate;
use crate::cube::NCube;
use crate::error::NCubeError;
use crate::executor::{self, ExecutionContext};

/// A record of which rule columns fired to produce one result of a rule-axis
/// execution (spec §4.6), exposed to expressions as the `_rule` input so a
/// condition can reference the outcome of a rule axis evaluated earlier in
/// the nested iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleInfo {
    /// The `(axis, column)` pairs of every rule condition that fired, in
    /// nesting order (outermost axis first).
    pub axis_bindings: Vec<(AxisId, ColumnId)>,
    /// Every `(axis, column)` condition evaluated over the course of the
    /// whole call, true or false, in evaluation order — this is the full
    /// trace `execute`'s caller needs to verify the "how many conditions
    /// ran" and "jump-start skips the columns before it" properties (spec
    /// §8 invariants 9, 10). Shared across every [`RuleOutcome`] produced by
    /// the same call, since it describes the call as a whole rather than
    /// one fired combination.
    pub evaluated: Vec<(AxisId, ColumnId)>,
    /// Whether a cell signaled early termination of the rule axis iteration
    /// (spec §4.6 "Terminate … or a RuleStop is signaled").
    pub was_rule_stop_thrown: bool,
}

impl RuleInfo {
    fn fired(&self, axis: AxisId, column: ColumnId) -> Self {
        let mut next = self.clone();
        next.axis_bindings.push((axis, column));
        next
    }
}

/// One fired combination's result: the value produced and the trace of rule
/// columns that fired to reach it.
#[derive(Clone, Debug)]
pub struct RuleOutcome {
    /// The rule columns that fired, outermost axis first.
    pub rule_info: RuleInfo,
    /// The value dispatched for this combination.
    pub value: Value,
}

/// Runs `coordinate` against `cube`, resolving every RULE axis not already
/// addressed explicitly by iterating its columns' condition expressions
/// (spec §4.6).
///
/// An axis fires every column whose condition is truthy when
/// [`ncube_model::Axis::fire_all`] is set; otherwise it stops at the first
/// truthy column (`fire-one`, the default). Axes nest in the order they were
/// added to the cube — the first rule axis added is outermost. A coordinate
/// value naming one of the axis's own columns ("jump-start") repositions
/// where the Evaluate/Fire/Advance loop starts rather than resolving the
/// axis outright: the columns before it are skipped, the rest still run.
///
/// If the cube has no unresolved rule axes this degenerates to a single
/// dispatch, matching plain `getCell` behavior.
pub fn execute(
    cube: &NCube,
    coordinate: &Coordinate,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Vec<RuleOutcome>, NCubeError> {
    let base_bound = binder::bind(cube, coordinate)?;
    let unresolved = unresolved_rule_axes(cube, &base_bound);

    if unresolved.is_empty() {
        let key = base_bound.clone().into_cell_key(cube);
        let value = executor::dispatch(cube, &key, ctx)?;
        return Ok(vec![RuleOutcome { rule_info: RuleInfo::default(), value }]);
    }

    let mut outcomes = Vec::new();
    let mut evaluated = Vec::new();
    let mut stop = false;
    run_axis(cube, coordinate, &base_bound, &unresolved, 0, RuleInfo::default(), ctx, &mut outcomes, &mut evaluated, &mut stop)?;
    for outcome in &mut outcomes {
        outcome.rule_info.evaluated = evaluated.clone();
        outcome.rule_info.was_rule_stop_thrown = stop;
    }
    Ok(outcomes)
}

fn unresolved_rule_axes(cube: &NCube, bound: &BoundCoordinate) -> Vec<AxisId> {
    cube.axes()
        .filter(|a| a.kind() == AxisKind::Rule)
        .map(|a| a.id())
        .filter(|id| !bound.bindings().iter().any(|(axis_id, _)| axis_id == id))
        .collect()
}

/// Where this axis's Evaluate/Fire/Advance loop should start (spec §4.6's
/// "Start" state): the position of the column the coordinate names by the
/// axis's own name ("jump-start"), or the first column otherwise.
fn jump_start_index(axis: &Axis, coordinate: &Coordinate) -> usize {
    match coordinate.get(axis.name().as_str()) {
        Some(Value::String(name)) => axis
            .columns()
            .iter()
            .position(|c| c.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .unwrap_or(0),
        _ => 0,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_axis(
    cube: &NCube,
    coordinate: &Coordinate,
    base_bound: &BoundCoordinate,
    unresolved: &[AxisId],
    depth: usize,
    trace: RuleInfo,
    ctx: &mut ExecutionContext<'_>,
    outcomes: &mut Vec<RuleOutcome>,
    evaluated: &mut Vec<(AxisId, ColumnId)>,
    stop: &mut bool,
) -> Result<(), NCubeError> {
    if *stop {
        return Ok(());
    }

    let Some(&axis_id) = unresolved.get(depth) else {
        let mut key_bindings = base_bound.clone();
        for &(axis, column) in &trace.axis_bindings {
            key_bindings.push_binding(axis, column);
        }
        let key = key_bindings.into_cell_key(cube);
        ctx.rule_info = Some(trace.clone());
        let dispatched = executor::dispatch(cube, &key, ctx);
        ctx.rule_info = None;
        match dispatched {
            Ok(value) => outcomes.push(RuleOutcome { rule_info: trace, value }),
            Err(NCubeError::RuleStop) => *stop = true,
            Err(err) => return Err(err),
        }
        return Ok(());
    };

    let axis = cube.axis_by_id(axis_id).expect("unresolved axis id came from this cube");
    let mut input = ctx_input_with_trace(&trace, cube);
    for (name, value) in coordinate.iter() {
        input.insert(name.as_str(), value.clone());
    }

    let start = jump_start_index(axis, coordinate);
    let mut fired_any = false;
    for column in &axis.columns()[start..] {
        if *stop {
            break;
        }
        let condition = column.value();
        let fires = evaluate_condition(cube, condition, &input, ctx)?;
        evaluated.push((axis_id, column.id()));
        if !fires {
            continue;
        }
        fired_any = true;
        let next_trace = trace.fired(axis_id, column.id());
        run_axis(cube, coordinate, base_bound, unresolved, depth + 1, next_trace, ctx, outcomes, evaluated, stop)?;
        if *stop || !axis.fire_all() {
            break;
        }
    }

    if !fired_any && !*stop {
        if let Some(default_id) = axis.default_column_id() {
            let next_trace = trace.fired(axis_id, default_id);
            run_axis(cube, coordinate, base_bound, unresolved, depth + 1, next_trace, ctx, outcomes, evaluated, stop)?;
        } else {
            return Err(NCubeError::CoordinateNotFound {
                axis: axis.name().to_string(),
                value: "no rule condition fired".to_string(),
            });
        }
    }
    Ok(())
}

fn ctx_input_with_trace(trace: &RuleInfo, cube: &NCube) -> ncube_model::NameMap {
    let mut map = ncube_model::NameMap::new();
    for &(axis_id, column_id) in &trace.axis_bindings {
        if let Some(axis) = cube.axis_by_id(axis_id) {
            if let Some(column) = axis.columns().iter().find(|c| c.id() == column_id) {
                map.insert(axis.name().as_str(), column.value().clone());
            }
        }
    }
    map
}

fn evaluate_condition(
    cube: &NCube,
    condition: &Value,
    input: &ncube_model::NameMap,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, NCubeError> {
    match condition {
        Value::Expression(descriptor) => {
            let host = ctx.ncube_context().expression_host();
            host.compile(descriptor)?;
            let result = host.invoke(descriptor, input)?;
            log::debug!("rule condition on cube '{}' evaluated to {result}", cube.name());
            Ok(result.is_truthy())
        }
        other => Ok(other.is_truthy()),
    }
}

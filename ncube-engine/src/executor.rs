use std::collections::HashSet;

use ncube_core::NCubeContext;
use ncube_model::{CellValue, ColumnIdSet, NameMap, Value};

use crate::cube::NCube;
use crate::error::NCubeError;
use crate::rule::RuleInfo;

/// The mutable, per-top-level-call state threaded through binding and cell
/// dispatch (spec §9 "global mutable state must be encapsulated in explicit
/// context objects"): the external collaborators, the caller's extra input
/// bindings (visible to EXPRESSION/TEMPLATE/METHOD cells alongside the
/// coordinate), and the in-flight `(cube, coordinate)` set used to detect
/// cyclic cross-cube references (spec §5).
pub struct ExecutionContext<'a> {
    ncube_context: &'a NCubeContext,
    input: NameMap,
    output: NameMap,
    visiting: HashSet<(String, String)>,
    /// The rule trace for the combination currently being dispatched, if
    /// any rule axis is involved (spec §4.6, exposed to expressions as the
    /// `_rule` input binding).
    pub rule_info: Option<RuleInfo>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a fresh execution context around the given collaborators,
    /// with no extra input bindings, an empty output map, and an empty
    /// in-flight set.
    pub fn new(ncube_context: &'a NCubeContext) -> Self {
        Self {
            ncube_context,
            input: NameMap::new(),
            output: NameMap::new(),
            visiting: HashSet::new(),
            rule_info: None,
        }
    }

    /// Sets the extra input bindings visible to expression/template/method
    /// cells (spec §4.5), e.g. values a caller wants to pass alongside the
    /// coordinate without them being axis-bound.
    pub fn with_input(mut self, input: NameMap) -> Self {
        self.input = input;
        self
    }

    /// The collaborators (expression host, resource fetcher, cube
    /// registry, compile cache) backing this execution.
    pub fn ncube_context(&self) -> &NCubeContext {
        self.ncube_context
    }

    /// The side-channel output map a cell body can write diagnostics or
    /// accumulated values into over the course of a call (spec §4.5
    /// "manage output map and execution trace").
    pub fn output(&self) -> &NameMap {
        &self.output
    }

    /// Mutable access to the output map, e.g. for a host's expression
    /// invocation to record a value alongside its return value.
    pub fn output_mut(&mut self) -> &mut NameMap {
        &mut self.output
    }

    fn enter(&mut self, cube: &str, coordinate: &str) -> Result<(), NCubeError> {
        let key = (cube.to_ascii_lowercase(), coordinate.to_string());
        if !self.visiting.insert(key) {
            return Err(NCubeError::CyclicReference {
                cube: cube.to_string(),
                coordinate: coordinate.to_string(),
            });
        }
        Ok(())
    }

    fn leave(&mut self, cube: &str, coordinate: &str) {
        self.visiting.remove(&(cube.to_ascii_lowercase(), coordinate.to_string()));
    }
}

/// Dispatches a single resolved cell: returns its scalar value, evaluates
/// expression/template/method source through the `ExpressionHost`, or
/// follows a cross-cube reference (spec §4.5).
///
/// Falls back to the cube's default cell, then to `Value::Null`, if no
/// explicit cell is set at `key` — matching an empty cube's behavior of
/// serving its default cell unconditionally (spec boundary case).
pub fn dispatch(
    cube: &NCube,
    key: &ColumnIdSet,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Value, NCubeError> {
    let cell = cube.cell_at(key).or_else(|| cube.default_cell());
    let Some(cell) = cell else {
        return Ok(Value::Null);
    };
    evaluate(cube, cell.clone(), key, ctx)
}

fn evaluate(
    cube: &NCube,
    cell: CellValue,
    key: &ColumnIdSet,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Value, NCubeError> {
    match cell {
        CellValue::Scalar(value) => Ok(value),
        CellValue::Expression(descriptor) => {
            let host = ctx.ncube_context().expression_host();
            let digest = host.compile(&descriptor)?;
            log::trace!("evaluating expression {digest} for cube '{}'", cube.name());
            Ok(host.invoke(&descriptor, &ctx.input)?)
        }
        CellValue::Template(descriptor) => {
            let host = ctx.ncube_context().expression_host();
            host.compile(&descriptor)?;
            Ok(host.invoke(&descriptor, &ctx.input)?)
        }
        CellValue::Method(descriptor) => {
            let entry_point = descriptor.entry_point.as_deref().ok_or_else(|| {
                NCubeError::InvalidArgument("method cell has no entry_point set".to_string())
            })?;
            let host = ctx.ncube_context().expression_host();
            let digest = host.compile(&descriptor)?;
            log::trace!("invoking method '{entry_point}' (expression {digest}) for cube '{}'", cube.name());
            Ok(host.invoke(&descriptor, &ctx.input)?)
        }
        CellValue::CrossCubeReference { target_cube, overrides } => {
            let base_coordinate = cube.cells_as_coordinates_for_key(key);
            let mut coordinate = NameMap::new();
            for (name, value) in base_coordinate.iter() {
                coordinate.insert(name.as_str(), value.clone());
            }
            for (name, value) in overrides.iter() {
                coordinate.insert(name.as_str(), value.clone());
            }
            let marker = format!("{target_cube}:{coordinate:?}");
            ctx.enter(&target_cube, &marker)?;
            let result = ctx
                .ncube_context()
                .registry()
                .lookup(cube.application(), &target_cube, &coordinate)
                .map_err(NCubeError::from);
            ctx.leave(&target_cube, &marker);
            result
        }
    }
}

mod support;

use ncube_engine::{diff, get_cell, merge, ColumnIdSet, Coordinate, ExecutionContext, NCube};
use ncube_model::{Axis, AxisId, AxisKind, AxisValueType, CellValue, ColumnOrder, ModelError, NameMap, Value};

fn axis_id(n: u16) -> AxisId {
    AxisId(n)
}

fn discrete_code_cube() -> NCube {
    let mut cube = NCube::new("codes", support::app());
    cube.add_axis("code", |id| {
        let mut axis = Axis::new(id, "code", AxisKind::Discrete, AxisValueType::Long, true, ColumnOrder::Display);
        for n in [0, 10, 100] {
            axis.add_column(Value::Long(n)).unwrap();
        }
        axis
    })
    .unwrap();
    cube
}

// Property: findColumn is deterministic — looking up the same value twice
// returns the same column id, regardless of axis kind.
#[test]
fn find_column_is_deterministic() {
    let cube = discrete_code_cube();
    let axis = cube.axis("code").unwrap();
    let first = axis.find_column(&Value::Long(10));
    let second = axis.find_column(&Value::Long(10));
    assert_eq!(first, second);
    assert!(first.is_some());
}

// Property: overlap rejection holds across RANGE and SET axes, not just
// DISCRETE (covered separately in scenarios.rs).
#[test]
fn range_axis_rejects_overlapping_bucket() {
    let mut axis = Axis::new(axis_id(0), "age", AxisKind::Range, AxisValueType::Long, false, ColumnOrder::Sorted);
    axis.add_column(Value::range(Value::Long(0), Value::Long(18))).unwrap();
    axis.add_column(Value::range(Value::Long(18), Value::Long(30))).unwrap();
    let err = axis.add_column(Value::range(Value::Long(10), Value::Long(20))).unwrap_err();
    assert!(matches!(err, ModelError::AxisOverlap { .. }));
}

#[test]
fn set_axis_rejects_overlapping_member() {
    let mut axis = Axis::new(axis_id(0), "region", AxisKind::Set, AxisValueType::String, false, ColumnOrder::Display);
    axis.add_column(Value::Set(vec![Value::String("OH".into()), Value::String("PA".into())])).unwrap();
    let err = axis.add_column(Value::Set(vec![Value::String("PA".into()), Value::String("NY".into())])).unwrap_err();
    assert!(matches!(err, ModelError::AxisOverlap { .. }));
}

// Property: RANGE bounds must be strictly ordered (low < high); low == high
// and low > high are both rejected.
#[test]
fn range_low_equal_to_high_is_rejected() {
    let mut axis = Axis::new(axis_id(0), "age", AxisKind::Range, AxisValueType::Long, false, ColumnOrder::Sorted);
    let err = axis.add_column(Value::range(Value::Long(10), Value::Long(10))).unwrap_err();
    assert!(matches!(err, ModelError::Unsupported { .. }));
}

#[test]
fn range_low_greater_than_high_is_rejected() {
    let mut axis = Axis::new(axis_id(0), "age", AxisKind::Range, AxisValueType::Long, false, ColumnOrder::Sorted);
    let err = axis.add_column(Value::range(Value::Long(20), Value::Long(10))).unwrap_err();
    assert!(matches!(err, ModelError::Unsupported { .. }));
}

// Property: a duplicate default column is rejected.
#[test]
fn adding_a_duplicate_default_column_fails() {
    let mut axis = Axis::new(axis_id(0), "code", AxisKind::Discrete, AxisValueType::Long, true, ColumnOrder::Display);
    let err = axis.enable_default().unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
}

// Property: NEAREST + hasDefault=true is silently coerced to false rather
// than rejected (Open Question (a)).
#[test]
fn nearest_axis_with_default_is_coerced_to_no_default() {
    let axis = Axis::new(axis_id(0), "direction", AxisKind::Nearest, AxisValueType::Comparable, true, ColumnOrder::Display);
    assert!(!axis.has_default());
    assert_eq!(axis.default_column_id(), None);
}

#[test]
fn enabling_default_on_a_nearest_axis_fails() {
    let mut axis = Axis::new(axis_id(0), "direction", AxisKind::Nearest, AxisValueType::Comparable, false, ColumnOrder::Display);
    let err = axis.enable_default().unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
}

// Property: a missing value on a DISCRETE axis with no default fails lookup
// rather than silently falling through.
#[test]
fn missing_value_on_a_discrete_axis_without_default_is_rejected() {
    let mut cube = NCube::new("rates", support::app());
    cube.add_axis("gender", |id| {
        let mut axis = Axis::new(id, "gender", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("Male".into())).unwrap();
        axis.add_column(Value::String("Female".into())).unwrap();
        axis
    })
    .unwrap();

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new().set("gender", Value::String("Unknown".into()));
    let err = get_cell(&cube, &coordinate, &mut ctx).unwrap_err();
    assert!(matches!(err, ncube_engine::NCubeError::CoordinateNotFound { .. }));
}

// Property: the identity digest is stable across a structural clone (stands
// in for the JSON round-trip scenario, since no formatter is implemented
// here), and unaffected by which order axes/cells are iterated internally.
#[test]
fn digest_is_stable_across_clone() {
    let cube = discrete_code_cube();
    let cloned = cube.clone();
    assert_eq!(cube.digest(), cloned.digest());
}

#[test]
fn digest_changes_when_a_cell_value_changes() {
    let mut cube = discrete_code_cube();
    let before = cube.digest();
    let axis = cube.axis("code").unwrap();
    let ten = axis.find_column(&Value::Long(10)).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([ten]), CellValue::Scalar(Value::String("x".into())));
    assert_ne!(before, cube.digest());
}

// Property: deleting a column removes exactly the cells bound to it,
// preserving cells bound to other columns on the same axis.
#[test]
fn deleting_a_column_removes_only_its_own_cells() {
    let mut cube = discrete_code_cube();
    let axis = cube.axis("code").unwrap();
    let zero = axis.find_column(&Value::Long(0)).unwrap();
    let ten = axis.find_column(&Value::Long(10)).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([zero]), CellValue::Scalar(Value::String("zero".into())));
    cube.set_cell(ColumnIdSet::from_ids([ten]), CellValue::Scalar(Value::String("ten".into())));

    cube.axis_mut("code").unwrap().delete_column_by_id(ten);
    cube.remove_cell(&ColumnIdSet::from_ids([ten]));

    assert!(cube.cell_at(&ColumnIdSet::from_ids([zero])).is_some());
    assert!(cube.cell_at(&ColumnIdSet::from_ids([ten])).is_none());
}

// Property: deleting an axis entirely removes every cell bound on it.
#[test]
fn deleting_an_axis_removes_every_cell_bound_on_it() {
    let mut cube = NCube::new("rates", support::app());
    cube.add_axis("gender", |id| {
        let mut axis = Axis::new(id, "gender", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("Male".into())).unwrap();
        axis
    })
    .unwrap();
    cube.add_axis("state", |id| {
        let mut axis = Axis::new(id, "state", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("OH".into())).unwrap();
        axis
    })
    .unwrap();

    let male = cube.axis("gender").unwrap().find_column(&Value::String("Male".into())).unwrap();
    let oh = cube.axis("state").unwrap().find_column(&Value::String("OH".into())).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([male, oh]), CellValue::Scalar(Value::Long(1)));

    assert!(cube.delete_axis("gender"));
    assert!(cube.cell_at(&ColumnIdSet::from_ids([oh])).is_none());
}

// Property: merge is idempotent — applying the same delta twice is the same
// as applying it once.
#[test]
fn merge_is_idempotent() {
    let base = discrete_code_cube();
    let mut theirs = base.clone();
    let axis = theirs.axis("code").unwrap();
    let ten = axis.find_column(&Value::Long(10)).unwrap();
    theirs.set_cell(ColumnIdSet::from_ids([ten]), CellValue::Scalar(Value::String("ten".into())));

    let mut merged_once = base.clone();
    merge(&mut merged_once, &theirs).unwrap();
    let mut merged_twice = merged_once.clone();
    merge(&mut merged_twice, &theirs).unwrap();

    assert_eq!(merged_once.digest(), merged_twice.digest());
}

// Property: diffing a cube against itself yields an empty delta.
#[test]
fn diff_of_a_cube_against_itself_is_empty() {
    let cube = discrete_code_cube();
    let delta = diff(&cube, &cube);
    assert!(delta.is_empty());
}

#[test]
fn diff_detects_an_added_cell() {
    let before = discrete_code_cube();
    let mut after = before.clone();
    let axis = after.axis("code").unwrap();
    let ten = axis.find_column(&Value::Long(10)).unwrap();
    after.set_cell(ColumnIdSet::from_ids([ten]), CellValue::Scalar(Value::String("ten".into())));

    let delta = diff(&before, &after);
    assert_eq!(delta.added_cells.len(), 1);
    assert!(delta.removed_cells.is_empty());
    assert!(delta.changed_cells.is_empty());
}

// Property: merging cubes whose axis sets differ fails rather than silently
// dropping the mismatched axis.
#[test]
fn merging_cubes_with_different_axis_sets_fails() {
    let mut base = NCube::new("rates", support::app());
    base.add_axis("code", |id| Axis::new(id, "code", AxisKind::Discrete, AxisValueType::Long, true, ColumnOrder::Display))
        .unwrap();

    let mut theirs = NCube::new("rates", support::app());
    theirs
        .add_axis("other", |id| Axis::new(id, "other", AxisKind::Discrete, AxisValueType::Long, true, ColumnOrder::Display))
        .unwrap();

    let err = merge(&mut base, &theirs).unwrap_err();
    assert!(matches!(err, ncube_engine::NCubeError::IncompatibleMerge(_)));
}

// Property: cell retrieval is case-insensitive on both axis names and string
// column values.
#[test]
fn cell_retrieval_is_case_insensitive_on_keys_and_values() {
    let mut cube = NCube::new("rates", support::app());
    cube.add_axis("Gender", |id| {
        let mut axis = Axis::new(id, "Gender", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("Male".into())).unwrap();
        axis
    })
    .unwrap();

    let male = cube.axis("Gender").unwrap().find_column(&Value::String("Male".into())).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([male]), CellValue::Scalar(Value::Long(21)));

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new().set("GENDER", Value::String("male".into()));
    assert_eq!(get_cell(&cube, &coordinate, &mut ctx).unwrap(), Value::Long(21));
}

// Property: `updateColumns` leaves the axis unchanged when the proposed
// batch reintroduces an overlap.
#[test]
fn update_columns_rolls_back_on_overlap() {
    let mut axis = Axis::new(axis_id(0), "code", AxisKind::Discrete, AxisValueType::Long, false, ColumnOrder::Display);
    let zero = axis.add_column(Value::Long(0)).unwrap();
    let ten = axis.add_column(Value::Long(10)).unwrap();
    let before: Vec<(ncube_model::ColumnId, Value)> = axis.columns().iter().map(|c| (c.id(), c.value().clone())).collect();

    let err = axis
        .update_columns(vec![
            (Some(zero), Value::Long(0), Default::default()),
            (Some(ten), Value::Long(0), Default::default()),
        ])
        .unwrap_err();

    assert!(matches!(err, ModelError::AxisOverlap { .. }));
    let after: Vec<(ncube_model::ColumnId, Value)> = axis.columns().iter().map(|c| (c.id(), c.value().clone())).collect();
    assert_eq!(before, after);
}

// Property: the execution context's output map is a writable side channel
// independent of the dispatched value, and starts empty.
#[test]
fn execution_context_output_map_starts_empty_and_is_independently_writable() {
    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    assert!(ctx.output().is_empty());

    ctx.output_mut().insert("trace", Value::String("first-pass".into()));
    assert_eq!(ctx.output().get("trace"), Some(&Value::String("first-pass".into())));

    let mut expected = NameMap::new();
    expected.insert("trace", Value::String("first-pass".into()));
    assert_eq!(ctx.output().len(), expected.len());
}

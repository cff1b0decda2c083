mod support;

use ncube_engine::{get_cell, ColumnIdSet, Coordinate, ExecutionContext, NCube};
use ncube_model::{Axis, AxisId, AxisKind, AxisValueType, CellValue, ColumnOrder, ExpressionDescriptor, Value};

fn axis_id(n: u16) -> AxisId {
    AxisId(n)
}

#[test]
fn two_axis_decision_table_resolves_and_falls_back_to_default() {
    let mut cube = NCube::new("rates", support::app());

    cube.add_axis("Gender", |id| {
        let mut axis = Axis::new(id, "Gender", AxisKind::Discrete, AxisValueType::String, true, ColumnOrder::Display);
        axis.add_column(Value::String("Male".into())).unwrap();
        axis.add_column(Value::String("Female".into())).unwrap();
        axis
    })
    .unwrap();

    cube.add_axis("Age", |id| {
        let mut axis = Axis::new(id, "Age", AxisKind::Range, AxisValueType::Long, false, ColumnOrder::Sorted);
        for (lo, hi) in [(0, 18), (18, 30), (30, 40), (40, 65), (65, 80)] {
            axis.add_column(Value::range(Value::Long(lo), Value::Long(hi))).unwrap();
        }
        axis
    })
    .unwrap();

    cube.set_default_cell(Some(CellValue::Scalar(Value::Double(3.0))));

    let gender = cube.axis("Gender").unwrap();
    let male = gender.find_column(&Value::String("Male".into())).unwrap();
    let age = cube.axis("Age").unwrap();
    let eighteen = age.find_column(&Value::Long(18)).unwrap();
    let key = ColumnIdSet::from_ids([male, eighteen]);
    cube.set_cell(key, CellValue::Scalar(Value::Double(21.0)));

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);

    let coordinate = Coordinate::new().set("Gender", Value::String("Male".into())).set("Age", Value::Long(18));
    assert_eq!(get_cell(&cube, &coordinate, &mut ctx).unwrap(), Value::Double(21.0));

    let coordinate = Coordinate::new().set("Gender", Value::String("Male".into())).set("Age", Value::Long(65));
    assert_eq!(get_cell(&cube, &coordinate, &mut ctx).unwrap(), Value::Double(3.0));
}

#[test]
fn rule_axis_fires_only_the_matching_condition() {
    let mut cube = NCube::new("classification", support::app());

    cube.add_axis("age", |id| {
        let mut axis = Axis::new(id, "age", AxisKind::Rule, AxisValueType::Comparable, false, ColumnOrder::Display);
        for (name, source) in [("young", "age<18"), ("adult", "age>=18&&age<65"), ("old", "age>=65")] {
            let column_id = axis.add_column(Value::Expression(ExpressionDescriptor::new(source))).unwrap();
            let column = axis.columns_mut().iter_mut().find(|c| c.id() == column_id).unwrap();
            column.meta_properties_mut().insert("name", Value::String(name.into()));
        }
        axis
    })
    .unwrap();

    cube.add_axis("state", |id| {
        let mut axis = Axis::new(id, "state", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("OH".into())).unwrap();
        axis
    })
    .unwrap();

    let age = cube.axis("age").unwrap();
    let young = age.columns()[0].id();
    let state = cube.axis("state").unwrap();
    let oh = state.find_column(&Value::String("OH".into())).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([young, oh]), CellValue::Scalar(Value::String("minor".into())));

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new().set("age", Value::Long(10)).set("state", Value::String("OH".into()));
    let outcomes = ncube_engine::execute_rules(&cube, &coordinate, &mut ctx).unwrap();

    assert_eq!(outcomes.len(), 1, "only the 'young' condition is truthy for age=10");
    assert_eq!(outcomes[0].value, Value::String("minor".into()));
    assert_eq!(outcomes[0].rule_info.axis_bindings.len(), 1);
}

#[test]
fn rule_stop_halts_iteration_before_later_columns_fire() {
    let mut cube = NCube::new("tiered", support::app());
    cube.add_axis("tier", |id| {
        let mut axis = Axis::new(id, "tier", AxisKind::Rule, AxisValueType::Comparable, false, ColumnOrder::Display);
        axis.set_fire_all(true);
        for name in ["a", "b", "c"] {
            let column_id = axis.add_column(Value::Boolean(true)).unwrap();
            let column = axis.columns_mut().iter_mut().find(|c| c.id() == column_id).unwrap();
            column.meta_properties_mut().insert("name", Value::String(name.into()));
        }
        axis
    })
    .unwrap();

    let axis = cube.axis("tier").unwrap();
    let a = axis.columns().iter().find(|c| c.name() == Some("a")).unwrap().id();
    let b = axis.columns().iter().find(|c| c.name() == Some("b")).unwrap().id();
    let c = axis.columns().iter().find(|c| c.name() == Some("c")).unwrap().id();
    cube.set_cell(ColumnIdSet::from_ids([a]), CellValue::Scalar(Value::String("first".into())));
    cube.set_cell(ColumnIdSet::from_ids([b]), CellValue::Expression(ExpressionDescriptor::new("RULESTOP")));
    cube.set_cell(ColumnIdSet::from_ids([c]), CellValue::Scalar(Value::String("third".into())));

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new();
    let outcomes = ncube_engine::execute_rules(&cube, &coordinate, &mut ctx).unwrap();

    assert_eq!(outcomes.len(), 1, "column 'c' never fires once 'b' signals RuleStop");
    assert_eq!(outcomes[0].value, Value::String("first".into()));
    assert!(outcomes[0].rule_info.was_rule_stop_thrown);
    assert_eq!(outcomes[0].rule_info.evaluated.len(), 2, "'a' and 'b' are evaluated, 'c' is not");
}

#[test]
fn jump_start_repositions_the_iteration_cursor_without_skipping_evaluation() {
    let mut cube = NCube::new("basic_jump_start", support::app());
    cube.add_axis("condition", |id| {
        let mut axis = Axis::new(id, "condition", AxisKind::Rule, AxisValueType::Comparable, false, ColumnOrder::Display);
        axis.set_fire_all(true);
        for letter in ["a", "b", "c", "d", "e", "f", "g"] {
            let column_id = axis.add_column(Value::Expression(ExpressionDescriptor::new(format!("letter=='{letter}'")))).unwrap();
            let column = axis.columns_mut().iter_mut().find(|c| c.id() == column_id).unwrap();
            column.meta_properties_mut().insert("name", Value::String(letter.into()));
        }
        axis
    })
    .unwrap();

    let axis = cube.axis("condition").unwrap();
    for letter in ["a", "b", "c", "d", "e", "f", "g"] {
        let column = axis.columns().iter().find(|c| c.name() == Some(letter)).unwrap().id();
        cube.set_cell(ColumnIdSet::from_ids([column]), CellValue::Scalar(Value::String(format!("{}-result", letter.to_uppercase()))));
    }

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);

    // No jump-start: every one of the seven conditions is evaluated.
    let coordinate = Coordinate::new().set("letter", Value::String("e".into()));
    let outcomes = ncube_engine::execute_rules(&cube, &coordinate, &mut ctx).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].value, Value::String("E-result".into()));
    assert_eq!(outcomes[0].rule_info.evaluated.len(), 7, "without jump-start all seven conditions run");

    // Jump-start to 'e': only e, f, g are evaluated; d and earlier are skipped.
    let coordinate = Coordinate::new().set("letter", Value::String("e".into())).set("condition", Value::String("e".into()));
    let outcomes = ncube_engine::execute_rules(&cube, &coordinate, &mut ctx).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].value, Value::String("E-result".into()));
    assert_eq!(outcomes[0].rule_info.evaluated.len(), 3, "jump-start to 'e' skips a, b, c, d");
}

#[test]
fn method_cell_dispatches_its_named_entry_point() {
    let mut cube = NCube::new("methods", support::app());
    cube.add_axis("kind", |id| {
        let mut axis = Axis::new(id, "kind", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("ping".into())).unwrap();
        axis
    })
    .unwrap();

    let kind = cube.axis("kind").unwrap();
    let ping = kind.find_column(&Value::String("ping".into())).unwrap();
    cube.set_cell(
        ColumnIdSet::from_ids([ping]),
        CellValue::Method(ExpressionDescriptor::new("doPing").with_entry_point("handlePing")),
    );

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new().set("kind", Value::String("ping".into()));
    assert_eq!(get_cell(&cube, &coordinate, &mut ctx).unwrap(), Value::Boolean(false));
}

#[test]
fn method_cell_without_an_entry_point_is_rejected() {
    let mut cube = NCube::new("methods", support::app());
    cube.add_axis("kind", |id| {
        let mut axis = Axis::new(id, "kind", AxisKind::Discrete, AxisValueType::String, false, ColumnOrder::Display);
        axis.add_column(Value::String("ping".into())).unwrap();
        axis
    })
    .unwrap();

    let kind = cube.axis("kind").unwrap();
    let ping = kind.find_column(&Value::String("ping".into())).unwrap();
    cube.set_cell(ColumnIdSet::from_ids([ping]), CellValue::Method(ExpressionDescriptor::new("doPing")));

    let ctx_bundle = support::test_context();
    let mut ctx = ExecutionContext::new(&ctx_bundle);
    let coordinate = Coordinate::new().set("kind", Value::String("ping".into()));
    let err = get_cell(&cube, &coordinate, &mut ctx).unwrap_err();
    assert!(matches!(err, ncube_engine::NCubeError::InvalidArgument(_)));
}

#[test]
fn duplicate_discrete_column_is_rejected_as_overlap() {
    let mut axis = Axis::new(axis_id(0), "code", AxisKind::Discrete, AxisValueType::Long, false, ColumnOrder::Display);
    axis.add_column(Value::Long(0)).unwrap();
    axis.add_column(Value::Long(10)).unwrap();
    axis.add_column(Value::Long(100)).unwrap();
    let err = axis.add_column(Value::Long(10)).unwrap_err();
    assert!(matches!(err, ncube_model::ModelError::AxisOverlap { .. }));
}

#[test]
fn adding_a_range_to_a_discrete_axis_is_rejected_as_unsupported() {
    let mut axis = Axis::new(axis_id(0), "code", AxisKind::Discrete, AxisValueType::Long, false, ColumnOrder::Display);
    axis.add_column(Value::Long(0)).unwrap();
    let err = axis.add_column(Value::range(Value::Long(3), Value::Long(9))).unwrap_err();
    assert!(matches!(err, ncube_model::ModelError::Unsupported { .. }));
}

#[test]
fn nearest_axis_binds_to_the_closest_point() {
    let mut axis = Axis::new(axis_id(0), "direction", AxisKind::Nearest, AxisValueType::Comparable, false, ColumnOrder::Display);
    for point in [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (-1.0, 0.0, 0.0),
        (0.0, -1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.0, 0.0, -1.0),
    ] {
        axis.add_column(Value::Point3D(point.0, point.1, point.2)).unwrap();
    }
    let nearest = axis.find_column(&Value::Point3D(0.1, -0.2, -63.0)).unwrap();
    let column = axis.columns().iter().find(|c| c.id() == nearest).unwrap();
    assert_eq!(column.value(), &Value::Point3D(0.0, 0.0, -1.0));
}

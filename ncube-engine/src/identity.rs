use ncube_core::Sha1Builder;
pub use ncube_core::Sha1Digest;
use ncube_model::{Axis, Name, NameMap, Value};

use crate::cube::NCube;
use crate::error::NCubeError;

const SEP: &[u8] = &[0x1f];
const REC_SEP: &[u8] = &[0x1e];

fn hash_name_map(builder: &mut Sha1Builder, map: &NameMap) {
    let mut entries: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (k.as_str().to_ascii_lowercase(), v.to_string()))
        .collect();
    entries.sort();
    for (k, v) in entries {
        builder.update(k).update(SEP).update(v).update(REC_SEP);
    }
}

fn hash_axis(builder: &mut Sha1Builder, axis: &Axis) {
    builder
        .update(axis.name().as_str().to_ascii_lowercase())
        .update(SEP)
        .update(axis.kind().to_string())
        .update(SEP)
        .update(axis.value_type().to_string())
        .update(SEP)
        .update(axis.has_default().to_string())
        .update(SEP)
        .update(format!("{:?}", axis.column_order()))
        .update(REC_SEP);
    for column in axis.columns() {
        builder
            .update(column.value().to_string())
            .update(SEP)
            .update(column.display_order().to_string());
        hash_name_map(builder, column.meta_properties());
        builder.update(REC_SEP);
    }
}

/// Computes a cube's content-addressed identity digest (spec §4.7):
/// name, axes (properties + columns, in the cube's own order), cells
/// (keyed by `axis name -> column value` rather than column id, so the
/// digest doesn't change when ids are reassigned by a reload), the
/// default cell, and meta-properties.
pub fn digest(cube: &NCube) -> Sha1Digest {
    let mut builder = Sha1Builder::new();
    builder.update(cube.name().as_str().to_ascii_lowercase()).update(REC_SEP);
    for axis in cube.axes() {
        hash_axis(&mut builder, axis);
    }
    builder.update(REC_SEP);

    let mut cells: Vec<(String, String)> = cube
        .cells_as_coordinates()
        .into_iter()
        .map(|(coordinate, value)| (canonical_coordinate(&coordinate), value.to_string()))
        .collect();
    cells.sort();
    for (coordinate, value) in cells {
        builder.update(coordinate).update(SEP).update(value).update(REC_SEP);
    }

    if let Some(default_cell) = cube.default_cell() {
        builder.update(default_cell.to_string());
    }
    builder.update(REC_SEP);
    hash_name_map(&mut builder, cube.meta_properties());

    builder.finish()
}

fn canonical_coordinate(coordinate: &NameMap) -> String {
    let mut parts: Vec<String> = coordinate
        .iter()
        .map(|(name, value): (&Name, &Value)| format!("{}={}", name.as_str().to_ascii_lowercase(), value))
        .collect();
    parts.sort();
    parts.join(",")
}

/// A structural diff between two cubes with the same name, produced by
/// comparing their axes and cells (spec §4.7).
///
/// Represented as parallel vectors rather than one tagged-union `enum`
/// change list, so additions/removals/updates for axes and cells can each be
/// inspected independently.
#[derive(Clone, Debug, Default)]
pub struct CubeDelta {
    /// Axis names present in the new cube but not the old.
    pub added_axes: Vec<String>,
    /// Axis names present in the old cube but not the new.
    pub removed_axes: Vec<String>,
    /// Axis names present in both, whose properties or columns differ.
    pub changed_axes: Vec<String>,
    /// Coordinates (canonical `axis=value` strings) whose cell is new.
    pub added_cells: Vec<String>,
    /// Coordinates whose cell was removed.
    pub removed_cells: Vec<String>,
    /// Coordinates whose cell content differs between the two cubes.
    pub changed_cells: Vec<String>,
}

impl CubeDelta {
    /// Whether the two cubes compared are identical in every tracked
    /// respect.
    pub fn is_empty(&self) -> bool {
        self.added_axes.is_empty()
            && self.removed_axes.is_empty()
            && self.changed_axes.is_empty()
            && self.added_cells.is_empty()
            && self.removed_cells.is_empty()
            && self.changed_cells.is_empty()
    }
}

/// Computes the delta from `before` to `after` (spec §4.7). Both cubes must
/// share a name; callers compare cubes across revisions of the same logical
/// cube.
pub fn diff(before: &NCube, after: &NCube) -> CubeDelta {
    let mut delta = CubeDelta::default();

    for axis in after.axes() {
        match before.axis(axis.name().as_str()) {
            None => delta.added_axes.push(axis.name().to_string()),
            Some(old) if !old.same_identity(axis) || old.columns().len() != axis.columns().len() => {
                delta.changed_axes.push(axis.name().to_string())
            }
            Some(old) => {
                let differs = old
                    .columns()
                    .iter()
                    .zip(axis.columns())
                    .any(|(a, b)| a.value() != b.value());
                if differs {
                    delta.changed_axes.push(axis.name().to_string());
                }
            }
        }
    }
    for axis in before.axes() {
        if after.axis(axis.name().as_str()).is_none() {
            delta.removed_axes.push(axis.name().to_string());
        }
    }

    let before_cells: std::collections::HashMap<String, String> = before
        .cells_as_coordinates()
        .into_iter()
        .map(|(c, v)| (canonical_coordinate(&c), v.to_string()))
        .collect();
    let after_cells: std::collections::HashMap<String, String> = after
        .cells_as_coordinates()
        .into_iter()
        .map(|(c, v)| (canonical_coordinate(&c), v.to_string()))
        .collect();

    for (coordinate, value) in &after_cells {
        match before_cells.get(coordinate) {
            None => delta.added_cells.push(coordinate.clone()),
            Some(old_value) if old_value != value => delta.changed_cells.push(coordinate.clone()),
            _ => {}
        }
    }
    for coordinate in before_cells.keys() {
        if !after_cells.contains_key(coordinate) {
            delta.removed_cells.push(coordinate.clone());
        }
    }

    delta.added_axes.sort();
    delta.removed_axes.sort();
    delta.changed_axes.sort();
    delta.added_cells.sort();
    delta.removed_cells.sort();
    delta.changed_cells.sort();
    delta
}

/// Merges `theirs`'s cell changes onto `base`, failing with
/// [`NCubeError::IncompatibleMerge`] if the two cubes don't share the same
/// axis set (spec §4.7: dimension/axis-name/column-value mismatches are not
/// mergeable).
pub fn merge(base: &mut NCube, theirs: &NCube) -> Result<(), NCubeError> {
    let base_names: Vec<String> = base.axes().map(|a| a.name().to_string().to_ascii_lowercase()).collect();
    let their_names: Vec<String> = theirs.axes().map(|a| a.name().to_string().to_ascii_lowercase()).collect();
    if base_names != their_names {
        return Err(NCubeError::IncompatibleMerge(format!(
            "axis sets differ: {base_names:?} vs {their_names:?}"
        )));
    }
    for axis in theirs.axes() {
        let Some(base_axis) = base.axis(axis.name().as_str()) else {
            return Err(NCubeError::IncompatibleMerge(format!(
                "axis '{}' missing from base cube",
                axis.name()
            )));
        };
        if base_axis.value_type() != axis.value_type() {
            return Err(NCubeError::IncompatibleMerge(format!(
                "axis '{}' value-type differs between cubes",
                axis.name()
            )));
        }
    }

    for (coordinate, cell_value) in theirs.cells_as_coordinates() {
        let bound = base.bind(&crate::coordinate::Coordinate::from(coordinate))?;
        let key = bound.into_cell_key(base);
        base.set_cell(key, cell_value.clone());
    }
    Ok(())
}

use indexmap::IndexMap;

use ncube_core::{ApplicationId, Sha1Digest};
use ncube_model::{Axis, AxisId, CellMap, CellValue, ColumnIdSet, Name, NameMap};

use crate::binder::{self, BoundCoordinate};
use crate::coordinate::Coordinate;
use crate::error::NCubeError;
use crate::identity;

/// `Name`'s `Borrow<str>` returns its ASCII-lowercase fold (so `Hash` and
/// `Borrow` agree), which means an `IndexMap<Name, _>` must be queried with
/// an already-folded key — this folds a raw lookup string to match.
fn folded(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// An n-dimensional decision table: a name, the application it belongs to,
/// an ordered set of axes, a sparse cell map and cube-level meta-properties
/// (spec §3).
///
/// Axes are stored in an [`IndexMap`] keyed by name so lookup is O(1) while
/// iteration order (insertion order) stays available — the rule engine's
/// nested iteration is defined in terms of "the order axes were added"
/// (spec §4.6).
#[derive(Clone, Debug)]
pub struct NCube {
    name: Name,
    application: ApplicationId,
    axes: IndexMap<Name, Axis>,
    cells: CellMap,
    default_cell: Option<CellValue>,
    meta_properties: NameMap,
    next_axis_id: u16,
}

impl NCube {
    /// Creates a new, axis-less cube.
    pub fn new(name: impl Into<Name>, application: ApplicationId) -> Self {
        Self {
            name: name.into(),
            application,
            axes: IndexMap::new(),
            cells: CellMap::new(),
            default_cell: None,
            meta_properties: NameMap::new(),
            next_axis_id: 0,
        }
    }

    /// The cube's name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The application this cube is deployed under.
    pub fn application(&self) -> &ApplicationId {
        &self.application
    }

    /// The cube's axes, in the order they were added.
    pub fn axes(&self) -> impl Iterator<Item = &Axis> {
        self.axes.values()
    }

    /// Looks up an axis by name.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.get(folded(name).as_str())
    }

    /// Looks up an axis by its unique id.
    pub fn axis_by_id(&self, id: AxisId) -> Option<&Axis> {
        self.axes.values().find(|a| a.id() == id)
    }

    /// Mutable lookup of an axis by name.
    pub fn axis_mut(&mut self, name: &str) -> Option<&mut Axis> {
        self.axes.get_mut(folded(name).as_str())
    }

    /// The cube's meta-properties.
    pub fn meta_properties(&self) -> &NameMap {
        &self.meta_properties
    }

    /// Mutable access to the cube's meta-properties.
    pub fn meta_properties_mut(&mut self) -> &mut NameMap {
        &mut self.meta_properties
    }

    /// Adds a new axis to the cube, allocating its id. Fails if an axis
    /// with the same (case-insensitive) name already exists.
    pub fn add_axis(
        &mut self,
        name: impl Into<Name>,
        build: impl FnOnce(AxisId) -> Axis,
    ) -> Result<AxisId, NCubeError> {
        let name = name.into();
        if self.axes.contains_key(folded(name.as_str()).as_str()) {
            return Err(NCubeError::InvalidArgument(format!(
                "cube '{}' already has an axis named '{name}'",
                self.name
            )));
        }
        let id = AxisId(self.next_axis_id);
        self.next_axis_id += 1;
        let axis = build(id);
        self.axes.insert(name, axis);
        Ok(id)
    }

    /// Removes an axis and every cell bound on it. Returns whether an axis
    /// was removed.
    pub fn delete_axis(&mut self, name: &str) -> bool {
        let Some((_, axis)) = self.axes.shift_remove_entry(folded(name).as_str()) else {
            return false;
        };
        let axis_id = axis.id();
        let stale: Vec<ColumnIdSet> = self
            .cells
            .iter()
            .filter(|(key, _)| key.ids().iter().any(|id| id.axis_id() == axis_id))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.cells.remove(&key);
        }
        true
    }

    /// Renames an axis. Fails if `new_name` already names a different axis
    /// on this cube (spec §4.2).
    pub fn rename_axis(&mut self, old_name: &str, new_name: impl Into<Name>) -> Result<(), NCubeError> {
        let new_name = new_name.into();
        if !self.axes.contains_key(folded(old_name).as_str()) {
            return Err(NCubeError::InvalidArgument(format!("no axis named '{old_name}' on cube '{}'", self.name)));
        }
        if !new_name.as_str().eq_ignore_ascii_case(old_name) && self.axes.contains_key(folded(new_name.as_str()).as_str()) {
            return Err(NCubeError::InvalidArgument(format!(
                "cube '{}' already has an axis named '{new_name}'",
                self.name
            )));
        }
        let (_, mut axis) = self.axes.shift_remove_entry(folded(old_name).as_str()).expect("checked above");
        axis.rename(new_name.clone());
        self.axes.insert(new_name, axis);
        Ok(())
    }

    /// Binds `coordinate` against every non-RULE axis (spec §4.3).
    pub fn bind(&self, coordinate: &Coordinate) -> Result<BoundCoordinate, NCubeError> {
        binder::bind(self, coordinate)
    }

    /// Expands `coordinate` into every bound combination for `getMap()`
    /// (spec §4.3).
    pub fn bind_map(&self, coordinate: &Coordinate) -> Result<Vec<BoundCoordinate>, NCubeError> {
        binder::bind_map(self, coordinate)
    }

    /// Sets the cell at `key` (spec §4.4).
    pub fn set_cell(&mut self, key: ColumnIdSet, value: CellValue) -> Option<CellValue> {
        self.cells.set(key, value)
    }

    /// Removes the cell at `key`.
    pub fn remove_cell(&mut self, key: &ColumnIdSet) -> Option<CellValue> {
        self.cells.remove(key)
    }

    /// Looks up the cell explicitly set at `key`, without falling back to
    /// the cube-level default cell.
    pub fn cell_at(&self, key: &ColumnIdSet) -> Option<&CellValue> {
        self.cells.get(key)
    }

    /// The cube-level default cell, returned when no axis-specific cell
    /// matches and every axis in the coordinate bound to its default
    /// column (spec §4.5).
    pub fn default_cell(&self) -> Option<&CellValue> {
        self.default_cell.as_ref()
    }

    /// Sets the cube-level default cell.
    pub fn set_default_cell(&mut self, value: Option<CellValue>) {
        self.default_cell = value;
    }

    /// Iterates every explicitly set cell as `(axis name -> column value)`
    /// coordinates, translating [`ColumnIdSet`] keys back through the owning
    /// axes (spec §4.4 `cellsAsCoordinates`).
    pub fn cells_as_coordinates(&self) -> Vec<(NameMap, &CellValue)> {
        self.cells
            .iter()
            .map(|(key, value)| (self.translate_key(key), value))
            .collect()
    }

    /// Translates a single cell-map key back into its `(axis name -> column
    /// value)` coordinate, without requiring a cell to be set at that key.
    pub fn cells_as_coordinates_for_key(&self, key: &ColumnIdSet) -> NameMap {
        self.translate_key(key)
    }

    fn translate_key(&self, key: &ColumnIdSet) -> NameMap {
        let mut coordinate = NameMap::new();
        for id in key.ids() {
            if let Some(axis) = self.axis_by_id(id.axis_id()) {
                if let Some(column) = axis.columns().iter().find(|c| c.id() == *id) {
                    coordinate.insert(axis.name().as_str(), column.value().clone());
                }
            }
        }
        coordinate
    }

    /// Computes this cube's content-addressed identity digest (spec §4.7).
    pub fn digest(&self) -> Sha1Digest {
        identity::digest(self)
    }
}

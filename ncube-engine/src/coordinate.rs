use ncube_model::{Name, NameMap, Value};

/// A caller-supplied set of axis-name -> value bindings used to look up a
/// cell (spec §3 "dynamic coordinate maps", §4.3).
///
/// Backed by the same case-insensitive [`NameMap`] used for meta-properties,
/// since coordinate keys are axis names and are matched the same way.
#[derive(Clone, Debug, Default)]
pub struct Coordinate(NameMap);

impl Coordinate {
    /// An empty coordinate (binds nothing explicitly; resolves to each
    /// axis's default column, if every axis on the cube has one).
    pub fn new() -> Self {
        Self(NameMap::new())
    }

    /// Sets the value bound to `axis`.
    pub fn set(mut self, axis: impl Into<Name>, value: Value) -> Self {
        self.0.insert(axis, value);
        self
    }

    /// Looks up the value bound to `axis`, case-insensitively.
    pub fn get(&self, axis: &str) -> Option<&Value> {
        self.0.get(axis)
    }

    /// Whether `axis` has an explicit binding.
    pub fn contains(&self, axis: &str) -> bool {
        self.0.contains_key(axis)
    }

    /// Iterates the coordinate's explicit `(axis name, value)` bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.0.iter()
    }
}

impl From<NameMap> for Coordinate {
    fn from(map: NameMap) -> Self {
        Self(map)
    }
}

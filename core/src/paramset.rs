//! Parameter Sets

use crate::common::*;
use crate::geometry::*;
use std::collections::HashMap;
use std::fmt;

/// Stores a parameter set item consisting of a list of values of type `T`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamSetItem<T> {
    /// The values.
    pub values: Vec<T>,
}

impl<T> ParamSetItem<T> {
    /// Create new `ParamSetItem<T>`.
    ///
    /// * `values` - The values.
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }
}

/// A hashmap of parameter sets stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Stores typed parameters parsed from a scene statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<i64>,
    pub floats: ParamSetMap<Float>,
    pub point3fs: ParamSetMap<Point3f>,
    pub vector3fs: ParamSetMap<Vector3f>,
    pub rgbs: ParamSetMap<Float>,
    pub strings: ParamSetMap<String>,
}

/// Define a macro that can be used to generate a function for adding/replacing
/// parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            self.$paramset
                .insert(String::from(name), ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a single item.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$paramset.get(name) {
                Some(param) if param.values.len() == 1 => param.values[0].clone(),
                _ => default,
            }
        }
    };
}

/// Define a macro that can be used to print parameter set items.
macro_rules! display_param {
    ($params: expr, $param_type: literal, $formatter: expr) => {
        let mut names: Vec<&String> = $params.keys().collect();
        names.sort();
        for name in names {
            write!($formatter, " \"{} {}\" [", $param_type, name)?;
            for (i, v) in $params[name].values.iter().enumerate() {
                if i > 0 {
                    write!($formatter, " ")?;
                }
                write!($formatter, "{}", v)?;
            }
            write!($formatter, "]")?;
        }
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_add!(add_bool, bool, bools);

    paramset_add!(add_int, i64, ints);

    paramset_find_one!(find_one_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_find_one!(find_one_point3f, Point3f, point3fs);
    paramset_add!(add_point3f, Point3f, point3fs);

    paramset_find_one!(find_one_vector3f, Vector3f, vector3fs);
    paramset_add!(add_vector3f, Vector3f, vector3fs);

    paramset_find_one!(find_one_string, String, strings);
    paramset_add!(add_string, String, strings);

    /// Add/replace an RGB color.
    ///
    /// * `name`   - Parameter name.
    /// * `values` - RGB values.
    pub fn add_rgb(&mut self, name: &str, values: &[Float]) {
        self.rgbs
            .insert(String::from(name), ParamSetItem::new(values.to_vec()));
    }

    /// Returns an RGB color or the default if it is missing or does not have
    /// exactly 3 components.
    ///
    /// * `name`    - Parameter name.
    /// * `default` - Default color.
    pub fn find_one_rgb(&self, name: &str, default: [Float; 3]) -> [Float; 3] {
        match self.rgbs.get(name) {
            Some(param) if param.values.len() == 3 => {
                [param.values[0], param.values[1], param.values[2]]
            }
            _ => default,
        }
    }

    /// Returns true if no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.bools.is_empty()
            && self.ints.is_empty()
            && self.floats.is_empty()
            && self.point3fs.is_empty()
            && self.vector3fs.is_empty()
            && self.rgbs.is_empty()
            && self.strings.is_empty()
    }
}

impl fmt::Display for ParamSet {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_param!(self.bools, "bool", f);
        display_param!(self.ints, "integer", f);
        display_param!(self.floats, "float", f);
        display_param!(self.point3fs, "point3", f);
        display_param!(self.vector3fs, "vector3", f);
        display_param!(self.rgbs, "rgb", f);
        display_param!(self.strings, "string", f);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

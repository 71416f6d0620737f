//! Parameter Sets

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

/// A named parameter value list.
#[derive(Clone, Debug)]
pub struct ParamSetItem<T> {
    /// The values.
    pub values: Vec<T>,

    /// Set when a `find_*` call retrieved the item.
    looked_up: Cell<bool>,
}

impl<T> ParamSetItem<T> {
    /// Create a new `ParamSetItem`.
    ///
    /// * `values` - The values.
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            looked_up: Cell::new(false),
        }
    }
}

/// A hashmap of parameter sets stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Typed key/value configuration bag consulted when media, volumes and phase
/// functions are constructed.
#[derive(Clone, Debug, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<Int>,
    pub floats: ParamSetMap<Float>,
    pub vector3fs: ParamSetMap<Vector3f>,
    pub spectra: ParamSetMap<Spectrum>,
    pub strings: ParamSetMap<String>,
}

/// Define a macro that can be used to generate a function for adding/replacing
/// parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            self.$paramset.insert(String::from(name), ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Define a macro that can be used to generate a function for removing
/// parameter set item.
macro_rules! paramset_erase {
    ($func: ident, $paramset: ident) => {
        pub fn $func(&mut self, name: &str) -> bool {
            self.$paramset.remove(name).is_some()
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a single item.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$paramset.get(name) {
                Some(param) if param.values.len() == 1 => {
                    param.looked_up.set(true);
                    param.values[0].clone()
                }
                _ => default,
            }
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a list.
macro_rules! paramset_find {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str) -> Vec<$t> {
            match self.$paramset.get(name) {
                Some(param) => {
                    param.looked_up.set(true);
                    param.values.clone()
                }
                None => vec![],
            }
        }
    };
}

/// Define a macro that copies the items under a name prefix into another set.
macro_rules! paramset_copy_prefixed {
    ($src: expr, $dst: expr, $prefix: expr, $($paramset: ident),+) => {
        $(
            for (name, item) in $src.$paramset.iter() {
                if let Some(stripped) = name.strip_prefix($prefix) {
                    item.looked_up.set(true);
                    $dst.$paramset.insert(stripped.to_string(), ParamSetItem::new(item.values.clone()));
                }
            }
        )+
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_erase!(erase_bool, bools);
    paramset_find_one!(find_one_bool, bool, bools);
    paramset_find!(find_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_erase!(erase_int, ints);
    paramset_find_one!(find_one_int, Int, ints);
    paramset_find!(find_int, Int, ints);
    paramset_add!(add_int, Int, ints);

    paramset_erase!(erase_float, floats);
    paramset_find_one!(find_one_float, Float, floats);
    paramset_find!(find_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_erase!(erase_vector3f, vector3fs);
    paramset_find_one!(find_one_vector3f, Vector3f, vector3fs);
    paramset_find!(find_vector3f, Vector3f, vector3fs);
    paramset_add!(add_vector3f, Vector3f, vector3fs);

    paramset_erase!(erase_string, strings);
    paramset_find_one!(find_one_string, String, strings);
    paramset_find!(find_string, String, strings);
    paramset_add!(add_string, String, strings);

    paramset_erase!(erase_spectrum, spectra);
    paramset_find_one!(find_one_spectrum, Spectrum, spectra);
    paramset_find!(find_spectrum, Spectrum, spectra);
    paramset_add!(add_spectrum, Spectrum, spectra);

    /// Add/replace an RGB spectrum.
    ///
    /// * `name`   - Parameter name.
    /// * `values` - RGB values in a linear slice.
    pub fn add_rgb_spectrum(&mut self, name: &str, values: &[Float]) {
        let n = values.len();
        assert!(n % 3 == 0, "RGB spectrum values % 3 != 0");

        self.spectra.insert(
            String::from(name),
            ParamSetItem::new(
                values
                    .chunks_exact(3)
                    .map(|c| Spectrum::from_rgb(c[0], c[1], c[2]))
                    .collect(),
            ),
        );
    }

    /// Finds a spectrum that may also be given as a single float (a
    /// spectrally uniform value). Spectra take precedence.
    ///
    /// * `name`    - Parameter name.
    /// * `default` - Value when neither is present.
    pub fn find_one_spectrum_or_float(&self, name: &str, default: Spectrum) -> Spectrum {
        if self.spectra.contains_key(name) {
            self.find_one_spectrum(name, default)
        } else if self.floats.contains_key(name) {
            Spectrum::new(self.find_one_float(name, 0.0))
        } else {
            default
        }
    }

    /// Finds a parameter stored as exactly six floats, such as a symmetric
    /// 3x3 matrix `(xx, yy, zz, xy, xz, yz)`.
    ///
    /// * `name` - Parameter name.
    pub fn find_one_floats_6(&self, name: &str) -> Option<[Float; 6]> {
        let values = self.find_float(name);
        if values.len() == 6 {
            Some([values[0], values[1], values[2], values[3], values[4], values[5]])
        } else {
            if !values.is_empty() {
                warn!("Parameter '{}' needs 6 values, got {}", name, values.len());
            }
            None
        }
    }

    /// Returns a new set holding the items whose names start with `prefix`,
    /// with the prefix removed. Used for nested configuration such as the
    /// two components of a blend.
    ///
    /// * `prefix` - Name prefix, e.g. `"phase1."`.
    pub fn prefixed(&self, prefix: &str) -> ParamSet {
        let mut params = ParamSet::new();
        paramset_copy_prefixed!(self, params, prefix, bools, ints, floats, vector3fs, spectra, strings);
        params
    }

    /// Names of items no `find_*` call has retrieved.
    pub fn unused(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        macro_rules! collect_unused {
            ($($paramset: ident),+) => {
                $(
                    names.extend(
                        self.$paramset
                            .iter()
                            .filter(|(_, item)| !item.looked_up.get())
                            .map(|(name, _)| name.clone()),
                    );
                )+
            };
        }
        collect_unused!(bools, ints, floats, vector3fs, spectra, strings);
        names.sort();
        names
    }

    /// Logs a warning for each item that was never retrieved, which usually
    /// means a misspelled parameter name.
    pub fn report_unused(&self) {
        for name in self.unused() {
            warn!("Parameter '{}' not used", name);
        }
    }

    /// Clear all parameter set items.
    pub fn clear(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
        self.vector3fs.clear();
        self.spectra.clear();
        self.strings.clear();
    }
}

/// Define a macro that can be used to print parameter set items.
macro_rules! display_param {
    ($params: expr, $param_type: literal, $formatter: expr) => {
        for (name, param) in $params.iter() {
            write!($formatter, "\"{} {}\" [", $param_type, name)?;
            for (i, v) in param.values.iter().enumerate() {
                if i > 0 {
                    write!($formatter, " ")?;
                }
                write!($formatter, "{}", v)?;
            }
            writeln!($formatter, "]")?;
        }
    };
}

impl fmt::Display for ParamSet {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_param!(self.bools, "bool", f);
        display_param!(self.ints, "integer", f);
        display_param!(self.floats, "float", f);
        display_param!(self.vector3fs, "vector3", f);
        display_param!(self.spectra, "color", f);
        display_param!(self.strings, "string", f);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_with_defaults() {
        let mut ps = ParamSet::new();
        ps.add_float("scale", &[2.0]);
        ps.add_float("pair", &[1.0, 2.0]);
        ps.add_string("sampling_mode", &["mean".to_string()]);
        assert_eq!(ps.find_one_float("scale", 1.0), 2.0);
        assert_eq!(ps.find_one_float("pair", 7.0), 7.0);
        assert_eq!(ps.find_one_float("missing", 3.0), 3.0);
        assert_eq!(ps.find_one_string("sampling_mode", String::new()), "mean");
        assert!(ps.erase_float("scale"));
        assert!(!ps.erase_float("scale"));
    }

    #[test]
    fn spectrum_or_float() {
        let mut ps = ParamSet::new();
        ps.add_float("sigma_t", &[2.0]);
        assert_eq!(ps.find_one_spectrum_or_float("sigma_t", Spectrum::ONE), Spectrum::new(2.0));
        ps.add_rgb_spectrum("sigma_t", &[1.0, 2.0, 3.0]);
        assert_eq!(
            ps.find_one_spectrum_or_float("sigma_t", Spectrum::ONE),
            Spectrum::from_rgb(1.0, 2.0, 3.0)
        );
        assert_eq!(ps.find_one_spectrum_or_float("albedo", Spectrum::ONE), Spectrum::ONE);
    }

    #[test]
    fn six_floats() {
        let mut ps = ParamSet::new();
        ps.add_float("S", &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        ps.add_float("bad", &[1.0, 2.0]);
        assert_eq!(ps.find_one_floats_6("S"), Some([1.0, 1.0, 1.0, 0.0, 0.0, 0.0]));
        assert_eq!(ps.find_one_floats_6("bad"), None);
    }

    #[test]
    fn prefixed_and_unused() {
        let mut ps = ParamSet::new();
        ps.add_string("phase1.type", &["hg".to_string()]);
        ps.add_float("phase1.g", &[0.5]);
        ps.add_float("weight", &[0.25]);
        ps.add_float("typo", &[1.0]);

        let nested = ps.prefixed("phase1.");
        assert_eq!(nested.find_one_float("g", 0.0), 0.5);
        assert_eq!(nested.find_one_string("type", String::new()), "hg");
        assert_eq!(ps.find_one_float("weight", 0.5), 0.25);
        assert_eq!(ps.unused(), vec!["typo".to_string()]);
    }
}

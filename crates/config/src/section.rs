//! The contract every typed config section implements

use serde::de::DeserializeOwned;
use toml::Table;

/// A named table of the config file with compiled-in defaults
///
/// Sections are decoded from the raw document and then overlaid onto their
/// defaults. `overlay` must only copy fields whose keys are present in the
/// source table: a decoded `false` or `0` is indistinguishable from "absent"
/// once deserialized, so presence is the only safe signal.
pub trait ConfigSection: Default + DeserializeOwned {
    /// Table name in the config file
    const NAME: &'static str;

    /// Copies the fields of `decoded` whose keys appear in `present` into `self`
    fn overlay(&mut self, decoded: Self, present: &Table);
}

/// Expands to one presence-guarded assignment per listed field
macro_rules! overlay_present {
    ($target:ident, $decoded:ident, $present:ident; $($field:ident),+ $(,)?) => {
        $(
            if $present.contains_key(stringify!($field)) {
                $target.$field = $decoded.$field;
            }
        )+
    };
}

pub(crate) use overlay_present;

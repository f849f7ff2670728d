mod closure;
pub use closure::epsilon_closure;

mod subset;
pub(crate) use subset::successor_set;
pub use subset::SubsetConstruction;

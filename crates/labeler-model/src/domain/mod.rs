mod label;
pub use label::RegionLabel;

mod region;
pub use region::{KeyRangeRegion, Region};

mod constants;
pub use constants::RULE_TYPE_KEY_RANGE;

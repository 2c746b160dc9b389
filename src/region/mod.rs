mod attrs;
mod convert;
mod exposure;
mod table;

pub use attrs::{columns, AttributeRow, AttributeTable};
pub(crate) use attrs::parse_numeric;
pub use convert::convert_attributes;
pub use exposure::{classify_exposure, Exposure, ExposureAreas, ExposureCriteria};
pub use table::{Region, RegionShape, RegionTable};

//! Fill colours for map layers. Outcome colours live on `Outcome` itself.

/// Region basemap fill.
pub(crate) const BASEMAP: &str = "#d3d3d3";

/// High-exposure overlay ("mostly self-polluted").
pub(crate) const HIGH_EXPOSURE: &str = "#0000ff";

/// Low-exposure overlay ("mostly affected by others").
pub(crate) const LOW_EXPOSURE: &str = "#800080";

/// Effect chart bars.
pub(crate) const BAR: &str = "#87ceeb";

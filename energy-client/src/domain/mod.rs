pub mod reading;
pub mod resolution;
pub mod window;

pub use reading::Reading;
pub use resolution::{weekday_label, RecurringPattern, Resolution, WEEKDAY_NAMES};
pub use window::{Lookback, Window};

pub mod db;
pub mod domain;

pub use db::{Store, StoreError};
pub use domain::{Lookback, Reading, RecurringPattern, Resolution, Window};

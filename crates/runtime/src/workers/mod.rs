//! Worker tasks that back the scheduler lanes.

mod lane;

pub use lane::LaneHandle;

mod tracking_id;

pub use tracking_id::new_tracking_id;

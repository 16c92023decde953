use rand::Rng;

use crate::db_types::TrackingId;

const TRACKING_CODE_LEN: usize = 10;
const TRACKING_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a fresh human-facing order reference: `TRACK-` followed by ten random uppercase alphanumerics.
///
/// With 36^10 possible codes, collisions are not a practical concern; the database still carries a unique index on
/// the column as a backstop.
pub fn new_tracking_id() -> TrackingId {
    let mut rng = rand::thread_rng();
    let code: String =
        (0..TRACKING_CODE_LEN).map(|_| TRACKING_CHARSET[rng.gen_range(0..TRACKING_CHARSET.len())] as char).collect();
    TrackingId(format!("TRACK-{code}"))
}

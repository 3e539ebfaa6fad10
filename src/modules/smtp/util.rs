use rand::Rng;

use crate::utc_now;

/// Message-ID body without angle brackets; the MIME builder adds them.
pub fn generate_message_id() -> String {
    // Generate 16 random bytes
    let random_bytes: [u8; 16] = rand::rng().random();
    let random_id = hex::encode(random_bytes);
    let timestamp_millis = utc_now!();
    format!("{}.{}@contact-relay", timestamp_millis, random_id)
}

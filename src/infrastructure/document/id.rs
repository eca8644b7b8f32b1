//! Document id generation

use rand::distributions::Alphanumeric;
use rand::Rng;

const DOCUMENT_ID_LENGTH: usize = 20;

/// Generate a random 20-character alphanumeric document id
pub fn generate_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LENGTH)
        .map(char::from)
        .collect()
}

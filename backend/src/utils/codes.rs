use rand::Rng;

/// Allowed characters for campaign codes - letters only, without I and O
pub const CAMPAIGN_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
/// Length of generated campaign codes
pub const CAMPAIGN_CODE_LENGTH: usize = 4;
/// Allowed characters for board codes - excludes I, O, 0, 1 for readability
pub const BOARD_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of generated board codes
pub const BOARD_CODE_LENGTH: usize = 8;
/// Attempts before giving up on finding an unused code
pub const MAX_CODE_ATTEMPTS: usize = 16;

fn generate_code(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset[idx] as char
        })
        .collect()
}

/// Generate a short campaign code players type to join (e.g. "KQVB")
pub fn generate_campaign_code() -> String {
    generate_code(CAMPAIGN_CODE_CHARSET, CAMPAIGN_CODE_LENGTH)
}

/// Generate a board code. Never collides with a campaign code since the
/// lengths differ.
pub fn generate_board_code() -> String {
    generate_code(BOARD_CODE_CHARSET, BOARD_CODE_LENGTH)
}

/// Codes are shown upper-case; accept what users type in any case
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

use rand::Rng;

/// Generate a 6-digit one-time passcode, uniform over [100000, 999999].
///
/// Codes carry no uniqueness constraint across users or time; sending a new
/// code simply overwrites (and thereby invalidates) the previous one for
/// that channel.
#[must_use]
pub fn generate() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

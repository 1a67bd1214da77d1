//! Input patterns shared by the configuration forms.

use anyhow::{Context, Result, bail, ensure};
use semver::Version;
use std::net::Ipv4Addr;

/// Every symbol a hostname may not contain; whitespace is rejected as well.
pub const SYMBOL_ALL: &str = "-+!$%^&*()_|~=`{}[]:@#\";'<>?,./";
/// Symbols that break the device's configuration storage.
pub const SYMBOL_CRITICAL: &str = "$*|~=[]:;#\"'<>?,./";
/// [`SYMBOL_CRITICAL`] without the point.
pub const SYMBOL_CRITICAL_WITH_POINTS: &str = "$*|~=[]:;#\"'<>?,/";

/// Special characters of which a strong password needs at least one.
pub const PASSWORD_SYMBOLS: &str = "#$^+=!*()@%&";
pub const MIN_LENGTH_PASSWORD: usize = 8;
pub const MAX_LENGTH_PASSWORD: usize = 64;

const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Length as the browser counts it (UTF-16 code units).
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn contains_any_symbol(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_whitespace() || SYMBOL_ALL.contains(c))
}

pub fn contains_critical_symbol(text: &str) -> bool {
    text.chars().any(|c| SYMBOL_CRITICAL.contains(c))
}

pub fn contains_critical_symbol_except_points(text: &str) -> bool {
    text.chars().any(|c| SYMBOL_CRITICAL_WITH_POINTS.contains(c))
}

/// True for a non-empty text without any ASCII letter.
pub fn has_no_letters(text: &str) -> bool {
    !text.is_empty() && !text.chars().any(|c| c.is_ascii_alphabetic())
}

/// True for a non-empty text without any digit.
pub fn has_no_digits(text: &str) -> bool {
    !text.is_empty() && !text.chars().any(|c| c.is_ascii_digit())
}

/// Dotted-quad IPv4 address without leading zeros.
pub fn is_ip_address(text: &str) -> bool {
    text.parse::<Ipv4Addr>().is_ok()
}

/// `dd-mm-yyyy`; only the shape is checked.
pub fn is_date(text: &str) -> bool {
    matches_digit_groups(text, '-', &[2, 2, 4])
}

/// `hh:mm`; only the shape is checked.
pub fn is_time(text: &str) -> bool {
    matches_digit_groups(text, ':', &[2, 2])
}

fn matches_digit_groups(text: &str, separator: char, lengths: &[usize]) -> bool {
    let groups: Vec<&str> = text.split(separator).collect();

    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, len)| group.len() == *len && group.chars().all(|c| c.is_ascii_digit()))
}

/// Parse a firmware version of the form `v<major>_<minor>_<patch>`.
pub fn parse_firmware_version(text: &str) -> Result<Version> {
    let Some(numbers) = text.strip_prefix('v') else {
        bail!("failed to parse firmware version {text:?}: missing 'v' prefix");
    };

    let parts: Vec<&str> = numbers.split('_').collect();
    ensure!(
        parts.len() == 3,
        "failed to parse firmware version {text:?}: expected three parts"
    );

    let mut numbers = [0u64; 3];
    for (number, part) in numbers.iter_mut().zip(&parts) {
        ensure!(
            !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()),
            "failed to parse firmware version {text:?}: invalid number {part:?}"
        );
        *number = part
            .parse()
            .context(format!("failed to parse firmware version {text:?}"))?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Format a version the way the firmware names its builds.
pub fn format_firmware_version(version: &Version) -> String {
    format!("v{}_{}_{}", version.major, version.minor, version.patch)
}

/// NIST-style password: lower and upper case letter, digit, one of
/// [`PASSWORD_SYMBOLS`], 8 to 64 UTF-16 units and no line terminator.
pub fn is_strong_password(password: &str) -> bool {
    (MIN_LENGTH_PASSWORD..=MAX_LENGTH_PASSWORD).contains(&text_length(password))
        && !password.contains(LINE_TERMINATORS)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

//! Shared formatting utilities for size display and console output

use console::Emoji;

/// Test tube emoji for a measurement run
pub const TEST_TUBE: Emoji = Emoji("🧪", ">");

/// Hammer emoji for build operations
pub const HAMMER: Emoji = Emoji("🔨", ">");

/// Checkmark emoji for success
pub const CHECKMARK: Emoji = Emoji("✅", "[OK]");

/// Crossmark emoji for failure
pub const CROSSMARK: Emoji = Emoji("❌", "[FAIL]");

/// Info emoji for informational messages
pub const INFO: Emoji = Emoji("ℹ️", "i");

/// Chart emoji for metrics/statistics
pub const CHART: Emoji = Emoji("📊", "~");

/// Warning emoji for caution/alerts
pub const WARNING: Emoji = Emoji("⚠️", "!");

/// Format an integer with `,` thousands separators
///
/// # Examples
///
/// ```
/// use output_size::fmt::format_thousands;
///
/// assert_eq!(format_thousands(999), "999");
/// assert_eq!(format_thousands(1_000), "1,000");
/// assert_eq!(format_thousands(1_234_567), "1,234,567");
/// ```
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a byte count as `1,234 bytes`
pub fn format_byte_count(bytes: u64) -> String {
    format!("{} bytes", format_thousands(bytes))
}

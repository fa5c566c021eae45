//! Terminal output utilities
//!
//! Status lines plus the KRW and area formats shown throughout the app.

use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Short Korean amount label: 천만원, 백만원, 만원, otherwise 원.
///
/// The leading figure is rounded, so 15,000,000 shows as `2천만원`.
pub fn format_amount(amount: u64) -> String {
    const UNITS: [(u64, &str); 3] =
        [(10_000_000, "천만원"), (1_000_000, "백만원"), (10_000, "만원")];

    for (unit, label) in UNITS {
        if amount >= unit {
            return format!("{}{}", (amount + unit / 2) / unit, label);
        }
    }
    format!("{}원", format_number(amount))
}

/// Thousands separators: `1234567` → `1,234,567`.
pub fn format_number(value: u64) -> String {
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

/// Area in km², without decimals for whole values.
pub fn format_area(km2: f64) -> String {
    if km2.fract() == 0.0 {
        format!("{:.0} km²", km2)
    } else {
        format!("{:.2} km²", km2)
    }
}

/// Fixed-width bar for a 0..=100 percentage.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Percentage colored by progress: green when done, yellow from half way.
pub fn format_progress(percent: u8) -> String {
    let label = format!("{:>3}%", percent);
    if percent >= 100 {
        label.green().to_string()
    } else if percent >= 50 {
        label.yellow().to_string()
    } else {
        label.red().to_string()
    }
}

//! CLI output helpers: styling and formatting.
//!
//! Mirrors the terminal conventions used across the rest of the tooling:
//! consistent status glyphs, a header style, and human-readable sizes.

/// Output format for the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Table,
    /// Machine-readable JSON summary
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {s}. Use: table, json")),
        }
    }
}

/// Consistent terminal styling (Andon - visual problem indication).
pub mod styles {
    use colored::Colorize;

    /// Section header.
    pub fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Successful step.
    pub fn success(text: &str) -> String {
        format!("{} {}", "✓".green().bold(), text)
    }

    /// Hard failure.
    pub fn error(text: &str) -> String {
        format!("{} {}", "✗".red().bold(), text)
    }

    /// Non-fatal problem.
    pub fn warn(text: &str) -> String {
        format!("{} {}", "⚠".yellow().bold(), text)
    }

    /// Informational note.
    pub fn info(text: &str) -> String {
        format!("{} {}", "ℹ".blue(), text)
    }
}

/// Format a byte count as a human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GIB {
        format!("{:.2} GB", b / GIB)
    } else if b >= MIB {
        format!("{:.2} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

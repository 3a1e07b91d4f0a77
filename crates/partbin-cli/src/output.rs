//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use partbin_core::Component;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single component
    pub fn print_component(&self, component: &Component) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", component.id);
                println!("Name:        {}", component.name);
                println!("Part number: {}", component.part_number);
                if !component.category.is_empty() {
                    println!("Category:    {}", component.category);
                }
                if !component.package.is_empty() {
                    println!("Package:     {}", component.package);
                }
                if !component.location.is_empty() {
                    println!("Location:    {}", component.location);
                }
                if !component.parameters.is_empty() {
                    println!("Parameters:  {}", component.parameters);
                }
                let low = if component.is_low_stock() {
                    "  (low stock)"
                } else {
                    ""
                };
                println!("Stock:       {}{}", component.stock, low);
                if let Some(ref datasheet) = component.datasheet {
                    println!("Datasheet:   {}", datasheet);
                }
            }
            OutputFormat::Json => print_json(component),
            OutputFormat::Quiet => {
                println!("{}", component.id);
            }
        }
    }

    /// Print a list of components
    pub fn print_components(&self, components: &[&Component]) {
        match self.format {
            OutputFormat::Human => {
                if components.is_empty() {
                    println!("No components found.");
                    return;
                }
                for component in components {
                    let marker = if component.is_low_stock() { "!" } else { " " };
                    println!(
                        "{} | {} | {} | {:>5}{} | {}",
                        short_id(component),
                        pad(&truncate(&component.name, 24), 24),
                        pad(&truncate(&component.part_number, 12), 12),
                        component.stock,
                        marker,
                        truncate(&component.category, 30)
                    );
                }
                println!("\n{} component(s)", components.len());
            }
            OutputFormat::Json => print_json(&components),
            OutputFormat::Quiet => {
                for component in components {
                    println!("{}", component.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// First eight characters of the id
pub fn short_id(component: &Component) -> String {
    component.id.to_string()[..8].to_string()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Right-pad to `width` characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("线性稳压器(LDO)", 20), "线性稳压器(LDO)");
        assert_eq!(truncate("功率电感器件型号", 6), "功率电...");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("功率电感", 6), "功率电感  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_short_id() {
        let component = Component::new("NE555", "C7593");
        assert_eq!(short_id(&component).len(), 8);
        assert!(component.id.to_string().starts_with(&short_id(&component)));
    }
}

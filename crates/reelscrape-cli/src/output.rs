use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// One-line message for a failed command, causes joined outermost first
pub fn error_message(err: &color_eyre::Report) -> String {
    err.chain().map(|cause| cause.to_string()).collect::<Vec<_>>().join(": ")
}

fn event(kind: &str, msg: &str) -> serde_json::Value {
    json!({ "type": kind, "message": msg })
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Progress bars only make sense for a person watching a terminal
    pub fn show_progress(&self) -> bool {
        self.is_human() && !self.quiet && std::io::IsTerminal::is_terminal(&std::io::stderr())
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.print_json(&event("success", msg.as_ref())),
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.print_json(&event("error", msg.as_ref())),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.print_json(&event("info", msg.as_ref())),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.print_json(&event("warning", msg.as_ref())),
        }
    }

    /// Machine-readable result; skipped in human mode, where the caller
    /// prints its own summary.
    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet || self.is_human() {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn test_error_event_shape() {
        let value = event("error", "No config file");
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "No config file");
    }

    #[test]
    fn test_error_message_includes_causes() {
        let err = eyre!("Selector 'date' is not valid CSS").wrap_err("Invalid configuration");
        let message = error_message(&err);
        assert_eq!(message, "Invalid configuration: Selector 'date' is not valid CSS");
    }
}

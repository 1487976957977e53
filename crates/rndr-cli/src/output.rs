//! Output formatting utilities for the CLI

use owo_colors::OwoColorize;

const RULE_WIDTH: usize = 78;

/// Context for output formatting
#[derive(Debug, Clone)]
pub struct OutputContext {
    pub no_color: bool,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(no_color: bool, quiet: bool) -> Self {
        // Disable colors if NO_COLOR is set or --no-color flag is used
        let no_color = no_color || std::env::var("NO_COLOR").is_ok();

        Self { no_color, quiet }
    }

    fn line(&self, glyph: &str, paint: fn(&str) -> String, msg: &str) {
        if self.quiet {
            return;
        }

        if self.no_color {
            println!("{} {}", glyph, msg);
        } else {
            println!("{} {}", paint(glyph), msg);
        }
    }

    /// Print the banner shown at startup
    pub fn header(&self) {
        if self.quiet {
            return;
        }

        let title = format!("rndr {}", env!("CARGO_PKG_VERSION"));
        let subtitle = "Auto device detection & React Native/Expo runner";
        let inner = RULE_WIDTH - 2;

        let lines = [
            format!("┌{}┐", "─".repeat(inner)),
            format!("│{:^inner$}│", title),
            format!("│{:^inner$}│", subtitle),
            format!("└{}┘", "─".repeat(inner)),
        ];

        for line in lines {
            if self.no_color {
                println!("{}", line);
            } else {
                println!("{}", line.cyan());
            }
        }
        println!();
    }

    /// Print a step that is about to happen
    pub fn step(&self, msg: &str) {
        self.line("→", |g| g.blue().to_string(), msg);
    }

    /// Print a success message
    pub fn success(&self, msg: &str) {
        self.line("✓", |g| g.green().to_string(), msg);
    }

    /// Print an informational message
    pub fn info(&self, msg: &str) {
        self.line("i", |g| g.magenta().to_string(), msg);
    }

    /// Print a device detail line
    pub fn device(&self, msg: &str) {
        self.line("•", |g| g.cyan().to_string(), msg);
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        if self.quiet {
            return;
        }

        if self.no_color {
            eprintln!("! {}", msg);
        } else {
            eprintln!("{} {}", "!".yellow(), msg);
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        if self.no_color {
            eprintln!("✗ {}", msg);
        } else {
            eprintln!("{} {}", "✗".red(), msg);
        }
    }

    /// Print a horizontal rule
    pub fn separator(&self) {
        if self.quiet {
            return;
        }

        let rule = "─".repeat(RULE_WIDTH);
        if self.no_color {
            println!("{}", rule);
        } else {
            println!("{}", rule.cyan());
        }
    }
}

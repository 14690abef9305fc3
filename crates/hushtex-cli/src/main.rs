use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use hushtex_log::LogParser;

mod format;
mod frontend;
mod latexmkrc;
mod runner;

use format::OutputMode;
use frontend::TerminalFrontend;

/// Filter and colourise the output of a TeX compiler.
#[derive(Parser)]
#[command(name = "hushtex", version, about = "Filter and colourise TeX compiler output")]
struct Cli {
    /// Hide file I/O and page bookkeeping messages entirely (default)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Dim I/O messages instead of hiding them, and show hushtex's own
    /// messages
    #[arg(short, long)]
    verbose: bool,

    /// Ring the terminal bell when the compiler reports an error (default)
    #[arg(short, long, conflicts_with = "no_bell")]
    bell: bool,

    /// Don't ring the bell on errors
    #[arg(long)]
    no_bell: bool,

    /// Print latexmk settings that route $pdflatex through hushtex; include
    /// `eval hushtex --latexmkrc` in a latexmkrc to use
    #[arg(long)]
    latexmkrc: bool,

    /// With --latexmkrc, wrap $pdflatex even if it is non-default
    #[arg(short, long, requires = "latexmkrc")]
    force: bool,

    /// Tokenize an existing log file and dump the tokens as JSON
    #[arg(long, value_name = "FILE", conflicts_with = "latexmkrc")]
    parse_log: Option<PathBuf>,

    /// The compiler command to run, e.g. `pdflatex thesis.tex`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    fn mode(&self) -> OutputMode {
        // Quiet is the default; --quiet only exists to be explicit.
        if self.verbose && !self.quiet {
            OutputMode::Verbose
        } else {
            OutputMode::Quiet
        }
    }

    fn bell(&self) -> bool {
        // The bell is on by default; --bell only exists to be explicit.
        self.bell || !self.no_bell
    }

    /// The hushtex invocation to embed in a latexmkrc, carrying over the
    /// display options.
    fn latexmkrc_command(&self) -> String {
        let mut command = String::from("hushtex");
        if self.verbose {
            command.push_str(" --verbose");
        }
        if self.no_bell {
            command.push_str(" --no-bell");
        }
        command
    }
}

fn dump_tokens(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let mut parser = LogParser::new();
    let mut tokens = parser.update(&content);
    tokens.extend(parser.finish());
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.latexmkrc {
        print!("{}", latexmkrc::render_latexmkrc(&cli.latexmkrc_command(), cli.force));
        return Ok(());
    }
    if let Some(path) = &cli.parse_log {
        return dump_tokens(path);
    }
    if cli.command.is_empty() {
        anyhow::bail!("no command given; try `hushtex pdflatex document.tex`");
    }

    let mut frontend = TerminalFrontend::new(cli.mode(), cli.bell());
    frontend.log_message("hushtex enabled")?;
    let status = runner::run_command(&cli.command, &mut frontend)?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

//! Command line argument parsing

use crate::models::{PackageOptions, PythonFlag};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "nuitka-forge")]
#[command(about = "🐍 Nuitka packaging front end - build the command, run it, watch the log")]
pub struct Cli {
    /// Options file to load (defaults to ./nuitka-forge.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Application config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run in CLI mode without TUI - for automation and scripting
    #[arg(long, help = "Run in CLI mode without interactive TUI")]
    pub cli: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Emit log records as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub overrides: OptionOverrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Packaging options given on the command line; layered over the options file
#[derive(Args, Clone, Debug, Default)]
pub struct OptionOverrides {
    /// Python interpreter (or Nuitka launcher script)
    #[arg(long, global = true, value_name = "PATH")]
    pub python: Option<String>,

    /// Main Python file to package
    #[arg(long = "main", global = true, value_name = "FILE")]
    pub main_file: Option<String>,

    /// Output directory
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Windows icon (.ico)
    #[arg(long, global = true, value_name = "FILE")]
    pub icon: Option<String>,

    /// Build a single executable file
    #[arg(long, global = true)]
    pub onefile: bool,

    /// Standalone mode with all dependencies
    #[arg(long, global = true)]
    pub standalone: bool,

    /// Hide the console window on Windows
    #[arg(long, global = true)]
    pub disable_console: bool,

    /// Clean up build files after packaging
    #[arg(long, global = true)]
    pub remove_output: bool,

    /// Show packaging progress
    #[arg(long, global = true)]
    pub show_progress: bool,

    /// Enable a Nuitka plugin (repeatable, order is kept)
    #[arg(long = "plugin", global = true, value_name = "NAME")]
    pub plugins: Vec<String>,

    /// Add a runtime python flag (repeatable, order is kept)
    #[arg(long = "python-flag", global = true, value_enum)]
    pub python_flags: Vec<PythonFlag>,

    /// Comma-separated packages to include
    #[arg(long, global = true, value_name = "LIST")]
    pub include_package: Option<String>,

    /// Comma-separated `source=destination` data directories
    #[arg(long, global = true, value_name = "LIST")]
    pub include_data_dir: Option<String>,
}

impl OptionOverrides {
    /// Writes every given override into `options`
    pub fn apply(&self, options: &mut PackageOptions) {
        if let Some(python) = &self.python {
            options.python = python.clone();
        }
        if let Some(main_file) = &self.main_file {
            options.main_file = main_file.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            options.output_dir = output_dir.clone();
        }
        if let Some(icon) = &self.icon {
            options.icon = icon.clone();
        }

        options.common.onefile |= self.onefile;
        options.common.standalone |= self.standalone;
        options.common.windows_disable_console |= self.disable_console;
        options.common.remove_output |= self.remove_output;
        options.common.show_progress |= self.show_progress;

        for plugin in &self.plugins {
            options.select_plugin(plugin);
        }
        for flag in &self.python_flags {
            options.add_python_flag(*flag);
        }

        if let Some(packages) = &self.include_package {
            options.include.packages = packages.clone();
        }
        if let Some(data_dirs) = &self.include_data_dir {
            options.include.data_dirs = data_dirs.clone();
        }
    }
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Print the Nuitka command for the current options
    Preview {
        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Run Nuitka and stream its output (Ctrl-C stops it)
    Run,
    /// Check whether Nuitka is installed for the selected interpreter
    Check,
    /// Write an options file with the current settings
    Init {
        /// Destination file (defaults to ./nuitka-forge.toml)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

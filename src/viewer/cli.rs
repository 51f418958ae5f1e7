//! Command-line interface for rt-scene-viewer.

use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Write the built-in mock scene preset to a file.
    Save { filename: String },
    /// Show a scene preset loaded from a file.
    Load { filename: String },
    /// Show the built-in mock scene.
    Run,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CLI {
    pub command: CliCommand,
    /// `--config <viewer.json>`
    pub config: Option<String>,
    /// Arguments that were ignored, already reported through `log::warn!`.
    pub warnings: Vec<String>,
}

fn warn(warnings: &mut Vec<String>, message: String) {
    log::warn!("[CLI] {}", message);
    warnings.push(message);
}

impl CLI {
    /// Parse command-line arguments.
    ///
    /// Supported commands:
    /// - `./rt-scene-viewer save <filename>` - Save the mock scene preset
    /// - `./rt-scene-viewer load <filename>` - Load a scene preset from file
    /// - `./rt-scene-viewer` (no args) - Run with the mock scene
    ///
    /// Any of them accepts `--config <viewer.json>`.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = None;
        let mut warnings = Vec::new();
        let mut positional = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                match args.next() {
                    Some(path) => config = Some(path),
                    None => warn(&mut warnings, "--config needs a file name. Ignoring.".to_string()),
                }
            } else {
                positional.push(arg);
            }
        }

        let command = match positional.as_slice() {
            [cmd, filename, ..] => match cmd.as_str() {
                "save" => CliCommand::Save {
                    filename: filename.clone(),
                },
                "load" => CliCommand::Load {
                    filename: filename.clone(),
                },
                _ => {
                    warn(&mut warnings, format!("Unknown command: {cmd}. Running normally."));
                    CliCommand::Run
                }
            },
            _ => CliCommand::Run,
        };

        CLI {
            command,
            config,
            warnings,
        }
    }
}

//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands are split by what they need: local commands run on their
//! arguments alone, configured commands need resolved [`Settings`] (rule
//! file, catalog, playlist directory).

use crate::cli::{Cli, Commands, ConfigCommands, RulesCommands, Shell};
use crate::commands::config::Settings;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that need no resolved settings.
pub trait LocalCommand {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that read rules, the catalog or the playlist directory.
#[allow(async_fn_in_trait)]
pub trait ConfiguredCommand {
    /// Execute the command with resolved settings.
    async fn execute(&self, ctx: &CommandContext, settings: &Settings) -> Result<()>;
}

/// Commands that need no resolved settings.
pub enum LocalDispatch<'a> {
    Parse { expression: &'a str, tree: bool },
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> LocalDispatch<'a> {
    /// Try to create a local dispatch from the CLI command.
    /// Returns None if the command needs settings.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Parse { expression, tree }) => Some(Self::Parse {
                expression,
                tree: *tree,
            }),
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl LocalCommand for LocalDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Parse { expression, tree } => {
                let opts = commands::parse::ParseOptions {
                    expression: expression.to_string(),
                    tree: *tree,
                };
                commands::parse::execute(ctx, &opts)
            }
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("smartlist - rule-driven dynamic playlists");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Init { force }) => commands::config::execute_init(ctx, *force),
    }
}

/// Commands that need resolved settings.
pub enum ConfiguredDispatch<'a> {
    Preview {
        expressions: &'a [String],
        user: &'a Option<String>,
    },
    RulesList,
    RulesShow {
        name: &'a str,
    },
    RulesAdd {
        name: &'a str,
        expressions: &'a [String],
        user: &'a Option<String>,
        disabled: bool,
    },
    RulesRemove {
        name: &'a str,
        force: bool,
    },
    RulesRun {
        name: Option<&'a str>,
    },
}

impl<'a> ConfiguredDispatch<'a> {
    /// Create a configured dispatch from the CLI command.
    /// Returns None if the command is local.
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Preview { expressions, user }) => {
                Some(Self::Preview { expressions, user })
            }
            Some(Commands::Rules { command }) => Some(match command {
                Some(RulesCommands::List) | None => Self::RulesList,
                Some(RulesCommands::Show { name }) => Self::RulesShow { name },
                Some(RulesCommands::Add {
                    name,
                    expressions,
                    user,
                    disabled,
                }) => Self::RulesAdd {
                    name,
                    expressions,
                    user,
                    disabled: *disabled,
                },
                Some(RulesCommands::Remove { name, force }) => Self::RulesRemove {
                    name,
                    force: *force,
                },
                Some(RulesCommands::Run { name }) => Self::RulesRun {
                    name: name.as_deref(),
                },
            }),
            _ => None,
        }
    }
}

impl ConfiguredCommand for ConfiguredDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext, settings: &Settings) -> Result<()> {
        match self {
            Self::Preview { expressions, user } => {
                let opts = commands::preview::PreviewOptions {
                    expressions: expressions.to_vec(),
                    user: (*user).clone(),
                };
                commands::preview::execute(ctx, settings, &opts).await
            }
            Self::RulesList => commands::rules::execute_list(ctx, &settings.rule_store()),
            Self::RulesShow { name } => {
                commands::rules::execute_show(ctx, &settings.rule_store(), name)
            }
            Self::RulesAdd {
                name,
                expressions,
                user,
                disabled,
            } => {
                let opts = commands::rules::RulesAddOptions {
                    name: name.to_string(),
                    expressions: expressions.to_vec(),
                    user: (*user).clone(),
                    disabled: *disabled,
                };
                commands::rules::execute_add(ctx, &settings.rule_store(), &opts)
            }
            Self::RulesRemove { name, force } => {
                commands::rules::execute_remove(ctx, &settings.rule_store(), name, *force)
            }
            Self::RulesRun { name } => commands::rules::execute_run(ctx, settings, *name).await,
        }
    }
}

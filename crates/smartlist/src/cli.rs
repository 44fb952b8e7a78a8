//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the smartlist CLI.

use clap::{Parser, Subcommand, ValueEnum};

/// smartlist - Rule-driven dynamic playlists
#[derive(Parser, Debug)]
#[command(name = "smartlist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Catalog file (default: from config)
    #[arg(long, global = true, env = "SMARTLIST_CATALOG")]
    pub catalog: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse an expression and print its filter tree
    #[command(alias = "p")]
    Parse {
        /// Rule expression, e.g. "{genre:Action | rating | 20}"
        expression: String,

        /// Print the tree as an indented outline instead of rule text
        #[arg(long)]
        tree: bool,
    },

    /// Run expressions against the catalog without creating a playlist
    Preview {
        /// One or more rule expressions
        #[arg(required = true)]
        expressions: Vec<String>,

        /// Evaluate watch state for this user
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Manage saved rules
    #[command(alias = "r")]
    Rules {
        #[command(subcommand)]
        command: Option<RulesCommands>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Rules subcommands
#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List saved rules
    #[command(alias = "ls")]
    List,

    /// Show a rule and how each of its expressions parses
    Show {
        /// Rule name
        name: String,
    },

    /// Add a rule, replacing any rule with the same name
    Add {
        /// Rule name
        name: String,

        /// One or more rule expressions
        #[arg(required = true)]
        expressions: Vec<String>,

        /// Owner whose watch state the rule uses
        #[arg(short, long)]
        user: Option<String>,

        /// Save the rule disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove a rule
    #[command(alias = "rm")]
    Remove {
        /// Rule name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Run a rule (or every enabled rule) and create playlists
    Run {
        /// Rule name (default: all enabled rules)
        name: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. catalog, output.color)
        key: String,

        /// Value to set
        value: String,
    },

    /// Write a commented default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["smartlist"]);
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "smartlist",
            "--json",
            "--no-color",
            "--catalog",
            "/tmp/catalog.json",
            "parse",
            "{genre:Action | none | 1}",
        ]);
        assert!(cli.json);
        assert!(cli.no_color);
        assert_eq!(cli.catalog.as_deref(), Some("/tmp/catalog.json"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["smartlist", "-v", "-q", "rules"]).is_err());
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::parse_from(["smartlist", "parse", "{genre:Action | none | 1}", "--tree"]);
        if let Some(Commands::Parse { expression, tree }) = cli.command {
            assert_eq!(expression, "{genre:Action | none | 1}");
            assert!(tree);
        } else {
            panic!("Expected Parse command");
        }
    }

    #[test]
    fn test_preview_requires_expression() {
        assert!(Cli::try_parse_from(["smartlist", "preview"]).is_err());
    }

    #[test]
    fn test_preview_multiple_expressions() {
        let cli = Cli::parse_from([
            "smartlist",
            "preview",
            "{genre:Action | none | 1}",
            "{genre:Drama | none | 1}",
            "--user",
            "alice",
        ]);
        if let Some(Commands::Preview { expressions, user }) = cli.command {
            assert_eq!(expressions.len(), 2);
            assert_eq!(user.as_deref(), Some("alice"));
        } else {
            panic!("Expected Preview command");
        }
    }

    #[test]
    fn test_rules_add() {
        let cli = Cli::parse_from([
            "smartlist",
            "rules",
            "add",
            "Weekend",
            "{genre:Action | rating | 10}",
            "-u",
            "bob",
            "--disabled",
        ]);
        if let Some(Commands::Rules {
            command:
                Some(RulesCommands::Add {
                    name,
                    expressions,
                    user,
                    disabled,
                }),
        }) = cli.command
        {
            assert_eq!(name, "Weekend");
            assert_eq!(expressions, vec!["{genre:Action | rating | 10}"]);
            assert_eq!(user.as_deref(), Some("bob"));
            assert!(disabled);
        } else {
            panic!("Expected Rules Add command");
        }
    }

    #[test]
    fn test_rules_remove_alias() {
        let cli = Cli::parse_from(["smartlist", "rules", "rm", "Weekend", "--force"]);
        if let Some(Commands::Rules {
            command: Some(RulesCommands::Remove { name, force }),
        }) = cli.command
        {
            assert_eq!(name, "Weekend");
            assert!(force);
        } else {
            panic!("Expected Rules Remove command");
        }
    }

    #[test]
    fn test_rules_run_all() {
        let cli = Cli::parse_from(["smartlist", "rules", "run"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Rules {
                command: Some(RulesCommands::Run { name: None })
            })
        ));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["smartlist", "config", "set", "output.color", "false"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "output.color");
            assert_eq!(value, "false");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["smartlist", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}

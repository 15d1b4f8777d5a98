//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--organization-url <url>`: Override the organization URL

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// adogit - Azure DevOps Git branches and files as declarative resources
#[derive(Parser, Debug)]
#[command(name = "adogit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Azure DevOps organization URL (overrides config and $AZDO_ORG_SERVICE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub organization_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage a repository branch
    #[command(
        name = "branch",
        long_about = "Manage a Git repository branch.\n\n\
            A branch is created either as an orphan with a single initial commit, \
            from an existing ref, or from a commit. Branches are immutable: to change one, delete \
            it and create it again.",
        after_help = "\
EXAMPLES:
    # Orphan branch with an initial readme
    adogit branch create --repository-id <uuid> --name feature

    # Branch from a tag
    adogit branch create --repository-id <uuid> --name hotfix --ref refs/tags/v1.2.0

    # Branch from a commit
    adogit branch create --repository-id <uuid> --name bisect --source-sha <sha>

    # Adopt an existing branch
    adogit branch import <uuid>:main"
    )]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Manage a file on a repository branch
    #[command(
        name = "file",
        long_about = "Manage the content of a single file on a branch.\n\n\
            Every change is one commit pushed onto the branch head. If another \
            client moves the branch first, the push is retried on the new head \
            until the configured timeout.",
        after_help = "\
EXAMPLES:
    # Create a file on master
    adogit file create --repository-id <uuid> --file docs/README.md --content 'hello'

    # Replace its content from a local file
    adogit file update --repository-id <uuid> --file docs/README.md --content-file ./README.md

    # Adopt a file on another branch
    adogit file import <uuid>/docs/README.md:refs/heads/dev"
    )]
    File {
        #[command(subcommand)]
        action: FileAction,
    },
}

/// Branch lifecycle steps.
#[derive(Subcommand, Debug)]
pub enum BranchAction {
    /// Create a branch and print its state
    Create {
        /// Repository UUID
        #[arg(long)]
        repository_id: String,

        /// Branch name, with or without refs/heads/
        #[arg(long)]
        name: String,

        /// Ref to branch from; omit for an orphan branch
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,

        /// Commit to branch from, instead of a ref
        #[arg(long, value_name = "SHA", conflicts_with = "reference")]
        source_sha: Option<String>,
    },

    /// Print the state of a branch, or null if it is gone
    Read {
        /// Branch id: <repositoryId>:<branchName>
        #[arg(long)]
        id: String,
    },

    /// Delete a branch at its current head
    Delete {
        /// Branch id: <repositoryId>:<branchName>
        #[arg(long)]
        id: String,
    },

    /// Adopt an existing branch
    Import {
        /// <repositoryId>:<branchName>
        id: String,
    },
}

/// Declared file values shared by create and update.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Repository UUID
    #[arg(long)]
    pub repository_id: String,

    /// Path of the file within the repository
    #[arg(long)]
    pub file: String,

    /// File content
    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    pub content: Option<String>,

    /// Read the file content from a local path
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,

    /// Branch to write to
    #[arg(long, default_value = "refs/heads/master")]
    pub branch: String,

    /// Commit message
    #[arg(long)]
    pub commit_message: Option<String>,
}

/// File lifecycle steps.
#[derive(Subcommand, Debug)]
pub enum FileAction {
    /// Create a file and print its state
    Create {
        #[command(flatten)]
        file: FileArgs,

        /// Replace the file if it already exists
        #[arg(long)]
        overwrite_on_create: bool,
    },

    /// Print the state of a file, or null if it is gone
    Read {
        /// File id: <repositoryId>/<filePath>
        #[arg(long)]
        id: String,

        /// Branch the file lives on
        #[arg(long, default_value = "refs/heads/master")]
        branch: String,
    },

    /// Replace a file's content and print its state
    Update {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Delete a file from its branch
    Delete {
        /// File id: <repositoryId>/<filePath>
        #[arg(long)]
        id: String,

        /// Branch the file lives on
        #[arg(long, default_value = "refs/heads/master")]
        branch: String,
    },

    /// Adopt an existing file
    Import {
        /// <repositoryId>/<filePath> or <repositoryId>/<filePath>:<branch>
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_branch_create_with_ref() {
        let cli = Cli::try_parse_from([
            "adogit",
            "branch",
            "create",
            "--repository-id",
            "r",
            "--name",
            "feature",
            "--ref",
            "refs/heads/main",
        ])
        .unwrap();
        match cli.command {
            Command::Branch {
                action: BranchAction::Create { reference, .. },
            } => assert_eq!(reference.as_deref(), Some("refs/heads/main")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ref_and_source_sha_conflict() {
        let result = Cli::try_parse_from([
            "adogit",
            "branch",
            "create",
            "--repository-id",
            "r",
            "--name",
            "feature",
            "--ref",
            "refs/heads/main",
            "--source-sha",
            "abc123def4567890abc123def4567890abc12345",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "adogit",
            "branch",
            "read",
            "--id",
            "r:b",
            "--debug",
            "--organization-url",
            "https://dev.azure.com/contoso",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(
            cli.organization_url.as_deref(),
            Some("https://dev.azure.com/contoso")
        );
    }

    #[test]
    fn content_and_content_file_conflict() {
        let result = Cli::try_parse_from([
            "adogit",
            "file",
            "create",
            "--repository-id",
            "r",
            "--file",
            "a.txt",
            "--content",
            "x",
            "--content-file",
            "a.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn file_branch_defaults_to_master() {
        let cli = Cli::try_parse_from(["adogit", "file", "read", "--id", "r/a.txt"]).unwrap();
        match cli.command {
            Command::File {
                action: FileAction::Read { branch, .. },
            } => assert_eq!(branch, "refs/heads/master"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

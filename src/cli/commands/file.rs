//! file command - Create, read, update, delete, or import a file

use anyhow::{Context as _, Result};

use super::{print_state, Context};
use crate::cli::args::{FileAction, FileArgs};
use crate::resource::FileConfig;

/// Run a file lifecycle step and print the resulting state.
pub async fn file(ctx: &Context, action: FileAction) -> Result<()> {
    match action {
        FileAction::Create {
            file,
            overwrite_on_create,
        } => {
            let config = declared(file)?.overwrite_on_create(overwrite_on_create);
            let state = ctx.files()?.create(&config).await?;
            print_state(Some(&state))
        }
        FileAction::Read { id, branch } => {
            let state = ctx.files()?.read(&id, &branch).await?;
            print_state(state.as_ref())
        }
        FileAction::Update { file } => {
            let config = declared(file)?;
            let state = ctx.files()?.update(&config).await?;
            print_state(Some(&state))
        }
        FileAction::Delete { id, branch } => {
            ctx.files()?.delete(&id, &branch).await?;
            print_state::<()>(None)
        }
        FileAction::Import { id } => {
            let state = ctx.files()?.import(&id).await?;
            print_state(Some(&state))
        }
    }
}

/// Build the declared file from flags, reading `--content-file` if given.
fn declared(args: FileArgs) -> Result<FileConfig> {
    let content = match (args.content, args.content_file) {
        (Some(content), _) => content,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut config = FileConfig::new(args.repository_id, args.file, content).on_branch(args.branch);
    config.commit_message = args.commit_message;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(content: Option<&str>, content_file: Option<std::path::PathBuf>) -> FileArgs {
        FileArgs {
            repository_id: "6f1c2a34-1b2c-4d5e-8f90-123456789abc".into(),
            file: "a.txt".into(),
            content: content.map(String::from),
            content_file,
            branch: "refs/heads/dev".into(),
            commit_message: Some("seed".into()),
        }
    }

    #[test]
    fn content_from_flag() {
        let config = declared(args(Some("inline"), None)).unwrap();
        assert_eq!(config.content, "inline");
        assert_eq!(config.branch, "refs/heads/dev");
        assert_eq!(config.commit_message.as_deref(), Some("seed"));
    }

    #[test]
    fn content_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "from disk").unwrap();

        let config = declared(args(None, Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.content, "from disk");
    }

    #[test]
    fn missing_content_file_is_an_error() {
        let err = declared(args(None, Some("/nonexistent/adogit/content".into()))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

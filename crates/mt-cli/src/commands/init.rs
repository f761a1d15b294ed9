//! Init command for writing a default config file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::{Config, default_config_file};

/// Runs the init command, writing to `target` or the default config location.
pub fn run<W: Write>(writer: &mut W, target: Option<&Path>, force: bool) -> Result<()> {
    let path = match target {
        Some(path) => path.to_path_buf(),
        None => default_config_file().context("could not determine config directory")?,
    };

    write_default_config(&path, force)?;
    writeln!(writer, "Wrote default config to {}", path.display())?;
    Ok(())
}

/// Writes the default configuration as TOML to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub(crate) fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    let content =
        toml::to_string_pretty(&Config::default()).context("failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn writes_default_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/config.toml");

        write_default_config(&path, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_snapshot!(content, @r#"
        log_file_path = "runtime.log"
        poll_interval_secs = 5
        render_interval_secs = 1
        "#);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "remark = \"mine\"\n").unwrap();

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "remark = \"mine\"\n");

        write_default_config(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("poll_interval_secs"));
    }

    #[test]
    fn run_reports_written_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");

        let mut output = Vec::new();
        run(&mut output, Some(&path), false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, format!("Wrote default config to {}\n", path.display()));
    }
}

use std::{
    env,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;

/// Directory holding windex settings below a config root
const SETTINGS_DIR: &str = "windex";

/// Settings file name, shared by every location
pub const SETTINGS_FILE: &str = "windex.toml";

/// Returns the user settings file, `<config dir>/windex/windex.toml`.
///
/// The config dir is `XDG_CONFIG_HOME` or `$HOME/.config` on Linux and macOS, and the roaming
/// AppData directory on Windows. The file is returned whether or not it exists.
pub fn user_settings_file() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Returns `windex.toml` in the current working directory.
pub fn project_settings_file() -> PathBuf {
    PathBuf::from(SETTINGS_FILE)
}

#[cfg(not(windows))]
fn find_in_xdg_config_dirs(value: Option<&str>) -> Option<PathBuf> {
    let dirs = value.filter(|s| !s.is_empty()).unwrap_or("/etc/xdg");

    dirs.split(':')
        .take_while(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(SETTINGS_DIR).join(SETTINGS_FILE))
        .find(|candidate| candidate.is_file())
}

#[cfg(windows)]
fn find_in_program_data(system_drive: impl AsRef<Path>) -> Option<PathBuf> {
    let candidate = system_drive
        .as_ref()
        .join("ProgramData")
        .join(SETTINGS_DIR)
        .join(SETTINGS_FILE);
    candidate.is_file().then_some(candidate)
}

/// Returns the system-wide settings file if one exists.
///
/// Unix-like systems search `XDG_CONFIG_DIRS` (default `/etc/xdg`) and then fall back to
/// `/etc/windex/windex.toml`. Windows uses `%SYSTEMDRIVE%\ProgramData\windex\windex.toml`.
pub fn system_settings_file() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        env::var("SYSTEMDRIVE")
            .ok()
            .and_then(|drive| find_in_program_data(PathBuf::from(drive)))
    }

    #[cfg(not(windows))]
    {
        let xdg_config_dirs = env::var("XDG_CONFIG_DIRS").ok();
        if let Some(path) = find_in_xdg_config_dirs(xdg_config_dirs.as_deref()) {
            return Some(path);
        }

        let fallback = Path::new("/etc").join(SETTINGS_DIR).join(SETTINGS_FILE);
        match fallback.try_exists() {
            Ok(true) => Some(fallback),
            Ok(false) => None,
            Err(err) => {
                log::warn!("Failed to query system settings file: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{SETTINGS_DIR, SETTINGS_FILE};

    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[cfg(not(windows))]
    fn test_find_in_xdg_config_dirs() -> anyhow::Result<()> {
        use super::find_in_xdg_config_dirs;

        let context = TempDir::new()?;
        let settings_dir = context.path().join(SETTINGS_DIR);
        fs::create_dir_all(&settings_dir)?;
        fs::write(settings_dir.join(SETTINGS_FILE), "out-dir = \"build\"")?;

        assert_eq!(find_in_xdg_config_dirs(Some("")), None);
        assert_eq!(find_in_xdg_config_dirs(Some(":")), None);

        let empty = TempDir::new()?;
        let dirs = format!(
            "{}:{}",
            empty.path().display(),
            context.path().display()
        );
        assert_eq!(
            find_in_xdg_config_dirs(Some(&dirs)),
            Some(settings_dir.join(SETTINGS_FILE))
        );

        Ok(())
    }

    #[test]
    #[cfg(windows)]
    fn test_find_in_program_data() -> anyhow::Result<()> {
        use super::find_in_program_data;

        let context = TempDir::new()?;
        let program_data = context.path().join("ProgramData").join(SETTINGS_DIR);
        fs::create_dir_all(&program_data)?;
        fs::write(program_data.join(SETTINGS_FILE), "out-dir = \"build\"")?;

        assert_eq!(
            find_in_program_data(context.path()),
            Some(program_data.join(SETTINGS_FILE))
        );

        let context = TempDir::new()?;
        assert_eq!(find_in_program_data(context.path()), None);

        Ok(())
    }
}

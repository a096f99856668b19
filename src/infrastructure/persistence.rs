use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::domain::models::AppConfig;

const CONFIG_FILE_NAME: &str = "config.json";

pub trait ConfigRepository {
    fn load(&self) -> Result<AppConfig>;
    fn save(&self, config: &AppConfig) -> Result<()>;
}

pub struct FileConfigRepository {
    path: PathBuf,
}

impl FileConfigRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves the default configuration path.
    ///
    /// Windows: %APPDATA%\pad-rumble\config\config.json
    /// Linux:   $XDG_CONFIG_HOME/pad-rumble/config.json
    pub fn default_config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pad-rumble") {
            Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
        } else {
            let mut path = std::env::current_dir().context("Failed to get current dir")?;
            path.push(CONFIG_FILE_NAME);
            Ok(path)
        }
    }

    fn ensure_directory(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn atomic_rename(src: &Path, dst: &Path) -> Result<()> {
        use std::os::windows::ffi::OsStrExt;
        use windows::Win32::Storage::FileSystem::{MoveFileExW, MOVEFILE_REPLACE_EXISTING, MOVEFILE_WRITE_THROUGH};

        let src_wide: Vec<u16> = src.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
        let dst_wide: Vec<u16> = dst.as_os_str().encode_wide().chain(std::iter::once(0)).collect();

        unsafe {
            MoveFileExW(
                windows::core::PCWSTR(src_wide.as_ptr()),
                windows::core::PCWSTR(dst_wide.as_ptr()),
                MOVEFILE_REPLACE_EXISTING | MOVEFILE_WRITE_THROUGH,
            )
        }
        .map_err(|e| anyhow::anyhow!("MoveFileExW failed: {}", e))
    }

    #[cfg(not(target_os = "windows"))]
    fn atomic_rename(src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst).context("Failed to rename temp file")
    }
}

impl ConfigRepository for FileConfigRepository {
    fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }
        let file = fs::File::open(&self.path).context("Failed to open config file")?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader).context("Failed to parse config file")?;
        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        self.ensure_directory()?;

        // Temp file must live in the target directory for the rename to be atomic.
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(parent).context("Failed to create temp file")?;
        serde_json::to_writer_pretty(&file, config).context("Failed to serialize config")?;

        let (temp_file, temp_path) = file.keep().context("Failed to keep temp file")?;
        drop(temp_file);

        Self::atomic_rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            e
        })
    }
}

//! Common utilities for integration tests

pub mod cli;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write `text` as `snapbot.toml` inside `dir`
pub fn write_config(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("snapbot.toml");
    std::fs::write(&path, text).expect("write config");
    path
}

/// Stand-in `zfs` and `zpool` executables placed first on `PATH`
///
/// Every `zfs` invocation is appended to a log so tests can see what a pass
/// did. `zfs list` reports no snapshots.
pub struct StubZfs {
    bin_dir: PathBuf,
    log: PathBuf,
}

impl StubZfs {
    pub fn install(dir: &Path, pool_healthy: bool) -> Self {
        let bin_dir = dir.join("bin");
        std::fs::create_dir_all(&bin_dir).expect("create stub bin dir");
        let log = dir.join("zfs.log");

        write_script(
            &bin_dir.join("zfs"),
            &format!("#!/bin/sh\necho \"$@\" >> '{}'\nexit 0\n", log.display()),
        );

        let zpool = if pool_healthy {
            "#!/bin/sh\necho \"pool '$3' is healthy\"\n".to_string()
        } else {
            "#!/bin/sh\nprintf '  pool: %s\\n state: DEGRADED\\n' \"$3\"\n".to_string()
        };
        write_script(&bin_dir.join("zpool"), &zpool);

        Self { bin_dir, log }
    }

    /// `PATH` value with the stubs ahead of the inherited entries
    pub fn path_env(&self) -> String {
        let inherited = std::env::var("PATH").unwrap_or_default();
        format!("{}:{}", self.bin_dir.display(), inherited)
    }

    /// `zfs` invocations so far, one per line
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).expect("write stub script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .expect("make stub executable");
}

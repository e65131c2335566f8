use std::path::{Path, PathBuf};

const STATE_REGIONS: [&str; 3] = ["game", "map_data", "state_regions"];

/// Steam library locations relative to the home directory (Linux, macOS).
const HOME_LIBRARIES: [&str; 2] = [
    ".local/share/Steam/steamapps/common",
    "Library/Application Support/Steam/steamapps/common",
];

const WINDOWS_LIBRARY: &str = r"C:\Program Files (x86)\Steam\steamapps\common";

const INSTALL_DIR: &str = "Victoria 3";

/// State region definitions inside a game installation.
pub fn state_regions_dir(game_dir: &Path) -> PathBuf {
    STATE_REGIONS.iter().fold(game_dir.to_path_buf(), |dir, part| dir.join(part))
}

/// Install directories worth trying, most likely first. A missing home
/// directory only drops the home-relative libraries.
fn install_candidates(home: Option<&Path>) -> Vec<PathBuf> {
    let mut libraries = vec![PathBuf::from(WINDOWS_LIBRARY)];
    if let Some(home) = home {
        libraries.extend(HOME_LIBRARIES.iter().map(|lib| home.join(lib)));
    }
    libraries.into_iter().map(|lib| lib.join(INSTALL_DIR)).collect()
}

/// First candidate install that actually ships state region files.
fn find_install(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|dir| state_regions_dir(dir).is_dir())
}

/// Resolves the state regions directory: an explicit override wins, then the
/// given game directory, then the first Steam install found on this machine.
pub fn resolve_state_regions(
    explicit: Option<&Path>,
    game_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }
    let install = match game_dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            let found = find_install(install_candidates(dirs::home_dir().as_deref()))?;
            log::info!("Using Victoria 3 install at {}", found.display());
            found
        }
    };
    Some(state_regions_dir(&install))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_state_regions_dir() {
        let dir = state_regions_dir(Path::new("/games/v3"));
        assert!(dir.ends_with("game/map_data/state_regions"));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let got = resolve_state_regions(Some(Path::new("/x")), Some(Path::new("/games/v3")));
        assert_eq!(got, Some(PathBuf::from("/x")));
        let got = resolve_state_regions(None, Some(Path::new("/games/v3")));
        assert_eq!(got, Some(state_regions_dir(Path::new("/games/v3"))));
    }

    #[test]
    fn test_candidates_without_home_keep_windows_library() {
        let candidates = install_candidates(None);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].ends_with(INSTALL_DIR));

        let home = Path::new("/home/player");
        let candidates = install_candidates(Some(home));
        assert_eq!(candidates.len(), 3);
        assert!(candidates[1].starts_with(home));
    }

    #[test]
    fn test_find_install_skips_dirs_without_state_regions() {
        let home = tempdir().unwrap();
        let candidates = install_candidates(Some(home.path()));
        // Linux library exists but is empty; the macOS one has the data.
        fs::create_dir_all(&candidates[1]).unwrap();
        fs::create_dir_all(state_regions_dir(&candidates[2])).unwrap();

        assert_eq!(find_install(candidates.clone()), Some(candidates[2].clone()));
        assert_eq!(find_install(candidates[..2].to_vec()), None);
    }
}

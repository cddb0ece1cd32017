//! TOML-backed leaderboard
//!
//! Written after every recorded session. Read and write failures are logged
//! and never interrupt the engine.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Leaderboard, LeaderboardError, StatsRecorder};
use crate::plague::SessionSnapshot;
use crate::world::ParticipantId;

const FILE_NAME: &str = "leaderboard.toml";

/// `<data dir>/curse/leaderboard.toml`
pub fn default_leaderboard_path() -> Result<PathBuf, LeaderboardError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("curse").join(FILE_NAME))
        .ok_or(LeaderboardError::NoDataDir)
}

#[derive(Debug)]
pub struct FileLeaderboard {
    path: PathBuf,
    board: Leaderboard,
}

impl FileLeaderboard {
    /// Open the file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let board = match Self::read(&path) {
            Ok(board) => board,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "Could not load leaderboard");
                Leaderboard::default()
            }
        };
        Self { path, board }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(path: &Path) -> Result<Leaderboard, LeaderboardError> {
        if !path.exists() {
            return Ok(Leaderboard::default());
        }
        let text = fs::read_to_string(path).map_err(|source| LeaderboardError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| LeaderboardError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), LeaderboardError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| LeaderboardError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(&self.board).map_err(LeaderboardError::Serialize)?;
        fs::write(&self.path, text).map_err(|source| LeaderboardError::WriteFile {
            path: self.path.clone(),
            source,
        })
    }
}

impl StatsRecorder for FileLeaderboard {
    fn record(&mut self, participant: ParticipantId, name: &str, snapshot: &SessionSnapshot) {
        self.board.apply(participant, name, snapshot);
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "Could not save leaderboard");
        }
    }

    fn board(&self) -> &Leaderboard {
        &self.board
    }

    fn reload(&mut self) {
        match Self::read(&self.path) {
            Ok(board) => self.board = board,
            Err(e) => tracing::error!(error = %e, "Could not reload leaderboard, keeping current data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plague::EndReason;
    use chrono::NaiveDate;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("curse-lb-{tag}-{}", std::process::id()))
            .join(FILE_NAME)
    }

    fn make_snapshot(round: u32, kills: u32) -> SessionSnapshot {
        SessionSnapshot {
            participant: ParticipantId(7),
            round_reached: round,
            total_kills: kills,
            elapsed_ms: 61_000,
            reason: EndReason::Cured,
            started_wall: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(21, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn record_persists_and_reopens() {
        let path = temp_path("persist");
        let mut store = FileLeaderboard::open(&path);
        store.record(ParticipantId(7), "Robin", &make_snapshot(3, 12));
        assert!(path.exists());

        let reopened = FileLeaderboard::open(&path);
        let record = reopened.board().personal(ParticipantId(7)).unwrap();
        assert_eq!(record.name, "Robin");
        assert_eq!(record.kills, 12);
        assert_eq!(record.best_time_ms, Some(61_000));
        assert_eq!(reopened.board().global().total_completions, 1);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "global = [[[").unwrap();

        let store = FileLeaderboard::open(&path);
        assert!(store.board().is_empty());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let path = temp_path("reload");
        let mut first = FileLeaderboard::open(&path);
        let mut second = FileLeaderboard::open(&path);

        first.record(ParticipantId(7), "Robin", &make_snapshot(2, 4));
        assert!(second.board().is_empty());
        second.reload();
        assert_eq!(second.board().global().total_kills, 4);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}

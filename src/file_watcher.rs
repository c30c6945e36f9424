// This file was adapted from src/utils/watcher.rs in niri
// (https://github.com/YaLTeR/niri/blob/271534e115e5915231c99df287bbfe396185924d/src/utils/watcher.rs)
//
// niri is licensed under the GNU General Public License v3.0 (GPL-3.0).

use iced::{
    Subscription,
    advanced::subscription::{EventStream, Recipe, from_recipe},
};
use std::{
    hash::Hash,
    io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{demo::Message, utils::BoxStream};

const POLLING_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    pub config: PathBuf,
    pub colors: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    /// Never seen, still absent.
    Missing,
    /// Existed on the last check, gone now.
    Disappeared,
    Unchanged,
    Changed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub config: CheckType,
    pub colors: CheckType,
}

impl CheckResult {
    fn is_quiet(self) -> bool {
        matches!(self.config, CheckType::Missing | CheckType::Unchanged)
            && matches!(self.colors, CheckType::Missing | CheckType::Unchanged)
    }
}

pub struct FileWatcherInner {
    path: PathBuf,

    last_props: Option<(SystemTime, PathBuf)>,
}

struct ConfigWatcher {
    path: ConfigPath,
}

#[profiling::all_functions]
impl Recipe for ConfigWatcher {
    type Output = CheckResult;

    fn hash(&self, state: &mut iced::advanced::subscription::Hasher) {
        std::any::TypeId::of::<Self>().hash(state);
        self.path.hash(state);
    }

    fn stream(self: Box<Self>, _input: EventStream) -> BoxStream<Self::Output> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut config = FileWatcherInner::new(self.path.config);
            let mut colors = FileWatcherInner::new(self.path.colors);
            loop {
                tokio::time::sleep(POLLING_INTERVAL).await;

                let result = CheckResult {
                    config: config.check(),
                    colors: colors.check(),
                };

                if !result.is_quiet() && tx.send(result).is_err() {
                    break;
                }
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

pub fn watch_config(path: ConfigPath) -> Subscription<Message> {
    from_recipe(ConfigWatcher { path }).map(Message::FileWatcherEvent)
}

fn see_path(path: &Path) -> io::Result<(SystemTime, PathBuf)> {
    let canon = path.canonicalize()?;
    let mtime = canon.metadata()?.modified()?;
    Ok((mtime, canon))
}

#[profiling::all_functions]
impl FileWatcherInner {
    pub fn new(path: PathBuf) -> Self {
        let last_props = see_path(&path).ok();
        Self { path, last_props }
    }

    pub fn check(&mut self) -> CheckType {
        match see_path(&self.path) {
            Ok(new_props) => {
                if self.last_props.as_ref() == Some(&new_props) {
                    CheckType::Unchanged
                } else {
                    self.last_props = Some(new_props);
                    CheckType::Changed
                }
            }
            Err(_) => {
                if self.last_props.take().is_some() {
                    CheckType::Disappeared
                } else {
                    CheckType::Missing
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn file_lifecycle_is_reported_once_per_transition() {
        let path = std::env::temp_dir()
            .join(format!("anchortip-watch-{}.kdl", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut watcher = FileWatcherInner::new(path.clone());
        assert_eq!(watcher.check(), CheckType::Missing);

        fs::write(&path, "tooltip {}").unwrap();
        assert_eq!(watcher.check(), CheckType::Changed);
        assert_eq!(watcher.check(), CheckType::Unchanged);

        fs::remove_file(&path).unwrap();
        assert_eq!(watcher.check(), CheckType::Disappeared);
        assert_eq!(watcher.check(), CheckType::Missing);
    }

    #[test]
    fn quiet_results_are_not_sent() {
        let quiet = CheckResult {
            config: CheckType::Unchanged,
            colors: CheckType::Missing,
        };
        assert!(quiet.is_quiet());

        let noisy = CheckResult {
            config: CheckType::Unchanged,
            colors: CheckType::Disappeared,
        };
        assert!(!noisy.is_quiet());
    }
}

//! Track catalog and the two ways of building it
//!
//! The board can list its files directly (`L`), but on some firmware the
//! listing is unreliable, so the default is to probe: play index 0, 1, 2...
//! at zero volume until the board answers `NoFile`. Probing also yields
//! track lengths, which the listing does not report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serial_link::{ResetLine, Transport};
use soundboard_api::protocol::{parse_list_line, parse_play_reply};
use soundboard_api::{Command, PlayReply, ResponseMatch};

use crate::board::pause;
use crate::Soundboard;

/// How the track catalog is discovered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationStrategy {
    /// Read the board's file listing
    Direct,
    /// Play every index at zero volume until the board reports `NoFile`
    #[default]
    ProbeByPlayback,
}

/// One audio file stored on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Index accepted by `#<n>`
    pub index: usize,
    /// 8.3 name as the board prints it, e.g. `T00     OGG`
    pub name: Vec<u8>,
    pub size_bytes: u64,
    /// Zero when unknown; the file listing never reports lengths
    pub length_seconds: u64,
}

impl Track {
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// One generation of discovered tracks, ordered by index
///
/// Names are unique within a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    generation: u64,
    strategy: EnumerationStrategy,
    tracks: Vec<Track>,
    by_name: HashMap<Vec<u8>, usize>,
}

impl Catalog {
    pub(crate) fn new(generation: u64, strategy: EnumerationStrategy) -> Self {
        Self {
            generation,
            strategy,
            tracks: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add a track, refusing a name that is already present
    pub(crate) fn push(&mut self, track: Track) -> bool {
        if self.by_name.contains_key(&track.name) {
            return false;
        }
        self.by_name.insert(track.name.clone(), track.index);
        self.tracks.push(track);
        true
    }

    /// Number of the enumeration pass that produced this catalog, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn strategy(&self) -> EnumerationStrategy {
        self.strategy
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&index, |t| t.index)
            .ok()
            .map(|at| &self.tracks[at])
    }

    pub fn file_name(&self, index: usize) -> Option<&[u8]> {
        self.track(index).map(|t| t.name.as_slice())
    }

    pub fn track_num(&self, name: &[u8]) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Cached catalog plus the strategy used to rebuild it
#[derive(Debug)]
pub(crate) struct TrackCatalog {
    strategy: EnumerationStrategy,
    current: Option<Catalog>,
    generations: u64,
}

impl TrackCatalog {
    pub(crate) fn new(strategy: EnumerationStrategy) -> Self {
        Self {
            strategy,
            current: None,
            generations: 0,
        }
    }

    pub(crate) fn strategy(&self) -> EnumerationStrategy {
        self.strategy
    }

    pub(crate) fn set_strategy(&mut self, strategy: EnumerationStrategy) {
        self.strategy = strategy;
        self.invalidate();
    }

    pub(crate) fn cached(&self) -> Option<&Catalog> {
        self.current.as_ref()
    }

    pub(crate) fn take(&mut self) -> Option<Catalog> {
        self.current.take()
    }

    pub(crate) fn install(&mut self, catalog: Catalog) -> &Catalog {
        self.current.insert(catalog)
    }

    pub(crate) fn invalidate(&mut self) {
        if let Some(old) = self.current.take() {
            tracing::debug!(generation = old.generation, "catalog invalidated");
        }
    }

    /// Start a new, empty generation for the active strategy
    pub(crate) fn next(&mut self) -> Catalog {
        self.generations += 1;
        Catalog::new(self.generations, self.strategy)
    }
}

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// The track catalog, enumerating it first if nothing is cached
    pub fn catalog(&mut self) -> &Catalog {
        let catalog = match self.catalog.take() {
            Some(cached) => cached,
            None => self.operation(Self::enumerate),
        };
        self.catalog.install(catalog)
    }

    /// The cached catalog, without triggering enumeration
    pub fn cached_catalog(&self) -> Option<&Catalog> {
        self.catalog.cached()
    }

    /// Names of all tracks, in index order
    pub fn files(&mut self) -> Vec<Vec<u8>> {
        self.catalog().tracks().iter().map(|t| t.name.clone()).collect()
    }

    /// Sizes in bytes of all tracks, in index order
    pub fn sizes(&mut self) -> Vec<u64> {
        self.catalog().tracks().iter().map(|t| t.size_bytes).collect()
    }

    /// Lengths in seconds of all tracks, in index order
    pub fn lengths(&mut self) -> Vec<u64> {
        self.catalog().tracks().iter().map(|t| t.length_seconds).collect()
    }

    pub fn tracks(&mut self) -> &[Track] {
        self.catalog().tracks()
    }

    pub fn file_name(&mut self, index: usize) -> Option<Vec<u8>> {
        self.catalog().file_name(index).map(<[u8]>::to_vec)
    }

    pub fn track_num(&mut self, name: impl AsRef<[u8]>) -> Option<usize> {
        self.catalog().track_num(name.as_ref())
    }

    pub fn strategy(&self) -> EnumerationStrategy {
        self.catalog.strategy()
    }

    /// Switch enumeration strategy, dropping the cached catalog
    ///
    /// With `now` set the new strategy runs immediately; otherwise it runs on
    /// the next catalog access.
    pub fn set_strategy(&mut self, strategy: EnumerationStrategy, now: bool) {
        tracing::debug!(?strategy, now, "enumeration strategy changed");
        self.catalog.set_strategy(strategy);
        if now {
            self.catalog();
        }
    }

    pub fn invalidate_catalog(&mut self) {
        self.catalog.invalidate();
    }

    /// Drop the cached catalog and enumerate again
    pub fn refresh_catalog(&mut self) -> &Catalog {
        self.catalog.invalidate();
        self.catalog()
    }

    fn enumerate(&mut self) -> Catalog {
        let catalog = self.catalog.next();
        let catalog = match catalog.strategy() {
            EnumerationStrategy::Direct => self.list_files(catalog),
            EnumerationStrategy::ProbeByPlayback => self.probe_files(catalog),
        };
        tracing::info!(
            generation = catalog.generation(),
            strategy = ?catalog.strategy(),
            tracks = catalog.len(),
            "catalog enumerated"
        );
        catalog
    }

    fn list_files(&mut self, mut catalog: Catalog) -> Catalog {
        if let Err(error) = self.client.write_command(&Command::ListFiles) {
            tracing::warn!(%error, "file listing failed");
            return catalog;
        }

        let mut index = 0;
        while let Ok(line) = self.client.read_response() {
            if line.is_empty() {
                continue;
            }
            board_debug!(self.log, line = %String::from_utf8_lossy(&line), "listing");
            let entry = match parse_list_line(&line) {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(%error, "skipping listing line");
                    continue;
                }
            };
            self.register(
                &mut catalog,
                Track {
                    index,
                    name: entry.name,
                    size_bytes: entry.size,
                    length_seconds: 0,
                },
            );
            index += 1;
        }
        catalog
    }

    fn probe_files(&mut self, mut catalog: Catalog) -> Catalog {
        // Without a known level there is nothing to restore to, so leave it
        let saved = self.volume();
        if saved.is_some() {
            self.set_volume(0);
        }

        let limit = self.config.probe_limit();
        for index in 0.. {
            if limit.is_some_and(|limit| index >= limit) {
                tracing::info!(index, "probe limit reached");
                if index > 0 {
                    self.stop();
                }
                break;
            }

            self.stop();
            let Some(line) = self.send(&Command::PlayIndex(index), ResponseMatch::Raw).into_line() else {
                tracing::warn!(index, "no reply while probing, stopping");
                break;
            };

            let name = match parse_play_reply(&line) {
                Ok(PlayReply::Playing { name, .. }) => name,
                Ok(PlayReply::NoFile) => {
                    board_debug!(self.log, index, "no file, probe finished");
                    break;
                }
                Err(error) => {
                    tracing::warn!(index, %error, "unexpected probe reply, stopping");
                    break;
                }
            };

            pause(self.config.probe_settle());
            let length_seconds = self
                .track_time()
                .ok()
                .and_then(|p| u64::try_from(p.total).ok())
                .unwrap_or(0);
            let size_bytes = self
                .track_size()
                .ok()
                .and_then(|s| u64::try_from(s.total).ok())
                .unwrap_or(0);

            self.register(
                &mut catalog,
                Track {
                    index,
                    name,
                    size_bytes,
                    length_seconds,
                },
            );
        }

        if let Some(volume) = saved {
            self.set_volume(volume);
        }
        catalog
    }

    fn register(&self, catalog: &mut Catalog, track: Track) {
        let (index, name) = (track.index, track.name_lossy());
        board_debug!(self.log, index, name = %name, size = track.size_bytes, "track found");
        if !catalog.push(track) {
            tracing::warn!(index, name = %name, "duplicate track name skipped");
        }
    }
}

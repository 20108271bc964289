use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{NetError, Result};
use crate::ocr::codec::{encode_grid, encode_label};
use crate::ocr::grid::Grid;
use crate::train::backprop::BackPropagator;

/// A drawn grid and the letter it should be read as (`None` for blank).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub grid: Grid,
    pub label: Option<char>,
}

impl TrainingSample {
    pub fn new(grid: Grid, label: Option<char>) -> Self {
        TrainingSample { grid, label }
    }
}

/// Ordered, editable collection of training samples backed by a JSON file.
///
/// Tracks whether it changed since the last save or load and which file it
/// was last saved to or loaded from.
#[derive(Debug, Default)]
pub struct TrainingSet {
    samples: Vec<TrainingSample>,
    changed: bool,
    file: Option<PathBuf>,
}

impl TrainingSet {
    pub fn new() -> Self {
        TrainingSet::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Result<&TrainingSample> {
        self.samples.get(index).ok_or(NetError::IndexOutOfRange {
            context: "TrainingSet::get",
            index,
            limit: self.samples.len(),
        })
    }

    pub fn add(&mut self, sample: TrainingSample) {
        self.samples.push(sample);
        self.changed = true;
    }

    pub fn remove(&mut self, index: usize) -> Result<TrainingSample> {
        self.check_index(index, "TrainingSet::remove")?;
        self.changed = true;
        Ok(self.samples.remove(index))
    }

    /// Replaces the sample at `index`, keeping its position.
    pub fn edit(&mut self, index: usize, sample: TrainingSample) -> Result<()> {
        self.check_index(index, "TrainingSet::edit")?;
        self.samples[index] = sample;
        self.changed = true;
        Ok(())
    }

    /// Drops every sample and forgets the backing file.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.file = None;
        self.changed = false;
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_to(path)?;
        self.file = Some(path.to_path_buf());
        self.changed = false;
        Ok(())
    }

    /// Saves to the file last used by `save_as` or `load`.
    pub fn save(&mut self) -> Result<()> {
        let path = self.file.clone().ok_or_else(|| {
            NetError::IllegalState("TrainingSet::save called with no file set".to_string())
        })?;
        self.write_to(&path)?;
        self.changed = false;
        Ok(())
    }

    /// Replaces the contents with those of `path`. On failure the set is
    /// left empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match read_samples(path) {
            Ok(samples) => {
                debug!(path = %path.display(), samples = samples.len(), "loaded training set");
                self.samples = samples;
                self.file = Some(path.to_path_buf());
                self.changed = false;
                Ok(())
            }
            Err(e) => {
                self.samples.clear();
                Err(e)
            }
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<TrainingSet> {
        let mut set = TrainingSet::new();
        set.load(path)?;
        Ok(set)
    }

    /// Encodes every sample and hands it to `trainer`, in order.
    pub fn populate(&self, trainer: &mut BackPropagator<'_>) -> Result<()> {
        for sample in &self.samples {
            trainer.add_input_output(encode_grid(&sample.grid), encode_label(sample.label)?)?;
        }
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.samples)?;
        debug!(path = %path.display(), samples = self.samples.len(), "saved training set");
        Ok(())
    }

    fn check_index(&self, index: usize, context: &'static str) -> Result<()> {
        if index >= self.samples.len() {
            return Err(NetError::IndexOutOfRange { context, index, limit: self.samples.len() });
        }
        Ok(())
    }
}

fn read_samples(path: &Path) -> Result<Vec<TrainingSample>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::network::Network;

    fn sample(label: Option<char>, cell: usize) -> TrainingSample {
        let mut grid = Grid::new(8);
        grid.set(cell / 8, cell % 8, true).unwrap();
        TrainingSample::new(grid, label)
    }

    #[test]
    fn add_edit_remove_track_changes() {
        let mut set = TrainingSet::new();
        assert!(!set.is_changed());
        set.add(sample(Some('A'), 0));
        set.add(sample(Some('B'), 1));
        assert!(set.is_changed());

        set.edit(0, sample(Some('C'), 2)).unwrap();
        assert_eq!(set.get(0).unwrap().label, Some('C'));
        assert_eq!(set.get(1).unwrap().label, Some('B'));

        let removed = set.remove(0).unwrap();
        assert_eq!(removed.label, Some('C'));
        assert_eq!(set.len(), 1);

        assert!(matches!(set.remove(3), Err(NetError::IndexOutOfRange { .. })));
        assert!(set.edit(1, sample(None, 0)).is_err());
        assert!(set.get(1).is_err());
    }

    #[test]
    fn save_needs_a_file() {
        let mut set = TrainingSet::new();
        set.add(sample(None, 0));
        assert!(matches!(set.save(), Err(NetError::IllegalState(_))));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.json");

        let mut set = TrainingSet::new();
        set.add(sample(Some('A'), 9));
        set.add(sample(None, 63));
        set.save_as(&path).unwrap();
        assert!(!set.is_changed());
        assert_eq!(set.file(), Some(path.as_path()));

        set.add(sample(Some('Q'), 4));
        set.save().unwrap();

        let loaded = TrainingSet::open(&path).unwrap();
        assert_eq!(loaded.samples(), set.samples());
        assert!(!loaded.is_changed());
    }

    #[test]
    fn failed_load_empties_the_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not a list").unwrap();

        let mut set = TrainingSet::new();
        set.add(sample(Some('A'), 0));
        assert!(matches!(set.load(&path), Err(NetError::Json(_))));
        assert!(set.is_empty());
        assert!(set.load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn grid_with_wrong_cell_count_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        std::fs::write(&path, r#"[{"grid":{"size":8,"cells":[true,false]},"label":"A"}]"#).unwrap();

        let mut set = TrainingSet::new();
        let err = set.load(&path).unwrap_err();
        assert!(matches!(err, NetError::Json(_)));
        assert!(err.to_string().contains("malformed grid"));
        assert!(set.is_empty());
    }

    #[test]
    fn clear_forgets_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = TrainingSet::new();
        set.add(sample(Some('A'), 0));
        set.save_as(dir.path().join("s.json")).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert!(set.file().is_none());
    }

    #[test]
    fn populate_feeds_encoded_samples() {
        let mut set = TrainingSet::new();
        set.add(sample(Some('A'), 0));
        set.add(sample(None, 1));
        let mut network = Network::new(64, 26, 5);
        let mut trainer = BackPropagator::new(&mut network, 0.7);
        set.populate(&mut trainer).unwrap();
        assert_eq!(trainer.len(), 2);

        set.add(sample(Some('!'), 2));
        let mut network = Network::new(64, 26, 5);
        let mut trainer = BackPropagator::new(&mut network, 0.7);
        assert!(matches!(set.populate(&mut trainer), Err(NetError::InvalidLabel('!'))));
    }
}

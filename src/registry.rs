//! Ordered collection of loaded datasets.
//!
//! Ids are positions: the dataset at index `i` has id `i + 1`. Removing a
//! dataset shifts every later one down by one, and the returned [`IdRemap`]
//! must be applied to anything holding an id.

use crate::network::Network;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    network: Network,
    name: Option<String>,
    source: Option<String>,
}

impl From<Network> for Dataset {
    fn from(network: Network) -> Self {
        Dataset {
            network,
            name: None,
            source: None,
        }
    }
}

impl Dataset {
    /// `source` is where the data came from, usually a file name.
    pub fn with_source(network: Network, source: impl Into<String>) -> Self {
        Dataset {
            network,
            name: None,
            source: Some(source.into()),
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// User-assigned display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// How ids changed after a registry mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IdRemap {
    Removed(usize),
    Cleared,
}

impl IdRemap {
    /// New id for `old`, or `None` if that dataset is gone.
    pub fn apply(self, old: usize) -> Option<usize> {
        match self {
            IdRemap::Removed(removed) if old == removed => None,
            IdRemap::Removed(removed) if old > removed => Some(old - 1),
            IdRemap::Removed(_) => Some(old),
            IdRemap::Cleared => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    datasets: Vec<Dataset>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Appends a dataset and returns its id.
    pub fn add(&mut self, dataset: impl Into<Dataset>) -> usize {
        self.datasets.push(dataset.into());
        let id = self.datasets.len();
        log::info!("added dataset {}", id);
        id
    }

    /// Removes a dataset; later ids shift down by one.
    pub fn remove(&mut self, id: usize) -> Option<(Dataset, IdRemap)> {
        let index = self.index_of(id)?;
        let dataset = self.datasets.remove(index);
        log::info!(
            "removed dataset {}, {} remain",
            id,
            self.datasets.len()
        );
        Some((dataset, IdRemap::Removed(id)))
    }

    pub fn clear(&mut self) -> IdRemap {
        self.datasets.clear();
        IdRemap::Cleared
    }

    /// Sets the display name. An empty or blank name restores the default label.
    pub fn rename(&mut self, id: usize, name: &str) -> bool {
        let index = match self.index_of(id) {
            Some(index) => index,
            None => return false,
        };
        let name = name.trim();
        self.datasets[index].name = if name.is_empty() {
            None
        } else {
            Some(name.to_owned())
        };
        true
    }

    pub fn get(&self, id: usize) -> Option<&Dataset> {
        self.index_of(id).map(|index| &self.datasets[index])
    }

    /// Display name, falling back to `ID {n}`.
    pub fn label(&self, id: usize) -> Option<String> {
        self.get(id).map(|dataset| match dataset.name() {
            Some(name) => name.to_owned(),
            None => format!("ID {}", id),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Dataset)> {
        self.datasets.iter().enumerate().map(|(i, d)| (i + 1, d))
    }

    pub fn ids(&self) -> Vec<usize> {
        (1..=self.datasets.len()).collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn index_of(&self, id: usize) -> Option<usize> {
        if id >= 1 && id <= self.datasets.len() {
            Some(id - 1)
        } else {
            None
        }
    }
}

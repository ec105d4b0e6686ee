use super::version_cell::VersionCell;
use crate::host::ModuleCatalog;
use std::sync::Arc;

/// How to resolve several copies declaring the same maximum version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Every copy at the maximum considers itself the winner.
    #[default]
    Shared,
    /// Only the copy loaded first (lowest catalog index) among those at the
    /// maximum wins.
    LoadOrder,
}

/// Outcome of one arbitration call. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationResult {
    pub winning_version: i64,
    pub is_self: bool,
}

/// A loaded copy of the component that exposed a readable version marker.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position of the owning module in host load order.
    pub load_index: usize,
    pub module: String,
    /// Marker value read during enumeration.
    pub declared: i64,
    pub cell: Arc<VersionCell>,
}

/// Process-wide discovery of every loaded copy of the component.
pub struct VersionRegistry<'a, C: ?Sized> {
    catalog: &'a C,
    type_name: String,
    tie_break: TieBreak,
}

impl<'a, C: ModuleCatalog + ?Sized> VersionRegistry<'a, C> {
    /// Creates a registry looking for copies of the component `type_name`.
    pub fn new(catalog: &'a C, type_name: impl Into<String>) -> Self {
        Self {
            catalog,
            type_name: type_name.into(),
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Enumerates every loaded copy of the component.
    ///
    /// Modules that cannot be introspected are silently left out.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.catalog
            .loaded_modules()
            .into_iter()
            .enumerate()
            .filter_map(|(load_index, module)| {
                match module.version_marker(&self.type_name) {
                    Ok(Some(cell)) => Some(Candidate {
                        load_index,
                        module: module.name().to_string(),
                        declared: cell.get(),
                        cell,
                    }),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::trace!("[VersionRegistry] skipping module: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Decides whether the copy owning `own` (declaring `self_version`) runs.
    ///
    /// A winner retires its own cell before returning, so any later call in
    /// the same process, including a repeat call by the winner itself, yields.
    pub fn arbitrate(&self, own: &VersionCell, self_version: i64) -> ArbitrationResult {
        self.elect(&self.candidates(), own, self_version)
    }

    /// Runs the election against an already enumerated candidate set.
    ///
    /// Copies that start concurrently may all decide from the same snapshot;
    /// with [`TieBreak::Shared`] every copy at the maximum then wins.
    pub fn elect(
        &self,
        candidates: &[Candidate],
        own: &VersionCell,
        self_version: i64,
    ) -> ArbitrationResult {
        let winning_version = candidates
            .iter()
            .map(|c| c.declared)
            .chain(std::iter::once(self_version))
            .max()
            .unwrap_or(self_version);

        let preferred = match self.tie_break {
            TieBreak::Shared => true,
            TieBreak::LoadOrder => candidates
                .iter()
                .filter(|c| c.declared == winning_version)
                .min_by_key(|c| c.load_index)
                .is_none_or(|first| std::ptr::eq(Arc::as_ptr(&first.cell), own)),
        };

        let is_self = self_version == winning_version && preferred && own.retire(self_version);

        if is_self {
            tracing::debug!(
                "[VersionRegistry] elected version {} among {} candidate(s)",
                self_version,
                candidates.len()
            );
        } else {
            tracing::info!(
                "[VersionRegistry] version {} yields to version {}",
                self_version,
                winning_version
            );
        }

        ArbitrationResult {
            winning_version,
            is_self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::RETIRED_VERSION;
    use crate::error::InspectError;
    use crate::host::LoadedModule;

    const TYPE_NAME: &str = "KStats.Telemetry";

    enum Marker {
        None,
        Cell(Arc<VersionCell>),
        Broken,
    }

    struct FakeModule {
        name: String,
        marker: Marker,
    }

    impl LoadedModule for FakeModule {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> Option<String> {
            None
        }

        fn file_version(&self) -> Option<String> {
            None
        }

        fn title(&self) -> Result<Option<String>, InspectError> {
            Ok(None)
        }

        fn version_marker(
            &self,
            type_name: &str,
        ) -> Result<Option<Arc<VersionCell>>, InspectError> {
            assert_eq!(type_name, TYPE_NAME);
            match &self.marker {
                Marker::None => Ok(None),
                Marker::Cell(cell) => Ok(Some(cell.clone())),
                Marker::Broken => Err(InspectError::new(&self.name, "type load failed")),
            }
        }
    }

    struct FakeCatalog {
        modules: Vec<Arc<dyn LoadedModule>>,
    }

    impl ModuleCatalog for FakeCatalog {
        fn loaded_modules(&self) -> Vec<Arc<dyn LoadedModule>> {
            self.modules.clone()
        }
    }

    /// Builds a catalog with a host module at index 0 followed by one copy of
    /// the component per version.
    fn catalog_with(versions: &[i64]) -> (FakeCatalog, Vec<Arc<VersionCell>>) {
        let cells: Vec<_> = versions
            .iter()
            .map(|v| Arc::new(VersionCell::new(*v)))
            .collect();
        let mut modules: Vec<Arc<dyn LoadedModule>> = vec![Arc::new(FakeModule {
            name: "Assembly-CSharp".to_string(),
            marker: Marker::None,
        })];
        for (i, cell) in cells.iter().enumerate() {
            modules.push(Arc::new(FakeModule {
                name: format!("ModWithStats{i}"),
                marker: Marker::Cell(cell.clone()),
            }));
        }
        (FakeCatalog { modules }, cells)
    }

    #[test]
    fn test_highest_version_wins_alone() {
        let (catalog, cells) = catalog_with(&[3, 9, 5]);
        let registry = VersionRegistry::new(&catalog, TYPE_NAME);

        let results: Vec<_> = [3, 9, 5]
            .iter()
            .zip(&cells)
            .map(|(v, cell)| registry.arbitrate(cell, *v))
            .collect();

        assert!(!results[0].is_self);
        assert!(results[1].is_self);
        assert_eq!(results[1].winning_version, 9);
        // The winner retired itself before the third copy ran.
        assert!(!results[2].is_self);
        assert_eq!(results[2].winning_version, RETIRED_VERSION);
    }

    #[test]
    fn test_tie_at_max_elects_every_copy_sharing_a_snapshot() {
        let (catalog, cells) = catalog_with(&[6, 3, 6]);
        let registry = VersionRegistry::new(&catalog, TYPE_NAME);
        let snapshot = registry.candidates();

        let winners: Vec<bool> = [6, 3, 6]
            .iter()
            .zip(&cells)
            .map(|(v, cell)| registry.elect(&snapshot, cell, *v).is_self)
            .collect();

        assert_eq!(winners, vec![true, false, true]);
        assert!(cells[0].is_retired());
        assert!(!cells[1].is_retired());
        assert!(cells[2].is_retired());
    }

    #[test]
    fn test_tie_with_load_order_elects_first_loaded() {
        let (catalog, cells) = catalog_with(&[6, 3, 6]);
        let registry =
            VersionRegistry::new(&catalog, TYPE_NAME).with_tie_break(TieBreak::LoadOrder);
        let snapshot = registry.candidates();

        let later = registry.elect(&snapshot, &cells[2], 6);
        assert!(!later.is_self);
        assert_eq!(later.winning_version, 6);
        assert!(!cells[2].is_retired());

        assert!(registry.elect(&snapshot, &cells[0], 6).is_self);
        assert!(!registry.elect(&snapshot, &cells[1], 3).is_self);
    }

    #[test]
    fn test_second_call_never_reelects() {
        let (catalog, cells) = catalog_with(&[4]);
        let registry = VersionRegistry::new(&catalog, TYPE_NAME);

        assert!(registry.arbitrate(&cells[0], 4).is_self);
        let again = registry.arbitrate(&cells[0], 4);
        assert!(!again.is_self);
        assert_eq!(again.winning_version, RETIRED_VERSION);
    }

    #[test]
    fn test_older_late_loader_yields_to_winner() {
        let (catalog, cells) = catalog_with(&[8, 2]);
        let registry = VersionRegistry::new(&catalog, TYPE_NAME);

        assert!(registry.arbitrate(&cells[0], 8).is_self);
        let late = registry.arbitrate(&cells[1], 2);
        assert!(!late.is_self);
        assert_eq!(cells[1].get(), 2);
    }

    #[test]
    fn test_broken_module_is_excluded() {
        let own = Arc::new(VersionCell::new(1));
        let catalog = FakeCatalog {
            modules: vec![
                Arc::new(FakeModule {
                    name: "Broken".to_string(),
                    marker: Marker::Broken,
                }),
                Arc::new(FakeModule {
                    name: "Mine".to_string(),
                    marker: Marker::Cell(own.clone()),
                }),
            ],
        };
        let registry = VersionRegistry::new(&catalog, TYPE_NAME);

        assert_eq!(registry.candidates().len(), 1);
        assert!(registry.arbitrate(&own, 1).is_self);
    }

    #[test]
    fn test_self_wins_when_nothing_is_discoverable() {
        let catalog = FakeCatalog { modules: vec![] };
        let own = VersionCell::new(5);
        let result = VersionRegistry::new(&catalog, TYPE_NAME).arbitrate(&own, 5);
        assert_eq!(
            result,
            ArbitrationResult {
                winning_version: 5,
                is_self: true
            }
        );
    }
}

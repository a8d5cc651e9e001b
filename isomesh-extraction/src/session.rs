//! Last-request-wins surface rebuilding
//!
//! An interactive front end rebuilds the whole surface every time a
//! parameter changes. [`SurfaceSession`] keeps the last published surface
//! readable while a rebuild runs and swaps the new one in only when it is
//! complete. When a newer rebuild is requested, older in-flight builds stop
//! sampling and report [`Error::Cancelled`] instead of publishing.

use crate::config::GridConfig;
use crate::grid::Grid;
use isomesh_core::{Error, Result, ScalarField, TriangleSoup};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A published surface and the request that produced it
#[derive(Debug, Clone)]
pub struct Surface {
    /// Request number, increasing with every rebuild
    pub generation: u64,
    pub config: GridConfig,
    pub soup: TriangleSoup,
}

/// Owns a scalar field and the most recently published surface
#[derive(Debug)]
pub struct SurfaceSession<F> {
    field: Arc<F>,
    latest: AtomicU64,
    current: RwLock<Option<Arc<Surface>>>,
}

impl<F: ScalarField> SurfaceSession<F> {
    /// Create a session with nothing published yet
    pub fn new(field: F) -> Self {
        Self::with_shared_field(Arc::new(field))
    }

    /// Create a session around a field shared with other owners
    pub fn with_shared_field(field: Arc<F>) -> Self {
        Self {
            field,
            latest: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// The last published surface, if any
    pub fn current(&self) -> Option<Arc<Surface>> {
        match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Generation of the most recent request, published or not
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Abandon every in-flight rebuild without starting a new one
    pub fn supersede(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Build a surface for `config` and publish it unless a newer request arrived.
    ///
    /// On any error the previously published surface stays in place.
    pub fn rebuild(&self, config: GridConfig) -> Result<Arc<Surface>> {
        let generation = self.supersede();
        let superseded = || self.latest.load(Ordering::Acquire) != generation;

        let grid = match Grid::build_with_cancel(config, self.field.as_ref(), &superseded) {
            Ok(grid) => grid,
            Err(e) => {
                if e.is_cancelled() {
                    tracing::debug!(generation, "rebuild superseded while sampling");
                }
                return Err(e);
            }
        };

        let surface = Arc::new(Surface {
            generation,
            soup: grid.triangle_soup(),
            config: grid.config().clone(),
        });

        let mut current = self
            .current
            .write()
            .map_err(|_| Error::Algorithm("surface lock poisoned".to_string()))?;
        // Checked under the lock so an older build can never replace a newer one
        if superseded() {
            tracing::debug!(generation, "rebuild superseded before publishing");
            return Err(Error::Cancelled);
        }
        *current = Some(Arc::clone(&surface));
        drop(current);

        tracing::info!(
            generation,
            triangles = surface.soup.triangle_count(),
            "published surface"
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::ConstantField;

    #[test]
    fn test_new_session_is_empty() {
        let session = SurfaceSession::new(ConstantField(0.0));
        assert!(session.current().is_none());
        assert_eq!(session.latest_generation(), 0);
    }

    #[test]
    fn test_rebuild_publishes() {
        let session = SurfaceSession::new(|_x: f64, y: f64, _z: f64| y);
        let config = GridConfig::new(2, 2, 2).with_resolution(1.0).with_threshold(0.25);
        let surface = session.rebuild(config.clone()).unwrap();
        assert_eq!(surface.generation, 1);
        assert_eq!(surface.soup.triangle_count(), 8);

        let current = session.current().unwrap();
        assert!(Arc::ptr_eq(&current, &surface));
        assert_eq!(current.config, config);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_surface() {
        let session = SurfaceSession::new(ConstantField(0.0));
        let first = session.rebuild(GridConfig::new(1, 1, 1)).unwrap();

        let result = session.rebuild(GridConfig::new(0, 1, 1));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let current = session.current().unwrap();
        assert!(Arc::ptr_eq(&current, &first));
        assert_eq!(session.latest_generation(), 2);
    }

    #[test]
    fn test_replaced_surface_stays_usable() {
        let session = SurfaceSession::new(|_x: f64, y: f64, _z: f64| y);
        let config = GridConfig::new(2, 2, 2).with_resolution(1.0);
        let old = session.rebuild(config.clone().with_threshold(0.25)).unwrap();
        let new = session.rebuild(config.with_threshold(5.0)).unwrap();
        assert_eq!(old.soup.triangle_count(), 8);
        assert!(new.soup.is_empty());
        assert_eq!(session.current().unwrap().generation, 2);
    }
}

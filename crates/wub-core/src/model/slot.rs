//! Hot-swappable model reference
//!
//! Generators read the current model once per lock; a background load
//! replaces it wholesale. Readers clone the inner `Arc` under a short read
//! lock, so a swap never tears and in-flight inference keeps the model it
//! started with.

use super::LoadedModel;
use log::info;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "async-load")]
use crate::error::ModelLoadError;
#[cfg(feature = "async-load")]
use log::warn;
#[cfg(feature = "async-load")]
use std::future::Future;

/// Shared, atomically replaceable `Option<Arc<LoadedModel>>`
///
/// Cloning a slot yields another handle to the same cell.
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    inner: Arc<RwLock<Option<Arc<LoadedModel>>>>,
}

impl ModelSlot {
    /// Slot with no model (generators use uniform fallback)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: LoadedModel) -> Self {
        let slot = Self::empty();
        slot.install(model);
        slot
    }

    /// Snapshot of the current model
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Replace the model, returning the previous one
    pub fn install(&self, model: LoadedModel) -> Option<Arc<LoadedModel>> {
        self.install_arc(Arc::new(model))
    }

    /// Replace the model with an already shared one
    pub fn install_arc(&self, model: Arc<LoadedModel>) -> Option<Arc<LoadedModel>> {
        info!("installing model ({})", model.summary());
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(model)
    }

    /// Drop the current model
    pub fn clear(&self) -> Option<Arc<LoadedModel>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Install the model produced by `load` once it resolves
    ///
    /// Fire-and-forget: the slot is untouched until the future completes, and a
    /// failed load only logs a warning, leaving generators on whatever model
    /// (possibly none) they had. Must be called inside a tokio runtime.
    #[cfg(feature = "async-load")]
    pub fn resolve_with<F>(&self, load: F) -> tokio::task::JoinHandle<Result<(), ModelLoadError>>
    where
        F: Future<Output = Result<LoadedModel, ModelLoadError>> + Send + 'static,
    {
        let slot = self.clone();
        tokio::spawn(async move {
            match load.await {
                Ok(model) => {
                    slot.install(model);
                    Ok(())
                }
                Err(e) => {
                    warn!("model load failed, keeping fallback sampling: {e}");
                    Err(e)
                }
            }
        })
    }

    /// [`ModelSlot::resolve_with`], awaited
    ///
    /// A panicked or cancelled load task is reported as [`ModelLoadError::Task`].
    #[cfg(feature = "async-load")]
    pub async fn resolve<F>(&self, load: F) -> Result<(), ModelLoadError>
    where
        F: Future<Output = Result<LoadedModel, ModelLoadError>> + Send + 'static,
    {
        self.resolve_with(load)
            .await
            .map_err(|e| ModelLoadError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArchitectureJson, ModelPayload};
    use crate::types::PieceKind;
    use std::collections::HashMap;

    fn tiny_model(num_outputs: usize) -> LoadedModel {
        LoadedModel::from_payload(ModelPayload {
            schema: None,
            model: ArchitectureJson {
                input_channels: 1,
                conv_channels: vec![1],
                mlp_hidden: 1,
                extra_features: 0,
                num_outputs,
            },
            params: HashMap::new(),
            pieces: Some(
                PieceKind::ALL[..num_outputs]
                    .iter()
                    .map(|p| p.letter().to_string())
                    .collect(),
            ),
            board_channels: None,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_slot() {
        let slot = ModelSlot::empty();
        assert!(!slot.is_loaded());
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_install_is_shared_between_clones() {
        let slot = ModelSlot::empty();
        let other = slot.clone();
        assert!(slot.install(tiny_model(7)).is_none());
        assert!(other.is_loaded());

        let previous = other.install(tiny_model(2)).unwrap();
        assert_eq!(previous.architecture().num_outputs, 7);
        assert_eq!(slot.current().unwrap().architecture().num_outputs, 2);

        assert!(slot.clear().is_some());
        assert!(!other.is_loaded());
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let slot = ModelSlot::with_model(tiny_model(7));
        let snapshot = slot.current().unwrap();
        slot.install(tiny_model(3));
        assert_eq!(snapshot.architecture().num_outputs, 7);
    }

    #[cfg(feature = "async-load")]
    #[tokio::test]
    async fn test_resolve_with_installs_model() {
        let slot = ModelSlot::empty();
        let handle = slot.resolve_with(async { Ok(tiny_model(7)) });
        handle.await.unwrap().unwrap();
        assert!(slot.is_loaded());
    }

    #[cfg(feature = "async-load")]
    #[tokio::test]
    async fn test_resolve_with_failure_keeps_previous() {
        let slot = ModelSlot::with_model(tiny_model(5));
        let handle = slot.resolve_with(async {
            Err(ModelLoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "model.json",
            )))
        });
        assert!(handle.await.unwrap().is_err());
        assert_eq!(slot.current().unwrap().architecture().num_outputs, 5);
    }

    #[cfg(feature = "async-load")]
    async fn exploding_load() -> Result<LoadedModel, ModelLoadError> {
        panic!("loader exploded")
    }

    #[cfg(feature = "async-load")]
    #[tokio::test]
    async fn test_resolve_reports_panicked_task() {
        let slot = ModelSlot::empty();
        let result = slot.resolve(exploding_load()).await;
        assert!(matches!(result, Err(ModelLoadError::Task(_))));
        assert!(!slot.is_loaded());

        slot.resolve(async { Ok(tiny_model(4)) }).await.unwrap();
        assert!(slot.is_loaded());
    }
}

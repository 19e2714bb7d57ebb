use std::sync::Arc;

use nutri_core::dataset::default_foods;
use nutri_core::model::{FoodDraft, FoodRecord};
use storage::repository::{FoodRepository, StorageError};

use crate::error::CatalogError;

/// Loads, extends and replaces the food catalog.
#[derive(Clone)]
pub struct CatalogService {
    foods: Arc<dyn FoodRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(foods: Arc<dyn FoodRepository>) -> Self {
        Self { foods }
    }

    /// Load the stored catalog.
    ///
    /// A missing, empty or corrupt stored catalog is replaced by the bundled
    /// dataset, which is persisted before returning.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the backend is unavailable.
    pub async fn load(&self) -> Result<Vec<FoodRecord>, CatalogError> {
        match self.foods.load_foods().await {
            Ok(Some(foods)) if !foods.is_empty() => return Ok(foods),
            Ok(_) => {}
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("stored catalog is corrupt, reseeding: {err}");
            }
            Err(err) => return Err(err.into()),
        }

        let foods = default_foods()?;
        self.foods.save_foods(&foods).await?;
        tracing::info!(count = foods.len(), "seeded catalog from bundled dataset");
        Ok(foods)
    }

    /// Validate `draft` and append it to the catalog.
    ///
    /// Duplicate names are allowed. Returns the updated catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Food` if the draft is invalid; nothing is written.
    /// Returns `CatalogError::Storage` if persistence fails.
    pub async fn append(&self, draft: FoodDraft) -> Result<Vec<FoodRecord>, CatalogError> {
        let record = draft.validate()?;
        let mut foods = self.load().await?;
        foods.push(record);
        self.foods.save_foods(&foods).await?;
        Ok(foods)
    }

    /// Overwrite the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if persistence fails.
    pub async fn replace(&self, foods: Vec<FoodRecord>) -> Result<(), CatalogError> {
        self.foods.save_foods(&foods).await?;
        tracing::info!(count = foods.len(), "catalog replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryRepository, KeyValueStore, StorageKey};

    fn draft(name: &str) -> FoodDraft {
        FoodDraft {
            name: name.into(),
            serving: "1 slice".into(),
            calories: 80.0,
            protein: 4.0,
            carbs: 14.0,
            fat: 1.0,
            fiber: 2.0,
            ..FoodDraft::default()
        }
    }

    #[tokio::test]
    async fn load_seeds_bundled_dataset_once() {
        let repo = InMemoryRepository::new();
        let service = CatalogService::new(Arc::new(repo.clone()));

        let foods = service.load().await.unwrap();
        assert_eq!(foods, default_foods().unwrap());
        assert!(repo.get(StorageKey::Foods.as_str()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn load_recovers_from_corrupt_catalog() {
        let repo = InMemoryRepository::new();
        repo.put(StorageKey::Foods.as_str(), "{broken".into())
            .await
            .unwrap();
        let service = CatalogService::new(Arc::new(repo));

        let foods = service.load().await.unwrap();
        assert!(!foods.is_empty());
    }

    #[tokio::test]
    async fn append_validates_then_persists() {
        let repo = InMemoryRepository::new();
        let service = CatalogService::new(Arc::new(repo.clone()));
        service.replace(vec![]).await.unwrap();

        let mut bad = draft("Toast");
        bad.protein = f64::NAN;
        assert!(matches!(
            service.append(bad).await,
            Err(CatalogError::Food(_))
        ));

        service.replace(vec![draft("Rye").validate().unwrap()]).await.unwrap();
        let foods = service.append(draft("Rye")).await.unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[1].category(), "misc");
        assert_eq!(repo.load_foods().await.unwrap().unwrap().len(), 2);
    }
}

//! In-memory petition repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use slug::slugify;
use tokio::sync::RwLock;

use super::{
    Category, NewPetition, Petition, PetitionQuery, PetitionRepository, PetitionStatus,
    RepoError, RepoResult, Signature,
};

#[derive(Debug, Default)]
struct Tables {
    petitions: BTreeMap<u64, Petition>,
    categories: BTreeMap<u64, Category>,
    signatures: BTreeMap<u64, Signature>,
    next_petition_id: u64,
    next_signature_id: u64,
}

impl Tables {
    fn unique_slug(&self, title: &str) -> String {
        let base = match slugify(title) {
            s if s.is_empty() => "petition".to_string(),
            s => s,
        };

        let taken = |candidate: &str| self.petitions.values().any(|p| p.slug == candidate);
        if !taken(base.as_str()) {
            return base;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !taken(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }
}

// == Memory Repository ==
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with the given category names (ids from 1).
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = Tables::default();
        for (index, name) in names.into_iter().enumerate() {
            let id = index as u64 + 1;
            tables.categories.insert(
                id,
                Category {
                    id,
                    name: name.into(),
                },
            );
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn petition_not_found(key: impl ToString) -> RepoError {
    RepoError::NotFound {
        entity: "Petition",
        key: key.to_string(),
    }
}

#[async_trait]
impl PetitionRepository for MemoryRepository {
    async fn list_petitions(&self, query: &PetitionQuery) -> RepoResult<Vec<Petition>> {
        let tables = self.tables.read().await;
        Ok(tables
            .petitions
            .values()
            .rev()
            .filter(|p| query.status.map_or(true, |status| p.status == status))
            .filter(|p| query.category_id.map_or(true, |id| p.category_id == Some(id)))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn petition_by_id(&self, id: u64) -> RepoResult<Petition> {
        let tables = self.tables.read().await;
        tables
            .petitions
            .get(&id)
            .cloned()
            .ok_or_else(|| petition_not_found(id))
    }

    async fn petition_by_slug(&self, slug: &str) -> RepoResult<Petition> {
        let tables = self.tables.read().await;
        tables
            .petitions
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| petition_not_found(slug))
    }

    async fn create_petition(&self, new: NewPetition) -> RepoResult<Petition> {
        let mut tables = self.tables.write().await;

        if let Some(category_id) = new.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(RepoError::Invalid(format!(
                    "Unknown category: {}",
                    category_id
                )));
            }
        }

        tables.next_petition_id += 1;
        let petition = Petition {
            id: tables.next_petition_id,
            slug: tables.unique_slug(&new.title),
            title: new.title,
            description: new.description,
            category_id: new.category_id,
            status: PetitionStatus::Draft,
            signature_count: 0,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        tables.petitions.insert(petition.id, petition.clone());
        Ok(petition)
    }

    async fn publish_petition(&self, id: u64) -> RepoResult<Petition> {
        let mut tables = self.tables.write().await;
        let petition = tables
            .petitions
            .get_mut(&id)
            .ok_or_else(|| petition_not_found(id))?;

        match petition.status {
            PetitionStatus::Draft => {
                petition.status = PetitionStatus::Active;
                Ok(petition.clone())
            }
            PetitionStatus::Active => Err(RepoError::Duplicate(format!(
                "Petition {} is already published",
                id
            ))),
            PetitionStatus::Closed => Err(RepoError::Invalid(format!(
                "Petition {} is closed",
                id
            ))),
        }
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn signatures_for_user(&self, user_id: &str) -> RepoResult<Vec<Signature>> {
        let tables = self.tables.read().await;
        Ok(tables
            .signatures
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_signature(&self, petition_id: u64, user_id: &str) -> RepoResult<Signature> {
        let mut tables = self.tables.write().await;

        let status = tables
            .petitions
            .get(&petition_id)
            .map(|p| p.status)
            .ok_or_else(|| petition_not_found(petition_id))?;
        if status != PetitionStatus::Active {
            return Err(RepoError::Invalid(format!(
                "Petition {} is not open for signatures",
                petition_id
            )));
        }

        let already_signed = tables
            .signatures
            .values()
            .any(|s| s.petition_id == petition_id && s.user_id == user_id);
        if already_signed {
            return Err(RepoError::Duplicate(
                "You have already signed this petition".to_string(),
            ));
        }

        tables.next_signature_id += 1;
        let signature = Signature {
            id: tables.next_signature_id,
            petition_id,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        tables.signatures.insert(signature.id, signature.clone());
        if let Some(petition) = tables.petitions.get_mut(&petition_id) {
            petition.signature_count += 1;
        }
        Ok(signature)
    }
}

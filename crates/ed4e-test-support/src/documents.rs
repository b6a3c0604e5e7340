//! Test resolvers — `DocumentResolver` implementations for error paths.

use async_trait::async_trait;
use ed4e_core::document::{
    AbilitySnapshot, ActorSnapshot, DocumentResolver, GrimoireSnapshot, SpellSnapshot,
    WeaponSnapshot,
};
use ed4e_core::error::DomainError;
use uuid::Uuid;

/// A resolver whose every lookup fails with an infrastructure error, as a
/// host would when its document store is unreachable.
#[derive(Debug)]
pub struct FailingDocuments;

fn unavailable() -> DomainError {
    DomainError::Infrastructure("document store unavailable".into())
}

#[async_trait]
impl DocumentResolver for FailingDocuments {
    async fn actor(&self, _id: Uuid) -> Result<Option<ActorSnapshot>, DomainError> {
        Err(unavailable())
    }

    async fn ability(&self, _id: Uuid) -> Result<Option<AbilitySnapshot>, DomainError> {
        Err(unavailable())
    }

    async fn weapon(&self, _id: Uuid) -> Result<Option<WeaponSnapshot>, DomainError> {
        Err(unavailable())
    }

    async fn spell(&self, _id: Uuid) -> Result<Option<SpellSnapshot>, DomainError> {
        Err(unavailable())
    }

    async fn grimoire(&self, _id: Uuid) -> Result<Option<GrimoireSnapshot>, DomainError> {
        Err(unavailable())
    }
}

//! Per-run memoization of section codes and teacher names.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::api::CanvasClient;
use crate::api::types::{EnrollmentType, SectionWithEnrollments};
use crate::error::{CanvasError, Result};

type Slot = Arc<OnceCell<Arc<SectionWithEnrollments>>>;

/// Section id to resolved `(code, teachers)`.
///
/// Each key is resolved at most once. Concurrent callers for the same key
/// wait on the first resolver. A failed resolution leaves the key empty so
/// a later call tries again.
#[derive(Debug, Default)]
pub struct SectionCache {
    entries: DashMap<u64, Slot>,
}

impl SectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `section_id`, resolving it on a miss.
    pub async fn resolve(
        &self,
        client: &CanvasClient,
        section_id: u64,
    ) -> Result<Arc<SectionWithEnrollments>> {
        // Clone the slot out so the map shard lock is not held across awaits.
        let slot: Slot = Arc::clone(self.entries.entry(section_id).or_default().value());

        slot.get_or_try_init(|| async {
            debug!(section_id, "Resolving section");
            resolve_section(client, section_id)
                .await
                .map(Arc::new)
                .map_err(|e| CanvasError::resolution(section_id, e))
        })
        .await
        .map(Arc::clone)
    }

    /// Cached entry, if already resolved.
    pub fn get(&self, section_id: u64) -> Option<Arc<SectionWithEnrollments>> {
        self.entries
            .get(&section_id)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn resolve_section(client: &CanvasClient, section_id: u64) -> Result<SectionWithEnrollments> {
    let enrollments = client
        .get_enrollments_by_section(section_id, &[EnrollmentType::Teacher])
        .await?;

    let Some(first) = enrollments.first() else {
        let section = client.get_section(section_id).await?;
        let code = non_empty(section.sis_section_id).unwrap_or(section.name);
        return Ok(SectionWithEnrollments {
            id: section_id,
            code,
            teachers: Vec::new(),
        });
    };

    let code = match non_empty(first.sis_section_id.clone()) {
        Some(code) => code,
        None => client.get_section(section_id).await?.name,
    };
    let teachers = enrollments.into_iter().map(|e| e.user.name).collect();

    Ok(SectionWithEnrollments {
        id: section_id,
        code,
        teachers,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

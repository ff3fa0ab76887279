//! Entity discovery grouped by domain.

use serde::Serialize;

use super::event::entity_domain;

/// Entity ids grouped by domain.
///
/// Domains keep the order in which they were first seen and entities keep
/// their input order within a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCatalog {
    domains: Vec<(String, Vec<String>)>,
}

impl EntityCatalog {
    /// Group entity ids by the prefix before their first `.`.
    pub fn build<I, S>(entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for entity in entity_ids {
            catalog.insert(entity.into());
        }
        catalog
    }

    fn insert(&mut self, entity: String) {
        let domain = entity_domain(&entity);
        match self.domains.iter_mut().find(|(name, _)| name == domain) {
            Some((_, entities)) => entities.push(entity),
            None => self.domains.push((domain.to_string(), vec![entity])),
        }
    }

    /// Domain names in first-seen order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|(name, _)| name.as_str())
    }

    /// Entities of one domain, empty if the domain is unknown.
    #[must_use]
    pub fn entities(&self, domain: &str) -> &[String] {
        self.domains
            .iter()
            .find(|(name, _)| name == domain)
            .map_or(&[], |(_, entities)| entities.as_slice())
    }

    /// Iterate `(domain, entities)` groups.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.domains
            .iter()
            .map(|(name, entities)| (name.as_str(), entities.as_slice()))
    }

    /// Total number of entities across all domains.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.domains.iter().map(|(_, entities)| entities.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

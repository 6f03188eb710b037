//! choice/registry.rs
//! Family-scoped table of type-choice variants.
//!
//! Design notes:
//! - Registration is self-describing: the factory is probed with "no value"
//!   and the zero value reports its own type tag.
//! - A registration is checked completely before anything is inserted, so a
//!   failed attempt leaves the table untouched.
//! - Lookups take a read lock only; registration takes the write lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::choice::builtins::{BytesValue, OidValue, PlainText, UuidValue};
use crate::choice::types::{
    ChoiceError, ChoiceFactory, Discriminator, Family, RegistrationError, TypeChoiceValue,
};
use crate::constants::{tags, type_tags};

#[derive(Clone, Copy, Debug)]
struct VariantEntry {
    discriminator: Discriminator,
    factory: ChoiceFactory,
}

#[derive(Default, Debug)]
struct FamilyTable {
    by_type_tag: BTreeMap<String, VariantEntry>,
    by_discriminator: BTreeMap<Discriminator, String>,
}

impl FamilyTable {
    fn insert(&mut self, type_tag: &str, discriminator: Discriminator, factory: ChoiceFactory) {
        self.by_type_tag
            .insert(type_tag.to_string(), VariantEntry { discriminator, factory });
        self.by_discriminator.insert(discriminator, type_tag.to_string());
    }
}

/// A resolved variant: its type tag, binary discriminator and factory.
#[derive(Clone, Debug)]
pub struct ResolvedVariant {
    pub type_tag: String,
    pub discriminator: Discriminator,
    pub factory: ChoiceFactory,
}

#[derive(Default, Debug)]
pub struct TypeChoiceRegistry {
    families: RwLock<HashMap<Family, FamilyTable>>,
}

impl TypeChoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the base schema's variants.
    pub fn with_builtins() -> Self {
        let mut families: HashMap<Family, FamilyTable> = HashMap::new();

        let name = families.entry(Family::ENTITY_NAME).or_default();
        name.insert(type_tags::STRING, Discriminator::BareText, PlainText::factory);

        let class = families.entry(Family::CLASS_ID).or_default();
        class.insert(type_tags::OID, Discriminator::Tag(tags::OID), OidValue::factory);
        class.insert(type_tags::UUID, Discriminator::Tag(tags::UUID), UuidValue::factory);
        class.insert(type_tags::BYTES, Discriminator::Tag(tags::TAGGED_BYTES), BytesValue::factory);

        for family in [Family::TAG_ID, Family::CORIM_ID] {
            let t = families.entry(family).or_default();
            t.insert(type_tags::STRING, Discriminator::BareText, PlainText::factory);
            t.insert(type_tags::UUID, Discriminator::BareBytes, UuidValue::factory);
        }

        Self { families: RwLock::new(families) }
    }

    /// Call the factory with "no value" to obtain the variant's zero instance.
    pub fn probe_zero(
        family: Family,
        factory: ChoiceFactory,
    ) -> Result<Box<dyn TypeChoiceValue>, RegistrationError> {
        factory(None).map_err(|source| RegistrationError::ProbeFailed { family, source })
    }

    /// Register a variant; returns the type tag the factory reported.
    /// Callers go through `Registry::register_type`, which holds the setup
    /// lock and checks the seal.
    pub(crate) fn register(
        &self,
        family: Family,
        discriminator: Discriminator,
        factory: ChoiceFactory,
    ) -> Result<String, RegistrationError> {
        let zero = Self::probe_zero(family, factory)?;
        let type_tag = zero.type_tag().to_string();

        let mut families = self.families.write().unwrap_or_else(PoisonError::into_inner);
        let table = families.entry(family).or_default();

        if table.by_type_tag.contains_key(&type_tag) {
            return Err(RegistrationError::DuplicateTypeTag { family, type_tag });
        }
        if table.by_discriminator.contains_key(&discriminator) {
            return Err(RegistrationError::DuplicateDiscriminator { family, discriminator });
        }

        table.insert(&type_tag, discriminator, factory);
        info!(%family, %type_tag, %discriminator, "registered type-choice variant");
        Ok(type_tag)
    }

    pub fn resolve_by_type_tag(
        &self,
        family: Family,
        type_tag: &str,
    ) -> Result<ResolvedVariant, ChoiceError> {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        families
            .get(&family)
            .and_then(|t| t.by_type_tag.get(type_tag))
            .map(|e| ResolvedVariant {
                type_tag: type_tag.to_string(),
                discriminator: e.discriminator,
                factory: e.factory,
            })
            .ok_or_else(|| ChoiceError::UnknownVariant { family, key: type_tag.to_string() })
    }

    pub fn resolve_by_discriminator(
        &self,
        family: Family,
        discriminator: Discriminator,
    ) -> Result<ResolvedVariant, ChoiceError> {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        families
            .get(&family)
            .and_then(|t| {
                let type_tag = t.by_discriminator.get(&discriminator)?;
                let e = t.by_type_tag.get(type_tag)?;
                Some(ResolvedVariant {
                    type_tag: type_tag.clone(),
                    discriminator,
                    factory: e.factory,
                })
            })
            .ok_or_else(|| ChoiceError::UnknownVariant {
                family,
                key: discriminator.to_string(),
            })
    }

    /// Type tags registered in a family, sorted.
    pub fn type_tags(&self, family: Family) -> Vec<String> {
        let families = self.families.read().unwrap_or_else(PoisonError::into_inner);
        families
            .get(&family)
            .map(|t| t.by_type_tag.keys().cloned().collect())
            .unwrap_or_default()
    }
}

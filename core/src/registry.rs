//! registry.rs
//! The root registry: type-choice variants, profiles, process-wide extension
//! bindings and codec telemetry.
//!
//! Design notes:
//! - Setup registers everything, then calls `seal()`. After that every
//!   registration or binding fails with `RegistrationError::Sealed`.
//! - Registrations are serialized by one setup lock; lookups only take the
//!   read side of the individual tables.
//! - Bindings are swapped as a whole `Arc`, so codecs built earlier keep the
//!   snapshot they started with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

use tracing::info;

use crate::choice::{ChoiceFactory, Discriminator, Family, RegistrationError, TypeChoiceRegistry};
use crate::codec::Codec;
use crate::comid::Comid;
use crate::extensions::{ExtensionMap, ExtensionPoint, ExtensionShape};
use crate::profile::{Profile, ProfileId, ProfileRegistry};
use crate::telemetry::CodecTelemetry;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::with_builtins);

#[derive(Debug)]
pub struct Registry {
    types: TypeChoiceRegistry,
    profiles: ProfileRegistry,
    bindings: RwLock<Arc<ExtensionMap>>,
    telemetry: CodecTelemetry,
    setup: Mutex<()>,
    sealed: AtomicBool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::from_types(TypeChoiceRegistry::new())
    }
}

impl Registry {
    fn from_types(types: TypeChoiceRegistry) -> Self {
        Self {
            types,
            profiles: ProfileRegistry::new(),
            bindings: RwLock::new(Arc::new(ExtensionMap::new())),
            telemetry: CodecTelemetry::new(),
            setup: Mutex::new(()),
            sealed: AtomicBool::new(false),
        }
    }

    /// Empty registry: no type-choice variant is known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the base schema's variants.
    pub fn with_builtins() -> Self {
        Self::from_types(TypeChoiceRegistry::with_builtins())
    }

    /// Process-wide registry, created with the built-ins on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn codec(&self) -> Codec<'_> {
        Codec::new(self)
    }

    pub fn types(&self) -> &TypeChoiceRegistry {
        &self.types
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn telemetry(&self) -> &CodecTelemetry {
        &self.telemetry
    }

    /// Current process-wide bindings.
    pub fn bindings(&self) -> Arc<ExtensionMap> {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*bindings)
    }

    fn begin_setup(&self, action: &'static str) -> Result<std::sync::MutexGuard<'_, ()>, RegistrationError> {
        let guard = self.setup.lock().unwrap_or_else(PoisonError::into_inner);
        if self.sealed.load(Ordering::Acquire) {
            return Err(RegistrationError::Sealed { action });
        }
        Ok(guard)
    }

    /// Register a type-choice variant; returns the type tag it reported.
    pub fn register_type(
        &self,
        family: Family,
        discriminator: Discriminator,
        factory: ChoiceFactory,
    ) -> Result<String, RegistrationError> {
        let _setup = self.begin_setup("register a type-choice variant")?;
        self.types.register(family, discriminator, factory)
    }

    pub fn register_profile(&self, id: ProfileId, extensions: ExtensionMap) -> Result<(), RegistrationError> {
        let _setup = self.begin_setup("register a profile")?;
        self.profiles.register(Profile::new(id, extensions))
    }

    pub fn register_profile_with_template(
        &self,
        id: ProfileId,
        extensions: ExtensionMap,
        template: Comid,
    ) -> Result<(), RegistrationError> {
        let _setup = self.begin_setup("register a profile")?;
        self.profiles.register(Profile::new(id, extensions).with_template(template))
    }

    pub fn get_profile(&self, id: &ProfileId) -> Option<Arc<Profile>> {
        self.profiles.get(id)
    }

    /// Bind `shape` to `point` process-wide, replacing any earlier shape.
    pub fn bind(&self, point: ExtensionPoint, shape: ExtensionShape) -> Result<(), RegistrationError> {
        let _setup = self.begin_setup("bind an extension shape")?;
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = ExtensionMap::clone(&**bindings);
        next.replace(point, shape)?;
        *bindings = Arc::new(next);
        info!(point = %point.canonical(), "bound extension shape");
        Ok(())
    }

    /// Install a registered profile's shapes as the process-wide bindings.
    pub fn bind_profile(&self, id: &ProfileId) -> Result<(), RegistrationError> {
        let _setup = self.begin_setup("bind a profile")?;
        let profile = self
            .profiles
            .get(id)
            .ok_or_else(|| RegistrationError::UnknownProfile { id: id.to_string() })?;
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = ExtensionMap::clone(&**bindings);
        next.overlay(&profile.extensions());
        *bindings = Arc::new(next);
        info!(profile = %id, "bound profile shapes");
        Ok(())
    }

    /// End of setup.
    pub fn seal(&self) {
        let _setup = self.setup.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.sealed.swap(true, Ordering::AcqRel) {
            info!("registry sealed");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}

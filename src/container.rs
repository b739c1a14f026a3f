//! Auto-mocking resolution container
//!
//! A type-keyed registry that lazily builds the object graph a test
//! exercises. Every dependency seam (a trait-object type) is supplied with a
//! recording double unless a constant was pinned for it; concrete types are
//! built recursively through their [`Resolve`] factory and memoized, so
//! repeated resolution inside one test shares instances.
//!
//! There is no runtime reflection: seams declare their double through
//! [`Mockable`], and components declare their constructor through
//! [`Resolve`]. Resolution is lazy - nothing is built until first access.

use std::any::{Any, TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ResolutionError;

/// A dependency seam the container can stand a recording double in for.
///
/// Implemented for the trait-object type of the seam, naming the double and
/// the coercion from it:
///
/// ```ignore
/// impl Mockable for dyn Greeter {
///     type Double = GreeterDouble;
///     fn from_double(double: Arc<GreeterDouble>) -> Arc<dyn Greeter> {
///         double
///     }
/// }
/// ```
pub trait Mockable: Send + Sync + 'static {
    /// The capability-recording fake standing in for this seam.
    type Double: Default + Send + Sync + 'static;

    /// Coerce the double to the seam type.
    fn from_double(double: Arc<Self::Double>) -> Arc<Self>;
}

/// A concrete component the container can build.
///
/// The factory pulls each dependency from the container: constants via
/// [`AutoMocker::constant`], seams via [`AutoMocker::dep`], and nested
/// concrete types via [`AutoMocker::resolve`].
pub trait Resolve: Send + Sync + Sized + 'static {
    fn build(rig: &AutoMocker) -> Result<Self, ResolutionError>;
}

type Entry = Box<dyn Any + Send + Sync>;

/// The per-test auto-mocking container.
///
/// Owned by one test case and discarded at teardown; nothing here is shared
/// across cases.
#[derive(Default)]
pub struct AutoMocker {
    constants: Mutex<HashMap<TypeId, Entry>>,
    doubles: Mutex<HashMap<TypeId, Entry>>,
    resolved: Mutex<HashMap<TypeId, Entry>>,
    in_progress: Mutex<HashSet<TypeId>>,
}

fn lookup<T: ?Sized + Send + Sync + 'static>(map: &HashMap<TypeId, Entry>) -> Option<Arc<T>> {
    map.get(&TypeId::of::<T>())
        .and_then(|entry| entry.downcast_ref::<Arc<T>>())
        .cloned()
}

impl AutoMocker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `T` to a fixed instance, overwriting any prior registration.
    ///
    /// Must be called before the first resolution that needs `T`. Known
    /// gotcha: re-registering after a dependent type has already been
    /// resolved does not retrofit cached instances; [`AutoMocker::reset`] is
    /// the only defined way to pick a late registration up retroactively.
    pub fn set_constant<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) -> Arc<T> {
        self.constants
            .lock()
            .insert(TypeId::of::<T>(), Box::new(Arc::clone(&value)));
        value
    }

    /// The constant registered for `T`, or `MissingConstant`.
    pub fn constant<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolutionError> {
        lookup::<T>(&self.constants.lock())
            .ok_or_else(|| ResolutionError::MissingConstant(type_name::<T>()))
    }

    /// The recording double standing in for seam `D`, created on first
    /// request and memoized.
    ///
    /// Used both to pre-configure behavior before resolution and to verify
    /// interactions afterward; the instance handed to resolved components is
    /// this same one.
    pub fn substitute<D: ?Sized + Mockable>(&self) -> Arc<D::Double> {
        let mut doubles = self.doubles.lock();
        if let Some(existing) = lookup::<D::Double>(&doubles) {
            return existing;
        }
        let fresh = Arc::new(D::Double::default());
        doubles.insert(TypeId::of::<D::Double>(), Box::new(Arc::clone(&fresh)));
        fresh
    }

    /// Supply dependency seam `D`: the registered constant if one exists,
    /// otherwise the (possibly fresh) recording double.
    pub fn dep<D: ?Sized + Mockable>(&self) -> Arc<D> {
        if let Some(pinned) = lookup::<D>(&self.constants.lock()) {
            return pinned;
        }
        D::from_double(self.substitute::<D>())
    }

    /// Build (or return the memoized) instance of concrete type `T`.
    ///
    /// A constant registered for `T` wins and is returned reference-identical.
    /// Otherwise `T::build` runs once and the result is memoized for the
    /// container's lifetime. A concrete-type cycle is detected through an
    /// in-progress set and fails fast with [`ResolutionError::Cycle`] instead
    /// of recursing unboundedly.
    pub fn resolve<T: Resolve>(&self) -> Result<Arc<T>, ResolutionError> {
        let id = TypeId::of::<T>();

        if let Some(pinned) = lookup::<T>(&self.constants.lock()) {
            return Ok(pinned);
        }
        if let Some(cached) = lookup::<T>(&self.resolved.lock()) {
            return Ok(cached);
        }

        if !self.in_progress.lock().insert(id) {
            return Err(ResolutionError::Cycle(type_name::<T>()));
        }
        let built = T::build(self);
        self.in_progress.lock().remove(&id);

        let value = Arc::new(built?);
        self.resolved
            .lock()
            .insert(id, Box::new(Arc::clone(&value)));
        Ok(value)
    }

    /// Drop all memoized instances and doubles. Registered constants persist,
    /// so a late `set_constant` takes effect on the next resolution.
    pub fn reset(&self) {
        self.doubles.lock().clear();
        self.resolved.lock().clear();
        self.in_progress.lock().clear();
    }
}

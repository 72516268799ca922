//! User types as providers

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use super::Provider;

/// Implemented by types that know how to present themselves to a template.
///
/// The provider may borrow from `self`:
///
/// ```
/// use stencil::{Provider, ProviderSource};
///
/// struct User {
///     name: String,
///     roles: Vec<String>,
/// }
///
/// impl ProviderSource for User {
///     fn get_provider(&self) -> Provider<'_> {
///         Provider::map([
///             ("name", Provider::from(&self.name)),
///             ("roles", Provider::container(&self.roles)),
///         ])
///     }
/// }
/// ```
pub trait ProviderSource {
    fn get_provider(&self) -> Provider<'_>;
}

/// Acquisition through a plain function pointer
type MemberAcquire = for<'x> fn(&'x dyn Any) -> Option<Provider<'x>>;

/// Acquisition through a boxed closure
type BoxedAcquire = Box<dyn for<'x> Fn(&'x dyn Any) -> Option<Provider<'x>> + Send + Sync>;

/// Pins a closure to the higher-ranked acquisition signature
fn acquirer<F>(f: F) -> F
where
    F: for<'x> Fn(&'x dyn Any) -> Option<Provider<'x>>,
{
    f
}

fn typed<T: Any>(acquire: for<'x> fn(&'x T) -> Provider<'x>) -> BoxedAcquire {
    Box::new(acquirer(move |value| value.downcast_ref::<T>().map(acquire)))
}

fn member<T: ProviderSource + Any>(value: &dyn Any) -> Option<Provider<'_>> {
    value.downcast_ref::<T>().map(T::get_provider)
}

enum Held<'a> {
    Borrowed(&'a dyn Any),
    Owned(Box<dyn Any>),
}

/// A value whose provider is acquired when it is first looked at.
///
/// Acquisition tries, in order: a function registered for the value's type
/// in the fill's [`ProviderRegistry`], the value's own [`ProviderSource`]
/// impl, and a free function given at construction.
pub struct Delegate<'a> {
    value: Held<'a>,
    type_name: &'static str,
    member: Option<MemberAcquire>,
    free: Option<BoxedAcquire>,
}

impl<'a> Delegate<'a> {
    pub(crate) fn borrowed_source<T: ProviderSource + Any>(value: &'a T) -> Self {
        Self {
            value: Held::Borrowed(value),
            type_name: std::any::type_name::<T>(),
            member: Some(member::<T>),
            free: None,
        }
    }

    pub(crate) fn owned_source<T: ProviderSource + Any>(value: T) -> Self {
        Self {
            value: Held::Owned(Box::new(value)),
            type_name: std::any::type_name::<T>(),
            member: Some(member::<T>),
            free: None,
        }
    }

    pub(crate) fn with_acquire<T: Any>(
        value: &'a T,
        acquire: for<'x> fn(&'x T) -> Provider<'x>,
    ) -> Self {
        Self {
            value: Held::Borrowed(value),
            type_name: std::any::type_name::<T>(),
            member: None,
            free: Some(typed(acquire)),
        }
    }

    pub(crate) fn registered<T: Any>(value: &'a T) -> Self {
        Self {
            value: Held::Borrowed(value),
            type_name: std::any::type_name::<T>(),
            member: None,
            free: None,
        }
    }

    /// Name of the delegated value's type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn value(&self) -> &dyn Any {
        match &self.value {
            Held::Borrowed(value) => *value,
            Held::Owned(value) => &**value,
        }
    }

    /// Produce the provider for the held value, or `None` when no
    /// acquisition applies to its type
    pub fn acquire(&self, registry: &ProviderRegistry) -> Option<Provider<'_>> {
        let value = self.value();
        trace!(type_name = self.type_name, "acquiring delegated provider");
        registry
            .acquire(value)
            .or_else(|| self.member.and_then(|member| member(value)))
            .or_else(|| self.free.as_ref().and_then(|free| free(value)))
    }
}

impl fmt::Debug for Delegate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("type_name", &self.type_name)
            .field("member", &self.member.is_some())
            .field("free", &self.free.is_some())
            .finish()
    }
}

/// Acquisition functions keyed by value type. Registered functions take
/// priority over a type's own [`ProviderSource`] impl, so one type can be
/// presented differently by different registries.
#[derive(Default)]
pub struct ProviderRegistry {
    acquirers: HashMap<TypeId, BoxedAcquire>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the acquisition function for `T`
    pub fn register<T: Any>(&mut self, acquire: for<'x> fn(&'x T) -> Provider<'x>) -> &mut Self {
        self.acquirers.insert(TypeId::of::<T>(), typed(acquire));
        self
    }

    /// Builder form of [`ProviderRegistry::register`]
    pub fn with<T: Any>(mut self, acquire: for<'x> fn(&'x T) -> Provider<'x>) -> Self {
        self.register(acquire);
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.acquirers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.acquirers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquirers.is_empty()
    }

    fn acquire<'x>(&self, value: &'x dyn Any) -> Option<Provider<'x>> {
        self.acquirers
            .get(&Any::type_id(value))
            .and_then(|acquire| acquire(value))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("types", &self.acquirers.len())
            .finish()
    }
}

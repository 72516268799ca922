//! Value providers
//!
//! A [`Provider`] adapts caller data into something a template can fill
//! from. Strings become literals, sequences become containers, maps become
//! named lookups, and user types take part by implementing
//! [`ProviderSource`] or by registering an acquisition function in a
//! [`ProviderRegistry`].
//!
//! ```
//! use stencil::{Provider, Template, TemplateRegistry};
//!
//! let data = Provider::map([
//!     ("title", Provider::literal("Groceries")),
//!     ("items", Provider::from(vec!["eggs", "milk"])),
//! ]);
//! let template = Template::new("{{title}}: {{items%, |!{{}}}}");
//! let text = template.fill(data, &TemplateRegistry::new()).unwrap();
//! assert_eq!(text, "Groceries: eggs, milk");
//! ```

mod delegate;
mod resolve;

pub use delegate::{Delegate, ProviderRegistry, ProviderSource};

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Longest literal excerpt shown by [`Provider::describe`]
const DESCRIBE_LIMIT: usize = 40;

/// A source of substitution values
pub enum Provider<'a> {
    /// Produces its text regardless of the name asked for
    Literal(Cow<'a, str>),
    /// Produces a provider on every resolution
    Callback(Box<dyn Fn() -> Provider<'static> + 'a>),
    /// Resolves names by key
    Map(BTreeMap<String, Provider<'a>>),
    /// Fills a member template once per element
    Container(Vec<Provider<'a>>),
    /// Forwards to another provider
    Indirection(Pointee<'a>),
    /// Acquires its provider from a user value when first needed
    Delegating(Delegate<'a>),
}

/// Target of a [`Provider::Indirection`]
pub enum Pointee<'a> {
    Borrowed(&'a Provider<'a>),
    Boxed(Box<Provider<'a>>),
    Shared(Rc<Provider<'a>>),
}

impl<'a> Pointee<'a> {
    pub fn get(&self) -> &Provider<'a> {
        match self {
            Pointee::Borrowed(provider) => provider,
            Pointee::Boxed(provider) => provider,
            Pointee::Shared(provider) => provider,
        }
    }
}

impl<'a> Provider<'a> {
    /// The empty literal
    pub fn empty() -> Self {
        Provider::Literal(Cow::Borrowed(""))
    }

    pub fn literal(text: impl Into<Cow<'a, str>>) -> Self {
        Provider::Literal(text.into())
    }

    /// Literal from anything with a `Display` form
    pub fn display(value: impl fmt::Display) -> Self {
        Provider::Literal(Cow::Owned(value.to_string()))
    }

    /// Provider computed anew for every lookup. The result must own its
    /// data; borrowed data is better exposed through [`Provider::delegate`].
    pub fn callback<F, P>(callback: F) -> Self
    where
        F: Fn() -> P + 'a,
        P: Into<Provider<'static>>,
    {
        Provider::Callback(Box::new(move || callback().into()))
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Provider<'a>>,
    {
        Provider::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn container<V>(items: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Provider<'a>>,
    {
        Provider::Container(items.into_iter().map(Into::into).collect())
    }

    /// Container delegating to each element of a slice
    pub fn each<T: ProviderSource + Any>(items: &'a [T]) -> Self {
        Provider::Container(items.iter().map(Provider::delegate).collect())
    }

    pub fn borrowed(provider: &'a Provider<'a>) -> Self {
        Provider::Indirection(Pointee::Borrowed(provider))
    }

    pub fn boxed(provider: Provider<'a>) -> Self {
        Provider::Indirection(Pointee::Boxed(Box::new(provider)))
    }

    pub fn shared(provider: Rc<Provider<'a>>) -> Self {
        Provider::Indirection(Pointee::Shared(provider))
    }

    /// Delegate to a borrowed [`ProviderSource`]
    pub fn delegate<T: ProviderSource + Any>(value: &'a T) -> Self {
        Provider::Delegating(Delegate::borrowed_source(value))
    }

    /// Delegate to an owned [`ProviderSource`]
    pub fn delegate_owned<T: ProviderSource + Any>(value: T) -> Self {
        Provider::Delegating(Delegate::owned_source(value))
    }

    /// Delegate to a value through a free acquisition function
    pub fn delegate_with<T: Any>(value: &'a T, acquire: for<'x> fn(&'x T) -> Provider<'x>) -> Self {
        Provider::Delegating(Delegate::with_acquire(value, acquire))
    }

    /// Delegate to a value whose provider comes from the fill's
    /// [`ProviderRegistry`]
    pub fn registered<T: Any>(value: &'a T) -> Self {
        Provider::Delegating(Delegate::registered(value))
    }

    /// Whether the provider answers lookups by name
    pub fn supports_named_lookup(&self) -> bool {
        match self {
            Provider::Literal(_) | Provider::Map(_) | Provider::Delegating(_) => true,
            Provider::Indirection(pointee) => pointee.get().supports_named_lookup(),
            Provider::Callback(_) | Provider::Container(_) => false,
        }
    }

    /// Short human readable summary used in error messages
    pub fn describe(&self) -> String {
        match self {
            Provider::Literal(text) => {
                let mut excerpt: String = text.chars().take(DESCRIBE_LIMIT).collect();
                if excerpt.len() < text.len() {
                    excerpt.push_str("...");
                }
                format!("literal {:?}", excerpt)
            }
            Provider::Callback(_) => "callback".to_string(),
            Provider::Map(entries) => format!(
                "map with keys: {}",
                entries.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
            ),
            Provider::Container(items) => format!("container of {} elements", items.len()),
            Provider::Indirection(pointee) => format!("indirection to {}", pointee.get().describe()),
            Provider::Delegating(delegate) => format!("delegate for {}", delegate.type_name()),
        }
    }
}

impl Default for Provider<'_> {
    fn default() -> Self {
        Provider::empty()
    }
}

impl fmt::Debug for Provider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Provider::Callback(_) => f.write_str("Callback(..)"),
            Provider::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Provider::Container(items) => f.debug_tuple("Container").field(items).finish(),
            Provider::Indirection(pointee) => {
                f.debug_tuple("Indirection").field(pointee.get()).finish()
            }
            Provider::Delegating(delegate) => f.debug_tuple("Delegating").field(delegate).finish(),
        }
    }
}

impl<'a> From<&'a str> for Provider<'a> {
    fn from(text: &'a str) -> Self {
        Provider::Literal(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Provider<'a> {
    fn from(text: &'a String) -> Self {
        Provider::Literal(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Provider<'_> {
    fn from(text: String) -> Self {
        Provider::Literal(Cow::Owned(text))
    }
}

impl<'a> From<Cow<'a, str>> for Provider<'a> {
    fn from(text: Cow<'a, str>) -> Self {
        Provider::Literal(text)
    }
}

macro_rules! display_providers {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Provider<'_> {
                fn from(value: $ty) -> Self {
                    Provider::display(value)
                }
            }
        )*
    };
}

display_providers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);

impl<'a, T: Into<Provider<'a>>> From<Vec<T>> for Provider<'a> {
    fn from(items: Vec<T>) -> Self {
        Provider::container(items)
    }
}

impl<'a, K: Into<String>, V: Into<Provider<'a>>> From<BTreeMap<K, V>> for Provider<'a> {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Provider::map(entries)
    }
}

impl<'a, K: Into<String>, V: Into<Provider<'a>>, S> From<HashMap<K, V, S>> for Provider<'a> {
    fn from(entries: HashMap<K, V, S>) -> Self {
        Provider::map(entries)
    }
}

/// A single name and its value
impl<'a, K: Into<String>, V: Into<Provider<'a>>> From<(K, V)> for Provider<'a> {
    fn from((key, value): (K, V)) -> Self {
        Provider::map([(key, value)])
    }
}

/// `None` fills as the empty string
impl<'a, T: Into<Provider<'a>>> From<Option<T>> for Provider<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Provider::empty, Into::into)
    }
}

impl<'a> From<&'a Provider<'a>> for Provider<'a> {
    fn from(provider: &'a Provider<'a>) -> Self {
        Provider::borrowed(provider)
    }
}

impl<'a> From<Box<Provider<'a>>> for Provider<'a> {
    fn from(provider: Box<Provider<'a>>) -> Self {
        Provider::Indirection(Pointee::Boxed(provider))
    }
}

impl<'a> From<Rc<Provider<'a>>> for Provider<'a> {
    fn from(provider: Rc<Provider<'a>>) -> Self {
        Provider::shared(provider)
    }
}

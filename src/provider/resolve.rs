//! Provider resolution rules

use super::Provider;
use crate::error::FillError;
use crate::template::fill::{fill_nested, ProviderStack, SubstitutionState};

impl Provider<'_> {
    /// Produce the text for `state`. A provider that does not have the
    /// name is an error.
    pub(crate) fn resolve(
        &self,
        state: &SubstitutionState<'_>,
        stack: &ProviderStack<'_>,
    ) -> Result<String, FillError> {
        self.lookup(state, stack)?
            .ok_or_else(|| state.missing_name(self))
    }

    /// Produce the text for `state`, or `None` when this provider does not
    /// have the name so that an enclosing provider can be asked instead.
    /// Callbacks and acquisitions run at most once per call.
    ///
    /// `stack` is the frame this provider was selected from; nested
    /// templates are filled on top of it.
    pub(crate) fn lookup(
        &self,
        state: &SubstitutionState<'_>,
        stack: &ProviderStack<'_>,
    ) -> Result<Option<String>, FillError> {
        match self {
            Provider::Literal(text) => Ok(Some(text.to_string())),
            Provider::Callback(callback) => callback().lookup(state, stack),
            Provider::Map(entries) => {
                if state.name.is_empty() {
                    return match state.inline_template() {
                        Some(inline) => fill_nested(inline, self, stack, state.fill).map(Some),
                        None => Ok(None),
                    };
                }
                match entries.get(state.name) {
                    Some(value) => value.resolve(&state.consumed(), stack).map(Some),
                    None => Ok(None),
                }
            }
            Provider::Container(items) => expand(items, state, stack).map(Some),
            Provider::Indirection(pointee) => pointee.get().lookup(state, stack),
            Provider::Delegating(delegate) => {
                let inner = delegate
                    .acquire(state.fill.providers)
                    .ok_or_else(|| state.no_acquisition(delegate.type_name()))?;
                match state.inline_template() {
                    Some(inline) if state.name.is_empty() => {
                        fill_nested(inline, &inner, stack, state.fill).map(Some)
                    }
                    _ => inner.lookup(state, stack),
                }
            }
        }
    }
}

/// Fill the member template once per element, separated by the join string
fn expand(
    items: &[Provider<'_>],
    state: &SubstitutionState<'_>,
    stack: &ProviderStack<'_>,
) -> Result<String, FillError> {
    let member = state.member_template()?;
    let join = state.join();
    let substitution = state.substitution;

    let mut result = String::new();
    let mut needs_join = substitution.leading_join;
    for item in items {
        if needs_join {
            result.push_str(join);
        }
        needs_join = true;

        let filled = match member {
            Some(template) => fill_nested(template, item, stack, state.fill)?,
            None => String::new(),
        };
        // An empty element does not earn a separator after it
        if filled.is_empty() && substitution.ignore_empty {
            needs_join = false;
        }
        result.push_str(&filled);
    }
    Ok(result)
}

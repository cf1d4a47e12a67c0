use std::{collections::HashMap, fmt};

use dispatch_types::{FieldRef, FieldRules, IsEmptyValue};
use indexmap::IndexMap;
use tracing::debug;

use super::control::FormControl;

type EmptinessCheck<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;

struct Registration<S> {
    rules: FieldRules,
    is_empty: EmptinessCheck<S>,
}

/// In-memory form state manager.
///
/// Errors are re-derived on every write but only displayed once a submit has
/// been attempted, so a freshly mounted form does not open covered in
/// required-field errors.
pub struct FormStore<S> {
    value: S,
    registrations: IndexMap<&'static str, Registration<S>>,
    errors: IndexMap<&'static str, String>,
    messages: HashMap<&'static str, String>,
    default_message: String,
    submitted: bool,
}

impl<S: fmt::Debug> fmt::Debug for FormStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("value", &self.value)
            .field("fields", &self.registrations.keys().collect::<Vec<_>>())
            .field("errors", &self.errors)
            .field("submitted", &self.submitted)
            .finish()
    }
}

impl<S> FormStore<S> {
    pub fn new(value: S, default_message: impl Into<String>) -> Self {
        Self {
            value,
            registrations: IndexMap::new(),
            errors: IndexMap::new(),
            messages: HashMap::new(),
            default_message: default_message.into(),
            submitted: false,
        }
    }

    pub fn value(&self) -> &S {
        &self.value
    }

    /// Error derived for `name` regardless of whether a submit was attempted.
    pub fn pending_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registrations.keys().copied()
    }

    fn rederive(&mut self, name: &'static str) {
        let Some(registration) = self.registrations.get(name) else {
            return;
        };
        if registration.rules.required && (registration.is_empty)(&self.value) {
            let message = self
                .messages
                .get(name)
                .or(registration.rules.message.as_ref())
                .unwrap_or(&self.default_message)
                .clone();
            self.errors.insert(name, message);
        } else {
            self.errors.shift_remove(name);
        }
    }
}

impl<S: 'static> FormControl<S> for FormStore<S> {
    fn register<T>(&mut self, field: FieldRef<S, T>, rules: FieldRules)
    where
        T: IsEmptyValue + 'static,
    {
        debug!(field = field.name(), required = rules.required, "registering form field");
        self.registrations.insert(
            field.name(),
            Registration {
                rules,
                is_empty: Box::new(move |value: &S| field.get(value).is_empty_value()),
            },
        );
        self.rederive(field.name());
    }

    fn read<'a, T>(&'a self, field: &FieldRef<S, T>) -> &'a T {
        field.get(&self.value)
    }

    fn write<T>(&mut self, field: &FieldRef<S, T>, value: T) {
        field.set(&mut self.value, value);
        self.rederive(field.name());
    }

    fn error(&self, name: &str) -> Option<&str> {
        if self.submitted { self.pending_error(name) } else { None }
    }

    fn set_message(&mut self, name: &'static str, message: Option<String>) {
        match message {
            Some(message) => {
                self.messages.insert(name, message);
            }
            None => {
                self.messages.remove(name);
            }
        }
        self.rederive(name);
    }

    fn validate_all(&mut self) -> Vec<&'static str> {
        let names: Vec<&'static str> = self.registrations.keys().copied().collect();
        for name in names.iter().copied() {
            self.rederive(name);
        }
        names.into_iter().filter(|name| self.errors.contains_key(name)).collect()
    }

    fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_required(&self, name: &str) -> bool {
        self.registrations
            .get(name)
            .map(|registration| registration.rules.required)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_types::{CampaignDraft, Channel};

    fn store() -> FormStore<CampaignDraft> {
        let mut store = FormStore::new(CampaignDraft::default(), "This field is required");
        store.register(CampaignDraft::NAME, FieldRules::required());
        store.register(CampaignDraft::CHANNEL, FieldRules::required().with_message("Pick a channel"));
        store.register(CampaignDraft::TAGS, FieldRules::optional());
        store
    }

    #[test]
    fn errors_are_hidden_until_submit_is_attempted() {
        let mut store = store();
        assert_eq!(store.error("name"), None);
        assert_eq!(store.pending_error("name"), Some("This field is required"));

        store.mark_submitted();
        assert_eq!(store.error("name"), Some("This field is required"));
        assert_eq!(store.error("channel"), Some("Pick a channel"));
        assert_eq!(store.error("tags"), None);
    }

    #[test]
    fn writes_rederive_errors() {
        let mut store = store();
        store.mark_submitted();
        store.write(&CampaignDraft::CHANNEL, Some(Channel::Sms));
        assert_eq!(store.error("channel"), None);
        assert_eq!(store.read(&CampaignDraft::CHANNEL), &Some(Channel::Sms));

        store.write(&CampaignDraft::CHANNEL, None);
        assert_eq!(store.error("channel"), Some("Pick a channel"));
    }

    #[test]
    fn override_message_takes_precedence() {
        let mut store = store();
        store.mark_submitted();
        store.set_message("name", Some("Name your campaign".into()));
        assert_eq!(store.error("name"), Some("Name your campaign"));
        store.set_message("name", None);
        assert_eq!(store.error("name"), Some("This field is required"));
    }

    #[test]
    fn validate_all_lists_failing_fields_in_registration_order() {
        let mut store = store();
        assert_eq!(store.validate_all(), vec!["name", "channel"]);
        store.write(&CampaignDraft::NAME, "Launch".to_string());
        assert_eq!(store.validate_all(), vec!["channel"]);
        assert!(store.is_required("channel"));
        assert!(!store.is_required("tags"));
    }
}

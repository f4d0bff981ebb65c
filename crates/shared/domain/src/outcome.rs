//! Uniform outcome envelope returned by every resource repository.
//!
//! Expected non-success conditions (missing record, missing permission,
//! nothing to delete) are values, not errors. Callers match on the variant;
//! serialization produces the flat `{<flag>: bool, message, <resource>}`
//! envelope consumed by API clients.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::resource::ResourceKind;

/// What a repository did (or refused to do).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Viewed,
    Created,
    Updated,
    Deleted,
    Removed,
    MarkedAsRead,
    Saved,
}

impl Action {
    /// Envelope flag key
    pub fn flag(&self) -> &'static str {
        match self {
            Action::Viewed => "viewed",
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::Removed => "removed",
            Action::MarkedAsRead => "marked_as_read",
            Action::Saved => "saved",
        }
    }

    /// Imperative verb used in permission messages
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Viewed => "view",
            Action::Created => "create",
            Action::Updated => "update",
            Action::Deleted => "delete",
            Action::Removed => "remove",
            Action::MarkedAsRead => "mark as read",
            Action::Saved => "save",
        }
    }

    /// Past tense used in success messages
    pub fn past(&self) -> &'static str {
        match self {
            Action::Viewed => "viewed",
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::Removed => "removed",
            Action::MarkedAsRead => "marked as read",
            Action::Saved => "saved",
        }
    }

    fn has_flag(&self) -> bool {
        !matches!(self, Action::Viewed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    NotFound,
    Forbidden,
    NothingToDelete,
}

/// Why an operation did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub reason: RefusalReason,
    pub action: Option<Action>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The requested resource (or listing) itself
    Found(T),
    /// A resource that was just written, with its success message
    Saved {
        action: Action,
        message: String,
        key: &'static str,
        resource: T,
    },
    /// A write with nothing to return (deletes, bulk updates)
    Done { action: Action, message: String },
    Refused(Refusal),
}

impl<T> Outcome<T> {
    /// Returns the resource if present, otherwise "<Title> does not exist".
    pub fn show_existence(resource: Option<T>) -> Self
    where
        T: ResourceKind,
    {
        match resource {
            Some(resource) => Outcome::Found(resource),
            None => Outcome::not_found::<T>(None),
        }
    }

    pub fn show_created(resource: T) -> Self
    where
        T: ResourceKind,
    {
        Outcome::show_saved(resource, Action::Created)
    }

    pub fn show_updated(resource: T) -> Self
    where
        T: ResourceKind,
    {
        Outcome::show_saved(resource, Action::Updated)
    }

    pub fn show_saved(resource: T, action: Action) -> Self
    where
        T: ResourceKind,
    {
        Outcome::Saved {
            action,
            message: format!("{} {}", T::TITLE, action.past()),
            key: T::KEY,
            resource,
        }
    }

    /// "<Title> does not exist"
    pub fn not_found<K: ResourceKind>(action: Option<Action>) -> Self {
        Outcome::Refused(Refusal {
            reason: RefusalReason::NotFound,
            action,
            message: format!("{} does not exist", K::TITLE),
        })
    }

    /// "You do not have permission to <verb> <plural>"
    pub fn forbidden<K: ResourceKind>(action: Action) -> Self {
        Outcome::Refused(Refusal {
            reason: RefusalReason::Forbidden,
            action: Some(action).filter(Action::has_flag),
            message: format!("You do not have permission to {} {}", action.verb(), K::PLURAL),
        })
    }

    /// Single-resource write acknowledgement: "<Title> deleted"
    pub fn done<K: ResourceKind>(action: Action) -> Self {
        Outcome::Done {
            action,
            message: format!("{} {}", K::TITLE, action.past()),
        }
    }

    /// Bulk acknowledgement: "3 customers deleted" or "No customers deleted".
    pub fn counted<K: ResourceKind>(action: Action, count: u64) -> Self {
        if count == 0 {
            Outcome::Refused(Refusal {
                reason: RefusalReason::NothingToDelete,
                action: Some(action),
                message: format!("No {} {}", K::PLURAL, action.past()),
            })
        } else {
            Outcome::Done {
                action,
                message: format!("{} {}", K::count_label(count), action.past()),
            }
        }
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, Outcome::Refused(_))
    }

    pub fn refusal(&self) -> Option<&Refusal> {
        match self {
            Outcome::Refused(refusal) => Some(refusal),
            _ => None,
        }
    }

    /// Envelope message, if the outcome carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Found(_) => None,
            Outcome::Saved { message, .. } | Outcome::Done { message, .. } => Some(message),
            Outcome::Refused(refusal) => Some(&refusal.message),
        }
    }

    /// Borrow the carried resource
    pub fn resource(&self) -> Option<&T> {
        match self {
            Outcome::Found(resource) | Outcome::Saved { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn into_resource(self) -> Option<T> {
        match self {
            Outcome::Found(resource) | Outcome::Saved { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// Transform the carried resource, keeping envelope metadata
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(resource) => Outcome::Found(f(resource)),
            Outcome::Saved {
                action,
                message,
                key,
                resource,
            } => Outcome::Saved {
                action,
                message,
                key,
                resource: f(resource),
            },
            Outcome::Done { action, message } => Outcome::Done { action, message },
            Outcome::Refused(refusal) => Outcome::Refused(refusal),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Found(resource) => resource.serialize(serializer),
            Outcome::Saved {
                action,
                message,
                key,
                resource,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(action.flag(), &true)?;
                map.serialize_entry("message", message)?;
                map.serialize_entry(key, resource)?;
                map.end()
            }
            Outcome::Done { action, message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(action.flag(), &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            Outcome::Refused(refusal) => match refusal.action {
                Some(action) => {
                    let mut map = serializer.serialize_map(Some(2))?;
                    map.serialize_entry(action.flag(), &false)?;
                    map.serialize_entry("message", &refusal.message)?;
                    map.end()
                }
                None => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    map.serialize_entry("message", &refusal.message)?;
                    map.end()
                }
            },
        }
    }
}

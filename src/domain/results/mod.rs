//! Structured outcomes of single and batch entity mutations
//!
//! Expected outcomes (lock contention, admin-down, argument errors,
//! partial batches) are values of [`PushDataResultTypes`], never `Err`.

pub mod entities;
pub mod entity;
pub mod push_data;
pub mod push_status;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use entities::EntitiesResult;
pub use entity::EntityResult;
pub use push_data::{classify, PushDataResultTypes, PushStatusResultTypes};
pub use push_status::PushStatusResult;

/// Anything that can be the subject of an entity result
pub trait Entity {
    type Id: Clone + PartialEq + fmt::Debug + fmt::Display;

    fn id(&self) -> &Self::Id;
}

/// Mutation verb a result belongs to
pub trait Verb {
    const NAME: &'static str;
}

macro_rules! verbs {
    ($($(#[$meta:meta])* $name:ident => $label:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum $name {}

            impl Verb for $name {
                const NAME: &'static str = $label;
            }
        )+
    };
}

verbs! {
    Add => "add";
    AddOrUpdate => "addOrUpdate";
    Update => "update";
    Replace => "replace";
    Delete => "delete";
}

pub type AddEntityResult<E> = EntityResult<E, Add>;
pub type AddEntitiesResult<E> = EntitiesResult<E, Add>;
pub type AddOrUpdateEntityResult<E> = EntityResult<E, AddOrUpdate>;
pub type AddOrUpdateEntitiesResult<E> = EntitiesResult<E, AddOrUpdate>;
pub type UpdateEntityResult<E> = EntityResult<E, Update>;
pub type UpdateEntitiesResult<E> = EntitiesResult<E, Update>;
pub type ReplaceEntitiesResult<E> = EntitiesResult<E, Replace>;
pub type DeleteEntityResult<E> = EntityResult<E, Delete>;
pub type DeleteEntitiesResult<E> = EntitiesResult<E, Delete>;

/// Non-fatal remark attached to a result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warning(String);

impl Warning {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Warning {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Warning {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Newline-join the present descriptions, `None` if there are none.
pub(crate) fn join_descriptions<'a, I>(descriptions: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let parts: Vec<&str> = descriptions
        .into_iter()
        .flatten()
        .filter(|text| !text.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

//! Error type shared by the object, event, layout and display layers.

use thiserror_no_std::Error;

use crate::ui::object::ObjId;

/// Coarse classification of a failure.
///
/// `Invalid` means the request itself was refused (bad handle, locked
/// dispatcher, guard violation). `Failed` means the request was well formed
/// but could not be carried out (pool exhausted, nothing to do).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Invalid,
    Failed,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GuiError {
    #[error("Memory pool exhausted")]
    OutOfMemory,

    #[error("Object handle {0:?} no longer refers to a live object")]
    StaleObject(ObjId),

    #[error("Object is marked for deletion")]
    PendingDelete,

    #[error("A widget cannot be nested directly in a parent of the same type")]
    SameTypeNesting,

    #[error("Flex container nested in a flex container that already placed its children")]
    NestedFlex,

    #[error("Dispatcher is busy, event deferred to the next tick")]
    Locked,

    #[error("Disabled objects refuse input events")]
    DisabledInput,

    #[error("Event is already pending on this object")]
    AlreadyPending,

    #[error("No object matches the request")]
    NotFound,

    #[error("Cannot move an object into its own subtree")]
    CyclicParent,

    #[error("Screens have no parent to change")]
    NoParent,
}

impl GuiError {
    pub fn kind(&self) -> ResultKind {
        match self {
            GuiError::OutOfMemory | GuiError::AlreadyPending | GuiError::NotFound => {
                ResultKind::Failed
            }
            _ => ResultKind::Invalid,
        }
    }
}

pub type GuiResult<T> = Result<T, GuiError>;

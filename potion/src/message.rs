//! Message types and their identifiers.
//!
//! Every value dispatched through a [`Bus`](crate::Bus) is a [`Message`]. The bus routes on
//! the message's Rust type: one subscription entry per distinct type, never per instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use potion::Message;
//!
//! #[derive(Message, Debug, Clone)]
//! struct PotionBrewed {
//!     name: &'static str,
//!     doses: u32,
//! }
//!
//! assert_eq!(MessageType::of::<PotionBrewed>(), MessageType::of::<PotionBrewed>());
//! ```

use std::{
    any::{self, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// Marker trait for types that can be dispatched on a bus.
///
/// Use `#[derive(Message)]` to implement it.
///
/// # Trait Bounds
///
/// - `'static`: the bus keys its table by [`TypeId`], which requires owned data.
pub trait Message: 'static {}

/// Identifies a message type in the subscription table.
///
/// Equality and hashing only consider the Rust [`TypeId`]. The type name is kept for
/// diagnostics and error messages.
#[derive(Clone, Copy)]
pub struct MessageType {
    type_id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// The identifier of message type `M`.
    #[inline]
    pub fn of<M: Message>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: any::type_name::<M>(),
        }
    }

    /// The Rust [`TypeId`] of the message type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The fully qualified type name, as reported by [`std::any::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check if this identifies message type `M`.
    #[inline]
    pub fn is<M: Message>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.name).finish()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(crate::Message)]
    struct Heal;

    #[derive(crate::Message)]
    struct Damage {
        #[allow(dead_code)]
        amount: u32,
    }

    #[test]
    fn same_type_has_equal_identifiers() {
        // Given
        let first = MessageType::of::<Heal>();
        let second = MessageType::of::<Heal>();

        // Then
        assert_eq!(first, second);
        assert!(first.is::<Heal>());
    }

    #[test]
    fn distinct_types_have_distinct_identifiers() {
        // Given
        let heal = MessageType::of::<Heal>();
        let damage = MessageType::of::<Damage>();

        // Then
        assert_ne!(heal, damage);
        assert!(!heal.is::<Damage>());
    }

    #[test]
    fn identifiers_work_as_map_keys() {
        // Given
        let mut keys = HashSet::new();

        // When
        keys.insert(MessageType::of::<Heal>());
        keys.insert(MessageType::of::<Damage>());
        keys.insert(MessageType::of::<Heal>());

        // Then
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn display_uses_type_name() {
        // Given
        let damage = MessageType::of::<Damage>();

        // Then
        assert!(damage.to_string().ends_with("Damage"));
        assert_eq!(damage.name(), any::type_name::<Damage>());
    }
}

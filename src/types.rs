//! # Type Identity and Ancestry
//!
//! Explicit, precomputed type ancestry used by the mapping registry.
//!
//! ## Overview
//!
//! Rust has no runtime class hierarchy, so stored types describe their own
//! ancestry once through a [`TypeDescriptor`]: the superclass they extend and
//! the interfaces they declare. Classes are keyed by their concrete Rust type,
//! interfaces by a trait object type (`dyn Trait`).
//!
//! Building a descriptor flattens the ancestry into a [`LineageLevel`] list,
//! concrete type first, so resolution never has to chase pointers or
//! re-derive anything per lookup.
//!
//! ## Usage
//!
//! ```rust
//! use content_store::types::{TypeDescriptor, TypeKey};
//!
//! trait Flagged {}
//! struct Parent;
//! struct Child;
//!
//! # fn main() -> content_store::Result<()> {
//! let parent = TypeDescriptor::class::<Parent>().build()?;
//! let child = TypeDescriptor::class::<Child>()
//!     .extends(parent.clone())
//!     .implements(TypeKey::of::<dyn Flagged>())
//!     .build()?;
//!
//! assert_eq!(child.lineage().len(), 2);
//! assert_eq!(child.superclass().map(|s| s.key()), Some(parent.key()));
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StoreError};
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque identity of a class or interface.
///
/// Two keys are equal iff they denote the exact same Rust type. The type
/// name is carried for diagnostics only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for a concrete type, or for an interface when `T` is `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Whether a descriptor stands for a class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// One step of a type's superclass chain with the interfaces that class
/// declares directly, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageLevel {
    pub class: TypeKey,
    pub interfaces: Vec<TypeKey>,
}

/// Declared ancestry of a class or interface
#[derive(Debug)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    superclass: Option<Arc<TypeDescriptor>>,
    interfaces: Vec<TypeKey>,
    lineage: Vec<LineageLevel>,
}

impl TypeDescriptor {
    /// Start describing the class `T`
    pub fn class<T: 'static>() -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(TypeKey::of::<T>(), TypeKind::Class)
    }

    /// Start describing an interface; `T` is normally `dyn Trait`
    pub fn interface<T: ?Sized + 'static>() -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(TypeKey::of::<T>(), TypeKind::Interface)
    }

    /// Start describing a type whose key was obtained elsewhere
    pub fn with_key(key: TypeKey, kind: TypeKind) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(key, kind)
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    pub fn superclass(&self) -> Option<&Arc<TypeDescriptor>> {
        self.superclass.as_ref()
    }

    /// Interfaces declared directly by this type
    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    /// Superclass chain starting with this type, each level carrying the
    /// interfaces declared at that level
    pub fn lineage(&self) -> &[LineageLevel] {
        &self.lineage
    }

    /// Iterate over the superclass chain, nearest ancestor first, excluding
    /// this type
    pub fn ancestors(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.lineage.iter().skip(1).map(|level| level.class)
    }

    fn ancestors_and_self(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.lineage.iter().map(|level| level.class)
    }

    /// True if `key` is this type, one of its ancestors, or an interface
    /// declared anywhere along the chain
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.lineage
            .iter()
            .any(|level| level.class == key || level.interfaces.contains(&key))
    }
}

/// Builder for [`TypeDescriptor`]
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    key: TypeKey,
    kind: TypeKind,
    superclass: Option<Arc<TypeDescriptor>>,
    interfaces: Vec<TypeKey>,
    class_interfaces: Vec<TypeKey>,
}

impl TypeDescriptorBuilder {
    fn new(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            superclass: None,
            interfaces: Vec::new(),
            class_interfaces: Vec::new(),
        }
    }

    /// Set the direct superclass
    pub fn extends(mut self, superclass: Arc<TypeDescriptor>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Declare a directly implemented interface. Repeated declarations keep
    /// the first position.
    ///
    /// `interface` should be a trait object key, `TypeKey::of::<dyn Trait>()`.
    /// A key carries no kind, so a class key passed here is matched in the
    /// interface pass like any interface; use
    /// [`implements_interface`](Self::implements_interface) to have the kind
    /// checked.
    pub fn implements(mut self, interface: TypeKey) -> Self {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// Declare a directly implemented interface from its descriptor. A class
    /// descriptor is rejected by [`build`](Self::build).
    pub fn implements_interface(mut self, interface: &TypeDescriptor) -> Self {
        if interface.kind() == TypeKind::Class {
            self.class_interfaces.push(interface.key());
            return self;
        }
        self.implements(interface.key())
    }

    /// Validate the declaration and precompute the lineage
    pub fn build(self) -> Result<Arc<TypeDescriptor>> {
        if let Some(class) = self.class_interfaces.first() {
            return Err(StoreError::invalid_argument(format!(
                "Type {} cannot implement class {}; declare it with extends()",
                self.key, class
            )));
        }

        if let Some(superclass) = &self.superclass {
            if self.kind == TypeKind::Interface {
                return Err(StoreError::invalid_argument(format!(
                    "Interface {} cannot extend class {}",
                    self.key,
                    superclass.key()
                )));
            }
            if superclass.kind() == TypeKind::Interface {
                return Err(StoreError::invalid_argument(format!(
                    "Class {} cannot extend interface {}; declare it with implements()",
                    self.key,
                    superclass.key()
                )));
            }
            if superclass.is_assignable_to(self.key) {
                return Err(StoreError::invalid_argument(format!(
                    "Class {} appears in its own superclass chain",
                    self.key
                )));
            }
        }

        if self.interfaces.contains(&self.key) {
            return Err(StoreError::invalid_argument(format!(
                "Type {} cannot implement itself",
                self.key
            )));
        }

        if let Some(class) = self.interfaces.iter().find(|interface| {
            self.superclass
                .as_ref()
                .is_some_and(|s| s.ancestors_and_self().any(|key| key == **interface))
        }) {
            return Err(StoreError::invalid_argument(format!(
                "Type {} lists superclass {} as an interface",
                self.key, class
            )));
        }

        let mut lineage = Vec::with_capacity(
            1 + self.superclass.as_ref().map_or(0, |s| s.lineage().len()),
        );
        lineage.push(LineageLevel {
            class: self.key,
            interfaces: self.interfaces.clone(),
        });
        if let Some(superclass) = &self.superclass {
            lineage.extend(superclass.lineage().iter().cloned());
        }

        Ok(Arc::new(TypeDescriptor {
            key: self.key,
            kind: self.kind,
            superclass: self.superclass,
            interfaces: self.interfaces,
            lineage,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Flagged {}
    trait Named {}
    struct Entity;
    struct ConcreteEntity;
    struct GeneratedConcreteEntity;

    #[test]
    fn test_type_key_identity() {
        assert_eq!(TypeKey::of::<Entity>(), TypeKey::of::<Entity>());
        assert_ne!(TypeKey::of::<Entity>(), TypeKey::of::<ConcreteEntity>());
        assert_ne!(TypeKey::of::<dyn Flagged>(), TypeKey::of::<dyn Named>());
        assert!(TypeKey::of::<dyn Flagged>().name().contains("Flagged"));
    }

    #[test]
    fn test_lineage_is_concrete_first() {
        let entity = TypeDescriptor::class::<Entity>()
            .implements(TypeKey::of::<dyn Named>())
            .build()
            .unwrap();
        let concrete = TypeDescriptor::class::<ConcreteEntity>()
            .extends(entity.clone())
            .build()
            .unwrap();
        let generated = TypeDescriptor::class::<GeneratedConcreteEntity>()
            .extends(concrete.clone())
            .implements(TypeKey::of::<dyn Flagged>())
            .build()
            .unwrap();

        let classes: Vec<TypeKey> = generated.lineage().iter().map(|l| l.class).collect();
        assert_eq!(
            classes,
            vec![generated.key(), concrete.key(), entity.key()]
        );
        assert_eq!(
            generated.lineage()[0].interfaces,
            vec![TypeKey::of::<dyn Flagged>()]
        );
        assert!(generated.lineage()[1].interfaces.is_empty());
        assert_eq!(
            generated.lineage()[2].interfaces,
            vec![TypeKey::of::<dyn Named>()]
        );

        let ancestors: Vec<TypeKey> = generated.ancestors().collect();
        assert_eq!(ancestors, vec![concrete.key(), entity.key()]);
    }

    #[test]
    fn test_duplicate_interfaces_keep_first_position() {
        let descriptor = TypeDescriptor::class::<Entity>()
            .implements(TypeKey::of::<dyn Named>())
            .implements(TypeKey::of::<dyn Flagged>())
            .implements(TypeKey::of::<dyn Named>())
            .build()
            .unwrap();

        assert_eq!(
            descriptor.interfaces(),
            &[TypeKey::of::<dyn Named>(), TypeKey::of::<dyn Flagged>()]
        );
    }

    #[test]
    fn test_interface_cannot_extend() {
        let entity = TypeDescriptor::class::<Entity>().build().unwrap();
        let result = TypeDescriptor::interface::<dyn Flagged>()
            .extends(entity)
            .build();
        assert!(matches!(result, Err(StoreError::InvalidArgument { .. })));
    }

    #[test]
    fn test_class_cannot_extend_interface() {
        let flagged = TypeDescriptor::interface::<dyn Flagged>().build().unwrap();
        let result = TypeDescriptor::class::<Entity>().extends(flagged).build();
        assert!(matches!(result, Err(StoreError::InvalidArgument { .. })));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let entity = TypeDescriptor::class::<Entity>().build().unwrap();
        let result = TypeDescriptor::class::<Entity>().extends(entity).build();
        assert!(matches!(result, Err(StoreError::InvalidArgument { .. })));
    }

    #[test]
    fn test_superclass_listed_as_interface_is_rejected() {
        let entity = TypeDescriptor::class::<Entity>().build().unwrap();
        let result = TypeDescriptor::class::<ConcreteEntity>()
            .extends(entity)
            .implements(TypeKey::of::<Entity>())
            .build();
        assert!(matches!(result, Err(StoreError::InvalidArgument { .. })));
    }

    #[test]
    fn test_implements_interface_checks_kind() {
        let named = TypeDescriptor::interface::<dyn Named>().build().unwrap();
        let descriptor = TypeDescriptor::class::<ConcreteEntity>()
            .implements_interface(&named)
            .build()
            .unwrap();
        assert_eq!(descriptor.interfaces(), &[TypeKey::of::<dyn Named>()]);

        let entity = TypeDescriptor::class::<Entity>().build().unwrap();
        let result = TypeDescriptor::class::<ConcreteEntity>()
            .implements_interface(&named)
            .implements_interface(&entity)
            .build();
        match result {
            Err(StoreError::InvalidArgument { message }) => {
                assert!(message.contains("cannot implement class"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_assignability() {
        let entity = TypeDescriptor::class::<Entity>()
            .implements(TypeKey::of::<dyn Named>())
            .build()
            .unwrap();
        let concrete = TypeDescriptor::class::<ConcreteEntity>()
            .extends(entity)
            .build()
            .unwrap();

        assert!(concrete.is_assignable_to(TypeKey::of::<ConcreteEntity>()));
        assert!(concrete.is_assignable_to(TypeKey::of::<Entity>()));
        assert!(concrete.is_assignable_to(TypeKey::of::<dyn Named>()));
        assert!(!concrete.is_assignable_to(TypeKey::of::<dyn Flagged>()));
    }
}

// Runtime type identity
//
// Every bindable type exposes a `TypeInfo`: its `TypeId`, its qualified name
// (the name the companion naming rule is applied to) and optionally a parent
// type it embeds. The parent link is what the resolver walks when a type has
// no companion of its own.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::{BindingError, ErasedTarget};

/// A type that can be presented to the binder
///
/// Implemented by `#[derive(ThemeBinding)]` and `#[derive(Themed)]`.
pub trait Themed: Send + Sized + 'static {
    fn type_info() -> &'static TypeInfo;
}

type Upcast = Box<dyn Fn(ErasedTarget) -> Result<ErasedTarget, BindingError> + Send + Sync>;

/// Link from a type to the parent it embeds
pub struct Parent {
    info: fn() -> &'static TypeInfo,
    upcast: Upcast,
}

impl Parent {
    pub fn info(&self) -> &'static TypeInfo {
        (self.info)()
    }

    /// Turn a handle to the child into a handle to the embedded parent
    pub fn upcast(&self, target: ErasedTarget) -> Result<ErasedTarget, BindingError> {
        (self.upcast)(target)
    }
}

/// Static description of a bindable type
pub struct TypeInfo {
    type_id: TypeId,
    rust_name: &'static str,
    name: String,
    parent: Option<Parent>,
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .field("parent", &self.parent.as_ref().map(|p| p.info().name()))
            .finish()
    }
}

impl TypeInfo {
    /// Identity of `T` under a qualified name such as `app::ui::Outer.Inner`
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            name: name.into(),
            parent: None,
        }
    }

    /// Declare that `C` embeds its parent `P`, reachable through `project`
    pub fn with_parent<C: Send + 'static, P: Themed>(mut self, project: fn(&mut C) -> &mut P) -> Self {
        self.parent = Some(Parent {
            info: P::type_info,
            upcast: Box::new(move |target: ErasedTarget| target.project(project)),
        });
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Qualified name used for companion lookup
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiler-provided type name, for diagnostics
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.parent.as_ref()
    }

    /// Follow parent links from a handle to this type until it addresses
    /// the type identified by `to`.
    pub fn upcast_to(&self, target: ErasedTarget, to: TypeId) -> Result<ErasedTarget, BindingError> {
        let mut info = self;
        let mut target = target;
        while info.type_id != to {
            let parent = info
                .parent
                .as_ref()
                .ok_or_else(|| BindingError::BrokenAncestry(self.name.clone()))?;
            target = parent.upcast(target)?;
            info = parent.info();
        }
        Ok(target)
    }
}

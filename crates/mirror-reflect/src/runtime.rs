use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use mirror_config::ResolutionConfig;
use mirror_types::{format_type, ClassDef, ClassId, Type, TypeEnv, TypeStore, WellKnownTypes};
use parking_lot::RwLock;

use crate::define::ClassBuilder;
use crate::value::{FromValue, ObjectRef, Value};

/// A registered member body.
pub type NativeFn = Arc<dyn Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl Modifiers {
    pub const PUBLIC: Modifiers = Modifiers {
        visibility: Visibility::Public,
        is_static: false,
        is_final: false,
    };

    pub const PRIVATE: Modifiers = Modifiers {
        visibility: Visibility::Private,
        is_static: false,
        is_final: false,
    };

    pub const fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub const fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn is_public(self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Clone)]
pub struct ConstructorDef {
    pub owner: ClassId,
    pub params: Vec<Type>,
    pub modifiers: Modifiers,
    pub(crate) handler: NativeFn,
}

#[derive(Clone)]
pub struct MethodDef {
    pub owner: ClassId,
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub modifiers: Modifiers,
    /// `None` for abstract methods; those are never invocation candidates.
    pub(crate) handler: Option<NativeFn>,
}

impl MethodDef {
    pub fn is_abstract(&self) -> bool {
        self.handler.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub owner: ClassId,
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("owner", &self.owner)
            .field("params", &self.params)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("modifiers", &self.modifiers)
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

/// Member tables of one class. Immutable after registration except for static field values.
#[derive(Debug, Default)]
pub(crate) struct ClassMembers {
    pub(crate) native: bool,
    pub(crate) constructors: Vec<ConstructorDef>,
    pub(crate) methods: Vec<MethodDef>,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) statics: RwLock<HashMap<String, Value>>,
}

/// The class registry: type lattice plus native member tables.
///
/// Classes are registered up front through [`Runtime::define_class`] /
/// [`Runtime::define_interface`]; afterwards the runtime is only read (static field values and
/// instance state live behind their own locks), so it can be shared across threads.
pub struct Runtime {
    types: TypeStore,
    members: HashMap<ClassId, ClassMembers>,
    /// Ids interned by a `ClassBuilder` whose class has not been installed yet.
    placeholders: HashSet<ClassId>,
    config: ResolutionConfig,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("classes", &self.members.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl Runtime {
    /// A runtime with the minimal JDK classes and their native members registered.
    pub fn with_minimal_jdk() -> Self {
        let mut runtime = Runtime {
            types: TypeStore::with_minimal_jdk(),
            members: HashMap::new(),
            placeholders: HashSet::new(),
            config: ResolutionConfig::default(),
        };
        crate::jdk::register(&mut runtime);
        runtime
    }

    pub fn with_config(mut self, config: ResolutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeStore {
        &self.types
    }

    /// Start (re)defining a class. If `name` already exists its super class and interfaces are
    /// kept unless overridden; its members are replaced on [`ClassBuilder::register`].
    pub fn define_class(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, false)
    }

    pub fn define_interface(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, name, true)
    }

    /// Whether `id` has a registered member table (placeholders from failed or pending
    /// registrations do not).
    pub fn is_defined(&self, id: ClassId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn class_name(&self, id: ClassId) -> &str {
        self.types
            .class(id)
            .map(|def| def.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn display_type(&self, ty: &Type) -> String {
        format_type(&self.types, ty)
    }

    pub fn constructors(&self, id: ClassId) -> &[ConstructorDef] {
        self.members
            .get(&id)
            .map(|m| m.constructors.as_slice())
            .unwrap_or_default()
    }

    pub fn declared_methods(&self, id: ClassId) -> &[MethodDef] {
        self.members
            .get(&id)
            .map(|m| m.methods.as_slice())
            .unwrap_or_default()
    }

    pub fn declared_fields(&self, id: ClassId) -> &[FieldDef] {
        self.members
            .get(&id)
            .map(|m| m.fields.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn is_native(&self, id: ClassId) -> bool {
        self.members.get(&id).is_some_and(|m| m.native)
    }

    /// Intern `name` for a class about to be defined. Names the type store does not know yet
    /// stay placeholders until [`Runtime::install`] runs for them.
    pub(crate) fn reserve_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.types.class_id(name) {
            return id;
        }
        let id = self.types.intern_class_id(name);
        self.placeholders.insert(id);
        id
    }

    pub(crate) fn is_placeholder(&self, id: ClassId) -> bool {
        self.placeholders.contains(&id)
    }

    pub(crate) fn install(&mut self, id: ClassId, def: ClassDef, members: ClassMembers) {
        self.placeholders.remove(&id);
        self.types.define_class(id, def);
        self.members.insert(id, members);
    }

    pub(crate) fn static_value(&self, owner: ClassId, name: &str) -> Option<Value> {
        self.members
            .get(&owner)
            .and_then(|m| m.statics.read().get(name).cloned())
    }

    pub(crate) fn set_static_value(&self, owner: ClassId, name: &str, value: Value) -> bool {
        let Some(members) = self.members.get(&owner) else {
            return false;
        };
        members.statics.write().insert(name.to_string(), value);
        true
    }

    /// Allocate an instance of `class` with every instance field of its hierarchy set to the
    /// default value of its type.
    pub(crate) fn allocate(&self, class: ClassId) -> ObjectRef {
        let mut slots = HashMap::new();
        // Base classes first so a redeclared field keeps the most-derived type's default.
        for level in self.types.superclass_chain(class).into_iter().rev() {
            for field in self.declared_fields(level) {
                if !field.modifiers.is_static {
                    slots.insert(field.name.clone(), Value::default_for(&field.ty));
                }
            }
        }
        ObjectRef::allocate(class, slots)
    }
}

impl TypeEnv for Runtime {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.types.class(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.types.lookup_class(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.types.well_known()
    }
}

/// Everything a native member body gets to see.
pub struct CallArgs<'a> {
    runtime: &'a Runtime,
    member: &'a str,
    this: Option<&'a Value>,
    args: &'a [Value],
}

impl<'a> CallArgs<'a> {
    pub(crate) fn new(
        runtime: &'a Runtime,
        member: &'a str,
        this: Option<&'a Value>,
        args: &'a [Value],
    ) -> Self {
        Self {
            runtime,
            member,
            this,
            args,
        }
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    /// Rendered signature of the member being invoked.
    pub fn member(&self) -> &'a str {
        self.member
    }

    pub fn this(&self) -> anyhow::Result<&'a Value> {
        self.this
            .ok_or_else(|| anyhow!("{} called without a receiver", self.member))
    }

    pub fn this_object(&self) -> anyhow::Result<&'a ObjectRef> {
        self.this()?
            .as_object()
            .ok_or_else(|| anyhow!("{} requires an object receiver", self.member))
    }

    pub fn this_as<T: FromValue>(&self) -> anyhow::Result<T> {
        let this = self.this()?;
        T::from_value(this).ok_or_else(|| {
            anyhow!(
                "{}: receiver {this} is not a {}",
                self.member,
                std::any::type_name::<T>()
            )
        })
    }

    pub fn arg(&self, idx: usize) -> anyhow::Result<&'a Value> {
        self.args
            .get(idx)
            .with_context(|| format!("{}: missing argument #{idx}", self.member))
    }

    pub fn arg_as<T: FromValue>(&self, idx: usize) -> anyhow::Result<T> {
        let value = self.arg(idx)?;
        T::from_value(value).ok_or_else(|| {
            anyhow!(
                "{}: argument #{idx} ({value}) is not a {}",
                self.member,
                std::any::type_name::<T>()
            )
        })
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use mirror_types::{ClassDef, ClassId, ClassKind, Type, TypeEnv};
use parking_lot::RwLock;

use crate::error::{ResolutionError, Result};
use crate::runtime::{
    CallArgs, ClassMembers, ConstructorDef, FieldDef, MethodDef, Modifiers, NativeFn, Runtime,
};
use crate::value::Value;

struct PendingConstructor {
    modifiers: Modifiers,
    params: Vec<String>,
    handler: NativeFn,
}

struct PendingMethod {
    modifiers: Modifiers,
    name: String,
    params: Vec<String>,
    returns: String,
    handler: Option<NativeFn>,
}

struct PendingField {
    modifiers: Modifiers,
    name: String,
    ty: String,
    initial: Option<Value>,
}

/// Collects a class definition; type names are resolved when [`ClassBuilder::register`] runs,
/// so members may mention the class being defined.
#[must_use = "a class is only defined once `register` is called"]
pub struct ClassBuilder<'rt> {
    runtime: &'rt mut Runtime,
    id: ClassId,
    name: String,
    kind: ClassKind,
    is_abstract: bool,
    native: bool,
    super_class: Option<String>,
    interfaces: Vec<String>,
    constructors: Vec<PendingConstructor>,
    methods: Vec<PendingMethod>,
    fields: Vec<PendingField>,
}

impl<'rt> ClassBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt mut Runtime, name: &str, interface: bool) -> Self {
        let existing = runtime
            .types()
            .class_id(name)
            .filter(|id| !runtime.is_placeholder(*id))
            .and_then(|id| runtime.types().class(id))
            .cloned();
        let id = runtime.reserve_class_id(name);

        // Keep the shape of an already known class (including the seeded JDK types).
        let (super_class, interfaces, is_abstract) = match existing {
            Some(def) => (
                def.super_class.map(|sc| runtime.class_name(sc).to_string()),
                def.interfaces
                    .iter()
                    .map(|iface| runtime.class_name(*iface).to_string())
                    .collect(),
                def.is_abstract,
            ),
            _ => (None, Vec::new(), interface),
        };

        Self {
            runtime,
            id,
            name: name.to_string(),
            kind: if interface {
                ClassKind::Interface
            } else {
                ClassKind::Class
            },
            is_abstract,
            native: false,
            super_class,
            interfaces,
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, super_class: &str) -> Self {
        self.super_class = Some(super_class.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        if !self.interfaces.iter().any(|i| i == interface) {
            self.interfaces.push(interface.to_string());
        }
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Instances are plain [`Value`]s produced by the constructor body instead of runtime-allocated
    /// objects (strings, boxed primitives, maps).
    pub(crate) fn native(mut self) -> Self {
        self.native = true;
        self
    }

    pub fn constructor<F>(self, params: &[&str], handler: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.constructor_with(Modifiers::PUBLIC, params, handler)
    }

    /// Constructor bodies of runtime-allocated classes receive the fresh instance as `this`;
    /// their return value is ignored.
    pub fn constructor_with<F>(mut self, modifiers: Modifiers, params: &[&str], handler: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.constructors.push(PendingConstructor {
            modifiers,
            params: owned(params),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn method<F>(self, name: &str, params: &[&str], returns: &str, handler: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.method_with(Modifiers::PUBLIC, name, params, returns, handler)
    }

    pub fn static_method<F>(self, name: &str, params: &[&str], returns: &str, handler: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.method_with(Modifiers::PUBLIC.with_static(), name, params, returns, handler)
    }

    pub fn method_with<F>(
        mut self,
        modifiers: Modifiers,
        name: &str,
        params: &[&str],
        returns: &str,
        handler: F,
    ) -> Self
    where
        F: Fn(&CallArgs<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(PendingMethod {
            modifiers,
            name: name.to_string(),
            params: owned(params),
            returns: returns.to_string(),
            handler: Some(Arc::new(handler)),
        });
        self
    }

    pub fn abstract_method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        self.methods.push(PendingMethod {
            modifiers: Modifiers::PUBLIC,
            name: name.to_string(),
            params: owned(params),
            returns: returns.to_string(),
            handler: None,
        });
        self
    }

    pub fn field(self, name: &str, ty: &str) -> Self {
        self.field_with(Modifiers::PUBLIC, name, ty)
    }

    pub fn field_with(mut self, modifiers: Modifiers, name: &str, ty: &str) -> Self {
        self.fields.push(PendingField {
            modifiers,
            name: name.to_string(),
            ty: ty.to_string(),
            initial: None,
        });
        self
    }

    pub fn static_field(self, name: &str, ty: &str, initial: impl Into<Value>) -> Self {
        self.static_field_with(Modifiers::PUBLIC, name, ty, initial)
    }

    pub fn static_field_with(
        mut self,
        modifiers: Modifiers,
        name: &str,
        ty: &str,
        initial: impl Into<Value>,
    ) -> Self {
        self.fields.push(PendingField {
            modifiers: modifiers.with_static(),
            name: name.to_string(),
            ty: ty.to_string(),
            initial: Some(initial.into()),
        });
        self
    }

    /// Resolve every type name and install the class, replacing any previous definition.
    pub fn register(self) -> Result<ClassId> {
        let ClassBuilder {
            runtime,
            id,
            name,
            kind,
            is_abstract,
            native,
            super_class,
            interfaces,
            constructors,
            methods,
            fields,
        } = self;

        // Placeholders left behind by unfinished registrations are not real classes.
        let known = |found: ClassId| found == id || !runtime.is_placeholder(found);
        let resolve_class = |type_name: &str| -> Result<ClassId> {
            runtime
                .lookup_class(type_name)
                .filter(|found| known(*found))
                .ok_or_else(|| ResolutionError::ClassNotFound(type_name.to_string()))
        };
        let resolve_type = |type_name: &str| -> Result<Type> {
            runtime
                .parse_type(type_name)
                .filter(|ty| element_class(ty).map_or(true, known))
                .ok_or_else(|| ResolutionError::ClassNotFound(type_name.to_string()))
        };
        let resolve_params = |params: &[String]| -> Result<Vec<Type>> {
            params.iter().map(|p| resolve_type(p)).collect()
        };

        let object = runtime.well_known().object;
        let super_class = match (kind, super_class) {
            (ClassKind::Interface, _) => None,
            (ClassKind::Class, Some(sc)) => Some(resolve_class(&sc)?),
            (ClassKind::Class, None) if id == object => None,
            (ClassKind::Class, None) => Some(object),
        };
        let interfaces = interfaces
            .iter()
            .map(|iface| resolve_class(iface))
            .collect::<Result<Vec<_>>>()?;

        let constructors = constructors
            .into_iter()
            .map(|c| -> Result<ConstructorDef> {
                Ok(ConstructorDef {
                    owner: id,
                    params: resolve_params(&c.params)?,
                    modifiers: c.modifiers,
                    handler: c.handler,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let methods = methods
            .into_iter()
            .map(|m| -> Result<MethodDef> {
                Ok(MethodDef {
                    owner: id,
                    params: resolve_params(&m.params)?,
                    return_type: resolve_type(&m.returns)?,
                    name: m.name,
                    modifiers: m.modifiers,
                    handler: m.handler,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut statics = HashMap::new();
        let fields = fields
            .into_iter()
            .map(|f| -> Result<FieldDef> {
                let ty = resolve_type(&f.ty)?;
                if f.modifiers.is_static {
                    let initial = f.initial.unwrap_or_else(|| Value::default_for(&ty));
                    statics.insert(f.name.clone(), initial);
                }
                Ok(FieldDef {
                    owner: id,
                    name: f.name,
                    ty,
                    modifiers: f.modifiers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let def = ClassDef {
            name: name.clone(),
            kind,
            is_abstract: is_abstract || kind == ClassKind::Interface,
            super_class,
            interfaces,
        };
        let members = ClassMembers {
            native,
            constructors,
            methods,
            fields,
            statics: RwLock::new(statics),
        };

        tracing::debug!(
            target: "mirror.reflect",
            class = %name,
            constructors = members.constructors.len(),
            methods = members.methods.len(),
            fields = members.fields.len(),
            "registered class"
        );
        runtime.install(id, def, members);
        Ok(id)
    }
}

/// The class a (possibly array) type bottoms out in.
fn element_class(ty: &Type) -> Option<ClassId> {
    match ty {
        Type::Class(id) => Some(*id),
        Type::Array(component) => element_class(component),
        _ => None,
    }
}

fn owned(params: &[&str]) -> Vec<String> {
    params.iter().map(|p| p.to_string()).collect()
}

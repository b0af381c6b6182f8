use std::collections::BTreeMap;

use mirror_types::{boxed, format_signature, is_assignable, ClassId, Type, TypeEnv};

use crate::error::{ResolutionError, Result};
use crate::lookup;
use crate::proxy::Proxy;
use crate::runtime::{CallArgs, FieldDef, Runtime};
use crate::value::{FromValue, Value};

const TARGET: &str = "mirror.reflect";

/// A resolution session over a target reference: a declared type and, optionally, a live value.
///
/// Without a live value (or with a `null` one) the session is a *static view*: only static
/// methods and fields resolve. Sessions are cheap to clone and are meant to be created per call
/// chain:
///
/// ```
/// use mirror_reflect::{Reflect, ResolutionError, Runtime};
///
/// # fn main() -> Result<(), ResolutionError> {
/// let rt = Runtime::with_minimal_jdk();
/// let len = Reflect::on_name(&rt, "java.lang.String")?
///     .create(&["42".into()])?
///     .call("length", &[])?
///     .get_as::<i32>()?;
/// assert_eq!(len, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Reflect<'rt> {
    runtime: &'rt Runtime,
    ty: Type,
    value: Option<Value>,
}

impl<'rt> Reflect<'rt> {
    /// Static view of the class registered as `name` (implicit `java.lang` lookup applies).
    pub fn on_name(runtime: &'rt Runtime, name: &str) -> Result<Self> {
        let id = runtime
            .lookup_class(name)
            .filter(|id| runtime.is_defined(*id))
            .ok_or_else(|| ResolutionError::ClassNotFound(name.to_string()))?;
        Ok(Self::on_class(runtime, id))
    }

    pub fn on_class(runtime: &'rt Runtime, id: ClassId) -> Self {
        Self {
            runtime,
            ty: Type::Class(id),
            value: None,
        }
    }

    /// Session over a live value, typed by the value's runtime class.
    pub fn on(runtime: &'rt Runtime, value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = match value.runtime_type(runtime) {
            Type::Null => Type::Class(runtime.well_known().object),
            ty => ty,
        };
        Self {
            runtime,
            ty,
            value: Some(value),
        }
    }

    fn typed(runtime: &'rt Runtime, ty: Type, value: Value) -> Self {
        Self {
            runtime,
            ty,
            value: Some(value),
        }
    }

    pub fn runtime(&self) -> &'rt Runtime {
        self.runtime
    }

    /// Declared type of this target (for call results and fields, the declared member type).
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn type_name(&self) -> String {
        self.runtime.display_type(&self.ty)
    }

    /// Class used for dispatch: the live value's runtime class when there is one, otherwise the
    /// declared type (boxed when primitive).
    pub fn class_id(&self) -> Option<ClassId> {
        if let Some(Type::Class(id)) = self.receiver().map(|v| v.runtime_type(self.runtime)) {
            return Some(id);
        }
        match boxed(self.runtime, &self.ty) {
            Type::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_static_view(&self) -> bool {
        self.receiver().is_none()
    }

    /// The wrapped value; `Value::Null` for a static view.
    pub fn get(&self) -> Value {
        self.value.clone().unwrap_or_default()
    }

    pub fn get_as<T: FromValue>(&self) -> Result<T> {
        let value = self.get();
        T::from_value(&value).ok_or_else(|| ResolutionError::IllegalArgument {
            member: "get".to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: self.runtime.display_type(&value.runtime_type(self.runtime)),
        })
    }

    fn receiver(&self) -> Option<&Value> {
        self.value.as_ref().filter(|v| !v.is_null())
    }

    fn dispatch_class(&self) -> Result<ClassId> {
        self.class_id().ok_or_else(|| ResolutionError::ClassNotFound(self.type_name()))
    }

    fn arg_types(&self, args: &[Value]) -> Vec<Type> {
        args.iter().map(|a| a.runtime_type(self.runtime)).collect()
    }

    /// Resolve a constructor of this type for `args`, run it, and return a session on the new
    /// instance.
    pub fn create(&self, args: &[Value]) -> Result<Reflect<'rt>> {
        let rt = self.runtime;
        let class = self.dispatch_class()?;
        let def = rt
            .class(class)
            .ok_or_else(|| ResolutionError::ClassNotFound(self.type_name()))?;
        if !def.is_instantiable() {
            return Err(ResolutionError::Instantiation {
                class: def.name.clone(),
                reason: "interfaces and abstract classes have no instances",
            });
        }

        let arg_types = self.arg_types(args);
        let ctor = lookup::resolve_constructor(rt, class, &arg_types)?;
        let member = format_signature(rt, None, rt.class_name(class), &ctor.params);
        tracing::trace!(target: TARGET, constructor = %member, "invoking constructor");

        let invocation = |source| ResolutionError::Invocation {
            member: member.clone(),
            source,
        };
        let value = if rt.is_native(class) {
            (ctor.handler)(&CallArgs::new(rt, &member, None, args)).map_err(invocation)?
        } else {
            let this = Value::Object(rt.allocate(class));
            (ctor.handler)(&CallArgs::new(rt, &member, Some(&this), args)).map_err(invocation)?;
            this
        };
        Ok(Reflect::typed(rt, Type::Class(class), value))
    }

    /// Resolve and invoke `name(args)` and return `(declared return type, value)`.
    pub(crate) fn invoke(&self, name: &str, args: &[Value]) -> Result<(Type, Value)> {
        let rt = self.runtime;
        let class = self.dispatch_class()?;
        let receiver = self.receiver();
        let arg_types = self.arg_types(args);
        let lookup::Invocable { method, handler } =
            lookup::resolve_method(rt, class, name, &arg_types, receiver.is_none())?;
        let member = format_signature(rt, Some(&Type::Class(method.owner)), name, &method.params);
        // Without a receiver only static methods resolve.
        let this = if method.modifiers.is_static {
            None
        } else {
            receiver
        };

        tracing::trace!(target: TARGET, method = %member, "invoking method");
        let value = handler(&CallArgs::new(rt, &member, this, args)).map_err(|source| {
            ResolutionError::Invocation {
                member: member.clone(),
                source,
            }
        })?;
        Ok((method.return_type.clone(), value))
    }

    /// Resolve and invoke a method. The result is a session on the returned value typed by the
    /// declared return type; `void` methods return this session so calls can be chained.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Reflect<'rt>> {
        let (return_type, value) = self.invoke(name, args)?;
        if return_type == Type::Void {
            return Ok(self.clone());
        }
        Ok(Reflect::typed(self.runtime, return_type, value))
    }

    fn field_def(&self, name: &str) -> Result<&'rt FieldDef> {
        let class = self.dispatch_class()?;
        lookup::resolve_field(self.runtime, class, name)
    }

    fn field_member(&self, field: &FieldDef) -> String {
        format!("{}.{}", self.runtime.class_name(field.owner), field.name)
    }

    fn read_field(&self, field: &FieldDef) -> Result<Value> {
        let member = self.field_member(field);
        if field.modifiers.is_static {
            return self
                .runtime
                .static_value(field.owner, &field.name)
                .ok_or_else(|| ResolutionError::NoSuchField {
                    class: self.runtime.class_name(field.owner).to_string(),
                    name: field.name.clone(),
                });
        }
        let receiver = self.receiver().ok_or_else(|| ResolutionError::MissingReceiver {
            member: member.clone(),
            class: self.type_name(),
        })?;
        receiver
            .as_object()
            .and_then(|obj| obj.field(&field.name))
            .ok_or_else(|| ResolutionError::IllegalAccess {
                member,
                reason: "target has no storage for this field".to_string(),
            })
    }

    /// Session on the value of field `name`, typed by the field's declared type.
    pub fn field(&self, name: &str) -> Result<Reflect<'rt>> {
        let field = self.field_def(name)?;
        let value = self.read_field(field)?;
        Ok(Reflect::typed(self.runtime, field.ty.clone(), value))
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        let field = self.field_def(name)?;
        self.read_field(field)
    }

    /// Write field `name`. Final fields are written too (the restriction is lifted) unless
    /// `allow_final_writes` is off. Returns this session for chaining.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Reflect<'rt>> {
        let rt = self.runtime;
        let value = value.into();
        let field = self.field_def(name)?;
        let member = self.field_member(field);

        let value_ty = value.runtime_type(rt);
        let null_into_primitive = value.is_null() && field.ty.is_primitive();
        if null_into_primitive || !is_assignable(rt, &field.ty, &value_ty) {
            return Err(ResolutionError::IllegalArgument {
                member,
                expected: rt.display_type(&field.ty),
                found: rt.display_type(&value_ty),
            });
        }

        if field.modifiers.is_final {
            if !rt.config().allow_final_writes {
                return Err(ResolutionError::IllegalAccess {
                    member,
                    reason: "field is final".to_string(),
                });
            }
            tracing::debug!(target: TARGET, field = %member, "lifting final modifier for write");
        }

        if field.modifiers.is_static {
            rt.set_static_value(field.owner, &field.name, value);
            return Ok(self.clone());
        }

        let receiver = self.receiver().ok_or_else(|| ResolutionError::MissingReceiver {
            member: member.clone(),
            class: self.type_name(),
        })?;
        let written = receiver
            .as_object()
            .is_some_and(|obj| obj.set_field(&field.name, value));
        if !written {
            return Err(ResolutionError::IllegalAccess {
                member,
                reason: "target has no storage for this field".to_string(),
            });
        }
        Ok(self.clone())
    }

    /// Every readable field by name: statics always, instance fields when a live instance is
    /// present. A redeclared name resolves to the most-derived declaration.
    pub fn fields(&self) -> Result<BTreeMap<String, Reflect<'rt>>> {
        let class = self.dispatch_class()?;
        let static_view = self.is_static_view();
        let mut out = BTreeMap::new();
        for field in lookup::all_fields(self.runtime, class) {
            if static_view && !field.modifiers.is_static {
                continue;
            }
            let value = self.read_field(field)?;
            out.insert(
                field.name.clone(),
                Reflect::typed(self.runtime, field.ty.clone(), value),
            );
        }
        Ok(out)
    }

    /// Expose this target through `interface` (see [`Proxy`]).
    pub fn as_proxy(&self, interface: &str) -> Result<Proxy<'rt>> {
        Proxy::new(self.runtime, interface, self.get())
    }
}

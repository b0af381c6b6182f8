//! Nominal type lattice used by Mirror's dynamic member resolution.
//!
//! The model is deliberately Java-shaped: single class inheritance, interfaces, the eight
//! primitive types with their boxed wrappers, arrays, and a `null` marker type that only exists
//! for argument matching. There are no generics.

use std::collections::HashMap;
use std::fmt;

mod format;
mod overload;
mod subtyping;

pub use format::{format_signature, format_type};
pub use overload::{
    is_applicable, is_more_specific, select_most_specific, MatchMode, Selection,
};
pub use subtyping::{boxed, is_assignable, is_subclass, unboxed};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// Binary name of the boxed wrapper class.
    pub fn wrapper_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// Type of an absent value. Only produced when deriving types from call arguments.
    Null,
    Primitive(PrimitiveType),
    Class(ClassId),
    Array(Box<Type>),
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn long() -> Self {
        Type::Primitive(PrimitiveType::Long)
    }

    pub fn array_of(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub super_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
}

impl ClassDef {
    pub fn class(name: impl Into<String>, super_class: Option<ClassId>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            is_abstract: false,
            super_class,
            interfaces: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Interface,
            is_abstract: true,
            super_class: None,
            interfaces: Vec::new(),
        }
    }

    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = ClassId>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub serializable: ClassId,
    pub cloneable: ClassId,
    pub comparable: ClassId,
    pub char_sequence: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub map: ClassId,
    pub hash_map: ClassId,
}

impl WellKnownTypes {
    fn unseeded() -> Self {
        let id = ClassId(0);
        Self {
            object: id,
            serializable: id,
            cloneable: id,
            comparable: id,
            char_sequence: id,
            string: id,
            number: id,
            boolean: id,
            byte: id,
            short: id,
            character: id,
            integer: id,
            long: id,
            float: id,
            double: id,
            map: id,
            hash_map: id,
        }
    }

    pub fn wrapper(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    pub fn primitive_of(&self, wrapper: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| self.wrapper(*p) == wrapper)
    }
}

/// Read-only view over a set of class definitions.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    /// `id`, then its super classes, most-derived first.
    fn superclass_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            // Guard against malformed (cyclic) hierarchies.
            if out.contains(&cur) {
                break;
            }
            out.push(cur);
            current = self.class(cur).and_then(|def| def.super_class);
        }
        out
    }

    /// Parse a Java-like type name: primitive keywords, `void`, binary class names (with implicit
    /// `java.lang` lookup) and any number of `[]` suffixes.
    fn parse_type(&self, name: &str) -> Option<Type> {
        let name = name.trim();
        if let Some(component) = name.strip_suffix("[]") {
            return self.parse_type(component).map(Type::array_of);
        }
        if name == "void" {
            return Some(Type::Void);
        }
        if let Some(prim) = PrimitiveType::from_keyword(name) {
            return Some(Type::Primitive(prim));
        }
        self.lookup_class(name).map(Type::Class)
    }
}

#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store seeded with the handful of JDK types the resolver relies on: `Object`, `String`,
    /// the boxed wrappers, `Number`, a few marker interfaces and `Map`/`HashMap`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes::unseeded(),
        };

        let object = store.upsert_class(ClassDef::class("java.lang.Object", None));
        let serializable = store.upsert_class(ClassDef::interface("java.io.Serializable"));
        let cloneable = store.upsert_class(ClassDef::interface("java.lang.Cloneable"));
        let comparable = store.upsert_class(ClassDef::interface("java.lang.Comparable"));
        let char_sequence = store.upsert_class(ClassDef::interface("java.lang.CharSequence"));

        let string = store.upsert_class(
            ClassDef::class("java.lang.String", Some(object)).with_interfaces([
                serializable,
                comparable,
                char_sequence,
            ]),
        );

        let mut number = ClassDef::class("java.lang.Number", Some(object))
            .with_interfaces([serializable]);
        number.is_abstract = true;
        let number = store.upsert_class(number);

        let mut wrapper = |name: &str, super_class: ClassId| {
            store.upsert_class(
                ClassDef::class(name, Some(super_class)).with_interfaces([serializable, comparable]),
            )
        };
        let boolean = wrapper("java.lang.Boolean", object);
        let character = wrapper("java.lang.Character", object);
        let byte = wrapper("java.lang.Byte", number);
        let short = wrapper("java.lang.Short", number);
        let integer = wrapper("java.lang.Integer", number);
        let long = wrapper("java.lang.Long", number);
        let float = wrapper("java.lang.Float", number);
        let double = wrapper("java.lang.Double", number);

        let map = store.upsert_class(ClassDef::interface("java.util.Map"));
        let hash_map = store.upsert_class(
            ClassDef::class("java.util.HashMap", Some(object)).with_interfaces([
                map,
                cloneable,
                serializable,
            ]),
        );

        store.well_known = WellKnownTypes {
            object,
            serializable,
            cloneable,
            comparable,
            char_sequence,
            string,
            number,
            boolean,
            byte,
            short,
            character,
            integer,
            long,
            float,
            double,
            map,
            hash_map,
        };
        store
    }

    /// Allocate (or return) the id for `name` without defining it yet.
    ///
    /// The placeholder is a concrete class extending nothing until [`TypeStore::define_class`]
    /// replaces it. This allows a class to mention itself in its own member signatures.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId(
            self.classes
                .len()
                .try_into()
                .expect("too many classes in TypeStore"),
        );
        self.classes.push(ClassDef::class(name, None));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        if let Some(old) = self.classes.get(id.index()) {
            if old.name != def.name {
                self.by_name.remove(&old.name);
                self.by_name.insert(def.name.clone(), id);
            }
        }
        if let Some(slot) = self.classes.get_mut(id.index()) {
            *slot = def;
        }
    }

    /// Insert `def`, replacing any existing class with the same name but keeping its id.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_id(name) {
            return Some(id);
        }
        if !name.contains('.') {
            return self.class_id(&format!("java.lang.{name}"));
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

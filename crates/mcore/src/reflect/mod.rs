// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime reflection over registered classes.
//!
//! Every reflected type owns a static [`MClass`] descriptor listing its
//! named properties, enumerations, and services (methods of 0 to 6
//! parameters), plus a parent pointer for the single-inheritance walk.
//! Dispatch goes through typed trampolines: one function-pointer shape per
//! receiver kind and arity, invoked without heap allocation.
//!
//! Property-name lookup is exact and additionally accepts the relaxed
//! fold where `SomeProperty` matches `SOME_PROPERTY`. Service lookup is
//! exact; overloaded services also match on arity, and the error
//! distinguishes a missing service from a wrong parameter count.

mod object;
mod registry;

#[cfg(test)]
mod tests;

pub use object::{MObject, OBJECT_CLASS};
pub use registry::{all_class_names, get_class, get_existing_class, register_class, MAXIMUM_NUMBER_OF_CLASSES};

use crate::error::{MError, MErrorCode, MResult};
use crate::variant::{Variant, VariantKind};

/// Maximum number of parameters supported in a service.
pub const MAXIMUM_NUMBER_OF_SERVICE_PARAMETERS: usize = 6;

/// Maximum class name length in characters, excluding any terminator.
pub const MAXIMUM_CLASS_NAME_LENGTH: usize = 39;

// Typed trampoline shapes ------------------------------------------------

pub type ConstFn0 = fn(&dyn MObject) -> MResult<Variant>;
pub type ConstFn1 = fn(&dyn MObject, &Variant) -> MResult<Variant>;
pub type ConstFn2 = fn(&dyn MObject, &Variant, &Variant) -> MResult<Variant>;
pub type ConstFn3 = fn(&dyn MObject, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ConstFn4 = fn(&dyn MObject, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ConstFn5 =
    fn(&dyn MObject, &Variant, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ConstFn6 =
    fn(&dyn MObject, &Variant, &Variant, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;

pub type MutFn0 = fn(&mut dyn MObject) -> MResult<Variant>;
pub type MutFn1 = fn(&mut dyn MObject, &Variant) -> MResult<Variant>;
pub type MutFn2 = fn(&mut dyn MObject, &Variant, &Variant) -> MResult<Variant>;
pub type MutFn3 = fn(&mut dyn MObject, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type MutFn4 = fn(&mut dyn MObject, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type MutFn5 =
    fn(&mut dyn MObject, &Variant, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type MutFn6 = fn(
    &mut dyn MObject,
    &Variant,
    &Variant,
    &Variant,
    &Variant,
    &Variant,
    &Variant,
) -> MResult<Variant>;

pub type ClassFn0 = fn() -> MResult<Variant>;
pub type ClassFn1 = fn(&Variant) -> MResult<Variant>;
pub type ClassFn2 = fn(&Variant, &Variant) -> MResult<Variant>;
pub type ClassFn3 = fn(&Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ClassFn4 = fn(&Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ClassFn5 = fn(&Variant, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;
pub type ClassFn6 =
    fn(&Variant, &Variant, &Variant, &Variant, &Variant, &Variant) -> MResult<Variant>;

/// One typed method pointer, discriminated by receiver and arity.
#[derive(Clone, Copy, Debug)]
pub enum ServiceMethod {
    Const0(ConstFn0),
    Const1(ConstFn1),
    Const2(ConstFn2),
    Const3(ConstFn3),
    Const4(ConstFn4),
    Const5(ConstFn5),
    Const6(ConstFn6),
    Mut0(MutFn0),
    Mut1(MutFn1),
    Mut2(MutFn2),
    Mut3(MutFn3),
    Mut4(MutFn4),
    Mut5(MutFn5),
    Mut6(MutFn6),
    Class0(ClassFn0),
    Class1(ClassFn1),
    Class2(ClassFn2),
    Class3(ClassFn3),
    Class4(ClassFn4),
    Class5(ClassFn5),
    Class6(ClassFn6),
}

impl ServiceMethod {
    pub fn arity(&self) -> usize {
        match self {
            ServiceMethod::Const0(_) | ServiceMethod::Mut0(_) | ServiceMethod::Class0(_) => 0,
            ServiceMethod::Const1(_) | ServiceMethod::Mut1(_) | ServiceMethod::Class1(_) => 1,
            ServiceMethod::Const2(_) | ServiceMethod::Mut2(_) | ServiceMethod::Class2(_) => 2,
            ServiceMethod::Const3(_) | ServiceMethod::Mut3(_) | ServiceMethod::Class3(_) => 3,
            ServiceMethod::Const4(_) | ServiceMethod::Mut4(_) | ServiceMethod::Class4(_) => 4,
            ServiceMethod::Const5(_) | ServiceMethod::Mut5(_) | ServiceMethod::Class5(_) => 5,
            ServiceMethod::Const6(_) | ServiceMethod::Mut6(_) | ServiceMethod::Class6(_) => 6,
        }
    }

    /// Static methods: callable without an object.
    pub fn is_class_method(&self) -> bool {
        matches!(
            self,
            ServiceMethod::Class0(_)
                | ServiceMethod::Class1(_)
                | ServiceMethod::Class2(_)
                | ServiceMethod::Class3(_)
                | ServiceMethod::Class4(_)
                | ServiceMethod::Class5(_)
                | ServiceMethod::Class6(_)
        )
    }

    /// Methods that mutate the receiver.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ServiceMethod::Mut0(_)
                | ServiceMethod::Mut1(_)
                | ServiceMethod::Mut2(_)
                | ServiceMethod::Mut3(_)
                | ServiceMethod::Mut4(_)
                | ServiceMethod::Mut5(_)
                | ServiceMethod::Mut6(_)
        )
    }
}

/// Property accessor, object- or class-scope.
#[derive(Clone, Copy, Debug)]
pub enum PropertyGetter {
    Object(ConstFn0),
    Class(ClassFn0),
}

#[derive(Clone, Copy, Debug)]
pub enum PropertySetter {
    Object(fn(&mut dyn MObject, &Variant) -> MResult<()>),
    Class(fn(&Variant) -> MResult<()>),
}

/// Definition of one reflected property.
#[derive(Debug)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: VariantKind,
    pub getter: Option<PropertyGetter>,
    pub setter: Option<PropertySetter>,
    /// Persistent default as MDL constant text.
    pub default: Option<&'static str>,
    /// Enumeration-constant value; such entries have no accessors.
    pub enum_value: Option<u32>,
}

impl PropertyDef {
    pub const fn readonly(name: &'static str, kind: VariantKind, getter: PropertyGetter) -> Self {
        PropertyDef {
            name,
            kind,
            getter: Some(getter),
            setter: None,
            default: None,
            enum_value: None,
        }
    }

    pub const fn read_write(
        name: &'static str,
        kind: VariantKind,
        getter: PropertyGetter,
        setter: PropertySetter,
    ) -> Self {
        PropertyDef {
            name,
            kind,
            getter: Some(getter),
            setter: Some(setter),
            default: None,
            enum_value: None,
        }
    }

    /// Read-write property with a declared default, usable for config
    /// save/load.
    pub const fn persistent(
        name: &'static str,
        kind: VariantKind,
        getter: PropertyGetter,
        setter: PropertySetter,
        default: &'static str,
    ) -> Self {
        PropertyDef {
            name,
            kind,
            getter: Some(getter),
            setter: Some(setter),
            default: Some(default),
            enum_value: None,
        }
    }

    pub const fn enumeration(name: &'static str, value: u32) -> Self {
        PropertyDef {
            name,
            kind: VariantKind::Empty,
            getter: None,
            setter: None,
            default: None,
            enum_value: Some(value),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_enumeration(&self) -> bool {
        self.enum_value.is_some()
    }
}

/// Definition of one reflected service.
#[derive(Debug)]
pub struct ServiceDef {
    pub name: &'static str,
    pub method: ServiceMethod,
    /// `-1` when the service is not overloaded; the declared parameter
    /// count otherwise.
    pub overload_arity: i32,
    /// Human-readable parameter signature.
    pub signature: &'static str,
}

impl ServiceDef {
    pub const fn of(name: &'static str, method: ServiceMethod, signature: &'static str) -> Self {
        ServiceDef {
            name,
            method,
            overload_arity: -1,
            signature,
        }
    }

    pub const fn overloaded(
        name: &'static str,
        method: ServiceMethod,
        arity: i32,
        signature: &'static str,
    ) -> Self {
        ServiceDef {
            name,
            method,
            overload_arity: arity,
            signature,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.method.arity()
    }
}

/// Static descriptor of one reflected class.
#[derive(Debug)]
pub struct MClass {
    /// Short class name, at most [`MAXIMUM_CLASS_NAME_LENGTH`] characters.
    pub name: &'static str,
    /// Type name, usually equal to the class name.
    pub type_name: &'static str,
    pub parent: Option<&'static MClass>,
    pub properties: &'static [PropertyDef],
    pub services: &'static [ServiceDef],
}

// Names suppressed from property enumerations; they enumerate the
// enumeration itself.
const SYNTHETIC_PROPERTY_NAMES: [&str; 2] = ["AllPropertyNames", "AllPersistentPropertyNames"];

impl MClass {
    /// Whether this class is `cls` or inherits from it.
    pub fn is_kind_of(&'static self, cls: &'static MClass) -> bool {
        let mut c = Some(self);
        while let Some(current) = c {
            if std::ptr::eq(current, cls) {
                return true;
            }
            c = current.parent;
        }
        false
    }

    /// Ancestor with the given name, if any.
    pub fn get_parent_class(&'static self, name: &str) -> Option<&'static MClass> {
        let mut c = self.parent;
        while let Some(current) = c {
            if current.name == name {
                return Some(current);
            }
            c = current.parent;
        }
        None
    }

    pub fn matches_class_or_type_name(&self, name: &str) -> bool {
        self.name == name || self.type_name == name
    }

    fn ancestry(&'static self) -> impl Iterator<Item = &'static MClass> {
        std::iter::successors(Some(self), |c| c.parent)
    }

    // Service lookup ----------------------------------------------------

    /// Find a service; `expected_parameters` of `-1` accepts any arity.
    pub fn get_service_definition_or_null(
        &'static self,
        name: &str,
        expected_parameters: i32,
    ) -> Option<&'static ServiceDef> {
        for cl in self.ancestry() {
            for def in cl.services {
                if def.name == name
                    && (def.overload_arity < 0
                        || def.overload_arity == expected_parameters
                        || expected_parameters < 0)
                {
                    return Some(def);
                }
            }
        }
        None
    }

    /// Find a service or fail, distinguishing "no such service" from
    /// "service does not have N parameters".
    pub fn get_service_definition(
        &'static self,
        name: &str,
        expected_parameters: i32,
    ) -> MResult<&'static ServiceDef> {
        match self.get_service_definition_or_null(name, expected_parameters) {
            Some(def) => Ok(def),
            None => {
                if expected_parameters != -1
                    && self.get_service_definition_or_null(name, -1).is_some()
                {
                    Err(throw_service_does_not_have_n_parameters(name, expected_parameters))
                } else {
                    Err(throw_unknown_service(self.type_name, name))
                }
            }
        }
    }

    pub fn is_service_present(&'static self, name: &str) -> bool {
        self.get_service_definition_or_null(name, -1).is_some()
    }

    // Property lookup ---------------------------------------------------

    pub fn get_property_definition_or_null(&'static self, name: &str) -> Option<&'static PropertyDef> {
        // Exact match first; the relaxed fold only engages for all-caps
        // candidates, which never match exactly against CamelCase tables.
        for cl in self.ancestry() {
            for def in cl.properties {
                if def.name == name {
                    return Some(def);
                }
            }
        }
        for cl in self.ancestry() {
            for def in cl.properties {
                if compare_property_names(def.name, name) {
                    return Some(def);
                }
            }
        }
        None
    }

    pub fn get_property_definition(&'static self, name: &str) -> MResult<&'static PropertyDef> {
        self.get_property_definition_or_null(name)
            .ok_or_else(|| throw_unknown_property(self.type_name, name))
    }

    pub fn is_property_present(&'static self, name: &str) -> bool {
        self.get_property_definition_or_null(name).is_some()
    }

    // Class-scope property access ---------------------------------------

    /// Value of a class property or an enumeration constant.
    pub fn get_property(&'static self, name: &str) -> MResult<Variant> {
        let def = self.get_property_definition(name)?;
        match def.getter {
            Some(PropertyGetter::Class(f)) => f(),
            Some(PropertyGetter::Object(_)) => Err(MError::software(
                MErrorCode::NoSuchProperty,
                format!("Object property '{}' cannot be got from a class, without object", name),
            )),
            None => match def.enum_value {
                // Enumerations are always unsigned
                Some(value) => Ok(Variant::UInt(value)),
                None => Err(MError::software(
                    MErrorCode::NoSuchProperty,
                    format!("Property '{}' has no getter", name),
                )),
            },
        }
    }

    pub fn set_property(&'static self, name: &str, value: &Variant) -> MResult<()> {
        let def = self.get_property_definition(name)?;
        match def.setter {
            Some(PropertySetter::Class(f)) => f(value),
            Some(PropertySetter::Object(_)) => Err(MError::software(
                MErrorCode::NoSuchProperty,
                format!("Object property '{}' cannot be set to a class, without object", name),
            )),
            None => {
                if matches!(def.getter, Some(PropertyGetter::Class(_))) {
                    Err(MError::software(
                        MErrorCode::CannotSetReadonlyProperty,
                        format!("Cannot set readonly property '{}'", name),
                    ))
                } else if matches!(def.getter, Some(PropertyGetter::Object(_))) {
                    Err(MError::software(
                        MErrorCode::NoSuchProperty,
                        format!("Object property '{}' cannot be set to a class, without object", name),
                    ))
                } else {
                    Err(MError::software(
                        MErrorCode::EnumerationCannotBeAssigned,
                        format!("Enumeration value '{}' cannot be assigned to", name),
                    ))
                }
            }
        }
    }

    /// Default value of a persistent property.
    pub fn get_persistent_property_default_value(&'static self, name: &str) -> MResult<Variant> {
        let def = self.get_property_definition(name)?;
        match def.default {
            Some(text) => crate::variant::from_mdl_constant(text),
            None => Err(MError::software(
                MErrorCode::PropertyNotPersistent,
                format!("Property '{}' is not persistent and it has no default value", name),
            )),
        }
    }

    // Class-scope calls -------------------------------------------------

    pub fn call0(&'static self, name: &str) -> MResult<Variant> {
        self.call_v(name, &[])
    }

    pub fn call1(&'static self, name: &str, p1: &Variant) -> MResult<Variant> {
        self.call_v(name, std::slice::from_ref(p1))
    }

    pub fn call2(&'static self, name: &str, p1: &Variant, p2: &Variant) -> MResult<Variant> {
        self.call_v(name, &[p1.clone(), p2.clone()])
    }

    /// Generic call: Empty means no parameters, a collection spreads into
    /// the parameter list, anything else is the single parameter.
    pub fn call(&'static self, name: &str, params: &Variant) -> MResult<Variant> {
        match params {
            Variant::Collection(items) => self.call_v(name, items),
            Variant::Empty => self.call_v(name, &[]),
            other => self.call_v(name, std::slice::from_ref(other)),
        }
    }

    /// Call a static service with a parameter vector.
    pub fn call_v(&'static self, name: &str, params: &[Variant]) -> MResult<Variant> {
        // GetProperty / SetProperty / Is*Present resolve without requiring
        // a table entry.
        match (name, params.len()) {
            ("GetProperty", 1) => return self.get_property(&params[0].as_string()?),
            ("IsPropertyPresent", 1) => {
                return Ok(Variant::Bool(self.is_property_present(&params[0].as_string()?)))
            }
            ("IsServicePresent", 1) => {
                return Ok(Variant::Bool(self.is_service_present(&params[0].as_string()?)))
            }
            ("SetProperty", 2) => {
                self.set_property(&params[0].as_string()?, &params[1])?;
                return Ok(Variant::Empty);
            }
            _ => {}
        }
        let def = self.get_service_definition(name, params.len() as i32)?;
        if !def.method.is_class_method() {
            return Err(MError::software(
                MErrorCode::ServiceNotStatic,
                format!("Service '{}' cannot be called without object", name),
            ));
        }
        invoke_class_method(def, name, params)
    }

    // Name enumerations -------------------------------------------------

    /// Properties of this class and all ancestors, sorted.
    pub fn all_property_names(&'static self) -> Vec<String> {
        let mut result = Vec::new();
        for cl in self.ancestry() {
            collect_property_names(cl, &mut result);
        }
        sort_unique(&mut result);
        result
    }

    /// Properties declared by this class only, sorted.
    pub fn own_property_names(&'static self) -> Vec<String> {
        let mut result = Vec::new();
        collect_property_names(self, &mut result);
        sort_unique(&mut result);
        result
    }

    /// Persistent properties of this class and all ancestors, sorted.
    pub fn all_persistent_property_names(&'static self) -> Vec<String> {
        let mut result = Vec::new();
        for cl in self.ancestry() {
            for def in cl.properties {
                if def.is_persistent() && matches!(def.getter, Some(PropertyGetter::Object(_))) {
                    result.push(def.name.to_string());
                }
            }
        }
        sort_unique(&mut result);
        result
    }

    /// Services of this class and all ancestors, sorted, one entry per
    /// overload set.
    pub fn all_service_names(&'static self) -> Vec<String> {
        let mut result = Vec::new();
        for cl in self.ancestry() {
            for def in cl.services {
                result.push(def.name.to_string());
            }
        }
        sort_unique(&mut result);
        result
    }

    pub fn own_service_names(&'static self) -> Vec<String> {
        let mut result: Vec<String> = self.services.iter().map(|d| d.name.to_string()).collect();
        sort_unique(&mut result);
        result
    }
}

fn collect_property_names(cl: &'static MClass, into: &mut Vec<String>) {
    for def in cl.properties {
        if !SYNTHETIC_PROPERTY_NAMES.contains(&def.name) {
            into.push(def.name.to_string());
        }
    }
}

/// ASCII-case-insensitive sort with duplicate removal.
fn sort_unique(names: &mut Vec<String>) {
    names.sort_by(|a, b| {
        a.to_ascii_lowercase()
            .cmp(&b.to_ascii_lowercase())
            .then_with(|| a.cmp(b))
    });
    names.dedup();
}

/// Relaxed property-name match: `stored` is the CamelCase table name,
/// `candidate` the query. `SomeProperty` matches `SOME_PROPERTY`: the
/// fold engages only on a case-only mismatch at the second character, and
/// every uppercase letter in the stored name then requires `_` plus that
/// letter in the candidate.
pub(crate) fn compare_property_names(stored: &str, candidate: &str) -> bool {
    let s = stored.as_bytes();
    let c = candidate.as_bytes();

    // Exact scan until the first mismatch
    let mut i = 0;
    loop {
        if i == s.len() {
            return i == c.len();
        }
        if i == c.len() || s[i] != c[i] {
            break;
        }
        i += 1;
    }

    // The mismatch must sit at index 1 and be case-only
    if i != 1 || i >= c.len() || s[1].to_ascii_uppercase() != c[1] {
        return false;
    }

    let mut ci = 2;
    for &sc in &s[2..] {
        if sc.is_ascii_uppercase() {
            if ci >= c.len() || c[ci] != b'_' {
                return false;
            }
            ci += 1;
            if ci >= c.len() || c[ci] != sc {
                return false;
            }
        } else if ci >= c.len() || sc.to_ascii_uppercase() != c[ci] {
            return false;
        }
        ci += 1;
    }
    ci == c.len()
}

// Invocation helpers -----------------------------------------------------

pub(crate) fn invoke_class_method(
    def: &'static ServiceDef,
    name: &str,
    p: &[Variant],
) -> MResult<Variant> {
    match def.method {
        ServiceMethod::Class0(f) => f(),
        ServiceMethod::Class1(f) => f(&p[0]),
        ServiceMethod::Class2(f) => f(&p[0], &p[1]),
        ServiceMethod::Class3(f) => f(&p[0], &p[1], &p[2]),
        ServiceMethod::Class4(f) => f(&p[0], &p[1], &p[2], &p[3]),
        ServiceMethod::Class5(f) => f(&p[0], &p[1], &p[2], &p[3], &p[4]),
        ServiceMethod::Class6(f) => f(&p[0], &p[1], &p[2], &p[3], &p[4], &p[5]),
        _ => Err(throw_service_does_not_have_n_parameters(name, p.len() as i32)),
    }
}

pub(crate) fn invoke_const_method(
    def: &'static ServiceDef,
    obj: &dyn MObject,
    name: &str,
    p: &[Variant],
) -> MResult<Variant> {
    match def.method {
        ServiceMethod::Const0(f) => f(obj),
        ServiceMethod::Const1(f) => f(obj, &p[0]),
        ServiceMethod::Const2(f) => f(obj, &p[0], &p[1]),
        ServiceMethod::Const3(f) => f(obj, &p[0], &p[1], &p[2]),
        ServiceMethod::Const4(f) => f(obj, &p[0], &p[1], &p[2], &p[3]),
        ServiceMethod::Const5(f) => f(obj, &p[0], &p[1], &p[2], &p[3], &p[4]),
        ServiceMethod::Const6(f) => f(obj, &p[0], &p[1], &p[2], &p[3], &p[4], &p[5]),
        ServiceMethod::Class0(_)
        | ServiceMethod::Class1(_)
        | ServiceMethod::Class2(_)
        | ServiceMethod::Class3(_)
        | ServiceMethod::Class4(_)
        | ServiceMethod::Class5(_)
        | ServiceMethod::Class6(_) => invoke_class_method(def, name, p),
        _ => Err(MError::software(
            MErrorCode::OperationNotSupported,
            format!("Service '{}' mutates the object and needs exclusive access", name),
        )),
    }
}

pub(crate) fn invoke_mut_method(
    def: &'static ServiceDef,
    obj: &mut dyn MObject,
    name: &str,
    p: &[Variant],
) -> MResult<Variant> {
    match def.method {
        ServiceMethod::Mut0(f) => f(obj),
        ServiceMethod::Mut1(f) => f(obj, &p[0]),
        ServiceMethod::Mut2(f) => f(obj, &p[0], &p[1]),
        ServiceMethod::Mut3(f) => f(obj, &p[0], &p[1], &p[2]),
        ServiceMethod::Mut4(f) => f(obj, &p[0], &p[1], &p[2], &p[3]),
        ServiceMethod::Mut5(f) => f(obj, &p[0], &p[1], &p[2], &p[3], &p[4]),
        ServiceMethod::Mut6(f) => f(obj, &p[0], &p[1], &p[2], &p[3], &p[4], &p[5]),
        _ => invoke_const_method(def, obj, name, p),
    }
}

#[track_caller]
fn throw_unknown_property(class_name: &str, name: &str) -> MError {
    MError::software(
        MErrorCode::NoSuchProperty,
        format!("'{}' does not have property '{}'", class_name, name),
    )
}

#[track_caller]
fn throw_unknown_service(class_name: &str, name: &str) -> MError {
    MError::software(
        MErrorCode::NoSuchService,
        format!("'{}' does not have service '{}'", class_name, name),
    )
}

#[track_caller]
fn throw_service_does_not_have_n_parameters(name: &str, count: i32) -> MError {
    MError::software(
        MErrorCode::ServiceDoesNotHaveNParameters,
        format!("Service '{}' does not have {} parameters", name, count),
    )
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tests of class descriptors, lookup rules, and dispatch.

use super::*;
use crate::variant::Variant;
use std::sync::{Arc, Once};

// A sample reflected device register for the tests.
struct Register {
    value: i32,
    meter_number: String,
}

impl Register {
    fn new(value: i32) -> Self {
        Register {
            value,
            meter_number: String::new(),
        }
    }
}

impl MObject for Register {
    fn class(&self) -> &'static MClass {
        &REGISTER_CLASS
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

static REGISTER_CLASS: MClass = MClass {
    name: "Register",
    type_name: "Register",
    parent: Some(&OBJECT_CLASS),
    properties: &[
        PropertyDef::readonly(
            "Value",
            crate::variant::VariantKind::Int,
            PropertyGetter::Object(|o| Ok(Variant::Int(o.downcast_ref::<Register>()?.value))),
        ),
        PropertyDef::persistent(
            "MeterNumber",
            crate::variant::VariantKind::String,
            PropertyGetter::Object(|o| {
                Ok(Variant::from(o.downcast_ref::<Register>()?.meter_number.as_str()))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<Register>()?.meter_number = v.as_string()?;
                Ok(())
            }),
            "\"unset\"",
        ),
        PropertyDef::enumeration("MaximumValue", 9999),
    ],
    services: &[
        ServiceDef::of(
            "Add",
            ServiceMethod::Const1(|o, v| {
                Ok(Variant::Int(o.downcast_ref::<Register>()?.value + v.as_int()?))
            }),
            "(value: Int) -> Int",
        ),
        ServiceDef::of(
            "Compare",
            ServiceMethod::Const1(|o, other| {
                let mine = o.downcast_ref::<Register>()?.value;
                let theirs = other
                    .as_existing_object()?
                    .as_ref()
                    .get_property("Value")?
                    .as_int()?;
                Ok(Variant::Int(match mine.cmp(&theirs) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                }))
            }),
            "(other: Register) -> Int",
        ),
        ServiceDef::of(
            "Step",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<Register>()?.value += 1;
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::overloaded(
            "Scale",
            ServiceMethod::Const1(|o, by| {
                Ok(Variant::Int(o.downcast_ref::<Register>()?.value * by.as_int()?))
            }),
            1,
            "(by: Int) -> Int",
        ),
        ServiceDef::overloaded(
            "Scale",
            ServiceMethod::Const2(|o, by, plus| {
                Ok(Variant::Int(
                    o.downcast_ref::<Register>()?.value * by.as_int()? + plus.as_int()?,
                ))
            }),
            2,
            "(by: Int, plus: Int) -> Int",
        ),
        ServiceDef::of(
            "MakeDefault",
            ServiceMethod::Class0(|| Ok(Variant::Int(0))),
            "() -> Int",
        ),
    ],
};

fn ensure_registered() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        register_class(&REGISTER_CLASS).expect("register test class");
    });
}

// Lookup -----------------------------------------------------------------

#[test]
fn test_property_lookup_exact_and_fold() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    assert!(cls.is_property_present("Value"));
    assert!(cls.is_property_present("MeterNumber"));
    // Relaxed fold accepts the all-caps snake form
    assert!(cls.is_property_present("METER_NUMBER"));
    assert!(cls.is_property_present("VALUE"));
    // But not a mangled casing
    assert!(!cls.is_property_present("meternumber"));
    assert!(!cls.is_property_present("METERNUMBER"));
    assert!(!cls.is_property_present("Bogus"));
}

#[test]
fn test_compare_property_names_rules() {
    assert!(compare_property_names("SomeProperty", "SOME_PROPERTY"));
    assert!(compare_property_names("Value", "VALUE"));
    assert!(!compare_property_names("SomeProperty", "SOMEPROPERTY"));
    assert!(!compare_property_names("SomeProperty", "Some_Property"));
    assert!(!compare_property_names("SomeProperty", "SOME_PROPERT"));
    assert!(!compare_property_names("SomeProperty", "SOME_PROPERTYX"));
}

#[test]
fn test_service_lookup_and_arity_errors() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    assert!(cls.is_service_present("Add"));
    assert!(cls.is_service_present("Scale"));
    assert!(!cls.is_service_present("Bogus"));

    // A missing service and a wrong arity are distinguished
    let mut object = Register::new(1);
    let obj: &mut dyn MObject = &mut object;
    let err = obj.call_v("Bogus", &[]).unwrap_err();
    assert_eq!(err.code(), MErrorCode::NoSuchService);
    let err = obj.call_v("Scale", &[]).unwrap_err();
    assert_eq!(err.code(), MErrorCode::ServiceDoesNotHaveNParameters);
}

// Dispatch ---------------------------------------------------------------

#[test]
fn test_reflected_get_equals_direct() {
    ensure_registered();
    let object = Register::new(42);
    let obj: &dyn MObject = &object;
    assert_eq!(obj.get_property("Value").unwrap().as_int().unwrap(), 42);
    assert_eq!(obj.get_property("VALUE").unwrap().as_int().unwrap(), object.value);
}

#[test]
fn test_property_set_and_readonly() {
    ensure_registered();
    let mut object = Register::new(1);
    let obj: &mut dyn MObject = &mut object;
    obj.set_property("MeterNumber", &Variant::from("A123")).unwrap();
    assert_eq!(obj.get_property("MeterNumber").unwrap().as_string().unwrap(), "A123");
    let err = obj.set_property("Value", &Variant::Int(5)).unwrap_err();
    assert_eq!(err.code(), MErrorCode::CannotSetReadonlyProperty);
}

#[test]
fn test_enumeration_constant() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    // Enumerations read as fixed unsigned values, from class or object
    assert_eq!(cls.get_property("MaximumValue").unwrap().as_uint().unwrap(), 9999);
    let mut object = Register::new(0);
    let obj: &mut dyn MObject = &mut object;
    assert_eq!(obj.get_property("MaximumValue").unwrap().as_uint().unwrap(), 9999);
    let err = obj.set_property("MaximumValue", &Variant::UInt(1)).unwrap_err();
    assert_eq!(err.code(), MErrorCode::EnumerationCannotBeAssigned);
}

#[test]
fn test_service_calls() {
    ensure_registered();
    let mut object = Register::new(10);
    let obj: &mut dyn MObject = &mut object;
    assert_eq!(obj.call1("Add", &Variant::Int(5)).unwrap().as_int().unwrap(), 15);
    obj.call0("Step").unwrap();
    assert_eq!(obj.get_property("Value").unwrap().as_int().unwrap(), 11);

    // Overloads pick by arity
    assert_eq!(obj.call1("Scale", &Variant::Int(2)).unwrap().as_int().unwrap(), 22);
    assert_eq!(
        obj.call2("Scale", &Variant::Int(2), &Variant::Int(1)).unwrap().as_int().unwrap(),
        23
    );
}

#[test]
fn test_call_spreads_parameters() {
    ensure_registered();
    let mut object = Register::new(10);
    let obj: &mut dyn MObject = &mut object;
    // A collection spreads, Empty is no parameters, a scalar is one
    assert_eq!(
        obj.call("Scale", &Variant::from(vec![Variant::Int(3), Variant::Int(4)]))
            .unwrap()
            .as_int()
            .unwrap(),
        34
    );
    assert_eq!(obj.call("Add", &Variant::Int(1)).unwrap().as_int().unwrap(), 11);
    obj.call("Step", &Variant::Empty).unwrap();
}

#[test]
fn test_call_sugar() {
    ensure_registered();
    let mut object = Register::new(3);
    let obj: &mut dyn MObject = &mut object;
    // These resolve without table entries
    assert_eq!(
        obj.call1("GetProperty", &Variant::from("Value")).unwrap().as_int().unwrap(),
        3
    );
    assert!(obj
        .call1("IsPropertyPresent", &Variant::from("METER_NUMBER"))
        .unwrap()
        .as_bool());
    assert!(obj.call1("IsServicePresent", &Variant::from("Add")).unwrap().as_bool());
    obj.call2("SetProperty", &Variant::from("MeterNumber"), &Variant::from("B9"))
        .unwrap();
    assert_eq!(object.meter_number, "B9");
}

#[test]
fn test_class_scope_calls() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    assert_eq!(cls.call0("MakeDefault").unwrap().as_int().unwrap(), 0);
    // An object service cannot run without an object
    let err = cls.call1("Add", &Variant::Int(1)).unwrap_err();
    assert_eq!(err.code(), MErrorCode::ServiceNotStatic);
    // Class-scope sugar reads enumerations
    assert_eq!(
        cls.call1("GetProperty", &Variant::from("MaximumValue")).unwrap().as_uint().unwrap(),
        9999
    );
}

// Persistence ------------------------------------------------------------

#[test]
fn test_persistent_defaults() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    let default = cls.get_persistent_property_default_value("MeterNumber").unwrap();
    assert_eq!(default.as_string().unwrap(), "unset");
    let err = cls.get_persistent_property_default_value("Value").unwrap_err();
    assert_eq!(err.code(), MErrorCode::PropertyNotPersistent);

    let mut object = Register::new(5);
    object.meter_number = "X".to_string();
    let obj: &mut dyn MObject = &mut object;
    obj.set_persistent_properties_to_default().unwrap();
    assert_eq!(object.meter_number, "unset");
}

#[test]
fn test_name_enumerations() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    let names = cls.all_property_names();
    assert!(names.contains(&"Value".to_string()));
    assert!(names.contains(&"MeterNumber".to_string()));
    assert!(names.contains(&"MaximumValue".to_string()));
    // The synthetic names enumerate everything but themselves
    assert!(!names.contains(&"AllPropertyNames".to_string()));
    assert!(!names.contains(&"AllPersistentPropertyNames".to_string()));
    // Sorted, ASCII case insensitive
    let mut sorted = names.clone();
    sorted.sort_by_key(|n| n.to_ascii_lowercase());
    assert_eq!(names, sorted);

    assert_eq!(cls.all_persistent_property_names(), ["MeterNumber"]);

    let services = cls.all_service_names();
    assert!(services.contains(&"Add".to_string()));
    // One entry per overload set
    assert_eq!(services.iter().filter(|n| *n == "Scale").count(), 1);
}

#[test]
fn test_synthetic_properties_resolve() {
    ensure_registered();
    let object = Register::new(1);
    let obj: &dyn MObject = &object;
    let names = obj.get_property("AllPropertyNames").unwrap();
    assert!(names.count().unwrap() >= 3);
}

#[test]
fn test_is_kind_of_and_ancestry() {
    ensure_registered();
    let cls = get_existing_class("Register").unwrap();
    let object_class = get_existing_class("Object").unwrap();
    assert!(cls.is_kind_of(object_class));
    assert!(!object_class.is_kind_of(cls));
    assert!(cls.matches_class_or_type_name("Register"));
}

// Objects inside variants ------------------------------------------------

#[test]
fn test_object_equality_via_compare_service() {
    ensure_registered();
    let a = Variant::from_object(Arc::new(Register::new(5)));
    let b = Variant::from_object(Arc::new(Register::new(5)));
    let c = Variant::from_object(Arc::new(Register::new(6)));
    assert!(a.try_eq(&b).unwrap());
    assert!(!a.try_eq(&c).unwrap());
    assert!(a.try_lt(&c).unwrap());
    // Pointer identity short-circuits
    let d = a.clone();
    assert!(a.try_eq(&d).unwrap());
}

#[test]
fn test_object_add_dispatches() {
    ensure_registered();
    let a = Variant::from_object(Arc::new(Register::new(40)));
    let r = a.add(&Variant::Int(2)).unwrap();
    assert_eq!(r.as_int().unwrap(), 42);
}

#[test]
fn test_object_without_compare_is_unequal() {
    // A plain regexp object has no Compare service
    let a = Variant::from_object(Arc::new(crate::regexp::Regexp::new()));
    let b = Variant::from_object(Arc::new(crate::regexp::Regexp::new()));
    assert!(!a.try_eq(&b).unwrap());
    let c = a.clone();
    assert!(a.try_eq(&c).unwrap()); // unless pointer-identical
}

#[test]
fn test_object_mutation_requires_unique_ownership() {
    ensure_registered();
    let mut a = Variant::from_object(Arc::new(Register::new(1)));
    a.object_mut().unwrap().call0("Step").unwrap();
    let _shared = a.clone();
    assert!(a.object_mut().is_err());
}

#[test]
fn test_registry_duplicate_rejected() {
    ensure_registered();
    assert!(register_class(&REGISTER_CLASS).is_err());
}

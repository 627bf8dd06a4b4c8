// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Abstract root of every reflected object.
//!
//! Implementors supply their class descriptor and the `Any` plumbing; the
//! reflected surface (property get/set, service calls, persistence
//! defaults) is provided on `dyn MObject` so every object shares one
//! dispatch path through its class tables.

use super::{
    invoke_const_method, invoke_mut_method, MClass, PropertyGetter, PropertySetter,
};
use crate::error::{MError, MErrorCode, MResult};
use crate::variant::{ObjectRef, Variant};
use std::any::Any;

/// Root trait that establishes dynamic class information.
pub trait MObject: Any + Send + Sync {
    /// The final class of the object.
    fn class(&self) -> &'static MClass;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Small value-semantics objects return a deep copy here; such objects
    /// are stored embedded into variants instead of by reference.
    fn embedded_clone(&self) -> Option<ObjectRef> {
        None
    }

    /// Check internal consistency, the hook used after persistent loads.
    fn validate(&self) -> MResult<()> {
        Ok(())
    }
}

impl dyn MObject {
    pub fn downcast_ref<T: MObject>(&self) -> MResult<&T> {
        self.as_any().downcast_ref::<T>().ok_or_else(|| {
            MError::software(
                MErrorCode::BadConversion,
                format!("Could not cast object of type '{}'", self.class().name),
            )
        })
    }

    pub fn downcast_mut<T: MObject>(&mut self) -> MResult<&mut T> {
        let name = self.class().name;
        self.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
            MError::software(
                MErrorCode::BadConversion,
                format!("Could not cast object of type '{}'", name),
            )
        })
    }

    /// Name of the type for the object.
    pub fn get_type(&self) -> &'static str {
        self.class().type_name
    }

    // Properties --------------------------------------------------------

    pub fn is_property_present(&self, name: &str) -> bool {
        self.class().is_property_present(name)
    }

    pub fn is_service_present(&self, name: &str) -> bool {
        self.class().is_service_present(name)
    }

    /// Reflected property read: object accessor, class accessor, or
    /// enumeration constant, whichever the definition carries.
    pub fn get_property(&self, name: &str) -> MResult<Variant> {
        let def = self.class().get_property_definition(name)?;
        match def.getter {
            Some(PropertyGetter::Object(f)) => f(self),
            Some(PropertyGetter::Class(f)) => f(),
            None => match def.enum_value {
                Some(value) => Ok(Variant::UInt(value)),
                None => Err(MError::software(
                    MErrorCode::NoSuchProperty,
                    format!("Property '{}' has no getter", name),
                )),
            },
        }
    }

    /// Reflected property write; readonly and enumeration entries fail
    /// with the dedicated codes.
    pub fn set_property(&mut self, name: &str, value: &Variant) -> MResult<()> {
        let def = self.class().get_property_definition(name)?;
        match def.setter {
            Some(PropertySetter::Object(f)) => f(self, value),
            Some(PropertySetter::Class(f)) => f(value),
            None => {
                if def.is_enumeration() {
                    Err(MError::software(
                        MErrorCode::EnumerationCannotBeAssigned,
                        format!("Enumeration value '{}' cannot be assigned to", name),
                    ))
                } else {
                    Err(MError::software(
                        MErrorCode::CannotSetReadonlyProperty,
                        format!("Cannot set readonly property '{}'", name),
                    ))
                }
            }
        }
    }

    /// Names of every property, own and inherited.
    pub fn all_property_names(&self) -> Vec<String> {
        self.class().all_property_names()
    }

    pub fn all_persistent_property_names(&self) -> Vec<String> {
        self.class().all_persistent_property_names()
    }

    pub fn get_persistent_property_default_value(&self, name: &str) -> MResult<Variant> {
        self.class().get_persistent_property_default_value(name)
    }

    /// Assign the default to one persistent property.
    pub fn set_persistent_property_to_default(&mut self, name: &str) -> MResult<()> {
        let default = self.get_persistent_property_default_value(name)?;
        self.set_property(name, &default)
    }

    /// Assign defaults to every persistent property of the class chain.
    pub fn set_persistent_properties_to_default(&mut self) -> MResult<()> {
        for name in self.all_persistent_property_names() {
            self.set_persistent_property_to_default(&name)?;
        }
        Ok(())
    }

    // Calls -------------------------------------------------------------

    pub fn call0(&mut self, name: &str) -> MResult<Variant> {
        self.call_v(name, &[])
    }

    pub fn call1(&mut self, name: &str, p1: &Variant) -> MResult<Variant> {
        self.call_v(name, std::slice::from_ref(p1))
    }

    pub fn call2(&mut self, name: &str, p1: &Variant, p2: &Variant) -> MResult<Variant> {
        self.call_v(name, &[p1.clone(), p2.clone()])
    }

    pub fn call3(&mut self, name: &str, p1: &Variant, p2: &Variant, p3: &Variant) -> MResult<Variant> {
        self.call_v(name, &[p1.clone(), p2.clone(), p3.clone()])
    }

    pub fn call4(
        &mut self,
        name: &str,
        p1: &Variant,
        p2: &Variant,
        p3: &Variant,
        p4: &Variant,
    ) -> MResult<Variant> {
        self.call_v(name, &[p1.clone(), p2.clone(), p3.clone(), p4.clone()])
    }

    pub fn call5(
        &mut self,
        name: &str,
        p1: &Variant,
        p2: &Variant,
        p3: &Variant,
        p4: &Variant,
        p5: &Variant,
    ) -> MResult<Variant> {
        self.call_v(name, &[p1.clone(), p2.clone(), p3.clone(), p4.clone(), p5.clone()])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call6(
        &mut self,
        name: &str,
        p1: &Variant,
        p2: &Variant,
        p3: &Variant,
        p4: &Variant,
        p5: &Variant,
        p6: &Variant,
    ) -> MResult<Variant> {
        self.call_v(
            name,
            &[p1.clone(), p2.clone(), p3.clone(), p4.clone(), p5.clone(), p6.clone()],
        )
    }

    /// Generic call: Empty is no parameters, a collection spreads,
    /// anything else is the single parameter.
    pub fn call(&mut self, name: &str, params: &Variant) -> MResult<Variant> {
        match params {
            Variant::Collection(items) => {
                let items = items.clone();
                self.call_v(name, &items)
            }
            Variant::Empty => self.call_v(name, &[]),
            other => self.call_v(name, std::slice::from_ref(other)),
        }
    }

    /// Call a service by name with a parameter vector.
    pub fn call_v(&mut self, name: &str, params: &[Variant]) -> MResult<Variant> {
        if let Some(result) = self.call_sugar(name, params) {
            return result;
        }
        let def = self.class().get_service_definition(name, params.len() as i32)?;
        invoke_mut_method(def, self, name, params)
    }

    /// Read-only call path usable through shared references; mutating
    /// services are refused.
    pub fn call_v_const(&self, name: &str, params: &[Variant]) -> MResult<Variant> {
        match (name, params.len()) {
            ("GetProperty", 1) => return self.get_property(&params[0].as_string()?),
            ("IsPropertyPresent", 1) => {
                return Ok(Variant::Bool(self.is_property_present(&params[0].as_string()?)))
            }
            ("IsServicePresent", 1) => {
                return Ok(Variant::Bool(self.is_service_present(&params[0].as_string()?)))
            }
            _ => {}
        }
        let def = self.class().get_service_definition(name, params.len() as i32)?;
        invoke_const_method(def, self, name, params)
    }

    pub fn call0_const(&self, name: &str) -> MResult<Variant> {
        self.call_v_const(name, &[])
    }

    pub fn call1_const(&self, name: &str, p1: &Variant) -> MResult<Variant> {
        self.call_v_const(name, std::slice::from_ref(p1))
    }

    /// GetProperty / SetProperty / Is*Present resolve without requiring
    /// the named method to exist in the class table.
    fn call_sugar(&mut self, name: &str, params: &[Variant]) -> Option<MResult<Variant>> {
        match (name, params.len()) {
            ("GetProperty", 1) => Some(
                params[0]
                    .as_string()
                    .and_then(|n| self.get_property(&n)),
            ),
            ("IsPropertyPresent", 1) => Some(
                params[0]
                    .as_string()
                    .map(|n| Variant::Bool(self.is_property_present(&n))),
            ),
            ("IsServicePresent", 1) => Some(
                params[0]
                    .as_string()
                    .map(|n| Variant::Bool(self.is_service_present(&n))),
            ),
            ("SetProperty", 2) => Some(
                params[0]
                    .as_string()
                    .and_then(|n| self.set_property(&n, &params[1]))
                    .map(|()| Variant::Empty),
            ),
            _ => None,
        }
    }
}

/// Root class descriptor; the only class without a parent.
pub static OBJECT_CLASS: MClass = MClass {
    name: "Object",
    type_name: "Object",
    parent: None,
    properties: &[
        super::PropertyDef::readonly(
            "AllPropertyNames",
            crate::variant::VariantKind::StringCollection,
            PropertyGetter::Object(|o| Ok(Variant::from(o.all_property_names()))),
        ),
        super::PropertyDef::readonly(
            "AllPersistentPropertyNames",
            crate::variant::VariantKind::StringCollection,
            PropertyGetter::Object(|o| Ok(Variant::from(o.all_persistent_property_names()))),
        ),
    ],
    services: &[],
};

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration calls: normalize field specifications and register types.

use super::{DataModel, TypeId};
use crate::error::{Result, SchemaError};
use crate::semantic::is_builtin_type;
use crate::types::{FieldDef, InterfaceDef, MessageDef, NativeRepr, StructDef, TypeDefinition, TypeKind};
use crate::value::Value;
use std::sync::Arc;

/// A field's type: by name (builtin or previously declared) or by object.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Name(String),
    Def(Arc<TypeDefinition>),
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<Arc<TypeDefinition>> for TypeRef {
    fn from(def: Arc<TypeDefinition>) -> Self {
        TypeRef::Def(def)
    }
}

/// `{type, default, description}` for one field.
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub ty: TypeRef,
    /// Native-form default.
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl FieldInput {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            default: None,
            description: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl From<&str> for FieldInput {
    fn from(name: &str) -> Self {
        FieldInput::new(name)
    }
}

impl From<String> for FieldInput {
    fn from(name: String) -> Self {
        FieldInput::new(name)
    }
}

impl From<Arc<TypeDefinition>> for FieldInput {
    fn from(def: Arc<TypeDefinition>) -> Self {
        FieldInput::new(def)
    }
}

/// Ordered field specification. Order fixes offsets and bit positions.
#[derive(Debug, Clone, Default)]
pub struct StructSpec {
    pub fields: Vec<(String, FieldInput)>,
    pub description: Option<String>,
}

impl StructSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, input: impl Into<FieldInput>) -> Self {
        self.fields.push((name.into(), input.into()));
        self
    }

    #[must_use]
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl DataModel {
    /// `owner.field` is the slot the type is resolved for.
    fn resolve(&mut self, owner: &str, field: &str, ty: TypeRef) -> Result<Arc<TypeDefinition>> {
        match ty {
            TypeRef::Name(name) => self.get_type(&name),
            TypeRef::Def(def) => self.register_def(owner, field, def),
        }
    }

    /// Register a caller-built type together with every type nested in it.
    /// Objects are only ever registered by their own declaration.
    fn register_def(&mut self, owner: &str, field: &str, def: Arc<TypeDefinition>) -> Result<Arc<TypeDefinition>> {
        if def.meta_type().is_object() {
            return Err(SchemaError::IllegalFieldType {
                type_name: owner.to_string(),
                field: field.to_string(),
                field_type: def.name().to_string(),
            });
        }
        if is_builtin_type(def.name()) {
            let builtin = self.get_type(def.name())?;
            if builtin.get_hash_data() != def.get_hash_data() {
                return Err(SchemaError::DuplicateType {
                    name: def.name().to_string(),
                });
            }
            return Ok(builtin);
        }
        match def.kind() {
            TypeKind::Struct(fields) | TypeKind::Message(MessageDef { fields, .. }) => {
                for f in fields.all_fields() {
                    self.register_def(def.name(), &f.name, f.ty.clone())?;
                }
            }
            TypeKind::FixedArray(array) => {
                self.register_def(def.name(), "inner", array.inner.clone())?;
            }
            TypeKind::Reference(reference) => {
                let registered = self
                    .find_type(&reference.target)
                    .is_some_and(|t| t.meta_type().is_object());
                if !registered {
                    return Err(SchemaError::UnknownType {
                        name: reference.target.clone(),
                    });
                }
            }
            _ => {}
        }
        self.insert(def)
    }

    fn resolve_fields(&mut self, owner: &str, spec: Vec<(String, FieldInput)>) -> Result<Vec<FieldDef>> {
        let mut out = Vec::with_capacity(spec.len());
        for (name, input) in spec {
            let ty = self.resolve(owner, &name, input.ty)?;
            let mut field = FieldDef::new(name, ty.clone());
            if let Some(default) = &input.default {
                field.default = ty.convert_value_from_local(default)?;
            }
            field.description = input.description;
            out.push(field);
        }
        Ok(out)
    }

    fn resolve_parents(&mut self, extends: &[&str]) -> Result<Vec<Arc<TypeDefinition>>> {
        extends.iter().map(|p| self.get_type(p)).collect()
    }

    fn native_for(&self, name: &str, ty: &TypeDefinition) -> Result<NativeRepr> {
        let wire_fields = ty.struct_def().map(StructDef::field_names).unwrap_or_default();
        NativeRepr::resolve(
            &self.config.api_name,
            name,
            &wire_fields,
            self.config.type_map.get(name),
        )
    }

    /// Attach the native representation and register.
    fn finish(&mut self, ty: TypeDefinition, description: Option<String>) -> Result<Arc<TypeDefinition>> {
        let native = self.native_for(ty.name(), &ty)?;
        self.insert(Arc::new(ty.with_native(native).with_description(description)))
    }

    fn non_empty(name: &str, spec: &StructSpec) -> Result<()> {
        if spec.is_empty() {
            return Err(SchemaError::EmptyDeclaration {
                name: name.to_string(),
                reason: "no fields".into(),
            });
        }
        Ok(())
    }

    pub fn add_struct(&mut self, name: &str, spec: StructSpec) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            Self::non_empty(name, &spec)?;
            let fields = m.resolve_fields(name, spec.fields)?;
            let ty = TypeDefinition::structure(name, StructDef::new(name, fields)?);
            m.finish(ty, spec.description)
        })
    }

    pub fn add_message_struct(
        &mut self,
        name: &str,
        spec: StructSpec,
        expected_rate_per_second: u32,
    ) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            Self::non_empty(name, &spec)?;
            let fields = m.resolve_fields(name, spec.fields)?;
            let ty = TypeDefinition::message(name, StructDef::new(name, fields)?, expected_rate_per_second);
            m.finish(ty, spec.description)
        })
    }

    pub fn add_interface(&mut self, name: &str, spec: StructSpec, extends: &[&str]) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let parents = m.resolve_parents(extends)?;
            let fields = m.resolve_fields(name, spec.fields)?;
            let ty = TypeDefinition::interface(name, InterfaceDef::new(name, fields, &parents)?);
            m.finish(ty, spec.description)
        })
    }

    /// Declare a collection. Ids are sequential from 0 in declaration order.
    pub fn add_collection(
        &mut self,
        name: &str,
        spec: StructSpec,
        extends: &[&str],
        max_count: u32,
    ) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let parents = m.resolve_parents(extends)?;
            let fields = m.resolve_fields(name, spec.fields)?;
            let def = InterfaceDef::new(name, fields, &parents)?;
            if def.fields.is_empty() {
                return Err(SchemaError::EmptyDeclaration {
                    name: name.to_string(),
                    reason: "collection has no fields".into(),
                });
            }
            let collection_id = m
                .find_type(name)
                .and_then(|t| t.collection_id())
                .unwrap_or(m.next_collection_id);
            let ty = TypeDefinition::collection(name, def, collection_id, max_count);
            m.finish(ty, spec.description)
        })
    }

    pub fn add_enum(&mut self, name: &str, values: Vec<String>) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let ty = TypeDefinition::enumeration(name, values)?;
            m.finish(ty, None)
        })
    }

    pub fn add_fixed_array(
        &mut self,
        name: &str,
        inner: impl Into<TypeRef>,
        length: u32,
    ) -> Result<Arc<TypeDefinition>> {
        let inner = inner.into();
        self.atomically(|m| {
            m.check_user_name(name)?;
            let inner = m.resolve(name, "inner", inner)?;
            let ty = TypeDefinition::fixed_array(name, inner, length)?;
            m.finish(ty, None)
        })
    }

    pub fn add_byte_array(&mut self, name: &str, byte_count: u32) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let ty = TypeDefinition::byte_array(name, byte_count)?;
            m.finish(ty, None)
        })
    }

    /// Handle type pointing at objects satisfying `target`.
    pub fn add_reference(&mut self, name: &str, target: &str) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let target = m.get_type(target)?;
            let ty = TypeDefinition::reference(name, &target)?;
            m.finish(ty, None)
        })
    }

    /// Self-clearing variant of primitive `base`. Writers store `set_value`,
    /// or the base's set value when none is given.
    pub fn add_clear_set(&mut self, name: &str, base: &str, set_value: Option<Value>) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            let base = m.get_type(base)?;
            let ty = TypeDefinition::clear_set(name, &base, set_value.as_ref())?;
            m.finish(ty, None)
        })
    }

    pub fn add_signal(&mut self, name: &str, expected_bytes_per_second: u32) -> Result<Arc<TypeDefinition>> {
        self.atomically(|m| {
            m.check_user_name(name)?;
            m.finish(TypeDefinition::signal(name, expected_bytes_per_second), None)
        })
    }

    /// Arena handle of an already declared type.
    pub fn require_id(&self, name: &str) -> Result<TypeId> {
        self.type_id(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_string(),
        })
    }
}

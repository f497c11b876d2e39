// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration schemas for plugin-provided services.
//!
//! A [`ConfigSchema`] is an ordered list of [`Field`]s. Fields are declared
//! through [`ConfigSchema::field`], which returns a [`FieldBuilder`] for
//! attaching constraints and display metadata; [`FieldBuilder::finish`]
//! commits the field to the schema.
//!
//! ```
//! use dockyard_plugin::schema::{ConfigSchema, FieldType};
//! use serde_json::json;
//!
//! let mut schema = ConfigSchema::new();
//! schema
//!     .field("port", FieldType::Integer, json!(8080))
//!     .range(1, 65535)
//!     .label("Port")
//!     .finish()
//!     .unwrap();
//!
//! let resolved = schema.validate(&Default::default()).unwrap();
//! assert_eq!(resolved["port"], json!(8080));
//! ```

use std::fmt;

use dockyard_core::{value_type_name, ConfigMap, DockyardError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder shown instead of secret values.
pub const REDACTED: &str = "********";

/// Declared type of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl FieldType {
    /// Returns true if `value` has this runtime type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

/// One configuration option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub default: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    /// Display-only flag; validation ignores it.
    #[serde(default)]
    pub secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    /// Check a single value against this field's type and constraints.
    pub fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if !self.field_type.matches(value) {
            return Err(ValidationError::TypeMismatch {
                field: self.key.clone(),
                expected: self.field_type.to_string(),
                actual: value_type_name(value).to_string(),
            });
        }

        if let Some(n) = value.as_i64()
            && (self.min.is_some() || self.max.is_some())
        {
            let min = self.min.unwrap_or(i64::MIN);
            let max = self.max.unwrap_or(i64::MAX);
            if n < min || n > max {
                return Err(ValidationError::Range {
                    field: self.key.clone(),
                    value: n,
                    min,
                    max,
                });
            }
        }

        if let Some(allowed) = &self.allowed
            && !allowed.contains(value)
        {
            return Err(ValidationError::EnumViolation {
                field: self.key.clone(),
                value: value.clone(),
                allowed: allowed.clone(),
            });
        }

        Ok(())
    }
}

/// Ordered, typed option set owned by one plugin-provided feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    fields: Vec<Field>,
}

impl ConfigSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring a field. Call [`FieldBuilder::finish`] to commit it.
    pub fn field(
        &mut self,
        key: impl Into<String>,
        field_type: FieldType,
        default: Value,
    ) -> FieldBuilder<'_> {
        FieldBuilder {
            schema: self,
            field: Field {
                key: key.into(),
                field_type,
                default,
                min: None,
                max: None,
                allowed: None,
                secret: false,
                label: None,
                description: None,
            },
        }
    }

    /// Commit a fully built field.
    ///
    /// Fails with `DuplicateField` if the key is taken, or with a validation
    /// error if the field's default violates its own type or constraints.
    pub fn declare(&mut self, field: Field) -> Result<(), DockyardError> {
        if self.get(&field.key).is_some() {
            return Err(DockyardError::DuplicateField { key: field.key });
        }
        field.check(&field.default)?;
        self.fields.push(field);
        Ok(())
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Default value of every declared field.
    pub fn defaults(&self) -> ConfigMap {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }

    /// Resolve `input` against the schema.
    ///
    /// Every declared field appears in the result, taken from `input` when
    /// present and from the field default otherwise. Keys the schema does
    /// not declare are ignored; see [`ConfigSchema::unknown_keys`].
    pub fn validate(&self, input: &ConfigMap) -> Result<ConfigMap, ValidationError> {
        let mut resolved = ConfigMap::new();
        for field in &self.fields {
            let value = match input.get(&field.key) {
                Some(value) => {
                    field.check(value)?;
                    value.clone()
                }
                None => field.default.clone(),
            };
            resolved.insert(field.key.clone(), value);
        }
        Ok(resolved)
    }

    /// Keys present in `input` that the schema does not declare.
    pub fn unknown_keys<'a>(&self, input: &'a ConfigMap) -> Vec<&'a str> {
        input
            .keys()
            .filter(|k| self.get(k).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Copy of `values` with secret fields masked, for display and logs.
    pub fn redacted(&self, values: &ConfigMap) -> ConfigMap {
        values
            .iter()
            .map(|(k, v)| {
                let secret = self.get(k).is_some_and(|f| f.secret);
                let shown = if secret {
                    Value::String(REDACTED.to_string())
                } else {
                    v.clone()
                };
                (k.clone(), shown)
            })
            .collect()
    }
}

/// Builder for a single field, returned by [`ConfigSchema::field`].
#[must_use = "a field is only declared once `finish` is called"]
pub struct FieldBuilder<'a> {
    schema: &'a mut ConfigSchema,
    field: Field,
}

impl FieldBuilder<'_> {
    /// Inclusive integer bounds.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.field.min = Some(min);
        self.field.max = Some(max);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.field.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.field.max = Some(max);
        self
    }

    /// Restrict the field to a closed set of values.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.field.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.field.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = Some(description.into());
        self
    }

    /// Mark the field as secret. Its value is masked by [`ConfigSchema::redacted`].
    pub fn secret(mut self) -> Self {
        self.field.secret = true;
        self
    }

    /// Commit the field to the schema.
    pub fn finish(self) -> Result<(), DockyardError> {
        self.schema.declare(self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn port_schema() -> ConfigSchema {
        let mut schema = ConfigSchema::new();
        schema
            .field("port", FieldType::Integer, json!(8080))
            .range(1, 65535)
            .finish()
            .unwrap();
        schema
    }

    fn map(value: Value) -> ConfigMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_input_resolves_defaults() {
        let resolved = port_schema().validate(&ConfigMap::new()).unwrap();
        assert_eq!(resolved, map(json!({"port": 8080})));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let err = port_schema()
            .validate(&map(json!({"port": 70000})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Range {
                field: "port".into(),
                value: 70000,
                min: 1,
                max: 65535,
            }
        );
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = port_schema()
            .validate(&map(json!({"port": "80"})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                field: "port".into(),
                expected: "integer".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn float_is_not_an_integer() {
        let err = port_schema()
            .validate(&map(json!({"port": 80.5})))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { actual, .. } if actual == "float"));
    }

    #[test]
    fn integer_above_i64_names_its_range() {
        let err = port_schema()
            .validate(&map(json!({"port": u64::MAX})))
            .unwrap_err();
        let ValidationError::TypeMismatch { expected, actual, .. } = &err else {
            panic!("expected a type mismatch, got {err:?}");
        };
        assert_eq!(expected, "integer");
        assert_ne!(actual, expected);
        assert!(actual.contains("64-bit signed range"));
    }

    #[test]
    fn enum_membership_is_enforced() {
        let mut schema = ConfigSchema::new();
        schema
            .field("version", FieldType::String, json!("16"))
            .one_of(["14", "15", "16"])
            .finish()
            .unwrap();

        assert!(schema.validate(&map(json!({"version": "15"}))).is_ok());
        let err = schema
            .validate(&map(json!({"version": "9"})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::EnumViolation {
                field: "version".into(),
                value: json!("9"),
                allowed: vec![json!("14"), json!("15"), json!("16")],
            }
        );
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let mut schema = port_schema();
        let err = schema
            .field("port", FieldType::Integer, json!(1))
            .finish()
            .unwrap_err();
        assert!(matches!(err, DockyardError::DuplicateField { key } if key == "port"));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn default_must_satisfy_own_constraints() {
        let mut schema = ConfigSchema::new();
        let err = schema
            .field("workers", FieldType::Integer, json!(0))
            .range(1, 8)
            .finish()
            .unwrap_err();
        assert!(matches!(err, DockyardError::Validation(ValidationError::Range { .. })));

        let err = schema
            .field("debug", FieldType::Boolean, json!("yes"))
            .finish()
            .unwrap_err();
        assert!(matches!(
            err,
            DockyardError::Validation(ValidationError::TypeMismatch { .. })
        ));
        assert!(schema.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored_but_reported() {
        let schema = port_schema();
        let input = map(json!({"port": 9000, "prot": 1}));
        let resolved = schema.validate(&input).unwrap();
        assert_eq!(resolved, map(json!({"port": 9000})));
        assert_eq!(schema.unknown_keys(&input), vec!["prot"]);
    }

    #[test]
    fn declaration_order_is_preserved() {
        let mut schema = ConfigSchema::new();
        for key in ["zeta", "alpha", "mid"] {
            schema
                .field(key, FieldType::Boolean, json!(false))
                .finish()
                .unwrap();
        }
        let keys: Vec<&str> = schema.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn secrets_are_redacted_for_display() {
        let mut schema = ConfigSchema::new();
        schema
            .field("PASSWORD", FieldType::String, json!("hunter2"))
            .label("Password")
            .secret()
            .finish()
            .unwrap();
        schema
            .field("USER", FieldType::String, json!("app"))
            .finish()
            .unwrap();

        let shown = schema.redacted(&schema.defaults());
        assert_eq!(shown["PASSWORD"], json!(REDACTED));
        assert_eq!(shown["USER"], json!("app"));
    }

    #[test]
    fn schema_serializes_as_field_list() {
        let json = serde_json::to_value(port_schema()).unwrap();
        assert_eq!(json[0]["key"], json!("port"));
        assert_eq!(json[0]["type"], json!("integer"));
        assert_eq!(json[0]["max"], json!(65535));
    }

    fn mixed_schema() -> ConfigSchema {
        let mut schema = port_schema();
        schema
            .field("name", FieldType::String, json!("app"))
            .finish()
            .unwrap();
        schema
            .field("debug", FieldType::Boolean, json!(false))
            .finish()
            .unwrap();
        schema
    }

    proptest! {
        #[test]
        fn validate_is_idempotent(
            port in proptest::option::of(1i64..=65535),
            name in proptest::option::of("[a-z]{0,12}"),
            debug in proptest::option::of(any::<bool>()),
        ) {
            let schema = mixed_schema();
            let mut input = ConfigMap::new();
            if let Some(p) = port { input.insert("port".into(), json!(p)); }
            if let Some(n) = name { input.insert("name".into(), json!(n)); }
            if let Some(d) = debug { input.insert("debug".into(), json!(d)); }

            let once = schema.validate(&input).unwrap();
            let twice = schema.validate(&once).unwrap();
            prop_assert_eq!(once.len(), 3);
            prop_assert_eq!(once, twice);
        }
    }
}

//! Adapter from the language-neutral analysis output to `utoipa` OpenAPI
//! objects, for downstream document assembly.
//!
//! The [`SchemaNode`](crate::SchemaNode) tree stays the source of truth;
//! this module carries structure, formats, enums and requiredness into the
//! OpenAPI object model. Numeric bounds and examples remain on the neutral
//! tree.

use utoipa::openapi::path::{Parameter, ParameterIn};
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, OneOfBuilder, SchemaType, Type};
use utoipa::openapi::{KnownFormat, Ref, RefOr, Required, Schema, SchemaFormat};

use crate::normalizer::parameters::{ParamLocation, ParamType, ParameterDescriptor};
use crate::schema::SchemaRegistry;
use crate::schema::node::{SchemaNode, StringFormat};

/// Converts a schema node into an inline OpenAPI schema.
pub fn schema_to_openapi(node: &SchemaNode) -> RefOr<Schema> {
    match node {
        SchemaNode::Object(object) => {
            let mut builder = ObjectBuilder::new();
            for (name, child) in &object.properties {
                builder = builder.property(name, schema_to_openapi(child));
            }
            if let Some(required) = &object.required {
                for name in required {
                    builder = builder.required(name);
                }
            }
            RefOr::T(Schema::Object(builder.build()))
        }
        SchemaNode::Array(array) => {
            let mut builder = ArrayBuilder::new();
            if let Some(items) = &array.items {
                builder = builder.items(schema_to_openapi(items));
            }
            RefOr::T(Schema::Array(builder.build()))
        }
        SchemaNode::String(string) => {
            let mut builder = ObjectBuilder::new().schema_type(Type::String);
            if let Some(format) = string.format {
                builder = builder.format(Some(string_format(format)));
            }
            if let Some(values) = &string.enum_values {
                builder = builder.enum_values(Some(values.clone()));
            }
            RefOr::T(Schema::Object(builder.build()))
        }
        SchemaNode::Integer(_) => {
            let builder = ObjectBuilder::new()
                .schema_type(Type::Integer)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64)));
            RefOr::T(Schema::Object(builder.build()))
        }
        SchemaNode::Number(_) => {
            let builder = ObjectBuilder::new()
                .schema_type(Type::Number)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double)));
            RefOr::T(Schema::Object(builder.build()))
        }
        SchemaNode::Boolean => {
            RefOr::T(Schema::Object(
                ObjectBuilder::new().schema_type(Type::Boolean).build(),
            ))
        }
        // JSON Schema has no standalone-null type usable downstream; a
        // nullable string placeholder stands in.
        SchemaNode::Null => RefOr::T(Schema::Object(
            ObjectBuilder::new()
                .schema_type(SchemaType::Array(vec![Type::String, Type::Null]))
                .build(),
        )),
        SchemaNode::Union(union) => {
            let mut builder = OneOfBuilder::new();
            for variant in &union.variants {
                builder = builder.item(schema_to_openapi(variant));
            }
            RefOr::T(Schema::OneOf(builder.build()))
        }
    }
}

/// Reference to a hoisted schema by its registry name.
pub fn schema_ref(name: &str) -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(name))
}

/// Converts the hoisting registry into a components-ready list of named
/// schemas, in registration order.
pub fn registry_components(registry: &SchemaRegistry) -> Vec<(String, RefOr<Schema>)> {
    registry
        .iter()
        .map(|(name, node)| (name.to_string(), schema_to_openapi(node)))
        .collect()
}

/// Converts a merged parameter descriptor into an OpenAPI parameter.
pub fn parameter_to_openapi(descriptor: &ParameterDescriptor, location: ParamLocation) -> Parameter {
    let schema = ObjectBuilder::new()
        .schema_type(param_type(descriptor.param_type))
        .build();
    Parameter::builder()
        .name(&descriptor.name)
        .parameter_in(parameter_in(location))
        .required(if descriptor.required {
            Required::True
        } else {
            Required::False
        })
        .schema(Some(RefOr::T(Schema::Object(schema))))
        .build()
}

fn parameter_in(location: ParamLocation) -> ParameterIn {
    match location {
        ParamLocation::Path => ParameterIn::Path,
        ParamLocation::Query => ParameterIn::Query,
        ParamLocation::Header => ParameterIn::Header,
    }
}

fn param_type(param_type: ParamType) -> Type {
    match param_type {
        ParamType::String => Type::String,
        ParamType::Integer => Type::Integer,
        ParamType::Number => Type::Number,
        ParamType::Boolean => Type::Boolean,
    }
}

fn string_format(format: StringFormat) -> SchemaFormat {
    match format {
        StringFormat::DateTime => SchemaFormat::KnownFormat(KnownFormat::DateTime),
        StringFormat::Date => SchemaFormat::KnownFormat(KnownFormat::Date),
        StringFormat::Email => SchemaFormat::Custom("email".to_string()),
        StringFormat::Uri => SchemaFormat::Custom("uri".to_string()),
    }
}

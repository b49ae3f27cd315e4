// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed views over the binding annotations.

mod assisted;
mod injection;
mod map_key;
mod module_annotation;

pub use assisted::{
    assisted_factory_method, assisted_identifier, assisted_inject_constructor, is_assisted_factory_type,
    is_assisted_inject_constructor, is_assisted_parameter,
};
pub use injection::{inject_constructor, map_keys, qualifiers, scopes};
pub use map_key::{MapKeyAnnotation, annotation_members, map_key_type, nested_annotation_types, unwrapped_value};
pub use module_annotation::{ModuleAnnotation, NotAModuleAnnotation};

//! Builtin function table
//!
//! Each row maps one member onto a grammar function through a format
//! template. Rows declared on `ICollection<?>` or `List<?>` are wildcard
//! templates bound to concrete element types on lookup.

use crate::types::{MemberIdentity, TypeRef};

/// One row of a function table
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub member: MemberIdentity,
    /// Parameter types excluding the receiver; for generic method
    /// definitions these are the open parameter types
    pub parameter_types: Vec<TypeRef>,
    pub returns: TypeRef,
    pub template: String,
}

impl FunctionSpec {
    pub fn property(declaring: TypeRef, name: &str, returns: TypeRef, template: &str) -> Self {
        Self {
            member: MemberIdentity::property(declaring, name),
            parameter_types: Vec::new(),
            returns,
            template: template.to_string(),
        }
    }

    pub fn method(declaring: TypeRef, name: &str, params: Vec<TypeRef>, returns: TypeRef, template: &str) -> Self {
        Self {
            member: MemberIdentity::method(declaring, name, params.clone()),
            parameter_types: params,
            returns,
            template: template.to_string(),
        }
    }

    pub fn static_method(declaring: TypeRef, name: &str, params: Vec<TypeRef>, returns: TypeRef, template: &str) -> Self {
        Self {
            member: MemberIdentity::static_method(declaring, name, params.clone()),
            parameter_types: params,
            returns,
            template: template.to_string(),
        }
    }

    pub fn generic_static_method(
        declaring: TypeRef,
        name: &str,
        arity: usize,
        params: Vec<TypeRef>,
        returns: TypeRef,
        template: &str,
    ) -> Self {
        Self {
            member: MemberIdentity::generic_static_method(declaring, name, arity),
            parameter_types: params,
            returns,
            template: template.to_string(),
        }
    }

    /// Argument types in call-site order, receiver first for instance members
    pub fn argument_types(&self) -> Vec<TypeRef> {
        let mut types = Vec::with_capacity(self.parameter_types.len() + 1);
        if self.member.is_instance() {
            types.push(self.member.declaring_type.clone());
        }
        types.extend(self.parameter_types.iter().cloned());
        types
    }
}

/// The fixed table the process-wide registry is built from
pub fn builtin_functions() -> Vec<FunctionSpec> {
    let string = TypeRef::string;
    let int32 = TypeRef::int32;
    let double = TypeRef::double;
    let decimal = TypeRef::decimal;
    let boolean = TypeRef::boolean;
    let date_time = TypeRef::date_time;
    let math = || TypeRef::named("Math");
    let enumerable = || TypeRef::named("Enumerable");
    let any_collection = || TypeRef::collection(TypeRef::Wildcard);
    let any_list = || TypeRef::list(TypeRef::Wildcard);

    vec![
        // string
        FunctionSpec::property(string(), "Length", int32(), "length({0})"),
        FunctionSpec::method(string(), "StartsWith", vec![string()], boolean(), "startswith({0},{1})"),
        FunctionSpec::method(string(), "EndsWith", vec![string()], boolean(), "endswith({0},{1})"),
        FunctionSpec::method(string(), "Contains", vec![string()], boolean(), "substringof({1},{0})"),
        FunctionSpec::method(string(), "IndexOf", vec![string()], int32(), "indexof({0},{1})"),
        FunctionSpec::method(string(), "Replace", vec![string(), string()], string(), "replace({0},{1},{2})"),
        FunctionSpec::method(string(), "Substring", vec![int32()], string(), "substring({0},{1})"),
        FunctionSpec::method(string(), "Substring", vec![int32(), int32()], string(), "substring({0},{1},{2})"),
        FunctionSpec::method(string(), "ToLower", vec![], string(), "tolower({0})"),
        FunctionSpec::method(string(), "ToUpper", vec![], string(), "toupper({0})"),
        FunctionSpec::method(string(), "Trim", vec![], string(), "trim({0})"),
        FunctionSpec::static_method(string(), "Concat", vec![string(), string()], string(), "concat({0},{1})"),
        // date/time
        FunctionSpec::property(date_time(), "Year", int32(), "year({0})"),
        FunctionSpec::property(date_time(), "Month", int32(), "month({0})"),
        FunctionSpec::property(date_time(), "Day", int32(), "day({0})"),
        FunctionSpec::property(date_time(), "Hour", int32(), "hour({0})"),
        FunctionSpec::property(date_time(), "Minute", int32(), "minute({0})"),
        FunctionSpec::property(date_time(), "Second", int32(), "second({0})"),
        // numeric
        FunctionSpec::static_method(math(), "Round", vec![double()], double(), "round({0})"),
        FunctionSpec::static_method(math(), "Round", vec![decimal()], decimal(), "round({0})"),
        FunctionSpec::static_method(math(), "Floor", vec![double()], double(), "floor({0})"),
        FunctionSpec::static_method(math(), "Floor", vec![decimal()], decimal(), "floor({0})"),
        FunctionSpec::static_method(math(), "Ceiling", vec![double()], double(), "ceiling({0})"),
        FunctionSpec::static_method(math(), "Ceiling", vec![decimal()], decimal(), "ceiling({0})"),
        // collections
        FunctionSpec::property(any_list(), "Count", int32(), "count({0})"),
        FunctionSpec::property(any_collection(), "Count", int32(), "count({0})"),
        FunctionSpec::method(any_collection(), "Contains", vec![TypeRef::Wildcard], boolean(), "contains({0},{1})"),
        FunctionSpec::generic_static_method(
            enumerable(),
            "Any",
            1,
            vec![TypeRef::enumerable(TypeRef::Wildcard)],
            boolean(),
            "any({0})",
        ),
        FunctionSpec::generic_static_method(
            enumerable(),
            "Count",
            1,
            vec![TypeRef::enumerable(TypeRef::Wildcard)],
            int32(),
            "count({0})",
        ),
    ]
}

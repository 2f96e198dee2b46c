//! Function/member mapping registry
//!
//! Built once from a function table, then read-only. Lookups:
//!
//! - forward: member identity → grammar function (filter compilation)
//! - reverse: grammar name + arguments → call-site expression (filter parsing)
//!
//! Wildcard rows (`ICollection<?>.Count`) are registered as templates when the
//! registry is built and bound to concrete element types on first lookup. The
//! bound mappings are cached; the cache is the only state written after build.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use super::errors::{RegistryError, RegistryResult};
use super::table::{builtin_functions, FunctionSpec};
use super::template::FormatTemplate;
use crate::expr::Expr;
use crate::observability::{log_event_with_fields, Event};
use crate::types::{MemberIdentity, TemplateKey, TypeCatalog, TypeRef};

/// A member mapped onto a grammar function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionMapping {
    member: MemberIdentity,
    template: FormatTemplate,
    /// Call-site order, receiver first for instance members
    argument_types: Vec<TypeRef>,
    returns: TypeRef,
}

impl FunctionMapping {
    pub fn member(&self) -> &MemberIdentity {
        &self.member
    }

    pub fn grammar_name(&self) -> &str {
        self.template.grammar_name()
    }

    pub fn format_template(&self) -> &FormatTemplate {
        &self.template
    }

    pub fn argument_order(&self) -> &[usize] {
        self.template.argument_order()
    }

    pub fn argument_types(&self) -> &[TypeRef] {
        &self.argument_types
    }

    pub fn argument_count(&self) -> usize {
        self.argument_types.len()
    }

    pub fn returns(&self) -> &TypeRef {
        &self.returns
    }

    /// Returns true for wildcard rows that bind on lookup
    pub fn is_template(&self) -> bool {
        self.member.declaring_type.contains_wildcard()
    }
}

/// Bidirectional member ↔ grammar function registry
#[derive(Debug)]
pub struct FunctionRegistry {
    catalog: TypeCatalog,
    /// Table order
    entries: Vec<Arc<FunctionMapping>>,
    by_member: HashMap<MemberIdentity, Arc<FunctionMapping>>,
    templates: HashMap<TemplateKey, Arc<FunctionMapping>>,
    by_grammar: HashMap<(String, usize), Vec<Arc<FunctionMapping>>>,
    instantiated: RwLock<HashMap<MemberIdentity, Arc<FunctionMapping>>>,
}

impl FunctionRegistry {
    /// The process-wide registry built from the builtin table.
    ///
    /// Built on first use; a failed build is returned to every caller.
    pub fn builtin() -> RegistryResult<&'static FunctionRegistry> {
        static BUILTIN: OnceLock<RegistryResult<FunctionRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Self::build(builtin_functions(), TypeCatalog::builtin()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Builds a registry from a function table and a generic type catalog
    pub fn build(
        specs: impl IntoIterator<Item = FunctionSpec>,
        catalog: TypeCatalog,
    ) -> RegistryResult<Self> {
        match Self::build_inner(specs, catalog) {
            Ok(registry) => {
                log_event_with_fields(
                    Event::RegistryBuilt,
                    &[
                        ("mappings", &registry.entries.len().to_string()),
                        ("templates", &registry.templates.len().to_string()),
                    ],
                );
                Ok(registry)
            }
            Err(err) => {
                log_event_with_fields(
                    Event::RegistryBuildFailed,
                    &[("code", err.code()), ("reason", &err.to_string())],
                );
                Err(err)
            }
        }
    }

    fn build_inner(
        specs: impl IntoIterator<Item = FunctionSpec>,
        catalog: TypeCatalog,
    ) -> RegistryResult<Self> {
        let mut entries = Vec::new();
        let mut by_member = HashMap::new();
        let mut templates = HashMap::new();
        let mut by_grammar: HashMap<(String, usize), Vec<Arc<FunctionMapping>>> = HashMap::new();

        for spec in specs {
            let argument_types = spec.argument_types();
            let template = FormatTemplate::parse(&spec.template, argument_types.len()).map_err(
                |reason| RegistryError::MalformedFormatTemplate {
                    member: spec.member.to_string(),
                    template: spec.template.clone(),
                    reason,
                },
            )?;
            let mapping = Arc::new(FunctionMapping {
                member: spec.member.clone(),
                template,
                argument_types,
                returns: spec.returns.clone(),
            });

            if mapping.is_template() {
                let key = Self::validate_template(&catalog, &spec.member)?;
                if templates.insert(key, Arc::clone(&mapping)).is_some() {
                    return Err(RegistryError::DuplicateMapping(spec.member.to_string()));
                }
            } else if by_member.insert(spec.member.clone(), Arc::clone(&mapping)).is_some() {
                return Err(RegistryError::DuplicateMapping(spec.member.to_string()));
            }

            by_grammar
                .entry((mapping.grammar_name().to_string(), mapping.argument_count()))
                .or_default()
                .push(Arc::clone(&mapping));
            entries.push(mapping);
        }

        Ok(Self {
            catalog,
            entries,
            by_member,
            templates,
            by_grammar,
            instantiated: RwLock::new(HashMap::new()),
        })
    }

    /// A wildcard row must resolve to exactly one member of its generic definition
    fn validate_template(catalog: &TypeCatalog, member: &MemberIdentity) -> RegistryResult<TemplateKey> {
        let unknown = || RegistryError::UnknownTemplateMember {
            member: member.to_string(),
            definition: member
                .declaring_type
                .definition()
                .unwrap_or("<none>")
                .to_string(),
        };
        let key = TemplateKey::for_member(member).ok_or_else(unknown)?;
        match catalog.candidates(&key.definition, &key.name, key.kind).len() {
            0 => Err(unknown()),
            1 => Ok(key),
            candidates => Err(RegistryError::AmbiguousMemberMapping {
                member: member.to_string(),
                definition: key.definition,
                candidates,
            }),
        }
    }

    /// Number of table rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mappings in table order
    pub fn mappings(&self) -> impl Iterator<Item = &FunctionMapping> {
        self.entries.iter().map(AsRef::as_ref)
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Forward lookup: the grammar form of `member`, if mapped
    pub fn try_get_grammar_form(&self, member: &MemberIdentity) -> Option<Arc<FunctionMapping>> {
        if let Some(mapping) = self.by_member.get(member) {
            return Some(Arc::clone(mapping));
        }

        let key = TemplateKey::for_member(member)?;
        if let Ok(cache) = self.instantiated.read() {
            if let Some(mapping) = cache.get(member) {
                return Some(Arc::clone(mapping));
            }
        }

        let template = self.templates.get(&key)?;
        let concrete = self.instantiate(template, &member.declaring_type)?;
        if concrete.member != *member {
            return None;
        }
        Some(concrete)
    }

    /// Binds a wildcard mapping to a constructed declaring type and caches the result
    fn instantiate(&self, template: &FunctionMapping, declaring: &TypeRef) -> Option<Arc<FunctionMapping>> {
        if !template.member.declaring_type.accepts(declaring) {
            return None;
        }
        let bound = self.catalog.rebind(declaring, &template.member.name, template.member.kind);
        // more than one candidate was rejected when the registry was built
        let [only] = bound.as_slice() else {
            return None;
        };

        if let Ok(cache) = self.instantiated.read() {
            if let Some(mapping) = cache.get(&only.identity) {
                return Some(Arc::clone(mapping));
            }
        }

        let mut argument_types = vec![declaring.clone()];
        argument_types.extend(only.identity.params().unwrap_or_default().iter().cloned());
        let mapping = Arc::new(FunctionMapping {
            member: only.identity.clone(),
            template: template.template.clone(),
            argument_types,
            returns: only.returns.clone(),
        });

        log_event_with_fields(
            Event::MappingInstantiated,
            &[("member", &only.identity.to_string()), ("template", template.template.text())],
        );
        match self.instantiated.write() {
            Ok(mut cache) => Some(Arc::clone(
                cache.entry(only.identity.clone()).or_insert(mapping),
            )),
            Err(_) => Some(mapping),
        }
    }

    /// Reverse lookup: rebuilds a call-site expression from a grammar function
    /// name and its grammar-positional arguments.
    ///
    /// Instance properties come back as member access on the receiver; every
    /// other mapping comes back as a call with the receiver (if any) first.
    pub fn try_parse_call(&self, grammar_name: &str, args: Vec<Expr>) -> Option<Expr> {
        let candidates = self.by_grammar.get(&(grammar_name.to_string(), args.len()))?;
        let actual: Vec<TypeRef> = args.iter().map(Expr::ty).collect();

        let chosen = candidates
            .iter()
            .find(|m| self.signature_matches(m, &actual, false))
            .or_else(|| candidates.iter().find(|m| self.signature_matches(m, &actual, true)))?;

        let call_args = chosen.template.to_call_order(args);
        let (member, returns) = self.concrete_member(chosen, &call_args)?;

        if member.is_property() && member.is_instance() {
            let receiver = call_args.into_iter().next()?;
            Some(Expr::Member {
                target: Box::new(receiver),
                member,
                ty: returns,
            })
        } else {
            Some(Expr::Call {
                member,
                args: call_args,
                ty: returns,
            })
        }
    }

    /// Compares grammar-positional argument types with a mapping's signature.
    ///
    /// Strict matching requires structural equality (wildcards aside);
    /// relaxed matching also accepts derived collection types.
    fn signature_matches(&self, mapping: &FunctionMapping, actual: &[TypeRef], relaxed: bool) -> bool {
        let expected = mapping.template.to_grammar_order(&mapping.argument_types);
        expected.len() == actual.len()
            && expected.iter().zip(actual).all(|(expected, actual)| {
                *actual == TypeRef::object()
                    || expected.accepts(actual)
                    || (relaxed && self.catalog.is_assignable(expected, actual))
            })
    }

    fn concrete_member(&self, mapping: &FunctionMapping, call_args: &[Expr]) -> Option<(MemberIdentity, TypeRef)> {
        if !mapping.is_template() {
            return Some((mapping.member.clone(), mapping.returns.clone()));
        }
        let receiver = call_args.first()?.ty();
        let definition = mapping.member.declaring_type.definition()?;
        let declaring = self.catalog.view_as(&receiver, definition)?;
        let concrete = self.instantiate(mapping, &declaring)?;
        Some((concrete.member.clone(), concrete.returns.clone()))
    }
}

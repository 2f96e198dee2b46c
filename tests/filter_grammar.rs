//! Filter Grammar Tests
//!
//! Test Categories:
//! 1. Literal rendering
//! 2. Function and member mapping
//! 3. Rejections
//! 4. Parse/compile agreement
//! 5. Determinism

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use wirequery::expr::{DateTimeValue, Expr, Lambda, Literal};
use wirequery::filter::{FilterCompiler, FilterError, FilterParser, StaticMetadata};
use wirequery::registry::FunctionRegistry;
use wirequery::types::{MemberIdentity, TypeRef};

fn registry() -> &'static FunctionRegistry {
    FunctionRegistry::builtin().expect("builtin registry")
}

fn critter() -> TypeRef {
    TypeRef::named("Critter")
}

fn compile(predicate: &Lambda) -> Result<String, FilterError> {
    FilterCompiler::new(registry()).compile(predicate)
}

fn compare_jalla(value: Expr) -> Lambda {
    Lambda::build("x", critter(), |x| x.property("Jalla", TypeRef::string()).equal(value))
}

// =============================================================================
// LITERAL RENDERING
// =============================================================================

#[test]
fn test_string_literal() {
    assert_eq!(compile(&compare_jalla(Expr::constant("What"))).unwrap(), "(jalla eq 'What')");
}

#[test]
fn test_string_literal_with_quote() {
    assert_eq!(
        compile(&compare_jalla(Expr::constant("It's"))).unwrap(),
        "(jalla eq 'It''s')"
    );
}

#[test]
fn test_null_literal() {
    assert_eq!(
        compile(&compare_jalla(Expr::null(TypeRef::string()))).unwrap(),
        "(jalla eq null)"
    );
}

#[test]
fn test_decimal_literal_keeps_scale() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Cashamount", TypeRef::decimal())
            .equal(Expr::constant(Decimal::new(10010, 2)))
    });
    assert_eq!(compile(&predicate).unwrap(), "(cashamount eq 100.10m)");
}

#[test]
fn test_double_literal() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Precise", TypeRef::double()).equal(Expr::constant(10.25))
    });
    assert_eq!(compile(&predicate).unwrap(), "(precise eq 10.25)");
}

#[test]
fn test_boolean_literal() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("IsHungry", TypeRef::boolean()).equal(Expr::constant(true))
    });
    assert_eq!(compile(&predicate).unwrap(), "(isHungry eq true)");
}

#[test]
fn test_utc_datetime_literal() {
    let at = Utc.with_ymd_and_hms(2012, 10, 22, 5, 32, 45).unwrap();
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("CreatedOn", TypeRef::date_time()).equal(Expr::constant(at))
    });
    assert_eq!(
        compile(&predicate).unwrap(),
        "(createdOn eq datetime'2012-10-22T05:32:45Z')"
    );
}

#[test]
fn test_local_datetime_literal_has_no_zone() {
    let wall = NaiveDate::from_ymd_opt(2012, 10, 22)
        .unwrap()
        .and_hms_opt(5, 32, 45)
        .unwrap();
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("CreatedOn", TypeRef::date_time())
            .equal(Expr::constant(DateTimeValue::local(wall)))
    });
    assert_eq!(
        compile(&predicate).unwrap(),
        "(createdOn eq datetime'2012-10-22T05:32:45')"
    );
}

#[test]
fn test_guid_literal() {
    let id = Uuid::parse_str("c2fb4bcb-2e4c-4d36-9a2b-4e5f3e0d2b41").unwrap();
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Guid", TypeRef::guid()).equal(Expr::constant(id))
    });
    assert_eq!(
        compile(&predicate).unwrap(),
        "(guid eq guid'c2fb4bcb-2e4c-4d36-9a2b-4e5f3e0d2b41')"
    );
}

// =============================================================================
// FUNCTION AND MEMBER MAPPING
// =============================================================================

#[test]
fn test_starts_with() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Jalla", TypeRef::string()).call_method(
            "StartsWith",
            vec![Expr::constant("Gangnam")],
            TypeRef::boolean(),
        )
    });
    assert_eq!(compile(&predicate).unwrap(), "startswith(jalla,'Gangnam')");
}

#[test]
fn test_contains_reorders_arguments() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Jalla", TypeRef::string()).call_method(
            "Contains",
            vec![Expr::constant("cool")],
            TypeRef::boolean(),
        )
    });
    assert_eq!(compile(&predicate).unwrap(), "substringof('cool',jalla)");
}

#[test]
fn test_substring_overloads() {
    let predicate = Lambda::build("x", critter(), |x| {
        let name = x.property("Name", TypeRef::string());
        name.clone()
            .call_method("Substring", vec![Expr::constant(1)], TypeRef::string())
            .equal(name.call_method(
                "Substring",
                vec![Expr::constant(0), Expr::constant(2)],
                TypeRef::string(),
            ))
    });
    assert_eq!(
        compile(&predicate).unwrap(),
        "(substring(name,1) eq substring(name,0,2))"
    );
}

#[test]
fn test_date_part_property() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("CreatedOn", TypeRef::date_time())
            .property("Year", TypeRef::int32())
            .greater_or_equal(Expr::constant(2012))
    });
    assert_eq!(compile(&predicate).unwrap(), "(year(createdOn) ge 2012)");
}

#[test]
fn test_static_math_call() {
    let predicate = Lambda::build("x", critter(), |x| {
        let price = x.property("Price", TypeRef::decimal());
        let round = MemberIdentity::static_method(TypeRef::named("Math"), "Round", vec![TypeRef::decimal()]);
        Expr::call(round, vec![price], TypeRef::decimal()).less_than(Expr::constant(Decimal::new(5, 0)))
    });
    assert_eq!(compile(&predicate).unwrap(), "(round(price) lt 5m)");
}

#[test]
fn test_generic_collection_members() {
    let weapons = TypeRef::list(TypeRef::named("Weapon"));
    let predicate = Lambda::build("x", critter(), |x| {
        let list = x.property("Weapons", weapons.clone());
        let any = MemberIdentity::generic_static_method(TypeRef::named("Enumerable"), "Any", 1);
        Expr::call(any, vec![list.clone()], TypeRef::boolean())
            .and_also(list.property("Count", TypeRef::int32()).greater_than(Expr::constant(2)))
    });
    assert_eq!(
        compile(&predicate).unwrap(),
        "(any(weapons) and (count(weapons) gt 2))"
    );
}

// =============================================================================
// REJECTIONS
// =============================================================================

#[test]
fn test_unmapped_method_is_rejected() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Jalla", TypeRef::string())
            .call_method("PadRight", vec![Expr::constant(5)], TypeRef::string())
            .equal(Expr::constant("x"))
    });
    let err = compile(&predicate).unwrap_err();
    assert_eq!(err.code(), "WQ_UNMAPPED_MEMBER");
}

#[test]
fn test_unmapped_property_on_call_result() {
    let predicate = Lambda::build("x", critter(), |x| {
        x.property("Jalla", TypeRef::string())
            .call_method("Trim", vec![], TypeRef::string())
            .property("Chars", TypeRef::int32())
            .equal(Expr::constant(1))
    });
    assert!(matches!(compile(&predicate), Err(FilterError::UnmappedMember(_))));
}

// =============================================================================
// PARSE/COMPILE AGREEMENT
// =============================================================================

fn metadata() -> StaticMetadata {
    StaticMetadata::new()
        .with_property(critter(), "Jalla", TypeRef::string())
        .with_property(critter(), "Name", TypeRef::string())
        .with_property(critter(), "Precise", TypeRef::double())
        .with_property(critter(), "Cashamount", TypeRef::decimal())
        .with_property(critter(), "CreatedOn", TypeRef::date_time())
        .with_property(critter(), "Weapons", TypeRef::list(TypeRef::named("Weapon")))
}

#[test]
fn test_parsed_filters_compile_back_identically() {
    let metadata = metadata();
    let parser = FilterParser::new(registry(), &metadata);
    for filter in [
        "(jalla eq 'What')",
        "(jalla eq 'It''s')",
        "(jalla eq null)",
        "(cashamount eq 100.10m)",
        "(precise eq 10.25)",
        "(createdOn eq datetime'2012-10-22T05:32:45Z')",
        "(createdOn eq datetime'2012-10-22T05:32:45')",
        "startswith(jalla,'Gangnam')",
        "substringof('cool',jalla)",
        "((year(createdOn) ge 2012) or (month(createdOn) eq 1))",
        "(tolower(trim(name)) ne 'rex')",
        "(substring(name,0,2) eq 'Re')",
        "(count(weapons) gt 2)",
        "(round(precise) lt 3.5)",
    ] {
        let predicate = parser.parse(filter, &critter()).expect(filter);
        assert_eq!(compile(&predicate).unwrap(), filter);
    }
}

#[test]
fn test_double_literals_parse_back_as_doubles() {
    let metadata = metadata();
    let parser = FilterParser::new(registry(), &metadata);
    for value in [10.0, 1e21, -1e300, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let predicate = Lambda::build("x", critter(), |x| {
            x.property("Precise", TypeRef::double()).equal(Expr::constant(value))
        });
        let filter = compile(&predicate).unwrap();
        let parsed = parser.parse(&filter, &critter()).expect(&filter);
        match &parsed.body {
            Expr::Binary { right, .. } => {
                assert!(matches!(&**right, Expr::Constant { value: Literal::Double(_), .. }), "{}", filter);
            }
            other => panic!("expected comparison, got {:?}", other),
        }
        assert_eq!(compile(&parsed).unwrap(), filter);
    }
}

#[test]
fn test_integer_literal_against_integer_member_stays_integer() {
    let metadata = metadata().with_property(critter(), "Age", TypeRef::int32());
    let parsed = FilterParser::new(registry(), &metadata)
        .parse("(age eq 10)", &critter())
        .unwrap();
    match &parsed.body {
        Expr::Binary { right, .. } => assert_eq!(&**right, &Expr::constant(10)),
        other => panic!("expected comparison, got {:?}", other),
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

proptest! {
    #[test]
    fn prop_recompilation_is_byte_identical(name in "[A-Za-z ']{0,16}", n in any::<i32>(), d in -1.0e6f64..1.0e6f64) {
        let predicate = Lambda::build("x", critter(), |x| {
            x.clone().property("Jalla", TypeRef::string()).equal(Expr::constant(name.as_str()))
                .and_also(x.clone().property("Age", TypeRef::int32()).greater_than(Expr::constant(n)))
                .or_else(x.property("Precise", TypeRef::double()).less_or_equal(Expr::constant(d)))
        });
        let first = compile(&predicate).unwrap();
        let second = compile(&predicate.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_string_literals_round_trip(text in "[^\\x00]{0,24}") {
        let metadata = metadata();
        let parser = FilterParser::new(registry(), &metadata);
        let filter = compile(&compare_jalla(Expr::constant(text.as_str()))).unwrap();
        let parsed = parser.parse(&filter, &critter()).unwrap();
        match &parsed.body {
            Expr::Binary { right, .. } => {
                prop_assert_eq!(&**right, &Expr::constant(Literal::String(text.clone())));
            }
            other => prop_assert!(false, "expected comparison, got {:?}", other),
        }
    }
}

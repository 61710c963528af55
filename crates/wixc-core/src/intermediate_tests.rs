use crate::symbol::{CacheType, PackageDetails, PackageSymbol, PropertySymbol, YesNoDefault};
use crate::{
    ComplexReference, ComplexReferenceChild, ComplexReferenceParent, Identifier, Intermediate,
    PackageKind, Section, SectionKind, SimpleReference, Symbol, SymbolData, SymbolKind,
};

fn property(section: crate::SectionId, id: &str, value: &str) -> Symbol {
    Symbol {
        id: Identifier::global(id),
        section,
        data: SymbolData::Property(PropertySymbol {
            value: Some(value.to_owned()),
            secure: false,
            hidden: false,
            admin: false,
        }),
    }
}

#[test]
fn dump_groups_symbols_by_section() {
    let mut ir = Intermediate::new();
    let fragment = ir.add_section(Section::new(None, SectionKind::Fragment, 1));
    let module = ir.add_section(Section::new(Some("Mod".into()), SectionKind::Module, 1));
    ir.push_symbol(property(module, "B", "2"));
    ir.push_symbol(property(fragment, "A", "1"));
    ir.push_simple_reference(SimpleReference {
        kind: SymbolKind::Directory,
        id: "INSTALLFOLDER".into(),
    });
    ir.push_complex_reference(ComplexReference {
        parent_kind: ComplexReferenceParent::PackageGroup,
        parent_id: "WixChain".into(),
        child_kind: ComplexReferenceChild::Package,
        child_id: "B".into(),
        previous: Some((ComplexReferenceChild::Package, "A".into())),
    });

    insta::assert_snapshot!(ir.dump(), @r"
    section Fragment
      Property A value=1 secure=false hidden=false admin=false
    section Module Mod
      Property B value=2 secure=false hidden=false admin=false
    ref Directory:INSTALLFOLDER
    group PackageGroup:WixChain -> Package:B after Package:A
    ");
}

#[test]
fn fields_flatten_nested_details() {
    let data = SymbolData::Package(PackageSymbol {
        package_kind: PackageKind::Msp,
        payload: "patch.msp".into(),
        cache: CacheType::Keep,
        cache_id: None,
        description: None,
        display_name: None,
        install_condition: None,
        log_path_variable: None,
        rollback_log_path_variable: None,
        permanent: false,
        vital: true,
        visible: None,
        per_machine: Some(YesNoDefault::Default),
        details: PackageDetails::Msp { slipstream: true },
    });

    let fields = data.fields();
    assert_eq!(fields["packageKind"], "Msp");
    assert_eq!(fields["perMachine"], "default");
    assert_eq!(fields["details.type"], "msp");
    assert_eq!(fields["details.slipstream"], "true");
    assert!(!fields.contains_key("cacheId"));
    assert!(!fields.contains_key("kind"));
}

#[test]
fn append_remaps_sections() {
    let mut first = Intermediate::new();
    let s = first.add_section(Section::new(None, SectionKind::Fragment, 1));
    first.push_symbol(property(s, "A", "1"));

    let mut second = Intermediate::new();
    let s = second.add_section(Section::new(None, SectionKind::Fragment, 2));
    second.push_symbol(property(s, "B", "2"));

    first.append(second);

    let b = first.symbol("B").expect("B was appended");
    assert_eq!(first.section(b.section).compilation_id, 2);
    assert_eq!(first.symbols().len(), 2);
}

#[test]
#[should_panic(expected = "emitted before its section")]
fn symbol_requires_section() {
    let mut ir = Intermediate::new();
    ir.push_symbol(property(crate::SectionId(0), "A", "1"));
}

#[test]
fn json_carries_kind_tag() {
    let mut ir = Intermediate::new();
    let s = ir.add_section(Section::new(None, SectionKind::Fragment, 1));
    ir.push_symbol(property(s, "A", "1"));

    let json = ir.to_json().expect("serializable");
    assert!(json.contains("\"kind\": \"Property\""));
}

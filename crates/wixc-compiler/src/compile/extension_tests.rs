use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use indoc::indoc;
use wixc_core::{ComplexReferenceChild, ComplexReferenceParent, SymbolKind};

use crate::diagnostics::DiagnosticKind;
use crate::document::{Attribute, Document, Element};
use crate::test_utils::{messages, wix};
use crate::{Compiler, CompilerExtension, ContextMap, ExtensionContext};

const UTIL: &str = "http://wixtoolset.org/schemas/v4/wxs/util";

/// Handles `util:*` nodes and records what it was shown.
#[derive(Default, Clone)]
struct Util {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Util {
    fn record(&self, what: String) {
        self.seen.lock().unwrap().push(what);
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

fn describe(context: &ContextMap) -> String {
    context
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl CompilerExtension for Util {
    fn namespace(&self) -> &str {
        UTIL
    }

    fn parse_attribute(
        &self,
        cx: &mut ExtensionContext<'_>,
        element: Element<'_>,
        attribute: &Attribute,
        context: &ContextMap,
    ) -> bool {
        self.record(format!(
            "{}/@{} [{}]",
            element.local_name(),
            attribute.local_name(),
            describe(context)
        ));
        match attribute.local_name() {
            "Decline" => false,
            "Flag" => {
                cx.yes_no(element, attribute);
                true
            }
            _ => true,
        }
    }

    fn parse_element(
        &self,
        cx: &mut ExtensionContext<'_>,
        parent: Element<'_>,
        element: Element<'_>,
        context: &ContextMap,
    ) -> bool {
        self.record(format!(
            "{}/{} [{}]",
            parent.local_name(),
            element.local_name(),
            describe(context)
        ));
        if element.local_name() != "Search" {
            return false;
        }
        let Some(id) = element.attribute("Id") else {
            cx.report(DiagnosticKind::MissingRequiredAttribute, element.range())
                .message("Search/@Id")
                .emit();
            return true;
        };
        let id = cx.identifier(element, id);
        if let Some(group) = context.get("Id") {
            cx.register_complex_reference(
                ComplexReferenceParent::PackageGroup,
                group,
                ComplexReferenceChild::Package,
                &id.id,
            );
        }
        cx.create_simple_reference(SymbolKind::Variable, "SearchResult");
        let mut fields = IndexMap::new();
        let section = cx.compilation().active_section_kind();
        fields.insert("section".to_owned(), format!("{section:?}"));
        cx.emit_symbol(id, "UtilSearch", fields);
        true
    }
}

fn compile_with(util: &Util, body: &str) -> crate::CompileOutput {
    let source = wix(body).replace("<Wix ", &format!("<Wix xmlns:util=\"{UTIL}\" "));
    let document = Document::parse(&source).unwrap();
    Compiler::builder()
        .with_extension(util.clone())
        .build()
        .compile(&document)
        .unwrap()
}

#[test]
fn attribute_sees_resolved_id() {
    let util = Util::default();
    let output = compile_with(
        &util,
        r#"<Fragment><PackageGroup Id="Prereqs" util:Tag="x" /></Fragment>"#,
    );
    assert!(output.is_success());
    assert_eq!(util.seen(), ["PackageGroup/@Tag [Id=Prereqs]"]);
}

#[test]
fn attribute_sees_synthesized_context() {
    let util = Util::default();
    let output = compile_with(
        &util,
        indoc! {r#"
            <Fragment>
              <PackageGroup Id="G">
                <MsiPackage Id="Core" SourceFile="core.msi" util:Tag="x" />
              </PackageGroup>
            </Fragment>
        "#},
    );
    assert!(output.is_success(), "{}", messages(&output));
    assert_eq!(util.seen(), ["MsiPackage/@Tag [Id=Core,PayloadId=Core]"]);
}

#[test]
fn element_is_delegated_with_parent_context() {
    let util = Util::default();
    let output = compile_with(
        &util,
        indoc! {r#"
            <Fragment Id="Searches">
              <PackageGroup Id="G">
                <util:Search Id="FindDotNet" />
              </PackageGroup>
            </Fragment>
        "#},
    );
    assert!(output.is_success(), "{}", messages(&output));
    assert_eq!(util.seen(), ["PackageGroup/Search [Id=G]"]);
    insta::assert_snapshot!(output.intermediate().dump(), @r"
    section Fragment Searches
      Extension FindDotNet definition=UtilSearch fields.section=Some(Fragment)
      PackageGroup G
    ref Variable:SearchResult
    group PackageGroup:G -> Package:FindDotNet
    ");
}

#[test]
fn declined_nodes_become_warnings() {
    let util = Util::default();
    let output = compile_with(
        &util,
        indoc! {r#"
            <Fragment util:Decline="yes">
              <util:Unknown />
            </Fragment>
        "#},
    );
    assert!(output.is_success());
    insta::assert_snapshot!(messages(&output), @r"
    warning: no extension handles attribute `{http://wixtoolset.org/schemas/v4/wxs/util}Decline`
    warning: no extension handles element `{http://wixtoolset.org/schemas/v4/wxs/util}Unknown`
    ");
}

#[test]
fn unknown_namespace_is_a_warning() {
    let source = wix(r#"<Fragment xmlns:x="urn:other" x:Note="n"><x:Thing /></Fragment>"#);
    let output = Compiler::new().compile(&Document::parse(&source).unwrap()).unwrap();
    assert!(output.is_success());
    assert_eq!(
        output.diagnostics().kinds(),
        [
            DiagnosticKind::UnhandledExtensionAttribute,
            DiagnosticKind::UnhandledExtensionElement
        ]
    );
    insta::assert_snapshot!(output.intermediate().dump(), @"section Fragment");
}

#[test]
fn extension_errors_fail_the_compile() {
    let util = Util::default();
    let output = compile_with(
        &util,
        indoc! {r#"
            <Fragment>
              <Property Id="A" util:Flag="maybe" />
              <util:Search Id="Late" />
            </Fragment>
        "#},
    );
    assert!(!output.is_success());
    assert!(output.intermediate().is_empty());
    insta::assert_snapshot!(messages(&output), @"error: illegal attribute value: `Property/@Flag` is `maybe`; expected one of: yes, no");
}

#[test]
fn extension_getters_report_like_core() {
    let util = Util::default();
    let output = compile_with(&util, r#"<Fragment><util:Search /></Fragment>"#);
    insta::assert_snapshot!(messages(&output), @"error: `Search/@Id` is required");
}

#[test]
fn later_registration_replaces_earlier() {
    struct Silent;
    impl CompilerExtension for Silent {
        fn namespace(&self) -> &str {
            UTIL
        }
    }

    let util = Util::default();
    let source = wix(r#"<Fragment util:Tag="x" />"#)
        .replace("<Wix ", &format!("<Wix xmlns:util=\"{UTIL}\" "));
    let compiler = Compiler::builder()
        .with_extension(util.clone())
        .with_extension(Silent)
        .build();
    let output = compiler.compile(&Document::parse(&source).unwrap()).unwrap();
    assert!(util.seen().is_empty());
    assert_eq!(output.diagnostics().kinds(), [DiagnosticKind::UnhandledExtensionAttribute]);
}

/// Emits a symbol for every node it is shown, wherever that is.
struct Stamp;

const STAMP: &str = "urn:stamp";

impl CompilerExtension for Stamp {
    fn namespace(&self) -> &str {
        STAMP
    }

    fn parse_attribute(
        &self,
        cx: &mut ExtensionContext<'_>,
        _: Element<'_>,
        attribute: &Attribute,
        _: &ContextMap,
    ) -> bool {
        cx.emit_symbol(
            wixc_core::Identifier::global(attribute.value.clone()),
            "Stamp",
            IndexMap::new(),
        );
        true
    }

    fn parse_element(
        &self,
        cx: &mut ExtensionContext<'_>,
        _: Element<'_>,
        element: Element<'_>,
        _: &ContextMap,
    ) -> bool {
        cx.emit_symbol(
            wixc_core::Identifier::global(element.local_name()),
            "Stamp",
            IndexMap::new(),
        );
        true
    }
}

fn compile_stamped(root_attributes: &str, body: &str) -> crate::CompileOutput {
    let source = wix(body).replace(
        "<Wix ",
        &format!("<Wix xmlns:s=\"{STAMP}\" {root_attributes} "),
    );
    Compiler::builder()
        .with_extension(Stamp)
        .build()
        .compile(&Document::parse(&source).unwrap())
        .unwrap()
}

#[test]
fn emission_outside_a_section_is_reported() {
    let output = compile_stamped(r#"s:Mark="Early""#, "<Fragment />");
    assert!(!output.is_success());
    assert!(output.intermediate().is_empty());
    insta::assert_snapshot!(messages(&output), @"error: unexpected attribute `Wix/@{urn:stamp}Mark`");

    let output = compile_stamped("", "<s:Loose /><Fragment />");
    assert!(!output.is_success());
    insta::assert_snapshot!(messages(&output), @"error: unexpected element `Wix/{urn:stamp}Loose`");
}

#[test]
fn emission_inside_a_section_is_kept() {
    let output = compile_stamped("", r#"<Fragment s:Mark="Inside"><s:Nested /></Fragment>"#);
    assert!(output.is_success(), "{}", messages(&output));
    assert!(output.intermediate().symbol("Inside").is_some());
    assert!(output.intermediate().symbol("Nested").is_some());
}

use crate::test_utils::{compile, messages, wix};
use crate::{shot_error, shot_intermediate};

#[test]
fn named_and_anonymous_fragments() {
    shot_intermediate!(r#"
        <Fragment Id="Props">
          <Property Id="A" />
        </Fragment>
        <Fragment>
          <Property Id="B" Value="1" />
        </Fragment>
        <Fragment />
    "#, @r"
    section Fragment Props
      Property A secure=false hidden=false admin=false
    section Fragment
      Property B value=1 secure=false hidden=false admin=false
    section Fragment
    ");
}

#[test]
fn empty_document() {
    let output = compile(&wix(""));
    assert!(output.is_success());
    assert!(output.diagnostics().is_empty());
    assert!(output.intermediate().is_empty());
}

#[test]
fn fragment_problems() {
    shot_error!(r#"
        <Fragment Id="1st" Name="x" />
        <Fragment>
          <Product Id="Old" />
          <Custom Action="A" After="B" />
        </Fragment>
    "#, @r"
    error: `1st` is not a legal identifier
    error: unexpected attribute `Fragment/@Name`
    error: unexpected element `Fragment/Product`
    error: unexpected element `Fragment/Custom`
    ");
}

#[test]
fn extension_attributes_on_the_root() {
    let source = format!(
        "<Wix xmlns=\"{}\" xmlns:x=\"urn:other\" x:Flavor=\"dark\"><Fragment /></Wix>",
        crate::WXS_NAMESPACE
    );
    let output = compile(&source);
    assert!(output.is_success());
    insta::assert_snapshot!(messages(&output), @"warning: no extension handles attribute `{urn:other}Flavor`");
    insta::assert_snapshot!(output.intermediate().dump(), @"section Fragment");
}
